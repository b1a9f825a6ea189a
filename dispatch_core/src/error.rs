use dispatch_api::ApiError;
use dispatch_common::ErrorCode;
use thiserror::Error;

use crate::{
    account::AccountError,
    attachments::AttachmentError,
    dispatcher::{PendingEnvelope, SendResult},
    encoder::EncodeError,
    messages::ValidationError,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message was malformed and never left the device.
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),
    /// An attachment could not be resolved, so nothing was delivered.
    #[error("message {timestamp} was not sent: {source}")]
    MessageDelivery {
        timestamp: u64,
        recipients: Vec<String>,
        #[source]
        source: AttachmentError,
    },
    /// Sending is refused until the signed pre key has been rotated. The envelope can be
    /// handed back to `resend_pending` afterwards.
    #[error("signed pre key rotation was rejected too often, message {} held back", .0.timestamp)]
    SignedPreKeyRotation(Box<PendingEnvelope>),
    /// Some recipients failed. Carries every per recipient outcome.
    #[error("failed to deliver to {} of {} recipients", .0.errors.len(), .0.attempted())]
    Partial(Box<SendResult>),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl DispatchError {
    /// The aggregated outcome, for failures that got as far as delivery.
    pub fn send_result(&self) -> Option<&SendResult> {
        match self {
            Self::Partial(result) => Some(result),
            _ => None,
        }
    }
}

impl ErrorCode for DispatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "DispatchError::Validation",
            Self::MessageDelivery { .. } => "DispatchError::MessageDelivery",
            Self::SignedPreKeyRotation(_) => "DispatchError::SignedPreKeyRotation",
            Self::Partial(_) => "DispatchError::Partial",
            Self::Api(e) => e.error_code(),
            Self::Encode(_) => "DispatchError::Encode",
            Self::Account(_) => "DispatchError::Account",
        }
    }
}
