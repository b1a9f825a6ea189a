#![warn(clippy::unwrap_used)]

pub mod attachments;
pub mod envelopes;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use dispatch_common::ErrorCode;
pub use dispatch_proto::api_client::DispatchApiClient;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("api client error {0}")]
    Api(#[from] dispatch_proto::Error),
    #[error("server response is missing {0}")]
    MissingField(&'static str),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Api(_) => "ApiError::Api",
            Self::MissingField(_) => "ApiError::MissingField",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClientWrapper<ApiClient> {
    pub api_client: ApiClient,
    pub(crate) local_number: Option<String>,
}

impl<ApiClient> ApiClientWrapper<ApiClient> {
    pub fn new(api_client: ApiClient) -> Self {
        Self {
            api_client,
            local_number: None,
        }
    }

    /// Attaches the sending account to tracing logs emitted by this wrapper.
    pub fn attach_local_number(&mut self, local_number: Option<String>) {
        self.local_number = local_number;
    }
}

#[cfg(test)]
#[ctor::ctor]
fn _setup() {
    dispatch_common::logger()
}
