use crate::api::{
    DeleteAuthorizationRequest, DeliveryReport, PutAttachmentRequest, PutAttachmentResponse,
    RapidUploadRequest, RapidUploadResponse, SendEnvelopeRequest,
};
pub use crate::Error;

/// Network operations the dispatch subsystem needs from the server.
///
/// Session encryption of envelope content is the implementor's concern: `send_envelope`
/// receives the serialized plaintext `Content` and delivers it to every device of the
/// destination.
#[async_trait::async_trait]
pub trait DispatchApiClient: Send + Sync {
    async fn rapid_upload(&self, request: RapidUploadRequest)
        -> Result<RapidUploadResponse, Error>;
    async fn put_attachment(
        &self,
        request: PutAttachmentRequest,
    ) -> Result<PutAttachmentResponse, Error>;
    async fn delete_authorization(&self, request: DeleteAuthorizationRequest)
        -> Result<(), Error>;
    async fn send_envelope(&self, request: SendEnvelopeRequest) -> Result<DeliveryReport, Error>;
}
