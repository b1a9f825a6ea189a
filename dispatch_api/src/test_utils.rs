use async_trait::async_trait;
use dispatch_proto::{
    api::{
        DeleteAuthorizationRequest, DeliveryReport, PutAttachmentRequest, PutAttachmentResponse,
        RapidUploadRequest, RapidUploadResponse, SendEnvelopeRequest,
    },
    api_client::{DispatchApiClient, Error},
};
use mockall::mock;

// Create a mock DispatchApiClient for testing the client wrapper
mock! {
    pub ApiClient {}

    #[async_trait]
    impl DispatchApiClient for ApiClient {
        async fn rapid_upload(
            &self,
            request: RapidUploadRequest,
        ) -> Result<RapidUploadResponse, Error>;
        async fn put_attachment(
            &self,
            request: PutAttachmentRequest,
        ) -> Result<PutAttachmentResponse, Error>;
        async fn delete_authorization(
            &self,
            request: DeleteAuthorizationRequest,
        ) -> Result<(), Error>;
        async fn send_envelope(
            &self,
            request: SendEnvelopeRequest,
        ) -> Result<DeliveryReport, Error>;
    }
}
