use super::ApiClientWrapper;
use crate::{DispatchApiClient, Result};
use dispatch_common::fmt::truncate_hex;
use dispatch_proto::api::{
    DeleteAuthorizationRequest, FileAuthorization, PutAttachmentRequest, RapidUploadRequest,
    RapidUploadResponse,
};

impl<ApiClient> ApiClientWrapper<ApiClient>
where
    ApiClient: DispatchApiClient,
{
    /// Asks the server whether `rapid_hash` is already stored for this audience.
    #[tracing::instrument(level = "trace", skip_all, fields(rapid_hash = %rapid_hash))]
    pub async fn rapid_upload(
        &self,
        rapid_hash: &str,
        numbers: &[String],
    ) -> Result<RapidUploadResponse> {
        tracing::debug!(
            recipients = numbers.len(),
            local_number = self.local_number,
            "rapid upload lookup"
        );
        let response = self
            .api_client
            .rapid_upload(RapidUploadRequest {
                rapid_hash: rapid_hash.to_string(),
                numbers: numbers.to_vec(),
            })
            .await?;
        Ok(response)
    }

    /// Uploads ciphertext to the location handed out by [`Self::rapid_upload`] and returns
    /// the authorization id issued for it.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(attachment_id = %request.attachment_id)
    )]
    pub async fn put_attachment(&self, request: PutAttachmentRequest) -> Result<String> {
        tracing::debug!(
            cipher_hash = truncate_hex(&request.cipher_hash),
            cipher_length = request.cipher_length,
            local_number = self.local_number,
            "uploading attachment"
        );
        let response = self.api_client.put_attachment(request).await?;
        response
            .authorize_id
            .ok_or(crate::ApiError::MissingField("authorizeId"))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn delete_authorization(&self, files: Vec<FileAuthorization>) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            files = files.len(),
            local_number = self.local_number,
            "revoking attachment authorizations"
        );
        self.api_client
            .delete_authorization(DeleteAuthorizationRequest { files })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockApiClient;
    use dispatch_proto::api::PutAttachmentResponse;

    #[tokio::test]
    async fn put_attachment_requires_authorize_id() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_put_attachment()
            .times(1)
            .returning(|_| Ok(PutAttachmentResponse::default()));
        let wrapper = ApiClientWrapper::new(mock_api);
        let result = wrapper
            .put_attachment(PutAttachmentRequest {
                ciphertext: vec![1, 2, 3],
                cipher_hash: "00".into(),
                cipher_length: 3,
                upload_url: "https://files/1".into(),
                attachment_id: "1".into(),
                rapid_hash: "r".into(),
                numbers: vec![],
            })
            .await;
        assert!(matches!(
            result,
            Err(crate::ApiError::MissingField("authorizeId"))
        ));
    }

    #[tokio::test]
    async fn empty_revocation_skips_network() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_delete_authorization().never();
        let wrapper = ApiClientWrapper::new(mock_api);
        wrapper.delete_authorization(vec![]).await.unwrap();
    }

    #[tokio::test]
    async fn rapid_upload_passes_audience() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_rapid_upload()
            .withf(|req| req.rapid_hash == "fp" && req.numbers == vec!["+1".to_string()])
            .times(1)
            .returning(|_| Ok(RapidUploadResponse::default()));
        let wrapper = ApiClientWrapper::new(mock_api);
        let resp = wrapper.rapid_upload("fp", &["+1".into()]).await.unwrap();
        assert!(!resp.exists);
    }
}
