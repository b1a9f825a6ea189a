use super::ApiClientWrapper;
use crate::{DispatchApiClient, Result};
use dispatch_proto::api::{DeliveryReport, SendEnvelopeRequest};

impl<ApiClient> ApiClientWrapper<ApiClient>
where
    ApiClient: DispatchApiClient,
{
    /// Delivers serialized `Content` to every device registered for `destination`.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(destination = %destination, timestamp = timestamp)
    )]
    pub async fn send_envelope(
        &self,
        destination: &str,
        timestamp: u64,
        content: Vec<u8>,
        silent: bool,
    ) -> Result<DeliveryReport> {
        tracing::debug!(
            bytes = content.len(),
            silent,
            local_number = self.local_number,
            "sending envelope"
        );
        let report = self
            .api_client
            .send_envelope(SendEnvelopeRequest {
                destination: destination.to_string(),
                timestamp,
                content,
                silent,
            })
            .await?;
        if !report.is_success() {
            tracing::warn!(
                destination,
                failures = report.errors.len(),
                "envelope delivery reported failures"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockApiClient;
    use dispatch_proto::{ApiEndpoint, Error, ErrorKind};

    #[tokio::test]
    async fn transport_errors_propagate() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_send_envelope().times(1).returning(|_| {
            Err(Error::new(
                ApiEndpoint::SendEnvelope,
                ErrorKind::Transport,
                "connection reset",
            ))
        });
        let wrapper = ApiClientWrapper::new(mock_api);
        let err = wrapper
            .send_envelope("+1", 1, vec![0], false)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ApiError::Api(_)));
    }

    #[tokio::test]
    async fn report_is_returned() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_send_envelope()
            .withf(|req| req.destination == "+2" && req.silent)
            .returning(|req| Ok(DeliveryReport::success(req.destination)));
        let wrapper = ApiClientWrapper::new(mock_api);
        let report = wrapper.send_envelope("+2", 1, vec![], true).await.unwrap();
        assert_eq!(report.successful_numbers, vec!["+2".to_string()]);
    }
}
