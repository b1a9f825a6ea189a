//! Request and response bodies exchanged with the dispatch server.
use serde::{Deserialize, Serialize};

/// Content-addressed lookup for an attachment the audience may already have access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RapidUploadRequest {
    pub rapid_hash: String,
    pub numbers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RapidUploadResponse {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub cipher_hash: Option<String>,
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub authorize_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutAttachmentRequest {
    #[serde(skip)]
    pub ciphertext: Vec<u8>,
    /// Hex encoded SHA-256 of `ciphertext`.
    pub cipher_hash: String,
    pub cipher_length: u64,
    pub upload_url: String,
    pub attachment_id: String,
    pub rapid_hash: String,
    pub numbers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutAttachmentResponse {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub authorize_id: Option<String>,
}

/// Authorizations to revoke for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAuthorization {
    pub file_hash: String,
    pub authorize_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAuthorizationRequest {
    pub files: Vec<FileAuthorization>,
}

/// One encrypted payload for every device of `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEnvelopeRequest {
    pub destination: String,
    pub timestamp: u64,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub silent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientFailure {
    pub number: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    #[serde(default)]
    pub successful_numbers: Vec<String>,
    #[serde(default)]
    pub failover_numbers: Vec<String>,
    #[serde(default)]
    pub errors: Vec<RecipientFailure>,
}

impl DeliveryReport {
    pub fn success(number: impl Into<String>) -> Self {
        Self {
            successful_numbers: vec![number.into()],
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_upload_response_tolerates_missing_fields() {
        let resp: RapidUploadResponse = serde_json::from_str(r#"{"exists":false}"#).unwrap();
        assert!(!resp.exists);
        assert!(resp.cipher_hash.is_none());
        assert!(resp.url.is_none());

        let resp: RapidUploadResponse = serde_json::from_str(
            r#"{"exists":true,"cipherHash":"abc","authorizeId":"a1"}"#,
        )
        .unwrap();
        assert!(resp.exists);
        assert_eq!(resp.cipher_hash.as_deref(), Some("abc"));
        assert_eq!(resp.authorize_id.as_deref(), Some("a1"));
    }

    #[test]
    fn delete_authorization_uses_camel_case() {
        let req = DeleteAuthorizationRequest {
            files: vec![FileAuthorization {
                file_hash: "h".into(),
                authorize_ids: vec!["1".into(), "2".into()],
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["files"][0]["fileHash"], "h");
        assert_eq!(json["files"][0]["authorizeIds"][1], "2");
    }
}
