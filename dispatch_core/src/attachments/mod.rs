//! Resolves attachments to server side references before a message is encoded.
//!
//! Each attachment is looked up by a fingerprint of its content first. Only when the
//! server has no copy for the intended audience is it encrypted and uploaded.
pub mod encryption;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use dispatch_api::{ApiClientWrapper, ApiError, DispatchApiClient};
use dispatch_common::fmt::truncate_token;
use dispatch_proto::api::PutAttachmentRequest;
use futures::future::try_join_all;
use thiserror::Error;

use crate::messages::{Attachment, AttachmentData, OutgoingMessage, ResolvedAttachment};

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment data must be a byte buffer, found {found}")]
    Type { found: &'static str },
    #[error("rapidKey is not a valid content digest")]
    InvalidRapidKey,
    #[error("rapid upload response is missing {0}")]
    RapidUploadServer(&'static str),
    #[error("attachment content changed before forwarding")]
    ContentChanged,
    #[error("upload response is missing {0}")]
    UploadServer(&'static str),
    #[error("attachment size is unknown")]
    MissingSize,
    #[error("attachment encryption failed: {0}")]
    Encryption(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Second stage fingerprint of a content digest. This, never the content, is what the
/// server sees.
pub fn rapid_hash(content_digest: &[u8]) -> String {
    BASE64.encode(encryption::sha256(content_digest))
}

pub struct AttachmentPipeline<'a, ApiClient> {
    api: &'a ApiClientWrapper<ApiClient>,
    max_forward_depth: usize,
}

impl<'a, ApiClient> AttachmentPipeline<'a, ApiClient>
where
    ApiClient: DispatchApiClient,
{
    pub fn new(api: &'a ApiClientWrapper<ApiClient>, max_forward_depth: usize) -> Self {
        Self {
            api,
            max_forward_depth,
        }
    }

    /// Resolves every attachment and quote thumbnail of `message`, including those inside
    /// forwards, concurrently. The first failure fails the whole message.
    ///
    /// `audience` is everyone who may fetch the attachment, the local account included.
    #[tracing::instrument(level = "debug", skip_all, fields(timestamp = message.timestamp))]
    pub async fn resolve_all(
        &self,
        message: &mut OutgoingMessage,
        audience: &[String],
    ) -> Result<(), AttachmentError> {
        let pending = message.unresolved_attachments_mut(self.max_forward_depth);
        if pending.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = pending.len(), "resolving attachments");
        try_join_all(pending.into_iter().map(|a| self.resolve(a, audience))).await?;
        Ok(())
    }

    async fn resolve(
        &self,
        attachment: &mut Attachment,
        audience: &[String],
    ) -> Result<(), AttachmentError> {
        let content_key = content_key(attachment)?;
        let rapid_hash = rapid_hash(&content_key);

        let lookup = self.api.rapid_upload(&rapid_hash, audience).await?;
        let resolved = if lookup.exists {
            let cipher_hash = lookup
                .cipher_hash
                .ok_or(AttachmentError::RapidUploadServer("cipherHash"))?;
            let authorize_id = lookup
                .authorize_id
                .ok_or(AttachmentError::RapidUploadServer("authorizeId"))?;
            tracing::debug!(
                rapid_hash = truncate_token(&cipher_hash),
                "rapid match, skipping upload"
            );
            ResolvedAttachment {
                rapid_hash: cipher_hash,
                authorize_id,
                key: content_key,
                digest: None,
                size: size(attachment)?,
            }
        } else {
            let data = verified_bytes(attachment, &content_key)?;
            let attachment_id = lookup
                .attachment_id
                .ok_or(AttachmentError::UploadServer("attachmentId"))?;
            let upload_url = lookup.url.ok_or(AttachmentError::UploadServer("url"))?;

            let encrypted = encryption::encrypt(data, &content_key)?;
            let authorize_id = self
                .api
                .put_attachment(PutAttachmentRequest {
                    cipher_hash: encrypted.digest_hex(),
                    cipher_length: encrypted.ciphertext.len() as u64,
                    ciphertext: encrypted.ciphertext,
                    upload_url,
                    attachment_id,
                    rapid_hash: rapid_hash.clone(),
                    numbers: audience.to_vec(),
                })
                .await?;
            tracing::debug!(rapid_hash = truncate_token(&rapid_hash), "attachment uploaded");
            ResolvedAttachment {
                rapid_hash,
                authorize_id,
                key: content_key,
                digest: Some(encrypted.digest),
                size: size(attachment)?,
            }
        };
        attachment.resolve(resolved);
        Ok(())
    }
}

fn bytes(attachment: &Attachment) -> Result<&[u8], AttachmentError> {
    match &attachment.data {
        AttachmentData::Bytes(b) => Ok(b.as_slice()),
        AttachmentData::Unsupported { found } => Err(AttachmentError::Type { found: *found }),
        AttachmentData::Missing => Err(AttachmentError::Type { found: "nothing" }),
    }
}

/// The remembered `rapid_key` when there is one, otherwise a digest of the data.
fn content_key(attachment: &Attachment) -> Result<Vec<u8>, AttachmentError> {
    match &attachment.rapid_key {
        Some(key) => {
            let key = BASE64
                .decode(key)
                .map_err(|_| AttachmentError::InvalidRapidKey)?;
            if key.len() != encryption::CONTENT_DIGEST_SIZE {
                return Err(AttachmentError::InvalidRapidKey);
            }
            Ok(key)
        }
        None => Ok(encryption::content_digest(bytes(attachment)?)),
    }
}

/// Data about to be uploaded. A remembered `rapid_key` must still describe it.
fn verified_bytes<'a>(
    attachment: &'a Attachment,
    content_key: &[u8],
) -> Result<&'a [u8], AttachmentError> {
    let data = bytes(attachment)?;
    if attachment.rapid_key.is_some() {
        let size_matches = attachment
            .rapid_size
            .map_or(true, |size| size as usize == data.len());
        if !size_matches || encryption::content_digest(data) != content_key {
            return Err(AttachmentError::ContentChanged);
        }
    }
    Ok(data)
}

fn size(attachment: &Attachment) -> Result<u32, AttachmentError> {
    attachment
        .rapid_size
        .or_else(|| {
            attachment
                .data
                .as_bytes()
                .and_then(|b| u32::try_from(b.len()).ok())
        })
        .ok_or(AttachmentError::MissingSize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ForwardContext, ForwardNode, Quote, QuotedAttachment};
    use dispatch_api::test_utils::MockApiClient;
    use dispatch_proto::api::{PutAttachmentResponse, RapidUploadResponse};
    use std::sync::{Arc, Mutex};

    const AUDIENCE: [&str; 2] = ["+15550001", "+15550000"];

    fn audience() -> Vec<String> {
        AUDIENCE.iter().map(|s| s.to_string()).collect()
    }

    fn miss() -> RapidUploadResponse {
        RapidUploadResponse {
            exists: false,
            attachment_id: Some("att-1".into()),
            url: Some("https://cdn/att-1".into()),
            ..Default::default()
        }
    }

    fn hit(hash: &str) -> RapidUploadResponse {
        RapidUploadResponse {
            exists: true,
            cipher_hash: Some(hash.into()),
            authorize_id: Some("auth-existing".into()),
            ..Default::default()
        }
    }

    fn message_with(attachments: Vec<Attachment>) -> OutgoingMessage {
        OutgoingMessage {
            recipients: vec![AUDIENCE[0].into()],
            attachments,
            ..OutgoingMessage::new(1)
        }
    }

    #[tokio::test]
    async fn uploads_on_miss() {
        let data = b"fresh bytes".to_vec();
        let expected_hash = rapid_hash(&encryption::content_digest(&data));
        let mut mock_api = MockApiClient::new();
        let hash = expected_hash.clone();
        mock_api
            .expect_rapid_upload()
            .withf(move |req| req.rapid_hash == hash && req.numbers == audience())
            .times(1)
            .returning(|_| Ok(miss()));
        mock_api
            .expect_put_attachment()
            .withf(|req| {
                req.attachment_id == "att-1"
                    && req.upload_url == "https://cdn/att-1"
                    && req.cipher_length == req.ciphertext.len() as u64
                    && req.cipher_hash == hex::encode(encryption::sha256(&req.ciphertext))
            })
            .times(1)
            .returning(|_| {
                Ok(PutAttachmentResponse {
                    exists: false,
                    authorize_id: Some("auth-new".into()),
                })
            });
        let api = ApiClientWrapper::new(mock_api);

        let mut message = message_with(vec![Attachment::new(data.clone(), "image/png")]);
        AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap();

        let resolved = message.attachments[0].resolved().unwrap();
        assert_eq!(resolved.rapid_hash, expected_hash);
        assert_eq!(resolved.authorize_id, "auth-new");
        assert_eq!(resolved.size, data.len() as u32);
        assert!(resolved.digest.is_some());
    }

    #[tokio::test]
    async fn rapid_match_skips_upload() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_rapid_upload()
            .times(1)
            .returning(|_| Ok(hit("server-hash")));
        mock_api.expect_put_attachment().never();
        let api = ApiClientWrapper::new(mock_api);

        let mut message = message_with(vec![Attachment::new(vec![1, 2, 3], "image/png")]);
        AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap();

        let resolved = message.attachments[0].resolved().unwrap();
        assert_eq!(resolved.rapid_hash, "server-hash");
        assert_eq!(resolved.authorize_id, "auth-existing");
        assert_eq!(resolved.size, 3);
        assert!(resolved.digest.is_none());
    }

    #[tokio::test]
    async fn identical_content_uploads_once() {
        // the server learns the fingerprint from the first upload
        let known = Arc::new(Mutex::new(None::<String>));
        let mut mock_api = MockApiClient::new();
        let seen = known.clone();
        mock_api.expect_rapid_upload().times(2).returning(move |req| {
            match seen.lock().unwrap().as_ref() {
                Some(hash) if *hash == req.rapid_hash => Ok(hit(hash)),
                _ => Ok(miss()),
            }
        });
        let stored = known.clone();
        mock_api
            .expect_put_attachment()
            .times(1)
            .returning(move |req| {
                *stored.lock().unwrap() = Some(req.rapid_hash);
                Ok(PutAttachmentResponse {
                    exists: false,
                    authorize_id: Some("auth-first".into()),
                })
            });
        let api = ApiClientWrapper::new(mock_api);
        let pipeline = AttachmentPipeline::new(&api, 4);

        let mut first = message_with(vec![Attachment::new(b"same".to_vec(), "image/png")]);
        pipeline.resolve_all(&mut first, &audience()).await.unwrap();
        let mut second = message_with(vec![Attachment::new(b"same".to_vec(), "image/png")]);
        pipeline.resolve_all(&mut second, &audience()).await.unwrap();

        assert_eq!(
            first.attachments[0].resolved().unwrap().rapid_hash,
            second.attachments[0].resolved().unwrap().rapid_hash
        );
    }

    #[tokio::test]
    async fn changed_content_under_old_rapid_key_is_rejected() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_rapid_upload()
            .times(1)
            .returning(|_| Ok(miss()));
        mock_api.expect_put_attachment().never();
        let api = ApiClientWrapper::new(mock_api);

        let mut forwarded = Attachment::new(b"edited".to_vec(), "image/png");
        forwarded.rapid_key = Some(BASE64.encode(encryption::content_digest(b"original")));
        forwarded.rapid_size = Some(8);
        let mut message = message_with(vec![forwarded]);

        let err = AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::ContentChanged));
        assert!(!message.attachments[0].is_resolved());
    }

    #[tokio::test]
    async fn changed_size_under_old_rapid_key_is_rejected() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_rapid_upload().returning(|_| Ok(miss()));
        mock_api.expect_put_attachment().never();
        let api = ApiClientWrapper::new(mock_api);

        let mut forwarded = Attachment::new(b"original".to_vec(), "image/png");
        forwarded.rapid_key = Some(BASE64.encode(encryption::content_digest(b"original")));
        forwarded.rapid_size = Some(100);
        let mut message = message_with(vec![forwarded]);

        let err = AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::ContentChanged));
    }

    #[tokio::test]
    async fn remembered_rapid_key_resolves_without_data() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_rapid_upload()
            .returning(|_| Ok(hit("server-hash")));
        let api = ApiClientWrapper::new(mock_api);

        let forwarded = Attachment {
            rapid_key: Some(BASE64.encode(encryption::content_digest(b"gone"))),
            rapid_size: Some(4),
            content_type: "image/png".into(),
            ..Default::default()
        };
        let mut message = message_with(vec![forwarded]);
        AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap();
        assert_eq!(message.attachments[0].resolved().unwrap().size, 4);
    }

    #[tokio::test]
    async fn non_buffer_data_is_a_type_error() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_rapid_upload().never();
        let api = ApiClientWrapper::new(mock_api);

        let mut message = message_with(vec![Attachment {
            data: AttachmentData::Unsupported { found: "string" },
            content_type: "image/png".into(),
            ..Default::default()
        }]);
        let err = AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Type { found: "string" }));
    }

    #[tokio::test]
    async fn malformed_rapid_hit_is_a_server_error() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_rapid_upload().returning(|_| {
            Ok(RapidUploadResponse {
                exists: true,
                cipher_hash: None,
                authorize_id: Some("a".into()),
                ..Default::default()
            })
        });
        let api = ApiClientWrapper::new(mock_api);
        let mut message = message_with(vec![Attachment::new(vec![1], "image/png")]);
        let err = AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::RapidUploadServer("cipherHash")));
    }

    #[tokio::test]
    async fn miss_without_upload_url_is_an_upload_error() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_rapid_upload().returning(|_| {
            Ok(RapidUploadResponse {
                attachment_id: Some("id".into()),
                ..Default::default()
            })
        });
        mock_api.expect_put_attachment().never();
        let api = ApiClientWrapper::new(mock_api);
        let mut message = message_with(vec![Attachment::new(vec![1], "image/png")]);
        let err = AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::UploadServer("url")));
    }

    #[tokio::test]
    async fn thumbnails_and_forwards_are_resolved() {
        let mut mock_api = MockApiClient::new();
        mock_api
            .expect_rapid_upload()
            .times(3)
            .returning(|req| Ok(hit(&req.rapid_hash)));
        let api = ApiClientWrapper::new(mock_api);

        let mut message = message_with(vec![]);
        message.quote = Some(Quote {
            attachments: vec![QuotedAttachment {
                content_type: "image/png".into(),
                thumbnail: Some(Attachment::new(vec![1], "image/png")),
                ..Default::default()
            }],
            ..Default::default()
        });
        message.forward_context = Some(ForwardContext {
            forwards: vec![ForwardNode {
                attachments: vec![Attachment::new(vec![2], "image/png")],
                forwards: vec![ForwardNode {
                    attachments: vec![Attachment::new(vec![3], "image/png")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            rapid_files: vec![],
        });

        AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap();
        assert!(message.unresolved_attachments_mut(4).is_empty());
    }

    #[tokio::test]
    async fn one_failure_fails_the_message() {
        let mut mock_api = MockApiClient::new();
        mock_api.expect_rapid_upload().returning(|_| Ok(hit("h")));
        let api = ApiClientWrapper::new(mock_api);

        let mut message = message_with(vec![
            Attachment::new(vec![1], "image/png"),
            Attachment {
                content_type: "image/png".into(),
                ..Default::default()
            },
        ]);
        let err = AttachmentPipeline::new(&api, 4)
            .resolve_all(&mut message, &audience())
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Type { found: "nothing" }));
    }
}
