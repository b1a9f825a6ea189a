//! Send flows exposed to the embedding client.
//!
//! Every flow runs the same pipeline: build and validate the message, resolve its
//! attachments, encode it once, then fan out one delivery job per destination through the
//! shared [`DeliveryQueue`]. Flows differ in who receives the envelope, whether delivery
//! is silent, and whether attachments are involved at all.


use std::{collections::BTreeMap, sync::Arc};

use dispatch_api::{ApiClientWrapper, DispatchApiClient};
use dispatch_common::time::Duration;
use dispatch_proto::{
    api::{DeliveryReport, FileAuthorization},
    wire::{
        group_context::Type as GroupType, receipt_message, sync_message, typing_message,
    },
};
use futures::future::join_all;
use rand::{Rng, RngCore};

use crate::{
    account::AccountStore,
    attachments::AttachmentPipeline,
    configuration::{DispatchConfig, MAX_SYNC_PADDING},
    encoder::{content, ConversationTarget, ReadSync, SentTranscript, WireEncoder},
    messages::{GroupInfo, OutgoingMessage, RapidFile, Reaction, ReadPosition, Recall},
    queue::{DeliveryError, DeliveryQueue, JobHandle},
    DispatchError,
};

type Result<T> = std::result::Result<T, DispatchError>;

/// Who a message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    Direct(String),
    /// `members` may include the local account, it is never sent to.
    Group {
        group: GroupInfo,
        members: Vec<String>,
    },
}

impl Conversation {
    pub fn group(id: impl Into<String>, members: Vec<String>) -> Self {
        Self::Group {
            group: GroupInfo::deliver(id),
            members,
        }
    }

    fn group_id(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Group { group, .. } => Some(&group.id),
        }
    }

    fn recipients(&self, local_number: &str) -> Vec<String> {
        match self {
            Self::Direct(number) => vec![number.clone()],
            Self::Group { members, .. } => without(members, local_number),
        }
    }
}

/// Per send delivery settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryOptions {
    /// Silent envelopes do not notify the recipient.
    pub silent: bool,
    /// Overrides [`DispatchConfig::send_timeout`] for each job of this send.
    pub timeout: Option<Duration>,
}

impl DeliveryOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            timeout: None,
        }
    }
}

/// An encoded envelope that has not been handed to the delivery queue yet.
#[derive(Debug, Clone)]
pub struct PendingEnvelope {
    pub recipients: Vec<String>,
    pub timestamp: u64,
    /// Serialized `Content`.
    pub content: Vec<u8>,
    pub options: DeliveryOptions,
    pub rapid_files: Vec<RapidFile>,
    /// Serialized `DataMessage`, for content sends.
    pub data_message: Option<Vec<u8>>,
}

/// Outcome of one send across all of its recipients.
#[derive(Debug, Default)]
pub struct SendResult {
    pub successful_numbers: Vec<String>,
    pub failover_numbers: Vec<String>,
    pub errors: Vec<DeliveryError>,
    pub rapid_files: Vec<RapidFile>,
    pub data_message: Option<Vec<u8>>,
}

impl SendResult {
    /// Destinations whose delivery failed, for a targeted retry.
    pub fn failed_numbers(&self) -> Vec<&str> {
        self.errors.iter().map(DeliveryError::destination).collect()
    }

    pub(crate) fn attempted(&self) -> usize {
        self.successful_numbers.len() + self.errors.len()
    }

    fn record(&mut self, report: DeliveryReport) {
        self.successful_numbers.extend(report.successful_numbers);
        self.failover_numbers.extend(report.failover_numbers);
        self.errors
            .extend(report.errors.into_iter().map(|e| DeliveryError::Rejected {
                destination: e.number,
                reason: e.reason,
            }));
    }
}

pub struct MessageSender<ApiClient, Store> {
    api: Arc<ApiClientWrapper<ApiClient>>,
    account: Arc<Store>,
    config: DispatchConfig,
    encoder: WireEncoder,
    queue: DeliveryQueue,
}

impl<ApiClient, Store> MessageSender<ApiClient, Store>
where
    ApiClient: DispatchApiClient + 'static,
    Store: AccountStore,
{
    pub fn new(
        mut api: ApiClientWrapper<ApiClient>,
        account: Arc<Store>,
        config: DispatchConfig,
    ) -> Self {
        api.attach_local_number(Some(account.local_number()));
        let encoder = WireEncoder::new(config.protocol_versions, config.max_forward_depth);
        Self {
            api: Arc::new(api),
            account,
            config,
            encoder,
            queue: DeliveryQueue::new(),
        }
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Validates a loosely typed message bag and sends it.
    pub async fn send_message_from_bag(&self, bag: &serde_json::Value) -> Result<SendResult> {
        let message = OutgoingMessage::from_bag(bag, &self.account.local_number())?;
        self.send_validated(message, DeliveryOptions::default()).await
    }

    /// Sends `message` to `conversation`, replacing whatever recipients and group it
    /// carried.
    pub async fn send_message(
        &self,
        conversation: Conversation,
        mut message: OutgoingMessage,
    ) -> Result<SendResult> {
        let local_number = self.account.local_number();
        address(&mut message, conversation, &local_number);
        message.validate(&local_number)?;
        self.send_validated(message, DeliveryOptions::default()).await
    }

    /// Recalls an earlier message. The recalled message's attachment authorizations are
    /// revoked first, even when nobody is left to notify.
    #[tracing::instrument(level = "debug", skip_all, fields(timestamp = timestamp))]
    pub async fn send_recall(
        &self,
        conversation: Conversation,
        recall: Recall,
        recalled_files: &[RapidFile],
        timestamp: u64,
    ) -> Result<SendResult> {
        let local_number = self.account.local_number();
        let mut message = OutgoingMessage {
            recall: Some(recall),
            ..OutgoingMessage::new(timestamp)
        };
        address(&mut message, conversation, &local_number);
        message.validate(&local_number)?;

        self.revoke_authorizations(recalled_files).await;
        self.send_validated(message, DeliveryOptions::default()).await
    }

    pub async fn send_reaction(
        &self,
        conversation: Conversation,
        reaction: Reaction,
        timestamp: u64,
    ) -> Result<SendResult> {
        let message = OutgoingMessage {
            reaction: Some(reaction),
            ..OutgoingMessage::new(timestamp)
        };
        self.send_message(conversation, message).await
    }

    /// Announces a group change to its members. `group.members` is the new member list.
    pub async fn update_group(
        &self,
        mut group: GroupInfo,
        timestamp: u64,
    ) -> Result<SendResult> {
        group.r#type = GroupType::Update;
        let members = group.members.clone();
        self.send_message(
            Conversation::Group { group, members },
            OutgoingMessage::new(timestamp),
        )
        .await
    }

    pub async fn leave_group(
        &self,
        group_id: impl Into<String>,
        members: Vec<String>,
        timestamp: u64,
    ) -> Result<SendResult> {
        let group = GroupInfo {
            r#type: GroupType::Quit,
            ..GroupInfo::deliver(group_id)
        };
        self.send_message(
            Conversation::Group { group, members },
            OutgoingMessage::new(timestamp),
        )
        .await
    }

    /// Ends the session with `number`. Local sessions are deleted before and after the
    /// send, whether or not the send succeeded. Other devices get the transcript even
    /// when delivery failed.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(number = %number, timestamp = timestamp)
    )]
    pub async fn reset_session(&self, number: &str, timestamp: u64) -> Result<SendResult> {
        if let Err(e) = self.account.delete_all_sessions(number).await {
            tracing::warn!("failed to delete sessions before reset: {e}");
        }
        let sent = self
            .send_message(
                Conversation::Direct(number.to_string()),
                OutgoingMessage::end_session(number, timestamp),
            )
            .await;
        let cleared = self.account.delete_all_sessions(number).await;

        let mut synced = Ok(None);
        if number != self.account.local_number() {
            let data_message = match &sent {
                Ok(result) => result.data_message.as_deref(),
                Err(e) => e.send_result().and_then(|r| r.data_message.as_deref()),
            };
            if let Some(data_message) = data_message {
                let transcript = SentTranscript {
                    destination: Some(number.to_string()),
                    timestamp,
                    ..Default::default()
                };
                synced = self.send_sync_message(data_message, transcript, &[]).await;
            }
        }

        let result = sent?;
        cleared?;
        synced?;
        Ok(result)
    }

    /// Forwards a sent message to the account's other devices. Returns `None` when there
    /// are none.
    #[tracing::instrument(level = "debug", skip_all, fields(timestamp = transcript.timestamp))]
    pub async fn send_sync_message(
        &self,
        data_message: &[u8],
        transcript: SentTranscript,
        rapid_files: &[RapidFile],
    ) -> Result<Option<SendResult>> {
        if !self.account.is_multi_device() {
            tracing::debug!("no linked devices, skipping sent transcript");
            return Ok(None);
        }
        let timestamp = transcript.timestamp;
        let content =
            content::sent_transcript(&transcript, data_message, rapid_files, sync_padding())?;
        self.deliver_to_self(content, timestamp, rapid_files.to_vec())
            .await
            .map(Some)
    }

    pub async fn sync_read_messages(
        &self,
        reads: &[ReadSync],
        timestamp: u64,
    ) -> Result<Option<SendResult>> {
        if reads.is_empty() || !self.account.is_multi_device() {
            return Ok(None);
        }
        let content = content::read_sync(reads, sync_padding());
        self.deliver_to_self(content, timestamp, vec![]).await.map(Some)
    }

    pub async fn sync_mark_as_unread(
        &self,
        target: &ConversationTarget,
        flag: sync_message::mark_as_unread::Flag,
        timestamp: u64,
    ) -> Result<Option<SendResult>> {
        if !self.account.is_multi_device() {
            return Ok(None);
        }
        let content = content::mark_as_unread(target, flag, sync_padding());
        self.deliver_to_self(content, timestamp, vec![]).await.map(Some)
    }

    pub async fn sync_conversation_archive(
        &self,
        target: &ConversationTarget,
        flag: sync_message::conversation_archive::Flag,
        timestamp: u64,
    ) -> Result<Option<SendResult>> {
        if !self.account.is_multi_device() {
            return Ok(None);
        }
        let content = content::conversation_archive(target, flag, sync_padding());
        self.deliver_to_self(content, timestamp, vec![]).await.map(Some)
    }

    pub async fn send_typing(
        &self,
        conversation: &Conversation,
        action: typing_message::Action,
        timestamp: u64,
    ) -> Result<SendResult> {
        let recipients = conversation.recipients(&self.account.local_number());
        let content = content::typing(action, timestamp, conversation.group_id());
        self.deliver_silently(recipients, content, timestamp).await
    }

    pub async fn send_delivery_receipt(
        &self,
        number: &str,
        timestamps: &[u64],
        timestamp: u64,
    ) -> Result<SendResult> {
        let content = content::receipt(receipt_message::Type::Delivery, timestamps, None);
        self.deliver_silently(vec![number.to_string()], content, timestamp)
            .await
    }

    pub async fn send_read_receipts(
        &self,
        number: &str,
        timestamps: &[u64],
        read_position: Option<&ReadPosition>,
        timestamp: u64,
    ) -> Result<SendResult> {
        let content = content::receipt(receipt_message::Type::Read, timestamps, read_position);
        self.deliver_silently(vec![number.to_string()], content, timestamp)
            .await
    }

    /// Delivers an envelope held back by [`DispatchError::SignedPreKeyRotation`].
    pub async fn resend_pending(&self, envelope: PendingEnvelope) -> Result<SendResult> {
        self.deliver(envelope).await
    }

    #[tracing::instrument(level = "debug", skip_all, fields(timestamp = message.timestamp))]
    async fn send_validated(
        &self,
        mut message: OutgoingMessage,
        options: DeliveryOptions,
    ) -> Result<SendResult> {
        let local_number = self.account.local_number();
        if message.group.is_some() {
            message.recipients = without(&message.recipients, &local_number);
        }

        let mut audience = message.recipients.clone();
        if !audience.contains(&local_number) {
            audience.push(local_number);
        }
        AttachmentPipeline::new(&self.api, self.config.max_forward_depth)
            .resolve_all(&mut message, &audience)
            .await
            .map_err(|source| DispatchError::MessageDelivery {
                timestamp: message.timestamp,
                recipients: message.recipients.clone(),
                source,
            })?;

        let encoded = self.encoder.encode(&message)?;
        let data_message = encoded.data_message_bytes();
        if message.recipients.is_empty() {
            tracing::debug!("group has no other members, nothing to deliver");
            return Ok(SendResult {
                rapid_files: encoded.rapid_files,
                data_message: Some(data_message),
                ..Default::default()
            });
        }

        self.deliver(PendingEnvelope {
            content: encoded.content_bytes(),
            recipients: message.recipients,
            timestamp: message.timestamp,
            options,
            rapid_files: encoded.rapid_files,
            data_message: Some(data_message),
        })
        .await
    }

    async fn deliver_silently(
        &self,
        recipients: Vec<String>,
        content: Vec<u8>,
        timestamp: u64,
    ) -> Result<SendResult> {
        if recipients.is_empty() {
            return Ok(SendResult::default());
        }
        self.deliver(PendingEnvelope {
            recipients,
            timestamp,
            content,
            options: DeliveryOptions::silent(),
            rapid_files: vec![],
            data_message: None,
        })
        .await
    }

    async fn deliver_to_self(
        &self,
        content: Vec<u8>,
        timestamp: u64,
        rapid_files: Vec<RapidFile>,
    ) -> Result<SendResult> {
        self.deliver(PendingEnvelope {
            recipients: vec![self.account.local_number()],
            timestamp,
            content,
            options: DeliveryOptions::silent(),
            rapid_files,
            data_message: None,
        })
        .await
    }

    /// Enqueues one job per recipient and waits for all of them. Any failure turns the
    /// whole result into [`DispatchError::Partial`].
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(timestamp = envelope.timestamp, recipients = envelope.recipients.len())
    )]
    async fn deliver(&self, envelope: PendingEnvelope) -> Result<SendResult> {
        let rejected = self.account.signed_key_rotation_rejected();
        if rejected > self.config.rotation_reject_threshold
            && !self.account.tunnel_security_forced()
        {
            tracing::warn!(
                rejected,
                threshold = self.config.rotation_reject_threshold,
                "refusing to send until the signed pre key is rotated"
            );
            return Err(DispatchError::SignedPreKeyRotation(Box::new(envelope)));
        }

        let timeout = envelope.options.timeout.unwrap_or(self.config.send_timeout);
        let handles: Vec<JobHandle<DeliveryReport>> = envelope
            .recipients
            .iter()
            .map(|destination| {
                let api = self.api.clone();
                let content = envelope.content.clone();
                let timestamp = envelope.timestamp;
                let silent = envelope.options.silent;
                let job_destination = destination.clone();
                self.queue.enqueue(destination, timeout, async move {
                    let destination = job_destination;
                    api.send_envelope(&destination, timestamp, content, silent)
                        .await
                        .map_err(|source| DeliveryError::Api {
                            destination: destination.clone(),
                            source,
                        })
                })
            })
            .collect();

        let mut result = SendResult {
            rapid_files: envelope.rapid_files,
            data_message: envelope.data_message,
            ..Default::default()
        };
        for outcome in join_all(handles.into_iter().map(JobHandle::settled)).await {
            match outcome {
                Ok(report) => result.record(report),
                Err(e) => {
                    tracing::error!(destination = e.destination(), "delivery failed: {e}");
                    result.errors.push(e);
                }
            }
        }

        if result.errors.is_empty() {
            tracing::info!(
                delivered = result.successful_numbers.len(),
                "message delivered"
            );
            Ok(result)
        } else {
            tracing::warn!(
                failed = result.errors.len(),
                delivered = result.successful_numbers.len(),
                "message delivery partially failed"
            );
            Err(DispatchError::Partial(Box::new(result)))
        }
    }

    /// Revokes download authorizations for a recalled message's files. Failures are
    /// logged, the recall still goes out.
    async fn revoke_authorizations(&self, files: &[RapidFile]) {
        if files.is_empty() {
            return;
        }
        let mut by_hash: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for file in files {
            by_hash
                .entry(file.rapid_hash.as_str())
                .or_default()
                .push(file.authorize_id.clone());
        }
        let files = by_hash
            .into_iter()
            .map(|(file_hash, authorize_ids)| FileAuthorization {
                file_hash: file_hash.to_string(),
                authorize_ids,
            })
            .collect();
        if let Err(e) = self.api.delete_authorization(files).await {
            tracing::warn!("failed to revoke recalled attachments: {e}");
        }
    }
}

fn address(message: &mut OutgoingMessage, conversation: Conversation, local_number: &str) {
    match conversation {
        Conversation::Direct(number) => {
            message.recipients = vec![number];
            message.group = None;
        }
        Conversation::Group { group, members } => {
            message.recipients = without(&members, local_number);
            message.group = Some(group);
        }
    }
}

fn without(numbers: &[String], local_number: &str) -> Vec<String> {
    numbers
        .iter()
        .filter(|n| n.as_str() != local_number)
        .cloned()
        .collect()
}

fn sync_padding() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut padding = vec![0u8; rng.gen_range(1..=MAX_SYNC_PADDING)];
    rng.fill_bytes(&mut padding);
    padding
}
