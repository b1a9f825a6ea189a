//! Serializes validated messages into the versioned wire format.
use dispatch_proto::wire::{
    self, data_message, receipt_message, sync_message, typing_message, AttachmentPointer,
    Content, DataMessage,
};
use prost::Message;
use thiserror::Error;

use crate::{
    configuration::ProtocolVersions,
    messages::{
        Attachment, Card, ForwardNode, GroupInfo, OutgoingMessage, RapidFile, ReadPosition,
        RealSource, ThreadContext,
    },
};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("attachment {index} has not been uploaded")]
    UnresolvedAttachment { index: usize },
    #[error("failed to decode data message: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// A data message ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMessage {
    pub data_message: DataMessage,
    pub required_protocol_version: u32,
    /// Every `(rapidHash, authorizeId)` referenced by the message and its forwards.
    pub rapid_files: Vec<RapidFile>,
}

impl EncodedMessage {
    pub fn data_message_bytes(&self) -> Vec<u8> {
        self.data_message.encode_to_vec()
    }

    /// The `Content` envelope handed to the session cipher.
    pub fn content_bytes(&self) -> Vec<u8> {
        Content {
            data_message: Some(self.data_message.clone()),
            ..Default::default()
        }
        .encode_to_vec()
    }
}

/// Running minimum protocol version. Only ever raised.
#[derive(Debug, Clone, Copy)]
struct RequiredVersion(u32);

impl RequiredVersion {
    fn raise(&mut self, to: u32) {
        self.0 = self.0.max(to);
    }
}

#[derive(Debug, Clone)]
pub struct WireEncoder {
    versions: ProtocolVersions,
    max_forward_depth: usize,
}

impl WireEncoder {
    pub fn new(versions: ProtocolVersions, max_forward_depth: usize) -> Self {
        Self {
            versions,
            max_forward_depth,
        }
    }

    /// Encodes a message whose attachments have all been resolved.
    ///
    /// Pure: the same message always yields the same bytes.
    pub fn encode(&self, message: &OutgoingMessage) -> Result<EncodedMessage, EncodeError> {
        let mut version = RequiredVersion(self.versions.baseline);
        let mut rapid_files = Vec::new();

        let attachments = message
            .attachments
            .iter()
            .enumerate()
            .map(|(index, a)| {
                a.resolved()
                    .map(|_| pointer(a))
                    .ok_or(EncodeError::UnresolvedAttachment { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        merge_rapid_files(&mut rapid_files, attachment_rapid_files(&message.attachments));

        let mut proto = DataMessage {
            body: message.body.clone(),
            attachments,
            group: message.group.as_ref().map(group_context),
            flags: message.flags,
            expire_timer: message.expire_timer,
            profile_key: message.profile_key.clone(),
            message_mode: Some(
                message
                    .message_mode
                    .unwrap_or(data_message::MessageMode::Normal) as i32,
            ),
            ..Default::default()
        };

        if let Some(quote) = &message.quote {
            proto.quote = Some(data_message::Quote {
                id: quote.id,
                author: quote.author.clone(),
                text: quote.text.clone(),
                attachments: quote
                    .attachments
                    .iter()
                    .map(|q| data_message::quote::QuotedAttachment {
                        content_type: Some(q.content_type.clone()),
                        file_name: q.file_name.clone(),
                        thumbnail: q
                            .thumbnail
                            .as_ref()
                            .filter(|t| t.is_resolved())
                            .map(pointer),
                    })
                    .collect(),
            });
        }

        if let Some(context) = &message.forward_context {
            let (forwards, forwarded_files) = self.encode_forwards(&context.forwards, 1);
            if !forwards.is_empty() {
                version.raise(self.versions.forward);
            }
            let mut context_files = context.rapid_files.clone();
            merge_rapid_files(&mut context_files, forwarded_files);
            merge_rapid_files(&mut context_files, rapid_files.clone());
            rapid_files = context_files;
            proto.forward_context = Some(data_message::ForwardContext {
                forwards,
                rapid_files: rapid_files.iter().map(Into::into).collect(),
            });
        }

        if !message.contacts.is_empty() {
            version.raise(self.versions.contact);
            proto.contacts = message
                .contacts
                .iter()
                .map(|c| data_message::Contact {
                    display_name: c.display_name.clone(),
                    numbers: c.numbers.clone(),
                    emails: c.emails.clone(),
                    organization: c.organization.clone(),
                })
                .collect();
        }

        if let Some(recall) = &message.recall {
            version.raise(self.versions.recall);
            proto.recall = Some(data_message::Recall {
                real_source: recall.real_source.as_ref().map(Into::into),
            });
        }

        if let Some(task) = &message.task {
            version.raise(self.versions.task);
            proto.task = Some(data_message::Task {
                task_id: Some(task.task_id.clone()),
                version: task.version,
                creator: task.creator.clone(),
                timestamp: task.timestamp,
                name: Some(task.name.clone()),
                assignees: task.assignees.clone(),
                due_time: task.due_time,
                priority: task.priority,
                description: task.description.clone(),
                status: task.status,
            });
        }

        if let Some(vote) = &message.vote {
            version.raise(self.versions.vote);
            proto.vote = Some(data_message::Vote {
                vote_id: Some(vote.vote_id.clone()),
                version: vote.version,
                creator: vote.creator.clone(),
                name: Some(vote.name.clone()),
                options: vote
                    .options
                    .iter()
                    .map(|o| data_message::vote::VoteOption {
                        id: o.id,
                        name: o.name.clone(),
                    })
                    .collect(),
                multiple: vote.multiple,
                due_time: vote.due_time,
                anonymous: vote.anonymous,
                status: vote.status,
            });
        }

        if let Some(card) = &message.card {
            version.raise(self.versions.card);
            proto.card = Some(card.into());
        }

        if let Some(thread) = &message.thread_context {
            let (thread_context, topic_context) = thread_contexts(thread);
            proto.thread_context = thread_context;
            proto.topic_context = topic_context;
        }

        if let Some(reaction) = &message.reaction {
            version.raise(self.versions.reaction);
            proto.reaction = Some(data_message::Reaction {
                source: Some((&reaction.source).into()),
                emoji: Some(reaction.emoji.clone()),
                remove: Some(reaction.remove),
            });
        }

        proto.required_protocol_version = Some(version.0);

        Ok(EncodedMessage {
            data_message: proto,
            required_protocol_version: version.0,
            rapid_files,
        })
    }

    /// Encodes one level of forwards and everything beneath it, returning the nodes
    /// together with the rapid files their attachments reference.
    fn encode_forwards(
        &self,
        nodes: &[ForwardNode],
        depth: usize,
    ) -> (Vec<data_message::Forward>, Vec<RapidFile>) {
        if depth > self.max_forward_depth {
            return (vec![], vec![]);
        }
        let mut rapid_files = Vec::new();
        let forwards = nodes
            .iter()
            .map(|node| {
                let (children, child_files) = self.encode_forwards(&node.forwards, depth + 1);
                merge_rapid_files(&mut rapid_files, attachment_rapid_files(&node.attachments));
                merge_rapid_files(&mut rapid_files, child_files);
                data_message::Forward {
                    id: node.id,
                    r#type: node.r#type,
                    is_from_group: node.is_from_group,
                    author: node.author.clone(),
                    body: node.body.clone(),
                    attachments: node
                        .attachments
                        .iter()
                        .filter(|a| a.is_resolved())
                        .map(pointer)
                        .collect(),
                    forwards: children,
                    card: node.card.as_ref().map(Into::into),
                    mentions: node
                        .mentions
                        .iter()
                        .map(|m| data_message::Mention {
                            start: m.start,
                            length: m.length,
                            uid: m.uid.clone(),
                            r#type: m.r#type,
                        })
                        .collect(),
                }
            })
            .collect();
        (forwards, rapid_files)
    }
}

fn attachment_rapid_files(attachments: &[Attachment]) -> Vec<RapidFile> {
    attachments
        .iter()
        .filter_map(Attachment::resolved)
        .map(|r| RapidFile {
            rapid_hash: r.rapid_hash.clone(),
            authorize_id: r.authorize_id.clone(),
        })
        .collect()
}

/// Appends files not already present, keeping first-seen order.
fn merge_rapid_files(into: &mut Vec<RapidFile>, files: Vec<RapidFile>) {
    for file in files {
        if !into.contains(&file) {
            into.push(file);
        }
    }
}

/// Callers must check the attachment is resolved.
fn pointer(attachment: &Attachment) -> AttachmentPointer {
    let resolved = attachment.resolved();
    AttachmentPointer {
        authorize_id: resolved.map(|r| r.authorize_id.clone()),
        content_type: Some(attachment.content_type.clone()),
        key: resolved.map(|r| r.key.clone()),
        size: resolved.map(|r| r.size),
        digest: resolved.and_then(|r| r.digest.clone()),
        file_name: attachment.file_name.clone(),
        flags: attachment.flags,
        width: attachment.width,
        height: attachment.height,
        caption: attachment.caption.clone(),
    }
}

/// Group ids travel as one byte per UTF-16 code unit.
pub fn group_id_bytes(id: &str) -> Vec<u8> {
    id.encode_utf16().map(|unit| unit as u8).collect()
}

fn group_context(group: &GroupInfo) -> wire::GroupContext {
    wire::GroupContext {
        id: Some(group_id_bytes(&group.id)),
        r#type: Some(group.r#type as i32),
        name: group.name.clone(),
        members: group.members.clone(),
    }
}

fn thread_contexts(
    thread: &ThreadContext,
) -> (
    Option<data_message::ThreadContext>,
    Option<data_message::TopicContext>,
) {
    let legacy = thread.thread_compatible.then(|| data_message::ThreadContext {
        source: Some((&thread.source).into()),
        reply_to_user: thread.reply_to_user,
        bot_id: thread.bot_id.clone(),
    });
    let topic = thread.topic_compatible.then(|| data_message::TopicContext {
        source: Some((&thread.source).into()),
        r#type: thread.topic_type,
        support_type: thread.support_type,
        topic_id: thread.topic_id.clone(),
        reply_to_user: thread.reply_to_user,
        group_id: thread.group_id.clone(),
    });
    (legacy, topic)
}

impl From<&RealSource> for wire::RealSource {
    fn from(source: &RealSource) -> Self {
        Self {
            source: Some(source.source.clone()),
            source_device: source.source_device,
            timestamp: source.timestamp,
            server_timestamp: source.server_timestamp,
            sequence_id: source.sequence_id,
            notify_sequence_id: source.notify_sequence_id,
        }
    }
}

impl From<&Card> for wire::Card {
    fn from(card: &Card) -> Self {
        Self {
            app_id: card.app_id.clone(),
            card_id: card.card_id.clone(),
            version: card.version,
            creator: card.creator.clone(),
            timestamp: card.timestamp,
            content: Some(card.content.clone()),
            content_type: card.content_type,
            r#type: card.r#type,
            fixed_width: card.fixed_width,
        }
    }
}

impl From<&RapidFile> for data_message::RapidFile {
    fn from(file: &RapidFile) -> Self {
        Self {
            rapid_hash: Some(file.rapid_hash.clone()),
            authorize_id: Some(file.authorize_id.clone()),
        }
    }
}

impl From<&ReadPosition> for wire::ReadPosition {
    fn from(position: &ReadPosition) -> Self {
        Self {
            group_id: position.group_id.as_deref().map(group_id_bytes),
            read_at: Some(position.read_at),
            max_server_timestamp: Some(position.max_server_timestamp),
            max_notify_sequence_id: position.max_notify_sequence_id,
        }
    }
}

/// Transcript of a sent message, delivered to the account's other devices.
#[derive(Debug, Clone, Default)]
pub struct SentTranscript {
    pub destination: Option<String>,
    pub timestamp: u64,
    pub expiration_start_timestamp: Option<u64>,
    pub server_timestamp: Option<u64>,
    pub sequence_id: Option<u64>,
    pub notify_sequence_id: Option<u64>,
}

/// Builds `Content` envelopes for the non data message payloads.
pub mod content {
    use super::*;

    pub fn sent_transcript(
        transcript: &SentTranscript,
        data_message: &[u8],
        rapid_files: &[RapidFile],
        padding: Vec<u8>,
    ) -> Result<Vec<u8>, EncodeError> {
        let message = DataMessage::decode(data_message)?;
        Ok(sync(
            wire::SyncMessage {
                sent: Some(sync_message::Sent {
                    destination: transcript.destination.clone(),
                    timestamp: Some(transcript.timestamp),
                    message: Some(message),
                    expiration_start_timestamp: transcript.expiration_start_timestamp,
                    rapid_files: rapid_files.iter().map(Into::into).collect(),
                    server_timestamp: transcript.server_timestamp,
                    sequence_id: transcript.sequence_id,
                    notify_sequence_id: transcript.notify_sequence_id,
                }),
                ..Default::default()
            },
            padding,
        ))
    }

    pub fn read_sync(reads: &[ReadSync], padding: Vec<u8>) -> Vec<u8> {
        sync(
            wire::SyncMessage {
                read: reads
                    .iter()
                    .map(|r| sync_message::Read {
                        sender: Some(r.sender.clone()),
                        timestamp: Some(r.timestamp),
                        read_position: r.read_position.as_ref().map(Into::into),
                    })
                    .collect(),
                ..Default::default()
            },
            padding,
        )
    }

    pub fn mark_as_unread(
        target: &ConversationTarget,
        flag: sync_message::mark_as_unread::Flag,
        padding: Vec<u8>,
    ) -> Vec<u8> {
        let (number, group_id) = target.split();
        sync(
            wire::SyncMessage {
                mark_as_unread: Some(sync_message::MarkAsUnread {
                    number,
                    group_id,
                    flag: Some(flag as i32),
                }),
                ..Default::default()
            },
            padding,
        )
    }

    pub fn conversation_archive(
        target: &ConversationTarget,
        flag: sync_message::conversation_archive::Flag,
        padding: Vec<u8>,
    ) -> Vec<u8> {
        let (number, group_id) = target.split();
        sync(
            wire::SyncMessage {
                conversation_archive: Some(sync_message::ConversationArchive {
                    number,
                    group_id,
                    flag: Some(flag as i32),
                }),
                ..Default::default()
            },
            padding,
        )
    }

    pub fn receipt(
        r#type: receipt_message::Type,
        timestamps: &[u64],
        read_position: Option<&ReadPosition>,
    ) -> Vec<u8> {
        Content {
            receipt_message: Some(wire::ReceiptMessage {
                r#type: Some(r#type as i32),
                timestamp: timestamps.to_vec(),
                read_position: read_position.map(Into::into),
            }),
            ..Default::default()
        }
        .encode_to_vec()
    }

    pub fn typing(
        action: typing_message::Action,
        timestamp: u64,
        group_id: Option<&str>,
    ) -> Vec<u8> {
        Content {
            typing_message: Some(wire::TypingMessage {
                timestamp: Some(timestamp),
                action: Some(action as i32),
                group_id: group_id.map(group_id_bytes),
            }),
            ..Default::default()
        }
        .encode_to_vec()
    }

    fn sync(mut message: wire::SyncMessage, padding: Vec<u8>) -> Vec<u8> {
        message.padding = Some(padding);
        Content {
            sync_message: Some(message),
            ..Default::default()
        }
        .encode_to_vec()
    }
}

/// One conversation marked read on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSync {
    pub sender: String,
    pub timestamp: u64,
    pub read_position: Option<ReadPosition>,
}

/// A conversation addressed by the account it is with, or by group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationTarget {
    Number(String),
    Group(String),
}

impl ConversationTarget {
    fn split(&self) -> (Option<String>, Option<Vec<u8>>) {
        match self {
            Self::Number(number) => (Some(number.clone()), None),
            Self::Group(id) => (None, Some(group_id_bytes(id))),
        }
    }
}
