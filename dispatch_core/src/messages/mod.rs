//! In-memory representation of an outgoing message.
//!
//! A message is built either from typed parts by the dispatcher, or from a loosely typed
//! field bag with [`OutgoingMessage::from_bag`]. Either way it must pass
//! [`OutgoingMessage::validate`] before anything touches the network.

mod validation;

pub use validation::ValidationError;

use dispatch_common::fmt::truncate_token;
use dispatch_proto::wire::{
    data_message::{Flags, MessageMode},
    group_context::Type as GroupType,
};

/// Raw content of an attachment as supplied by the caller.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AttachmentData {
    Bytes(Vec<u8>),
    /// Data was supplied, but not as a byte buffer.
    Unsupported { found: &'static str },
    #[default]
    Missing,
}

impl AttachmentData {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttachmentData::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AttachmentData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentData::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            AttachmentData::Unsupported { found } => write!(f, "Unsupported({found})"),
            AttachmentData::Missing => write!(f, "Missing"),
        }
    }
}

/// Remote reference produced once an attachment is uploaded or matched on the server.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedAttachment {
    /// Content addressed hash the server stores the ciphertext under.
    pub rapid_hash: String,
    pub authorize_id: String,
    /// Key that decrypts the stored ciphertext.
    pub key: Vec<u8>,
    /// SHA-256 of the uploaded ciphertext, absent when the upload was matched.
    pub digest: Option<Vec<u8>>,
    pub size: u32,
}

impl std::fmt::Debug for ResolvedAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedAttachment")
            .field("rapid_hash", &truncate_token(&self.rapid_hash))
            .field("authorize_id", &self.authorize_id)
            .field("digest", &self.digest.as_ref().map(dispatch_common::fmt::debug_hex))
            .field("size", &self.size)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub data: AttachmentData,
    pub content_type: String,
    pub file_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub caption: Option<String>,
    pub flags: Option<u32>,
    /// Base64 content digest remembered from an earlier send of the same bytes.
    pub rapid_key: Option<String>,
    /// Byte length paired with `rapid_key`.
    pub rapid_size: Option<u32>,
    pub(crate) resolved: Option<ResolvedAttachment>,
}

impl Attachment {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data: AttachmentData::Bytes(data),
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    pub fn resolved(&self) -> Option<&ResolvedAttachment> {
        self.resolved.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Records the remote reference. `rapid_hash` and `authorize_id` are only ever
    /// written together.
    pub(crate) fn resolve(&mut self, resolved: ResolvedAttachment) {
        self.resolved = Some(resolved);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotedAttachment {
    pub content_type: String,
    pub file_name: Option<String>,
    pub thumbnail: Option<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quote {
    pub id: Option<u64>,
    pub author: Option<String>,
    pub text: Option<String>,
    pub attachments: Vec<QuotedAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: String,
    pub r#type: GroupType,
    pub name: Option<String>,
    pub members: Vec<String>,
}

impl GroupInfo {
    pub fn deliver(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            r#type: GroupType::Deliver,
            name: None,
            members: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mention {
    pub start: Option<u32>,
    pub length: Option<u32>,
    pub uid: Option<String>,
    pub r#type: Option<u32>,
}

/// One forwarded message, possibly itself carrying forwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardNode {
    pub id: Option<u64>,
    pub r#type: Option<u32>,
    pub is_from_group: Option<bool>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub card: Option<Card>,
    pub attachments: Vec<Attachment>,
    pub mentions: Vec<Mention>,
    pub forwards: Vec<ForwardNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RapidFile {
    pub rapid_hash: String,
    pub authorize_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardContext {
    pub forwards: Vec<ForwardNode>,
    pub rapid_files: Vec<RapidFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub display_name: Option<String>,
    pub numbers: Vec<String>,
    pub emails: Vec<String>,
    pub organization: Option<String>,
}

/// Points at an earlier message by author and send time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealSource {
    pub source: String,
    pub source_device: Option<u32>,
    pub timestamp: Option<u64>,
    pub server_timestamp: Option<u64>,
    pub sequence_id: Option<u64>,
    pub notify_sequence_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recall {
    pub real_source: Option<RealSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub task_id: String,
    pub name: String,
    pub version: Option<u32>,
    pub creator: Option<String>,
    pub timestamp: Option<u64>,
    pub assignees: Vec<String>,
    pub due_time: Option<u64>,
    pub priority: Option<u32>,
    pub description: Option<String>,
    pub status: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteOption {
    pub id: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vote {
    pub vote_id: String,
    pub name: String,
    pub version: Option<u32>,
    pub creator: Option<String>,
    pub options: Vec<VoteOption>,
    pub multiple: Option<bool>,
    pub due_time: Option<u64>,
    pub anonymous: Option<bool>,
    pub status: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    pub content: String,
    pub app_id: Option<String>,
    pub card_id: Option<String>,
    pub version: Option<u32>,
    pub creator: Option<String>,
    pub timestamp: Option<u64>,
    pub content_type: Option<u32>,
    pub r#type: Option<u32>,
    pub fixed_width: Option<bool>,
}

/// Reply context. Encoded as a legacy thread, a topic, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadContext {
    pub source: RealSource,
    pub reply_to_user: Option<bool>,
    pub bot_id: Option<String>,
    pub thread_compatible: bool,
    pub topic_compatible: bool,
    pub topic_type: Option<u32>,
    pub support_type: Option<u32>,
    pub topic_id: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    pub source: RealSource,
    pub emoji: String,
    pub remove: bool,
}

/// Where a conversation stopped being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadPosition {
    pub group_id: Option<String>,
    pub read_at: u64,
    pub max_server_timestamp: u64,
    pub max_notify_sequence_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub recipients: Vec<String>,
    pub timestamp: u64,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
    pub quote: Option<Quote>,
    pub group: Option<GroupInfo>,
    pub forward_context: Option<ForwardContext>,
    pub contacts: Vec<Contact>,
    pub recall: Option<Recall>,
    pub task: Option<Task>,
    pub vote: Option<Vote>,
    pub card: Option<Card>,
    pub thread_context: Option<ThreadContext>,
    pub reaction: Option<Reaction>,
    pub expire_timer: Option<u32>,
    pub flags: Option<u32>,
    pub profile_key: Option<Vec<u8>>,
    pub message_mode: Option<MessageMode>,
}

impl OutgoingMessage {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn is_end_session(&self) -> bool {
        self.flags.is_some_and(|f| f & Flags::EndSession as u32 != 0)
    }

    pub fn end_session(recipient: impl Into<String>, timestamp: u64) -> Self {
        Self {
            recipients: vec![recipient.into()],
            timestamp,
            flags: Some(Flags::EndSession as u32),
            ..Default::default()
        }
    }

    /// Every attachment still waiting for a remote reference, including quote
    /// thumbnails and forwards up to `max_depth` levels deep.
    pub(crate) fn unresolved_attachments_mut(
        &mut self,
        max_depth: usize,
    ) -> Vec<&mut Attachment> {
        let OutgoingMessage {
            attachments,
            quote,
            forward_context,
            ..
        } = self;

        let mut out: Vec<&mut Attachment> = attachments.iter_mut().collect();
        if let Some(quote) = quote {
            out.extend(
                quote
                    .attachments
                    .iter_mut()
                    .filter_map(|q| q.thumbnail.as_mut()),
            );
        }
        if let Some(context) = forward_context {
            collect_forward_attachments(&mut context.forwards, 1, max_depth, &mut out);
        }
        out.retain(|a| !a.is_resolved());
        out
    }
}

fn collect_forward_attachments<'m>(
    nodes: &'m mut [ForwardNode],
    depth: usize,
    max_depth: usize,
    out: &mut Vec<&'m mut Attachment>,
) {
    if depth > max_depth {
        return;
    }
    for node in nodes.iter_mut() {
        let ForwardNode {
            attachments,
            forwards,
            ..
        } = node;
        out.extend(attachments.iter_mut());
        collect_forward_attachments(forwards, depth + 1, max_depth, out);
    }
}
