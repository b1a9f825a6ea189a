// This file mirrors `proto/dispatch/wire/v1/content.proto`.
/// Top level plaintext handed to the session cipher for a single destination.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Content {
    #[prost(message, optional, tag = "1")]
    pub data_message: ::core::option::Option<DataMessage>,
    #[prost(message, optional, tag = "2")]
    pub sync_message: ::core::option::Option<SyncMessage>,
    #[prost(message, optional, tag = "3")]
    pub receipt_message: ::core::option::Option<ReceiptMessage>,
    #[prost(message, optional, tag = "4")]
    pub typing_message: ::core::option::Option<TypingMessage>,
}
/// A user visible message, or a group management message.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataMessage {
    #[prost(string, optional, tag = "1")]
    pub body: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "2")]
    pub attachments: ::prost::alloc::vec::Vec<AttachmentPointer>,
    #[prost(message, optional, tag = "3")]
    pub group: ::core::option::Option<GroupContext>,
    #[prost(uint32, optional, tag = "4")]
    pub flags: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub expire_timer: ::core::option::Option<u32>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub profile_key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint64, optional, tag = "7")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(message, optional, tag = "8")]
    pub quote: ::core::option::Option<data_message::Quote>,
    #[prost(message, repeated, tag = "9")]
    pub contacts: ::prost::alloc::vec::Vec<data_message::Contact>,
    #[prost(uint32, optional, tag = "10")]
    pub required_protocol_version: ::core::option::Option<u32>,
    #[prost(message, optional, tag = "11")]
    pub forward_context: ::core::option::Option<data_message::ForwardContext>,
    #[prost(message, optional, tag = "12")]
    pub recall: ::core::option::Option<data_message::Recall>,
    #[prost(message, optional, tag = "13")]
    pub task: ::core::option::Option<data_message::Task>,
    #[prost(message, optional, tag = "14")]
    pub vote: ::core::option::Option<data_message::Vote>,
    #[prost(message, optional, tag = "15")]
    pub card: ::core::option::Option<Card>,
    #[prost(message, optional, tag = "16")]
    pub thread_context: ::core::option::Option<data_message::ThreadContext>,
    #[prost(message, optional, tag = "17")]
    pub topic_context: ::core::option::Option<data_message::TopicContext>,
    #[prost(message, optional, tag = "18")]
    pub reaction: ::core::option::Option<data_message::Reaction>,
    #[prost(enumeration = "data_message::MessageMode", optional, tag = "19")]
    pub message_mode: ::core::option::Option<i32>,
}
/// Nested message and enum types in `DataMessage`.
pub mod data_message {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Quote {
        #[prost(uint64, optional, tag = "1")]
        pub id: ::core::option::Option<u64>,
        #[prost(string, optional, tag = "2")]
        pub author: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(string, optional, tag = "3")]
        pub text: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(message, repeated, tag = "4")]
        pub attachments: ::prost::alloc::vec::Vec<quote::QuotedAttachment>,
    }
    /// Nested message and enum types in `Quote`.
    pub mod quote {
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct QuotedAttachment {
            #[prost(string, optional, tag = "1")]
            pub content_type: ::core::option::Option<::prost::alloc::string::String>,
            #[prost(string, optional, tag = "2")]
            pub file_name: ::core::option::Option<::prost::alloc::string::String>,
            #[prost(message, optional, tag = "3")]
            pub thumbnail: ::core::option::Option<super::super::AttachmentPointer>,
        }
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Contact {
        #[prost(string, optional, tag = "1")]
        pub display_name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "2")]
        pub numbers: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "3")]
        pub emails: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, optional, tag = "4")]
        pub organization: ::core::option::Option<::prost::alloc::string::String>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ForwardContext {
        #[prost(message, repeated, tag = "1")]
        pub forwards: ::prost::alloc::vec::Vec<Forward>,
        #[prost(message, repeated, tag = "2")]
        pub rapid_files: ::prost::alloc::vec::Vec<RapidFile>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Forward {
        #[prost(uint64, optional, tag = "1")]
        pub id: ::core::option::Option<u64>,
        #[prost(uint32, optional, tag = "2")]
        pub r#type: ::core::option::Option<u32>,
        #[prost(bool, optional, tag = "3")]
        pub is_from_group: ::core::option::Option<bool>,
        #[prost(string, optional, tag = "4")]
        pub author: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(string, optional, tag = "5")]
        pub body: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(message, repeated, tag = "6")]
        pub attachments: ::prost::alloc::vec::Vec<super::AttachmentPointer>,
        #[prost(message, repeated, tag = "7")]
        pub forwards: ::prost::alloc::vec::Vec<Forward>,
        #[prost(message, optional, tag = "8")]
        pub card: ::core::option::Option<super::Card>,
        #[prost(message, repeated, tag = "9")]
        pub mentions: ::prost::alloc::vec::Vec<Mention>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Mention {
        #[prost(uint32, optional, tag = "1")]
        pub start: ::core::option::Option<u32>,
        #[prost(uint32, optional, tag = "2")]
        pub length: ::core::option::Option<u32>,
        #[prost(string, optional, tag = "3")]
        pub uid: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint32, optional, tag = "4")]
        pub r#type: ::core::option::Option<u32>,
    }
    /// Server side reference to an uploaded attachment, keyed by content hash.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RapidFile {
        #[prost(string, optional, tag = "1")]
        pub rapid_hash: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(string, optional, tag = "2")]
        pub authorize_id: ::core::option::Option<::prost::alloc::string::String>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Recall {
        #[prost(message, optional, tag = "1")]
        pub real_source: ::core::option::Option<super::RealSource>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Task {
        #[prost(string, optional, tag = "1")]
        pub task_id: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint32, optional, tag = "2")]
        pub version: ::core::option::Option<u32>,
        #[prost(string, optional, tag = "3")]
        pub creator: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint64, optional, tag = "4")]
        pub timestamp: ::core::option::Option<u64>,
        #[prost(string, optional, tag = "5")]
        pub name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "6")]
        pub assignees: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(uint64, optional, tag = "7")]
        pub due_time: ::core::option::Option<u64>,
        #[prost(uint32, optional, tag = "8")]
        pub priority: ::core::option::Option<u32>,
        #[prost(string, optional, tag = "9")]
        pub description: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint32, optional, tag = "10")]
        pub status: ::core::option::Option<u32>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Vote {
        #[prost(string, optional, tag = "1")]
        pub vote_id: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint32, optional, tag = "2")]
        pub version: ::core::option::Option<u32>,
        #[prost(string, optional, tag = "3")]
        pub creator: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(string, optional, tag = "4")]
        pub name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(message, repeated, tag = "5")]
        pub options: ::prost::alloc::vec::Vec<vote::VoteOption>,
        #[prost(bool, optional, tag = "6")]
        pub multiple: ::core::option::Option<bool>,
        #[prost(uint64, optional, tag = "7")]
        pub due_time: ::core::option::Option<u64>,
        #[prost(bool, optional, tag = "8")]
        pub anonymous: ::core::option::Option<bool>,
        #[prost(uint32, optional, tag = "9")]
        pub status: ::core::option::Option<u32>,
    }
    /// Nested message and enum types in `Vote`.
    pub mod vote {
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct VoteOption {
            #[prost(uint32, optional, tag = "1")]
            pub id: ::core::option::Option<u32>,
            #[prost(string, optional, tag = "2")]
            pub name: ::core::option::Option<::prost::alloc::string::String>,
        }
    }
    /// Legacy thread shape, understood by older receivers.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ThreadContext {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::RealSource>,
        #[prost(bool, optional, tag = "2")]
        pub reply_to_user: ::core::option::Option<bool>,
        #[prost(string, optional, tag = "3")]
        pub bot_id: ::core::option::Option<::prost::alloc::string::String>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TopicContext {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::RealSource>,
        #[prost(uint32, optional, tag = "2")]
        pub r#type: ::core::option::Option<u32>,
        #[prost(uint32, optional, tag = "3")]
        pub support_type: ::core::option::Option<u32>,
        #[prost(string, optional, tag = "4")]
        pub topic_id: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(bool, optional, tag = "5")]
        pub reply_to_user: ::core::option::Option<bool>,
        #[prost(string, optional, tag = "6")]
        pub group_id: ::core::option::Option<::prost::alloc::string::String>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Reaction {
        #[prost(message, optional, tag = "1")]
        pub source: ::core::option::Option<super::RealSource>,
        #[prost(string, optional, tag = "2")]
        pub emoji: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(bool, optional, tag = "3")]
        pub remove: ::core::option::Option<bool>,
    }
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Flags {
        None = 0,
        EndSession = 1,
        ExpirationTimerUpdate = 2,
        ProfileKeyUpdate = 4,
    }
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum MessageMode {
        Normal = 0,
        Confidential = 1,
    }
}
/// Identifies a message by its original sender and send time.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RealSource {
    #[prost(string, optional, tag = "1")]
    pub source: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint32, optional, tag = "2")]
    pub source_device: ::core::option::Option<u32>,
    #[prost(uint64, optional, tag = "3")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub server_timestamp: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "5")]
    pub sequence_id: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "6")]
    pub notify_sequence_id: ::core::option::Option<u64>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Card {
    #[prost(string, optional, tag = "1")]
    pub app_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "2")]
    pub card_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint32, optional, tag = "3")]
    pub version: ::core::option::Option<u32>,
    #[prost(string, optional, tag = "4")]
    pub creator: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint64, optional, tag = "5")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(string, optional, tag = "6")]
    pub content: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint32, optional, tag = "7")]
    pub content_type: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub r#type: ::core::option::Option<u32>,
    #[prost(bool, optional, tag = "9")]
    pub fixed_width: ::core::option::Option<bool>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttachmentPointer {
    #[prost(string, optional, tag = "1")]
    pub authorize_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "2")]
    pub content_type: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint32, optional, tag = "4")]
    pub size: ::core::option::Option<u32>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub digest: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(string, optional, tag = "6")]
    pub file_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint32, optional, tag = "7")]
    pub flags: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub width: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub height: ::core::option::Option<u32>,
    #[prost(string, optional, tag = "10")]
    pub caption: ::core::option::Option<::prost::alloc::string::String>,
}
/// Nested message and enum types in `AttachmentPointer`.
pub mod attachment_pointer {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Flags {
        None = 0,
        VoiceMessage = 1,
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupContext {
    /// One byte per UTF-16 code unit of the group id string.
    #[prost(bytes = "vec", optional, tag = "1")]
    pub id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "group_context::Type", optional, tag = "2")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "3")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "4")]
    pub members: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
/// Nested message and enum types in `GroupContext`.
pub mod group_context {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Unknown = 0,
        Update = 1,
        Deliver = 2,
        Quit = 3,
        RequestInfo = 4,
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SyncMessage {
    #[prost(message, optional, tag = "1")]
    pub sent: ::core::option::Option<sync_message::Sent>,
    #[prost(message, repeated, tag = "2")]
    pub read: ::prost::alloc::vec::Vec<sync_message::Read>,
    #[prost(message, optional, tag = "3")]
    pub mark_as_unread: ::core::option::Option<sync_message::MarkAsUnread>,
    #[prost(message, optional, tag = "4")]
    pub conversation_archive: ::core::option::Option<sync_message::ConversationArchive>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub padding: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}
/// Nested message and enum types in `SyncMessage`.
pub mod sync_message {
    /// Transcript of a message this account sent from another device.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Sent {
        #[prost(string, optional, tag = "1")]
        pub destination: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint64, optional, tag = "2")]
        pub timestamp: ::core::option::Option<u64>,
        #[prost(message, optional, tag = "3")]
        pub message: ::core::option::Option<super::DataMessage>,
        #[prost(uint64, optional, tag = "4")]
        pub expiration_start_timestamp: ::core::option::Option<u64>,
        #[prost(message, repeated, tag = "5")]
        pub rapid_files: ::prost::alloc::vec::Vec<super::data_message::RapidFile>,
        #[prost(uint64, optional, tag = "6")]
        pub server_timestamp: ::core::option::Option<u64>,
        #[prost(uint64, optional, tag = "7")]
        pub sequence_id: ::core::option::Option<u64>,
        #[prost(uint64, optional, tag = "8")]
        pub notify_sequence_id: ::core::option::Option<u64>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Read {
        #[prost(string, optional, tag = "1")]
        pub sender: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint64, optional, tag = "2")]
        pub timestamp: ::core::option::Option<u64>,
        #[prost(message, optional, tag = "3")]
        pub read_position: ::core::option::Option<super::ReadPosition>,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MarkAsUnread {
        #[prost(string, optional, tag = "1")]
        pub number: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(bytes = "vec", optional, tag = "2")]
        pub group_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(enumeration = "mark_as_unread::Flag", optional, tag = "3")]
        pub flag: ::core::option::Option<i32>,
    }
    /// Nested message and enum types in `MarkAsUnread`.
    pub mod mark_as_unread {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Flag {
            Clear = 0,
            Unread = 1,
            Read = 2,
        }
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConversationArchive {
        #[prost(string, optional, tag = "1")]
        pub number: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(bytes = "vec", optional, tag = "2")]
        pub group_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(enumeration = "conversation_archive::Flag", optional, tag = "3")]
        pub flag: ::core::option::Option<i32>,
    }
    /// Nested message and enum types in `ConversationArchive`.
    pub mod conversation_archive {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Flag {
            Unarchive = 0,
            Archive = 1,
        }
    }
}
/// Where the reader stopped in a conversation. Older receivers ignore it.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadPosition {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub group_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint64, optional, tag = "2")]
    pub read_at: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub max_server_timestamp: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub max_notify_sequence_id: ::core::option::Option<u64>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReceiptMessage {
    #[prost(enumeration = "receipt_message::Type", optional, tag = "1")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(uint64, repeated, packed = "false", tag = "2")]
    pub timestamp: ::prost::alloc::vec::Vec<u64>,
    #[prost(message, optional, tag = "3")]
    pub read_position: ::core::option::Option<ReadPosition>,
}
/// Nested message and enum types in `ReceiptMessage`.
pub mod receipt_message {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Delivery = 0,
        Read = 1,
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypingMessage {
    #[prost(uint64, optional, tag = "1")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(enumeration = "typing_message::Action", optional, tag = "2")]
    pub action: ::core::option::Option<i32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub group_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}
/// Nested message and enum types in `TypingMessage`.
pub mod typing_message {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Action {
        Started = 0,
        Stopped = 1,
    }
}
