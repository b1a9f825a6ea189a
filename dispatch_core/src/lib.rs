#![warn(clippy::unwrap_used)]

pub mod account;
pub mod attachments;
pub mod configuration;
pub mod dispatcher;
pub mod encoder;
mod error;
pub mod messages;
pub mod queue;

pub use account::{AccountError, AccountStore};
pub use configuration::{DispatchConfig, ProtocolVersions};
pub use dispatcher::{Conversation, DeliveryOptions, MessageSender, PendingEnvelope, SendResult};
pub use error::DispatchError;

#[cfg(test)]
#[ctor::ctor]
fn _setup() {
    dispatch_common::logger()
}
