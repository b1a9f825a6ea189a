//! The local account and its session store, as seen by the dispatcher.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("session store error: {0}")]
    Store(String),
}

/// Local identity state and session storage owned by the embedding client.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Identifier of the account this client is registered as.
    fn local_number(&self) -> String;
    /// Whether any other device is linked to this account.
    fn is_multi_device(&self) -> bool;
    /// Number of times the server refused a signed pre key rotation.
    fn signed_key_rotation_rejected(&self) -> u32;
    /// The user has opted in to sending despite rejected rotations.
    fn tunnel_security_forced(&self) -> bool;
    /// Drops every session held for all devices of `number`.
    async fn delete_all_sessions(&self, number: &str) -> Result<(), AccountError>;
}
