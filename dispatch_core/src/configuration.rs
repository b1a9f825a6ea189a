use derive_builder::{Builder, UninitializedFieldError};
use dispatch_common::time::Duration;
use serde::Deserialize;

/// Forward chains nest at most this many levels, counting the top level list as one.
pub const MAX_FORWARD_DEPTH: usize = 4;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends are refused once the server has rejected this many signed pre key rotations.
pub const SIGNED_KEY_ROTATION_REJECT_THRESHOLD: u32 = 5;

/// Sync transcripts are padded with a random number of bytes up to this bound.
pub const MAX_SYNC_PADDING: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    UninitializedField(#[from] UninitializedFieldError),
    #[error("invalid dispatch configuration: {0}")]
    Invalid(String),
}

/// Protocol version in which each optional data message feature was introduced.
///
/// Receivers older than the computed version are expected to show an upgrade prompt
/// instead of rendering the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtocolVersions {
    pub baseline: u32,
    pub forward: u32,
    pub contact: u32,
    pub recall: u32,
    pub task: u32,
    pub vote: u32,
    pub card: u32,
    pub reaction: u32,
}

impl Default for ProtocolVersions {
    fn default() -> Self {
        Self {
            baseline: 0,
            forward: 2,
            contact: 2,
            recall: 3,
            task: 4,
            vote: 4,
            card: 5,
            reaction: 6,
        }
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(
    setter(into),
    build_fn(validate = "Self::validate", error = "ConfigError")
)]
pub struct DispatchConfig {
    /// How long one delivery job may run before it is abandoned.
    #[builder(default = "DEFAULT_SEND_TIMEOUT")]
    pub send_timeout: Duration,
    #[builder(default = "MAX_FORWARD_DEPTH")]
    pub max_forward_depth: usize,
    #[builder(default = "SIGNED_KEY_ROTATION_REJECT_THRESHOLD")]
    pub rotation_reject_threshold: u32,
    #[builder(default)]
    pub protocol_versions: ProtocolVersions,
}

impl DispatchConfig {
    pub fn builder() -> DispatchConfigBuilder {
        Default::default()
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            max_forward_depth: MAX_FORWARD_DEPTH,
            rotation_reject_threshold: SIGNED_KEY_ROTATION_REJECT_THRESHOLD,
            protocol_versions: ProtocolVersions::default(),
        }
    }
}

impl DispatchConfigBuilder {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.send_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Invalid("send_timeout must be non-zero".into()));
        }
        if self.max_forward_depth == Some(0) {
            return Err(ConfigError::Invalid(
                "max_forward_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
