//! Unified error for the avatar session stack.
use thiserror::Error;

/// Top-level error covering speech generation, storage, and the avatar
/// provider session.
///
/// The enum is `Clone` so a single handshake failure can be fanned out to
/// every caller awaiting the same pending initialization.
#[derive(Debug, Clone, Error)]
pub enum AvatarError {
    /// Speech-generation failure reason (TTS backend unreachable or slow).
    #[error("speech generation: {0}")]
    Generation(String),
    /// Audio upload failure reason (storage unreachable or rejected).
    #[error("audio upload: {0}")]
    Upload(String),
    /// Provider-reported failure tied to the current session or token.
    /// Recoverable via reconnect.
    #[error("session: {0}")]
    SessionScoped(String),
    /// Hard transport failure reported by the provider. Not retried.
    #[error("transport: {0}")]
    Transport(String),
    /// The initial connect sequence itself failed.
    #[error("handshake: {0}")]
    Handshake(String),
    /// Configuration-related failure reason (missing keys, bad URLs).
    #[error("configuration: {0}")]
    Configuration(String),
    /// A bounded operation exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl AvatarError {
    /// Whether this failure is tied to the current provider session and a
    /// reconnect against the same handle may recover it.
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, Self::SessionScoped(_))
    }

    /// Whether this failure terminates the session outright.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
