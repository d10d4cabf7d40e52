//! Avatar provider seam.
//!
//! The only stateful external dependency. Everything the session layer needs
//! from a rendering provider fits four suspending operations plus an event
//! feed; [`crate::DidStreamsClient`] is the bundled implementation and tests
//! substitute mocks.

use avatar_voice_domain::{AvatarError, MediaStream, SessionCredentials};
use futures::channel::mpsc;
use futures::future::BoxFuture;

/// Opaque provider-assigned handle for one streaming session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderHandle {
    /// Stream identifier, scoped to the provider account.
    pub stream_id: String,
    /// Session token the provider requires back on every call.
    pub session_id: String,
}

/// Transport states the provider reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderConnectionState {
    Connecting,
    Connected,
    Failed,
    Closed,
}

/// Events pushed by the provider over the session's feed.
#[derive(Debug)]
pub enum ProviderEvent {
    /// The inbound media stream is ready to be rendered.
    MediaReady(MediaStream),
    /// Transport state changed.
    ConnectionState(ProviderConnectionState),
    /// Playback activity toggled (lip-sync rendering started/stopped).
    Playback { active: bool },
    /// The provider reported an error. Session-scoped errors are
    /// recoverable; transport errors are fatal.
    Error { error: AvatarError },
}

/// Result of a successful handshake.
pub struct ProviderSession {
    pub handle: ProviderHandle,
    pub events: mpsc::UnboundedReceiver<ProviderEvent>,
}

/// Narrow interface to the avatar-rendering service.
pub trait AvatarProvider: Send + Sync + 'static {
    /// Perform the handshake and return the session handle plus event feed.
    fn connect(
        &self,
        credentials: SessionCredentials,
    ) -> BoxFuture<'_, Result<ProviderSession, AvatarError>>;

    /// Send a publicly fetchable audio URL for synchronized playback and
    /// lip-sync. May fail with a session-scoped error.
    fn speak(&self, handle: ProviderHandle, audio_url: String)
    -> BoxFuture<'_, Result<(), AvatarError>>;

    /// Attempt to recover the same session after a session-scoped error.
    fn reconnect(&self, handle: ProviderHandle) -> BoxFuture<'_, Result<(), AvatarError>>;

    /// Tear the session down. Best-effort; errors are logged, not surfaced.
    fn disconnect(&self, handle: ProviderHandle) -> BoxFuture<'_, Result<(), AvatarError>>;
}
