//! # Avatar Voice Session
//!
//! Connection lifecycle, singleton coordination, and speech dispatch for the
//! real-time conversational avatar.
//!
//! One live provider session exists per [`SessionCoordinator`], no matter how
//! many consumers request it or how quickly they attach and detach. Consumers
//! observe the session through [`SessionEvent`]s and drive it through
//! [`SpeakDispatcher::speak`]; nothing in this crate throws across an async
//! boundary back into caller code.

use avatar_voice_domain::{AvatarError, MediaStream, SessionState};

mod connection;
mod coordinator;
mod did_client;
mod dispatcher;
mod events;
pub mod provider;

pub use connection::{AvatarSession, SpeakOutcome};
pub use coordinator::{CoordinatorConfig, SessionCoordinator};
pub use did_client::DidStreamsClient;
pub use dispatcher::SpeakDispatcher;
pub use events::EventBus;
pub use provider::{
    AvatarProvider, ProviderConnectionState, ProviderEvent, ProviderHandle, ProviderSession,
};

/// Discrete events broadcast to every subscribed consumer.
///
/// Failures are funneled here rather than thrown: one failed speak attempt
/// may freeze the stream, but it must never crash the surface that issued it.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum SessionEvent {
    /// The inbound media stream is available for rendering.
    MediaReady(MediaStream),
    /// The session moved to a new lifecycle state.
    StateChanged(SessionState),
    /// Provider-reported playback activity toggled.
    Streaming { active: bool },
    /// A failure was absorbed; `reconnect_attempted` records whether the
    /// recovery policy ran for it.
    Error {
        error: AvatarError,
        reconnect_attempted: bool,
    },
    /// The session ended and will be replaced on the next acquire.
    Disconnected { reason: String },
}
