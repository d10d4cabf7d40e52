//! Session connection state machine.
//!
//! The session lifecycle is a tagged state value plus a pure transition
//! function, so tests can assert transitions without a live connection.

use serde::{Deserialize, Serialize};

/// Connection state of the single avatar session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No handshake has been started yet.
    Uninitialized,
    /// Handshake in flight.
    Connecting,
    /// Transport is live; media stream available.
    Connected,
    /// Provider is actively rendering playback.
    Streaming,
    /// Connected with no active playback.
    Idle,
    /// A session-scoped fault was reported; recoverable via reconnect.
    Degraded,
    /// Terminal. No further operations are accepted.
    Disconnected,
}

/// Inputs that drive the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateInput {
    /// The coordinator started a handshake.
    HandshakeStarted,
    /// Provider confirmed the transport is live.
    TransportLive,
    /// Provider reported playback activity.
    PlaybackStarted,
    /// Provider reported playback stopped.
    PlaybackStopped,
    /// Provider reported a session-scoped error.
    SessionFault,
    /// A reconnect attempt against the same handle succeeded.
    ReconnectRecovered,
    /// The reconnect budget is exhausted; the session object is dead and
    /// will be replaced on the next acquire.
    ReconnectExhausted,
    /// Provider reported a fatal transport failure or closed unexpectedly.
    TransportFailed,
    /// Explicit teardown.
    Teardown,
}

impl SessionState {
    /// Apply one input and return the resulting state.
    ///
    /// Inputs that make no sense in the current state leave it unchanged:
    /// playback toggles are purely observational and must never move the
    /// machine out of `Degraded` or a terminal state.
    pub fn apply(self, input: StateInput) -> SessionState {
        use SessionState::*;
        use StateInput::*;

        match (self, input) {
            (Disconnected, _) => Disconnected,
            (_, Teardown) | (_, TransportFailed) => Disconnected,
            (Uninitialized, HandshakeStarted) => Connecting,
            (Connecting, TransportLive) => Connected,
            (Connected | Idle, PlaybackStarted) => Streaming,
            (Streaming, PlaybackStopped) => Idle,
            (Connecting | Connected | Streaming | Idle, SessionFault) => Degraded,
            (Degraded, ReconnectRecovered) => Connected,
            (Degraded, ReconnectExhausted) => Disconnected,
            (state, _) => state,
        }
    }

    /// Whether a speak command may be dispatched in this state.
    pub fn accepts_speak(&self) -> bool {
        !matches!(self, SessionState::Uninitialized | SessionState::Disconnected)
    }

    /// Whether the session can still make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Disconnected)
    }

    /// Whether the transport is currently usable without recovery.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SessionState::Connected | SessionState::Streaming | SessionState::Idle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;
    use super::StateInput::*;

    #[test]
    fn happy_path_reaches_connected() {
        let state = Uninitialized.apply(HandshakeStarted).apply(TransportLive);
        assert_eq!(state, Connected);
    }

    #[test]
    fn playback_toggles_between_streaming_and_idle() {
        let state = Connected.apply(PlaybackStarted);
        assert_eq!(state, Streaming);
        let state = state.apply(PlaybackStopped);
        assert_eq!(state, Idle);
        assert_eq!(state.apply(PlaybackStarted), Streaming);
    }

    #[test]
    fn session_fault_degrades_from_any_live_state() {
        for state in [Connecting, Connected, Streaming, Idle] {
            assert_eq!(state.apply(SessionFault), Degraded);
        }
    }

    #[test]
    fn degraded_recovers_or_dies() {
        assert_eq!(Degraded.apply(ReconnectRecovered), Connected);
        assert_eq!(Degraded.apply(ReconnectExhausted), Disconnected);
    }

    #[test]
    fn playback_events_do_not_resurrect_degraded() {
        assert_eq!(Degraded.apply(PlaybackStarted), Degraded);
        assert_eq!(Degraded.apply(PlaybackStopped), Degraded);
    }

    #[test]
    fn disconnected_is_absorbing() {
        let dead = Connected.apply(TransportFailed);
        assert_eq!(dead, Disconnected);
        assert_eq!(dead.apply(TransportLive), Disconnected);
        assert_eq!(dead.apply(SessionFault), Disconnected);
        assert!(!dead.accepts_speak());
    }

    #[test]
    fn teardown_terminates_from_anywhere() {
        for state in [Uninitialized, Connecting, Connected, Streaming, Idle, Degraded] {
            assert_eq!(state.apply(Teardown), Disconnected);
        }
    }

    #[test]
    fn speak_precondition() {
        assert!(!Uninitialized.accepts_speak());
        assert!(Connecting.accepts_speak());
        assert!(Connected.accepts_speak());
        assert!(Degraded.accepts_speak());
        assert!(!Disconnected.accepts_speak());
    }
}
