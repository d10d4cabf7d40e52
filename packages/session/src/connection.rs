//! The single live connection to the avatar provider.

use std::sync::Arc;

use avatar_voice_domain::{
    AvatarError, Generation, MediaStream, ReconnectPolicy, SessionCredentials, SessionState,
    SpeakRequest, StateInput,
};
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::events::EventBus;
use crate::provider::{AvatarProvider, ProviderConnectionState, ProviderEvent, ProviderHandle};
use crate::SessionEvent;

/// What happened to one dispatched speak command.
///
/// Informational only: every failure path has already been reported through
/// the event bus by the time this is returned, and callers are free to drop
/// it (the dispatcher does exactly that when the result turns out stale).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// The provider accepted the audio.
    Delivered,
    /// The provider accepted the audio after one successful reconnect.
    DeliveredAfterReconnect,
    /// Precondition violation; the provider was never contacted.
    Rejected,
    /// The speak failed and no reset was triggered.
    Failed,
    /// The reconnect budget is exhausted; this session is dead and the next
    /// acquire will perform a full fresh handshake.
    SessionReset,
}

/// One logical streaming session.
///
/// Created only by the coordinator; consumers hold it behind `Arc` and must
/// not tear it down on their own detach. The session survives consumer churn
/// deliberately and dies only on explicit shutdown or unrecoverable failure.
pub struct AvatarSession {
    provider: Arc<dyn AvatarProvider>,
    handle: ProviderHandle,
    generation: Generation,
    policy: ReconnectPolicy,
    state: Mutex<SessionState>,
    media: Mutex<Option<MediaStream>>,
    events: Arc<EventBus>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl AvatarSession {
    /// Perform the provider handshake and start the event pump.
    pub(crate) async fn start(
        provider: Arc<dyn AvatarProvider>,
        credentials: SessionCredentials,
        generation: Generation,
        policy: ReconnectPolicy,
        events: Arc<EventBus>,
    ) -> Result<Arc<Self>, AvatarError> {
        debug!(%generation, "starting avatar session handshake");
        events.emit(SessionEvent::StateChanged(SessionState::Connecting));

        let provider_session = provider.connect(credentials).await.map_err(|err| {
            error!(%generation, %err, "handshake failed");
            err
        })?;

        let session = Arc::new(Self {
            provider,
            handle: provider_session.handle,
            generation,
            policy,
            state: Mutex::new(SessionState::Uninitialized.apply(StateInput::HandshakeStarted)),
            media: Mutex::new(None),
            events,
            pump: Mutex::new(None),
        });

        let weak = Arc::downgrade(&session);
        let mut feed = provider_session.events;
        let pump = tokio::spawn(async move {
            while let Some(event) = feed.next().await {
                let Some(session) = weak.upgrade() else { break };
                session.handle_provider_event(event);
            }
        });
        *session.pump.lock() = Some(pump);

        Ok(session)
    }

    /// Generation marker stamped by the coordinator.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// The inbound media stream, once the provider has announced it.
    pub fn media_stream(&self) -> Option<MediaStream> {
        self.media.lock().clone()
    }

    /// Whether the coordinator may still hand this session out.
    pub fn is_usable(&self) -> bool {
        !self.state().is_terminal()
    }

    /// Send one audio URL to the provider for synchronized playback.
    ///
    /// Implements the reconnect-then-escalate policy: a session-scoped
    /// failure gets up to [`ReconnectPolicy::attempts`] reconnects against
    /// the same handle; on recovery the original speak is retried exactly
    /// once; on exhaustion the session is marked dead. Failures are emitted
    /// as events, never returned as errors.
    pub async fn dispatch_speak(&self, request: &SpeakRequest) -> SpeakOutcome {
        let state = self.state();
        if !state.accepts_speak() {
            warn!(generation = %self.generation, ?state, "speak rejected: session does not accept commands");
            self.events.emit(SessionEvent::Error {
                error: AvatarError::SessionScoped(format!(
                    "speak rejected in state {state:?}"
                )),
                reconnect_attempted: false,
            });
            return SpeakOutcome::Rejected;
        }

        let url = request.audio.url.clone();
        debug!(generation = %self.generation, %url, "dispatching speak");

        let err = match self.provider.speak(self.handle.clone(), url.clone()).await {
            Ok(()) => return SpeakOutcome::Delivered,
            Err(err) => err,
        };

        if !err.is_session_scoped() {
            error!(generation = %self.generation, %err, ?state, "speak failed without a recovery path");
            self.events.emit(SessionEvent::Error {
                error: err.clone(),
                reconnect_attempted: false,
            });
            if err.is_fatal() {
                self.transition(StateInput::TransportFailed);
                self.events.emit(SessionEvent::Disconnected {
                    reason: format!("fatal transport error: {err}"),
                });
            }
            return SpeakOutcome::Failed;
        }

        warn!(generation = %self.generation, %err, "session-scoped speak failure, attempting reconnect");
        self.transition(StateInput::SessionFault);

        if self.try_reconnect().await {
            self.transition(StateInput::ReconnectRecovered);
            match self.provider.speak(self.handle.clone(), url).await {
                Ok(()) => {
                    debug!(generation = %self.generation, "speak retried successfully after reconnect");
                    SpeakOutcome::DeliveredAfterReconnect
                }
                Err(retry_err) => {
                    // One retry only; a second failure is reported and left
                    // for the next speak call to recover from.
                    error!(generation = %self.generation, %retry_err, "retried speak failed after reconnect");
                    self.events.emit(SessionEvent::Error {
                        error: retry_err,
                        reconnect_attempted: true,
                    });
                    SpeakOutcome::Failed
                }
            }
        } else {
            warn!(
                generation = %self.generation,
                attempts = self.policy.attempts,
                "reconnect budget exhausted, session will be replaced on next acquire"
            );
            self.transition(StateInput::ReconnectExhausted);
            self.events.emit(SessionEvent::Error {
                error: err,
                reconnect_attempted: true,
            });
            self.events.emit(SessionEvent::Disconnected {
                reason: "reconnect budget exhausted".to_string(),
            });
            SpeakOutcome::SessionReset
        }
    }

    /// Run the reconnect budget against the same provider handle.
    async fn try_reconnect(&self) -> bool {
        for attempt in 1..=self.policy.attempts {
            match self.provider.reconnect(self.handle.clone()).await {
                Ok(()) => {
                    debug!(generation = %self.generation, attempt, "reconnect succeeded");
                    return true;
                }
                Err(err) => {
                    warn!(generation = %self.generation, attempt, %err, "reconnect attempt failed");
                }
            }
        }
        false
    }

    /// Explicit teardown. Idempotent: a second call is a no-op.
    pub async fn disconnect(&self, reason: &str) {
        if self.transition(StateInput::Teardown).is_none() {
            debug!(generation = %self.generation, "disconnect on terminal session ignored");
            return;
        }

        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
        if let Err(err) = self.provider.disconnect(self.handle.clone()).await {
            warn!(generation = %self.generation, %err, "provider disconnect failed");
        }
        self.events.emit(SessionEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    /// Apply one state-machine input, broadcasting the new state when it
    /// actually changed.
    fn transition(&self, input: StateInput) -> Option<SessionState> {
        let next = {
            let mut state = self.state.lock();
            let next = state.apply(input);
            if next == *state {
                return None;
            }
            *state = next;
            next
        };
        self.events.emit(SessionEvent::StateChanged(next));
        Some(next)
    }

    fn handle_provider_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::MediaReady(stream) => {
                debug!(generation = %self.generation, stream_id = %stream.stream_id, "media stream ready");
                *self.media.lock() = Some(stream.clone());
                self.events.emit(SessionEvent::MediaReady(stream));
            }
            ProviderEvent::ConnectionState(ProviderConnectionState::Connecting) => {
                debug!(generation = %self.generation, "provider negotiating transport");
            }
            ProviderEvent::ConnectionState(ProviderConnectionState::Connected) => {
                self.transition(StateInput::TransportLive);
            }
            ProviderEvent::ConnectionState(state @ ProviderConnectionState::Failed)
            | ProviderEvent::ConnectionState(state @ ProviderConnectionState::Closed) => {
                error!(generation = %self.generation, ?state, "transport lost");
                self.events.emit(SessionEvent::Error {
                    error: AvatarError::Transport(format!("connection lost ({state:?})")),
                    reconnect_attempted: false,
                });
                self.transition(StateInput::TransportFailed);
                self.events.emit(SessionEvent::Disconnected {
                    reason: format!("transport {state:?}"),
                });
            }
            ProviderEvent::Playback { active } => {
                self.transition(if active {
                    StateInput::PlaybackStarted
                } else {
                    StateInput::PlaybackStopped
                });
                self.events.emit(SessionEvent::Streaming { active });
            }
            ProviderEvent::Error { error } if error.is_session_scoped() => {
                // Recoverable: degrade quietly and let the next speak run
                // the reconnect policy. No error event for these.
                warn!(generation = %self.generation, %error, "session-scoped provider error, will reconnect on next speak");
                self.transition(StateInput::SessionFault);
            }
            ProviderEvent::Error { error } => {
                error!(generation = %self.generation, %error, "provider error");
                self.events.emit(SessionEvent::Error {
                    error: error.clone(),
                    reconnect_attempted: false,
                });
                if error.is_fatal() {
                    self.transition(StateInput::TransportFailed);
                    self.events.emit(SessionEvent::Disconnected {
                        reason: format!("fatal transport error: {error}"),
                    });
                }
            }
        }
    }
}

impl Drop for AvatarSession {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }
}
