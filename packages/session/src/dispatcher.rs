//! Public speak entry point.

use std::sync::Arc;

use avatar_voice_domain::{AudioArtifact, GenerateSpeech, SpeakRequest};
use tracing::{debug, error};

use crate::SessionEvent;
use crate::connection::SpeakOutcome;
use crate::coordinator::SessionCoordinator;

/// Sequences audio generation and session dispatch for one utterance.
///
/// Invoked from surface event handlers, so nothing here returns an error:
/// completion and failure are both observed through the coordinator's event
/// feed. The dispatcher does not queue or order overlapping speaks; the
/// provider's own playback ordering governs when calls overlap.
#[derive(Clone)]
pub struct SpeakDispatcher {
    coordinator: Arc<SessionCoordinator>,
    speech: Arc<dyn GenerateSpeech>,
}

impl SpeakDispatcher {
    pub fn new(coordinator: Arc<SessionCoordinator>, speech: Arc<dyn GenerateSpeech>) -> Self {
        Self { coordinator, speech }
    }

    /// Fire-and-forget speak. Spawns the full pipeline and returns
    /// immediately; observe progress through the event feed.
    pub fn speak(&self, text: impl Into<String>) {
        let this = self.clone();
        let text = text.into();
        tokio::spawn(async move { this.speak_text(&text).await });
    }

    /// Generate audio for `text` and play it through the avatar.
    pub async fn speak_text(&self, text: &str) {
        let Some(session) = self.acquire().await else { return };

        let artifact = match self.speech.generate(text).await {
            Ok(artifact) => artifact,
            Err(err) => {
                // No audio URL, no speak attempt; the session is untouched.
                error!(%err, "speech generation failed");
                self.coordinator.events().emit(SessionEvent::Error {
                    error: err,
                    reconnect_attempted: false,
                });
                return;
            }
        };

        self.dispatch(SpeakRequest::new(artifact, session.generation()))
            .await;
    }

    /// Play a ready-made, publicly fetchable audio URL through the avatar,
    /// skipping generation.
    pub async fn speak_audio(&self, audio_url: impl Into<String>) {
        let Some(session) = self.acquire().await else { return };
        let artifact = AudioArtifact::new(audio_url, "audio/mpeg", 0);
        self.dispatch(SpeakRequest::new(artifact, session.generation()))
            .await;
    }

    async fn acquire(&self) -> Option<Arc<crate::AvatarSession>> {
        match self.coordinator.acquire().await {
            Ok(session) => Some(session),
            Err(err) => {
                error!(%err, "could not acquire avatar session");
                self.coordinator.events().emit(SessionEvent::Error {
                    error: err,
                    reconnect_attempted: false,
                });
                None
            }
        }
    }

    async fn dispatch(&self, request: SpeakRequest) {
        // Re-resolve the session rather than holding it across the audio
        // round trip: acquire is cheap once live, and the generation on the
        // request is the staleness authority.
        let Some(session) = self.coordinator.current() else {
            debug!(
                generation = %request.issued_against,
                "session gone before dispatch, dropping speak request"
            );
            return;
        };

        if session.generation() != request.issued_against {
            debug!(
                issued = %request.issued_against,
                live = %session.generation(),
                "session was reset since this request was issued, dropping it"
            );
            return;
        }

        let outcome = session.dispatch_speak(&request).await;

        match self.coordinator.current_generation() {
            Some(live) if live != request.issued_against => {
                // The session was reset while the speak was in flight; the
                // outcome targets a dead session and must not leak forward.
                debug!(
                    issued = %request.issued_against,
                    %live,
                    ?outcome,
                    "discarding speak outcome for a reset session"
                );
            }
            _ => match outcome {
                SpeakOutcome::Delivered | SpeakOutcome::DeliveredAfterReconnect => {
                    debug!(generation = %request.issued_against, ?outcome, "speak delivered");
                }
                SpeakOutcome::SessionReset => {
                    debug!(
                        generation = %request.issued_against,
                        "session reset; next speak will re-handshake"
                    );
                }
                SpeakOutcome::Rejected | SpeakOutcome::Failed => {
                    debug!(generation = %request.issued_against, ?outcome, "speak not delivered");
                }
            },
        }
    }
}
