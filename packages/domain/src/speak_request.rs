//! One instruction to render audio through the avatar.
use crate::{audio_artifact::AudioArtifact, generation::Generation};

/// An ephemeral speak instruction: the audio to play plus the session
/// generation it was issued against.
///
/// Requests whose generation no longer matches the live session are dropped
/// at delivery with a log line, never an error.
#[derive(Debug, Clone)]
pub struct SpeakRequest {
    /// The audio to render with lip-sync.
    pub audio: AudioArtifact,
    /// Generation of the session this request targets.
    pub issued_against: Generation,
}

impl SpeakRequest {
    pub fn new(audio: AudioArtifact, issued_against: Generation) -> Self {
        Self {
            audio,
            issued_against,
        }
    }
}
