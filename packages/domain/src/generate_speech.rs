//! Speech-generation seam.
use futures_util::future::BoxFuture;

use crate::{audio_artifact::AudioArtifact, avatar_error::AvatarError};

/// Turns input text into a playable, publicly fetchable audio artifact.
///
/// Pure request/response; implementations hold no state across calls. The
/// speak dispatcher depends on this trait rather than a concrete TTS stack
/// so tests can substitute a canned generator.
pub trait GenerateSpeech: Send + Sync {
    /// Generate audio for `text` and return its artifact.
    fn generate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<AudioArtifact, AvatarError>>;
}
