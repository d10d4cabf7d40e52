//! Voice rendering parameters sent with each synthesis request.
use serde::{Deserialize, Serialize};

/// Synthesis knobs forwarded to the TTS backend.
///
/// Values are clamped to `0.0..=1.0` on construction. The defaults are tuned
/// for a conversational coaching voice: expressive but close to the source
/// voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Higher values keep the voice consistent at the cost of expressiveness.
    pub stability: f32,
    /// Higher values track the source voice more closely.
    pub similarity_boost: f32,
    /// Style exaggeration; moderate values read as conversational.
    pub style: f32,
    /// Boost similarity to the original speaker.
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.60,
            similarity_boost: 0.85,
            style: 0.40,
            use_speaker_boost: true,
        }
    }
}

impl VoiceSettings {
    pub fn new(stability: f32, similarity_boost: f32, style: f32, use_speaker_boost: bool) -> Self {
        Self {
            stability: stability.clamp(0.0, 1.0),
            similarity_boost: similarity_boost.clamp(0.0, 1.0),
            style: style.clamp(0.0, 1.0),
            use_speaker_boost,
        }
    }
}
