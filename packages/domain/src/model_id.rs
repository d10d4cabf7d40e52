//! TTS model selector.
use serde::{Deserialize, Serialize};

/// Speech-synthesis model to request from the TTS backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    /// Lowest-latency model; the default for conversational playback.
    ElevenFlashV2_5,
    /// Higher-quality multilingual model.
    ElevenMultilingualV2,
    /// Turbo model, latency/quality middle ground.
    ElevenTurboV2_5,
}

impl ModelId {
    /// Wire identifier understood by the TTS API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::ElevenFlashV2_5 => "eleven_flash_v2_5",
            ModelId::ElevenMultilingualV2 => "eleven_multilingual_v2",
            ModelId::ElevenTurboV2_5 => "eleven_turbo_v2_5",
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::ElevenFlashV2_5
    }
}
