//! ElevenLabs-style TTS HTTP client.

use std::time::Duration;

use avatar_voice_domain::{AvatarError, ModelId, VoiceId, VoiceSettings};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error};

const XI_API_KEY_HEADER: &str = "xi-api-key";
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Emma, the coaching voice the product ships with.
const DEFAULT_VOICE_ID: &str = "OlBRrVAItyi00MuGMbna";

/// Longest text one synthesis request accepts.
const MAX_TEXT_LEN: usize = 5_000;

/// Synthesis configuration.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Voice to synthesize with.
    pub voice: VoiceId,
    /// Model to request.
    pub model: ModelId,
    /// Rendering parameters.
    pub settings: VoiceSettings,
    /// Force a spoken language instead of auto-detection.
    pub language_code: Option<String>,
    /// Latency/quality trade-off, 0..=4. 4 is maximum speed.
    pub optimize_streaming_latency: u8,
    /// Deadline for one synthesis round trip. A slow TTS backend must not
    /// hang the speak dispatcher indefinitely.
    pub timeout: Duration,
    /// API base URL; overridable for tests.
    pub base_url: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: VoiceId::new(DEFAULT_VOICE_ID),
            model: ModelId::default(),
            settings: VoiceSettings::default(),
            language_code: Some("nl".to_string()),
            optimize_streaming_latency: 4,
            timeout: Duration::from_secs(30),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'static str,
    voice_settings: &'a VoiceSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'a str>,
    optimize_streaming_latency: u8,
}

/// HTTP client for the TTS backend.
#[derive(Clone)]
pub struct TtsClient {
    inner: reqwest::Client,
    api_key: String,
    config: TtsConfig,
}

impl TtsClient {
    /// Build a client from the conventional environment variables.
    pub fn from_env() -> Result<Self, AvatarError> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .or_else(|_| std::env::var("ELEVEN_API_KEY"))
            .or_else(|_| std::env::var("ELEVEN_LABS_API_KEY"))
            .map_err(|_| {
                AvatarError::Configuration(
                    "no TTS API key found; set ELEVENLABS_API_KEY, ELEVEN_API_KEY, or \
                     ELEVEN_LABS_API_KEY"
                        .into(),
                )
            })?;
        Self::new(api_key, TtsConfig::default())
    }

    pub fn new(api_key: impl Into<String>, config: TtsConfig) -> Result<Self, AvatarError> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AvatarError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            api_key: api_key.into(),
            config,
        })
    }

    /// Synthesize `text` into audio bytes.
    ///
    /// Non-2xx responses and timeouts surface as [`AvatarError::Generation`]
    /// / [`AvatarError::Timeout`]; no retry is attempted here.
    pub async fn synthesize(&self, text: &str) -> Result<Bytes, AvatarError> {
        if text.trim().is_empty() {
            return Err(AvatarError::Generation("no text provided".into()));
        }
        if text.len() > MAX_TEXT_LEN {
            return Err(AvatarError::Generation(format!(
                "text too long ({} chars, max {MAX_TEXT_LEN})",
                text.len()
            )));
        }

        let url = format!(
            "{}/v1/text-to-speech/{}/stream",
            self.config.base_url,
            self.config.voice.id()
        );
        let body = SynthesisBody {
            text,
            model_id: self.config.model.as_str(),
            voice_settings: &self.config.settings,
            language_code: self.config.language_code.as_deref(),
            optimize_streaming_latency: self.config.optimize_streaming_latency,
        };

        debug!(voice = %self.config.voice.id(), chars = text.len(), "requesting synthesis");

        let request = self
            .inner
            .post(&url)
            .header(XI_API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send();

        let response = tokio::time::timeout(self.config.timeout, request)
            .await
            .map_err(|_| AvatarError::Timeout(self.config.timeout))?
            .map_err(|e| {
                if e.is_timeout() {
                    AvatarError::Timeout(self.config.timeout)
                } else {
                    AvatarError::Generation(format!("TTS request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(%status, %detail, "TTS backend rejected synthesis");
            return Err(AvatarError::Generation(format!(
                "TTS API error {status}: {detail}"
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AvatarError::Generation(format!("failed to read audio body: {e}")))
    }

    /// MIME type of the audio this client produces.
    pub fn content_type(&self) -> &'static str {
        "audio/mpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_network() {
        let client = TtsClient::new("key", TtsConfig::default()).unwrap();
        let err = client.synthesize("   ").await.unwrap_err();
        assert!(matches!(err, AvatarError::Generation(_)));
    }

    #[tokio::test]
    async fn oversized_text_is_rejected_before_any_network() {
        let client = TtsClient::new("key", TtsConfig::default()).unwrap();
        let text = "a".repeat(MAX_TEXT_LEN + 1);
        let err = client.synthesize(&text).await.unwrap_err();
        assert!(matches!(err, AvatarError::Generation(_)));
    }

    #[test]
    fn synthesis_body_serializes_wire_names() {
        let settings = VoiceSettings::default();
        let body = SynthesisBody {
            text: "hallo",
            model_id: ModelId::ElevenFlashV2_5.as_str(),
            voice_settings: &settings,
            language_code: Some("nl"),
            optimize_streaming_latency: 4,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model_id"], "eleven_flash_v2_5");
        assert_eq!(json["language_code"], "nl");
        assert_eq!(json["voice_settings"]["use_speaker_boost"], true);
    }
}
