//! Text → fetchable audio URL, in one call.

use avatar_voice_domain::{AudioArtifact, AvatarError, GenerateSpeech};
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::client::TtsClient;
use crate::storage::AudioStorage;

/// Composes TTS synthesis and storage upload into the speech-generation seam
/// the speak dispatcher consumes.
///
/// Each call is independent: synthesize, upload, return the artifact. The
/// dispatcher treats an upload failure identically to a synthesis failure;
/// either way there is no audio URL and no speak attempt.
#[derive(Clone)]
pub struct SpeechGenerator {
    tts: TtsClient,
    storage: AudioStorage,
}

impl SpeechGenerator {
    pub fn new(tts: TtsClient, storage: AudioStorage) -> Self {
        Self { tts, storage }
    }

    /// Build both clients from the environment.
    pub fn from_env() -> Result<Self, AvatarError> {
        Ok(Self::new(TtsClient::from_env()?, AudioStorage::from_env()?))
    }

    /// Generate audio for `text` and return its public artifact.
    pub async fn generate(&self, text: &str) -> Result<AudioArtifact, AvatarError> {
        let audio = self.tts.synthesize(text).await?;
        let byte_len = audio.len();
        let content_type = self.tts.content_type();
        let url = self.storage.upload(audio, content_type).await?;

        debug!(%url, byte_len, "audio artifact ready");
        Ok(AudioArtifact::new(url, content_type, byte_len))
    }
}

impl GenerateSpeech for SpeechGenerator {
    fn generate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<AudioArtifact, AvatarError>> {
        Box::pin(SpeechGenerator::generate(self, text))
    }
}
