//! Object-storage upload for generated audio.
//!
//! Generated audio is short-lived: it only needs to stay public long enough
//! for the avatar provider to fetch it once for lip-sync playback.

use avatar_voice_domain::AvatarError;
use bytes::Bytes;
use tracing::{debug, error};

const DEFAULT_BUCKET: &str = "temp-audio";

/// Storage backend configuration (Supabase-style object storage).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Bucket holding transient audio objects.
    pub bucket: String,
    /// `Cache-Control` max-age advertised on uploaded objects, in seconds.
    pub cache_seconds: u32,
}

impl StorageConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            cache_seconds: 300,
        }
    }
}

/// Uploads audio bytes and hands back the public URL the provider fetches.
#[derive(Clone)]
pub struct AudioStorage {
    inner: reqwest::Client,
    service_key: String,
    config: StorageConfig,
}

impl AudioStorage {
    /// Build a client from `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env() -> Result<Self, AvatarError> {
        let base_url = std::env::var("SUPABASE_URL").map_err(|_| {
            AvatarError::Configuration("storage not configured; set SUPABASE_URL".into())
        })?;
        let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY").map_err(|_| {
            AvatarError::Configuration(
                "storage not configured; set SUPABASE_SERVICE_ROLE_KEY".into(),
            )
        })?;
        Self::new(service_key, StorageConfig::new(base_url))
    }

    pub fn new(service_key: impl Into<String>, config: StorageConfig) -> Result<Self, AvatarError> {
        let inner = reqwest::Client::builder()
            .build()
            .map_err(|e| AvatarError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            service_key: service_key.into(),
            config,
        })
    }

    /// Upload one audio payload under a fresh object name and return its
    /// public URL.
    pub async fn upload(&self, audio: Bytes, content_type: &str) -> Result<String, AvatarError> {
        let name = object_name();
        let upload_url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, self.config.bucket, name
        );

        debug!(object = %name, bytes = audio.len(), "uploading audio artifact");

        let response = self
            .inner
            .post(&upload_url)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(
                reqwest::header::CACHE_CONTROL,
                format!("max-age={}", self.config.cache_seconds),
            )
            .body(audio)
            .send()
            .await
            .map_err(|e| AvatarError::Upload(format!("storage request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(%status, %detail, object = %name, "audio upload rejected");
            return Err(AvatarError::Upload(format!(
                "storage error {status}: {detail}"
            )));
        }

        Ok(self.public_url(&name))
    }

    /// Public, unauthenticated URL for an uploaded object.
    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url, self.config.bucket, name
        )
    }
}

/// Fresh object name per upload; artifacts are never reused across requests.
fn object_name() -> String {
    format!("coach-audio-{}.mp3", nanoid::nanoid!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_names_are_unique() {
        assert_ne!(object_name(), object_name());
    }

    #[test]
    fn public_url_points_into_the_public_namespace() {
        let storage = AudioStorage::new(
            "service-key",
            StorageConfig::new("https://project.supabase.co"),
        )
        .unwrap();
        let url = storage.public_url("coach-audio-abc.mp3");
        assert_eq!(
            url,
            "https://project.supabase.co/storage/v1/object/public/temp-audio/coach-audio-abc.mp3"
        );
    }
}
