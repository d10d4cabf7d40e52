//! Transient generated-audio handle.
use serde::{Deserialize, Serialize};

/// A publicly fetchable URL produced by the speech generator and storage
/// step for a single speak request.
///
/// Artifacts carry no identity beyond the request that produced them and are
/// never reused across speak requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Publicly fetchable audio URL.
    pub url: String,
    /// MIME type of the stored audio.
    pub content_type: String,
    /// Size of the uploaded payload in bytes.
    pub byte_len: usize,
}

impl AudioArtifact {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>, byte_len: usize) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            byte_len,
        }
    }
}
