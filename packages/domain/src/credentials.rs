//! Connect-time inputs for the avatar provider.
use serde::{Deserialize, Serialize};

/// What the avatar should look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenterSource {
    /// Publicly accessible portrait image to animate.
    SourceImage(String),
    /// Provider-hosted presenter, e.g. `bank://lively/adult-woman`.
    Driver(String),
}

/// Credentials and presenter configuration for the provider handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    /// Provider API key. May already be in `user:password` form; a bare key
    /// gets an empty username when building Basic auth.
    pub api_key: String,
    /// Presenter to render.
    pub presenter: PresenterSource,
    /// Ask the provider to stream idle warmup video before the first audio.
    pub stream_warmup: bool,
}

impl SessionCredentials {
    pub fn new(api_key: impl Into<String>, presenter: PresenterSource) -> Self {
        Self {
            api_key: api_key.into(),
            presenter,
            stream_warmup: true,
        }
    }

    /// Disable the idle warmup video.
    pub fn without_warmup(mut self) -> Self {
        self.stream_warmup = false;
        self
    }
}
