//! D-ID-style streams API client.
//!
//! Implements [`AvatarProvider`] against a `/talks/streams` REST surface:
//! create (the handshake), talk (speak), ICE restart (reconnect), delete
//! (disconnect). The WebRTC answer itself is the presentation layer's job;
//! this client only carries the signalling material out in [`MediaStream`].

use std::time::Duration;

use avatar_voice_domain::{
    AvatarError, IceServer, MediaStream, PresenterSource, SessionCredentials,
};
use base64::Engine as _;
use futures::channel::mpsc;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::{
    AvatarProvider, ProviderConnectionState, ProviderEvent, ProviderHandle, ProviderSession,
};

const DID_API_BASE: &str = "https://api.d-id.com";

/// Driver bank used for audio-driven playback.
const DEFAULT_DRIVER_URL: &str = "bank://lively/";

/// REST client for a D-ID-style avatar streams API.
pub struct DidStreamsClient {
    inner: reqwest::Client,
    base_url: String,
    // Basic-auth header captured at connect; later calls only get a handle.
    auth: Mutex<Option<String>>,
}

impl DidStreamsClient {
    pub fn new() -> Result<Self, AvatarError> {
        Self::with_base_url(DID_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AvatarError> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AvatarError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url: base_url.into(),
            auth: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn auth_header(&self) -> Result<String, AvatarError> {
        self.auth
            .lock()
            .clone()
            .ok_or_else(|| AvatarError::SessionScoped("no session has been connected".into()))
    }
}

/// Basic auth the way the streams API expects it: `user:password`, where a
/// bare API key becomes the password with an empty username.
fn basic_auth(api_key: &str) -> String {
    let credentials = if api_key.contains(':') {
        api_key.to_string()
    } else {
        format!(":{api_key}")
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    format!("Basic {encoded}")
}

/// 4xx means the session or token is no longer valid and a reconnect may
/// recover it; 5xx and transport-level failures are fatal.
fn classify_status(status: reqwest::StatusCode, detail: String) -> AvatarError {
    if status.is_client_error() {
        AvatarError::SessionScoped(format!("provider rejected request ({status}): {detail}"))
    } else {
        AvatarError::Transport(format!("provider error ({status}): {detail}"))
    }
}

fn request_error(err: reqwest::Error) -> AvatarError {
    AvatarError::Transport(format!("provider request failed: {err}"))
}

#[derive(Serialize)]
struct CreateStreamBody {
    stream_warmup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    driver_url: Option<String>,
}

#[derive(Deserialize)]
struct CreateStreamResponse {
    id: String,
    session_id: String,
    offer: SdpOffer,
    #[serde(default)]
    ice_servers: Vec<IceServerWire>,
}

#[derive(Deserialize)]
struct SdpOffer {
    sdp: String,
}

/// The wire format allows a single URL or a list.
#[derive(Deserialize)]
struct IceServerWire {
    urls: OneOrMany,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    credential: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<IceServerWire> for IceServer {
    fn from(wire: IceServerWire) -> Self {
        IceServer {
            urls: match wire.urls {
                OneOrMany::One(url) => vec![url],
                OneOrMany::Many(urls) => urls,
            },
            username: wire.username,
            credential: wire.credential,
        }
    }
}

#[derive(Serialize)]
struct Script<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    audio_url: &'a str,
}

#[derive(Serialize)]
struct SpeakBody<'a> {
    script: Script<'a>,
    driver_url: &'static str,
    config: PlaybackConfig,
    session_id: &'a str,
}

#[derive(Serialize)]
struct PlaybackConfig {
    stitch: bool,
}

#[derive(Serialize)]
struct SessionBody<'a> {
    session_id: &'a str,
}

impl AvatarProvider for DidStreamsClient {
    fn connect(
        &self,
        credentials: SessionCredentials,
    ) -> BoxFuture<'_, Result<ProviderSession, AvatarError>> {
        Box::pin(async move {
            let auth = basic_auth(&credentials.api_key);

            let (source_url, driver_url) = match credentials.presenter {
                PresenterSource::SourceImage(url) => (Some(url), None),
                PresenterSource::Driver(url) => (None, Some(url)),
            };
            let body = CreateStreamBody {
                stream_warmup: credentials.stream_warmup,
                source_url,
                driver_url,
            };

            debug!("creating avatar stream");
            let response = self
                .inner
                .post(self.endpoint("/talks/streams"))
                .header(reqwest::header::AUTHORIZATION, &auth)
                .json(&body)
                .send()
                .await
                .map_err(|e| AvatarError::Handshake(format!("stream creation failed: {e}")))?;

            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                return Err(AvatarError::Handshake(format!(
                    "stream creation rejected ({status}): {detail}"
                )));
            }

            let stream: CreateStreamResponse = response
                .json()
                .await
                .map_err(|e| AvatarError::Handshake(format!("malformed stream response: {e}")))?;

            *self.auth.lock() = Some(auth);

            let media = MediaStream {
                stream_id: stream.id.clone(),
                session_id: stream.session_id.clone(),
                sdp_offer: stream.offer.sdp,
                ice_servers: stream.ice_servers.into_iter().map(IceServer::from).collect(),
            };
            let handle = ProviderHandle {
                stream_id: stream.id,
                session_id: stream.session_id,
            };

            debug!(stream_id = %handle.stream_id, "avatar stream created");

            // The REST surface has no push channel; transport readiness and
            // the signalling material are delivered as the initial events.
            let (tx, rx) = mpsc::unbounded();
            let _ = tx.unbounded_send(ProviderEvent::ConnectionState(
                ProviderConnectionState::Connected,
            ));
            let _ = tx.unbounded_send(ProviderEvent::MediaReady(media));

            Ok(ProviderSession { handle, events: rx })
        })
    }

    fn speak(
        &self,
        handle: ProviderHandle,
        audio_url: String,
    ) -> BoxFuture<'_, Result<(), AvatarError>> {
        Box::pin(async move {
            let auth = self.auth_header()?;
            let body = SpeakBody {
                script: Script {
                    kind: "audio",
                    audio_url: &audio_url,
                },
                driver_url: DEFAULT_DRIVER_URL,
                config: PlaybackConfig { stitch: true },
                session_id: &handle.session_id,
            };

            let response = self
                .inner
                .post(self.endpoint(&format!("/talks/streams/{}", handle.stream_id)))
                .header(reqwest::header::AUTHORIZATION, &auth)
                // Session stickiness: the provider routes by cookie.
                .header(reqwest::header::COOKIE, &handle.session_id)
                .json(&body)
                .send()
                .await
                .map_err(request_error)?;

            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                return Err(classify_status(status, detail));
            }

            debug!(stream_id = %handle.stream_id, "audio accepted for playback");
            Ok(())
        })
    }

    fn reconnect(&self, handle: ProviderHandle) -> BoxFuture<'_, Result<(), AvatarError>> {
        Box::pin(async move {
            let auth = self.auth_header()?;
            let body = SessionBody {
                session_id: &handle.session_id,
            };

            debug!(stream_id = %handle.stream_id, "requesting ICE restart");
            let response = self
                .inner
                .post(self.endpoint(&format!("/talks/streams/{}/ice", handle.stream_id)))
                .header(reqwest::header::AUTHORIZATION, &auth)
                .header(reqwest::header::COOKIE, &handle.session_id)
                .json(&body)
                .send()
                .await
                .map_err(request_error)?;

            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                return Err(classify_status(status, detail));
            }

            Ok(())
        })
    }

    fn disconnect(&self, handle: ProviderHandle) -> BoxFuture<'_, Result<(), AvatarError>> {
        Box::pin(async move {
            let auth = self.auth_header()?;
            let body = SessionBody {
                session_id: &handle.session_id,
            };

            let response = self
                .inner
                .delete(self.endpoint(&format!("/talks/streams/{}", handle.stream_id)))
                .header(reqwest::header::AUTHORIZATION, &auth)
                .header(reqwest::header::COOKIE, &handle.session_id)
                .json(&body)
                .send()
                .await
                .map_err(request_error)?;

            if !response.status().is_success() {
                // Teardown is best-effort; the stream expires server-side
                // anyway.
                warn!(
                    stream_id = %handle.stream_id,
                    status = %response.status(),
                    "stream deletion rejected"
                );
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_api_key_gets_an_empty_username() {
        assert_eq!(
            basic_auth("secret"),
            format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(":secret")
            )
        );
    }

    #[test]
    fn user_password_keys_pass_through() {
        assert_eq!(
            basic_auth("user:secret"),
            format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode("user:secret")
            )
        );
    }

    #[test]
    fn ice_servers_accept_single_and_multiple_urls() {
        let json = r#"{
            "id": "strm_1",
            "session_id": "sess_1",
            "offer": { "type": "offer", "sdp": "v=0" },
            "ice_servers": [
                { "urls": "stun:stun.example.com" },
                { "urls": ["turn:turn.example.com"], "username": "u", "credential": "c" }
            ]
        }"#;
        let parsed: CreateStreamResponse = serde_json::from_str(json).unwrap();
        let servers: Vec<IceServer> = parsed.ice_servers.into_iter().map(IceServer::from).collect();
        assert_eq!(servers[0].urls, vec!["stun:stun.example.com"]);
        assert_eq!(servers[1].username.as_deref(), Some("u"));
    }

    #[test]
    fn speak_body_matches_the_wire_shape() {
        let body = SpeakBody {
            script: Script {
                kind: "audio",
                audio_url: "https://storage.example/clip.mp3",
            },
            driver_url: DEFAULT_DRIVER_URL,
            config: PlaybackConfig { stitch: true },
            session_id: "sess_1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["script"]["type"], "audio");
        assert_eq!(json["script"]["audio_url"], "https://storage.example/clip.mp3");
        assert_eq!(json["config"]["stitch"], true);
        assert_eq!(json["session_id"], "sess_1");
    }
}
