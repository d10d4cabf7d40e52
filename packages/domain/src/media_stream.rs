//! Inbound media stream descriptor.
use serde::{Deserialize, Serialize};

/// Description of the provider's inbound media stream.
///
/// The session owns the descriptor; presentation surfaces receive clones and
/// complete the transport negotiation themselves. The avatar-voice core never
/// touches the rendered media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStream {
    /// Provider-assigned stream identifier.
    pub stream_id: String,
    /// Provider session token for server stickiness.
    pub session_id: String,
    /// SDP offer the consumer answers to receive media.
    pub sdp_offer: String,
    /// ICE servers for the peer connection.
    pub ice_servers: Vec<IceServer>,
}

/// One ICE server entry as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}
