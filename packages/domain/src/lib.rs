//! # Avatar Voice Domain
//!
//! Shared domain objects and types for the avatar-voice ecosystem.
//!
//! This crate contains the core domain types that are shared between
//! the speech-generation and session-management components, enabling
//! clean separation of concerns and breaking cyclic dependencies.

pub mod audio_artifact;
pub mod avatar_error;
pub mod credentials;
pub mod generate_speech;
pub mod generation;
pub mod media_stream;
pub mod model_id;
pub mod reconnect_policy;
pub mod session_state;
pub mod speak_request;
pub mod voice_id;
pub mod voice_settings;

// Re-export core types
pub use audio_artifact::AudioArtifact;
pub use avatar_error::AvatarError;
pub use credentials::{PresenterSource, SessionCredentials};
pub use generate_speech::GenerateSpeech;
pub use generation::Generation;
pub use media_stream::{IceServer, MediaStream};
pub use model_id::ModelId;
pub use reconnect_policy::ReconnectPolicy;
pub use session_state::{SessionState, StateInput};
pub use speak_request::SpeakRequest;
pub use voice_id::VoiceId;
pub use voice_settings::VoiceSettings;
