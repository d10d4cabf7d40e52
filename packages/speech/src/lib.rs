//! # Avatar Voice Speech
//!
//! Speech generation for the avatar-voice ecosystem.
//!
//! Turns input text into a playable audio artifact in two request/response
//! steps: TTS synthesis against an ElevenLabs-style HTTP API, then an upload
//! to object storage that yields the publicly fetchable URL the avatar
//! provider pulls from. No state is held across calls.

pub mod client;
pub mod generator;
pub mod storage;

pub use client::{TtsClient, TtsConfig};
pub use generator::SpeechGenerator;
pub use storage::{AudioStorage, StorageConfig};
