//! Minimal interview-coach wiring: one shared avatar session, one spoken
//! line, events printed as they arrive.
//!
//! Requires `DID_API_KEY`, `ELEVENLABS_API_KEY`, `SUPABASE_URL`, and
//! `SUPABASE_SERVICE_ROLE_KEY` in the environment.

use std::sync::Arc;

use avatar_voice_domain::{PresenterSource, SessionCredentials};
use avatar_voice_session::{
    CoordinatorConfig, DidStreamsClient, SessionCoordinator, SessionEvent, SpeakDispatcher,
};
use avatar_voice_speech::SpeechGenerator;
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let api_key = std::env::var("DID_API_KEY")?;
    let credentials = SessionCredentials::new(
        api_key,
        PresenterSource::Driver("bank://lively/".to_string()),
    );

    let provider = Arc::new(DidStreamsClient::new()?);
    let coordinator = Arc::new(SessionCoordinator::new(
        provider,
        CoordinatorConfig::new(credentials),
    ));
    let speech = Arc::new(SpeechGenerator::from_env()?);
    let dispatcher = SpeakDispatcher::new(Arc::clone(&coordinator), speech);

    let mut events = coordinator.subscribe();
    dispatcher.speak("Welkom! Vertel eens iets over jezelf.");

    while let Some(event) = events.next().await {
        match event {
            SessionEvent::MediaReady(stream) => {
                println!("media ready: stream {}", stream.stream_id);
            }
            SessionEvent::StateChanged(state) => println!("state: {state:?}"),
            SessionEvent::Streaming { active } => println!("streaming: {active}"),
            SessionEvent::Error { error, .. } => eprintln!("error: {error}"),
            SessionEvent::Disconnected { reason } => {
                println!("disconnected: {reason}");
                break;
            }
            _ => {}
        }
    }

    coordinator.shutdown().await;
    Ok(())
}
