#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use avatar_voice_domain::{
    AudioArtifact, AvatarError, GenerateSpeech, MediaStream, PresenterSource, SessionCredentials,
};
use avatar_voice_session::provider::{
    AvatarProvider, ProviderConnectionState, ProviderEvent, ProviderHandle, ProviderSession,
};
use avatar_voice_session::{CoordinatorConfig, SessionCoordinator, SessionEvent};
use futures::channel::mpsc;
use futures::future::BoxFuture;
use parking_lot::Mutex;

/// Scripted avatar provider that counts every call and fails on demand.
pub struct MockProvider {
    connects: AtomicUsize,
    speaks: AtomicUsize,
    reconnects: AtomicUsize,
    disconnects: AtomicUsize,
    stream_counter: AtomicUsize,
    connect_failures: Mutex<VecDeque<AvatarError>>,
    speak_failures: Mutex<VecDeque<AvatarError>>,
    reconnect_failures: Mutex<VecDeque<AvatarError>>,
    event_feeds: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connects: AtomicUsize::new(0),
            speaks: AtomicUsize::new(0),
            reconnects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            stream_counter: AtomicUsize::new(0),
            connect_failures: Mutex::new(VecDeque::new()),
            speak_failures: Mutex::new(VecDeque::new()),
            reconnect_failures: Mutex::new(VecDeque::new()),
            event_feeds: Mutex::new(Vec::new()),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn speaks(&self) -> usize {
        self.speaks.load(Ordering::SeqCst)
    }

    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn fail_next_connect(&self, err: AvatarError) {
        self.connect_failures.lock().push_back(err);
    }

    pub fn fail_next_speak(&self, err: AvatarError) {
        self.speak_failures.lock().push_back(err);
    }

    pub fn fail_next_reconnect(&self, err: AvatarError) {
        self.reconnect_failures.lock().push_back(err);
    }

    /// Push a provider event into the most recent session's feed.
    pub fn push_event(&self, event: ProviderEvent) {
        let feeds = self.event_feeds.lock();
        feeds
            .last()
            .expect("no connected session to push events into")
            .unbounded_send(event)
            .expect("event feed closed");
    }

    pub fn session_error() -> AvatarError {
        AvatarError::SessionScoped("session token expired".into())
    }

    pub fn transport_error() -> AvatarError {
        AvatarError::Transport("stream closed unexpectedly".into())
    }
}

impl AvatarProvider for MockProvider {
    fn connect(
        &self,
        _credentials: SessionCredentials,
    ) -> BoxFuture<'_, Result<ProviderSession, AvatarError>> {
        Box::pin(async move {
            // Yield so overlapping acquirers genuinely race the handshake.
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.connects.fetch_add(1, Ordering::SeqCst);

            if let Some(err) = self.connect_failures.lock().pop_front() {
                return Err(err);
            }

            let n = self.stream_counter.fetch_add(1, Ordering::SeqCst) + 1;
            let handle = ProviderHandle {
                stream_id: format!("stream-{n}"),
                session_id: format!("sess-{n}"),
            };
            let media = MediaStream {
                stream_id: handle.stream_id.clone(),
                session_id: handle.session_id.clone(),
                sdp_offer: "v=0".into(),
                ice_servers: Vec::new(),
            };

            let (tx, rx) = mpsc::unbounded();
            tx.unbounded_send(ProviderEvent::ConnectionState(
                ProviderConnectionState::Connected,
            ))
            .expect("fresh feed");
            tx.unbounded_send(ProviderEvent::MediaReady(media))
                .expect("fresh feed");
            self.event_feeds.lock().push(tx);

            Ok(ProviderSession { handle, events: rx })
        })
    }

    fn speak(
        &self,
        _handle: ProviderHandle,
        _audio_url: String,
    ) -> BoxFuture<'_, Result<(), AvatarError>> {
        Box::pin(async move {
            self.speaks.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.speak_failures.lock().pop_front() {
                return Err(err);
            }
            Ok(())
        })
    }

    fn reconnect(&self, _handle: ProviderHandle) -> BoxFuture<'_, Result<(), AvatarError>> {
        Box::pin(async move {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.reconnect_failures.lock().pop_front() {
                return Err(err);
            }
            Ok(())
        })
    }

    fn disconnect(&self, _handle: ProviderHandle) -> BoxFuture<'_, Result<(), AvatarError>> {
        Box::pin(async move {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Canned speech generator.
pub struct MockSpeech {
    calls: AtomicUsize,
    delay: Mutex<Duration>,
    failures: Mutex<VecDeque<AvatarError>>,
}

impl MockSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Mutex::new(Duration::ZERO),
            failures: Mutex::new(VecDeque::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn fail_next(&self, err: AvatarError) {
        self.failures.lock().push_back(err);
    }
}

impl GenerateSpeech for MockSpeech {
    fn generate<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<AudioArtifact, AvatarError>> {
        Box::pin(async move {
            let delay = *self.delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(err) = self.failures.lock().pop_front() {
                return Err(err);
            }
            Ok(AudioArtifact::new(
                format!("https://storage.example/clip-{n}.mp3"),
                "audio/mpeg",
                text.len(),
            ))
        })
    }
}

pub fn credentials() -> SessionCredentials {
    SessionCredentials::new(
        "test-key",
        PresenterSource::Driver("bank://lively/".into()),
    )
}

pub fn coordinator(provider: Arc<MockProvider>) -> Arc<SessionCoordinator> {
    Arc::new(SessionCoordinator::new(
        provider,
        CoordinatorConfig::new(credentials()),
    ))
}

/// Poll `condition` until it holds, with a bounded budget.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within budget");
}

/// Drain everything currently buffered on an event feed.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = rx.try_next() {
        events.push(event);
    }
    events
}
