//! Process-wide session ownership.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use avatar_voice_domain::{
    AvatarError, Generation, MediaStream, ReconnectPolicy, SessionCredentials,
};
use futures::FutureExt;
use futures::channel::mpsc;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::SessionEvent;
use crate::connection::AvatarSession;
use crate::events::EventBus;
use crate::provider::AvatarProvider;

/// Connect-time configuration the coordinator applies to every session it
/// creates.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub credentials: SessionCredentials,
    pub policy: ReconnectPolicy,
}

impl CoordinatorConfig {
    pub fn new(credentials: SessionCredentials) -> Self {
        Self {
            credentials,
            policy: ReconnectPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }
}

type InitFuture = Shared<BoxFuture<'static, Result<Arc<AvatarSession>, AvatarError>>>;

#[derive(Default)]
struct Slots {
    live: Option<Arc<AvatarSession>>,
    pending: Option<InitFuture>,
}

/// Guarantees single-flight, single-instance session creation across
/// arbitrarily many concurrent callers.
///
/// The live session and the pending initialization are the only shared
/// mutable state in the subsystem, and this coordinator is their sole
/// mutator. The shared handshake future is the concurrency-control
/// primitive: every caller racing to acquire before a session exists awaits
/// the same future, so exactly one handshake hits the provider.
///
/// Inject it (behind `Arc`) instead of reaching for a global: consumers
/// cannot know whether a sibling already triggered initialization, and they
/// do not need to.
pub struct SessionCoordinator {
    provider: Arc<dyn AvatarProvider>,
    config: CoordinatorConfig,
    events: Arc<EventBus>,
    counter: AtomicU64,
    slots: Mutex<Slots>,
}

impl SessionCoordinator {
    pub fn new(provider: Arc<dyn AvatarProvider>, config: CoordinatorConfig) -> Self {
        Self {
            provider,
            config,
            events: Arc::new(EventBus::new()),
            counter: AtomicU64::new(0),
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Return the live session, joining or starting a handshake as needed.
    ///
    /// Idempotent and safe to call from any number of independent call
    /// sites: a connected session is returned without network activity, an
    /// in-flight handshake is awaited rather than duplicated, and a
    /// handshake failure is propagated to every waiting caller while
    /// clearing the slots so the next call retries from scratch.
    pub async fn acquire(&self) -> Result<Arc<AvatarSession>, AvatarError> {
        let pending = {
            let mut slots = self.slots.lock();

            if let Some(session) = slots.live.as_ref() {
                if session.is_usable() {
                    return Ok(Arc::clone(session));
                }
                // Dead session: replace-on-next-acquire.
                debug!(generation = %session.generation(), "discarding dead session");
                slots.live = None;
            }

            if let Some(pending) = slots.pending.as_ref() {
                debug!("joining in-flight session initialization");
                pending.clone()
            } else {
                let generation = Generation::new(self.counter.fetch_add(1, Ordering::Relaxed) + 1);
                info!(%generation, "initializing avatar session");
                let fut = AvatarSession::start(
                    Arc::clone(&self.provider),
                    self.config.credentials.clone(),
                    generation,
                    self.config.policy,
                    Arc::clone(&self.events),
                )
                .boxed()
                .shared();
                slots.pending = Some(fut.clone());
                fut
            }
        };

        let result = pending.clone().await;

        let mut slots = self.slots.lock();
        if slots
            .pending
            .as_ref()
            .is_some_and(|p| p.ptr_eq(&pending))
        {
            slots.pending = None;
            match &result {
                Ok(session) => slots.live = Some(Arc::clone(session)),
                Err(err) => warn!(%err, "session initialization failed, slots cleared for retry"),
            }
        }

        result
    }

    /// The live session, if one exists and is usable. Never connects.
    pub fn current(&self) -> Option<Arc<AvatarSession>> {
        self.slots
            .lock()
            .live
            .as_ref()
            .filter(|s| s.is_usable())
            .cloned()
    }

    /// Generation of the live session, if any.
    pub fn current_generation(&self) -> Option<Generation> {
        self.slots.lock().live.as_ref().map(|s| s.generation())
    }

    /// Media stream of the live session, for late-attaching surfaces.
    pub fn media_stream(&self) -> Option<MediaStream> {
        self.slots
            .lock()
            .live
            .as_ref()
            .and_then(|s| s.media_stream())
    }

    /// Attach an event consumer. Survives session resets.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Tear down the live session, if any. Idempotent; pending handshakes
    /// are abandoned and their waiters see the handshake result unchanged.
    pub async fn shutdown(&self) {
        let session = {
            let mut slots = self.slots.lock();
            slots.pending = None;
            slots.live.take()
        };

        match session {
            Some(session) => {
                info!(generation = %session.generation(), "shutting down avatar session");
                session.disconnect("shutdown").await;
            }
            None => debug!("shutdown with no live session"),
        }
    }
}
