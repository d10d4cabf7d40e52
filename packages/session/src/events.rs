//! Event fan-out to presentation surfaces.

use futures::channel::mpsc;
use parking_lot::Mutex;

use crate::SessionEvent;

/// Multi-subscriber event channel.
///
/// The bus outlives any individual session: it is owned by the coordinator
/// and handed to each session it creates, so subscribers keep their feed
/// across resets. Dropped receivers are pruned on the next emit.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new consumer. Detaching is just dropping the receiver;
    /// repeated detach is harmless and never tears down the session.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    pub fn emit(&self, event: SessionEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
