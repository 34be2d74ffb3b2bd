use tokio::sync::broadcast;

use super::EventBus;
use crate::mempool::MempoolEvent;

/// An in-process, multi-producer/multi-subscriber event bus backed by `tokio::sync::broadcast`.
/// `publish` never blocks: a full or subscriber-less channel just drops the oldest/the event,
/// which is `broadcast`'s native behaviour, matching the "non-blocking" contract collaborators
/// require of `EventBus`.
pub struct BroadcastEventBus {
    sender: broadcast::Sender<MempoolEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MempoolEvent> {
        self.sender.subscribe()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: MempoolEvent) {
        // `send` only errors when there are no receivers; that's a normal, non-fatal condition
        // for an event bus (nobody's listening yet), not something to log on every tx.
        let _ = self.sender.send(event);
    }
}
