use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crossbeam_channel::{Receiver, Sender};

use crate::item::Item;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, Sender<Vec<Item>>>,
}

/// Publish/subscribe registry for "items removed" notifications.
///
/// Cloning yields another handle on the same registry. Each subscriber gets
/// its own channel; there is no replay for subscribers that join late.
#[derive(Clone, Default)]
pub struct RemovalBroadcast {
    registry: Arc<Mutex<Registry>>,
}

impl RemovalBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the handle is dropped.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, tx);
        drop(registry);

        Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Send `items` to every live subscriber. Returns how many received it.
    pub fn publish(&self, items: &[Item]) -> usize {
        let registry = lock(&self.registry);
        let delivered = registry
            .subscribers
            .values()
            .filter(|tx| tx.send(items.to_vec()).is_ok())
            .count();

        tracing::debug!(items = items.len(), subscribers = delivered, "removal published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

// The registry stays consistent across a panicking holder, so poisoning is ignored
fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Listener handle returned by [`RemovalBroadcast::subscribe`]
pub struct Subscription {
    id: u64,
    receiver: Receiver<Vec<Item>>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Next pending notification, if any
    pub fn try_recv(&self) -> Option<Vec<Item>> {
        self.receiver.try_recv().ok()
    }

    /// Every pending notification, oldest first
    pub fn drain(&self) -> Vec<Vec<Item>> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.remove(&self.id);
        }
    }
}
