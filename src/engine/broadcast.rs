//! Result Broadcaster
//!
//! Fan-out of serialized results to every live subscriber. Delivery is
//! best-effort: a full or closed subscriber channel drops the message for
//! that subscriber only.

use std::collections::BTreeMap;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Default per-subscriber queue depth.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Unique subscriber identifier.
pub type SubscriberId = Uuid;

/// Handle returned by [`Broadcaster::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    /// Id to pass to [`Broadcaster::unsubscribe`].
    pub id: SubscriberId,
    /// Receives every published payload.
    pub receiver: mpsc::Receiver<String>,
}

/// Set of live subscribers.
#[derive(Debug)]
pub struct Broadcaster {
    subscribers: RwLock<BTreeMap<SubscriberId, mpsc::Sender<String>>>,
    buffer: usize,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl Broadcaster {
    /// Create a broadcaster whose subscribers queue up to `buffer` payloads.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(BTreeMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Register a new subscriber.
    pub async fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();

        self.subscribers.write().await.insert(id, tx);
        debug!("Subscriber {} registered", id);

        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub async fn unsubscribe(&self, id: &SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(id).is_some();
        if removed {
            debug!("Subscriber {} removed", id);
        }
        removed
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Send `payload` to every subscriber, returning how many accepted it.
    ///
    /// Works on a snapshot of the subscriber set, so subscribers may come
    /// and go while a publish is in flight. Never blocks on a slow subscriber.
    pub async fn publish(&self, payload: &str) -> usize {
        let snapshot: Vec<(SubscriberId, mpsc::Sender<String>)> = {
            let subscribers = self.subscribers.read().await;
            subscribers.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, tx) in snapshot {
            match tx.try_send(payload.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!("Subscriber {} is lagging, dropped payload", id);
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        // Prune transports that went away without unsubscribing
        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &closed {
                subscribers.remove(id);
                debug!("Subscriber {} closed, pruned", id);
            }
        }

        delivered
    }
}
