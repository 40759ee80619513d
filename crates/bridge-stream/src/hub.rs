//! BroadcastHub: live subscriber set with best-effort fan-out
//!
//! Per-subscriber failure isolation is the contract here: a slow or dead
//! subscriber is removed on the spot, the rest receive the value in the
//! same publish cycle. At-most-once delivery, no queuing of missed
//! values beyond the bounded per-subscriber buffer.

use bridge_core::MuscleState;
use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Outbound buffer per subscriber; a subscriber this far behind is
/// treated as failed and dropped.
pub const SUBSCRIBER_BUFFER: usize = 32;

/// Identity of one connected subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        SubscriberId(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fan-out hub for the classified EMG stream.
///
/// Invariant: every entry in the set has a channel believed open; any
/// entry whose send fails is removed before `publish` returns.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<MuscleState>>>,
}

impl BroadcastHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    ///
    /// The returned receiver sees only values published after this call;
    /// there is no backfill.
    pub async fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<MuscleState>) {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = SubscriberId::new();
        self.subscribers.lock().await.insert(id, sender);
        info!(subscriber = %id, "subscriber connected");
        (id, receiver)
    }

    /// Remove a subscriber. Idempotent: absent ids are a no-op.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        if self.subscribers.lock().await.remove(&id).is_some() {
            info!(subscriber = %id, "subscriber removed");
        }
    }

    /// Deliver one classified value to every live subscriber.
    ///
    /// A subscriber whose channel is full (slow consumer) or closed
    /// (gone) is silently dropped; delivery to the others is unaffected
    /// and the caller never sees a failure.
    pub async fn publish(&self, state: MuscleState) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|id, sender| match sender.try_send(state) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(subscriber = %id, "dropping slow subscriber");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(subscriber = %id, "dropping disconnected subscriber");
                false
            }
        });
    }

    /// Number of currently live subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Drop every subscriber, closing their channels
    pub async fn shutdown(&self) {
        let mut subscribers = self.subscribers.lock().await;
        let dropped = subscribers.len();
        subscribers.clear();
        if dropped > 0 {
            info!(dropped, "hub shut down");
        }
    }
}
