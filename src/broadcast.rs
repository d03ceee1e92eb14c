//! Delta fan-out to connected dashboard sessions.
//!
//! Each WebSocket session registers a bounded channel. Publishing never
//! blocks: a subscriber whose queue is full or whose session has gone away
//! is skipped for that delta, and the remaining subscribers still receive it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::delta::Delta;

/// Per-subscriber queue depth.
pub const SUBSCRIBER_BUFFER: usize = 64;

pub type SubscriberId = Uuid;

/// Deltas are shared between subscribers, not cloned per session.
pub type Outgoing = Arc<Delta>;

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Why a single subscriber missed a delta. Never surfaced to the publisher.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Subscriber queue full: {0}")]
    Full(SubscriberId),
    #[error("Subscriber channel closed: {0}")]
    Closed(SubscriberId),
}

/// Result of one [`UpdateBroadcaster::publish`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub skipped: usize,
}

// ═══════════════════════════════════════════════════════════
// UpdateBroadcaster
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct UpdateBroadcaster {
    subscribers: HashMap<SubscriberId, mpsc::Sender<Outgoing>>,
}

impl UpdateBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing sender and return its id.
    pub fn register(&mut self, tx: mpsc::Sender<Outgoing>) -> SubscriberId {
        let id = Uuid::new_v4();
        self.subscribers.insert(id, tx);
        tracing::debug!(subscriber = %id, total = self.subscribers.len(), "Subscriber registered");
        id
    }

    /// Create a bounded channel and register its sending half.
    pub fn subscribe(&mut self) -> (SubscriberId, mpsc::Receiver<Outgoing>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        (self.register(tx), rx)
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unregister(&mut self, id: &SubscriberId) -> bool {
        let removed = self.subscribers.remove(id).is_some();
        if removed {
            tracing::debug!(subscriber = %id, total = self.subscribers.len(), "Subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Offer `delta` to every subscriber without waiting on any of them.
    pub fn publish(&self, delta: Delta) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if self.subscribers.is_empty() {
            return report;
        }

        let kind = delta.kind();
        let shared: Outgoing = Arc::new(delta);
        for (id, tx) in &self.subscribers {
            match Self::offer(*id, tx, shared.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::debug!(kind, error = %e, "Delta not delivered");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    fn offer(
        id: SubscriberId,
        tx: &mpsc::Sender<Outgoing>,
        msg: Outgoing,
    ) -> Result<(), DeliveryError> {
        tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full(id),
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaseRecord;

    fn case_delta(total: u32) -> Delta {
        Delta::CaseUpdate(CaseRecord::new("Ward-1", "Dengue", 1, total))
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let broadcaster = UpdateBroadcaster::new();
        assert_eq!(broadcaster.publish(case_delta(1)), DeliveryReport::default());
    }

    #[test]
    fn every_subscriber_receives_delta() {
        let mut broadcaster = UpdateBroadcaster::new();
        let (_, mut rx1) = broadcaster.subscribe();
        let (_, mut rx2) = broadcaster.subscribe();

        let report = broadcaster.publish(case_delta(45));
        assert_eq!(report.delivered, 2);

        let a = rx1.try_recv().unwrap();
        let b = rx2.try_recv().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.kind(), "case_update");
    }

    #[test]
    fn full_subscriber_does_not_block_others() {
        let mut broadcaster = UpdateBroadcaster::new();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        broadcaster.register(slow_tx);
        let (_, mut fast_rx) = broadcaster.subscribe();

        broadcaster.publish(case_delta(1));
        let report = broadcaster.publish(case_delta(2));
        assert_eq!(report, DeliveryReport { delivered: 1, skipped: 1 });

        assert!(fast_rx.try_recv().is_ok());
        assert!(fast_rx.try_recv().is_ok());
    }

    #[test]
    fn closed_subscriber_is_skipped() {
        let mut broadcaster = UpdateBroadcaster::new();
        let (_, rx) = broadcaster.subscribe();
        drop(rx);
        let (_, mut live) = broadcaster.subscribe();

        let report = broadcaster.publish(case_delta(3));
        assert_eq!(report, DeliveryReport { delivered: 1, skipped: 1 });
        assert!(live.try_recv().is_ok());
    }

    #[test]
    fn deltas_arrive_in_publish_order() {
        let mut broadcaster = UpdateBroadcaster::new();
        let (_, mut rx) = broadcaster.subscribe();
        for total in [10, 20, 30] {
            broadcaster.publish(case_delta(total));
        }
        let totals: Vec<u32> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|d| match d.as_ref() {
                Delta::CaseUpdate(c) => c.total_cases,
                _ => 0,
            })
            .collect();
        assert_eq!(totals, vec![10, 20, 30]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut broadcaster = UpdateBroadcaster::new();
        let (id, _rx) = broadcaster.subscribe();
        assert!(broadcaster.unregister(&id));
        assert!(!broadcaster.unregister(&id));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
