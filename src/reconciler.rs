//! Client-side mirror of the server's entity state.
//!
//! The reconciler owns a local [`EntityStore`], applies deltas to it and
//! tells registered [`ViewHandler`]s what changed. It has no I/O of its own;
//! [`crate::client::DashboardClient`] feeds it from the network.
//!
//! Connection lifecycle:
//!
//! ```text
//!   AwaitingResync ──bulk_load──▶ Live ──connection lost──▶ Disconnected
//!         ▲                                                      │
//!         └──────────────────────── connected ◀──── wait 5 s ────┘
//! ```
//!
//! Deltas are only merged while `Live`. After a reconnect the mirror must be
//! reloaded first, otherwise deltas would land on stale state.
//!
//! The client subscribes before it fetches the snapshot, so deltas published
//! during the fetch arrive after `bulk_load`. Record updates replay
//! harmlessly, but an alert the snapshot already holds would be prepended a
//! second time; those are refused with [`ReconcileError::AlertInSnapshot`].

use std::collections::HashSet;
use std::time::Duration;

use crate::delta::Delta;
use crate::models::{AggregateStats, CaseKey, Snapshot};
use crate::store::EntityStore;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Malformed delta: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Delta received before resync")]
    AwaitingResync,
    #[error("Alert {0} already present in the loaded snapshot")]
    AlertInSnapshot(i64),
}

/// What a merge or reload touched.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Reloaded,
    Case(CaseKey),
    Hospital(i64),
    Vaccination(String),
    Alert(i64),
}

/// Rendering collaborator. Called synchronously after every applied change
/// with the freshly recomputed aggregates.
pub trait ViewHandler: Send + Sync {
    fn on_change(&mut self, change: &ViewChange, stats: &AggregateStats);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingResync,
    Live,
    Disconnected,
}

/// Fixed-delay reconnect schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
        }
    }
}

pub struct ClientReconciler {
    store: EntityStore,
    handlers: Vec<Box<dyn ViewHandler>>,
    state: ConnectionState,
    policy: ReconnectPolicy,
    snapshot_alerts: HashSet<i64>,
}

impl ClientReconciler {
    pub fn new(handlers: Vec<Box<dyn ViewHandler>>) -> Self {
        Self::with_policy(handlers, ReconnectPolicy::default())
    }

    pub fn with_policy(handlers: Vec<Box<dyn ViewHandler>>, policy: ReconnectPolicy) -> Self {
        Self {
            store: EntityStore::new(),
            handlers,
            state: ConnectionState::AwaitingResync,
            policy,
            snapshot_alerts: HashSet::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Replace the mirror wholesale and resume delta application.
    pub fn bulk_load(&mut self, snapshot: Snapshot) {
        self.snapshot_alerts = snapshot.alerts.iter().map(|a| a.id).collect();
        self.store.bulk_load(snapshot);
        self.state = ConnectionState::Live;
        self.notify(&ViewChange::Reloaded);
    }

    /// Apply one delta. Update kinds insert on miss; alerts are prepended
    /// unless the last snapshot already carried them.
    pub fn merge(&mut self, delta: Delta) -> Result<ViewChange, ReconcileError> {
        if self.state != ConnectionState::Live {
            return Err(ReconcileError::AwaitingResync);
        }
        let change = match delta {
            Delta::CaseUpdate(record) => ViewChange::Case(self.store.put_case(record).key()),
            Delta::HospitalUpdate(record) => ViewChange::Hospital(self.store.put_hospital(record).id),
            Delta::VaccinationUpdate(record) => {
                ViewChange::Vaccination(self.store.put_vaccination(record).ward)
            }
            Delta::NewAlert(record) => {
                if self.snapshot_alerts.contains(&record.id) {
                    return Err(ReconcileError::AlertInSnapshot(record.id));
                }
                ViewChange::Alert(self.store.prepend_alert(record).id)
            }
        };
        self.notify(&change);
        Ok(change)
    }

    /// Parse and apply a text frame. A malformed frame leaves state untouched.
    pub fn merge_text(&mut self, text: &str) -> Result<ViewChange, ReconcileError> {
        let delta: Delta = serde_json::from_str(text)?;
        self.merge(delta)
    }

    /// Mark the link down and return how long to wait before reconnecting.
    pub fn on_connection_lost(&mut self) -> Duration {
        self.state = ConnectionState::Disconnected;
        self.policy.delay
    }

    /// A new link is up; deltas are refused until the next `bulk_load`.
    pub fn on_connected(&mut self) {
        self.state = ConnectionState::AwaitingResync;
    }

    fn notify(&mut self, change: &ViewChange) {
        let stats = self.store.aggregate_stats();
        for handler in &mut self.handlers {
            handler.on_change(change, &stats);
        }
    }
}

/// Headless view: logs each change and the resulting headline numbers.
#[derive(Debug, Default)]
pub struct TracingView;

impl ViewHandler for TracingView {
    fn on_change(&mut self, change: &ViewChange, stats: &AggregateStats) {
        tracing::info!(
            ?change,
            total_cases = stats.total_cases,
            available_beds = stats.available_beds,
            avg_vaccination_rate = stats.avg_vaccination_rate,
            active_alerts = stats.active_alerts,
            "Dashboard view updated"
        );
    }
}
