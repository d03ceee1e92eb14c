//! Shared server state: the entity store, the delta broadcaster and the
//! database connection.
//!
//! Every write goes through one method here and follows the same path:
//! take the store write lock, upsert, persist, publish. The store lock is
//! held across all three steps so that deltas leave in mutation order.
//! Lock order is always store → database → broadcaster.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use rusqlite::Connection;

use crate::broadcast::{DeliveryReport, Outgoing, SubscriberId, UpdateBroadcaster};
use crate::config::{DashboardConfig, RunMode};
use crate::db::{self, DatabaseError};
use crate::delta::Delta;
use crate::models::{AlertRecord, CaseRecord, HospitalRecord, NewAlert, VaccinationRecord};
use crate::simulation;
use crate::store::{EntityStore, StoreError};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

/// Wrapped in `Arc` at startup and handed to the HTTP layer and the
/// simulation task.
pub struct CoreState {
    store: RwLock<EntityStore>,
    broadcaster: RwLock<UpdateBroadcaster>,
    db: Mutex<Connection>,
    mode: RunMode,
}

impl CoreState {
    /// Open (or create) the configured database, seed it when empty and
    /// load its contents into memory.
    pub fn open(config: &DashboardConfig) -> Result<Self, CoreError> {
        let conn = match config.mode {
            RunMode::Connected => db::open_database(&config.db_path)?,
            RunMode::OfflineDemo => db::open_memory_database()?,
        };
        Self::with_connection(conn, config.mode)
    }

    pub fn with_connection(conn: Connection, mode: RunMode) -> Result<Self, CoreError> {
        db::seed_if_empty(&conn)?;
        let snapshot = db::load_snapshot(&conn)?;
        tracing::info!(
            cases = snapshot.cases.len(),
            hospitals = snapshot.hospitals.len(),
            vaccinations = snapshot.vaccinations.len(),
            alerts = snapshot.alerts.len(),
            ?mode,
            "Dashboard state loaded"
        );
        Ok(Self {
            store: RwLock::new(EntityStore::from_snapshot(snapshot)),
            broadcaster: RwLock::new(UpdateBroadcaster::new()),
            db: Mutex::new(conn),
            mode,
        })
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    // ── Lock access ─────────────────────────────────────────

    pub fn read_store(&self) -> Result<RwLockReadGuard<'_, EntityStore>, CoreError> {
        self.store.read().map_err(|_| CoreError::LockPoisoned)
    }

    fn write_store(&self) -> Result<RwLockWriteGuard<'_, EntityStore>, CoreError> {
        self.store.write().map_err(|_| CoreError::LockPoisoned)
    }

    fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Subscribers ─────────────────────────────────────────

    pub fn register_subscriber(
        &self,
        tx: tokio::sync::mpsc::Sender<Outgoing>,
    ) -> Result<SubscriberId, CoreError> {
        let mut broadcaster = self.broadcaster.write().map_err(|_| CoreError::LockPoisoned)?;
        Ok(broadcaster.register(tx))
    }

    pub fn unregister_subscriber(&self, id: &SubscriberId) -> Result<(), CoreError> {
        let mut broadcaster = self.broadcaster.write().map_err(|_| CoreError::LockPoisoned)?;
        broadcaster.unregister(id);
        Ok(())
    }

    pub fn subscriber_count(&self) -> Result<usize, CoreError> {
        let broadcaster = self.broadcaster.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(broadcaster.subscriber_count())
    }

    // ── Write path ──────────────────────────────────────────

    pub fn record_case(
        &self,
        ward: &str,
        disease: &str,
        new_cases: u32,
        total_cases: u32,
    ) -> Result<CaseRecord, CoreError> {
        let ward = ward.trim();
        let disease = disease.trim();
        if ward.is_empty() || disease.is_empty() {
            return Err(CoreError::Validation("ward and disease are required".into()));
        }

        let mut store = self.write_store()?;
        let record = store.upsert_case(ward, disease, new_cases, total_cases);
        self.persist("case", |conn| db::save_case(conn, &record))?;
        self.publish(Delta::CaseUpdate(record.clone()))?;
        tracing::info!(%ward, %disease, total_cases, status = %record.status, "Case recorded");
        Ok(record)
    }

    pub fn record_hospital_resources(
        &self,
        id: i64,
        occupied_beds: u32,
        occupied_icu: u32,
        available_ventilators: u32,
    ) -> Result<HospitalRecord, CoreError> {
        let mut store = self.write_store()?;
        let record =
            store.upsert_hospital_resource(id, occupied_beds, occupied_icu, available_ventilators)?;
        self.persist("hospital", |conn| db::save_hospital(conn, &record))?;
        self.publish(Delta::HospitalUpdate(record.clone()))?;
        tracing::info!(
            hospital_id = id,
            occupancy_rate = record.occupancy_rate,
            status = %record.occupancy_status,
            "Hospital resources recorded"
        );
        Ok(record)
    }

    /// Rejects counts above the ward's population before touching the store.
    pub fn record_vaccination(
        &self,
        ward: &str,
        vaccinated: u32,
    ) -> Result<VaccinationRecord, CoreError> {
        let mut store = self.write_store()?;
        let population = store
            .vaccination(ward)
            .map(|v| v.total_population)
            .ok_or_else(|| StoreError::NotFound {
                kind: "vaccination",
                key: ward.to_string(),
            })?;
        if vaccinated > population {
            return Err(CoreError::Validation(format!(
                "vaccinated ({vaccinated}) exceeds total population ({population})"
            )));
        }

        let record = store.upsert_vaccination(ward, vaccinated)?;
        self.persist("vaccination", |conn| db::save_vaccination(conn, &record))?;
        self.publish(Delta::VaccinationUpdate(record.clone()))?;
        tracing::info!(%ward, rate = record.vaccination_rate, status = %record.status, "Vaccination recorded");
        Ok(record)
    }

    pub fn raise_alert(&self, alert: NewAlert) -> Result<AlertRecord, CoreError> {
        if alert.message.trim().is_empty() {
            return Err(CoreError::Validation("alert message is required".into()));
        }

        let mut store = self.write_store()?;
        let record = store.add_alert(alert);
        self.persist("alert", |conn| db::insert_alert(conn, &record))?;
        self.publish(Delta::NewAlert(record.clone()))?;
        tracing::info!(alert_id = record.id, alert_type = %record.alert_type, "Alert raised");
        Ok(record)
    }

    /// One simulated tick. Returns the updated case, if the tick fired.
    pub fn simulate_tick<R: Rng>(&self, rng: &mut R) -> Result<Option<CaseRecord>, CoreError> {
        let mut store = self.write_store()?;
        let Some(tick) = simulation::next_case_tick(&store, rng) else {
            return Ok(None);
        };
        let record = store.upsert_case(&tick.ward, &tick.disease, tick.new_cases, tick.total_cases);
        self.persist("case", |conn| db::save_case(conn, &record))?;
        self.publish(Delta::CaseUpdate(record.clone()))?;
        tracing::debug!(ward = %record.ward, disease = %record.disease, total = record.total_cases, "Simulated case tick");
        Ok(Some(record))
    }

    // ── Internals ───────────────────────────────────────────

    /// Memory stays authoritative when a write fails; the failure is logged
    /// and the caller carries on with the in-memory record.
    fn persist<F>(&self, kind: &'static str, write: F) -> Result<(), CoreError>
    where
        F: FnOnce(&Connection) -> Result<(), DatabaseError>,
    {
        let conn = self.lock_db()?;
        if let Err(e) = write(&conn) {
            tracing::error!(kind, error = %e, "Failed to persist record");
        }
        Ok(())
    }

    fn publish(&self, delta: Delta) -> Result<DeliveryReport, CoreError> {
        let broadcaster = self.broadcaster.read().map_err(|_| CoreError::LockPoisoned)?;
        let kind = delta.kind();
        let report = broadcaster.publish(delta);
        tracing::debug!(kind, delivered = report.delivered, skipped = report.skipped, "Delta published");
        Ok(report)
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
