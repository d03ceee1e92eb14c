//! In-memory entity state: the single source of truth for cases,
//! hospitals, vaccination coverage and alerts.
//!
//! Every mutation derives status fields through the classifier and
//! recomputes the aggregate statistics before returning. Mutations are
//! synchronous; callers that share a store across tasks wrap it in a lock.

pub mod collection;

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

pub use collection::{Collection, Entity, Upsert};

use crate::classifier;
use crate::models::*;

/// Errors from store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
}

impl StoreError {
    fn not_found<E: Entity>(key: &E::Key) -> Self {
        StoreError::NotFound {
            kind: E::KIND,
            key: key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    cases: Collection<CaseRecord>,
    hospitals: Collection<HospitalRecord>,
    vaccinations: Collection<VaccinationRecord>,
    /// Newest-first. Not keyed: a re-delivered alert is prepended again.
    alerts: Vec<AlertRecord>,
    stats: AggregateStats,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        store.bulk_load(snapshot);
        store
    }

    // ── Operator writes ─────────────────────────────────────

    /// Insert or replace the counts for `(ward, disease)`.
    pub fn upsert_case(
        &mut self,
        ward: &str,
        disease: &str,
        new_cases: u32,
        total_cases: u32,
    ) -> CaseRecord {
        self.put_case(CaseRecord::new(ward, disease, new_cases, total_cases))
    }

    /// Record bed/ICU occupancy and ventilator availability for a hospital.
    ///
    /// Occupancy above capacity is accepted and flagged on the record.
    pub fn upsert_hospital_resource(
        &mut self,
        id: i64,
        occupied_beds: u32,
        occupied_icu: u32,
        available_ventilators: u32,
    ) -> Result<HospitalRecord, StoreError> {
        let record = self
            .hospitals
            .update(&id, |h| {
                h.occupied_beds = occupied_beds;
                h.occupied_icu = occupied_icu;
                h.available_ventilators = available_ventilators;
                h.updated_at = Utc::now();
            })
            .cloned()
            .ok_or_else(|| StoreError::not_found::<HospitalRecord>(&id))?;

        if record.over_capacity {
            tracing::warn!(
                hospital_id = id,
                occupied_beds,
                total_beds = record.total_beds,
                occupied_icu,
                icu_beds = record.icu_beds,
                "Hospital occupancy exceeds capacity"
            );
        }
        self.refresh_stats();
        Ok(record)
    }

    /// Record the vaccinated head count for a ward.
    pub fn upsert_vaccination(
        &mut self,
        ward: &str,
        vaccinated: u32,
    ) -> Result<VaccinationRecord, StoreError> {
        let key = ward.to_string();
        let record = self
            .vaccinations
            .update(&key, |v| {
                v.vaccinated = vaccinated;
                v.updated_at = Utc::now();
            })
            .cloned()
            .ok_or_else(|| StoreError::not_found::<VaccinationRecord>(&key))?;
        self.refresh_stats();
        Ok(record)
    }

    /// Prepend a new alert. The id is the caller's or `max(existing) + 1`.
    pub fn add_alert(&mut self, alert: NewAlert) -> AlertRecord {
        let id = alert.id.unwrap_or_else(|| self.next_alert_id());
        self.prepend_alert(AlertRecord {
            id,
            alert_type: alert.alert_type,
            title: alert.title,
            message: alert.message,
            ward: alert.ward,
            severity: alert.severity,
            created_at: Utc::now(),
            is_active: true,
        })
    }

    fn next_alert_id(&self) -> i64 {
        self.alerts.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }

    // ── Whole-record writes (bulk load, delta merge) ───────

    pub fn put_case(&mut self, record: CaseRecord) -> CaseRecord {
        let stored = put(&mut self.cases, record);
        self.refresh_stats();
        stored
    }

    pub fn put_hospital(&mut self, record: HospitalRecord) -> HospitalRecord {
        let stored = put(&mut self.hospitals, record);
        self.refresh_stats();
        stored
    }

    pub fn put_vaccination(&mut self, record: VaccinationRecord) -> VaccinationRecord {
        let stored = put(&mut self.vaccinations, record);
        self.refresh_stats();
        stored
    }

    pub fn prepend_alert(&mut self, record: AlertRecord) -> AlertRecord {
        self.alerts.insert(0, record.clone());
        self.refresh_stats();
        record
    }

    /// Replace every collection wholesale. Incoming `stats` are ignored
    /// and recomputed from the records.
    pub fn bulk_load(&mut self, snapshot: Snapshot) {
        self.cases.replace_all(snapshot.cases);
        self.hospitals.replace_all(snapshot.hospitals);
        self.vaccinations.replace_all(snapshot.vaccinations);
        self.alerts = snapshot.alerts;
        self.refresh_stats();
    }

    // ── Reads ───────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cases: self.cases.to_vec(),
            hospitals: self.hospitals.to_vec(),
            vaccinations: self.vaccinations.to_vec(),
            alerts: self.alerts.clone(),
            stats: self.stats.clone(),
        }
    }

    pub fn aggregate_stats(&self) -> AggregateStats {
        self.stats.clone()
    }

    pub fn cases(&self) -> impl Iterator<Item = &CaseRecord> {
        self.cases.iter()
    }

    pub fn case(&self, ward: &str, disease: &str) -> Option<&CaseRecord> {
        self.cases.get(&CaseKey::new(ward, disease))
    }

    pub fn case_keys(&self) -> Vec<CaseKey> {
        self.cases.iter().map(CaseRecord::key).collect()
    }

    pub fn hospitals(&self) -> impl Iterator<Item = &HospitalRecord> {
        self.hospitals.iter()
    }

    pub fn hospital(&self, id: i64) -> Option<&HospitalRecord> {
        self.hospitals.get(&id)
    }

    pub fn vaccinations(&self) -> impl Iterator<Item = &VaccinationRecord> {
        self.vaccinations.iter()
    }

    pub fn vaccination(&self, ward: &str) -> Option<&VaccinationRecord> {
        self.vaccinations.get(&ward.to_string())
    }

    /// All alerts, newest-first.
    pub fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &AlertRecord> {
        self.alerts.iter().filter(|a| a.is_active)
    }

    /// Case totals rolled up per ward, ordered by ward name.
    pub fn ward_summaries(&self) -> Vec<WardSummary> {
        let mut wards: BTreeMap<&str, (u64, u64, usize)> = BTreeMap::new();
        for case in self.cases.iter() {
            let entry = wards.entry(case.ward.as_str()).or_default();
            entry.0 += u64::from(case.total_cases);
            entry.1 += u64::from(case.new_cases);
            entry.2 += 1;
        }
        wards
            .into_iter()
            .map(|(ward, (total_cases, new_cases, diseases))| WardSummary {
                ward: ward.to_string(),
                total_cases,
                new_cases,
                diseases,
                risk_level: classifier::case_status(
                    u32::try_from(total_cases).unwrap_or(u32::MAX),
                ),
            })
            .collect()
    }

    /// Per-drug stock summed across hospitals, ordered by drug name.
    pub fn medicine_summary(&self) -> Vec<MedicineSummary> {
        let mut totals: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for hospital in self.hospitals.iter() {
            for (name, medicine) in &hospital.medicines {
                let entry = totals.entry(name.as_str()).or_default();
                entry.0 += u64::from(medicine.stock);
                entry.1 += u64::from(medicine.required);
            }
        }
        totals
            .into_iter()
            .map(|(name, (stock, required))| MedicineSummary {
                name: name.to_string(),
                stock,
                required,
                status: classifier::medicine_status(
                    u32::try_from(stock).unwrap_or(u32::MAX),
                    u32::try_from(required).unwrap_or(u32::MAX),
                ),
            })
            .collect()
    }

    /// Case records placed at the first hospital of their ward, highest
    /// totals first.
    pub fn heatmap(&self) -> Vec<HeatPoint> {
        let mut coords: HashMap<&str, (Option<f64>, Option<f64>)> = HashMap::new();
        for hospital in self.hospitals.iter().rev() {
            coords
                .entry(hospital.ward.as_str())
                .or_insert((hospital.latitude, hospital.longitude));
        }
        let mut points: Vec<HeatPoint> = self
            .cases
            .iter()
            .map(|case| {
                let (latitude, longitude) =
                    coords.get(case.ward.as_str()).copied().unwrap_or((None, None));
                HeatPoint {
                    ward: case.ward.clone(),
                    disease: case.disease.clone(),
                    total_cases: case.total_cases,
                    new_cases: case.new_cases,
                    risk_level: case.status,
                    intensity: classifier::heat_intensity(case.status),
                    latitude,
                    longitude,
                }
            })
            .collect();
        points.sort_by(|a, b| b.total_cases.cmp(&a.total_cases));
        points
    }

    fn refresh_stats(&mut self) {
        let total_cases = self.cases.iter().map(|c| u64::from(c.total_cases)).sum();
        // Over-capacity hospitals count negative; only the city total clamps.
        let free_beds: i64 = self
            .hospitals
            .iter()
            .map(|h| i64::from(h.total_beds) - i64::from(h.occupied_beds))
            .sum();
        let available_beds = u64::try_from(free_beds).unwrap_or(0);
        let avg_vaccination_rate = if self.vaccinations.is_empty() {
            0.0
        } else {
            let sum: f64 = self.vaccinations.iter().map(|v| v.vaccination_rate).sum();
            classifier::round1(sum / self.vaccinations.len() as f64)
        };
        let active_alerts = self.alerts.iter().filter(|a| a.is_active).count() as u64;

        self.stats = AggregateStats {
            total_cases,
            available_beds,
            avg_vaccination_rate,
            active_alerts,
        };
    }
}

fn put<E: Entity>(collection: &mut Collection<E>, record: E) -> E {
    let (outcome, stored) = collection.upsert(record);
    match outcome {
        Upsert::Inserted => tracing::debug!(kind = E::KIND, key = %stored.key(), "Record inserted"),
        Upsert::Replaced => tracing::debug!(kind = E::KIND, key = %stored.key(), "Record replaced"),
    }
    stored.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::*;

    fn hospital(id: i64, ward: &str, total_beds: u32, occupied_beds: u32) -> HospitalRecord {
        HospitalRecord {
            id,
            name: format!("Hospital {id}"),
            ward: ward.to_string(),
            total_beds,
            occupied_beds,
            available_beds: 0,
            icu_beds: 10,
            occupied_icu: 5,
            available_icu: 0,
            ventilators: 8,
            available_ventilators: 4,
            occupancy_rate: 0.0,
            occupancy_status: OccupancyStatus::Low,
            over_capacity: false,
            medicines: BTreeMap::new(),
            latitude: Some(12.9),
            longitude: Some(77.6),
            updated_at: Utc::now(),
        }
    }

    fn vaccination(ward: &str, total_population: u32, vaccinated: u32, target: u32) -> VaccinationRecord {
        VaccinationRecord {
            ward: ward.to_string(),
            name: String::new(),
            total_population,
            vaccinated,
            vaccination_rate: 0.0,
            target_population: target,
            remaining_target: 0,
            status: VaccinationStatus::Critical,
            priority: VaccinationPriority::Urgent,
            last_campaign: None,
            next_campaign: None,
            updated_at: Utc::now(),
        }
    }

    fn alert(message: &str) -> NewAlert {
        NewAlert {
            id: None,
            alert_type: AlertType::Warning,
            title: String::new(),
            message: message.to_string(),
            ward: None,
            severity: AlertSeverity::High,
        }
    }

    #[test]
    fn upsert_case_derives_critical_status() {
        let mut store = EntityStore::new();
        let record = store.upsert_case("Ward-3", "Dengue", 15, 67);
        assert_eq!(record.status, CaseStatus::Critical);
        assert_eq!(store.aggregate_stats().total_cases, 67);
    }

    #[test]
    fn upsert_case_replaces_in_place() {
        let mut store = EntityStore::new();
        store.upsert_case("Ward-1", "Dengue", 12, 45);
        store.upsert_case("Ward-2", "Flu", 8, 32);
        store.upsert_case("Ward-1", "Dengue", 2, 47);

        let keys: Vec<_> = store.cases().map(|c| c.key().to_string()).collect();
        assert_eq!(keys, vec!["Ward-2/Flu", "Ward-1/Dengue"]);
        assert_eq!(store.case("Ward-1", "Dengue").unwrap().total_cases, 47);
        assert_eq!(store.aggregate_stats().total_cases, 79);
    }

    #[test]
    fn put_case_is_idempotent() {
        let mut store = EntityStore::new();
        let record = CaseRecord::new("Ward-5", "Malaria", 6, 38);
        store.put_case(record.clone());
        let once = store.snapshot();
        store.put_case(record);
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn hospital_update_unknown_id_is_not_found() {
        let mut store = EntityStore::new();
        let err = store.upsert_hospital_resource(99, 1, 1, 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "hospital", .. }));
    }

    #[test]
    fn hospital_update_recomputes_availability() {
        let mut store = EntityStore::new();
        store.put_hospital(hospital(1, "Ward-1", 100, 65));
        let updated = store.upsert_hospital_resource(1, 92, 9, 3).unwrap();
        assert_eq!(updated.available_beds, 8);
        assert_eq!(updated.available_icu, 1);
        assert_eq!(updated.occupancy_status, OccupancyStatus::Critical);
        assert!(!updated.over_capacity);
        assert_eq!(store.aggregate_stats().available_beds, 8);
    }

    #[test]
    fn hospital_over_capacity_is_flagged_not_rejected() {
        let mut store = EntityStore::new();
        store.put_hospital(hospital(1, "Ward-1", 100, 65));
        let updated = store.upsert_hospital_resource(1, 110, 5, 3).unwrap();
        assert!(updated.over_capacity);
        assert_eq!(updated.available_beds, 0);
        assert_eq!(updated.occupied_beds, 110);
    }

    #[test]
    fn available_beds_sums_across_hospitals() {
        let mut store = EntityStore::new();
        store.put_hospital(hospital(1, "Ward-1", 100, 65));
        store.put_hospital(hospital(2, "Ward-2", 80, 45));
        assert_eq!(store.aggregate_stats().available_beds, 70);
    }

    #[test]
    fn over_capacity_hospital_reduces_city_available_beds() {
        let mut store = EntityStore::new();
        store.put_hospital(hospital(1, "Ward-1", 100, 65));
        store.put_hospital(hospital(2, "Ward-2", 80, 45));
        store.upsert_hospital_resource(2, 90, 5, 3).unwrap();

        assert_eq!(store.hospital(2).unwrap().available_beds, 0);
        assert_eq!(store.aggregate_stats().available_beds, 25);

        store.upsert_hospital_resource(1, 150, 5, 3).unwrap();
        assert_eq!(store.aggregate_stats().available_beds, 0);
    }

    #[test]
    fn vaccination_update_derives_rate_status_priority() {
        let mut store = EntityStore::new();
        store.put_vaccination(vaccination("Ward-4", 40_000, 0, 36_000));
        let record = store.upsert_vaccination("Ward-4", 27_200).unwrap();
        assert_eq!(record.vaccination_rate, 68.0);
        assert_eq!(record.status, VaccinationStatus::Behind);
        assert_eq!(record.priority, VaccinationPriority::High);
        assert_eq!(record.remaining_target, 8_800);
    }

    #[test]
    fn remaining_target_never_negative() {
        let mut store = EntityStore::new();
        store.put_vaccination(vaccination("Ward-3", 55_000, 0, 50_000));
        for vaccinated in [52_000, 50_000, 49_000, 10, 54_000] {
            let record = store.upsert_vaccination("Ward-3", vaccinated).unwrap();
            assert_eq!(record.remaining_target, 50_000u32.saturating_sub(vaccinated));
        }
    }

    #[test]
    fn vaccination_unknown_ward_is_not_found() {
        let mut store = EntityStore::new();
        assert!(store.upsert_vaccination("Ward-9", 10).is_err());
    }

    #[test]
    fn avg_vaccination_rate_is_unweighted_mean() {
        let mut store = EntityStore::new();
        store.put_vaccination(vaccination("Ward-1", 50_000, 42_500, 45_000)); // 85.0
        store.put_vaccination(vaccination("Ward-4", 1_000, 680, 900)); // 68.0
        assert_eq!(store.aggregate_stats().avg_vaccination_rate, 76.5);
    }

    #[test]
    fn alerts_get_sequential_ids_newest_first() {
        let mut store = EntityStore::new();
        let first = store.add_alert(alert("first"));
        let second = store.add_alert(alert("second"));
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.alerts()[0].message, "second");
        assert!(second.is_active);
        assert_eq!(store.aggregate_stats().active_alerts, 2);
    }

    #[test]
    fn alert_keeps_provided_id() {
        let mut store = EntityStore::new();
        let mut new = alert("explicit");
        new.id = Some(41);
        assert_eq!(store.add_alert(new).id, 41);
        assert_eq!(store.add_alert(alert("next")).id, 42);
    }

    #[test]
    fn bulk_load_recomputes_stats() {
        let mut source = EntityStore::new();
        source.upsert_case("Ward-1", "Dengue", 12, 45);
        let mut snapshot = source.snapshot();
        snapshot.stats.total_cases = 9_999;

        let store = EntityStore::from_snapshot(snapshot);
        assert_eq!(store.aggregate_stats().total_cases, 45);
    }

    #[test]
    fn ward_summaries_roll_up_diseases() {
        let mut store = EntityStore::new();
        store.upsert_case("Ward-1", "Dengue", 12, 45);
        store.upsert_case("Ward-1", "Flu", 3, 8);
        store.upsert_case("Ward-4", "COVID-19", 3, 18);

        let summaries = store.ward_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].ward, "Ward-1");
        assert_eq!(summaries[0].total_cases, 53);
        assert_eq!(summaries[0].diseases, 2);
        assert_eq!(summaries[0].risk_level, CaseStatus::High);
        assert_eq!(summaries[1].risk_level, CaseStatus::Low);
    }

    #[test]
    fn heatmap_joins_hospital_coordinates() {
        let mut store = EntityStore::new();
        store.put_hospital(hospital(1, "Ward-1", 100, 65));
        store.upsert_case("Ward-1", "Dengue", 12, 45);
        store.upsert_case("Ward-9", "Flu", 1, 70);

        let points = store.heatmap();
        assert_eq!(points[0].ward, "Ward-9");
        assert_eq!(points[0].intensity, 0.9);
        assert_eq!(points[0].latitude, None);
        assert_eq!(points[1].latitude, Some(12.9));
    }

    #[test]
    fn medicine_summary_sums_stock() {
        let mut store = EntityStore::new();
        let mut a = hospital(1, "Ward-1", 100, 65);
        a.medicines.insert("Oxygen".into(), MedicineStock::new(20, 40));
        let mut b = hospital(2, "Ward-2", 80, 45);
        b.medicines.insert("Oxygen".into(), MedicineStock::new(30, 25));
        store.put_hospital(a);
        store.put_hospital(b);

        let summary = store.medicine_summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].stock, 50);
        assert_eq!(summary[0].required, 65);
        assert_eq!(summary[0].status, MedicineStatus::Medium);
    }
}
