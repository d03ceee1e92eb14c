//! Built-in sample data: five wards, their hospitals, vaccination coverage
//! and a handful of alerts.
//!
//! Used to seed an empty database and as the offline-demo snapshot.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use crate::models::enums::{AlertSeverity, AlertType};
use crate::models::{
    AlertRecord, CaseRecord, HospitalRecord, MedicineStock, Snapshot, VaccinationRecord,
};
use crate::store::EntityStore;

const MEDICINES: [&str; 4] = ["Paracetamol", "Oxygen", "Antibiotics", "Vaccines"];

/// (ward, disease, new, total)
const CASES: [(&str, &str, u32, u32); 5] = [
    ("Ward-1", "Dengue", 12, 45),
    ("Ward-2", "Flu", 8, 32),
    ("Ward-3", "Dengue", 15, 67),
    ("Ward-4", "COVID-19", 3, 18),
    ("Ward-5", "Malaria", 6, 38),
];

struct HospitalSeed {
    name: &'static str,
    ward: &'static str,
    beds: (u32, u32),
    icu: (u32, u32),
    ventilators: (u32, u32),
    coords: (f64, f64),
    /// (stock, required) in `MEDICINES` order
    stock: [(u32, u32); 4],
}

const HOSPITALS: [HospitalSeed; 5] = [
    HospitalSeed {
        name: "SevaNagar General Hospital",
        ward: "Ward-1",
        beds: (100, 65),
        icu: (20, 15),
        ventilators: (15, 8),
        coords: (12.9716, 77.5946),
        stock: [(500, 200), (50, 30), (200, 150), (100, 80)],
    },
    HospitalSeed {
        name: "City Medical Center",
        ward: "Ward-2",
        beds: (80, 45),
        icu: (15, 10),
        ventilators: (12, 7),
        coords: (12.9352, 77.6245),
        stock: [(300, 150), (30, 25), (150, 100), (80, 60)],
    },
    HospitalSeed {
        name: "Emergency Care Hospital",
        ward: "Ward-3",
        beds: (120, 90),
        icu: (25, 20),
        ventilators: (20, 5),
        coords: (12.9239, 77.5937),
        stock: [(200, 300), (20, 40), (100, 200), (50, 100)],
    },
    HospitalSeed {
        name: "Community Health Center",
        ward: "Ward-4",
        beds: (60, 30),
        icu: (10, 5),
        ventilators: (8, 6),
        coords: (12.9147, 77.6120),
        stock: [(400, 100), (40, 20), (180, 80), (120, 50)],
    },
    HospitalSeed {
        name: "Rural Medical Center",
        ward: "Ward-5",
        beds: (70, 40),
        icu: (12, 8),
        ventilators: (10, 7),
        coords: (12.9048, 77.6340),
        stock: [(250, 120), (25, 20), (120, 100), (90, 70)],
    },
];

/// (ward, area, population, vaccinated, target, last campaign, next campaign)
type VaccinationSeed = (&'static str, &'static str, u32, u32, u32, (i32, u32, u32), (i32, u32, u32));

const VACCINATIONS: [VaccinationSeed; 5] = [
    ("Ward-1", "Central Business District", 50_000, 42_500, 45_000, (2024, 1, 15), (2024, 2, 15)),
    ("Ward-2", "Residential North", 45_000, 32_400, 40_000, (2024, 1, 10), (2024, 1, 25)),
    ("Ward-3", "Industrial Zone", 55_000, 50_050, 50_000, (2024, 1, 20), (2024, 3, 1)),
    ("Ward-4", "Suburban East", 40_000, 27_200, 36_000, (2024, 1, 5), (2024, 1, 20)),
    ("Ward-5", "Rural South", 48_000, 37_440, 43_200, (2024, 1, 12), (2024, 2, 1)),
];

/// (type, title, message, ward, severity)
const ALERTS: [(AlertType, &str, &str, &str, AlertSeverity); 3] = [
    (
        AlertType::Warning,
        "Dengue Alert - Ward 3",
        "Dengue outbreak detected in Ward-3",
        "Ward-3",
        AlertSeverity::High,
    ),
    (
        AlertType::Info,
        "Vaccination Drive",
        "Vaccination drive scheduled for Ward-4",
        "Ward-4",
        AlertSeverity::Medium,
    ),
    (
        AlertType::Success,
        "Health Advisory",
        "Ward-1 vaccination target achieved",
        "Ward-1",
        AlertSeverity::Low,
    ),
];

fn date((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Sample records in insertion order (oldest first).
pub(crate) fn cases() -> Vec<CaseRecord> {
    CASES
        .iter()
        .map(|&(ward, disease, new_cases, total)| CaseRecord::new(ward, disease, new_cases, total))
        .collect()
}

pub(crate) fn hospitals() -> Vec<HospitalRecord> {
    let now = Utc::now();
    HOSPITALS
        .iter()
        .zip(1..)
        .map(|(seed, id)| {
            let medicines: BTreeMap<String, MedicineStock> = MEDICINES
                .iter()
                .zip(seed.stock)
                .map(|(name, (stock, required))| (name.to_string(), MedicineStock::new(stock, required)))
                .collect();
            HospitalRecord {
                id,
                name: seed.name.to_string(),
                ward: seed.ward.to_string(),
                total_beds: seed.beds.0,
                occupied_beds: seed.beds.1,
                available_beds: 0,
                icu_beds: seed.icu.0,
                occupied_icu: seed.icu.1,
                available_icu: 0,
                ventilators: seed.ventilators.0,
                available_ventilators: seed.ventilators.1,
                occupancy_rate: 0.0,
                occupancy_status: Default::default(),
                over_capacity: false,
                medicines,
                latitude: Some(seed.coords.0),
                longitude: Some(seed.coords.1),
                updated_at: now,
            }
        })
        .collect()
}

pub(crate) fn vaccinations() -> Vec<VaccinationRecord> {
    let now = Utc::now();
    VACCINATIONS
        .iter()
        .map(|&(ward, name, population, vaccinated, target, last, next)| VaccinationRecord {
            ward: ward.to_string(),
            name: name.to_string(),
            total_population: population,
            vaccinated,
            vaccination_rate: 0.0,
            target_population: target,
            remaining_target: 0,
            status: Default::default(),
            priority: Default::default(),
            last_campaign: date(last),
            next_campaign: date(next),
            updated_at: now,
        })
        .collect()
}

pub(crate) fn alerts() -> Vec<AlertRecord> {
    let now = Utc::now();
    ALERTS
        .iter()
        .zip(1..)
        .map(|(&(alert_type, title, message, ward, severity), id)| AlertRecord {
            id,
            alert_type,
            title: title.to_string(),
            message: message.to_string(),
            ward: Some(ward.to_string()),
            severity,
            created_at: now,
            is_active: true,
        })
        .collect()
}

/// The full sample state as a newest-first snapshot with derived fields
/// and stats filled in.
pub fn sample_snapshot() -> Snapshot {
    let mut store = EntityStore::new();
    for record in cases() {
        store.put_case(record);
    }
    for record in hospitals() {
        store.put_hospital(record);
    }
    for record in vaccinations() {
        store.put_vaccination(record);
    }
    for record in alerts() {
        store.prepend_alert(record);
    }
    store.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::*;

    #[test]
    fn sample_snapshot_is_newest_first() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.cases[0].ward, "Ward-5");
        assert_eq!(snapshot.hospitals[0].id, 5);
        assert_eq!(snapshot.alerts[0].id, 3);
    }

    #[test]
    fn sample_stats() {
        let stats = sample_snapshot().stats;
        assert_eq!(stats.total_cases, 45 + 32 + 67 + 18 + 38);
        assert_eq!(stats.available_beds, 35 + 35 + 30 + 30 + 30);
        // 85.0, 72.0, 91.0, 68.0, 78.0
        assert_eq!(stats.avg_vaccination_rate, 78.8);
        assert_eq!(stats.active_alerts, 3);
    }

    #[test]
    fn sample_statuses_are_derived() {
        let snapshot = sample_snapshot();
        let ward3 = snapshot.cases.iter().find(|c| c.ward == "Ward-3").unwrap();
        assert_eq!(ward3.status, CaseStatus::Critical);

        let emergency = snapshot.hospitals.iter().find(|h| h.id == 3).unwrap();
        assert_eq!(emergency.occupancy_rate, 75.0);
        assert_eq!(emergency.occupancy_status, OccupancyStatus::High);
        assert_eq!(emergency.medicines["Oxygen"].status, MedicineStatus::Low);
        assert_eq!(emergency.medicines["Antibiotics"].status, MedicineStatus::Low);

        let industrial = snapshot.vaccinations.iter().find(|v| v.ward == "Ward-3").unwrap();
        assert_eq!(industrial.status, VaccinationStatus::Completed);
        assert_eq!(industrial.remaining_target, 0);
    }
}
