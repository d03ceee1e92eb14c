use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MedicineStatus, OccupancyStatus};
use crate::classifier;
use crate::store::Entity;

/// Stock of one drug at one hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineStock {
    pub stock: u32,
    pub required: u32,
    #[serde(default)]
    pub status: MedicineStatus,
}

impl MedicineStock {
    pub fn new(stock: u32, required: u32) -> Self {
        Self {
            stock,
            required,
            status: classifier::medicine_status(stock, required),
        }
    }
}

/// Bed, ICU, ventilator and medicine state of one hospital. Keyed by `id`.
///
/// `available_beds`, `available_icu`, `occupancy_rate`, `occupancy_status`
/// and `over_capacity` are recomputed from their inputs on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRecord {
    pub id: i64,
    pub name: String,
    pub ward: String,
    pub total_beds: u32,
    pub occupied_beds: u32,
    #[serde(default)]
    pub available_beds: u32,
    pub icu_beds: u32,
    pub occupied_icu: u32,
    #[serde(default)]
    pub available_icu: u32,
    pub ventilators: u32,
    pub available_ventilators: u32,
    #[serde(default)]
    pub occupancy_rate: f64,
    #[serde(default)]
    pub occupancy_status: OccupancyStatus,
    /// Set when occupied beds or ICU exceed capacity. Such writes are
    /// accepted, not rejected.
    #[serde(default)]
    pub over_capacity: bool,
    #[serde(default)]
    pub medicines: BTreeMap<String, MedicineStock>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for HospitalRecord {
    type Key = i64;
    const KIND: &'static str = "hospital";

    fn key(&self) -> i64 {
        self.id
    }

    fn derive(&mut self) {
        self.available_beds = self.total_beds.saturating_sub(self.occupied_beds);
        self.available_icu = self.icu_beds.saturating_sub(self.occupied_icu);
        self.occupancy_rate = classifier::percent(self.occupied_beds, self.total_beds);
        self.occupancy_status = classifier::occupancy_status(self.occupancy_rate);
        self.over_capacity =
            self.occupied_beds > self.total_beds || self.occupied_icu > self.icu_beds;
        for medicine in self.medicines.values_mut() {
            medicine.status = classifier::medicine_status(medicine.stock, medicine.required);
        }
    }
}
