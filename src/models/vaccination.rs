use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{VaccinationPriority, VaccinationStatus};
use crate::classifier;
use crate::store::Entity;

/// Vaccination coverage of one ward. Keyed by `ward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecord {
    pub ward: String,
    /// Human-readable area name, e.g. "Industrial Zone".
    #[serde(default)]
    pub name: String,
    pub total_population: u32,
    pub vaccinated: u32,
    /// `vaccinated / total_population * 100`, one decimal.
    #[serde(default)]
    pub vaccination_rate: f64,
    pub target_population: u32,
    /// `max(0, target_population - vaccinated)`.
    #[serde(default)]
    pub remaining_target: u32,
    #[serde(default)]
    pub status: VaccinationStatus,
    #[serde(default)]
    pub priority: VaccinationPriority,
    #[serde(default)]
    pub last_campaign: Option<NaiveDate>,
    #[serde(default)]
    pub next_campaign: Option<NaiveDate>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for VaccinationRecord {
    type Key = String;
    const KIND: &'static str = "vaccination";

    fn key(&self) -> String {
        self.ward.clone()
    }

    fn derive(&mut self) {
        self.vaccination_rate = classifier::percent(self.vaccinated, self.total_population);
        self.remaining_target = self.target_population.saturating_sub(self.vaccinated);
        self.status = classifier::vaccination_status(self.vaccination_rate);
        self.priority = classifier::vaccination_priority(self.vaccination_rate);
    }
}
