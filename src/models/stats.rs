use serde::{Deserialize, Serialize};

use super::enums::{CaseStatus, MedicineStatus};

/// Dashboard headline numbers. Field names are shared with the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_cases: u64,
    pub available_beds: u64,
    /// Unweighted mean of per-ward rates, one decimal.
    pub avg_vaccination_rate: f64,
    pub active_alerts: u64,
}

/// Case totals across all diseases of one ward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardSummary {
    pub ward: String,
    pub total_cases: u64,
    pub new_cases: u64,
    pub diseases: usize,
    pub risk_level: CaseStatus,
}

/// Stock of one drug summed over all hospitals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSummary {
    pub name: String,
    pub stock: u64,
    pub required: u64,
    pub status: MedicineStatus,
}

/// One heatmap point: a case record placed at its ward's hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    pub ward: String,
    pub disease: String,
    pub total_cases: u32,
    pub new_cases: u32,
    pub risk_level: CaseStatus,
    pub intensity: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
