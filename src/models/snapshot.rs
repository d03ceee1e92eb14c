use serde::{Deserialize, Serialize};

use super::{AggregateStats, AlertRecord, CaseRecord, HospitalRecord, VaccinationRecord};

/// Full dashboard state, one array per entity kind, each newest-first.
///
/// `stats` is informational on the wire; receivers recompute it from the
/// arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub cases: Vec<CaseRecord>,
    #[serde(default)]
    pub hospitals: Vec<HospitalRecord>,
    #[serde(default)]
    pub vaccinations: Vec<VaccinationRecord>,
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
    #[serde(default)]
    pub stats: AggregateStats,
}
