//! Incremental change messages pushed from the server to dashboard
//! clients.
//!
//! Wire format is a JSON object `{"type": "...", "data": {...}}` where
//! `data` carries the full post-mutation record.

use serde::{Deserialize, Serialize};

use crate::models::{AlertRecord, CaseRecord, HospitalRecord, VaccinationRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Delta {
    CaseUpdate(CaseRecord),
    HospitalUpdate(HospitalRecord),
    VaccinationUpdate(VaccinationRecord),
    NewAlert(AlertRecord),
}

impl Delta {
    /// Wire name of the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Delta::CaseUpdate(_) => "case_update",
            Delta::HospitalUpdate(_) => "hospital_update",
            Delta::VaccinationUpdate(_) => "vaccination_update",
            Delta::NewAlert(_) => "new_alert",
        }
    }
}
