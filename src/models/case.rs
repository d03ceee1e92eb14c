use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::CaseStatus;
use crate::classifier;
use crate::store::Entity;

/// Disease case counts for one ward. Keyed by `(ward, disease)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub ward: String,
    pub disease: String,
    pub new_cases: u32,
    pub total_cases: u32,
    /// Always derived from `total_cases`.
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl CaseRecord {
    pub fn new(ward: &str, disease: &str, new_cases: u32, total_cases: u32) -> Self {
        Self {
            ward: ward.to_string(),
            disease: disease.to_string(),
            new_cases,
            total_cases,
            status: classifier::case_status(total_cases),
            updated_at: Utc::now(),
        }
    }

    pub fn key(&self) -> CaseKey {
        CaseKey::new(&self.ward, &self.disease)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseKey {
    pub ward: String,
    pub disease: String,
}

impl CaseKey {
    pub fn new(ward: &str, disease: &str) -> Self {
        Self {
            ward: ward.to_string(),
            disease: disease.to_string(),
        }
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ward, self.disease)
    }
}

impl Entity for CaseRecord {
    type Key = CaseKey;
    const KIND: &'static str = "case";

    fn key(&self) -> CaseKey {
        CaseRecord::key(self)
    }

    fn derive(&mut self) {
        self.status = classifier::case_status(self.total_cases);
    }
}
