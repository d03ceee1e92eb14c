//! Shared types for the dashboard API layer.

use std::sync::Arc;

use serde::Deserialize;

use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// `POST /api/cases` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseInput {
    pub ward: String,
    pub disease: String,
    pub new_cases: u32,
    pub total_cases: u32,
}

/// `PUT /api/hospitals/:id` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalResourceInput {
    pub occupied_beds: u32,
    pub occupied_icu: u32,
    pub available_ventilators: u32,
}

/// `PUT /api/vaccinations/:ward` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationInput {
    pub vaccinated: u32,
}
