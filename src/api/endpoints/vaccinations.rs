use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, VaccinationInput};
use crate::models::VaccinationRecord;

/// `GET /api/vaccinations`
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<VaccinationRecord>>, ApiError> {
    let store = ctx.core.read_store()?;
    Ok(Json(store.vaccinations().cloned().collect()))
}

/// `PUT /api/vaccinations/:ward`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(ward): Path<String>,
    payload: Result<Json<VaccinationInput>, JsonRejection>,
) -> Result<Json<VaccinationRecord>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(ctx.core.record_vaccination(&ward, input.vaccinated)?))
}
