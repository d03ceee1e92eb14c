//! Hospital endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, HospitalResourceInput};
use crate::models::HospitalRecord;

/// `GET /api/hospitals`: with derived availability and occupancy.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<HospitalRecord>>, ApiError> {
    let store = ctx.core.read_store()?;
    Ok(Json(store.hospitals().cloned().collect()))
}

/// `PUT /api/hospitals/:id`: bed, ICU and ventilator counts.
pub async fn update_resources(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    payload: Result<Json<HospitalResourceInput>, JsonRejection>,
) -> Result<Json<HospitalRecord>, ApiError> {
    let Json(input) = payload?;
    let record = ctx.core.record_hospital_resources(
        id,
        input.occupied_beds,
        input.occupied_icu,
        input.available_ventilators,
    )?;
    Ok(Json(record))
}
