//! Case endpoints.
//!
//! - `GET /api/cases`: all case records, newest-first
//! - `POST /api/cases`: upsert by `(ward, disease)` and broadcast

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CaseInput};
use crate::models::CaseRecord;

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<CaseRecord>>, ApiError> {
    let store = ctx.core.read_store()?;
    Ok(Json(store.cases().cloned().collect()))
}

pub async fn upsert(
    State(ctx): State<ApiContext>,
    payload: Result<Json<CaseInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CaseRecord>), ApiError> {
    let Json(input) = payload?;
    let record =
        ctx.core
            .record_case(&input.ward, &input.disease, input.new_cases, input.total_cases)?;
    Ok((StatusCode::CREATED, Json(record)))
}
