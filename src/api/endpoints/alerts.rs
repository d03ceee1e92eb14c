//! Alert endpoints.
//!
//! - `GET /api/alerts`: active alerts, newest-first
//! - `POST /api/alerts`: raise a new alert and broadcast it

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{AlertRecord, NewAlert};

pub async fn active(State(ctx): State<ApiContext>) -> Result<Json<Vec<AlertRecord>>, ApiError> {
    let store = ctx.core.read_store()?;
    Ok(Json(store.active_alerts().cloned().collect()))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<NewAlert>, JsonRejection>,
) -> Result<(StatusCode, Json<AlertRecord>), ApiError> {
    let Json(alert) = payload?;
    let record = ctx.core.raise_alert(alert)?;
    Ok((StatusCode::CREATED, Json(record)))
}
