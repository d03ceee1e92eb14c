//! Read-only dashboard views computed from the current store.
//!
//! - `GET /api/stats`: headline numbers
//! - `GET /api/heatmap`: case hot spots with hospital coordinates
//! - `GET /api/wards`: per-ward case roll-up
//! - `GET /api/medicines`: per-drug stock across hospitals
//! - `GET /api/snapshot`: everything, for client bulk load

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{AggregateStats, HeatPoint, MedicineSummary, Snapshot, WardSummary};

pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<AggregateStats>, ApiError> {
    Ok(Json(ctx.core.read_store()?.aggregate_stats()))
}

pub async fn heatmap(State(ctx): State<ApiContext>) -> Result<Json<Vec<HeatPoint>>, ApiError> {
    Ok(Json(ctx.core.read_store()?.heatmap()))
}

pub async fn wards(State(ctx): State<ApiContext>) -> Result<Json<Vec<WardSummary>>, ApiError> {
    Ok(Json(ctx.core.read_store()?.ward_summaries()))
}

pub async fn medicines(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<MedicineSummary>>, ApiError> {
    Ok(Json(ctx.core.read_store()?.medicine_summary()))
}

pub async fn snapshot(State(ctx): State<ApiContext>) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(ctx.core.read_store()?.snapshot()))
}
