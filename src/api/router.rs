//! Dashboard router.
//!
//! REST endpoints are nested under `/api/`, the delta stream lives at
//! `/ws`, and an optional static web UI is served as the fallback.
//!
//! Endpoint handlers use `State<ApiContext>`; the request logger runs as
//! the innermost layer around the API routes.

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::core_state::CoreState;

/// Build the dashboard router.
pub fn dashboard_router(core: Arc<CoreState>, web_dir: Option<PathBuf>) -> Router {
    build_router(ApiContext::new(core), web_dir)
}

fn build_router(ctx: ApiContext, web_dir: Option<PathBuf>) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/cases",
            get(endpoints::cases::list).post(endpoints::cases::upsert),
        )
        .route("/hospitals", get(endpoints::hospitals::list))
        .route(
            "/hospitals/:id",
            put(endpoints::hospitals::update_resources),
        )
        .route("/vaccinations", get(endpoints::vaccinations::list))
        .route(
            "/vaccinations/:ward",
            put(endpoints::vaccinations::update),
        )
        .route(
            "/alerts",
            get(endpoints::alerts::active).post(endpoints::alerts::create),
        )
        .route("/stats", get(endpoints::overview::stats))
        .route("/heatmap", get(endpoints::overview::heatmap))
        .route("/wards", get(endpoints::overview::wards))
        .route("/medicines", get(endpoints::overview::medicines))
        .route("/snapshot", get(endpoints::overview::snapshot))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    let ws_routes = Router::new()
        .route("/ws", get(websocket::ws_upgrade))
        .with_state(ctx);

    let router = Router::new().nest("/api", api).merge(ws_routes);

    let router = match web_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static web UI");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router.layer(CorsLayer::permissive())
}
