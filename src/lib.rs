pub mod api;
pub mod broadcast;
pub mod classifier;
pub mod client;
pub mod config;
pub mod core_state;
pub mod db;
pub mod delta;
pub mod models;
pub mod reconciler;
pub mod seed;
pub mod simulation;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::DashboardConfig;
use crate::core_state::{CoreError, CoreState};
use crate::reconciler::TracingView;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Startup error: {0}")]
    Core(#[from] CoreError),
    #[error("Server error: {0}")]
    Server(#[from] api::ServerError),
    #[error("Signal error: {0}")]
    Signal(#[from] std::io::Error),
}

/// Initialize tracing once per process. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the dashboard server until Ctrl-C.
pub async fn serve(config: DashboardConfig) -> Result<(), AppError> {
    tracing::info!("{} server starting v{}", config::APP_NAME, config::APP_VERSION);

    let core = Arc::new(CoreState::open(&config)?);
    let mut server =
        api::start_dashboard_server(core.clone(), config.bind_addr()?, config.web_dir.clone())
            .await?;
    let simulation = simulation::spawn(core, config.simulation_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    simulation.abort();
    server.shutdown();
    server.wait().await;
    Ok(())
}

/// Run a headless dashboard client until Ctrl-C.
pub async fn watch(config: DashboardConfig) -> Result<(), AppError> {
    tracing::info!(
        mode = ?config.mode,
        url = %config.server_url,
        "{} client starting v{}",
        config::APP_NAME,
        config::APP_VERSION
    );

    let mut client = client::DashboardClient::new(&config, vec![Box::new(TracingView)]);
    tokio::select! {
        _ = client.run() => {}
        signal = tokio::signal::ctrl_c() => signal?,
    }
    tracing::info!("Client stopped");
    Ok(())
}
