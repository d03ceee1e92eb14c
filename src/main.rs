use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use sevanagar_lib::config::{DashboardConfig, RunMode};

/// SevaNagar municipal health dashboard.
#[derive(Parser, Debug)]
#[command(name = "sevanagar", version, about)]
struct Cli {
    /// Data source: `connected` (SQLite / live server) or `offline-demo`.
    #[arg(long, value_enum, global = true)]
    mode: Option<RunMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the dashboard server.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// SQLite database file.
        #[arg(long)]
        db: Option<PathBuf>,
        /// Directory with the static web UI.
        #[arg(long)]
        web_dir: Option<PathBuf>,
        /// Seconds between simulated case ticks.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        simulation_secs: Option<u64>,
    },
    /// Mirror a running server and log every change.
    Watch {
        /// Server base URL, e.g. http://127.0.0.1:3000
        #[arg(long)]
        url: Option<String>,
        /// Seconds between full snapshot reloads.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        reload_secs: Option<u64>,
    },
}

fn secs(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_secs)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    sevanagar_lib::init_tracing();

    let mut config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    let result = match cli.command {
        Command::Serve {
            host,
            port,
            db,
            web_dir,
            simulation_secs,
        } => {
            config.host = host.unwrap_or(config.host);
            config.port = port.unwrap_or(config.port);
            config.db_path = db.unwrap_or(config.db_path);
            config.web_dir = web_dir.or(config.web_dir);
            config.simulation_interval =
                secs(simulation_secs).unwrap_or(config.simulation_interval);
            sevanagar_lib::serve(config).await
        }
        Command::Watch { url, reload_secs } => {
            config.server_url = url.unwrap_or(config.server_url);
            config.reload_interval = secs(reload_secs).unwrap_or(config.reload_interval);
            sevanagar_lib::watch(config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
