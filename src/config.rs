use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "SevaNagar";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SIMULATION_SECS: u64 = 30;
pub const DEFAULT_RELOAD_SECS: u64 = 30;

/// Get the application data directory
/// ~/SevaNagar/ on all platforms, falling back to the working directory
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database file
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("sevanagar.db")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "sevanagar_lib=info,sevanagar=info,tower_http=info"
}

/// Where dashboard data comes from. Chosen once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Server persists to SQLite; client talks to a live server.
    #[default]
    Connected,
    /// Server keeps an in-memory database; client runs on sample data
    /// without touching the network.
    OfflineDemo,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime configuration shared by server and client.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub mode: RunMode,
    /// Static web UI served at `/` when set.
    pub web_dir: Option<PathBuf>,
    pub simulation_interval: Duration,
    pub reload_interval: Duration,
    /// Base URL the client connects to.
    pub server_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: default_db_path(),
            mode: RunMode::default(),
            web_dir: None,
            simulation_interval: Duration::from_secs(DEFAULT_SIMULATION_SECS),
            reload_interval: Duration::from_secs(DEFAULT_RELOAD_SECS),
            server_url: format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}"),
        }
    }
}

impl DashboardConfig {
    /// Build from `SEVANAGAR_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("SEVANAGAR_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("SEVANAGAR_PORT") {
            config.port = parse("SEVANAGAR_PORT", port)?;
        }
        if let Some(path) = lookup("SEVANAGAR_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(mode) = lookup("SEVANAGAR_MODE") {
            config.mode = RunMode::from_str(&mode, true).map_err(|_| ConfigError::Invalid {
                var: "SEVANAGAR_MODE",
                value: mode.clone(),
            })?;
        }
        if let Some(dir) = lookup("SEVANAGAR_WEB_DIR") {
            config.web_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("SEVANAGAR_SIMULATION_SECS") {
            config.simulation_interval = seconds("SEVANAGAR_SIMULATION_SECS", secs)?;
        }
        if let Some(secs) = lookup("SEVANAGAR_RELOAD_SECS") {
            config.reload_interval = seconds("SEVANAGAR_RELOAD_SECS", secs)?;
        }
        config.server_url = lookup("SEVANAGAR_URL")
            .unwrap_or_else(|| format!("http://{}:{}", config.host, config.port));

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var: "SEVANAGAR_HOST",
                value: self.host.clone(),
            })
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

fn seconds(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    match parse::<u64>(var, value.clone())? {
        0 => Err(ConfigError::Invalid { var, value }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn app_data_dir_named_after_app() {
        assert!(app_data_dir().ends_with("SevaNagar"));
        assert!(default_db_path().starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_without_env() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.server_url, "http://127.0.0.1:3000");
        assert_eq!(config.simulation_interval, Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("SEVANAGAR_PORT", "8080"),
            ("SEVANAGAR_MODE", "offline-demo"),
            ("SEVANAGAR_SIMULATION_SECS", "5"),
            ("SEVANAGAR_WEB_DIR", "public"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.mode, RunMode::OfflineDemo);
        assert_eq!(config.simulation_interval, Duration::from_secs(5));
        assert_eq!(config.web_dir, Some(PathBuf::from("public")));
        assert_eq!(config.server_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(DashboardConfig::from_lookup(lookup(&[("SEVANAGAR_PORT", "http")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup(&[("SEVANAGAR_MODE", "legacy")])).is_err());
        assert!(
            DashboardConfig::from_lookup(lookup(&[("SEVANAGAR_RELOAD_SECS", "0")])).is_err()
        );
    }

    #[test]
    fn bind_addr_parses() {
        let addr = DashboardConfig::default().bind_addr().unwrap();
        assert_eq!(addr.port(), 3000);
    }
}
