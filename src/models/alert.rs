use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{AlertSeverity, AlertType};

/// A public health alert. Alerts are kept newest-first and never expire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub ward: Option<String>,
    pub severity: AlertSeverity,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Alert as submitted by an operator, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    /// Caller-provided id; otherwise the store assigns `max + 1`.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub ward: Option<String>,
    pub severity: AlertSeverity,
}
