//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{GateError, Result};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub device: DeviceConfig,
    pub store: StoreConfig,
    pub sync: SyncConfig,
    pub panels: PanelsConfig,
    pub auth: AuthConfig,
    pub data_source: DataSourceConfig,
    pub logging: LoggingConfig,
}

/// Local device API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Named deployments of the gate, e.g. `phone` or `college`
    pub environments: HashMap<String, String>,
    pub current_env: String,
    /// Overrides the environment table when set
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub connection_check_timeout_seconds: u64,
}

/// Hosted store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub students_table: String,
    pub attendance_table: String,
    pub timeout_seconds: u64,
}

/// Synchronization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    pub enabled: bool,
    pub interval_minutes: u64,
    pub request_timeout_seconds: u64,
}

/// Polling intervals of the dashboard panels
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelsConfig {
    pub door_interval_ms: u64,
    pub recognition_interval_ms: u64,
    pub stats_interval_ms: u64,
    pub students_interval_ms: u64,
    pub attendance_interval_ms: u64,
}

/// Admin gate configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub session_path: String,
}

/// Where the roster and the attendance log are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The device API on the gate itself
    Local,
    /// The hosted store
    #[serde(alias = "supabase")]
    Hosted,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSourceConfig {
    pub students: DataSource,
    pub attendance: DataSource,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the rolling log file; empty disables file output
    pub file_path: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> std::result::Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("GATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }
}

impl DeviceConfig {
    /// Resolve the device API base URL, without a trailing slash
    pub fn base_url(&self) -> Result<String> {
        let url = match &self.base_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => self.environments.get(&self.current_env).cloned().ok_or_else(|| {
                GateError::Config(format!("Unknown device environment: {}", self.current_env))
            })?,
        };
        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connection_check_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_check_timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        let mut environments = HashMap::new();
        environments.insert("phone".to_string(), "http://192.168.187.113:5000".to_string());
        environments.insert("college".to_string(), "http://10.31.3.211:5000".to_string());

        Self {
            device: DeviceConfig {
                environments,
                current_env: "phone".to_string(),
                base_url: None,
                timeout_seconds: 10,
                connection_check_timeout_seconds: 5,
            },
            store: StoreConfig {
                url: String::new(),
                api_key: String::new(),
                students_table: "students".to_string(),
                attendance_table: "student_attendance".to_string(),
                timeout_seconds: 10,
            },
            sync: SyncConfig {
                enabled: true,
                interval_minutes: 5,
                request_timeout_seconds: 10,
            },
            panels: PanelsConfig {
                door_interval_ms: 1_000,
                recognition_interval_ms: 5_000,
                stats_interval_ms: 30_000,
                students_interval_ms: 10_000,
                attendance_interval_ms: 10_000,
            },
            auth: AuthConfig {
                admin_username: "admin".to_string(),
                admin_password: "admin123".to_string(),
                session_path: "gate-session.json".to_string(),
            },
            data_source: DataSourceConfig {
                students: DataSource::Local,
                attendance: DataSource::Local,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
                json: false,
            },
        }
    }
}
