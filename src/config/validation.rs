//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{GateError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_device_config(&settings.device)?;
    validate_store_config(&settings.store, settings)?;
    validate_sync_config(&settings.sync)?;
    validate_panels_config(&settings.panels)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate device API configuration
fn validate_device_config(config: &super::DeviceConfig) -> Result<()> {
    config.base_url()?;

    if config.timeout_seconds == 0 {
        return Err(GateError::Config(
            "Device API timeout must be greater than 0".to_string()
        ));
    }

    if config.connection_check_timeout_seconds == 0 {
        return Err(GateError::Config(
            "Device connection check timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate hosted store configuration
///
/// The store is only required when something reads from or syncs into it.
fn validate_store_config(config: &super::StoreConfig, settings: &Settings) -> Result<()> {
    let needs_store = settings.sync.enabled
        || settings.data_source.students == super::DataSource::Hosted
        || settings.data_source.attendance == super::DataSource::Hosted;

    if !needs_store {
        return Ok(());
    }

    if config.url.is_empty() {
        return Err(GateError::Config(
            "Hosted store URL is required".to_string()
        ));
    }

    if config.api_key.is_empty() {
        return Err(GateError::Config(
            "Hosted store API key is required".to_string()
        ));
    }

    if config.students_table.is_empty() || config.attendance_table.is_empty() {
        return Err(GateError::Config(
            "Hosted store table names cannot be empty".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(GateError::Config(
            "Hosted store timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate synchronization configuration
fn validate_sync_config(config: &super::SyncConfig) -> Result<()> {
    if config.interval_minutes == 0 {
        return Err(GateError::Config(
            "Sync interval must be at least one minute".to_string()
        ));
    }

    if config.request_timeout_seconds == 0 {
        return Err(GateError::Config(
            "Sync request timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate panel polling intervals
fn validate_panels_config(config: &super::PanelsConfig) -> Result<()> {
    let intervals = [
        ("door", config.door_interval_ms),
        ("recognition", config.recognition_interval_ms),
        ("stats", config.stats_interval_ms),
        ("students", config.students_interval_ms),
        ("attendance", config.attendance_interval_ms),
    ];

    for (panel, interval) in intervals {
        if interval == 0 {
            return Err(GateError::Config(
                format!("Polling interval for the {} panel must be greater than 0", panel)
            ));
        }
    }

    Ok(())
}

/// Validate admin gate configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.admin_username.is_empty() || config.admin_password.is_empty() {
        return Err(GateError::Config(
            "Admin username and password are required".to_string()
        ));
    }

    if config.session_path.is_empty() {
        return Err(GateError::Config(
            "Session path is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(GateError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(GateError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
