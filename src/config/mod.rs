// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Configuration module

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::alerts::DEFAULT_ALERT_CAPACITY;
use crate::control::ThresholdConfig;
use crate::error::{ControlError, Result};
use crate::telemetry::DEFAULT_TICK_INTERVAL_MS;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Application version
    pub version: String,

    /// Log level
    pub log_level: String,

    /// Telemetry simulation
    pub telemetry: TelemetryConfig,

    /// Initial threshold limits
    pub thresholds: ThresholdConfig,

    /// Alert log
    pub alerts: AlertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Control Station".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            telemetry: TelemetryConfig::default(),
            thresholds: ThresholdConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Reject values the station cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.telemetry.tick_interval_ms == 0 {
            return Err(ControlError::invalid_config(
                "telemetry.tick_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.alerts.capacity == 0 {
            return Err(ControlError::invalid_config(
                "alerts.capacity",
                "must be greater than zero",
            ));
        }
        self.thresholds.validate()
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("control-station"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Telemetry simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Tick period in milliseconds; each tick advances simulated time by the same amount
    pub tick_interval_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Alert log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Maximum alerts retained before the oldest is evicted
    pub capacity: usize,

    /// Buffer size of the broadcast event bus
    pub event_buffer: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ALERT_CAPACITY,
            event_buffer: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, Config::default());

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thresholds]\nmax_temperature = 95.0\nmax_pressure = 2.5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.thresholds, ThresholdConfig::new(95.0, 2.5));
        assert_eq!(config.telemetry.tick_interval_ms, 1000);
        assert_eq!(config.alerts.capacity, 100);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thresholds]\nmax_temperature = 500.0\nmax_pressure = 1.0\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ControlError::InvalidConfiguration { field: "max_temperature", .. })
        ));

        std::fs::write(&path, "[telemetry]\ntick_interval_ms = 0\n").unwrap();
        assert!(Config::load(&path).is_err());

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(Config::load(&path), Err(ControlError::TomlDe(_))));
    }
}
