// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Error types for the control station

use thiserror::Error;

use crate::core::OperationalState;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ControlError>;

/// Recoverable failures raised by the station core
#[derive(Debug, Error)]
pub enum ControlError {
    /// The requested state change is not in the transition table
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: OperationalState,
        to: OperationalState,
    },

    /// A configuration value is outside its permitted range
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration {
        field: &'static str,
        reason: String,
    },

    /// The periodic ticker needs a tokio runtime to run on
    #[error("no tokio runtime available to drive the telemetry ticker")]
    NoRuntime,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ControlError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
