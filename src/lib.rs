// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Control Station - control-room operator simulator core
//!
//! Generates deterministic synthetic telemetry, evaluates it against
//! configurable safety thresholds, drives an IDLE/RUNNING/FAULT state
//! machine and keeps a bounded alert log.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Control Station                       │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  sample  ┌──────────────┐   ┌───────────┐  │
//! │  │ Telemetry │ ───────→ │   Control    │ → │   Alert   │  │
//! │  │ Generator │          │   Engine     │   │   Sink    │  │
//! │  └───────────┘          └──────────────┘   └───────────┘  │
//! │        ↑                      ↓ FAULT            ↓        │
//! │  ┌───────────┐          ┌──────────────┐         │        │
//! │  │  Ticker   │          │ StateMachine │         │        │
//! │  └───────────┘          └──────────────┘         │        │
//! │        ↓                      ↓                  ↓        │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │                     Event Bus                       │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod alerts;
pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod telemetry;

// Re-exports for convenience
pub use alerts::{Alert, AlertSeverity, AlertSink};
pub use config::Config;
pub use control::{ControlEngine, ControlParameter, ThresholdConfig};
pub use core::{ControlStation, EventBus, OperationalState, StateMachine};
pub use error::{ControlError, Result};
pub use telemetry::{TelemetryGenerator, TelemetrySample};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "Control Station";
