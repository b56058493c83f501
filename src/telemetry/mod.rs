// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Telemetry module - synthetic sensor samples and their generator

mod generator;

pub use generator::TelemetryGenerator;

use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default tick period in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

pub const TEMPERATURE_BASE: f64 = 50.0; // °C
pub const TEMPERATURE_VARIATION: f64 = 15.0;
pub const TEMPERATURE_PERIOD_SECS: f64 = 60.0;

pub const PRESSURE_BASE: f64 = 1.0; // bar
pub const PRESSURE_VARIATION: f64 = 0.3;
pub const PRESSURE_PERIOD_SECS: f64 = 45.0;

pub const POWER_BASE: f64 = 50.0; // MW
pub const POWER_VARIATION: f64 = 10.0;
pub const POWER_SINE_PERIOD_SECS: f64 = 30.0;
pub const POWER_COSINE_PERIOD_SECS: f64 = 40.0;

/// One telemetry sample, immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// °C
    pub temperature: f64,
    /// bar
    pub pressure: f64,
    /// MW
    pub power_output: f64,
    /// Tick number within the current run, starting at 1
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
}

impl TelemetrySample {
    pub fn new(temperature: f64, pressure: f64, power_output: f64) -> Self {
        Self {
            temperature,
            pressure,
            power_output,
            tick: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Closed-form waveform model. Output depends only on elapsed time.
#[derive(Debug, Clone)]
pub struct SignalModel {
    step_seconds: f64,
    elapsed_seconds: f64,
    ticks: u64,
}

impl SignalModel {
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            step_seconds: tick_interval_ms as f64 / 1000.0,
            elapsed_seconds: 0.0,
            ticks: 0,
        }
    }

    pub fn temperature_at(t: f64) -> f64 {
        TEMPERATURE_BASE + TEMPERATURE_VARIATION * (2.0 * PI * t / TEMPERATURE_PERIOD_SECS).sin()
    }

    pub fn pressure_at(t: f64) -> f64 {
        PRESSURE_BASE + PRESSURE_VARIATION * (2.0 * PI * t / PRESSURE_PERIOD_SECS).cos()
    }

    pub fn power_output_at(t: f64) -> f64 {
        POWER_BASE
            + POWER_VARIATION
                * (2.0 * PI * t / POWER_SINE_PERIOD_SECS).sin()
                * (2.0 * PI * t / POWER_COSINE_PERIOD_SECS).cos()
    }

    /// Sample the model at an arbitrary elapsed time
    pub fn sample_at(t: f64) -> TelemetrySample {
        TelemetrySample::new(
            Self::temperature_at(t),
            Self::pressure_at(t),
            Self::power_output_at(t),
        )
    }

    /// Advance one tick and sample at the new elapsed time
    pub fn advance(&mut self) -> TelemetrySample {
        self.ticks += 1;
        self.elapsed_seconds += self.step_seconds;
        let mut sample = Self::sample_at(self.elapsed_seconds);
        sample.tick = self.ticks;
        sample
    }

    pub fn reset(&mut self) {
        self.elapsed_seconds = 0.0;
        self.ticks = 0;
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
