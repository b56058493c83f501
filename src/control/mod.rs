// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Control module - threshold configuration and telemetry evaluation

mod parameter;

pub use parameter::ControlParameter;

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alerts::{messages, AlertSeverity, AlertSink};
use crate::core::{OperationalState, StateMachine};
use crate::error::{ControlError, Result};
use crate::telemetry::TelemetrySample;

pub const DEFAULT_MAX_TEMPERATURE: f64 = 80.0; // °C
pub const DEFAULT_MAX_PRESSURE: f64 = 1.5; // bar
pub const TEMPERATURE_LIMIT: f64 = 200.0;
pub const PRESSURE_LIMIT: f64 = 10.0;

/// Upper bounds applied to incoming telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub max_temperature: f64,
    pub max_pressure: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_temperature: DEFAULT_MAX_TEMPERATURE,
            max_pressure: DEFAULT_MAX_PRESSURE,
        }
    }
}

impl ThresholdConfig {
    pub fn new(max_temperature: f64, max_pressure: f64) -> Self {
        Self {
            max_temperature,
            max_pressure,
        }
    }

    /// Check both limits; temperature is reported first
    pub fn validate(&self) -> Result<()> {
        if !(self.max_temperature > 0.0 && self.max_temperature <= TEMPERATURE_LIMIT) {
            return Err(ControlError::invalid_config(
                "max_temperature",
                format!("{} is outside (0, {}] °C", self.max_temperature, TEMPERATURE_LIMIT),
            ));
        }
        if !(self.max_pressure > 0.0 && self.max_pressure <= PRESSURE_LIMIT) {
            return Err(ControlError::invalid_config(
                "max_pressure",
                format!("{} is outside (0, {}] bar", self.max_pressure, PRESSURE_LIMIT),
            ));
        }
        Ok(())
    }

    pub fn as_parameters(&self) -> [ControlParameter; 2] {
        [
            ControlParameter::positive("Max Temperature", self.max_temperature, TEMPERATURE_LIMIT, "°C"),
            ControlParameter::positive("Max Pressure", self.max_pressure, PRESSURE_LIMIT, "bar"),
        ]
    }
}

/// Outcome of a single [`ControlEngine::evaluate_telemetry`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// False when the sample was ignored because the system was not running
    pub evaluated: bool,
    pub temperature_exceeded: bool,
    pub pressure_exceeded: bool,
    /// This evaluation moved the system into FAULT
    pub entered_fault: bool,
}

impl Evaluation {
    pub fn fault_detected(&self) -> bool {
        self.temperature_exceeded || self.pressure_exceeded
    }
}

/// Validates setpoints and evaluates telemetry against them
pub struct ControlEngine {
    thresholds: RwLock<ThresholdConfig>,
    state: Arc<StateMachine>,
    alerts: Arc<AlertSink>,
}

impl ControlEngine {
    pub fn new(thresholds: ThresholdConfig, state: Arc<StateMachine>, alerts: Arc<AlertSink>) -> Self {
        Self {
            thresholds: RwLock::new(thresholds),
            state,
            alerts,
        }
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        *self.thresholds.read()
    }

    pub fn parameters(&self) -> [ControlParameter; 2] {
        self.thresholds().as_parameters()
    }

    /// Returns false and raises a warning alert if either setpoint is out of range.
    /// Does not change the active thresholds.
    pub fn validate_configuration(&self, max_temperature: f64, max_pressure: f64) -> bool {
        self.check_configuration(max_temperature, max_pressure).is_ok()
    }

    /// Like [`ControlEngine::validate_configuration`] but returns the typed error
    pub fn check_configuration(&self, max_temperature: f64, max_pressure: f64) -> Result<()> {
        let result = ThresholdConfig::new(max_temperature, max_pressure).validate();
        if let Err(err) = &result {
            warn!("Rejected configuration: {}", err);
            let message = match err {
                ControlError::InvalidConfiguration { field: "max_temperature", .. } => {
                    messages::INVALID_TEMPERATURE
                }
                _ => messages::INVALID_PRESSURE,
            };
            self.alerts.add(AlertSeverity::Warning, message);
        }
        result
    }

    /// Replace the thresholds. Callers validate first; no check is repeated here.
    pub fn apply_configuration(&self, max_temperature: f64, max_pressure: f64) {
        *self.thresholds.write() = ThresholdConfig::new(max_temperature, max_pressure);
        self.alerts.add(AlertSeverity::Info, messages::CONFIG_APPLIED);
        info!(
            "Configuration applied: MaxTemp={}°C, MaxPress={} bar",
            max_temperature, max_pressure
        );
    }

    /// Check a sample against the thresholds. Ignored unless RUNNING.
    /// Both limits are checked on every sample.
    pub fn evaluate_telemetry(&self, sample: &TelemetrySample) -> Evaluation {
        let mut evaluation = Evaluation::default();
        if self.state.current() != OperationalState::Running {
            return evaluation;
        }
        evaluation.evaluated = true;

        let limits = self.thresholds();

        if sample.temperature > limits.max_temperature {
            self.alerts.add(
                AlertSeverity::Critical,
                format!(
                    "{} Current: {:.1}°C, Max: {:.1}°C",
                    messages::TEMPERATURE_EXCEEDED,
                    sample.temperature,
                    limits.max_temperature
                ),
            );
            warn!(
                "Temperature threshold exceeded: {:.1}°C > {:.1}°C",
                sample.temperature, limits.max_temperature
            );
            evaluation.temperature_exceeded = true;
        }

        if sample.pressure > limits.max_pressure {
            self.alerts.add(
                AlertSeverity::Critical,
                format!(
                    "{} Current: {:.2} bar, Max: {:.2} bar",
                    messages::PRESSURE_EXCEEDED,
                    sample.pressure,
                    limits.max_pressure
                ),
            );
            warn!(
                "Pressure threshold exceeded: {:.2} bar > {:.2} bar",
                sample.pressure, limits.max_pressure
            );
            evaluation.pressure_exceeded = true;
        }

        if evaluation.fault_detected() && self.state.transition(OperationalState::Fault).is_ok() {
            self.alerts.add(AlertSeverity::Critical, messages::SYSTEM_FAULTED);
            evaluation.entered_fault = true;
        }

        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ControlEngine, Arc<StateMachine>, Arc<AlertSink>) {
        let state = Arc::new(StateMachine::new());
        let alerts = Arc::new(AlertSink::default());
        let engine = ControlEngine::new(ThresholdConfig::default(), Arc::clone(&state), Arc::clone(&alerts));
        (engine, state, alerts)
    }

    fn running() -> (ControlEngine, Arc<StateMachine>, Arc<AlertSink>) {
        let (engine, state, alerts) = setup();
        state.transition(OperationalState::Running).unwrap();
        (engine, state, alerts)
    }

    #[test]
    fn test_ignored_unless_running() {
        let (engine, state, alerts) = setup();
        let hot = TelemetrySample::new(150.0, 5.0, 50.0);

        assert!(!engine.evaluate_telemetry(&hot).evaluated);
        state.transition(OperationalState::Running).unwrap();
        state.transition(OperationalState::Fault).unwrap();
        assert!(!engine.evaluate_telemetry(&hot).evaluated);

        assert!(alerts.is_empty());
        assert_eq!(state.current(), OperationalState::Fault);
    }

    #[test]
    fn test_temperature_breach_faults() {
        let (engine, state, alerts) = running();
        let result = engine.evaluate_telemetry(&TelemetrySample::new(85.0, 1.0, 50.0));

        assert!(result.temperature_exceeded && !result.pressure_exceeded);
        assert!(result.entered_fault);
        assert_eq!(state.current(), OperationalState::Fault);

        let log = alerts.snapshot();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|a| a.severity == AlertSeverity::Critical));
        assert!(log[0].message.contains("85.0"));
        assert!(log[0].message.contains("80.0"));
        assert_eq!(log[1].message, messages::SYSTEM_FAULTED);
    }

    #[test]
    fn test_value_at_limit_is_in_bounds() {
        let (engine, state, alerts) = running();
        let result = engine.evaluate_telemetry(&TelemetrySample::new(80.0, 1.5, 50.0));

        assert!(result.evaluated);
        assert!(!result.fault_detected());
        assert!(alerts.is_empty());
        assert_eq!(state.current(), OperationalState::Running);
    }

    #[test]
    fn test_both_breaches_reported() {
        let (engine, state, alerts) = running();
        let result = engine.evaluate_telemetry(&TelemetrySample::new(90.0, 2.0, 50.0));

        assert!(result.temperature_exceeded && result.pressure_exceeded);
        let log = alerts.snapshot();
        assert_eq!(log.len(), 3);
        assert!(log[0].message.starts_with(messages::TEMPERATURE_EXCEEDED));
        assert_eq!(log[1].message, "Pressure threshold exceeded! Current: 2.00 bar, Max: 1.50 bar");
        assert_eq!(log[2].message, messages::SYSTEM_FAULTED);
        assert_eq!(state.current(), OperationalState::Fault);
    }

    #[test]
    fn test_no_extra_fault_alert_when_transition_fails() {
        let (engine, state, alerts) = running();
        // A listener that moves the machine on before the engine transitions
        let inner = Arc::clone(&state);
        alerts.subscribe(move |alert| {
            if alert.message.starts_with(messages::PRESSURE_EXCEEDED) {
                let _ = inner.transition(OperationalState::Idle);
            }
        });

        let result = engine.evaluate_telemetry(&TelemetrySample::new(20.0, 3.0, 50.0));
        assert!(result.pressure_exceeded);
        assert!(!result.entered_fault);
        assert_eq!(alerts.len(), 1);
        assert_eq!(state.current(), OperationalState::Idle);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let (engine, _state, alerts) = setup();
        engine.apply_configuration(70.0, 2.0);
        alerts.clear();

        assert!(!engine.validate_configuration(250.0, 1.0));
        assert_eq!(engine.thresholds(), ThresholdConfig::new(70.0, 2.0));
        let warning = alerts.latest().unwrap();
        assert_eq!(warning.severity, AlertSeverity::Warning);
        assert_eq!(warning.message, messages::INVALID_TEMPERATURE);

        assert!(!engine.validate_configuration(100.0, 0.0));
        assert_eq!(alerts.latest().unwrap().message, messages::INVALID_PRESSURE);
        assert!(!engine.validate_configuration(f64::NAN, 1.0));
        assert_eq!(alerts.len(), 3);
    }

    #[test]
    fn test_validate_bounds() {
        let (engine, _state, alerts) = setup();
        assert!(engine.validate_configuration(200.0, 10.0));
        assert!(engine.validate_configuration(0.1, 0.01));
        assert!(alerts.is_empty());

        match ThresholdConfig::new(0.0, 1.0).validate() {
            Err(ControlError::InvalidConfiguration { field, .. }) => assert_eq!(field, "max_temperature"),
            other => panic!("unexpected {:?}", other),
        }
        match ThresholdConfig::new(50.0, 10.5).validate() {
            Err(ControlError::InvalidConfiguration { field, .. }) => assert_eq!(field, "max_pressure"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_apply_configuration_changes_limits() {
        let (engine, state, alerts) = running();
        engine.apply_configuration(60.0, 1.5);
        assert_eq!(alerts.latest().unwrap().message, messages::CONFIG_APPLIED);

        engine.evaluate_telemetry(&TelemetrySample::new(65.0, 1.0, 50.0));
        assert_eq!(state.current(), OperationalState::Fault);
        assert!(alerts.snapshot()[1].message.contains("Max: 60.0°C"));
    }

    #[test]
    fn test_parameters_mirror_thresholds() {
        let (engine, _, _) = setup();
        let [temp, press] = engine.parameters();
        assert_eq!(temp.current_value, DEFAULT_MAX_TEMPERATURE);
        assert_eq!(temp.unit, "°C");
        assert_eq!(press.max_value, PRESSURE_LIMIT);
        assert!(temp.is_in_bounds() && press.is_in_bounds());
    }
}
