//! Control station - command facade over the state machine, generator and control engine

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::info;

use super::event_bus::{Event, EventBus, ListenerId};
use super::state_machine::{OperationalState, StateMachine};
use super::StationStatus;
use crate::alerts::{messages, Alert, AlertSeverity, AlertSink};
use crate::config::Config;
use crate::control::{ControlEngine, ThresholdConfig};
use crate::error::Result;
use crate::telemetry::{TelemetryGenerator, TelemetrySample};

/// Main station - owns every component and wires telemetry into evaluation
pub struct ControlStation {
    config: Arc<Config>,
    // Serialises start/stop/reset across threads. Reentrant so a listener
    // may issue a nested command.
    command_gate: ReentrantMutex<()>,
    state: Arc<StateMachine>,
    alerts: Arc<AlertSink>,
    engine: Arc<ControlEngine>,
    generator: TelemetryGenerator,
    event_bus: Arc<EventBus>,
    last_sample: Arc<Mutex<Option<TelemetrySample>>>,
    start_time: Mutex<Option<Instant>>,
}

impl ControlStation {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let state = Arc::new(StateMachine::new());
        let alerts = Arc::new(AlertSink::new(config.alerts.capacity));
        let engine = Arc::new(ControlEngine::new(
            config.thresholds,
            Arc::clone(&state),
            Arc::clone(&alerts),
        ));
        let generator = TelemetryGenerator::new(config.telemetry.tick_interval_ms);
        let event_bus = Arc::new(EventBus::new(config.alerts.event_buffer));
        let last_sample = Arc::new(Mutex::new(None));

        {
            let bus = Arc::clone(&event_bus);
            let last = Arc::clone(&last_sample);
            generator.subscribe(move |sample: &TelemetrySample| {
                *last.lock() = Some(sample.clone());
                bus.publish_telemetry(sample);
            });
        }
        {
            // Runs on the tick context, so samples are evaluated in generation order
            let engine = Arc::clone(&engine);
            generator.subscribe(move |sample: &TelemetrySample| {
                engine.evaluate_telemetry(sample);
            });
        }
        {
            let bus = Arc::clone(&event_bus);
            state.subscribe(move |new_state: &OperationalState| bus.publish_state(*new_state));
        }
        {
            let bus = Arc::clone(&event_bus);
            alerts.subscribe(move |alert: &Alert| bus.publish_alert(alert));
        }

        info!("Control station initialized");
        Ok(Self {
            config,
            command_gate: ReentrantMutex::new(()),
            state,
            alerts,
            engine,
            generator,
            event_bus,
            last_sample,
            start_time: Mutex::new(None),
        })
    }

    /// Configuration the station was built with. Thresholds applied later
    /// are reported by [`ControlStation::thresholds`], not here.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the telemetry ticker on an explicit runtime
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.generator = self.generator.with_runtime(runtime);
        self
    }

    /// IDLE -> RUNNING and begin generating telemetry
    pub fn start(&self) -> Result<()> {
        let _command = self.command_gate.lock();
        self.state
            .transition_from(OperationalState::Idle, OperationalState::Running)?;

        if let Err(err) = self.sync_generator() {
            let _ = self
                .state
                .transition_from(OperationalState::Running, OperationalState::Idle);
            return Err(err);
        }

        self.alerts.add(AlertSeverity::Info, messages::SYSTEM_STARTED);
        info!("System started by user");
        Ok(())
    }

    /// RUNNING -> IDLE and halt telemetry
    pub fn stop(&self) -> Result<()> {
        let _command = self.command_gate.lock();
        self.state
            .transition_from(OperationalState::Running, OperationalState::Idle)?;
        self.sync_generator()?;
        self.alerts.add(AlertSeverity::Info, messages::SYSTEM_STOPPED);
        info!("System stopped by user");
        Ok(())
    }

    /// FAULT -> IDLE and halt telemetry
    pub fn reset(&self) -> Result<()> {
        let _command = self.command_gate.lock();
        self.state
            .transition_from(OperationalState::Fault, OperationalState::Idle)?;
        self.sync_generator()?;
        self.alerts.add(AlertSeverity::Info, messages::SYSTEM_RESET);
        info!("System reset by user");
        Ok(())
    }

    // Bring the generator in line with whatever state the machine is in now.
    // A listener may have issued a nested command during our transition, so
    // the state we just set is not necessarily the current one.
    fn sync_generator(&self) -> Result<()> {
        match self.state.current() {
            OperationalState::Running => {
                if self.generator.start()? {
                    *self.start_time.lock() = Some(Instant::now());
                }
            }
            OperationalState::Idle => {
                if self.generator.stop() {
                    *self.start_time.lock() = None;
                }
            }
            // Keeps ticking until reset
            OperationalState::Fault => {}
        }
        Ok(())
    }

    /// Validate, then apply new thresholds. Rejections leave the current
    /// thresholds in place and raise a warning alert.
    pub fn apply_configuration(&self, max_temperature: f64, max_pressure: f64) -> Result<()> {
        self.engine.check_configuration(max_temperature, max_pressure)?;
        self.engine.apply_configuration(max_temperature, max_pressure);
        Ok(())
    }

    /// Drive one telemetry tick by hand; `None` unless the generator is running
    pub fn tick(&self) -> Option<TelemetrySample> {
        self.generator.tick()
    }

    pub fn can_start(&self) -> bool {
        self.state.current() == OperationalState::Idle
    }

    pub fn can_stop(&self) -> bool {
        self.state.current() == OperationalState::Running
    }

    pub fn can_reset(&self) -> bool {
        self.state.current() == OperationalState::Fault
    }

    pub fn state(&self) -> OperationalState {
        self.state.current()
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.engine.thresholds()
    }

    /// Snapshot of the alert log, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.snapshot()
    }

    pub fn clear_alerts(&self) {
        self.alerts.clear();
    }

    pub fn last_sample(&self) -> Option<TelemetrySample> {
        self.last_sample.lock().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generator.is_running()
    }

    /// Seconds since the last successful start, 0 while stopped
    pub fn uptime(&self) -> u64 {
        self.start_time
            .lock()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    pub fn status(&self) -> StationStatus {
        StationStatus {
            state: self.state(),
            generating: self.is_generating(),
            thresholds: self.thresholds(),
            alert_count: self.alerts.len(),
            uptime_seconds: self.uptime(),
            last_sample: self.last_sample(),
        }
    }

    pub fn on_telemetry<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TelemetrySample) + Send + Sync + 'static,
    {
        self.generator.subscribe(listener)
    }

    pub fn on_state_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&OperationalState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn on_alert<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.alerts.subscribe(listener)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe_events()
    }

    pub fn state_machine(&self) -> &Arc<StateMachine> {
        &self.state
    }

    pub fn control_engine(&self) -> &Arc<ControlEngine> {
        &self.engine
    }

    pub fn alert_sink(&self) -> &Arc<AlertSink> {
        &self.alerts
    }
}
