// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Telemetry generator - ticks the signal model and publishes samples

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;
use tracing::{debug, info};

use super::{SignalModel, TelemetrySample};
use crate::core::{ListenerId, Listeners, Ticker};
use crate::error::{ControlError, Result};

struct GeneratorState {
    running: bool,
    // Bumped on every start so a cancelled ticker cannot deliver into a later run
    generation: u64,
    model: SignalModel,
    ticker: Option<Ticker>,
}

struct GeneratorInner {
    tick_interval: Duration,
    state: Mutex<GeneratorState>,
    // Held for the whole of a tick; stop() takes it to wait out an in-flight tick
    tick_gate: ReentrantMutex<()>,
    listeners: Listeners<TelemetrySample>,
}

impl GeneratorInner {
    fn tick(&self, generation: Option<u64>) -> Option<TelemetrySample> {
        let _gate = self.tick_gate.lock();

        let sample = {
            let mut state = self.state.lock();
            if !state.running {
                return None;
            }
            if generation.is_some_and(|g| g != state.generation) {
                return None;
            }
            state.model.advance()
        };

        debug!(
            "Tick {}: T={:.2}°C P={:.3} bar W={:.2} MW",
            sample.tick, sample.temperature, sample.pressure, sample.power_output
        );
        self.listeners.notify(&sample);
        Some(sample)
    }
}

/// Periodic synthetic telemetry source
pub struct TelemetryGenerator {
    inner: Arc<GeneratorInner>,
    runtime: Option<Handle>,
}

impl TelemetryGenerator {
    /// Create a generator. The ticker runs on the tokio runtime current at
    /// construction time, or at `start()` if there was none.
    pub fn new(tick_interval_ms: u64) -> Self {
        let tick_interval_ms = tick_interval_ms.max(1);
        Self {
            inner: Arc::new(GeneratorInner {
                tick_interval: Duration::from_millis(tick_interval_ms),
                state: Mutex::new(GeneratorState {
                    running: false,
                    generation: 0,
                    model: SignalModel::new(tick_interval_ms),
                    ticker: None,
                }),
                tick_gate: ReentrantMutex::new(()),
                listeners: Listeners::new(),
            }),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Run the ticker on an explicit runtime
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.inner.tick_interval
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.inner.state.lock().model.elapsed_seconds()
    }

    /// Begin ticking from t = 0. Returns `Ok(false)` if already running.
    pub fn start(&self) -> Result<bool> {
        let _gate = self.inner.tick_gate.lock();
        let mut state = self.inner.state.lock();
        if state.running {
            return Ok(false);
        }

        let runtime = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(ControlError::NoRuntime)?;

        state.running = true;
        state.generation += 1;
        state.model.reset();

        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        state.ticker = Some(Ticker::spawn(
            &runtime,
            "telemetry",
            self.inner.tick_interval,
            move || {
                inner.tick(Some(generation));
            },
        ));

        info!("Telemetry simulation started");
        Ok(true)
    }

    /// Halt ticking. Once this returns no further samples are emitted.
    /// Returns `false` if the generator was not running.
    pub fn stop(&self) -> bool {
        let ticker = {
            let _gate = self.inner.tick_gate.lock();
            let mut state = self.inner.state.lock();
            if !state.running {
                return false;
            }
            state.running = false;
            state.ticker.take()
        };

        if let Some(ticker) = ticker {
            ticker.cancel();
        }
        info!("Telemetry simulation stopped");
        true
    }

    /// Drive one tick by hand; the periodic ticker calls the same path.
    /// Returns `None` while stopped.
    pub fn tick(&self) -> Option<TelemetrySample> {
        self.inner.tick(None)
    }

    /// Register a callback for every emitted sample. Callbacks run on the
    /// ticker's thread.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TelemetrySample) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

impl Drop for TelemetryGenerator {
    fn drop(&mut self) {
        // The ticker closure holds a reference to the inner state
        self.stop();
    }
}
