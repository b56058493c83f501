//! Core module - state machine, event plumbing, ticker and the station facade

mod engine;
mod event_bus;
mod scheduler;
mod state_machine;

pub use engine::ControlStation;
pub use event_bus::{Event, EventBus, EventPayload, EventType, ListenerId, Listeners};
pub use scheduler::Ticker;
pub use state_machine::{OperationalState, StateMachine};

use serde::{Deserialize, Serialize};

use crate::control::ThresholdConfig;
use crate::telemetry::TelemetrySample;

/// Point-in-time view of the station for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationStatus {
    pub state: OperationalState,
    pub generating: bool,
    pub thresholds: ThresholdConfig,
    pub alert_count: usize,
    pub uptime_seconds: u64,
    pub last_sample: Option<TelemetrySample>,
}
