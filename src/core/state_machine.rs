// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Operational state machine - IDLE / RUNNING / FAULT

use std::fmt;

use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::event_bus::{ListenerId, Listeners};
use crate::error::{ControlError, Result};

/// Operational state of the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationalState {
    /// Not executing control logic
    #[default]
    Idle,
    /// Actively monitoring telemetry
    Running,
    /// A threshold was breached; requires reset
    Fault,
}

impl OperationalState {
    pub const ALL: [OperationalState; 3] = [
        OperationalState::Idle,
        OperationalState::Running,
        OperationalState::Fault,
    ];

    /// Whether `self -> to` is in the transition table
    pub fn can_transition_to(self, to: OperationalState) -> bool {
        use OperationalState::*;
        matches!(
            (self, to),
            (Idle, Running) | (Running, Idle) | (Running, Fault) | (Fault, Idle)
        )
    }
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationalState::Idle => "IDLE",
            OperationalState::Running => "RUNNING",
            OperationalState::Fault => "FAULT",
        };
        f.write_str(s)
    }
}

/// Guards the current state and notifies listeners on every accepted transition
pub struct StateMachine {
    current: Mutex<OperationalState>,
    // Serialises notification so listeners observe transitions in order.
    // Reentrant: a listener may itself request a transition.
    notify_gate: ReentrantMutex<()>,
    listeners: Listeners<OperationalState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(OperationalState::Idle),
            notify_gate: ReentrantMutex::new(()),
            listeners: Listeners::new(),
        }
    }

    pub fn current(&self) -> OperationalState {
        *self.current.lock()
    }

    /// Attempt a transition. Rejected transitions leave the state untouched.
    pub fn transition(&self, target: OperationalState) -> Result<()> {
        self.transition_if(None, target)
    }

    /// Transition only if the machine is currently in `expected`.
    /// The check and the update happen under one lock.
    pub fn transition_from(&self, expected: OperationalState, target: OperationalState) -> Result<()> {
        self.transition_if(Some(expected), target)
    }

    fn transition_if(&self, expected: Option<OperationalState>, target: OperationalState) -> Result<()> {
        let _gate = self.notify_gate.lock();

        let previous = {
            let mut current = self.current.lock();
            let from = *current;
            let expected_ok = expected.map_or(true, |e| e == from);
            if !expected_ok || !from.can_transition_to(target) {
                warn!("Invalid state transition from {} to {}", from, target);
                return Err(ControlError::InvalidTransition { from, to: target });
            }
            *current = target;
            from
        };

        info!("State transition: {} -> {}", previous, target);
        self.listeners.notify(&target);
        Ok(())
    }

    /// Register a callback receiving the new state after each transition
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&OperationalState) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
