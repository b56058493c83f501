// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Event plumbing - synchronous listener sets and the broadcast event bus

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::alerts::Alert;
use crate::core::OperationalState;
use crate::telemetry::TelemetrySample;

/// Handle returned by [`Listeners::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ListenerFn<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Set of callbacks invoked synchronously, in registration order,
/// on whichever thread raises the event.
pub struct Listeners<T> {
    entries: RwLock<Vec<(ListenerId, ListenerFn<T>)>>,
    next_id: AtomicU64,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Invoke every listener. The list is copied first so a listener may
    /// subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<ListenerFn<T>> = self
            .entries
            .read()
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event types in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Telemetry,
    StateChanged,
    Alert,
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Telemetry(TelemetrySample),
    StateChanged(OperationalState),
    Alert(Alert),
}

/// Broadcast fan-out for asynchronous consumers of station events
pub struct EventBus {
    event_tx: broadcast::Sender<Event>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish_telemetry(&self, sample: &TelemetrySample) {
        self.publish_event(EventType::Telemetry, EventPayload::Telemetry(sample.clone()));
    }

    pub fn publish_state(&self, state: OperationalState) {
        self.publish_event(EventType::StateChanged, EventPayload::StateChanged(state));
    }

    pub fn publish_alert(&self, alert: &Alert) {
        self.publish_event(EventType::Alert, EventPayload::Alert(alert.clone()));
    }

    fn publish_event(&self, event_type: EventType, payload: EventPayload) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            event_type,
            timestamp: Utc::now(),
            payload,
        };
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}
