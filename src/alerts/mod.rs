// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Alert log - bounded, thread-safe history of operator alerts

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ListenerId, Listeners};

/// Default number of alerts retained
pub const DEFAULT_ALERT_CAPACITY: usize = 100;

/// Canonical alert messages
pub mod messages {
    pub const TEMPERATURE_EXCEEDED: &str = "Temperature threshold exceeded!";
    pub const PRESSURE_EXCEEDED: &str = "Pressure threshold exceeded!";
    pub const SYSTEM_STARTED: &str = "System started successfully";
    pub const SYSTEM_STOPPED: &str = "System stopped";
    pub const SYSTEM_FAULTED: &str = "System entered FAULT state";
    pub const SYSTEM_RESET: &str = "System reset to IDLE";
    pub const CONFIG_APPLIED: &str = "Configuration applied successfully";
    pub const INVALID_TEMPERATURE: &str = "Invalid temperature setpoint (must be 0-200°C)";
    pub const INVALID_PRESSURE: &str = "Invalid pressure setpoint (must be 0-10 bar)";
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// A single alert entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Position in the overall alert stream, starting at 0
    pub sequence: u64,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.severity,
            self.message
        )
    }
}

struct AlertLog {
    entries: VecDeque<Alert>,
    next_sequence: u64,
}

/// Append-only alert history with FIFO eviction
pub struct AlertSink {
    capacity: usize,
    log: Mutex<AlertLog>,
    // Held across append and notify so listeners see alerts in sequence
    // order. Reentrant: a listener may raise another alert.
    notify_gate: ReentrantMutex<()>,
    listeners: Listeners<Alert>,
}

impl AlertSink {
    /// Create a sink holding at most `capacity` alerts (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            log: Mutex::new(AlertLog {
                entries: VecDeque::with_capacity(capacity + 1),
                next_sequence: 0,
            }),
            notify_gate: ReentrantMutex::new(()),
            listeners: Listeners::new(),
        }
    }

    /// Record an alert, evicting the oldest entry once over capacity
    pub fn add(&self, severity: AlertSeverity, message: impl Into<String>) -> Alert {
        let _gate = self.notify_gate.lock();
        let alert = {
            let mut log = self.log.lock();
            let alert = Alert {
                sequence: log.next_sequence,
                severity,
                message: message.into(),
                timestamp: Utc::now(),
            };
            log.next_sequence += 1;
            log.entries.push_back(alert.clone());
            if log.entries.len() > self.capacity {
                if let Some(evicted) = log.entries.pop_front() {
                    debug!("Evicted alert #{}", evicted.sequence);
                }
            }
            alert
        };

        self.listeners.notify(&alert);
        alert
    }

    pub fn clear(&self) {
        self.log.lock().entries.clear();
    }

    /// Copy of the current log, oldest first
    pub fn snapshot(&self) -> Vec<Alert> {
        self.log.lock().entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<Alert> {
        self.log.lock().entries.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.log.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register a callback invoked for every new alert
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Default for AlertSink {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_eviction() {
        let sink = AlertSink::default();
        for i in 1..=101 {
            sink.add(AlertSeverity::Info, format!("alert {}", i));
        }

        let alerts = sink.snapshot();
        assert_eq!(alerts.len(), 100);
        assert_eq!(alerts[0].message, "alert 2");
        assert_eq!(alerts[99].message, "alert 101");
        assert!(alerts.windows(2).all(|w| w[0].sequence + 1 == w[1].sequence));
    }

    #[test]
    fn test_one_eviction_per_add() {
        let sink = AlertSink::new(3);
        for i in 0..3 {
            sink.add(AlertSeverity::Warning, format!("w{}", i));
        }
        sink.add(AlertSeverity::Critical, "c");
        let messages: Vec<_> = sink.snapshot().into_iter().map(|a| a.message).collect();
        assert_eq!(messages, vec!["w1", "w2", "c"]);
    }

    #[test]
    fn test_clear() {
        let sink = AlertSink::default();
        sink.add(AlertSeverity::Info, "one");
        sink.add(AlertSeverity::Info, "two");
        sink.clear();
        assert!(sink.is_empty());
        assert!(sink.latest().is_none());

        let next = sink.add(AlertSeverity::Info, "three");
        assert_eq!(next.sequence, 2);
    }

    #[test]
    fn test_concurrent_producers_stay_bounded() {
        let sink = Arc::new(AlertSink::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..200 {
                        sink.add(AlertSeverity::Critical, format!("{}-{}", t, i));
                        assert!(sink.len() <= 50);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let alerts = sink.snapshot();
        assert_eq!(alerts.len(), 50);
        assert_eq!(alerts.last().unwrap().sequence, 799);
    }

    #[test]
    fn test_listener_sees_each_alert() {
        let sink = AlertSink::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let id = sink.subscribe(move |alert| seen_clone.lock().push(alert.severity));

        sink.add(AlertSeverity::Info, "a");
        sink.add(AlertSeverity::Critical, "b");
        assert!(sink.unsubscribe(id));
        sink.add(AlertSeverity::Warning, "c");

        assert_eq!(*seen.lock(), vec![AlertSeverity::Info, AlertSeverity::Critical]);
    }

    #[test]
    fn test_concurrent_listeners_see_sequence_order() {
        let sink = Arc::new(AlertSink::new(10));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        sink.subscribe(move |alert| seen_clone.lock().push(alert.sequence));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..250 {
                        sink.add(AlertSeverity::Info, format!("{}-{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 1000);
        assert!(seen.windows(2).all(|w| w[0] + 1 == w[1]));
    }

    #[test]
    fn test_listener_may_raise_alert() {
        let sink = Arc::new(AlertSink::default());
        let inner = Arc::clone(&sink);
        sink.subscribe(move |alert| {
            if alert.severity == AlertSeverity::Critical {
                inner.add(AlertSeverity::Info, "acknowledged");
            }
        });

        sink.add(AlertSeverity::Critical, "overheat");
        let messages: Vec<_> = sink.snapshot().into_iter().map(|a| a.message).collect();
        assert_eq!(messages, vec!["overheat", "acknowledged"]);
    }

    #[test]
    fn test_display_format() {
        let sink = AlertSink::default();
        let alert = sink.add(AlertSeverity::Warning, "check valve");
        let text = alert.to_string();
        assert!(text.ends_with("] [WARNING] check valve"));
        assert!(text.starts_with('['));
    }
}
