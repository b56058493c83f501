// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Periodic ticker for timed operations

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// A named task fired serially at a fixed period on a tokio runtime.
///
/// Each invocation runs to completion before the next tick is awaited, so
/// invocations never overlap. Late ticks are delayed rather than bunched.
pub struct Ticker {
    name: String,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn `task` on `runtime`; the first invocation happens one period from now
    pub fn spawn<F>(runtime: &Handle, name: &str, period: Duration, task: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let task_name = name.to_string();
        let handle = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                task();
            }
        });
        debug!("Scheduled ticker '{}' with interval {:?}", task_name, period);

        Self {
            name: name.to_string(),
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cancel future ticks. An invocation already running is not interrupted;
    /// callers that need quiescence must gate the task body themselves.
    pub fn cancel(self) {
        self.handle.abort();
        debug!("Cancelled ticker '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ticker_fires_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::spawn(&Handle::current(), "count", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ticker.name(), "count");

        tokio::time::sleep(Duration::from_millis(60)).await;
        ticker.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_cancel = count.load(Ordering::SeqCst);
        assert!(after_cancel > 0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn test_first_tick_waits_one_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::spawn(&Handle::current(), "slow", Duration::from_secs(3600), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        ticker.cancel();
    }
}
