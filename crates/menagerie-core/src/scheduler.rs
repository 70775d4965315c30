//! Repeating health-check driver.
//!
//! The core never schedules itself. A composition root builds a
//! [`TickScheduler`] and hands it the callback that runs
//! [`HabitManager::tick`](crate::HabitManager::tick) and persists the result.
//! The returned [`TickHandle`] owns the background task: cancelling or
//! dropping it stops the ticks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::habit::cadence::MIN_CADENCE_SECS;

/// Default period between health sweeps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    interval: Duration,
}

impl TickScheduler {
    /// The interval must be non-zero and strictly shorter than the minimum
    /// cadence so no decay transition can be skipped.
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() || interval >= Duration::from_secs(MIN_CADENCE_SECS) {
            return Err(ConfigError::InvalidValue {
                key: "tick.interval_secs".into(),
                message: format!(
                    "tick interval {interval:?} must be non-zero and below {MIN_CADENCE_SECS}s"
                ),
            });
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the ticking task on the current tokio runtime.
    ///
    /// `on_tick` receives the wall-clock instant of each firing. The first
    /// firing happens immediately. Slow callbacks delay later ticks rather
    /// than causing a burst.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn start<F>(&self, mut on_tick: F) -> TickHandle
    where
        F: FnMut(DateTime<Utc>) + Send + 'static,
    {
        let period = self.interval;
        info!(interval = ?period, "starting health tick");
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let now = Utc::now();
                debug!(%now, "health tick");
                on_tick(now);
            }
        });
        TickHandle { task: Some(task) }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Owner of a running tick task.
#[derive(Debug)]
pub struct TickHandle {
    task: Option<JoinHandle<()>>,
}

impl TickHandle {
    /// Stop ticking and wait for the task to wind down.
    pub async fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancellation is the expected outcome; nothing else can end the loop.
            let _ = task.await;
            info!("health tick stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn interval_must_beat_minimum_cadence() {
        assert!(TickScheduler::new(Duration::from_secs(10)).is_ok());
        assert!(TickScheduler::new(Duration::from_millis(14_999)).is_ok());
        assert!(TickScheduler::new(Duration::from_secs(15)).is_err());
        assert!(TickScheduler::new(Duration::ZERO).is_err());
        assert_eq!(TickScheduler::default().interval(), DEFAULT_TICK_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handle = TickScheduler::default().start(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(25)).await;
        // Immediate tick plus the ones at 10s and 20s.
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(handle.is_running());

        handle.cancel().await;
        let after_cancel = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handle = TickScheduler::default().start(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);

        let before = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }
}
