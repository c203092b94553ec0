//! # timer
//!
//! why: run named periodic tasks whose running state is the one source of truth
//! relations: drives the puller for FollowerNode, may be shared by other node roles
//! what: TimerManager with register / start / stop / is_running

use crate::error::TimerError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Timer {
    callback: Callback,
    task: Option<JoinHandle<()>>,
}

/// Named periodic timers, each backed by one tokio task while running.
pub struct TimerManager {
    runtime: Handle,
    timers: Mutex<HashMap<String, Timer>>,
}

impl TimerManager {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Bind to the tokio runtime the caller is running on
    pub fn from_current() -> Result<Self, TimerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| TimerError::NoRuntime)
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Register (or replace) the callback behind `name`. A running timer
    /// keeps its old callback until restarted.
    pub fn register<F>(&self, name: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut timers = self.timers.lock();
        let timer = timers.entry(name.to_string()).or_insert_with(|| Timer {
            callback: Arc::new(|| {}),
            task: None,
        });
        timer.callback = Arc::new(callback);
    }

    /// Fire the callback every `interval`, first after one full interval.
    ///
    /// Restarting a running timer replaces its schedule. The callback runs
    /// on the timer's task and should return quickly.
    pub fn start(&self, name: &str, interval: Duration) -> Result<(), TimerError> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval {
                name: name.to_string(),
            });
        }

        let mut timers = self.timers.lock();
        let timer = timers
            .get_mut(name)
            .ok_or_else(|| TimerError::Unregistered {
                name: name.to_string(),
            })?;

        if let Some(task) = timer.task.take() {
            task.abort();
        }

        let callback = timer.callback.clone();
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        timer.task = Some(task);
        debug!(timer = name, ?interval, "timer started");
        Ok(())
    }

    /// Cancel the schedule; takes effect before the next tick.
    pub fn stop(&self, name: &str) -> Result<(), TimerError> {
        let mut timers = self.timers.lock();
        let timer = timers
            .get_mut(name)
            .ok_or_else(|| TimerError::Unregistered {
                name: name.to_string(),
            })?;

        if let Some(task) = timer.task.take() {
            task.abort();
            debug!(timer = name, "timer stopped");
        }
        Ok(())
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.timers
            .lock()
            .get(name)
            .and_then(|timer| timer.task.as_ref())
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        for timer in self.timers.get_mut().values_mut() {
            if let Some(task) = timer.task.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(timers: &TimerManager, name: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        timers.register(name, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval() {
        let timers = TimerManager::from_current().unwrap();
        let count = counting(&timers, "tick");

        timers.start("tick", Duration::from_millis(100)).unwrap();
        assert!(timers.is_running("tick"));

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_next_tick() {
        let timers = TimerManager::from_current().unwrap();
        let count = counting(&timers, "tick");

        timers.start("tick", Duration::from_millis(100)).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        timers.stop("tick").unwrap();
        assert!(!timers.is_running("tick"));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_schedule() {
        let timers = TimerManager::from_current().unwrap();
        let count = counting(&timers, "tick");

        timers.start("tick", Duration::from_millis(100)).unwrap();
        timers.start("tick", Duration::from_millis(100)).unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_timer_is_an_error() {
        let timers = TimerManager::from_current().unwrap();
        assert_eq!(
            timers.start("missing", Duration::from_millis(10)),
            Err(TimerError::Unregistered {
                name: "missing".into(),
            })
        );
        assert!(timers.stop("missing").is_err());
        assert!(!timers.is_running("missing"));
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let timers = TimerManager::from_current().unwrap();
        counting(&timers, "tick");
        assert!(matches!(
            timers.start("tick", Duration::ZERO),
            Err(TimerError::ZeroInterval { .. })
        ));
        assert!(!timers.is_running("tick"));
    }

    #[test]
    fn no_runtime_outside_tokio() {
        assert!(matches!(TimerManager::from_current(), Err(TimerError::NoRuntime)));
    }
}
