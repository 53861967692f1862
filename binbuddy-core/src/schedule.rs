//! Tick sources that tell the host when to run a refresh cycle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::refresh::UPDATE_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a tick fired.
pub enum TickReason {
    /// Mandatory refresh right after setup.
    Initial,
    /// Regular interval elapsed.
    Interval,
    /// Fixed local time of day reached.
    DailyAt,
    /// Someone asked for an immediate refresh.
    Requested,
}

/// Callback invoked on every tick.
pub type TickCallback = Arc<dyn Fn(TickReason) + Send + Sync>;

/// Host-side source of refresh ticks.
///
/// Implementations must not fire overlapping cycles for the same entry; the
/// callback is expected to hand the tick to a single consumer that runs
/// cycles one after another.
pub trait Scheduler {
    /// Register a callback to run on every tick.
    fn on_tick(&mut self, callback: TickCallback);

    /// Fire a tick now, outside the regular cadence.
    fn request_immediate_refresh(&self);
}

/// Scheduler firing once per interval and once a day at a fixed local time.
pub struct DailyScheduler {
    interval: Duration,
    daily_at: NaiveTime,
    callbacks: Arc<Mutex<Vec<TickCallback>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl DailyScheduler {
    /// Create a stopped scheduler.
    #[must_use]
    pub fn new(interval: Duration, daily_at: NaiveTime) -> Self {
        Self {
            interval,
            daily_at,
            callbacks: Arc::new(Mutex::new(Vec::new())),
            tasks: Vec::new(),
        }
    }

    /// Fire the initial tick and spawn the interval and time-of-day timers.
    ///
    /// Does nothing while the timers are already running. Must be called from
    /// within a Tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Scheduler already running");
            return;
        }
        fire(&self.callbacks, TickReason::Initial);

        let interval = self.interval;
        let callbacks = Arc::clone(&self.callbacks);
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                fire(&callbacks, TickReason::Interval);
            }
        }));

        let daily_at = self.daily_at;
        let callbacks = Arc::clone(&self.callbacks);
        self.tasks.push(tokio::spawn(async move {
            loop {
                let wait = until_next(Local::now().naive_local(), daily_at);
                debug!("Next time-of-day refresh in {}s", wait.as_secs());
                time::sleep(wait).await;
                fire(&callbacks, TickReason::DailyAt);
            }
        }));
    }

    /// Whether the timers have been started and not stopped since.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Stop all timers. Registered callbacks are kept.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Default for DailyScheduler {
    /// Once every 24 hours plus once a day at 01:00.
    fn default() -> Self {
        Self::new(UPDATE_INTERVAL, NaiveTime::MIN + TimeDelta::hours(1))
    }
}

impl Scheduler for DailyScheduler {
    fn on_tick(&mut self, callback: TickCallback) {
        match self.callbacks.lock() {
            Ok(mut callbacks) => callbacks.push(callback),
            Err(poisoned) => poisoned.into_inner().push(callback),
        }
    }

    fn request_immediate_refresh(&self) {
        fire(&self.callbacks, TickReason::Requested);
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn fire(callbacks: &Mutex<Vec<TickCallback>>, reason: TickReason) {
    let Ok(callbacks) = callbacks.lock() else {
        warn!(?reason, "Tick dropped, callback list poisoned");
        return;
    };
    debug!(?reason, listeners = callbacks.len(), "Refresh tick");
    for callback in callbacks.iter() {
        callback(reason);
    }
}

/// Time from `now` until the next occurrence of `at`, strictly in the future.
#[must_use]
pub fn until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 15)
            .and_then(|day| day.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn next_run_later_today() {
        let one_am = NaiveTime::from_hms_opt(1, 0, 0).expect("valid time");
        assert_eq!(until_next(at(0, 30), one_am), Duration::from_secs(30 * 60));
    }

    #[test]
    fn next_run_rolls_over_to_tomorrow() {
        let one_am = NaiveTime::from_hms_opt(1, 0, 0).expect("valid time");
        assert_eq!(
            until_next(at(1, 0), one_am),
            Duration::from_secs(24 * 60 * 60)
        );
        assert_eq!(
            until_next(at(23, 0), one_am),
            Duration::from_secs(2 * 60 * 60)
        );
    }

    #[test]
    fn requested_refresh_reaches_every_listener() {
        let mut scheduler = DailyScheduler::default();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        for _ in 0..2 {
            let sender = sender.clone();
            scheduler.on_tick(Arc::new(move |reason| {
                sender.send(reason).ok();
            }));
        }

        scheduler.request_immediate_refresh();

        assert_eq!(receiver.try_recv().ok(), Some(TickReason::Requested));
        assert_eq!(receiver.try_recv().ok(), Some(TickReason::Requested));
        assert!(receiver.try_recv().is_err(), "exactly one tick per listener");
    }

    #[tokio::test]
    async fn start_fires_initial_tick_first() {
        let mut scheduler = DailyScheduler::default();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        scheduler.on_tick(Arc::new(move |reason| {
            sender.send(reason).ok();
        }));

        scheduler.start();

        assert_eq!(receiver.recv().await, Some(TickReason::Initial));
        scheduler.stop();
    }

    #[tokio::test]
    async fn second_start_keeps_a_single_set_of_timers() {
        let mut scheduler = DailyScheduler::default();
        let (sender, mut receiver) = mpsc::unbounded_channel();
        scheduler.on_tick(Arc::new(move |reason| {
            sender.send(reason).ok();
        }));

        scheduler.start();
        scheduler.start();

        assert_eq!(scheduler.tasks.len(), 2);
        assert_eq!(receiver.try_recv().ok(), Some(TickReason::Initial));
        assert!(receiver.try_recv().is_err(), "initial tick fired once");

        scheduler.stop();
        assert!(!scheduler.is_running());
        scheduler.start();
        assert_eq!(receiver.try_recv().ok(), Some(TickReason::Initial));
        assert_eq!(scheduler.tasks.len(), 2);
    }
}
