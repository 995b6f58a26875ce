//! Recurring check scheduling with a tick-skip guard.
//!
//! One timer drives one cycle at a time. When a cycle outlives the polling
//! interval the next tick is skipped rather than overlapped, so at most one
//! sweep is ever in flight against the upstream origin.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use betawatch_common::ports::{Notifier, PageSource};
use betawatch_engine::cycle::{CycleDriver, CycleReport};
use betawatch_engine::registry::MonitorRegistry;

pub struct Scheduler<S, N> {
    driver: CycleDriver<S, N>,
    registry: Arc<Mutex<MonitorRegistry>>,
    interval: Duration,
    startup_delay: Duration,
    running: AtomicBool,
}

impl<S: PageSource, N: Notifier> Scheduler<S, N> {
    pub fn new(
        driver: CycleDriver<S, N>,
        registry: Arc<Mutex<MonitorRegistry>>,
        interval: Duration,
        startup_delay: Duration,
    ) -> Self {
        Self {
            driver,
            registry,
            interval,
            startup_delay,
            running: AtomicBool::new(false),
        }
    }

    /// Shared registry handle, for command layers that need read access.
    pub fn registry(&self) -> Arc<Mutex<MonitorRegistry>> {
        self.registry.clone()
    }

    /// Run one cycle now, unless the previous one is still in flight.
    pub async fn tick(&self) -> Option<CycleReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Previous check cycle still running, skipping tick");
            return None;
        }

        let report = {
            let mut registry = self.registry.lock().await;
            self.driver.run_cycle_once(&mut registry).await
        };
        self.running.store(false, Ordering::SeqCst);
        Some(report)
    }

    /// Delayed first sweep, then fixed-interval ticks. Runs until the
    /// future is dropped.
    pub async fn run(&self) {
        tokio::time::sleep(self.startup_delay).await;
        self.tick().await;

        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately; the startup sweep
        // above already covered it.
        timer.tick().await;

        loop {
            timer.tick().await;
            self.tick().await;
        }
    }
}
