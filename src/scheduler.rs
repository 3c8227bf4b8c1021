//! Runs the collection cycle once immediately, then every `interval` until
//! stopped. A tick that finds the previous cycle still running is skipped,
//! never queued.

use crate::cycle::{CollectionCycle, CycleReport};
use crate::error::Result;
use crate::storage::format_timestamp;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Longest uninterrupted sleep, so a stop request is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_secs(1);

pub struct Scheduler {
    cycle: Mutex<CollectionCycle>,
    interval: Duration,
    stop: Arc<AtomicBool>,
    ticks: AtomicU64,
}

impl Scheduler {
    pub fn new(cycle: CollectionCycle, interval: Duration) -> Self {
        Self {
            cycle: Mutex::new(cycle),
            interval,
            stop: Arc::new(AtomicBool::new(false)),
            ticks: AtomicU64::new(0),
        }
    }

    /// Shared flag; setting it ends `run` after the current cycle.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Ticks attempted so far, including skipped ones.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Run one cycle unless one is already in flight (`None`).
    pub fn tick(&self) -> Option<Result<CycleReport>> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let guard = match self.cycle.try_lock() {
            Ok(g) => g,
            Err(TryLockError::Poisoned(p)) => p.into_inner(),
            Err(TryLockError::WouldBlock) => {
                warn!(tick, "previous cycle still running, tick skipped");
                return None;
            }
        };
        let result = guard.run_cycle();
        drop(guard);

        match &result {
            Ok(report) => info!(
                tick,
                timestamp = %format_timestamp(&report.timestamp),
                important = report.important,
                skipped = report.skipped,
                written = report.written,
                "Logged {} important processes.",
                report.important
            ),
            Err(e) => warn!(tick, error = %e, "cycle failed"),
        }
        Some(result)
    }

    /// Block until stopped. A zero interval runs a single cycle.
    pub fn run(&self) {
        if self.interval.is_zero() {
            self.tick();
            return;
        }
        info!(interval_ms = self.interval.as_millis() as u64, "scheduler started");
        let mut next = Instant::now();
        while !self.is_stopped() {
            self.tick();
            next += self.interval;
            // Missed deadlines are dropped, not replayed.
            let now = Instant::now();
            while next <= now {
                next += self.interval;
            }
            self.sleep_until(next);
        }
        info!(ticks = self.ticks(), "scheduler stopped");
    }

    fn sleep_until(&self, deadline: Instant) {
        loop {
            if self.is_stopped() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}
