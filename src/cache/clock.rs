//! Clock Module
//!
//! Second-resolution time source for TTL bookkeeping. Every store reads
//! "now" through a [`Clock`] so the hot path never pays for a wall-clock
//! query, and tests can drive expiry with a [`ManualClock`] instead of
//! sleeping.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{trace, warn};

/// How often the coarse clock refreshes its timestamp.
pub const TICK: Duration = Duration::from_secs(1);

/// A source of Unix-second timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current Unix time in seconds.
    fn timestamp(&self) -> i64;
}

/// Clock handle held by each store.
pub type SharedClock = Arc<dyn Clock>;

// == Coarse Clock ==
/// Process-wide timestamp refreshed once per second by a background thread.
///
/// Readers do a single atomic load. The updater is started at most once per
/// process and runs for the lifetime of the process.
#[derive(Debug)]
pub struct CoarseClock {
    now: AtomicI64,
    /// False when the updater thread could not be started; reads then fall
    /// back to the wall clock so entries still expire.
    ticking: AtomicBool,
}

static GLOBAL: OnceLock<Arc<CoarseClock>> = OnceLock::new();

impl CoarseClock {
    /// Returns the process-wide clock, seeding it and starting its updater on
    /// first use. Later calls return the same instance.
    pub fn global() -> SharedClock {
        let clock: Arc<CoarseClock> = GLOBAL
            .get_or_init(|| {
                let clock = Arc::new(CoarseClock {
                    now: AtomicI64::new(wall_clock()),
                    ticking: AtomicBool::new(false),
                });
                clock.start_updater();
                clock
            })
            .clone();
        clock
    }

    fn start_updater(self: &Arc<Self>) {
        let clock = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("kvcache-clock".to_string())
            .spawn(move || loop {
                thread::sleep(TICK);
                let now = wall_clock();
                clock.now.store(now, Ordering::Relaxed);
                trace!(now, "clock tick");
            });

        match spawned {
            Ok(_) => self.ticking.store(true, Ordering::Relaxed),
            Err(err) => warn!("Failed to start clock updater, reading wall clock instead: {}", err),
        }
    }
}

impl Clock for CoarseClock {
    fn timestamp(&self) -> i64 {
        if self.ticking.load(Ordering::Relaxed) {
            self.now.load(Ordering::Relaxed)
        } else {
            wall_clock()
        }
    }
}

fn wall_clock() -> i64 {
    Utc::now().timestamp()
}

// == Manual Clock ==
/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Starts at the current wall-clock second.
    pub fn starting_now() -> Self {
        Self::new(wall_clock())
    }

    /// Moves the clock forward by whole seconds of `by`.
    pub fn advance(&self, by: Duration) {
        let secs = i64::try_from(by.as_secs()).unwrap_or(i64::MAX);
        self.now.fetch_add(secs, Ordering::Relaxed);
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn timestamp(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }
}
