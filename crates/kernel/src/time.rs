use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic millisecond clock the scheduler paces itself against.
pub trait TimeSource {
    /// Milliseconds since an arbitrary fixed origin; never decreases.
    fn now_millis(&self) -> u64;
    /// Idle for roughly `millis`. Best effort.
    fn sleep_millis(&self, millis: u64);
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    origin: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTime {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_millis(&self, millis: u64) {
        std::thread::sleep(Duration::from_millis(millis));
    }
}

/// Deterministic time for tests and headless runs.
///
/// Clones share one counter, so a test can keep a clone and advance time from inside an
/// observer to simulate slow ticks. Sleeping advances the counter instantly.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Arc<AtomicU64>,
    slept: Arc<AtomicU64>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Total milliseconds spent in `sleep_millis`.
    pub fn total_slept(&self) -> u64 {
        self.slept.load(Ordering::SeqCst)
    }
}

impl TimeSource for ManualTime {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_millis(&self, millis: u64) {
        self.slept.fetch_add(millis, Ordering::SeqCst);
        self.advance(millis);
    }
}
