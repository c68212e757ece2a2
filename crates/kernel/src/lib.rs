//! Simulation kernel: the fixed-period clock that drives every moving body.
//!
//! # Invariants
//! - Observers are notified once per tick in registration order.
//! - While paused only the first registered observer ticks.
//! - Structural changes requested mid-tick apply after the pass completes.
//! - An overrunning tick is followed immediately by the next; no catch-up burst.

pub mod clock;
pub mod time;

pub use clock::{
    Clock, ClockError, ClockHandle, ClockState, ClockStats, FnObserver, Flow, Observer,
    ObserverId, Schedule, observer_fn,
};
pub use time::{ManualTime, SystemTime, TimeSource};

pub fn crate_info() -> &'static str {
    "soarscape-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
