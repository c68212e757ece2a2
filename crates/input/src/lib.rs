//! Key intake: host key events, a bounded queue and the key-to-action mapping.
//!
//! # Invariants
//! - The queue never grows past its capacity; overflow drops the newest event.
//! - Steering keys act on both press and release; every other binding acts on press only.

pub mod action;
pub mod event;

pub use action::Action;
pub use event::{DEFAULT_QUEUE_CAPACITY, InputError, InputQueue, Key, KeyEvent};

pub fn crate_info() -> &'static str {
    "soarscape-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
