//! Shared types: vector math, orientation, colors, fonts, body identity, seeded randomness.
//!
//! # Invariants
//! - World axes: x east, y north, z up. Headings are radians counter-clockwise from +x.
//! - Identical seeds produce identical random sequences on every platform.

pub mod math;
pub mod rng;
pub mod types;

pub use math::{Basis, Mat3, Vec3};
pub use rng::SeededRng;
pub use types::{BodyId, Color, Font, FontStyle};

pub fn crate_info() -> &'static str {
    "soarscape-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
