//! Gliders, thermals and ridge lift, driven by the kernel clock and drawn through the scene
//! registry.
//!
//! # Invariants
//! - The atmosphere is owned by the [`Simulation`] and passed into every lift computation.
//! - Bodies hold no scene objects; the registry owns every mesh and bodies reach theirs by handle.
//! - A glider sinks by its polar's sink rate less the summed lift each tick and lands on the first
//!   tick its height reaches zero while descending.
//! - A thermal is removed on the first tick its age exceeds nose + mature + tail.
//! - The director is the first clock observer and is the only one ticking while paused.

pub mod atmosphere;
pub mod autopilot;
pub mod config;
pub mod error;
pub mod glider;
pub mod landscape;
pub mod lift;
pub mod meshes;
pub mod observers;
pub mod polar;
pub mod scenario;
pub mod simulation;
pub mod status;
pub mod trail;

pub use atmosphere::Atmosphere;
pub use autopilot::{Autopilot, PilotEvent};
pub use config::{
    AtmosphereConfig, CloudConfig, GliderConfig, LandscapeConfig, RidgeConfig, SimConfig,
    ViewConfig,
};
pub use error::SimError;
pub use glider::{FlightState, Glider, StepOutcome};
pub use landscape::Landscape;
pub use lift::{Cloud, Lifecycle, LiftField, LiftTarget, Ridge, bounded_lift};
pub use observers::{CloudObserver, CloudSpawner, Director, GliderObserver, TrailObserver};
pub use polar::{Polar, PolarPoint};
pub use scenario::Scenario;
pub use simulation::{CloudStep, Simulation};
pub use status::{GliderStatus, draw_hud};
pub use trail::Trail;

pub fn crate_info() -> &'static str {
    "soarscape-sim v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("sim"));
    }
}
