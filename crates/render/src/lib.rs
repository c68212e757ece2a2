//! Software scene renderer: meshes, faces, depth layers, camera and drawing surfaces.
//!
//! The registry owns every [`SceneObject`]; hosts hand it a [`Camera`] and a [`Surface`]
//! once per frame and it emits draw primitives in painter's order.
//!
//! # Invariants
//! - Point indices of a scene object are stable once assigned; points are deduplicated.
//! - Layers draw in ascending layer number; within a layer the furthest object draws first.
//! - A face whose normal points away from the eye is never drawn.
//! - A solid face fills only when every one of its points is in front of the camera.
//! - Lighting never brightens a face beyond its base color; fog then blends the result towards
//!   the camera background as distance grows.

mod camera;
mod canvas;
mod face;
mod layer;
mod object;
mod registry;
mod surface;

pub use camera::{Camera, CameraConfig, ScreenPoint};
pub use canvas::{Canvas, FrameError};
pub use face::Face;
pub use layer::DepthLayer;
pub use object::{Axis, DEFAULT_LAYER, SceneObject};
pub use registry::{FrameStats, ObjectHandle, ObjectRegistry, SceneError};
pub use surface::{DrawCommand, RecordingSurface, Surface};

pub fn crate_info() -> &'static str {
    "soarscape-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
