use glam::Vec3;
use soarscape_common::BodyId;
use soarscape_common::math::heading_vector;
use soarscape_render::{ObjectHandle, SceneObject};

/// Spacing of the points laid out behind a glider when its trail restarts.
const RESET_SPACING: f32 = 0.002;

/// Smoke trail behind one glider: a fixed-length polyline whose head follows the glider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trail {
    glider: BodyId,
    handle: ObjectHandle,
}

impl Trail {
    pub fn new(glider: BodyId, handle: ObjectHandle) -> Self {
        Self { glider, handle }
    }

    pub fn glider(&self) -> BodyId {
        self.glider
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// Shift every point one place back and put the head at `position`.
    pub fn follow(mesh: &mut SceneObject, position: Vec3) {
        let n = mesh.points().len();
        for i in (1..n).rev() {
            let prev = mesh.points()[i - 1];
            mesh.set_point(i, prev);
        }
        if n > 0 {
            mesh.set_point(0, position);
        }
    }

    /// Lay the whole trail out in a short straight line behind `position`.
    pub fn reset(mesh: &mut SceneObject, position: Vec3, heading: f32) {
        let back = -heading_vector(heading) * RESET_SPACING;
        for i in 0..mesh.points().len() {
            mesh.set_point(i, position + back * i as f32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshes::trail_mesh;
    use soarscape_common::Color;

    #[test]
    fn follow_shifts_points_back() {
        let mut mesh = trail_mesh("t", Vec3::ZERO, Vec3::X, 4, Color::WHITE);
        let before = mesh.points().to_vec();
        let head = Vec3::new(1.0, 0.0, 0.0);
        Trail::follow(&mut mesh, head);
        assert_eq!(mesh.points()[0], head);
        assert_eq!(&mesh.points()[1..], &before[..3]);
    }

    #[test]
    fn reset_straightens_behind_heading() {
        let mut mesh = trail_mesh("t", Vec3::ZERO, Vec3::X, 3, Color::WHITE);
        Trail::follow(&mut mesh, Vec3::new(5.0, 5.0, 5.0));
        let p = Vec3::new(2.0, 0.0, 1.0);
        Trail::reset(&mut mesh, p, std::f32::consts::FRAC_PI_2);
        assert_eq!(mesh.points()[0], p);
        assert!((mesh.points()[2] - (p - Vec3::Y * 2.0 * RESET_SPACING)).length() < 1e-6);
    }
}
