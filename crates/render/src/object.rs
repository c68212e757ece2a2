use glam::{Mat3, Vec3};
use soarscape_common::Color;

use crate::camera::{Camera, ScreenPoint};
use crate::face::Face;
use crate::surface::Surface;

/// Layer new objects land on unless told otherwise.
pub const DEFAULT_LAYER: u8 = 1;

/// Coordinate axis selector for [`SceneObject::mirror_axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A named mesh: deduplicated points plus faces referencing them by index.
///
/// Point indices are append-only and stay valid for the object's lifetime. The screen buffer is
/// scratch space rebuilt by every [`transform_for_camera`](Self::transform_for_camera).
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: String,
    points: Vec<Vec3>,
    faces: Vec<Face>,
    screen: Vec<ScreenPoint>,
    layer: u8,
    in_view: bool,
    hidden: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            faces: Vec::new(),
            screen: Vec::new(),
            layer: DEFAULT_LAYER,
            in_view: false,
            hidden: false,
        }
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: u8) {
        self.layer = layer;
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn screen_points(&self) -> &[ScreenPoint] {
        &self.screen
    }

    /// Whether any point was visible at the last transform.
    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Hidden objects stay registered but draw nothing.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Camera-space depth of the first point at the last transform, the depth-sort key.
    pub fn depth_key(&self) -> Option<f32> {
        self.screen.first().map(|p| p.depth)
    }

    /// Index of a point with these exact coordinates, appending it if new.
    pub fn add_point(&mut self, p: Vec3) -> usize {
        if let Some(i) = self.points.iter().position(|q| *q == p) {
            return i;
        }
        self.points.push(p);
        self.points.len() - 1
    }

    /// Add a face through `points`, computing its normal now when requested.
    pub fn add_face(&mut self, points: &[Vec3], color: Color, solid: bool, has_normal: bool) -> usize {
        let indices = points.iter().map(|&p| self.add_point(p)).collect();
        let mut face = Face::new(indices, color, solid, has_normal);
        if !face.compute_normal(&self.points) {
            tracing::warn!(object = %self.name, "degenerate face will not be drawn");
        }
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Split a quadrilateral into two triangles.
    ///
    /// The diagonal is picked by comparing the summed heights of the opposite corner pairs: a
    /// convex tile splits along the higher diagonal so it bulges up, a concave tile along the
    /// lower one so it dips.
    pub fn add_quad_tile(&mut self, corners: [Vec3; 4], color: Color, solid: bool, concave: bool) {
        let [c0, c1, c2, c3] = corners;
        let h02 = c0.z + c2.z;
        let h13 = c1.z + c3.z;
        let split_02 = if concave { h02 <= h13 } else { h02 >= h13 };
        if split_02 {
            self.add_face(&[c0, c1, c2], color, solid, true);
            self.add_face(&[c0, c2, c3], color, solid, true);
        } else {
            self.add_face(&[c0, c1, c3], color, solid, true);
            self.add_face(&[c1, c2, c3], color, solid, true);
        }
    }

    pub fn translate_by(&mut self, delta: Vec3) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    pub fn scale_by(&mut self, factor: f32) {
        self.scale_by_xyz(Vec3::splat(factor));
    }

    pub fn scale_by_xyz(&mut self, factors: Vec3) {
        for p in &mut self.points {
            *p *= factors;
        }
        self.refresh_normals();
    }

    /// Negate one coordinate of every point.
    pub fn mirror_axis(&mut self, axis: Axis) {
        for p in &mut self.points {
            match axis {
                Axis::X => p.x = -p.x,
                Axis::Y => p.y = -p.y,
                Axis::Z => p.z = -p.z,
            }
        }
        self.refresh_normals();
    }

    /// Move one existing point without deduplication.
    pub fn set_point(&mut self, index: usize, p: Vec3) {
        self.points[index] = p;
        if self.faces.iter().any(|f| f.has_normal() && f.indices().contains(&index)) {
            self.refresh_normals();
        }
    }

    /// Rewrite every point as `matrix * local[i] + origin`.
    ///
    /// `local` is the mesh in its own frame and must hold one entry per point.
    pub fn place(&mut self, local: &[Vec3], matrix: &Mat3, origin: Vec3) {
        assert_eq!(local.len(), self.points.len(), "local frame does not match mesh");
        for (p, l) in self.points.iter_mut().zip(local) {
            *p = *matrix * *l + origin;
        }
        self.refresh_normals();
    }

    /// Copy every face of `self` into `dest` as new, independent points.
    pub fn copy_faces_into(&self, dest: &mut SceneObject) {
        for face in &self.faces {
            let pts: Vec<Vec3> = face.indices().iter().map(|&i| self.points[i]).collect();
            dest.add_face(&pts, face.color(), face.is_solid(), face.has_normal());
        }
    }

    /// Append another mesh wholesale, keeping its points separate from ours.
    pub fn append(&mut self, other: &SceneObject) {
        let offset = self.points.len();
        self.points.extend_from_slice(&other.points);
        for face in &other.faces {
            let mut face = face.clone();
            face.offset_indices(offset);
            self.faces.push(face);
        }
    }

    fn refresh_normals(&mut self) {
        for face in &mut self.faces {
            if !face.compute_normal(&self.points) {
                tracing::trace!(object = %self.name, "face degenerate after update");
            }
        }
    }

    /// Project every point through `camera` into the screen buffer.
    pub fn transform_for_camera(&mut self, camera: &Camera) {
        self.screen.clear();
        self.screen.extend(
            self.points
                .iter()
                .map(|&p| camera.project(camera.to_camera_space(p))),
        );
        self.in_view = self.screen.iter().any(|p| p.visible);
        for face in &mut self.faces {
            face.shade(camera);
        }
    }

    /// Draw every face that is not turned away from the camera.
    pub fn draw(&self, camera: &Camera, surface: &mut dyn Surface) {
        if self.hidden || !self.in_view || self.screen.len() != self.points.len() {
            return;
        }
        let eye = camera.eye();
        for face in &self.faces {
            if face.is_back_facing(&self.points, eye) {
                continue;
            }
            face.draw(&self.screen, camera, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn add_point_deduplicates() {
        let mut obj = SceneObject::new("dedup");
        let a = obj.add_point(Vec3::new(1.0, 2.0, 3.0));
        let b = obj.add_point(Vec3::new(1.0, 2.0, 3.0));
        let c = obj.add_point(Vec3::new(1.0, 2.0, 3.5));
        assert_eq!(a, b);
        assert_ne!(c, a);
        assert_eq!(obj.points().len(), 2);
    }

    #[test]
    fn faces_share_points() {
        let mut obj = SceneObject::new("quad");
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        obj.add_quad_tile(corners, Color::WHITE, true, false);
        assert_eq!(obj.faces().len(), 2);
        assert_eq!(obj.points().len(), 4);
        for face in obj.faces() {
            assert!((face.normal().unwrap() - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn quad_tile_diagonal_follows_bulge() {
        // corners 0 and 2 are raised
        let corners = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let face_points = |obj: &SceneObject, face: usize| -> Vec<Vec3> {
            obj.faces()[face]
                .indices()
                .iter()
                .map(|&i| obj.points()[i])
                .collect()
        };
        let [c0, c1, c2, c3] = corners;

        let mut convex = SceneObject::new("convex");
        convex.add_quad_tile(corners, Color::WHITE, true, false);
        assert_eq!(face_points(&convex, 0), vec![c0, c1, c2]);
        assert_eq!(face_points(&convex, 1), vec![c0, c2, c3]);

        let mut concave = SceneObject::new("concave");
        concave.add_quad_tile(corners, Color::WHITE, true, true);
        assert_eq!(face_points(&concave, 0), vec![c0, c1, c3]);
        assert_eq!(face_points(&concave, 1), vec![c1, c2, c3]);
    }

    #[test]
    fn mutators_apply_to_every_point() {
        let mut obj = SceneObject::new("m");
        obj.add_face(
            &[Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0), Vec3::new(1.0, 2.0, 0.0)],
            Color::WHITE,
            true,
            true,
        );
        obj.translate_by(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(obj.points()[0], Vec3::new(2.0, 1.0, 0.0));
        obj.scale_by(2.0);
        assert_eq!(obj.points()[0], Vec3::new(4.0, 2.0, 0.0));
        obj.scale_by_xyz(Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(obj.points()[0], Vec3::new(4.0, 1.0, 0.0));
        obj.mirror_axis(Axis::Y);
        assert_eq!(obj.points()[0], Vec3::new(4.0, -1.0, 0.0));
        // mirroring reverses the winding, so the normal flips
        assert!((obj.faces()[0].normal().unwrap() + Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn copy_faces_creates_independent_points() {
        let mut src = SceneObject::new("src");
        src.add_face(&[Vec3::ZERO, Vec3::X, Vec3::Y], Color::WHITE, true, true);
        let mut dest = SceneObject::new("dest");
        src.copy_faces_into(&mut dest);
        dest.translate_by(Vec3::Z);
        assert_eq!(src.points()[0], Vec3::ZERO);
        assert_eq!(dest.points()[0], Vec3::Z);
        assert_eq!(dest.faces().len(), 1);
    }

    #[test]
    fn place_rotates_and_translates() {
        let mut obj = SceneObject::new("p");
        obj.add_face(&[Vec3::ZERO, Vec3::X, Vec3::Y], Color::WHITE, true, true);
        let local = obj.points().to_vec();
        let m = Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2);
        obj.place(&local, &m, Vec3::new(0.0, 0.0, 5.0));
        assert!((obj.points()[1] - Vec3::new(0.0, 1.0, 5.0)).length() < 1e-6);
        assert!((obj.faces()[0].normal().unwrap() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn in_view_if_any_point_visible() {
        let mut cam = Camera::default();
        cam.set_eye_and_focus(Vec3::new(-10.0, 0.0, 0.0), Vec3::ZERO);
        let mut obj = SceneObject::new("v");
        obj.add_face(
            &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)],
            Color::WHITE,
            false,
            false,
        );
        obj.transform_for_camera(&cam);
        assert!(!obj.screen_points()[0].visible);
        assert!(obj.screen_points()[1].visible);
        assert!(obj.is_in_view());
    }

    #[test]
    fn draw_is_noop_out_of_view() {
        let mut cam = Camera::default();
        cam.set_eye_and_focus(Vec3::new(-10.0, 0.0, 0.0), Vec3::ZERO);
        let mut obj = SceneObject::new("behind");
        obj.add_face(
            &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(-20.0, 1.0, 0.0)],
            Color::WHITE,
            false,
            false,
        );
        obj.transform_for_camera(&cam);
        let mut surface = RecordingSurface::new();
        obj.draw(&cam, &mut surface);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn triangle_draws_facing_eye_and_culls_turned_away() {
        let mut cam = Camera::default();
        let eye = Vec3::new(0.0, -10.0, 0.0);
        cam.set_eye_and_focus(eye, Vec3::ZERO);
        // triangle in the x-z plane; winding (a, b, c) gives normal -y, towards the eye
        let a = Vec3::new(-1.0, 0.0, -1.0);
        let b = Vec3::new(1.0, 0.0, -1.0);
        let c = Vec3::new(0.0, 0.0, 1.0);

        let mut facing = SceneObject::new("facing");
        facing.add_face(&[a, b, c], Color::WHITE, true, true);
        assert!(facing.faces()[0].normal().unwrap().dot(eye) > 0.0);
        facing.transform_for_camera(&cam);
        let mut surface = RecordingSurface::new();
        facing.draw(&cam, &mut surface);
        assert_eq!(surface.count_polygons(), 1);

        let mut away = SceneObject::new("away");
        away.add_face(&[a, c, b], Color::WHITE, true, true);
        away.transform_for_camera(&cam);
        let mut surface = RecordingSurface::new();
        away.draw(&cam, &mut surface);
        assert_eq!(surface.count_polygons(), 0);
    }

    #[test]
    fn degenerate_face_is_skipped() {
        let mut cam = Camera::default();
        cam.set_eye_and_focus(Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO);
        let mut obj = SceneObject::new("flat");
        obj.add_face(&[Vec3::ZERO, Vec3::X, Vec3::X * 2.0], Color::WHITE, true, true);
        obj.transform_for_camera(&cam);
        let mut surface = RecordingSurface::new();
        obj.draw(&cam, &mut surface);
        assert_eq!(surface.count_polygons(), 0);
    }

    #[test]
    fn two_point_outline_draws_even_when_normal_requested() {
        let mut cam = Camera::default();
        cam.set_eye_and_focus(Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO);
        let mut obj = SceneObject::new("wire");
        obj.add_face(&[Vec3::new(-1.0, 0.0, 0.0), Vec3::X], Color::WHITE, false, true);
        assert!(!obj.faces()[0].is_degenerate());
        obj.transform_for_camera(&cam);
        let mut surface = RecordingSurface::new();
        obj.draw(&cam, &mut surface);
        assert_eq!(surface.count_lines(), 1);
    }

    #[test]
    fn append_keeps_points_separate() {
        let mut a = SceneObject::new("a");
        a.add_face(&[Vec3::ZERO, Vec3::X, Vec3::Y], Color::WHITE, true, true);
        let b = a.clone();
        a.append(&b);
        assert_eq!(a.points().len(), 6);
        assert_eq!(a.faces()[1].indices(), &[3, 4, 5]);
    }
}
