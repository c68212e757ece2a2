use glam::Vec3;
use soarscape_common::Color;

use crate::camera::{Camera, ScreenPoint};
use crate::surface::Surface;

/// Cross products shorter than this mark a face as degenerate.
const DEGENERATE_NORMAL_SQ: f32 = 1e-20;

/// An ordered loop of point indices into the owning [`SceneObject`](crate::SceneObject).
///
/// Solid faces are filled polygons; wireframe faces are open polylines over consecutive points
/// (repeat the first point to close an outline).
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    indices: Vec<usize>,
    color: Color,
    solid: bool,
    has_normal: bool,
    normal: Option<Vec3>,
    shaded: Option<Color>,
}

impl Face {
    pub(crate) fn new(indices: Vec<usize>, color: Color, solid: bool, has_normal: bool) -> Self {
        assert!(!indices.is_empty(), "a face needs at least one point");
        assert!(
            !solid || indices.len() >= 3,
            "a solid face needs at least three points, got {}",
            indices.len()
        );
        Self {
            indices,
            color,
            solid,
            has_normal,
            normal: None,
            shaded: None,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn has_normal(&self) -> bool {
        self.has_normal
    }

    /// Unit plane normal, once computed. `None` for faces without a normal or degenerate faces.
    pub fn normal(&self) -> Option<Vec3> {
        self.normal
    }

    /// Base color after lighting, once the face has been shaded.
    pub fn shaded_color(&self) -> Option<Color> {
        self.shaded
    }

    /// A face of three or more points that asked for a normal but could not get one.
    pub fn is_degenerate(&self) -> bool {
        self.has_normal && self.indices.len() >= 3 && self.normal.is_none()
    }

    pub(crate) fn offset_indices(&mut self, offset: usize) {
        for i in &mut self.indices {
            *i += offset;
        }
    }

    /// Recompute the normal from the first three points and drop the cached shade.
    ///
    /// Returns `false` when the face wanted a normal but its first three points are collinear.
    /// Faces shorter than three points never carry a normal.
    pub(crate) fn compute_normal(&mut self, points: &[Vec3]) -> bool {
        self.shaded = None;
        if !self.has_normal || self.indices.len() < 3 {
            self.normal = None;
            return true;
        }
        let p0 = points[self.indices[0]];
        let p1 = points[self.indices[1]];
        let p2 = points[self.indices[2]];
        let n = (p1 - p0).cross(p2 - p0);
        if n.length_squared() <= DEGENERATE_NORMAL_SQ {
            self.normal = None;
            return false;
        }
        self.normal = Some(n.normalize());
        true
    }

    /// Fill the cached shaded color from the camera's light if it is missing.
    pub(crate) fn shade(&mut self, camera: &Camera) {
        if self.shaded.is_none() {
            self.shaded = Some(match self.normal {
                Some(n) => self.color.scaled(camera.surface_light(n)),
                None => self.color,
            });
        }
    }

    /// True when the face turns away from `eye`: the ray from the eye to the first point runs
    /// along the outward normal. Faces without a normal are never back-facing.
    pub fn is_back_facing(&self, points: &[Vec3], eye: Vec3) -> bool {
        match self.normal {
            Some(n) => (points[self.indices[0]] - eye).dot(n) >= 0.0,
            None => false,
        }
    }

    /// Emit this face to `surface` using the projected points of its owner.
    pub fn draw(&self, screen: &[ScreenPoint], camera: &Camera, surface: &mut dyn Surface) {
        if self.is_degenerate() {
            return;
        }
        let first = screen[self.indices[0]];
        let base = self.shaded.unwrap_or(self.color);
        surface.set_color(camera.foggy_color(first.distance, base));

        if self.solid {
            if !self.indices.iter().all(|&i| screen[i].visible) {
                return;
            }
            let polygon: Vec<(i32, i32)> = self
                .indices
                .iter()
                .map(|&i| pixel(&screen[i]))
                .collect();
            surface.fill_polygon(&polygon);
        } else {
            for pair in self.indices.windows(2) {
                let (a, b) = (&screen[pair[0]], &screen[pair[1]]);
                if a.visible && b.visible {
                    let (x0, y0) = pixel(a);
                    let (x1, y1) = pixel(b);
                    surface.draw_line(x0, y0, x1, y1);
                }
            }
        }
    }
}

fn pixel(p: &ScreenPoint) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn triangle() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn normal_follows_winding() {
        let pts = triangle();
        let mut face = Face::new(vec![0, 1, 2], Color::WHITE, true, true);
        assert!(face.compute_normal(&pts));
        assert!((face.normal().unwrap() - Vec3::Z).length() < 1e-6);

        let mut flipped = Face::new(vec![0, 2, 1], Color::WHITE, true, true);
        assert!(flipped.compute_normal(&pts));
        assert!((flipped.normal().unwrap() + Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn collinear_face_is_degenerate() {
        let pts = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        let mut face = Face::new(vec![0, 1, 2], Color::WHITE, true, true);
        assert!(!face.compute_normal(&pts));
        assert!(face.is_degenerate());
    }

    #[test]
    fn short_face_has_no_normal() {
        let pts = triangle();
        let mut face = Face::new(vec![0, 1], Color::WHITE, false, false);
        assert!(face.compute_normal(&pts));
        assert!(face.normal().is_none());
        assert!(!face.is_degenerate());
    }

    #[test]
    fn two_point_outline_with_normal_flag_is_not_degenerate() {
        let pts = triangle();
        let mut face = Face::new(vec![0, 1], Color::WHITE, false, true);
        assert!(face.compute_normal(&pts));
        assert!(face.normal().is_none());
        assert!(!face.is_degenerate());

        let cam = Camera::default();
        let point = |x: f32| ScreenPoint {
            x,
            y: 0.0,
            depth: 0.0,
            distance: 1.0,
            visible: true,
        };
        let mut surface = RecordingSurface::new();
        face.draw(&[point(0.0), point(10.0)], &cam, &mut surface);
        assert_eq!(surface.count_lines(), 1);
    }

    #[test]
    #[should_panic(expected = "solid face")]
    fn solid_face_needs_three_points() {
        Face::new(vec![0, 1], Color::WHITE, true, false);
    }

    #[test]
    fn back_facing_when_normal_points_away() {
        let pts = triangle();
        let mut face = Face::new(vec![0, 1, 2], Color::WHITE, true, true);
        face.compute_normal(&pts);
        // normal is +z: seen from above it faces the eye, from below it faces away
        assert!(!face.is_back_facing(&pts, Vec3::new(0.2, 0.2, 5.0)));
        assert!(face.is_back_facing(&pts, Vec3::new(0.2, 0.2, -5.0)));
    }

    #[test]
    fn shading_scales_base_color() {
        let pts = triangle();
        let cam = Camera::default();
        let mut up = Face::new(vec![0, 1, 2], Color::rgb(200, 200, 200), true, true);
        up.compute_normal(&pts);
        up.shade(&cam);
        let mut down = Face::new(vec![0, 2, 1], Color::rgb(200, 200, 200), true, true);
        down.compute_normal(&pts);
        down.shade(&cam);
        let lit = up.shaded_color().unwrap();
        let dim = down.shaded_color().unwrap();
        assert!(lit.r > dim.r);
        assert_eq!(dim, Color::rgb(70, 70, 70));
    }

    #[test]
    fn outline_skips_segments_with_hidden_endpoint() {
        let cam = Camera::default();
        let face = Face::new(vec![0, 1, 2], Color::WHITE, false, false);
        let vis = |x: f32, visible: bool| ScreenPoint {
            x,
            y: 0.0,
            depth: 0.0,
            distance: 1.0,
            visible,
        };
        let screen = [vis(0.0, true), vis(10.0, true), vis(20.0, false)];
        let mut surface = RecordingSurface::new();
        face.draw(&screen, &cam, &mut surface);
        assert_eq!(surface.count_lines(), 1);
    }

    #[test]
    fn polygon_needs_every_point_visible() {
        let cam = Camera::default();
        let face = Face::new(vec![0, 1, 2], Color::WHITE, true, false);
        let vis = |x: f32, visible: bool| ScreenPoint {
            x,
            y: x,
            depth: 0.0,
            distance: 1.0,
            visible,
        };
        let mut surface = RecordingSurface::new();
        face.draw(&[vis(0.0, true), vis(10.0, true), vis(5.0, false)], &cam, &mut surface);
        assert_eq!(surface.count_polygons(), 0);

        face.draw(&[vis(0.0, true), vis(10.0, true), vis(5.0, true)], &cam, &mut surface);
        assert_eq!(surface.count_polygons(), 1);
        assert!(matches!(
            surface.commands().last(),
            Some(DrawCommand::FillPolygon(p)) if p.len() == 3
        ));
    }
}
