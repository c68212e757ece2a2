//! Vector math over `glam` types.
//!
//! Add, subtract, scale, dot, cross, length and clone come from `glam::Vec3` directly; the helpers
//! here cover the operations the renderer and the lift model need on top of that.

pub use glam::{Mat3, Vec3};

/// Apply a rotation (or any linear) matrix to a vector.
pub fn apply_matrix(m: &Mat3, v: Vec3) -> Vec3 {
    *m * v
}

/// Scale `v` to unit length.
///
/// `v` must have non-zero length; normalizing a zero vector is a caller bug.
pub fn make_unit(v: Vec3) -> Vec3 {
    let len = v.length();
    debug_assert!(len > 0.0, "make_unit called on a zero-length vector");
    v / len
}

/// Distance between two points ignoring height.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    (b.truncate() - a.truncate()).length()
}

/// Heading (radians, counter-clockwise from +x) pointing from `from` towards `to`.
pub fn bearing(from: Vec3, to: Vec3) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit horizontal vector for a heading.
pub fn heading_vector(heading: f32) -> Vec3 {
    let (s, c) = heading.sin_cos();
    Vec3::new(c, s, 0.0)
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Shortest distance from `p` to the horizontal segment `a`-`b`.
pub fn distance_to_segment_2d(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let (p, a, b) = (p.truncate(), a.truncate(), b.truncate());
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

/// Orthonormal orientation of a body: where its nose, left wing and roof point in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub left: Vec3,
    pub up: Vec3,
}

impl Basis {
    pub const IDENTITY: Self = Self {
        forward: Vec3::X,
        left: Vec3::Y,
        up: Vec3::Z,
    };

    /// Level flight along `heading`, then rolled by `bank` radians (positive banks right wing down).
    pub fn from_heading_bank(heading: f32, bank: f32) -> Self {
        let forward = heading_vector(heading);
        let level_left = Vec3::Z.cross(forward);
        let (sb, cb) = bank.sin_cos();
        let left = level_left * cb + Vec3::Z * sb;
        let up = forward.cross(left);
        Self { forward, left, up }
    }

    /// Matrix mapping the local mesh frame (x forward, y left, z up) into world orientation.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_cols(self.forward, self.left, self.up)
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn make_unit_has_length_one() {
        let v = make_unit(Vec3::new(3.0, 4.0, 12.0));
        assert!((v.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn apply_matrix_matches_multiplication() {
        let m = Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let v = apply_matrix(&m, Vec3::X);
        assert!((v - Vec3::Y).length() < EPS);
    }

    #[test]
    fn basis_is_orthonormal() {
        let b = Basis::from_heading_bank(0.7, 0.3);
        assert!((b.forward.length() - 1.0).abs() < EPS);
        assert!((b.left.length() - 1.0).abs() < EPS);
        assert!((b.up.length() - 1.0).abs() < EPS);
        assert!(b.forward.dot(b.left).abs() < EPS);
        assert!(b.forward.dot(b.up).abs() < EPS);
        assert!(b.left.dot(b.up).abs() < EPS);
    }

    #[test]
    fn level_basis_matches_identity() {
        let b = Basis::from_heading_bank(0.0, 0.0);
        assert!((b.forward - Vec3::X).length() < EPS);
        assert!((b.left - Vec3::Y).length() < EPS);
        assert!((b.up - Vec3::Z).length() < EPS);
    }

    #[test]
    fn wrap_angle_range() {
        use std::f32::consts::PI;
        assert!((wrap_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert!((wrap_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert_eq!(wrap_angle(0.25), 0.25);
    }

    #[test]
    fn segment_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert!((distance_to_segment_2d(Vec3::new(5.0, 3.0, 9.0), a, b) - 3.0).abs() < EPS);
        assert!((distance_to_segment_2d(Vec3::new(13.0, 4.0, 0.0), a, b) - 5.0).abs() < EPS);
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let d = horizontal_distance(Vec3::new(0.0, 0.0, 5.0), Vec3::new(3.0, 4.0, -2.0));
        assert!((d - 5.0).abs() < EPS);
    }
}
