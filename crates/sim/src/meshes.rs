//! Prototype meshes stamped onto every body, built in each body's local frame
//! (x forward, y left, z up).

use std::f32::consts::TAU;

use glam::Vec3;
use soarscape_common::Color;
use soarscape_render::SceneObject;

const CLOUD_SIDES: usize = 8;

/// Shared shapes, cloned for each new body.
#[derive(Debug, Clone)]
pub struct Meshes {
    glider: SceneObject,
    cloud: SceneObject,
}

impl Meshes {
    pub fn new(glider_color: Color, cloud_color: Color) -> Self {
        Self {
            glider: glider_mesh(glider_color),
            cloud: cloud_mesh(cloud_color),
        }
    }

    pub fn glider(&self) -> &SceneObject {
        &self.glider
    }

    pub fn cloud(&self) -> &SceneObject {
        &self.cloud
    }

    /// Fresh copy of the glider shape with its own points.
    pub fn stamp_glider(&self, name: &str) -> SceneObject {
        let mut object = SceneObject::new(name);
        self.glider.copy_faces_into(&mut object);
        object
    }

    pub fn stamp_cloud(&self, name: &str) -> SceneObject {
        let mut object = SceneObject::new(name);
        self.cloud.copy_faces_into(&mut object);
        object
    }
}

/// Both sides of a flat panel, top wound counter-clockwise seen from +z.
fn two_sided(object: &mut SceneObject, corners: &[Vec3], top: Color, bottom: Color) {
    object.add_face(corners, top, true, true);
    let reversed: Vec<Vec3> = corners.iter().rev().copied().collect();
    object.add_face(&reversed, bottom, true, true);
}

/// Sailplane drawn a few times larger than life so it reads at chase distance.
pub fn glider_mesh(color: Color) -> SceneObject {
    let mut m = SceneObject::new("glider-prototype");
    let underside = color.scaled(0.7);

    // wing
    let (chord, span) = (0.003, 0.024);
    two_sided(
        &mut m,
        &[
            Vec3::new(chord, -span, 0.0),
            Vec3::new(chord, span, 0.0),
            Vec3::new(-chord, span, 0.0),
            Vec3::new(-chord, -span, 0.0),
        ],
        color,
        underside,
    );

    // tailplane
    let (tx, tc, ts) = (-0.016, 0.0015, 0.006);
    two_sided(
        &mut m,
        &[
            Vec3::new(tx + tc, -ts, 0.001),
            Vec3::new(tx + tc, ts, 0.001),
            Vec3::new(tx - tc, ts, 0.001),
            Vec3::new(tx - tc, -ts, 0.001),
        ],
        color,
        underside,
    );

    // fin, seen from either side
    let fin = [
        Vec3::new(tx - tc, 0.0, 0.0),
        Vec3::new(tx + 2.0 * tc, 0.0, 0.0),
        Vec3::new(tx - tc, 0.0, 0.005),
    ];
    m.add_face(&fin, color.scaled(0.85), true, true);
    let back: Vec<Vec3> = fin.iter().rev().copied().collect();
    m.add_face(&back, color.scaled(0.85), true, true);

    // fuselage line
    m.add_face(
        &[Vec3::new(0.009, 0.0, 0.0), Vec3::new(tx - tc, 0.0, 0.0)],
        Color::rgb(60, 60, 70),
        false,
        false,
    );
    m
}

/// Unit-radius octagonal slab: base at z = 0, top at z = 1.
pub fn cloud_mesh(color: Color) -> SceneObject {
    let mut m = SceneObject::new("cloud-prototype");
    let ring = |z: f32| -> Vec<Vec3> {
        (0..CLOUD_SIDES)
            .map(|i| {
                let a = i as f32 / CLOUD_SIDES as f32 * TAU;
                Vec3::new(a.cos(), a.sin(), z)
            })
            .collect()
    };
    let base = ring(0.0);
    let top = ring(1.0);

    let base_down: Vec<Vec3> = base.iter().rev().copied().collect();
    m.add_face(&base_down, color.scaled(0.8), true, true);
    m.add_face(&top, color, true, true);
    for i in 0..CLOUD_SIDES {
        let j = (i + 1) % CLOUD_SIDES;
        m.add_face(&[base[i], base[j], top[j], top[i]], color.scaled(0.9), true, true);
    }
    m
}

/// A wireframe polyline of `length` points trailing behind `start` along `-direction`.
pub fn trail_mesh(name: &str, start: Vec3, direction: Vec3, length: usize, color: Color) -> SceneObject {
    let mut m = SceneObject::new(name);
    let step = direction.normalize_or(Vec3::X) * 0.002;
    let points: Vec<Vec3> = (0..length).map(|i| start - step * i as f32).collect();
    m.add_face(&points, color, false, false);
    m
}
