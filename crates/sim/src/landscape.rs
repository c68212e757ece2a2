//! Static scenery: ground tiles, ridge hills and the goal line.

use glam::Vec3;
use soarscape_common::Color;
use soarscape_common::math::make_unit;
use soarscape_render::{DEFAULT_LAYER, ObjectHandle, ObjectRegistry, SceneObject};

use crate::atmosphere::Atmosphere;
use crate::config::{LandscapeConfig, RidgeConfig};
use crate::lift::Ridge;

/// Layer drawn underneath everything else.
pub const GROUND_LAYER: u8 = 0;

/// Longest crest run covered by one hill segment.
const HILL_SEGMENT: f32 = 0.5;

const GOAL_COLOR: Color = Color::rgb(220, 40, 40);

/// The terrain the gliders fly over, plus the lift its ridges produce.
#[derive(Debug)]
pub struct Landscape {
    ridges: Vec<Ridge>,
    goal_x: Option<f32>,
    handles: Vec<ObjectHandle>,
}

impl Landscape {
    /// Build ridges from `ridge_configs` and register every scenery mesh with `registry`.
    pub fn new(
        config: &LandscapeConfig,
        ridge_configs: &[RidgeConfig],
        atmosphere: &Atmosphere,
        registry: &mut ObjectRegistry,
    ) -> Self {
        let mut handles = Vec::new();
        handles.push(registry.register(ground_mesh(config), GROUND_LAYER));

        let ridges: Vec<Ridge> = ridge_configs
            .iter()
            .map(|rc| {
                handles.push(registry.register(hill_mesh(rc), DEFAULT_LAYER));
                Ridge::new(rc, atmosphere)
            })
            .collect();

        if let Some(x) = config.goal_x {
            handles.push(registry.register(goal_mesh(config, x), DEFAULT_LAYER));
        }

        tracing::debug!(
            ridges = ridges.len(),
            tiles = config.tiles_x * config.tiles_y,
            goal_x = ?config.goal_x,
            "landscape built"
        );
        Self {
            ridges,
            goal_x: config.goal_x,
            handles,
        }
    }

    pub fn ridges(&self) -> &[Ridge] {
        &self.ridges
    }

    pub fn goal_x(&self) -> Option<f32> {
        self.goal_x
    }

    /// Registry handles of the scenery meshes.
    pub fn handles(&self) -> &[ObjectHandle] {
        &self.handles
    }
}

/// Flat checkerboard grid at z = 0.
pub fn ground_mesh(config: &LandscapeConfig) -> SceneObject {
    let mut m = SceneObject::new("ground");
    let s = config.tile_size;
    let (light, dark) = config.ground_colors;
    for j in 0..config.tiles_y {
        for i in 0..config.tiles_x {
            let corner = config.origin + Vec3::new(i as f32 * s, j as f32 * s, 0.0);
            let color = if (i + j) % 2 == 0 { light } else { dark };
            m.add_face(
                &[
                    corner,
                    corner + Vec3::new(s, 0.0, 0.0),
                    corner + Vec3::new(s, s, 0.0),
                    corner + Vec3::new(0.0, s, 0.0),
                ],
                color,
                true,
                true,
            );
        }
    }
    m
}

/// A ridge drawn as a long tent: two sloping flanks and two end caps.
pub fn hill_mesh(config: &RidgeConfig) -> SceneObject {
    let mut m = SceneObject::new(config.name.as_str());
    let start = config.start.truncate().extend(0.0);
    let end = config.end.truncate().extend(0.0);
    let along = make_unit(end - start);
    let side = Vec3::Z.cross(along) * config.base_width;
    let top = Vec3::Z * config.height;

    let length = (end - start).length();
    let segments = (length / HILL_SEGMENT).ceil().max(1.0) as usize;
    let crest: Vec<Vec3> = (0..=segments)
        .map(|i| start.lerp(end, i as f32 / segments as f32) + top)
        .collect();
    let color = config.color;

    for pair in crest.windows(2) {
        let (c0, c1) = (pair[0], pair[1]);
        let (l0, l1) = (c0 - top + side, c1 - top + side);
        let (r0, r1) = (c0 - top - side, c1 - top - side);
        m.add_quad_tile([c0, c1, l1, l0], color, true, false);
        m.add_quad_tile([c0, r0, r1, c1], color, true, false);
    }

    let first = crest[0];
    let last = crest[segments];
    m.add_face(
        &[first - top + side, first - top - side, first],
        color.scaled(0.9),
        true,
        true,
    );
    m.add_face(
        &[last - top + side, last, last - top - side],
        color.scaled(0.9),
        true,
        true,
    );
    m
}

/// Pylons at each edge of the field joined by a line at `x`.
pub fn goal_mesh(config: &LandscapeConfig, x: f32) -> SceneObject {
    let mut m = SceneObject::new("goal");
    let y0 = config.origin.y;
    let y1 = config.origin.y + config.tiles_y as f32 * config.tile_size;
    let pylon = 0.4;
    let a = Vec3::new(x, y0, 0.0);
    let b = Vec3::new(x, y1, 0.0);
    m.add_face(&[a, a + Vec3::Z * pylon], GOAL_COLOR, false, false);
    m.add_face(&[b, b + Vec3::Z * pylon], GOAL_COLOR, false, false);
    m.add_face(&[a + Vec3::Z * 0.01, b + Vec3::Z * 0.01], GOAL_COLOR, false, false);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_tiles_face_up() {
        let config = LandscapeConfig {
            tiles_x: 3,
            tiles_y: 2,
            ..LandscapeConfig::default()
        };
        let m = ground_mesh(&config);
        assert_eq!(m.faces().len(), 6);
        // shared corners are deduplicated
        assert_eq!(m.points().len(), 4 * 3);
        for face in m.faces() {
            assert!(face.normal().unwrap().z > 0.99);
        }
    }

    #[test]
    fn hill_flanks_face_up_and_out() {
        let ridge = RidgeConfig::default();
        let m = hill_mesh(&ridge);
        let mid_x = ridge.start.x;
        let (caps, flanks) = m.faces().split_at(m.faces().len() - 2);
        for face in flanks {
            let n = face.normal().unwrap();
            assert!(n.z > 0.0, "flank normal {n}");
            // centroid x relative to the crest tells which flank this is
            let centroid: Vec3 = face.indices().iter().map(|&i| m.points()[i]).sum::<Vec3>()
                / face.indices().len() as f32;
            assert!(n.x * (centroid.x - mid_x) > 0.0 || (centroid.x - mid_x).abs() < 1e-6);
        }
        // caps point along the crest away from the middle
        let start_cap = caps[0].normal().unwrap();
        let end_cap = caps[1].normal().unwrap();
        assert!(start_cap.y < -0.99);
        assert!(end_cap.y > 0.99);
    }

    #[test]
    fn landscape_registers_scenery() {
        let mut registry = ObjectRegistry::new();
        let config = LandscapeConfig::default();
        let land = Landscape::new(
            &config,
            &[RidgeConfig::default()],
            &Atmosphere::default(),
            &mut registry,
        );
        assert_eq!(land.ridges().len(), 1);
        assert_eq!(land.handles().len(), 3);
        assert_eq!(registry.object_count(), 3);
        assert_eq!(registry.layer_numbers(), vec![GROUND_LAYER, DEFAULT_LAYER]);
        assert_eq!(land.goal_x(), Some(14.0));
    }

    #[test]
    fn no_goal_means_no_marker() {
        let mut registry = ObjectRegistry::new();
        let config = LandscapeConfig {
            goal_x: None,
            ..LandscapeConfig::default()
        };
        let land = Landscape::new(&config, &[], &Atmosphere::default(), &mut registry);
        assert!(land.ridges().is_empty());
        assert_eq!(registry.object_count(), 1);
    }
}
