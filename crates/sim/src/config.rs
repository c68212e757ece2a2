use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use soarscape_common::Color;
use soarscape_render::CameraConfig;

use crate::error::SimError;
use crate::polar::Polar;

/// Simulation configuration. Distances are km, speeds km/s, durations simulated seconds.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for cloud placement.
    pub seed: u64,
    /// Wall-clock period of one tick.
    pub tick_period_ms: u64,
    /// Simulated seconds advanced per tick.
    pub sim_dt: f32,
    pub atmosphere: AtmosphereConfig,
    pub camera: CameraConfig,
    pub view: ViewConfig,
    pub gliders: GliderConfig,
    pub clouds: CloudConfig,
    pub ridges: Vec<RidgeConfig>,
    pub landscape: LandscapeConfig,
    pub input_queue_capacity: usize,
    /// Landed gliders are replaced by a fresh launch after this many ticks.
    pub recycle_after_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            tick_period_ms: 50,
            sim_dt: 1.0,
            atmosphere: AtmosphereConfig::default(),
            camera: CameraConfig::default(),
            view: ViewConfig::default(),
            gliders: GliderConfig::default(),
            clouds: CloudConfig::default(),
            ridges: vec![RidgeConfig::default()],
            landscape: LandscapeConfig::default(),
            input_queue_capacity: soarscape_input::DEFAULT_QUEUE_CAPACITY,
            recycle_after_ticks: Some(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Horizontal wind; the vertical component is ignored.
    pub wind: Vec3,
    /// Height of cloud base; thermals lift only below it.
    pub cloud_base: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            wind: Vec3::new(0.004, 0.0, 0.0),
            cloud_base: 1.5,
        }
    }
}

/// Chase camera placement relative to the focused glider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub chase_distance: f32,
    pub chase_height: f32,
    /// Draw the text overlay.
    pub hud: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            chase_distance: 0.6,
            chase_height: 0.15,
            hud: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GliderConfig {
    pub count: usize,
    /// Launch point of the first glider; later ones line up along +y.
    pub start: Vec3,
    pub spacing: f32,
    /// Launch heading, radians counter-clockwise from +x.
    pub start_heading: f32,
    pub polar: Polar,
    pub default_polar: usize,
    /// Maximum heading change, radians per simulated second.
    pub turn_rate: f32,
    /// Visual bank at full turn, radians.
    pub max_bank: f32,
    /// Ticks to fly downwind before searching again after a miss.
    pub retry_ticks: u32,
    pub trail_length: usize,
    /// Horizontal distance at which a waypoint counts as reached.
    pub arrive_radius: f32,
    /// Preferred thermalling radius.
    pub circle_radius: f32,
    /// Leave a lift source this far below its top.
    pub leave_margin: f32,
    pub color: Color,
}

impl Default for GliderConfig {
    fn default() -> Self {
        Self {
            count: 3,
            start: Vec3::new(0.0, 0.0, 1.2),
            spacing: 0.4,
            start_heading: 0.0,
            polar: Polar::default(),
            default_polar: 1,
            turn_rate: 0.3,
            max_bank: 0.5,
            retry_ticks: 20,
            trail_length: 40,
            arrive_radius: 0.12,
            circle_radius: 0.15,
            leave_margin: 0.1,
            color: Color::rgb(240, 240, 230),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Ticks between spawns; 0 disables the spawner.
    pub spawn_interval_ticks: u64,
    pub max_clouds: usize,
    pub initial_count: usize,
    /// Growth phase duration.
    pub nose: f32,
    /// Full-size phase duration.
    pub mature: f32,
    /// Decay phase duration.
    pub tail: f32,
    /// Peak lift at full size, km/s.
    pub strength: f32,
    /// Outer lift radius at full size.
    pub max_radius: f32,
    /// Core radius as a fraction of the outer radius.
    pub core_fraction: f32,
    /// Visual thickness of the cloud body.
    pub thickness: f32,
    /// Spawn x range.
    pub spawn_x: (f32, f32),
    /// Spawn y range.
    pub spawn_y: (f32, f32),
    pub color: Color,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ticks: 40,
            max_clouds: 12,
            initial_count: 4,
            nose: 60.0,
            mature: 240.0,
            tail: 60.0,
            strength: 0.003,
            max_radius: 0.5,
            core_fraction: 0.4,
            thickness: 0.3,
            spawn_x: (-1.0, 12.0),
            spawn_y: (-3.0, 3.0),
            color: Color::rgb(250, 250, 252),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    pub name: String,
    /// Crest end points; only x and y are used.
    pub start: Vec3,
    pub end: Vec3,
    pub height: f32,
    /// Half-width of the hill foot.
    pub base_width: f32,
    /// Outer edge of the lift band, measured from the crest.
    pub lift_width: f32,
    pub core_width: f32,
    pub strength: f32,
    /// Lift stops above this height.
    pub lift_top: f32,
    /// How far upwind of the crest the beat runs.
    pub circuit_offset: f32,
    pub color: Color,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            name: "ridge".into(),
            start: Vec3::new(5.0, -2.0, 0.0),
            end: Vec3::new(5.0, 2.0, 0.0),
            height: 0.3,
            base_width: 0.8,
            lift_width: 0.6,
            core_width: 0.25,
            strength: 0.0025,
            lift_top: 0.7,
            circuit_offset: 0.15,
            color: Color::rgb(110, 140, 80),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// South-west corner of the ground grid.
    pub origin: Vec3,
    pub tiles_x: usize,
    pub tiles_y: usize,
    pub tile_size: f32,
    /// Gliders crossing this x have reached the goal.
    pub goal_x: Option<f32>,
    pub ground_colors: (Color, Color),
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(-4.0, -8.0, 0.0),
            tiles_x: 20,
            tiles_y: 16,
            tile_size: 1.0,
            goal_x: Some(14.0),
            ground_colors: (Color::rgb(90, 150, 70), Color::rgb(120, 165, 85)),
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(?path, "config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, SimError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |msg: String| Err(SimError::InvalidConfig(msg));
        if !(self.sim_dt > 0.0) {
            return fail(format!("sim_dt must be positive, got {}", self.sim_dt));
        }
        if self.input_queue_capacity == 0 {
            return fail("input_queue_capacity must be at least 1".into());
        }
        if !(self.atmosphere.cloud_base > 0.0) {
            return fail("atmosphere.cloud_base must be positive".into());
        }
        let cam = &self.camera;
        if cam.width == 0 || cam.height == 0 {
            return fail("camera viewport must be non-empty".into());
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return fail(format!("camera.fov_degrees out of range: {}", cam.fov_degrees));
        }
        if !(cam.near > 0.0 && cam.max_depth > cam.near) {
            return fail("camera needs 0 < near < max_depth".into());
        }
        if cam.light_direction.length_squared() == 0.0 {
            return fail("camera.light_direction must be non-zero".into());
        }
        if !(self.view.chase_distance > 0.0) {
            return fail("view.chase_distance must be positive".into());
        }

        let g = &self.gliders;
        g.polar.check().map_err(SimError::InvalidConfig)?;
        if g.default_polar >= g.polar.len() {
            return fail(format!(
                "gliders.default_polar {} outside polar table of {}",
                g.default_polar,
                g.polar.len()
            ));
        }
        if !(g.turn_rate > 0.0) {
            return fail("gliders.turn_rate must be positive".into());
        }
        if g.trail_length < 2 {
            return fail("gliders.trail_length must be at least 2".into());
        }
        if !(g.arrive_radius > 0.0 && g.circle_radius > 0.0) {
            return fail("gliders.arrive_radius and circle_radius must be positive".into());
        }

        let c = &self.clouds;
        if !(c.nose > 0.0 && c.mature >= 0.0 && c.tail > 0.0) {
            return fail("clouds need positive nose and tail durations".into());
        }
        if !(c.max_radius > 0.0 && c.core_fraction > 0.0 && c.core_fraction <= 1.0) {
            return fail("clouds need max_radius > 0 and 0 < core_fraction <= 1".into());
        }
        if c.spawn_x.0 > c.spawn_x.1 || c.spawn_y.0 > c.spawn_y.1 {
            return fail("clouds spawn ranges must be ordered".into());
        }

        for r in &self.ridges {
            if (r.end - r.start).truncate().length_squared() == 0.0 {
                return fail(format!("ridge {} has zero length", r.name));
            }
            if !(r.lift_width > r.core_width && r.core_width >= 0.0) {
                return fail(format!("ridge {} needs lift_width > core_width >= 0", r.name));
            }
            if !(r.height > 0.0 && r.base_width > 0.0) {
                return fail(format!("ridge {} needs positive height and base_width", r.name));
            }
        }

        let l = &self.landscape;
        if !(l.tile_size > 0.0) {
            return fail("landscape.tile_size must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = SimConfig::from_yaml_str("seed: 99\nclouds:\n  nose: 10.0\n").unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.clouds.nose, 10.0);
        assert_eq!(config.clouds.mature, CloudConfig::default().mature);
        assert_eq!(config.gliders, GliderConfig::default());
    }

    #[test]
    fn yaml_round_trip() {
        let config = SimConfig::default();
        let text = config.to_yaml().unwrap();
        assert_eq!(SimConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = SimConfig::default();
        config.gliders.default_polar = 10;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.sim_dt = 0.0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let mut config = SimConfig::default();
        config.ridges[0].end = config.ridges[0].start;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        assert!(matches!(
            SimConfig::from_yaml_str("seed: [not a number"),
            Err(SimError::Yaml(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "tick_period_ms: 20\nridges: []").unwrap();
        let config = SimConfig::load(tmp.path()).unwrap();
        assert_eq!(config.tick_period_ms, 20);
        assert!(config.ridges.is_empty());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        match SimConfig::load(&path) {
            Err(SimError::ConfigIo { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ConfigIo, got {other:?}"),
        }
    }
}
