use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use soarscape_common::Color;
use soarscape_common::math::make_unit;

/// Camera/view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Screen width in pixels.
    pub width: u32,
    /// Screen height in pixels.
    pub height: u32,
    /// Field of view across the shorter screen side, in degrees.
    pub fov_degrees: f32,
    /// Points closer to the eye than this are not visible.
    pub near: f32,
    /// Points further from the eye than this are not visible.
    pub max_depth: f32,
    /// Distance at which fog fully replaces the surface color.
    pub fog_distance: f32,
    /// Background color fog blends towards.
    pub fog_color: Color,
    /// Direction from a surface towards the light, world space.
    pub light_direction: Vec3,
    /// Lower clamp of the lighting multiplier.
    pub min_light: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            fov_degrees: 60.0,
            near: 0.005,
            max_depth: 40.0,
            fog_distance: 30.0,
            fog_color: Color::SKY,
            light_direction: Vec3::new(-0.3, 0.4, 1.0),
            min_light: 0.35,
        }
    }
}

/// A point after camera transform and projection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// Camera-space depth coordinate; smaller is further from the eye.
    pub depth: f32,
    /// Distance in front of the eye along the view axis.
    pub distance: f32,
    pub visible: bool,
}

/// Look-at camera with perspective projection, diffuse light and distance fog.
///
/// Camera space has its origin at the focus point: x to the right, y up the screen and z back
/// towards the eye, so the eye sits at `(0, 0, eye_distance)` and further points have smaller z.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    focus: Vec3,
    rotation: Mat3,
    eye_distance: f32,
    projection_distance: f32,
    screen_scale: f32,
    center: (f32, f32),
    near: f32,
    max_depth: f32,
    fog_distance: f32,
    fog_color: Color,
    light_direction: Vec3,
    min_light: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let half_fov = (config.fov_degrees.clamp(1.0, 179.0) * 0.5).to_radians();
        let mut camera = Self {
            eye: Vec3::new(0.0, -1.0, 0.5),
            focus: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            eye_distance: 1.0,
            projection_distance: 1.0 / half_fov.tan(),
            screen_scale: 1.0,
            center: (0.0, 0.0),
            near: config.near,
            max_depth: config.max_depth,
            fog_distance: config.fog_distance.max(f32::EPSILON),
            fog_color: config.fog_color,
            light_direction: make_unit(config.light_direction),
            min_light: config.min_light.clamp(0.0, 1.0),
        };
        camera.set_viewport(config.width, config.height);
        camera.set_eye_and_focus(camera.eye, camera.focus);
        camera
    }

    /// Place the eye and the look-at point and rebuild the rotation.
    ///
    /// `eye` and `focus` must differ.
    pub fn set_eye_and_focus(&mut self, eye: Vec3, focus: Vec3) {
        let view = focus - eye;
        assert!(view.length_squared() > 0.0, "camera eye and focus coincide");
        let forward = make_unit(view);
        let reference_up = if forward.z.abs() > 0.999 {
            Vec3::Y
        } else {
            Vec3::Z
        };
        let right = make_unit(forward.cross(reference_up));
        let up = right.cross(forward);
        self.rotation = Mat3::from_cols(right, up, -forward).transpose();
        self.eye = eye;
        self.focus = focus;
        self.eye_distance = view.length();
    }

    /// Map projected unit-plane coordinates onto a `width` x `height` pixel screen.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.screen_scale = width.min(height) as f32 * 0.5;
        self.center = (width as f32 * 0.5, height as f32 * 0.5);
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    /// The camera-relative rotation applied after subtracting the focus point.
    pub fn transform_matrix(&self) -> Mat3 {
        self.rotation
    }

    pub fn projection_distance(&self) -> f32 {
        self.projection_distance
    }

    pub fn screen_scale(&self) -> f32 {
        self.screen_scale
    }

    pub fn background(&self) -> Color {
        self.fog_color
    }

    /// World space to camera space.
    pub fn to_camera_space(&self, world: Vec3) -> Vec3 {
        self.rotation * (world - self.focus)
    }

    /// Perspective-project a camera-space point to pixel coordinates.
    pub fn project(&self, camera_space: Vec3) -> ScreenPoint {
        let distance = self.eye_distance - camera_space.z;
        let visible = distance > self.near && distance < self.max_depth;
        let (x, y) = if distance > self.near {
            let k = self.projection_distance * self.screen_scale / distance;
            (
                self.center.0 + camera_space.x * k,
                self.center.1 - camera_space.y * k,
            )
        } else {
            self.center
        };
        ScreenPoint {
            x,
            y,
            depth: camera_space.z,
            distance,
            visible,
        }
    }

    /// Lighting multiplier for a unit surface normal, in `[min_light, 1]`.
    pub fn surface_light(&self, normal: Vec3) -> f32 {
        self.light_direction
            .dot(normal)
            .clamp(self.min_light, 1.0)
    }

    /// Blend `color` towards the background as `depth` grows, saturating at the fog distance.
    pub fn foggy_color(&self, depth: f32, color: Color) -> Color {
        let t = (depth / self.fog_distance).clamp(0.0, 1.0);
        color.lerp(self.fog_color, t)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
