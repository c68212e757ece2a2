//! The simulation context every observer ticks against.

use std::collections::BTreeMap;

use glam::{Mat3, Vec3};
use soarscape_common::math::heading_vector;
use soarscape_common::{BodyId, SeededRng};
use soarscape_input::{Action, InputError, InputQueue, KeyEvent};
use soarscape_render::{Camera, DEFAULT_LAYER, FrameStats, ObjectHandle, ObjectRegistry, Surface};

use crate::atmosphere::Atmosphere;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::glider::{Glider, StepOutcome};
use crate::landscape::Landscape;
use crate::lift::{Cloud, LiftField};
use crate::meshes::{Meshes, trail_mesh};
use crate::status::{GliderStatus, draw_hud};
use crate::trail::Trail;

/// Cloud meshes smaller than this fraction of full size are hidden.
const MIN_VISIBLE_SIZE: f32 = 0.02;

/// Result of advancing one cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudStep {
    Alive,
    /// Aged out and removed along with its mesh.
    Expired,
}

/// Owns every body, the scene registry, the camera and the atmosphere.
///
/// Bodies are plain data keyed by [`BodyId`]; their meshes live in the registry and are reached
/// through handles held here.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    atmosphere: Atmosphere,
    camera: Camera,
    registry: ObjectRegistry,
    landscape: Landscape,
    meshes: Meshes,
    gliders: BTreeMap<BodyId, Glider>,
    clouds: BTreeMap<BodyId, Cloud>,
    visuals: BTreeMap<BodyId, ObjectHandle>,
    trails: BTreeMap<BodyId, Trail>,
    input: InputQueue,
    focus: Option<BodyId>,
    rng: SeededRng,
    paused: bool,
    sim_time: f32,
    ticks: u64,
    launched: usize,
}

impl Simulation {
    /// Validate `config` and build the static scene. No bodies are spawned.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let atmosphere = Atmosphere::new(&config.atmosphere);
        let mut registry = ObjectRegistry::new();
        let landscape = Landscape::new(&config.landscape, &config.ridges, &atmosphere, &mut registry);
        let mut sim = Self {
            camera: Camera::new(&config.camera),
            meshes: Meshes::new(config.gliders.color, config.clouds.color),
            input: InputQueue::with_capacity(config.input_queue_capacity),
            rng: SeededRng::new(config.seed),
            atmosphere,
            registry,
            landscape,
            gliders: BTreeMap::new(),
            clouds: BTreeMap::new(),
            visuals: BTreeMap::new(),
            trails: BTreeMap::new(),
            focus: None,
            paused: false,
            sim_time: 0.0,
            ticks: 0,
            launched: 0,
            config,
        };
        sim.update_camera();
        tracing::debug!(seed = sim.config.seed, "simulation built");
        Ok(sim)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn gliders(&self) -> &BTreeMap<BodyId, Glider> {
        &self.gliders
    }

    pub fn glider(&self, id: BodyId) -> Option<&Glider> {
        self.gliders.get(&id)
    }

    pub fn clouds(&self) -> &BTreeMap<BodyId, Cloud> {
        &self.clouds
    }

    pub fn cloud(&self, id: BodyId) -> Option<&Cloud> {
        self.clouds.get(&id)
    }

    /// Registry handle of a body's mesh.
    pub fn visual(&self, id: BodyId) -> Option<ObjectHandle> {
        self.visuals.get(&id).copied()
    }

    pub fn trail(&self, glider: BodyId) -> Option<Trail> {
        self.trails.get(&glider).copied()
    }

    /// Simulated seconds elapsed while unpaused.
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Unpaused ticks so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Mirror of the clock's pause flag, shown on the overlay.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn advance_time(&mut self) {
        self.sim_time += self.config.sim_dt;
        self.ticks += 1;
    }

    /// Add a glider with its mesh and trail; the first glider takes the camera focus.
    pub fn spawn_glider(&mut self, position: Vec3, heading: f32) -> BodyId {
        self.launched += 1;
        let id = BodyId::new();
        let name = format!("glider-{}", self.launched);
        let glider = Glider::new(id, name.as_str(), position, heading, self.config.gliders.default_polar);

        let mut mesh = self.meshes.stamp_glider(&name);
        mesh.place(self.meshes.glider().points(), &glider.basis().matrix(), position);
        let handle = self.registry.register(mesh, DEFAULT_LAYER);
        self.visuals.insert(id, handle);

        let trail = trail_mesh(
            &format!("{name}-trail"),
            position,
            heading_vector(heading),
            self.config.gliders.trail_length,
            self.config.gliders.color.scaled(0.6),
        );
        let trail_handle = self.registry.register(trail, DEFAULT_LAYER);
        self.trails.insert(id, Trail::new(id, trail_handle));

        tracing::debug!(glider = %name, id = %id.short(), x = position.x, y = position.y, z = position.z, "glider spawned");
        self.gliders.insert(id, glider);
        if self.focus.is_none() {
            self.focus = Some(id);
        }
        id
    }

    /// Launch the next glider from the configured start line.
    pub fn launch_glider(&mut self) -> BodyId {
        let g = &self.config.gliders;
        let slot = self.launched % g.count.max(1);
        let position = g.start + Vec3::Y * g.spacing * slot as f32;
        let heading = g.start_heading;
        self.spawn_glider(position, heading)
    }

    pub fn spawn_cloud(&mut self, position: Vec3) -> BodyId {
        self.spawn_cloud_aged(position, 0.0)
    }

    /// Add a cloud that has already lived `age` simulated seconds.
    pub fn spawn_cloud_aged(&mut self, position: Vec3, age: f32) -> BodyId {
        let id = BodyId::new();
        let cloud = Cloud::new(id, position, &self.config.clouds).with_age(age);
        let mesh = self.meshes.stamp_cloud(&format!("cloud-{}", id.short()));
        let handle = self.registry.register(mesh, DEFAULT_LAYER);
        self.visuals.insert(id, handle);
        self.clouds.insert(id, cloud);
        self.place_cloud(id);
        tracing::debug!(cloud = %id.short(), age, "cloud spawned");
        id
    }

    /// Spawn a cloud at a seeded-random spot under cloud base, unless the sky is full.
    pub fn spawn_random_cloud(&mut self, age: f32) -> Option<BodyId> {
        let c = &self.config.clouds;
        if self.clouds.len() >= c.max_clouds {
            return None;
        }
        let (x0, x1) = c.spawn_x;
        let (y0, y1) = c.spawn_y;
        let x = self.rng.range(x0, x1);
        let y = self.rng.range(y0, y1);
        let position = Vec3::new(x, y, self.atmosphere.cloud_base);
        Some(self.spawn_cloud_aged(position, age))
    }

    /// Random age within a thermal's growth and plateau, for clouds present from the start.
    pub fn random_cloud_age(&mut self) -> f32 {
        let c = &self.config.clouds;
        let span = c.nose + c.mature;
        self.rng.range(0.0, span)
    }

    pub fn remove_glider(&mut self, id: BodyId) -> Result<Glider, SimError> {
        let glider = self.gliders.remove(&id).ok_or(SimError::UnknownBody(id))?;
        if let Some(handle) = self.visuals.remove(&id) {
            self.registry.unregister(handle)?;
        }
        if let Some(trail) = self.trails.remove(&id) {
            self.registry.unregister(trail.handle())?;
        }
        if self.focus == Some(id) {
            self.focus = self.gliders.keys().next().copied();
        }
        tracing::debug!(glider = glider.name(), "glider removed");
        Ok(glider)
    }

    pub fn remove_cloud(&mut self, id: BodyId) -> Result<Cloud, SimError> {
        let cloud = self.clouds.remove(&id).ok_or(SimError::UnknownBody(id))?;
        if let Some(handle) = self.visuals.remove(&id) {
            self.registry.unregister(handle)?;
        }
        tracing::debug!(cloud = %id.short(), age = cloud.age(), "cloud removed");
        Ok(cloud)
    }

    /// Fly one glider for one tick and move its mesh to match.
    pub fn step_glider(&mut self, id: BodyId) -> Result<StepOutcome, SimError> {
        let glider = self.gliders.get_mut(&id).ok_or(SimError::UnknownBody(id))?;
        let field = LiftField::new(&self.atmosphere, &self.clouds, self.landscape.ridges());
        let outcome = glider.step(
            &field,
            &self.config.gliders,
            self.config.sim_dt,
            self.landscape.goal_x(),
        );
        tracing::trace!(glider = glider.name(), z = glider.position().z, lift = glider.lift(), "glider stepped");

        if let Some(mesh) = self.visuals.get(&id).and_then(|&h| self.registry.get_mut(h)) {
            mesh.place(self.meshes.glider().points(), &glider.basis().matrix(), glider.position());
        }
        Ok(outcome)
    }

    /// Age and drift one cloud; an expired cloud is removed along with its mesh.
    pub fn advance_cloud(&mut self, id: BodyId) -> Result<CloudStep, SimError> {
        let cloud = self.clouds.get_mut(&id).ok_or(SimError::UnknownBody(id))?;
        cloud.advance(self.config.sim_dt, &self.atmosphere);
        if cloud.is_expired() {
            self.remove_cloud(id)?;
            return Ok(CloudStep::Expired);
        }
        self.place_cloud(id);
        Ok(CloudStep::Alive)
    }

    fn place_cloud(&mut self, id: BodyId) {
        let Some(cloud) = self.clouds.get(&id) else {
            return;
        };
        let Some(mesh) = self.visuals.get(&id).and_then(|&h| self.registry.get_mut(h)) else {
            return;
        };
        let size = cloud.size();
        mesh.set_hidden(size < MIN_VISIBLE_SIZE);
        if size < MIN_VISIBLE_SIZE {
            return;
        }
        let r = cloud.radius();
        let scale = Mat3::from_diagonal(Vec3::new(r, r, self.config.clouds.thickness * size));
        mesh.place(self.meshes.cloud().points(), &scale, cloud.position());
    }

    /// Move a glider's trail head; the trail restarts when the glider has just landed.
    ///
    /// Returns `false` once the glider is gone.
    pub fn update_trail(&mut self, glider: BodyId) -> bool {
        let Some(g) = self.gliders.get(&glider) else {
            return false;
        };
        let Some(trail) = self.trails.get(&glider) else {
            return false;
        };
        let Some(mesh) = self.registry.get_mut(trail.handle()) else {
            return false;
        };
        if g.is_landed() {
            if g.landed_ticks() == 0 {
                Trail::reset(mesh, g.position(), g.heading());
            }
        } else {
            Trail::follow(mesh, g.position());
        }
        true
    }

    /// Replace every glider that has sat on the ground long enough with a fresh launch.
    ///
    /// Returns the ids of the new gliders.
    pub fn recycle_landed(&mut self) -> Result<Vec<BodyId>, SimError> {
        let Some(after) = self.config.recycle_after_ticks else {
            return Ok(Vec::new());
        };
        let done: Vec<BodyId> = self
            .gliders
            .values()
            .filter(|g| g.is_landed() && g.landed_ticks() >= after)
            .map(Glider::id)
            .collect();
        let mut launched = Vec::with_capacity(done.len());
        for id in done {
            self.remove_glider(id)?;
            launched.push(self.launch_glider());
        }
        if !launched.is_empty() {
            tracing::info!(count = launched.len(), "landed gliders relaunched");
        }
        Ok(launched)
    }

    /// Queue a key event from the host.
    pub fn push_key(&mut self, event: KeyEvent) -> Result<(), InputError> {
        self.input.push(event)
    }

    /// Take every queued key event, oldest first.
    pub fn drain_input(&mut self) -> Vec<KeyEvent> {
        self.input.drain().collect()
    }

    pub fn input(&self) -> &InputQueue {
        &self.input
    }

    pub fn focus(&self) -> Option<BodyId> {
        self.focus
    }

    pub fn set_focus(&mut self, id: BodyId) -> Result<(), SimError> {
        if !self.gliders.contains_key(&id) {
            return Err(SimError::UnknownBody(id));
        }
        self.focus = Some(id);
        Ok(())
    }

    /// Move the focus to the next glider in id order, wrapping around.
    pub fn cycle_focus(&mut self) -> Option<BodyId> {
        let next = match self.focus {
            Some(current) => self
                .gliders
                .range(current..)
                .nth(1)
                .or_else(|| self.gliders.iter().next())
                .map(|(id, _)| *id),
            None => self.gliders.keys().next().copied(),
        };
        self.focus = next;
        next
    }

    /// Apply a body-level action to the focused glider.
    ///
    /// Pause and quit belong to the clock and are ignored here. Returns whether anything changed.
    pub fn apply_action(&mut self, action: Action) -> bool {
        if action == Action::NextFocus {
            return self.cycle_focus().is_some();
        }
        let table_len = self.config.gliders.polar.len();
        let Some(glider) = self.focus.and_then(|id| self.gliders.get_mut(&id)) else {
            return false;
        };
        match action {
            Action::TurnLeft { held } => glider.steer_manually(if held { 1 } else { 0 }),
            Action::TurnRight { held } => glider.steer_manually(if held { -1 } else { 0 }),
            Action::SpeedUp => glider.set_polar_index(glider.polar_index() + 1, table_len),
            Action::SlowDown => glider.set_polar_index(glider.polar_index().saturating_sub(1), table_len),
            Action::Autopilot => glider.engage_autopilot(),
            Action::TogglePause | Action::Quit | Action::NextFocus | Action::Noop => return false,
        }
        tracing::debug!(glider = glider.name(), ?action, "action applied");
        true
    }

    /// Chase the focused glider from behind, or look over the field when nobody flies.
    pub fn update_camera(&mut self) {
        let view = &self.config.view;
        let (eye, focus) = match self.focus.and_then(|id| self.gliders.get(&id)) {
            Some(g) => {
                let p = g.position();
                let eye = p - heading_vector(g.heading()) * view.chase_distance + Vec3::Z * view.chase_height;
                (eye, p)
            }
            None => {
                let start = self.config.gliders.start;
                let focus = Vec3::new(start.x + 4.0, start.y, 0.0);
                (start + Vec3::new(-2.0, -4.0, 1.5), focus)
            }
        };
        self.camera.set_eye_and_focus(eye, focus);
    }

    /// One line per glider plus a header, focused glider marked.
    pub fn hud_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "T {:.0}S CLOUDS {}{}",
            self.sim_time,
            self.clouds.len(),
            if self.paused { " PAUSED" } else { "" }
        )];
        lines.extend(self.statuses().iter().map(ToString::to_string));
        lines
    }

    /// Draw the scene, then the overlay when enabled.
    pub fn render(&mut self, surface: &mut dyn Surface) -> FrameStats {
        let stats = self.registry.render_frame(&self.camera, surface);
        if self.config.view.hud {
            draw_hud(surface, &self.hud_lines());
        }
        stats
    }

    pub fn statuses(&self) -> Vec<GliderStatus> {
        self.gliders
            .values()
            .map(|g| GliderStatus::from_glider(g, self.focus == Some(g.id())))
            .collect()
    }

    /// Drop every body and return to the freshly built state.
    pub fn reset(&mut self) -> Result<(), SimError> {
        let gliders: Vec<BodyId> = self.gliders.keys().copied().collect();
        for id in gliders {
            self.remove_glider(id)?;
        }
        let clouds: Vec<BodyId> = self.clouds.keys().copied().collect();
        for id in clouds {
            self.remove_cloud(id)?;
        }
        self.atmosphere = Atmosphere::new(&self.config.atmosphere);
        self.rng = SeededRng::new(self.config.seed);
        self.input = InputQueue::with_capacity(self.config.input_queue_capacity);
        self.focus = None;
        self.paused = false;
        self.sim_time = 0.0;
        self.ticks = 0;
        self.launched = 0;
        self.update_camera();
        tracing::debug!("simulation reset");
        Ok(())
    }
}
