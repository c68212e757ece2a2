//! Rising-air sources: thermals under clouds and ridge lift over hills.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use soarscape_common::BodyId;
use soarscape_common::math::{distance_to_segment_2d, horizontal_distance, make_unit};

use crate::atmosphere::Atmosphere;
use crate::config::{CloudConfig, RidgeConfig};
use crate::polar::PolarPoint;

/// Lift at `distance` from a source's center line.
///
/// Zero at or beyond `outer`, `peak` inside `core`, linear in between.
pub fn bounded_lift(distance: f32, outer: f32, core: f32, peak: f32) -> f32 {
    if distance >= outer {
        0.0
    } else if distance <= core {
        peak
    } else {
        peak * (outer - distance) / (outer - core)
    }
}

/// Growth, plateau and decay durations of a thermal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifecycle {
    pub nose: f32,
    pub mature: f32,
    pub tail: f32,
}

impl Lifecycle {
    pub fn total(&self) -> f32 {
        self.nose + self.mature + self.tail
    }

    /// Relative size in `[0, 1]` at `age`.
    pub fn size(&self, age: f32) -> f32 {
        if age <= 0.0 {
            0.0
        } else if age <= self.nose {
            (age / self.nose).sqrt()
        } else if age <= self.nose + self.mature {
            1.0
        } else if age <= self.total() {
            (1.0 - (age - self.nose - self.mature) / self.tail).max(0.0).sqrt()
        } else {
            0.0
        }
    }

    pub fn is_decaying(&self, age: f32) -> bool {
        age > self.nose + self.mature
    }

    pub fn is_expired(&self, age: f32) -> bool {
        age > self.total()
    }
}

/// A thermal under a drifting cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    id: BodyId,
    /// Center of the cloud base.
    position: Vec3,
    age: f32,
    lifecycle: Lifecycle,
    strength: f32,
    max_radius: f32,
    core_fraction: f32,
}

impl Cloud {
    pub fn new(id: BodyId, position: Vec3, config: &CloudConfig) -> Self {
        Self {
            id,
            position,
            age: 0.0,
            lifecycle: Lifecycle {
                nose: config.nose,
                mature: config.mature,
                tail: config.tail,
            },
            strength: config.strength,
            max_radius: config.max_radius,
            core_fraction: config.core_fraction,
        }
    }

    pub fn with_age(mut self, age: f32) -> Self {
        self.age = age;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn size(&self) -> f32 {
        self.lifecycle.size(self.age)
    }

    pub fn is_decaying(&self) -> bool {
        self.lifecycle.is_decaying(self.age)
    }

    pub fn is_expired(&self) -> bool {
        self.lifecycle.is_expired(self.age)
    }

    pub fn radius(&self) -> f32 {
        self.max_radius * self.size()
    }

    pub fn core_radius(&self) -> f32 {
        self.radius() * self.core_fraction
    }

    /// Age by `dt` and drift with the wind.
    pub fn advance(&mut self, dt: f32, atmosphere: &Atmosphere) {
        self.age += dt;
        self.position += atmosphere.wind * dt;
    }

    /// Vertical air speed this thermal gives at `p`.
    pub fn lift_at(&self, p: Vec3, atmosphere: &Atmosphere) -> f32 {
        if p.z < 0.0 || p.z > atmosphere.cloud_base {
            return 0.0;
        }
        let size = self.size();
        if size <= 0.0 {
            return 0.0;
        }
        bounded_lift(
            horizontal_distance(p, self.position),
            self.radius(),
            self.core_radius(),
            self.strength * size,
        )
    }
}

/// Lift band along the windward face of a hill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    name: String,
    start: Vec3,
    end: Vec3,
    height: f32,
    lift_width: f32,
    core_width: f32,
    strength: f32,
    lift_top: f32,
    circuit: [Vec3; 2],
}

impl Ridge {
    pub fn new(config: &RidgeConfig, atmosphere: &Atmosphere) -> Self {
        let start = config.start.truncate().extend(0.0);
        let end = config.end.truncate().extend(0.0);
        let along = make_unit(end - start);
        let upwind = -atmosphere.downwind();
        // beat between points just inside each end, upwind of the crest
        let inset = along * (end - start).length().min(0.4) * 0.25;
        let offset = upwind * config.circuit_offset;
        let beat_height = config.lift_top * 0.5;
        let circuit = [
            (start + inset + offset).truncate().extend(beat_height),
            (end - inset + offset).truncate().extend(beat_height),
        ];
        Self {
            name: config.name.clone(),
            start,
            end,
            height: config.height,
            lift_width: config.lift_width,
            core_width: config.core_width,
            strength: config.strength,
            lift_top: config.lift_top,
            circuit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crest(&self) -> (Vec3, Vec3) {
        (self.start, self.end)
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn lift_top(&self) -> f32 {
        self.lift_top
    }

    /// The two beat waypoints.
    pub fn circuit(&self) -> [Vec3; 2] {
        self.circuit
    }

    /// Horizontal distance from the crest line.
    pub fn distance_to(&self, p: Vec3) -> f32 {
        distance_to_segment_2d(p, self.start, self.end)
    }

    pub fn lift_at(&self, p: Vec3) -> f32 {
        if p.z < 0.0 || p.z > self.lift_top {
            return 0.0;
        }
        bounded_lift(self.distance_to(p), self.lift_width, self.core_width, self.strength)
    }

    /// Beat waypoint nearest to `p`, as an index into [`circuit`](Self::circuit).
    pub fn nearest_waypoint(&self, p: Vec3) -> usize {
        let [a, b] = self.circuit;
        if horizontal_distance(p, a) <= horizontal_distance(p, b) {
            0
        } else {
            1
        }
    }
}

/// A lift source a glider is heading for or working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiftTarget {
    Ridge(usize),
    Cloud(BodyId),
}

impl fmt::Display for LiftTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftTarget::Ridge(i) => write!(f, "ridge#{i}"),
            LiftTarget::Cloud(id) => write!(f, "cloud {}", id.short()),
        }
    }
}

/// Read-only view of every lift source, handed to gliders each tick.
#[derive(Debug, Clone, Copy)]
pub struct LiftField<'a> {
    pub atmosphere: &'a Atmosphere,
    pub clouds: &'a BTreeMap<BodyId, Cloud>,
    pub ridges: &'a [Ridge],
}

impl<'a> LiftField<'a> {
    pub fn new(
        atmosphere: &'a Atmosphere,
        clouds: &'a BTreeMap<BodyId, Cloud>,
        ridges: &'a [Ridge],
    ) -> Self {
        Self {
            atmosphere,
            clouds,
            ridges,
        }
    }

    /// Summed lift of every source at `p`.
    pub fn lift_at(&self, p: Vec3) -> f32 {
        let ridge: f32 = self.ridges.iter().map(|r| r.lift_at(p)).sum();
        let thermal: f32 = self
            .clouds
            .values()
            .map(|c| c.lift_at(p, self.atmosphere))
            .sum();
        ridge + thermal
    }

    pub fn cloud(&self, id: BodyId) -> Option<&'a Cloud> {
        self.clouds.get(&id)
    }

    pub fn ridge(&self, index: usize) -> Option<&'a Ridge> {
        self.ridges.get(index)
    }

    /// Pick the next lift source for a glider at `p` flying `polar`.
    ///
    /// Only sources within still-air glide range count. A ridge wins over any cloud; among
    /// clouds that are not decaying, the one with the smallest positive downwind distance
    /// wins, then the nearest upwind one. `exclude` is the source being left.
    pub fn find_lift(&self, p: Vec3, polar: PolarPoint, exclude: Option<LiftTarget>) -> Option<LiftTarget> {
        let range = p.z.max(0.0) / polar.sink * polar.speed;

        let ridge = self
            .ridges
            .iter()
            .enumerate()
            .filter(|(i, _)| exclude != Some(LiftTarget::Ridge(*i)))
            .map(|(i, r)| (i, r.distance_to(p)))
            .filter(|(_, d)| *d <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, _)) = ridge {
            return Some(LiftTarget::Ridge(i));
        }

        let candidates: Vec<(&Cloud, f32)> = self
            .clouds
            .values()
            .filter(|c| !c.is_decaying() && exclude != Some(LiftTarget::Cloud(c.id())))
            .filter(|c| horizontal_distance(p, c.position()) <= range)
            .map(|c| (c, self.atmosphere.downwind_distance(p, c.position())))
            .collect();

        let forward = candidates
            .iter()
            .filter(|(_, d)| *d > 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((c, _)) = forward {
            return Some(LiftTarget::Cloud(c.id()));
        }

        candidates
            .iter()
            .min_by(|a, b| {
                horizontal_distance(p, a.0.position()).total_cmp(&horizontal_distance(p, b.0.position()))
            })
            .map(|(c, _)| LiftTarget::Cloud(c.id()))
    }
}
