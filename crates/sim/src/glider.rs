use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use soarscape_common::math::{heading_vector, wrap_angle};
use soarscape_common::{Basis, BodyId};

use crate::autopilot::{Autopilot, PilotEvent, PilotView, limit_turn};
use crate::config::GliderConfig;
use crate::lift::{LiftField, LiftTarget};

/// Flight phase of a glider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightState {
    Cruising,
    SeekingLift,
    Landed,
    GoalReached,
}

impl fmt::Display for FlightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlightState::Cruising => "cruising",
            FlightState::SeekingLift => "seeking-lift",
            FlightState::Landed => "landed",
            FlightState::GoalReached => "goal-reached",
        })
    }
}

/// What a single step changed, for logging and the observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub landed: bool,
    pub reached_goal: bool,
}

/// A moving body with a flight state machine and an autopilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glider {
    id: BodyId,
    name: String,
    position: Vec3,
    velocity: Vec3,
    heading: f32,
    bank: f32,
    polar_index: usize,
    state: FlightState,
    reached_goal: bool,
    autopilot: Autopilot,
    target: Option<LiftTarget>,
    lift: f32,
    landed_ticks: u64,
}

impl Glider {
    pub fn new(id: BodyId, name: impl Into<String>, position: Vec3, heading: f32, polar_index: usize) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            velocity: Vec3::ZERO,
            heading,
            bank: 0.0,
            polar_index,
            state: FlightState::Cruising,
            reached_goal: false,
            autopilot: Autopilot::Idle,
            target: None,
            lift: 0.0,
            landed_ticks: 0,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn bank(&self) -> f32 {
        self.bank
    }

    pub fn basis(&self) -> Basis {
        Basis::from_heading_bank(self.heading, self.bank)
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    pub fn is_landed(&self) -> bool {
        self.state == FlightState::Landed
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    pub fn target(&self) -> Option<LiftTarget> {
        self.target
    }

    pub fn polar_index(&self) -> usize {
        self.polar_index
    }

    /// Lift felt during the last step, km/s.
    pub fn lift(&self) -> f32 {
        self.lift
    }

    /// Ticks spent on the ground since landing.
    pub fn landed_ticks(&self) -> u64 {
        self.landed_ticks
    }

    pub fn set_polar_index(&mut self, index: usize, table_len: usize) {
        self.polar_index = index.min(table_len.saturating_sub(1));
    }

    /// Take manual control; `turn` is -1 (right), 0 or 1 (left).
    pub fn steer_manually(&mut self, turn: i8) {
        if self.is_landed() {
            return;
        }
        self.autopilot = Autopilot::Manual {
            turn: turn.clamp(-1, 1),
        };
        self.target = None;
        self.set_state(FlightState::Cruising);
    }

    /// Drop manual control and let the autopilot search again.
    pub fn engage_autopilot(&mut self) {
        if self.is_landed() {
            return;
        }
        self.autopilot = Autopilot::Idle;
        self.target = None;
        self.set_state(FlightState::Cruising);
    }

    /// Goal-reached sticks until landing.
    fn set_state(&mut self, state: FlightState) {
        if self.state == FlightState::GoalReached && state != FlightState::Landed {
            return;
        }
        if self.state != state {
            tracing::debug!(glider = %self.name, from = %self.state, to = %state, "flight state");
        }
        self.state = state;
    }

    /// Choose the next lift source, or fly downwind for a while and retry.
    fn search(&mut self, field: &LiftField<'_>, config: &GliderConfig, exclude: Option<LiftTarget>) {
        let polar = config.polar.get(self.polar_index);
        match field.find_lift(self.position, polar, exclude) {
            Some(target) => {
                self.autopilot = match target {
                    LiftTarget::Cloud(cloud) => Autopilot::ToCloud { cloud },
                    LiftTarget::Ridge(i) => match field.ridge(i) {
                        Some(ridge) => Autopilot::ToPoint {
                            target: ridge.circuit()[ridge.nearest_waypoint(self.position)],
                        },
                        None => Autopilot::Idle,
                    },
                };
                tracing::debug!(glider = %self.name, %target, "heading for lift");
                self.target = Some(target);
                self.set_state(FlightState::SeekingLift);
            }
            None => {
                tracing::debug!(glider = %self.name, ticks = config.retry_ticks, "no lift in range, flying downwind");
                self.autopilot = Autopilot::Heading {
                    heading: field.atmosphere.downwind_heading(),
                    ticks_left: config.retry_ticks.max(1),
                };
                self.target = None;
                self.set_state(FlightState::Cruising);
            }
        }
    }

    /// Top of the lift the glider is working, if it is working one.
    fn working_top(&self, field: &LiftField<'_>) -> Option<f32> {
        match (&self.autopilot, self.target) {
            (Autopilot::Circle { .. }, _) => Some(field.atmosphere.cloud_base),
            (Autopilot::Circuit { .. }, Some(LiftTarget::Ridge(i))) => field.ridge(i).map(|r| r.lift_top()),
            _ => None,
        }
    }

    fn handle_event(&mut self, event: PilotEvent, field: &LiftField<'_>, config: &GliderConfig) {
        match (event, self.target) {
            (PilotEvent::Arrived, Some(LiftTarget::Cloud(cloud))) => {
                let radius = field
                    .cloud(cloud)
                    .map(|c| config.circle_radius.min(c.core_radius().max(config.arrive_radius)))
                    .unwrap_or(config.circle_radius);
                self.autopilot = Autopilot::Circle { cloud, radius };
                self.set_state(FlightState::Cruising);
            }
            (PilotEvent::Arrived, Some(LiftTarget::Ridge(i))) => {
                if let Some(ridge) = field.ridge(i) {
                    let leg = 1 - ridge.nearest_waypoint(self.position);
                    self.autopilot = Autopilot::Circuit {
                        waypoints: ridge.circuit(),
                        leg,
                    };
                    tracing::debug!(glider = %self.name, ridge = ridge.name(), "circuit joined");
                    self.set_state(FlightState::Cruising);
                } else {
                    self.search(field, config, None);
                }
            }
            (PilotEvent::SourceLost, _) => {
                tracing::debug!(glider = %self.name, "lift source lost");
                self.search(field, config, self.target);
            }
            _ => self.search(field, config, None),
        }
    }

    /// Advance one tick of `dt` simulated seconds.
    pub fn step(
        &mut self,
        field: &LiftField<'_>,
        config: &GliderConfig,
        dt: f32,
        goal_x: Option<f32>,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if self.is_landed() {
            self.landed_ticks += 1;
            return outcome;
        }

        if self.autopilot == Autopilot::Idle {
            self.search(field, config, None);
        } else if let Some(top) = self.working_top(field) {
            if self.position.z >= top - config.leave_margin {
                tracing::debug!(glider = %self.name, height = self.position.z, "leaving lift at top");
                self.search(field, config, self.target);
            }
        }

        let max_turn = config.turn_rate * dt;
        let view = PilotView {
            position: self.position,
            heading: self.heading,
            max_turn,
            arrive_radius: config.arrive_radius,
        };
        let (desired, event) = self.autopilot.steer(&view, field);
        if let Some(event) = event {
            self.handle_event(event, field, config);
        }

        let turn = limit_turn(self.heading, desired, max_turn);
        self.heading = wrap_angle(self.heading + turn);
        self.bank = if max_turn > 0.0 {
            turn / max_turn * config.max_bank
        } else {
            0.0
        };

        let polar = config.polar.get(self.polar_index);
        self.lift = field.lift_at(self.position);
        let mut velocity = heading_vector(self.heading) * polar.speed + field.atmosphere.wind;
        velocity.z = self.lift - polar.sink;
        self.velocity = velocity;

        let previous = self.position;
        self.position += velocity * dt;

        if let Some(goal) = goal_x {
            if !self.reached_goal && previous.x < goal && self.position.x >= goal {
                self.reached_goal = true;
                outcome.reached_goal = true;
                tracing::info!(glider = %self.name, "goal reached");
                self.set_state(FlightState::GoalReached);
            }
        }

        if self.position.z <= 0.0 && velocity.z < 0.0 {
            self.position.z = 0.0;
            self.velocity = Vec3::ZERO;
            self.bank = 0.0;
            self.landed_ticks = 0;
            outcome.landed = true;
            tracing::info!(glider = %self.name, x = self.position.x, y = self.position.y, "landed");
            self.set_state(FlightState::Landed);
        }
        outcome
    }
}
