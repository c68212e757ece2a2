use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use soarscape_common::BodyId;
use soarscape_common::math::{bearing, horizontal_distance, wrap_angle};

use crate::lift::LiftField;

/// How strongly the thermalling circle corrects back onto its radius.
const CIRCLE_GAIN: f32 = 0.6;

/// Steering controller installed on a glider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Autopilot {
    /// Nothing installed; the glider searches on its next tick.
    #[default]
    Idle,
    /// Hold a heading for a number of ticks.
    Heading { heading: f32, ticks_left: u32 },
    /// Fly to a fixed point.
    ToPoint { target: Vec3 },
    /// Fly to a drifting cloud.
    ToCloud { cloud: BodyId },
    /// Circle under a cloud.
    Circle { cloud: BodyId, radius: f32 },
    /// Beat back and forth between two waypoints.
    Circuit { waypoints: [Vec3; 2], leg: usize },
    /// Keyboard steering; `turn` is -1 (right), 0 or 1 (left).
    Manual { turn: i8 },
}

/// Something the controller noticed while steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotEvent {
    Arrived,
    SourceLost,
    TimerElapsed,
}

/// Inputs the controller reads from the glider.
#[derive(Debug, Clone, Copy)]
pub struct PilotView {
    pub position: Vec3,
    pub heading: f32,
    /// Largest heading change available this tick.
    pub max_turn: f32,
    pub arrive_radius: f32,
}

impl Autopilot {
    /// Short label for the HUD.
    pub fn label(&self) -> &'static str {
        match self {
            Autopilot::Idle => "idle",
            Autopilot::Heading { .. } => "heading",
            Autopilot::ToPoint { .. } => "to-point",
            Autopilot::ToCloud { .. } => "to-cloud",
            Autopilot::Circle { .. } => "circling",
            Autopilot::Circuit { .. } => "circuit",
            Autopilot::Manual { .. } => "manual",
        }
    }

    /// Heading to fly this tick, plus any event the controller raises.
    pub fn steer(&mut self, view: &PilotView, field: &LiftField<'_>) -> (f32, Option<PilotEvent>) {
        let p = view.position;
        match self {
            Autopilot::Idle => (view.heading, None),
            Autopilot::Heading {
                heading,
                ticks_left,
            } => {
                *ticks_left = ticks_left.saturating_sub(1);
                let event = (*ticks_left == 0).then_some(PilotEvent::TimerElapsed);
                (*heading, event)
            }
            Autopilot::ToPoint { target } => {
                let event = (horizontal_distance(p, *target) < view.arrive_radius)
                    .then_some(PilotEvent::Arrived);
                (bearing(p, *target), event)
            }
            Autopilot::ToCloud { cloud } => match field.cloud(*cloud) {
                Some(c) if !c.is_decaying() => {
                    let reach = c.core_radius().max(view.arrive_radius);
                    let event =
                        (horizontal_distance(p, c.position()) < reach).then_some(PilotEvent::Arrived);
                    (bearing(p, c.position()), event)
                }
                _ => (view.heading, Some(PilotEvent::SourceLost)),
            },
            Autopilot::Circle { cloud, radius } => match field.cloud(*cloud) {
                Some(c) if !c.is_decaying() => {
                    let center = c.position();
                    let d = horizontal_distance(p, center);
                    let correction = ((d - *radius) / *radius).clamp(-1.0, 1.0) * CIRCLE_GAIN;
                    (bearing(center, p) + FRAC_PI_2 + correction, None)
                }
                _ => (view.heading, Some(PilotEvent::SourceLost)),
            },
            Autopilot::Circuit { waypoints, leg } => {
                let target = waypoints[*leg];
                let from = waypoints[1 - *leg];
                let run = (target - from).truncate();
                // passing abeam of the waypoint counts as reaching it
                if (p - target).truncate().dot(run) >= 0.0 {
                    *leg = 1 - *leg;
                }
                (bearing(p, waypoints[*leg]), None)
            }
            Autopilot::Manual { turn } => (view.heading + *turn as f32 * view.max_turn, None),
        }
    }
}

impl fmt::Display for Autopilot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Heading change actually flown, limited to `max_turn` either way.
pub fn limit_turn(current: f32, desired: f32, max_turn: f32) -> f32 {
    wrap_angle(desired - current).clamp(-max_turn, max_turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::Atmosphere;
    use crate::config::CloudConfig;
    use crate::lift::Cloud;
    use std::collections::BTreeMap;

    fn view(position: Vec3, heading: f32) -> PilotView {
        PilotView {
            position,
            heading,
            max_turn: 0.3,
            arrive_radius: 0.1,
        }
    }

    #[test]
    fn heading_timer_elapses() {
        let atmo = Atmosphere::default();
        let clouds = BTreeMap::new();
        let field = LiftField::new(&atmo, &clouds, &[]);
        let mut pilot = Autopilot::Heading {
            heading: 1.0,
            ticks_left: 2,
        };
        let v = view(Vec3::ZERO, 0.0);
        assert_eq!(pilot.steer(&v, &field), (1.0, None));
        assert_eq!(pilot.steer(&v, &field), (1.0, Some(PilotEvent::TimerElapsed)));
    }

    #[test]
    fn to_point_arrives() {
        let atmo = Atmosphere::default();
        let clouds = BTreeMap::new();
        let field = LiftField::new(&atmo, &clouds, &[]);
        let mut pilot = Autopilot::ToPoint {
            target: Vec3::new(0.0, 1.0, 0.5),
        };
        let (h, e) = pilot.steer(&view(Vec3::ZERO, 0.0), &field);
        assert!((h - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(e, None);
        let (_, e) = pilot.steer(&view(Vec3::new(0.0, 0.95, 0.9), 0.0), &field);
        assert_eq!(e, Some(PilotEvent::Arrived));
    }

    #[test]
    fn lost_cloud_is_reported() {
        let atmo = Atmosphere::default();
        let clouds = BTreeMap::new();
        let field = LiftField::new(&atmo, &clouds, &[]);
        let mut pilot = Autopilot::ToCloud { cloud: BodyId::new() };
        let (_, e) = pilot.steer(&view(Vec3::ZERO, 0.0), &field);
        assert_eq!(e, Some(PilotEvent::SourceLost));
    }

    #[test]
    fn circle_flies_tangent_on_radius() {
        let atmo = Atmosphere::default();
        let cloud = Cloud::new(BodyId::new(), Vec3::new(0.0, 0.0, 1.5), &CloudConfig::default())
            .with_age(100.0);
        let mut clouds = BTreeMap::new();
        clouds.insert(cloud.id(), cloud.clone());
        let field = LiftField::new(&atmo, &clouds, &[]);
        let mut pilot = Autopilot::Circle {
            cloud: cloud.id(),
            radius: 0.2,
        };
        // east of the center on the radius: fly north (counter-clockwise)
        let (h, e) = pilot.steer(&view(Vec3::new(0.2, 0.0, 1.0), 0.0), &field);
        assert!((h - FRAC_PI_2).abs() < 1e-5);
        assert_eq!(e, None);
        // outside the radius: turn in towards the center
        let (h_out, _) = pilot.steer(&view(Vec3::new(0.4, 0.0, 1.0), 0.0), &field);
        assert!(h_out > FRAC_PI_2);
    }

    #[test]
    fn circuit_switches_leg_when_passing_waypoint() {
        let atmo = Atmosphere::default();
        let clouds = BTreeMap::new();
        let field = LiftField::new(&atmo, &clouds, &[]);
        let a = Vec3::new(0.0, -1.0, 0.3);
        let b = Vec3::new(0.0, 1.0, 0.3);
        let mut pilot = Autopilot::Circuit {
            waypoints: [a, b],
            leg: 1,
        };
        pilot.steer(&view(Vec3::new(0.0, 0.5, 0.3), 0.0), &field);
        assert!(matches!(pilot, Autopilot::Circuit { leg: 1, .. }));
        let (h, _) = pilot.steer(&view(Vec3::new(-0.1, 1.05, 0.3), 0.0), &field);
        assert!(matches!(pilot, Autopilot::Circuit { leg: 0, .. }));
        assert!(h < 0.0);
    }

    #[test]
    fn manual_turn_uses_full_rate() {
        let atmo = Atmosphere::default();
        let clouds = BTreeMap::new();
        let field = LiftField::new(&atmo, &clouds, &[]);
        let mut pilot = Autopilot::Manual { turn: -1 };
        let (h, _) = pilot.steer(&view(Vec3::ZERO, 1.0), &field);
        assert!((h - 0.7).abs() < 1e-6);
    }

    #[test]
    fn turn_limit_wraps_the_short_way() {
        assert!((limit_turn(3.0, -3.0, 1.0) - (std::f32::consts::TAU - 6.0)).abs() < 1e-5);
        assert_eq!(limit_turn(0.0, 2.0, 0.3), 0.3);
        assert_eq!(limit_turn(0.0, -2.0, 0.3), -0.3);
    }
}
