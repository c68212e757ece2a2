//! HUD numbers for a glider and the text overlay that shows them.

use std::fmt;

use glam::Vec3;
use serde::Serialize;
use soarscape_common::{BodyId, Color, Font, FontStyle};
use soarscape_render::Surface;

use crate::glider::{FlightState, Glider};

const HUD_FONT_SIZE: u16 = 10;
const HUD_MARGIN: i32 = 6;
const HUD_COLOR: Color = Color::rgb(20, 20, 40);

/// A snapshot of one glider in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GliderStatus {
    pub id: BodyId,
    pub name: String,
    pub state: FlightState,
    pub autopilot: &'static str,
    pub position: Vec3,
    /// Height above ground, metres.
    pub altitude_m: f32,
    /// Horizontal speed over the ground, km/h.
    pub ground_speed_kmh: f32,
    /// Climb rate, m/s; negative when sinking.
    pub vario_ms: f32,
    pub polar_index: usize,
    pub reached_goal: bool,
    pub focused: bool,
}

impl GliderStatus {
    pub fn from_glider(glider: &Glider, focused: bool) -> Self {
        let v = glider.velocity();
        Self {
            id: glider.id(),
            name: glider.name().to_string(),
            state: glider.state(),
            autopilot: glider.autopilot().label(),
            position: glider.position(),
            altitude_m: glider.position().z * 1000.0,
            ground_speed_kmh: v.truncate().length() * 3600.0,
            vario_ms: v.z * 1000.0,
            polar_index: glider.polar_index(),
            reached_goal: glider.reached_goal(),
            focused,
        }
    }
}

impl fmt::Display for GliderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {} alt {:.0}m gs {:.0}km/h vario {:+.1}m/s polar {}",
            if self.focused { "*" } else { " " },
            self.name,
            self.state,
            self.altitude_m,
            self.ground_speed_kmh,
            self.vario_ms,
            self.polar_index,
        )?;
        if self.reached_goal {
            f.write_str(" goal")?;
        }
        Ok(())
    }
}

/// Serialize statuses as a pretty JSON array.
pub fn to_json(statuses: &[GliderStatus]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(statuses)
}

/// Draw `lines` top-left, one per row.
pub fn draw_hud(surface: &mut dyn Surface, lines: &[String]) {
    let font = Font::new("monospace", FontStyle::Plain, HUD_FONT_SIZE);
    surface.set_font(&font);
    surface.set_color(HUD_COLOR);
    let row = i32::from(HUD_FONT_SIZE) + 4;
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(line, HUD_MARGIN, HUD_MARGIN + row * i as i32);
    }
}
