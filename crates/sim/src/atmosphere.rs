use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::AtmosphereConfig;

/// Air mass state shared by every lift computation.
///
/// Owned by the simulation and passed explicitly; there is no global cloud base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    pub wind: Vec3,
    pub cloud_base: f32,
}

impl Atmosphere {
    pub fn new(config: &AtmosphereConfig) -> Self {
        Self {
            wind: config.wind.truncate().extend(0.0),
            cloud_base: config.cloud_base,
        }
    }

    /// Unit vector the wind blows towards, +x when calm.
    pub fn downwind(&self) -> Vec3 {
        if self.wind.length_squared() > 0.0 {
            self.wind.normalize()
        } else {
            Vec3::X
        }
    }

    /// Signed distance from `from` to `to` measured along the wind; negative is upwind.
    pub fn downwind_distance(&self, from: Vec3, to: Vec3) -> f32 {
        (to - from).truncate().dot(self.downwind().truncate())
    }

    /// Heading (radians) the wind blows towards.
    pub fn downwind_heading(&self) -> f32 {
        let d = self.downwind();
        d.y.atan2(d.x)
    }
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::new(&AtmosphereConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_air_defaults_downwind_to_east() {
        let atmo = Atmosphere {
            wind: Vec3::ZERO,
            cloud_base: 1.0,
        };
        assert_eq!(atmo.downwind(), Vec3::X);
        assert_eq!(atmo.downwind_heading(), 0.0);
    }

    #[test]
    fn downwind_distance_sign() {
        let atmo = Atmosphere {
            wind: Vec3::new(0.0, 0.005, 0.0),
            cloud_base: 1.0,
        };
        let here = Vec3::ZERO;
        assert!(atmo.downwind_distance(here, Vec3::new(0.0, 2.0, 0.0)) > 1.99);
        assert!(atmo.downwind_distance(here, Vec3::new(0.0, -1.0, 0.0)) < 0.0);
    }

    #[test]
    fn vertical_wind_is_dropped() {
        let atmo = Atmosphere::new(&AtmosphereConfig {
            wind: Vec3::new(0.003, 0.0, 0.5),
            cloud_base: 1.2,
        });
        assert_eq!(atmo.wind.z, 0.0);
    }
}
