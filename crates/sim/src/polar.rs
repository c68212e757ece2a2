use serde::{Deserialize, Serialize};

/// One speed choice and the sink rate it costs, both km/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    pub speed: f32,
    pub sink: f32,
}

impl PolarPoint {
    pub const fn new(speed: f32, sink: f32) -> Self {
        Self { speed, sink }
    }

    /// Horizontal distance covered per unit of height lost in still air.
    pub fn glide_ratio(&self) -> f32 {
        self.speed / self.sink
    }
}

/// Speed-to-fly table, slowest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polar {
    points: Vec<PolarPoint>,
}

impl Polar {
    pub fn new(points: Vec<PolarPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    /// Entry at `index`, clamped to the table. The table must not be empty.
    pub fn get(&self, index: usize) -> PolarPoint {
        assert!(!self.points.is_empty(), "empty polar table");
        self.points[index.min(self.points.len() - 1)]
    }

    /// Problems with the table, if any.
    pub fn check(&self) -> Result<(), String> {
        if self.points.is_empty() {
            return Err("polar table is empty".into());
        }
        for (i, p) in self.points.iter().enumerate() {
            if !(p.speed > 0.0 && p.sink > 0.0) {
                return Err(format!("polar entry {i} needs positive speed and sink"));
            }
        }
        if self.points.windows(2).any(|w| w[1].speed <= w[0].speed) {
            return Err("polar speeds must increase".into());
        }
        Ok(())
    }
}

impl Default for Polar {
    fn default() -> Self {
        Self::new(vec![
            PolarPoint::new(0.020, 0.0007),
            PolarPoint::new(0.028, 0.0010),
            PolarPoint::new(0.038, 0.0018),
            PolarPoint::new(0.050, 0.0030),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let polar = Polar::default();
        assert!(polar.check().is_ok());
        assert_eq!(polar.len(), 4);
    }

    #[test]
    fn faster_costs_more_sink() {
        let polar = Polar::default();
        assert!(polar.points().windows(2).all(|w| w[1].sink > w[0].sink));
        assert!(polar.get(0).glide_ratio() > polar.get(3).glide_ratio());
    }

    #[test]
    fn get_clamps_index() {
        let polar = Polar::default();
        assert_eq!(polar.get(99), polar.get(3));
    }

    #[test]
    fn check_rejects_bad_tables() {
        assert!(Polar::new(vec![]).check().is_err());
        assert!(Polar::new(vec![PolarPoint::new(0.02, 0.0)]).check().is_err());
        let unordered = Polar::new(vec![PolarPoint::new(0.03, 0.001), PolarPoint::new(0.02, 0.002)]);
        assert!(unordered.check().is_err());
    }
}
