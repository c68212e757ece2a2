use glam::Vec3;
use soarscape_common::BodyId;
use soarscape_kernel::{Clock, ClockHandle, ClockStats, ObserverId, SystemTime, TimeSource};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::observers::{CloudObserver, CloudSpawner, Director, glider_observers};
use crate::simulation::Simulation;

/// A simulation wired to its clock.
///
/// The director always holds the first clock slot; bodies spawned through the scenario get
/// their observers registered alongside.
#[derive(Debug)]
pub struct Scenario {
    sim: Simulation,
    clock: Clock<Simulation>,
    director: ObserverId,
}

impl Scenario {
    /// Full scenario from `config` on the wall clock: launched gliders, clouds and the spawner.
    pub fn from_config(config: SimConfig) -> Result<Self, SimError> {
        Self::with_time_source(config, Box::new(SystemTime::new()))
    }

    pub fn with_time_source(config: SimConfig, time: Box<dyn TimeSource>) -> Result<Self, SimError> {
        let mut scenario = Self::empty(config, time)?;
        scenario.populate();
        Ok(scenario)
    }

    /// Only the director: no gliders, no clouds, no spawner.
    pub fn empty(config: SimConfig, time: Box<dyn TimeSource>) -> Result<Self, SimError> {
        let period = config.tick_period_ms;
        let sim = Simulation::new(config)?;
        let mut clock = Clock::with_time_source(period, time);
        let director = clock.add_observer(Box::new(Director));
        Ok(Self {
            sim,
            clock,
            director,
        })
    }

    fn populate(&mut self) {
        let gliders = self.sim.config().gliders.count;
        for _ in 0..gliders {
            let id = self.sim.launch_glider();
            self.watch_glider(id);
        }
        let clouds = self.sim.config().clouds.initial_count;
        for _ in 0..clouds {
            let age = self.sim.random_cloud_age();
            match self.sim.spawn_random_cloud(age) {
                Some(id) => {
                    self.clock.add_observer(Box::new(CloudObserver::new(id)));
                }
                None => break,
            }
        }
        let interval = self.sim.config().clouds.spawn_interval_ticks;
        if interval > 0 {
            self.clock.add_observer(Box::new(CloudSpawner::new(interval)));
        }
        tracing::info!(gliders, clouds = self.sim.clouds().len(), "scenario populated");
    }

    fn watch_glider(&mut self, id: BodyId) {
        for observer in glider_observers(id) {
            self.clock.add_observer(observer);
        }
    }

    pub fn spawn_glider(&mut self, position: Vec3, heading: f32) -> BodyId {
        let id = self.sim.spawn_glider(position, heading);
        self.watch_glider(id);
        id
    }

    pub fn spawn_cloud(&mut self, position: Vec3) -> BodyId {
        self.spawn_cloud_aged(position, 0.0)
    }

    pub fn spawn_cloud_aged(&mut self, position: Vec3, age: f32) -> BodyId {
        let id = self.sim.spawn_cloud_aged(position, age);
        self.clock.add_observer(Box::new(CloudObserver::new(id)));
        id
    }

    /// One tick without pacing.
    pub fn step(&mut self) {
        self.clock.tick(&mut self.sim);
    }

    /// Run the paced loop, calling `frame` after every tick.
    pub fn run<F>(&mut self, max_ticks: Option<u64>, frame: F) -> Result<ClockStats, SimError>
    where
        F: FnMut(&mut Simulation),
    {
        Ok(self.clock.run(&mut self.sim, max_ticks, frame)?)
    }

    /// Drop every body and body observer, then repopulate from the config.
    pub fn reset(&mut self) -> Result<(), SimError> {
        for id in self.clock.observer_ids() {
            if id != self.director {
                self.clock.remove_observer(id);
            }
        }
        self.clock.set_paused(false);
        self.sim.reset()?;
        self.populate();
        Ok(())
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn clock(&self) -> &Clock<Simulation> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock<Simulation> {
        &mut self.clock
    }

    /// Stop switch usable from another thread.
    pub fn handle(&self) -> ClockHandle {
        self.clock.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soarscape_kernel::ManualTime;

    #[test]
    fn populated_scenario_has_gliders_clouds_and_spawner() {
        let scenario = Scenario::with_time_source(SimConfig::default(), Box::new(ManualTime::new())).unwrap();
        let config = SimConfig::default();
        assert_eq!(scenario.sim().gliders().len(), config.gliders.count);
        assert_eq!(scenario.sim().clouds().len(), config.clouds.initial_count);
        // director + two per glider + one per cloud + spawner
        let expected = 1 + 2 * config.gliders.count + config.clouds.initial_count + 1;
        assert_eq!(scenario.clock().observer_count(), expected);
    }

    #[test]
    fn empty_scenario_has_only_the_director() {
        let scenario = Scenario::empty(SimConfig::default(), Box::new(ManualTime::new())).unwrap();
        assert_eq!(scenario.clock().observer_count(), 1);
        assert!(scenario.sim().gliders().is_empty());
    }

    #[test]
    fn run_stops_after_max_ticks() {
        let time = ManualTime::new();
        let mut scenario = Scenario::with_time_source(SimConfig::default(), Box::new(time.clone())).unwrap();
        let mut frames = 0;
        let stats = scenario.run(Some(5), |_| frames += 1).unwrap();
        assert_eq!(stats.ticks, 5);
        assert_eq!(frames, 5);
        assert_eq!(scenario.sim().ticks(), 5);
        assert_eq!(time.now_millis(), 5 * SimConfig::default().tick_period_ms);
    }

    #[test]
    fn reset_repopulates() {
        let mut scenario = Scenario::with_time_source(SimConfig::default(), Box::new(ManualTime::new())).unwrap();
        for _ in 0..3 {
            scenario.step();
        }
        let before = scenario.clock().observer_count();
        scenario.reset().unwrap();
        assert_eq!(scenario.sim().ticks(), 0);
        assert_eq!(scenario.clock().observer_count(), before);
        assert_eq!(scenario.clock().observer_ids()[0], scenario.director);
    }
}
