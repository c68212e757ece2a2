//! Clock observers that drive the simulation.
//!
//! The director registers first so it keeps ticking while the clock is paused; every body gets
//! its own observer, which removes itself once the body is gone.

use soarscape_common::BodyId;
use soarscape_input::Action;
use soarscape_kernel::{Flow, Observer, Schedule};

use crate::simulation::{CloudStep, Simulation};

/// Input, camera and relaunching. Must be the first observer on the clock.
#[derive(Debug, Default)]
pub struct Director;

impl Observer<Simulation> for Director {
    fn tick(&mut self, sim: &mut Simulation, schedule: &mut Schedule<Simulation>) -> Flow {
        let paused = schedule.is_paused();
        for event in sim.drain_input() {
            match Action::from_event(event) {
                Action::TogglePause => {
                    let now = !schedule.is_paused();
                    tracing::info!(paused = now, "pause toggled");
                    schedule.set_paused(now);
                }
                Action::Quit => {
                    tracing::info!("quit requested");
                    schedule.request_stop();
                }
                Action::Noop => {}
                action => {
                    sim.apply_action(action);
                }
            }
        }
        sim.set_paused(schedule.is_paused());

        if !paused {
            match sim.recycle_landed() {
                Ok(fresh) => {
                    for id in fresh {
                        for observer in glider_observers(id) {
                            schedule.add(observer);
                        }
                    }
                }
                Err(err) => tracing::warn!(%err, "relaunch failed"),
            }
            sim.advance_time();
        }
        sim.update_camera();
        Flow::Continue
    }

    fn name(&self) -> &str {
        "director"
    }
}

/// Adds a cloud every `interval` unpaused ticks while the sky has room.
#[derive(Debug)]
pub struct CloudSpawner {
    interval: u64,
    elapsed: u64,
}

impl CloudSpawner {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            elapsed: 0,
        }
    }
}

impl Observer<Simulation> for CloudSpawner {
    fn tick(&mut self, sim: &mut Simulation, schedule: &mut Schedule<Simulation>) -> Flow {
        if self.interval == 0 {
            return Flow::Remove;
        }
        self.elapsed += 1;
        if self.elapsed % self.interval == 0 {
            if let Some(id) = sim.spawn_random_cloud(0.0) {
                schedule.add(Box::new(CloudObserver::new(id)));
            }
        }
        Flow::Continue
    }

    fn name(&self) -> &str {
        "cloud-spawner"
    }
}

/// Flies one glider.
#[derive(Debug)]
pub struct GliderObserver {
    id: BodyId,
}

impl GliderObserver {
    pub fn new(id: BodyId) -> Self {
        Self { id }
    }
}

impl Observer<Simulation> for GliderObserver {
    fn tick(&mut self, sim: &mut Simulation, _: &mut Schedule<Simulation>) -> Flow {
        match sim.step_glider(self.id) {
            Ok(_) => Flow::Continue,
            Err(err) => {
                tracing::debug!(%err, "glider observer retiring");
                Flow::Remove
            }
        }
    }

    fn name(&self) -> &str {
        "glider"
    }
}

/// Ages one cloud and retires with it.
#[derive(Debug)]
pub struct CloudObserver {
    id: BodyId,
}

impl CloudObserver {
    pub fn new(id: BodyId) -> Self {
        Self { id }
    }
}

impl Observer<Simulation> for CloudObserver {
    fn tick(&mut self, sim: &mut Simulation, _: &mut Schedule<Simulation>) -> Flow {
        match sim.advance_cloud(self.id) {
            Ok(CloudStep::Alive) => Flow::Continue,
            Ok(CloudStep::Expired) => Flow::Remove,
            Err(err) => {
                tracing::debug!(%err, "cloud observer retiring");
                Flow::Remove
            }
        }
    }

    fn name(&self) -> &str {
        "cloud"
    }
}

/// Keeps a glider's trail on its tail.
#[derive(Debug)]
pub struct TrailObserver {
    glider: BodyId,
}

impl TrailObserver {
    pub fn new(glider: BodyId) -> Self {
        Self { glider }
    }
}

impl Observer<Simulation> for TrailObserver {
    fn tick(&mut self, sim: &mut Simulation, _: &mut Schedule<Simulation>) -> Flow {
        if sim.update_trail(self.glider) {
            Flow::Continue
        } else {
            Flow::Remove
        }
    }

    fn name(&self) -> &str {
        "trail"
    }
}

/// The glider's own observer followed by its trail's, in that order.
pub fn glider_observers(id: BodyId) -> [Box<dyn Observer<Simulation>>; 2] {
    let glider: Box<dyn Observer<Simulation>> = Box::new(GliderObserver::new(id));
    let trail: Box<dyn Observer<Simulation>> = Box::new(TrailObserver::new(id));
    [glider, trail]
}
