use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::time::{SystemTime, TimeSource};

/// Identity of a registered observer, stable for its whole registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs#{}", self.0)
    }
}

/// What an observer wants after its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Unregister me at the end of this pass.
    Remove,
}

/// Something notified once per clock tick.
///
/// `C` is the context the clock drives (the simulation); observers mutate it and queue
/// structural changes on the [`Schedule`].
pub trait Observer<C> {
    fn tick(&mut self, ctx: &mut C, schedule: &mut Schedule<C>) -> Flow;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Adapter turning a closure into an [`Observer`].
pub struct FnObserver<F> {
    name: String,
    f: F,
}

pub fn observer_fn<C, F>(name: impl Into<String>, f: F) -> FnObserver<F>
where
    F: FnMut(&mut C, &mut Schedule<C>) -> Flow,
{
    FnObserver {
        name: name.into(),
        f,
    }
}

impl<C, F> Observer<C> for FnObserver<F>
where
    F: FnMut(&mut C, &mut Schedule<C>) -> Flow,
{
    fn tick(&mut self, ctx: &mut C, schedule: &mut Schedule<C>) -> Flow {
        (self.f)(ctx, schedule)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Structural changes requested during a tick pass.
///
/// Nothing queued here touches the observer list until the pass is over, so an observer
/// removing itself or another never skips or repeats a notification in the same tick.
pub struct Schedule<C> {
    tick: u64,
    paused: bool,
    next_id: u64,
    added: Vec<(ObserverId, Box<dyn Observer<C>>)>,
    removed: Vec<ObserverId>,
    pause_request: Option<bool>,
    stop_requested: bool,
}

impl<C> Schedule<C> {
    fn new(tick: u64, paused: bool, next_id: u64) -> Self {
        Self {
            tick,
            paused,
            next_id,
            added: Vec::new(),
            removed: Vec::new(),
            pause_request: None,
            stop_requested: false,
        }
    }

    /// Number of the tick being notified, starting at 1.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Pause state as of this pass, including any request made earlier in it.
    pub fn is_paused(&self) -> bool {
        self.pause_request.unwrap_or(self.paused)
    }

    /// Register an observer after this pass. It first ticks on the next tick.
    pub fn add(&mut self, observer: Box<dyn Observer<C>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.added.push((id, observer));
        id
    }

    pub fn remove(&mut self, id: ObserverId) {
        self.removed.push(id);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.pause_request = Some(paused);
    }

    /// Stop the running clock once this pass completes.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

/// Errors from clock lifecycle operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock is already running")]
    AlreadyRunning,
}

/// Lifecycle of a [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Diagnostics gathered while ticking.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockStats {
    pub ticks: u64,
    /// Rolling average of the idle time left over per paced tick.
    pub average_idle_millis: f64,
    /// Ticks that used their whole period or more.
    pub overruns: u64,
}

impl ClockStats {
    fn record_idle(&mut self, idle: u64, first: bool) {
        if first {
            self.average_idle_millis = idle as f64;
        } else {
            self.average_idle_millis = self.average_idle_millis * 0.9 + idle as f64 * 0.1;
        }
    }
}

impl fmt::Display for ClockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} avg_idle={:.1}ms overruns={}",
            self.ticks, self.average_idle_millis, self.overruns
        )
    }
}

/// Cloneable, thread-safe stop switch for a running [`Clock`].
#[derive(Debug, Clone, Default)]
pub struct ClockHandle {
    stop: Arc<AtomicBool>,
}

impl ClockHandle {
    /// Ask the clock to stop after its current pass. Calling it again is harmless.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }
}

struct Entry<C> {
    id: ObserverId,
    observer: Box<dyn Observer<C>>,
}

/// Fixed-period scheduler notifying observers once per tick in registration order.
///
/// While paused only the first registered observer (the director) is notified; the others
/// resume on unpause.
pub struct Clock<C> {
    entries: Vec<Entry<C>>,
    next_id: u64,
    period_millis: u64,
    paused: bool,
    state: ClockState,
    handle: ClockHandle,
    stats: ClockStats,
    time: Box<dyn TimeSource>,
}

impl<C> Clock<C> {
    pub fn new(period_millis: u64) -> Self {
        Self::with_time_source(period_millis, Box::new(SystemTime::new()))
    }

    pub fn with_time_source(period_millis: u64, time: Box<dyn TimeSource>) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            period_millis,
            paused: false,
            state: ClockState::Stopped,
            handle: ClockHandle::default(),
            stats: ClockStats::default(),
            time,
        }
    }

    pub fn period_millis(&self) -> u64 {
        self.period_millis
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn stats(&self) -> ClockStats {
        self.stats
    }

    pub fn handle(&self) -> ClockHandle {
        self.handle.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::debug!(paused, "clock pause changed");
        }
        self.paused = paused;
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer<C>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, name = observer.name(), "observer added");
        self.entries.push(Entry { id, observer });
        id
    }

    /// Unregister an observer between passes. Returns whether it was registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(i) => {
                let entry = self.entries.remove(i);
                tracing::debug!(%id, name = entry.observer.name(), "observer removed");
                true
            }
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.entries.len()
    }

    /// Registered observers in notification order.
    pub fn observer_ids(&self) -> Vec<ObserverId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Run one notification pass, then apply everything the observers scheduled.
    pub fn tick(&mut self, ctx: &mut C) {
        self.stats.ticks += 1;
        let tick = self.stats.ticks;
        let _span = tracing::trace_span!("clock_tick", tick).entered();

        let mut schedule = Schedule::new(tick, self.paused, self.next_id);
        let mut finished = Vec::new();
        let notify = if self.paused { 1 } else { self.entries.len() };
        for entry in self.entries.iter_mut().take(notify) {
            if entry.observer.tick(ctx, &mut schedule) == Flow::Remove {
                finished.push(entry.id);
            }
        }
        self.apply(schedule, finished);
    }

    fn apply(&mut self, schedule: Schedule<C>, finished: Vec<ObserverId>) {
        let Schedule {
            next_id,
            added,
            removed,
            pause_request,
            stop_requested,
            ..
        } = schedule;
        self.next_id = next_id;
        for &id in finished.iter().chain(&removed) {
            self.remove_observer(id);
        }
        for (id, observer) in added {
            if removed.contains(&id) {
                continue;
            }
            tracing::debug!(%id, name = observer.name(), "observer added");
            self.entries.push(Entry { id, observer });
        }
        if let Some(paused) = pause_request {
            self.set_paused(paused);
        }
        if stop_requested {
            self.handle.stop();
        }
    }

    /// Enter the running state for manual stepping with [`tick`](Self::tick).
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.state == ClockState::Running {
            return Err(ClockError::AlreadyRunning);
        }
        self.state = ClockState::Running;
        self.handle.reset();
        tracing::info!(period_ms = self.period_millis, "clock started");
        Ok(())
    }

    /// Stop ticking. Idempotent; a run in progress stops after its current pass via
    /// [`ClockHandle::stop`].
    pub fn stop(&mut self) {
        self.handle.stop();
        if self.state == ClockState::Running {
            self.state = ClockState::Stopped;
            tracing::info!(stats = %self.stats, "clock stopped");
        }
    }

    /// Tick until stopped (or `max_ticks` passes have run), calling `frame` after every tick.
    ///
    /// Each tick idles for whatever is left of the period; a tick that overruns is followed
    /// immediately by the next one without any catch-up burst. Any stop requested before the
    /// call is discarded.
    pub fn run<F>(
        &mut self,
        ctx: &mut C,
        max_ticks: Option<u64>,
        mut frame: F,
    ) -> Result<ClockStats, ClockError>
    where
        F: FnMut(&mut C),
    {
        self.start()?;

        let mut ran = 0u64;
        while !self.handle.is_stop_requested() && max_ticks.is_none_or(|max| ran < max) {
            let started = self.time.now_millis();
            self.tick(ctx);
            frame(ctx);
            ran += 1;
            if self.handle.is_stop_requested() {
                break;
            }
            self.pace(started, ran == 1);
        }

        self.stop();
        Ok(self.stats)
    }

    fn pace(&mut self, started: u64, first: bool) {
        let elapsed = self.time.now_millis().saturating_sub(started);
        if elapsed < self.period_millis {
            let idle = self.period_millis - elapsed;
            self.time.sleep_millis(idle);
            self.stats.record_idle(idle, first);
        } else {
            self.stats.overruns += 1;
            self.stats.record_idle(0, first);
            tracing::trace!(elapsed, period = self.period_millis, "tick overran");
        }
    }
}

impl<C> fmt::Debug for Clock<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("observers", &self.entries.len())
            .field("period_millis", &self.period_millis)
            .field("paused", &self.paused)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTime;

    /// Context recording which observer ticked, by label.
    #[derive(Default)]
    struct Log(Vec<&'static str>);

    fn recorder(label: &'static str) -> Box<dyn Observer<Log>> {
        Box::new(observer_fn(label, move |log: &mut Log, _: &mut Schedule<Log>| {
            log.0.push(label);
            Flow::Continue
        }))
    }

    #[test]
    fn notifies_in_registration_order() {
        let mut clock = Clock::new(10);
        for label in ["a", "b", "c"] {
            clock.add_observer(recorder(label));
        }
        let mut log = Log::default();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a", "b", "c"]);
        assert_eq!(clock.stats().ticks, 1);
    }

    #[test]
    fn pause_only_notifies_first_observer() {
        let mut clock = Clock::new(10);
        for label in ["a", "b", "c"] {
            clock.add_observer(recorder(label));
        }
        let mut log = Log::default();
        clock.set_paused(true);
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a"]);

        clock.set_paused(false);
        log.0.clear();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a", "b", "c"]);
    }

    #[test]
    fn self_removal_is_deferred_to_end_of_pass() {
        let mut clock = Clock::new(10);
        clock.add_observer(recorder("a"));
        clock.add_observer(Box::new(observer_fn("once", |log: &mut Log, _: &mut Schedule<Log>| {
            log.0.push("once");
            Flow::Remove
        })));
        clock.add_observer(recorder("c"));

        let mut log = Log::default();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a", "once", "c"]);
        assert_eq!(clock.observer_count(), 2);

        log.0.clear();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a", "c"]);
    }

    #[test]
    fn removing_a_later_observer_mid_pass_still_notifies_it_once() {
        let mut clock: Clock<Log> = Clock::new(10);
        clock.add_observer(recorder("a"));
        // ids are handed out in registration order, so the victim registered next is #2
        let victim = ObserverId(2);
        clock.add_observer(Box::new(observer_fn("killer", move |log: &mut Log, s: &mut Schedule<Log>| {
            log.0.push("killer");
            s.remove(victim);
            Flow::Continue
        })));
        assert_eq!(clock.add_observer(recorder("victim")), victim);

        let mut log = Log::default();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a", "killer", "victim"]);
        log.0.clear();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["a", "killer"]);
    }

    #[test]
    fn observers_added_mid_pass_start_next_tick() {
        let mut clock = Clock::new(10);
        let mut spawned = false;
        clock.add_observer(Box::new(observer_fn("spawner", move |log: &mut Log, s: &mut Schedule<Log>| {
            log.0.push("spawner");
            if !spawned {
                spawned = true;
                s.add(recorder("child"));
            }
            Flow::Continue
        })));
        let mut log = Log::default();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["spawner"]);
        log.0.clear();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["spawner", "child"]);
    }

    #[test]
    fn schedule_pause_applies_after_pass() {
        let mut clock = Clock::new(10);
        clock.add_observer(Box::new(observer_fn("director", |log: &mut Log, s: &mut Schedule<Log>| {
            log.0.push("director");
            let paused = s.is_paused();
            s.set_paused(!paused);
            Flow::Continue
        })));
        clock.add_observer(recorder("b"));
        let mut log = Log::default();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["director", "b"]);
        assert!(clock.is_paused());
        log.0.clear();
        clock.tick(&mut log);
        assert_eq!(log.0, vec!["director"]);
        assert!(!clock.is_paused());
    }

    #[test]
    fn run_paces_to_period_with_manual_time() {
        let time = ManualTime::new();
        let mut clock = Clock::with_time_source(50, Box::new(time.clone()));
        let work = time.clone();
        clock.add_observer(Box::new(observer_fn("work", move |_: &mut Log, _: &mut Schedule<Log>| {
            work.advance(20);
            Flow::Continue
        })));
        let mut log = Log::default();
        let stats = clock.run(&mut log, Some(4), |_| {}).unwrap();
        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.overruns, 0);
        assert_eq!(time.total_slept(), 4 * 30);
        assert!((stats.average_idle_millis - 30.0).abs() < 1e-9);
        assert_eq!(time.now_millis(), 200);
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn overrun_starts_next_tick_immediately() {
        let time = ManualTime::new();
        let mut clock = Clock::with_time_source(50, Box::new(time.clone()));
        let work = time.clone();
        clock.add_observer(Box::new(observer_fn("slow", move |_: &mut Log, _: &mut Schedule<Log>| {
            work.advance(80);
            Flow::Continue
        })));
        let stats = clock.run(&mut Log::default(), Some(3), |_| {}).unwrap();
        assert_eq!(stats.overruns, 3);
        assert_eq!(time.total_slept(), 0);
        assert_eq!(time.now_millis(), 240);
    }

    #[test]
    fn stop_request_finishes_current_pass() {
        let time = ManualTime::new();
        let mut clock = Clock::with_time_source(10, Box::new(time));
        clock.add_observer(Box::new(observer_fn("stopper", |log: &mut Log, s: &mut Schedule<Log>| {
            log.0.push("stopper");
            if s.tick() == 3 {
                s.request_stop();
            }
            Flow::Continue
        })));
        clock.add_observer(recorder("after"));
        let mut log = Log::default();
        let mut frames = 0;
        let stats = clock.run(&mut log, None, |_| frames += 1).unwrap();
        assert_eq!(stats.ticks, 3);
        assert_eq!(frames, 3);
        assert_eq!(log.0.iter().filter(|l| **l == "after").count(), 3);
    }

    #[test]
    fn handle_stop_is_idempotent() {
        let time = ManualTime::new();
        let mut clock: Clock<Log> = Clock::with_time_source(10, Box::new(time));
        let handle = clock.handle();
        let stopper = handle.clone();
        clock.add_observer(Box::new(observer_fn("stop", move |_: &mut Log, _: &mut Schedule<Log>| {
            stopper.stop();
            stopper.stop();
            Flow::Continue
        })));
        let stats = clock.run(&mut Log::default(), Some(10), |_| {}).unwrap();
        assert_eq!(stats.ticks, 1);
        handle.stop();
        clock.stop();
        assert_eq!(clock.state(), ClockState::Stopped);

        // a fresh run discards the old stop request
        let stats = clock.run(&mut Log::default(), Some(1), |_| {}).unwrap();
        assert_eq!(stats.ticks, 2);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut clock: Clock<Log> = Clock::new(10);
        clock.start().unwrap();
        assert_eq!(clock.start().unwrap_err(), ClockError::AlreadyRunning);
        assert_eq!(
            clock.run(&mut Log::default(), Some(1), |_| {}).unwrap_err(),
            ClockError::AlreadyRunning
        );
        clock.stop();
        clock.stop();
        assert_eq!(clock.state(), ClockState::Stopped);
        clock.start().unwrap();
    }
}
