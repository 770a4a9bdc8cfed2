//! Spin Orchestrator
//!
//! Owns every reel and the game state machine:
//!
//! ```text
//!            start()                  min-spin timer (cascade)
//!   ┌──────┐ ──────▶ ┌──────────┐ ──────────────────────────▶ ┌──────────┐
//!   │ Idle │         │ Spinning │   request_stop(cascade)     │ Stopping │
//!   └──────┘ ◀────── └──────────┘ ──────────────────────────▶ └──────────┘
//!      ▲                                                           │
//!      └───────────────── all reels reported stopped ──────────────┘
//! ```
//!
//! Guard violations (start while not Idle, stop while not Spinning) are
//! absorbed as no-ops. Reel completions are counted in a [`StopTracker`]
//! shared with the reel callbacks; the Idle transition depends only on the
//! count reaching the reel count, never on arrival order.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::ReelResult;
use crate::reel::{ReelSimulator, StopCallback};
use crate::render::RenderSurface;
use crate::texture::TextureTable;
use crate::timer::{TimerId, TimerQueue};

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Idle,
    Spinning,
    Stopping,
}

/// Affordance shown on the spin button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinButton {
    Start,
    Stop,
}

impl From<GameState> for SpinButton {
    fn from(state: GameState) -> Self {
        match state {
            GameState::Idle => SpinButton::Start,
            GameState::Spinning | GameState::Stopping => SpinButton::Stop,
        }
    }
}

/// Notification published to listeners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinEvent {
    SpinStarted { at: f64 },
    StopRequested { at: f64, cascade: bool },
    ReelStopped { at: f64, reel: usize },
    AllStopped { at: f64 },
}

impl SpinEvent {
    /// Clock time of the event (seconds)
    pub fn at(&self) -> f64 {
        match *self {
            SpinEvent::SpinStarted { at }
            | SpinEvent::StopRequested { at, .. }
            | SpinEvent::ReelStopped { at, .. }
            | SpinEvent::AllStopped { at } => at,
        }
    }
}

/// Listener for [`SpinEvent`]s
pub type SpinListener = Box<dyn FnMut(&SpinEvent) + Send>;

/// Session counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinStats {
    pub spins_started: u64,
    /// Stops requested by the player
    pub manual_stops: u64,
    /// Stops triggered by the minimum-duration timer
    pub auto_stops: u64,
    pub reels_stopped: u64,
    /// Start/stop requests absorbed by the state guard
    pub ignored_requests: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STOP TRACKER
// ═══════════════════════════════════════════════════════════════════════════════

/// State and completion counter shared with the reel stop callbacks
#[derive(Debug)]
pub struct StopTracker {
    state: GameState,
    /// Stop cycle the counter belongs to
    cycle: u64,
    /// Reels reported stopped in the current cycle
    stopped: usize,
    reel_count: usize,
    /// Clock time reported with events
    clock: f64,
    /// Events waiting for dispatch
    pending: Vec<SpinEvent>,
}

impl StopTracker {
    pub fn new(reel_count: usize) -> Self {
        Self {
            state: GameState::Idle,
            cycle: 0,
            stopped: 0,
            reel_count,
            clock: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Completions counted in the current cycle
    pub fn stopped(&self) -> usize {
        self.stopped
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Enter Stopping and reset the counter; returns the new cycle id
    pub fn begin_stop_cycle(&mut self) -> u64 {
        self.state = GameState::Stopping;
        self.cycle += 1;
        self.stopped = 0;
        self.cycle
    }

    /// Count one reel completion
    ///
    /// Completions from a stale cycle, or arriving outside Stopping, are
    /// dropped. Returns true when this completion finished the cycle.
    pub fn reel_stopped(&mut self, cycle: u64, reel: usize) -> bool {
        if cycle != self.cycle || self.state != GameState::Stopping {
            log::warn!(
                "Dropping stale completion of reel {} (cycle {}, current {})",
                reel,
                cycle,
                self.cycle
            );
            return false;
        }

        self.stopped += 1;
        self.pending.push(SpinEvent::ReelStopped {
            at: self.clock,
            reel,
        });

        if self.stopped == self.reel_count {
            self.state = GameState::Idle;
            self.pending.push(SpinEvent::AllStopped { at: self.clock });
            return true;
        }
        false
    }

    fn emit(&mut self, event: SpinEvent) {
        self.pending.push(event);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORCHESTRATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Orchestrator timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrchestratorTimer {
    /// Minimum spin duration elapsed
    AutoStop,
}

/// Drives all reels through the spin cycle
pub struct SpinOrchestrator<T> {
    config: GameConfig,
    reels: Vec<ReelSimulator<T>>,
    tracker: Arc<Mutex<StopTracker>>,
    timers: TimerQueue<OrchestratorTimer>,
    auto_stop: Option<TimerId>,
    /// Clock (seconds)
    clock: f64,
    listeners: Vec<SpinListener>,
    stats: SpinStats,
}

impl<T> SpinOrchestrator<T> {
    /// Create the reels described by `config`
    ///
    /// Reel RNGs are seeded from `config.seed` when set.
    pub fn new(config: GameConfig, textures: Arc<TextureTable<T>>) -> ReelResult<Self> {
        config.validate()?;

        let layout = &config.layout;
        let scroll_rate = config.timing.scroll_rate();
        let reels = (0..layout.reel_count)
            .map(|i| {
                let bounds = layout.reel_bounds(i);
                match config.seed {
                    Some(seed) => ReelSimulator::with_seed(
                        i,
                        Arc::clone(&textures),
                        bounds,
                        scroll_rate,
                        seed.wrapping_add(i as u64),
                    ),
                    None => ReelSimulator::new(i, Arc::clone(&textures), bounds, scroll_rate),
                }
            })
            .collect::<ReelResult<Vec<_>>>()?;

        log::info!(
            "Created {} reels ({:?} timing, min spin {} ms, cascade step {} ms)",
            reels.len(),
            config.timing.profile,
            config.timing.min_spin_duration_ms,
            config.timing.cascade_step_ms
        );

        Ok(Self {
            tracker: Arc::new(Mutex::new(StopTracker::new(reels.len()))),
            reels,
            timers: TimerQueue::new(),
            auto_stop: None,
            clock: 0.0,
            listeners: Vec::new(),
            stats: SpinStats::default(),
            config,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.tracker.lock().state()
    }

    /// Button affordance for the current state
    pub fn button(&self) -> SpinButton {
        self.state().into()
    }

    pub fn reels(&self) -> &[ReelSimulator<T>] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&ReelSimulator<T>> {
        self.reels.get(index)
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    /// Clock (seconds)
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn stats(&self) -> &SpinStats {
        &self.stats
    }

    /// Completions counted in the current stop cycle
    pub fn stopped_count(&self) -> usize {
        self.tracker.lock().stopped()
    }

    /// Whether the minimum-duration auto-stop is armed
    pub fn auto_stop_pending(&self) -> bool {
        self.auto_stop.is_some_and(|id| self.timers.contains(id))
    }

    /// Symbols of every reel, left to right
    pub fn symbol_grid(&self) -> Vec<[usize; crate::reel::SLOTS_PER_REEL]> {
        self.reels.iter().map(|r| r.symbols()).collect()
    }

    /// Register an event listener
    pub fn subscribe(&mut self, listener: impl FnMut(&SpinEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Spin every reel. Only valid from Idle.
    pub fn start(&mut self) -> bool {
        {
            let mut tracker = self.tracker.lock();
            if tracker.state != GameState::Idle {
                log::warn!("Ignoring start while {:?}", tracker.state);
                drop(tracker);
                self.stats.ignored_requests += 1;
                return false;
            }
            tracker.state = GameState::Spinning;
            tracker.clock = self.clock;
            tracker.emit(SpinEvent::SpinStarted { at: self.clock });
        }

        for reel in &mut self.reels {
            reel.spin();
        }

        let due_at = self.clock + self.config.timing.min_spin_secs();
        self.auto_stop = Some(self.timers.schedule(due_at, OrchestratorTimer::AutoStop));
        self.stats.spins_started += 1;

        log::debug!("Spin started at t={:.3}, auto-stop at t={:.3}", self.clock, due_at);
        self.dispatch_events();
        true
    }

    /// Stop every reel, staggered when `cascade` is set. Only valid while Spinning.
    pub fn request_stop(&mut self, cascade: bool) -> bool {
        let accepted = self.begin_stop(cascade);
        if accepted {
            self.stats.manual_stops += 1;
        } else {
            self.stats.ignored_requests += 1;
        }
        self.dispatch_events();
        accepted
    }

    /// Spin button press: start when idle, fast stop while spinning
    pub fn press_button(&mut self) -> bool {
        match self.state() {
            GameState::Idle => self.start(),
            GameState::Spinning => self.request_stop(false),
            GameState::Stopping => {
                log::debug!("Ignoring button press while stopping");
                self.stats.ignored_requests += 1;
                false
            }
        }
    }

    fn begin_stop(&mut self, cascade: bool) -> bool {
        let cycle = {
            let mut tracker = self.tracker.lock();
            if tracker.state != GameState::Spinning {
                log::warn!("Ignoring stop request while {:?}", tracker.state);
                return false;
            }
            tracker.clock = self.clock;
            tracker.emit(SpinEvent::StopRequested {
                at: self.clock,
                cascade,
            });
            tracker.begin_stop_cycle()
        };

        // a manual stop supersedes the pending auto-stop
        if let Some(id) = self.auto_stop.take() {
            self.timers.cancel(id);
        }

        log::debug!(
            "Stopping {} reels at t={:.3} (cascade: {})",
            self.reels.len(),
            self.clock,
            cascade
        );

        for reel in &mut self.reels {
            let delay = self.config.timing.stop_delay_secs(reel.index(), cascade);
            let tracker = Arc::clone(&self.tracker);
            let index = reel.index();
            let on_stopped: StopCallback = Box::new(move || {
                tracker.lock().reel_stopped(cycle, index);
            });
            reel.stop(delay, Some(on_stopped));
        }
        true
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME DRIVING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance the clock by `dt` seconds
    ///
    /// Timers and reel settles inside the frame fire in deadline order.
    pub fn advance(&mut self, dt: f64) {
        let target = self.clock + if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        while let Some(due) = self.next_deadline().filter(|due| *due <= target) {
            let at = due.max(self.clock);
            self.step_to(at);

            while let Some(timer) = self.timers.pop_due(at) {
                match timer.payload {
                    OrchestratorTimer::AutoStop => self.fire_auto_stop(timer.id),
                }
            }
        }

        self.step_to(target);
        self.dispatch_events();
    }

    /// Tear down every reel and cancel all timers
    ///
    /// No stop callback or listener fires afterwards for the aborted cycle.
    pub fn shutdown(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.auto_stop = None;
        for reel in &mut self.reels {
            reel.teardown();
        }
        {
            let mut tracker = self.tracker.lock();
            tracker.state = GameState::Idle;
            tracker.cycle += 1;
            tracker.stopped = 0;
            tracker.pending.clear();
        }
        log::info!("Orchestrator shut down ({} timer(s) cancelled)", cancelled);
    }

    /// Draw every reel onto `surface`
    pub fn render<S: RenderSurface<T>>(&self, surface: &mut S) {
        for reel in &self.reels {
            let mask = reel.mask();
            for quad in reel.quads() {
                surface.draw_quad(&quad, mask);
            }
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        self.reels
            .iter()
            .filter_map(|r| r.next_deadline())
            .chain(self.timers.next_deadline())
            .min_by(|a, b| a.total_cmp(b))
    }

    fn step_to(&mut self, at: f64) {
        self.clock = at;
        self.tracker.lock().clock = at;
        for reel in &mut self.reels {
            reel.advance_to(at);
        }
    }

    fn fire_auto_stop(&mut self, id: TimerId) {
        if self.auto_stop == Some(id) {
            self.auto_stop = None;
        }
        if self.state() != GameState::Spinning {
            return;
        }
        log::debug!("Minimum spin duration elapsed at t={:.3}", self.clock);
        if self.begin_stop(true) {
            self.stats.auto_stops += 1;
        }
    }

    fn dispatch_events(&mut self) {
        let events = std::mem::take(&mut self.tracker.lock().pending);
        for event in &events {
            match event {
                SpinEvent::ReelStopped { .. } => self.stats.reels_stopped += 1,
                SpinEvent::AllStopped { at } => {
                    log::info!("All {} reels stopped at t={:.3}", self.reels.len(), at);
                }
                _ => {}
            }
            for listener in &mut self.listeners {
                listener(event);
            }
        }
    }
}
