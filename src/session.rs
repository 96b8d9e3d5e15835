//! Session controller
//!
//! Owns the run lifecycle `Idle -> Running -> GameOver -> Idle`. The front end
//! feeds it frame deltas, intents and viewport sizes; the session turns those
//! into simulation and difficulty ticks through the `Scheduler`.
//!
//! Game over does not block: the session parks in `GameOver` until the front
//! end answers the name request with `submit_name`.

use glam::Vec2;

use crate::config::Tuning;
use crate::consts::{DIFFICULTY_RATE, MAX_FRAME_DT, RESIZE_DEBOUNCE, TICK_RATE};
use crate::leaderboard::Leaderboard;
use crate::persistence::KeyValueStore;
use crate::platform::{Debouncer, Intent, Scheduler, Trigger, seconds_to_micros};
use crate::sim::{GameEvent, GameState, Snapshot, TickInput, TickOutcome, difficulty_tick, tick};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Menu; no timers running
    Idle,
    /// Timers running, simulation advancing
    Running,
    /// Run ended; waiting for the player's name
    GameOver { final_score: u32 },
}

/// One player's sequence of runs plus the persisted leaderboard
pub struct Session {
    phase: SessionPhase,
    tuning: Tuning,
    state: Option<GameState>,
    input: TickInput,
    scheduler: Scheduler,
    resize: Debouncer<Vec2>,
    viewport: Vec2,
    leaderboard: Leaderboard,
    store: Box<dyn KeyValueStore>,
    next_seed: u64,
}

impl Session {
    pub fn new(tuning: Tuning, store: Box<dyn KeyValueStore>, viewport: Vec2, seed: u64) -> Self {
        let leaderboard = Leaderboard::load(store.as_ref());
        Self {
            phase: SessionPhase::Idle,
            tuning: tuning.sanitized(),
            state: None,
            input: TickInput::default(),
            scheduler: Scheduler::new(TICK_RATE, DIFFICULTY_RATE),
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            viewport,
            leaderboard,
            store,
            next_seed: seed,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True while a run is live and taking input
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Current frame for the renderer (None in the menu)
    pub fn snapshot(&self) -> Option<Snapshot<'_>> {
        self.state.as_ref().map(GameState::snapshot)
    }

    /// Lay out a fresh run for the current viewport with default difficulty
    pub fn init(&mut self) {
        self.scheduler.cancel();
        self.input.clear();
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        self.state = Some(GameState::new(seed, self.viewport, &self.tuning));
        self.phase = SessionPhase::Idle;
        log::info!("Session initialized with seed {}", seed);
    }

    /// Begin a run. Returns false if one is already in progress.
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        if self.state.is_none() {
            self.init();
        }
        self.scheduler.start();
        self.phase = SessionPhase::Running;
        log::info!("Run started");
        true
    }

    /// Abandon the run (or a pending name request) and return to the menu
    pub fn exit(&mut self) {
        if self.phase != SessionPhase::Idle {
            log::info!("Exit to menu");
        }
        self.reset();
    }

    /// Feed elapsed wall time (seconds) into the timers
    pub fn advance(&mut self, dt: f64) {
        let micros = seconds_to_micros(dt.min(MAX_FRAME_DT));

        if let Some(viewport) = self.resize.advance(micros) {
            self.set_viewport(viewport);
        }

        if self.phase != SessionPhase::Running {
            return;
        }

        let mut budget = micros;
        while let Some(trigger) = self.scheduler.poll(&mut budget) {
            let Some(state) = self.state.as_mut() else {
                break;
            };
            match trigger {
                Trigger::Simulation => {
                    let outcome = tick(state, &self.input, &self.tuning);
                    self.input.clear();
                    if let TickOutcome::GameOver { score } = outcome {
                        self.game_over(score);
                    }
                }
                Trigger::Difficulty => difficulty_tick(state, &self.tuning),
            }
        }
    }

    /// Queue a movement intent for the next simulation tick
    pub fn push_intent(&mut self, intent: Intent) {
        if self.phase == SessionPhase::Running {
            self.input.push(intent);
        }
    }

    /// Let the autopilot steer (demo mode)
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.idle_mode = enabled;
    }

    /// Debounced viewport change
    pub fn resize(&mut self, viewport: Vec2) {
        self.resize.bump(viewport);
    }

    /// Apply a viewport immediately
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        if let Some(state) = self.state.as_mut() {
            state.relayout(viewport);
            log::info!(
                "Relayout for {}x{}: boundary {:?}",
                viewport.x,
                viewport.y,
                state.boundary
            );
        }
    }

    /// Final score awaiting a name, if the run just ended
    pub fn pending_name_request(&self) -> Option<u32> {
        match self.phase {
            SessionPhase::GameOver { final_score } => Some(final_score),
            _ => None,
        }
    }

    /// Answer the name request. A missing or blank name skips recording.
    /// Returns the leaderboard rank achieved, if any.
    pub fn submit_name(&mut self, name: Option<&str>) -> Option<usize> {
        let SessionPhase::GameOver { final_score } = self.phase else {
            log::warn!("Name submitted outside game over; ignored");
            return None;
        };

        let rank = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self.record(name, final_score),
            None => {
                log::info!("Name request dismissed; score {} not recorded", final_score);
                None
            }
        };

        self.reset();
        rank
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state
            .as_mut()
            .map(GameState::drain_events)
            .unwrap_or_default()
    }

    fn record(&mut self, name: &str, score: u32) -> Option<usize> {
        // Re-read so the write is based on what is stored now
        self.leaderboard = Leaderboard::load(self.store.as_ref());
        let rank = self.leaderboard.record(name, score);
        if let Err(e) = self.leaderboard.save(self.store.as_mut()) {
            log::warn!("Failed to save leaderboard: {}", e);
        }
        match rank {
            Some(rank) => log::info!("{} placed #{} with {}", name, rank, score),
            None => log::info!("{} scored {}, not in the top ranks", name, score),
        }
        rank
    }

    fn game_over(&mut self, final_score: u32) {
        self.scheduler.cancel();
        self.input.clear();
        self.phase = SessionPhase::GameOver { final_score };
        log::info!("Game over, final score {}", final_score);
    }

    fn reset(&mut self) {
        self.scheduler.cancel();
        self.input.clear();
        self.state = None;
        self.phase = SessionPhase::Idle;
    }
}
