//! Game state and core simulation types
//!
//! Everything one run needs lives in `GameState`; the simulation functions
//! take it by `&mut` instead of reaching for globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyEvent};
use super::geometry::{Rect, boundary_for, fit_canvas};
use super::obstacle::Obstacle;
use crate::config::Tuning;
use crate::consts::*;
use crate::display_score;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Obstacles falling, player alive
    Playing,
    /// Player was hit; the run is frozen
    GameOver,
}

/// Something worth telling the front end about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Difficulty(DifficultyEvent),
    /// An obstacle divided into `children` pieces
    Split { parent: u32, children: usize },
    /// The player touched an obstacle
    Collision { obstacle: u32, score: u32 },
}

/// Monotonic entity ID source
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// The player's block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
}

impl Player {
    /// Player sized for `boundary`, centered horizontally near the bottom
    pub fn spawn_in(boundary: &Rect) -> Self {
        let side = boundary.width() * PLAYER_SIZE_FRACTION;
        let x = boundary.left() + (boundary.width() - side) / 2.0;
        let y = boundary.bottom() - side - PLAYER_BOTTOM_MARGIN;
        Self {
            rect: Rect::square(Vec2::new(x, y), side),
        }
    }

    /// Shift horizontally by `dx`, staying inside `boundary`
    pub fn nudge(&mut self, dx: f32, boundary: &Rect) {
        let x = self.rect.left() + dx;
        self.rect.pos.x = boundary.clamp_x(x, self.rect.width());
    }

    /// Center on `x` (pointer position), staying inside `boundary`
    pub fn center_on(&mut self, x: f32, boundary: &Rect) {
        let left = x - self.rect.width() / 2.0;
        self.rect.pos.x = boundary.clamp_x(left, self.rect.width());
    }
}

/// Read-only view handed to the renderer and HUD
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub canvas: Vec2,
    pub boundary: Rect,
    pub player: Rect,
    pub obstacles: &'a [Obstacle],
    pub display_score: u32,
    pub elapsed_seconds: u32,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Canvas size the layout was computed for
    pub canvas: Vec2,
    /// Play-field; all positions are in the same space
    pub boundary: Rect,
    pub player: Player,
    /// Active obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Simulation ticks survived (score proxy)
    pub ticks: u64,
    /// Whole seconds of difficulty ticks
    pub game_time: u32,
    pub difficulty: Difficulty,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub ids: EntityIds,
}

impl GameState {
    /// Fresh run laid out for `viewport`
    pub fn new(seed: u64, viewport: Vec2, tuning: &Tuning) -> Self {
        let canvas = fit_canvas(viewport);
        let boundary = boundary_for(canvas);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            canvas,
            boundary,
            player: Player::spawn_in(&boundary),
            obstacles: Vec::new(),
            ticks: 0,
            game_time: 0,
            difficulty: Difficulty::new(tuning),
            events: Vec::new(),
            ids: EntityIds::default(),
        }
    }

    /// Recompute canvas, boundary and player for a new viewport.
    /// Obstacles in flight keep their coordinates.
    pub fn relayout(&mut self, viewport: Vec2) {
        self.canvas = fit_canvas(viewport);
        self.boundary = boundary_for(self.canvas);
        self.player = Player::spawn_in(&self.boundary);
    }

    pub fn display_score(&self) -> u32 {
        display_score(self.ticks)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            canvas: self.canvas,
            boundary: self.boundary,
            player: self.player.rect,
            obstacles: &self.obstacles,
            display_score: self.display_score(),
            elapsed_seconds: self.game_time,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
