//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Ticks are counted, never timed
//! - Seeded RNG only
//! - Obstacles kept in spawn order
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod geometry;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use difficulty::{Difficulty, DifficultyEvent};
pub use geometry::{Rect, boundary_for, fit_canvas, intersects};
pub use obstacle::{Obstacle, ObstacleKind, spawn_moving, spawn_normal};
pub use state::{EntityIds, GameEvent, GamePhase, GameState, Player, Snapshot};
pub use tick::{TickInput, TickOutcome, autopilot_target, difficulty_tick, tick};
