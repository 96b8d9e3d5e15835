//! Dodgefall - A falling-block dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacles, difficulty, collisions, game state)
//! - `session`: Run lifecycle, timers and the end-of-run name request
//! - `platform`: Fixed-step scheduling and input intents
//! - `leaderboard`: Top-10 ranking persisted through `persistence`
//! - `renderer`: WebGPU rendering pipeline
//! - `config`: Data-driven game balance

pub mod config;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod sim;

pub use config::{Tuning, Variant};
pub use leaderboard::Leaderboard;
pub use session::{Session, SessionPhase};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Difficulty scheduler rate (ticks per second)
    pub const DIFFICULTY_RATE: u32 = 1;
    /// Longest frame delta fed to the scheduler, in seconds
    pub const MAX_FRAME_DT: f64 = 0.1;
    /// Quiet period before a viewport resize is applied, in seconds
    pub const RESIZE_DEBOUNCE: f64 = 0.25;

    /// Canvas aspect ratio (width / height)
    pub const CANVAS_ASPECT: f32 = 16.0 / 9.0;
    /// Boundary size as a fraction of the canvas
    pub const BOUNDARY_FRACTION: f32 = 0.8;
    /// Smallest boundary dimension we ever lay out
    pub const MIN_BOUNDARY_SIZE: f32 = 1.0;

    /// Player side as a fraction of boundary width
    pub const PLAYER_SIZE_FRACTION: f32 = 0.05;
    /// Gap between the player and the boundary bottom
    pub const PLAYER_BOTTOM_MARGIN: f32 = 10.0;
    /// Distance moved per key press
    pub const PLAYER_STEP: f32 = 10.0;

    /// Obstacle side as a fraction of boundary width
    pub const OBSTACLE_SIZE_FRACTION: f32 = 0.05;
    /// Boundary height at which vertical speeds are unscaled
    pub const REFERENCE_HEIGHT: f32 = 600.0;
    /// Boundary width at which horizontal speeds are unscaled
    pub const REFERENCE_WIDTH: f32 = 800.0;
    /// Horizontal speed of a moving obstacle at reference width
    pub const MOVING_HORIZONTAL_SPEED: f32 = 2.0;

    /// Obstacles split once they pass this fraction of the boundary height
    pub const SPLIT_LINE_FRACTION: f32 = 1.0 / 3.0;
    /// Vertical speed multiplier applied to split children
    pub const SPLIT_SPEED_MULTIPLIER: f32 = 1.2;
    /// Children produced by a splitting normal obstacle
    pub const NORMAL_SPLIT_CHILDREN: usize = 3;
    /// Children produced by a splitting moving obstacle
    pub const MOVING_SPLIT_CHILDREN: usize = 2;
    /// Horizontal speed magnitude of split children
    pub const SPLIT_HORIZONTAL_SPEED: f32 = 2.0;

    /// Leaderboard length
    pub const MAX_LEADERBOARD_ENTRIES: usize = 10;
}

/// Convert whole simulation ticks to the displayed score (seconds survived)
#[inline]
pub fn display_score(ticks: u64) -> u32 {
    (ticks / consts::TICK_RATE as u64) as u32
}
