//! Game balance tuning
//!
//! Persisted separately from the leaderboard. The two shipped variants of the
//! game disagree on spawn probabilities, so those live here as data.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, StorageError};

/// Slowest unscaled vertical speed a loaded tuning may ask for
const MIN_SPEED: f32 = 0.1;

/// Balance presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Fixed-boundary release: rarer moving obstacles and splits
    Classic,
    /// Resize-aware release
    #[default]
    Responsive,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Responsive => "Responsive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "responsive" | "resize" => Some(Variant::Responsive),
            _ => None,
        }
    }

    /// Chance that a spawned obstacle is a moving one (once unlocked)
    pub fn moving_spawn_chance(&self) -> f32 {
        match self {
            Variant::Classic => 0.3,
            Variant::Responsive => 0.5,
        }
    }

    /// Chance that a normal obstacle can split (once unlocked)
    pub fn split_chance(&self) -> f32 {
        match self {
            Variant::Classic => 0.3,
            Variant::Responsive => 0.5,
        }
    }
}

/// Difficulty and spawn parameters for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub variant: Variant,

    // === Speed ===
    /// Base vertical speed at session start
    pub initial_speed: f32,
    /// Added to the base speed every `speed_step_interval` seconds
    pub speed_step: f32,
    pub speed_step_interval: u32,
    /// Ceiling for the base speed
    pub base_speed_cap: f32,
    /// Ceiling for a single obstacle's unscaled speed
    pub obstacle_speed_cap: f32,

    // === Spawning ===
    /// Ticks between spawn waves at session start
    pub initial_frequency: u32,
    /// Spawn interval multiplier applied when the count goes up
    pub frequency_growth: f32,
    pub moving_spawn_chance: f32,
    pub split_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_variant(Variant::default())
    }
}

impl Tuning {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "dodgefall_tuning";

    /// Create tuning from a variant (applies the variant's probabilities)
    pub fn from_variant(variant: Variant) -> Self {
        let mut tuning = Self {
            variant,
            initial_speed: 3.0,
            speed_step: 0.5,
            speed_step_interval: 5,
            base_speed_cap: 5.0,
            obstacle_speed_cap: 6.0,
            initial_frequency: 300,
            frequency_growth: 1.2,
            moving_spawn_chance: 0.0,
            split_chance: 0.0,
        };
        tuning.apply_variant(variant);
        tuning
    }

    /// Switch variant, overwriting the variant-dependent probabilities
    pub fn apply_variant(&mut self, variant: Variant) {
        self.variant = variant;
        self.moving_spawn_chance = variant.moving_spawn_chance();
        self.split_chance = variant.split_chance();
    }

    /// Probabilities forced into [0, 1] and intervals kept non-zero
    pub fn sanitized(mut self) -> Self {
        self.moving_spawn_chance = self.moving_spawn_chance.clamp(0.0, 1.0);
        self.split_chance = self.split_chance.clamp(0.0, 1.0);
        self.speed_step_interval = self.speed_step_interval.max(1);
        self.initial_frequency = self.initial_frequency.max(1);
        self.frequency_growth = self.frequency_growth.max(1.0);
        // Every obstacle must keep falling
        self.initial_speed = self.initial_speed.max(MIN_SPEED);
        self.base_speed_cap = self.base_speed_cap.max(self.initial_speed);
        self.obstacle_speed_cap = self.obstacle_speed_cap.max(MIN_SPEED);
        self
    }

    /// Load tuning from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_json::<Tuning>(store, Self::STORAGE_KEY) {
            Ok(Some(tuning)) => {
                log::info!("Loaded tuning ({})", tuning.variant.as_str());
                tuning.sanitized()
            }
            Ok(None) => {
                log::info!("Using default tuning");
                Self::default()
            }
            Err(e) => {
                log::warn!("Discarding unreadable tuning: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Tuning saved");
        Ok(())
    }
}
