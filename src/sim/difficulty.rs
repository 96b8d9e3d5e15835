//! Difficulty progression keyed on whole seconds of game time
//!
//! Every threshold is an exact match on the second counter, so the scheduler
//! must be fed 1, 2, 3, ... with no gaps.

use serde::{Deserialize, Serialize};

use crate::config::Tuning;

/// Second at which two obstacles spawn per wave
pub const TWO_OBSTACLES_AT: u32 = 30;
/// Second at which three obstacles spawn per wave
pub const THREE_OBSTACLES_AT: u32 = 40;
/// Second at which moving obstacles (and their splitting) unlock
pub const MOVING_UNLOCK_AT: u32 = 50;
/// Second at which normal obstacles may split
pub const NORMAL_SPLIT_UNLOCK_AT: u32 = 60;

/// A one-way difficulty change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DifficultyEvent {
    SpeedUp { base_speed: f32 },
    CountRaised { count: u32, frequency: u32 },
    MovingUnlocked,
    MovingSplitUnlocked,
    NormalSplitUnlocked,
}

/// Session difficulty parameters (all monotonic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Unscaled base vertical speed
    pub base_speed: f32,
    /// Spawn a wave every `frequency` ticks
    pub frequency: u32,
    /// Obstacles per spawn wave
    pub count: u32,
    pub moving_unlocked: bool,
    pub moving_split_unlocked: bool,
    pub normal_split_unlocked: bool,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            base_speed: tuning.initial_speed.min(tuning.base_speed_cap),
            frequency: tuning.initial_frequency.max(1),
            count: 1,
            moving_unlocked: false,
            moving_split_unlocked: false,
            normal_split_unlocked: false,
        }
    }

    /// Apply the schedule for second `t`, returning what changed
    pub fn on_second(&mut self, t: u32, tuning: &Tuning) -> Vec<DifficultyEvent> {
        let mut events = Vec::new();

        if t % tuning.speed_step_interval.max(1) == 0 {
            let next = (self.base_speed + tuning.speed_step).min(tuning.base_speed_cap);
            if next > self.base_speed {
                self.base_speed = next;
                events.push(DifficultyEvent::SpeedUp { base_speed: next });
            }
        }

        if t == TWO_OBSTACLES_AT {
            events.push(self.raise_count(2, tuning));
        }

        if t == THREE_OBSTACLES_AT {
            events.push(self.raise_count(3, tuning));
        }

        if t == MOVING_UNLOCK_AT && !self.moving_unlocked {
            self.moving_unlocked = true;
            events.push(DifficultyEvent::MovingUnlocked);
        }

        if t == MOVING_UNLOCK_AT && !self.moving_split_unlocked {
            self.moving_split_unlocked = true;
            events.push(DifficultyEvent::MovingSplitUnlocked);
        }

        if t == NORMAL_SPLIT_UNLOCK_AT && !self.normal_split_unlocked {
            self.normal_split_unlocked = true;
            events.push(DifficultyEvent::NormalSplitUnlocked);
        }

        events
    }

    fn raise_count(&mut self, count: u32, tuning: &Tuning) -> DifficultyEvent {
        self.count = self.count.max(count);
        let grown = (self.frequency as f32 * tuning.frequency_growth).floor() as u32;
        self.frequency = grown.max(self.frequency).max(1);
        DifficultyEvent::CountRaised {
            count: self.count,
            frequency: self.frequency,
        }
    }
}
