//! Fixed timestep simulation tick
//!
//! `tick` runs at the simulation rate and `difficulty_tick` once per second.
//! Both are plain functions over `GameState` so they can be driven by any clock.

use super::difficulty::DifficultyEvent;
use super::obstacle::{ObstacleKind, roll, spawn_moving, spawn_normal};
use super::state::{GameEvent, GamePhase, GameState};
use crate::config::Tuning;
use crate::consts::PLAYER_STEP;
use crate::platform::Intent;

/// How far ahead (in ticks) the autopilot looks for falling obstacles
const AUTOPILOT_LOOKAHEAD: f32 = 90.0;
/// Candidate positions the autopilot considers across the boundary
const AUTOPILOT_SLOTS: usize = 24;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Intents in arrival order
    pub intents: Vec<Intent>,
    /// Idle/demo mode - the autopilot steers with keyboard steps
    pub idle_mode: bool,
}

impl TickInput {
    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Clear one-shot intents after they have been applied
    pub fn clear(&mut self) {
        self.intents.clear();
    }
}

/// Result of one simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The player was hit; `score` is the final display score
    GameOver { score: u32 },
}

/// Advance the game state by one simulation step
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning) -> TickOutcome {
    if state.phase == GamePhase::GameOver {
        return TickOutcome::GameOver {
            score: state.display_score(),
        };
    }

    apply_input(state, input);

    // Move
    let boundary = state.boundary;
    for obstacle in &mut state.obstacles {
        obstacle.advance(&boundary);
    }

    // Split (parent replaced by its children in the same step)
    split_ready(state);

    // Drop anything that fell out of the play-field
    let bottom = boundary.bottom();
    state.obstacles.retain(|o| o.rect.top() < bottom);

    // Collide
    let player = state.player.rect;
    if let Some(hit) = state.obstacles.iter().find(|o| player.intersects(&o.rect)) {
        let score = state.display_score();
        log::info!(
            "Player hit by {} obstacle {} after {} ticks (score {})",
            hit.kind.name(),
            hit.id,
            state.ticks,
            score
        );
        state.events.push(GameEvent::Collision {
            obstacle: hit.id,
            score,
        });
        state.phase = GamePhase::GameOver;
        return TickOutcome::GameOver { score };
    }

    state.ticks += 1;

    // Spawn
    if state.ticks % state.difficulty.frequency.max(1) as u64 == 0 {
        spawn_wave(state, tuning);
    }

    TickOutcome::Running
}

/// Advance game time by one second and apply the difficulty schedule
pub fn difficulty_tick(state: &mut GameState, tuning: &Tuning) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    state.game_time += 1;
    let events = state.difficulty.on_second(state.game_time, tuning);
    for event in events {
        log::info!("Difficulty at {}s: {:?}", state.game_time, event);
        if event == DifficultyEvent::MovingUnlocked {
            // Announce the unlock with an immediate moving obstacle. It arrives
            // ahead of the moving split unlock, so it never splits.
            let mut obstacle = spawn_moving(
                &mut state.ids,
                &state.boundary,
                &state.difficulty,
                tuning,
                &mut state.rng,
            );
            if let ObstacleKind::Moving { can_split, .. } = &mut obstacle.kind {
                *can_split = false;
            }
            state.obstacles.push(obstacle);
        }
        state.events.push(GameEvent::Difficulty(event));
    }
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    let boundary = state.boundary;
    for intent in &input.intents {
        match *intent {
            Intent::Left => state.player.nudge(-PLAYER_STEP, &boundary),
            Intent::Right => state.player.nudge(PLAYER_STEP, &boundary),
            Intent::MoveTo(x) => state.player.center_on(x, &boundary),
        }
    }

    if input.idle_mode {
        if let Some(target) = autopilot_target(state) {
            let dx = target - state.player.rect.center().x;
            if dx.abs() > PLAYER_STEP / 2.0 {
                state.player.nudge(PLAYER_STEP.copysign(dx), &boundary);
            }
        }
    }
}

fn split_ready(state: &mut GameState) {
    let boundary = state.boundary;
    if !state.obstacles.iter().any(|o| o.ready_to_split(&boundary)) {
        return;
    }

    let mut next = Vec::with_capacity(state.obstacles.len() + 4);
    for obstacle in std::mem::take(&mut state.obstacles) {
        if obstacle.ready_to_split(&boundary) {
            let children = obstacle.split(&mut state.ids, &mut state.rng);
            log::debug!(
                "{} obstacle {} split into {}",
                obstacle.kind.name(),
                obstacle.id,
                children.len()
            );
            state.events.push(GameEvent::Split {
                parent: obstacle.id,
                children: children.len(),
            });
            next.extend(children);
        } else {
            next.push(obstacle);
        }
    }
    state.obstacles = next;
}

fn spawn_wave(state: &mut GameState, tuning: &Tuning) {
    for _ in 0..state.difficulty.count {
        let moving = state.difficulty.moving_unlocked && roll(&mut state.rng, tuning.moving_spawn_chance);
        let obstacle = if moving {
            spawn_moving(&mut state.ids, &state.boundary, &state.difficulty, tuning, &mut state.rng)
        } else {
            spawn_normal(&mut state.ids, &state.boundary, &state.difficulty, tuning, &mut state.rng)
        };
        log::debug!(
            "Spawned {} obstacle {} at x={:.1}",
            obstacle.kind.name(),
            obstacle.id,
            obstacle.rect.left()
        );
        state.obstacles.push(obstacle);
    }
}

/// Horizontal gap between two spans; negative when they overlap
fn span_gap(a: (f32, f32), b: (f32, f32)) -> f32 {
    (b.0 - a.1).max(a.0 - b.1)
}

/// Pick the player center x with the most clearance from obstacles about to land.
/// None when nothing is close enough to matter.
pub fn autopilot_target(state: &GameState) -> Option<f32> {
    let player = state.player.rect;
    let boundary = state.boundary;

    let threats: Vec<(f32, f32)> = state
        .obstacles
        .iter()
        .filter(|o| o.rect.top() < player.bottom() && o.speed > 0.0)
        .filter_map(|o| {
            let ticks = ((player.top() - o.rect.bottom()) / o.speed).max(0.0);
            if ticks > AUTOPILOT_LOOKAHEAD {
                return None;
            }
            let drift = o.kind.horizontal_speed().unwrap_or(0.0) * ticks;
            let left = boundary.clamp_x(o.rect.left() + drift, o.rect.width());
            Some((left, left + o.rect.width()))
        })
        .collect();

    if threats.is_empty() {
        return None;
    }

    let half = player.width() / 2.0;
    let travel = (boundary.width() - player.width()).max(0.0);
    let current = player.center().x;

    (0..=AUTOPILOT_SLOTS)
        .map(|i| boundary.left() + half + travel * i as f32 / AUTOPILOT_SLOTS as f32)
        .map(|x| {
            let clearance = threats
                .iter()
                .map(|&t| span_gap((x - half, x + half), t))
                .fold(f32::INFINITY, f32::min)
                .min(player.width() * 2.0);
            (x, clearance * 100.0 - (x - current).abs())
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(x, _)| x)
}
