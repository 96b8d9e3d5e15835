//! Falling obstacles: spawning, motion and splitting
//!
//! Sizes and speeds scale with the boundary so the game plays the same at
//! any window size.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::geometry::Rect;
use super::state::EntityIds;
use crate::config::Tuning;
use crate::consts::*;

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Falls straight down; may split into three
    Normal { can_split: bool },
    /// Bounces between the boundary sides; may split into two
    Moving { vx: f32, can_split: bool },
    /// Product of a split; never splits again
    Split { vx: f32 },
}

impl ObstacleKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObstacleKind::Normal { .. } => "normal",
            ObstacleKind::Moving { .. } => "moving",
            ObstacleKind::Split { .. } => "split",
        }
    }

    pub fn can_split(&self) -> bool {
        match *self {
            ObstacleKind::Normal { can_split } | ObstacleKind::Moving { can_split, .. } => can_split,
            ObstacleKind::Split { .. } => false,
        }
    }

    pub fn horizontal_speed(&self) -> Option<f32> {
        match *self {
            ObstacleKind::Normal { .. } => None,
            ObstacleKind::Moving { vx, .. } | ObstacleKind::Split { vx } => Some(vx),
        }
    }
}

/// A square falling obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    /// Vertical speed (units per tick)
    pub speed: f32,
    #[serde(flatten)]
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(id: u32, rect: Rect, speed: f32, kind: ObstacleKind) -> Self {
        Self {
            id,
            rect,
            speed,
            kind,
        }
    }

    /// Move one tick; horizontal movers bounce off the boundary sides
    pub fn advance(&mut self, boundary: &Rect) {
        self.rect.pos.y += self.speed;

        let vx = match &mut self.kind {
            ObstacleKind::Normal { .. } => return,
            ObstacleKind::Moving { vx, .. } | ObstacleKind::Split { vx } => vx,
        };

        self.rect.pos.x += *vx;
        // Flip only while still heading into the wall, so one contact = one flip
        let hit_left = self.rect.left() <= boundary.left() && *vx < 0.0;
        let hit_right = self.rect.right() >= boundary.right() && *vx > 0.0;
        if hit_left || hit_right {
            *vx = -*vx;
        }
    }

    /// True once a splittable obstacle has crossed the split line
    pub fn ready_to_split(&self, boundary: &Rect) -> bool {
        let split_line = boundary.top() + boundary.height() * SPLIT_LINE_FRACTION;
        self.kind.can_split() && self.rect.top() > split_line
    }

    /// Children replacing this obstacle. Empty if it cannot split.
    pub fn split(&self, ids: &mut EntityIds, rng: &mut impl Rng) -> Vec<Obstacle> {
        let (pieces, can_split) = match self.kind {
            ObstacleKind::Normal { can_split } => (NORMAL_SPLIT_CHILDREN, can_split),
            ObstacleKind::Moving { can_split, .. } => (MOVING_SPLIT_CHILDREN, can_split),
            ObstacleKind::Split { .. } => return Vec::new(),
        };
        if !can_split {
            return Vec::new();
        }

        let side = self.rect.width() / pieces as f32;
        let speed = self.speed * SPLIT_SPEED_MULTIPLIER;

        (0..pieces)
            .map(|i| {
                let vx = match self.kind {
                    ObstacleKind::Moving { .. } => {
                        if i == 0 {
                            -SPLIT_HORIZONTAL_SPEED
                        } else {
                            SPLIT_HORIZONTAL_SPEED
                        }
                    }
                    _ => rng.random_range(-SPLIT_HORIZONTAL_SPEED..SPLIT_HORIZONTAL_SPEED),
                };
                let pos = Vec2::new(self.rect.left() + i as f32 * side, self.rect.top());
                Obstacle::new(
                    ids.next_id(),
                    Rect::square(pos, side),
                    speed,
                    ObstacleKind::Split { vx },
                )
            })
            .collect()
    }
}

/// Side length of a freshly spawned obstacle
pub fn obstacle_side(boundary: &Rect) -> f32 {
    boundary.width() * OBSTACLE_SIZE_FRACTION
}

fn spawn_rect(boundary: &Rect, rng: &mut impl Rng) -> Rect {
    let side = obstacle_side(boundary);
    let span = (boundary.width() - side).max(0.0);
    let x = boundary.left() + rng.random::<f32>() * span;
    Rect::square(Vec2::new(x, boundary.top()), side)
}

/// Vertical speed for a new obstacle, scaled by boundary height
fn spawn_speed(boundary: &Rect, difficulty: &Difficulty, tuning: &Tuning, rng: &mut impl Rng) -> f32 {
    let unscaled = (difficulty.base_speed + rng.random::<f32>()).min(tuning.obstacle_speed_cap);
    unscaled * boundary.height() / REFERENCE_HEIGHT
}

/// Roll a probability that may come from user-edited tuning
pub(crate) fn roll(rng: &mut impl Rng, chance: f32) -> bool {
    rng.random_bool(chance.clamp(0.0, 1.0) as f64)
}

/// Spawn a straight-falling obstacle at the top of the boundary
pub fn spawn_normal(
    ids: &mut EntityIds,
    boundary: &Rect,
    difficulty: &Difficulty,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> Obstacle {
    let rect = spawn_rect(boundary, rng);
    let speed = spawn_speed(boundary, difficulty, tuning, rng);
    let can_split = difficulty.normal_split_unlocked && roll(rng, tuning.split_chance);
    Obstacle::new(ids.next_id(), rect, speed, ObstacleKind::Normal { can_split })
}

/// Spawn a side-to-side obstacle at the top of the boundary
pub fn spawn_moving(
    ids: &mut EntityIds,
    boundary: &Rect,
    difficulty: &Difficulty,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> Obstacle {
    let rect = spawn_rect(boundary, rng);
    let speed = spawn_speed(boundary, difficulty, tuning, rng);
    let vx = MOVING_HORIZONTAL_SPEED * boundary.width() / REFERENCE_WIDTH;
    Obstacle::new(
        ids.next_id(),
        rect,
        speed,
        ObstacleKind::Moving {
            vx,
            can_split: difficulty.moving_split_unlocked,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn boundary() -> Rect {
        Rect::new(100.0, 50.0, 800.0, 600.0)
    }

    fn unlocked() -> Difficulty {
        Difficulty {
            moving_unlocked: true,
            moving_split_unlocked: true,
            normal_split_unlocked: true,
            ..Difficulty::new(&Tuning::default())
        }
    }

    #[test]
    fn test_spawn_normal_within_boundary() {
        let boundary = boundary();
        let tuning = Tuning::default();
        let difficulty = Difficulty::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ids = EntityIds::default();

        for _ in 0..200 {
            let obstacle = spawn_normal(&mut ids, &boundary, &difficulty, &tuning, &mut rng);
            assert_eq!(obstacle.rect.width(), 40.0);
            assert_eq!(obstacle.rect.height(), 40.0);
            assert!(obstacle.rect.left() >= boundary.left());
            assert!(obstacle.rect.right() <= boundary.right());
            assert_eq!(obstacle.rect.top(), boundary.top());
            // Reference-sized boundary: speed is base + [0, 1)
            assert!(obstacle.speed >= 3.0 && obstacle.speed <= 4.0);
            assert!(!obstacle.kind.can_split(), "split is locked");
        }
    }

    #[test]
    fn test_spawn_speed_scales_and_caps() {
        let tuning = Tuning::default();
        let difficulty = Difficulty {
            base_speed: 5.9,
            ..Difficulty::new(&tuning)
        };
        let half = Rect::new(0.0, 0.0, 400.0, 300.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ids = EntityIds::default();

        for _ in 0..100 {
            let obstacle = spawn_normal(&mut ids, &half, &difficulty, &tuning, &mut rng);
            assert!(obstacle.speed <= tuning.obstacle_speed_cap * 0.5 + 1e-5);
            assert!(obstacle.speed >= 5.9 * 0.5 - 1e-5);
        }
    }

    #[test]
    fn test_spawn_split_chance_respects_unlock() {
        let tuning = Tuning {
            split_chance: 1.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ids = EntityIds::default();

        let locked = Difficulty::new(&tuning);
        let obstacle = spawn_normal(&mut ids, &boundary(), &locked, &tuning, &mut rng);
        assert!(!obstacle.kind.can_split());

        let obstacle = spawn_normal(&mut ids, &boundary(), &unlocked(), &tuning, &mut rng);
        assert!(obstacle.kind.can_split());
    }

    #[test]
    fn test_spawn_moving_horizontal_speed_scaled() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::default();
        let wide = Rect::new(0.0, 0.0, 1600.0, 600.0);

        let obstacle = spawn_moving(&mut ids, &wide, &Difficulty::new(&tuning), &tuning, &mut rng);
        assert_eq!(obstacle.kind, ObstacleKind::Moving { vx: 4.0, can_split: false });

        let obstacle = spawn_moving(&mut ids, &wide, &unlocked(), &tuning, &mut rng);
        assert!(obstacle.kind.can_split());
    }

    #[test]
    fn test_ids_are_unique() {
        let tuning = Tuning::default();
        let difficulty = Difficulty::new(&tuning);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::default();
        let a = spawn_normal(&mut ids, &boundary(), &difficulty, &tuning, &mut rng);
        let b = spawn_moving(&mut ids, &boundary(), &difficulty, &tuning, &mut rng);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_normal_falls_straight() {
        let mut obstacle = Obstacle::new(
            1,
            Rect::new(100.0, 50.0, 60.0, 60.0),
            3.0,
            ObstacleKind::Normal { can_split: false },
        );
        obstacle.advance(&boundary());
        assert_eq!(obstacle.rect.pos, Vec2::new(100.0, 53.0));
    }

    #[test]
    fn test_moving_reflects_once_per_contact() {
        let boundary = Rect::new(0.0, 0.0, 100.0, 1000.0);
        let mut obstacle = Obstacle::new(
            1,
            Rect::new(85.0, 0.0, 10.0, 10.0),
            1.0,
            ObstacleKind::Moving { vx: 3.0, can_split: false },
        );

        let mut flips = 0;
        let mut last_sign = 1.0f32;
        for _ in 0..200 {
            obstacle.advance(&boundary);
            let vx = obstacle.kind.horizontal_speed().unwrap();
            if vx.signum() != last_sign {
                flips += 1;
                last_sign = vx.signum();
                // Flip happens only while touching a side
                assert!(
                    obstacle.rect.left() <= boundary.left()
                        || obstacle.rect.right() >= boundary.right()
                );
            }
        }
        // 200 ticks * 3 units across a 90-unit lane: first contact after ~2 ticks,
        // then one flip per 30 ticks
        assert!(flips >= 6, "flips = {}", flips);
        assert!(obstacle.rect.left() > boundary.left() - 3.0);
        assert!(obstacle.rect.right() < boundary.right() + 3.0);
    }

    #[test]
    fn test_stuck_at_wall_does_not_oscillate() {
        // Sitting on the left wall but already heading right: no flip
        let boundary = Rect::new(0.0, 0.0, 100.0, 1000.0);
        let mut obstacle = Obstacle::new(
            1,
            Rect::new(-2.0, 0.0, 10.0, 10.0),
            1.0,
            ObstacleKind::Split { vx: 1.0 },
        );
        obstacle.advance(&boundary);
        assert_eq!(obstacle.kind.horizontal_speed(), Some(1.0));
        assert_eq!(obstacle.rect.left(), -1.0);
    }

    #[test]
    fn test_normal_split_children() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ids = EntityIds::default();
        let parent = Obstacle::new(
            ids.next_id(),
            Rect::new(200.0, 300.0, 60.0, 60.0),
            4.0,
            ObstacleKind::Normal { can_split: true },
        );

        let children = parent.split(&mut ids, &mut rng);
        assert_eq!(children.len(), 3);
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.rect.width(), 20.0);
            assert_eq!(child.rect.left(), 200.0 + i as f32 * 20.0);
            assert_eq!(child.rect.top(), 300.0);
            assert!((child.speed - 4.8).abs() < 1e-5);
            let vx = child.kind.horizontal_speed().unwrap();
            assert!((-2.0..2.0).contains(&vx));
            assert!(!child.kind.can_split());
            assert_ne!(child.id, parent.id);
        }
    }

    #[test]
    fn test_moving_split_children_mirror() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ids = EntityIds::default();
        let parent = Obstacle::new(
            ids.next_id(),
            Rect::new(200.0, 300.0, 60.0, 60.0),
            5.0,
            ObstacleKind::Moving { vx: 2.0, can_split: true },
        );

        let children = parent.split(&mut ids, &mut rng);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind, ObstacleKind::Split { vx: -2.0 });
        assert_eq!(children[1].kind, ObstacleKind::Split { vx: 2.0 });
        assert_eq!(children[1].rect.left(), 230.0);
        assert_eq!(children[0].rect.width(), 30.0);
    }

    #[test]
    fn test_split_children_never_split() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = EntityIds::default();
        let child = Obstacle::new(1, Rect::new(0.0, 500.0, 10.0, 10.0), 1.0, ObstacleKind::Split { vx: 0.5 });
        assert!(!child.ready_to_split(&boundary()));
        assert!(child.split(&mut ids, &mut rng).is_empty());
    }

    #[test]
    fn test_ready_to_split_line() {
        // Split line at 50 + 600 / 3 = 250
        let boundary = boundary();
        let mut obstacle = Obstacle::new(
            1,
            Rect::new(300.0, 250.0, 40.0, 40.0),
            1.0,
            ObstacleKind::Normal { can_split: true },
        );
        assert!(!obstacle.ready_to_split(&boundary));
        obstacle.rect.pos.y = 250.5;
        assert!(obstacle.ready_to_split(&boundary));
    }

    #[test]
    fn test_serialized_type_tag() {
        let obstacle = Obstacle::new(
            4,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            1.0,
            ObstacleKind::Moving { vx: 2.0, can_split: false },
        );
        let json = serde_json::to_value(&obstacle).unwrap();
        assert_eq!(json["type"], "moving");
        assert_eq!(json["vx"], 2.0);
    }
}
