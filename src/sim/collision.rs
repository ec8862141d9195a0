//! Collision detection and response between the player and the level
//!
//! Obstacles are checked in level order. Spikes kill on any overlap. Normal
//! blocks and platforms can be landed on from above; touching them any other
//! way (side, underneath, rising into them) is just as fatal as a spike.

use super::player::{Landing, Player};
use super::rect::Rect;
use super::state::{Obstacle, ObstacleKind};
use crate::consts::*;
use crate::tuning::PhysicsTuning;

/// Result of resolving the player against the obstacles for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResult {
    /// Index of the obstacle that killed the player, if any
    pub fatal: Option<usize>,
    /// Non-resting landings performed (touchdowns and buffered jumps)
    pub landings: Vec<Landing>,
}

impl CollisionResult {
    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }
}

/// Whether an overlap with a landable obstacle counts as landing on top.
///
/// The player's bottom must be no more than `LANDING_TOLERANCE` below the
/// obstacle's top, the player must not be rising, and its horizontal center
/// must lie within the obstacle widened by `LANDING_OVERHANG` on each side.
pub fn landing_window(player: &Rect, vel_y: f32, obstacle: &Rect) -> bool {
    let center = player.center_x();
    player.bottom() <= obstacle.top() + LANDING_TOLERANCE
        && vel_y >= 0.0
        && center >= obstacle.left() - LANDING_OVERHANG
        && center <= obstacle.right() + LANDING_OVERHANG
}

/// Land the player on the ground plane if it has reached it. Never fatal.
pub fn resolve_ground(player: &mut Player, ground_y: i32, physics: &PhysicsTuning) -> Option<Landing> {
    if player.rect.bottom() >= ground_y {
        Some(player.land(ground_y, physics))
    } else {
        None
    }
}

/// Resolve the player against every intersecting obstacle.
///
/// The first fatal overlap ends evaluation; landings before it stay applied.
pub fn resolve_obstacles(
    player: &mut Player,
    obstacles: &[Obstacle],
    physics: &PhysicsTuning,
) -> CollisionResult {
    let mut result = CollisionResult::default();

    for (idx, obstacle) in obstacles.iter().enumerate() {
        if !player.rect.intersects(&obstacle.rect) {
            continue;
        }

        match obstacle.kind {
            ObstacleKind::Spike => {
                result.fatal = Some(idx);
                return result;
            }
            ObstacleKind::Normal | ObstacleKind::Platform => {
                if landing_window(&player.rect, player.vel_y, &obstacle.rect) {
                    let landing = player.land(obstacle.rect.top(), physics);
                    if landing != Landing::Resting {
                        result.landings.push(landing);
                    }
                } else {
                    result.fatal = Some(idx);
                    return result;
                }
            }
        }
    }

    result
}
