//! Player kinematics
//!
//! The player never moves horizontally; the world scrolls past it. Vertical
//! motion is gravity plus jump impulses, with two input-forgiveness timers:
//! coyote time (late jumps after leaving a ledge) and a jump buffer (early
//! jumps just before touching down).

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;
use crate::tuning::PhysicsTuning;

/// Result of putting the player on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Was already standing
    Resting,
    /// Came down from the air
    Touchdown,
    /// Came down from the air and a buffered press launched a new jump
    BufferedJump,
}

/// The player's body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    /// Vertical velocity (pixels/s, positive is down)
    pub vel_y: f32,
    pub on_ground: bool,
    pub alive: bool,
    /// Remaining grace time to jump after losing support
    pub coyote_time: f32,
    /// Remaining time a missed jump press stays queued
    pub jump_buffer: f32,
    /// Remaining debounce before another jump is accepted
    pub jump_cooldown: f32,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            rect: Rect::new(x, y, PLAYER_SIZE, PLAYER_SIZE),
            vel_y: 0.0,
            on_ground: false,
            alive: true,
            coyote_time: 0.0,
            jump_buffer: 0.0,
            jump_cooldown: 0.0,
        }
    }

    /// Player at the standard spawn point for a level of the given height
    pub fn spawn(level_height: i32) -> Self {
        Self::new(PLAYER_X, level_height - PLAYER_SPAWN_OFFSET)
    }

    /// Integrate one step of gravity and decay the input timers
    pub fn tick(&mut self, dt: f32, physics: &PhysicsTuning) {
        self.vel_y += physics.gravity * dt;
        // Truncate toward zero onto the pixel grid
        let dy = (self.vel_y * dt) as i32;
        self.rect.y += dy;
        if dy > 0 {
            // Moving down means nothing is holding us up; ground/landing
            // resolution later this tick restores support if there is any.
            self.on_ground = false;
        }

        if self.on_ground {
            self.coyote_time = physics.coyote_window;
        } else {
            self.coyote_time = (self.coyote_time - dt).max(0.0);
        }

        self.jump_buffer = (self.jump_buffer - dt).max(0.0);
        self.jump_cooldown = (self.jump_cooldown - dt).max(0.0);
    }

    /// Try to jump. Returns true if the jump fired; otherwise the press is
    /// buffered (unless dead or debouncing).
    pub fn request_jump(&mut self, physics: &PhysicsTuning) -> bool {
        if !self.alive || self.jump_cooldown > 0.0 {
            return false;
        }

        if self.on_ground || self.coyote_time > 0.0 {
            self.vel_y = -physics.jump_strength;
            self.on_ground = false;
            self.coyote_time = 0.0;
            self.jump_buffer = 0.0;
            self.jump_cooldown = physics.jump_cooldown;
            true
        } else {
            self.jump_buffer = physics.jump_buffer_window;
            false
        }
    }

    /// Stand on a surface whose top edge is at `surface_top`.
    ///
    /// A buffered press fires in the same call when arriving from the air.
    pub fn land(&mut self, surface_top: i32, physics: &PhysicsTuning) -> Landing {
        self.rect.set_bottom(surface_top);
        self.vel_y = 0.0;
        // Gravity creep on a ledge drops support for a tick without a real fall
        let was_on_ground = self.on_ground || self.coyote_time > 0.0;
        self.on_ground = true;

        if was_on_ground {
            return Landing::Resting;
        }
        if self.jump_buffer > 0.0 && self.request_jump(physics) {
            Landing::BufferedJump
        } else {
            Landing::Touchdown
        }
    }

    /// Mark the player dead; no further jumps are accepted
    pub fn kill(&mut self) {
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn physics() -> PhysicsTuning {
        PhysicsTuning::default()
    }

    fn grounded() -> Player {
        let mut p = Player::spawn(LEVEL_HEIGHT);
        p.on_ground = true;
        p
    }

    #[test]
    fn test_grounded_jump_fires_immediately() {
        let mut p = grounded();
        assert!(p.request_jump(&physics()));
        assert_eq!(p.vel_y, -JUMP_STRENGTH);
        assert!(!p.on_ground);
        assert_eq!(p.coyote_time, 0.0);
        assert_eq!(p.jump_cooldown, JUMP_COOLDOWN);
    }

    #[test]
    fn test_coyote_jump_after_leaving_ground() {
        let mut p = grounded();
        p.tick(SIM_DT, &physics());
        assert_eq!(p.coyote_time, COYOTE_WINDOW);

        // Walked off a ledge: support lost, grace window still open
        p.on_ground = false;
        p.tick(SIM_DT, &physics());
        assert!(p.coyote_time > 0.0);
        assert!(p.request_jump(&physics()));
        assert_eq!(p.vel_y, -JUMP_STRENGTH);
    }

    #[test]
    fn test_airborne_press_only_buffers() {
        let mut p = Player::spawn(LEVEL_HEIGHT);
        p.vel_y = 123.0;
        assert!(!p.request_jump(&physics()));
        assert_eq!(p.vel_y, 123.0);
        assert_eq!(p.jump_buffer, JUMP_BUFFER_WINDOW);
    }

    #[test]
    fn test_cooldown_blocks_second_jump() {
        let mut p = grounded();
        assert!(p.request_jump(&physics()));
        p.on_ground = true;
        assert!(!p.request_jump(&physics()));
        assert_eq!(p.vel_y, -JUMP_STRENGTH);
    }

    #[test]
    fn test_dead_player_cannot_jump() {
        let mut p = grounded();
        p.kill();
        assert!(!p.request_jump(&physics()));
        assert_eq!(p.vel_y, 0.0);
        assert_eq!(p.jump_buffer, 0.0);
    }

    #[test]
    fn test_buffered_jump_fires_on_touchdown() {
        let mut p = Player::spawn(LEVEL_HEIGHT);
        p.vel_y = 300.0;
        p.request_jump(&physics());
        assert!(p.jump_buffer > 0.0);

        let landing = p.land(410, &physics());
        assert_eq!(landing, Landing::BufferedJump);
        assert_eq!(p.rect.bottom(), 410);
        assert_eq!(p.vel_y, -JUMP_STRENGTH);
        assert!(!p.on_ground);
        assert_eq!(p.jump_buffer, 0.0);
    }

    #[test]
    fn test_land_without_buffer() {
        let mut p = Player::spawn(LEVEL_HEIGHT);
        p.vel_y = 300.0;
        assert_eq!(p.land(410, &physics()), Landing::Touchdown);
        assert!(p.on_ground);
        assert_eq!(p.vel_y, 0.0);
        assert_eq!(p.land(410, &physics()), Landing::Resting);
    }

    #[test]
    fn test_creep_on_ledge_is_not_a_touchdown() {
        let mut p = grounded();
        p.tick(SIM_DT, &physics());
        p.tick(SIM_DT, &physics());
        // Second step of gravity sinks a pixel and drops support
        assert!(!p.on_ground);
        assert!(p.coyote_time > 0.0);
        assert_eq!(p.land(p.rect.bottom() - 1, &physics()), Landing::Resting);
        assert!(p.on_ground);
    }

    #[test]
    fn test_resting_player_stays_put() {
        let mut p = grounded();
        let y = p.rect.y;
        p.tick(SIM_DT, &physics());
        // One step of gravity is less than a pixel
        assert_eq!(p.rect.y, y);
        assert!(p.on_ground);
    }

    proptest! {
        #[test]
        fn prop_timers_never_negative(
            steps in proptest::collection::vec((0.0f32..0.2, any::<bool>()), 1..200)
        ) {
            let mut p = grounded();
            for (dt, press) in steps {
                if press {
                    p.request_jump(&physics());
                }
                p.tick(dt, &physics());
                prop_assert!(p.coyote_time >= 0.0);
                prop_assert!(p.jump_buffer >= 0.0);
                prop_assert!(p.jump_cooldown >= 0.0);
            }
        }
    }
}
