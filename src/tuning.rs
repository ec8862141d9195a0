//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads at runtime is routed through
//! [`Tuning`] so levels can be replayed with different balance without a rebuild.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Player physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Initial upward velocity of a jump (pixels/s)
    pub jump_strength: f32,
    /// Grace window after leaving the ground (seconds)
    pub coyote_window: f32,
    /// How long a missed jump press is remembered (seconds)
    pub jump_buffer_window: f32,
    /// Minimum time between two accepted jumps (seconds)
    pub jump_cooldown: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,
            coyote_window: COYOTE_WINDOW,
            jump_buffer_window: JUMP_BUFFER_WINDOW,
            jump_cooldown: JUMP_COOLDOWN,
        }
    }
}

/// Combo challenge timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Elapsed run time at which the challenge fires (seconds)
    pub trigger_time: f32,
    /// Time allowed to hold the keys (seconds)
    pub duration: f32,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            trigger_time: COMBO_TRIGGER_TIME,
            duration: COMBO_DURATION,
        }
    }
}

/// Complete balance sheet for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub combo: ComboTuning,
    /// Countdown between passing the last obstacle and winning (seconds)
    pub victory_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            combo: ComboTuning::default(),
            victory_delay: VICTORY_DELAY,
        }
    }
}
