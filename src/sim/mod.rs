//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (level order for obstacles)
//! - No rendering, audio device or platform dependencies

pub mod collision;
pub mod combo;
pub mod level;
pub mod player;
pub mod rect;
pub mod state;
pub mod stepper;
pub mod tick;

pub use collision::{CollisionResult, landing_window, resolve_ground, resolve_obstacles};
pub use combo::{ComboChallenge, ComboKey, ComboPhase, HeldKeys};
pub use level::{BgLayer, Level, LevelError, LevelInfo, SpawnEntry, discover_levels};
pub use player::{Landing, Player};
pub use rect::Rect;
pub use state::{GameEvent, GameState, LossCause, Obstacle, ObstacleKind, Outcome, RunState};
pub use stepper::FixedStep;
pub use tick::{TickInput, tick};
