//! Dash Runner - A side-scrolling obstacle runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, obstacles, combo challenge, run outcome)
//! - `renderer`: Draw-call dispatch onto a host-provided canvas
//! - `audio`: Sound/music collaborator interface with failure isolation
//! - `assets`: Image lookup for level art
//! - `tuning`: Data-driven game balance
//! - `settings`: User preferences

pub mod assets;
pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the frame limiter target)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are clamped (window drag, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 2400.0;
    /// Initial upward jump velocity (pixels/s)
    pub const JUMP_STRENGTH: f32 = 700.0;

    /// Player spawn and size
    pub const PLAYER_X: i32 = 100;
    pub const PLAYER_SIZE: i32 = 40;
    /// Player spawns this far above the bottom of the level
    pub const PLAYER_SPAWN_OFFSET: i32 = 80;

    /// Ground plane sits this far above the bottom of the level
    pub const GROUND_MARGIN: i32 = 40;

    /// Grace window after leaving solid ground (seconds)
    pub const COYOTE_WINDOW: f32 = 0.1;
    /// How long a missed jump press is remembered (seconds)
    pub const JUMP_BUFFER_WINDOW: f32 = 0.1;
    /// Debounce between two accepted jumps (seconds)
    pub const JUMP_COOLDOWN: f32 = 0.1;

    /// Elapsed time at which the combo challenge fires
    pub const COMBO_TRIGGER_TIME: f32 = 8.0;
    /// Time allowed to complete the combo
    pub const COMBO_DURATION: f32 = 4.0;
    /// Delay between passing the last obstacle and winning
    pub const VICTORY_DELAY: f32 = 1.0;

    /// Landing window: player bottom may sink this far below an obstacle top
    pub const LANDING_TOLERANCE: i32 = 20;
    /// Landing window: horizontal slack on either side of an obstacle
    pub const LANDING_OVERHANG: i32 = 25;

    /// Spawned obstacles appear this far past the right edge
    pub const SPAWN_MARGIN: i32 = 100;
    /// Obstacles whose right edge is left of this line are dropped
    pub const DESPAWN_X: i32 = -200;

    /// Defaults for spawn timeline entries that omit geometry
    pub const SPAWN_DEFAULT_W: i32 = 40;
    pub const SPAWN_DEFAULT_H: i32 = 80;

    /// Level file defaults
    pub const LEVEL_WIDTH: i32 = 800;
    pub const LEVEL_HEIGHT: i32 = 450;
    pub const LEVEL_SCROLL_SPEED: f32 = 200.0;
}

/// Highest obstacle top (smallest y) a single jump from the ground can clear.
///
/// Apex height is `v² / 2g`; the result is rounded toward the ground so an
/// obstacle clamped to it stays reachable. Truncating instead would put the
/// ceiling 1px higher (267 rather than 268 with the default physics).
#[inline]
pub fn reachable_ceiling(ground_y: i32, jump_strength: f32, gravity: f32, player_height: i32) -> i32 {
    let apex = (jump_strength * jump_strength) / (2.0 * gravity);
    (ground_y as f32 - apex - player_height as f32).ceil() as i32
}
