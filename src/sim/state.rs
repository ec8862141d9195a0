//! Game state and core simulation types
//!
//! Everything a run needs to be replayed lives here. The state is owned by
//! the single simulation loop and only mutated inside [`super::tick`].

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboChallenge;
use super::combo::ComboKey;
use super::level::Level;
use super::player::Player;
use super::rect::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Solid block, can be stood on
    #[default]
    Normal,
    /// Thin ledge, can be stood on
    Platform,
    /// Kills on any contact
    Spike,
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
    /// Right edge has gone past the player's left edge (counted once)
    pub passed: bool,
}

impl Obstacle {
    pub fn new(rect: Rect, kind: ObstacleKind) -> Self {
        Self {
            rect,
            kind,
            passed: false,
        }
    }

    /// Returns true if touching this obstacle ends the run
    pub fn is_deadly(&self) -> bool {
        match self.kind {
            ObstacleKind::Spike => true,
            ObstacleKind::Normal | ObstacleKind::Platform => false,
        }
    }

    /// Returns true if the player may stand on top of this obstacle
    pub fn is_landable(&self) -> bool {
        match self.kind {
            ObstacleKind::Normal | ObstacleKind::Platform => true,
            ObstacleKind::Spike => false,
        }
    }
}

/// Run outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Playing,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Playing)
    }
}

/// Why a run was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    Collision,
    ComboTimeout,
}

/// Notable things that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Landed,
    ObstacleSpawned,
    ObstaclePassed { passed: u32, total: u32 },
    ComboStarted { keys: [ComboKey; 2] },
    ComboSucceeded,
    ComboFailed,
    VictoryCountdown,
    Won,
    Lost(LossCause),
    Restarted,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Generator for the next draw; each call uses a fresh stream
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.stream));
        self.stream += 1;
        rng
    }
}

/// Orchestrator bookkeeping for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Simulated seconds since the run started
    pub elapsed: f32,
    /// Total distance scrolled (pixels)
    pub scroll_offset: f32,
    /// Sub-pixel scroll not yet applied to obstacle positions
    pub scroll_carry: f32,
    pub obstacles_passed: u32,
    /// Static obstacles plus scheduled spawns
    pub total_obstacles: u32,
    /// The combo fires at most once per run
    pub combo_triggered: bool,
    pub music_paused_for_combo: bool,
    /// Victory countdown (seconds remaining), latched once all obstacles are passed
    pub victory_timer: Option<f32>,
    pub outcome: Outcome,
}

impl RunState {
    pub fn new(total_obstacles: u32) -> Self {
        Self {
            elapsed: 0.0,
            scroll_offset: 0.0,
            scroll_carry: 0.0,
            obstacles_passed: 0,
            total_obstacles,
            combo_triggered: false,
            music_paused_for_combo: false,
            victory_timer: None,
            outcome: Outcome::Playing,
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state
    pub rng_state: RngState,
    pub tuning: Tuning,
    /// Live level: obstacles and pending spawns mutate as the run advances
    pub level: Level,
    /// Level as loaded (after clamping), used to restart
    initial_level: Level,
    pub player: Player,
    /// Combo challenge once triggered
    pub combo: Option<ComboChallenge>,
    pub run: RunState,
    /// Events emitted since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a run on `level`. Obstacles out of jump reach are clamped first.
    pub fn new(mut level: Level, tuning: Tuning, seed: u64) -> Self {
        let ceiling = reachable_ceiling_for(&level, &tuning);
        let adjusted = level.clamp_obstacles(ceiling);
        if adjusted > 0 {
            log::debug!("Clamped {} obstacle(s) to reachable ceiling y={}", adjusted, ceiling);
        }

        let total = (level.obstacles.len() + level.spawn_timeline.len()) as u32;
        let player = Player::spawn(level.height);

        Self {
            seed,
            rng_state: RngState::new(seed),
            tuning,
            initial_level: level.clone(),
            level,
            player,
            combo: None,
            run: RunState::new(total),
            events: Vec::new(),
        }
    }

    /// Full reset to the state of a freshly started run
    pub fn reset(&mut self) {
        *self = Self::new(self.initial_level.clone(), self.tuning, self.seed);
    }

    /// Y coordinate of the ground plane
    pub fn ground_y(&self) -> i32 {
        self.level.ground_y()
    }

    /// Highest obstacle top a single jump can clear
    pub fn reachable_ceiling(&self) -> i32 {
        reachable_ceiling_for(&self.level, &self.tuning)
    }

    pub fn outcome(&self) -> Outcome {
        self.run.outcome
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

fn reachable_ceiling_for(level: &Level, tuning: &Tuning) -> i32 {
    crate::reachable_ceiling(
        level.ground_y(),
        tuning.physics.jump_strength,
        tuning.physics.gravity,
        PLAYER_SIZE,
    )
}
