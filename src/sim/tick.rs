//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically. Per tick, in order:
//! jump input, combo input, player physics, combo trigger/timeout, ground,
//! scrolling, spawns, pass counting, obstacle collisions, and finally the
//! outcome (collision beats combo timeout beats victory).

use super::collision::{resolve_ground, resolve_obstacles};
use super::combo::{ComboChallenge, HeldKeys};
use super::player::Landing;
use super::state::{GameEvent, GameState, LossCause, Outcome};
use crate::audio::{AudioManager, SoundEffect};
use crate::consts::*;

/// How far ahead (in seconds of scrolling) the autopilot jumps
const AUTOPILOT_LEAD_TIME: f32 = 0.1;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump key pressed or held
    pub jump: bool,
    /// Restart request; only honoured once the run has ended
    pub restart: bool,
    /// Combo keys held this tick
    pub held: HeldKeys,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, audio: &mut AudioManager) {
    // Ended runs are frozen until restarted
    if state.run.outcome.is_terminal() {
        if input.restart {
            restart(state, audio);
        }
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    let physics = state.tuning.physics;
    state.run.elapsed += dt;
    let now = state.run.elapsed;

    if input.jump && state.player.request_jump(&physics) {
        state.events.push(GameEvent::Jumped);
    }

    // Combo keys must all be down in the same tick
    let combo_completed = state
        .combo
        .as_mut()
        .is_some_and(|combo| combo.observe(input.held));
    if combo_completed {
        log::info!("Combo succeeded");
        state.events.push(GameEvent::ComboSucceeded);
        resume_music_after_combo(state, audio);
    }

    state.player.tick(dt, &physics);

    if !state.run.combo_triggered && now >= state.tuning.combo.trigger_time {
        start_combo(state, audio, now);
    }

    let combo_failed = state.combo.as_mut().is_some_and(|combo| combo.expire(now));
    if combo_failed {
        log::info!("Combo missed");
        state.events.push(GameEvent::ComboFailed);
        resume_music_after_combo(state, audio);
    }

    let ground_y = state.ground_y();
    if let Some(landing) = resolve_ground(&mut state.player, ground_y, &physics) {
        record_landing(&mut state.events, landing);
    }

    let shift = scroll(state, dt);
    spawn_due(state, now);
    advance_obstacles(state, shift);

    let collision = resolve_obstacles(&mut state.player, &state.level.obstacles, &physics);
    for landing in &collision.landings {
        record_landing(&mut state.events, *landing);
    }

    if collision.is_fatal() {
        lose(state, audio, LossCause::Collision);
        return;
    }
    if combo_failed {
        lose(state, audio, LossCause::ComboTimeout);
        return;
    }

    if state.run.victory_timer.is_none() {
        let all_passed = state.run.obstacles_passed >= state.run.total_obstacles;
        let out_of_time = state.level.duration.is_some_and(|d| now >= d);
        if all_passed || out_of_time {
            log::info!("All obstacles cleared at {:.2}s, victory countdown started", now);
            state.run.victory_timer = Some(state.tuning.victory_delay);
            state.events.push(GameEvent::VictoryCountdown);
        }
    }
    if let Some(timer) = state.run.victory_timer.as_mut() {
        *timer -= dt;
        if *timer <= 0.0 {
            log::info!("Level complete at {:.2}s", now);
            state.run.outcome = Outcome::Won;
            state.events.push(GameEvent::Won);
            audio.stop_music();
        }
    }
}

/// Move the world left by `scroll_speed * dt`. Returns the whole-pixel shift
/// to apply to obstacles this tick; the fractional part carries over.
fn scroll(state: &mut GameState, dt: f32) -> i32 {
    let distance = state.level.scroll_speed * dt;
    state.run.scroll_offset += distance;
    state.run.scroll_carry += distance;
    let shift = state.run.scroll_carry.floor();
    state.run.scroll_carry -= shift;
    shift as i32
}

/// Instantiate every scheduled spawn whose time has come. Each entry is
/// consumed exactly once.
fn spawn_due(state: &mut GameState, now: f32) {
    if state.level.spawn_timeline.is_empty() {
        return;
    }

    let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.level.spawn_timeline)
        .into_iter()
        .partition(|entry| entry.time <= now);
    state.level.spawn_timeline = pending;

    let ceiling = state.reachable_ceiling();
    for entry in due {
        let mut obstacle = entry.instantiate(state.level.width, state.level.height);
        obstacle.rect.y = obstacle.rect.y.max(ceiling);
        log::debug!("Spawned {:?} obstacle at {:.2}s", obstacle.kind, now);
        state.level.obstacles.push(obstacle);
        state.events.push(GameEvent::ObstacleSpawned);
    }
}

/// Scroll obstacles, count the ones the player has passed, and drop the ones
/// far off-screen.
fn advance_obstacles(state: &mut GameState, shift: i32) {
    let player_left = state.player.rect.left();
    let mut despawned = Vec::new();

    for (idx, obstacle) in state.level.obstacles.iter_mut().enumerate() {
        obstacle.rect.x = obstacle.rect.x.saturating_sub(shift);

        if !obstacle.passed && obstacle.rect.right() < player_left {
            obstacle.passed = true;
            state.run.obstacles_passed += 1;
            state.events.push(GameEvent::ObstaclePassed {
                passed: state.run.obstacles_passed,
                total: state.run.total_obstacles,
            });
        }

        if obstacle.rect.right() < DESPAWN_X {
            despawned.push(idx);
        }
    }

    for idx in despawned.into_iter().rev() {
        state.level.obstacles.remove(idx);
    }
}

fn start_combo(state: &mut GameState, audio: &mut AudioManager, now: f32) {
    state.run.combo_triggered = true;
    let mut rng = state.rng_state.next_rng();
    let combo = ComboChallenge::generate(&mut rng, now, state.tuning.combo.duration);
    log::info!("Combo triggered at {:.2}s: press {}", now, combo.label());
    state.events.push(GameEvent::ComboStarted { keys: combo.keys });
    state.combo = Some(combo);

    if !state.run.music_paused_for_combo {
        audio.pause_music();
        state.run.music_paused_for_combo = true;
    }
    audio.play(SoundEffect::ComboAlert);
}

fn resume_music_after_combo(state: &mut GameState, audio: &mut AudioManager) {
    if state.run.music_paused_for_combo {
        audio.resume_music();
        state.run.music_paused_for_combo = false;
    }
}

fn lose(state: &mut GameState, audio: &mut AudioManager, cause: LossCause) {
    log::info!("Game over at {:.2}s: {:?}", state.run.elapsed, cause);
    state.run.outcome = Outcome::Lost;
    state.player.kill();
    state.events.push(GameEvent::Lost(cause));
    audio.stop_music();
    audio.play(SoundEffect::GameOver);
}

fn restart(state: &mut GameState, audio: &mut AudioManager) {
    log::info!("Restarting run");
    audio.stop(SoundEffect::GameOver);
    state.reset();
    state.events.push(GameEvent::Restarted);
    audio.start_music();
}

fn record_landing(events: &mut Vec<GameEvent>, landing: Landing) {
    match landing {
        Landing::Resting => {}
        Landing::Touchdown => events.push(GameEvent::Landed),
        Landing::BufferedJump => {
            events.push(GameEvent::Landed);
            events.push(GameEvent::Jumped);
        }
    }
}

/// Demo AI: hold whatever the combo asks for and jump just before the next
/// obstacle arrives.
fn autopilot(state: &GameState, input: &mut TickInput) {
    if let Some(combo) = state.combo.as_ref().filter(|c| c.is_active()) {
        input.held = combo.keys.into_iter().collect();
    }

    let player = &state.player.rect;
    let lead = state.level.scroll_speed * AUTOPILOT_LEAD_TIME;
    let next = state
        .level
        .obstacles
        .iter()
        .filter(|o| o.rect.right() > player.left())
        .min_by_key(|o| o.rect.left());
    if let Some(obstacle) = next {
        let gap = obstacle.rect.left() - player.right();
        if gap >= 0 && gap as f32 <= lead {
            input.jump = true;
        }
    }
}
