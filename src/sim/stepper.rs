//! Fixed timestep accumulator
//!
//! Hosts call [`FixedStep::advance`] once per rendered frame with the wall
//! clock delta; it runs as many `SIM_DT` ticks as have accumulated.

use super::state::GameState;
use super::tick::{TickInput, tick};
use crate::audio::AudioManager;
use crate::consts::*;

/// Frame-to-tick adapter
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run simulation ticks for one frame. Returns how many ticks ran.
    ///
    /// One-shot inputs (`restart`) are cleared after the first tick consumes
    /// them; held inputs stay as the host set them.
    pub fn advance(
        &mut self,
        frame_dt: f32,
        state: &mut GameState,
        input: &mut TickInput,
        audio: &mut AudioManager,
    ) -> u32 {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT, audio);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.restart = false;
        }
        substeps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;
    use crate::sim::state::Outcome;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        let level = Level::from_json_str(r#"{"obstacles": [{"x": 300, "y": 370, "w": 40, "h": 40}]}"#).unwrap();
        GameState::new(level, Tuning::default(), 3)
    }

    #[test]
    fn test_half_frames_accumulate() {
        let mut stepper = FixedStep::new();
        let mut state = state();
        let mut input = TickInput::default();
        let mut audio = AudioManager::default();

        assert_eq!(stepper.advance(SIM_DT / 2.0, &mut state, &mut input, &mut audio), 0);
        assert!((stepper.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(stepper.advance(SIM_DT / 2.0, &mut state, &mut input, &mut audio), 1);
        assert!((state.run.elapsed - SIM_DT).abs() < 1e-6);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut stepper = FixedStep::new();
        let mut state = state();
        let mut input = TickInput::default();
        let mut audio = AudioManager::default();

        let ticks = stepper.advance(5.0, &mut state, &mut input, &mut audio);
        assert!((5..=6).contains(&ticks));
        assert!(state.run.elapsed <= MAX_FRAME_DT + 1e-4);
    }

    #[test]
    fn test_negative_frame_runs_nothing() {
        let mut stepper = FixedStep::new();
        let mut state = state();
        let mut input = TickInput::default();
        let mut audio = AudioManager::default();
        assert_eq!(stepper.advance(-1.0, &mut state, &mut input, &mut audio), 0);
        assert_eq!(state.run.elapsed, 0.0);
    }

    #[test]
    fn test_restart_is_one_shot() {
        let mut stepper = FixedStep::new();
        let mut state = state();
        let mut input = TickInput::default();
        let mut audio = AudioManager::default();

        // Run into the block
        for _ in 0..200 {
            stepper.advance(SIM_DT, &mut state, &mut input, &mut audio);
        }
        assert_eq!(state.outcome(), Outcome::Lost);

        input.restart = true;
        stepper.advance(SIM_DT * 2.0, &mut state, &mut input, &mut audio);
        assert!(!input.restart);
        assert_eq!(state.outcome(), Outcome::Playing);
    }
}
