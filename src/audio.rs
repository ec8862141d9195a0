//! Audio collaborator interface
//!
//! The simulation never talks to a sound device directly. It issues
//! fire-and-forget requests through [`AudioManager`], which forwards them to a
//! host-provided [`AudioSink`] and swallows backend failures after logging them.
//! A missing device or an unsupported file only ever means "no sound".

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Combo challenge started
    ComboAlert,
    /// Run lost
    GameOver,
}

/// Failure reported by an audio backend
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio backend error: {0}")]
    Backend(String),
    #[error("missing audio asset: {}", .0.display())]
    MissingAsset(PathBuf),
}

/// Host audio backend
///
/// Every call may fail; callers treat failure as silence.
pub trait AudioSink {
    /// Play a one-shot sound effect at the given volume (0.0 - 1.0)
    fn play_sound(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;
    /// Stop a sound effect if it is still playing
    fn stop_sound(&mut self, effect: SoundEffect) -> Result<(), AudioError>;
    /// Start looping a music track from the beginning
    fn play_music(&mut self, path: &Path, volume: f32) -> Result<(), AudioError>;
    fn pause_music(&mut self) -> Result<(), AudioError>;
    fn resume_music(&mut self) -> Result<(), AudioError>;
    fn stop_music(&mut self) -> Result<(), AudioError>;
}

/// Backend that accepts every request and plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _effect: SoundEffect, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_sound(&mut self, _effect: SoundEffect) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_music(&mut self, _path: &Path, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn pause_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn resume_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Level track, replayed on restart
    music: Option<PathBuf>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            music: None,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Select the track `start_music` plays (None = silence)
    pub fn set_music(&mut self, path: Option<PathBuf>) {
        self.music = path;
    }

    pub fn music(&self) -> Option<&Path> {
        self.music.as_deref()
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume(self.sfx_volume);
        if vol <= 0.0 {
            return;
        }
        let result = self.sink.play_sound(effect, vol);
        report("play sound", result);
    }

    pub fn stop(&mut self, effect: SoundEffect) {
        let result = self.sink.stop_sound(effect);
        report("stop sound", result);
    }

    /// Start the level track from the top, if one is set
    pub fn start_music(&mut self) {
        let vol = self.effective_volume(self.music_volume);
        let Some(path) = self.music.as_deref() else {
            return;
        };
        let result = self.sink.play_music(path, vol);
        report("play music", result);
    }

    pub fn pause_music(&mut self) {
        let result = self.sink.pause_music();
        report("pause music", result);
    }

    pub fn resume_music(&mut self) {
        let result = self.sink.resume_music();
        report("resume music", result);
    }

    pub fn stop_music(&mut self) {
        let result = self.sink.stop_music();
        report("stop music", result);
    }
}

fn report(op: &str, result: Result<(), AudioError>) {
    if let Err(e) = result {
        log::warn!("Audio {op} failed: {e}");
    }
}
