//! Combo challenge (quick-time event)
//!
//! Once per run the player is shown two keys and must hold both at the same
//! time before the countdown runs out. Pressing them one after the other does
//! not count; only a tick in which both are down does.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Keys a combo can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboKey {
    Q,
    W,
    E,
    R,
    A,
    S,
    D,
    F,
}

impl ComboKey {
    pub const ALL: [ComboKey; 8] = [
        ComboKey::Q,
        ComboKey::W,
        ComboKey::E,
        ComboKey::R,
        ComboKey::A,
        ComboKey::S,
        ComboKey::D,
        ComboKey::F,
    ];

    pub fn as_char(&self) -> char {
        match self {
            ComboKey::Q => 'Q',
            ComboKey::W => 'W',
            ComboKey::E => 'E',
            ComboKey::R => 'R',
            ComboKey::A => 'A',
            ComboKey::S => 'S',
            ComboKey::D => 'D',
            ComboKey::F => 'F',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_char() == c.to_ascii_uppercase())
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Snapshot of which combo keys are held this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeldKeys(u8);

impl HeldKeys {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, key: ComboKey) {
        self.0 |= key.bit();
    }

    pub fn remove(&mut self, key: ComboKey) {
        self.0 &= !key.bit();
    }

    pub fn contains(&self, key: ComboKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn contains_all(&self, keys: &[ComboKey]) -> bool {
        keys.iter().all(|k| self.contains(*k))
    }

    pub fn iter(&self) -> impl Iterator<Item = ComboKey> + '_ {
        ComboKey::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<ComboKey> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = ComboKey>>(iter: I) -> Self {
        let mut held = HeldKeys::empty();
        for key in iter {
            held.insert(key);
        }
        held
    }
}

/// Combo lifecycle once triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboPhase {
    Active,
    Succeeded,
    Failed,
}

/// A triggered combo challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboChallenge {
    /// Two distinct keys to hold together
    pub keys: [ComboKey; 2],
    /// Keys held on the most recent observed tick
    pub held: HeldKeys,
    /// Run time at which the challenge started
    pub activated_at: f32,
    pub duration: f32,
    pub phase: ComboPhase,
}

impl ComboChallenge {
    /// Draw two distinct keys uniformly and start the countdown at `now`
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, now: f32, duration: f32) -> Self {
        let picks = rand::seq::index::sample(rng, ComboKey::ALL.len(), 2);
        Self {
            keys: [ComboKey::ALL[picks.index(0)], ComboKey::ALL[picks.index(1)]],
            held: HeldKeys::empty(),
            activated_at: now,
            duration,
            phase: ComboPhase::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == ComboPhase::Active
    }

    pub fn succeeded(&self) -> bool {
        self.phase == ComboPhase::Succeeded
    }

    /// Absolute run time at which the challenge times out
    pub fn deadline(&self) -> f32 {
        self.activated_at + self.duration
    }

    /// Seconds left on the countdown (0 once expired)
    pub fn remaining(&self, now: f32) -> f32 {
        (self.duration - (now - self.activated_at)).max(0.0)
    }

    /// Record this tick's held keys. Returns true if the combo was completed now.
    pub fn observe(&mut self, held: HeldKeys) -> bool {
        if !self.is_active() {
            return false;
        }
        self.held = held;
        if held.contains_all(&self.keys) {
            self.phase = ComboPhase::Succeeded;
            true
        } else {
            false
        }
    }

    /// Fail the challenge if its time is up. Returns true if it timed out now.
    pub fn expire(&mut self, now: f32) -> bool {
        if self.is_active() && now - self.activated_at >= self.duration {
            self.phase = ComboPhase::Failed;
            true
        } else {
            false
        }
    }

    /// "Q + W" style label
    pub fn label(&self) -> String {
        format!("{} + {}", self.keys[0].as_char(), self.keys[1].as_char())
    }
}
