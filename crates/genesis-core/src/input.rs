//! Input surface - the keys and pointer events the engine understands.

use serde::{Deserialize, Serialize};

/// Logical keys. Hosts map physical keys onto these (W/S/A/D and V on
/// the desktop viewer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Speak,
}

/// Host events, fed to the engine through [`crate::engine::Experience::handle`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    Click,
    PointerMotion { dx: f32, dy: f32 },
    /// The host acquired pointer capture
    LockAcquired,
    /// The host released pointer capture (escape, focus loss)
    LockReleased,
    /// A capture request was refused
    LockFailed,
    Resize { width: u32, height: u32 },
    /// Partial transcript from the speech engine
    Transcript(String),
}

/// Which movement keys are held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementKeys {
    /// Record a key edge. Returns false for non-movement keys.
    pub fn set(&mut self, key: Key, held: bool) -> bool {
        match key {
            Key::Forward => self.forward = held,
            Key::Backward => self.backward = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Speak => return false,
        }
        true
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// (forward, right) intent, each in -1..1, normalized as a pair
    pub fn direction(&self) -> (f32, f32) {
        let forward = self.forward as i32 as f32 - self.backward as i32 as f32;
        let right = self.right as i32 as f32 - self.left as i32 as f32;
        let length = (forward * forward + right * right).sqrt();
        if length > 0.0 {
            (forward / length, right / length)
        } else {
            (0.0, 0.0)
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
