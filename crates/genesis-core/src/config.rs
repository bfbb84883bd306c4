//! Engine configuration.
//!
//! Every section has a `Default` matching the stock experience and is
//! `#[serde(default)]`, so a JSON file only needs the fields it overrides:
//!
//! ```json
//! { "world": { "seed": 42 }, "sim": { "lock_cooldown": 0.8 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::Vec3;
use crate::error::ConfigError;
use crate::generation::DEFAULT_SEED;

/// Upper bound for the ambient particle field
pub const MAX_PARTICLES: u32 = 100_000;

/// Inputs to world generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u64,
    pub cloud_count: u32,
    pub particle_count: u32,
    /// Whether the portal starts open (runs the activation once at load)
    pub initial_portal_open: bool,
    pub initial_portal_color: String,
    pub initial_portal_description: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            cloud_count: 40,
            particle_count: 8000,
            initial_portal_open: true,
            initial_portal_color: "#00ffff".to_string(),
            initial_portal_description: "System Ready".to_string(),
        }
    }
}

/// Per-frame simulation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Velocity decay rate per second
    pub movement_damping: f32,
    /// Acceleration from a held movement key
    pub movement_acceleration: f32,
    /// Radians per pixel of pointer motion
    pub look_sensitivity: f32,
    /// Gaze pressure gained per second while the core is hovered
    pub gaze_charge_rate: f32,
    /// Gaze pressure lost per second otherwise
    pub gaze_decay_rate: f32,
    /// Seconds after a lock release during which lock requests are ignored
    pub lock_cooldown: f64,
    /// Seconds a lock request may stay unanswered
    pub lock_pending_timeout: f64,
    /// Shake magnitude decay rate per second
    pub shake_decay: f32,
    pub camera_start: Vec3,
    /// Vertical field of view, degrees
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            movement_damping: 5.0,
            movement_acceleration: 40.0,
            look_sensitivity: 0.002,
            gaze_charge_rate: 2.0,
            gaze_decay_rate: 1.0,
            lock_cooldown: 1.2,
            lock_pending_timeout: 1.0,
            shake_decay: 2.0,
            camera_start: Vec3::new(0.0, 1.7, 40.0),
            field_of_view: 60.0,
            near_plane: 0.1,
            far_plane: 300_000.0,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

/// Generative score settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub tempo_bpm: f32,
    pub master_volume_db: f32,
    pub pad_volume_db: f32,
    pub bass_volume_db: f32,
    pub arp_volume_db: f32,
    /// Volume the music voices fall to while unlocked
    pub muted_volume_db: f32,
    /// Seconds after unlocking before the transport stops
    pub transport_stop_delay: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 65.0,
            master_volume_db: -5.0,
            pad_volume_db: -15.0,
            bass_volume_db: -10.0,
            arp_volume_db: -18.0,
            muted_volume_db: -60.0,
            transport_stop_delay: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    pub sim: SimConfig,
    pub audio: AudioConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.particle_count > MAX_PARTICLES {
            return Err(ConfigError::Invalid {
                field: "world.particle_count",
                reason: format!("at most {} particles", MAX_PARTICLES),
            });
        }

        let rates = [
            ("sim.movement_damping", self.sim.movement_damping),
            ("sim.movement_acceleration", self.sim.movement_acceleration),
            ("sim.look_sensitivity", self.sim.look_sensitivity),
            ("sim.gaze_charge_rate", self.sim.gaze_charge_rate),
            ("sim.gaze_decay_rate", self.sim.gaze_decay_rate),
            ("sim.shake_decay", self.sim.shake_decay),
            ("sim.field_of_view", self.sim.field_of_view),
            ("sim.near_plane", self.sim.near_plane),
            ("audio.tempo_bpm", self.audio.tempo_bpm),
        ];
        for (field, value) in rates {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }

        if self.sim.lock_cooldown < 0.0 || self.sim.lock_pending_timeout <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sim.lock_cooldown",
                reason: "cooldown must be >= 0 and pending timeout > 0".to_string(),
            });
        }
        if self.sim.far_plane <= self.sim.near_plane {
            return Err(ConfigError::Invalid {
                field: "sim.far_plane",
                reason: "must be beyond the near plane".to_string(),
            });
        }
        if self.sim.viewport_width == 0 || self.sim.viewport_height == 0 {
            return Err(ConfigError::Invalid {
                field: "sim.viewport_width",
                reason: "viewport must be non-empty".to_string(),
            });
        }
        if crate::components::Color::parse_hex(&self.world.initial_portal_color).is_none() {
            return Err(ConfigError::Invalid {
                field: "world.initial_portal_color",
                reason: format!("'{}' is not #RRGGBB", self.world.initial_portal_color),
            });
        }
        Ok(())
    }
}
