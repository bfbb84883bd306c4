//! Landmark components: the floor, the core, the obelisk ring, the portal
//! and the ambient dressing around them.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::common::{Color, InstanceTransform, Vec3};

/// Mirror floor with the additive grid on top
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub radius: f32,
    pub grid_base: Color,
    pub grid_pulse: Color,
}

/// The central reactive object. All mutable fields are eased toward
/// their targets every frame, never snapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreEntity {
    pub radius: f32,
    pub flare_radius: f32,
    pub base_height: f32,
    /// Current height after the idle bob
    pub height: f32,
    /// Animation rate multiplier
    pub pulse_speed: f32,
    /// Simulated loudness driving surface deformation
    pub audio_level: f32,
    /// Choreographed burst layered over `audio_level`
    pub audio_burst: f32,
    pub color: Color,
    pub color_target: Color,
    pub accent: Color,
    pub flare_color: Color,
    /// How much of the surface ignites (lower = more flare)
    pub flare_threshold: f32,
    /// Flare shell rotation (y, z), radians
    pub flare_spin: (f32, f32),
    pub light_intensity: f32,
    pub light_color: Color,
    /// Halo ring angles
    pub halo: [f32; 3],
}

impl CoreEntity {
    pub fn new() -> Self {
        Self {
            radius: 1.5,
            flare_radius: 1.65,
            base_height: 4.0,
            height: 4.0,
            pulse_speed: 1.0,
            audio_level: 0.0,
            audio_burst: 0.0,
            color: Color::CYAN,
            color_target: Color::CYAN,
            accent: Color::MAGENTA,
            flare_color: Color::CYAN,
            flare_threshold: 0.8,
            flare_spin: (0.0, 0.0),
            light_intensity: 3.0,
            light_color: Color::CYAN,
            halo: [0.0; 3],
        }
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(0.0, self.height, 0.0)
    }

    /// Level fed to the surface shader
    pub fn effective_audio_level(&self) -> f32 {
        self.audio_level.max(self.audio_burst)
    }
}

impl Default for CoreEntity {
    fn default() -> Self {
        Self::new()
    }
}

/// Halo ring radii around the core
pub const HALO_RADII: [f32; 3] = [8.0, 12.0, 15.0];

/// One member of the obelisk ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obelisk {
    pub index: u32,
    pub position: Vec3,
    /// Heading that faces the center
    pub yaw: f32,
    /// Small idle sway around Z
    pub sway: f32,
    pub crown_height: f32,
    pub crown_spin: f32,
}

/// Shared instrument state broadcast to every obelisk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObeliskRing {
    pub radius: f32,
    /// Ring member entities in placement order
    #[serde(skip)]
    pub members: Vec<Entity>,
    pub activation: f32,
    pub color: Color,
    pub crown_scale: f32,
}

/// The curtain that fills the gap between two obelisks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortalPlane {
    pub position: Vec3,
    pub yaw: f32,
    pub width: f32,
    pub height: f32,
    /// Curtain openness 0..1
    pub openness: f32,
    pub color: Color,
}

/// Distant billboard clouds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub instances: Vec<InstanceTransform>,
    pub color: Color,
    pub rotation: f32,
}

/// Ambient motes rising around the plaza
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleField {
    pub positions: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub speeds: Vec<f32>,
    /// Flow speed multiplier; the choreographer warps it
    pub flow: f32,
    pub rotation: f32,
    /// Height at which motes wrap back to the floor
    pub ceiling: f32,
}

impl ParticleField {
    pub fn count(&self) -> usize {
        self.positions.len()
    }
}

/// Nebula sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skybox {
    pub radius: f32,
    pub rotation: f32,
}

/// Full-screen post chain and camera shake
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cinematics {
    pub camera_shake: f32,
    pub aberration: f32,
    pub vignette: f32,
    pub grain: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
}

impl Default for Cinematics {
    fn default() -> Self {
        Self {
            camera_shake: 0.0,
            aberration: 0.0015,
            vignette: 0.4,
            grain: 0.0,
            bloom_strength: 0.0,
            bloom_radius: 0.4,
            bloom_threshold: 0.85,
        }
    }
}
