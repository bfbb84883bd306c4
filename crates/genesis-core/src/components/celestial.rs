//! Solar system components: planets, asteroid belts, traffic lanes, megastructures.

use serde::{Deserialize, Serialize};

use super::common::{Color, InstanceTransform, Mat3, Vec3};

/// Surface family of a generated planet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetType {
    /// Oceans and continents, fixed HSL bands
    Terrestrial,
    /// Banded gas giant, two random hues
    Gaseous,
    /// Cracked crust over lava, fixed ember triad
    Molten,
    /// Frozen shell with a pale atmosphere
    Icy,
}

impl PlanetType {
    pub const ALL: [PlanetType; 4] = [
        PlanetType::Terrestrial,
        PlanetType::Gaseous,
        PlanetType::Molten,
        PlanetType::Icy,
    ];

    /// Map a draw in 0..4 onto a type (the shader's `uType` index)
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index as usize).min(Self::ALL.len() - 1)]
    }

    pub fn index(&self) -> u32 {
        match self {
            PlanetType::Terrestrial => 0,
            PlanetType::Gaseous => 1,
            PlanetType::Molten => 2,
            PlanetType::Icy => 3,
        }
    }

    /// Molten worlds burn off their atmosphere
    pub fn has_atmosphere(&self) -> bool {
        !matches!(self, PlanetType::Molten)
    }

    pub fn atmosphere_color(&self) -> Color {
        match self {
            PlanetType::Icy => Color::from_hex(0x88ffff),
            _ => Color::from_hex(0x44aaff),
        }
    }
}

/// Three surface colors fed to the planet shader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Ocean / base / crust
    pub primary: Color,
    /// Land / band / lava
    pub secondary: Color,
    /// Mountain / detail / hotspots
    pub detail: Color,
}

impl Palette {
    pub fn colors(&self) -> [Color; 3] {
        [self.primary, self.secondary, self.detail]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetRing {
    /// Edge length of the ring plane
    pub size: f32,
    /// Tilt around X, radians
    pub tilt: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    pub radius: f32,
    pub color: Color,
}

/// A planet on a fixed orbit. Immutable after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitingBody {
    pub id: u32,
    /// Orbital radius
    pub distance: f32,
    /// Body radius
    pub radius: f32,
    pub angular_speed: f32,
    /// Phase at t = 0, radians
    pub phase: f32,
    /// Rotation applied to the orbit plane
    pub tilt: Mat3,
    pub visual_type: PlanetType,
    pub palette: Palette,
    pub ring: Option<PlanetRing>,
    pub atmosphere: Option<Atmosphere>,
}

impl OrbitingBody {
    pub fn has_ring(&self) -> bool {
        self.ring.is_some()
    }

    pub fn has_atmosphere(&self) -> bool {
        self.atmosphere.is_some()
    }
}

/// Derived per-frame orbit cache, the only mutable part of a planet
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    /// Effective phase angle this frame
    pub theta: f32,
    /// World position (solar group tilt included)
    pub position: Vec3,
    /// Self-rotation around the body's Y axis
    pub spin: f32,
}

/// A ring of instanced rocks. Members never move individually;
/// the whole belt rotates as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidBelt {
    pub id: u32,
    /// Center radius of the belt
    pub distance: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub vertical_spread: f32,
    pub color: Color,
    pub rock_scale: f32,
    /// Seconds per full revolution
    pub period: f32,
    /// +1 or -1
    pub direction: f32,
    pub instances: Vec<InstanceTransform>,
}

impl AsteroidBelt {
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    pub fn width(&self) -> f32 {
        self.outer_radius - self.inner_radius
    }

    /// Bulk rotation at time `t`
    pub fn rotation_at(&self, t: f64) -> f32 {
        let turns = (t / self.period as f64).fract();
        (turns * std::f64::consts::TAU) as f32 * self.direction
    }
}

/// Per-frame belt state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BeltState {
    pub rotation: f32,
    /// Intro fade-in, 0..1
    pub reveal: f32,
}

/// One step of a solar-system placement, in placement order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitSlot {
    Planet,
    Belt,
}

/// Glowing spline freeway between the planets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLane {
    pub id: u32,
    pub control_points: Vec<Vec3>,
    pub color: Color,
    pub tube_radius: f32,
}

/// Colossal torus structure spinning slowly in the distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Megastructure {
    pub id: u32,
    pub radius: f32,
    pub tube_radius: f32,
    /// Fixed tilt (x, y) in radians
    pub tilt_x: f32,
    pub tilt_y: f32,
    /// Radians per second around the local Z axis
    pub spin_rate: f32,
}

/// Accumulated spin of a decorative structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub angle: f32,
}
