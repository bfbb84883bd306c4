//! First-person camera: pose, look controls and perspective projection.
//!
//! Yaw 0 looks down -Z; positive pitch looks up.

use serde::{Deserialize, Serialize};

use crate::components::Vec3;
use crate::config::SimConfig;
use crate::error::EngineError;

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2;

/// The stable camera transform plus its damped locomotion velocity.
/// Shake never writes here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Velocity along the horizontal forward axis
    pub forward_speed: f32,
    /// Velocity along the right axis
    pub strafe_speed: f32,
}

impl CameraRig {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            forward_speed: 0.0,
            strafe_speed: 0.0,
        }
    }

    /// View direction
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Forward projected onto the floor plane
    pub fn horizontal_forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(-sy, 0.0, -cy)
    }

    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(&self.forward())
    }

    /// Apply pointer motion in pixels
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }
}

/// What the renderer draws from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraPose {
    fn rig(&self) -> CameraRig {
        CameraRig {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
            forward_speed: 0.0,
            strafe_speed: 0.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rig().forward()
    }

    /// Same orientation, displaced by `offset`
    pub fn offset(&self, offset: Vec3) -> CameraPose {
        CameraPose {
            position: self.position + offset,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view, degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: Viewport,
}

impl Projection {
    pub fn from_config(config: &SimConfig, viewport: Viewport) -> Self {
        Self {
            fov_y: config.field_of_view,
            near: config.near_plane,
            far: config.far_plane,
            viewport,
        }
    }

    /// Normalized device coordinates of `point`, or None when it is
    /// behind the near plane or past the far plane
    pub fn project(&self, pose: &CameraPose, point: Vec3) -> Option<(f32, f32)> {
        let rig = pose.rig();
        let d = point - pose.position;
        let depth = d.dot(&rig.forward());
        if depth <= self.near || depth > self.far {
            return None;
        }
        let half_height = (self.fov_y.to_radians() / 2.0).tan() * depth;
        let half_width = half_height * self.viewport.aspect();
        Some((d.dot(&rig.right()) / half_width, d.dot(&rig.up()) / half_height))
    }

    /// NDC to pixels, origin at the top left
    pub fn to_screen(&self, ndc: (f32, f32)) -> (f32, f32) {
        (
            (ndc.0 * 0.5 + 0.5) * self.viewport.width as f32,
            (-ndc.1 * 0.5 + 0.5) * self.viewport.height as f32,
        )
    }
}
