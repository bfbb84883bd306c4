//! Gaze system - raycast against the core and the gaze pressure integrator

use hecs::World;
use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::components::{CoreEntity, Vec3};
use crate::config::SimConfig;
use crate::generation::SceneLayout;

/// Asymmetric integrator: charges while the core is in view, discharges
/// otherwise, always clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSignal {
    value: f32,
    charge_rate: f32,
    decay_rate: f32,
}

impl GazeSignal {
    pub fn new(charge_rate: f32, decay_rate: f32) -> Self {
        Self {
            value: 0.0,
            charge_rate,
            decay_rate,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.gaze_charge_rate, config.gaze_decay_rate)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn update(&mut self, intersecting: bool, dt: f32) -> f32 {
        self.value = if intersecting {
            (self.value + dt * self.charge_rate).min(1.0)
        } else {
            (self.value - dt * self.decay_rate).max(0.0)
        };
        self.value
    }
}

impl Default for GazeSignal {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

/// Whether a ray from `origin` along unit `direction` hits the sphere.
/// Spheres behind the origin never count.
pub fn ray_hits_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> bool {
    let to_center = center - origin;
    let along = to_center.dot(&direction);
    let closest_sq = to_center.dot(&to_center) - along * along;
    if closest_sq > radius * radius {
        return false;
    }
    // far intersection must be ahead of the origin
    let half_chord = (radius * radius - closest_sq).sqrt();
    along + half_chord >= 0.0
}

/// Does the view ray hit the core this frame
pub fn core_in_view(world: &World, layout: &SceneLayout, pose: &CameraPose) -> bool {
    match world.get::<&CoreEntity>(layout.core) {
        Ok(core) => ray_hits_sphere(pose.position, pose.forward(), core.center(), core.radius),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_clamps_at_one() {
        let mut gaze = GazeSignal::default();
        let mut t = 0.0;
        while t < 0.6 - 1e-9 {
            gaze.update(true, 0.05);
            t += 0.05;
        }
        assert_eq!(gaze.value(), 1.0);
    }

    #[test]
    fn test_charge_twice_as_fast_as_decay() {
        let mut gaze = GazeSignal::default();
        gaze.update(true, 0.25);
        assert!((gaze.value() - 0.5).abs() < 1e-6);
        gaze.update(false, 0.25);
        assert!((gaze.value() - 0.25).abs() < 1e-6);
        gaze.update(false, 10.0);
        assert_eq!(gaze.value(), 0.0);
    }

    #[test]
    fn test_ray_sphere() {
        let origin = Vec3::new(0.0, 4.0, 40.0);
        let ahead = Vec3::new(0.0, 0.0, -1.0);
        let core = Vec3::new(0.0, 4.0, 0.0);
        assert!(ray_hits_sphere(origin, ahead, core, 1.5));
        assert!(!ray_hits_sphere(origin, Vec3::new(0.0, 0.0, 1.0), core, 1.5));
        assert!(!ray_hits_sphere(Vec3::new(2.0, 4.0, 40.0), ahead, core, 1.5));
        // grazing the rim
        assert!(ray_hits_sphere(Vec3::new(1.5, 4.0, 40.0), ahead, core, 1.5));
    }
}
