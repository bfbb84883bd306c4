//! Locomotion system - damped first-person movement from held keys

use crate::camera::CameraRig;
use crate::config::SimConfig;
use crate::input::MovementKeys;

/// Integrate one frame of movement. Velocity decays at the damping rate
/// and held keys accelerate along the camera's horizontal axes.
pub fn locomotion_system(rig: &mut CameraRig, keys: &MovementKeys, config: &SimConfig, dt: f32) {
    let decay = (1.0 - config.movement_damping * dt).max(0.0);
    rig.forward_speed *= decay;
    rig.strafe_speed *= decay;

    let (forward, right) = keys.direction();
    if keys.forward || keys.backward {
        rig.forward_speed += forward * config.movement_acceleration * dt;
    }
    if keys.left || keys.right {
        rig.strafe_speed += right * config.movement_acceleration * dt;
    }

    let step = rig.horizontal_forward() * (rig.forward_speed * dt) + rig.right() * (rig.strafe_speed * dt);
    rig.position += step;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec3;
    use crate::input::Key;

    #[test]
    fn test_forward_moves_down_negative_z() {
        let config = SimConfig::default();
        let mut rig = CameraRig::new(Vec3::new(0.0, 1.7, 40.0));
        let mut keys = MovementKeys::default();
        keys.set(Key::Forward, true);

        for _ in 0..60 {
            locomotion_system(&mut rig, &keys, &config, 1.0 / 60.0);
        }
        assert!(rig.position.z < 40.0);
        assert_eq!(rig.position.y, 1.7);
        assert!(rig.position.x.abs() < 1e-4);
    }

    #[test]
    fn test_velocity_damps_to_rest() {
        let config = SimConfig::default();
        let mut rig = CameraRig::new(Vec3::ZERO);
        rig.strafe_speed = 8.0;
        let keys = MovementKeys::default();

        for _ in 0..600 {
            locomotion_system(&mut rig, &keys, &config, 1.0 / 60.0);
        }
        assert!(rig.strafe_speed.abs() < 1e-3);
        assert!(rig.position.x > 0.0);
    }

    #[test]
    fn test_terminal_speed() {
        // steady state where damping cancels acceleration: a / damping
        let config = SimConfig::default();
        let mut rig = CameraRig::new(Vec3::ZERO);
        let mut keys = MovementKeys::default();
        keys.set(Key::Backward, true);
        for _ in 0..1200 {
            locomotion_system(&mut rig, &keys, &config, 1.0 / 60.0);
        }
        let terminal = config.movement_acceleration / config.movement_damping;
        assert!((rig.forward_speed + terminal).abs() < 0.5);
    }
}
