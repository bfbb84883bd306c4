//! Camera shake - decays the shake magnitude and produces the jitter
//! offset for this frame's render pose.

use rand::Rng;

use crate::components::{Cinematics, Vec3};

/// Below this the camera is considered still
pub const SHAKE_EPSILON: f32 = 0.001;

/// Returns the jitter to add to the rendered camera. The stored camera
/// is never touched.
pub fn shake_system(fx: &mut Cinematics, decay_rate: f32, dt: f32, rng: &mut impl Rng) -> Vec3 {
    if fx.camera_shake <= SHAKE_EPSILON {
        return Vec3::ZERO;
    }
    let amount = fx.camera_shake;
    let jitter = Vec3::new(
        (rng.gen::<f32>() - 0.5) * amount,
        (rng.gen::<f32>() - 0.5) * amount,
        (rng.gen::<f32>() - 0.5) * amount,
    );
    fx.camera_shake *= (1.0 - dt * decay_rate).max(0.0);
    jitter
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shake_decays_and_stays_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut fx = Cinematics {
            camera_shake: 1.5,
            ..Default::default()
        };
        let mut previous = fx.camera_shake;
        for _ in 0..120 {
            let jitter = shake_system(&mut fx, 2.0, 1.0 / 60.0, &mut rng);
            assert!(jitter.x.abs() <= previous / 2.0);
            assert!(fx.camera_shake < previous);
            previous = fx.camera_shake;
        }
        assert!(fx.camera_shake < 0.5);
    }

    #[test]
    fn test_still_camera_has_no_jitter() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut fx = Cinematics::default();
        assert_eq!(shake_system(&mut fx, 2.0, 0.016, &mut rng), Vec3::ZERO);
    }
}
