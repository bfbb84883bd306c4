//! Orbit system - positions planets and turns belts.
//!
//! Both are pure functions of elapsed time, so a long frame never
//! accumulates drift.

use hecs::World;

use crate::components::{AsteroidBelt, BeltState, Mat3, OrbitState, OrbitingBody, Vec3};
use crate::generation::SOLAR_TILT;

/// Orbit speeds are authored ten times faster than they play
pub const ORBIT_TIME_SCALE: f64 = 0.1;
/// Planet self-rotation, radians per second
pub const PLANET_SPIN_RATE: f64 = 0.05;

/// World position of a planet at time `t`
pub fn planet_position(body: &OrbitingBody, t: f64) -> (f32, Vec3) {
    let theta = (body.phase as f64 + t * body.angular_speed as f64 * ORBIT_TIME_SCALE) as f32;
    let local = Vec3::new(theta.cos() * body.distance, 0.0, theta.sin() * body.distance);
    let tilted = body.tilt.apply(local);
    (theta, Mat3::rotation_z(SOLAR_TILT).apply(tilted))
}

pub fn orbit_system(world: &mut World, time: f64) {
    for (_, (body, state)) in world.query_mut::<(&OrbitingBody, &mut OrbitState)>() {
        let (theta, position) = planet_position(body, time);
        state.theta = theta;
        state.position = position;
        state.spin = (time * PLANET_SPIN_RATE) as f32;
    }

    for (_, (belt, state)) in world.query_mut::<(&AsteroidBelt, &mut BeltState)>() {
        state.rotation = belt.rotation_at(time);
    }
}
