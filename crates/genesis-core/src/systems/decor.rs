//! Decor system - idle motion of the obelisks, particles, clouds,
//! skybox and megastructures.

use hecs::World;

use crate::components::{CloudLayer, Megastructure, Obelisk, ParticleField, Skybox, Spin};
use crate::generation::CROWN_HEIGHT;

pub const CROWN_SPIN_RATE: f32 = 0.5;
/// Particle rise is authored per 60 Hz frame
const PARTICLE_RISE: f32 = 0.05;

pub fn obelisk_system(world: &mut World, time: f64, dt: f32) {
    for (_, obelisk) in world.query_mut::<&mut Obelisk>() {
        let offset = obelisk.index as f64;
        obelisk.sway = (time * 0.5 + offset).sin() as f32 * 0.005;
        obelisk.crown_spin += CROWN_SPIN_RATE * dt;
        obelisk.crown_height = CROWN_HEIGHT + (time * 2.0 + offset).sin() as f32 * 0.3;
    }
}

/// Motes rise at their own speed scaled by the field's flow and wrap at
/// the ceiling.
pub fn particle_system(world: &mut World, time: f64, dt: f32) {
    let frames = dt * 60.0;
    for (_, field) in world.query_mut::<&mut ParticleField>() {
        let rise = PARTICLE_RISE * field.flow * frames;
        let ceiling = field.ceiling;
        for (position, speed) in field.positions.iter_mut().zip(&field.speeds) {
            position.y += speed * rise;
            if position.y > ceiling {
                position.y = 0.0;
            }
        }
        field.rotation = (time * 0.01) as f32 * field.flow;
    }
}

pub fn decor_system(world: &mut World, time: f64, dt: f32) {
    obelisk_system(world, time, dt);
    particle_system(world, time, dt);

    for (_, clouds) in world.query_mut::<&mut CloudLayer>() {
        clouds.rotation = (time * 0.02) as f32;
    }
    for (_, skybox) in world.query_mut::<&mut Skybox>() {
        skybox.rotation = (time * 0.005) as f32;
    }
    for (_, (structure, spin)) in world.query_mut::<(&Megastructure, &mut Spin)>() {
        spin.angle += structure.spin_rate * dt;
    }
}
