//! Landmark generation - floor, core, obelisk ring and portal plane.
//!
//! None of these consume generator draws; their placement is fixed geometry.

use std::f32::consts::{PI, TAU};

use hecs::{Entity, World};

use crate::components::{
    yaw_towards_origin, Color, CoreEntity, Floor, Obelisk, ObeliskRing, PortalPlane, Vec3,
};

pub const FLOOR_RADIUS: f32 = 120.0;
pub const OBELISK_COUNT: u32 = 8;
/// Radius of the circle the obelisks stand on
pub const PLACEMENT_RADIUS: f32 = 112.0;
pub const CROWN_HEIGHT: f32 = 92.0;
/// Angle (radians) of the chord the portal fills
pub const PORTAL_ANGLE: f32 = PI * 1.625;
pub const PORTAL_HEIGHT: f32 = 45.0;

pub fn generate_floor(world: &mut World) -> Entity {
    world.spawn((Floor {
        radius: FLOOR_RADIUS,
        grid_base: Color::from_hex(0x0088ff),
        grid_pulse: Color::WHITE,
    },))
}

pub fn generate_core(world: &mut World) -> Entity {
    world.spawn((CoreEntity::new(),))
}

/// Spawn the eight obelisks and the shared ring entity that drives them
pub fn generate_obelisk_ring(world: &mut World) -> (Entity, Vec<Entity>) {
    let mut members = Vec::with_capacity(OBELISK_COUNT as usize);

    for index in 0..OBELISK_COUNT {
        let angle = index as f32 / OBELISK_COUNT as f32 * TAU;
        let position = Vec3::new(
            angle.cos() * PLACEMENT_RADIUS,
            0.0,
            angle.sin() * PLACEMENT_RADIUS,
        );
        let obelisk = Obelisk {
            index,
            position,
            yaw: yaw_towards_origin(position),
            sway: 0.0,
            crown_height: CROWN_HEIGHT,
            crown_spin: 0.0,
        };
        members.push(world.spawn((obelisk,)));
    }

    let ring = world.spawn((ObeliskRing {
        radius: PLACEMENT_RADIUS,
        members: members.clone(),
        activation: 0.0,
        color: Color::CYAN,
        crown_scale: 1.0,
    },));

    (ring, members)
}

/// Width of the gap between two neighbouring obelisks
pub fn portal_chord_width() -> f32 {
    let half_angle = PI / OBELISK_COUNT as f32;
    2.0 * PLACEMENT_RADIUS * half_angle.sin()
}

pub fn generate_portal(world: &mut World) -> Entity {
    let half_angle = PI / OBELISK_COUNT as f32;
    let chord_distance = PLACEMENT_RADIUS * half_angle.cos();
    let width = portal_chord_width();
    let position = Vec3::new(
        PORTAL_ANGLE.cos() * chord_distance,
        PORTAL_HEIGHT,
        PORTAL_ANGLE.sin() * chord_distance,
    );

    world.spawn((PortalPlane {
        position,
        yaw: yaw_towards_origin(position),
        width,
        height: width,
        openness: 0.0,
        color: Color::RED,
    },))
}
