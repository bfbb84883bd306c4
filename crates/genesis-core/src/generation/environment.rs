//! Ambient scene dressing - clouds, traffic lanes, megastructures,
//! the particle field and the skybox.

use std::f64::consts::{PI, TAU};

use hecs::{Entity, World};

use super::random::SeededGenerator;
use crate::components::{
    yaw_towards_origin, CloudLayer, Color, InstanceTransform, Megastructure, ParticleField,
    Skybox, Spin, TrafficLane, Vec3,
};

pub const LANE_CONTROL_POINTS: usize = 5;
pub const LANE_TUBE_RADIUS: f32 = 4.0;
pub const PARTICLE_CEILING: f32 = 100.0;
pub const SKYBOX_RADIUS: f32 = 150_000.0;

/// Billboards on a wide band above the horizon, each turned toward the plaza
pub fn generate_clouds(world: &mut World, count: u32, generator: &mut SeededGenerator) -> Entity {
    let mut instances = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let theta = generator.next_float() * TAU;
        let phi = generator.next_float() * PI * 0.4;
        let radius = 800.0 + generator.next_float() * 700.0;
        let y = (generator.next_float() - 0.3) * 300.0;
        let scale = 1.5 + generator.next_float() * 2.0;

        let position = Vec3::new(
            (radius * phi.sin() * theta.cos()) as f32,
            y as f32,
            (radius * phi.sin() * theta.sin()) as f32,
        );
        instances.push(InstanceTransform {
            position,
            rotation: Vec3::new(pitch_towards_origin(position), yaw_towards_origin(position), 0.0),
            scale: scale as f32,
        });
    }

    world.spawn((CloudLayer {
        instances,
        color: Color::from_hex(0x221133),
        rotation: 0.0,
    },))
}

fn pitch_towards_origin(position: Vec3) -> f32 {
    let horizontal = (position.x * position.x + position.z * position.z).sqrt();
    (-position.y).atan2(horizontal)
}

/// Spline freeways wandering between the inner orbits
pub fn generate_traffic_lanes(world: &mut World, generator: &mut SeededGenerator) -> Vec<Entity> {
    let count = generator.count(3.0, 8.0);
    let mut lanes = Vec::with_capacity(count as usize);

    for id in 0..count {
        let mut angle = generator.next_float() * TAU;
        let mut radius = generator.range(2000.0, 8000.0);
        let height = generator.range(-1000.0, 1000.0);

        let mut control_points = Vec::with_capacity(LANE_CONTROL_POINTS);
        for _ in 0..LANE_CONTROL_POINTS {
            let y = height + generator.range(-500.0, 500.0);
            control_points.push(Vec3::new(
                (angle.cos() * radius) as f32,
                y as f32,
                (angle.sin() * radius) as f32,
            ));
            angle += generator.range(0.5, 1.5);
            radius += generator.range(-500.0, 500.0);
        }

        let color = Color::from_hsl(generator.next_float(), 1.0, 0.5);
        lanes.push(world.spawn((TrafficLane {
            id,
            control_points,
            color,
            tube_radius: LANE_TUBE_RADIUS,
        },)));
    }

    lanes
}

/// Giant tori far outside the plaza
pub fn generate_megastructures(world: &mut World, generator: &mut SeededGenerator) -> Vec<Entity> {
    let count = generator.count(2.0, 5.0);
    let mut structures = Vec::with_capacity(count as usize);

    for id in 0..count {
        let radius = generator.range(6000.0, 15000.0);
        let tube_radius = generator.range(50.0, 300.0);
        let tilt_x = generator.next_float() * PI;
        let tilt_y = generator.next_float() * PI;

        structures.push(world.spawn((
            Megastructure {
                id,
                radius: radius as f32,
                tube_radius: tube_radius as f32,
                tilt_x: tilt_x as f32,
                tilt_y: tilt_y as f32,
                spin_rate: 0.01 + id as f32 * 0.01,
            },
            Spin::default(),
        )));
    }

    structures
}

pub fn generate_particles(world: &mut World, count: u32, generator: &mut SeededGenerator) -> Entity {
    let count = count as usize;
    let mut positions = Vec::with_capacity(count);
    let mut sizes = Vec::with_capacity(count);
    let mut speeds = Vec::with_capacity(count);

    for _ in 0..count {
        let r = generator.next_float() * 200.0;
        let theta = generator.next_float() * TAU;
        let y = generator.next_float() * PARTICLE_CEILING as f64;
        positions.push(Vec3::new(
            (r * theta.cos()) as f32,
            y as f32,
            (r * theta.sin()) as f32,
        ));
        sizes.push(generator.next_float() as f32);
        speeds.push((0.2 + generator.next_float() * 0.8) as f32);
    }

    world.spawn((ParticleField {
        positions,
        sizes,
        speeds,
        flow: 1.0,
        rotation: 0.0,
        ceiling: PARTICLE_CEILING,
    },))
}

pub fn generate_skybox(world: &mut World) -> Entity {
    world.spawn((Skybox {
        radius: SKYBOX_RADIUS,
        rotation: 0.0,
    },))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clouds_use_five_draws_each() {
        let mut world = World::new();
        let mut generator = SeededGenerator::new(5);
        let entity = generate_clouds(&mut world, 40, &mut generator);
        assert_eq!(generator.draws(), 200);

        let clouds = world.get::<&CloudLayer>(entity).unwrap();
        assert_eq!(clouds.instances.len(), 40);
        for cloud in &clouds.instances {
            let horizontal = (cloud.position.x.powi(2) + cloud.position.z.powi(2)).sqrt();
            assert!(horizontal <= 1500.0);
            assert!(cloud.position.y >= -90.0 && cloud.position.y < 210.0);
            assert!(cloud.scale >= 1.5 && cloud.scale < 3.5);
        }
    }

    #[test]
    fn test_lane_shape() {
        let mut world = World::new();
        let mut generator = SeededGenerator::new(11);
        let lanes = generate_traffic_lanes(&mut world, &mut generator);
        assert!((3..8).contains(&lanes.len()));
        // count + per lane (3 + 5 * 3 + 1)
        assert_eq!(generator.draws(), 1 + lanes.len() as u64 * 19);

        for entity in lanes {
            let lane = world.get::<&TrafficLane>(entity).unwrap();
            assert_eq!(lane.control_points.len(), LANE_CONTROL_POINTS);
            assert_eq!(lane.tube_radius, 4.0);
        }
    }

    #[test]
    fn test_megastructure_spin_rates() {
        let mut world = World::new();
        let mut generator = SeededGenerator::new(3);
        let structures = generate_megastructures(&mut world, &mut generator);
        assert!((2..5).contains(&structures.len()));
        for (i, entity) in structures.into_iter().enumerate() {
            let ring = world.get::<&Megastructure>(entity).unwrap();
            assert!((ring.spin_rate - (0.01 + i as f32 * 0.01)).abs() < 1e-6);
            assert!((6000.0..15000.0).contains(&ring.radius));
            assert!((50.0..300.0).contains(&ring.tube_radius));
        }
    }

    #[test]
    fn test_particles_inside_column() {
        let mut world = World::new();
        let mut generator = SeededGenerator::new(9);
        let entity = generate_particles(&mut world, 500, &mut generator);
        assert_eq!(generator.draws(), 2500);

        let field = world.get::<&ParticleField>(entity).unwrap();
        assert_eq!(field.count(), 500);
        for (i, p) in field.positions.iter().enumerate() {
            assert!((p.x.powi(2) + p.z.powi(2)).sqrt() <= 200.0 + 1e-3);
            assert!(p.y >= 0.0 && p.y < 100.0);
            assert!(field.speeds[i] >= 0.2 && field.speeds[i] < 1.0 + 1e-6);
        }
    }
}
