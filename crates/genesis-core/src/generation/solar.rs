//! Solar system generation - alternating planets and asteroid belts on
//! increasing orbits.
//!
//! Distances accumulate: every entry first adds a random radial gap, then
//! a draw decides whether it becomes a belt or a planet. Belts reserve an
//! extra fixed gap after themselves.

use std::f64::consts::{PI, TAU};

use hecs::{Entity, World};

use super::random::SeededGenerator;
use crate::components::{
    AsteroidBelt, Atmosphere, BeltState, Color, InstanceTransform, Mat3, OrbitSlot, OrbitState,
    OrbitingBody, Palette, PlanetRing, PlanetType, Vec3,
};

/// Orbit radius the placement starts from
pub const FIRST_ORBIT: f64 = 3000.0;
/// Smallest radial gap between consecutive entries
pub const MIN_ORBIT_GAP: f64 = 3000.0;
pub const MAX_ORBIT_GAP: f64 = 10000.0;
/// Extra clearance reserved after each asteroid belt
pub const BELT_CLEARANCE: f64 = 2000.0;
/// Fixed roll of the whole solar group around Z
pub const SOLAR_TILT: f32 = std::f32::consts::PI * 0.05;

const BELT_CHANCE: f64 = 0.7;
const RING_CHANCE: f64 = 0.7;

/// Entities produced by one solar-system pass
#[derive(Debug, Clone, Default)]
pub struct SolarSystem {
    /// Every entry in placement order
    pub slots: Vec<(OrbitSlot, Entity)>,
    pub planets: Vec<Entity>,
    pub belts: Vec<Entity>,
}

pub fn generate_solar_system(world: &mut World, generator: &mut SeededGenerator) -> SolarSystem {
    let mut system = SolarSystem::default();
    let entries = generator.count(3.0, 7.0);
    let mut current_distance = FIRST_ORBIT;

    for id in 0..entries {
        current_distance += generator.range(MIN_ORBIT_GAP, MAX_ORBIT_GAP);

        if generator.next_float() > BELT_CHANCE {
            let belt = create_belt(generator, id, current_distance);
            let entity = world.spawn((belt, BeltState::default()));
            system.slots.push((OrbitSlot::Belt, entity));
            system.belts.push(entity);
            current_distance += BELT_CLEARANCE;
        } else {
            let body = create_planet(generator, id, current_distance);
            let entity = world.spawn((body, OrbitState::default()));
            system.slots.push((OrbitSlot::Planet, entity));
            system.planets.push(entity);
        }
    }

    system
}

/// Draw one planet. The draw order is fixed; see the module docs.
pub fn create_planet(generator: &mut SeededGenerator, id: u32, distance: f64) -> OrbitingBody {
    let radius = generator.range(100.0, 2000.0);
    let visual_type = PlanetType::from_index((generator.next_float() * 4.0).floor() as u32);

    let random = Palette {
        primary: generator.color(),
        secondary: generator.color(),
        detail: generator.color(),
    };
    let palette = match visual_type {
        PlanetType::Terrestrial => Palette {
            primary: Color::from_hsl(0.6, 0.8, 0.2),
            secondary: Color::from_hsl(0.3, 0.6, 0.3),
            detail: Color::from_hsl(0.1, 0.5, 0.5),
        },
        PlanetType::Gaseous => {
            let primary = Color::from_hsl(generator.next_float(), 0.6, 0.4);
            let secondary = Color::from_hsl(generator.next_float(), 0.6, 0.4);
            Palette {
                primary,
                secondary,
                detail: random.detail,
            }
        }
        PlanetType::Molten => Palette {
            primary: Color::new(0.2, 0.1, 0.1),
            secondary: Color::new(1.0, 0.4, 0.0),
            detail: Color::new(1.0, 0.9, 0.5),
        },
        PlanetType::Icy => random,
    };

    let angular_speed = generator.range(0.005, 0.05);
    let inclination = generator.next_float() - 0.5;
    let axis_x = generator.next_float() - 0.5;
    let axis_z = generator.next_float() - 0.5;
    let phase = generator.next_float() * TAU;
    let has_ring = generator.next_float() > RING_CHANCE;

    let axis = Vec3::new(axis_x as f32, 0.0, axis_z as f32).normalize();
    let tilt = if axis == Vec3::ZERO {
        Mat3::IDENTITY
    } else {
        Mat3::from_axis_angle(axis, inclination as f32)
    };

    let radius = radius as f32;
    OrbitingBody {
        id,
        distance: distance as f32,
        radius,
        angular_speed: angular_speed as f32,
        phase: phase as f32,
        tilt,
        visual_type,
        palette,
        ring: has_ring.then(|| PlanetRing {
            size: radius * 3.5,
            tilt: std::f32::consts::PI * 0.4,
            color: palette.primary,
        }),
        atmosphere: visual_type.has_atmosphere().then(|| Atmosphere {
            radius: radius * 1.2,
            color: visual_type.atmosphere_color(),
        }),
    }
}

/// Draw one asteroid belt centred on `distance`
pub fn create_belt(generator: &mut SeededGenerator, id: u32, distance: f64) -> AsteroidBelt {
    let count = generator.count(500.0, 2000.0);
    let width = generator.range(1000.0, 5000.0);
    let inner = distance - width / 2.0;
    let outer = distance + width / 2.0;
    let color = Color::from_hsl(generator.next_float(), 0.1, 0.4);
    let rock_scale = generator.range(100.0, 400.0);
    let vertical_spread = (outer - inner) * 0.4;

    let mut instances = Vec::with_capacity(count as usize);
    for _ in 0..count {
        // area-uniform radius inside the annulus
        let r = (generator.next_float() * (outer * outer - inner * inner) + inner * inner).sqrt();
        let theta = generator.next_float() * TAU;
        let y = (generator.next_float() - 0.5) * vertical_spread;
        let rotation = Vec3::new(
            (generator.next_float() * PI) as f32,
            (generator.next_float() * PI) as f32,
            (generator.next_float() * PI) as f32,
        );
        let scale = rock_scale * (0.5 + generator.next_float() * 1.5);
        instances.push(InstanceTransform {
            position: Vec3::new((r * theta.cos()) as f32, y as f32, (r * theta.sin()) as f32),
            rotation,
            scale: scale as f32,
        });
    }

    let period = generator.range(800.0, 1200.0);
    let direction = if generator.next_float() > 0.5 { 1.0 } else { -1.0 };

    AsteroidBelt {
        id,
        distance: distance as f32,
        inner_radius: inner as f32,
        outer_radius: outer as f32,
        vertical_spread: vertical_spread as f32,
        color,
        rock_scale: rock_scale as f32,
        period: period as f32,
        direction,
        instances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_draw_count() {
        // radius, type, 9 colour channels, speed, inclination, axis x/z, phase, ring
        let mut generator = SeededGenerator::new(1234);
        let body = create_planet(&mut generator, 0, 5000.0);
        let expected = if body.visual_type == PlanetType::Gaseous { 19 } else { 17 };
        assert_eq!(generator.draws(), expected);
    }

    #[test]
    fn test_belt_draw_count() {
        let mut generator = SeededGenerator::new(4321);
        let belt = create_belt(&mut generator, 0, 8000.0);
        assert_eq!(generator.draws(), 4 + belt.count() as u64 * 7 + 2);
    }

    #[test]
    fn test_belt_instances_inside_annulus() {
        let mut generator = SeededGenerator::new(77);
        let belt = create_belt(&mut generator, 0, 10000.0);
        assert!((500..2000).contains(&belt.count()));
        for rock in &belt.instances {
            let r = (rock.position.x.powi(2) + rock.position.z.powi(2)).sqrt();
            assert!(r >= belt.inner_radius - 0.5 && r <= belt.outer_radius + 0.5);
            assert!(rock.position.y.abs() <= belt.vertical_spread / 2.0 + 0.01);
            assert!(rock.scale >= belt.rock_scale * 0.5 - 0.01);
            assert!(rock.scale <= belt.rock_scale * 2.0 + 0.01);
        }
        assert!(belt.direction == 1.0 || belt.direction == -1.0);
    }

    #[test]
    fn test_molten_palette_is_fixed() {
        let mut seed = 0;
        loop {
            let mut generator = SeededGenerator::new(seed);
            let body = create_planet(&mut generator, 0, 4000.0);
            if body.visual_type == PlanetType::Molten {
                assert_eq!(body.palette.primary, Color::new(0.2, 0.1, 0.1));
                assert_eq!(body.palette.secondary, Color::new(1.0, 0.4, 0.0));
                assert_eq!(body.palette.detail, Color::new(1.0, 0.9, 0.5));
                assert!(body.atmosphere.is_none());
                break;
            }
            seed += 1;
        }
    }

    #[test]
    fn test_ring_uses_primary_colour() {
        for seed in 0..200 {
            let mut generator = SeededGenerator::new(seed);
            let body = create_planet(&mut generator, 0, 4000.0);
            if let Some(ring) = body.ring {
                assert_eq!(ring.color, body.palette.primary);
                assert!((ring.size - body.radius * 3.5).abs() < 1e-3);
                return;
            }
        }
        panic!("no ringed planet in 200 seeds");
    }
}
