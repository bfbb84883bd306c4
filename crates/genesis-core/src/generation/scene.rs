//! Scene generation - builds the whole static world from one seed.
//!
//! The call order below is part of the world's identity: moving a step
//! changes every draw after it, and with it which seed produces which world.

use hecs::{Entity, World};

use super::environment::{
    generate_clouds, generate_megastructures, generate_particles, generate_skybox,
    generate_traffic_lanes,
};
use super::landmarks::{generate_core, generate_floor, generate_obelisk_ring, generate_portal};
use super::random::SeededGenerator;
use super::solar::generate_solar_system;
use crate::components::{Cinematics, OrbitSlot};
use crate::config::WorldConfig;

/// Handles to everything generation spawned
#[derive(Debug, Clone)]
pub struct SceneLayout {
    pub seed: u64,
    pub floor: Entity,
    pub core: Entity,
    pub obelisk_ring: Entity,
    pub obelisks: Vec<Entity>,
    pub portal: Entity,
    pub clouds: Entity,
    /// Solar entries in placement order
    pub orbit_slots: Vec<(OrbitSlot, Entity)>,
    pub planets: Vec<Entity>,
    pub belts: Vec<Entity>,
    pub lanes: Vec<Entity>,
    pub structures: Vec<Entity>,
    pub particles: Entity,
    pub skybox: Entity,
    pub cinematics: Entity,
    /// Generator draws consumed
    pub draws: u64,
    /// Generator state after the last draw
    pub final_state: u64,
}

/// Generate a complete scene into an empty world.
///
/// Takes the generator by value: nothing may draw from it once the
/// scene exists.
pub fn generate_scene(
    world: &mut World,
    config: &WorldConfig,
    mut generator: SeededGenerator,
) -> SceneLayout {
    let floor = generate_floor(world);
    let core = generate_core(world);
    let (obelisk_ring, obelisks) = generate_obelisk_ring(world);
    let portal = generate_portal(world);
    let clouds = generate_clouds(world, config.cloud_count, &mut generator);
    let solar = generate_solar_system(world, &mut generator);
    let lanes = generate_traffic_lanes(world, &mut generator);
    let structures = generate_megastructures(world, &mut generator);
    let particles = generate_particles(world, config.particle_count, &mut generator);
    let skybox = generate_skybox(world);
    let cinematics = world.spawn((Cinematics::default(),));

    log::info!(
        "Generated world from seed {}: {} planets, {} belts, {} lanes, {} megastructures, {} particles ({} draws)",
        config.seed,
        solar.planets.len(),
        solar.belts.len(),
        lanes.len(),
        structures.len(),
        config.particle_count,
        generator.draws()
    );

    SceneLayout {
        seed: config.seed,
        floor,
        core,
        obelisk_ring,
        obelisks,
        portal,
        clouds,
        orbit_slots: solar.slots,
        planets: solar.planets,
        belts: solar.belts,
        lanes,
        structures,
        particles,
        skybox,
        cinematics,
        draws: generator.draws(),
        final_state: generator.state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CoreEntity, OrbitingBody};

    #[test]
    fn test_default_scene_counts() {
        let mut world = World::new();
        let config = WorldConfig::default();
        let layout = generate_scene(&mut world, &config, SeededGenerator::new(config.seed));

        assert_eq!(layout.obelisks.len(), 8);
        assert_eq!(layout.planets.len(), 1);
        assert_eq!(layout.belts.len(), 4);
        assert_eq!(layout.lanes.len(), 6);
        assert_eq!(layout.structures.len(), 4);
        assert_eq!(layout.draws, 66865);
        assert_eq!(layout.final_state, 93714);
        assert!(world.get::<&CoreEntity>(layout.core).is_ok());
    }

    #[test]
    fn test_slots_match_entity_lists() {
        let mut world = World::new();
        let config = WorldConfig {
            seed: 31337,
            particle_count: 100,
            ..Default::default()
        };
        let layout = generate_scene(&mut world, &config, SeededGenerator::new(config.seed));
        let planets: Vec<Entity> = layout
            .orbit_slots
            .iter()
            .filter(|(slot, _)| *slot == OrbitSlot::Planet)
            .map(|(_, e)| *e)
            .collect();
        assert_eq!(planets, layout.planets);
        for entity in planets {
            assert!(world.get::<&OrbitingBody>(entity).is_ok());
        }
    }
}
