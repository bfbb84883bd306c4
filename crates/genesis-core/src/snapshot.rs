//! Scene snapshots - a serializable digest of everything generation
//! produced, and a bincode fingerprint for byte-wise comparison.
//!
//! Only generated placements and attributes are captured, never the
//! per-frame state such as obelisk sway or particle heights, so a
//! running world keeps the fingerprint of its seed. Nothing here is
//! written to disk; a world is always regenerated from its seed.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::error::SnapshotError;
use crate::generation::SceneLayout;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObeliskPlacement {
    pub index: u32,
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortalPlacement {
    pub position: Vec3,
    pub yaw: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDigest {
    pub seed: u64,
    pub draws: u64,
    pub final_state: u64,
    pub floor: Option<Floor>,
    pub obelisks: Vec<ObeliskPlacement>,
    pub portal: Option<PortalPlacement>,
    pub clouds: Vec<InstanceTransform>,
    pub orbit_slots: Vec<OrbitSlot>,
    pub planets: Vec<OrbitingBody>,
    pub belts: Vec<AsteroidBelt>,
    pub lanes: Vec<TrafficLane>,
    pub structures: Vec<Megastructure>,
    /// Ground-plane (x, z) of each mote; heights rise every frame
    pub particle_footprints: Vec<(f32, f32)>,
    pub particle_sizes: Vec<f32>,
    pub particle_speeds: Vec<f32>,
}

fn collect<T>(world: &World, entities: &[Entity]) -> Vec<T>
where
    T: hecs::Component + Clone,
{
    entities
        .iter()
        .filter_map(|&e| world.get::<&T>(e).ok().map(|c| (*c).clone()))
        .collect()
}

pub fn scene_digest(world: &World, layout: &SceneLayout) -> SceneDigest {
    let (particle_footprints, particle_sizes, particle_speeds) =
        match world.get::<&ParticleField>(layout.particles) {
            Ok(field) => (
                field.positions.iter().map(|p| (p.x, p.z)).collect(),
                field.sizes.clone(),
                field.speeds.clone(),
            ),
            Err(_) => Default::default(),
        };
    let obelisks = layout
        .obelisks
        .iter()
        .filter_map(|&e| world.get::<&Obelisk>(e).ok())
        .map(|o| ObeliskPlacement {
            index: o.index,
            position: o.position,
            yaw: o.yaw,
        })
        .collect();

    SceneDigest {
        seed: layout.seed,
        draws: layout.draws,
        final_state: layout.final_state,
        floor: world.get::<&Floor>(layout.floor).ok().map(|f| *f),
        obelisks,
        portal: world
            .get::<&PortalPlane>(layout.portal)
            .ok()
            .map(|p| PortalPlacement {
                position: p.position,
                yaw: p.yaw,
                width: p.width,
                height: p.height,
            }),
        clouds: world
            .get::<&CloudLayer>(layout.clouds)
            .map(|c| c.instances.clone())
            .unwrap_or_default(),
        orbit_slots: layout.orbit_slots.iter().map(|(slot, _)| *slot).collect(),
        planets: collect(world, &layout.planets),
        belts: collect(world, &layout.belts),
        lanes: collect(world, &layout.lanes),
        structures: collect(world, &layout.structures),
        particle_footprints,
        particle_sizes,
        particle_speeds,
    }
}

/// Bincode bytes of the scene digest. Equal worlds give equal bytes.
pub fn scene_fingerprint(world: &World, layout: &SceneLayout) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serialize(&scene_digest(world, layout))?)
}
