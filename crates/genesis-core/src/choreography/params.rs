//! Animatable parameters and the bridge that reads/writes them in the world.

use std::collections::HashMap;

use hecs::World;
use serde::{Deserialize, Serialize};

use crate::components::{
    BeltState, Cinematics, Color, CoreEntity, ObeliskRing, ParticleField, PortalPlane,
};
use crate::generation::SceneLayout;

/// Every value a transition can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamId {
    CorePulseSpeed,
    CoreAudioBurst,
    FlareColor,
    RingColor,
    RingActivation,
    CrownScale,
    PortalOpenness,
    PortalColor,
    CameraShake,
    Aberration,
    BloomStrength,
    BloomRadius,
    ParticleFlow,
    BeltReveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Scalar(f32),
    Color(Color),
}

impl ParamValue {
    /// Interpolate toward `to`. Mismatched kinds snap to `to` at t >= 1.
    pub fn lerp(&self, to: &ParamValue, t: f32) -> ParamValue {
        match (self, to) {
            (ParamValue::Scalar(a), ParamValue::Scalar(b)) => ParamValue::Scalar(a + (b - a) * t),
            (ParamValue::Color(a), ParamValue::Color(b)) => ParamValue::Color(a.lerp(b, t)),
            _ => {
                if t >= 1.0 {
                    *to
                } else {
                    *self
                }
            }
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            ParamValue::Scalar(_) => None,
        }
    }
}

/// Anything transitions can be applied to
pub trait ParamTarget {
    fn get(&self, param: ParamId) -> Option<ParamValue>;
    fn set(&mut self, param: ParamId, value: ParamValue);
}

impl ParamTarget for HashMap<ParamId, ParamValue> {
    fn get(&self, param: ParamId) -> Option<ParamValue> {
        HashMap::get(self, &param).copied()
    }

    fn set(&mut self, param: ParamId, value: ParamValue) {
        self.insert(param, value);
    }
}

/// Parameters living on the generated scene's entities
pub struct SceneParams<'a> {
    pub world: &'a mut World,
    pub layout: &'a SceneLayout,
}

impl<'a> SceneParams<'a> {
    pub fn new(world: &'a mut World, layout: &'a SceneLayout) -> Self {
        Self { world, layout }
    }
}

impl ParamTarget for SceneParams<'_> {
    fn get(&self, param: ParamId) -> Option<ParamValue> {
        let world = &*self.world;
        let layout = self.layout;
        match param {
            ParamId::CorePulseSpeed | ParamId::CoreAudioBurst | ParamId::FlareColor => {
                let core = world.get::<&CoreEntity>(layout.core).ok()?;
                Some(match param {
                    ParamId::CorePulseSpeed => ParamValue::Scalar(core.pulse_speed),
                    ParamId::CoreAudioBurst => ParamValue::Scalar(core.audio_burst),
                    _ => ParamValue::Color(core.flare_color),
                })
            }
            ParamId::RingColor | ParamId::RingActivation | ParamId::CrownScale => {
                let ring = world.get::<&ObeliskRing>(layout.obelisk_ring).ok()?;
                Some(match param {
                    ParamId::RingColor => ParamValue::Color(ring.color),
                    ParamId::RingActivation => ParamValue::Scalar(ring.activation),
                    _ => ParamValue::Scalar(ring.crown_scale),
                })
            }
            ParamId::PortalOpenness | ParamId::PortalColor => {
                let portal = world.get::<&PortalPlane>(layout.portal).ok()?;
                Some(match param {
                    ParamId::PortalOpenness => ParamValue::Scalar(portal.openness),
                    _ => ParamValue::Color(portal.color),
                })
            }
            ParamId::CameraShake
            | ParamId::Aberration
            | ParamId::BloomStrength
            | ParamId::BloomRadius => {
                let fx = world.get::<&Cinematics>(layout.cinematics).ok()?;
                Some(ParamValue::Scalar(match param {
                    ParamId::CameraShake => fx.camera_shake,
                    ParamId::Aberration => fx.aberration,
                    ParamId::BloomStrength => fx.bloom_strength,
                    _ => fx.bloom_radius,
                }))
            }
            ParamId::ParticleFlow => {
                let field = world.get::<&ParticleField>(layout.particles).ok()?;
                Some(ParamValue::Scalar(field.flow))
            }
            ParamId::BeltReveal => {
                let first = layout.belts.first()?;
                let state = world.get::<&BeltState>(*first).ok()?;
                Some(ParamValue::Scalar(state.reveal))
            }
        }
    }

    fn set(&mut self, param: ParamId, value: ParamValue) {
        let layout = self.layout;
        let world = &mut *self.world;
        match (param, value) {
            (ParamId::CorePulseSpeed, ParamValue::Scalar(v)) => {
                if let Ok(mut core) = world.get::<&mut CoreEntity>(layout.core) {
                    core.pulse_speed = v;
                }
            }
            (ParamId::CoreAudioBurst, ParamValue::Scalar(v)) => {
                if let Ok(mut core) = world.get::<&mut CoreEntity>(layout.core) {
                    core.audio_burst = v;
                }
            }
            (ParamId::FlareColor, ParamValue::Color(c)) => {
                if let Ok(mut core) = world.get::<&mut CoreEntity>(layout.core) {
                    core.flare_color = c;
                }
            }
            (ParamId::RingColor, ParamValue::Color(c)) => {
                if let Ok(mut ring) = world.get::<&mut ObeliskRing>(layout.obelisk_ring) {
                    ring.color = c;
                }
            }
            (ParamId::RingActivation, ParamValue::Scalar(v)) => {
                if let Ok(mut ring) = world.get::<&mut ObeliskRing>(layout.obelisk_ring) {
                    ring.activation = v;
                }
            }
            (ParamId::CrownScale, ParamValue::Scalar(v)) => {
                if let Ok(mut ring) = world.get::<&mut ObeliskRing>(layout.obelisk_ring) {
                    ring.crown_scale = v;
                }
            }
            (ParamId::PortalOpenness, ParamValue::Scalar(v)) => {
                if let Ok(mut portal) = world.get::<&mut PortalPlane>(layout.portal) {
                    portal.openness = v;
                }
            }
            (ParamId::PortalColor, ParamValue::Color(c)) => {
                if let Ok(mut portal) = world.get::<&mut PortalPlane>(layout.portal) {
                    portal.color = c;
                }
            }
            (ParamId::CameraShake, ParamValue::Scalar(v)) => {
                if let Ok(mut fx) = world.get::<&mut Cinematics>(layout.cinematics) {
                    fx.camera_shake = v;
                }
            }
            (ParamId::Aberration, ParamValue::Scalar(v)) => {
                if let Ok(mut fx) = world.get::<&mut Cinematics>(layout.cinematics) {
                    fx.aberration = v;
                }
            }
            (ParamId::BloomStrength, ParamValue::Scalar(v)) => {
                if let Ok(mut fx) = world.get::<&mut Cinematics>(layout.cinematics) {
                    fx.bloom_strength = v;
                }
            }
            (ParamId::BloomRadius, ParamValue::Scalar(v)) => {
                if let Ok(mut fx) = world.get::<&mut Cinematics>(layout.cinematics) {
                    fx.bloom_radius = v;
                }
            }
            (ParamId::ParticleFlow, ParamValue::Scalar(v)) => {
                if let Ok(mut field) = world.get::<&mut ParticleField>(layout.particles) {
                    field.flow = v;
                }
            }
            (ParamId::BeltReveal, ParamValue::Scalar(v)) => {
                for &belt in &layout.belts {
                    if let Ok(mut state) = world.get::<&mut BeltState>(belt) {
                        state.reveal = v;
                    }
                }
            }
            (param, value) => {
                log::warn!("Ignoring {:?} value for {:?}", value, param);
            }
        }
    }
}
