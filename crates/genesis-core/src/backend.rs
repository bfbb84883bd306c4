//! Render boundary - the per-frame uniform store, HUD signals and the
//! trait a render backend implements to consume them.

use std::collections::BTreeMap;

use hecs::World;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraPose, Viewport};
use crate::components::*;
use crate::generation::SceneLayout;

/// Hover label text shown over the core
pub const UPLINK_LABEL: &str = "[ INITIALIZE UPLINK ]";
/// The label hides once gaze pressure passes this
pub const LABEL_HIDE_GAZE: f32 = 0.9;
/// Label anchor above the core's center
pub const LABEL_LIFT: f32 = 2.5;

/// Which drawable a uniform belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderTarget {
    Grid,
    Core,
    Flare,
    CoreBeam,
    Halo,
    CoreLight,
    /// Shared ring uniforms
    Obelisks,
    Obelisk(u32),
    Portal,
    Clouds,
    Planet(u32),
    Belt(u32),
    Lane(u32),
    Megastructure(u32),
    Particles,
    Skybox,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Uniform {
    Scalar(f32),
    Vec3(Vec3),
    Color(Color),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformKey {
    pub target: RenderTarget,
    pub name: &'static str,
}

/// Current value of every time-varying uniform, overwritten each frame
#[derive(Debug, Clone, Default)]
pub struct UniformStore {
    values: BTreeMap<UniformKey, Uniform>,
}

impl UniformStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: RenderTarget, name: &'static str, value: Uniform) {
        self.values.insert(UniformKey { target, name }, value);
    }

    pub fn scalar(&mut self, target: RenderTarget, name: &'static str, value: f32) {
        self.set(target, name, Uniform::Scalar(value));
    }

    pub fn color(&mut self, target: RenderTarget, name: &'static str, value: Color) {
        self.set(target, name, Uniform::Color(value));
    }

    pub fn vec3(&mut self, target: RenderTarget, name: &'static str, value: Vec3) {
        self.set(target, name, Uniform::Vec3(value));
    }

    pub fn get(&self, target: RenderTarget, name: &'static str) -> Option<Uniform> {
        self.values.get(&UniformKey { target, name }).copied()
    }

    pub fn get_scalar(&self, target: RenderTarget, name: &'static str) -> Option<f32> {
        match self.get(target, name)? {
            Uniform::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_color(&self, target: RenderTarget, name: &'static str) -> Option<Color> {
        match self.get(target, name)? {
            Uniform::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn get_vec3(&self, target: RenderTarget, name: &'static str) -> Option<Vec3> {
        match self.get(target, name)? {
            Uniform::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UniformKey, &Uniform)> {
        self.values.iter()
    }
}

/// Write every entity's time-varying values into `store`
pub fn push_uniforms(
    world: &World,
    layout: &SceneLayout,
    time: f64,
    viewport: Viewport,
    store: &mut UniformStore,
) {
    use RenderTarget as T;
    let t = time as f32;
    let resolution = Vec3::new(viewport.width as f32, viewport.height as f32, 0.0);

    if let Ok(floor) = world.get::<&Floor>(layout.floor) {
        store.scalar(T::Grid, "uTime", t);
        store.color(T::Grid, "uBaseColor", floor.grid_base);
        store.color(T::Grid, "uPulseColor", floor.grid_pulse);
    }

    if let Ok(core) = world.get::<&CoreEntity>(layout.core) {
        store.scalar(T::Core, "uTime", t);
        store.scalar(T::Core, "uAudioLevel", core.effective_audio_level());
        store.scalar(T::Core, "uPulseSpeed", core.pulse_speed);
        store.color(T::Core, "uColorA", core.color);
        store.color(T::Core, "uColorB", core.accent);
        store.vec3(T::Core, "position", core.center());

        store.scalar(T::Flare, "uTime", t);
        store.color(T::Flare, "uColor", core.flare_color);
        store.scalar(T::Flare, "uThreshold", core.flare_threshold);
        store.vec3(T::Flare, "rotation", Vec3::new(0.0, core.flare_spin.0, core.flare_spin.1));

        store.scalar(T::CoreBeam, "uTime", t);
        store.color(T::CoreBeam, "uColor", core.color);

        let [a, b, c] = core.halo;
        store.vec3(T::Halo, "angles", Vec3::new(a, b, c));

        store.scalar(T::CoreLight, "intensity", core.light_intensity);
        store.color(T::CoreLight, "color", core.light_color);
        store.vec3(T::CoreLight, "position", core.center());
    }

    if let Ok(ring) = world.get::<&ObeliskRing>(layout.obelisk_ring) {
        store.scalar(T::Obelisks, "uTime", t);
        store.color(T::Obelisks, "uColor", ring.color);
        store.scalar(T::Obelisks, "uActivation", ring.activation);
        store.scalar(T::Obelisks, "crownScale", ring.crown_scale);
    }
    for (_, obelisk) in world.query::<&Obelisk>().iter() {
        let target = T::Obelisk(obelisk.index);
        store.scalar(target, "sway", obelisk.sway);
        store.scalar(target, "crownHeight", obelisk.crown_height);
        store.scalar(target, "crownSpin", obelisk.crown_spin);
    }

    if let Ok(portal) = world.get::<&PortalPlane>(layout.portal) {
        store.scalar(T::Portal, "uTime", t);
        store.color(T::Portal, "uColor", portal.color);
        store.scalar(T::Portal, "uOpenness", portal.openness);
    }

    if let Ok(clouds) = world.get::<&CloudLayer>(layout.clouds) {
        store.scalar(T::Clouds, "uTime", t);
        store.color(T::Clouds, "uColor", clouds.color);
        store.scalar(T::Clouds, "rotation", clouds.rotation);
    }

    for (_, (body, orbit)) in world.query::<(&OrbitingBody, &OrbitState)>().iter() {
        let target = T::Planet(body.id);
        let [a, b, c] = body.palette.colors();
        store.scalar(target, "uTime", t);
        store.scalar(target, "uType", body.visual_type.index() as f32);
        store.color(target, "uColorA", a);
        store.color(target, "uColorB", b);
        store.color(target, "uColorC", c);
        store.vec3(target, "position", orbit.position);
        store.scalar(target, "spin", orbit.spin);
    }

    for (_, (belt, state)) in world.query::<(&AsteroidBelt, &BeltState)>().iter() {
        let target = T::Belt(belt.id);
        store.scalar(target, "rotation", state.rotation);
        store.scalar(target, "uReveal", state.reveal);
        store.color(target, "uColor", belt.color);
    }

    for (_, lane) in world.query::<&TrafficLane>().iter() {
        store.scalar(T::Lane(lane.id), "uTime", t);
    }

    for (_, (structure, spin)) in world.query::<(&Megastructure, &Spin)>().iter() {
        let target = T::Megastructure(structure.id);
        store.scalar(target, "uTime", t);
        store.scalar(target, "spin", spin.angle);
    }

    if let Ok(field) = world.get::<&ParticleField>(layout.particles) {
        store.scalar(T::Particles, "uTime", t);
        store.scalar(T::Particles, "flow", field.flow);
        store.scalar(T::Particles, "rotation", field.rotation);
    }

    if let Ok(skybox) = world.get::<&Skybox>(layout.skybox) {
        store.scalar(T::Skybox, "uTime", t);
        store.scalar(T::Skybox, "rotation", skybox.rotation);
        store.vec3(T::Skybox, "iResolution", resolution);
    }

    if let Ok(fx) = world.get::<&Cinematics>(layout.cinematics) {
        store.scalar(T::Post, "uTime", t);
        store.vec3(T::Post, "uResolution", resolution);
        store.scalar(T::Post, "uAberration", fx.aberration);
        store.scalar(T::Post, "uVignette", fx.vignette);
        store.scalar(T::Post, "uGrain", fx.grain);
        store.scalar(T::Post, "bloomStrength", fx.bloom_strength);
        store.scalar(T::Post, "bloomRadius", fx.bloom_radius);
        store.scalar(T::Post, "bloomThreshold", fx.bloom_threshold);
    }
}

/// Hover label over the core, in pixels from the top left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Signals the heads-up display shows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HudState {
    pub locked: bool,
    pub gaze: f32,
    pub listening: bool,
    pub transcript: String,
    pub voice_available: bool,
    pub label: Option<HoverLabel>,
}

/// Everything a render backend needs for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Stable pose plus this frame's shake
    pub camera: CameraPose,
    pub uniforms: UniformStore,
    pub hud: HudState,
}

pub trait RenderBackend {
    fn present(&mut self, frame: &FrameOutput);
}

/// Discards frames, counting them
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl RenderBackend for NullRenderer {
    fn present(&mut self, _frame: &FrameOutput) {
        self.frames += 1;
    }
}
