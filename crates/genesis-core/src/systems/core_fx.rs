//! Core system - the reactive core's idle bob, simulated loudness,
//! color, flare and light, all eased instead of snapped.

use hecs::World;
use rand::Rng;

use crate::components::{frame_blend, smoothstep, Color, CoreEntity};
use crate::generation::SceneLayout;

/// Gaze above which the core "hears" the viewer
pub const AUDIO_ENGAGE_GAZE: f32 = 0.1;
/// Gaze above which the core turns to its excited color
pub const EXCITED_GAZE: f32 = 0.8;
pub const IDLE_AUDIO_LEVEL: f32 = 0.1;
pub const EXCITED_COLOR: Color = Color::YELLOW;
pub const CALM_COLOR: Color = Color::CYAN;

/// Per-frame inputs the core reacts to
#[derive(Debug, Clone, Copy)]
pub struct CoreFrame {
    pub time: f64,
    pub dt: f32,
    pub gaze: f32,
    pub locked: bool,
    /// A transition currently owns the pulse speed
    pub pulse_held: bool,
    /// A transition currently owns the flare color
    pub flare_held: bool,
}

/// Idle bob. Runs before the gaze raycast so the ray sees this frame's height.
pub fn core_bob_system(world: &mut World, layout: &SceneLayout, time: f64) {
    if let Ok(mut core) = world.get::<&mut CoreEntity>(layout.core) {
        core.height = core.base_height + (time * 0.5).sin() as f32 * 0.2;
    }
}

/// Loudness the surface deforms by: an idle floor, or a noisy
/// oscillation once gaze engages
pub fn target_audio_level(gaze: f32, time: f64, noise: f32) -> f32 {
    if gaze > AUDIO_ENGAGE_GAZE {
        (time * 15.0).sin() as f32 * 0.3 + 0.4 + noise * 0.3
    } else {
        IDLE_AUDIO_LEVEL
    }
}

pub fn core_system(world: &mut World, layout: &SceneLayout, frame: &CoreFrame, rng: &mut impl Rng) {
    let Ok(mut core) = world.get::<&mut CoreEntity>(layout.core) else {
        return;
    };
    let slow = frame_blend(0.05, frame.dt);
    let fast = frame_blend(0.1, frame.dt);
    let t = frame.time;

    let target = target_audio_level(frame.gaze, t, rng.gen::<f32>());
    core.audio_level += (target - core.audio_level) * fast;

    core.color_target = if frame.gaze > EXCITED_GAZE {
        EXCITED_COLOR
    } else {
        CALM_COLOR
    };
    let color_target = core.color_target;
    core.color = core.color.lerp(&color_target, slow);

    if !frame.locked && !frame.pulse_held {
        core.pulse_speed += (1.0 - core.pulse_speed) * slow;
    }

    if !frame.flare_held {
        core.flare_color = core.flare_color.lerp(&color_target, slow);
    }
    let activity = smoothstep((t * 1.5).sin() as f32, 0.2, 0.9);
    let threshold_target = 0.6 - activity * 0.3;
    core.flare_threshold += (threshold_target - core.flare_threshold) * slow;
    core.flare_spin.0 -= frame.dt * 0.2;
    core.flare_spin.1 += frame.dt * 0.05;

    let light_target = if frame.locked { 4.0 } else { 2.0 };
    core.light_intensity += (light_target - core.light_intensity) * fast;
    core.light_color = core.light_color.lerp(&color_target, fast);

    core.halo = [(t * 0.1) as f32, (t * 0.15) as f32, (t * 0.05) as f32];
}
