//! Genesis Viewer - Bevy desktop host for the portal experience

use std::f32::consts::FRAC_PI_2;

use bevy::core_pipeline::bloom::Bloom;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowResized};
use genesis_core::audio::{AudioBackend, AudioCommand};
use genesis_core::backend::{FrameOutput, RenderBackend, RenderTarget};
use genesis_core::components::{
    AsteroidBelt, Color as SceneColor, CoreEntity, Floor, Megastructure, Obelisk, OrbitingBody,
    ParticleField, PortalPlane, TrafficLane, Vec3 as SceneVec3,
};
use genesis_core::config::EngineConfig;
use genesis_core::engine::Experience;
use genesis_core::error::AudioError;
use genesis_core::generation::SOLAR_TILT;
use genesis_core::input::{InputEvent, Key};

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    let (width, height) = (config.sim.viewport_width, config.sim.viewport_height);
    let fov = config.sim.field_of_view;

    let experience = match Experience::new(config, Box::new(LoggedAudio::default()), None) {
        Ok(experience) => experience,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Genesis".to_string(),
                resolution: (width as f32, height as f32).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_non_send_resource(ExperienceWrapper(experience))
        .insert_resource(CapturedFrame::default())
        .insert_resource(ViewerConfig { fov })
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                keyboard_input,
                pointer_input,
                window_resize,
                update_experience,
                sync_camera,
                render_landmarks,
                render_solar_system,
                update_hud,
            )
                .chain(),
        )
        .run();
}

struct ExperienceWrapper(Experience);

#[derive(Resource)]
struct ViewerConfig {
    /// Vertical field of view in degrees
    fov: f32,
}

/// Latest frame handed over by the engine
#[derive(Resource, Default)]
struct CapturedFrame(Option<FrameOutput>);

impl RenderBackend for CapturedFrame {
    fn present(&mut self, frame: &FrameOutput) {
        self.0 = Some(frame.clone());
    }
}

/// Logs the score instead of synthesizing it
#[derive(Default)]
struct LoggedAudio {
    running: bool,
}

impl AudioBackend for LoggedAudio {
    fn open(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn submit(&mut self, command: AudioCommand) {
        log::debug!("audio: {:?}", command);
    }
}

fn setup(mut commands: Commands, viewer: Res<ViewerConfig>) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true,
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: viewer.fov.to_radians(),
            near: 0.1,
            far: 300_000.0,
            ..default()
        }),
        Tonemapping::TonyMcMapface,
        Bloom::NATURAL,
        Transform::default(),
    ));

    info!("Genesis viewer ready: click to enter, WASD to move, hold V to speak");
}

// ── Input ───────────────────────────────────────────────────────────────

const KEY_MAP: [(KeyCode, Key); 5] = [
    (KeyCode::KeyW, Key::Forward),
    (KeyCode::KeyS, Key::Backward),
    (KeyCode::KeyA, Key::Left),
    (KeyCode::KeyD, Key::Right),
    (KeyCode::KeyV, Key::Speak),
];

fn keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut sim: NonSendMut<ExperienceWrapper>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    for (code, key) in KEY_MAP {
        if keyboard.just_pressed(code) {
            sim.0.handle(InputEvent::KeyDown(key));
        }
        if keyboard.just_released(code) {
            sim.0.handle(InputEvent::KeyUp(key));
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) && sim.0.is_locked() {
        if let Ok(mut window) = windows.get_single_mut() {
            window.cursor_options.grab_mode = CursorGrabMode::None;
            window.cursor_options.visible = true;
        }
        sim.0.handle(InputEvent::LockReleased);
    }
}

fn pointer_input(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_events: EventReader<MouseMotion>,
    mut sim: NonSendMut<ExperienceWrapper>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if mouse_buttons.just_pressed(MouseButton::Left) {
        sim.0.handle(InputEvent::Click);
        if sim.0.lock().is_pending() {
            match windows.get_single_mut() {
                Ok(mut window) => {
                    window.cursor_options.grab_mode = CursorGrabMode::Locked;
                    window.cursor_options.visible = false;
                    sim.0.handle(InputEvent::LockAcquired);
                }
                Err(_) => sim.0.handle(InputEvent::LockFailed),
            }
        }
    }

    for motion in motion_events.read() {
        sim.0.handle(InputEvent::PointerMotion {
            dx: motion.delta.x,
            dy: motion.delta.y,
        });
    }
}

fn window_resize(mut resize_events: EventReader<WindowResized>, mut sim: NonSendMut<ExperienceWrapper>) {
    for event in resize_events.read() {
        sim.0.handle(InputEvent::Resize {
            width: event.width.max(0.0) as u32,
            height: event.height.max(0.0) as u32,
        });
    }
}

fn update_experience(
    time: Res<Time>,
    mut sim: NonSendMut<ExperienceWrapper>,
    mut captured: ResMut<CapturedFrame>,
) {
    sim.0.update(time.delta_secs());
    sim.0.present(captured.as_mut());
}

// ── Rendering ───────────────────────────────────────────────────────────

fn to_vec3(v: SceneVec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_color(c: SceneColor) -> Color {
    Color::srgb(c.r, c.g, c.b)
}

/// HDR color, pushed past 1.0 so bloom picks it up
fn glow(c: SceneColor, intensity: f32) -> Color {
    let linear = to_color(c).to_linear();
    Color::LinearRgba(LinearRgba::rgb(
        linear.red * intensity,
        linear.green * intensity,
        linear.blue * intensity,
    ))
}

fn sync_camera(
    captured: Res<CapturedFrame>,
    mut camera_query: Query<(&mut Transform, &mut Bloom), With<Camera3d>>,
) {
    let Some(frame) = &captured.0 else {
        return;
    };
    if let Ok((mut transform, mut bloom)) = camera_query.get_single_mut() {
        let pose = frame.camera;
        transform.translation = to_vec3(pose.position);
        transform.rotation = Quat::from_euler(EulerRot::YXZ, pose.yaw, pose.pitch, 0.0);

        let boost = frame
            .uniforms
            .get_scalar(RenderTarget::Post, "bloomStrength")
            .unwrap_or(0.0);
        bloom.intensity = Bloom::NATURAL.intensity + boost * 0.1;
    }
}

fn flat_circle(center: Vec3) -> Isometry3d {
    Isometry3d::new(center, Quat::from_rotation_x(FRAC_PI_2))
}

fn render_landmarks(
    sim: NonSend<ExperienceWrapper>,
    captured: Res<CapturedFrame>,
    mut gizmos: Gizmos,
) {
    let Some(frame) = &captured.0 else {
        return;
    };
    let world = &sim.0.world;
    let layout = &sim.0.layout;
    let uniforms = &frame.uniforms;

    if let Ok(floor) = world.get::<&Floor>(layout.floor) {
        let grid = to_color(floor.grid_base).with_alpha(0.4);
        let mut ring = 20.0;
        while ring <= floor.radius {
            gizmos.circle(flat_circle(Vec3::ZERO), ring, grid);
            ring += 20.0;
        }
    }

    if let Ok(core) = world.get::<&CoreEntity>(layout.core) {
        let pulse = uniforms.get_scalar(RenderTarget::Core, "uAudioLevel").unwrap_or(0.0);
        let color = uniforms.get_color(RenderTarget::Core, "uColorA").unwrap_or(core.color);
        let flare = uniforms.get_color(RenderTarget::Flare, "uColor").unwrap_or(core.flare_color);
        let center = to_vec3(core.center());

        gizmos.sphere(Isometry3d::from_translation(center), core.radius * (1.0 + pulse * 0.2), glow(color, 4.0));
        gizmos.sphere(Isometry3d::from_translation(center), core.flare_radius, to_color(flare).with_alpha(0.3));
        gizmos.line(center, center + Vec3::Y * 400.0, glow(color, 2.0));

        if let Some(angles) = uniforms.get_vec3(RenderTarget::Halo, "angles") {
            let tilt = Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
            gizmos.circle(Isometry3d::new(center, tilt), core.flare_radius * 1.4, glow(color, 1.5));
        }
    }

    let ring_color = uniforms
        .get_color(RenderTarget::Obelisks, "uColor")
        .unwrap_or(SceneColor::WHITE);
    let activation = uniforms.get_scalar(RenderTarget::Obelisks, "uActivation").unwrap_or(0.0);
    let crown_scale = uniforms.get_scalar(RenderTarget::Obelisks, "crownScale").unwrap_or(1.0);
    for (_, obelisk) in world.query::<&Obelisk>().iter() {
        let base = to_vec3(obelisk.position);
        let sway = Quat::from_rotation_z(obelisk.sway);
        let top = base + sway * Vec3::Y * obelisk.crown_height;
        gizmos.line(base, top, glow(ring_color, 1.0 + activation * 3.0));
        let crown = Isometry3d::new(top, Quat::from_rotation_y(obelisk.crown_spin) * Quat::from_rotation_x(FRAC_PI_2));
        gizmos.circle(crown, 4.0 * crown_scale, glow(ring_color, 1.0 + activation * 5.0));
    }

    if let Ok(portal) = world.get::<&PortalPlane>(layout.portal) {
        let openness = uniforms.get_scalar(RenderTarget::Portal, "uOpenness").unwrap_or(portal.openness);
        let color = uniforms.get_color(RenderTarget::Portal, "uColor").unwrap_or(portal.color);
        let center = to_vec3(portal.position);
        let facing = Quat::from_rotation_y(portal.yaw);
        gizmos.rect(
            Isometry3d::new(center, facing),
            Vec2::new(portal.width, portal.height),
            to_color(color).with_alpha(0.5),
        );
        if openness > 0.0 {
            gizmos.rect(
                Isometry3d::new(center, facing),
                Vec2::new(portal.width * openness, portal.height * openness),
                glow(color, 1.0 + openness * 4.0),
            );
        }
    }

    if let Ok(field) = world.get::<&ParticleField>(layout.particles) {
        let spin = Quat::from_rotation_y(field.rotation);
        let mote = Color::srgba(0.6, 0.8, 1.0, 0.6);
        for (position, size) in field.positions.iter().zip(&field.sizes).step_by(8) {
            let p = spin * to_vec3(*position);
            gizmos.line(p, p + Vec3::Y * size * 0.5, mote);
        }
    }
}

fn render_solar_system(
    sim: NonSend<ExperienceWrapper>,
    captured: Res<CapturedFrame>,
    mut gizmos: Gizmos,
) {
    let Some(frame) = &captured.0 else {
        return;
    };
    let world = &sim.0.world;
    let uniforms = &frame.uniforms;
    let plane = Quat::from_rotation_z(SOLAR_TILT) * Quat::from_rotation_x(FRAC_PI_2);

    for (_, body) in world.query::<&OrbitingBody>().iter() {
        let target = RenderTarget::Planet(body.id);
        let Some(position) = uniforms.get_vec3(target, "position") else {
            continue;
        };
        let color = uniforms.get_color(target, "uColorB").unwrap_or(body.palette.secondary);
        gizmos.sphere(Isometry3d::from_translation(to_vec3(position)), body.radius, to_color(color));
        gizmos.circle(Isometry3d::new(Vec3::ZERO, plane), body.distance, Color::srgba(1.0, 1.0, 1.0, 0.05));
    }

    for (_, belt) in world.query::<&AsteroidBelt>().iter() {
        let target = RenderTarget::Belt(belt.id);
        let reveal = uniforms.get_scalar(target, "uReveal").unwrap_or(0.0);
        if reveal <= 0.0 {
            continue;
        }
        let rotation = uniforms.get_scalar(target, "rotation").unwrap_or(0.0);
        let color = to_color(belt.color).with_alpha(reveal * 0.6);
        let isometry = Isometry3d::new(Vec3::ZERO, Quat::from_rotation_y(rotation) * plane);
        gizmos.circle(isometry, belt.inner_radius, color);
        gizmos.circle(isometry, belt.outer_radius, color);
    }

    for (_, lane) in world.query::<&TrafficLane>().iter() {
        let points = lane.control_points.iter().map(|p| to_vec3(*p));
        gizmos.linestrip(points, glow(lane.color, 1.5));
    }

    for (_, structure) in world.query::<&Megastructure>().iter() {
        let spin = uniforms
            .get_scalar(RenderTarget::Megastructure(structure.id), "spin")
            .unwrap_or(0.0);
        let tilt = Quat::from_rotation_x(structure.tilt_x) * Quat::from_rotation_y(structure.tilt_y);
        let isometry = Isometry3d::new(Vec3::ZERO, tilt * Quat::from_rotation_z(spin));
        gizmos.circle(isometry, structure.radius, Color::srgba(0.7, 0.7, 0.8, 0.4));
    }
}

// ── HUD ─────────────────────────────────────────────────────────────────

fn update_hud(captured: Res<CapturedFrame>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Some(frame) = &captured.0 else {
        return;
    };
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    let hud = &frame.hud;

    let mut title = if hud.locked {
        format!("Genesis | gaze {:>3.0}%", hud.gaze * 100.0)
    } else {
        "Genesis | click to enter".to_string()
    };
    if let Some(label) = &hud.label {
        title.push_str(" | ");
        title.push_str(&label.text);
    }
    if hud.listening {
        title.push_str(&format!(" | listening: {}", hud.transcript));
    } else if !hud.voice_available {
        title.push_str(" | voice unavailable");
    }

    if window.title != title {
        window.title = title;
    }
}
