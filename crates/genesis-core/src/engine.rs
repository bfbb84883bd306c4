//! Experience engine - main entry point for running a session.
//!
//! Owns the generated world and every piece of interaction state. Hosts
//! feed it [`InputEvent`]s, call [`Experience::update`] once per frame and
//! hand the resulting [`FrameOutput`] to their render backend.

use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{AudioBackend, AudioDirector, Waveform, CLICK_BLIP_HZ};
use crate::backend::{
    push_uniforms, FrameOutput, HoverLabel, HudState, RenderBackend, UniformStore,
    LABEL_HIDE_GAZE, LABEL_LIFT, UPLINK_LABEL,
};
use crate::camera::{CameraPose, CameraRig, Projection, Viewport};
use crate::choreography::{Choreographer, ParamId, SceneParams, ShowCue};
use crate::components::{Cinematics, CoreEntity, Vec3};
use crate::config::EngineConfig;
use crate::error::{ConfigError, SpeechError};
use crate::generation::{generate_scene, SceneLayout, SeededGenerator};
use crate::input::{InputEvent, Key, MovementKeys};
use crate::systems::*;
use crate::voice::{PortalConfig, SpeechEngine, VoiceIntake};

/// One running session
pub struct Experience {
    /// ECS world containing all entities
    pub world: World,
    /// Handles to the generated scene
    pub layout: SceneLayout,
    config: EngineConfig,
    /// Seconds since the session started
    time: f64,
    rig: CameraRig,
    keys: MovementKeys,
    lock: PointerLock,
    gaze: GazeSignal,
    /// View ray hit the core this frame (only while locked)
    hovered: bool,
    choreographer: Choreographer,
    portal: PortalConfig,
    voice: VoiceIntake,
    audio: AudioDirector,
    /// Runtime randomness; never used for generation
    rng: StdRng,
    projection: Projection,
    frame: FrameOutput,
}

impl Experience {
    /// Generate the world and start the session
    pub fn new(
        config: EngineConfig,
        audio: Box<dyn AudioBackend>,
        speech: Option<Box<dyn SpeechEngine>>,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, audio, speech, StdRng::from_entropy())
    }

    /// Like [`Experience::new`] with reproducible runtime randomness
    pub fn with_rng_seed(
        config: EngineConfig,
        audio: Box<dyn AudioBackend>,
        speech: Option<Box<dyn SpeechEngine>>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, audio, speech, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: EngineConfig,
        audio: Box<dyn AudioBackend>,
        speech: Option<Box<dyn SpeechEngine>>,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let viewport = Viewport::new(config.sim.viewport_width, config.sim.viewport_height)
            .map_err(|e| ConfigError::Invalid {
                field: "sim.viewport_width",
                reason: e.to_string(),
            })?;

        let mut world = World::new();
        let layout = generate_scene(
            &mut world,
            &config.world,
            SeededGenerator::new(config.world.seed),
        );

        let rig = CameraRig::new(config.sim.camera_start);
        let mut experience = Self {
            world,
            layout,
            time: 0.0,
            rig,
            keys: MovementKeys::default(),
            lock: PointerLock::new(&config.sim),
            gaze: GazeSignal::from_config(&config.sim),
            hovered: false,
            choreographer: Choreographer::new(),
            portal: PortalConfig::closed(),
            voice: VoiceIntake::new(speech),
            audio: AudioDirector::new(audio, config.audio.clone()),
            rng,
            projection: Projection::from_config(&config.sim, viewport),
            frame: FrameOutput {
                camera: rig.pose(),
                uniforms: UniformStore::new(),
                hud: HudState::default(),
            },
            config,
        };

        experience.choreographer.play_intro();
        let initial = PortalConfig::initial(&experience.config.world);
        experience.apply_portal(initial);
        experience.refresh_frame(Vec3::ZERO);
        Ok(experience)
    }

    /// Feed one host event. Never fails: problems are logged and dropped.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(Key::Speak) => {
                if self.voice.press(self.lock.is_locked()) {
                    log::debug!("Listening");
                    let closed = self.portal.to_closed();
                    self.apply_portal(closed);
                }
            }
            InputEvent::KeyUp(Key::Speak) => {
                if let Some(config) = self.voice.release() {
                    self.apply_portal(config);
                }
            }
            InputEvent::KeyDown(key) => {
                self.keys.set(key, true);
            }
            InputEvent::KeyUp(key) => {
                self.keys.set(key, false);
            }
            InputEvent::Click => {
                self.audio.user_gesture();
                if self.lock.is_locked() {
                    if self.hovered {
                        self.audio.blip(CLICK_BLIP_HZ, Waveform::Sine, 0.1);
                    }
                } else {
                    self.request_lock();
                }
            }
            InputEvent::PointerMotion { dx, dy } => {
                if self.lock.is_locked() {
                    self.rig.look(dx, dy, self.config.sim.look_sensitivity);
                }
            }
            InputEvent::LockAcquired => {
                if self.lock.acquired() {
                    log::info!("Pointer locked");
                    self.audio.set_locked(true, self.time);
                }
            }
            InputEvent::LockReleased => {
                if self.lock.released(self.time) {
                    log::info!("Pointer unlocked");
                    self.keys.clear();
                    self.hovered = false;
                    self.audio.set_locked(false, self.time);
                }
            }
            InputEvent::LockFailed => {
                log::debug!("Pointer lock request refused");
                self.lock.failed(self.time);
            }
            InputEvent::Resize { width, height } => match Viewport::new(width, height) {
                Ok(viewport) => self.projection.viewport = viewport,
                Err(e) => log::warn!("Ignoring resize: {}", e),
            },
            InputEvent::Transcript(text) => self.voice.on_transcript(&text),
        }
    }

    /// Ask for pointer capture. True when the host should attempt it.
    pub fn request_lock(&mut self) -> bool {
        self.lock.request(self.time)
    }

    /// Asynchronous failure reported by the speech engine
    pub fn speech_error(&mut self, error: SpeechError) {
        self.voice.on_error(error);
    }

    /// Replace the portal config and run whatever show it calls for
    pub fn apply_portal(&mut self, config: PortalConfig) {
        if let Some(ShowCue::Opened { .. }) = self.choreographer.apply(&config) {
            self.audio.portal_opened();
        }
        self.portal = config;
    }

    /// Advance the session by `delta_seconds`
    pub fn update(&mut self, delta_seconds: f32) {
        let dt = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.time += dt as f64;
        let time = self.time;

        self.lock.update(time);

        // Transitions first, so per-frame easing sees which params are held
        self.choreographer
            .advance(dt as f64, &mut SceneParams::new(&mut self.world, &self.layout));

        let locked = self.lock.is_locked();
        if locked {
            locomotion_system(&mut self.rig, &self.keys, &self.config.sim, dt);
        }

        let shake = match self.world.get::<&mut Cinematics>(self.layout.cinematics) {
            Ok(mut fx) => shake_system(&mut fx, self.config.sim.shake_decay, dt, &mut self.rng),
            Err(_) => Vec3::ZERO,
        };

        // Gaze uses this frame's camera and core bob
        core_bob_system(&mut self.world, &self.layout, time);
        self.hovered = locked && core_in_view(&self.world, &self.layout, &self.rig.pose());
        let gaze = self.gaze.update(self.hovered, dt);

        let frame = CoreFrame {
            time,
            dt,
            gaze,
            locked,
            pulse_held: self.choreographer.holds(ParamId::CorePulseSpeed),
            flare_held: self.choreographer.holds(ParamId::FlareColor),
        };
        core_system(&mut self.world, &self.layout, &frame, &mut self.rng);
        orbit_system(&mut self.world, time);
        decor_system(&mut self.world, time, dt);

        self.audio.set_gaze(if locked { gaze } else { 0.0 });
        self.audio.update(time, dt as f64, &mut self.rng);

        self.refresh_frame(shake);
    }

    fn refresh_frame(&mut self, shake: Vec3) {
        let camera = self.rig.pose().offset(shake);
        push_uniforms(
            &self.world,
            &self.layout,
            self.time,
            self.projection.viewport,
            &mut self.frame.uniforms,
        );
        self.frame.camera = camera;
        self.frame.hud = HudState {
            locked: self.lock.is_locked(),
            gaze: self.gaze.value(),
            listening: self.voice.is_listening(),
            transcript: self.voice.transcript().to_string(),
            voice_available: self.voice.is_available(),
            label: self.hover_label(&camera),
        };
    }

    fn hover_label(&self, camera: &CameraPose) -> Option<HoverLabel> {
        if !self.hovered || self.gaze.value() >= LABEL_HIDE_GAZE {
            return None;
        }
        let core = self.world.get::<&CoreEntity>(self.layout.core).ok()?;
        let anchor = core.center() + Vec3::UP * LABEL_LIFT;
        let ndc = self.projection.project(camera, anchor)?;
        let (x, y) = self.projection.to_screen(ndc);
        Some(HoverLabel {
            text: UPLINK_LABEL.to_string(),
            x,
            y,
        })
    }

    /// Hand the current frame to a render backend
    pub fn present(&self, backend: &mut dyn RenderBackend) {
        backend.present(&self.frame);
    }

    pub fn frame(&self) -> &FrameOutput {
        &self.frame
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Stable camera pose, without shake
    pub fn camera_pose(&self) -> CameraPose {
        self.rig.pose()
    }

    pub fn gaze(&self) -> f32 {
        self.gaze.value()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn lock(&self) -> &PointerLock {
        &self.lock
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn portal(&self) -> &PortalConfig {
        &self.portal
    }

    pub fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    pub fn voice(&self) -> &VoiceIntake {
        &self.voice
    }

    pub fn audio(&self) -> &AudioDirector {
        &self.audio
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCommand, RecordingAudio, SilentAudio};
    use crate::backend::{NullRenderer, RenderTarget};
    use crate::choreography::ShowState;
    use crate::config::WorldConfig;
    use crate::voice::ScriptedSpeech;

    fn small_config() -> EngineConfig {
        EngineConfig {
            world: WorldConfig {
                particle_count: 32,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn experience() -> Experience {
        let (speech, _) = ScriptedSpeech::new();
        Experience::with_rng_seed(
            small_config(),
            Box::new(SilentAudio::default()),
            Some(Box::new(speech)),
            1,
        )
        .unwrap()
    }

    fn lock(exp: &mut Experience) {
        exp.handle(InputEvent::Click);
        exp.handle(InputEvent::LockAcquired);
    }

    #[test]
    fn test_initial_portal_runs_activation() {
        let mut exp = experience();
        assert_eq!(exp.choreographer().state(), ShowState::Active);
        assert_eq!(exp.choreographer().activations(), 1);
        for _ in 0..300 {
            exp.update(1.0 / 60.0);
        }
        let openness = exp.frame().uniforms.get_scalar(RenderTarget::Portal, "uOpenness");
        assert!(openness.unwrap() > 0.99);
    }

    #[test]
    fn test_no_movement_while_unlocked() {
        let mut exp = experience();
        let start = exp.camera_pose().position;
        exp.handle(InputEvent::KeyDown(Key::Forward));
        for _ in 0..30 {
            exp.update(1.0 / 60.0);
        }
        assert_eq!(exp.camera_pose().position, start);

        lock(&mut exp);
        for _ in 0..30 {
            exp.update(1.0 / 60.0);
        }
        assert!(exp.camera_pose().position.z < start.z);
    }

    #[test]
    fn test_gaze_charges_when_looking_at_core() {
        let mut exp = experience();
        lock(&mut exp);
        // the core sits at the origin, straight ahead of the start pose
        // but below eye height; tilt the view down onto it
        let pose = exp.camera_pose();
        let target_pitch = ((4.0 - pose.position.y) / pose.position.z).atan();
        exp.handle(InputEvent::PointerMotion {
            dx: 0.0,
            dy: -target_pitch / exp.config().sim.look_sensitivity,
        });
        for _ in 0..30 {
            exp.update(1.0 / 60.0);
        }
        assert!(exp.is_hovered());
        assert!(exp.gaze() > 0.9);
    }

    #[test]
    fn test_bad_resize_is_ignored() {
        let mut exp = experience();
        let before = exp.projection().viewport;
        exp.handle(InputEvent::Resize { width: 0, height: 300 });
        assert_eq!(exp.projection().viewport, before);
        exp.handle(InputEvent::Resize { width: 640, height: 480 });
        assert_eq!(exp.projection().viewport.width, 640);
    }

    #[test]
    fn test_non_finite_delta_is_dropped() {
        let mut exp = experience();
        exp.update(f32::NAN);
        exp.update(-1.0);
        assert_eq!(exp.time(), 0.0);
    }

    #[test]
    fn test_lock_drives_audio() {
        let (backend, log) = RecordingAudio::new();
        let mut exp =
            Experience::with_rng_seed(small_config(), Box::new(backend), None, 3).unwrap();
        lock(&mut exp);
        assert!(exp.audio().is_transport_running());
        assert!(log.borrow().contains(&AudioCommand::StartTransport));

        exp.handle(InputEvent::LockReleased);
        for _ in 0..90 {
            exp.update(1.0 / 60.0);
        }
        assert!(!exp.audio().is_transport_running());
    }

    #[test]
    fn test_present_hands_over_frame() {
        let mut exp = experience();
        let mut renderer = NullRenderer::default();
        exp.update(0.016);
        exp.present(&mut renderer);
        assert_eq!(renderer.frames, 1);
    }
}
