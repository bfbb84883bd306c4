//! Integration tests for a full interactive session.
//!
//! Exercises: InputEvent → Experience (lock, gaze, voice, audio) → FrameOutput
//!
//! Audio and speech run against recording backends.

use genesis_core::audio::{AudioCommand, RecordingAudio, SilentAudio, Waveform};
use genesis_core::backend::{RenderTarget, UPLINK_LABEL};
use genesis_core::choreography::ShowState;
use genesis_core::config::{EngineConfig, WorldConfig};
use genesis_core::engine::Experience;
use genesis_core::error::SpeechError;
use genesis_core::input::{InputEvent, Key};
use genesis_core::systems::{GazeSignal, LockState};
use genesis_core::voice::{derive_color, ScriptedSpeech, SpeechCall, SpeechLog};

// ── Helpers ────────────────────────────────────────────────────────────

const FRAME: f32 = 1.0 / 60.0;

fn config() -> EngineConfig {
    EngineConfig {
        world: WorldConfig {
            particle_count: 64,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn session() -> (Experience, SpeechLog) {
    let (speech, log) = ScriptedSpeech::new();
    let experience = Experience::with_rng_seed(
        config(),
        Box::new(SilentAudio::default()),
        Some(Box::new(speech)),
        11,
    )
    .unwrap();
    (experience, log)
}

fn run(experience: &mut Experience, seconds: f32) {
    let frames = (seconds / FRAME).round() as u32;
    for _ in 0..frames {
        experience.update(FRAME);
    }
}

fn lock(experience: &mut Experience) {
    experience.handle(InputEvent::Click);
    experience.handle(InputEvent::LockAcquired);
    assert!(experience.is_locked());
}

/// Pitch the view onto the core from the start position
fn look_at_core(experience: &mut Experience) {
    let pose = experience.camera_pose();
    let pitch = ((4.0 - pose.position.y) / pose.position.z).atan();
    experience.handle(InputEvent::PointerMotion {
        dx: 0.0,
        dy: -pitch / experience.config().sim.look_sensitivity,
    });
}

// ── Gaze ───────────────────────────────────────────────────────────────

#[test]
fn gaze_saturates_after_six_tenths_of_a_second() {
    let mut gaze = GazeSignal::default();
    let mut held = 0.0;
    while held < 0.6 - 1e-6 {
        gaze.update(true, 0.01);
        held += 0.01;
    }
    assert_eq!(gaze.value(), 1.0);

    // discharge runs at half the rate
    gaze.update(false, 0.25);
    assert!((gaze.value() - 0.75).abs() < 1e-6);
}

#[test]
fn gaze_follows_the_view_ray() {
    let (mut experience, _) = session();
    lock(&mut experience);
    look_at_core(&mut experience);

    run(&mut experience, 0.3);
    assert!(experience.is_hovered());
    let charged = experience.gaze();
    assert!((charged - 0.6).abs() < 0.05);

    // look away, pressure drains
    experience.handle(InputEvent::PointerMotion { dx: 800.0, dy: 0.0 });
    run(&mut experience, 0.3);
    assert!(!experience.is_hovered());
    assert!(experience.gaze() < charged);
}

#[test]
fn hover_label_hides_at_high_gaze() {
    let (mut experience, _) = session();
    lock(&mut experience);
    look_at_core(&mut experience);

    experience.update(FRAME);
    let label = experience.frame().hud.label.clone().unwrap();
    assert_eq!(label.text, UPLINK_LABEL);
    // straight ahead, above the screen center
    assert!((label.x - 640.0).abs() < 1.0);
    assert!(label.y < 360.0);

    run(&mut experience, 1.0);
    assert!(experience.gaze() >= 0.9);
    assert!(experience.frame().hud.label.is_none());
}

#[test]
fn unlocked_session_never_charges_gaze() {
    let (mut experience, _) = session();
    look_at_core(&mut experience);
    run(&mut experience, 1.0);
    assert_eq!(experience.gaze(), 0.0);
    assert!(experience.frame().hud.label.is_none());
}

// ── Pointer lock ───────────────────────────────────────────────────────

#[test]
fn lock_release_starts_cooldown() {
    let (mut experience, _) = session();
    lock(&mut experience);
    experience.handle(InputEvent::LockReleased);
    assert!(!experience.is_locked());

    // rapid re-click is swallowed
    assert!(!experience.request_lock());
    run(&mut experience, 1.3);
    assert!(experience.request_lock());
    assert!(matches!(experience.lock().state(), LockState::Pending { .. }));
}

#[test]
fn unanswered_lock_request_expires() {
    let (mut experience, _) = session();
    assert!(experience.request_lock());
    run(&mut experience, 1.1);
    assert_eq!(experience.lock().state(), LockState::Unlocked);
}

// ── Voice → portal ─────────────────────────────────────────────────────

#[test]
fn spoken_phrase_opens_portal_with_its_color() {
    let (mut experience, speech) = session();
    run(&mut experience, 4.0);
    assert_eq!(experience.choreographer().activations(), 1);
    lock(&mut experience);

    experience.handle(InputEvent::KeyDown(Key::Speak));
    assert!(experience.voice().is_listening());
    // pressing closes the current portal
    assert_eq!(experience.choreographer().state(), ShowState::Dormant);
    assert!(!experience.portal().is_open);

    experience.handle(InputEvent::Transcript("hel".to_string()));
    experience.handle(InputEvent::Transcript("hello".to_string()));
    assert_eq!(experience.frame().hud.transcript, "");
    experience.update(FRAME);
    assert_eq!(experience.frame().hud.transcript, "hello");

    experience.handle(InputEvent::KeyUp(Key::Speak));
    assert_eq!(*speech.borrow(), vec![SpeechCall::Start, SpeechCall::Stop]);
    assert_eq!(experience.portal().color, "#E918D2");
    assert_eq!(experience.portal().color, derive_color("hello"));
    assert_eq!(experience.portal().description, "hello");
    assert_eq!(experience.choreographer().state(), ShowState::Active);
    assert_eq!(experience.choreographer().activations(), 2);

    run(&mut experience, 4.0);
    let portal = experience.frame().uniforms.get_color(RenderTarget::Portal, "uColor");
    assert_eq!(portal.map(|c| c.to_hex_string()), Some("#E918D2".to_string()));
    assert_eq!(
        experience.frame().uniforms.get_scalar(RenderTarget::Portal, "uOpenness"),
        Some(1.0)
    );
}

#[test]
fn blank_transcript_does_not_activate() {
    let (mut experience, _) = session();
    lock(&mut experience);
    experience.handle(InputEvent::KeyDown(Key::Speak));
    experience.handle(InputEvent::Transcript("   ".to_string()));
    experience.handle(InputEvent::KeyUp(Key::Speak));

    assert_eq!(experience.choreographer().state(), ShowState::Dormant);
    assert_eq!(experience.choreographer().activations(), 1);
}

#[test]
fn speak_key_needs_lock() {
    let (mut experience, speech) = session();
    experience.handle(InputEvent::KeyDown(Key::Speak));
    assert!(!experience.voice().is_listening());
    assert!(speech.borrow().is_empty());
    assert!(experience.portal().is_open);
}

#[test]
fn denied_microphone_disables_voice() {
    let (speech, log) = ScriptedSpeech::failing(SpeechError::PermissionDenied);
    let mut experience = Experience::with_rng_seed(
        config(),
        Box::new(SilentAudio::default()),
        Some(Box::new(speech)),
        5,
    )
    .unwrap();
    lock(&mut experience);

    experience.handle(InputEvent::KeyDown(Key::Speak));
    assert!(!experience.voice().is_listening());
    assert!(!experience.voice().is_available());
    // the rest of the session carries on
    experience.handle(InputEvent::KeyUp(Key::Speak));
    run(&mut experience, 0.5);
    assert!(!experience.frame().hud.voice_available);
    assert_eq!(log.borrow().len(), 1);

    // later presses never reach the engine
    experience.handle(InputEvent::KeyDown(Key::Speak));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn missing_speech_engine_degrades_quietly() {
    let mut experience =
        Experience::with_rng_seed(config(), Box::new(SilentAudio::default()), None, 5).unwrap();
    lock(&mut experience);
    experience.handle(InputEvent::KeyDown(Key::Speak));
    experience.handle(InputEvent::KeyUp(Key::Speak));
    assert!(!experience.voice().is_available());
    assert!(experience.portal().is_open);
}

#[test]
fn transient_speech_error_keeps_voice() {
    let (mut experience, _) = session();
    experience.speech_error(SpeechError::NotRunning);
    assert!(experience.voice().is_available());
}

// ── Audio ──────────────────────────────────────────────────────────────

#[test]
fn click_on_hovered_core_blips() {
    let (backend, log) = RecordingAudio::new();
    let mut experience =
        Experience::with_rng_seed(config(), Box::new(backend), None, 2).unwrap();
    lock(&mut experience);
    look_at_core(&mut experience);
    experience.update(FRAME);
    assert!(experience.is_hovered());

    experience.handle(InputEvent::Click);
    let blip = AudioCommand::Blip {
        frequency: 1200.0,
        waveform: Waveform::Sine,
        seconds: 0.1,
    };
    assert!(log.borrow().contains(&blip));
}

#[test]
fn gaze_drives_the_drone() {
    let (backend, log) = RecordingAudio::new();
    let mut experience =
        Experience::with_rng_seed(config(), Box::new(backend), None, 2).unwrap();
    lock(&mut experience);
    look_at_core(&mut experience);
    run(&mut experience, 0.5);
    assert!(experience.audio().is_drone_active());
    assert!(log
        .borrow()
        .iter()
        .any(|c| matches!(c, AudioCommand::DroneAttack { note: "C1" })));

    experience.handle(InputEvent::LockReleased);
    assert!(!experience.audio().is_drone_active());
    run(&mut experience, 1.5);
    assert!(!experience.audio().is_transport_running());
}

#[test]
fn blocked_audio_retries_on_next_lock() {
    let (backend, _) = RecordingAudio::blocked(2);
    let mut experience =
        Experience::with_rng_seed(config(), Box::new(backend), None, 2).unwrap();
    lock(&mut experience);
    // context opened but the platform refused to start it
    assert!(experience.audio().is_music_ready());

    experience.handle(InputEvent::LockReleased);
    run(&mut experience, 1.5);
    lock(&mut experience);
    run(&mut experience, 0.1);
    assert!(experience.audio().is_transport_running());
}
