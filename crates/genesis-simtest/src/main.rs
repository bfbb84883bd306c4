//! Genesis Headless Session Harness
//!
//! Validates generation, choreography and interactive session logic.
//! Runs entirely in-process with recording audio and scripted speech,
//! no window, no audio device.
//!
//! Usage:
//!   cargo run -p genesis-simtest
//!   cargo run -p genesis-simtest -- --verbose
//!   cargo run -p genesis-simtest -- --config session.json

use std::collections::HashMap;

use genesis_core::audio::{AudioCommand, RecordingAudio, Voice};
use genesis_core::backend::RenderTarget;
use genesis_core::choreography::{
    Choreographer, ParamId, ParamTarget, ParamValue, SceneParams, PARTICLE_FLOW_FAST,
    PULSE_HIGH, SHAKE_MAGNITUDE,
};
use genesis_core::components::*;
use genesis_core::config::EngineConfig;
use genesis_core::engine::Experience;
use genesis_core::generation::{generate_scene, SceneLayout, SeededGenerator, MIN_ORBIT_GAP};
use genesis_core::input::{InputEvent, Key};
use genesis_core::snapshot::scene_fingerprint;
use genesis_core::voice::{derive_color, PortalConfig, ScriptedSpeech, SpeechCall};
use hecs::World;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));

    println!("=== Genesis Session Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    let config = match config_path {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => {
                results.push(check("config_load", true, format!("loaded {}", path)));
                config
            }
            Err(e) => {
                results.push(check("config_load", false, format!("{}: {}", path, e)));
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };
    results.extend(validate_config(&config));

    // 2. World generation
    results.extend(validate_generation(&config, verbose));

    // 3. Activation choreography
    results.extend(validate_choreography(&config, verbose));

    // 4. Interactive session
    results.extend(validate_session(&config, verbose));

    // 5. Frame-rate independence
    results.extend(validate_frame_rates(&config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    results.push(match config.validate() {
        Ok(()) => check("config_valid", true, format!("seed {}", config.world.seed)),
        Err(e) => check("config_valid", false, e.to_string()),
    });

    let broken = r#"{ "sim": { "gaze_charge_rate": -1.0 } }"#;
    results.push(check(
        "config_rejects_negative_rate",
        EngineConfig::from_json_str(broken).is_err(),
        "negative gaze charge rate rejected".into(),
    ));

    results
}

// ── 2. World Generation ─────────────────────────────────────────────────

fn generate(config: &EngineConfig) -> (World, SceneLayout) {
    let mut world = World::new();
    let layout = generate_scene(
        &mut world,
        &config.world,
        SeededGenerator::new(config.world.seed),
    );
    (world, layout)
}

fn validate_generation(config: &EngineConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- World Generation ---");
    let mut results = Vec::new();

    let (world_a, layout_a) = generate(config);
    let (world_b, layout_b) = generate(config);

    let fingerprints = (
        scene_fingerprint(&world_a, &layout_a),
        scene_fingerprint(&world_b, &layout_b),
    );
    results.push(match fingerprints {
        (Ok(a), Ok(b)) => check(
            "generation_deterministic",
            a == b,
            format!("{} byte fingerprint, {} draws", a.len(), layout_a.draws),
        ),
        (Err(e), _) | (_, Err(e)) => check("generation_deterministic", false, e.to_string()),
    });

    // Orbits strictly increase by at least the minimum gap
    let mut previous = 3000.0f32;
    let mut worst_gap = f32::MAX;
    for &(slot, entity) in &layout_a.orbit_slots {
        let distance = match slot {
            OrbitSlot::Planet => world_a.get::<&OrbitingBody>(entity).map(|b| b.distance),
            OrbitSlot::Belt => world_a.get::<&AsteroidBelt>(entity).map(|b| b.distance),
        }
        .unwrap_or(0.0);
        worst_gap = worst_gap.min(distance - previous);
        previous = distance;
    }
    results.push(check(
        "orbits_no_overlap",
        worst_gap >= MIN_ORBIT_GAP as f32 - 0.01,
        format!("smallest orbital gap {:.1}", worst_gap),
    ));

    let entries = layout_a.orbit_slots.len();
    results.push(check(
        "solar_entry_count",
        (3..7).contains(&entries),
        format!(
            "{} entries: {} planets, {} belts",
            entries,
            layout_a.planets.len(),
            layout_a.belts.len()
        ),
    ));

    let mut bad_palettes = 0;
    for (_, body) in world_a.query::<&OrbitingBody>().iter() {
        let in_range = body
            .palette
            .colors()
            .iter()
            .flat_map(|c| c.channels())
            .all(|v| (0.0..=1.0).contains(&v));
        if !in_range {
            bad_palettes += 1;
        }
        if verbose {
            println!(
                "    planet {} at {:.1}: {:?}, radius {:.1}, ring {}",
                body.id,
                body.distance,
                body.visual_type,
                body.radius,
                body.has_ring()
            );
        }
    }
    results.push(check(
        "planet_palettes_in_range",
        bad_palettes == 0,
        format!("{} planets with out-of-range colors", bad_palettes),
    ));

    let obelisks = world_a.query::<&Obelisk>().iter().count();
    results.push(check(
        "obelisk_ring_complete",
        obelisks == 8,
        format!("{} obelisks", obelisks),
    ));

    results
}

// ── 3. Activation Choreography ──────────────────────────────────────────

fn sample(world: &mut World, layout: &SceneLayout, param: ParamId) -> Option<ParamValue> {
    SceneParams::new(world, layout).get(param)
}

fn validate_choreography(config: &EngineConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Activation Choreography ---");
    let mut results = Vec::new();

    let (mut world, layout) = generate(config);
    let mut choreographer = Choreographer::new();
    let phrase = PortalConfig::from_phrase("open the gate");
    choreographer.apply(&phrase);

    // sample on a 60 Hz clock
    let checkpoints = [0.25, 1.1, 3.7];
    let mut samples: HashMap<u32, Vec<(ParamId, Option<ParamValue>)>> = HashMap::new();
    let mut elapsed = 0.0;
    for (i, &checkpoint) in checkpoints.iter().enumerate() {
        while elapsed < checkpoint - 1e-9 {
            choreographer.advance(1.0 / 60.0, &mut SceneParams::new(&mut world, &layout));
            elapsed += 1.0 / 60.0;
        }
        let params = [
            ParamId::CorePulseSpeed,
            ParamId::PortalOpenness,
            ParamId::RingActivation,
            ParamId::CameraShake,
            ParamId::ParticleFlow,
        ];
        let values = params
            .iter()
            .map(|&p| (p, sample(&mut world, &layout, p)))
            .collect();
        samples.insert(i as u32, values);
    }

    if verbose {
        for (i, checkpoint) in checkpoints.iter().enumerate() {
            println!("    t={:.2}s", checkpoint);
            for (param, value) in &samples[&(i as u32)] {
                println!("      {:?} = {:?}", param, value);
            }
        }
    }

    let scalar_at = |i: u32, param: ParamId| -> f32 {
        samples[&i]
            .iter()
            .find(|(p, _)| *p == param)
            .and_then(|(_, v)| v.and_then(|v| v.as_scalar()))
            .unwrap_or(f32::NAN)
    };

    results.push(check(
        "curtain_waits_for_offset",
        scalar_at(0, ParamId::PortalOpenness) == 0.0,
        format!("openness {:.3} at 0.25s", scalar_at(0, ParamId::PortalOpenness)),
    ));
    results.push(check(
        "shake_fires_at_ignition",
        scalar_at(0, ParamId::CameraShake) == 0.0
            && scalar_at(1, ParamId::CameraShake) == SHAKE_MAGNITUDE,
        format!(
            "shake {:.2} -> {:.2}",
            scalar_at(0, ParamId::CameraShake),
            scalar_at(1, ParamId::CameraShake)
        ),
    ));
    results.push(check(
        "pulse_peaks",
        scalar_at(1, ParamId::CorePulseSpeed) == PULSE_HIGH,
        format!("pulse {:.2} at 1.1s", scalar_at(1, ParamId::CorePulseSpeed)),
    ));
    results.push(check(
        "activation_settles",
        scalar_at(2, ParamId::PortalOpenness) == 1.0
            && scalar_at(2, ParamId::RingActivation) == 1.0
            && scalar_at(2, ParamId::ParticleFlow) == PARTICLE_FLOW_FAST,
        format!(
            "openness {:.3}, ring {:.3}, flow {:.2}",
            scalar_at(2, ParamId::PortalOpenness),
            scalar_at(2, ParamId::RingActivation),
            scalar_at(2, ParamId::ParticleFlow)
        ),
    ));

    // Re-trigger: exactly one live track per parameter
    choreographer.apply(&phrase);
    choreographer.apply(&PortalConfig::from_phrase("again"));
    let stacked: Vec<ParamId> = choreographer
        .transitions()
        .iter()
        .map(|t| t.param)
        .filter(|&p| choreographer.transitions().live_count(p) != 1)
        .collect();
    results.push(check(
        "retrigger_replaces_tracks",
        stacked.is_empty(),
        format!(
            "{} live tracks, stacked: {:?}",
            choreographer.transitions().len(),
            stacked
        ),
    ));

    // Deactivation closes the curtain within one second
    for _ in 0..240 {
        choreographer.advance(1.0 / 60.0, &mut SceneParams::new(&mut world, &layout));
    }
    choreographer.apply(&PortalConfig::closed());
    for _ in 0..60 {
        choreographer.advance(1.0 / 60.0, &mut SceneParams::new(&mut world, &layout));
    }
    let openness = sample(&mut world, &layout, ParamId::PortalOpenness)
        .and_then(|v| v.as_scalar())
        .unwrap_or(f32::NAN);
    results.push(check(
        "deactivation_closes_curtain",
        openness < 1e-3,
        format!("openness {:.4} after 1.0s", openness),
    ));

    results
}

// ── 4. Interactive Session ──────────────────────────────────────────────

fn run(experience: &mut Experience, seconds: f32, dt: f32) {
    let frames = (seconds / dt).round() as u32;
    for _ in 0..frames {
        experience.update(dt);
    }
}

fn lock_and_face_core(experience: &mut Experience) {
    experience.handle(InputEvent::Click);
    experience.handle(InputEvent::LockAcquired);
    let pose = experience.camera_pose();
    let core_height = experience
        .world
        .get::<&CoreEntity>(experience.layout.core)
        .map(|c| c.base_height)
        .unwrap_or(4.0);
    let pitch = ((core_height - pose.position.y) / pose.position.z).atan();
    experience.handle(InputEvent::PointerMotion {
        dx: 0.0,
        dy: -pitch / experience.config().sim.look_sensitivity,
    });
}

fn validate_session(config: &EngineConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Interactive Session ---");
    let mut results = Vec::new();

    let (audio, audio_log) = RecordingAudio::new();
    let (speech, speech_log) = ScriptedSpeech::new();
    let mut experience =
        match Experience::with_rng_seed(config.clone(), Box::new(audio), Some(Box::new(speech)), 7)
        {
            Ok(experience) => experience,
            Err(e) => {
                results.push(check("session_start", false, e.to_string()));
                return results;
            }
        };

    lock_and_face_core(&mut experience);
    results.push(check(
        "lock_acquired",
        experience.is_locked() && experience.audio().is_transport_running(),
        "locked with transport running".into(),
    ));

    run(&mut experience, 0.6, 1.0 / 60.0);
    results.push(check(
        "gaze_saturates",
        (experience.gaze() - 1.0).abs() < 1e-6,
        format!("gaze {:.4} after 0.6s", experience.gaze()),
    ));
    results.push(check(
        "drone_follows_gaze",
        experience.audio().is_drone_active(),
        "core drone active".into(),
    ));

    run(&mut experience, 8.0, 1.0 / 60.0);
    let notes = audio_log
        .borrow()
        .iter()
        .filter(|c| matches!(c, AudioCommand::Play { voice: Voice::Arp, .. }))
        .count();
    results.push(check(
        "score_plays",
        notes > 0,
        format!("{} arpeggio notes in 8s", notes),
    ));

    experience.handle(InputEvent::KeyDown(Key::Speak));
    let listening = experience.voice().is_listening();
    experience.handle(InputEvent::Transcript("open the gate".into()));
    experience.handle(InputEvent::KeyUp(Key::Speak));
    let expected = derive_color("open the gate");
    results.push(check(
        "voice_phrase_opens_portal",
        listening
            && experience.portal().is_open
            && experience.portal().color == expected
            && *speech_log.borrow() == vec![SpeechCall::Start, SpeechCall::Stop],
        format!("portal {} (expected {})", experience.portal().color, expected),
    ));

    run(&mut experience, 4.0, 1.0 / 60.0);
    let uniforms = &experience.frame().uniforms;
    let ring = uniforms.get_color(RenderTarget::Obelisks, "uColor");
    results.push(check(
        "ring_takes_portal_color",
        ring.map(|c| c.to_hex_string()) == Some(expected.clone()),
        format!("ring {:?}", ring.map(|c| c.to_hex_string())),
    ));

    experience.handle(InputEvent::LockReleased);
    let refused = !experience.request_lock();
    run(&mut experience, 1.5, 1.0 / 60.0);
    results.push(check(
        "lock_cooldown",
        refused && experience.request_lock() && !experience.audio().is_transport_running(),
        "re-lock refused inside cooldown, accepted after".into(),
    ));

    if verbose {
        println!(
            "    {} audio commands, {} activations, t={:.2}s",
            audio_log.borrow().len(),
            experience.choreographer().activations(),
            experience.time()
        );
    }

    results
}

// ── 5. Frame-rate independence ──────────────────────────────────────────

fn light_after(config: &EngineConfig, dt: f32) -> Option<f32> {
    let (audio, _) = RecordingAudio::new();
    let mut experience = Experience::with_rng_seed(config.clone(), Box::new(audio), None, 9).ok()?;
    lock_and_face_core(&mut experience);
    run(&mut experience, 0.5, dt);
    experience
        .frame()
        .uniforms
        .get_scalar(RenderTarget::CoreLight, "intensity")
}

fn validate_frame_rates(config: &EngineConfig) -> Vec<TestResult> {
    println!("--- Frame-rate Independence ---");
    let slow = light_after(config, 1.0 / 30.0);
    let fast = light_after(config, 1.0 / 120.0);
    let passed = match (slow, fast) {
        (Some(a), Some(b)) => (a - b).abs() < 1e-2,
        _ => false,
    };
    vec![check(
        "easing_frame_rate_independent",
        passed,
        format!("core light at 30 Hz {:?}, at 120 Hz {:?}", slow, fast),
    )]
}
