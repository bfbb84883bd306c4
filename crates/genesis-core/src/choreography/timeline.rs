//! The fixed show scripts. Timing literals are tuned for feel.

use super::easing::Ease;
use super::params::{ParamId, ParamValue};
use super::transition::{Segment, Transition};
use crate::components::Color;

/// Pulse rate the core winds up to on activation
pub const PULSE_HIGH: f32 = 30.0;
pub const PULSE_BASELINE: f32 = 1.0;
pub const AUDIO_BURST_PEAK: f32 = 2.0;
pub const AUDIO_BURST_REST: f32 = 0.0;
pub const CROWN_PULSE_SCALE: f32 = 1.8;
pub const CROWN_REST_SCALE: f32 = 1.0;
pub const SHAKE_MAGNITUDE: f32 = 1.5;
pub const PARTICLE_FLOW_FAST: f32 = 15.0;
pub const PARTICLE_FLOW_BASELINE: f32 = 1.0;
/// Offset at which the shockwave effects fire
pub const IGNITION: f64 = 1.0;

fn scalar(v: f32) -> ParamValue {
    ParamValue::Scalar(v)
}

/// The ignition sequence for a portal of `color`
pub fn activation_timeline(color: Color) -> Vec<Transition> {
    let color = ParamValue::Color(color);
    vec![
        Transition::single(
            ParamId::CorePulseSpeed,
            Segment::new(0.0, 1.0, scalar(PULSE_HIGH), Ease::Power3In),
        ),
        Transition::single(
            ParamId::CoreAudioBurst,
            Segment::new(0.0, 0.5, scalar(AUDIO_BURST_PEAK), Ease::Power1Out)
                .yoyo(4)
                .from_rest(scalar(AUDIO_BURST_REST)),
        ),
        Transition::single(ParamId::PortalColor, Segment::instant(0.0, color)),
        Transition::single(
            ParamId::FlareColor,
            Segment::new(0.0, 0.5, color, Ease::Power1Out),
        ),
        Transition::single(
            ParamId::RingColor,
            Segment::new(0.0, 1.5, color, Ease::Power2InOut),
        ),
        Transition::single(
            ParamId::CrownScale,
            Segment::new(0.0, 0.5, scalar(CROWN_PULSE_SCALE), Ease::Power1Out)
                .yoyo(4)
                .from_rest(scalar(CROWN_REST_SCALE)),
        ),
        Transition::single(
            ParamId::RingActivation,
            Segment::new(0.5, 2.0, scalar(1.0), Ease::Power3Out),
        ),
        Transition::single(
            ParamId::PortalOpenness,
            Segment::new(0.5, 3.0, scalar(1.0), Ease::Power2InOut),
        ),
        Transition::single(
            ParamId::CameraShake,
            Segment::instant(IGNITION, scalar(SHAKE_MAGNITUDE)),
        ),
        Transition::new(
            ParamId::Aberration,
            vec![
                Segment::new(IGNITION, 0.2, scalar(0.035), Ease::Power2Out),
                Segment::new(1.2, 1.5, scalar(0.002), Ease::ElasticOut),
            ],
        ),
        Transition::new(
            ParamId::BloomStrength,
            vec![
                Segment::new(IGNITION, 0.2, scalar(0.3), Ease::Power1Out),
                Segment::new(1.3, 2.0, scalar(0.0), Ease::Power1Out),
            ],
        ),
        Transition::new(
            ParamId::BloomRadius,
            vec![
                Segment::new(IGNITION, 0.2, scalar(0.5), Ease::Power1Out),
                Segment::new(1.3, 2.0, scalar(0.1), Ease::Power1Out),
            ],
        ),
        Transition::single(
            ParamId::ParticleFlow,
            Segment::new(IGNITION, 2.0, scalar(PARTICLE_FLOW_FAST), Ease::Power2In),
        ),
    ]
}

/// The quieter reversal. No shake, aberration or bloom.
pub fn deactivation_timeline() -> Vec<Transition> {
    vec![
        Transition::single(
            ParamId::PortalOpenness,
            Segment::new(0.0, 1.0, scalar(0.0), Ease::Power2In),
        ),
        Transition::single(
            ParamId::CorePulseSpeed,
            Segment::new(0.0, 1.0, scalar(PULSE_BASELINE), Ease::Power1Out),
        ),
        Transition::single(
            ParamId::ParticleFlow,
            Segment::new(0.0, 2.0, scalar(PARTICLE_FLOW_BASELINE), Ease::Power1Out),
        ),
        Transition::single(
            ParamId::RingActivation,
            Segment::new(0.0, 1.5, scalar(0.0), Ease::Power2InOut),
        ),
    ]
}

/// Startup fade-in of the asteroid belts
pub fn intro_timeline() -> Vec<Transition> {
    vec![Transition::single(
        ParamId::BeltReveal,
        Segment::new(0.5, 4.0, scalar(1.0), Ease::Power2Out),
    )]
}
