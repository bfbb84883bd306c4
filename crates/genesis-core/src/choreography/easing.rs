//! Easing curves.
//!
//! The power family follows the usual tween-library naming: power1 is
//! quadratic, power2 cubic, power3 quartic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    Power1In,
    #[default]
    Power1Out,
    Power1InOut,
    Power2In,
    Power2Out,
    Power2InOut,
    Power3In,
    Power3Out,
    Power3InOut,
    /// Overshooting settle, amplitude 1, period 0.3
    ElasticOut,
}

const ELASTIC_PERIOD: f32 = 0.3;

impl Ease {
    /// Map progress in [0, 1] to eased progress. Input is clamped, and
    /// every curve hits 0 and 1 exactly at the ends.
    pub fn apply(self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        if p == 0.0 || p == 1.0 {
            return p;
        }
        match self {
            Ease::Linear => p,
            Ease::Power1In => ease_in(p, 2),
            Ease::Power1Out => ease_out(p, 2),
            Ease::Power1InOut => ease_in_out(p, 2),
            Ease::Power2In => ease_in(p, 3),
            Ease::Power2Out => ease_out(p, 3),
            Ease::Power2InOut => ease_in_out(p, 3),
            Ease::Power3In => ease_in(p, 4),
            Ease::Power3Out => ease_out(p, 4),
            Ease::Power3InOut => ease_in_out(p, 4),
            Ease::ElasticOut => elastic_out(p),
        }
    }
}

fn ease_in(p: f32, power: i32) -> f32 {
    p.powi(power)
}

fn ease_out(p: f32, power: i32) -> f32 {
    1.0 - (1.0 - p).powi(power)
}

fn ease_in_out(p: f32, power: i32) -> f32 {
    if p < 0.5 {
        (2.0 * p).powi(power) / 2.0
    } else {
        1.0 - (2.0 * (1.0 - p)).powi(power) / 2.0
    }
}

fn elastic_out(p: f32) -> f32 {
    // phase offset for amplitude 1 is period / 4
    let offset = ELASTIC_PERIOD / 4.0;
    2f32.powf(-10.0 * p) * ((p - offset) * std::f32::consts::TAU / ELASTIC_PERIOD).sin() + 1.0
}
