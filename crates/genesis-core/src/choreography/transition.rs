//! Scheduled transitions.
//!
//! A [`Transition`] is a keyframe track for one parameter: a list of
//! segments, each with a start offset, a duration and a target. Its value
//! is a pure function of time since it was scheduled; the only state it
//! keeps is the elapsed clock and the origin value, captured the moment
//! its first segment starts.

use serde::{Deserialize, Serialize};

use super::easing::Ease;
use super::params::{ParamId, ParamTarget, ParamValue};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Offset from when the track was scheduled, seconds
    pub start: f64,
    /// Length of one leg, seconds. Zero sets the target instantly.
    pub duration: f64,
    pub target: ParamValue,
    pub ease: Ease,
    /// Number of legs; every second leg plays back toward the segment's
    /// starting value
    pub legs: u32,
    /// Fixed starting value. When unset the segment starts from whatever
    /// the parameter holds when it begins.
    pub rest: Option<ParamValue>,
}

impl Segment {
    pub fn new(start: f64, duration: f64, target: ParamValue, ease: Ease) -> Self {
        Self {
            start,
            duration,
            target,
            ease,
            legs: 1,
            rest: None,
        }
    }

    pub fn instant(start: f64, target: ParamValue) -> Self {
        Self::new(start, 0.0, target, Ease::Linear)
    }

    /// Play there and back `legs` times in total
    pub fn yoyo(mut self, legs: u32) -> Self {
        self.legs = legs.max(1);
        self
    }

    /// Start from `rest` instead of the live value
    pub fn from_rest(mut self, rest: ParamValue) -> Self {
        self.rest = Some(rest);
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration * self.legs as f64
    }

    /// Resting value once every leg has played
    fn settled(&self, from: ParamValue) -> ParamValue {
        if self.legs % 2 == 0 {
            self.rest.unwrap_or(from)
        } else {
            self.target
        }
    }

    fn sample(&self, from: ParamValue, t: f64) -> ParamValue {
        if self.duration <= 0.0 || t >= self.end() {
            return self.settled(from);
        }
        let from = self.rest.unwrap_or(from);
        let local = (t - self.start).max(0.0);
        let leg = ((local / self.duration).floor() as u32).min(self.legs - 1);
        let p = ((local - leg as f64 * self.duration) / self.duration) as f32;
        if leg % 2 == 0 {
            from.lerp(&self.target, self.ease.apply(p))
        } else {
            from.lerp(&self.target, self.ease.apply(1.0 - p))
        }
    }
}

/// One parameter's track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub param: ParamId,
    segments: Vec<Segment>,
    elapsed: f64,
    origin: Option<ParamValue>,
}

impl Transition {
    /// Segments are sorted by start offset
    pub fn new(param: ParamId, mut segments: Vec<Segment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self {
            param,
            segments,
            elapsed: 0.0,
            origin: None,
        }
    }

    pub fn single(param: ParamId, segment: Segment) -> Self {
        Self::new(param, vec![segment])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn start(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.start)
    }

    pub fn end(&self) -> f64 {
        self.segments.iter().map(Segment::end).fold(0.0, f64::max)
    }

    pub fn has_started(&self) -> bool {
        self.elapsed >= self.start()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.end()
    }

    /// Final value given the origin
    pub fn final_value(&self, origin: ParamValue) -> ParamValue {
        self.segments.iter().fold(origin, |from, s| s.settled(from))
    }

    /// Value at time `t` since scheduling, or None before the first segment
    pub fn value_at(&self, origin: ParamValue, t: f64) -> Option<ParamValue> {
        if t < self.start() {
            return None;
        }
        let mut from = origin;
        for (i, segment) in self.segments.iter().enumerate() {
            let next_start = self.segments.get(i + 1).map(|n| n.start);
            match next_start {
                Some(next) if t >= next => from = segment.settled(from),
                _ => return Some(segment.sample(from, t)),
            }
        }
        Some(from)
    }

    /// Advance the clock and write the current value into `target`
    pub fn advance(&mut self, dt: f64, target: &mut impl ParamTarget) {
        self.elapsed += dt;
        if !self.has_started() {
            return;
        }
        let origin = match self.origin {
            Some(origin) => origin,
            None => {
                let current = target
                    .get(self.param)
                    .unwrap_or_else(|| self.final_value_without_origin());
                self.origin = Some(current);
                current
            }
        };
        if let Some(value) = self.value_at(origin, self.elapsed) {
            target.set(self.param, value);
        }
    }

    fn final_value_without_origin(&self) -> ParamValue {
        self.segments
            .last()
            .map_or(ParamValue::Scalar(0.0), |segment| segment.target)
    }
}

/// Every live transition, at most one per parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionSet {
    live: Vec<Transition>,
}

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `transition`, replacing any live one on the same parameter
    pub fn schedule(&mut self, transition: Transition) {
        self.cancel(transition.param);
        self.live.push(transition);
    }

    pub fn schedule_all(&mut self, transitions: impl IntoIterator<Item = Transition>) {
        for transition in transitions {
            self.schedule(transition);
        }
    }

    pub fn cancel(&mut self, param: ParamId) -> bool {
        let before = self.live.len();
        self.live.retain(|t| t.param != param);
        self.live.len() != before
    }

    /// Advance every transition and drop the finished ones
    pub fn advance(&mut self, dt: f64, target: &mut impl ParamTarget) {
        for transition in &mut self.live {
            transition.advance(dt, target);
        }
        self.live.retain(|t| !t.is_finished());
    }

    /// Whether a running transition currently owns `param`
    pub fn holds(&self, param: ParamId) -> bool {
        self.live
            .iter()
            .any(|t| t.param == param && t.has_started() && !t.is_finished())
    }

    /// Number of live transitions on `param` (scheduled or running)
    pub fn live_count(&self, param: ParamId) -> usize {
        self.live.iter().filter(|t| t.param == param).count()
    }

    pub fn get(&self, param: ParamId) -> Option<&Transition> {
        self.live.iter().find(|t| t.param == param)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.live.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scalar(target: &HashMap<ParamId, ParamValue>, param: ParamId) -> f32 {
        target[&param].as_scalar().unwrap()
    }

    #[test]
    fn test_single_segment_linear() {
        let mut target = HashMap::from([(ParamId::ParticleFlow, ParamValue::Scalar(1.0))]);
        let mut transition = Transition::single(
            ParamId::ParticleFlow,
            Segment::new(0.0, 2.0, ParamValue::Scalar(5.0), Ease::Linear),
        );

        transition.advance(1.0, &mut target);
        assert!((scalar(&target, ParamId::ParticleFlow) - 3.0).abs() < 1e-6);
        transition.advance(1.0, &mut target);
        assert_eq!(scalar(&target, ParamId::ParticleFlow), 5.0);
        assert!(transition.is_finished());
    }

    #[test]
    fn test_delay_leaves_value_untouched() {
        let mut target = HashMap::from([(ParamId::RingActivation, ParamValue::Scalar(0.2))]);
        let mut transition = Transition::single(
            ParamId::RingActivation,
            Segment::new(0.5, 1.0, ParamValue::Scalar(1.0), Ease::Linear),
        );

        transition.advance(0.4, &mut target);
        assert!(!transition.has_started());
        assert_eq!(scalar(&target, ParamId::RingActivation), 0.2);

        // origin is read when the delay elapses, not at scheduling
        target.insert(ParamId::RingActivation, ParamValue::Scalar(0.0));
        transition.advance(0.6, &mut target);
        assert!((scalar(&target, ParamId::RingActivation) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_yoyo_returns_to_origin() {
        let mut target = HashMap::from([(ParamId::CoreAudioBurst, ParamValue::Scalar(0.0))]);
        let mut transition = Transition::single(
            ParamId::CoreAudioBurst,
            Segment::new(0.0, 0.5, ParamValue::Scalar(2.0), Ease::Linear).yoyo(4),
        );
        assert_eq!(transition.end(), 2.0);

        transition.advance(0.5, &mut target);
        assert!((scalar(&target, ParamId::CoreAudioBurst) - 2.0).abs() < 1e-6);
        transition.advance(0.25, &mut target);
        assert!((scalar(&target, ParamId::CoreAudioBurst) - 1.0).abs() < 1e-6);
        transition.advance(1.25, &mut target);
        assert_eq!(scalar(&target, ParamId::CoreAudioBurst), 0.0);
    }

    #[test]
    fn test_yoyo_with_rest_ignores_live_value() {
        // restarted mid-burst: the live value sits at the peak
        let mut target = HashMap::from([(ParamId::CrownScale, ParamValue::Scalar(1.8))]);
        let mut transition = Transition::single(
            ParamId::CrownScale,
            Segment::new(0.0, 0.5, ParamValue::Scalar(1.8), Ease::Linear)
                .yoyo(4)
                .from_rest(ParamValue::Scalar(1.0)),
        );

        transition.advance(0.25, &mut target);
        assert!((scalar(&target, ParamId::CrownScale) - 1.4).abs() < 1e-6);
        transition.advance(1.75, &mut target);
        assert_eq!(scalar(&target, ParamId::CrownScale), 1.0);
        assert_eq!(
            transition.final_value(ParamValue::Scalar(1.8)),
            ParamValue::Scalar(1.0)
        );
    }

    #[test]
    fn test_chained_segments_hold_between() {
        let transition = Transition::new(
            ParamId::BloomStrength,
            vec![
                Segment::new(1.3, 2.0, ParamValue::Scalar(0.0), Ease::Linear),
                Segment::new(1.0, 0.2, ParamValue::Scalar(0.3), Ease::Linear),
            ],
        );
        let origin = ParamValue::Scalar(0.0);
        assert_eq!(transition.value_at(origin, 0.5), None);
        assert_eq!(transition.value_at(origin, 1.25), Some(ParamValue::Scalar(0.3)));
        let mid = transition.value_at(origin, 2.3).unwrap().as_scalar().unwrap();
        assert!((mid - 0.15).abs() < 1e-5);
        assert_eq!(transition.value_at(origin, 5.0), Some(ParamValue::Scalar(0.0)));
    }

    #[test]
    fn test_instant_segment() {
        let mut target = HashMap::from([(ParamId::CameraShake, ParamValue::Scalar(0.0))]);
        let mut set = TransitionSet::new();
        set.schedule(Transition::single(
            ParamId::CameraShake,
            Segment::instant(1.0, ParamValue::Scalar(1.5)),
        ));
        set.advance(0.9, &mut target);
        assert_eq!(scalar(&target, ParamId::CameraShake), 0.0);
        set.advance(0.1, &mut target);
        assert_eq!(scalar(&target, ParamId::CameraShake), 1.5);
        assert!(set.is_empty());
    }

    #[test]
    fn test_schedule_replaces_same_param() {
        let mut target = HashMap::from([(ParamId::PortalOpenness, ParamValue::Scalar(0.0))]);
        let mut set = TransitionSet::new();
        set.schedule(Transition::single(
            ParamId::PortalOpenness,
            Segment::new(0.0, 1.0, ParamValue::Scalar(1.0), Ease::Linear),
        ));
        set.advance(0.5, &mut target);
        set.schedule(Transition::single(
            ParamId::PortalOpenness,
            Segment::new(0.0, 1.0, ParamValue::Scalar(0.0), Ease::Linear),
        ));
        assert_eq!(set.live_count(ParamId::PortalOpenness), 1);

        set.advance(0.5, &mut target);
        // the newer track started from 0.5 and is halfway back
        assert!((scalar(&target, ParamId::PortalOpenness) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_holds_only_while_running() {
        let mut target = HashMap::from([(ParamId::CorePulseSpeed, ParamValue::Scalar(1.0))]);
        let mut set = TransitionSet::new();
        set.schedule(Transition::single(
            ParamId::CorePulseSpeed,
            Segment::new(0.5, 1.0, ParamValue::Scalar(30.0), Ease::Power3In),
        ));
        assert!(!set.holds(ParamId::CorePulseSpeed));
        set.advance(0.6, &mut target);
        assert!(set.holds(ParamId::CorePulseSpeed));
        set.advance(1.0, &mut target);
        assert!(!set.holds(ParamId::CorePulseSpeed));
        assert_eq!(scalar(&target, ParamId::CorePulseSpeed), 30.0);
    }
}
