//! Activation choreographer - turns portal configs into scheduled shows.

use serde::{Deserialize, Serialize};

use super::params::{ParamId, ParamTarget};
use super::timeline::{activation_timeline, deactivation_timeline, intro_timeline};
use super::transition::TransitionSet;
use crate::components::Color;
use crate::voice::PortalConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShowState {
    #[default]
    Dormant,
    Active,
}

/// What a portal change started, for the audio layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShowCue {
    Opened { color: Color, description: String },
    Closed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choreographer {
    state: ShowState,
    transitions: TransitionSet,
    activations: u32,
}

impl Choreographer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ShowState {
        self.state
    }

    /// Number of activation sequences started this session
    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub fn transitions(&self) -> &TransitionSet {
        &self.transitions
    }

    pub fn play_intro(&mut self) {
        self.transitions.schedule_all(intro_timeline());
    }

    /// React to a portal config. Opening always restarts the full
    /// activation; closing only reverses an active portal.
    pub fn apply(&mut self, config: &PortalConfig) -> Option<ShowCue> {
        if config.is_open {
            let color = config.parsed_color().unwrap_or_else(|| {
                log::warn!("Portal color '{}' is not #RRGGBB, using white", config.color);
                Color::WHITE
            });
            self.transitions.schedule_all(activation_timeline(color));
            self.state = ShowState::Active;
            self.activations += 1;
            log::info!(
                "Portal activation #{} for \"{}\" ({})",
                self.activations,
                config.description,
                config.color
            );
            Some(ShowCue::Opened {
                color,
                description: config.description.clone(),
            })
        } else if self.state == ShowState::Active {
            self.transitions.schedule_all(deactivation_timeline());
            self.state = ShowState::Dormant;
            log::info!("Portal deactivation");
            Some(ShowCue::Closed)
        } else {
            None
        }
    }

    pub fn advance(&mut self, dt: f64, target: &mut impl ParamTarget) {
        self.transitions.advance(dt, target);
    }

    /// Whether a running transition currently owns `param`
    pub fn holds(&self, param: ParamId) -> bool {
        self.transitions.holds(param)
    }
}
