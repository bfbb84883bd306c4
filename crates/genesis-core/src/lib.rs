//! Genesis Core - Procedural Portal Experience Engine
//!
//! Generates an explorable scene from a single seed (a reactive core, a
//! ring of obelisks around a portal, an orbiting solar system) and keeps
//! its animated parameters in step with a few interaction signals:
//! pointer lock, gaze pressure and spoken portal phrases.
//!
//! # Architecture
//!
//! The scene lives in a `hecs` ECS world:
//! - **Generation**: one seeded LCG pass builds every entity in a fixed order
//! - **Components**: pure data (planets, belts, the core, the portal, ...)
//! - **Systems**: per-frame logic over the world (gaze, orbits, core effects)
//! - **Choreography**: scheduled transitions for the portal activation show
//!
//! Rendering, audio synthesis and speech recognition stay outside the
//! crate, behind [`backend::RenderBackend`], [`audio::AudioBackend`] and
//! [`voice::SpeechEngine`].
//!
//! # Example
//!
//! ```rust,no_run
//! use genesis_core::prelude::*;
//!
//! let mut experience = Experience::new(
//!     EngineConfig::default(),
//!     Box::new(SilentAudio::default()),
//!     None,
//! )
//! .expect("default config is valid");
//! let mut renderer = NullRenderer::default();
//!
//! loop {
//!     experience.handle(InputEvent::KeyDown(Key::Forward));
//!     experience.update(1.0 / 60.0);
//!     experience.present(&mut renderer);
//! }
//! ```

pub mod audio;
pub mod backend;
pub mod camera;
pub mod choreography;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod input;
pub mod snapshot;
pub mod systems;
pub mod voice;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::audio::{AudioBackend, AudioCommand, RecordingAudio, SilentAudio};
    pub use crate::backend::{FrameOutput, HudState, NullRenderer, RenderBackend, RenderTarget};
    pub use crate::components::*;
    pub use crate::config::EngineConfig;
    pub use crate::engine::Experience;
    pub use crate::input::{InputEvent, Key};
    pub use crate::voice::{PortalConfig, SpeechEngine};
}
