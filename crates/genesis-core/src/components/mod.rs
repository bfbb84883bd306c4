//! Component definitions for the ECS world.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod celestial;
mod common;
mod landmarks;

pub use celestial::*;
pub use common::*;
pub use landmarks::*;
