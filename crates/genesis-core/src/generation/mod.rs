//! Generation - procedural creation of the scene from a single seed.

mod environment;
mod landmarks;
mod random;
mod scene;
mod solar;

pub use environment::*;
pub use landmarks::*;
pub use random::*;
pub use scene::*;
pub use solar::*;
