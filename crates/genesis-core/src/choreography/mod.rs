//! Choreography - scripted parameter transitions for the portal show.

mod choreographer;
mod easing;
mod params;
mod timeline;
mod transition;

pub use choreographer::*;
pub use easing::*;
pub use params::*;
pub use timeline::*;
pub use transition::*;
