//! Systems - per-frame logic run by the experience each update.

mod cinematics;
mod core_fx;
mod decor;
mod gaze;
mod lock;
mod locomotion;
mod orbits;

pub use cinematics::*;
pub use core_fx::*;
pub use decor::*;
pub use gaze::*;
pub use lock::*;
pub use locomotion::*;
pub use orbits::*;
