//! Forces acting on grains.
//!
//! Gas drag depends on the interpolated gas state and the grain species;
//! external forces come from the rotating shearing frame. Both return
//! accelerations.

mod drag;
mod external;


pub use drag::{Drag, DragForce};
pub use external::ExternalForce;
