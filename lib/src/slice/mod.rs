//! Layer regions as seen by the fill engine.
//!
//! - [`Surface`] - A classified region of one layer, ready to be filled
//! - [`SurfaceType`] - Its classification (top, bottom, bridge, internal, ...)

mod surface;

pub use surface::{Surface, SurfaceType};
