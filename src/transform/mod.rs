//! Reshaping of loaded series before rendering.
//!
//! - peak alignment across recession windows (`align`)
//! - recession overlay clipping for date-axis charts (`overlay`)

pub mod align;
pub mod overlay;

pub use align::*;
pub use overlay::*;
