//! Series sources: the FRED client and the historical employment splice.

pub mod fred;
pub mod splice;

pub use fred::*;
pub use splice::*;
