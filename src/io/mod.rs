//! Input/output helpers.
//!
//! - dated-table cache files (`cache`)
//! - wide peak-table export (`export`)
//! - recession reference table (`reference`)

pub mod cache;
pub mod export;
pub mod reference;

pub use cache::*;
pub use export::*;
pub use reference::*;
