//! `recession-charts` library crate.
//!
//! The binary (`rc`) is a thin wrapper around this library so that:
//!
//! - the pipelines are testable without spawning processes
//! - data loading, alignment and rendering stay reusable on their own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod render;
pub mod report;
pub mod transform;
pub mod tui;
