//! Terminal summaries printed after each run.

pub mod format;

pub use format::*;
