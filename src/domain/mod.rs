//! Domain types used throughout the pipelines.
//!
//! This module defines:
//!
//! - dated series / tables (`TimePoint`, `DatedTable`)
//! - command-line date sentinels (`DateSpec`)
//! - recession reference data (`RecessionWindow`, `RecessionInterval`)
//! - derived outputs (`PeakRecord`, `Rectangle`)

pub mod recessions;
pub mod types;

pub use recessions::*;
pub use types::*;
