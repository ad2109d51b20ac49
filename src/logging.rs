//! Process-wide logging bootstrap.
//!
//! Log records go to stderr through `flexi_logger`, so they never mix with the
//! summaries printed on stdout. `RUST_LOG` (when set) takes precedence over
//! the level given on the command line.

use std::sync::OnceLock;

use flexi_logger::{Logger, LoggerHandle};

use crate::error::AppError;

const SUPPORTED_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Initialize logging once; later calls are no-ops.
pub fn init_logging(level: &str) -> Result<(), AppError> {
    let level = normalize_level(level)?;
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let handle = Logger::try_with_env_or_str(level)
        .map_err(|e| AppError::input(format!("Invalid log specification '{level}': {e}")))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|e| AppError::io(format!("Failed to start logger: {e}")))?;

    let _ = LOGGER.set(handle);
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, AppError> {
    let wanted = level.trim().to_ascii_lowercase();
    SUPPORTED_LEVELS
        .iter()
        .copied()
        .find(|l| *l == wanted)
        .ok_or_else(|| {
            AppError::input(format!(
                "Unsupported log level '{level}' (expected one of: {}).",
                SUPPORTED_LEVELS.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_case_insensitive() {
        assert_eq!(normalize_level(" Debug ").unwrap(), "debug");
        assert!(normalize_level("verbose").is_err());
    }
}
