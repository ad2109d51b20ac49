/// Broad failure category, used by callers (and tests) that need to branch on
/// what went wrong rather than on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote series source unreachable or returned something unusable.
    Fetch,
    /// A recession window had no usable data to take a peak from.
    NoPeakFound,
    /// Cache mode was requested but the expected local file is absent.
    CacheMiss,
    /// Bad user input or configuration.
    Input,
    /// Local file read/write failure.
    Io,
    /// Chart drawing failure.
    Render,
    /// Terminal preview failure.
    Terminal,
}

impl ErrorKind {
    fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Input | ErrorKind::CacheMiss => 2,
            ErrorKind::NoPeakFound => 3,
            ErrorKind::Fetch => 4,
            ErrorKind::Io | ErrorKind::Render => 5,
            ErrorKind::Terminal => 6,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn no_peak_found(window_label: &str) -> Self {
        Self::new(
            ErrorKind::NoPeakFound,
            format!("No peak found: recession window {window_label} has no non-missing values in its search range."),
        )
    }

    pub fn cache_miss(path: &std::path::Path) -> Self {
        Self::new(
            ErrorKind::CacheMiss,
            format!("Cache file '{}' not found (run without --from-cache to download).", path.display()),
        )
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Render, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::input("x").exit_code(), 2);
        assert_eq!(AppError::no_peak_found("1945").exit_code(), 3);
        assert_eq!(AppError::fetch("down").exit_code(), 4);
        assert_eq!(AppError::cache_miss(std::path::Path::new("a.csv")).kind(), ErrorKind::CacheMiss);
    }

    #[test]
    fn no_peak_message_names_window() {
        let err = AppError::no_peak_found("1937-1938");
        assert!(err.to_string().contains("1937-1938"));
    }
}
