//! Error types for the wisp application shell.

/// Top-level error type for the shell and its auto-updater.
#[derive(Debug, thiserror::Error)]
pub enum WispError {
    /// The running platform has no update backend.
    #[error("unsupported platform for auto-updater: {0}")]
    UnsupportedPlatform(String),

    /// Update check error (feed request, malformed response).
    #[error("update check failed: {0}")]
    Check(String),

    /// Update artifact download error.
    #[error("download failed: {0}")]
    Download(String),

    /// Update installation error (artifact placement, installer launch).
    #[error("install failed: {0}")]
    Install(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, WispError>;
