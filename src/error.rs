//! Error types for the creator-scout application.

/// Top-level error type for the scouting tool.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file or override error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebDriver session could not be established or driven.
    #[error("webdriver error: {0}")]
    WebDriver(#[from] scout_core::DriverError),

    /// The scouting pipeline failed.
    #[error(transparent)]
    Scout(#[from] scout_core::ScoutError),

    /// Records could not be serialized.
    #[error("output error: {0}")]
    Output(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
