//! Error types for the scout-core crate.
//!
//! Only configuration problems and a failure to acquire the browser session
//! ever reach the caller. Per-candidate degradations (unparseable sizes,
//! missing indicators, slow pages) are recovered inside the pipeline and
//! show up in logs, never here.

/// Errors that can end a scouting run.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A feed profile contains a CSS selector that does not compile.
    #[error("selector error: {0}")]
    Selector(String),

    /// The browser session or its default page could not be acquired.
    #[error("session error: {0}")]
    Session(#[from] DriverError),
}

/// Failures reported by a page driver implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    /// The driver could not create a browser session or page.
    #[error("could not open session: {0}")]
    Open(String),

    /// Navigation failed outright (not a timeout).
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A script evaluated in the page failed or returned garbage.
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// Any other driver-level failure (closed window, lost connection, ...).
    #[error("driver error: {0}")]
    Other(String),
}

/// Convenience type alias for scout-core results.
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = ScoutError::Config("keywords must not be empty".into());
        assert_eq!(err.to_string(), "config error: keywords must not be empty");
    }

    #[test]
    fn display_selector() {
        let err = ScoutError::Selector("result: `[[`".into());
        assert_eq!(err.to_string(), "selector error: result: `[[`");
    }

    #[test]
    fn session_wraps_driver_error() {
        let err: ScoutError = DriverError::Open("connection refused".into()).into();
        assert_eq!(
            err.to_string(),
            "session error: could not open session: connection refused"
        );
    }

    #[test]
    fn display_driver_variants() {
        assert_eq!(
            DriverError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()).to_string(),
            "navigation failed: net::ERR_NAME_NOT_RESOLVED"
        );
        assert_eq!(
            DriverError::Script("undefined is not a function".into()).to_string(),
            "script evaluation failed: undefined is not a function"
        );
        assert_eq!(
            DriverError::Other("no such window".into()).to_string(),
            "driver error: no such window"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoutError>();
        assert_send_sync::<DriverError>();
    }
}
