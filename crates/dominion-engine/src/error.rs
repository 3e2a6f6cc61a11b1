//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Wraps every failure `main` can hit during startup so it can propagate
/// with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: dominion_core::ConfigError,
    },

    /// The session could not be built from the configuration.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: dominion_core::ActionError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
