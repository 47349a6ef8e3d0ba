//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: caucus_core::config::ConfigError,
    },

    /// A roster file could not be loaded.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: caucus_core::roster::RosterError,
    },

    /// The initial simulation state could not be assembled.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: caucus_core::tick::SetupError,
    },

    /// The nested model could not be built.
    #[error("nested model error: {source}")]
    Nested {
        /// The underlying agent error.
        #[from]
        source: caucus_agents::AgentError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: caucus_core::runner::RunnerError,
    },

    /// The snapshot directory could not be prepared.
    #[error("snapshot directory {}: {source}", .path.display())]
    SnapshotDir {
        /// The directory.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
