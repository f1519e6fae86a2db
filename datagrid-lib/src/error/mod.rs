//! Error types

mod config;
mod source;
mod state;

pub use config::*;
pub use source::*;
pub use state::*;

/// Top-level error type covering every failure the grid can surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Misconfiguration detected at the point of misuse.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Operation invoked in a state that does not support it.
    #[error(transparent)]
    State(#[from] StateError),

    /// A collaborator broke its contract while serving a request.
    #[error(transparent)]
    Source(#[from] SourceError),
}
