//! Protocol error types

/// Errors that indicate a misbehaving collaborator or a reference to an
/// operation the grid does not know about. Never recovered silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The request named a mass action index that is not registered.
    #[error("Mass action {0} is not defined")]
    MassActionNotDefined(usize),

    /// The mass action's callback cannot be invoked.
    #[error("Callback {0:?} is not callable")]
    CallbackNotCallable(String),

    /// A controller callback was named but no dispatcher is available.
    #[error("No sub-request dispatcher is configured for callback {0:?}")]
    DispatcherMissing(String),

    /// The request named an export index that is not registered.
    #[error("Export {0} is not defined")]
    ExportNotDefined(usize),

    /// The request named a tweak id that is not registered.
    #[error("Tweak with id {0:?} doesn't exist")]
    TweakNotFound(String),

    /// The source failed while executing the query.
    #[error("Source execution failed: {0}")]
    Execution(String),
}
