//! State error types

/// Errors raised when a grid operation is invoked out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// No source has been attached before request handling.
    #[error("The source of the grid has not been set")]
    SourceNotSet,

    /// Request-derived state was read before any request was handled.
    #[error("Filters cannot be accessed before a request has been handled")]
    NoRequestHandled,
}
