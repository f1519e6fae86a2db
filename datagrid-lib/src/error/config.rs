//! Configuration error types

/// Errors raised by grid configuration misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A source was already attached to this grid.
    #[error("A source has already been set on this grid")]
    SourceAlreadySet,

    /// The limits input was empty or contained a zero limit.
    #[error("Limit values must be positive integers")]
    InvalidLimits,

    /// A negative page number was supplied.
    #[error("Page must not be negative: {0}")]
    InvalidPage(i64),

    /// An order direction was neither `asc` nor `desc`.
    #[error("Order direction is not valid: {0:?}")]
    InvalidOrder(String),

    /// A column id was referenced that is not part of the grid.
    #[error("Column with id {0:?} doesn't exist")]
    ColumnNotFound(String),

    /// A column with the same id is already registered.
    #[error("Column with id {0:?} already exists")]
    DuplicateColumn(String),

    /// The default limit is not among the configured limits.
    #[error("Limit {0} is not defined in limits")]
    LimitNotDefined(u64),

    /// A tweak id contained characters outside `[0-9a-zA-Z_+-]`.
    #[error("Tweak id {0:?} is malformed, only [0-9a-zA-Z_+-] characters are allowed")]
    MalformedTweakId(String),

    /// No column is flagged as primary.
    #[error("Primary column doesn't exist")]
    PrimaryColumnMissing,
}
