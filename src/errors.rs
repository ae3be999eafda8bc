use thiserror::Error;

/// Error raised when a textual representation cannot be parsed.
///
/// Carries the offending input fragment and a short reason so callers can
/// report where parsing stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at '{fragment}': {reason}")]
pub struct ParseError {
    pub fragment: String,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reported by temporal operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemporalError {
    /// Malformed WKT/WKB input.
    #[error("invalid input: {0}")]
    TextInput(String),

    /// An argument value outside the operation's domain.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Two spatial operands carry different SRIDs.
    #[error("SRID mismatch: operands have SRIDs {left} and {right}")]
    SridMismatch { left: i32, right: i32 },

    /// 2D/3D (or X/T) dimensions of the operands do not line up.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Linear interpolation requested for a base type that is not continuous.
    #[error("interpolation not allowed: {0}")]
    InterpolationIllegal(String),

    /// A structural invariant does not hold (duplicate timestamps, unsorted
    /// instants, inverted bounds).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The per-base-type dispatch has no implementation for the request.
    #[error("internal dispatch failure: {0}")]
    InternalDispatch(String),

    /// Timestamps given to an incremental constructor go backwards.
    #[error("restrict violation: {0}")]
    RestrictViolation(String),
}

impl From<ParseError> for TemporalError {
    fn from(e: ParseError) -> Self {
        TemporalError::TextInput(e.to_string())
    }
}

/// Convenience alias used across the crate.
pub type TemporalResult<T> = Result<T, TemporalError>;
