//! Formatting errors and their C error codes.

use thiserror::Error;

/// Code reported across the C boundary when the last call succeeded.
pub const FORMAT_OK: i32 = 0;

/// Why a format request produced no buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("format string is NULL")]
    NullFormat,
    #[error("invalid directive at byte {offset}")]
    InvalidDirective { offset: usize },
    #[error("argument {index} is missing")]
    MissingArgument { index: usize },
    #[error("argument {index}: expected {expected}, found {found}")]
    ArgumentMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("rendered length {len} exceeds limit {limit}")]
    OutputTooLong { len: usize, limit: usize },
    #[error("allocation of {requested} bytes failed")]
    OutOfMemory { requested: usize },
}

impl FormatError {
    /// Stable code returned by `UnityTFLiteLastError`.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::NullFormat => 1,
            Self::InvalidDirective { .. } => 2,
            Self::MissingArgument { .. } => 3,
            Self::ArgumentMismatch { .. } => 4,
            Self::OutputTooLong { .. } => 5,
            Self::OutOfMemory { .. } => 6,
        }
    }

    /// Short machine-readable name, used in fixtures and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NullFormat => "null_format",
            Self::InvalidDirective { .. } => "invalid_directive",
            Self::MissingArgument { .. } => "missing_argument",
            Self::ArgumentMismatch { .. } => "argument_mismatch",
            Self::OutputTooLong { .. } => "output_too_long",
            Self::OutOfMemory { .. } => "out_of_memory",
        }
    }
}
