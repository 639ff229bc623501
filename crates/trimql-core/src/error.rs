use crate::reduce::ReduceError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without origin-specific detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a projection-origin invariant violation.
    pub(crate) fn projection_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Projection,
            message.into(),
        )
    }

    /// Construct a selection-origin unsupported error.
    pub(crate) fn selection_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Selection, message.into())
    }

    /// Construct a source-origin internal error.
    pub fn source_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Source, message.into())
    }

    /// True when the error reports more than one element for a "single" field.
    #[must_use]
    pub const fn is_not_unique(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Reduce(ReduceError::NotUnique))
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Reduce(ReduceError),
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// A user-visible conflict with the field's declared cardinality.
    Conflict,
    Internal,
    InvariantViolation,
    /// Fatal schema or configuration defect; not a per-request condition.
    Schema,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::Schema => "schema",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Filter,
    Projection,
    Reduce,
    Schema,
    Selection,
    Source,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Filter => "filter",
            Self::Projection => "projection",
            Self::Reduce => "reduce",
            Self::Schema => "schema",
            Self::Selection => "selection",
            Self::Source => "source",
        };
        write!(f, "{label}")
    }
}
