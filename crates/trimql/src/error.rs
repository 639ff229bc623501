use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use trimql_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// True when a single-element field matched more than one element.
    #[must_use]
    pub const fn is_not_unique(&self) -> bool {
        matches!(self.kind, ErrorKind::Field(FieldErrorKind::NotUnique))
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Conflict if err.is_not_unique() => ErrorKind::Field(FieldErrorKind::NotUnique),
            ErrorClass::Unsupported => ErrorKind::Field(FieldErrorKind::Unsupported),
            ErrorClass::Schema => ErrorKind::Schema,
            ErrorClass::Conflict | ErrorClass::Internal | ErrorClass::InvariantViolation => {
                ErrorKind::Internal
            }
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for resolver hosts.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Field(FieldErrorKind),

    /// Schema, filter type, or configuration defect; fix the setup, not the request.
    Schema,

    /// The caller cannot remediate this.
    Internal,
}

///
/// FieldErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldErrorKind {
    /// A single-element field matched more than one element.
    NotUnique,

    /// The request exceeds a configured limit or uses an unsupported shape.
    Unsupported,
}

///
/// ErrorOrigin
/// Public origin taxonomy for resolver hosts.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Filter,
    Projection,
    Reduce,
    Schema,
    Selection,
    Source,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Filter => Self::Filter,
            CoreErrorOrigin::Projection => Self::Projection,
            CoreErrorOrigin::Reduce => Self::Reduce,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Selection => Self::Selection,
            CoreErrorOrigin::Source => Self::Source,
        }
    }
}
