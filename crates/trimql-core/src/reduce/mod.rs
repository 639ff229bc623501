//! Cardinality reduction: sequence-shaped results → zero-or-one element.

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError},
    obs::{
        ReduceKind,
        sink::{self, MetricsEvent},
    },
    source::Resolved,
    traits::Reducible,
};
use thiserror::Error as ThisError;

///
/// ReduceError
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum ReduceError {
    #[error("sequence contains more than one element")]
    NotUnique,
}

impl ReduceError {
    pub(crate) const fn class(self) -> ErrorClass {
        match self {
            Self::NotUnique => ErrorClass::Conflict,
        }
    }
}

impl From<ReduceError> for InternalError {
    fn from(err: ReduceError) -> Self {
        Self {
            class: err.class(),
            origin: ErrorOrigin::Reduce,
            message: err.to_string(),
            detail: Some(ErrorDetail::Reduce(err)),
        }
    }
}

/// Reduce a resolved result to `Resolved::Item`.
///
/// Deferred queries use the engine's own terminal; sequences and streams are
/// consumed only as far as the reduction needs. Other shapes pass through.
pub async fn reduce<E: Send + 'static>(
    kind: ReduceKind,
    result: Resolved<E>,
) -> Result<Resolved<E>, InternalError> {
    let Some(shape) = result.shape() else {
        return Ok(result);
    };

    let reduced = match result {
        Resolved::Deferred(query) => reduce_with(kind, query).await,
        Resolved::Sequence(items) => reduce_with(kind, items).await,
        Resolved::Stream(stream) => reduce_with(kind, stream).await,
        other => {
            tracing::debug!(?shape, ?kind, "result shape is not reducible; passed through");
            return Ok(other);
        }
    };

    sink::record(MetricsEvent::Reduced { kind, shape });
    match reduced {
        Ok(item) => Ok(Resolved::Item(item)),
        Err(err) => {
            if err.is_not_unique() {
                sink::record(MetricsEvent::SingleViolation);
                tracing::debug!(?shape, "single-element field resolved more than one element");
            }
            Err(err)
        }
    }
}

async fn reduce_with<E, R: Reducible<E>>(
    kind: ReduceKind,
    source: R,
) -> Result<Option<E>, InternalError> {
    match kind {
        ReduceKind::Single => source.reduce_single().await,
        ReduceKind::First => source.reduce_first().await,
    }
}
