//! ## Crate layout
//! - `core`: selection walking, filter compilation, projection, and reduction.
//! - `error`: the public error taxonomy for resolver hosts.
//!
//! The `prelude` module carries the vocabulary a resolver host needs to wrap
//! fields with [`ProjectedField`](core::field::ProjectedField).

pub use trimql_core as core;

mod error;

pub use error::{Error, ErrorKind, ErrorOrigin, FieldErrorKind};

use std::sync::Arc;
use trimql_core::{
    adapter::Projector,
    config::ProjectionConfig,
    error::InternalError,
    field::{FieldContext, ProjectedField},
    schema::Schema,
    source::Resolved,
    traits::Entity,
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Build a shared projector for `schema`.
///
/// `config` is the TOML text of a `[projection]` table; `None` keeps the
/// defaults.
///

pub fn projector(schema: Schema, config: Option<&str>) -> Result<Arc<Projector>, Error> {
    let projector = Projector::new(Arc::new(schema));
    let projector = match config {
        Some(source) => {
            let config = ProjectionConfig::from_toml_str(source).map_err(InternalError::from)?;
            projector.with_config(config)?
        }
        None => projector,
    };

    Ok(Arc::new(projector))
}

/// Resolve a projected field, mapping failures onto the public taxonomy.
pub async fn resolve<E: Entity + Send + 'static>(
    field: &ProjectedField<E>,
    ctx: &FieldContext,
) -> Result<Resolved<E>, Error> {
    field.resolve(ctx).await.map_err(Error::from)
}

///
/// Prelude
/// Domain vocabulary for resolver hosts.
///

pub mod prelude {
    pub use crate::{
        Error,
        core::{
            field::{FieldContext, ProjectedField, ProjectionMode},
            predicate::Predicate,
            schema::{FieldDef, InputObjectType, ObjectType, Schema, TypeRef},
            selection::{FieldNode, SelectionSet},
            source::{DeferredQuery, EntityStream, QueryEngine, Resolved},
            traits::{Entity, FieldValue},
            value::{Record, Value},
        },
    };
}
