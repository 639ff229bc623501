//! Core runtime for trimql: selection walking, filter compilation, the
//! projection compiler, result adaptation, and cardinality reduction.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod adapter;
pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod obs;
pub mod page;
pub mod predicate;
pub mod projection;
pub mod property;
pub mod reduce;
pub mod schema;
pub mod selection;
pub mod source;
pub mod traits;
pub mod value;
pub mod walker;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, engines, caches, or metrics helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        field::{FieldContext, ProjectedField, ProjectionMode},
        predicate::Predicate,
        property::PropertyType,
        schema::{FieldDef, Schema, TypeRef},
        selection::{FieldNode, SelectionSet},
        source::Resolved,
        traits::{Entity, FieldValue},
        value::{Record, Value},
    };
}
