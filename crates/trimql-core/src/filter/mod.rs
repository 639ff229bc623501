//! Filter argument extraction and compilation.
//!
//! A list field may carry a filter argument whose literal is compiled into a
//! [`Predicate`] over the list's element type. Absence of the argument is not
//! an error; a literal the compiler rejects is.

mod convention;


use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    predicate::Predicate,
    schema::{FieldDef, InputObjectType, ObjectType, Schema, TypeDef},
    value::{Record, Value},
};
use thiserror::Error as ThisError;

// re-exports
pub use convention::ConventionFilterCompiler;

///
/// FilterError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FilterError {
    #[error("filter for '{entity}' expected {expected}, found {found}")]
    InvalidLiteral {
        entity: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("filter for '{entity}' references unknown field '{field}'")]
    UnknownField { entity: String, field: String },

    #[error("field '{entity}.{field}' cannot be filtered")]
    NotFilterable { entity: String, field: String },

    #[error("filter input '{input}' targets '{target}', but the list holds '{element}'")]
    EntityMismatch {
        input: String,
        target: String,
        element: String,
    },
}

impl FilterError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidLiteral { .. }
            | Self::UnknownField { .. }
            | Self::NotFilterable { .. }
            | Self::EntityMismatch { .. } => ErrorClass::Schema,
        }
    }
}

impl From<FilterError> for InternalError {
    fn from(err: FilterError) -> Self {
        Self::new(err.class(), ErrorOrigin::Filter, err.to_string())
    }
}

///
/// FilterCompiler
///
/// Converts a filter literal into a predicate over `entity`. Implementations
/// address members by backing name, not by GraphQL field name.
///

pub trait FilterCompiler: Send + Sync {
    fn compile(
        &self,
        schema: &Schema,
        input: &InputObjectType,
        entity: &ObjectType,
        literal: &Value,
    ) -> Result<Predicate, FilterError>;
}

///
/// FilterExtractor
/// Reads the configured filter argument off a list field and compiles it.
///

pub struct FilterExtractor<'a> {
    schema: &'a Schema,
    compiler: &'a dyn FilterCompiler,
    argument: &'a str,
}

impl<'a> FilterExtractor<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, compiler: &'a dyn FilterCompiler, argument: &'a str) -> Self {
        Self {
            schema,
            compiler,
            argument,
        }
    }

    /// Extract the element predicate for one list field.
    ///
    /// Returns `Ok(None)` when the argument is absent, `null`, or not declared
    /// as a filter input on `field`.
    pub fn extract(
        &self,
        field: &FieldDef,
        arguments: &Record,
        element: &ObjectType,
    ) -> Result<Option<Predicate>, InternalError> {
        let Some(literal) = arguments.get(self.argument).filter(|v| !v.is_null()) else {
            return Ok(None);
        };

        let Some(input) = self.filter_input(field) else {
            tracing::warn!(
                field = %field.name,
                argument = self.argument,
                "filter argument is not declared as a filter input; ignored"
            );
            return Ok(None);
        };

        let Some(target) = input.entity.as_deref() else {
            return Ok(None);
        };
        if target != element.name {
            return Err(FilterError::EntityMismatch {
                input: input.name.clone(),
                target: target.to_string(),
                element: element.name.clone(),
            }
            .into());
        }

        let predicate = self
            .compiler
            .compile(self.schema, input, element, literal)?;

        Ok(Some(predicate))
    }

    fn filter_input(&self, field: &FieldDef) -> Option<&'a InputObjectType> {
        let arg = field.find_arg(self.argument)?;

        match self.schema.get(arg.ty.innermost())? {
            TypeDef::InputObject(input) => Some(input),
            _ => None,
        }
    }
}
