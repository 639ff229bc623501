//! Runtime type metadata consumed by the selection walker and result adapter.
//!
//! Schema construction and type discovery belong to the hosting server; this
//! module only holds the resolved shapes projection needs: which fields are
//! scalar, which are lists of objects, which input types filter which entity,
//! and which container types paginate which node type.

mod ty;


use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

// re-exports
pub use ty::TypeRef;

/// Scalar types every schema registers implicitly.
pub const BUILTIN_SCALARS: [&str; 5] = ["Boolean", "Float", "ID", "Int", "String"];

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("type '{name}' is registered more than once")]
    DuplicateType { name: String },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("type '{name}' is not an object type")]
    NotAnObject { name: String },

    #[error("type '{type_name}' has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error("'{owner}' references unknown type '{target}'")]
    DanglingReference { owner: String, target: String },
}

impl SchemaError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownField { .. } => ErrorClass::Unsupported,
            _ => ErrorClass::Schema,
        }
    }
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self::new(err.class(), ErrorOrigin::Schema, err.to_string())
    }
}

///
/// ArgDef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArgDef {
    pub name: String,
    pub ty: TypeRef,
}

///
/// FieldDef
///
/// One field of an object type. `member` names the backing member the value
/// is read from and written to; it defaults to the GraphQL field name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub member: String,
    pub ty: TypeRef,
    pub args: Vec<ArgDef>,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();

        Self {
            member: name.clone(),
            name,
            ty,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.member = member.into();
        self
    }

    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.args.push(ArgDef {
            name: name.into(),
            ty,
        });
        self
    }

    #[must_use]
    pub fn find_arg(&self, name: &str) -> Option<&ArgDef> {
        self.args.iter().find(|arg| arg.name == name)
    }
}

///
/// ObjectType
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl ObjectType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a field by its backing member name.
    #[must_use]
    pub fn find_member(&self, member: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.member == member)
    }
}

///
/// InputObjectType
///
/// Input type; `entity` is set when the input is a filter over that object type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputObjectType {
    pub name: String,
    pub entity: Option<String>,
}

impl InputObjectType {
    #[must_use]
    pub fn filter_for(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: Some(entity.into()),
        }
    }
}

///
/// ConnectionType
/// Pagination container exposing a page of `node_type` elements.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionType {
    pub name: String,
    pub node_type: String,
}

///
/// TypeDef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeDef {
    Scalar { name: String },
    Enum { name: String, values: Vec<String> },
    Object(ObjectType),
    InputObject(InputObjectType),
    Connection(ConnectionType),
}

impl TypeDef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { name } | Self::Enum { name, .. } => name,
            Self::Object(ty) => &ty.name,
            Self::InputObject(ty) => &ty.name,
            Self::Connection(ty) => &ty.name,
        }
    }

    /// Leaf types are copied verbatim by projection.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar { .. } | Self::Enum { .. })
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(ty) => Some(ty),
            _ => None,
        }
    }
}

///
/// Schema
/// Immutable registry of named types.
///

#[derive(Clone, Debug)]
pub struct Schema {
    types: BTreeMap<String, TypeDef>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&TypeDef, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn object(&self, name: &str) -> Result<&ObjectType, SchemaError> {
        self.resolve(name)?
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject {
                name: name.to_string(),
            })
    }

    /// Resolve the innermost named type of a declared type.
    pub fn classify(&self, ty: &TypeRef) -> Result<&TypeDef, SchemaError> {
        self.resolve(ty.innermost())
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }
}

///
/// SchemaBuilder
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeDef>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.types.push(TypeDef::Scalar { name: name.into() });
        self
    }

    #[must_use]
    pub fn enumeration<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.push(TypeDef::Enum {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn object(mut self, ty: ObjectType) -> Self {
        self.types.push(TypeDef::Object(ty));
        self
    }

    #[must_use]
    pub fn input_object(mut self, ty: InputObjectType) -> Self {
        self.types.push(TypeDef::InputObject(ty));
        self
    }

    #[must_use]
    pub fn connection(mut self, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        self.types.push(TypeDef::Connection(ConnectionType {
            name: name.into(),
            node_type: node_type.into(),
        }));
        self
    }

    /// Register every type and check that all references resolve.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut types = BTreeMap::new();

        for name in BUILTIN_SCALARS {
            types.insert(
                name.to_string(),
                TypeDef::Scalar {
                    name: name.to_string(),
                },
            );
        }

        for def in self.types {
            let name = def.name().to_string();
            if types.contains_key(&name) {
                return Err(SchemaError::DuplicateType { name });
            }
            types.insert(name, def);
        }

        let schema = Schema { types };
        schema.check_references()?;

        Ok(schema)
    }
}

impl Schema {
    fn check_references(&self) -> Result<(), SchemaError> {
        for def in self.types.values() {
            match def {
                TypeDef::Object(ty) => {
                    for field in &ty.fields {
                        self.expect_known(
                            &format!("{}.{}", ty.name, field.name),
                            field.ty.innermost(),
                        )?;
                        for arg in &field.args {
                            self.expect_known(
                                &format!("{}.{}({})", ty.name, field.name, arg.name),
                                arg.ty.innermost(),
                            )?;
                        }
                    }
                }
                TypeDef::InputObject(InputObjectType {
                    name,
                    entity: Some(entity),
                }) => {
                    self.expect_known(name, entity)?;
                    self.object(entity)?;
                }
                TypeDef::Connection(ConnectionType { name, node_type }) => {
                    self.expect_known(name, node_type)?;
                    self.object(node_type)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn expect_known(&self, owner: &str, target: &str) -> Result<(), SchemaError> {
        if self.types.contains_key(target) {
            Ok(())
        } else {
            Err(SchemaError::DanglingReference {
                owner: owner.to_string(),
                target: target.to_string(),
            })
        }
    }
}
