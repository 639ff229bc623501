//! Projection compilation and application.
//!
//! A property tree compiles into a [`Projection`]: an inspectable expression
//! a deferred engine can translate (push-down), and at the same time a plain
//! function over entities. Applying it builds a new instance holding only the
//! selected members; list members are filtered, then narrowed per element.

mod cache;
mod fingerprint;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    predicate::{Predicate, eval},
    property::PropertyType,
    schema::{ObjectType, Schema},
    traits::Entity,
    value::{Record, Value},
};
use std::{collections::BTreeSet, sync::Arc};

// re-exports
pub use cache::ProjectionCache;
pub use fingerprint::ProjectionFingerprint;

///
/// Projection
/// Compiled narrowing of one object type.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    root: String,
    nodes: Vec<ProjectionNode>,
    fingerprint: ProjectionFingerprint,
}

///
/// ProjectionNode
///

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionNode {
    /// Copy a leaf member verbatim.
    Copy { member: String },

    /// Keep elements matching `filter`, then narrow each with `element`.
    List {
        member: String,
        filter: Option<Predicate>,
        element: Projection,
    },
}

impl ProjectionNode {
    #[must_use]
    pub fn member(&self) -> &str {
        match self {
            Self::Copy { member } | Self::List { member, .. } => member,
        }
    }
}

/// Compile a property tree rooted at object type `root`.
///
/// Every node must name an existing member of its object type: scalar nodes a
/// leaf member, list nodes a list-of-object member whose element type matches.
/// Sibling members must be unique.
pub fn compile(
    schema: &Schema,
    root: &str,
    properties: &[PropertyType],
) -> Result<Projection, InternalError> {
    compile_keyed(
        schema,
        root,
        properties,
        ProjectionFingerprint::of(root, properties),
    )
}

pub(crate) fn compile_keyed(
    schema: &Schema,
    root: &str,
    properties: &[PropertyType],
    fingerprint: ProjectionFingerprint,
) -> Result<Projection, InternalError> {
    let object = schema.object(root)?;
    let nodes = compile_nodes(schema, object, properties)?;

    Ok(Projection {
        root: root.to_string(),
        nodes,
        fingerprint,
    })
}

fn compile_nodes(
    schema: &Schema,
    object: &ObjectType,
    properties: &[PropertyType],
) -> Result<Vec<ProjectionNode>, InternalError> {
    let mut seen = BTreeSet::new();
    let mut nodes = Vec::with_capacity(properties.len());

    for property in properties {
        let member = property.member();
        if !seen.insert(member) {
            return Err(InternalError::projection_invariant(format!(
                "member '{member}' is projected more than once on '{}'",
                object.name
            )));
        }

        let field = object.find_member(member).ok_or_else(|| {
            InternalError::projection_invariant(format!(
                "'{}' has no member '{member}'",
                object.name
            ))
        })?;
        let def = schema.classify(&field.ty)?;

        let node = match property {
            PropertyType::Scalar { member } => {
                if !def.is_leaf() {
                    return Err(InternalError::projection_invariant(format!(
                        "scalar member '{}.{member}' has composite type {}",
                        object.name, field.ty
                    )));
                }
                ProjectionNode::Copy {
                    member: member.clone(),
                }
            }

            PropertyType::List {
                member,
                element_type,
                properties,
                filter,
            } => {
                if !field.ty.is_list() || def.name() != element_type {
                    return Err(InternalError::projection_invariant(format!(
                        "list member '{}.{member}' of type {} does not hold '{element_type}'",
                        object.name, field.ty
                    )));
                }
                ProjectionNode::List {
                    member: member.clone(),
                    filter: filter.clone(),
                    element: compile(schema, element_type, properties)?,
                }
            }
        };
        nodes.push(node);
    }

    Ok(nodes)
}

impl Projection {
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn nodes(&self) -> &[ProjectionNode] {
        &self.nodes
    }

    #[must_use]
    pub const fn fingerprint(&self) -> ProjectionFingerprint {
        self.fingerprint
    }

    /// Top-level members read by this projection, in selection order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(ProjectionNode::member)
    }

    /// Narrow `source` into a member map.
    ///
    /// Members the source does not expose stay absent; a `null` list stays
    /// `null`. A list member holding anything other than a list of objects is
    /// an invariant violation.
    pub fn project_record<S: Entity>(&self, source: &S) -> Result<Record, InternalError> {
        let mut out = Record::new();

        for node in &self.nodes {
            match node {
                ProjectionNode::Copy { member } => {
                    if let Some(value) = source.get_value(member) {
                        out.insert(member.clone(), value);
                    }
                }
                ProjectionNode::List {
                    member,
                    filter,
                    element,
                } => {
                    if let Some(value) = source.get_value(member) {
                        let narrowed = element.project_list(member, value, filter.as_ref())?;
                        out.insert(member.clone(), narrowed);
                    }
                }
            }
        }

        Ok(out)
    }

    /// Build a fresh instance of `E` holding only the selected members.
    pub fn apply<E: Entity>(&self, source: &E) -> Result<E, InternalError> {
        E::from_record(self.project_record(source)?)
    }

    /// Plain-function form, for sources that cannot interpret the expression.
    pub fn into_fn<E: Entity>(
        self: Arc<Self>,
    ) -> impl Fn(&E) -> Result<E, InternalError> + Send + Sync {
        move |source: &E| self.apply(source)
    }

    fn project_list(
        &self,
        member: &str,
        value: Value,
        filter: Option<&Predicate>,
    ) -> Result<Value, InternalError> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::List(items) => items,
            other => {
                return Err(InternalError::projection_invariant(format!(
                    "list member '{member}' holds a {} value",
                    other.family()
                )));
            }
        };

        let total = items.len();
        let mut kept = Vec::with_capacity(total);
        for item in items {
            let record = match item {
                Value::Object(record) => record,
                other => {
                    return Err(InternalError::projection_invariant(format!(
                        "element of list member '{member}' is a {} value, expected '{}'",
                        other.family(),
                        self.root
                    )));
                }
            };

            if filter.is_none_or(|predicate| eval(&record, predicate)) {
                kept.push(Value::Object(self.project_record(&record)?));
            }
        }

        sink::record(MetricsEvent::ElementsProjected {
            kept: kept.len() as u64,
            filtered_out: (total - kept.len()) as u64,
        });

        Ok(Value::List(kept))
    }
}
