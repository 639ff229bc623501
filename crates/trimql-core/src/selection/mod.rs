//! Client selection sets and the field-collection collaborator.
//!
//! The walker never inspects fragments or duplicate selections itself; it
//! consumes the merged `(FieldDef, FieldNode)` pairs a [`FieldCollector`]
//! produces for one selection level.


use crate::{
    schema::{FieldDef, ObjectType, Schema, SchemaError},
    value::{Record, Value},
};

///
/// SelectionSet
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

impl SelectionSet {
    #[must_use]
    pub fn from_fields<I: IntoIterator<Item = FieldNode>>(fields: I) -> Self {
        Self {
            items: fields.into_iter().map(Selection::Field).collect(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldNode) -> Self {
        self.items.push(Selection::Field(field));
        self
    }

    #[must_use]
    pub fn inline_fragment(
        mut self,
        type_condition: Option<&str>,
        selection_set: Self,
    ) -> Self {
        self.items.push(Selection::InlineFragment {
            type_condition: type_condition.map(str::to_string),
            selection_set,
        });
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Direct field selections at this level, ignoring fragments.
    pub fn fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.items.iter().filter_map(|item| match item {
            Selection::Field(field) => Some(field),
            Selection::InlineFragment { .. } => None,
        })
    }
}

///
/// Selection
///

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(FieldNode),
    InlineFragment {
        type_condition: Option<String>,
        selection_set: SelectionSet,
    },
}

///
/// FieldNode
///
/// One requested field. `arguments` hold already-coerced literal values.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FieldNode {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Record,
    pub selection_set: Option<SelectionSet>,
}

impl FieldNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: Record::new(),
            selection_set: None,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_selection_set(mut self, selection_set: SelectionSet) -> Self {
        self.selection_set = Some(selection_set);
        self
    }

    /// Key the field is reported under in the response.
    #[must_use]
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

///
/// CollectedField
/// A selected field paired with its schema definition.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CollectedField {
    pub field: FieldDef,
    pub node: FieldNode,
}

///
/// FieldCollector
///
/// Produces the merged field list for one selection level.
///

pub trait FieldCollector: Send + Sync {
    fn collect(
        &self,
        schema: &Schema,
        ty: &ObjectType,
        selection_set: &SelectionSet,
    ) -> Result<Vec<CollectedField>, SchemaError>;
}

///
/// DefaultFieldCollector
///
/// Flattens inline fragments that apply to the object type and merges repeated
/// selections of one response key, keeping first-seen order.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFieldCollector;

impl FieldCollector for DefaultFieldCollector {
    fn collect(
        &self,
        _schema: &Schema,
        ty: &ObjectType,
        selection_set: &SelectionSet,
    ) -> Result<Vec<CollectedField>, SchemaError> {
        let mut out: Vec<CollectedField> = Vec::new();
        collect_into(ty, selection_set, &mut out)?;

        Ok(out)
    }
}

fn collect_into(
    ty: &ObjectType,
    selection_set: &SelectionSet,
    out: &mut Vec<CollectedField>,
) -> Result<(), SchemaError> {
    for item in &selection_set.items {
        match item {
            Selection::Field(node) => {
                // meta fields are resolved by the server, never by projection
                if node.name.starts_with("__") {
                    continue;
                }

                let field = ty
                    .find_field(&node.name)
                    .ok_or_else(|| SchemaError::UnknownField {
                        type_name: ty.name.clone(),
                        field: node.name.clone(),
                    })?;

                let existing = out
                    .iter_mut()
                    .find(|seen| seen.node.response_key() == node.response_key());

                match existing {
                    Some(seen) => merge_sub_selection(&mut seen.node, node),
                    None => out.push(CollectedField {
                        field: field.clone(),
                        node: node.clone(),
                    }),
                }
            }
            Selection::InlineFragment {
                type_condition,
                selection_set,
            } => {
                if type_condition.as_deref().is_none_or(|cond| cond == ty.name) {
                    collect_into(ty, selection_set, out)?;
                }
            }
        }
    }

    Ok(())
}

fn merge_sub_selection(into: &mut FieldNode, from: &FieldNode) {
    let Some(extra) = &from.selection_set else {
        return;
    };

    match &mut into.selection_set {
        Some(existing) => existing.items.extend(extra.items.iter().cloned()),
        None => into.selection_set = Some(extra.clone()),
    }
}
