//! Property tree: the requested shape of a projection.
//!
//! A tree is a sequence of [`PropertyType`] nodes over one object type.
//! Scalar nodes copy a member verbatim; list nodes narrow each element of a
//! list member, optionally filtering elements first.


use crate::predicate::Predicate;

///
/// PropertyType
///

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyType {
    /// Leaf member copied as-is.
    Scalar { member: String },

    /// List member whose elements are themselves narrowed by `properties`.
    List {
        member: String,
        element_type: String,
        properties: Vec<Self>,
        filter: Option<Predicate>,
    },
}

impl PropertyType {
    #[must_use]
    pub fn scalar(member: impl Into<String>) -> Self {
        Self::Scalar {
            member: member.into(),
        }
    }

    #[must_use]
    pub fn list(
        member: impl Into<String>,
        element_type: impl Into<String>,
        properties: Vec<Self>,
        filter: Option<Predicate>,
    ) -> Self {
        Self::List {
            member: member.into(),
            element_type: element_type.into(),
            properties,
            filter,
        }
    }

    #[must_use]
    pub fn member(&self) -> &str {
        match self {
            Self::Scalar { member } | Self::List { member, .. } => member,
        }
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Exhaustive two-way dispatch over the node kind.
    pub fn either<T>(
        &self,
        scalar: impl FnOnce(&str) -> T,
        list: impl FnOnce(ListProperty<'_>) -> T,
    ) -> T {
        match self {
            Self::Scalar { member } => scalar(member),
            Self::List {
                member,
                element_type,
                properties,
                filter,
            } => list(ListProperty {
                member,
                element_type,
                properties,
                filter: filter.as_ref(),
            }),
        }
    }
}

///
/// ListProperty
/// Borrowed view of a list node.
///

#[derive(Clone, Copy, Debug)]
pub struct ListProperty<'a> {
    pub member: &'a str,
    pub element_type: &'a str,
    pub properties: &'a [PropertyType],
    pub filter: Option<&'a Predicate>,
}

/// Total node count across all depths.
#[must_use]
pub fn node_count(properties: &[PropertyType]) -> usize {
    properties
        .iter()
        .map(|property| property.either(|_| 1, |list| 1 + node_count(list.properties)))
        .sum()
}

/// Deepest list nesting; a tree of scalars has depth 0.
#[must_use]
pub fn depth(properties: &[PropertyType]) -> usize {
    properties
        .iter()
        .map(|property| property.either(|_| 0, |list| 1 + depth(list.properties)))
        .max()
        .unwrap_or(0)
}
