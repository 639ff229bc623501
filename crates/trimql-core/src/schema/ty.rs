use std::fmt;

///
/// TypeRef
///
/// Declared type of a field or argument, with GraphQL list and non-null
/// wrappers kept explicit so callers can unwrap them in order.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeRef {
    Named(String),
    List(Box<Self>),
    NonNull(Box<Self>),
}

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// Wrap this type in a non-null marker (idempotent).
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::NonNull(_) => self,
            other => Self::NonNull(Box::new(other)),
        }
    }

    /// Strip any non-null wrappers from the outside of this type.
    #[must_use]
    pub fn nullable(&self) -> &Self {
        let mut ty = self;
        while let Self::NonNull(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// Element type when this type (ignoring non-null) is a list.
    #[must_use]
    pub fn list_element(&self) -> Option<&Self> {
        match self.nullable() {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        self.list_element().is_some()
    }

    #[must_use]
    pub const fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Name of the innermost named type, with every wrapper removed.
    #[must_use]
    pub fn innermost(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.innermost(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}
