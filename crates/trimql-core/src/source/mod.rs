//! Source kinds a resolver can produce, and their capabilities.
//!
//! - deferred queries (`DeferredQuery`): operators are appended to a plan
//!   and executed by a `QueryEngine`
//! - finite sequences (`Vec<E>`): narrowed eagerly
//! - asynchronous streams (`EntityStream<E>`): narrowed lazily per element
//! - pagination containers (`Page<E>`, see `crate::page`)

mod deferred;
mod memory;
mod stream;


use crate::{
    error::InternalError,
    obs::ShapeKind,
    page::Page,
    predicate::{Predicate, eval},
    projection::Projection,
    reduce::ReduceError,
    traits::{Entity, Filterable, Projectable, Reducible},
    value::Value,
};
use futures_util::future::{self, BoxFuture, FutureExt};
use std::{fmt, sync::Arc};

// re-exports
pub use deferred::{DeferredQuery, Operator, QueryEngine, QueryPlan};
pub use memory::MemoryEngine;
pub use stream::EntityStream;

///
/// Resolved
///
/// What a field resolver returned. Only the entity-bearing shapes are
/// projected or reduced; `Item` and `Value` pass through untouched.
///

pub enum Resolved<E> {
    Deferred(DeferredQuery<E>),
    Sequence(Vec<E>),
    Stream(EntityStream<E>),
    Page(Page<E>),
    Item(Option<E>),
    Value(Value),
}

impl<E> Resolved<E> {
    /// Source shape, when this result carries entities.
    #[must_use]
    pub const fn shape(&self) -> Option<ShapeKind> {
        match self {
            Self::Deferred(_) => Some(ShapeKind::Deferred),
            Self::Sequence(_) => Some(ShapeKind::Sequence),
            Self::Stream(_) => Some(ShapeKind::Stream),
            Self::Page(_) => Some(ShapeKind::Page),
            Self::Item(_) | Self::Value(_) => None,
        }
    }

    #[must_use]
    pub fn into_item(self) -> Option<Option<E>> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_sequence(self) -> Option<Vec<E>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_page(self) -> Option<Page<E>> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_deferred(self) -> Option<DeferredQuery<E>> {
        match self {
            Self::Deferred(query) => Some(query),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_stream(self) -> Option<EntityStream<E>> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl<E> From<DeferredQuery<E>> for Resolved<E> {
    fn from(query: DeferredQuery<E>) -> Self {
        Self::Deferred(query)
    }
}

impl<E> From<Vec<E>> for Resolved<E> {
    fn from(items: Vec<E>) -> Self {
        Self::Sequence(items)
    }
}

impl<E> From<Page<E>> for Resolved<E> {
    fn from(page: Page<E>) -> Self {
        Self::Page(page)
    }
}

impl<E: fmt::Debug> fmt::Debug for Resolved<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deferred(query) => f.debug_tuple("Deferred").field(query).finish(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Page(page) => f.debug_tuple("Page").field(page).finish(),
            Self::Item(item) => f.debug_tuple("Item").field(item).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

///
/// Finite sequences
///

impl<E: Entity> Projectable for Vec<E> {
    fn project(self, projection: &Arc<Projection>) -> Result<Self, InternalError> {
        self.iter().map(|entity| projection.apply(entity)).collect()
    }
}

impl<E: Entity> Filterable for Vec<E> {
    fn filter_by(mut self, predicate: Predicate) -> Self {
        self.retain(|entity| eval(entity, &predicate));
        self
    }
}

impl<E: Send + 'static> Reducible<E> for Vec<E> {
    fn reduce_single(mut self) -> BoxFuture<'static, Result<Option<E>, InternalError>> {
        let result = if self.len() > 1 {
            Err(ReduceError::NotUnique.into())
        } else {
            Ok(self.pop())
        };

        future::ready(result).boxed()
    }

    fn reduce_first(self) -> BoxFuture<'static, Result<Option<E>, InternalError>> {
        future::ready(Ok(self.into_iter().next())).boxed()
    }
}
