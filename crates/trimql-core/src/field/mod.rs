//! Field decorators.
//!
//! A [`ProjectedField`] wraps a resolver and runs its result through the
//! projection pipeline:
//!
//! 1. the resolver produces a [`Resolved`] value
//! 2. the [`ResultAdapter`] builds the property tree and attaches the
//!    projection to deferred and paged results
//! 3. sequences and streams get the same projection applied directly
//! 4. single/first fields reduce the result to one element
//!
//! Reduction runs last, so a deferred source carries both the projection and
//! the bounded terminal into a single engine execution.


use crate::{
    adapter::{Adapted, Projector, ResultAdapter},
    error::InternalError,
    obs::{
        ReduceKind, ShapeKind,
        sink::{self, MetricsEvent},
    },
    projection::Projection,
    reduce,
    schema::FieldDef,
    selection::FieldNode,
    source::Resolved,
    traits::{Entity, Projectable},
};
use futures_util::future::{BoxFuture, FutureExt};
use std::{future::Future, sync::Arc};

///
/// ProjectionMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectionMode {
    /// Keep the full (projected) sequence.
    List,
    /// Zero or one element; more is an error.
    Single,
    /// Zero or one element; extra elements are ignored.
    First,
}

impl ProjectionMode {
    const fn reduce_kind(self) -> Option<ReduceKind> {
        match self {
            Self::List => None,
            Self::Single => Some(ReduceKind::Single),
            Self::First => Some(ReduceKind::First),
        }
    }
}

///
/// FieldContext
/// The field being resolved and the request's selection of it.
///

#[derive(Clone, Debug)]
pub struct FieldContext {
    pub field: FieldDef,
    pub node: FieldNode,
}

impl FieldContext {
    #[must_use]
    pub const fn new(field: FieldDef, node: FieldNode) -> Self {
        Self { field, node }
    }
}

///
/// Resolver
///
/// Produces a field's raw result. Implemented for any
/// `Fn(&FieldContext) -> impl Future<Output = Result<Resolved<E>, _>>`.
///

pub trait Resolver<E>: Send + Sync {
    fn resolve<'a>(
        &'a self,
        ctx: &'a FieldContext,
    ) -> BoxFuture<'a, Result<Resolved<E>, InternalError>>;
}

impl<E, F, Fut> Resolver<E> for F
where
    F: Fn(&FieldContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resolved<E>, InternalError>> + Send + 'static,
{
    fn resolve<'a>(
        &'a self,
        ctx: &'a FieldContext,
    ) -> BoxFuture<'a, Result<Resolved<E>, InternalError>> {
        self(ctx).boxed()
    }
}

///
/// ProjectedField
///

pub struct ProjectedField<E> {
    mode: ProjectionMode,
    adapter: ResultAdapter,
    resolver: Box<dyn Resolver<E>>,
}

impl<E: Entity + Send + 'static> ProjectedField<E> {
    #[must_use]
    pub fn new(
        mode: ProjectionMode,
        projector: Arc<Projector>,
        root: impl Into<String>,
        resolver: impl Resolver<E> + 'static,
    ) -> Self {
        Self {
            mode,
            adapter: ResultAdapter::new(projector, root),
            resolver: Box::new(resolver),
        }
    }

    /// Project a list field; the result keeps its shape.
    #[must_use]
    pub fn use_list_projection(
        projector: Arc<Projector>,
        root: impl Into<String>,
        resolver: impl Resolver<E> + 'static,
    ) -> Self {
        Self::new(ProjectionMode::List, projector, root, resolver)
    }

    /// Project, then require at most one element.
    #[must_use]
    pub fn use_single_projection(
        projector: Arc<Projector>,
        root: impl Into<String>,
        resolver: impl Resolver<E> + 'static,
    ) -> Self {
        Self::new(ProjectionMode::Single, projector, root, resolver)
    }

    /// Project, then keep the first element.
    #[must_use]
    pub fn use_first_projection(
        projector: Arc<Projector>,
        root: impl Into<String>,
        resolver: impl Resolver<E> + 'static,
    ) -> Self {
        Self::new(ProjectionMode::First, projector, root, resolver)
    }

    #[must_use]
    pub const fn mode(&self) -> ProjectionMode {
        self.mode
    }

    #[must_use]
    pub const fn adapter(&self) -> &ResultAdapter {
        &self.adapter
    }

    /// Resolve the field and run the result through the pipeline.
    pub async fn resolve(&self, ctx: &FieldContext) -> Result<Resolved<E>, InternalError> {
        let raw = self.resolver.resolve(ctx).await?;

        let Adapted { result, projection } = self.adapter.adapt(&ctx.field, &ctx.node, raw)?;
        let result = match projection {
            Some(projection) => self.project_in_memory(result, &projection)?,
            None => result,
        };

        match self.mode.reduce_kind() {
            Some(kind) => reduce::reduce(kind, result).await,
            None => Ok(result),
        }
    }

    fn project_in_memory(
        &self,
        result: Resolved<E>,
        projection: &Arc<Projection>,
    ) -> Result<Resolved<E>, InternalError> {
        let (result, shape) = match result {
            Resolved::Sequence(items) => (
                Resolved::Sequence(items.project(projection)?),
                ShapeKind::Sequence,
            ),
            Resolved::Stream(stream) => (
                Resolved::Stream(stream.project(projection)?),
                ShapeKind::Stream,
            ),
            other => return Ok(other),
        };

        sink::record(MetricsEvent::ProjectionAttached {
            root: self.adapter.root(),
            shape,
        });

        Ok(result)
    }
}
