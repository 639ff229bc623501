use crate::{
    error::InternalError,
    predicate::{Predicate, eval},
    projection::Projection,
    reduce::ReduceError,
    traits::{Entity, Filterable, Projectable, Reducible},
};
use futures_util::{
    FutureExt, StreamExt,
    future::{self, BoxFuture},
    stream::BoxStream,
};
use std::sync::Arc;

///
/// EntityStream
/// Asynchronous sequence of entities; errors end consumption.
///

pub type EntityStream<E> = BoxStream<'static, Result<E, InternalError>>;

impl<E: Entity + Send + 'static> Projectable for EntityStream<E> {
    /// Lazy: each element is narrowed as it is pulled, with no read-ahead.
    fn project(self, projection: &Arc<Projection>) -> Result<Self, InternalError> {
        let projection = Arc::clone(projection);

        Ok(self
            .map(move |item| item.and_then(|entity| projection.apply(&entity)))
            .boxed())
    }
}

impl<E: Entity + Send + 'static> Filterable for EntityStream<E> {
    fn filter_by(self, predicate: Predicate) -> Self {
        self.filter(move |item| {
            let keep = match item {
                Ok(entity) => eval(entity, &predicate),
                Err(_) => true,
            };
            future::ready(keep)
        })
        .boxed()
    }
}

impl<E: Send + 'static> Reducible<E> for EntityStream<E> {
    /// Pulls at most two elements.
    fn reduce_single(mut self) -> BoxFuture<'static, Result<Option<E>, InternalError>> {
        async move {
            let Some(first) = self.next().await.transpose()? else {
                return Ok(None);
            };
            if self.next().await.transpose()?.is_some() {
                return Err(ReduceError::NotUnique.into());
            }

            Ok(Some(first))
        }
        .boxed()
    }

    /// Pulls at most one element, then drops the stream.
    fn reduce_first(mut self) -> BoxFuture<'static, Result<Option<E>, InternalError>> {
        async move { self.next().await.transpose() }.boxed()
    }
}
