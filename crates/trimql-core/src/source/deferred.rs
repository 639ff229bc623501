use crate::{
    error::InternalError,
    predicate::Predicate,
    projection::Projection,
    reduce::ReduceError,
    traits::{Filterable, Projectable, Reducible},
};
use futures_util::{FutureExt, future::BoxFuture};
use std::{fmt, sync::Arc};

///
/// Operator
/// One step appended to a deferred query, interpreted by the engine in order.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    Filter(Predicate),
    Select(Arc<Projection>),
    Limit(usize),
}

///
/// QueryPlan
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryPlan {
    operators: Vec<Operator>,
}

impl QueryPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    #[must_use]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Projections in application order.
    pub fn selections(&self) -> impl Iterator<Item = &Arc<Projection>> {
        self.operators.iter().filter_map(|op| match op {
            Operator::Select(projection) => Some(projection),
            _ => None,
        })
    }

    /// Smallest limit in the plan, if any.
    #[must_use]
    pub fn effective_limit(&self) -> Option<usize> {
        self.operators
            .iter()
            .filter_map(|op| match op {
                Operator::Limit(n) => Some(*n),
                _ => None,
            })
            .min()
    }
}

///
/// QueryEngine
///
/// Backend able to execute a [`QueryPlan`]. Engines may translate `Select`
/// operators into column selection; the default terminals bound the fetch
/// to what the terminal needs.
///

pub trait QueryEngine<E>: Send + Sync {
    fn execute(&self, plan: &QueryPlan) -> Result<Vec<E>, InternalError>;

    /// Zero or one row; more than one is a multiplicity error.
    fn single_or_default(&self, plan: &QueryPlan) -> Result<Option<E>, InternalError> {
        let mut rows = self.execute(&plan.clone().then(Operator::Limit(2)))?;

        if rows.len() > 1 {
            return Err(ReduceError::NotUnique.into());
        }

        Ok(rows.pop())
    }

    /// The first row, if any.
    fn first_or_default(&self, plan: &QueryPlan) -> Result<Option<E>, InternalError> {
        let rows = self.execute(&plan.clone().then(Operator::Limit(1)))?;

        Ok(rows.into_iter().next())
    }
}

///
/// DeferredQuery
///
/// Query description not yet executed. Operators appended here are carried
/// to the engine as a plan.
///

pub struct DeferredQuery<E> {
    engine: Arc<dyn QueryEngine<E>>,
    plan: QueryPlan,
}

impl<E> DeferredQuery<E> {
    #[must_use]
    pub fn new(engine: Arc<dyn QueryEngine<E>>) -> Self {
        Self {
            engine,
            plan: QueryPlan::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.plan = self.plan.then(Operator::Filter(predicate));
        self
    }

    #[must_use]
    pub fn select(mut self, projection: Arc<Projection>) -> Self {
        self.plan = self.plan.then(Operator::Select(projection));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.plan = self.plan.then(Operator::Limit(limit));
        self
    }

    #[must_use]
    pub const fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    pub fn fetch(&self) -> Result<Vec<E>, InternalError> {
        self.engine.execute(&self.plan)
    }

    pub fn fetch_single(&self) -> Result<Option<E>, InternalError> {
        self.engine.single_or_default(&self.plan)
    }

    pub fn fetch_first(&self) -> Result<Option<E>, InternalError> {
        self.engine.first_or_default(&self.plan)
    }
}

impl<E> Clone for DeferredQuery<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            plan: self.plan.clone(),
        }
    }
}

impl<E> fmt::Debug for DeferredQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQuery")
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl<E> Projectable for DeferredQuery<E> {
    fn project(self, projection: &Arc<Projection>) -> Result<Self, InternalError> {
        Ok(self.select(Arc::clone(projection)))
    }
}

impl<E> Filterable for DeferredQuery<E> {
    fn filter_by(self, predicate: Predicate) -> Self {
        self.filter(predicate)
    }
}

impl<E: Send + 'static> Reducible<E> for DeferredQuery<E> {
    fn reduce_single(self) -> BoxFuture<'static, Result<Option<E>, InternalError>> {
        async move { self.fetch_single() }.boxed()
    }

    fn reduce_first(self) -> BoxFuture<'static, Result<Option<E>, InternalError>> {
        async move { self.fetch_first() }.boxed()
    }
}
