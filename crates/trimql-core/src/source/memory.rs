use crate::{
    error::InternalError,
    predicate::eval,
    source::{Operator, QueryEngine, QueryPlan},
    traits::Entity,
};
use std::sync::{Mutex, PoisonError};

///
/// MemoryEngine
///
/// In-process [`QueryEngine`] over a fixed row set. Every executed plan is
/// recorded so callers can inspect what reached the engine.
///

#[derive(Debug)]
pub struct MemoryEngine<E> {
    rows: Vec<E>,
    executed: Mutex<Vec<QueryPlan>>,
}

impl<E> MemoryEngine<E> {
    #[must_use]
    pub const fn new(rows: Vec<E>) -> Self {
        Self {
            rows,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Plans executed so far, oldest first.
    #[must_use]
    pub fn executed_plans(&self) -> Vec<QueryPlan> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<E> QueryEngine<E> for MemoryEngine<E>
where
    E: Clone + Entity + Send + Sync,
{
    fn execute(&self, plan: &QueryPlan) -> Result<Vec<E>, InternalError> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plan.clone());

        let mut rows = self.rows.clone();
        for operator in plan.operators() {
            match operator {
                Operator::Filter(predicate) => rows.retain(|row| eval(row, predicate)),
                Operator::Select(projection) => {
                    rows = rows
                        .iter()
                        .map(|row| projection.apply(row))
                        .collect::<Result<_, _>>()?;
                }
                Operator::Limit(limit) => rows.truncate(*limit),
            }
        }

        Ok(rows)
    }
}
