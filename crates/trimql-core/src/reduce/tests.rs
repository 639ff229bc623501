use super::*;
use crate::{
    obs::{metrics_report, metrics_reset_all},
    source::{DeferredQuery, EntityStream, MemoryEngine, Operator, QueryEngine},
    test_support::person,
    value::{Record, Value},
};
use futures_util::{StreamExt, stream};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

fn deferred(rows: Vec<Record>) -> (Arc<MemoryEngine<Record>>, DeferredQuery<Record>) {
    let engine = Arc::new(MemoryEngine::new(rows));
    let query = DeferredQuery::new(engine.clone() as Arc<dyn QueryEngine<Record>>);

    (engine, query)
}

/// Stream that counts how many elements were pulled.
fn counted(rows: Vec<Record>, pulled: Arc<AtomicUsize>) -> EntityStream<Record> {
    stream::iter(rows)
        .map(move |row| {
            pulled.fetch_add(1, Ordering::SeqCst);
            Ok(row)
        })
        .boxed()
}

#[tokio::test]
async fn single_over_sequence() {
    let none = reduce(ReduceKind::Single, Resolved::Sequence(Vec::<Record>::new()))
        .await
        .expect("empty");
    assert_eq!(none.into_item(), Some(None));

    let one = reduce(ReduceKind::Single, Resolved::Sequence(vec![person("A", 1)]))
        .await
        .expect("one");
    assert_eq!(one.into_item(), Some(Some(person("A", 1))));

    let err = reduce(
        ReduceKind::Single,
        Resolved::Sequence(vec![person("A", 1), person("B", 2)]),
    )
    .await
    .unwrap_err();
    assert!(err.is_not_unique());
    assert_eq!(err.class, ErrorClass::Conflict);
    assert_eq!(err.message, "sequence contains more than one element");
}

#[tokio::test]
async fn first_over_sequence() {
    let first = reduce(
        ReduceKind::First,
        Resolved::Sequence(vec![person("A", 1), person("B", 2)]),
    )
    .await
    .expect("first");

    assert_eq!(first.into_item(), Some(Some(person("A", 1))));
}

#[tokio::test]
async fn single_over_deferred_uses_bounded_fetch() {
    let (engine, query) = deferred(vec![person("A", 1), person("B", 2)]);

    let err = reduce(ReduceKind::Single, Resolved::Deferred(query))
        .await
        .unwrap_err();
    assert!(err.is_not_unique());

    let plans = engine.executed_plans();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].operators().last(), Some(&Operator::Limit(2)));
}

#[tokio::test]
async fn first_over_deferred_fetches_one_row() {
    let (engine, query) = deferred(vec![person("A", 1), person("B", 2)]);

    let first = reduce(ReduceKind::First, Resolved::Deferred(query))
        .await
        .expect("first");

    assert_eq!(first.into_item(), Some(Some(person("A", 1))));
    assert_eq!(engine.executed_plans()[0].effective_limit(), Some(1));
}

#[tokio::test]
async fn first_over_stream_stops_after_one_element() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let rows = vec![person("A", 1), person("B", 2), person("C", 3)];

    let first = reduce(
        ReduceKind::First,
        Resolved::Stream(counted(rows, pulled.clone())),
    )
    .await
    .expect("first");

    assert_eq!(first.into_item(), Some(Some(person("A", 1))));
    assert_eq!(pulled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_over_stream_stops_at_second_element() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let rows = vec![person("A", 1), person("B", 2), person("C", 3)];

    let err = reduce(
        ReduceKind::Single,
        Resolved::Stream(counted(rows, pulled.clone())),
    )
    .await
    .unwrap_err();

    assert!(err.is_not_unique());
    assert_eq!(pulled.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stream_errors_propagate() {
    let failing: EntityStream<Record> =
        stream::iter(vec![Err(InternalError::source_internal("backend down"))]).boxed();

    let err = reduce(ReduceKind::First, Resolved::Stream(failing))
        .await
        .unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Source);
}

#[tokio::test]
async fn single_over_stream_reports_a_failing_second_pull() {
    let failing: EntityStream<Record> = stream::iter(vec![
        Ok(person("A", 1)),
        Err(InternalError::source_internal("backend down")),
    ])
    .boxed();

    let err = reduce(ReduceKind::Single, Resolved::Stream(failing))
        .await
        .unwrap_err();

    assert!(!err.is_not_unique());
    assert_eq!(err.origin, ErrorOrigin::Source);
    assert_eq!(err.message, "backend down");
}

#[tokio::test]
async fn other_shapes_pass_through() {
    let value = reduce(ReduceKind::Single, Resolved::<Record>::Value(Value::from(3)))
        .await
        .expect("value");
    assert!(matches!(value, Resolved::Value(Value::Int(3))));

    let item = reduce(ReduceKind::First, Resolved::Item(Some(person("A", 1))))
        .await
        .expect("item");
    assert_eq!(item.into_item(), Some(Some(person("A", 1))));
}

#[test]
fn violations_are_counted() {
    metrics_reset_all();

    let result = futures_util::FutureExt::now_or_never(reduce(
        ReduceKind::Single,
        Resolved::Sequence(vec![person("A", 1), person("B", 2)]),
    ))
    .expect("ready future");
    assert!(result.is_err());

    let ops = metrics_report().counters.ops;
    assert_eq!(ops.reductions_single, 1);
    assert_eq!(ops.single_violations, 1);
    metrics_reset_all();
}
