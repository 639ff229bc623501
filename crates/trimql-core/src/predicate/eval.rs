use crate::{
    predicate::{CompareOp, ComparePredicate, Predicate},
    traits::Entity,
    value::{Value, strict_eq, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// FieldPresence
///
/// Result of attempting to read a member from a row during predicate
/// evaluation. This distinguishes between a missing member and a
/// present member whose value may be `Null`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldPresence {
    /// Member exists and has a value (including `Value::Null`).
    Present(Value),
    /// Member is not present on the row.
    Missing,
}

///
/// Row
///
/// Abstraction over a row-like value that can expose members by name.
/// This decouples predicate evaluation from concrete entity types.
///

pub trait Row {
    fn field(&self, name: &str) -> FieldPresence;
}

impl<E: Entity> Row for E {
    fn field(&self, name: &str) -> FieldPresence {
        match self.get_value(name) {
            Some(value) => FieldPresence::Present(value),
            None => FieldPresence::Missing,
        }
    }
}

///
/// Evaluate a predicate against a single row.
///
/// Pure runtime evaluation: no schema access and no validation.
/// Any unsupported comparison simply evaluates to `false`.
///
#[must_use]
pub fn eval<R: Row + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,

        Predicate::And(children) => children.iter().all(|child| eval(row, child)),
        Predicate::Or(children) => children.iter().any(|child| eval(row, child)),
        Predicate::Not(inner) => !eval(row, inner),

        Predicate::Compare(cmp) => eval_compare(row, cmp),

        Predicate::IsNull { field } => {
            matches!(row.field(field), FieldPresence::Present(Value::Null))
        }
    }
}

///
/// Evaluate a single comparison predicate against a row.
///
/// Returns `false` if the member is missing or the comparison is not
/// defined for the two value families.
///
fn eval_compare<R: Row + ?Sized>(row: &R, cmp: &ComparePredicate) -> bool {
    let ComparePredicate { field, op, value } = cmp;

    let FieldPresence::Present(actual) = row.field(field) else {
        return false;
    };

    match op {
        CompareOp::Eq => strict_eq(&actual, value).unwrap_or(false),
        CompareOp::Ne => strict_eq(&actual, value).is_some_and(|v| !v),

        CompareOp::Lt => strict_order_cmp(&actual, value).is_some_and(Ordering::is_lt),
        CompareOp::Lte => strict_order_cmp(&actual, value).is_some_and(Ordering::is_le),
        CompareOp::Gt => strict_order_cmp(&actual, value).is_some_and(Ordering::is_gt),
        CompareOp::Gte => strict_order_cmp(&actual, value).is_some_and(Ordering::is_ge),

        CompareOp::In => in_list(&actual, value).unwrap_or(false),
        CompareOp::NotIn => in_list(&actual, value).is_some_and(|matched| !matched),

        CompareOp::Contains => contains(&actual, value),
        CompareOp::StartsWith => text_op(&actual, value, |hay, pat| hay.starts_with(pat)),
        CompareOp::EndsWith => text_op(&actual, value, |hay, pat| hay.ends_with(pat)),
    }
}

///
/// Check whether a value equals any element in a list.
///
fn in_list(actual: &Value, list: &Value) -> Option<bool> {
    let Value::List(items) = list else {
        return None;
    };

    let mut saw_valid = false;
    for item in items {
        match strict_eq(actual, item) {
            Some(true) => return Some(true),
            Some(false) => saw_valid = true,
            None => {}
        }
    }

    saw_valid.then_some(false)
}

///
/// Substring match for text, membership for lists.
///
fn contains(actual: &Value, needle: &Value) -> bool {
    match actual {
        Value::Text(_) => text_op(actual, needle, |hay, pat| hay.contains(pat)),
        Value::List(items) => items
            .iter()
            // Invalid comparisons are treated as non-matches.
            .any(|item| strict_eq(item, needle).unwrap_or(false)),
        _ => false,
    }
}

fn text_op(actual: &Value, needle: &Value, op: impl Fn(&str, &str) -> bool) -> bool {
    match (actual, needle) {
        (Value::Text(hay), Value::Text(pat)) => op(hay, pat),
        _ => false,
    }
}
