use crate::value::Value;
use std::cmp::Ordering;

/// Strict comparator for orderable values of the same family.
///
/// Numbers compare across `Int`, `Uint`, and `Float64`. Returns `None` for
/// mismatched or non-orderable families (lists, objects, null).
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) | (Value::Enum(a), Value::Enum(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Uint(a), Value::Uint(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Uint(b)) => i128::from(*a).partial_cmp(&i128::from(*b)),
        (Value::Uint(a), Value::Int(b)) => i128::from(*a).partial_cmp(&i128::from(*b)),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
        (Value::Float64(a), other) => as_f64(other).and_then(|b| a.partial_cmp(&b)),
        (other, Value::Float64(b)) => as_f64(other).and_then(|a| a.partial_cmp(b)),
        _ => None,
    }
}

/// Strict equality under the same family rules as [`strict_order_cmp`].
///
/// `Null` equals only `Null`; lists and objects compare structurally.
/// Returns `None` when the two families are not comparable.
#[must_use]
pub fn strict_eq(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(true),
        (Value::Null, _) | (_, Value::Null) => Some(false),
        (Value::List(a), Value::List(b)) => Some(a == b),
        (Value::Object(a), Value::Object(b)) => Some(a == b),
        // enum literals often arrive as text from variables
        (Value::Enum(a), Value::Text(b)) | (Value::Text(a), Value::Enum(b)) => Some(a == b),
        _ => strict_order_cmp(left, right).map(Ordering::is_eq),
    }
}

#[expect(clippy::cast_precision_loss)]
const fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Uint(v) => Some(*v as f64),
        _ => None,
    }
}
