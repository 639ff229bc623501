//! Entity and source capability traits.
//!
//! `Entity` is the value-construction seam: projection reads selected members
//! by name and rebuilds an instance from a member map, so no runtime type
//! introspection is needed. `Projectable`, `Filterable`, and `Reducible` are
//! implemented once per source kind (deferred query, finite sequence,
//! asynchronous stream, pagination container).


use crate::{
    error::InternalError,
    predicate::Predicate,
    projection::Projection,
    value::{Record, Value},
};
use futures_util::future::BoxFuture;
use std::sync::Arc;

///
/// Entity
///
/// Instance of a composite type that can expose members and be rebuilt from
/// a (possibly partial) member map.
///

pub trait Entity: Sized {
    /// Read one member by backing name; `None` when the entity has no such member.
    fn get_value(&self, member: &str) -> Option<Value>;

    /// Build an instance from a member map. Absent members take the type's default.
    fn from_record(record: Record) -> Result<Self, InternalError>;
}

impl Entity for Record {
    fn get_value(&self, member: &str) -> Option<Value> {
        self.get(member).cloned()
    }

    fn from_record(record: Record) -> Result<Self, InternalError> {
        Ok(record)
    }
}

///
/// FieldValue
/// Conversion between typed member values and dynamic [`Value`]s.
///

pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FieldValue for u64 {
    fn to_value(&self) -> Value {
        Value::Uint(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Uint(v) => Some(v),
            Value::Int(v) => Self::try_from(v).ok(),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float64(v) => Some(v),
            Value::Int(v) => Some(v as Self),
            Value::Uint(v) => Some(v as Self),
            _ => None,
        }
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldValue for Record {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        value.into_record()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        value
            .into_list()?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl Record {
    /// Take and decode one member; absent or `Null` members decode to `T::default()`.
    pub fn decode<T: FieldValue + Default>(&mut self, member: &str) -> Result<T, InternalError> {
        match self.take(member) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => {
                let family = value.family();

                T::from_value(value).ok_or_else(|| {
                    InternalError::projection_invariant(format!(
                        "member '{member}' holds a {family} value that does not decode to {}",
                        std::any::type_name::<T>()
                    ))
                })
            }
        }
    }
}

///
/// Projectable
/// Source kinds that can carry a compiled projection.
///

pub trait Projectable: Sized {
    /// Attach `projection` in the way native to this source: appended to a
    /// deferred plan, applied eagerly to a sequence, or lazily to a stream.
    fn project(self, projection: &Arc<Projection>) -> Result<Self, InternalError>;
}

///
/// Filterable
/// Source kinds that can keep only elements satisfying a predicate.
///

pub trait Filterable: Sized {
    fn filter_by(self, predicate: Predicate) -> Self;
}

///
/// Reducible
///
/// Source kinds that can be narrowed to zero-or-one element.
/// `reduce_single` fails with a multiplicity error on a second element;
/// `reduce_first` stops consuming after the first.
///

pub trait Reducible<E> {
    fn reduce_single(self) -> BoxFuture<'static, Result<Option<E>, InternalError>>;

    fn reduce_first(self) -> BoxFuture<'static, Result<Option<E>, InternalError>>;
}
