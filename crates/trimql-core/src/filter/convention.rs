use crate::{
    filter::{FilterCompiler, FilterError},
    predicate::{CompareOp, Predicate},
    schema::{FieldDef, InputObjectType, ObjectType, Schema},
    value::{Record, Value},
};

/// Operator suffixes, longest first so `_not_in` wins over `_in` and `_not`.
const SUFFIXES: [(&str, Operator); 10] = [
    ("_starts_with", Operator::Compare(CompareOp::StartsWith)),
    ("_ends_with", Operator::Compare(CompareOp::EndsWith)),
    ("_contains", Operator::Compare(CompareOp::Contains)),
    ("_not_in", Operator::Compare(CompareOp::NotIn)),
    ("_gte", Operator::Compare(CompareOp::Gte)),
    ("_lte", Operator::Compare(CompareOp::Lte)),
    ("_not", Operator::Not),
    ("_gt", Operator::Compare(CompareOp::Gt)),
    ("_lt", Operator::Compare(CompareOp::Lt)),
    ("_in", Operator::Compare(CompareOp::In)),
];

#[derive(Clone, Copy, Debug)]
enum Operator {
    Eq,
    Not,
    Compare(CompareOp),
}

///
/// ConventionFilterCompiler
///
/// Compiles suffix-convention filter objects:
///
/// `{ age_gt: 2, name: "Y", OR: [{ kind: CAT }, { kind_in: [DOG] }] }`
///
/// Keys of one object are AND-ed; `AND` / `OR` take lists of nested objects.
/// An empty object matches every element.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ConventionFilterCompiler;

impl FilterCompiler for ConventionFilterCompiler {
    fn compile(
        &self,
        schema: &Schema,
        _input: &InputObjectType,
        entity: &ObjectType,
        literal: &Value,
    ) -> Result<Predicate, FilterError> {
        let Value::Object(object) = literal else {
            return Err(invalid(entity, "an object", literal));
        };

        compile_object(schema, entity, object)
    }
}

fn compile_object(
    schema: &Schema,
    entity: &ObjectType,
    object: &Record,
) -> Result<Predicate, FilterError> {
    let mut parts = Vec::with_capacity(object.len());

    for (key, value) in object {
        let part = match key.as_str() {
            "AND" => Predicate::And(compile_list(schema, entity, value)?),
            "OR" => Predicate::Or(compile_list(schema, entity, value)?),
            _ => compile_field(schema, entity, key, value)?,
        };
        parts.push(part);
    }

    Ok(match parts.len() {
        0 => Predicate::True,
        1 => parts.remove(0),
        _ => Predicate::And(parts),
    })
}

fn compile_list(
    schema: &Schema,
    entity: &ObjectType,
    value: &Value,
) -> Result<Vec<Predicate>, FilterError> {
    let Value::List(items) = value else {
        return Err(invalid(entity, "a list of filter objects", value));
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(object) => compile_object(schema, entity, object),
            other => Err(invalid(entity, "a filter object", other)),
        })
        .collect()
}

fn compile_field(
    schema: &Schema,
    entity: &ObjectType,
    key: &str,
    value: &Value,
) -> Result<Predicate, FilterError> {
    let (field, op) = resolve_key(entity, key)?;

    let filterable = schema
        .classify(&field.ty)
        .is_ok_and(|def| def.is_leaf());
    if !filterable {
        return Err(FilterError::NotFilterable {
            entity: entity.name.clone(),
            field: field.name.clone(),
        });
    }

    let member = field.member.clone();

    Ok(match (op, value) {
        (Operator::Eq, Value::Null) => Predicate::is_null(member),
        (Operator::Not, Value::Null) => Predicate::not(Predicate::is_null(member)),
        (Operator::Eq, _) => Predicate::eq(member, value.clone()),
        (Operator::Not, _) => Predicate::ne(member, value.clone()),
        (Operator::Compare(op @ (CompareOp::In | CompareOp::NotIn)), _) => {
            if !matches!(value, Value::List(_)) {
                return Err(invalid(entity, "a list", value));
            }
            Predicate::compare(member, op, value.clone())
        }
        (Operator::Compare(op), _) => Predicate::compare(member, op, value.clone()),
    })
}

/// Exact field names win over suffix parsing.
fn resolve_key<'a>(
    entity: &'a ObjectType,
    key: &str,
) -> Result<(&'a FieldDef, Operator), FilterError> {
    if let Some(field) = entity.find_field(key) {
        return Ok((field, Operator::Eq));
    }

    SUFFIXES
        .iter()
        .find_map(|(suffix, op)| {
            let name = key.strip_suffix(*suffix)?;
            entity.find_field(name).map(|field| (field, *op))
        })
        .ok_or_else(|| FilterError::UnknownField {
            entity: entity.name.clone(),
            field: key.to_string(),
        })
}

fn invalid(entity: &ObjectType, expected: &'static str, found: &Value) -> FilterError {
    FilterError::InvalidLiteral {
        entity: entity.name.clone(),
        expected,
        found: found.family(),
    }
}
