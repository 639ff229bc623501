//! Shared fixtures for unit tests: a small Person/Pet/Toy schema and rows.

use crate::{
    schema::{FieldDef, InputObjectType, ObjectType, Schema, TypeRef},
    selection::{FieldNode, SelectionSet},
    value::{Record, Value},
};

fn non_null(name: &str) -> TypeRef {
    TypeRef::named(name).non_null()
}

fn list_of(name: &str) -> TypeRef {
    TypeRef::list(TypeRef::named(name).non_null()).non_null()
}

pub(crate) fn person_schema() -> Schema {
    Schema::builder()
        .enumeration("PetKind", ["CAT", "DOG"])
        .object(
            ObjectType::new("Person")
                .field(FieldDef::new("name", non_null("String")))
                .field(FieldDef::new("age", TypeRef::named("Int")))
                .field(
                    FieldDef::new("displayName", TypeRef::named("String")).member("display_name"),
                )
                .field(FieldDef::new("nicknames", list_of("String")))
                .field(FieldDef::new("bestFriend", TypeRef::named("Person")).member("best_friend"))
                .field(
                    FieldDef::new("pets", list_of("Pet"))
                        .arg("where", TypeRef::named("PetFilter")),
                ),
        )
        .object(
            ObjectType::new("Pet")
                .field(FieldDef::new("name", non_null("String")))
                .field(FieldDef::new("age", TypeRef::named("Int")))
                .field(FieldDef::new("kind", TypeRef::named("PetKind")))
                .field(
                    FieldDef::new("toys", list_of("Toy")).arg("where", TypeRef::named("ToyFilter")),
                ),
        )
        .object(
            ObjectType::new("Toy")
                .field(FieldDef::new("name", non_null("String")))
                .field(FieldDef::new("price", TypeRef::named("Float"))),
        )
        .input_object(InputObjectType::filter_for("PersonFilter", "Person"))
        .input_object(InputObjectType::filter_for("PetFilter", "Pet"))
        .input_object(InputObjectType::filter_for("ToyFilter", "Toy"))
        .connection("PersonConnection", "Person")
        .build()
        .expect("fixture schema is valid")
}

pub(crate) fn pet(name: &str, age: i64) -> Record {
    Record::new().with("name", name).with("age", age)
}

pub(crate) fn toy(name: &str, price: f64) -> Record {
    Record::new().with("name", name).with("price", price)
}

/// `Person{name:"A", age:9, pets:[Pet{name:"X",age:1}, Pet{name:"Y",age:5}]}`
pub(crate) fn person_row() -> Record {
    Record::new()
        .with("name", "A")
        .with("age", 9)
        .with("display_name", "Alpha")
        .with(
            "pets",
            vec![Value::from(pet("X", 1)), Value::from(pet("Y", 5))],
        )
}

pub(crate) fn person(name: &str, age: i64) -> Record {
    Record::new()
        .with("name", name)
        .with("age", age)
        .with("pets", Vec::<Value>::new())
}

/// Leaf field selection.
pub(crate) fn leaf(name: &str) -> FieldNode {
    FieldNode::new(name)
}

/// Field selection with a nested selection set.
pub(crate) fn nested<I: IntoIterator<Item = FieldNode>>(name: &str, children: I) -> FieldNode {
    FieldNode::new(name).with_selection_set(SelectionSet::from_fields(children))
}

pub(crate) fn set<I: IntoIterator<Item = FieldNode>>(fields: I) -> SelectionSet {
    SelectionSet::from_fields(fields)
}
