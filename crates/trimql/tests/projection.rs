//! End-to-end field resolution over typed entities.

use futures_util::{StreamExt, stream};
use std::sync::Arc;
use trimql::{
    ErrorKind, ErrorOrigin, FieldErrorKind,
    core::{adapter::Projector, error::InternalError, source::MemoryEngine},
    prelude::*,
};

///
/// Pet
///

#[derive(Clone, Debug, Default, PartialEq)]
struct Pet {
    name: String,
    age: i64,
}

impl Pet {
    fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

impl Entity for Pet {
    fn get_value(&self, member: &str) -> Option<Value> {
        match member {
            "name" => Some(self.name.to_value()),
            "age" => Some(self.age.to_value()),
            _ => None,
        }
    }

    fn from_record(mut record: Record) -> Result<Self, InternalError> {
        Ok(Self {
            name: record.decode("name")?,
            age: record.decode("age")?,
        })
    }
}

impl FieldValue for Pet {
    fn to_value(&self) -> Value {
        Value::Object(
            Record::new()
                .with("name", self.name.as_str())
                .with("age", self.age),
        )
    }

    fn from_value(value: Value) -> Option<Self> {
        Self::from_record(value.into_record()?).ok()
    }
}

///
/// Person
///

#[derive(Clone, Debug, Default, PartialEq)]
struct Person {
    name: String,
    age: i64,
    pets: Vec<Pet>,
}

impl Entity for Person {
    fn get_value(&self, member: &str) -> Option<Value> {
        match member {
            "name" => Some(self.name.to_value()),
            "age" => Some(self.age.to_value()),
            "pets" => Some(self.pets.to_value()),
            _ => None,
        }
    }

    fn from_record(mut record: Record) -> Result<Self, InternalError> {
        Ok(Self {
            name: record.decode("name")?,
            age: record.decode("age")?,
            pets: record.decode("pets")?,
        })
    }
}

fn schema() -> Schema {
    let pets = TypeRef::list(TypeRef::named("Pet").non_null()).non_null();

    Schema::builder()
        .object(
            ObjectType::new("Person")
                .field(FieldDef::new("name", TypeRef::named("String").non_null()))
                .field(FieldDef::new("age", TypeRef::named("Int")))
                .field(FieldDef::new("pets", pets).arg("where", TypeRef::named("PetFilter"))),
        )
        .object(
            ObjectType::new("Pet")
                .field(FieldDef::new("name", TypeRef::named("String").non_null()))
                .field(FieldDef::new("age", TypeRef::named("Int"))),
        )
        .input_object(InputObjectType::filter_for("PetFilter", "Pet"))
        .connection("PersonConnection", "Person")
        .build()
        .expect("schema")
}

fn projector() -> Arc<Projector> {
    trimql::projector(schema(), None).expect("projector")
}

fn alpha() -> Person {
    Person {
        name: "A".to_string(),
        age: 9,
        pets: vec![Pet::new("X", 1), Pet::new("Y", 5)],
    }
}

fn beta() -> Person {
    Person {
        name: "B".to_string(),
        age: 3,
        pets: Vec::new(),
    }
}

fn leaf(name: &str) -> FieldNode {
    FieldNode::new(name)
}

fn nested<const N: usize>(name: &str, children: [FieldNode; N]) -> FieldNode {
    FieldNode::new(name).with_selection_set(SelectionSet::from_fields(children))
}

fn people(node: FieldNode) -> FieldContext {
    let ty = TypeRef::list(TypeRef::named("Person").non_null()).non_null();

    FieldContext::new(FieldDef::new("people", ty), node)
}

fn person(node: FieldNode) -> FieldContext {
    FieldContext::new(FieldDef::new("person", TypeRef::named("Person")), node)
}

fn from_engine(
    engine: &Arc<MemoryEngine<Person>>,
) -> impl Fn(&FieldContext) -> std::future::Ready<Result<Resolved<Person>, InternalError>>
+ Send
+ Sync
+ 'static {
    let engine = Arc::clone(engine);

    move |_: &FieldContext| {
        let query = DeferredQuery::new(Arc::clone(&engine) as Arc<dyn QueryEngine<Person>>);
        std::future::ready(Ok(Resolved::Deferred(query)))
    }
}

#[tokio::test]
async fn filtered_pets_keep_only_matching_names() {
    let engine = Arc::new(MemoryEngine::new(vec![alpha()]));
    let field = ProjectedField::use_list_projection(projector(), "Person", from_engine(&engine));
    let node = nested(
        "people",
        [
            leaf("name"),
            nested("pets", [leaf("name")])
                .with_argument("where", Value::Object(Record::new().with("age_gt", 2))),
        ],
    );

    let result = trimql::resolve(&field, &people(node)).await.expect("resolve");
    let rows = result.into_deferred().expect("deferred").fetch().expect("fetch");

    assert_eq!(
        rows,
        vec![Person {
            name: "A".to_string(),
            age: 0,
            pets: vec![Pet::new("Y", 0)],
        }]
    );
}

#[tokio::test]
async fn unfiltered_pets_keep_every_element() {
    let field = ProjectedField::use_list_projection(projector(), "Person", |_: &FieldContext| {
        std::future::ready(Ok::<_, InternalError>(Resolved::Sequence(vec![alpha()])))
    });
    let node = nested("people", [nested("pets", [leaf("name")])]);

    let result = trimql::resolve(&field, &people(node)).await.expect("resolve");

    assert_eq!(
        result.into_sequence(),
        Some(vec![Person {
            pets: vec![Pet::new("X", 0), Pet::new("Y", 0)],
            ..Person::default()
        }])
    );
}

#[tokio::test]
async fn single_field_rejects_two_rows() {
    let engine = Arc::new(MemoryEngine::new(vec![alpha(), beta()]));
    let field = ProjectedField::use_single_projection(projector(), "Person", from_engine(&engine));

    let err = trimql::resolve(&field, &person(nested("person", [leaf("name")])))
        .await
        .unwrap_err();

    assert!(err.is_not_unique());
    assert_eq!(err.kind, ErrorKind::Field(FieldErrorKind::NotUnique));
    assert_eq!(err.origin, ErrorOrigin::Reduce);
    assert_eq!(err.to_string(), "sequence contains more than one element");
}

#[tokio::test]
async fn single_field_projects_its_only_row() {
    let engine = Arc::new(MemoryEngine::new(vec![alpha()]));
    let field = ProjectedField::use_single_projection(projector(), "Person", from_engine(&engine));

    let result = trimql::resolve(&field, &person(nested("person", [leaf("name")])))
        .await
        .expect("resolve");

    assert_eq!(
        result.into_item(),
        Some(Some(Person {
            name: "A".to_string(),
            ..Person::default()
        }))
    );
}

#[tokio::test]
async fn first_field_takes_the_first_streamed_row() {
    let field = ProjectedField::use_first_projection(projector(), "Person", |_: &FieldContext| {
        let rows: EntityStream<Person> = stream::iter(vec![Ok(beta()), Ok(alpha())]).boxed();
        std::future::ready(Ok::<_, InternalError>(Resolved::Stream(rows)))
    });

    let result = trimql::resolve(&field, &person(nested("person", [leaf("age")])))
        .await
        .expect("resolve");

    assert_eq!(
        result.into_item(),
        Some(Some(Person {
            age: 3,
            ..Person::default()
        }))
    );
}

#[tokio::test]
async fn first_field_over_nothing_is_empty() {
    let field = ProjectedField::use_first_projection(projector(), "Person", |_: &FieldContext| {
        std::future::ready(Ok::<_, InternalError>(Resolved::Sequence(Vec::<Person>::new())))
    });

    let result = trimql::resolve(&field, &person(nested("person", [leaf("name")])))
        .await
        .expect("resolve");

    assert_eq!(result.into_item(), Some(None));
}

#[tokio::test]
async fn connection_pages_project_their_nodes() {
    use trimql::core::page::{Page, PageInfo, PageSource};

    let field = ProjectedField::use_list_projection(projector(), "Person", |_: &FieldContext| {
        let page = Page::new(
            PageSource::Sequence(vec![alpha(), beta()]),
            PageInfo {
                total_count: Some(2),
                ..PageInfo::default()
            },
        );
        std::future::ready(Ok::<_, InternalError>(Resolved::Page(page)))
    });
    let ctx = FieldContext::new(
        FieldDef::new("peopleConnection", TypeRef::named("PersonConnection").non_null()),
        nested(
            "peopleConnection",
            [leaf("totalCount"), nested("nodes", [leaf("name")])],
        ),
    );

    let page = trimql::resolve(&field, &ctx)
        .await
        .expect("resolve")
        .into_page()
        .expect("page");

    assert_eq!(page.info.total_count, Some(2));
    let PageSource::Sequence(rows) = page.source else {
        panic!("sequence page");
    };
    let names: Vec<_> = rows.into_iter().map(|person| person.name).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn invalid_configuration_maps_to_schema_errors() {
    let err = trimql::projector(schema(), Some("[projection]\nmax_depth = 0\n"))
        .err()
        .expect("zero depth is rejected");
    assert_eq!(err.kind, ErrorKind::Schema);
    assert_eq!(err.origin, ErrorOrigin::Config);

    let err = trimql::projector(schema(), Some("[projection]\nunknown = 1\n"))
        .err()
        .expect("unknown keys are rejected");
    assert_eq!(err.kind, ErrorKind::Schema);
}
