use super::*;
use crate::{
    error::{ErrorClass, ErrorOrigin},
    obs::{metrics_report, metrics_reset_all},
    test_support::{person_row, person_schema, pet, toy},
};
use proptest::prelude::*;

fn pets_tree(filter: Option<Predicate>) -> Vec<PropertyType> {
    vec![
        PropertyType::scalar("name"),
        PropertyType::list("pets", "Pet", vec![PropertyType::scalar("name")], filter),
    ]
}

fn compile_person(properties: &[PropertyType]) -> Result<Projection, InternalError> {
    compile(&person_schema(), "Person", properties)
}

#[test]
fn filtered_list_keeps_matching_elements_only() {
    let projection = compile_person(&pets_tree(Some(Predicate::gt("age", 2)))).expect("compile");

    let projected = projection.apply(&person_row()).expect("apply");

    assert_eq!(
        projected,
        Record::new()
            .with("name", "A")
            .with("pets", vec![Value::from(Record::new().with("name", "Y"))])
    );
}

#[test]
fn unfiltered_list_keeps_every_element_in_order() {
    let projection = compile_person(&pets_tree(None)).expect("compile");

    let projected = projection.apply(&person_row()).expect("apply");
    let names: Vec<_> = projected["pets"]
        .as_list()
        .expect("pets list")
        .iter()
        .map(|pet| pet.as_record().expect("pet")["name"].clone())
        .collect();

    assert_eq!(names, vec![Value::from("X"), Value::from("Y")]);
    assert!(!projected.contains_key("age"));
    assert!(!projected.contains_key("display_name"));
}

#[test]
fn scalar_members_use_backing_names() {
    let projection =
        compile_person(&[PropertyType::scalar("display_name")]).expect("compile");

    let projected = projection.apply(&person_row()).expect("apply");

    assert_eq!(projected, Record::new().with("display_name", "Alpha"));
    assert_eq!(projection.members().collect::<Vec<_>>(), vec!["display_name"]);
}

#[test]
fn nested_lists_are_narrowed_recursively() {
    let properties = vec![PropertyType::list(
        "pets",
        "Pet",
        vec![PropertyType::list(
            "toys",
            "Toy",
            vec![PropertyType::scalar("name")],
            Some(Predicate::lt("price", 10.0)),
        )],
        None,
    )];
    let projection = compile_person(&properties).expect("compile");

    let source = Record::new().with(
        "pets",
        vec![pet("X", 1).with("toys", vec![toy("ball", 3.5), toy("robot", 49.0)])],
    );
    let projected = projection.apply(&source).expect("apply");

    let expected = Record::new().with(
        "pets",
        vec![Record::new().with("toys", vec![Record::new().with("name", "ball")])],
    );
    assert_eq!(projected, expected);
}

#[test]
fn absent_and_null_members_are_preserved() {
    let projection = compile_person(&pets_tree(None)).expect("compile");

    let absent = projection.apply(&Record::new()).expect("absent");
    assert!(absent.is_empty());

    let null = projection
        .apply(&Record::new().with("pets", Value::Null))
        .expect("null");
    assert_eq!(null, Record::new().with("pets", Value::Null));
}

#[test]
fn non_list_values_are_invariant_violations() {
    let projection = compile_person(&pets_tree(None)).expect("compile");

    let err = projection
        .apply(&Record::new().with("pets", "not a list"))
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::Projection);

    let err = projection
        .apply(&Record::new().with("pets", vec![1]))
        .unwrap_err();
    assert!(err.message.contains("'Pet'"));
}

#[test]
fn compile_rejects_malformed_trees() {
    let duplicate = compile_person(&[PropertyType::scalar("name"), PropertyType::scalar("name")]);
    assert!(duplicate.unwrap_err().message.contains("more than once"));

    let unknown = compile_person(&[PropertyType::scalar("salary")]);
    assert!(unknown.unwrap_err().message.contains("no member 'salary'"));

    let composite = compile_person(&[PropertyType::scalar("pets")]);
    assert_eq!(composite.unwrap_err().class, ErrorClass::InvariantViolation);

    let wrong_element = compile_person(&[PropertyType::list("pets", "Toy", vec![], None)]);
    assert!(wrong_element.unwrap_err().message.contains("does not hold 'Toy'"));

    let not_a_list = compile_person(&[PropertyType::list("best_friend", "Person", vec![], None)]);
    assert!(not_a_list.is_err());

    let unknown_root = compile(&person_schema(), "Robot", &[]);
    assert_eq!(unknown_root.unwrap_err().origin, ErrorOrigin::Schema);
}

#[test]
fn fingerprints_track_tree_identity() {
    let a = ProjectionFingerprint::of("Person", &pets_tree(None));
    let b = ProjectionFingerprint::of("Person", &pets_tree(None));
    let filtered = ProjectionFingerprint::of("Person", &pets_tree(Some(Predicate::gt("age", 2))));
    let other_root = ProjectionFingerprint::of("Pet", &pets_tree(None));

    assert_eq!(a, b);
    assert_ne!(a, filtered);
    assert_ne!(a, other_root);
    assert_eq!(a.as_hex().len(), 64);
    assert_eq!(a.to_string(), a.as_hex());
}

#[test]
fn fingerprints_are_length_prefixed() {
    let joined = |left: &str, right: &str| {
        ProjectionFingerprint::of(
            "Person",
            &[PropertyType::list(
                "pets",
                "Pet",
                Vec::new(),
                Some(Predicate::and(vec![
                    Predicate::eq("name", left),
                    Predicate::eq("name", right),
                ])),
            )],
        )
    };

    assert_ne!(joined("ab", "c"), joined("a", "bc"));
    assert_eq!(joined("ab", "c"), joined("ab", "c"));
}

#[test]
fn cache_reuses_compiled_projections() {
    metrics_reset_all();
    let schema = person_schema();
    let cache = ProjectionCache::new();

    let first = cache
        .get_or_compile(&schema, "Person", &pets_tree(None))
        .expect("first");
    let second = cache
        .get_or_compile(&schema, "Person", &pets_tree(None))
        .expect("second");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    let ops = metrics_report().counters.ops;
    assert_eq!(ops.cache_misses, 1);
    assert_eq!(ops.cache_hits, 1);

    cache.clear();
    assert!(cache.is_empty());
    metrics_reset_all();
}

#[test]
fn cache_does_not_store_failed_compilations() {
    let cache = ProjectionCache::new();

    let result = cache.get_or_compile(&person_schema(), "Person", &[PropertyType::scalar("salary")]);

    assert!(result.is_err());
    assert!(cache.is_empty());
}

#[test]
fn function_form_matches_apply() {
    let projection = Arc::new(compile_person(&pets_tree(None)).expect("compile"));
    let expected = projection.apply(&person_row()).expect("apply");

    let project = Arc::clone(&projection).into_fn::<Record>();

    assert_eq!(project(&person_row()).expect("fn"), expected);
}

#[test]
fn element_counts_are_recorded() {
    metrics_reset_all();
    let projection = compile_person(&pets_tree(Some(Predicate::gt("age", 2)))).expect("compile");

    projection.apply(&person_row()).expect("apply");

    let ops = metrics_report().counters.ops;
    assert_eq!(ops.elements_projected, 1);
    assert_eq!(ops.elements_filtered_out, 1);
    metrics_reset_all();
}

///
/// Properties
///

fn arb_person() -> impl Strategy<Value = Record> {
    (
        "[a-z]{1,4}",
        prop::option::of(0i64..100),
        prop::collection::vec(("[a-z]{1,4}", 0i64..10), 0..6),
    )
        .prop_map(|(name, age, pets)| {
            let pets: Vec<Value> = pets
                .into_iter()
                .map(|(name, age)| Value::from(pet(&name, age)))
                .collect();

            Record::new()
                .with("name", name)
                .with("age", age)
                .with("display_name", "shown")
                .with("pets", pets)
        })
}

fn arb_tree() -> impl Strategy<Value = (Vec<PropertyType>, i64)> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0i64..10).prop_map(
        |(with_name, with_age, with_pets, threshold)| {
            let mut tree = Vec::new();
            if with_name {
                tree.push(PropertyType::scalar("name"));
            }
            if with_age {
                tree.push(PropertyType::scalar("age"));
            }
            if with_pets {
                tree.push(PropertyType::list(
                    "pets",
                    "Pet",
                    vec![PropertyType::scalar("age")],
                    Some(Predicate::gt("age", threshold)),
                ));
            }
            (tree, threshold)
        },
    )
}

proptest! {
    #[test]
    fn projection_narrows_filters_and_is_idempotent(
        row in arb_person(),
        (tree, threshold) in arb_tree(),
    ) {
        let projection = compile_person(&tree).expect("compile");
        let once = projection.apply(&row).expect("apply");

        // Only selected members survive.
        let selected: BTreeSet<&str> = tree.iter().map(PropertyType::member).collect();
        prop_assert!(once.members().all(|member| selected.contains(member)));

        // Scalars are copied verbatim.
        for member in ["name", "age"] {
            if selected.contains(member) {
                prop_assert_eq!(once.get(member), row.get(member));
            }
        }

        // Kept elements are exactly the source elements passing the filter.
        if selected.contains("pets") {
            let expected: Vec<Value> = row["pets"]
                .as_list()
                .expect("pets")
                .iter()
                .filter_map(|pet| pet.as_record()?.get("age")?.as_i64())
                .filter(|age| *age > threshold)
                .map(|age| Value::from(Record::new().with("age", age)))
                .collect();
            prop_assert_eq!(once.get("pets"), Some(&Value::List(expected)));
        }

        let twice = projection.apply(&once).expect("reapply");
        prop_assert_eq!(twice, once);
    }
}
