use jgeneric_resolve::{ElementType, ResolvedType, TypeResolver};
use jgeneric_signature::load_toml;
use jgeneric_types::{ClassId, ClassRef, Type, TypeEnv, TypeStore};

use pretty_assertions::assert_eq;

const HIERARCHY: &str = include_str!("fixtures/hierarchy.toml");

fn fixture() -> TypeStore {
    let mut store = TypeStore::with_minimal_jdk();
    load_toml(&mut store, HIERARCHY).unwrap();
    store
}

fn id(env: &TypeStore, name: &str) -> ClassId {
    env.class_id(name)
        .unwrap_or_else(|| panic!("{name} missing from fixture"))
}

fn field(env: &TypeStore, owner: &str, name: &str, context: Option<&str>) -> ResolvedType {
    let owner = id(env, owner);
    let context = context.map(|name| Type::class(id(env, name)));
    TypeResolver::new(env)
        .resolve_field_named(owner, name, context.as_ref())
        .unwrap()
}

fn shown(env: &TypeStore, resolved: &ResolvedType) -> String {
    resolved.display(env).to_string()
}

#[test]
fn concrete_field_is_its_own_class() {
    let env = fixture();
    let string = ClassRef::Class(env.well_known().string);

    let resolved = field(&env, "com.example.Box", "name", Some("com.example.StringBox"));
    assert_eq!(resolved.raw_type(), &Type::Class(string.clone()));
    assert!(resolved.element_types().is_empty());
    assert_eq!(resolved.container_type(), None);
    assert_eq!(resolved.concrete_class(), Some(&string));

    let count = field(&env, "com.example.Box", "count", None);
    assert_eq!(shown(&env, &count), "int");
}

#[test]
fn concrete_array_exposes_its_component() {
    let env = fixture();
    let string = ClassRef::Class(env.well_known().string);

    let resolved = field(&env, "com.example.Box", "names", None);
    assert_eq!(resolved.raw_type(), &Type::Class(string.clone().array_of()));
    assert_eq!(resolved.element_types(), &[ElementType::Class(string.clone())]);
    assert_eq!(resolved.container_type(), Some(&string.clone().array_of()));
    assert_eq!(resolved.element_class(), Some(&string));
}

#[test]
fn concrete_parameterized_type_is_the_same_from_every_context() {
    let env = fixture();
    let from_box = field(&env, "com.example.Box", "labels", None);
    let from_string_box = field(&env, "com.example.Box", "labels", Some("com.example.StringBox"));
    let from_int_box = field(&env, "com.example.Box", "labels", Some("com.example.IntBox"));

    assert_eq!(from_box, from_string_box);
    assert_eq!(from_box, from_int_box);
    assert_eq!(
        from_box.container_type(),
        Some(&ClassRef::Class(id(&env, "java.util.List")))
    );
    assert_eq!(shown(&env, &from_box), "java.util.List<java.lang.String>");
}

#[test]
fn free_variable_without_bounds_stays_unresolved() {
    let env = fixture();
    let boxed = id(&env, "com.example.Box");
    let t = env.class(boxed).unwrap().type_params[0];

    let resolved = field(&env, "com.example.Box", "value", None);
    assert!(resolved.is_unresolved());
    assert_eq!(resolved.raw_type(), &Type::TypeVar(t));
    assert_eq!(shown(&env, &resolved), "<unresolved T>");

    // Extending the raw type leaves the variable just as free.
    let raw = field(&env, "com.example.Box", "value", Some("com.example.RawBox"));
    assert!(raw.is_unresolved());
}

#[test]
fn subclass_binds_the_variable() {
    let env = fixture();
    let string = ClassRef::Class(env.well_known().string);

    let t = env.class(id(&env, "com.example.Box")).unwrap().type_params[0];

    let value = field(&env, "com.example.Box", "value", Some("com.example.StringBox"));
    assert_eq!(value.raw_type(), &Type::TypeVar(t));
    assert_eq!(value.element_types(), &[ElementType::Class(string.clone())]);
    assert_eq!(value.container_type(), None);
    assert!(!value.is_unresolved());
    assert_eq!(value.concrete_class(), Some(&string));
    assert_eq!(value.element_class(), Some(&string));

    let values = field(&env, "com.example.Box", "values", Some("com.example.StringBox"));
    assert_eq!(values.element_types(), &[ElementType::Class(string)]);
    assert_eq!(
        values.container_type(),
        Some(&ClassRef::Class(id(&env, "java.util.List")))
    );
    assert_eq!(shown(&env, &values), "java.util.List<java.lang.String>");
}

#[test]
fn arguments_are_relayed_through_intermediate_supertypes() {
    let env = fixture();

    let meta = field(&env, "com.example.Base", "meta", Some("com.example.IntBox"));
    assert_eq!(shown(&env, &meta), "java.lang.String");
    let key = field(&env, "com.example.Base", "key", Some("com.example.IntBox"));
    assert_eq!(shown(&env, &key), "java.lang.Integer");

    let pairs = field(&env, "com.example.Base", "pairs", Some("com.example.IntBox"));
    assert_eq!(
        shown(&env, &pairs),
        "java.util.Map<java.lang.Integer, java.lang.String>"
    );
}

#[test]
fn plain_intermediate_classes_are_walked_through() {
    let env = fixture();
    let value = field(&env, "com.example.Box", "value", Some("com.example.OuterBox"));
    assert_eq!(
        value.concrete_class(),
        Some(&ClassRef::Class(env.well_known().string))
    );
    assert_eq!(shown(&env, &value), "java.lang.String");

    let meta = field(&env, "com.example.Base", "meta", Some("com.example.OuterBox"));
    assert_eq!(shown(&env, &meta), "java.lang.String");
    let values = field(&env, "com.example.Box", "values", Some("com.example.MiddleBox"));
    assert_eq!(shown(&env, &values), "java.util.List<java.lang.String>");
}

#[test]
fn relay_matches_arguments_by_position_not_name() {
    let env = fixture();
    let key = field(&env, "com.example.Base", "key", Some("com.example.Leaf"));
    let meta = field(&env, "com.example.Base", "meta", Some("com.example.Leaf"));
    assert_eq!(shown(&env, &key), "java.lang.Integer");
    assert_eq!(shown(&env, &meta), "java.lang.String");
}

#[test]
fn variables_inside_a_binding_are_grounded_from_the_same_context() {
    let env = fixture();
    let value = field(&env, "com.example.Box", "value", Some("com.example.StringListBox"));
    assert_eq!(shown(&env, &value), "java.util.List<java.lang.String>");
    assert!(value.is_fully_resolved());

    // Seen from `ListBox` itself, `X` is free.
    let open = field(&env, "com.example.Box", "value", Some("com.example.ListBox"));
    assert_eq!(shown(&env, &open), "java.util.List<<unresolved X>>");
    assert!(!open.is_fully_resolved());
}

#[test]
fn generic_arrays_keep_their_dimensions() {
    let env = fixture();
    let string = ClassRef::Class(env.well_known().string);

    let array = field(&env, "com.example.Box", "array", Some("com.example.StringBox"));
    assert!(matches!(array.raw_type(), Type::GenericArray(_)));
    assert_eq!(array.container_type(), Some(&string.clone().array_of()));
    assert_eq!(array.element_class(), Some(&string));
    assert_eq!(shown(&env, &array), "java.lang.String[]");

    let lists = field(&env, "com.example.Box", "lists", Some("com.example.StringBox"));
    assert_eq!(
        lists.container_type(),
        Some(&ClassRef::Class(id(&env, "java.util.List")).array_of())
    );
    assert_eq!(lists.element_types(), &[ElementType::Class(string)]);
    assert_eq!(shown(&env, &lists), "java.util.List<java.lang.String>[]");
}

#[test]
fn nested_parameterized_arguments_resolve_recursively() {
    let env = fixture();
    let nested = field(&env, "com.example.Box", "nested", Some("com.example.IntBox"));
    let [ElementType::Resolved(inner)] = nested.element_types() else {
        panic!("expected a nested resolution, got {nested:?}");
    };
    assert_eq!(
        inner.element_types(),
        &[ElementType::Class(ClassRef::Class(env.well_known().integer))]
    );
    assert_eq!(
        nested.element_class(),
        Some(&ClassRef::Class(id(&env, "java.util.List")))
    );
    assert_eq!(nested.nested().count(), 2);
    assert_eq!(
        shown(&env, &nested),
        "java.util.List<java.util.List<java.lang.Integer>>"
    );
}

#[test]
fn wildcards_follow_their_bounds() {
    let env = fixture();
    let covariant = field(&env, "com.example.Box", "covariant", Some("com.example.StringBox"));
    assert_eq!(shown(&env, &covariant), "java.util.List<java.lang.String>");

    let contravariant =
        field(&env, "com.example.Box", "contravariant", Some("com.example.IntBox"));
    assert_eq!(shown(&env, &contravariant), "java.util.List<java.lang.Integer>");

    let anything = field(&env, "com.example.Box", "anything", Some("com.example.IntBox"));
    assert_eq!(shown(&env, &anything), "java.util.List<java.lang.Object>");
}

#[test]
fn bounded_variables_fall_back_to_their_bound() {
    let env = fixture();
    let number = ClassRef::Class(env.well_known().number);

    let n = env.class(id(&env, "com.example.Bounded")).unwrap().type_params[0];

    let resolved = field(&env, "com.example.Bounded", "number", None);
    assert_eq!(resolved.raw_type(), &Type::TypeVar(n));
    assert_eq!(resolved.element_types(), &[ElementType::Class(number.clone())]);
    assert_eq!(resolved.concrete_class(), Some(&number));

    let numbers = field(&env, "com.example.Bounded", "numbers", None);
    assert_eq!(numbers.container_type(), Some(&number.array_of()));
    assert_eq!(shown(&env, &numbers), "java.lang.Number[]");
}

#[test]
fn several_bounds_form_an_intersection() {
    let env = fixture();
    let both = field(&env, "com.example.Bounded", "both", None);
    assert_eq!(both.container_type(), None);
    assert_eq!(both.element_types().len(), 2);
    assert_eq!(
        both.element_types()[0],
        ElementType::Class(ClassRef::Class(env.well_known().number))
    );
    assert_eq!(
        shown(&env, &both),
        "java.lang.Number & java.lang.Comparable<<unresolved C>>"
    );
}

#[test]
fn wildcard_with_several_bounds_is_an_intersection_element() {
    let env = fixture();
    let integer = ClassRef::Class(env.well_known().integer);
    let comparable = ClassRef::Class(id(&env, "java.lang.Comparable"));

    let bounded = field(&env, "com.example.Box", "bounded", Some("com.example.IntBox"));
    assert_eq!(
        bounded.container_type(),
        Some(&ClassRef::Class(id(&env, "java.util.List")))
    );
    let [ElementType::Resolved(intersection)] = bounded.element_types() else {
        panic!("expected the wildcard to stay nested, got {bounded:?}");
    };
    assert!(matches!(intersection.raw_type(), Type::Wildcard(_)));
    assert_eq!(intersection.container_type(), None);
    assert_eq!(intersection.concrete_class(), None);

    let [first, second] = intersection.element_types() else {
        panic!("expected one element per bound, got {intersection:?}");
    };
    assert_eq!(first, &ElementType::Class(ClassRef::Class(env.well_known().number)));
    let ElementType::Resolved(second) = second else {
        panic!("expected `Comparable<T>` to resolve as a nested type, got {second:?}");
    };
    assert_eq!(second.container_type(), Some(&comparable));
    assert_eq!(second.element_types(), &[ElementType::Class(integer)]);

    assert_eq!(
        shown(&env, &bounded),
        "java.util.List<java.lang.Number & java.lang.Comparable<java.lang.Integer>>"
    );
}

#[test]
fn self_referential_bound_terminates() {
    let env = fixture();
    let comparable = id(&env, "java.lang.Comparable");

    let resolved = field(&env, "com.example.Bounded", "self", None);
    assert_eq!(resolved.container_type(), Some(&ClassRef::Class(comparable)));
    let [ElementType::Resolved(inner)] = resolved.element_types() else {
        panic!("expected the recursive argument to stay nested, got {resolved:?}");
    };
    assert!(inner.is_unresolved());
    assert_eq!(shown(&env, &resolved), "java.lang.Comparable<<unresolved S>>");
}

#[test]
fn superclass_path_wins_over_a_direct_interface() {
    let env = fixture();
    let tag = field(&env, "com.example.Named", "tag", Some("com.example.Diamond"));
    assert_eq!(shown(&env, &tag), "java.lang.String");
}

#[test]
fn context_naming_the_owner_falls_back_to_bounds() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);
    let boxed = id(&env, "com.example.Box");
    let context = Type::parameterized(boxed, vec![Type::class(env.well_known().string)]);

    // The owner's own arguments are never read back as bindings.
    let value = resolver
        .resolve_field_named(boxed, "value", Some(&context))
        .unwrap();
    assert!(value.is_unresolved());
    assert_eq!(shown(&env, &value), "<unresolved T>");

    let bounded = id(&env, "com.example.Bounded");
    let integer = Type::class(env.well_known().integer);
    let context = Type::parameterized(bounded, vec![integer.clone(), integer.clone(), integer]);
    let number = resolver
        .resolve_field_named(bounded, "number", Some(&context))
        .unwrap();
    assert_eq!(shown(&env, &number), "java.lang.Number");

    // Supertypes above the owner still see the context's arguments.
    let context = Type::parameterized(boxed, vec![Type::class(env.well_known().string)]);
    let meta = resolver
        .resolve_field_named(id(&env, "com.example.Base"), "meta", Some(&context))
        .unwrap();
    assert_eq!(shown(&env, &meta), "java.lang.String");
    let key = resolver
        .resolve_field_named(id(&env, "com.example.Base"), "key", Some(&context))
        .unwrap();
    assert_eq!(shown(&env, &key), "java.lang.String");
}

#[test]
fn resolution_is_idempotent() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);
    let base = id(&env, "com.example.Base");
    let context = Type::class(id(&env, "com.example.IntBox"));

    for name in ["key", "meta", "pairs"] {
        let first = resolver
            .resolve_field_named(base, name, Some(&context))
            .unwrap();
        let second = resolver
            .resolve_field_named(base, name, Some(&context))
            .unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn results_serialize_for_tooling() {
    let env = fixture();
    let resolved = field(&env, "com.example.Box", "names", None);
    let json = serde_json::to_value(&resolved).unwrap();
    assert!(json.get("raw").is_some());
    assert_eq!(json["elements"].as_array().map(Vec::len), Some(1));
}
