use jgeneric_config::{CacheConfig, JgenericConfig, ResolverConfig};
use jgeneric_resolve::{CacheStats, CachingResolver, ResolveError, TypeResolver};
use jgeneric_signature::load_toml;
use jgeneric_types::{
    ClassId, ClassRef, PrimitiveType, Type, TypeEnv, TypeStore, TypeVarId,
};

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

#[test]
fn return_types_resolve_like_fields() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);
    let boxed = id(&env, "com.example.Box");
    let context = Type::class(id(&env, "com.example.StringBox"));

    let get = resolver
        .resolve_return_type_named(boxed, "get", Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(get.display(&env).to_string(), "java.lang.String");

    let size = resolver
        .resolve_return_type_named(boxed, "size", None)
        .unwrap()
        .unwrap();
    assert_eq!(
        size.concrete_class(),
        Some(&ClassRef::Primitive(PrimitiveType::Int))
    );

    // `put` is declared without a return type.
    assert_eq!(
        resolver.resolve_return_type_named(boxed, "put", Some(&context)),
        Ok(None)
    );
}

#[test]
fn parameters_resolve_in_declaration_order() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);
    let boxed = id(&env, "com.example.Box");
    let context = Type::class(id(&env, "com.example.IntBox"));
    let put = env.class(boxed).unwrap().method("put").unwrap();

    let params = resolver
        .resolve_param_types(boxed, put, Some(&context))
        .unwrap()
        .unwrap();
    let rendered: Vec<String> = params
        .iter()
        .map(|param| param.display(&env).to_string())
        .collect();
    assert_eq!(rendered, vec!["java.lang.Integer", "int"]);

    let first = resolver
        .resolve_param_type(boxed, put, Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(first, params[0]);

    let get = env.class(boxed).unwrap().method("get").unwrap();
    assert_eq!(resolver.resolve_param_types(boxed, get, Some(&context)), Ok(None));
    assert_eq!(resolver.resolve_param_type(boxed, get, Some(&context)), Ok(None));
}

#[test]
fn method_type_parameters_use_their_bounds() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);
    let boxed = id(&env, "com.example.Box");
    let context = Type::class(id(&env, "com.example.StringBox"));

    let first = resolver
        .resolve_return_type_named(boxed, "first", Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(first.display(&env).to_string(), "java.lang.Number");

    let params = resolver
        .resolve_param_types_named(boxed, "first", Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(
        params[0].display(&env).to_string(),
        "java.util.List<java.lang.Number>"
    );
}

#[test]
fn superclass_declarations_resolve_from_the_class_itself() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);

    let string_box = resolver
        .resolve_class_supertype(id(&env, "com.example.StringBox"))
        .unwrap()
        .unwrap();
    assert_eq!(
        string_box.display(&env).to_string(),
        "com.example.Box<java.lang.String>"
    );

    // `T` is free inside `Box` itself.
    let boxed = resolver
        .resolve_class_supertype(id(&env, "com.example.Box"))
        .unwrap()
        .unwrap();
    assert_eq!(
        boxed.display(&env).to_string(),
        "com.example.Base<<unresolved T>, java.lang.String>"
    );

    let base = resolver
        .resolve_class_supertype(id(&env, "com.example.Base"))
        .unwrap()
        .unwrap();
    assert_eq!(base.concrete_class(), Some(&ClassRef::Class(env.well_known().object)));

    assert_eq!(
        resolver.resolve_class_supertype(id(&env, "com.example.Named")),
        Ok(None)
    );
    assert_eq!(
        resolver.resolve_class_supertype(env.well_known().object),
        Ok(None)
    );
}

#[test]
fn invalid_requests_are_errors() {
    let env = fixture();
    let resolver = TypeResolver::new(&env);
    let boxed = id(&env, "com.example.Box");
    let string = env.well_known().string;

    assert_eq!(
        resolver.resolve_field_named(boxed, "missing", None),
        Err(ResolveError::UnknownField {
            class: "com.example.Box".to_string(),
            name: "missing".to_string(),
        })
    );
    assert_eq!(
        resolver.resolve_return_type_named(boxed, "missing", None),
        Err(ResolveError::UnknownMethod {
            class: "com.example.Box".to_string(),
            name: "missing".to_string(),
        })
    );

    let unknown = ClassId::new(9_999);
    assert_eq!(
        resolver.resolve(&Type::class(string), unknown, None),
        Err(ResolveError::UnknownClass(unknown))
    );

    let array_context = Type::Class(ClassRef::Class(string).array_of());
    let err = resolver
        .resolve_field_named(boxed, "value", Some(&array_context))
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::InvalidContext("java.lang.String[]".to_string())
    );
    assert_eq!(
        err.to_string(),
        "context type `java.lang.String[]` is neither a class nor a parameterized type"
    );

    let dangling = TypeVarId::new(9_999);
    assert_eq!(
        resolver.resolve(&Type::TypeVar(dangling), boxed, None),
        Err(ResolveError::UnknownTypeVar(dangling))
    );
}

#[test]
fn depth_limit_ends_the_ancestor_search() {
    let env = fixture();
    let base = id(&env, "com.example.Base");
    let context = Type::class(id(&env, "com.example.IntBox"));

    let shallow = TypeResolver::with_config(&env, &ResolverConfig { max_depth: 1 });
    let meta = shallow
        .resolve_field_named(base, "meta", Some(&context))
        .unwrap();
    assert!(meta.is_unresolved());

    let deep = TypeResolver::with_config(&env, &ResolverConfig { max_depth: 2 });
    let meta = deep.resolve_field_named(base, "meta", Some(&context)).unwrap();
    assert_eq!(meta.display(&env).to_string(), "java.lang.String");
}

#[test]
fn cache_serves_repeated_lookups() {
    let env = fixture();
    let config = JgenericConfig::load_from_str("[cache]\nenabled = true\n").unwrap();
    let cache = CachingResolver::new(
        TypeResolver::with_config(&env, &config.resolver),
        &config.cache,
    );

    let boxed = id(&env, "com.example.Box");
    let value = env.class(boxed).unwrap().field("value").unwrap().ty.clone();
    let context = Type::class(id(&env, "com.example.StringBox"));

    let first = cache.resolve(&value, boxed, Some(&context)).unwrap();
    let second = cache.resolve(&value, boxed, Some(&context)).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        cache
            .resolver()
            .resolve(&value, boxed, Some(&context))
            .unwrap()
    );
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            entries: 1,
        }
    );

    // An omitted context and the owner itself share an entry.
    cache.resolve(&value, boxed, None).unwrap();
    cache.resolve(&value, boxed, Some(&Type::class(boxed))).unwrap();
    assert_eq!(cache.stats().entries, 2);
    assert_eq!(cache.stats().hits, 2);

    cache.clear();
    assert_eq!(cache.stats().entries, 0);
}

#[test]
fn cache_respects_capacity_and_never_stores_errors() {
    let env = fixture();
    let cache = CachingResolver::new(
        TypeResolver::new(&env),
        &CacheConfig {
            enabled: true,
            capacity: 1,
        },
    );
    let boxed = id(&env, "com.example.Box");
    let def = env.class(boxed).unwrap();

    for name in ["value", "values", "names"] {
        cache
            .resolve(&def.field(name).unwrap().ty, boxed, None)
            .unwrap();
        assert_eq!(cache.stats().entries, 1);
    }

    let array_context = Type::Class(ClassRef::Class(env.well_known().string).array_of());
    assert!(cache
        .resolve(&def.field("value").unwrap().ty, boxed, Some(&array_context))
        .is_err());
    assert_eq!(cache.stats().entries, 1);
}

#[test]
fn disabled_cache_passes_through() {
    let env = fixture();
    let cache = CachingResolver::new(TypeResolver::new(&env), &CacheConfig::default());
    let boxed = id(&env, "com.example.Box");
    let ty = env.class(boxed).unwrap().field("labels").unwrap().ty.clone();

    cache.resolve(&ty, boxed, None).unwrap();
    cache.resolve(&ty, boxed, None).unwrap();
    assert_eq!(cache.stats(), CacheStats::default());
}
