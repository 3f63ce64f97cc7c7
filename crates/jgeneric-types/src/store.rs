use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, GenericDecl, Type, TypeEnv, TypeParamDef, TypeVarId,
    WellKnownTypes,
};

/// In-memory [`TypeEnv`] that owns all class and type-parameter definitions.
///
/// Class ids can be reserved with [`TypeStore::intern_class_id`] before the class is defined,
/// which is how forward and self-referential references (`E extends Enum<E>`) are built.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    /// A store that defines just the core `java.lang` / `java.io` types.
    fn default() -> Self {
        let placeholder = ClassId::new(0);
        let mut store = TypeStore {
            classes: Vec::new(),
            class_by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known: WellKnownTypes {
                object: placeholder,
                string: placeholder,
                number: placeholder,
                integer: placeholder,
                cloneable: placeholder,
                serializable: placeholder,
            },
        };

        let object = store.add_class(class_def("java.lang.Object", ClassKind::Class, None));
        let object_ty = Type::class(object);
        let cloneable =
            store.add_class(class_def("java.lang.Cloneable", ClassKind::Interface, None));
        let serializable =
            store.add_class(class_def("java.io.Serializable", ClassKind::Interface, None));

        let mut string_def = class_def(
            "java.lang.String",
            ClassKind::Class,
            Some(object_ty.clone()),
        );
        string_def.interfaces.push(Type::class(serializable));
        let string = store.add_class(string_def);

        let mut number_def = class_def(
            "java.lang.Number",
            ClassKind::Class,
            Some(object_ty.clone()),
        );
        number_def.interfaces.push(Type::class(serializable));
        let number = store.add_class(number_def);

        let integer = store.add_class(class_def(
            "java.lang.Integer",
            ClassKind::Class,
            Some(Type::class(number)),
        ));

        store.well_known = WellKnownTypes {
            object,
            string,
            number,
            integer,
            cloneable,
            serializable,
        };
        store
    }
}

impl TypeStore {
    /// A small, hand-written slice of the JDK that is enough for most generic resolution
    /// scenarios: boxed numbers, `Comparable`, and the core collection interfaces.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore::default();
        let wk = *store.well_known();
        let object = Type::class(wk.object);

        // interface Comparable<T>
        let comparable = store.intern_class_id("java.lang.Comparable");
        let comparable_t = store.add_type_param("T", vec![]);
        store.define_class(
            comparable,
            ClassDef {
                type_params: vec![comparable_t],
                ..class_def("java.lang.Comparable", ClassKind::Interface, None)
            },
        );

        // String implements Serializable, Comparable<String>
        if let Some(mut string_def) = store.class(wk.string).cloned() {
            string_def.interfaces.push(Type::parameterized(
                comparable,
                vec![Type::class(wk.string)],
            ));
            store.define_class(wk.string, string_def);
        }
        // Integer extends Number implements Comparable<Integer>
        if let Some(mut integer_def) = store.class(wk.integer).cloned() {
            integer_def.interfaces.push(Type::parameterized(
                comparable,
                vec![Type::class(wk.integer)],
            ));
            store.define_class(wk.integer, integer_def);
        }

        let long = store.intern_class_id("java.lang.Long");
        store.define_class(
            long,
            ClassDef {
                interfaces: vec![Type::parameterized(comparable, vec![Type::class(long)])],
                ..class_def("java.lang.Long", ClassKind::Class, Some(Type::class(wk.number)))
            },
        );
        let boolean = store.intern_class_id("java.lang.Boolean");
        store.define_class(
            boolean,
            ClassDef {
                interfaces: vec![
                    Type::class(wk.serializable),
                    Type::parameterized(comparable, vec![Type::class(boolean)]),
                ],
                ..class_def("java.lang.Boolean", ClassKind::Class, Some(object.clone()))
            },
        );

        // interface Iterable<T>
        let iterable_t = store.add_type_param("T", vec![]);
        let iterable = store.add_class(ClassDef {
            type_params: vec![iterable_t],
            ..class_def("java.lang.Iterable", ClassKind::Interface, None)
        });

        // interface Collection<E> extends Iterable<E>
        let collection_e = store.add_type_param("E", vec![]);
        let collection = store.add_class(ClassDef {
            type_params: vec![collection_e],
            interfaces: vec![Type::parameterized(
                iterable,
                vec![Type::TypeVar(collection_e)],
            )],
            ..class_def("java.util.Collection", ClassKind::Interface, None)
        });

        // interface List<E> extends Collection<E>
        let list_e = store.add_type_param("E", vec![]);
        let list = store.add_class(ClassDef {
            type_params: vec![list_e],
            interfaces: vec![Type::parameterized(collection, vec![Type::TypeVar(list_e)])],
            ..class_def("java.util.List", ClassKind::Interface, None)
        });

        // interface Set<E> extends Collection<E>
        let set_e = store.add_type_param("E", vec![]);
        store.add_class(ClassDef {
            type_params: vec![set_e],
            interfaces: vec![Type::parameterized(collection, vec![Type::TypeVar(set_e)])],
            ..class_def("java.util.Set", ClassKind::Interface, None)
        });

        // class ArrayList<E> implements List<E>, Cloneable, Serializable
        let array_list_e = store.add_type_param("E", vec![]);
        store.add_class(ClassDef {
            type_params: vec![array_list_e],
            interfaces: vec![
                Type::parameterized(list, vec![Type::TypeVar(array_list_e)]),
                Type::class(wk.cloneable),
                Type::class(wk.serializable),
            ],
            ..class_def("java.util.ArrayList", ClassKind::Class, Some(object.clone()))
        });

        // interface Map<K, V>
        let map_k = store.add_type_param("K", vec![]);
        let map_v = store.add_type_param("V", vec![]);
        let map = store.add_class(ClassDef {
            type_params: vec![map_k, map_v],
            ..class_def("java.util.Map", ClassKind::Interface, None)
        });

        // class HashMap<K, V> implements Map<K, V>, Cloneable, Serializable
        let hash_map_k = store.add_type_param("K", vec![]);
        let hash_map_v = store.add_type_param("V", vec![]);
        store.add_class(ClassDef {
            type_params: vec![hash_map_k, hash_map_v],
            interfaces: vec![
                Type::parameterized(
                    map,
                    vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
                ),
                Type::class(wk.cloneable),
                Type::class(wk.serializable),
            ],
            ..class_def("java.util.HashMap", ClassKind::Class, Some(object))
        });

        store
    }

    /// Exact binary-name lookup.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    /// Reserve an id for `name` without defining the class yet. Idempotent.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = ClassId::new(self.classes.len() as u32);
        self.classes.push(None);
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    /// Define (or redefine) the class behind `id`.
    ///
    /// Type parameters listed on the class and on its methods get their `owner` and `position`
    /// assigned here.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        for (position, tp) in def.type_params.iter().enumerate() {
            self.attach_type_param(*tp, GenericDecl::Class(id), position);
        }
        for (method_idx, method) in def.methods.iter().enumerate() {
            let decl = GenericDecl::Method {
                class: id,
                method: method_idx as u32,
            };
            for (position, tp) in method.type_params.iter().enumerate() {
                self.attach_type_param(*tp, decl, position);
            }
        }

        self.class_by_name.insert(def.name.clone(), id);
        let idx = id.to_raw() as usize;
        if idx >= self.classes.len() {
            self.classes.resize(idx + 1, None);
        }
        self.classes[idx] = Some(def);
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId::new(self.classes.len() as u32);
        self.classes.push(None);
        self.define_class(id, def);
        id
    }

    /// Define `def`, reusing the id already registered under its name if there is one.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::new(self.type_params.len() as u32);
        self.type_params
            .push(TypeParamDef::new(name, upper_bounds));
        id
    }

    /// Replace the definition of an already allocated type parameter, keeping its attachment.
    pub fn define_type_param(&mut self, id: TypeVarId, mut def: TypeParamDef) {
        let Some(slot) = self.type_params.get_mut(id.to_raw() as usize) else {
            return;
        };
        if def.owner.is_none() {
            def.owner = slot.owner;
            def.position = slot.position;
        }
        *slot = def;
    }

    /// Replace only the bounds of an already allocated type parameter.
    pub fn set_type_param_bounds(&mut self, id: TypeVarId, upper_bounds: Vec<Type>) {
        if let Some(slot) = self.type_params.get_mut(id.to_raw() as usize) {
            slot.upper_bounds = upper_bounds;
        }
    }

    /// All defined classes, in id order.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .filter_map(|(idx, def)| Some((ClassId::new(idx as u32), def.as_ref()?)))
    }

    fn attach_type_param(&mut self, id: TypeVarId, owner: GenericDecl, position: usize) {
        if let Some(tp) = self.type_params.get_mut(id.to_raw() as usize) {
            tp.owner = Some(owner);
            tp.position = position as u32;
        }
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.to_raw() as usize)?.as_ref()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.to_raw() as usize)
    }

    /// Binary-name lookup that also accepts simple names of `java.lang` types.
    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.class_id(name) {
            return Some(id);
        }
        if name.contains('.') {
            return None;
        }
        self.class_id(&format!("java.lang.{name}"))
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

fn class_def(name: &str, kind: ClassKind, super_class: Option<Type>) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        kind,
        type_params: vec![],
        super_class,
        interfaces: vec![],
        fields: vec![],
        methods: vec![],
    }
}
