//! Read-only model of declared Java types, as exposed by a host type-introspection facility.
//!
//! Descriptors ([`Type`]) mirror what a reflective runtime hands out for a field, a method
//! signature or a class header: a concrete class, a parameterized instantiation, a generic array,
//! a wildcard or a type variable. Class and type-parameter metadata lives in a [`TypeEnv`]
//! (usually a [`TypeStore`]) and is addressed by small copyable ids.

use serde::{Deserialize, Serialize};

mod format;
mod store;
mod subtyping;

pub use format::{format_class_ref, format_type};
pub use store::TypeStore;
pub use subtyping::{erasure, is_subclass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => PrimitiveType::Boolean,
            "byte" => PrimitiveType::Byte,
            "short" => PrimitiveType::Short,
            "char" => PrimitiveType::Char,
            "int" => PrimitiveType::Int,
            "long" => PrimitiveType::Long,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            _ => return None,
        })
    }
}

/// A non-generic runtime class: a declared class, a primitive, or an array of either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassRef {
    Class(ClassId),
    Primitive(PrimitiveType),
    Array(Box<ClassRef>),
}

impl ClassRef {
    pub fn is_array(&self) -> bool {
        matches!(self, ClassRef::Array(_))
    }

    /// The component class of an array class (`String[][]` -> `String[]`).
    pub fn component(&self) -> Option<&ClassRef> {
        match self {
            ClassRef::Array(component) => Some(component),
            _ => None,
        }
    }

    /// `self[]`.
    pub fn array_of(self) -> ClassRef {
        ClassRef::Array(Box::new(self))
    }

    /// Wrap `self` in `dims` array dimensions.
    pub fn array_of_dims(self, dims: usize) -> ClassRef {
        (0..dims).fold(self, |acc, _| acc.array_of())
    }

    /// The innermost non-array class (`int[][]` -> `int`).
    pub fn element(&self) -> &ClassRef {
        let mut current = self;
        while let ClassRef::Array(component) = current {
            current = component;
        }
        current
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            ClassRef::Class(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterizedType {
    pub raw: ClassId,
    pub args: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardType {
    pub upper_bounds: Vec<Type>,
    pub lower_bounds: Vec<Type>,
}

impl WildcardType {
    /// `?`
    pub fn unbounded() -> Self {
        Self {
            upper_bounds: Vec::new(),
            lower_bounds: Vec::new(),
        }
    }

    /// `? extends upper`
    pub fn extends(upper: Type) -> Self {
        Self {
            upper_bounds: vec![upper],
            lower_bounds: Vec::new(),
        }
    }

    /// `? super lower`
    pub fn super_of(lower: Type) -> Self {
        Self {
            upper_bounds: Vec::new(),
            lower_bounds: vec![lower],
        }
    }
}

/// A declared, possibly generic, type.
///
/// The set of variants is closed; consumers are expected to match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// A non-generic type, possibly an array class (`String`, `int[]`).
    Class(ClassRef),
    /// `List<String>`.
    Parameterized(ParameterizedType),
    /// An array whose component is generic (`T[]`, `List<String>[]`).
    GenericArray(Box<Type>),
    /// `? extends Number`, `? super Integer`.
    Wildcard(WildcardType),
    /// A type parameter reference; see [`TypeEnv::type_param`].
    TypeVar(TypeVarId),
}

impl Type {
    pub fn class(id: ClassId) -> Type {
        Type::Class(ClassRef::Class(id))
    }

    pub fn primitive(ty: PrimitiveType) -> Type {
        Type::Class(ClassRef::Primitive(ty))
    }

    pub fn parameterized(raw: ClassId, args: Vec<Type>) -> Type {
        Type::Parameterized(ParameterizedType { raw, args })
    }

    pub fn generic_array(component: Type) -> Type {
        Type::GenericArray(Box::new(component))
    }

    pub fn as_class_ref(&self) -> Option<&ClassRef> {
        match self {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Whether this descriptor mentions a type variable anywhere.
    pub fn has_type_vars(&self) -> bool {
        match self {
            Type::Class(_) => false,
            Type::TypeVar(_) => true,
            Type::Parameterized(p) => p.args.iter().any(Type::has_type_vars),
            Type::GenericArray(component) => component.has_type_vars(),
            Type::Wildcard(w) => w
                .upper_bounds
                .iter()
                .chain(&w.lower_bounds)
                .any(Type::has_type_vars),
        }
    }
}

/// The declaration a type parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericDecl {
    Class(ClassId),
    /// `method` indexes into [`ClassDef::methods`].
    Method { class: ClassId, method: u32 },
}

impl GenericDecl {
    /// The class that lexically encloses the declaration.
    pub fn class(self) -> ClassId {
        match self {
            GenericDecl::Class(class) => class,
            GenericDecl::Method { class, .. } => class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    /// Declared upper bounds in source order. Empty means the implicit `Object` bound.
    pub upper_bounds: Vec<Type>,
    /// Filled in once the declaring class is defined in a [`TypeStore`].
    pub owner: Option<GenericDecl>,
    /// Index among the owner's formal type parameters.
    pub position: u32,
}

impl TypeParamDef {
    pub fn new(name: impl Into<String>, upper_bounds: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            upper_bounds,
            owner: None,
            position: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    /// `None` for `void`.
    pub return_type: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.List`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    /// Declared generic superclass. `None` for interfaces and `java.lang.Object`.
    pub super_class: Option<Type>,
    /// Declared generic interfaces, in declaration order.
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// First declared method called `name`.
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Declared superclass followed by declared interfaces: the order in which ancestors are
    /// searched.
    pub fn supertypes(&self) -> impl Iterator<Item = &Type> {
        self.super_class.iter().chain(self.interfaces.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub number: ClassId,
    pub integer: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
}

/// Read-only access to class and type-parameter metadata.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}
