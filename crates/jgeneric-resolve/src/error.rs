use jgeneric_types::{ClassId, TypeVarId};

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Precondition violations and inconsistencies in the type model.
///
/// A type that cannot be grounded is not an error; it comes back as an unresolved
/// [`crate::ResolvedType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("class #{} is not defined in the type environment", .0.to_raw())]
    UnknownClass(ClassId),

    #[error("type variable #{} is not defined in the type environment", .0.to_raw())]
    UnknownTypeVar(TypeVarId),

    #[error("class `{class}` has no field `{name}`")]
    UnknownField { class: String, name: String },

    #[error("class `{class}` has no method `{name}`")]
    UnknownMethod { class: String, name: String },

    #[error("context type `{0}` is neither a class nor a parameterized type")]
    InvalidContext(String),
}
