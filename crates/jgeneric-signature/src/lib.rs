//! Build [`jgeneric_types`] models from Java source-style signatures.
//!
//! Reflection hands out generic signatures already parsed; fixtures, tests and tools instead
//! describe classes as text (`java.util.Map<K, List<? extends V>>`). This crate parses that text
//! into [`jgeneric_types::Type`] descriptors and loads whole class models from TOML or JSON.

#![forbid(unsafe_code)]

mod error;
mod loader;
mod parse;

pub use error::{LoadError, SignatureError};
pub use loader::{
    load_json, load_toml, ClassDecl, DeclKind, FieldDecl, MethodDecl, ModelDocument, ModelLoader,
};
pub use parse::{parse_type, split_type_param_decl, TypeVarScope};
