//! Ground declared generic types to concrete classes.
//!
//! A field declared as `T value` in `Box<T>` says nothing concrete on its own; seen from
//! `class StringBox extends Box<String>` it is a `String`. [`TypeResolver`] answers that question
//! for fields, method signatures and superclass declarations by walking the class hierarchy from
//! a context type up to the declaration that binds each type variable, relaying actual arguments
//! through intermediate generic supertypes on the way.
//!
//! Whatever cannot be grounded (a free variable with no usable bound, a self-referential bound)
//! comes back as an unresolved [`ResolvedType`] rather than an error.

#![forbid(unsafe_code)]

mod cache;
mod error;
mod resolved;
mod resolver;
mod walk;

pub use cache::{CacheStats, CachingResolver};
pub use error::{ResolveError, Result};
pub use resolved::{DisplayResolved, ElementType, Nested, ResolvedType};
pub use resolver::TypeResolver;

/// Tracing target used by this crate.
pub const RESOLVE_TARGET: &str = "jgeneric.resolve";
