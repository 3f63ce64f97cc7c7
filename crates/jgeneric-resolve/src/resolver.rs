use std::collections::HashSet;

use jgeneric_config::ResolverConfig;
use jgeneric_types::{
    erasure, format_type, ClassDef, ClassId, ClassRef, FieldDef, MethodDef, Type, TypeEnv,
    TypeVarId,
};

use crate::error::{ResolveError, Result};
use crate::resolved::{ElementType, ResolvedType};
use crate::RESOLVE_TARGET;

/// Grounds declared types against a [`TypeEnv`].
///
/// Every call is independent: the resolver holds no mutable state, so one instance can serve any
/// number of lookups.
#[derive(Clone, Copy)]
pub struct TypeResolver<'env> {
    env: &'env dyn TypeEnv,
    max_depth: usize,
}

/// Per-call state.
pub(crate) struct Walk<'a> {
    /// The context every type variable is grounded from.
    pub(crate) context: &'a Type,
    /// Fallback declaring class for variables without an attached owner.
    pub(crate) owner: ClassId,
    /// `(variable, context)` pairs currently being grounded.
    pub(crate) in_progress: HashSet<(TypeVarId, Type)>,
}

impl<'env> TypeResolver<'env> {
    pub fn new(env: &'env dyn TypeEnv) -> Self {
        Self::with_config(env, &ResolverConfig::default())
    }

    pub fn with_config(env: &'env dyn TypeEnv, config: &ResolverConfig) -> Self {
        Self {
            env,
            max_depth: config.max_depth.max(1),
        }
    }

    pub fn env(&self) -> &'env dyn TypeEnv {
        self.env
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Ground `declared`, written inside class `owner`, as seen from `context`.
    ///
    /// `context` defaults to the owner itself, in which case type variables fall back to their
    /// bounds.
    pub fn resolve(
        &self,
        declared: &Type,
        owner: ClassId,
        context: Option<&Type>,
    ) -> Result<ResolvedType> {
        self.class_def(owner)?;
        let default_context;
        let context = match context {
            Some(context) => {
                self.check_context(context)?;
                context
            }
            None => {
                default_context = Type::class(owner);
                &default_context
            }
        };

        let mut walk = Walk {
            context,
            owner,
            in_progress: HashSet::new(),
        };
        let resolved = self.dispatch(declared, declared, 0, &mut walk)?;
        tracing::trace!(
            target: RESOLVE_TARGET,
            declared = %format_type(self.env, declared),
            context = %format_type(self.env, context),
            resolved = %resolved.display(self.env),
            "resolved declared type"
        );
        Ok(resolved)
    }

    pub fn resolve_field(
        &self,
        owner: ClassId,
        field: &FieldDef,
        context: Option<&Type>,
    ) -> Result<ResolvedType> {
        self.resolve(&field.ty, owner, context)
    }

    /// Look up field `name` on `owner` and resolve its declared type.
    pub fn resolve_field_named(
        &self,
        owner: ClassId,
        name: &str,
        context: Option<&Type>,
    ) -> Result<ResolvedType> {
        let def = self.class_def(owner)?;
        let field = def.field(name).ok_or_else(|| ResolveError::UnknownField {
            class: def.name.clone(),
            name: name.to_string(),
        })?;
        self.resolve_field(owner, field, context)
    }

    /// `None` for `void` methods.
    pub fn resolve_return_type(
        &self,
        owner: ClassId,
        method: &MethodDef,
        context: Option<&Type>,
    ) -> Result<Option<ResolvedType>> {
        method
            .return_type
            .as_ref()
            .map(|ty| self.resolve(ty, owner, context))
            .transpose()
    }

    /// The first declared parameter, or `None` when the method takes no parameters.
    pub fn resolve_param_type(
        &self,
        owner: ClassId,
        method: &MethodDef,
        context: Option<&Type>,
    ) -> Result<Option<ResolvedType>> {
        method
            .params
            .first()
            .map(|ty| self.resolve(ty, owner, context))
            .transpose()
    }

    /// Every declared parameter in order, or `None` when the method takes no parameters.
    pub fn resolve_param_types(
        &self,
        owner: ClassId,
        method: &MethodDef,
        context: Option<&Type>,
    ) -> Result<Option<Vec<ResolvedType>>> {
        if method.params.is_empty() {
            return Ok(None);
        }
        method
            .params
            .iter()
            .map(|ty| self.resolve(ty, owner, context))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    pub fn resolve_return_type_named(
        &self,
        owner: ClassId,
        name: &str,
        context: Option<&Type>,
    ) -> Result<Option<ResolvedType>> {
        let method = self.method_def(owner, name)?;
        self.resolve_return_type(owner, method, context)
    }

    pub fn resolve_param_types_named(
        &self,
        owner: ClassId,
        name: &str,
        context: Option<&Type>,
    ) -> Result<Option<Vec<ResolvedType>>> {
        let method = self.method_def(owner, name)?;
        self.resolve_param_types(owner, method, context)
    }

    /// The declared superclass of `class`, grounded from `class` itself.
    ///
    /// `None` for interfaces and for classes without a superclass.
    pub fn resolve_class_supertype(&self, class: ClassId) -> Result<Option<ResolvedType>> {
        let def = self.class_def(class)?;
        def.super_class
            .as_ref()
            .map(|super_class| self.resolve(super_class, class, None))
            .transpose()
    }

    pub(crate) fn class_def(&self, id: ClassId) -> Result<&'env ClassDef> {
        self.env.class(id).ok_or(ResolveError::UnknownClass(id))
    }

    fn method_def(&self, owner: ClassId, name: &str) -> Result<&'env MethodDef> {
        let def = self.class_def(owner)?;
        def.method(name).ok_or_else(|| ResolveError::UnknownMethod {
            class: def.name.clone(),
            name: name.to_string(),
        })
    }

    fn check_context(&self, context: &Type) -> Result<()> {
        let class = erasure(context)
            .ok_or_else(|| ResolveError::InvalidContext(format_type(self.env, context)))?;
        self.class_def(class)?;
        Ok(())
    }

    /// Ground `ty` and report the result as standing for `origin`.
    ///
    /// `dims` counts the array dimensions peeled off on the way down; they are re-applied to
    /// whatever the innermost type grounds to. `origin` is never replaced.
    pub(crate) fn dispatch(
        &self,
        origin: &Type,
        ty: &Type,
        dims: usize,
        walk: &mut Walk<'_>,
    ) -> Result<ResolvedType> {
        match ty {
            Type::Class(class) => Ok(concrete(origin, class.clone().array_of_dims(dims))),
            Type::Parameterized(p) => {
                let elements = p
                    .args
                    .iter()
                    .map(|arg| self.element(arg, walk))
                    .collect::<Result<Vec<_>>>()?;
                let container = ClassRef::Class(p.raw).array_of_dims(dims);
                Ok(ResolvedType::new(origin.clone(), elements, Some(container)))
            }
            Type::GenericArray(component) => self.dispatch(origin, component, dims + 1, walk),
            Type::Wildcard(wildcard) => {
                let bounds = if wildcard.upper_bounds.is_empty() {
                    &wildcard.lower_bounds
                } else {
                    &wildcard.upper_bounds
                };
                self.resolve_bounds(origin, bounds, dims, walk)
            }
            Type::TypeVar(var) => self.resolve_type_var(origin, *var, dims, walk),
        }
    }

    /// Resolve a type argument or bound for use as an element.
    pub(crate) fn element(&self, ty: &Type, walk: &mut Walk<'_>) -> Result<ElementType> {
        if let Type::Class(class) = ty {
            return Ok(ElementType::Class(class.clone()));
        }
        let resolved = self.dispatch(ty, ty, 0, walk)?;
        Ok(match resolved.grounded_class() {
            Some(class) => ElementType::Class(class.clone()),
            None => ElementType::Resolved(resolved),
        })
    }

    /// Ground through declared bounds: none leaves `origin` unresolved, one is followed, several
    /// form an intersection.
    pub(crate) fn resolve_bounds(
        &self,
        origin: &Type,
        bounds: &[Type],
        dims: usize,
        walk: &mut Walk<'_>,
    ) -> Result<ResolvedType> {
        match bounds {
            [] => Ok(ResolvedType::unresolved(origin.clone())),
            [bound] => self.dispatch(origin, bound, dims, walk),
            bounds => {
                let elements = bounds
                    .iter()
                    .map(|bound| self.element(bound, walk))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ResolvedType::new(origin.clone(), elements, None))
            }
        }
    }
}

/// `class` reached from `origin`. A declared concrete class stands alone; a variable, wildcard or
/// bound that grounded to a scalar class carries it as its only element.
fn concrete(origin: &Type, class: ClassRef) -> ResolvedType {
    if let Some(component) = class.component() {
        let component = component.clone();
        return ResolvedType::new(origin.clone(), vec![ElementType::Class(component)], Some(class));
    }
    if origin.as_class_ref() == Some(&class) {
        ResolvedType::new(origin.clone(), Vec::new(), None)
    } else {
        ResolvedType::new(origin.clone(), vec![ElementType::Class(class)], None)
    }
}
