//! Grounding a type variable by walking up from the context class until the supertype that
//! binds it is found.

use std::collections::HashSet;

use jgeneric_types::{
    erasure, format_type, is_subclass, ClassDef, ClassId, ClassRef, GenericDecl, ParameterizedType,
    Type, TypeParamDef, TypeVarId,
};

use crate::error::{ResolveError, Result};
use crate::resolved::ResolvedType;
use crate::resolver::{TypeResolver, Walk};
use crate::RESOLVE_TARGET;

impl<'env> TypeResolver<'env> {
    pub(crate) fn resolve_type_var(
        &self,
        origin: &Type,
        var: TypeVarId,
        dims: usize,
        walk: &mut Walk<'_>,
    ) -> Result<ResolvedType> {
        let param = self
            .env()
            .type_param(var)
            .ok_or(ResolveError::UnknownTypeVar(var))?;

        let key = (var, walk.context.clone());
        if !walk.in_progress.insert(key.clone()) {
            tracing::debug!(
                target: RESOLVE_TARGET,
                var = %param.name,
                context = %format_type(self.env(), walk.context),
                "type variable refers back to itself; leaving it unresolved"
            );
            return Ok(ResolvedType::unresolved(origin.clone()));
        }
        let result = self.ground_type_var(origin, var, param, dims, walk);
        walk.in_progress.remove(&key);
        result
    }

    fn ground_type_var(
        &self,
        origin: &Type,
        var: TypeVarId,
        param: &TypeParamDef,
        dims: usize,
        walk: &mut Walk<'_>,
    ) -> Result<ResolvedType> {
        let owner = param.owner.map(GenericDecl::class).unwrap_or(walk.owner);
        match self.binding_from(var, owner, walk.context, 0, &mut HashSet::new()) {
            Some(actual) => {
                tracing::trace!(
                    target: RESOLVE_TARGET,
                    var = %param.name,
                    actual = %format_type(self.env(), &actual),
                    "found binding"
                );
                self.dispatch(origin, &actual, dims, walk)
            }
            None => self.resolve_bounds(origin, &param.upper_bounds, dims, walk),
        }
    }

    /// The actual argument `context` supplies for `var`, declared on `owner`.
    ///
    /// `None` means the variable is free in `context` and only its bounds are known. That includes
    /// every context whose class is `owner` itself, parameterized or not.
    fn binding_from(
        &self,
        var: TypeVarId,
        owner: ClassId,
        context: &Type,
        depth: usize,
        seen: &mut HashSet<ClassId>,
    ) -> Option<Type> {
        let class = erasure(context)?;
        if class == owner {
            return None;
        }

        if depth >= self.max_depth() {
            tracing::debug!(
                target: RESOLVE_TARGET,
                context = %format_type(self.env(), context),
                max_depth = self.max_depth(),
                "ancestor search reached the depth limit"
            );
            return None;
        }
        if !seen.insert(class) {
            return None;
        }
        let def = self.env().class(class)?;

        for candidate in def.supertypes() {
            let found = match candidate {
                Type::Class(ClassRef::Class(id)) if is_subclass(self.env(), *id, owner) => {
                    self.binding_from(var, owner, candidate, depth + 1, seen)
                }
                Type::Parameterized(p) => {
                    let relayed = relay(def, context, p);
                    if relayed.raw == owner {
                        self.frame_arg(var, owner, &relayed)
                    } else if is_subclass(self.env(), relayed.raw, owner) {
                        let next = Type::Parameterized(relayed);
                        self.binding_from(var, owner, &next, depth + 1, seen)
                    } else {
                        None
                    }
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// The argument sitting at `var`'s position in an instantiation of `owner`.
    fn frame_arg(&self, var: TypeVarId, owner: ClassId, frame: &ParameterizedType) -> Option<Type> {
        let position = self
            .env()
            .class(owner)?
            .type_params
            .iter()
            .position(|formal| *formal == var)?;
        frame.args.get(position).cloned()
    }
}

/// Rewrite `candidate`, a supertype declared on `current`, with the arguments `context` gives to
/// `current`'s own type variables.
///
/// Only top-level argument slots are rewritten, matched by declaration position. Nested
/// occurrences are grounded later against the root context.
fn relay(current: &ClassDef, context: &Type, candidate: &ParameterizedType) -> ParameterizedType {
    let Type::Parameterized(actuals) = context else {
        return candidate.clone();
    };
    let args = candidate
        .args
        .iter()
        .map(|arg| {
            let Type::TypeVar(var) = arg else {
                return arg.clone();
            };
            current
                .type_params
                .iter()
                .position(|formal| formal == var)
                .and_then(|position| actuals.args.get(position))
                .cloned()
                .unwrap_or_else(|| arg.clone())
        })
        .collect();
    ParameterizedType {
        raw: candidate.raw,
        args,
    }
}
