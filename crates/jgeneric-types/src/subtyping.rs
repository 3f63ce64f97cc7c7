use std::collections::{HashSet, VecDeque};

use crate::{ClassId, ClassRef, Type, TypeEnv};

/// The declared class underneath a class-shaped descriptor (`List<String>` -> `List`).
///
/// Arrays, primitives, wildcards and type variables have no single declared class and yield
/// `None`.
pub fn erasure(ty: &Type) -> Option<ClassId> {
    match ty {
        Type::Class(ClassRef::Class(id)) => Some(*id),
        Type::Parameterized(p) => Some(p.raw),
        Type::Class(_) | Type::GenericArray(_) | Type::Wildcard(_) | Type::TypeVar(_) => None,
    }
}

/// Whether `sub` is `sup` or inherits from it through superclasses or interfaces (erased).
///
/// Missing class metadata simply ends that branch of the search; cyclic hierarchies terminate.
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup {
        return true;
    }
    // Every interface has `Object` as a supertype (JLS 4.10.2).
    if sup == env.well_known().object {
        return env.class(sub).is_some();
    }

    let mut queue = VecDeque::from([sub]);
    let mut seen = HashSet::from([sub]);
    while let Some(current) = queue.pop_front() {
        let Some(def) = env.class(current) else {
            continue;
        };
        for supertype in def.supertypes() {
            let Some(next) = erasure(supertype) else {
                continue;
            };
            if next == sup {
                return true;
            }
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
