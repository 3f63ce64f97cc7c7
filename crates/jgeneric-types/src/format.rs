use std::fmt::Write as _;

use crate::{ClassId, ClassRef, Type, TypeEnv};

/// Render `ty` the way it would be spelled in Java source, using binary class names.
///
/// Ids unknown to `env` are rendered as `<class#N>` / `<T#N>` so output stays stable for
/// diagnostics even on a partial model.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, &mut out);
    out
}

pub fn format_class_ref(env: &dyn TypeEnv, class: &ClassRef) -> String {
    let mut out = String::new();
    write_class_ref(env, class, &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, out: &mut String) {
    match ty {
        Type::Class(class) => write_class_ref(env, class, out),
        Type::Parameterized(p) => {
            write_class_name(env, p.raw, out);
            out.push('<');
            for (idx, arg) in p.args.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_type(env, arg, out);
            }
            out.push('>');
        }
        Type::GenericArray(component) => {
            write_type(env, component, out);
            out.push_str("[]");
        }
        Type::Wildcard(w) => {
            out.push('?');
            if !w.upper_bounds.is_empty() {
                out.push_str(" extends ");
                write_bounds(env, &w.upper_bounds, out);
            } else if !w.lower_bounds.is_empty() {
                out.push_str(" super ");
                write_bounds(env, &w.lower_bounds, out);
            }
        }
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(tp) => out.push_str(&tp.name),
            None => {
                let _ = write!(out, "<T#{}>", id.to_raw());
            }
        },
    }
}

fn write_bounds(env: &dyn TypeEnv, bounds: &[Type], out: &mut String) {
    for (idx, bound) in bounds.iter().enumerate() {
        if idx > 0 {
            out.push_str(" & ");
        }
        write_type(env, bound, out);
    }
}

fn write_class_ref(env: &dyn TypeEnv, class: &ClassRef, out: &mut String) {
    match class {
        ClassRef::Class(id) => write_class_name(env, *id, out),
        ClassRef::Primitive(p) => out.push_str(p.keyword()),
        ClassRef::Array(component) => {
            write_class_ref(env, component, out);
            out.push_str("[]");
        }
    }
}

fn write_class_name(env: &dyn TypeEnv, id: ClassId, out: &mut String) {
    match env.class(id) {
        Some(def) => out.push_str(&def.name),
        None => {
            let _ = write!(out, "<class#{}>", id.to_raw());
        }
    }
}
