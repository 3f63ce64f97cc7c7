use std::collections::VecDeque;
use std::fmt;

use jgeneric_types::{format_class_ref, format_type, ClassRef, Type, TypeEnv};
use serde::Serialize;

/// One slot of a [`ResolvedType`]: a concrete class, or a nested resolution for anything that
/// still needed grounding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ElementType {
    Class(ClassRef),
    Resolved(ResolvedType),
}

impl ElementType {
    pub fn as_resolved(&self) -> Option<&ResolvedType> {
        match self {
            ElementType::Resolved(nested) => Some(nested),
            ElementType::Class(_) => None,
        }
    }
}

/// The grounded form of a declared type, seen from a particular context.
///
/// The shape encodes what was found:
///
/// * concrete scalar: `raw` is the concrete [`Type::Class`], no elements, no container;
/// * grounded scalar: `raw` is the declared variable or wildcard, the class it grounded to is
///   the only element, no container;
/// * array: `container` is the array class, `elements` holds the component (or the grounded
///   type arguments when the component is parameterized);
/// * parameterized: `container` is the raw class, `elements` one entry per type argument;
/// * intersection of several bounds: no container, one element per bound;
/// * unresolved: `raw` is the descriptor it came from, nothing else.
///
/// `raw` is always the declared descriptor the node was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedType {
    raw: Type,
    elements: Vec<ElementType>,
    container: Option<ClassRef>,
}

impl ResolvedType {
    pub(crate) fn new(raw: Type, elements: Vec<ElementType>, container: Option<ClassRef>) -> Self {
        Self {
            raw,
            elements,
            container,
        }
    }

    pub(crate) fn unresolved(raw: Type) -> Self {
        Self::new(raw, Vec::new(), None)
    }

    /// The descriptor this result stands for.
    pub fn raw_type(&self) -> &Type {
        &self.raw
    }

    pub fn element_types(&self) -> &[ElementType] {
        &self.elements
    }

    pub fn container_type(&self) -> Option<&ClassRef> {
        self.container.as_ref()
    }

    /// The class of the first element.
    ///
    /// A nested first element contributes its container, one level deep only: `String[]` and
    /// `List<String>` yield `String`, `List<List<String>>` yields `List`.
    pub fn element_class(&self) -> Option<&ClassRef> {
        match self.elements.first()? {
            ElementType::Class(class) => Some(class),
            ElementType::Resolved(nested) => nested.container_type(),
        }
    }

    /// Whether nothing at all could be grounded.
    pub fn is_unresolved(&self) -> bool {
        self.elements.is_empty()
            && self.container.is_none()
            && !matches!(self.raw, Type::Class(_))
    }

    /// The concrete class this result denotes, when it is exactly one scalar class: either a
    /// declared concrete type or a variable grounded to one.
    pub fn concrete_class(&self) -> Option<&ClassRef> {
        if let Type::Class(class) = &self.raw {
            return Some(class);
        }
        self.grounded_class()
    }

    /// The class a variable, wildcard or bound grounded to at a scalar position.
    pub(crate) fn grounded_class(&self) -> Option<&ClassRef> {
        match (self.container.as_ref(), self.elements.as_slice()) {
            (None, [ElementType::Class(class)]) => Some(class),
            _ => None,
        }
    }

    /// This node and every nested resolution below it, breadth first.
    pub fn nested(&self) -> Nested<'_> {
        Nested {
            queue: VecDeque::from([self]),
        }
    }

    /// Whether no node in the tree is unresolved.
    pub fn is_fully_resolved(&self) -> bool {
        self.nested().all(|node| !node.is_unresolved())
    }

    /// Java-like rendering of the grounded type, e.g. `java.util.List<java.lang.String>[]`.
    pub fn display<'a>(&'a self, env: &'a dyn TypeEnv) -> DisplayResolved<'a> {
        DisplayResolved { env, resolved: self }
    }

    fn write(&self, env: &dyn TypeEnv, out: &mut String) {
        if self.is_unresolved() {
            out.push_str("<unresolved ");
            out.push_str(&format_type(env, &self.raw));
            out.push('>');
            return;
        }

        let Some(container) = &self.container else {
            if self.elements.is_empty() {
                out.push_str(&format_type(env, &self.raw));
                return;
            }
            write_elements(env, &self.elements, " & ", out);
            return;
        };

        // `String[]` carries its component as the only element.
        if let [ElementType::Class(component)] = self.elements.as_slice() {
            if container.component() == Some(component) {
                out.push_str(&format_class_ref(env, container));
                return;
            }
        }

        let mut dims = 0;
        let mut base = container;
        while let Some(component) = base.component() {
            dims += 1;
            base = component;
        }
        out.push_str(&format_class_ref(env, base));
        if !self.elements.is_empty() {
            out.push('<');
            write_elements(env, &self.elements, ", ", out);
            out.push('>');
        }
        for _ in 0..dims {
            out.push_str("[]");
        }
    }
}

fn write_elements(env: &dyn TypeEnv, elements: &[ElementType], sep: &str, out: &mut String) {
    for (idx, element) in elements.iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        match element {
            ElementType::Class(class) => out.push_str(&format_class_ref(env, class)),
            ElementType::Resolved(nested) => nested.write(env, out),
        }
    }
}

pub struct Nested<'a> {
    queue: VecDeque<&'a ResolvedType>,
}

impl<'a> Iterator for Nested<'a> {
    type Item = &'a ResolvedType;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue
            .extend(node.elements.iter().filter_map(ElementType::as_resolved));
        Some(node)
    }
}

pub struct DisplayResolved<'a> {
    env: &'a dyn TypeEnv,
    resolved: &'a ResolvedType,
}

impl fmt::Display for DisplayResolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.resolved.write(self.env, &mut out);
        f.write_str(&out)
    }
}
