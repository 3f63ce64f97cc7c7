use std::collections::HashSet;
use std::path::Path;

use jgeneric_types::{
    ClassDef, ClassId, ClassKind, FieldDef, MethodDef, Type, TypeEnv, TypeStore, TypeVarId,
};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, SignatureError};
use crate::parse::{parse_type, split_type_param_decl, TypeVarScope};

/// A serializable description of a set of classes, written with Java source-style signatures.
///
/// ```toml
/// [[class]]
/// name = "com.example.Box"
/// type_params = ["T extends Number"]
/// super_class = "com.example.Base<T, String>"
/// fields = [{ name = "value", type = "T" }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDecl>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Defaults to `java.lang.Object` for classes.
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub params: Vec<String>,
    /// Absent or `"void"` for methods without a return value.
    #[serde(default)]
    pub returns: Option<String>,
}

impl ModelDocument {
    pub fn from_toml(text: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_toml(&text),
        }
    }
}

/// Populates a [`TypeStore`] from a [`ModelDocument`].
///
/// Loading runs in passes: class ids are reserved first, then every type parameter is
/// allocated, and only then are bounds and member signatures parsed. This lets classes refer to
/// each other in any order and lets bounds mention their own variable (`T extends Comparable<T>`).
pub struct ModelLoader<'a> {
    pub store: &'a mut TypeStore,
}

struct PendingClass<'d> {
    id: ClassId,
    decl: &'d ClassDecl,
    type_params: Vec<(String, TypeVarId)>,
    method_type_params: Vec<Vec<(String, TypeVarId)>>,
}

impl<'a> ModelLoader<'a> {
    pub fn new(store: &'a mut TypeStore) -> Self {
        Self { store }
    }

    /// Load every class of `doc`, returning their ids in document order.
    pub fn load(&mut self, doc: &ModelDocument) -> Result<Vec<ClassId>, LoadError> {
        let mut names = HashSet::new();
        for decl in &doc.classes {
            if !names.insert(decl.name.as_str()) {
                return Err(LoadError::DuplicateClass(decl.name.clone()));
            }
        }

        let ids: Vec<ClassId> = doc
            .classes
            .iter()
            .map(|decl| self.store.intern_class_id(&decl.name))
            .collect();

        let mut pending = Vec::with_capacity(doc.classes.len());
        for (decl, id) in doc.classes.iter().zip(&ids) {
            let type_params = self.allocate_type_params(&decl.name, &decl.type_params)?;
            let mut method_type_params = Vec::with_capacity(decl.methods.len());
            for method in &decl.methods {
                let context = format!("{}.{}", decl.name, method.name);
                method_type_params.push(self.allocate_type_params(&context, &method.type_params)?);
            }
            pending.push(PendingClass {
                id: *id,
                decl,
                type_params,
                method_type_params,
            });
        }

        for class in &pending {
            let def = self.build_class_def(class)?;
            self.store.define_class(class.id, def);
        }

        tracing::debug!(
            target: "jgeneric.signature",
            classes = ids.len(),
            "loaded model document"
        );
        Ok(ids)
    }

    fn allocate_type_params(
        &mut self,
        context: &str,
        decls: &[String],
    ) -> Result<Vec<(String, TypeVarId)>, LoadError> {
        decls
            .iter()
            .map(|decl| -> Result<(String, TypeVarId), LoadError> {
                let (name, _) = split_type_param_decl(decl).map_err(|source| {
                    LoadError::Signature {
                        context: format!("type parameter of {context}"),
                        source,
                    }
                })?;
                Ok((name.to_string(), self.store.add_type_param(name, vec![])))
            })
            .collect()
    }

    fn build_class_def(&mut self, class: &PendingClass<'_>) -> Result<ClassDef, LoadError> {
        let decl = class.decl;
        let mut scope = TypeVarScope::new();
        for (name, id) in &class.type_params {
            scope.insert(name.clone(), *id);
        }

        self.define_bounds(&decl.name, &decl.type_params, &class.type_params, &scope)?;

        let kind = match decl.kind {
            DeclKind::Class => ClassKind::Class,
            DeclKind::Interface => ClassKind::Interface,
        };
        let object = self.store.well_known().object;
        let super_class = match (&decl.super_class, kind) {
            (Some(text), _) => Some(self.parse(&scope, text, || {
                format!("superclass of {}", decl.name)
            })?),
            (None, ClassKind::Class) if class.id != object => Some(Type::class(object)),
            (None, _) => None,
        };

        let interfaces = decl
            .interfaces
            .iter()
            .map(|text| self.parse(&scope, text, || format!("interface of {}", decl.name)))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = decl
            .fields
            .iter()
            .map(|field| -> Result<FieldDef, LoadError> {
                let ty = self.parse(&scope, &field.ty, || {
                    format!("field {}.{}", decl.name, field.name)
                })?;
                Ok(FieldDef {
                    name: field.name.clone(),
                    ty,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut methods = Vec::with_capacity(decl.methods.len());
        for (method, method_vars) in decl.methods.iter().zip(&class.method_type_params) {
            let context = || format!("method {}.{}", decl.name, method.name);
            let mut method_scope = scope.clone();
            for (name, id) in method_vars {
                method_scope.insert(name.clone(), *id);
            }
            self.define_bounds(
                &context(),
                &method.type_params,
                method_vars,
                &method_scope,
            )?;

            let params = method
                .params
                .iter()
                .map(|text| self.parse(&method_scope, text, context))
                .collect::<Result<Vec<_>, _>>()?;
            let return_type = match method.returns.as_deref().map(str::trim) {
                None | Some("void") => None,
                Some(text) => Some(self.parse(&method_scope, text, context)?),
            };
            methods.push(MethodDef {
                name: method.name.clone(),
                type_params: method_vars.iter().map(|(_, id)| *id).collect(),
                params,
                return_type,
            });
        }

        Ok(ClassDef {
            name: decl.name.clone(),
            kind,
            type_params: class.type_params.iter().map(|(_, id)| *id).collect(),
            super_class,
            interfaces,
            fields,
            methods,
        })
    }

    fn define_bounds(
        &mut self,
        context: &str,
        decls: &[String],
        vars: &[(String, TypeVarId)],
        scope: &TypeVarScope,
    ) -> Result<(), LoadError> {
        for (decl, (_, id)) in decls.iter().zip(vars) {
            let (_, bound_texts) =
                split_type_param_decl(decl).map_err(|source| LoadError::Signature {
                    context: format!("type parameter of {context}"),
                    source,
                })?;
            let bounds = bound_texts
                .iter()
                .map(|text| self.parse(scope, text, || format!("bound of {context}")))
                .collect::<Result<Vec<_>, _>>()?;
            self.store.set_type_param_bounds(*id, bounds);
        }
        Ok(())
    }

    fn parse(
        &self,
        scope: &TypeVarScope,
        text: &str,
        context: impl FnOnce() -> String,
    ) -> Result<Type, LoadError> {
        parse_type(&*self.store, scope, text).map_err(|source: SignatureError| {
            LoadError::Signature {
                context: context(),
                source,
            }
        })
    }
}

/// Parse `text` as a TOML [`ModelDocument`] and load it into `store`.
pub fn load_toml(store: &mut TypeStore, text: &str) -> Result<Vec<ClassId>, LoadError> {
    let doc = ModelDocument::from_toml(text)?;
    ModelLoader::new(store).load(&doc)
}

/// Parse `text` as a JSON [`ModelDocument`] and load it into `store`.
pub fn load_json(store: &mut TypeStore, text: &str) -> Result<Vec<ClassId>, LoadError> {
    let doc = ModelDocument::from_json(text)?;
    ModelLoader::new(store).load(&doc)
}
