use jgeneric_types::{ClassRef, PrimitiveType, Type, TypeEnv, TypeVarId, WildcardType};

use crate::error::SignatureError;

/// Type-variable names visible while parsing a signature.
///
/// Later bindings shadow earlier ones, so a method scope is built by extending the class scope.
#[derive(Debug, Clone, Default)]
pub struct TypeVarScope {
    vars: Vec<(String, TypeVarId)>,
}

impl TypeVarScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: TypeVarId) {
        self.vars.push((name.into(), id));
    }

    pub fn with(mut self, name: impl Into<String>, id: TypeVarId) -> Self {
        self.insert(name, id);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<TypeVarId> {
        self.vars
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, id)| *id)
    }
}

/// Parse a Java source-style type such as `java.util.Map<K, java.util.List<? extends T>>[]`.
///
/// Unqualified names are looked up as type variables in `scope` first, then as classes through
/// [`TypeEnv::lookup_class`]. A bare `?` is given the implicit `Object` upper bound, as a
/// reflective runtime reports it.
pub fn parse_type(
    env: &dyn TypeEnv,
    scope: &TypeVarScope,
    text: &str,
) -> Result<Type, SignatureError> {
    let mut parser = Parser::new(env, scope, text);
    let ty = parser.parse_type()?;
    parser.expect_end()?;
    Ok(ty)
}

/// Split a type parameter declaration (`T extends Number & Comparable<T>`) into its name and the
/// source text of each bound.
pub fn split_type_param_decl(decl: &str) -> Result<(&str, Vec<&str>), SignatureError> {
    let decl = decl.trim();
    let (name, rest) = match decl.find(char::is_whitespace) {
        Some(idx) => (&decl[..idx], decl[idx..].trim_start()),
        None => (decl, ""),
    };
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SignatureError::InvalidTypeParam(decl.to_string()));
    }
    if rest.is_empty() {
        return Ok((name, Vec::new()));
    }
    let Some(bounds) = rest.strip_prefix("extends") else {
        return Err(SignatureError::InvalidTypeParam(decl.to_string()));
    };
    if !bounds.starts_with(char::is_whitespace) {
        return Err(SignatureError::InvalidTypeParam(decl.to_string()));
    }

    // Split on top-level `&` only; nested generics may not contain `&`, but keep depth tracking
    // so `Map<K, V>` commas and brackets are never mistaken for separators.
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in bounds.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '&' if depth == 0 => {
                parts.push(bounds[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(bounds[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return Err(SignatureError::InvalidTypeParam(decl.to_string()));
    }
    Ok((name, parts))
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

struct Parser<'a> {
    env: &'a dyn TypeEnv,
    scope: &'a TypeVarScope,
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(env: &'a dyn TypeEnv, scope: &'a TypeVarScope, text: &'a str) -> Self {
        Self {
            env,
            scope,
            text,
            pos: 0,
        }
    }

    fn parse_type(&mut self) -> Result<Type, SignatureError> {
        let name = self.ident_path()?;
        let base = if let Some(prim) = PrimitiveType::from_keyword(&name) {
            if self.peek() == Some('<') {
                return Err(SignatureError::UnexpectedTypeArguments(name));
            }
            Type::primitive(prim)
        } else if let Some(var) = self.type_var(&name) {
            if self.peek() == Some('<') {
                return Err(SignatureError::UnexpectedTypeArguments(name));
            }
            Type::TypeVar(var)
        } else {
            let class = self
                .env
                .lookup_class(&name)
                .ok_or_else(|| SignatureError::UnknownClass(name.clone()))?;
            if self.eat('<') {
                let args = self.type_args()?;
                Type::parameterized(class, args)
            } else {
                Type::class(class)
            }
        };

        let mut ty = base;
        while self.eat('[') {
            self.expect(']')?;
            ty = match ty {
                Type::Class(class) => Type::Class(class.array_of()),
                other => Type::generic_array(other),
            };
        }
        Ok(ty)
    }

    fn type_var(&self, name: &str) -> Option<TypeVarId> {
        if name.contains('.') {
            return None;
        }
        self.scope.lookup(name)
    }

    fn type_args(&mut self) -> Result<Vec<Type>, SignatureError> {
        let mut args = Vec::new();
        loop {
            args.push(self.type_arg()?);
            if self.eat(',') {
                continue;
            }
            self.expect('>')?;
            return Ok(args);
        }
    }

    fn type_arg(&mut self) -> Result<Type, SignatureError> {
        if !self.eat('?') {
            return self.parse_type();
        }
        if self.eat_keyword("extends") {
            return Ok(Type::Wildcard(WildcardType {
                upper_bounds: self.bounds()?,
                lower_bounds: Vec::new(),
            }));
        }
        if self.eat_keyword("super") {
            return Ok(Type::Wildcard(WildcardType {
                upper_bounds: Vec::new(),
                lower_bounds: self.bounds()?,
            }));
        }
        let object = self.env.well_known().object;
        Ok(Type::Wildcard(WildcardType::extends(Type::Class(
            ClassRef::Class(object),
        ))))
    }

    fn bounds(&mut self) -> Result<Vec<Type>, SignatureError> {
        let mut bounds = vec![self.parse_type()?];
        while self.eat('&') {
            bounds.push(self.parse_type()?);
        }
        Ok(bounds)
    }

    fn ident_path(&mut self) -> Result<String, SignatureError> {
        self.skip_ws();
        let start = self.pos;
        loop {
            let segment_start = self.pos;
            while let Some(ch) = self.peek_raw() {
                if !is_ident_char(ch) {
                    break;
                }
                self.pos += ch.len_utf8();
            }
            if self.pos == segment_start {
                return Err(self.unexpected());
            }
            if self.peek_raw() == Some('.') {
                self.pos += 1;
                continue;
            }
            break;
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let rest = &self.text[self.pos..];
        if !rest.starts_with(keyword) {
            return false;
        }
        let after = rest[keyword.len()..].chars().next();
        if after.is_some_and(is_ident_char) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), SignatureError> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_end(&mut self) -> Result<(), SignatureError> {
        self.skip_ws();
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.peek_raw()
    }

    fn peek_raw(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek_raw() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn unexpected(&self) -> SignatureError {
        match self.peek_raw() {
            Some(found) => SignatureError::Unexpected {
                found,
                offset: self.pos,
                text: self.text.to_string(),
            },
            None => SignatureError::UnexpectedEnd {
                text: self.text.to_string(),
            },
        }
    }
}
