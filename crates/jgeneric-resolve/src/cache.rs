use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use jgeneric_config::CacheConfig;
use jgeneric_types::{ClassId, Type};
use parking_lot::Mutex;

use crate::error::Result;
use crate::resolved::ResolvedType;
use crate::resolver::TypeResolver;
use crate::RESOLVE_TARGET;

type CacheKey = (Type, ClassId, Type);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes [`TypeResolver::resolve`] on `(declared type, owner, context)`.
///
/// Resolution is a pure function of the environment, so cached results stay valid as long as the
/// environment is not mutated. Errors are never cached. When the cache is disabled in
/// [`CacheConfig`] every call goes straight to the resolver.
pub struct CachingResolver<'env> {
    resolver: TypeResolver<'env>,
    enabled: bool,
    capacity: usize,
    entries: Mutex<HashMap<CacheKey, ResolvedType>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<'env> CachingResolver<'env> {
    pub fn new(resolver: TypeResolver<'env>, config: &CacheConfig) -> Self {
        Self {
            resolver,
            enabled: config.enabled,
            capacity: config.capacity.max(1),
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn resolver(&self) -> &TypeResolver<'env> {
        &self.resolver
    }

    pub fn resolve(
        &self,
        declared: &Type,
        owner: ClassId,
        context: Option<&Type>,
    ) -> Result<ResolvedType> {
        if !self.enabled {
            return self.resolver.resolve(declared, owner, context);
        }

        let context_key = context.cloned().unwrap_or_else(|| Type::class(owner));
        let key = (declared.clone(), owner, context_key);
        if let Some(hit) = self.entries.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let resolved = self.resolver.resolve(declared, owner, context)?;

        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            tracing::debug!(
                target: RESOLVE_TARGET,
                capacity = self.capacity,
                "resolution cache full; clearing"
            );
            entries.clear();
        }
        entries.insert(key, resolved.clone());
        Ok(resolved)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
