use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::reference::CompiledDictionary;
use crate::resolver::TFunction;

/// Memoizes a translator by key.
///
/// The cache only grows; it is meant to live as long as one view or request
/// and hold the fixed set of keys that scope uses. Concurrent misses on the
/// same key may both call the inner translator, and the first stored value
/// wins.
pub struct Dedup<T> {
    inner: T,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl<T: TFunction> Dedup<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached translation of `key`; repeated calls return the same `Arc`.
    pub fn get(&self, key: &str) -> Arc<str> {
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(hit);
        }

        let value: Arc<str> = self.inner.t(key).into();
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(key.to_string()).or_insert(value))
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: TFunction> TFunction for Dedup<T> {
    /// Overrides change what a key resolves to, so they bypass the cache.
    fn translate_with(
        &self,
        key: &str,
        dictionary: Option<&CompiledDictionary>,
        locale: Option<&str>,
    ) -> String {
        if dictionary.is_none() && locale.is_none() {
            self.get(key).to_string()
        } else {
            self.inner.translate_with(key, dictionary, locale)
        }
    }
}
