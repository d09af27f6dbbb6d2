// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memoising resolver wrapper.

use crate::error::SpecError;
use crate::spec::SpecResolver;
use dashmap::DashMap;

/// Caches every successful resolution of the wrapped resolver.
///
/// Failures are not cached. Suitable for resolvers that are pure but slow.
#[derive(Debug)]
pub struct CachedResolver<R> {
    inner: R,
    cache: DashMap<String, Option<u64>>,
}

impl<R: SpecResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of memoised names.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<R: SpecResolver> SpecResolver for CachedResolver<R> {
    fn resolve(&self, name: &str) -> Result<Option<u64>, SpecError> {
        if let Some(hit) = self.cache.get(name) {
            return Ok(*hit);
        }
        let value = self.inner.resolve(name)?;
        self.cache.insert(name.to_string(), value);
        Ok(value)
    }
}
