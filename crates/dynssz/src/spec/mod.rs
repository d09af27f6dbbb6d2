// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic spec resolution.
//!
//! Descriptors may carry named size/limit expressions instead of literals.
//! A [`SpecResolver`] turns such a name into a number when a value is
//! encoded, decoded or hashed, so one type description serves every preset.
//!
//! # Example
//!
//! ```rust
//! use dynssz::spec::{SpecResolver, SpecValues};
//!
//! let specs = SpecValues::new()
//!     .with("MAX_VALIDATORS_PER_COMMITTEE", 2048)
//!     .with("SLOTS_PER_EPOCH", 32);
//!
//! assert_eq!(specs.resolve("SLOTS_PER_EPOCH*2").unwrap(), Some(64));
//! assert_eq!(specs.resolve("UNKNOWN").unwrap(), None);
//! ```

mod cached;
mod expr;
mod values;

pub use cached::CachedResolver;
pub use expr::Expr;
pub use values::SpecValues;

use crate::error::SpecError;
use std::sync::Arc;

/// Resolves a named expression to a concrete bound.
///
/// `Ok(None)` means "no value": the descriptor's literal default applies.
pub trait SpecResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Option<u64>, SpecError>;
}

/// Resolver that knows no names; literal defaults always apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpecs;

impl SpecResolver for NoSpecs {
    fn resolve(&self, _name: &str) -> Result<Option<u64>, SpecError> {
        Ok(None)
    }
}

impl<R: SpecResolver + ?Sized> SpecResolver for Arc<R> {
    fn resolve(&self, name: &str) -> Result<Option<u64>, SpecError> {
        (**self).resolve(name)
    }
}

impl<R: SpecResolver + ?Sized> SpecResolver for Box<R> {
    fn resolve(&self, name: &str) -> Result<Option<u64>, SpecError> {
        (**self).resolve(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_specs() {
        assert_eq!(NoSpecs.resolve("SLOTS_PER_EPOCH").unwrap(), None);
        let shared: Arc<dyn SpecResolver> = Arc::new(NoSpecs);
        assert_eq!(shared.resolve("anything").unwrap(), None);
    }
}
