// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Annotated transparent wrapper.

use super::SszType;
use crate::error::DecodeError;
use crate::types::{ShapeRef, SourceShape};
use crate::value::SszValue;
use std::fmt;
use std::marker::PhantomData;

/// Attaches SSZ annotations to a bare value.
///
/// `D` is a descriptor struct with exactly one field of type `T`; that
/// field's `#[ssz(...)]` attributes describe the wrapped value. The wrapper
/// itself is invisible on the wire and in the hash tree.
///
/// ```ignore
/// #[derive(Ssz)]
/// struct RootsDescriptor {
///     #[ssz(size = "?,32", max = "64")]
///     data: Vec<Vec<u8>>,
/// }
///
/// type Roots = TypeWrapper<RootsDescriptor, Vec<Vec<u8>>>;
/// ```
pub struct TypeWrapper<D, T> {
    pub data: T,
    descriptor: PhantomData<fn() -> D>,
}

impl<D, T> TypeWrapper<D, T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            descriptor: PhantomData,
        }
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<D, T: Clone> Clone for TypeWrapper<D, T> {
    fn clone(&self) -> Self {
        Self::new(self.data.clone())
    }
}

impl<D, T: Default> Default for TypeWrapper<D, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<D, T: PartialEq> PartialEq for TypeWrapper<D, T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<D, T: Eq> Eq for TypeWrapper<D, T> {}

impl<D, T: fmt::Debug> fmt::Debug for TypeWrapper<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeWrapper").field(&self.data).finish()
    }
}

impl<D: SszType, T: SszType> SszType for TypeWrapper<D, T> {
    fn shape() -> SourceShape {
        SourceShape::Wrapper {
            descriptor: ShapeRef::of::<D>(),
            wrapped: ShapeRef::of::<T>(),
        }
    }

    fn to_ssz_value(&self) -> SszValue {
        self.data.to_ssz_value()
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        T::from_ssz_value(value).map(Self::new)
    }
}
