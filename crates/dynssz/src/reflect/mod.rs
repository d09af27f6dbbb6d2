// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust type reflection.
//!
//! [`SszType`] is the bridge between a Rust type and the dynamic layer: it
//! exposes the type's [`SourceShape`] to the resolver and converts values
//! to and from [`SszValue`]. Structs and enums get it from
//! `#[derive(Ssz)]`; the builtin impls below cover primitives and
//! collections.
//!
//! Signed integers, floats and maps have no SSZ form and deliberately have
//! no impl, so using them in a derived type fails at compile time.

mod bitfield;
mod uint;
mod wrapper;

pub use bitfield::BitList;
pub use uint::U256;
pub use wrapper::TypeWrapper;

use crate::codec::CustomCodec;
use crate::error::DecodeError;
use crate::types::{ShapeRef, SourceShape, UintWidth, WellKnown};
use crate::value::SszValue;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A Rust type with an SSZ representation.
pub trait SszType: Sized + 'static {
    /// Structural shape used to derive the type descriptor.
    fn shape() -> SourceShape;

    fn to_ssz_value(&self) -> SszValue;

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError>;

    /// External codec; `Some` makes the type resolve as a custom kind.
    fn custom_codec() -> Option<Arc<dyn CustomCodec>> {
        None
    }

    /// Single-byte type; sequences of it travel as raw bytes.
    #[doc(hidden)]
    const IS_BYTE: bool = false;

    #[doc(hidden)]
    fn to_byte(&self) -> Option<u8> {
        None
    }
}

pub(crate) fn mismatch(expected: &'static str, found: &SszValue) -> DecodeError {
    DecodeError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

impl SszType for bool {
    fn shape() -> SourceShape {
        SourceShape::Bool
    }

    fn to_ssz_value(&self) -> SszValue {
        SszValue::Bool(*self)
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

macro_rules! impl_uint {
    ($ty:ty, $width:ident, $variant:ident, $name:literal) => {
        impl SszType for $ty {
            fn shape() -> SourceShape {
                SourceShape::Uint(UintWidth::$width)
            }

            fn to_ssz_value(&self) -> SszValue {
                SszValue::$variant(*self)
            }

            fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
                match value {
                    SszValue::$variant(v) => Ok(v),
                    other => Err(mismatch($name, &other)),
                }
            }
        }
    };
}

impl_uint!(u16, U16, Uint16, "uint16");
impl_uint!(u32, U32, Uint32, "uint32");
impl_uint!(u64, U64, Uint64, "uint64");

impl SszType for u8 {
    const IS_BYTE: bool = true;

    fn shape() -> SourceShape {
        SourceShape::Uint(UintWidth::U8)
    }

    fn to_ssz_value(&self) -> SszValue {
        SszValue::Uint8(*self)
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        value.as_u8().ok_or_else(|| mismatch("uint8", &value))
    }

    fn to_byte(&self) -> Option<u8> {
        Some(*self)
    }
}

impl SszType for u128 {
    fn shape() -> SourceShape {
        SourceShape::WellKnown(WellKnown::Uint128)
    }

    fn to_ssz_value(&self) -> SszValue {
        SszValue::Bytes(self.to_le_bytes().to_vec())
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        let bytes = wide_bytes(&value, 16).ok_or_else(|| mismatch("uint128", &value))?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(&bytes);
        Ok(u128::from_le_bytes(raw))
    }
}

/// Little-endian bytes of a wide uint value given as bytes or u64 words.
pub(crate) fn wide_bytes(value: &SszValue, width: usize) -> Option<Vec<u8>> {
    let bytes = match value {
        SszValue::List(words) if words.iter().all(|w| w.as_u64().is_some()) => words
            .iter()
            .filter_map(SszValue::as_u64)
            .flat_map(u64::to_le_bytes)
            .collect(),
        other => other.as_bytes()?.into_owned(),
    };
    (bytes.len() == width).then_some(bytes)
}

impl SszType for SystemTime {
    fn shape() -> SourceShape {
        SourceShape::WellKnown(WellKnown::Timestamp)
    }

    /// Unix seconds; times before the epoch encode as 0.
    fn to_ssz_value(&self) -> SszValue {
        let secs = self
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        SszValue::Uint64(secs)
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        let secs = value.as_u64().ok_or_else(|| mismatch("uint64", &value))?;
        UNIX_EPOCH
            .checked_add(Duration::from_secs(secs))
            .ok_or_else(|| DecodeError::InvalidData(format!("timestamp {} out of range", secs)))
    }
}

impl SszType for String {
    fn shape() -> SourceShape {
        SourceShape::Text
    }

    fn to_ssz_value(&self) -> SszValue {
        SszValue::Bytes(self.as_bytes().to_vec())
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        let bytes = match value {
            SszValue::Bytes(bytes) => bytes,
            other => other
                .as_bytes()
                .map(|b| b.into_owned())
                .ok_or_else(|| mismatch("bytes", &other))?,
        };
        String::from_utf8(bytes)
            .map_err(|e| DecodeError::InvalidData(format!("string is not valid utf-8: {}", e)))
    }
}

impl<T: SszType> SszType for Box<T> {
    fn shape() -> SourceShape {
        T::shape()
    }

    fn to_ssz_value(&self) -> SszValue {
        (**self).to_ssz_value()
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        T::from_ssz_value(value).map(Box::new)
    }

    fn custom_codec() -> Option<Arc<dyn CustomCodec>> {
        T::custom_codec()
    }
}

fn seq_to_value<T: SszType>(items: &[T]) -> SszValue {
    if T::IS_BYTE {
        SszValue::Bytes(items.iter().filter_map(T::to_byte).collect())
    } else {
        SszValue::List(items.iter().map(T::to_ssz_value).collect())
    }
}

fn seq_from_value<T: SszType>(value: SszValue) -> Result<Vec<T>, DecodeError> {
    match value {
        SszValue::Bytes(bytes) if T::IS_BYTE => bytes
            .into_iter()
            .map(|b| T::from_ssz_value(SszValue::Uint8(b)))
            .collect(),
        SszValue::List(items) => items.into_iter().map(T::from_ssz_value).collect(),
        other => Err(mismatch("list", &other)),
    }
}

impl<T: SszType> SszType for Vec<T> {
    fn shape() -> SourceShape {
        SourceShape::Seq {
            elem: ShapeRef::of::<T>(),
        }
    }

    fn to_ssz_value(&self) -> SszValue {
        seq_to_value(self)
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        seq_from_value(value)
    }
}

impl<T: SszType + Default, const N: usize> SszType for [T; N] {
    fn shape() -> SourceShape {
        SourceShape::Array {
            elem: ShapeRef::of::<T>(),
            len: N,
        }
    }

    fn to_ssz_value(&self) -> SszValue {
        seq_to_value(self)
    }

    /// Shorter sources (size-hinted arrays) are padded with defaults.
    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        let items: Vec<T> = seq_from_value(value)?;
        if items.len() > N {
            return Err(DecodeError::InvalidData(format!(
                "{} elements do not fit into an array of {}",
                items.len(),
                N
            )));
        }
        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item;
        }
        Ok(out)
    }
}
