// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic SSZ values.

use crate::types::{Children, SszKind, TypeDescriptor};
use std::borrow::Cow;

/// A value walked by the codecs against a [`TypeDescriptor`].
///
/// Byte-shaped kinds (byte vectors/lists, bitfields, byte-backed uint128 and
/// uint256) use [`SszValue::Bytes`]; a `List` of `Uint8` is accepted too.
/// Bitfields hold their SSZ byte form: bitlists include the length marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SszValue {
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Bytes(Vec<u8>),
    /// Vector or list elements.
    List(Vec<SszValue>),
    /// Container fields in declaration order.
    Container(Vec<SszValue>),
    /// Union selector and selected variant.
    Union(u8, Box<SszValue>),
}

impl SszValue {
    /// Variant name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Uint8(_) => "uint8",
            Self::Uint16(_) => "uint16",
            Self::Uint32(_) => "uint32",
            Self::Uint64(_) => "uint64",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Container(_) => "container",
            Self::Union(..) => "union",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u8.
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::Uint8(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u16.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::Uint16(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    /// Byte run of a byte-shaped value (`Bytes` or a `List` of `Uint8`).
    pub fn as_bytes(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(b) => Some(Cow::Borrowed(b)),
            Self::List(items) => items
                .iter()
                .map(SszValue::as_u8)
                .collect::<Option<Vec<u8>>>()
                .map(Cow::Owned),
            _ => None,
        }
    }

    /// Try to get list elements.
    pub fn as_list(&self) -> Option<&[SszValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get container fields.
    pub fn as_container(&self) -> Option<&[SszValue]> {
        match self {
            Self::Container(fields) => Some(fields),
            _ => None,
        }
    }

    /// Try to get union selector and variant value.
    pub fn as_union(&self) -> Option<(u8, &SszValue)> {
        match self {
            Self::Union(sel, v) => Some((*sel, v)),
            _ => None,
        }
    }

    /// Zero value of `desc`.
    pub fn zero(desc: &TypeDescriptor) -> SszValue {
        match desc.kind {
            SszKind::Bool => Self::Bool(false),
            SszKind::Uint8 => Self::Uint8(0),
            SszKind::Uint16 => Self::Uint16(0),
            SszKind::Uint32 => Self::Uint32(0),
            SszKind::Uint64 => Self::Uint64(0),
            SszKind::Bitlist | SszKind::ProgressiveBitlist => Self::Bytes(vec![0x01]),
            SszKind::List | SszKind::ProgressiveList if desc.is_byte_shaped() => {
                Self::Bytes(Vec::new())
            }
            SszKind::List | SszKind::ProgressiveList => Self::List(Vec::new()),
            SszKind::Uint128 | SszKind::Uint256 | SszKind::Vector | SszKind::Bitvector => {
                let count = desc.element_count as usize;
                match desc.element_desc() {
                    Some(elem) if elem.kind == SszKind::Uint8 => Self::Bytes(vec![0; count]),
                    Some(elem) => Self::List(vec![Self::zero(elem); count]),
                    None => Self::Bytes(vec![0; count]),
                }
            }
            SszKind::Container | SszKind::ProgressiveContainer => Self::Container(
                desc.container()
                    .map(|c| c.fields.iter().map(|f| Self::zero(&f.desc)).collect())
                    .unwrap_or_default(),
            ),
            SszKind::CompatibleUnion => match desc.union_variants().and_then(|v| v.iter().next()) {
                Some((sel, variant)) => Self::Union(*sel, Box::new(Self::zero(variant))),
                None => Self::Union(0, Box::new(Self::Bytes(Vec::new()))),
            },
            SszKind::TypeWrapper => match &desc.children {
                Children::Element(inner) => Self::zero(inner),
                _ => Self::Bytes(Vec::new()),
            },
            SszKind::Custom => match desc.custom_codec() {
                Some(codec) => codec.zero_value(),
                None => Self::Bytes(vec![0; desc.fixed_size as usize]),
            },
        }
    }
}

impl From<bool> for SszValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for SszValue {
    fn from(v: u8) -> Self {
        Self::Uint8(v)
    }
}

impl From<u16> for SszValue {
    fn from(v: u16) -> Self {
        Self::Uint16(v)
    }
}

impl From<u32> for SszValue {
    fn from(v: u32) -> Self {
        Self::Uint32(v)
    }
}

impl From<u64> for SszValue {
    fn from(v: u64) -> Self {
        Self::Uint64(v)
    }
}

impl From<Vec<u8>> for SszValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for SszValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<SszValue>> for SszValue {
    fn from(v: Vec<SszValue>) -> Self {
        Self::List(v)
    }
}
