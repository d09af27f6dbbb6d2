// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor model.
//!
//! A [`TypeDescriptor`] captures every SSZ-relevant fact about a type. It is
//! immutable once built and shared through `Arc` across all use sites.

use crate::codec::CustomCodec;
use crate::types::SszKind;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Descriptor flag set.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TypeFlags(u8);

impl TypeFlags {
    /// Encoded length depends on the value.
    pub const IS_DYNAMIC: Self = Self(1 << 0);
    /// Descriptor or a descendant carries a size expression.
    pub const HAS_DYNAMIC_SIZE: Self = Self(1 << 1);
    /// Descriptor or a descendant carries a max expression.
    pub const HAS_DYNAMIC_MAX: Self = Self(1 << 2);
    /// `bit_size` is set.
    pub const HAS_BIT_SIZE: Self = Self(1 << 3);
    /// Vector backed by a fixed-size array; longer sources are truncated.
    pub const ARRAY_SOURCE: Self = Self(1 << 4);
    /// Fixed-size vector backed by a string; zero padding is not content.
    pub const TEXT_SOURCE: Self = Self(1 << 5);

    /// Flags that propagate from children to parents.
    pub const INHERITED: Self = Self(Self::HAS_DYNAMIC_SIZE.0 | Self::HAS_DYNAMIC_MAX.0);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for TypeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::IS_DYNAMIC) {
            names.push("IS_DYNAMIC");
        }
        if self.contains(Self::HAS_DYNAMIC_SIZE) {
            names.push("HAS_DYNAMIC_SIZE");
        }
        if self.contains(Self::HAS_DYNAMIC_MAX) {
            names.push("HAS_DYNAMIC_MAX");
        }
        if self.contains(Self::HAS_BIT_SIZE) {
            names.push("HAS_BIT_SIZE");
        }
        if self.contains(Self::ARRAY_SOURCE) {
            names.push("ARRAY_SOURCE");
        }
        if self.contains(Self::TEXT_SOURCE) {
            names.push("TEXT_SOURCE");
        }
        write!(f, "TypeFlags({})", names.join(" | "))
    }
}

/// Child payload of a descriptor. Exactly one layout per kind.
#[derive(Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Children {
    /// Scalars.
    None,
    /// Vector, list, bitfield, wrapper, uint128/uint256 element.
    Element(Arc<TypeDescriptor>),
    /// Container or progressive container.
    Container(ContainerDescriptor),
    /// Compatible union variants by selector.
    Union(BTreeMap<u8, Arc<TypeDescriptor>>),
    /// Externally encoded type.
    Custom(#[serde(serialize_with = "serialize_codec")] Arc<dyn CustomCodec>),
}

fn serialize_codec<S: Serializer>(codec: &Arc<dyn CustomCodec>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(codec.name())
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Element(e) => f.debug_tuple("Element").field(e).finish(),
            Self::Container(c) => f.debug_tuple("Container").field(c).finish(),
            Self::Union(v) => f.debug_tuple("Union").field(v).finish(),
            Self::Custom(c) => write!(f, "Custom({})", c.name()),
        }
    }
}

/// Field of a container.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub desc: Arc<TypeDescriptor>,
    /// Sparse position for progressive containers.
    pub ssz_index: Option<u16>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            desc,
            ssz_index: None,
        }
    }

    pub fn with_index(mut self, index: u16) -> Self {
        self.ssz_index = Some(index);
        self
    }
}

/// Dynamic field of a container and its offset slot.
#[derive(Debug, Clone, Serialize)]
pub struct DynFieldDescriptor {
    pub field: FieldDescriptor,
    /// Placeholder position within the fixed region (literal sizes).
    pub header_offset: u32,
    /// Declaration index of the field.
    pub index: usize,
}

/// Fields of a container in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerDescriptor {
    pub fields: Vec<FieldDescriptor>,
    pub dyn_fields: Vec<DynFieldDescriptor>,
}

impl ContainerDescriptor {
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Highest sparse index, for progressive containers.
    pub fn max_index(&self) -> Option<u16> {
        self.fields.iter().filter_map(|f| f.ssz_index).max()
    }
}

/// SSZ description of one type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDescriptor {
    pub kind: SszKind,
    pub type_name: String,
    /// Encoded byte length when static, 0 when dynamic.
    pub fixed_size: u32,
    /// Vector length, container fixed-region length, or byte width.
    pub element_count: u32,
    pub children: Children,
    /// Maximum element count for lists/bitlists (bits for bitlists).
    pub limit: Option<u64>,
    /// Bit length for bitvectors/bitlists declared in bits.
    pub bit_size: Option<u32>,
    pub size_expr: Option<String>,
    pub max_expr: Option<String>,
    pub flags: TypeFlags,
}

impl TypeDescriptor {
    pub(crate) fn scalar(kind: SszKind, type_name: impl Into<String>) -> Self {
        let size = kind.scalar_width().unwrap_or(0);
        Self {
            kind,
            type_name: type_name.into(),
            fixed_size: size,
            element_count: 0,
            children: Children::None,
            limit: None,
            bit_size: None,
            size_expr: None,
            max_expr: None,
            flags: TypeFlags::empty(),
        }
    }

    pub fn bool() -> Self {
        Self::scalar(SszKind::Bool, "bool")
    }

    pub fn uint8() -> Self {
        Self::scalar(SszKind::Uint8, "u8")
    }

    pub fn uint16() -> Self {
        Self::scalar(SszKind::Uint16, "u16")
    }

    pub fn uint32() -> Self {
        Self::scalar(SszKind::Uint32, "u32")
    }

    pub fn uint64() -> Self {
        Self::scalar(SszKind::Uint64, "u64")
    }

    /// uint128/uint256 backed by `width / element_size` elements.
    pub(crate) fn wide_uint(
        kind: SszKind,
        type_name: impl Into<String>,
        elem: Arc<TypeDescriptor>,
    ) -> Self {
        let width = kind.scalar_width().unwrap_or(0);
        let count = if elem.fixed_size == 0 {
            0
        } else {
            width / elem.fixed_size
        };
        Self {
            element_count: count,
            children: Children::Element(elem),
            ..Self::scalar(kind, type_name)
        }
    }

    pub fn uint128() -> Self {
        Self::wide_uint(SszKind::Uint128, "u128", Arc::new(Self::uint8()))
    }

    pub fn uint256() -> Self {
        Self::wide_uint(SszKind::Uint256, "U256", Arc::new(Self::uint8()))
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(TypeFlags::IS_DYNAMIC)
    }

    pub fn has_dynamic_size(&self) -> bool {
        self.flags.contains(TypeFlags::HAS_DYNAMIC_SIZE)
    }

    pub fn has_dynamic_max(&self) -> bool {
        self.flags.contains(TypeFlags::HAS_DYNAMIC_MAX)
    }

    pub fn element_desc(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.children {
            Children::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn container(&self) -> Option<&ContainerDescriptor> {
        match &self.children {
            Children::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn union_variants(&self) -> Option<&BTreeMap<u8, Arc<TypeDescriptor>>> {
        match &self.children {
            Children::Union(v) => Some(v),
            _ => None,
        }
    }

    pub fn custom_codec(&self) -> Option<&Arc<dyn CustomCodec>> {
        match &self.children {
            Children::Custom(c) => Some(c),
            _ => None,
        }
    }

    /// Element is a single byte, so the payload is a raw byte run.
    pub fn is_byte_shaped(&self) -> bool {
        matches!(
            self.kind,
            SszKind::Vector
                | SszKind::List
                | SszKind::Bitvector
                | SszKind::Bitlist
                | SszKind::ProgressiveList
                | SszKind::ProgressiveBitlist
                | SszKind::Uint128
                | SszKind::Uint256
        ) && self
            .element_desc()
            .is_some_and(|e| e.kind == SszKind::Uint8)
    }

    /// Canonical JSON form, used for type hashing and debug dumps.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// SHA-256 over the canonical JSON form.
    pub fn type_hash(&self) -> [u8; 32] {
        crate::hash::sha256(self.to_json().as_bytes())
    }

    // Flag bookkeeping shared by the resolver and the builder.

    pub(crate) fn mark_dynamic(&mut self) {
        self.fixed_size = 0;
        self.flags.insert(TypeFlags::IS_DYNAMIC);
    }

    pub(crate) fn inherit(&mut self, child: &TypeDescriptor) {
        self.flags
            .insert(child.flags.intersection(TypeFlags::INHERITED));
    }

    pub(crate) fn set_size_expr(&mut self, expr: Option<String>) {
        if expr.is_some() {
            self.flags.insert(TypeFlags::HAS_DYNAMIC_SIZE);
        }
        self.size_expr = expr;
    }

    pub(crate) fn set_max_expr(&mut self, expr: Option<String>) {
        if expr.is_some() {
            self.flags.insert(TypeFlags::HAS_DYNAMIC_MAX);
        }
        self.max_expr = expr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(TypeDescriptor::bool().fixed_size, 1);
        assert_eq!(TypeDescriptor::uint64().fixed_size, 8);
        assert!(!TypeDescriptor::uint32().is_dynamic());
        assert!(TypeDescriptor::uint16().element_desc().is_none());
    }

    #[test]
    fn test_wide_uint_layout() {
        let desc = TypeDescriptor::uint256();
        assert_eq!(desc.fixed_size, 32);
        assert_eq!(desc.element_count, 32);
        assert!(desc.is_byte_shaped());

        let by_words = TypeDescriptor::wide_uint(
            SszKind::Uint128,
            "[u64; 2]",
            Arc::new(TypeDescriptor::uint64()),
        );
        assert_eq!(by_words.element_count, 2);
        assert!(!by_words.is_byte_shaped());
    }

    #[test]
    fn test_flags() {
        let mut flags = TypeFlags::empty();
        flags.insert(TypeFlags::IS_DYNAMIC);
        flags.insert(TypeFlags::HAS_DYNAMIC_MAX);
        assert!(flags.contains(TypeFlags::IS_DYNAMIC));
        assert!(!flags.contains(TypeFlags::HAS_DYNAMIC_SIZE));
        assert_eq!(
            flags.intersection(TypeFlags::INHERITED),
            TypeFlags::HAS_DYNAMIC_MAX
        );
        assert_eq!(format!("{:?}", flags), "TypeFlags(IS_DYNAMIC | HAS_DYNAMIC_MAX)");
    }

    #[test]
    fn test_type_hash_is_stable() {
        let a = TypeDescriptor::uint64();
        let b = TypeDescriptor::uint64();
        assert_eq!(a.type_hash(), b.type_hash());
        assert_ne!(a.type_hash(), TypeDescriptor::uint32().type_hash());
        assert!(a.to_json().contains("\"kind\":\"uint64\""));
    }
}
