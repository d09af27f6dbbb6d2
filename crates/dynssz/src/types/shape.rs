// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Abstract description of a source type, consumed by the resolver.

use crate::codec::CustomCodec;
use crate::reflect::SszType;
use crate::types::RawHints;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Handle to a source type: identity plus lazily produced shape.
///
/// Children are referenced through handles so shapes stay shallow and
/// nested types can be served from the descriptor cache.
#[derive(Clone, Copy)]
pub struct ShapeRef {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    shape: fn() -> SourceShape,
    custom_codec: fn() -> Option<Arc<dyn CustomCodec>>,
}

impl ShapeRef {
    pub fn of<T: SszType>() -> Self {
        Self {
            type_id: TypeId::of::<T>,
            type_name: std::any::type_name::<T>,
            shape: T::shape,
            custom_codec: T::custom_codec,
        }
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    pub fn shape(&self) -> SourceShape {
        (self.shape)()
    }

    pub fn custom_codec(&self) -> Option<Arc<dyn CustomCodec>> {
        (self.custom_codec)()
    }

    pub fn same_type(&self, other: &ShapeRef) -> bool {
        self.type_id() == other.type_id()
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeRef({})", self.type_name())
    }
}

/// Unsigned integer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
}

/// Named types that override shape-based inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnown {
    /// Wall-clock time, encoded as uint64 Unix seconds.
    Timestamp,
    /// 128-bit unsigned integer.
    Uint128,
    /// 256-bit unsigned integer.
    Uint256,
    /// Byte-backed bitlist.
    Bitlist,
}

/// Shape of a source type as seen by the resolver.
#[derive(Debug, Clone)]
pub enum SourceShape {
    Bool,
    Uint(UintWidth),
    /// Fixed-length aggregate.
    Array { elem: ShapeRef, len: usize },
    /// Variable-length aggregate.
    Seq { elem: ShapeRef },
    /// UTF-8 text, handled as a byte sequence.
    Text,
    /// Record with named fields.
    Struct(StructShape),
    /// Sum type whose variants each hold one value.
    Enum(EnumShape),
    /// Transparent wrapper: descriptor struct plus wrapped type.
    Wrapper { descriptor: ShapeRef, wrapped: ShapeRef },
    WellKnown(WellKnown),
    /// No structural information; usable only as a custom type.
    Opaque,
}

impl SourceShape {
    /// Short label for error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint(UintWidth::U8) => "u8",
            Self::Uint(UintWidth::U16) => "u16",
            Self::Uint(UintWidth::U32) => "u32",
            Self::Uint(UintWidth::U64) => "u64",
            Self::Array { .. } => "array",
            Self::Seq { .. } => "sequence",
            Self::Text => "string",
            Self::Struct(_) => "struct",
            Self::Enum(_) => "enum",
            Self::Wrapper { .. } => "wrapper",
            Self::WellKnown(WellKnown::Timestamp) => "timestamp",
            Self::WellKnown(WellKnown::Uint128) => "u128",
            Self::WellKnown(WellKnown::Uint256) => "U256",
            Self::WellKnown(WellKnown::Bitlist) => "BitList",
            Self::Opaque => "opaque",
        }
    }
}

/// Named field or union variant with its annotations.
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: &'static str,
    pub ty: ShapeRef,
    pub hints: RawHints,
}

impl FieldShape {
    pub fn new(name: &'static str, ty: ShapeRef, hints: RawHints) -> Self {
        Self { name, ty, hints }
    }
}

#[derive(Debug, Clone)]
pub struct StructShape {
    pub name: &'static str,
    pub fields: Vec<FieldShape>,
}

#[derive(Debug, Clone)]
pub struct EnumShape {
    pub name: &'static str,
    pub variants: Vec<FieldShape>,
}
