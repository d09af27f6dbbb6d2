// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type resolver and descriptor cache.
//!
//! Turns a [`ShapeRef`] plus positional [`Hints`] into a [`TypeDescriptor`]
//! tree. Hint-free lookups are memoised by type identity; hinted lookups
//! always build a fresh descriptor because the same type can carry different
//! annotations at different use sites.

use crate::error::TypeError;
use crate::reflect::SszType;
use crate::types::{
    Children, ContainerDescriptor, DynFieldDescriptor, FieldDescriptor, Hints, ShapeRef,
    SourceShape, SszKind, TypeDescriptor, TypeFlags, UintWidth, WellKnown,
};
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::thread::{self, ThreadId};

struct CacheEntry {
    type_name: &'static str,
    desc: Arc<TypeDescriptor>,
}

/// Resolves source types into shared descriptors.
#[derive(Default)]
pub struct TypeCache {
    entries: RwLock<HashMap<TypeId, CacheEntry>>,
    /// Types being built, per resolving thread.
    building: Mutex<HashSet<(ThreadId, TypeId)>>,
}

/// Marks a type as under construction until dropped.
struct BuildGuard<'a> {
    building: &'a Mutex<HashSet<(ThreadId, TypeId)>>,
    key: (ThreadId, TypeId),
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.building.lock().remove(&self.key);
    }
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `T` without hints (cached).
    pub fn descriptor_of<T: SszType>(&self) -> Result<Arc<TypeDescriptor>, TypeError> {
        self.resolve(&ShapeRef::of::<T>(), &Hints::none())
    }

    /// Resolve a source type with the given hints.
    pub fn resolve(
        &self,
        source: &ShapeRef,
        hints: &Hints,
    ) -> Result<Arc<TypeDescriptor>, TypeError> {
        let cacheable = hints.is_empty();
        if cacheable {
            if let Some(entry) = self.entries.read().get(&source.type_id()) {
                return Ok(entry.desc.clone());
            }
        }

        let key = (thread::current().id(), source.type_id());
        if !self.building.lock().insert(key) {
            return Err(TypeError::Recursive(source.type_name().to_string()));
        }
        let guard = BuildGuard {
            building: &self.building,
            key,
        };
        let built = self.build(source, hints);
        drop(guard);

        let desc = Arc::new(built?);
        log::debug!(
            "[resolver] built {} descriptor for {} (size {}, dynamic {})",
            desc.kind,
            source.type_name(),
            desc.fixed_size,
            desc.is_dynamic()
        );

        if cacheable {
            let mut entries = self.entries.write();
            let entry = entries.entry(source.type_id()).or_insert(CacheEntry {
                type_name: source.type_name(),
                desc,
            });
            return Ok(entry.desc.clone());
        }
        Ok(desc)
    }

    /// Names of all cached types.
    pub fn cached_types(&self) -> Vec<&'static str> {
        self.entries.read().values().map(|e| e.type_name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop the cached descriptor of `T`.
    pub fn remove<T: SszType>(&self) {
        self.entries.write().remove(&TypeId::of::<T>());
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn build(&self, source: &ShapeRef, hints: &Hints) -> Result<TypeDescriptor, TypeError> {
        let shape = source.shape();
        let kind = match hints.kind() {
            Some(kind) => kind,
            None => infer_kind(source, &shape, hints)?,
        };

        let mut desc = match kind {
            SszKind::Bool
            | SszKind::Uint8
            | SszKind::Uint16
            | SszKind::Uint32
            | SszKind::Uint64 => build_scalar(kind, source, &shape, hints)?,
            SszKind::Uint128 | SszKind::Uint256 => {
                self.build_wide_uint(kind, source, &shape, hints)?
            }
            SszKind::TypeWrapper => self.build_wrapper(source, &shape)?,
            SszKind::Container | SszKind::ProgressiveContainer => {
                let fields = self.resolve_fields(&shape, kind)?;
                assemble_container(kind, source.type_name(), fields)?
            }
            SszKind::Vector | SszKind::Bitvector => self.build_vector(kind, source, &shape, hints)?,
            SszKind::List
            | SszKind::Bitlist
            | SszKind::ProgressiveList
            | SszKind::ProgressiveBitlist => self.build_list(kind, source, &shape, hints)?,
            SszKind::CompatibleUnion => self.build_union(source, &shape)?,
            SszKind::Custom => build_custom(source, hints)?,
        };

        if let Some(size) = hints.size() {
            if size.bits && !kind.is_bitfield() {
                return Err(TypeError::InvalidHint(format!(
                    "bit size hint is only allowed for bitvector or bitlist types, got {}",
                    kind
                )));
            }
            if kind.is_vector_like() || kind == SszKind::Custom {
                desc.set_size_expr(size.expr.clone());
            }
        }
        if let Some(max) = hints.max() {
            if !max.no_value {
                desc.limit = Some(max.size);
            }
            desc.set_max_expr(max.expr.clone());
        }

        Ok(desc)
    }

    fn build_wide_uint(
        &self,
        kind: SszKind,
        source: &ShapeRef,
        shape: &SourceShape,
        hints: &Hints,
    ) -> Result<TypeDescriptor, TypeError> {
        if hints.size().is_some_and(|h| h.bits) {
            return Err(TypeError::incompatible(
                kind,
                "cannot be limited by bits, use regular size hint instead",
            ));
        }

        match (kind, shape) {
            (SszKind::Uint128, SourceShape::WellKnown(WellKnown::Uint128)) => {
                return Ok(TypeDescriptor {
                    type_name: source.type_name().to_string(),
                    ..TypeDescriptor::uint128()
                })
            }
            (SszKind::Uint256, SourceShape::WellKnown(WellKnown::Uint256)) => {
                return Ok(TypeDescriptor {
                    type_name: source.type_name().to_string(),
                    ..TypeDescriptor::uint256()
                })
            }
            _ => {}
        }

        let (elem, array_len) = match shape {
            SourceShape::Array { elem, len } => (elem, Some(*len)),
            SourceShape::Seq { elem } => (elem, None),
            other => {
                return Err(TypeError::incompatible(
                    kind,
                    format!(
                        "can only be represented by arrays or sequences, got {}",
                        other.label()
                    ),
                ))
            }
        };

        let elem_shape = elem.shape();
        if !matches!(
            elem_shape,
            SourceShape::Uint(UintWidth::U8) | SourceShape::Uint(UintWidth::U64)
        ) {
            return Err(TypeError::incompatible(
                kind,
                format!(
                    "can only be represented by u8 or u64 elements, got {}",
                    elem_shape.label()
                ),
            ));
        }

        let elem_desc = self.resolve(elem, &Hints::none())?;
        let desc = TypeDescriptor::wide_uint(kind, source.type_name(), elem_desc);
        if let Some(len) = array_len {
            if len < desc.element_count as usize {
                return Err(TypeError::incompatible(
                    kind,
                    format!("does not fit in array ({} < {})", len, desc.element_count),
                ));
            }
        }
        Ok(desc)
    }

    fn build_wrapper(
        &self,
        source: &ShapeRef,
        shape: &SourceShape,
    ) -> Result<TypeDescriptor, TypeError> {
        let SourceShape::Wrapper {
            descriptor,
            wrapped,
        } = shape
        else {
            return Err(TypeError::incompatible(
                SszKind::TypeWrapper,
                format!("can only be represented by TypeWrapper, got {}", shape.label()),
            ));
        };

        let SourceShape::Struct(desc_shape) = descriptor.shape() else {
            return Err(TypeError::incompatible(
                SszKind::TypeWrapper,
                format!("descriptor {} must be a struct", descriptor.type_name()),
            ));
        };
        let fields: Vec<_> = desc_shape
            .fields
            .iter()
            .filter(|f| !f.hints.omit)
            .collect();
        if fields.len() != 1 {
            return Err(TypeError::Empty(format!(
                "type wrapper descriptor {} must have exactly one field, got {}",
                descriptor.type_name(),
                fields.len()
            )));
        }

        let field = fields[0];
        if !field.ty.same_type(wrapped) {
            return Err(TypeError::WrapperMismatch {
                wrapper: source.type_name().to_string(),
                field: field.ty.type_name().to_string(),
                wrapped: wrapped.type_name().to_string(),
            });
        }

        let parsed = field.hints.parse().map_err(|e| e.in_field(field.name))?;
        let inner = self
            .resolve(&field.ty, &parsed.hints)
            .map_err(|e| e.in_field(field.name))?;
        Ok(wrap_descriptor(source.type_name(), inner))
    }

    fn resolve_fields(
        &self,
        shape: &SourceShape,
        kind: SszKind,
    ) -> Result<Vec<FieldDescriptor>, TypeError> {
        let SourceShape::Struct(st) = shape else {
            return Err(TypeError::incompatible(
                kind,
                format!("can only be represented by struct types, got {}", shape.label()),
            ));
        };

        let mut fields = Vec::with_capacity(st.fields.len());
        for field in &st.fields {
            let parsed = field.hints.parse().map_err(|e| e.in_field(field.name))?;
            if parsed.omit {
                continue;
            }
            let desc = self
                .resolve(&field.ty, &parsed.hints)
                .map_err(|e| e.in_field(field.name))?;
            fields.push(FieldDescriptor {
                name: field.name.to_string(),
                desc,
                ssz_index: parsed.ssz_index,
            });
        }
        Ok(fields)
    }

    fn build_vector(
        &self,
        kind: SszKind,
        source: &ShapeRef,
        shape: &SourceShape,
        hints: &Hints,
    ) -> Result<TypeDescriptor, TypeError> {
        let size = hints.size().filter(|h| h.is_declared());
        let mut bit_size = None;

        let (elem_desc, count) = match shape {
            SourceShape::Array { elem, len } => {
                let mut count = *len as u32;
                if let Some(hint) = size.filter(|h| h.size > 0) {
                    let byte_len = hint.byte_len();
                    if hint.bits {
                        bit_size = Some(hint.size);
                    }
                    if byte_len > count {
                        return Err(TypeError::incompatible(
                            kind,
                            format!(
                                "size hint is greater than the length of the array ({} > {})",
                                byte_len, count
                            ),
                        ));
                    }
                    count = byte_len;
                }
                (self.resolve(elem, &hints.child())?, count)
            }
            SourceShape::Seq { .. } | SourceShape::Text => {
                let Some(hint) = size else {
                    return Err(TypeError::MissingSizeHint {
                        kind,
                        type_name: source.type_name().to_string(),
                    });
                };
                if hint.bits {
                    bit_size = Some(hint.size);
                }
                let elem_desc = match shape {
                    SourceShape::Seq { elem } => self.resolve(elem, &hints.child())?,
                    _ => Arc::new(TypeDescriptor::uint8()),
                };
                (elem_desc, hint.byte_len())
            }
            other => {
                return Err(TypeError::incompatible(
                    kind,
                    format!(
                        "can only be represented by arrays or sequences, got {}",
                        other.label()
                    ),
                ))
            }
        };

        let mut desc = make_vector(kind, source.type_name(), elem_desc, count)?;
        match shape {
            SourceShape::Array { .. } => desc.flags.insert(TypeFlags::ARRAY_SOURCE),
            SourceShape::Text => desc.flags.insert(TypeFlags::TEXT_SOURCE),
            _ => {}
        }
        if let Some(bits) = bit_size {
            desc.bit_size = Some(bits);
            desc.flags.insert(TypeFlags::HAS_BIT_SIZE);
        }
        Ok(desc)
    }

    fn build_list(
        &self,
        kind: SszKind,
        source: &ShapeRef,
        shape: &SourceShape,
        hints: &Hints,
    ) -> Result<TypeDescriptor, TypeError> {
        let elem_desc = match shape {
            SourceShape::Seq { elem } => self.resolve(elem, &hints.child())?,
            SourceShape::Text | SourceShape::WellKnown(WellKnown::Bitlist) => {
                Arc::new(TypeDescriptor::uint8())
            }
            other => {
                return Err(TypeError::incompatible(
                    kind,
                    format!(
                        "can only be represented by sequence types, got {}",
                        other.label()
                    ),
                ))
            }
        };
        make_list(kind, source.type_name(), elem_desc)
    }

    fn build_union(
        &self,
        source: &ShapeRef,
        shape: &SourceShape,
    ) -> Result<TypeDescriptor, TypeError> {
        let SourceShape::Enum(en) = shape else {
            return Err(TypeError::incompatible(
                SszKind::CompatibleUnion,
                format!("can only be represented by enums, got {}", shape.label()),
            ));
        };

        let mut variants = Vec::with_capacity(en.variants.len());
        for variant in &en.variants {
            let parsed = variant
                .hints
                .parse()
                .map_err(|e| e.in_field(variant.name))?;
            let desc = self
                .resolve(&variant.ty, &parsed.hints)
                .map_err(|e| e.in_field(variant.name))?;
            variants.push(desc);
        }
        make_union(source.type_name(), variants)
    }
}

fn infer_kind(source: &ShapeRef, shape: &SourceShape, hints: &Hints) -> Result<SszKind, TypeError> {
    if source.custom_codec().is_some() {
        return Ok(SszKind::Custom);
    }

    let kind = match shape {
        SourceShape::WellKnown(WellKnown::Timestamp) => SszKind::Uint64,
        SourceShape::WellKnown(WellKnown::Uint128) => SszKind::Uint128,
        SourceShape::WellKnown(WellKnown::Uint256) => SszKind::Uint256,
        SourceShape::WellKnown(WellKnown::Bitlist) => SszKind::Bitlist,
        SourceShape::Enum(_) => SszKind::CompatibleUnion,
        SourceShape::Wrapper { .. } => SszKind::TypeWrapper,
        SourceShape::Bool => SszKind::Bool,
        SourceShape::Uint(UintWidth::U8) => SszKind::Uint8,
        SourceShape::Uint(UintWidth::U16) => SszKind::Uint16,
        SourceShape::Uint(UintWidth::U32) => SszKind::Uint32,
        SourceShape::Uint(UintWidth::U64) => SszKind::Uint64,
        SourceShape::Struct(_) => SszKind::Container,
        SourceShape::Array { .. } => SszKind::Vector,
        SourceShape::Seq { .. } | SourceShape::Text => {
            if hints.size().is_some_and(|h| h.is_declared()) {
                SszKind::Vector
            } else {
                SszKind::List
            }
        }
        SourceShape::Opaque => {
            return Err(TypeError::Unsupported(format!(
                "{} has no SSZ representation",
                source.type_name()
            )))
        }
    };
    Ok(kind)
}

fn build_scalar(
    kind: SszKind,
    source: &ShapeRef,
    shape: &SourceShape,
    hints: &Hints,
) -> Result<TypeDescriptor, TypeError> {
    let fits = matches!(
        (kind, shape),
        (SszKind::Bool, SourceShape::Bool)
            | (SszKind::Uint8, SourceShape::Uint(UintWidth::U8))
            | (SszKind::Uint16, SourceShape::Uint(UintWidth::U16))
            | (SszKind::Uint32, SourceShape::Uint(UintWidth::U32))
            | (SszKind::Uint64, SourceShape::Uint(UintWidth::U64))
            | (SszKind::Uint64, SourceShape::WellKnown(WellKnown::Timestamp))
    );
    if !fits {
        return Err(TypeError::incompatible(
            kind,
            format!(
                "can only be represented by matching types, got {}",
                shape.label()
            ),
        ));
    }

    let width = kind.scalar_width().unwrap_or(0);
    if let Some(hint) = hints.size() {
        if hint.bits {
            return Err(TypeError::incompatible(
                kind,
                "cannot be limited by bits, use regular size hint instead",
            ));
        }
        if !hint.dynamic && hint.expr.is_none() && hint.size != width {
            return Err(TypeError::incompatible(
                kind,
                format!("must be size {}, got {}", width, hint.size),
            ));
        }
    }
    Ok(TypeDescriptor::scalar(kind, source.type_name()))
}

fn build_custom(source: &ShapeRef, hints: &Hints) -> Result<TypeDescriptor, TypeError> {
    let codec = source
        .custom_codec()
        .ok_or_else(|| TypeError::MissingCustomCodec(source.type_name().to_string()))?;

    let size = hints
        .size()
        .filter(|h| !h.dynamic && h.size > 0)
        .map(|h| h.size)
        .or_else(|| codec.fixed_size());

    let mut desc = TypeDescriptor {
        children: Children::Custom(codec),
        ..TypeDescriptor::scalar(SszKind::Custom, source.type_name())
    };
    match size {
        Some(size) => desc.fixed_size = size,
        None => desc.mark_dynamic(),
    }
    Ok(desc)
}

// ============================================================================
// Descriptor assembly shared with DescriptorBuilder
// ============================================================================

/// Build a vector or bitvector descriptor over `elem`.
pub(crate) fn make_vector(
    kind: SszKind,
    type_name: &str,
    elem: Arc<TypeDescriptor>,
    count: u32,
) -> Result<TypeDescriptor, TypeError> {
    if kind == SszKind::Bitvector && elem.kind != SszKind::Uint8 {
        return Err(TypeError::incompatible(
            kind,
            format!("can only be represented by byte sequences, got {}", elem.kind),
        ));
    }

    let mut desc = TypeDescriptor {
        kind,
        element_count: count,
        ..TypeDescriptor::scalar(kind, type_name)
    };
    desc.inherit(&elem);
    if elem.is_dynamic() {
        desc.mark_dynamic();
    } else {
        desc.fixed_size = elem.fixed_size * count;
    }
    desc.children = Children::Element(elem);
    Ok(desc)
}

/// Build a list-like descriptor over `elem`.
pub(crate) fn make_list(
    kind: SszKind,
    type_name: &str,
    elem: Arc<TypeDescriptor>,
) -> Result<TypeDescriptor, TypeError> {
    if kind.is_bitfield() && elem.kind != SszKind::Uint8 {
        return Err(TypeError::incompatible(
            kind,
            format!("can only be represented by byte sequences, got {}", elem.kind),
        ));
    }

    let mut desc = TypeDescriptor::scalar(kind, type_name);
    desc.inherit(&elem);
    desc.mark_dynamic();
    desc.children = Children::Element(elem);
    Ok(desc)
}

/// Lay out a container: fixed region, offset slots and sparse indices.
pub(crate) fn assemble_container(
    kind: SszKind,
    type_name: &str,
    mut fields: Vec<FieldDescriptor>,
) -> Result<TypeDescriptor, TypeError> {
    let indexed = fields.iter().filter(|f| f.ssz_index.is_some()).count();
    let progressive = kind == SszKind::ProgressiveContainer || indexed > 0;

    if progressive {
        if indexed == 0 {
            for (pos, field) in fields.iter_mut().enumerate() {
                field.ssz_index = Some(pos as u16);
            }
        } else {
            let mut seen = HashSet::new();
            let mut previous: Option<u16> = None;
            for field in &fields {
                let Some(index) = field.ssz_index else {
                    return Err(TypeError::InvalidIndex(format!(
                        "progressive container field {} missing ssz index",
                        field.name
                    )));
                };
                if !seen.insert(index) {
                    return Err(TypeError::InvalidIndex(format!(
                        "duplicate ssz index {} found in field {}",
                        index, field.name
                    )));
                }
                if let Some(prev) = previous {
                    if index <= prev {
                        return Err(TypeError::InvalidIndex(format!(
                            "progressive container requires increasing ssz index values \
                             (field {} has index {}, previous field has {})",
                            field.name, index, prev
                        )));
                    }
                }
                previous = Some(index);
            }
        }
        if let Some(field) = fields.iter().find(|f| f.ssz_index.is_some_and(|i| i > 255)) {
            return Err(TypeError::InvalidIndex(format!(
                "ssz index of field {} exceeds 255",
                field.name
            )));
        }
    }

    let kind = if progressive {
        SszKind::ProgressiveContainer
    } else {
        SszKind::Container
    };
    let mut desc = TypeDescriptor::scalar(kind, type_name);
    let mut dyn_fields = Vec::new();
    let mut total = 0u32;
    for (index, field) in fields.iter().enumerate() {
        desc.inherit(&field.desc);
        if field.desc.is_dynamic() {
            dyn_fields.push(DynFieldDescriptor {
                field: field.clone(),
                header_offset: total,
                index,
            });
            total += 4;
        } else {
            total += field.desc.fixed_size;
        }
    }

    desc.element_count = total;
    if dyn_fields.is_empty() {
        desc.fixed_size = total;
    } else {
        desc.mark_dynamic();
    }
    desc.children = Children::Container(ContainerDescriptor { fields, dyn_fields });
    Ok(desc)
}

/// Build a compatible union; selectors are variant positions.
pub(crate) fn make_union(
    type_name: &str,
    variants: Vec<Arc<TypeDescriptor>>,
) -> Result<TypeDescriptor, TypeError> {
    if variants.is_empty() {
        return Err(TypeError::Empty(format!(
            "compatible union {} must have at least one variant",
            type_name
        )));
    }
    if variants.len() > 256 {
        return Err(TypeError::incompatible(
            SszKind::CompatibleUnion,
            format!("supports at most 256 variants, got {}", variants.len()),
        ));
    }

    let mut desc = TypeDescriptor::scalar(SszKind::CompatibleUnion, type_name);
    let mut map = BTreeMap::new();
    for (selector, variant) in variants.into_iter().enumerate() {
        desc.inherit(&variant);
        map.insert(selector as u8, variant);
    }
    desc.mark_dynamic();
    desc.children = Children::Union(map);
    Ok(desc)
}

/// Transparent wrapper inheriting size and flags of `inner`.
pub(crate) fn wrap_descriptor(type_name: &str, inner: Arc<TypeDescriptor>) -> TypeDescriptor {
    let mut desc = TypeDescriptor::scalar(SszKind::TypeWrapper, type_name);
    desc.fixed_size = inner.fixed_size;
    desc.flags.insert(inner.flags.intersection(TypeFlags::INHERITED));
    if inner.is_dynamic() {
        desc.mark_dynamic();
    }
    desc.children = Children::Element(inner);
    desc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::types::{FieldShape, RawHints, StructShape};
    use crate::value::SszValue;

    fn hints(raw: RawHints) -> Hints {
        raw.parse().unwrap().hints
    }

    struct Checkpoint;

    impl SszType for Checkpoint {
        fn shape() -> SourceShape {
            SourceShape::Struct(StructShape {
                name: "Checkpoint",
                fields: vec![
                    FieldShape::new("epoch", ShapeRef::of::<u64>(), RawHints::NONE),
                    FieldShape::new(
                        "root",
                        ShapeRef::of::<Vec<u8>>(),
                        RawHints {
                            size: Some("32"),
                            dyn_size: Some("ROOT_SIZE"),
                            ..RawHints::NONE
                        },
                    ),
                    FieldShape::new(
                        "cache",
                        ShapeRef::of::<Vec<u8>>(),
                        RawHints {
                            omit: true,
                            ..RawHints::NONE
                        },
                    ),
                ],
            })
        }

        fn to_ssz_value(&self) -> SszValue {
            SszValue::Container(Vec::new())
        }

        fn from_ssz_value(_value: SszValue) -> Result<Self, DecodeError> {
            Ok(Checkpoint)
        }
    }

    struct BadWrapperDescriptor;

    impl SszType for BadWrapperDescriptor {
        fn shape() -> SourceShape {
            SourceShape::Struct(StructShape {
                name: "BadWrapperDescriptor",
                fields: vec![FieldShape::new("data", ShapeRef::of::<u32>(), RawHints::NONE)],
            })
        }

        fn to_ssz_value(&self) -> SszValue {
            SszValue::Uint32(0)
        }

        fn from_ssz_value(_value: SszValue) -> Result<Self, DecodeError> {
            Ok(BadWrapperDescriptor)
        }
    }

    struct TreeNode;

    impl SszType for TreeNode {
        fn shape() -> SourceShape {
            SourceShape::Struct(StructShape {
                name: "TreeNode",
                fields: vec![FieldShape::new(
                    "children",
                    ShapeRef::of::<Vec<TreeNode>>(),
                    RawHints {
                        max: Some("4"),
                        ..RawHints::NONE
                    },
                )],
            })
        }

        fn to_ssz_value(&self) -> SszValue {
            SszValue::Container(vec![SszValue::List(Vec::new())])
        }

        fn from_ssz_value(_value: SszValue) -> Result<Self, DecodeError> {
            Ok(TreeNode)
        }
    }

    #[test]
    fn test_recursive_type_rejected() {
        let cache = TypeCache::new();
        let err = cache.descriptor_of::<TreeNode>().unwrap_err();
        let TypeError::Field { name, source } = err else {
            panic!("field error expected, got {:?}", err);
        };
        assert_eq!(name, "children");
        assert!(matches!(*source, TypeError::Recursive(_)));
        assert!(cache.cached_types().iter().all(|n| !n.contains("TreeNode")));

        // the failed build leaves nothing marked as in progress
        assert!(cache.descriptor_of::<TreeNode>().is_err());
        assert!(cache.descriptor_of::<u64>().is_ok());
        assert!(cache.building.lock().is_empty());
    }

    #[test]
    fn test_sequence_with_size_becomes_vector() {
        let cache = TypeCache::new();
        let desc = cache
            .resolve(
                &ShapeRef::of::<Vec<u8>>(),
                &hints(RawHints {
                    size: Some("32"),
                    ..RawHints::NONE
                }),
            )
            .unwrap();
        assert_eq!(desc.kind, SszKind::Vector);
        assert_eq!(desc.fixed_size, 32);
        assert!(!desc.flags.contains(TypeFlags::ARRAY_SOURCE));
        // hinted lookups bypass the cache, the element type does not
        let names = cache.cached_types();
        assert_eq!(names, vec!["u8"]);
    }

    #[test]
    fn test_list_limit_and_expression() {
        let cache = TypeCache::new();
        let desc = cache
            .resolve(
                &ShapeRef::of::<Vec<u64>>(),
                &hints(RawHints {
                    max: Some("16"),
                    dyn_max: Some("MAX_ITEMS"),
                    ..RawHints::NONE
                }),
            )
            .unwrap();
        assert_eq!(desc.kind, SszKind::List);
        assert_eq!(desc.limit, Some(16));
        assert_eq!(desc.max_expr.as_deref(), Some("MAX_ITEMS"));
        assert!(desc.has_dynamic_max());
    }

    #[test]
    fn test_array_size_hint_bounds() {
        let cache = TypeCache::new();
        let err = cache
            .resolve(
                &ShapeRef::of::<[u8; 4]>(),
                &hints(RawHints {
                    size: Some("8"),
                    ..RawHints::NONE
                }),
            )
            .unwrap_err();
        assert!(matches!(err, TypeError::Incompatible { kind: SszKind::Vector, .. }));

        let desc = cache.descriptor_of::<[u8; 32]>().unwrap();
        assert!(desc.flags.contains(TypeFlags::ARRAY_SOURCE));
    }

    #[test]
    fn test_bitvector_from_bitsize() {
        let cache = TypeCache::new();
        let desc = cache
            .resolve(
                &ShapeRef::of::<Vec<u8>>(),
                &hints(RawHints {
                    ssz_type: Some("bitvector"),
                    bitsize: Some("12"),
                    ..RawHints::NONE
                }),
            )
            .unwrap();
        assert_eq!(desc.kind, SszKind::Bitvector);
        assert_eq!(desc.fixed_size, 2);
        assert_eq!(desc.bit_size, Some(12));

        let err = cache
            .resolve(
                &ShapeRef::of::<Vec<u8>>(),
                &hints(RawHints {
                    max: Some("8"),
                    bitsize: Some("12"),
                    ..RawHints::NONE
                }),
            )
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidHint(_)));
    }

    #[test]
    fn test_scalar_hint_checks() {
        let cache = TypeCache::new();
        let err = cache
            .resolve(
                &ShapeRef::of::<u32>(),
                &hints(RawHints {
                    size: Some("8"),
                    ..RawHints::NONE
                }),
            )
            .unwrap_err();
        assert!(err.to_string().contains("must be size 4"));

        let err = cache
            .resolve(
                &ShapeRef::of::<u32>(),
                &Hints::none().with_kind(SszKind::Uint64),
            )
            .unwrap_err();
        assert!(matches!(err, TypeError::Incompatible { kind: SszKind::Uint64, .. }));
    }

    #[test]
    fn test_vector_without_size() {
        let cache = TypeCache::new();
        let err = cache
            .resolve(
                &ShapeRef::of::<Vec<u8>>(),
                &Hints::none().with_kind(SszKind::Vector),
            )
            .unwrap_err();
        assert!(matches!(err, TypeError::MissingSizeHint { .. }));
    }

    #[test]
    fn test_struct_resolves_container() {
        let cache = TypeCache::new();
        let desc = cache.descriptor_of::<Checkpoint>().unwrap();
        assert_eq!(desc.kind, SszKind::Container);
        assert_eq!(desc.fixed_size, 40);
        assert!(desc.has_dynamic_size());

        let container = desc.container().unwrap();
        assert_eq!(container.fields.len(), 2);
        assert_eq!(container.fields[1].desc.size_expr.as_deref(), Some("ROOT_SIZE"));

        // served from the cache the second time
        let again = cache.descriptor_of::<Checkpoint>().unwrap();
        assert!(Arc::ptr_eq(&desc, &again));
        assert!(cache.cached_types().iter().any(|n| n.ends_with("Checkpoint")));

        cache.remove::<Checkpoint>();
        let rebuilt = cache.descriptor_of::<Checkpoint>().unwrap();
        assert!(!Arc::ptr_eq(&desc, &rebuilt));
    }

    #[test]
    fn test_wrapper_field_must_match() {
        let cache = TypeCache::new();
        let err = cache
            .descriptor_of::<crate::reflect::TypeWrapper<BadWrapperDescriptor, u64>>()
            .unwrap_err();
        assert!(matches!(err, TypeError::WrapperMismatch { .. }));

        let desc = cache
            .descriptor_of::<crate::reflect::TypeWrapper<BadWrapperDescriptor, u32>>()
            .unwrap();
        assert_eq!(desc.kind, SszKind::TypeWrapper);
        assert_eq!(desc.fixed_size, 4);
    }

    #[test]
    fn test_unsupported_kind_for_shape() {
        let cache = TypeCache::new();
        let err = cache
            .resolve(
                &ShapeRef::of::<u64>(),
                &Hints::none().with_kind(SszKind::Container),
            )
            .unwrap_err();
        assert!(matches!(err, TypeError::Incompatible { kind: SszKind::Container, .. }));
    }
}
