// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven hash tree root walk.

use super::{calculate_limit, chunk_count, parse_bitlist, Hasher, HashWalker};
use crate::codec::{fit_bytes, Bounds};
use crate::error::HashError;
use crate::logging::indent;
use crate::spec::SpecResolver;
use crate::types::{SszKind, TypeDescriptor, TypeFlags};
use crate::value::SszValue;

/// Hash tree root of `value` laid out as `desc`.
pub fn hash_tree_root(
    desc: &TypeDescriptor,
    value: &SszValue,
    resolver: &dyn SpecResolver,
) -> Result<[u8; 32], HashError> {
    root_with_bounds(desc, value, &Bounds::new(resolver, false))
}

/// Drive an arbitrary walker over `value`; the walker ends up holding the
/// root (or, for tree-building walkers, the full tree).
pub fn hash_tree_root_with<W: HashWalker>(
    walker: &mut W,
    desc: &TypeDescriptor,
    value: &SszValue,
    resolver: &dyn SpecResolver,
) -> Result<(), HashError> {
    walk_with_bounds(walker, desc, value, &Bounds::new(resolver, false))
}

pub(crate) fn root_with_bounds(
    desc: &TypeDescriptor,
    value: &SszValue,
    bounds: &Bounds<'_>,
) -> Result<[u8; 32], HashError> {
    let mut hasher = Hasher::with_capacity(256);
    walk_with_bounds(&mut hasher, desc, value, bounds)?;
    hasher
        .hash_root()
        .ok_or_else(|| HashError::Custom(format!("walk of {} left no single root", desc.type_name)))
}

pub(crate) fn walk_with_bounds<W: HashWalker>(
    walker: &mut W,
    desc: &TypeDescriptor,
    value: &SszValue,
    bounds: &Bounds<'_>,
) -> Result<(), HashError> {
    TreeWalk { bounds }.walk(walker, desc, value, false, 0)
}

struct TreeWalk<'a, 'b> {
    bounds: &'a Bounds<'b>,
}

impl TreeWalk<'_, '_> {
    fn walk<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        pack: bool,
        depth: usize,
    ) -> Result<(), HashError> {
        if self.bounds.verbose() {
            log::trace!(
                "[dynssz] {}hash {} ({}) index {}",
                indent(depth),
                desc.type_name,
                desc.kind,
                hh.index()
            );
        }

        match desc.kind {
            SszKind::Bool => {
                let v = value.as_bool().ok_or_else(|| mismatch(desc, value))?;
                if pack {
                    hh.append_bool(v);
                } else {
                    hh.put_bool(v);
                }
            }
            SszKind::Uint8 => {
                let v = value.as_u8().ok_or_else(|| mismatch(desc, value))?;
                if pack {
                    hh.append_u8(v);
                } else {
                    hh.put_u8(v);
                }
            }
            SszKind::Uint16 => {
                let v = value.as_u16().ok_or_else(|| mismatch(desc, value))?;
                if pack {
                    hh.append_u16(v);
                } else {
                    hh.put_u16(v);
                }
            }
            SszKind::Uint32 => {
                let v = value.as_u32().ok_or_else(|| mismatch(desc, value))?;
                if pack {
                    hh.append_u32(v);
                } else {
                    hh.put_u32(v);
                }
            }
            SszKind::Uint64 => {
                let v = value.as_u64().ok_or_else(|| mismatch(desc, value))?;
                if pack {
                    hh.append_u64(v);
                } else {
                    hh.put_u64(v);
                }
            }
            SszKind::Uint128 | SszKind::Uint256 => self.wide_uint(hh, desc, value, pack)?,
            SszKind::TypeWrapper => {
                let inner = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
                self.walk(hh, inner, value, pack, depth + 1)?;
            }
            SszKind::Container => self.container(hh, desc, value, depth)?,
            SszKind::ProgressiveContainer => self.progressive_container(hh, desc, value, depth)?,
            SszKind::Vector | SszKind::Bitvector => self.vector(hh, desc, value, depth)?,
            SszKind::List | SszKind::ProgressiveList => self.list(hh, desc, value, depth)?,
            SszKind::Bitlist | SszKind::ProgressiveBitlist => self.bitlist(hh, desc, value)?,
            SszKind::CompatibleUnion => self.union(hh, desc, value, depth)?,
            SszKind::Custom => {
                let codec = desc
                    .custom_codec()
                    .ok_or_else(|| HashError::Custom(format!("{} has no codec", desc.type_name)))?;
                let root = codec.hash_tree_root(value)?;
                hh.put_bytes(&root);
            }
        }
        Ok(())
    }

    fn wide_uint<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        pack: bool,
    ) -> Result<(), HashError> {
        let width = desc.kind.scalar_width().unwrap_or(0) as usize;
        match value {
            SszValue::List(words) if words.iter().all(|w| w.as_u64().is_some()) => {
                if words.len() * 8 != width {
                    return Err(mismatch(desc, value));
                }
                for word in words.iter().filter_map(SszValue::as_u64) {
                    hh.append_u64(word);
                }
            }
            _ => {
                let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
                if bytes.len() != width {
                    return Err(mismatch(desc, value));
                }
                hh.append_bytes(&bytes);
            }
        }
        if !pack {
            hh.fill_up_to_32();
        }
        Ok(())
    }

    fn container<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        depth: usize,
    ) -> Result<(), HashError> {
        let container = desc.container().ok_or_else(|| mismatch(desc, value))?;
        let fields = value.as_container().ok_or_else(|| mismatch(desc, value))?;
        if fields.len() != container.fields.len() {
            return Err(mismatch(desc, value));
        }

        let index = hh.index();
        for (field, field_value) in container.fields.iter().zip(fields) {
            self.walk(hh, &field.desc, field_value, false, depth + 1)?;
        }
        hh.merkleize(index);
        Ok(())
    }

    fn progressive_container<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        depth: usize,
    ) -> Result<(), HashError> {
        let container = desc.container().ok_or_else(|| mismatch(desc, value))?;
        let fields = value.as_container().ok_or_else(|| mismatch(desc, value))?;
        if fields.len() != container.fields.len() {
            return Err(mismatch(desc, value));
        }

        let index = hh.index();
        let mut next = 0u16;
        for (field, field_value) in container.fields.iter().zip(fields) {
            let ssz_index = field.ssz_index.unwrap_or(next);
            while next < ssz_index {
                hh.put_u8(0);
                next += 1;
            }
            self.walk(hh, &field.desc, field_value, false, depth + 1)?;
            next = ssz_index + 1;
        }
        hh.merkleize_progressive_with_active_fields(index, &active_fields(desc));
        Ok(())
    }

    fn vector<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        depth: usize,
    ) -> Result<(), HashError> {
        let len = self.bounds.vector_len(desc)?;
        let truncate = desc.flags.contains(TypeFlags::ARRAY_SOURCE);
        let index = hh.index();

        if desc.is_byte_shaped() {
            let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
            if bytes.len() > len.count && !truncate {
                return Err(HashError::VectorLength {
                    len: bytes.len(),
                    limit: len.count as u64,
                });
            }
            hh.append_bytes32(&fit_bytes(&bytes, len.count));
        } else {
            let elem = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
            let items = value.as_list().ok_or_else(|| mismatch(desc, value))?;
            if items.len() > len.count && !truncate {
                return Err(HashError::VectorLength {
                    len: items.len(),
                    limit: len.count as u64,
                });
            }
            let used = items.len().min(len.count);
            for item in &items[..used] {
                self.walk(hh, elem, item, true, depth + 1)?;
            }
            if used < len.count {
                let zero = SszValue::zero(elem);
                for _ in used..len.count {
                    self.walk(hh, elem, &zero, true, depth + 1)?;
                }
            }
            hh.fill_up_to_32();
        }
        hh.merkleize(index);
        Ok(())
    }

    fn list<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        depth: usize,
    ) -> Result<(), HashError> {
        let index = hh.index();
        let len = if desc.is_byte_shaped() {
            let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
            hh.append_bytes32(&bytes);
            bytes.len()
        } else {
            let elem = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
            let items = value.as_list().ok_or_else(|| mismatch(desc, value))?;
            for item in items {
                self.walk(hh, elem, item, true, depth + 1)?;
            }
            hh.fill_up_to_32();
            items.len()
        };

        if desc.kind == SszKind::ProgressiveList {
            hh.merkleize_progressive_with_mixin(index, len as u64);
            return Ok(());
        }

        match self.bounds.list_limit(desc)? {
            Some(max) => {
                let item_size = desc
                    .element_desc()
                    .filter(|e| e.kind.is_basic())
                    .and_then(|e| e.kind.scalar_width())
                    .unwrap_or(0);
                let limit = if item_size > 0 {
                    calculate_limit(max, len as u64, u64::from(item_size))
                } else {
                    max
                };
                let chunks = chunk_count(hh.index() - index);
                if chunks > limit {
                    return Err(HashError::ListTooBig {
                        len: chunks as usize,
                        limit,
                    });
                }
                hh.merkleize_with_mixin(index, len as u64, limit);
            }
            None => hh.merkleize_with_mixin(index, len as u64, 0),
        }
        Ok(())
    }

    fn bitlist<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
    ) -> Result<(), HashError> {
        let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
        let bytes: &[u8] = if bytes.is_empty() { &[0x01] } else { &bytes };
        let (_, size) = parse_bitlist(bytes).ok_or(HashError::TypeMismatch {
            expected: desc.kind,
            found: "bitlist without length marker",
        })?;

        if desc.kind == SszKind::ProgressiveBitlist {
            hh.put_progressive_bitlist(bytes);
            return Ok(());
        }

        let max = match self.bounds.list_limit(desc)? {
            Some(max) => max,
            None => bytes.len() as u64 * 8,
        };
        if size > max {
            return Err(HashError::ListTooBig {
                len: size as usize,
                limit: max,
            });
        }
        hh.put_bitlist(bytes, max);
        Ok(())
    }

    fn union<W: HashWalker>(
        &self,
        hh: &mut W,
        desc: &TypeDescriptor,
        value: &SszValue,
        depth: usize,
    ) -> Result<(), HashError> {
        let (selector, inner) = value.as_union().ok_or_else(|| mismatch(desc, value))?;
        let variant = desc
            .union_variants()
            .and_then(|v| v.get(&selector))
            .ok_or(HashError::InvalidUnionVariant(selector))?;

        let index = hh.index();
        self.walk(hh, variant, inner, false, depth + 1)?;
        hh.put_u8(selector);
        hh.merkleize(index);
        Ok(())
    }
}

/// Active-fields bitvector of a progressive container: one bit per sparse
/// index plus a length bit at the highest index.
pub(crate) fn active_fields(desc: &TypeDescriptor) -> Vec<u8> {
    let Some(container) = desc.container() else {
        return vec![0x01];
    };
    let max_index = container.max_index().unwrap_or(0) as usize;
    let mut bits = vec![0u8; (max_index + 8) / 8];
    bits[max_index / 8] |= 1 << (max_index % 8);
    for index in container.fields.iter().filter_map(|f| f.ssz_index) {
        let index = index as usize;
        bits[index / 8] |= 1 << (index % 8);
    }
    bits
}

fn mismatch(desc: &TypeDescriptor, value: &SszValue) -> HashError {
    HashError::TypeMismatch {
        expected: desc.kind,
        found: value.kind_name(),
    }
}
