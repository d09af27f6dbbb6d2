// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoded size computation.

use super::{Bounds, BYTES_PER_OFFSET};
use crate::error::EncodeError;
use crate::spec::SpecResolver;
use crate::types::{SszKind, TypeDescriptor, TypeFlags};
use crate::value::SszValue;

/// Exact number of bytes `value` occupies when encoded as `desc`.
pub fn size_of(
    desc: &TypeDescriptor,
    value: &SszValue,
    resolver: &dyn SpecResolver,
) -> Result<usize, EncodeError> {
    size_with_bounds(desc, value, &Bounds::new(resolver, false))
}

pub(crate) fn size_with_bounds(
    desc: &TypeDescriptor,
    value: &SszValue,
    bounds: &Bounds<'_>,
) -> Result<usize, EncodeError> {
    if !desc.is_dynamic() {
        return Ok(bounds.static_size(desc)?);
    }

    match desc.kind {
        SszKind::TypeWrapper => match desc.element_desc() {
            Some(inner) => size_with_bounds(inner, value, bounds),
            None => Err(mismatch(desc, value)),
        },
        SszKind::Container | SszKind::ProgressiveContainer => {
            let container = desc.container().ok_or_else(|| mismatch(desc, value))?;
            let fields = value.as_container().ok_or_else(|| mismatch(desc, value))?;
            if fields.len() != container.fields.len() {
                return Err(mismatch(desc, value));
            }

            let mut total = 0;
            for (field, field_value) in container.fields.iter().zip(fields) {
                total += bounds.slot_size(&field.desc)?;
                if field.desc.is_dynamic() {
                    total += size_with_bounds(&field.desc, field_value, bounds)?;
                }
            }
            Ok(total)
        }
        SszKind::Vector => {
            // Only dynamic-element vectors get here.
            let elem = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
            let items = value.as_list().ok_or_else(|| mismatch(desc, value))?;
            let count = bounds.vector_len(desc)?.count;
            if items.len() > count && !desc.flags.contains(TypeFlags::ARRAY_SOURCE) {
                return Err(EncodeError::VectorLength {
                    len: items.len(),
                    limit: count as u64,
                });
            }

            let used = items.len().min(count);
            let mut total = BYTES_PER_OFFSET * count;
            for item in &items[..used] {
                total += size_with_bounds(elem, item, bounds)?;
            }
            if used < count {
                let zero = size_with_bounds(elem, &SszValue::zero(elem), bounds)?;
                total += zero * (count - used);
            }
            Ok(total)
        }
        SszKind::List | SszKind::ProgressiveList => {
            if desc.is_byte_shaped() {
                let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
                return Ok(bytes.len());
            }
            let elem = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
            let items = value.as_list().ok_or_else(|| mismatch(desc, value))?;
            if !elem.is_dynamic() {
                return Ok(bounds.static_size(elem)? * items.len());
            }

            let mut total = BYTES_PER_OFFSET * items.len();
            for item in items {
                total += size_with_bounds(elem, item, bounds)?;
            }
            Ok(total)
        }
        SszKind::Bitlist | SszKind::ProgressiveBitlist => {
            let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
            Ok(bytes.len().max(1))
        }
        SszKind::CompatibleUnion => {
            let (selector, inner) = value.as_union().ok_or_else(|| mismatch(desc, value))?;
            let variant = desc
                .union_variants()
                .and_then(|v| v.get(&selector))
                .ok_or(EncodeError::InvalidUnionVariant(selector))?;
            Ok(1 + size_with_bounds(variant, inner, bounds)?)
        }
        SszKind::Custom => match desc.custom_codec() {
            Some(codec) => codec.size_of(value),
            None => Err(EncodeError::Custom(format!("{} has no codec", desc.type_name))),
        },
        _ => Ok(bounds.static_size(desc)?),
    }
}

fn mismatch(desc: &TypeDescriptor, value: &SszValue) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: desc.kind,
        found: value.kind_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{NoSpecs, SpecValues};
    use crate::types::DescriptorBuilder;
    use std::sync::Arc;

    #[test]
    fn test_static_sizes() {
        assert_eq!(size_of(&TypeDescriptor::uint64(), &SszValue::Uint64(1), &NoSpecs).unwrap(), 8);
        let root = TypeDescriptor::byte_vector(32);
        assert_eq!(size_of(&root, &SszValue::Bytes(vec![]), &NoSpecs).unwrap(), 32);
    }

    #[test]
    fn test_container_with_dynamic_fields() {
        let desc = DescriptorBuilder::new("Block")
            .field("slot", SszKind::Uint64)
            .byte_list_field("data", 64)
            .byte_list_field("extra", 64)
            .build()
            .unwrap();
        let value = SszValue::Container(vec![
            SszValue::Uint64(1),
            SszValue::Bytes(vec![1, 2, 3]),
            SszValue::Bytes(vec![]),
        ]);
        assert_eq!(size_of(&desc, &value, &NoSpecs).unwrap(), 8 + 4 + 4 + 3);
    }

    #[test]
    fn test_list_of_dynamic_elements() {
        let inner = Arc::new(TypeDescriptor::byte_list(16));
        let desc = TypeDescriptor::list(inner, Some(8)).unwrap();
        let value = SszValue::List(vec![SszValue::Bytes(vec![1]), SszValue::Bytes(vec![2, 3])]);
        assert_eq!(size_of(&desc, &value, &NoSpecs).unwrap(), 8 + 3);
    }

    #[test]
    fn test_dynamic_vector_pads_with_zero_values() {
        let inner = Arc::new(TypeDescriptor::byte_list(16));
        let desc = TypeDescriptor::vector(inner, 3).unwrap();
        let value = SszValue::List(vec![SszValue::Bytes(vec![1, 2])]);
        assert_eq!(size_of(&desc, &value, &NoSpecs).unwrap(), 12 + 2);
    }

    #[test]
    fn test_resolved_vector_size() {
        let desc = TypeDescriptor::byte_vector(4).with_size_expr("WIDTH");
        let specs = SpecValues::new().with("WIDTH", 10);
        assert_eq!(size_of(&desc, &SszValue::Bytes(vec![]), &specs).unwrap(), 10);
    }

    #[test]
    fn test_union_and_bitlist() {
        let desc = TypeDescriptor::union(
            "U",
            vec![Arc::new(TypeDescriptor::uint16()), Arc::new(TypeDescriptor::bitlist(8))],
        )
        .unwrap();
        let value = SszValue::Union(1, Box::new(SszValue::Bytes(vec![])));
        assert_eq!(size_of(&desc, &value, &NoSpecs).unwrap(), 2);

        let bad = SszValue::Union(7, Box::new(SszValue::Uint16(1)));
        assert!(matches!(
            size_of(&desc, &bad, &NoSpecs),
            Err(EncodeError::InvalidUnionVariant(7))
        ));
    }
}
