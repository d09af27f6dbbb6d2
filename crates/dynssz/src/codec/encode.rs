// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SSZ serialization.
//!
//! Containers write their fixed region first, reserving a 4-byte slot for
//! each dynamic field, then append the dynamic payloads in declaration
//! order and patch each slot with the payload's offset from the start of
//! the container.

use super::size::size_with_bounds;
use super::{fit_bytes, Bounds, BYTES_PER_OFFSET};
use crate::error::EncodeError;
use crate::hash::parse_bitlist;
use crate::logging::indent;
use crate::spec::SpecResolver;
use crate::types::{SszKind, TypeDescriptor, TypeFlags};
use crate::value::SszValue;

/// Serialize `value` as `desc` into a new buffer.
pub fn marshal(
    desc: &TypeDescriptor,
    value: &SszValue,
    resolver: &dyn SpecResolver,
) -> Result<Vec<u8>, EncodeError> {
    marshal_with_bounds(desc, value, &Bounds::new(resolver, false))
}

/// Serialize `value` as `desc`, appending to `buf`.
pub fn marshal_into(
    desc: &TypeDescriptor,
    value: &SszValue,
    resolver: &dyn SpecResolver,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    Encoder::new(&Bounds::new(resolver, false)).encode(desc, value, buf, 0)
}

pub(crate) fn marshal_with_bounds(
    desc: &TypeDescriptor,
    value: &SszValue,
    bounds: &Bounds<'_>,
) -> Result<Vec<u8>, EncodeError> {
    let size = size_with_bounds(desc, value, bounds)?;
    let mut buf = Vec::with_capacity(size);
    Encoder::new(bounds).encode(desc, value, &mut buf, 0)?;
    Ok(buf)
}

pub(crate) fn marshal_into_with_bounds(
    desc: &TypeDescriptor,
    value: &SszValue,
    bounds: &Bounds<'_>,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    Encoder::new(bounds).encode(desc, value, buf, 0)
}

struct Encoder<'a, 'b> {
    bounds: &'a Bounds<'b>,
}

impl<'a, 'b> Encoder<'a, 'b> {
    fn new(bounds: &'a Bounds<'b>) -> Self {
        Self { bounds }
    }

    fn encode(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        if self.bounds.verbose() {
            log::trace!(
                "[dynssz] {}encode {} ({}) at {}",
                indent(depth),
                desc.type_name,
                desc.kind,
                buf.len()
            );
        }

        match (desc.kind, value) {
            (SszKind::Bool, SszValue::Bool(v)) => buf.push(u8::from(*v)),
            (SszKind::Uint8, SszValue::Uint8(v)) => buf.push(*v),
            (SszKind::Uint16, SszValue::Uint16(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (SszKind::Uint32, SszValue::Uint32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (SszKind::Uint64, SszValue::Uint64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (SszKind::Uint128 | SszKind::Uint256, _) => self.wide_uint(desc, value, buf)?,
            (SszKind::TypeWrapper, _) => {
                let inner = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
                self.encode(inner, value, buf, depth + 1)?;
            }
            (SszKind::Container | SszKind::ProgressiveContainer, _) => {
                self.container(desc, value, buf, depth)?
            }
            (SszKind::Vector | SszKind::Bitvector, _) => self.vector(desc, value, buf, depth)?,
            (SszKind::List | SszKind::ProgressiveList, _) => self.list(desc, value, buf, depth)?,
            (SszKind::Bitlist | SszKind::ProgressiveBitlist, _) => self.bitlist(desc, value, buf)?,
            (SszKind::CompatibleUnion, _) => {
                let (selector, inner) = value.as_union().ok_or_else(|| mismatch(desc, value))?;
                let variant = desc
                    .union_variants()
                    .and_then(|v| v.get(&selector))
                    .ok_or(EncodeError::InvalidUnionVariant(selector))?;
                buf.push(selector);
                self.encode(variant, inner, buf, depth + 1)?;
            }
            (SszKind::Custom, _) => {
                let codec = desc.custom_codec().ok_or_else(|| {
                    EncodeError::Custom(format!("{} has no codec", desc.type_name))
                })?;
                codec.marshal(value, buf)?;
            }
            _ => return Err(mismatch(desc, value)),
        }
        Ok(())
    }

    fn wide_uint(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        let width = desc.kind.scalar_width().unwrap_or(0) as usize;
        match value {
            SszValue::List(words) if words.iter().all(|w| w.as_u64().is_some()) => {
                if words.len() * 8 != width {
                    return Err(mismatch(desc, value));
                }
                for word in words.iter().filter_map(SszValue::as_u64) {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
            _ => {
                let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
                if bytes.len() != width {
                    return Err(mismatch(desc, value));
                }
                buf.extend_from_slice(&bytes);
            }
        }
        Ok(())
    }

    fn container(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        let container = desc.container().ok_or_else(|| mismatch(desc, value))?;
        let fields = value.as_container().ok_or_else(|| mismatch(desc, value))?;
        if fields.len() != container.fields.len() {
            return Err(mismatch(desc, value));
        }

        let start = buf.len();
        let mut pending = Vec::with_capacity(container.dyn_fields.len());
        for (field, field_value) in container.fields.iter().zip(fields) {
            if field.desc.is_dynamic() {
                pending.push((buf.len(), &field.desc, field_value));
                buf.extend_from_slice(&[0u8; BYTES_PER_OFFSET]);
            } else {
                self.encode(&field.desc, field_value, buf, depth + 1)?;
            }
        }

        for (slot, field_desc, field_value) in pending {
            let offset = buf.len() - start;
            write_offset(buf, slot, offset)?;
            self.encode(field_desc, field_value, buf, depth + 1)?;
        }
        Ok(())
    }

    fn vector(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        let len = self.bounds.vector_len(desc)?;
        let count = len.count;
        let truncate = desc.flags.contains(TypeFlags::ARRAY_SOURCE);

        if desc.is_byte_shaped() {
            let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
            if bytes.len() > count && !truncate {
                return Err(EncodeError::VectorLength {
                    len: bytes.len(),
                    limit: count as u64,
                });
            }
            let fitted = fit_bytes(&bytes, count);
            if let Some(bits) = len.bits {
                let used = (bits % 8) as u32;
                if used != 0 && fitted.last().is_some_and(|b| b >> used != 0) {
                    return Err(EncodeError::BitvectorPadding);
                }
            }
            buf.extend_from_slice(&fitted);
            return Ok(());
        }

        let elem = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
        let items = value.as_list().ok_or_else(|| mismatch(desc, value))?;
        if items.len() > count && !truncate {
            return Err(EncodeError::VectorLength {
                len: items.len(),
                limit: count as u64,
            });
        }

        let used = items.len().min(count);
        let zero = (used < count).then(|| SszValue::zero(elem));
        let padded = items[..used]
            .iter()
            .chain(std::iter::repeat(zero.as_ref()).take(count - used).flatten());
        self.sequence(elem, padded, count, buf, depth)
    }

    fn list(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        let limit = self.bounds.list_limit(desc)?;

        if desc.is_byte_shaped() {
            let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
            check_limit(bytes.len(), limit)?;
            buf.extend_from_slice(&bytes);
            return Ok(());
        }

        let elem = desc.element_desc().ok_or_else(|| mismatch(desc, value))?;
        let items = value.as_list().ok_or_else(|| mismatch(desc, value))?;
        check_limit(items.len(), limit)?;
        self.sequence(elem, items.iter(), items.len(), buf, depth)
    }

    /// Elements back to back, behind an offset table when they are dynamic.
    fn sequence<'v>(
        &self,
        elem: &TypeDescriptor,
        items: impl Iterator<Item = &'v SszValue>,
        count: usize,
        buf: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        if !elem.is_dynamic() {
            for item in items {
                self.encode(elem, item, buf, depth + 1)?;
            }
            return Ok(());
        }

        let start = buf.len();
        buf.resize(start + BYTES_PER_OFFSET * count, 0);
        for (i, item) in items.enumerate() {
            let offset = buf.len() - start;
            write_offset(buf, start + BYTES_PER_OFFSET * i, offset)?;
            self.encode(elem, item, buf, depth + 1)?;
        }
        Ok(())
    }

    fn bitlist(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        let bytes = value.as_bytes().ok_or_else(|| mismatch(desc, value))?;
        let bytes: &[u8] = if bytes.is_empty() { &[0x01] } else { &bytes };
        let (_, size) = parse_bitlist(bytes).ok_or(EncodeError::TypeMismatch {
            expected: desc.kind,
            found: "bitlist without length marker",
        })?;
        if let Some(limit) = self.bounds.list_limit(desc)? {
            if size > limit {
                return Err(EncodeError::ListTooBig {
                    len: size as usize,
                    limit,
                });
            }
        }
        buf.extend_from_slice(bytes);
        Ok(())
    }
}

fn write_offset(buf: &mut [u8], slot: usize, offset: usize) -> Result<(), EncodeError> {
    let offset = u32::try_from(offset).map_err(|_| EncodeError::OffsetOverflow(offset))?;
    buf[slot..slot + BYTES_PER_OFFSET].copy_from_slice(&offset.to_le_bytes());
    Ok(())
}

fn check_limit(len: usize, limit: Option<u64>) -> Result<(), EncodeError> {
    match limit {
        Some(limit) if len as u64 > limit => Err(EncodeError::ListTooBig { len, limit }),
        _ => Ok(()),
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
    fn test_scalars_little_endian() {
        assert_eq!(
            marshal(&TypeDescriptor::uint32(), &SszValue::Uint32(0x0102_0304), &NoSpecs).unwrap(),
            vec![0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(
            marshal(&TypeDescriptor::bool(), &SszValue::Bool(true), &NoSpecs).unwrap(),
            vec![1]
        );
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let err = marshal(&TypeDescriptor::uint16(), &SszValue::Uint64(1), &NoSpecs).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::TypeMismatch { expected: SszKind::Uint16, found: "uint64" }
        ));
    }

    #[test]
    fn test_container_offsets() {
        let desc = DescriptorBuilder::new("Block")
            .field("slot", SszKind::Uint16)
            .byte_list_field("data", 16)
            .field("flag", SszKind::Bool)
            .byte_list_field("extra", 16)
            .build()
            .unwrap();
        let value = SszValue::Container(vec![
            SszValue::Uint16(7),
            SszValue::Bytes(vec![0xaa, 0xbb]),
            SszValue::Bool(true),
            SszValue::Bytes(vec![0xcc]),
        ]);
        let encoded = marshal(&desc, &value, &NoSpecs).unwrap();
        assert_eq!(
            encoded,
            vec![7, 0, 11, 0, 0, 0, 1, 13, 0, 0, 0, 0xaa, 0xbb, 0xcc]
        );
    }

    #[test]
    fn test_list_of_lists_offsets() {
        let inner = Arc::new(TypeDescriptor::byte_list(4));
        let desc = TypeDescriptor::list(inner, Some(4)).unwrap();
        let value = SszValue::List(vec![SszValue::Bytes(vec![1]), SszValue::Bytes(vec![2, 3])]);
        assert_eq!(
            marshal(&desc, &value, &NoSpecs).unwrap(),
            vec![8, 0, 0, 0, 9, 0, 0, 0, 1, 2, 3]
        );
    }

    #[test]
    fn test_list_too_big() {
        let desc = TypeDescriptor::byte_list(2);
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![1, 2, 3]), &NoSpecs),
            Err(EncodeError::ListTooBig { len: 3, limit: 2 })
        ));

        // a resolved limit replaces the literal one
        let desc = TypeDescriptor::byte_list(2).with_max_expr("MAX_BYTES");
        let specs = SpecValues::new().with("MAX_BYTES", 8);
        assert!(marshal(&desc, &SszValue::Bytes(vec![1, 2, 3]), &specs).is_ok());
    }

    #[test]
    fn test_vector_padding_and_length() {
        let desc = TypeDescriptor::byte_vector(4);
        assert_eq!(
            marshal(&desc, &SszValue::Bytes(vec![1, 2]), &NoSpecs).unwrap(),
            vec![1, 2, 0, 0]
        );
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![0; 5]), &NoSpecs),
            Err(EncodeError::VectorLength { len: 5, limit: 4 })
        ));

        let mut array_backed = TypeDescriptor::byte_vector(4);
        array_backed.flags.insert(TypeFlags::ARRAY_SOURCE);
        assert_eq!(
            marshal(&array_backed, &SszValue::Bytes(vec![9; 6]), &NoSpecs).unwrap(),
            vec![9; 4]
        );
    }

    #[test]
    fn test_vector_resolved_length() {
        let desc = TypeDescriptor::vector(Arc::new(TypeDescriptor::uint16()), 2)
            .unwrap()
            .with_size_expr("COUNT");
        let specs = SpecValues::new().with("COUNT", 3);
        let value = SszValue::List(vec![SszValue::Uint16(1)]);
        assert_eq!(marshal(&desc, &value, &specs).unwrap(), vec![1, 0, 0, 0, 0, 0]);
        assert_eq!(marshal(&desc, &value, &NoSpecs).unwrap(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_dynamic_vector_pads_with_offsets() {
        let desc = TypeDescriptor::vector(Arc::new(TypeDescriptor::byte_list(4)), 2).unwrap();
        let value = SszValue::List(vec![SszValue::Bytes(vec![5])]);
        assert_eq!(
            marshal(&desc, &value, &NoSpecs).unwrap(),
            vec![8, 0, 0, 0, 9, 0, 0, 0, 5]
        );
    }

    #[test]
    fn test_bitlist_encoding() {
        let desc = TypeDescriptor::bitlist(8);
        assert_eq!(marshal(&desc, &SszValue::Bytes(vec![]), &NoSpecs).unwrap(), vec![0x01]);
        assert_eq!(marshal(&desc, &SszValue::Bytes(vec![0x0d]), &NoSpecs).unwrap(), vec![0x0d]);
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![0xff, 0x03]), &NoSpecs),
            Err(EncodeError::ListTooBig { len: 9, limit: 8 })
        ));
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![0x01, 0x00]), &NoSpecs),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_union_selector_prefix() {
        let desc = TypeDescriptor::union(
            "U",
            vec![Arc::new(TypeDescriptor::uint16()), Arc::new(TypeDescriptor::byte_list(4))],
        )
        .unwrap();
        let value = SszValue::Union(1, Box::new(SszValue::Bytes(vec![7, 8])));
        assert_eq!(marshal(&desc, &value, &NoSpecs).unwrap(), vec![1, 7, 8]);

        let bad = SszValue::Union(2, Box::new(SszValue::Uint16(1)));
        assert!(matches!(
            marshal(&desc, &bad, &NoSpecs),
            Err(EncodeError::InvalidUnionVariant(2))
        ));
    }

    #[test]
    fn test_marshal_into_appends() {
        let mut buf = vec![0xff];
        marshal_into(&TypeDescriptor::uint16(), &SszValue::Uint16(2), &NoSpecs, &mut buf).unwrap();
        assert_eq!(buf, vec![0xff, 2, 0]);
    }

    #[test]
    fn test_wide_uint_from_words() {
        let desc = TypeDescriptor::uint128();
        let bytes = SszValue::Bytes((1..=16).collect());
        assert_eq!(marshal(&desc, &bytes, &NoSpecs).unwrap(), (1..=16).collect::<Vec<u8>>());
        let words = SszValue::List(vec![SszValue::Uint64(1), SszValue::Uint64(2)]);
        let encoded = marshal(&desc, &words, &NoSpecs).unwrap();
        assert_eq!(encoded[0], 1);
        assert_eq!(encoded[8], 2);
        assert!(marshal(&desc, &SszValue::Bytes(vec![0; 15]), &NoSpecs).is_err());
    }

    #[test]
    fn test_bitvector_padding_rejected() {
        let desc = TypeDescriptor::bitvector(12);
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![0xff, 0xff]), &NoSpecs),
            Err(EncodeError::BitvectorPadding)
        ));
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![0xff, 0x1f]), &NoSpecs),
            Err(EncodeError::BitvectorPadding)
        ));

        let bytes = marshal(&desc, &SszValue::Bytes(vec![0xff, 0x0f]), &NoSpecs).unwrap();
        assert_eq!(bytes, vec![0xff, 0x0f]);
        assert_eq!(
            crate::codec::unmarshal(&desc, &bytes, &NoSpecs).unwrap(),
            SszValue::Bytes(vec![0xff, 0x0f])
        );
    }

    #[test]
    fn test_bitvector_padding_uses_resolved_size() {
        let mut desc = TypeDescriptor::bitvector(16);
        desc.set_size_expr(Some("SYNC_BITS".to_string()));
        let specs = SpecValues::new().with("SYNC_BITS", 12);
        assert!(matches!(
            marshal(&desc, &SszValue::Bytes(vec![0xff, 0x10]), &specs),
            Err(EncodeError::BitvectorPadding)
        ));
        assert!(marshal(&desc, &SszValue::Bytes(vec![0xff, 0x10]), &NoSpecs).is_ok());
    }
}
