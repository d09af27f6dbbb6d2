// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SSZ deserialization.
//!
//! Every decode call receives the exact byte region of its value and must
//! consume all of it. Offsets are validated before any payload is read:
//! the first offset must point right behind the fixed region, and offsets
//! never decrease or leave the region.

use super::{Bounds, BYTES_PER_OFFSET};
use crate::error::DecodeError;
use crate::hash::parse_bitlist;
use crate::logging::indent;
use crate::spec::SpecResolver;
use crate::types::{SszKind, TypeDescriptor, TypeFlags};
use crate::value::SszValue;

/// Parse `buf` as a value of `desc`.
pub fn unmarshal(
    desc: &TypeDescriptor,
    buf: &[u8],
    resolver: &dyn SpecResolver,
) -> Result<SszValue, DecodeError> {
    unmarshal_with_bounds(desc, buf, &Bounds::new(resolver, false))
}

pub(crate) fn unmarshal_with_bounds(
    desc: &TypeDescriptor,
    buf: &[u8],
    bounds: &Bounds<'_>,
) -> Result<SszValue, DecodeError> {
    Decoder { bounds }.decode(desc, buf, 0)
}

struct Decoder<'a, 'b> {
    bounds: &'a Bounds<'b>,
}

impl Decoder<'_, '_> {
    fn decode(
        &self,
        desc: &TypeDescriptor,
        data: &[u8],
        depth: usize,
    ) -> Result<SszValue, DecodeError> {
        if self.bounds.verbose() {
            log::trace!(
                "[dynssz] {}decode {} ({}) from {} bytes",
                indent(depth),
                desc.type_name,
                desc.kind,
                data.len()
            );
        }

        let value = match desc.kind {
            SszKind::Bool => match expect_len(data, 1)?[0] {
                0 => SszValue::Bool(false),
                1 => SszValue::Bool(true),
                other => {
                    return Err(DecodeError::InvalidData(format!(
                        "invalid bool value 0x{:02x}",
                        other
                    )))
                }
            },
            SszKind::Uint8 => SszValue::Uint8(expect_len(data, 1)?[0]),
            SszKind::Uint16 => SszValue::Uint16(u16::from_le_bytes(le_array(expect_len(data, 2)?))),
            SszKind::Uint32 => SszValue::Uint32(u32::from_le_bytes(le_array(expect_len(data, 4)?))),
            SszKind::Uint64 => SszValue::Uint64(u64::from_le_bytes(le_array(expect_len(data, 8)?))),
            SszKind::Uint128 | SszKind::Uint256 => {
                let width = desc.kind.scalar_width().unwrap_or(0) as usize;
                let bytes = expect_len(data, width)?;
                if desc.is_byte_shaped() {
                    SszValue::Bytes(bytes.to_vec())
                } else {
                    SszValue::List(
                        bytes
                            .chunks_exact(8)
                            .map(|w| SszValue::Uint64(u64::from_le_bytes(le_array(w))))
                            .collect(),
                    )
                }
            }
            SszKind::TypeWrapper => {
                let inner = desc.element_desc().ok_or_else(|| malformed(desc))?;
                self.decode(inner, data, depth + 1)?
            }
            SszKind::Container | SszKind::ProgressiveContainer => {
                self.container(desc, data, depth)?
            }
            SszKind::Vector | SszKind::Bitvector => self.vector(desc, data, depth)?,
            SszKind::List | SszKind::ProgressiveList => self.list(desc, data, depth)?,
            SszKind::Bitlist | SszKind::ProgressiveBitlist => self.bitlist(desc, data)?,
            SszKind::CompatibleUnion => {
                let Some((&selector, payload)) = data.split_first() else {
                    return Err(DecodeError::BufferTooShort { need: 1, have: 0 });
                };
                let variant = desc
                    .union_variants()
                    .and_then(|v| v.get(&selector))
                    .ok_or(DecodeError::InvalidUnionVariant(selector))?;
                SszValue::Union(selector, Box::new(self.decode(variant, payload, depth + 1)?))
            }
            SszKind::Custom => {
                let codec = desc.custom_codec().ok_or_else(|| malformed(desc))?;
                codec.unmarshal(data)?
            }
        };
        Ok(value)
    }

    fn container(
        &self,
        desc: &TypeDescriptor,
        data: &[u8],
        depth: usize,
    ) -> Result<SszValue, DecodeError> {
        let container = desc.container().ok_or_else(|| malformed(desc))?;

        let mut fixed_len = 0;
        for field in &container.fields {
            fixed_len += self.bounds.slot_size(&field.desc)?;
        }
        if data.len() < fixed_len {
            return Err(DecodeError::BufferTooShort {
                need: fixed_len,
                have: data.len(),
            });
        }

        let mut values: Vec<Option<SszValue>> = vec![None; container.fields.len()];
        let mut offsets = Vec::with_capacity(container.dyn_fields.len());
        let mut pos = 0;
        for (i, field) in container.fields.iter().enumerate() {
            if field.desc.is_dynamic() {
                offsets.push((i, read_offset(data, pos)?));
                pos += BYTES_PER_OFFSET;
            } else {
                let size = self.bounds.static_size(&field.desc)?;
                values[i] = Some(self.decode(&field.desc, &data[pos..pos + size], depth + 1)?);
                pos += size;
            }
        }

        if offsets.is_empty() {
            if data.len() > fixed_len {
                return Err(DecodeError::TrailingBytes {
                    consumed: fixed_len,
                    total: data.len(),
                });
            }
        } else {
            let starts: Vec<usize> = offsets.iter().map(|(_, start)| *start).collect();
            let ends = region_ends(&starts, fixed_len, data.len())?;
            for ((i, start), end) in offsets.into_iter().zip(ends) {
                let field = &container.fields[i];
                values[i] = Some(self.decode(&field.desc, &data[start..end], depth + 1)?);
            }
        }

        let fields = values
            .into_iter()
            .map(|v| v.ok_or_else(|| malformed(desc)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SszValue::Container(fields))
    }

    fn vector(
        &self,
        desc: &TypeDescriptor,
        data: &[u8],
        depth: usize,
    ) -> Result<SszValue, DecodeError> {
        let len = self.bounds.vector_len(desc)?;

        if desc.is_byte_shaped() {
            let bytes = expect_len(data, len.count)?;
            if let Some(bits) = len.bits {
                let used = (bits % 8) as u32;
                if used != 0 && bytes.last().is_some_and(|b| b >> used != 0) {
                    return Err(DecodeError::BitvectorPadding);
                }
            }
            if desc.flags.contains(TypeFlags::TEXT_SOURCE) {
                let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |p| p + 1);
                return Ok(SszValue::Bytes(bytes[..end].to_vec()));
            }
            return Ok(SszValue::Bytes(bytes.to_vec()));
        }

        let elem = desc.element_desc().ok_or_else(|| malformed(desc))?;
        if !elem.is_dynamic() {
            let size = self.bounds.static_size(elem)?;
            let data = expect_len(data, size * len.count)?;
            return Ok(SszValue::List(self.fixed_items(elem, data, size, len.count, depth)?));
        }

        if len.count == 0 {
            expect_len(data, 0)?;
            return Ok(SszValue::List(Vec::new()));
        }
        let first = read_offset(data, 0)?;
        if first != BYTES_PER_OFFSET * len.count {
            return Err(DecodeError::Offset {
                offset: first,
                detail: "first offset does not match vector length",
            });
        }
        Ok(SszValue::List(self.dynamic_items(elem, data, len.count, depth)?))
    }

    fn list(
        &self,
        desc: &TypeDescriptor,
        data: &[u8],
        depth: usize,
    ) -> Result<SszValue, DecodeError> {
        let limit = self.bounds.list_limit(desc)?;

        if desc.is_byte_shaped() {
            check_limit(data.len(), limit)?;
            return Ok(SszValue::Bytes(data.to_vec()));
        }

        let elem = desc.element_desc().ok_or_else(|| malformed(desc))?;
        if !elem.is_dynamic() {
            let size = self.bounds.static_size(elem)?;
            if size == 0 {
                if data.is_empty() {
                    return Ok(SszValue::List(Vec::new()));
                }
                return Err(DecodeError::InvalidListLength {
                    len: data.len(),
                    item_size: size,
                });
            }
            if data.len() % size != 0 {
                return Err(DecodeError::InvalidListLength {
                    len: data.len(),
                    item_size: size,
                });
            }
            let count = data.len() / size;
            check_limit(count, limit)?;
            return Ok(SszValue::List(self.fixed_items(elem, data, size, count, depth)?));
        }

        if data.is_empty() {
            return Ok(SszValue::List(Vec::new()));
        }
        let first = read_offset(data, 0)?;
        if first % BYTES_PER_OFFSET != 0 || first < BYTES_PER_OFFSET || first > data.len() {
            return Err(DecodeError::Offset {
                offset: first,
                detail: "first offset is not a valid offset table length",
            });
        }
        let count = first / BYTES_PER_OFFSET;
        check_limit(count, limit)?;
        Ok(SszValue::List(self.dynamic_items(elem, data, count, depth)?))
    }

    fn bitlist(&self, desc: &TypeDescriptor, data: &[u8]) -> Result<SszValue, DecodeError> {
        let (_, size) = parse_bitlist(data).ok_or(DecodeError::BitlistNotTerminated)?;
        if let Some(limit) = self.bounds.list_limit(desc)? {
            if size > limit {
                return Err(DecodeError::ListTooBig {
                    len: size as usize,
                    limit,
                });
            }
        }
        Ok(SszValue::Bytes(data.to_vec()))
    }

    fn fixed_items(
        &self,
        elem: &TypeDescriptor,
        data: &[u8],
        size: usize,
        count: usize,
        depth: usize,
    ) -> Result<Vec<SszValue>, DecodeError> {
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            items.push(self.decode(elem, &data[i * size..(i + 1) * size], depth + 1)?);
        }
        Ok(items)
    }

    /// Elements behind an offset table of `count` entries.
    fn dynamic_items(
        &self,
        elem: &TypeDescriptor,
        data: &[u8],
        count: usize,
        depth: usize,
    ) -> Result<Vec<SszValue>, DecodeError> {
        let mut offsets = Vec::with_capacity(count);
        for i in 0..count {
            offsets.push(read_offset(data, i * BYTES_PER_OFFSET)?);
        }
        let ends = region_ends(&offsets, count * BYTES_PER_OFFSET, data.len())?;

        let mut items = Vec::with_capacity(count);
        for (start, end) in offsets.into_iter().zip(ends) {
            items.push(self.decode(elem, &data[start..end], depth + 1)?);
        }
        Ok(items)
    }
}

/// End of each payload region: the next offset, or the end of the data.
fn region_ends(
    offsets: &[usize],
    fixed_len: usize,
    total: usize,
) -> Result<Vec<usize>, DecodeError> {
    if let Some(&first) = offsets.first() {
        if first != fixed_len {
            return Err(DecodeError::Offset {
                offset: first,
                detail: "first offset does not match fixed region length",
            });
        }
    }

    let mut ends = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(total);
        if end > total {
            return Err(DecodeError::Offset {
                offset: end,
                detail: "offset out of range",
            });
        }
        if end < start {
            return Err(DecodeError::Offset {
                offset: end,
                detail: "offsets are not increasing",
            });
        }
        ends.push(end);
    }
    Ok(ends)
}

fn read_offset(data: &[u8], pos: usize) -> Result<usize, DecodeError> {
    let Some(raw) = data.get(pos..pos + BYTES_PER_OFFSET) else {
        return Err(DecodeError::BufferTooShort {
            need: pos + BYTES_PER_OFFSET,
            have: data.len(),
        });
    };
    Ok(u32::from_le_bytes(le_array(raw)) as usize)
}

fn expect_len(data: &[u8], len: usize) -> Result<&[u8], DecodeError> {
    if data.len() < len {
        return Err(DecodeError::BufferTooShort {
            need: len,
            have: data.len(),
        });
    }
    if data.len() > len {
        return Err(DecodeError::TrailingBytes {
            consumed: len,
            total: data.len(),
        });
    }
    Ok(data)
}

/// Copy a slice whose length was already checked into an array.
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn check_limit(len: usize, limit: Option<u64>) -> Result<(), DecodeError> {
    match limit {
        Some(limit) if len as u64 > limit => Err(DecodeError::ListTooBig { len, limit }),
        _ => Ok(()),
    }
}

fn malformed(desc: &TypeDescriptor) -> DecodeError {
    DecodeError::InvalidData(format!("descriptor {} has no {} layout", desc.type_name, desc.kind))
}
