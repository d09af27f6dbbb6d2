// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SSZ wire codec.
//!
//! # Features
//!
//! - **Size**: exact encoded length of a value, computed before encoding
//! - **Encode**: fixed region first, then dynamic payloads with 4-byte
//!   relative offsets
//! - **Decode**: offset-table validation, bitfield checks, limit checks
//!
//! Every entry point takes a [`SpecResolver`]; bounds carrying a named
//! expression are resolved per call through [`Bounds`].

mod decode;
mod encode;
mod size;

pub use decode::unmarshal;
pub use encode::{marshal, marshal_into};
pub use size::size_of;

pub(crate) use decode::unmarshal_with_bounds;
pub(crate) use encode::{marshal_into_with_bounds, marshal_with_bounds};
pub(crate) use size::size_with_bounds;

use crate::error::{BoundError, DecodeError, EncodeError, HashError};
use crate::spec::SpecResolver;
use crate::types::{SszKind, TypeDescriptor, TypeFlags};
use crate::value::SszValue;
use std::fmt;

/// Codec for types whose SSZ form is provided out of band.
pub trait CustomCodec: Send + Sync + fmt::Debug {
    /// Name used in descriptors and diagnostics.
    fn name(&self) -> &str;

    /// Encoded size when it does not depend on the value.
    fn fixed_size(&self) -> Option<u32> {
        None
    }

    fn size_of(&self, value: &SszValue) -> Result<usize, EncodeError>;

    fn marshal(&self, value: &SszValue, buf: &mut Vec<u8>) -> Result<(), EncodeError>;

    fn unmarshal(&self, buf: &[u8]) -> Result<SszValue, DecodeError>;

    fn hash_tree_root(&self, value: &SszValue) -> Result<[u8; 32], HashError>;

    /// Value used when padding vectors of this type.
    fn zero_value(&self) -> SszValue {
        SszValue::Bytes(vec![0; self.fixed_size().unwrap_or(0) as usize])
    }
}

/// Resolved length of a vector-like descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VectorLen {
    /// Elements (bytes for byte-shaped vectors).
    pub count: usize,
    /// Bit length for bit-sized bitvectors.
    pub bits: Option<u64>,
}

/// Per-call bound resolution.
pub(crate) struct Bounds<'a> {
    resolver: &'a dyn SpecResolver,
    verbose: bool,
}

impl<'a> Bounds<'a> {
    pub fn new(resolver: &'a dyn SpecResolver, verbose: bool) -> Self {
        Self { resolver, verbose }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    fn resolve(&self, expr: &str) -> Result<Option<u64>, BoundError> {
        let value = self.resolver.resolve(expr)?;
        if self.verbose {
            log::trace!("[dynssz] spec '{}' -> {:?}", expr, value);
        }
        Ok(value)
    }

    /// Length of a vector, bitvector or fixed-width vector-backed value.
    pub fn vector_len(&self, desc: &TypeDescriptor) -> Result<VectorLen, BoundError> {
        let resolved = match &desc.size_expr {
            Some(expr) => self.resolve(expr)?,
            None => None,
        };

        if desc.flags.contains(TypeFlags::HAS_BIT_SIZE) {
            let bits = match (resolved, desc.bit_size) {
                (Some(bits), _) => bits,
                (None, Some(bits)) if bits > 0 => u64::from(bits),
                _ => return Err(missing(desc)),
            };
            return Ok(VectorLen {
                count: bits.div_ceil(8) as usize,
                bits: Some(bits),
            });
        }

        let count = match resolved {
            Some(count) => count as usize,
            None if desc.size_expr.is_some() && desc.element_count == 0 => {
                return Err(missing(desc))
            }
            None => desc.element_count as usize,
        };
        Ok(VectorLen { count, bits: None })
    }

    /// Maximum element count of a list (bits for bitlists).
    pub fn list_limit(&self, desc: &TypeDescriptor) -> Result<Option<u64>, BoundError> {
        match &desc.max_expr {
            Some(expr) => match self.resolve(expr)? {
                Some(limit) => Ok(Some(limit)),
                None => match desc.limit {
                    Some(limit) => Ok(Some(limit)),
                    None => Err(BoundError::Missing(expr.clone())),
                },
            },
            None => Ok(desc.limit),
        }
    }

    /// Encoded size of a non-dynamic descriptor with bounds resolved.
    pub fn static_size(&self, desc: &TypeDescriptor) -> Result<usize, BoundError> {
        if !desc.has_dynamic_size() {
            return Ok(desc.fixed_size as usize);
        }

        match desc.kind {
            SszKind::Vector | SszKind::Bitvector => {
                let len = self.vector_len(desc)?;
                match desc.element_desc() {
                    Some(elem) => Ok(self.static_size(elem)? * len.count),
                    None => Ok(len.count),
                }
            }
            SszKind::Container | SszKind::ProgressiveContainer => {
                let mut total = 0;
                if let Some(container) = desc.container() {
                    for field in &container.fields {
                        total += self.slot_size(&field.desc)?;
                    }
                }
                Ok(total)
            }
            SszKind::TypeWrapper => match desc.element_desc() {
                Some(inner) => self.static_size(inner),
                None => Ok(desc.fixed_size as usize),
            },
            _ => Ok(desc.fixed_size as usize),
        }
    }

    /// Bytes a value of `desc` occupies in its parent's fixed region.
    pub fn slot_size(&self, desc: &TypeDescriptor) -> Result<usize, BoundError> {
        if desc.is_dynamic() {
            Ok(BYTES_PER_OFFSET)
        } else {
            self.static_size(desc)
        }
    }
}

fn missing(desc: &TypeDescriptor) -> BoundError {
    BoundError::Missing(
        desc.size_expr
            .clone()
            .unwrap_or_else(|| desc.type_name.clone()),
    )
}

/// Width of an offset slot.
pub(crate) const BYTES_PER_OFFSET: usize = 4;

/// Zero-extend or truncate a byte run to exactly `len` bytes.
pub(crate) fn fit_bytes(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(len)].to_vec();
    out.resize(len, 0);
    out
}
