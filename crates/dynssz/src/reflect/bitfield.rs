// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bitlist carrier.

use super::{mismatch, SszType};
use crate::error::DecodeError;
use crate::hash::parse_bitlist;
use crate::types::{SourceShape, WellKnown};
use crate::value::SszValue;

/// Variable-length bit sequence in SSZ byte form (length-marker bit
/// included). Resolves as a bitlist; add a `max` hint for its limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitList(Vec<u8>);

impl BitList {
    /// `len` cleared bits.
    pub fn with_len(len: usize) -> Self {
        let mut bytes = vec![0u8; len / 8 + 1];
        bytes[len / 8] |= 1 << (len % 8);
        Self(bytes)
    }

    /// Wrap SSZ bytes; `None` when the length marker is missing.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        parse_bitlist(&bytes)?;
        Some(Self(bytes))
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut list = Self::with_len(bits.len());
        for (i, bit) in bits.iter().enumerate() {
            list.set(i, *bit);
        }
        list
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        match self.0.last() {
            Some(&last) if last != 0 => {
                8 * (self.0.len() - 1) + (7 - last.leading_zeros() as usize)
            }
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit at `index`; out-of-range bits read as clear.
    pub fn get(&self, index: usize) -> bool {
        index < self.len() && self.0[index / 8] & (1 << (index % 8)) != 0
    }

    /// Set bit at `index`. Returns `false` when out of range.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        if index >= self.len() {
            return false;
        }
        if value {
            self.0[index / 8] |= 1 << (index % 8);
        } else {
            self.0[index / 8] &= !(1 << (index % 8));
        }
        true
    }

    pub fn count_ones(&self) -> usize {
        (0..self.len()).filter(|i| self.get(*i)).count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Default for BitList {
    fn default() -> Self {
        Self::with_len(0)
    }
}

impl SszType for BitList {
    fn shape() -> SourceShape {
        SourceShape::WellKnown(WellKnown::Bitlist)
    }

    fn to_ssz_value(&self) -> SszValue {
        SszValue::Bytes(self.0.clone())
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        match value {
            SszValue::Bytes(bytes) if bytes.is_empty() => Ok(Self::default()),
            SszValue::Bytes(bytes) => {
                Self::from_bytes(bytes).ok_or(DecodeError::BitlistNotTerminated)
            }
            other => Err(mismatch("bitlist", &other)),
        }
    }
}
