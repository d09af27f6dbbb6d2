// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 256-bit unsigned integer carrier.

use super::{mismatch, wide_bytes, SszType};
use crate::error::DecodeError;
use crate::types::{SourceShape, WellKnown};
use crate::value::SszValue;
use std::fmt;

/// 256-bit unsigned integer stored as little-endian bytes.
///
/// Only a carrier for SSZ `uint256`; arithmetic is left to dedicated
/// big-integer crates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct U256(pub [u8; 32]);

impl U256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn from_be_bytes(mut bytes: [u8; 32]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Little-endian 64-bit limbs.
    pub fn from_words(words: [u64; 4]) -> Self {
        let mut bytes = [0u8; 32];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Self(bytes)
    }

    pub fn words(&self) -> [u64; 4] {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(8)) {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            *word = u64::from_le_bytes(raw);
        }
        words
    }

    /// Value if it fits into 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        let words = self.words();
        (words[1..].iter().all(|w| *w == 0)).then_some(words[0])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl From<u64> for U256 {
    fn from(v: u64) -> Self {
        Self::from_words([v, 0, 0, 0])
    }
}

impl From<u128> for U256 {
    fn from(v: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&v.to_le_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({:x})", self)
    }
}

impl fmt::LowerHex for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let be = self.to_be_bytes();
        let start = be.iter().position(|b| *b != 0).unwrap_or(31);
        write!(f, "0x{:x}", be[start])?;
        for b in &be[start + 1..] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl SszType for U256 {
    fn shape() -> SourceShape {
        SourceShape::WellKnown(WellKnown::Uint256)
    }

    fn to_ssz_value(&self) -> SszValue {
        SszValue::Bytes(self.0.to_vec())
    }

    fn from_ssz_value(value: SszValue) -> Result<Self, DecodeError> {
        let bytes = wide_bytes(&value, 32).ok_or_else(|| mismatch("uint256", &value))?;
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }
}
