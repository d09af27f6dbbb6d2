// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SSZ kind tags.

use crate::error::TypeError;
use serde::Serialize;
use std::fmt;

/// Closed set of SSZ kinds a descriptor can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SszKind {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Uint256,
    Container,
    ProgressiveContainer,
    Vector,
    Bitvector,
    List,
    Bitlist,
    ProgressiveList,
    ProgressiveBitlist,
    CompatibleUnion,
    TypeWrapper,
    Custom,
}

impl SszKind {
    /// Parse a kind hint. `None` means "infer from the source type".
    pub fn parse_hint(text: &str) -> Result<Option<Self>, TypeError> {
        let kind = match text.trim() {
            "?" | "auto" | "" => return Ok(None),
            "custom" => Self::Custom,
            "wrapper" | "type-wrapper" => Self::TypeWrapper,
            "bool" => Self::Bool,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uint128" => Self::Uint128,
            "uint256" => Self::Uint256,
            "container" => Self::Container,
            "list" => Self::List,
            "vector" => Self::Vector,
            "bitlist" => Self::Bitlist,
            "bitvector" => Self::Bitvector,
            "progressive-list" => Self::ProgressiveList,
            "progressive-bitlist" => Self::ProgressiveBitlist,
            "progressive-container" => Self::ProgressiveContainer,
            "compatible-union" | "union" => Self::CompatibleUnion,
            other => {
                return Err(TypeError::InvalidHint(format!(
                    "invalid ssz type '{}'",
                    other
                )))
            }
        };
        Ok(Some(kind))
    }

    /// Natural byte width for fixed-width scalars.
    pub fn scalar_width(self) -> Option<u32> {
        match self {
            Self::Bool | Self::Uint8 => Some(1),
            Self::Uint16 => Some(2),
            Self::Uint32 => Some(4),
            Self::Uint64 => Some(8),
            Self::Uint128 => Some(16),
            Self::Uint256 => Some(32),
            _ => None,
        }
    }

    /// Basic kinds pack into shared chunks when hashed as elements.
    pub fn is_basic(self) -> bool {
        self.scalar_width().is_some()
    }

    pub fn is_container(self) -> bool {
        matches!(self, Self::Container | Self::ProgressiveContainer)
    }

    pub fn is_list_like(self) -> bool {
        matches!(
            self,
            Self::List | Self::Bitlist | Self::ProgressiveList | Self::ProgressiveBitlist
        )
    }

    pub fn is_vector_like(self) -> bool {
        matches!(self, Self::Vector | Self::Bitvector)
    }

    pub fn is_bitfield(self) -> bool {
        matches!(
            self,
            Self::Bitvector | Self::Bitlist | Self::ProgressiveBitlist
        )
    }

    pub fn is_progressive(self) -> bool {
        matches!(
            self,
            Self::ProgressiveContainer | Self::ProgressiveList | Self::ProgressiveBitlist
        )
    }

    /// Hint spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uint128 => "uint128",
            Self::Uint256 => "uint256",
            Self::Container => "container",
            Self::ProgressiveContainer => "progressive-container",
            Self::Vector => "vector",
            Self::Bitvector => "bitvector",
            Self::List => "list",
            Self::Bitlist => "bitlist",
            Self::ProgressiveList => "progressive-list",
            Self::ProgressiveBitlist => "progressive-bitlist",
            Self::CompatibleUnion => "compatible-union",
            Self::TypeWrapper => "type-wrapper",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SszKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
