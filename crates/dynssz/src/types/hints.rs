// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-field hint values.
//!
//! Hints are positional lists, outermost first: for `Vec<Vec<u8>>` the first
//! entry applies to the outer list and the second to the inner one. `?`
//! leaves a position unspecified.
//!
//! Static `size`/`bitsize`/`max` carry literal defaults. The `dyn_*`
//! variants may name an expression that the spec resolver evaluates at call
//! time; the static literal at the same position stays the fallback.

use crate::error::TypeError;
use crate::types::SszKind;

/// Size hint for one nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeHint {
    /// Literal size (elements, bytes, or bits when `bits` is set).
    pub size: u32,
    /// `size` counts bits rather than bytes.
    pub bits: bool,
    /// Position is unspecified (`?`).
    pub dynamic: bool,
    /// Named expression overriding `size` when it resolves.
    pub expr: Option<String>,
}

impl SizeHint {
    /// Fixed literal byte/element size.
    pub fn fixed(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Fixed literal bit size.
    pub fn bits(size: u32) -> Self {
        Self {
            size,
            bits: true,
            ..Self::default()
        }
    }

    /// A length is declared at this level (literal or expression).
    pub fn is_declared(&self) -> bool {
        !self.dynamic && (self.size > 0 || self.expr.is_some())
    }

    /// Literal size in bytes after bit-to-byte conversion.
    pub fn byte_len(&self) -> u32 {
        if self.bits {
            self.size.div_ceil(8)
        } else {
            self.size
        }
    }
}

/// Maximum-length hint for one nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaxHint {
    /// Literal maximum.
    pub size: u64,
    /// No literal maximum (`?`).
    pub no_value: bool,
    /// Named expression overriding `size` when it resolves.
    pub expr: Option<String>,
}

impl MaxHint {
    pub fn limit(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self {
            no_value: true,
            ..Self::default()
        }
    }
}

/// Parsed hint lists for one use site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    pub types: Vec<Option<SszKind>>,
    pub sizes: Vec<SizeHint>,
    pub maxes: Vec<MaxHint>,
}

impl Hints {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.sizes.is_empty() && self.maxes.is_empty()
    }

    /// Kind forced at this level, if any.
    pub fn kind(&self) -> Option<SszKind> {
        self.types.first().copied().flatten()
    }

    pub fn size(&self) -> Option<&SizeHint> {
        self.sizes.first()
    }

    pub fn max(&self) -> Option<&MaxHint> {
        self.maxes.first()
    }

    /// Hints for the next nesting level (first entry of each list consumed).
    pub fn child(&self) -> Self {
        Self {
            types: self.types.iter().skip(1).copied().collect(),
            sizes: self.sizes.iter().skip(1).cloned().collect(),
            maxes: self.maxes.iter().skip(1).cloned().collect(),
        }
    }

    pub fn with_kind(mut self, kind: SszKind) -> Self {
        self.types.insert(0, Some(kind));
        self
    }

    pub fn with_size(mut self, hint: SizeHint) -> Self {
        self.sizes.insert(0, hint);
        self
    }

    pub fn with_max(mut self, hint: MaxHint) -> Self {
        self.maxes.insert(0, hint);
        self
    }
}

/// Raw annotation text attached to a field or union variant.
///
/// Produced by `#[derive(Ssz)]`; parsed when the descriptor is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawHints {
    pub ssz_type: Option<&'static str>,
    pub size: Option<&'static str>,
    pub bitsize: Option<&'static str>,
    pub dyn_size: Option<&'static str>,
    pub dyn_bitsize: Option<&'static str>,
    pub max: Option<&'static str>,
    pub dyn_max: Option<&'static str>,
    pub index: Option<&'static str>,
    pub omit: bool,
}

/// Hints of one field after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldHints {
    pub hints: Hints,
    pub ssz_index: Option<u16>,
    pub omit: bool,
}

impl RawHints {
    pub const NONE: RawHints = RawHints {
        ssz_type: None,
        size: None,
        bitsize: None,
        dyn_size: None,
        dyn_bitsize: None,
        max: None,
        dyn_max: None,
        index: None,
        omit: false,
    };

    /// Parse every annotation into structured hints.
    pub fn parse(&self) -> Result<FieldHints, TypeError> {
        let mut types = Vec::new();
        if let Some(text) = self.ssz_type {
            for part in text.split(',') {
                types.push(SszKind::parse_hint(part)?);
            }
        }

        let mut sizes = parse_static_sizes(self.size, self.bitsize)?;
        merge_dynamic_sizes(&mut sizes, self.dyn_size, self.dyn_bitsize)?;

        let mut maxes = parse_static_maxes(self.max)?;
        merge_dynamic_maxes(&mut maxes, self.dyn_max)?;

        let ssz_index = match self.index {
            Some(text) => Some(text.trim().parse::<u16>().map_err(|e| {
                TypeError::InvalidHint(format!("error parsing ssz index '{}': {}", text, e))
            })?),
            None => None,
        };

        Ok(FieldHints {
            hints: Hints {
                types,
                sizes,
                maxes,
            },
            ssz_index,
            omit: self.omit,
        })
    }
}

fn split_parts(text: Option<&str>) -> Vec<&str> {
    text.map(|t| t.split(',').map(str::trim).collect())
        .unwrap_or_default()
}

/// Missing positions behave like an explicit `?`.
fn part_at<'a>(parts: &[&'a str], index: usize) -> &'a str {
    parts.get(index).copied().unwrap_or("?")
}

fn parse_u32(text: &str, what: &str) -> Result<u32, TypeError> {
    text.parse::<u32>()
        .map_err(|e| TypeError::InvalidHint(format!("error parsing {} '{}': {}", what, text, e)))
}

fn is_literal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_static_sizes(
    size: Option<&str>,
    bitsize: Option<&str>,
) -> Result<Vec<SizeHint>, TypeError> {
    let size_parts = split_parts(size);
    let bit_parts = split_parts(bitsize);
    let len = size_parts.len().max(bit_parts.len());

    let mut hints = Vec::with_capacity(len);
    for i in 0..len {
        let size_text = part_at(&size_parts, i);
        let bit_text = part_at(&bit_parts, i);
        let hint = if bit_text != "?" {
            SizeHint::bits(parse_u32(bit_text, "bitsize")?)
        } else if size_text != "?" {
            SizeHint::fixed(parse_u32(size_text, "size")?)
        } else {
            SizeHint {
                dynamic: true,
                ..SizeHint::default()
            }
        };
        hints.push(hint);
    }
    Ok(hints)
}

fn merge_dynamic_sizes(
    hints: &mut Vec<SizeHint>,
    dyn_size: Option<&str>,
    dyn_bitsize: Option<&str>,
) -> Result<(), TypeError> {
    let size_parts = split_parts(dyn_size);
    let bit_parts = split_parts(dyn_bitsize);
    let len = size_parts.len().max(bit_parts.len());

    for i in 0..len {
        let size_text = part_at(&size_parts, i);
        let bit_text = part_at(&bit_parts, i);
        let (text, bits) = if bit_text != "?" {
            (bit_text, true)
        } else {
            (size_text, false)
        };

        if text == "?" {
            if i >= hints.len() {
                hints.push(SizeHint {
                    dynamic: true,
                    ..SizeHint::default()
                });
            }
            continue;
        }

        if is_literal(text) {
            let size = parse_u32(text, "dynamic size")?;
            let hint = SizeHint {
                size,
                bits,
                ..SizeHint::default()
            };
            if i >= hints.len() {
                hints.push(hint);
            } else if hints[i].size != size || hints[i].bits != bits {
                hints[i] = hint;
            }
            continue;
        }

        if i >= hints.len() {
            hints.push(SizeHint {
                bits,
                expr: Some(text.to_string()),
                ..SizeHint::default()
            });
        } else {
            let hint = &mut hints[i];
            hint.dynamic = false;
            hint.bits = bits;
            hint.expr = Some(text.to_string());
        }
    }
    Ok(())
}

fn parse_static_maxes(max: Option<&str>) -> Result<Vec<MaxHint>, TypeError> {
    split_parts(max)
        .into_iter()
        .map(|text| {
            if text == "?" {
                Ok(MaxHint::unbounded())
            } else {
                text.parse::<u64>().map(MaxHint::limit).map_err(|e| {
                    TypeError::InvalidHint(format!("error parsing max '{}': {}", text, e))
                })
            }
        })
        .collect()
}

fn merge_dynamic_maxes(hints: &mut Vec<MaxHint>, dyn_max: Option<&str>) -> Result<(), TypeError> {
    for (i, text) in split_parts(dyn_max).into_iter().enumerate() {
        if text == "?" {
            if i >= hints.len() {
                hints.push(MaxHint::unbounded());
            }
            continue;
        }

        if is_literal(text) {
            let size = text.parse::<u64>().map_err(|e| {
                TypeError::InvalidHint(format!("error parsing dynamic max '{}': {}", text, e))
            })?;
            if i >= hints.len() {
                hints.push(MaxHint::limit(size));
            } else if hints[i].size != size || hints[i].no_value {
                hints[i] = MaxHint::limit(size);
            }
            continue;
        }

        if i >= hints.len() {
            hints.push(MaxHint {
                no_value: true,
                expr: Some(text.to_string()),
                ..MaxHint::default()
            });
        } else {
            hints[i].expr = Some(text.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_size_positions() {
        let raw = RawHints {
            size: Some("?,32"),
            ..RawHints::NONE
        };
        let parsed = raw.parse().unwrap();
        assert_eq!(parsed.hints.sizes.len(), 2);
        assert!(parsed.hints.sizes[0].dynamic);
        assert_eq!(parsed.hints.sizes[1], SizeHint::fixed(32));
    }

    #[test]
    fn test_bitsize_wins_over_size() {
        let raw = RawHints {
            size: Some("64"),
            bitsize: Some("512"),
            ..RawHints::NONE
        };
        let hint = raw.parse().unwrap().hints.sizes[0].clone();
        assert!(hint.bits);
        assert_eq!(hint.size, 512);
        assert_eq!(hint.byte_len(), 64);
    }

    #[test]
    fn test_dynamic_size_keeps_literal_default() {
        let raw = RawHints {
            size: Some("8192,32"),
            dyn_size: Some("SLOTS_PER_HISTORICAL_ROOT,32"),
            ..RawHints::NONE
        };
        let sizes = raw.parse().unwrap().hints.sizes;
        assert_eq!(sizes[0].size, 8192);
        assert_eq!(sizes[0].expr.as_deref(), Some("SLOTS_PER_HISTORICAL_ROOT"));
        assert_eq!(sizes[1], SizeHint::fixed(32));
    }

    #[test]
    fn test_dynamic_literal_replaces_default() {
        let raw = RawHints {
            size: Some("4"),
            dyn_size: Some("6"),
            ..RawHints::NONE
        };
        assert_eq!(raw.parse().unwrap().hints.sizes[0], SizeHint::fixed(6));
    }

    #[test]
    fn test_max_hints() {
        let raw = RawHints {
            max: Some("?,1024"),
            dyn_max: Some("MAX_ITEMS"),
            ..RawHints::NONE
        };
        let maxes = raw.parse().unwrap().hints.maxes;
        assert!(maxes[0].no_value);
        assert_eq!(maxes[0].expr.as_deref(), Some("MAX_ITEMS"));
        assert_eq!(maxes[1], MaxHint::limit(1024));
    }

    #[test]
    fn test_expression_only_max() {
        let raw = RawHints {
            dyn_max: Some("MAX_VALIDATORS*2"),
            ..RawHints::NONE
        };
        let maxes = raw.parse().unwrap().hints.maxes;
        assert!(maxes[0].no_value);
        assert_eq!(maxes[0].expr.as_deref(), Some("MAX_VALIDATORS*2"));
    }

    #[test]
    fn test_type_and_index() {
        let raw = RawHints {
            ssz_type: Some("list,uint8"),
            index: Some("3"),
            ..RawHints::NONE
        };
        let parsed = raw.parse().unwrap();
        assert_eq!(parsed.hints.kind(), Some(SszKind::List));
        assert_eq!(parsed.hints.child().kind(), Some(SszKind::Uint8));
        assert_eq!(parsed.ssz_index, Some(3));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let raw = RawHints {
            size: Some("abc"),
            ..RawHints::NONE
        };
        assert!(matches!(raw.parse(), Err(TypeError::InvalidHint(_))));

        let raw = RawHints {
            index: Some("-1"),
            ..RawHints::NONE
        };
        assert!(raw.parse().is_err());
    }

    #[test]
    fn test_child_consumes_first() {
        let hints = Hints::none()
            .with_size(SizeHint::fixed(32))
            .with_max(MaxHint::limit(16));
        assert_eq!(hints.size(), Some(&SizeHint::fixed(32)));
        let child = hints.child();
        assert!(child.is_empty());
    }
}
