// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for every stage of the SSZ pipeline.
//!
//! Each algorithm surfaces its own error enum so callers can tell a broken
//! type description apart from a value that violates its bounds or a buffer
//! that is not valid SSZ. The facade folds them into [`Error`].

use crate::types::SszKind;
use std::fmt;

// ============================================================================
// Spec resolution
// ============================================================================

/// Errors raised while resolving a named size/limit expression.
#[derive(Debug)]
pub enum SpecError {
    /// Expression text could not be parsed.
    Parse { expr: String, reason: String },
    /// Expression divides by zero.
    DivisionByZero(String),
    /// Expression result does not fit into 64 bits.
    Overflow(String),
    /// Preset file could not be read.
    Io(std::io::Error),
    /// Preset document is not a valid YAML mapping.
    Yaml(String),
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { expr, reason } => {
                write!(f, "error parsing spec expression '{}': {}", expr, reason)
            }
            Self::DivisionByZero(expr) => write!(f, "division by zero in '{}'", expr),
            Self::Overflow(expr) => write!(f, "spec expression '{}' overflows u64", expr),
            Self::Io(e) => write!(f, "failed to read spec preset: {}", e),
            Self::Yaml(msg) => write!(f, "invalid spec preset: {}", msg),
        }
    }
}

impl std::error::Error for SpecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpecError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure to turn a descriptor bound into a concrete number.
///
/// Shared by size, encode, decode and hash; converted into the stage error
/// by `?`.
#[derive(Debug)]
pub enum BoundError {
    /// Neither the resolver nor the descriptor provides a value.
    Missing(String),
    /// The resolver failed.
    Spec(SpecError),
}

impl fmt::Display for BoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(what) => write!(f, "no value for bound '{}'", what),
            Self::Spec(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BoundError {}

impl From<SpecError> for BoundError {
    fn from(e: SpecError) -> Self {
        Self::Spec(e)
    }
}

// ============================================================================
// Descriptor construction
// ============================================================================

/// Errors raised while building a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Requested SSZ kind cannot be represented by the source type.
    Incompatible { kind: SszKind, reason: String },
    /// Source type is not supported at all.
    Unsupported(String),
    /// A vector-like kind has neither a fixed length nor a size hint.
    MissingSizeHint { kind: SszKind, type_name: String },
    /// Hint text could not be parsed or is not valid here.
    InvalidHint(String),
    /// Union or wrapper without any variant/field.
    Empty(String),
    /// Wrapper descriptor field does not match the wrapped type.
    WrapperMismatch { wrapper: String, field: String, wrapped: String },
    /// Custom kind without an external codec.
    MissingCustomCodec(String),
    /// Sparse index annotations are inconsistent.
    InvalidIndex(String),
    /// Type contains itself without indirection through a codec.
    Recursive(String),
    /// Error inside a named field or variant.
    Field { name: String, source: Box<TypeError> },
}

impl TypeError {
    pub(crate) fn incompatible(kind: SszKind, reason: impl Into<String>) -> Self {
        Self::Incompatible {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn in_field(self, name: &str) -> Self {
        Self::Field {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incompatible { kind, reason } => write!(f, "{} ssz type {}", kind, reason),
            Self::Unsupported(msg) => write!(f, "unsupported type: {}", msg),
            Self::MissingSizeHint { kind, type_name } => {
                write!(f, "{} type {} requires explicit size hint", kind, type_name)
            }
            Self::InvalidHint(msg) => write!(f, "invalid hint: {}", msg),
            Self::Empty(msg) => write!(f, "{}", msg),
            Self::WrapperMismatch {
                wrapper,
                field,
                wrapped,
            } => write!(
                f,
                "type wrapper {}: descriptor field type {} does not match wrapped type {}",
                wrapper, field, wrapped
            ),
            Self::MissingCustomCodec(name) => write!(
                f,
                "custom type {} requires external codec implementation",
                name
            ),
            Self::InvalidIndex(msg) => write!(f, "{}", msg),
            Self::Recursive(name) => write!(f, "type {} is recursive", name),
            Self::Field { name, source } => {
                write!(f, "failed to build descriptor for field {}: {}", name, source)
            }
        }
    }
}

impl std::error::Error for TypeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Errors raised while serializing a value.
#[derive(Debug)]
pub enum EncodeError {
    /// Vector source holds more elements than its length.
    VectorLength { len: usize, limit: u64 },
    /// List source holds more elements than its maximum.
    ListTooBig { len: usize, limit: u64 },
    /// Bitvector bits beyond its bit length are set.
    BitvectorPadding,
    /// Union selector has no matching variant.
    InvalidUnionVariant(u8),
    /// Value shape does not fit the descriptor.
    TypeMismatch { expected: SszKind, found: &'static str },
    /// Size or limit could not be resolved.
    MissingBound(String),
    /// Offset does not fit into 32 bits.
    OffsetOverflow(usize),
    /// Spec resolver failure.
    Spec(SpecError),
    /// Failure reported by a custom codec.
    Custom(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VectorLength { len, limit } => {
                write!(f, "vector length {} exceeds limit {}", len, limit)
            }
            Self::ListTooBig { len, limit } => {
                write!(f, "list length {} exceeds maximum {}", len, limit)
            }
            Self::BitvectorPadding => write!(f, "bitvector padding bits are not zero"),
            Self::InvalidUnionVariant(sel) => write!(f, "invalid union variant {}", sel),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::MissingBound(what) => write!(f, "no value for bound '{}'", what),
            Self::OffsetOverflow(offset) => write!(f, "offset {} exceeds u32 range", offset),
            Self::Spec(e) => write!(f, "spec resolution failed: {}", e),
            Self::Custom(msg) => write!(f, "custom codec: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoundError> for EncodeError {
    fn from(e: BoundError) -> Self {
        match e {
            BoundError::Missing(what) => Self::MissingBound(what),
            BoundError::Spec(e) => Self::Spec(e),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Errors raised while parsing an SSZ buffer.
#[derive(Debug)]
pub enum DecodeError {
    /// Buffer is shorter than the region being read.
    BufferTooShort { need: usize, have: usize },
    /// Offset table entry is out of range or not monotonic.
    Offset { offset: usize, detail: &'static str },
    /// Union selector has no matching variant.
    InvalidUnionVariant(u8),
    /// Bitlist has no length-marker bit.
    BitlistNotTerminated,
    /// Bitvector bits beyond its bit length are set.
    BitvectorPadding,
    /// Decoded list is longer than its maximum.
    ListTooBig { len: usize, limit: u64 },
    /// Fixed-element list payload is not a multiple of the element size.
    InvalidListLength { len: usize, item_size: usize },
    /// Region was not fully consumed.
    TrailingBytes { consumed: usize, total: usize },
    /// Dynamic value cannot be converted into the requested Rust type.
    TypeMismatch { expected: &'static str, found: &'static str },
    /// Value is structurally valid SSZ but not valid for the target type.
    InvalidData(String),
    /// Size or limit could not be resolved.
    MissingBound(String),
    /// Spec resolver failure.
    Spec(SpecError),
    /// Failure reported by a custom codec.
    Custom(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooShort { need, have } => {
                write!(f, "unexpected end of SSZ: need {} bytes, have {}", need, have)
            }
            Self::Offset { offset, detail } => write!(f, "invalid offset {}: {}", offset, detail),
            Self::InvalidUnionVariant(sel) => write!(f, "invalid union variant {}", sel),
            Self::BitlistNotTerminated => write!(f, "bitlist misses length-marker bit"),
            Self::BitvectorPadding => write!(f, "bitvector padding bits are not zero"),
            Self::ListTooBig { len, limit } => {
                write!(f, "list length {} exceeds maximum {}", len, limit)
            }
            Self::InvalidListLength { len, item_size } => write!(
                f,
                "invalid list length, expected multiple of {}, got {}",
                item_size, len
            ),
            Self::TrailingBytes { consumed, total } => {
                write!(f, "did not consume full ssz range ({} of {} bytes)", consumed, total)
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Self::MissingBound(what) => write!(f, "no value for bound '{}'", what),
            Self::Spec(e) => write!(f, "spec resolution failed: {}", e),
            Self::Custom(msg) => write!(f, "custom codec: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoundError> for DecodeError {
    fn from(e: BoundError) -> Self {
        match e {
            BoundError::Missing(what) => Self::MissingBound(what),
            BoundError::Spec(e) => Self::Spec(e),
        }
    }
}

// ============================================================================
// Merkleization
// ============================================================================

/// Errors raised while computing a hash tree root.
#[derive(Debug)]
pub enum HashError {
    /// Spec resolver failure.
    Spec(SpecError),
    /// Size or limit could not be resolved.
    MissingBound(String),
    /// List holds more chunks or elements than its limit.
    ListTooBig { len: usize, limit: u64 },
    /// Vector source holds more elements than its length.
    VectorLength { len: usize, limit: u64 },
    /// Union selector has no matching variant.
    InvalidUnionVariant(u8),
    /// Value shape does not fit the descriptor.
    TypeMismatch { expected: SszKind, found: &'static str },
    /// Failure reported by a custom codec.
    Custom(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(e) => write!(f, "spec resolution failed: {}", e),
            Self::MissingBound(what) => write!(f, "no value for bound '{}'", what),
            Self::ListTooBig { len, limit } => {
                write!(f, "list length {} exceeds limit {}", len, limit)
            }
            Self::VectorLength { len, limit } => {
                write!(f, "vector length {} exceeds limit {}", len, limit)
            }
            Self::InvalidUnionVariant(sel) => write!(f, "invalid union variant {}", sel),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::Custom(msg) => write!(f, "custom codec: {}", msg),
        }
    }
}

impl std::error::Error for HashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoundError> for HashError {
    fn from(e: BoundError) -> Self {
        match e {
            BoundError::Missing(what) => Self::MissingBound(what),
            BoundError::Spec(e) => Self::Spec(e),
        }
    }
}

// ============================================================================
// Proofs
// ============================================================================

/// Errors raised while building or checking Merkle proofs.
#[derive(Debug)]
pub enum ProofError {
    /// Generalized index does not address a node of the tree.
    NodeNotFound(u64),
    /// Generalized index 0 is not a tree position.
    InvalidIndex(u64),
    /// Composed generalized index does not fit into 64 bits.
    IndexOverflow,
    /// Multiproof inputs are inconsistent.
    Malformed(String),
    /// Tree construction failed while hashing the value.
    Hash(HashError),
}

impl fmt::Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(index) => write!(f, "node {} not found in tree", index),
            Self::InvalidIndex(index) => write!(f, "invalid generalized index {}", index),
            Self::IndexOverflow => write!(f, "generalized index exceeds 64 bits"),
            Self::Malformed(msg) => write!(f, "malformed proof: {}", msg),
            Self::Hash(e) => write!(f, "tree construction failed: {}", e),
        }
    }
}

impl std::error::Error for ProofError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hash(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HashError> for ProofError {
    fn from(e: HashError) -> Self {
        Self::Hash(e)
    }
}

// ============================================================================
// Facade
// ============================================================================

/// Umbrella error returned by [`crate::DynSsz`].
#[derive(Debug)]
pub enum Error {
    Type(TypeError),
    Encode(EncodeError),
    Decode(DecodeError),
    Hash(HashError),
    Spec(SpecError),
    Proof(ProofError),
    /// Reader or writer failure in the streaming entry points.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(e) => write!(f, "type error: {}", e),
            Self::Encode(e) => write!(f, "encode error: {}", e),
            Self::Decode(e) => write!(f, "decode error: {}", e),
            Self::Hash(e) => write!(f, "hash error: {}", e),
            Self::Spec(e) => write!(f, "spec error: {}", e),
            Self::Proof(e) => write!(f, "proof error: {}", e),
            Self::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Type(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Hash(e) => Some(e),
            Self::Spec(e) => Some(e),
            Self::Proof(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<TypeError> for Error {
    fn from(e: TypeError) -> Self {
        Self::Type(e)
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<HashError> for Error {
    fn from(e: HashError) -> Self {
        Self::Hash(e)
    }
}

impl From<SpecError> for Error {
    fn from(e: SpecError) -> Self {
        Self::Spec(e)
    }
}

impl From<ProofError> for Error {
    fn from(e: ProofError) -> Self {
        Self::Proof(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result alias used by the facade.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_wraps_source() {
        let err = TypeError::MissingSizeHint {
            kind: SszKind::Vector,
            type_name: "Vec<u8>".into(),
        }
        .in_field("roots");
        let msg = err.to_string();
        assert!(msg.contains("field roots"));
        assert!(msg.contains("requires explicit size hint"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bound_error_conversions() {
        let enc: EncodeError = BoundError::Missing("MAX_ITEMS".into()).into();
        assert!(matches!(enc, EncodeError::MissingBound(ref n) if n == "MAX_ITEMS"));

        let dec: DecodeError = BoundError::Spec(SpecError::DivisionByZero("A/0".into())).into();
        assert!(matches!(dec, DecodeError::Spec(SpecError::DivisionByZero(_))));

        let hash: HashError = BoundError::Missing("X".into()).into();
        assert_eq!(hash.to_string(), "no value for bound 'X'");
    }

    #[test]
    fn test_umbrella_display() {
        let err: Error = DecodeError::BitlistNotTerminated.into();
        assert_eq!(err.to_string(), "decode error: bitlist misses length-marker bit");
    }
}
