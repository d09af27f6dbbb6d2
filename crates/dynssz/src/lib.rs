// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dynssz - Dynamic SimpleSerialize
//!
//! SSZ encoding, decoding and merkleization where container shapes are fixed
//! at compile time but vector lengths and list limits may be named
//! expressions resolved at call time. One annotated type serves every preset
//! (mainnet, minimal, custom networks).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynssz::{DynSsz, Result, Ssz, SpecValues};
//!
//! #[derive(Ssz, Default)]
//! struct SyncAggregate {
//!     #[ssz(type = "bitvector", bitsize = "512", dyn_bitsize = "SYNC_COMMITTEE_SIZE")]
//!     bits: Vec<u8>,
//!     #[ssz(size = "96")]
//!     signature: Vec<u8>,
//! }
//!
//! fn main() -> Result<()> {
//!     let specs = SpecValues::new().with("SYNC_COMMITTEE_SIZE", 32);
//!     let ssz = DynSsz::with_specs(specs);
//!
//!     let value = SyncAggregate { bits: vec![0; 4], signature: vec![0; 96] };
//!     let bytes = ssz.marshal(&value)?;
//!     let root = ssz.hash_tree_root(&value)?;
//!     let back: SyncAggregate = ssz.unmarshal(&bytes)?;
//!     # let _ = (root, back);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------------+
//! |  #[derive(Ssz)] / builtin SszType impls / DescriptorBuilder        |
//! +-------------------------------------------------------------------+
//! |  TypeCache: source shape + hints -> TypeDescriptor                 |
//! +-------------------------------------------------------------------+
//! |  DynSsz facade: Bounds (SpecResolver) per call                     |
//! +-------------------------------------------------------------------+
//! |  codec (size/encode/decode) | hash (HashWalker) | proof (trees)    |
//! +-------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - descriptors, hints and the type resolver
//! - [`spec`] - spec values and expression resolution
//! - [`codec`] - size calculator, serializer, deserializer
//! - [`hash`] - merkleization and the hash walker interface
//! - [`proof`] - Merkle trees and proofs

// Allow the derive macro to work inside this crate's tests
extern crate self as dynssz;

/// Wire codec (size, encode, decode).
pub mod codec;
/// Descriptor + value container with named field access.
pub mod data;
/// Error types for every pipeline stage.
pub mod error;
/// Merkleization (hash tree root).
pub mod hash;
/// Logging helpers and the `trace_fn!` macro.
pub mod logging;
/// Merkle trees and proofs.
pub mod proof;
/// Rust type reflection (`SszType` and builtin impls).
pub mod reflect;
/// Spec value resolution.
pub mod spec;
/// `DynSsz` facade.
mod ssz;
/// Type descriptors and the resolver.
pub mod types;
/// Dynamic value model.
pub mod value;

pub use codec::CustomCodec;
pub use data::{DataError, SszData};
pub use error::{
    DecodeError, EncodeError, Error, HashError, ProofError, Result, SpecError, TypeError,
};
pub use hash::{HashWalker, Hasher};
pub use proof::{verify_multiproof, verify_proof, Multiproof, Node, Proof};
pub use reflect::{BitList, SszType, TypeWrapper, U256};
pub use spec::{NoSpecs, SpecResolver, SpecValues};
pub use ssz::{DynSsz, DynSszBuilder};
pub use types::{DescriptorBuilder, SszKind, TypeCache, TypeDescriptor};
pub use value::SszValue;

pub use dynssz_derive::Ssz; // Derive macro (for #[derive(dynssz::Ssz)])

/// dynssz version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
