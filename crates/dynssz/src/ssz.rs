// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `DynSsz` facade.
//!
//! Ties the descriptor cache, the spec resolver and the codecs together.
//! Typed entry points take any [`SszType`]; the `*_value` variants work on a
//! descriptor plus [`SszValue`] directly.

use crate::codec::{self, Bounds};
use crate::error::Result;
use crate::hash::{self, HashWalker};
use crate::proof::{self, Node};
use crate::reflect::SszType;
use crate::spec::{CachedResolver, NoSpecs, SpecResolver, SpecValues};
use crate::types::{TypeCache, TypeDescriptor};
use crate::value::SszValue;
use crate::trace_fn;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

/// Dynamic SSZ encoder/decoder bound to one set of spec values.
///
/// # Example
/// ```ignore
/// use dynssz::{DynSsz, SpecValues};
///
/// let specs = SpecValues::new().with("SYNC_COMMITTEE_SIZE", 32);
/// let ssz = DynSsz::builder().specs(specs).build();
/// let bytes = ssz.marshal(&block)?;
/// let root = ssz.hash_tree_root(&block)?;
/// ```
pub struct DynSsz {
    resolver: Arc<dyn SpecResolver>,
    types: TypeCache,
    verbose: bool,
}

/// Builder for [`DynSsz`].
pub struct DynSszBuilder {
    resolver: Option<Arc<dyn SpecResolver>>,
    verbose: bool,
    cache_resolved_values: bool,
}

impl Default for DynSsz {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynSsz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynSsz")
            .field("cached_types", &self.types.len())
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl DynSsz {
    /// Facade without spec values; every bound uses its literal default.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DynSszBuilder {
        DynSszBuilder::new()
    }

    /// Facade resolving names against `specs`.
    pub fn with_specs(specs: SpecValues) -> Self {
        Self::builder().specs(specs).build()
    }

    pub fn resolver(&self) -> &dyn SpecResolver {
        self.resolver.as_ref()
    }

    pub fn type_cache(&self) -> &TypeCache {
        &self.types
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn bounds(&self) -> Bounds<'_> {
        Bounds::new(self.resolver.as_ref(), self.verbose)
    }

    /// Resolved descriptor of `T`.
    pub fn descriptor_of<T: SszType>(&self) -> Result<Arc<TypeDescriptor>> {
        Ok(self.types.descriptor_of::<T>()?)
    }

    /// Check that `T` resolves and that every bound it needs is available.
    pub fn validate_type<T: SszType>(&self) -> Result<()> {
        trace_fn!("DynSsz::validate_type");
        let desc = self.descriptor_of::<T>()?;
        let zero = SszValue::zero(&desc);
        codec::size_with_bounds(&desc, &zero, &self.bounds())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Typed entry points
    // ------------------------------------------------------------------

    pub fn marshal<T: SszType>(&self, value: &T) -> Result<Vec<u8>> {
        trace_fn!("DynSsz::marshal");
        let desc = self.descriptor_of::<T>()?;
        self.marshal_value(&desc, &value.to_ssz_value())
    }

    /// Append the encoding of `value` to `buf`.
    pub fn marshal_into<T: SszType>(&self, value: &T, buf: &mut Vec<u8>) -> Result<()> {
        trace_fn!("DynSsz::marshal_into");
        let desc = self.descriptor_of::<T>()?;
        self.marshal_value_into(&desc, &value.to_ssz_value(), buf)
    }

    /// Encode `value` into `writer`; returns the number of bytes written.
    pub fn marshal_writer<T: SszType, W: Write>(&self, value: &T, mut writer: W) -> Result<usize> {
        trace_fn!("DynSsz::marshal_writer");
        let bytes = self.marshal(value)?;
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    pub fn size_of<T: SszType>(&self, value: &T) -> Result<usize> {
        trace_fn!("DynSsz::size_of");
        let desc = self.descriptor_of::<T>()?;
        self.size_of_value(&desc, &value.to_ssz_value())
    }

    pub fn unmarshal<T: SszType>(&self, buf: &[u8]) -> Result<T> {
        trace_fn!("DynSsz::unmarshal");
        let desc = self.descriptor_of::<T>()?;
        let value = self.unmarshal_value(&desc, buf)?;
        Ok(T::from_ssz_value(value)?)
    }

    /// Decode exactly `size` bytes from `reader`.
    pub fn unmarshal_reader<T: SszType, R: Read>(&self, mut reader: R, size: usize) -> Result<T> {
        trace_fn!("DynSsz::unmarshal_reader");
        let mut buf = vec![0u8; size];
        reader.read_exact(&mut buf)?;
        self.unmarshal(&buf)
    }

    pub fn hash_tree_root<T: SszType>(&self, value: &T) -> Result<[u8; 32]> {
        trace_fn!("DynSsz::hash_tree_root");
        let desc = self.descriptor_of::<T>()?;
        self.hash_tree_root_value(&desc, &value.to_ssz_value())
    }

    /// Run the tree-root walk of `value` with a caller-supplied walker.
    pub fn hash_tree_root_with<T: SszType, W: HashWalker>(
        &self,
        value: &T,
        walker: &mut W,
    ) -> Result<()> {
        trace_fn!("DynSsz::hash_tree_root_with");
        let desc = self.descriptor_of::<T>()?;
        hash::walk_with_bounds(walker, &desc, &value.to_ssz_value(), &self.bounds())?;
        Ok(())
    }

    /// Full Merkle tree of `value` for proof generation.
    pub fn proof_tree<T: SszType>(&self, value: &T) -> Result<Node> {
        trace_fn!("DynSsz::proof_tree");
        let desc = self.descriptor_of::<T>()?;
        self.proof_tree_value(&desc, &value.to_ssz_value())
    }

    // ------------------------------------------------------------------
    // Descriptor + value entry points
    // ------------------------------------------------------------------

    pub fn marshal_value(&self, desc: &TypeDescriptor, value: &SszValue) -> Result<Vec<u8>> {
        let bytes = codec::marshal_with_bounds(desc, value, &self.bounds())?;
        log::debug!(
            "[dynssz] marshal {}: {} bytes",
            desc.type_name,
            bytes.len()
        );
        Ok(bytes)
    }

    pub fn marshal_value_into(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        codec::marshal_into_with_bounds(desc, value, &self.bounds(), buf)?;
        Ok(())
    }

    pub fn size_of_value(&self, desc: &TypeDescriptor, value: &SszValue) -> Result<usize> {
        Ok(codec::size_with_bounds(desc, value, &self.bounds())?)
    }

    pub fn unmarshal_value(&self, desc: &TypeDescriptor, buf: &[u8]) -> Result<SszValue> {
        log::debug!("[dynssz] unmarshal {}: {} bytes", desc.type_name, buf.len());
        Ok(codec::unmarshal_with_bounds(desc, buf, &self.bounds())?)
    }

    pub fn hash_tree_root_value(
        &self,
        desc: &TypeDescriptor,
        value: &SszValue,
    ) -> Result<[u8; 32]> {
        Ok(hash::root_with_bounds(desc, value, &self.bounds())?)
    }

    pub fn proof_tree_value(&self, desc: &TypeDescriptor, value: &SszValue) -> Result<Node> {
        Ok(proof::tree_with_bounds(desc, value, &self.bounds())?)
    }
}

impl DynSszBuilder {
    fn new() -> Self {
        Self {
            resolver: None,
            verbose: false,
            cache_resolved_values: false,
        }
    }

    /// Resolver for size and limit expressions (default: [`NoSpecs`]).
    pub fn resolver(mut self, resolver: Arc<dyn SpecResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Shorthand for `resolver(Arc::new(specs))`.
    pub fn specs(self, specs: SpecValues) -> Self {
        self.resolver(Arc::new(specs))
    }

    /// Log every descriptor walk at `trace` level.
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Memoise resolved expressions per facade.
    pub fn cache_resolved_values(mut self, enabled: bool) -> Self {
        self.cache_resolved_values = enabled;
        self
    }

    pub fn build(self) -> DynSsz {
        let resolver: Arc<dyn SpecResolver> = match self.resolver {
            Some(resolver) if self.cache_resolved_values => Arc::new(CachedResolver::new(resolver)),
            Some(resolver) => resolver,
            None => Arc::new(NoSpecs),
        };
        log::debug!(
            "[dynssz] facade ready (verbose {}, cached values {})",
            self.verbose,
            self.cache_resolved_values
        );
        DynSsz {
            resolver,
            types: TypeCache::new(),
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, EncodeError, Error};
    use crate::types::{DescriptorBuilder, SszKind};

    #[test]
    fn test_default_uses_literals() {
        let ssz = DynSsz::new();
        assert_eq!(ssz.resolver().resolve("ANY").unwrap(), None);
        let bytes = ssz.marshal(&vec![1u16, 2]).unwrap();
        assert_eq!(bytes, vec![1, 0, 2, 0]);
        assert_eq!(ssz.unmarshal::<Vec<u16>>(&bytes).unwrap(), vec![1, 2]);
        assert_eq!(ssz.size_of(&7u32).unwrap(), 4);
    }

    #[test]
    fn test_value_entry_points_use_specs() {
        let desc = TypeDescriptor::list(Arc::new(TypeDescriptor::uint8()), Some(4))
            .unwrap()
            .with_max_expr("MAX_BYTES");
        let value = SszValue::Bytes(vec![1, 2, 3]);

        let plain = DynSsz::new();
        assert!(plain.marshal_value(&desc, &value).is_ok());

        let tight = DynSsz::with_specs(SpecValues::new().with("MAX_BYTES", 2));
        assert!(matches!(
            tight.marshal_value(&desc, &value),
            Err(Error::Encode(EncodeError::ListTooBig { .. }))
        ));
    }

    #[test]
    fn test_cached_resolver_option() {
        let ssz = DynSsz::builder()
            .specs(SpecValues::new().with("N", 3))
            .cache_resolved_values(true)
            .verbose(true)
            .build();
        assert!(ssz.is_verbose());
        assert_eq!(ssz.resolver().resolve("N * 2").unwrap(), Some(6));
        assert_eq!(ssz.resolver().resolve("N * 2").unwrap(), Some(6));
    }

    #[test]
    fn test_streaming() {
        let ssz = DynSsz::new();
        let mut out = Vec::new();
        assert_eq!(ssz.marshal_writer(&42u64, &mut out).unwrap(), 8);
        let back: u64 = ssz.unmarshal_reader(out.as_slice(), 8).unwrap();
        assert_eq!(back, 42);
        assert!(matches!(
            ssz.unmarshal_reader::<u64, _>(&out[..4], 8),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_proof_tree_root_matches() {
        let ssz = DynSsz::new();
        let desc = DescriptorBuilder::new("Pair")
            .field("a", SszKind::Uint64)
            .byte_list_field("b", 64)
            .build()
            .unwrap();
        let value = SszValue::Container(vec![SszValue::Uint64(5), SszValue::Bytes(vec![9; 40])]);
        let root = ssz.hash_tree_root_value(&desc, &value).unwrap();
        let tree = ssz.proof_tree_value(&desc, &value).unwrap();
        assert_eq!(tree.hash(), root);
    }

    #[test]
    fn test_empty_buffer_for_fixed_type() {
        let ssz = DynSsz::new();
        assert!(matches!(
            ssz.unmarshal::<u32>(&[]),
            Err(Error::Decode(DecodeError::BufferTooShort { need: 4, have: 0 }))
        ));
    }
}
