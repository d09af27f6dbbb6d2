// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.
//!
//! Descriptors built here follow the same layout rules as the ones the
//! resolver derives from Rust types, so they can be fed to every codec.

use crate::codec::CustomCodec;
use crate::error::TypeError;
use crate::types::resolver::{
    assemble_container, make_list, make_union, make_vector, wrap_descriptor,
};
use crate::types::{Children, FieldDescriptor, SszKind, TypeDescriptor, TypeFlags};
use std::sync::Arc;

/// Builder for container descriptors.
#[derive(Debug)]
pub struct DescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    progressive: bool,
}

impl DescriptorBuilder {
    /// Create a new builder for a container type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            progressive: false,
        }
    }

    /// Create a builder for a progressive container.
    pub fn progressive(name: impl Into<String>) -> Self {
        Self {
            progressive: true,
            ..Self::new(name)
        }
    }

    /// Add a basic field (bool or uint kinds).
    pub fn field(self, name: impl Into<String>, kind: SszKind) -> Self {
        let desc = Arc::new(TypeDescriptor::scalar(kind, kind.as_str()));
        self.field_with_type(name, desc)
    }

    /// Add a field with a type descriptor.
    pub fn field_with_type(mut self, name: impl Into<String>, desc: Arc<TypeDescriptor>) -> Self {
        self.fields.push(FieldDescriptor::new(name, desc));
        self
    }

    /// Add a field at a sparse index (progressive containers).
    pub fn field_at(
        mut self,
        name: impl Into<String>,
        index: u16,
        desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, desc).with_index(index));
        self
    }

    /// Add a fixed-length byte vector field.
    pub fn bytes_field(self, name: impl Into<String>, len: u32) -> Self {
        let desc = Arc::new(TypeDescriptor::byte_vector(len));
        self.field_with_type(name, desc)
    }

    /// Add a byte list field with a maximum length.
    pub fn byte_list_field(self, name: impl Into<String>, max: u64) -> Self {
        let desc = Arc::new(TypeDescriptor::byte_list(max));
        self.field_with_type(name, desc)
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> Result<TypeDescriptor, TypeError> {
        let kind = if self.progressive {
            SszKind::ProgressiveContainer
        } else {
            SszKind::Container
        };
        assemble_container(kind, &self.name, self.fields)
    }
}

impl TypeDescriptor {
    /// Vector of `len` elements.
    pub fn vector(elem: Arc<TypeDescriptor>, len: u32) -> Result<Self, TypeError> {
        let name = format!("Vector[{}, {}]", elem.type_name, len);
        make_vector(SszKind::Vector, &name, elem, len)
    }

    /// Byte vector of `len` bytes.
    pub fn byte_vector(len: u32) -> Self {
        let mut desc = Self::scalar(SszKind::Vector, format!("Bytes{}", len));
        desc.element_count = len;
        desc.fixed_size = len;
        desc.children = Children::Element(Arc::new(Self::uint8()));
        desc
    }

    /// List with an optional maximum length.
    pub fn list(elem: Arc<TypeDescriptor>, max: Option<u64>) -> Result<Self, TypeError> {
        let name = format!("List[{}]", elem.type_name);
        let mut desc = make_list(SszKind::List, &name, elem)?;
        desc.limit = max;
        Ok(desc)
    }

    /// Byte list with a maximum length.
    pub fn byte_list(max: u64) -> Self {
        let mut desc = Self::scalar(SszKind::List, format!("ByteList[{}]", max));
        desc.mark_dynamic();
        desc.limit = Some(max);
        desc.children = Children::Element(Arc::new(Self::uint8()));
        desc
    }

    /// Progressive list (no maximum).
    pub fn progressive_list(elem: Arc<TypeDescriptor>) -> Result<Self, TypeError> {
        let name = format!("ProgressiveList[{}]", elem.type_name);
        make_list(SszKind::ProgressiveList, &name, elem)
    }

    /// Bitvector of `bits` bits.
    pub fn bitvector(bits: u32) -> Self {
        let mut desc = Self::byte_vector(bits.div_ceil(8));
        desc.kind = SszKind::Bitvector;
        desc.type_name = format!("Bitvector[{}]", bits);
        desc.bit_size = Some(bits);
        desc.flags.insert(TypeFlags::HAS_BIT_SIZE);
        desc
    }

    /// Bitlist holding at most `max_bits` bits.
    pub fn bitlist(max_bits: u64) -> Self {
        let mut desc = Self::byte_list(max_bits);
        desc.kind = SszKind::Bitlist;
        desc.type_name = format!("Bitlist[{}]", max_bits);
        desc
    }

    /// Progressive bitlist (no maximum).
    pub fn progressive_bitlist() -> Self {
        let mut desc = Self::byte_list(0);
        desc.kind = SszKind::ProgressiveBitlist;
        desc.type_name = "ProgressiveBitlist".to_string();
        desc.limit = None;
        desc
    }

    /// Compatible union; selectors follow variant order.
    pub fn union(
        name: impl Into<String>,
        variants: Vec<Arc<TypeDescriptor>>,
    ) -> Result<Self, TypeError> {
        make_union(&name.into(), variants)
    }

    /// Transparent wrapper around `inner`.
    pub fn wrapper(name: impl Into<String>, inner: Arc<TypeDescriptor>) -> Self {
        wrap_descriptor(&name.into(), inner)
    }

    /// Type encoded by an external codec.
    pub fn custom(codec: Arc<dyn CustomCodec>) -> Self {
        let mut desc = Self::scalar(SszKind::Custom, codec.name());
        match codec.fixed_size() {
            Some(size) => desc.fixed_size = size,
            None => desc.mark_dynamic(),
        }
        desc.children = Children::Custom(codec);
        desc
    }

    /// Attach a named size expression (vectors).
    pub fn with_size_expr(mut self, expr: impl Into<String>) -> Self {
        self.set_size_expr(Some(expr.into()));
        self
    }

    /// Attach a named limit expression (lists).
    pub fn with_max_expr(mut self, expr: impl Into<String>) -> Self {
        self.set_max_expr(Some(expr.into()));
        self
    }
}
