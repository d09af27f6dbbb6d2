// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SSZ type model.
//!
//! # Features
//!
//! - **TypeDescriptor**: immutable description of one SSZ type
//! - **Hints**: positional size/limit/kind annotations, static or named
//! - **TypeCache**: resolves Rust types into shared descriptors
//! - **Builder API**: fluent interface for descriptors without a Rust type

mod builder;
mod descriptor;
mod hints;
mod kind;
pub(crate) mod resolver;
mod shape;

pub use builder::DescriptorBuilder;
pub use descriptor::{
    Children, ContainerDescriptor, DynFieldDescriptor, FieldDescriptor, TypeDescriptor, TypeFlags,
};
pub use hints::{FieldHints, Hints, MaxHint, RawHints, SizeHint};
pub use kind::SszKind;
pub use resolver::TypeCache;
pub use shape::{EnumShape, FieldShape, ShapeRef, SourceShape, StructShape, UintWidth, WellKnown};
