// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hash walker interface.
//!
//! The tree-root walk opens a frame with [`HashWalker::index`], feeds leaf
//! data, then closes the frame with one of the `merkleize*` calls which
//! replaces everything since the frame start with a single root.
//!
//! `append_*` calls pack values back to back (vector/list elements);
//! `put_*` calls give a value its own zero-padded chunk (container fields).

pub trait HashWalker {
    /// Current frame position.
    fn index(&self) -> usize;

    fn append_bool(&mut self, v: bool);
    fn append_u8(&mut self, v: u8);
    fn append_u16(&mut self, v: u16);
    fn append_u32(&mut self, v: u32);
    fn append_u64(&mut self, v: u64);

    /// Append raw bytes without padding.
    fn append_bytes(&mut self, b: &[u8]);

    /// Append raw bytes, zero-padded to a chunk boundary.
    fn append_bytes32(&mut self, b: &[u8]) {
        self.append_bytes(b);
        self.fill_up_to_32();
    }

    /// Zero-pad pending bytes to a chunk boundary.
    fn fill_up_to_32(&mut self);

    fn put_bool(&mut self, v: bool) {
        self.put_bytes(&[u8::from(v)]);
    }

    fn put_u8(&mut self, v: u8) {
        self.put_bytes(&[v]);
    }

    fn put_u16(&mut self, v: u16) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.put_bytes(&v.to_le_bytes());
    }

    fn put_u64(&mut self, v: u64) {
        self.put_bytes(&v.to_le_bytes());
    }

    /// Put bytes as one chunk, or as a merkleized subtree beyond 32 bytes.
    fn put_bytes(&mut self, b: &[u8]) {
        if b.len() <= 32 {
            self.append_bytes32(b);
        } else {
            let index = self.index();
            self.append_bytes32(b);
            self.merkleize(index);
        }
    }

    /// Put a bitlist (with marker) as a length-mixed subtree.
    fn put_bitlist(&mut self, bitlist: &[u8], max_bits: u64) {
        let (payload, size) = super::parse_bitlist(bitlist).unwrap_or_default();
        let index = self.index();
        self.append_bytes32(&payload);
        self.merkleize_with_mixin(index, size, max_bits.div_ceil(256));
    }

    /// Put a progressive bitlist (with marker).
    fn put_progressive_bitlist(&mut self, bitlist: &[u8]) {
        let (payload, size) = super::parse_bitlist(bitlist).unwrap_or_default();
        let index = self.index();
        self.append_bytes32(&payload);
        self.merkleize_progressive_with_mixin(index, size);
    }

    /// Binary merkleization of the frame, sized to its content.
    fn merkleize(&mut self, index: usize);

    /// Binary merkleization under a chunk `limit`, then mix in `num`.
    fn merkleize_with_mixin(&mut self, index: usize, num: u64, limit: u64);

    /// Progressive merkleization of the frame.
    fn merkleize_progressive(&mut self, index: usize);

    /// Progressive merkleization, then mix in `num`.
    fn merkleize_progressive_with_mixin(&mut self, index: usize, num: u64);

    /// Progressive merkleization, then mix in the active-fields bitvector.
    fn merkleize_progressive_with_active_fields(&mut self, index: usize, active_fields: &[u8]);
}
