// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Root-only hash walker.

use super::{
    chunk_from, hash_pair, length_chunk, merkleize_chunks, merkleize_progressive_chunks,
    HashWalker, BYTES_PER_CHUNK,
};

/// Accumulates chunk bytes; every closed frame collapses to its 32-byte root.
#[derive(Debug, Default)]
pub struct Hasher {
    buf: Vec<u8>,
}

impl Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Final root, available once the walk left exactly one chunk.
    pub fn hash_root(&self) -> Option<[u8; 32]> {
        if self.buf.len() != BYTES_PER_CHUNK {
            return None;
        }
        let mut root = [0u8; 32];
        root.copy_from_slice(&self.buf);
        Some(root)
    }

    fn replace_frame(&mut self, index: usize, root: [u8; 32]) {
        self.buf.truncate(index);
        self.buf.extend_from_slice(&root);
    }
}

impl HashWalker for Hasher {
    fn index(&self) -> usize {
        self.buf.len()
    }

    fn append_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    fn append_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn append_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn append_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn append_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn append_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    fn fill_up_to_32(&mut self) {
        let rest = self.buf.len() % BYTES_PER_CHUNK;
        if rest != 0 {
            self.buf.resize(self.buf.len() + BYTES_PER_CHUNK - rest, 0);
        }
    }

    fn merkleize(&mut self, index: usize) {
        let root = merkleize_chunks(&self.buf[index..], 0);
        self.replace_frame(index, root);
    }

    fn merkleize_with_mixin(&mut self, index: usize, num: u64, limit: u64) {
        self.fill_up_to_32();
        let root = merkleize_chunks(&self.buf[index..], limit);
        self.replace_frame(index, hash_pair(&root, &length_chunk(num)));
    }

    fn merkleize_progressive(&mut self, index: usize) {
        self.fill_up_to_32();
        let root = merkleize_progressive_chunks(&self.buf[index..], 0);
        self.replace_frame(index, root);
    }

    fn merkleize_progressive_with_mixin(&mut self, index: usize, num: u64) {
        self.fill_up_to_32();
        let root = merkleize_progressive_chunks(&self.buf[index..], 0);
        self.replace_frame(index, hash_pair(&root, &length_chunk(num)));
    }

    fn merkleize_progressive_with_active_fields(&mut self, index: usize, active_fields: &[u8]) {
        self.fill_up_to_32();
        let root = merkleize_progressive_chunks(&self.buf[index..], 0);
        self.replace_frame(index, hash_pair(&root, &chunk_from(active_fields)));
    }
}
