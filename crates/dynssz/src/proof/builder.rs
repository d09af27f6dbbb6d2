// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hash walker that keeps the full node tree.

use super::Node;
use crate::hash::{chunk_from, depth_for, length_chunk, HashWalker, BYTES_PER_CHUNK};
use std::collections::BTreeMap;

/// Builds a [`Node`] tree while the tree-root walk runs.
///
/// Chunk bytes accumulate exactly as in [`crate::hash::Hasher`]; every
/// closed frame additionally records its subtree under the frame's byte
/// offset, so enclosing frames pick up real subtrees instead of bare roots.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    buf: Vec<u8>,
    subtrees: BTreeMap<usize, Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished tree, available once the walk left exactly one chunk.
    pub fn into_node(mut self) -> Option<Node> {
        if self.buf.len() != BYTES_PER_CHUNK {
            return None;
        }
        Some(self.take_frame(0).pop().unwrap_or_else(|| Node::zero(0)))
    }

    /// Nodes of every chunk from `index` on, consuming recorded subtrees.
    fn take_frame(&mut self, index: usize) -> Vec<Node> {
        let mut recorded = self.subtrees.split_off(&index);
        let end = self.buf.len();
        let mut nodes = Vec::with_capacity((end - index).div_ceil(BYTES_PER_CHUNK));
        let mut offset = index;
        while offset < end {
            let node = recorded.remove(&offset).unwrap_or_else(|| {
                let stop = (offset + BYTES_PER_CHUNK).min(end);
                Node::leaf(chunk_from(&self.buf[offset..stop]))
            });
            nodes.push(node);
            offset += BYTES_PER_CHUNK;
        }
        nodes
    }

    fn replace_frame(&mut self, index: usize, node: Node) {
        self.buf.truncate(index);
        self.buf.extend_from_slice(&node.hash());
        self.subtrees.insert(index, node);
    }

    fn pad_frame(&mut self) {
        let rest = self.buf.len() % BYTES_PER_CHUNK;
        if rest != 0 {
            self.buf.resize(self.buf.len() + BYTES_PER_CHUNK - rest, 0);
        }
    }
}

/// Binary tree over `nodes` padded to `limit` leaves (`0` = sized to the
/// content).
pub(crate) fn binary_tree(nodes: Vec<Node>, limit: u64) -> Node {
    let limit = if limit == 0 { nodes.len() as u64 } else { limit };
    if limit == 0 {
        return Node::zero(0);
    }
    let depth = depth_for(limit);
    if nodes.is_empty() {
        return Node::zero(depth);
    }

    let mut layer = nodes;
    for level in 0..depth {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut iter = layer.into_iter();
        while let Some(left) = iter.next() {
            let right = iter.next().unwrap_or_else(|| Node::zero(level));
            next.push(Node::branch(left, right));
        }
        layer = next;
    }
    layer.into_iter().next().unwrap_or_else(|| Node::zero(depth))
}

/// Progressive tree: subtrees of 1, 4, 16, ... leaves on the right, the
/// remainder recursing to the left.
pub(crate) fn progressive_tree(mut nodes: Vec<Node>, depth: u32) -> Node {
    if nodes.is_empty() {
        return Node::zero(0);
    }
    let base = 1usize << (2 * depth);
    let rest = nodes.split_off(base.min(nodes.len()));
    let right = binary_tree(nodes, base as u64);
    let left = if rest.is_empty() {
        Node::zero(0)
    } else {
        progressive_tree(rest, depth + 1)
    };
    Node::branch(left, right)
}

impl HashWalker for TreeBuilder {
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
        self.pad_frame();
    }

    fn merkleize(&mut self, index: usize) {
        let nodes = self.take_frame(index);
        self.replace_frame(index, binary_tree(nodes, 0));
    }

    fn merkleize_with_mixin(&mut self, index: usize, num: u64, limit: u64) {
        self.pad_frame();
        let nodes = self.take_frame(index);
        let body = binary_tree(nodes, limit);
        self.replace_frame(index, Node::branch(body, Node::leaf(length_chunk(num))));
    }

    fn merkleize_progressive(&mut self, index: usize) {
        self.pad_frame();
        let nodes = self.take_frame(index);
        self.replace_frame(index, progressive_tree(nodes, 0));
    }

    fn merkleize_progressive_with_mixin(&mut self, index: usize, num: u64) {
        self.pad_frame();
        let nodes = self.take_frame(index);
        let body = progressive_tree(nodes, 0);
        self.replace_frame(index, Node::branch(body, Node::leaf(length_chunk(num))));
    }

    fn merkleize_progressive_with_active_fields(&mut self, index: usize, active_fields: &[u8]) {
        self.pad_frame();
        let nodes = self.take_frame(index);
        let body = progressive_tree(nodes, 0);
        self.replace_frame(index, Node::branch(body, Node::leaf(chunk_from(active_fields))));
    }
}
