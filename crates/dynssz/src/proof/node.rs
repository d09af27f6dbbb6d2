// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Merkle tree nodes addressed by generalized index.

use super::{gindex_depth, is_right_at, Multiproof, Proof};
use crate::error::ProofError;
use crate::hash::{hash_pair, zero_hashes};
use std::borrow::Cow;
use std::fmt::{self, Write as _};

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// 32-byte data chunk.
    Leaf,
    /// All-zero subtree of the given depth.
    Zero(usize),
    Branch(Box<Node>, Box<Node>),
}

/// Merkle tree node with its cached hash.
///
/// Generalized indices start at 1 for the root; the children of `i` are
/// `2i` and `2i + 1`. Zero subtrees are stored collapsed and expanded on
/// demand, so any position inside the padded tree can be addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    hash: [u8; 32],
    kind: NodeKind,
}

impl Node {
    pub fn leaf(chunk: [u8; 32]) -> Self {
        Self {
            hash: chunk,
            kind: NodeKind::Leaf,
        }
    }

    pub fn zero(depth: usize) -> Self {
        Self {
            hash: zero_hashes()[depth],
            kind: NodeKind::Zero(depth),
        }
    }

    pub fn branch(left: Node, right: Node) -> Self {
        Self {
            hash: hash_pair(&left.hash, &right.hash),
            kind: NodeKind::Branch(Box::new(left), Box::new(right)),
        }
    }

    /// Leaf value or subtree root.
    pub fn hash(&self) -> [u8; 32] {
        self.hash
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf | NodeKind::Zero(0))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NodeKind::Zero(_))
    }

    /// Left or right child; zero subtrees yield zero children.
    pub fn child(&self, right: bool) -> Option<Cow<'_, Node>> {
        match &self.kind {
            NodeKind::Branch(l, r) => Some(Cow::Borrowed(if right { r } else { l })),
            NodeKind::Zero(depth) if *depth > 0 => Some(Cow::Owned(Node::zero(depth - 1))),
            _ => None,
        }
    }

    pub fn left(&self) -> Option<Cow<'_, Node>> {
        self.child(false)
    }

    pub fn right(&self) -> Option<Cow<'_, Node>> {
        self.child(true)
    }

    /// Node at generalized index `gindex`.
    pub fn get(&self, gindex: u64) -> Result<Cow<'_, Node>, ProofError> {
        if gindex == 0 {
            return Err(ProofError::InvalidIndex(gindex));
        }
        let mut cur = Cow::Borrowed(self);
        for level in (0..gindex_depth(gindex)).rev() {
            let right = is_right_at(gindex, level);
            cur = match cur {
                Cow::Borrowed(node) => node.child(right),
                Cow::Owned(node) => node.child(right).map(|c| Cow::Owned(c.into_owned())),
            }
            .ok_or(ProofError::NodeNotFound(gindex))?;
        }
        Ok(cur)
    }

    /// Single-leaf proof for `gindex`; sibling hashes run leaf to root.
    pub fn prove(&self, gindex: u64) -> Result<Proof, ProofError> {
        if gindex == 0 {
            return Err(ProofError::InvalidIndex(gindex));
        }
        let depth = gindex_depth(gindex);
        let mut hashes = Vec::with_capacity(depth);
        let mut cur = Cow::Borrowed(self);
        for level in (0..depth).rev() {
            let right = is_right_at(gindex, level);
            let sibling = cur
                .child(!right)
                .ok_or(ProofError::NodeNotFound(gindex))?
                .hash;
            hashes.push(sibling);
            cur = match cur {
                Cow::Borrowed(node) => node.child(right),
                Cow::Owned(node) => node.child(right).map(|c| Cow::Owned(c.into_owned())),
            }
            .ok_or(ProofError::NodeNotFound(gindex))?;
        }
        hashes.reverse();
        Ok(Proof {
            index: gindex,
            leaf: cur.hash,
            hashes,
        })
    }

    /// Shared proof for several leaves.
    pub fn prove_multi(&self, indices: &[u64]) -> Result<Multiproof, ProofError> {
        let required = super::required_indices(indices);
        let leaves = indices
            .iter()
            .map(|gi| self.get(*gi).map(|n| n.hash))
            .collect::<Result<Vec<_>, _>>()?;
        let hashes = required
            .iter()
            .map(|gi| self.get(*gi).map(|n| n.hash))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Multiproof {
            indices: indices.to_vec(),
            leaves,
            hashes,
        })
    }

    /// Indented dump of the tree down to `max_depth` levels (`0` = all).
    pub fn render(&self, max_depth: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, max_depth, 1);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize, max_depth: usize, gindex: u64) {
        let pad = "  ".repeat(depth);
        let _ = writeln!(out, "{}INDEX: {}", pad, gindex);
        match &self.kind {
            NodeKind::Leaf => {
                let _ = writeln!(out, "{}VALUE: {}", pad, hex(&self.hash));
            }
            NodeKind::Zero(level) => {
                let _ = writeln!(out, "{}EMPTY: depth {}", pad, level);
            }
            NodeKind::Branch(left, right) => {
                let _ = writeln!(out, "{}HASH: {}", pad, hex(&self.hash));
                if max_depth > 0 && depth == max_depth {
                    let _ = writeln!(out, "{}...", pad);
                    return;
                }
                left.render_into(out, depth + 1, max_depth, gindex * 2);
                right.render_into(out, depth + 1, max_depth, gindex * 2 + 1);
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        // 1 -> (2 -> (4, 5), 3 = zero depth 1)
        Node::branch(
            Node::branch(Node::leaf([1; 32]), Node::leaf([2; 32])),
            Node::zero(1),
        )
    }

    #[test]
    fn test_branch_hash() {
        let tree = sample();
        let left = hash_pair(&[1; 32], &[2; 32]);
        assert_eq!(tree.hash(), hash_pair(&left, &zero_hashes()[1]));
    }

    #[test]
    fn test_get_by_gindex() {
        let tree = sample();
        assert_eq!(tree.get(1).unwrap().hash(), tree.hash());
        assert_eq!(tree.get(4).unwrap().hash(), [1; 32]);
        assert_eq!(tree.get(5).unwrap().hash(), [2; 32]);
        // inside the collapsed zero subtree
        assert_eq!(tree.get(7).unwrap().hash(), [0; 32]);
        assert!(tree.get(7).unwrap().is_empty());
        assert!(matches!(tree.get(8), Err(ProofError::NodeNotFound(8))));
        assert!(matches!(tree.get(0), Err(ProofError::InvalidIndex(0))));
    }

    #[test]
    fn test_prove_collects_siblings_bottom_up() {
        let tree = sample();
        let proof = tree.prove(5).unwrap();
        assert_eq!(proof.leaf, [2; 32]);
        assert_eq!(proof.hashes, vec![[1; 32], zero_hashes()[1]]);

        let proof = tree.prove(6).unwrap();
        assert_eq!(proof.leaf, [0; 32]);
        assert_eq!(proof.hashes, vec![[0; 32], tree.get(2).unwrap().hash()]);
    }

    #[test]
    fn test_render() {
        let text = sample().render(1);
        assert!(text.starts_with("INDEX: 1\nHASH: "));
        assert!(text.contains("  INDEX: 3\n  EMPTY: depth 1"));
        assert!(text.contains("  ...\n"));
        assert!(!text.contains("INDEX: 4"));
    }
}
