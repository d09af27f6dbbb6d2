// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Merkle proofs over SSZ values.
//!
//! # Features
//!
//! - **TreeBuilder**: hash walker that records the whole Merkle tree
//! - **Node**: tree navigation by generalized index
//! - **Proof / Multiproof**: single and shared branch proofs
//! - **verify_proof / verify_multiproof**: standalone verification
//!
//! The tree is produced by the same descriptor walk as
//! [`crate::hash::hash_tree_root`], so its root always equals the value's
//! hash tree root.

mod builder;
mod node;

pub use builder::TreeBuilder;
pub use node::{Node, NodeKind};

use crate::codec::Bounds;
use crate::error::{HashError, ProofError};
use crate::hash::{hash_pair, walk_with_bounds, zero_hashes, MAX_DEPTH};
use crate::spec::SpecResolver;
use crate::types::TypeDescriptor;
use crate::value::SszValue;
use std::collections::{BTreeSet, HashMap};

/// Branch proof for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Generalized index of the proven node.
    pub index: u64,
    pub leaf: [u8; 32],
    /// Sibling hashes from the leaf up to the root.
    pub hashes: Vec<[u8; 32]>,
}

/// Proof for several nodes sharing their helper hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiproof {
    pub indices: Vec<u64>,
    /// Leaf values in `indices` order.
    pub leaves: Vec<[u8; 32]>,
    /// Helper hashes ordered by descending generalized index.
    pub hashes: Vec<[u8; 32]>,
}

/// Multiproof with zero-subtree hashes replaced by their depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedMultiproof {
    pub indices: Vec<u64>,
    pub leaves: Vec<[u8; 32]>,
    /// `None` where a zero hash was omitted.
    pub hashes: Vec<Option<[u8; 32]>>,
    /// Depth of every omitted zero hash, in order.
    pub zero_levels: Vec<usize>,
}

impl Multiproof {
    pub fn compress(&self) -> CompressedMultiproof {
        let mut hashes = Vec::with_capacity(self.hashes.len());
        let mut zero_levels = Vec::new();
        for hash in &self.hashes {
            match zero_level(hash) {
                Some(level) => {
                    zero_levels.push(level);
                    hashes.push(None);
                }
                None => hashes.push(Some(*hash)),
            }
        }
        CompressedMultiproof {
            indices: self.indices.clone(),
            leaves: self.leaves.clone(),
            hashes,
            zero_levels,
        }
    }
}

impl CompressedMultiproof {
    pub fn decompress(&self) -> Result<Multiproof, ProofError> {
        let mut levels = self.zero_levels.iter();
        let hashes = self
            .hashes
            .iter()
            .map(|hash| match hash {
                Some(hash) => Ok(*hash),
                None => levels
                    .next()
                    .filter(|level| **level <= MAX_DEPTH)
                    .map(|level| zero_hashes()[*level])
                    .ok_or_else(|| ProofError::Malformed("zero level missing".into())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Multiproof {
            indices: self.indices.clone(),
            leaves: self.leaves.clone(),
            hashes,
        })
    }
}

fn zero_level(hash: &[u8; 32]) -> Option<usize> {
    zero_hashes().iter().position(|z| z == hash)
}

/// Merkle tree of `value`.
pub fn proof_tree(
    desc: &TypeDescriptor,
    value: &SszValue,
    resolver: &dyn SpecResolver,
) -> Result<Node, ProofError> {
    tree_with_bounds(desc, value, &Bounds::new(resolver, false))
}

pub(crate) fn tree_with_bounds(
    desc: &TypeDescriptor,
    value: &SszValue,
    bounds: &Bounds<'_>,
) -> Result<Node, ProofError> {
    let mut builder = TreeBuilder::new();
    walk_with_bounds(&mut builder, desc, value, bounds)?;
    builder
        .into_node()
        .ok_or_else(|| ProofError::Hash(HashError::Custom("walk left no single root".into())))
}

/// Number of edges between the root and `gindex`.
pub(crate) fn gindex_depth(gindex: u64) -> usize {
    63usize.saturating_sub(gindex.leading_zeros() as usize)
}

/// Whether the path to `gindex` turns right `level` edges above it.
pub(crate) fn is_right_at(gindex: u64, level: usize) -> bool {
    gindex & (1 << level) != 0
}

/// `base` moved `depth` levels down the leftmost path.
fn descend(base: u64, depth: usize) -> Result<u64, ProofError> {
    if (base.leading_zeros() as usize) < depth {
        return Err(ProofError::IndexOverflow);
    }
    base.checked_shl(depth as u32).ok_or(ProofError::IndexOverflow)
}

/// Generalized index of a child `index` in a subtree of `2^depth` leaves
/// rooted at `parent`.
pub fn child_gindex(parent: u64, depth: usize, index: u64) -> Result<u64, ProofError> {
    if parent == 0 {
        return Err(ProofError::InvalidIndex(parent));
    }
    let width = 1u64.checked_shl(depth as u32).unwrap_or(0);
    if depth >= 64 || index >= width {
        return Err(ProofError::IndexOverflow);
    }
    Ok(descend(parent, depth)? | index)
}

/// Concatenate generalized indices along a path from the root.
pub fn concat_gindices(path: &[u64]) -> Result<u64, ProofError> {
    path.iter().try_fold(1u64, |acc, &gi| {
        if gi == 0 {
            return Err(ProofError::InvalidIndex(gi));
        }
        let depth = gindex_depth(gi);
        Ok(descend(acc, depth)? | (gi ^ (1 << depth)))
    })
}

/// Helper indices needed to verify `leaves`, in descending order.
pub(crate) fn required_indices(leaves: &[u64]) -> Vec<u64> {
    let leaf_set: BTreeSet<u64> = leaves.iter().copied().collect();
    let mut required = BTreeSet::new();
    let mut computed = BTreeSet::new();
    for leaf in &leaf_set {
        let mut cur = *leaf;
        while cur > 1 {
            let sibling = cur ^ 1;
            if !leaf_set.contains(&sibling) {
                required.insert(sibling);
            }
            cur >>= 1;
            computed.insert(cur);
        }
    }
    required
        .into_iter()
        .rev()
        .filter(|index| !computed.contains(index))
        .collect()
}

/// Check a single branch proof against `root`.
pub fn verify_proof(root: &[u8; 32], proof: &Proof) -> Result<bool, ProofError> {
    if proof.index == 0 {
        return Err(ProofError::InvalidIndex(0));
    }
    if proof.hashes.len() != gindex_depth(proof.index) {
        return Err(ProofError::Malformed(format!(
            "{} hashes for a path of length {}",
            proof.hashes.len(),
            gindex_depth(proof.index)
        )));
    }
    let mut node = proof.leaf;
    for (level, sibling) in proof.hashes.iter().enumerate() {
        node = if is_right_at(proof.index, level) {
            hash_pair(sibling, &node)
        } else {
            hash_pair(&node, sibling)
        };
    }
    Ok(&node == root)
}

/// Check a multiproof against `root`.
pub fn verify_multiproof(root: &[u8; 32], proof: &Multiproof) -> Result<bool, ProofError> {
    if proof.indices.is_empty() {
        return Err(ProofError::Malformed("no indices".into()));
    }
    if proof.indices.len() != proof.leaves.len() {
        return Err(ProofError::Malformed(
            "number of leaves and indices mismatch".into(),
        ));
    }
    if let Some(index) = proof.indices.iter().find(|gi| **gi == 0) {
        return Err(ProofError::InvalidIndex(*index));
    }
    let helpers = required_indices(&proof.indices);
    if helpers.len() != proof.hashes.len() {
        return Err(ProofError::Malformed(format!(
            "{} proof hashes for {} required indices",
            proof.hashes.len(),
            helpers.len()
        )));
    }

    let mut db: HashMap<u64, [u8; 32]> = HashMap::new();
    for (index, leaf) in proof.indices.iter().zip(&proof.leaves) {
        db.insert(*index, *leaf);
    }
    for (index, hash) in helpers.iter().zip(&proof.hashes) {
        db.insert(*index, *hash);
    }

    // Walk known positions from the deepest up; parents join the queue.
    let mut pending: BTreeSet<u64> = db.keys().copied().collect();
    while let Some(index) = pending.pop_last() {
        if index == 1 {
            break;
        }
        let parent = index >> 1;
        if db.contains_key(&parent) {
            continue;
        }
        let left = index & !1;
        let (Some(l), Some(r)) = (db.get(&left), db.get(&(left | 1))) else {
            return Err(ProofError::Malformed(format!(
                "proof is missing node {} or {}",
                left,
                left | 1
            )));
        };
        let hash = hash_pair(l, r);
        db.insert(parent, hash);
        pending.insert(parent);
    }

    match db.get(&1) {
        Some(computed) => Ok(computed == root),
        None => Err(ProofError::Malformed("root was not computed".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        let leaves: Vec<Node> = (1..=5u8).map(|i| Node::leaf([i; 32])).collect();
        builder::binary_tree(leaves, 8)
    }

    #[test]
    fn test_gindex_helpers() {
        assert_eq!(gindex_depth(1), 0);
        assert_eq!(gindex_depth(2), 1);
        assert_eq!(gindex_depth(13), 3);
        assert_eq!(child_gindex(1, 3, 2).unwrap(), 10);
        assert_eq!(concat_gindices(&[2, 5]).unwrap(), 9);
        assert_eq!(concat_gindices(&[3, 2, 7]).unwrap(), 27);
        assert_eq!(concat_gindices(&[]).unwrap(), 1);
    }

    #[test]
    fn test_gindex_helpers_reject_bad_input() {
        assert_eq!(gindex_depth(0), 0);
        assert!(matches!(concat_gindices(&[0]), Err(ProofError::InvalidIndex(0))));
        assert!(matches!(concat_gindices(&[2, 0]), Err(ProofError::InvalidIndex(0))));
        assert!(matches!(child_gindex(0, 3, 1), Err(ProofError::InvalidIndex(0))));
        assert!(matches!(child_gindex(1, 3, 8), Err(ProofError::IndexOverflow)));
        assert!(matches!(child_gindex(1, 64, 0), Err(ProofError::IndexOverflow)));

        // 1 << 63 is the deepest leftmost node a u64 can address
        assert_eq!(child_gindex(1, 63, 0).unwrap(), 1 << 63);
        assert!(matches!(child_gindex(2, 63, 0), Err(ProofError::IndexOverflow)));
        assert!(matches!(
            concat_gindices(&[1 << 40, 1 << 30]),
            Err(ProofError::IndexOverflow)
        ));
    }

    #[test]
    fn test_required_indices() {
        assert_eq!(required_indices(&[8]), vec![9, 5, 3]);
        assert_eq!(required_indices(&[8, 9]), vec![5, 3]);
        assert_eq!(required_indices(&[8, 14]), vec![15, 9, 6, 5]);
    }

    #[test]
    fn test_single_proofs_verify() {
        let tree = tree();
        let root = tree.hash();
        for gindex in 1..16u64 {
            let proof = tree.prove(gindex).unwrap();
            assert!(verify_proof(&root, &proof).unwrap(), "gindex {}", gindex);
        }

        let mut bad = tree.prove(10).unwrap();
        bad.leaf = [9; 32];
        assert!(!verify_proof(&root, &bad).unwrap());
        bad.hashes.pop();
        assert!(verify_proof(&root, &bad).is_err());
    }

    #[test]
    fn test_multiproof_roundtrip() {
        let tree = tree();
        let root = tree.hash();
        let proof = tree.prove_multi(&[8, 12, 14]).unwrap();
        assert_eq!(proof.hashes.len(), required_indices(&[8, 12, 14]).len());
        assert!(verify_multiproof(&root, &proof).unwrap());

        let compressed = proof.compress();
        // helpers 13 and 15 are zero padding
        assert!(!compressed.zero_levels.is_empty());
        assert_eq!(compressed.decompress().unwrap(), proof);

        let mut bad = proof.clone();
        bad.leaves[0] = [0xaa; 32];
        assert!(!verify_multiproof(&root, &bad).unwrap());

        bad.hashes.pop();
        assert!(verify_multiproof(&root, &bad).is_err());
    }
}
