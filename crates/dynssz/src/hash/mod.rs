// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SSZ merkleization.
//!
//! # Features
//!
//! - **HashWalker**: chunk accumulator interface driven by the tree-root walk
//! - **Hasher**: walker that keeps only chunk bytes and yields the root
//! - **hash_tree_root**: descriptor-driven walk over a value
//!
//! Binary trees are padded to a power of two with precomputed zero-subtree
//! roots. Progressive trees split chunks into subtrees of 1, 4, 16, ...
//! chunks so appending never reshapes the committed prefix.

mod hasher;
mod tree_root;
mod walker;

pub use hasher::Hasher;
pub use tree_root::{hash_tree_root, hash_tree_root_with};
pub(crate) use tree_root::{root_with_bounds, walk_with_bounds};
pub use walker::HashWalker;

use ring::digest::{digest, SHA256};
use std::sync::OnceLock;

/// Size of a Merkle chunk.
pub const BYTES_PER_CHUNK: usize = 32;

/// Deepest supported tree.
pub const MAX_DEPTH: usize = 64;

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = digest(&SHA256, data);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_ref());
    out
}

/// Hash of two concatenated chunks.
pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(left);
    input[32..].copy_from_slice(right);
    sha256(&input)
}

/// Roots of all-zero subtrees: `zero_hashes()[d]` has depth `d`.
pub fn zero_hashes() -> &'static [[u8; 32]; MAX_DEPTH + 1] {
    static ZERO_HASHES: OnceLock<[[u8; 32]; MAX_DEPTH + 1]> = OnceLock::new();
    ZERO_HASHES.get_or_init(|| {
        let mut hashes = [[0u8; 32]; MAX_DEPTH + 1];
        for depth in 1..=MAX_DEPTH {
            hashes[depth] = hash_pair(&hashes[depth - 1], &hashes[depth - 1]);
        }
        hashes
    })
}

/// Tree depth needed to hold `limit` chunks.
pub fn depth_for(limit: u64) -> usize {
    if limit <= 1 {
        return 0;
    }
    (64 - (limit - 1).leading_zeros()) as usize
}

/// Chunk limit of a basic-element list with `max` elements of `item_size` bytes.
pub fn calculate_limit(max: u64, num_items: u64, item_size: u64) -> u64 {
    let limit = max.saturating_mul(item_size).div_ceil(32);
    if limit != 0 {
        return limit;
    }
    if num_items == 0 {
        1
    } else {
        num_items
    }
}

/// Number of chunks a byte run occupies.
pub fn chunk_count(len: usize) -> u64 {
    len.div_ceil(BYTES_PER_CHUNK) as u64
}

/// Split a bitlist into its bit payload (marker removed, trailing zero
/// bytes dropped) and bit length. `None` when the marker is missing.
pub fn parse_bitlist(bytes: &[u8]) -> Option<(Vec<u8>, u64)> {
    let last = *bytes.last()?;
    if last == 0 {
        return None;
    }
    let msb = 7 - last.leading_zeros() as u64;
    let size = 8 * (bytes.len() as u64 - 1) + msb;

    let mut payload = bytes.to_vec();
    if let Some(tail) = payload.last_mut() {
        *tail &= !(1u8 << msb);
    }
    while payload.last() == Some(&0) {
        payload.pop();
    }
    Some((payload, size))
}

/// Little-endian length chunk used by mixins.
pub(crate) fn length_chunk(num: u64) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&num.to_le_bytes());
    chunk
}

/// Zero-pad a byte run to one 32-byte chunk.
pub(crate) fn chunk_from(bytes: &[u8]) -> [u8; 32] {
    let mut chunk = [0u8; 32];
    let n = bytes.len().min(32);
    chunk[..n].copy_from_slice(&bytes[..n]);
    chunk
}

/// Binary merkleization of packed chunks under a chunk `limit`
/// (`0` = sized to the content).
pub(crate) fn merkleize_chunks(chunks: &[u8], limit: u64) -> [u8; 32] {
    let count = chunk_count(chunks.len());
    let limit = if limit == 0 { count } else { limit };
    if limit == 0 {
        return [0u8; 32];
    }

    let depth = depth_for(limit);
    let zero = zero_hashes();
    if chunks.is_empty() {
        return zero[depth];
    }

    let mut layer: Vec<[u8; 32]> = chunks.chunks(BYTES_PER_CHUNK).map(chunk_from).collect();
    for level in 0..depth {
        if layer.len() % 2 == 1 {
            layer.push(zero[level]);
        }
        layer = layer
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }
    layer[0]
}

/// Progressive merkleization (`subtree_fill_progressive`).
pub(crate) fn merkleize_progressive_chunks(chunks: &[u8], depth: u32) -> [u8; 32] {
    if chunks.is_empty() {
        return [0u8; 32];
    }

    let base = BYTES_PER_CHUNK << (2 * depth);
    let split = chunks.len().min(base);
    let right = merkleize_chunks(&chunks[..split], 1u64 << (2 * depth));
    let left = if split == chunks.len() {
        [0u8; 32]
    } else {
        merkleize_progressive_chunks(&chunks[split..], depth + 1)
    };
    hash_pair(&left, &right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex_string(&sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_zero_hashes_chain() {
        let zero = zero_hashes();
        assert_eq!(zero[0], [0u8; 32]);
        assert_eq!(zero[1], sha256(&[0u8; 64]));
        assert_eq!(zero[2], hash_pair(&zero[1], &zero[1]));
    }

    #[test]
    fn test_depth_for() {
        assert_eq!(depth_for(0), 0);
        assert_eq!(depth_for(1), 0);
        assert_eq!(depth_for(2), 1);
        assert_eq!(depth_for(3), 2);
        assert_eq!(depth_for(4), 2);
        assert_eq!(depth_for(5), 3);
        assert_eq!(depth_for(1 << 40), 40);
    }

    #[test]
    fn test_calculate_limit() {
        assert_eq!(calculate_limit(4, 3, 1), 1);
        assert_eq!(calculate_limit(100, 3, 8), 25);
        assert_eq!(calculate_limit(0, 0, 8), 1);
        assert_eq!(calculate_limit(0, 5, 8), 5);
    }

    #[test]
    fn test_parse_bitlist() {
        assert_eq!(parse_bitlist(&[0x01]), Some((vec![], 0)));
        assert_eq!(parse_bitlist(&[0x0d]), Some((vec![0x05], 3)));
        assert_eq!(parse_bitlist(&[0xff, 0x01]), Some((vec![0xff], 8)));
        assert_eq!(parse_bitlist(&[0x00, 0x02]), Some((vec![], 9)));
        assert_eq!(parse_bitlist(&[0x05, 0x00]), None);
        assert_eq!(parse_bitlist(&[]), None);
    }

    #[test]
    fn test_merkleize_chunks() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let mut both = a.to_vec();
        both.extend_from_slice(&b);

        assert_eq!(merkleize_chunks(&[], 0), [0u8; 32]);
        assert_eq!(merkleize_chunks(&a, 0), a);
        assert_eq!(merkleize_chunks(&both, 0), hash_pair(&a, &b));
        assert_eq!(
            merkleize_chunks(&both, 4),
            hash_pair(&hash_pair(&a, &b), &zero_hashes()[1])
        );
        assert_eq!(merkleize_chunks(&[], 4), zero_hashes()[2]);
        // short input is padded to a whole chunk
        assert_eq!(merkleize_chunks(&[7], 0), chunk_from(&[7]));
    }

    #[test]
    fn test_progressive_layout() {
        let chunks: Vec<[u8; 32]> = (1..=6u8).map(|i| [i; 32]).collect();
        let flat: Vec<u8> = chunks.iter().flatten().copied().collect();

        // 1 chunk right, then 4, then the remaining 1 in a 16-wide subtree.
        let level2 = hash_pair(&[0u8; 32], &merkleize_chunks(&flat[5 * 32..], 16));
        let level1 = hash_pair(&level2, &merkleize_chunks(&flat[32..5 * 32], 4));
        let expected = hash_pair(&level1, &chunks[0]);
        assert_eq!(merkleize_progressive_chunks(&flat, 0), expected);

        assert_eq!(
            merkleize_progressive_chunks(&chunks[0], 0),
            hash_pair(&[0u8; 32], &chunks[0])
        );
    }

    fn hex_string(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
