// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic

//! Merkle tree and proof integration tests
//!
//! Trees are built from real annotated types; every proof must verify
//! against the value's hash tree root.

use dynssz::hash::{hash_pair, zero_hashes};
use dynssz::proof::{child_gindex, concat_gindices};
use dynssz::{verify_multiproof, verify_proof, DynSsz, Error, ProofError, SpecValues, Ssz};

#[derive(Debug, Clone, PartialEq, Default, Ssz)]
struct Header {
    slot: u64,
    proposer_index: u64,
    #[ssz(size = "32")]
    parent_root: Vec<u8>,
    #[ssz(size = "32")]
    state_root: Vec<u8>,
    #[ssz(size = "32")]
    body_root: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Ssz)]
struct Body {
    header: Header,
    #[ssz(max = "16", dyn_max = "MAX_DEPOSITS")]
    deposits: Vec<u64>,
}

fn header() -> Header {
    Header {
        slot: 11,
        proposer_index: 3,
        parent_root: vec![1; 32],
        state_root: vec![2; 32],
        body_root: vec![3; 32],
    }
}

#[test]
fn test_tree_root_matches_hash_tree_root() {
    let ssz = DynSsz::new();
    let body = Body {
        header: header(),
        deposits: vec![5, 6, 7],
    };
    let tree = ssz.proof_tree(&body).unwrap();
    assert_eq!(tree.hash(), ssz.hash_tree_root(&body).unwrap());

    let header_tree = ssz.proof_tree(&body.header).unwrap();
    assert_eq!(tree.get(2).unwrap().hash(), header_tree.hash());
}

#[test]
fn test_field_leaves_by_gindex() {
    let ssz = DynSsz::new();
    let tree = ssz.proof_tree(&header()).unwrap();

    // five fields pad to eight leaves: field i sits at 8 + i
    let mut slot = [0u8; 32];
    slot[0] = 11;
    assert_eq!(tree.get(child_gindex(1, 3, 0).unwrap()).unwrap().hash(), slot);
    assert_eq!(tree.get(10).unwrap().hash(), [1; 32]);
    assert_eq!(tree.get(12).unwrap().hash(), [3; 32]);
    // padding leaves
    assert!(tree.get(13).unwrap().is_empty());
    assert_eq!(tree.get(7).unwrap().hash(), zero_hashes()[1]);
}

#[test]
fn test_single_proof_verifies() {
    let ssz = DynSsz::new();
    let value = header();
    let root = ssz.hash_tree_root(&value).unwrap();
    let tree = ssz.proof_tree(&value).unwrap();

    for gindex in 8..13 {
        let proof = tree.prove(gindex).unwrap();
        assert_eq!(proof.hashes.len(), 3);
        assert!(verify_proof(&root, &proof).unwrap(), "gindex {}", gindex);
    }

    let mut forged = tree.prove(10).unwrap();
    forged.leaf = [9; 32];
    assert!(!verify_proof(&root, &forged).unwrap());
}

#[test]
fn test_nested_list_element_proof() {
    let ssz = DynSsz::with_specs(SpecValues::new().with("MAX_DEPOSITS", 16));
    let body = Body {
        header: header(),
        deposits: vec![5, 6, 7, 8, 9],
    };
    let root = ssz.hash_tree_root(&body).unwrap();
    let tree = ssz.proof_tree(&body).unwrap();

    // deposits field (3), list data (2), second chunk of a 4-chunk tree (5)
    let gindex = concat_gindices(&[3, 2, 5]).unwrap();
    assert_eq!(gindex, 25);
    let node = tree.get(gindex).unwrap();
    let mut expected = [0u8; 32];
    expected[..8].copy_from_slice(&9u64.to_le_bytes());
    assert_eq!(node.hash(), expected);

    // length mixin
    let mut length = [0u8; 32];
    length[0] = 5;
    assert_eq!(tree.get(7).unwrap().hash(), length);

    let proof = tree.prove(gindex).unwrap();
    assert!(verify_proof(&root, &proof).unwrap());
}

#[test]
fn test_multiproof() {
    let ssz = DynSsz::new();
    let value = header();
    let root = ssz.hash_tree_root(&value).unwrap();
    let tree = ssz.proof_tree(&value).unwrap();

    let proof = tree.prove_multi(&[8, 9, 12]).unwrap();
    assert_eq!(proof.leaves.len(), 3);
    assert!(verify_multiproof(&root, &proof).unwrap());

    let compressed = proof.compress();
    assert_eq!(compressed.decompress().unwrap(), proof);

    let mut forged = proof.clone();
    forged.leaves[2] = [0; 32];
    assert!(!verify_multiproof(&root, &forged).unwrap());
}

#[test]
fn test_invalid_gindex() {
    let ssz = DynSsz::new();
    let tree = ssz.proof_tree(&header()).unwrap();
    assert!(matches!(tree.get(0), Err(ProofError::InvalidIndex(0))));
    assert!(matches!(
        tree.prove(64),
        Err(ProofError::NodeNotFound(64))
    ));
    assert!(matches!(concat_gindices(&[3, 0]), Err(ProofError::InvalidIndex(0))));
    assert!(matches!(child_gindex(1 << 62, 8, 0), Err(ProofError::IndexOverflow)));
}

#[test]
fn test_dynamic_value_tree() {
    let ssz = DynSsz::new();
    let desc = ssz.descriptor_of::<Header>().unwrap();
    let value = dynssz::SszType::to_ssz_value(&header());
    let tree = ssz.proof_tree_value(&desc, &value).unwrap();
    assert_eq!(tree.hash(), ssz.hash_tree_root_value(&desc, &value).unwrap());

    // wrong value shape is reported, not panicked on
    let bad = dynssz::SszValue::Uint64(1);
    assert!(matches!(
        ssz.proof_tree_value(&desc, &bad),
        Err(Error::Proof(_))
    ));
}

#[test]
fn test_render_lists_root() {
    let ssz = DynSsz::new();
    let tree = ssz.proof_tree(&header()).unwrap();
    let text = tree.render(1);
    assert!(text.starts_with("INDEX: 1\nHASH: "));
    assert!(text.contains("  INDEX: 2\n"));

    let expected_root = hash_pair(&tree.get(2).unwrap().hash(), &tree.get(3).unwrap().hash());
    assert_eq!(tree.hash(), expected_root);
}
