// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Randomised round trips
//!
//! Random values of nested dynamic types must survive encode/decode, keep
//! their size prediction, and hash identically through the typed and the
//! dynamic-value entry points.

use dynssz::{BitList, DynSsz, SpecValues, Ssz, SszType};

#[derive(Debug, Clone, PartialEq, Default, Ssz)]
struct Validator {
    #[ssz(size = "48")]
    pubkey: Vec<u8>,
    effective_balance: u64,
    slashed: bool,
    activation_epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Ssz)]
struct Committee {
    index: u16,
    #[ssz(max = "64", dyn_max = "MAX_MEMBERS")]
    members: Vec<u32>,
    #[ssz(max = "64", dyn_max = "MAX_MEMBERS")]
    participation: BitList,
}

#[derive(Debug, Clone, PartialEq, Default, Ssz)]
struct State {
    slot: u64,
    #[ssz(max = "32")]
    validators: Vec<Validator>,
    #[ssz(max = "8")]
    committees: Vec<Committee>,
    #[ssz(size = "4,32")]
    recent_roots: Vec<Vec<u8>>,
    #[ssz(max = "128")]
    extra: Vec<u8>,
}

fn random_bytes(rng: &mut fastrand::Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.u8(..)).collect()
}

fn random_validator(rng: &mut fastrand::Rng) -> Validator {
    Validator {
        pubkey: random_bytes(rng, 48),
        effective_balance: rng.u64(..),
        slashed: rng.bool(),
        activation_epoch: rng.u64(..1 << 40),
    }
}

fn random_committee(rng: &mut fastrand::Rng, max_members: usize) -> Committee {
    let n = rng.usize(..=max_members);
    let bits: Vec<bool> = (0..n).map(|_| rng.bool()).collect();
    Committee {
        index: rng.u16(..),
        members: (0..n).map(|_| rng.u32(..)).collect(),
        participation: BitList::from_bools(&bits),
    }
}

fn random_state(rng: &mut fastrand::Rng, max_members: usize) -> State {
    State {
        slot: rng.u64(..),
        validators: (0..rng.usize(..=32)).map(|_| random_validator(rng)).collect(),
        committees: (0..rng.usize(..=8))
            .map(|_| random_committee(rng, max_members))
            .collect(),
        recent_roots: (0..4).map(|_| random_bytes(rng, 32)).collect(),
        extra: {
            let len = rng.usize(..=128);
            random_bytes(rng, len)
        },
    }
}

#[test]
fn test_random_states_roundtrip() {
    let ssz = DynSsz::new();
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for round in 0..64 {
        let state = random_state(&mut rng, 64);
        let bytes = ssz.marshal(&state).unwrap();
        assert_eq!(ssz.size_of(&state).unwrap(), bytes.len(), "round {}", round);

        let back: State = ssz.unmarshal(&bytes).unwrap();
        assert_eq!(back, state, "round {}", round);
        assert_eq!(
            ssz.hash_tree_root(&back).unwrap(),
            ssz.hash_tree_root(&state).unwrap()
        );
    }
}

#[test]
fn test_value_and_typed_paths_agree() {
    let ssz = DynSsz::new();
    let desc = ssz.descriptor_of::<State>().unwrap();
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..16 {
        let state = random_state(&mut rng, 64);
        let value = state.to_ssz_value();

        let typed = ssz.marshal(&state).unwrap();
        let dynamic = ssz.marshal_value(&desc, &value).unwrap();
        assert_eq!(typed, dynamic);

        let decoded = ssz.unmarshal_value(&desc, &typed).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(
            ssz.hash_tree_root_value(&desc, &decoded).unwrap(),
            ssz.hash_tree_root(&state).unwrap()
        );
    }
}

#[test]
fn test_random_states_under_spec_limits() {
    let ssz = DynSsz::with_specs(SpecValues::new().with("MAX_MEMBERS", 16));
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..32 {
        let state = random_state(&mut rng, 16);
        let bytes = ssz.marshal(&state).unwrap();
        assert_eq!(ssz.unmarshal::<State>(&bytes).unwrap(), state);
    }

    let mut state = random_state(&mut rng, 16);
    state.committees = vec![random_committee(&mut rng, 16)];
    state.committees[0].members = vec![0; 17];
    assert!(ssz.marshal(&state).is_err());
}

#[test]
fn test_truncated_input_never_panics() {
    let ssz = DynSsz::new();
    let mut rng = fastrand::Rng::with_seed(99);
    let state = random_state(&mut rng, 64);
    let bytes = ssz.marshal(&state).unwrap();

    for cut in 0..bytes.len() {
        let _ = ssz.unmarshal::<State>(&bytes[..cut]);
    }
    for _ in 0..256 {
        let mut corrupt = bytes.clone();
        let at = rng.usize(..corrupt.len());
        corrupt[at] = rng.u8(..);
        let _ = ssz.unmarshal::<State>(&corrupt);
    }
}

#[test]
fn test_streaming_roundtrip() {
    let ssz = DynSsz::new();
    let mut rng = fastrand::Rng::with_seed(3);
    let state = random_state(&mut rng, 64);

    let mut sink = Vec::new();
    let written = ssz.marshal_writer(&state, &mut sink).unwrap();
    assert_eq!(written, sink.len());

    let back: State = ssz.unmarshal_reader(sink.as_slice(), written).unwrap();
    assert_eq!(back, state);
}
