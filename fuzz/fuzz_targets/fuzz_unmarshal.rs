// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use dynssz::{BitList, DynSsz, Ssz};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Ssz)]
struct Inner {
    #[ssz(max = "8")]
    bits: BitList,
    value: u32,
}

#[derive(Debug, Ssz)]
enum Choice {
    Empty(bool),
    Nested(Inner),
}

#[derive(Debug, Ssz)]
struct Outer {
    slot: u64,
    #[ssz(max = "16")]
    items: Vec<Inner>,
    #[ssz(size = "?,4", max = "4")]
    roots: Vec<Vec<u8>>,
    choice: Choice,
    #[ssz(type = "progressive-list")]
    tail: Vec<u16>,
}

fuzz_target!(|data: &[u8]| {
    let ssz = DynSsz::new();

    // Anything that decodes must re-encode to the same bytes
    if let Ok(value) = ssz.unmarshal::<Outer>(data) {
        if let Ok(bytes) = ssz.marshal(&value) {
            assert_eq!(bytes.as_slice(), data);
        }
        let _ = ssz.hash_tree_root(&value);
    }
});
