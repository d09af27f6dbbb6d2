// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec Benchmark
//!
//! Measures the three descriptor-driven walks on a beacon-block-like value:
//! - marshal (size pass + encode)
//! - unmarshal (offset validation + decode)
//! - hash_tree_root, with the default preset and with spec overrides

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynssz::{BitList, DynSsz, SpecValues, Ssz};

#[derive(Debug, Clone, Default, Ssz)]
struct Checkpoint {
    epoch: u64,
    root: [u8; 32],
}

#[derive(Debug, Clone, Default, Ssz)]
struct AttestationData {
    slot: u64,
    index: u64,
    beacon_block_root: [u8; 32],
    source: Checkpoint,
    target: Checkpoint,
}

#[derive(Debug, Clone, Default, Ssz)]
struct Attestation {
    #[ssz(max = "2048", dyn_max = "MAX_VALIDATORS_PER_COMMITTEE")]
    aggregation_bits: BitList,
    data: AttestationData,
    #[ssz(size = "96")]
    signature: Vec<u8>,
}

#[derive(Debug, Clone, Default, Ssz)]
struct BlockBody {
    #[ssz(size = "96")]
    randao_reveal: Vec<u8>,
    #[ssz(size = "32")]
    graffiti: Vec<u8>,
    #[ssz(max = "128", dyn_max = "MAX_ATTESTATIONS")]
    attestations: Vec<Attestation>,
    #[ssz(max = "1048576", dyn_max = "MAX_TRANSACTIONS_PER_PAYLOAD")]
    transactions: Vec<u64>,
}

fn sample_body(attestations: usize) -> BlockBody {
    let attestation = Attestation {
        aggregation_bits: BitList::from_bools(&[true; 512]),
        data: AttestationData {
            slot: 1,
            index: 2,
            beacon_block_root: [3; 32],
            source: Checkpoint { epoch: 4, root: [5; 32] },
            target: Checkpoint { epoch: 6, root: [7; 32] },
        },
        signature: vec![8; 96],
    };
    BlockBody {
        randao_reveal: vec![1; 96],
        graffiti: vec![2; 32],
        attestations: vec![attestation; attestations],
        transactions: (0..1024).collect(),
    }
}

fn bench_marshal(c: &mut Criterion) {
    let ssz = DynSsz::new();
    let mut group = c.benchmark_group("marshal");
    for count in [1usize, 16, 128] {
        let body = sample_body(count);
        let size = ssz.size_of(&body).unwrap_or(0);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &body, |b, body| {
            b.iter(|| ssz.marshal(black_box(body)));
        });
    }
    group.finish();
}

fn bench_unmarshal(c: &mut Criterion) {
    let ssz = DynSsz::new();
    let mut group = c.benchmark_group("unmarshal");
    for count in [1usize, 16, 128] {
        let bytes = ssz.marshal(&sample_body(count)).unwrap_or_default();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bytes, |b, bytes| {
            b.iter(|| ssz.unmarshal::<BlockBody>(black_box(bytes)));
        });
    }
    group.finish();
}

fn bench_hash_tree_root(c: &mut Criterion) {
    let default = DynSsz::new();
    let minimal = DynSsz::builder()
        .specs(
            SpecValues::new()
                .with("MAX_VALIDATORS_PER_COMMITTEE", 512)
                .with("MAX_ATTESTATIONS", 128)
                .with("MAX_TRANSACTIONS_PER_PAYLOAD", 4096),
        )
        .cache_resolved_values(true)
        .build();

    let body = sample_body(16);
    c.bench_function("hash_tree_root/default", |b| {
        b.iter(|| default.hash_tree_root(black_box(&body)));
    });
    c.bench_function("hash_tree_root/spec_overrides", |b| {
        b.iter(|| minimal.hash_tree_root(black_box(&body)));
    });
    c.bench_function("proof_tree/default", |b| {
        b.iter(|| default.proof_tree(black_box(&body)));
    });
}

criterion_group!(benches, bench_marshal, bench_unmarshal, bench_hash_tree_root);
criterion_main!(benches);
