//! # Confidential Ledger Benchmarks
//!
//! | Area | What is measured |
//! |------|------------------|
//! | Codec | Plain encode / decode of a mint envelope |
//! | Sealing | Seal, and decrypt against rings of 1..=K keys |
//! | Service | Full submit pipeline, plain and sealed |
//!
//! Decrypt cost grows with ring size because every candidate is tried.

use cl_crypto::RingKeyPair;
use cl_ledger::prelude::*;
use cl_tests::fixtures::{self, ALICE};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

// ============================================================================
// Codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let selector = selector_of("mint(address,uint256)");
    let args = fixtures::address_amount(ALICE, 10);
    let envelope = fixtures::mint(ALICE, 10);

    group.bench_function("encode_mint", |b| {
        b.iter(|| black_box(codec::encode(selector, args.clone())))
    });
    group.bench_function("decode_mint", |b| {
        b.iter(|| black_box(codec::decode(black_box(&envelope))))
    });

    group.finish();
}

// ============================================================================
// Sealing
// ============================================================================

fn bench_sealing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sealing");
    group.measurement_time(Duration::from_secs(5));

    let mut rng = StdRng::seed_from_u64(1);
    let ring: Vec<RingKeyPair> = (0..7).map(|_| RingKeyPair::generate_with(&mut rng)).collect();
    let selector = selector_of("mint(address,uint256)");
    let args = fixtures::address_amount(ALICE, 10);

    group.bench_function("seal_mint", |b| {
        let recipient = ring[0].public_key();
        b.iter(|| black_box(codec::seal(selector, args.clone(), &recipient, &mut rng)))
    });

    for size in [1usize, 3, 7] {
        let candidates: Vec<&RingKeyPair> = ring.iter().take(size).collect();
        // Sealed to the last candidate: same work as any other slot.
        let envelope = codec::seal(
            selector,
            args.clone(),
            &candidates[size - 1].public_key(),
            &mut StdRng::seed_from_u64(2),
        )
        .expect("valid recipient");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("decrypt_ring", size),
            &(envelope, candidates),
            |b, (envelope, candidates)| b.iter(|| black_box(codec::decrypt(envelope, candidates))),
        );
    }

    group.finish();
}

// ============================================================================
// Service pipeline
// ============================================================================

fn bench_service_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");

    let service = fixtures::test_service();
    let token = fixtures::deploy(&service, "MyToken");
    let envelope = fixtures::mint(ALICE, 1);
    group.bench_function("submit_plain_mint", |b| {
        b.iter(|| black_box(service.submit(ALICE, token, &envelope, U256::zero())))
    });

    // Each sealed envelope carries a fresh nonce, so they are prepared up
    // front to keep the replay window out of the measurement.
    let vault = fixtures::deploy(&service, "ring-key");
    for _ in 0..7 {
        service.update_ring_key(vault);
    }
    let key = service.ring_public_keys(vault)[0].1;
    let mut seed = 0u64;
    group.bench_function("submit_sealed_mint", |b| {
        b.iter_batched(
            || {
                seed += 1;
                fixtures::sealed(
                    "mint(address,uint256)",
                    fixtures::address_amount(ALICE, 1),
                    &key,
                    seed,
                )
            },
            |envelope| black_box(service.submit(ALICE, vault, &envelope, U256::zero())),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_sealing, bench_service_submit);

criterion_main!(benches);
