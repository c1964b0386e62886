//! # CC-01 Trust Validation Benchmarks
//!
//! - Single chain validation (leaf → intermediate → root, CRLs checked)
//! - Batch validation across many signers (parallel)

use cc_01_trust_validation::test_utils::{KeyKind, LeafSpec, TestPki};
use cc_01_trust_validation::{TrustValidationApi, TrustValidationService};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

pub fn bench_chain_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cc-01-trust-validation");

    for kind in [KeyKind::Ed25519, KeyKind::Secp256k1] {
        let mut pki = TestPki::new(kind);
        let leaf = pki.issue_leaf(LeafSpec::new("carrier-1", "Org2MSP"));
        let service = TrustValidationService::new(Arc::new(pki.context(&[&leaf])));
        let serial = leaf.certificate.serial().clone();
        let now = pki.now();

        group.bench_function(BenchmarkId::new("validate_serial", format!("{kind:?}")), |b| {
            b.iter(|| black_box(service.validate_serial(&serial, now).is_ok()))
        });
    }

    group.finish();
}

pub fn bench_batch_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cc-01-trust-validation-batch");

    for size in [10usize, 100] {
        let mut pki = TestPki::new(KeyKind::Ed25519);
        let leaves: Vec<_> = (0..size)
            .map(|i| pki.issue_leaf(LeafSpec::new(format!("member-{i}"), "Org2MSP")))
            .collect();
        let refs: Vec<_> = leaves.iter().collect();
        let service = TrustValidationService::new(Arc::new(pki.context(&refs)));
        let serials: Vec<_> = leaves
            .iter()
            .map(|l| l.certificate.serial().clone())
            .collect();
        let now = pki.now();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("validate_batch", size), &serials, |b, serials| {
            b.iter(|| black_box(service.validate_batch(serials, now).len()))
        });
    }

    group.finish();
}
