//! # CC-02 Signature Verification Benchmarks
//!
//! - Detached: exact payload bytes, signer resolved by serial
//! - Embedded: one signature block inside a delivery-note composite

use crate::fixtures::{Consortium, PAYLOAD};
use cc_01_trust_validation::test_utils::KeyKind;
use cc_02_signature_verification::{SignatureVerificationApi, SignatureVerificationService};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

const DESADV: &str = r#"<DESADV id="desadv-1" xmlns:g="urn:gs1"><g:lineItem gtin="04012345000017" qty="12"/><g:lineItem gtin="04012345000024" qty="3"/></DESADV>"#;

pub fn bench_detached_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("cc-02-detached");

    for kind in [KeyKind::Ed25519, KeyKind::Secp256k1] {
        let net = Consortium::new(kind);
        let service = SignatureVerificationService::new(Arc::clone(&net.trust));
        let signed = Consortium::signed(&net.carrier, PAYLOAD);
        let now = net.now();

        group.bench_function(BenchmarkId::new("verify_detached", format!("{kind:?}")), |b| {
            b.iter(|| black_box(service.verify_detached(&signed, now).is_ok()))
        });

        let batch: Vec<_> = (0..64)
            .map(|i| Consortium::signed(&net.shipper, format!("waybill-{i}").as_bytes()))
            .collect();
        group.throughput(Throughput::Elements(batch.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("verify_detached_batch", format!("{kind:?}")),
            &batch,
            |b, batch| b.iter(|| black_box(service.verify_detached_batch(batch, now))),
        );
    }

    group.finish();
}

pub fn bench_embedded_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("cc-02-embedded");

    for kind in [KeyKind::Ed25519, KeyKind::Secp256k1] {
        let net = Consortium::new(kind);
        let service = SignatureVerificationService::new(Arc::clone(&net.trust));
        let signature = Consortium::xml_signer(&net.shipper)
            .sign_detached(DESADV, "desadv-1")
            .expect("fixture signature");
        let composite = format!("<DELNOTE>{DESADV}{signature}</DELNOTE>");
        let now = net.now();

        group.bench_function(BenchmarkId::new("verify_embedded", format!("{kind:?}")), |b| {
            b.iter(|| black_box(service.verify_embedded(&composite, now).is_ok()))
        });
    }

    group.finish();
}
