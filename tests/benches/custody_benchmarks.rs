//! # Custody-Chain Benchmarks
//!
//! Trust validation and signature verification on the paths every custody
//! step and note signature takes.

use cc_tests::benchmarks::{cc_01_trust, cc_02_signature};
use criterion::{criterion_group, criterion_main};

criterion_group!(
    benches,
    cc_01_trust::bench_chain_validation,
    cc_01_trust::bench_batch_validation,
    cc_02_signature::bench_detached_verification,
    cc_02_signature::bench_embedded_verification,
);
criterion_main!(benches);
