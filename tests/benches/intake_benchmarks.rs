//! # Intake Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | codec | hex parse + RLP decode of a signed envelope |
//! | verify | signer recovery and comparison |
//! | assemble | full intake into the in-memory ledger |

use api_gateway::{AccountsManager, EndpointDeps, InMemoryLedger};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rpc_tests::fixtures::Wallet;
use serde_json::json;
use shared_types::Address;
use std::sync::Arc;
use std::time::Duration;
use tx_verification::{decode, parse_hex, SignatureVerifier};

fn bench_decode_and_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("intake/decode_verify");
    group.measurement_time(Duration::from_secs(5));

    let wallet = Wallet::random();
    let envelope = wallet.call(0, Address([0xBB; 20]), "resolve", vec![json!("a"), json!(1)]);
    let raw = parse_hex(&envelope).unwrap();
    let decoded = decode(&raw).unwrap();
    let verifier = SignatureVerifier::new();

    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode(black_box(&raw)).is_ok()))
    });
    group.bench_function("verify", |b| {
        b.iter(|| black_box(verifier.verify(black_box(&raw), black_box(&decoded))))
    });
    group.bench_function("parse_decode_verify", |b| {
        b.iter(|| {
            let raw = parse_hex(black_box(&envelope)).unwrap();
            let decoded = decode(&raw).unwrap();
            black_box(verifier.verify(&raw, &decoded))
        })
    });

    for code_size in [64usize, 4 * 1024, 32 * 1024] {
        let code = "x".repeat(code_size);
        let envelope = wallet.deploy(0, &code, vec![]);
        let raw = parse_hex(&envelope).unwrap();

        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::new("verify_deployment", code_size), &raw, |b, raw| {
            let decoded = decode(raw).unwrap();
            b.iter(|| black_box(verifier.verify(raw, &decoded)))
        });
    }

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("intake/assemble");
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let deps = EndpointDeps::in_memory(
        Arc::new(AccountsManager::new()),
        Arc::new(InMemoryLedger::new()),
        usize::MAX,
    );
    let wallet = Wallet::random();
    let call = wallet.call(0, Address([0xBB; 20]), "resolve", vec![]);
    let deployment = wallet.deploy(0, "C", vec![]);

    group.bench_function("call", |b| {
        b.iter(|| runtime.block_on(deps.assembler.assemble_and_insert(black_box(&call))))
    });
    group.bench_function("deployment", |b| {
        b.iter(|| runtime.block_on(deps.assembler.assemble_and_insert(black_box(&deployment))))
    });

    group.finish();
}

criterion_group!(benches, bench_decode_and_verify, bench_assemble);
criterion_main!(benches);
