// Trust-signal and proof-of-work benchmarks.
//
// Create / open / third-party verify of a single signal, and PoW solving at
// low difficulties where a run finishes in well under a second.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use veil_protocol::crypto::keys::IdentityKeypair;
use veil_protocol::pow;
use veil_protocol::trust::{create_trust_signal, decrypt_trust_signal};

const TIMESTAMP: u64 = 1_700_000_000_000;

fn bench_trust_signal(c: &mut Criterion) {
    let truster = IdentityKeypair::generate();
    let trustee = IdentityKeypair::generate();
    let trustee_public = trustee.public_key();
    let truster_public = truster.public_key();
    let signal = create_trust_signal(&truster, &trustee_public, 0.75, TIMESTAMP).unwrap();

    c.bench_function("trust/create", |b| {
        b.iter(|| create_trust_signal(&truster, &trustee_public, 0.75, TIMESTAMP).unwrap());
    });
    c.bench_function("trust/open_as_trustee", |b| {
        b.iter(|| decrypt_trust_signal(&signal, &truster_public, &trustee).unwrap());
    });

    let outsider = IdentityKeypair::generate();
    c.bench_function("trust/open_as_outsider", |b| {
        b.iter(|| decrypt_trust_signal(&signal, &truster_public, &outsider));
    });
    c.bench_function("trust/verify_signature", |b| {
        b.iter(|| signal.verify_signature());
    });
}

fn bench_pow(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow/solve");
    group.sample_size(20);

    for difficulty in [4u32, 8, 12] {
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &difficulty,
            |b, &difficulty| {
                b.iter(|| pow::solve("bench-challenge", difficulty).unwrap());
            },
        );
    }
    group.finish();

    let solution = pow::solve("bench-challenge", 12).unwrap();
    c.bench_function("pow/verify", |b| {
        b.iter(|| pow::verify("bench-challenge", solution.nonce, 12));
    });
}

criterion_group!(benches, bench_trust_signal, bench_pow);
criterion_main!(benches);
