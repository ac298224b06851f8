//! Benchmarks for commit, incremental update, and opening.

use ark_bls12_381::{Fr, G1Projective};
use ark_ec::{CurveGroup, Group};
use ark_ff::UniformRand;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use criterion::{criterion_group, criterion_main, Criterion};

use vector_commit::domain::{Domain, N};
use vector_commit::setup::CommitKey;
use vector_commit::VectorCommit;

fn toy_commit_key() -> CommitKey {
    let mut rng = ark_std::test_rng();
    let tau = Fr::rand(&mut rng);
    let g1 = G1Projective::generator();
    let radix = Radix2EvaluationDomain::<Fr>::new(N).unwrap();
    let lagrange = radix
        .evaluate_all_lagrange_coefficients(tau)
        .iter()
        .map(|l| (g1 * l).into_affine())
        .collect();
    CommitKey { lagrange }
}

fn rand_values() -> Vec<Fr> {
    let mut rng = ark_std::test_rng();
    (0..N).map(|_| Fr::rand(&mut rng)).collect()
}

fn bench_commit(c: &mut Criterion) {
    let ck = toy_commit_key();
    let values = rand_values();
    c.bench_function("commit_from (N=4096)", |b| {
        b.iter(|| VectorCommit::commit_from(values.clone(), &ck).unwrap())
    });
}

fn bench_update(c: &mut Criterion) {
    let ck = toy_commit_key();
    let mut vc = VectorCommit::commit_from(rand_values(), &ck).unwrap();
    let mut rng = ark_std::test_rng();
    c.bench_function("update (single index)", |b| {
        b.iter(|| vc.update(17, Fr::rand(&mut rng), &ck).unwrap())
    });
}

fn bench_open(c: &mut Criterion) {
    let ck = toy_commit_key();
    let domain = Domain::standard();
    let vc = VectorCommit::commit_from(rand_values(), &ck).unwrap();
    let z = domain.root(42);
    c.bench_function("open (in-domain)", |b| {
        b.iter(|| vc.open(&domain, &ck, z).unwrap())
    });

    let mut rng = ark_std::test_rng();
    let z_out = Fr::rand(&mut rng);
    c.bench_function("open (out-of-domain)", |b| {
        b.iter(|| vc.open(&domain, &ck, z_out).unwrap())
    });
}

criterion_group!(benches, bench_commit, bench_update, bench_open);
criterion_main!(benches);
