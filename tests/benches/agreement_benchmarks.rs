//! # Agreement Benchmarks
//!
//! | Operation | Path | Target |
//! |-----------|------|--------|
//! | Agreement hash | every confirmation, every resolved vote | < 100µs |
//! | Vote consistency | dispute resolution, per card | linear in cards |
//! | Confirmation consistency | dispute resolution | linear in cards |

use cc_02_dispute_resolver::domain::{ExtractedVerificationCard, ExtractionConsistencyChecker};
use cc_tests::fixtures::{
    confirmation_key, context_ids, encrypted_vote, SimulatedNetwork, VERIFICATION_CARD_SET_ID,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_crypto::AgreementHasher;
use shared_types::into_node_array;
use std::time::Duration;

fn card_id(index: usize) -> String {
    format!("{:032x}", 0xa000_0000_0000_0000_0000_0000_0000_0000u128 + index as u128)
}

fn bench_agreement_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("agreement-hash");
    let network = SimulatedNetwork::new();
    let vc = card_id(0);
    let ids = context_ids(&vc);
    let shares = into_node_array(network.hash_values(&confirmation_key(&vc))).unwrap();

    group.bench_function("agree_lvcc_hashes", |b| {
        b.iter(|| black_box(AgreementHasher::agree_lvcc_hashes(&ids, &shares)))
    });
    group.finish();
}

fn bench_consistency_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction-consistency");
    group.measurement_time(Duration::from_secs(10));
    let checker = ExtractionConsistencyChecker::new();
    let network = SimulatedNetwork::new();

    for size in [100usize, 1_000] {
        let ids: Vec<String> = (0..size).map(card_id).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        for vc in &refs {
            network.cast(vc);
        }
        let event = network.election_event(&refs);
        let cards: Vec<ExtractedVerificationCard> = refs
            .iter()
            .map(|vc| ExtractedVerificationCard {
                verification_card_id: vc.to_string(),
                verification_card_set_id: VERIFICATION_CARD_SET_ID.to_string(),
                encrypted_vote: encrypted_vote(vc),
                hash_shares: network.hash_values(&confirmation_key(vc)),
                is_confirmed: true,
            })
            .collect();
        let lists = vec![cards; 4];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("vote_consistency", size), &lists, |b, lists| {
            b.iter(|| black_box(checker.check_vote_consistency(lists).unwrap()))
        });
        group.bench_with_input(
            BenchmarkId::new("vote_confirmation_consistency", size),
            &lists,
            |b, lists| {
                b.iter(|| {
                    black_box(
                        checker
                            .check_vote_confirmation_consistency(&event, lists)
                            .unwrap(),
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_agreement_hash, bench_consistency_checks);
criterion_main!(benches);
