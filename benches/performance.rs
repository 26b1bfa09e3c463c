//! Performance benchmarks for ledger queries.

use card_ledger::{Contract, ContractConfig, KeySpace, MemoryState, QueryAggregator, RelationIndex};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn seeded_state(cards: usize, items_per_card: usize) -> MemoryState {
    let state = MemoryState::new();
    let contract = Contract::new(ContractConfig {
        seed_cards: cards,
        seed_items_per_card: items_per_card,
        ..Default::default()
    });
    contract.dispatch(&state, "initLedger", &[]).unwrap();
    state
}

/// Index lookup plus record fetch for one card, at growing items per card
fn bench_collect_by_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_by_index");

    for items in [20, 100, 500] {
        let state = seeded_state(20, items);
        group.bench_with_input(BenchmarkId::new("items_per_card", items), &items, |b, _| {
            let queries = QueryAggregator::new(&state);
            b.iter(|| {
                let result = queries
                    .collect_by_index(RelationIndex::CardItemByCard.name(), &["CARD7"])
                    .unwrap();
                black_box(result.len())
            });
        });
    }

    group.finish();
}

/// Whole key-space scans
fn bench_collect_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_range");

    for cards in [20, 200, 1000] {
        let state = seeded_state(cards, 5);
        group.bench_with_input(BenchmarkId::new("cards", cards), &cards, |b, _| {
            let queries = QueryAggregator::new(&state);
            b.iter(|| black_box(queries.collect_key_space(KeySpace::Card).unwrap().len()));
        });
    }

    group.finish();
}

/// Full query path including JSON assembly
fn bench_write_through_json(c: &mut Criterion) {
    let state = seeded_state(20, 100);
    let contract = Contract::default();
    let args = vec!["CARD3".to_string()];

    c.bench_function("query_card_items_payload", |b| {
        b.iter(|| {
            let response = contract.handle(&state, "queryCardItemByCARDID", &args);
            black_box(response.payload.len())
        })
    });
}

criterion_group!(
    benches,
    bench_collect_by_index,
    bench_collect_range,
    bench_write_through_json
);
criterion_main!(benches);
