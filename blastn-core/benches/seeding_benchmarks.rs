use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blastn_core::seed::{match_indices, pair_hits};
use blastn_core::search::NoopObserver;
use blastn_core::io::into_sequence_map;
use blastn_core::{
    ExtendParams, Extender, ScoringParams, SearchConfig, Searcher, SeedParams, Sequence,
    SmithWaterman, WordIndex,
};

fn generate_test_sequence(length: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..length)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

/// Target with the query planted in the middle and a few substitutions
fn planted_target(query: &[u8], flank: usize) -> Vec<u8> {
    let mut target = generate_test_sequence(flank, 99);
    let mut copy = query.to_vec();
    for pos in (50..copy.len()).step_by(97) {
        copy[pos] = if copy[pos] == b'A' { b'C' } else { b'A' };
    }
    target.extend_from_slice(&copy);
    target.extend_from_slice(&generate_test_sequence(flank, 101));
    target
}

fn bench_indexing(c: &mut Criterion) {
    let sequence = generate_test_sequence(10000, 1);

    c.bench_function("index_10kb_k11", |b| {
        b.iter(|| black_box(WordIndex::build(black_box(&sequence), 11)))
    });
}

fn bench_match_and_pair(c: &mut Criterion) {
    let query = generate_test_sequence(2000, 2);
    let target = planted_target(&query, 4000);
    let query_index = WordIndex::build(&query, 11).unwrap();
    let target_index = WordIndex::build(&target, 11).unwrap();
    let params = SeedParams::default();

    c.bench_function("match_2kb_vs_10kb", |b| {
        b.iter(|| black_box(match_indices(black_box(&query_index), black_box(&target_index))))
    });

    let hits = match_indices(&query_index, &target_index);
    c.bench_function("pair_2kb_vs_10kb", |b| {
        b.iter(|| black_box(pair_hits(black_box(&hits), &params)))
    });
}

fn bench_smith_waterman(c: &mut Criterion) {
    let a = generate_test_sequence(500, 3);
    let b_seq = planted_target(&a, 0);
    let scorer = SmithWaterman::new(ScoringParams::default());

    c.bench_function("sw_score_500", |b| {
        b.iter(|| black_box(scorer.score(black_box(&a), black_box(&b_seq))))
    });
    c.bench_function("sw_matrix_500", |b| {
        b.iter(|| black_box(scorer.matrix(black_box(&a), black_box(&b_seq))))
    });
}

fn bench_extension(c: &mut Criterion) {
    let query = generate_test_sequence(400, 4);
    let target = planted_target(&query, 300);
    let params = SeedParams::default();
    let anchors = pair_hits(
        &match_indices(
            &WordIndex::build(&query, params.word_length).unwrap(),
            &WordIndex::build(&target, params.word_length).unwrap(),
        ),
        &params,
    );
    let extender = Extender::new(ScoringParams::default(), ExtendParams::default());

    c.bench_function("extend_400bp_anchors", |b| {
        b.iter(|| {
            for anchor in anchors.iter().take(20) {
                black_box(extender.extend(anchor, &query, &target));
            }
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let query = Sequence::new("query", generate_test_sequence(500, 5));
    let records: Vec<Sequence> = (0..8)
        .map(|i| {
            let data = if i % 2 == 0 {
                planted_target(&query.data, 1000)
            } else {
                generate_test_sequence(2500, 200 + i)
            };
            Sequence::new(format!("db{}", i), data)
        })
        .collect();
    let database = into_sequence_map(records).expect("unique names");
    let searcher = Searcher::new(SearchConfig::default()).unwrap();

    c.bench_function("search_500bp_vs_8x2.5kb", |b| {
        b.iter(|| black_box(searcher.search(&query, &database, &NoopObserver)))
    });
}

criterion_group!(
    benches,
    bench_indexing,
    bench_match_and_pair,
    bench_smith_waterman,
    bench_extension,
    bench_search
);
criterion_main!(benches);
