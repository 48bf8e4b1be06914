use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paceline::models::leaderboard::{rank_entries, LeaderboardEntry};

fn synthetic_entries(count: usize) -> Vec<LeaderboardEntry> {
    (0..count)
        .map(|i| LeaderboardEntry {
            user_id: format!("user-{:06}", i),
            name: format!("User {}", i),
            // Spread totals with plenty of ties to exercise the tie-break
            total_steps: ((i * 7919) % 10_000) as i64,
            rank: 0,
        })
        .collect()
}

fn benchmark_rank_entries(c: &mut Criterion) {
    let small = synthetic_entries(100);
    let large = synthetic_entries(10_000);

    let mut group = c.benchmark_group("rank_entries");

    group.bench_function("rank_100_users", |b| {
        b.iter(|| rank_entries(black_box(small.clone())))
    });

    group.bench_function("rank_10k_users", |b| {
        b.iter(|| rank_entries(black_box(large.clone())))
    });

    group.finish();
}

criterion_group!(benches, benchmark_rank_entries);
criterion_main!(benches);
