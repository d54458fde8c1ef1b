use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eightn3_search::batch::BatchSieveState;
use eightn3_search::sieve::Sieve;
use eightn3_search::solver::{find_solution, find_solution_from_n, n_to_big_n, a_max_for};

fn bench_find_solution_no_sieve(c: &mut Criterion) {
    c.bench_function("find_solution(n ~ 1e12, no sieve)", |b| {
        let mut n = 1_000_000_000_000u64;
        b.iter(|| {
            let r = find_solution(black_box(n), None);
            n += 1;
            r
        });
    });
}

fn bench_find_solution_with_sieve(c: &mut Criterion) {
    let sieve = Sieve::build(10_000_000);
    c.bench_function("find_solution(n ~ 1e12, with sieve)", |b| {
        let mut n = 1_000_000_000_000u64;
        b.iter(|| {
            let r = find_solution(black_box(n), Some(&sieve));
            n += 1;
            r
        });
    });
}

fn bench_find_solution_from_n_incremental(c: &mut Criterion) {
    let sieve = Sieve::build(10_000_000);
    let n = 1_000_000_000_000u64;
    let capital_n = n_to_big_n(n);
    let a_max = a_max_for(capital_n);
    c.bench_function("find_solution_from_n (precomputed N, a_max)", |b| {
        b.iter(|| find_solution_from_n(black_box(capital_n), black_box(a_max), Some(&sieve)));
    });
}

fn bench_batch_process_small(c: &mut Criterion) {
    c.bench_function("BatchSieveState::process(n ~ 1e12, size=4096)", |b| {
        b.iter_batched(
            || BatchSieveState::new(4096),
            |mut state| state.process(1_000_000_000_000u64, 4096),
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_batch_process_default(c: &mut Criterion) {
    c.bench_function("BatchSieveState::process(n ~ 1e12, size=65536)", |b| {
        b.iter_batched(
            || BatchSieveState::new(65_536),
            |mut state| state.process(1_000_000_000_000u64, 65_536),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_find_solution_no_sieve,
    bench_find_solution_with_sieve,
    bench_find_solution_from_n_incremental,
    bench_batch_process_small,
    bench_batch_process_default,
);
criterion_main!(benches);
