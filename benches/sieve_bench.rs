use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eightn3_search::sieve::{BitSieve, Sieve};

fn bench_sieve_build_small(c: &mut Criterion) {
    c.bench_function("Sieve::build(1_000_000)", |b| {
        b.iter(|| Sieve::build(black_box(1_000_000)));
    });
}

fn bench_sieve_build_large(c: &mut Criterion) {
    c.bench_function("Sieve::build(10_000_000)", |b| {
        b.iter(|| Sieve::build(black_box(10_000_000)));
    });
}

fn bench_sieve_is_prime_lookup(c: &mut Criterion) {
    let sieve = Sieve::build(10_000_000);
    c.bench_function("Sieve::is_prime lookup", |b| {
        let mut n = 9_999_991u64;
        b.iter(|| {
            let r = sieve.is_prime(black_box(n));
            n -= 2;
            if n < 3 {
                n = 9_999_991;
            }
            r
        });
    });
}

fn bench_sieve_prime_count(c: &mut Criterion) {
    c.bench_function("Sieve::prime_count (cold)", |b| {
        b.iter_batched(
            || Sieve::build(1_000_000),
            |sieve| sieve.prime_count(),
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_bitsieve_set_clear(c: &mut Criterion) {
    c.bench_function("BitSieve set/clear over 65536 bits", |b| {
        b.iter(|| {
            let mut bs = BitSieve::new_all_clear(65_536);
            for i in (0..65_536).step_by(3) {
                bs.set(black_box(i));
            }
            bs.count_ones()
        });
    });
}

criterion_group!(
    benches,
    bench_sieve_build_small,
    bench_sieve_build_large,
    bench_sieve_is_prime_lookup,
    bench_sieve_prime_count,
    bench_bitsieve_set_clear,
);
criterion_main!(benches);
