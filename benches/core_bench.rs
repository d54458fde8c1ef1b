use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eightn3_search::montgomery::{isqrt, mulmod, powmod, MontgomeryCtx};
use eightn3_search::oracle::{is_prime_64, is_prime_fj64_fast, trial_divide};

fn bench_isqrt(c: &mut Criterion) {
    c.bench_function("isqrt(u64::MAX)", |b| {
        b.iter(|| isqrt(black_box(u64::MAX)));
    });
}

fn bench_mulmod(c: &mut Criterion) {
    c.bench_function("mulmod(near-u64-max)", |b| {
        b.iter(|| mulmod(black_box(u64::MAX - 1), black_box(u64::MAX - 3), black_box(u64::MAX - 58)));
    });
}

fn bench_powmod(c: &mut Criterion) {
    let m = 999999999999999877u64;
    c.bench_function("powmod(2, m-1, m)", |b| {
        b.iter(|| powmod(black_box(2), black_box(m - 1), black_box(m)));
    });
}

fn bench_montgomery_pow(c: &mut Criterion) {
    let m = 999999999999999877u64;
    let ctx = MontgomeryCtx::new(m);
    let base = ctx.to_mont(2);
    c.bench_function("MontgomeryCtx::pow_mod(2, m-1, m)", |b| {
        b.iter(|| ctx.pow_mod(black_box(base), black_box(m - 1)));
    });
}

fn bench_trial_divide_undecided(c: &mut Criterion) {
    // Prime well beyond the trial-division set (131^2), forcing a full scan.
    c.bench_function("trial_divide(131*131)", |b| {
        b.iter(|| trial_divide(black_box(131 * 131)));
    });
}

fn bench_oracle_large_prime(c: &mut Criterion) {
    let p = 999999999999999989u64; // known prime below 2^63
    c.bench_function("is_prime_fj64_fast(18-digit prime)", |b| {
        b.iter(|| is_prime_fj64_fast(black_box(p)));
    });
}

fn bench_oracle_near_2_to_63(c: &mut Criterion) {
    let n = (1u64 << 63) + 29; // forces the wide-mulmod fallback path
    c.bench_function("is_prime_64(n >= 2^63)", |b| {
        b.iter(|| is_prime_64(black_box(n)));
    });
}

criterion_group!(
    benches,
    bench_isqrt,
    bench_mulmod,
    bench_powmod,
    bench_montgomery_pow,
    bench_trial_divide_undecided,
    bench_oracle_large_prime,
    bench_oracle_near_2_to_63,
);
criterion_main!(benches);
