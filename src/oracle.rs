//! Deterministic 64-bit primality oracle: a small-prime trial-division
//! prefilter feeding a two-round hashed-witness Miller-Rabin test.

use crate::montgomery::{isqrt, mulmod, powmod, MontgomeryCtx, MONTGOMERY_SAFE_THRESHOLD};
use crate::witness_table::witness_for;

/// Trial-division prime set used by [`trial_divide`]. Size is a tuning
/// knob, not a correctness requirement — this is the conservative 30-prime
/// default (3..127).
pub const TRIAL_PRIMES: [u64; 30] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127,
];

/// Outcome of the trial-division prefilter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialResult {
    /// n is divisible by one of the trial primes and n is not that prime.
    Composite,
    /// n is itself one of the trial primes (or 2, or < 2).
    SmallPrime,
    /// No small factor found; primality is undecided.
    Undecided,
}

/// Test `candidate` against the trial-prime set.
///
/// Inlines the first 7 primes, then 4x-unrolls the remainder, mirroring the
/// two-tier structure used upstream for this exact check; a plain loop would
/// be semantically identical but slower.
pub fn trial_divide(candidate: u64) -> TrialResult {
    if candidate < 2 {
        return TrialResult::Composite;
    }
    if candidate == 2 {
        return TrialResult::SmallPrime;
    }
    if candidate.is_multiple_of(2) {
        return TrialResult::Composite;
    }

    const FIRST: [u64; 7] = [3, 5, 7, 11, 13, 17, 19];
    for &q in &FIRST {
        if candidate == q {
            return TrialResult::SmallPrime;
        }
        if candidate.is_multiple_of(q) {
            return TrialResult::Composite;
        }
    }

    let rest = &TRIAL_PRIMES[7..];
    let mut i = 0;
    while i + 4 <= rest.len() {
        for &q in &rest[i..i + 4] {
            if candidate == q {
                return TrialResult::SmallPrime;
            }
            if candidate.is_multiple_of(q) {
                return TrialResult::Composite;
            }
        }
        i += 4;
    }
    for &q in &rest[i..] {
        if candidate == q {
            return TrialResult::SmallPrime;
        }
        if candidate.is_multiple_of(q) {
            return TrialResult::Composite;
        }
    }

    TrialResult::Undecided
}

/// One Miller-Rabin round in Montgomery form: does base `a` certify
/// compositeness of `n`, given its Montgomery context, `n - 1 = d * 2^s`?
fn mr_round_montgomery(ctx: &MontgomeryCtx, a: u64, d: u64, s: u32) -> bool {
    let a_mont = ctx.to_mont(a % ctx.modulus());
    let mut x = ctx.pow_mod(a_mont, d);
    let one = ctx.one();
    let n_minus_one_mont = ctx.to_mont(ctx.modulus() - 1);

    if x == one || x == n_minus_one_mont {
        return true;
    }
    for _ in 1..s {
        x = ctx.sqr(x);
        if x == n_minus_one_mont {
            return true;
        }
        if x == one {
            return false;
        }
    }
    false
}

/// One Miller-Rabin round using the wide-mulmod fallback (for n >= 2^63).
fn mr_round_wide(n: u64, a: u64, d: u64, s: u32) -> bool {
    let mut x = powmod(a % n, d, n);
    if x == 1 || x == n - 1 {
        return true;
    }
    for _ in 1..s {
        x = mulmod(x, x, n);
        if x == n - 1 {
            return true;
        }
        if x == 1 {
            return false;
        }
    }
    false
}

fn decompose(n: u64) -> (u64, u32) {
    let mut d = n - 1;
    let mut s = 0u32;
    while d.is_multiple_of(2) {
        d /= 2;
        s += 1;
    }
    (d, s)
}

/// Two-round hashed-witness Miller-Rabin test. Assumes `n` is odd and `n > 127`
/// (smaller cases are handled by the trial-division prefilter).
pub fn is_prime_fj64_fast(n: u64) -> bool {
    let (d, s) = decompose(n);

    if n < MONTGOMERY_SAFE_THRESHOLD {
        let ctx = MontgomeryCtx::new(n);
        if !mr_round_montgomery(&ctx, 2, d, s) {
            return false;
        }
        let w = witness_for(n);
        mr_round_montgomery(&ctx, w, d, s)
    } else {
        if !mr_round_wide(n, 2, d, s) {
            return false;
        }
        let w = witness_for(n);
        mr_round_wide(n, w, d, s)
    }
}

/// Full primality decision for any `n` in `0..=u64::MAX`: trial division for
/// small factors and tiny primes, otherwise the hashed Miller-Rabin test.
pub fn is_prime_64(n: u64) -> bool {
    match trial_divide(n) {
        TrialResult::Composite => false,
        TrialResult::SmallPrime => true,
        TrialResult::Undecided => {
            if n <= 127 {
                true
            } else {
                is_prime_fj64_fast(n)
            }
        }
    }
}

/// A reference (slow, trial-division-only) primality test, used only to
/// cross-check [`is_prime_64`] in tests over small ranges.
#[cfg(test)]
fn is_prime_reference(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n.is_multiple_of(2) {
        return false;
    }
    let limit = isqrt(n);
    let mut d = 3u64;
    while d <= limit {
        if n.is_multiple_of(d) {
            return false;
        }
        d += 2;
    }
    true
}
