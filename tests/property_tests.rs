//! Property-based tests for the crate's modular-arithmetic and solver
//! primitives.
//!
//! These use `proptest` to check invariants across many randomly generated
//! inputs rather than a handful of fixed examples, which is where the
//! Montgomery and wide-mulmod paths are most likely to disagree at the
//! edges (near 2^63, near the modulus).

use proptest::prelude::*;

use eightn3_search::batch::BatchSieveState;
use eightn3_search::montgomery::{isqrt, mulmod, powmod, MontgomeryCtx};
use eightn3_search::oracle::is_prime_64;
use eightn3_search::solver::{a_max_for, find_solution, n_to_big_n};

// == Modular Core ================================================================

proptest! {
    /// mulmod(a, b, m) must agree with a u128 widening reference computation
    /// for every modulus in u64 range, including near u64::MAX where the
    /// Montgomery-safe threshold boundary lives.
    #[test]
    fn prop_mulmod_matches_u128_reference(
        a in 0u64..u64::MAX,
        b in 0u64..u64::MAX,
        m in 1u64..u64::MAX,
    ) {
        let result = mulmod(a, b, m);
        let expected = ((a as u128 * b as u128) % m as u128) as u64;
        prop_assert_eq!(result, expected, "mulmod({}, {}, {}) = {} but expected {}", a, b, m, result, expected);
    }

    /// powmod(base, exp, m) must agree with iterated mulmod for small exponents.
    #[test]
    fn prop_powmod_matches_iterated_mulmod(
        base in 1u64..1_000_000,
        exp in 0u32..64,
        m in 3u64..1_000_000,
    ) {
        let result = powmod(base % m, exp as u64, m);
        let mut expected = 1u128 % m as u128;
        for _ in 0..exp {
            expected = (expected * (base as u128 % m as u128)) % m as u128;
        }
        prop_assert_eq!(result as u128, expected, "powmod({}, {}, {})", base, exp, m);
    }

    /// isqrt(n) is exact: isqrt(n)^2 <= n < (isqrt(n)+1)^2.
    #[test]
    fn prop_isqrt_is_exact(n in 0u64..u64::MAX) {
        let r = isqrt(n);
        prop_assert!(r.checked_mul(r).map(|sq| sq <= n).unwrap_or(false) || r == 0,
            "isqrt({}) = {}, but {}^2 > n", n, r, r);
        if let Some(next_sq) = (r + 1).checked_mul(r + 1) {
            prop_assert!(next_sq > n, "isqrt({}) = {}, but ({}+1)^2 <= n", n, r, r);
        }
    }

    /// Montgomery domain roundtrip: from_mont(to_mont(a)) == a mod n, for odd n.
    #[test]
    fn prop_montgomery_roundtrip(
        n_half in 1u64..(1u64 << 40),
        a in 0u64..u64::MAX,
    ) {
        let n = 2 * n_half + 1;
        let ctx = MontgomeryCtx::new(n);
        let a_mont = ctx.to_mont(a % n);
        let a_back = ctx.from_mont(a_mont);
        prop_assert_eq!(a_back, a % n, "Montgomery roundtrip failed for a={}, n={}", a, n);
    }

    /// Montgomery pow_mod matches the plain powmod implementation for odd moduli.
    #[test]
    fn prop_montgomery_pow_mod_matches_plain(
        n_half in 1u64..(1u64 << 30),
        base in 1u64..1_000_000,
        exp in 0u64..1000,
    ) {
        let n = 2 * n_half + 1;
        let ctx = MontgomeryCtx::new(n);
        let base_mont = ctx.to_mont(base % n);
        let result = ctx.from_mont(ctx.pow_mod(base_mont, exp));
        let expected = powmod(base % n, exp, n);
        prop_assert_eq!(result, expected, "Montgomery pow_mod({}, {}, {})", base, exp, n);
    }
}

// == Oracle =======================================================================

proptest! {
    /// is_prime_64 agrees with trial division for every odd n up to a
    /// moderate bound, where brute-force trial division is still cheap
    /// enough to serve as an independent reference.
    #[test]
    fn prop_is_prime_64_matches_trial_division(n in 2u64..200_000) {
        let expected = is_prime_trial_division(n);
        prop_assert_eq!(is_prime_64(n), expected, "is_prime_64({}) disagreed with trial division", n);
    }
}

fn is_prime_trial_division(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

// == Solver =======================================================================

proptest! {
    /// Any solution found by find_solution must satisfy a^2 + 2p = N, with a
    /// odd, a <= a_max, and p prime.
    #[test]
    fn prop_find_solution_satisfies_equation(n in 1u64..200_000) {
        let capital_n = n_to_big_n(n);
        if let Some(sol) = find_solution(n, None) {
            prop_assert_eq!(sol.a * sol.a + 2 * sol.p, capital_n);
            prop_assert_eq!(sol.a % 2, 1);
            prop_assert!(sol.a <= a_max_for(capital_n));
            prop_assert!(is_prime_64(sol.p));
        }
    }

    /// a_max_for always returns an odd value whose square does not exceed N.
    #[test]
    fn prop_a_max_for_is_odd_and_bounded(n in 1u64..1_000_000) {
        let capital_n = n_to_big_n(n);
        let a_max = a_max_for(capital_n);
        prop_assert_eq!(a_max % 2, 1);
        prop_assert!(a_max * a_max <= capital_n);
    }
}

// == Batched Verifier =============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// BatchSieveState must agree with the per-n solver for every index of
    /// every batch, over (n_start, batch_size) pairs reaching well past the
    /// point where a_max_for(N of the batch's last n) exceeds isqrt(N of the
    /// batch's first n) — the regime where p_start = (N_start - a^2)/2 goes
    /// negative partway through the a-descent and must be handled with
    /// signed arithmetic, not where it happens to stay positive throughout.
    #[test]
    fn prop_batch_sieve_matches_per_n_solver(
        n_start in 1u64..1_000_000,
        batch_size in 1024usize..8192,
    ) {
        let mut state = BatchSieveState::new(batch_size);
        state.process(n_start, batch_size);
        for i in 0..batch_size {
            let n = n_start + i as u64;
            let expected = find_solution(n, None);
            prop_assert_eq!(
                state.solution_at(i), expected,
                "batch mismatch at n_start={}, batch_size={}, n={}", n_start, batch_size, n
            );
        }
    }

    /// Every solution the batch sieve reports must actually satisfy the
    /// defining equation, independent of whether it agrees with the per-n
    /// solver (guards against both sides being wrong in the same way).
    #[test]
    fn prop_batch_sieve_solutions_satisfy_equation(
        n_start in 1u64..1_000_000,
        batch_size in 1024usize..8192,
    ) {
        let mut state = BatchSieveState::new(batch_size);
        state.process(n_start, batch_size);
        for i in 0..batch_size {
            let n = n_start + i as u64;
            if let Some(sol) = state.solution_at(i) {
                let capital_n = n_to_big_n(n);
                prop_assert_eq!(sol.a * sol.a + 2 * sol.p, capital_n);
                prop_assert_eq!(sol.a % 2, 1);
                prop_assert!(is_prime_64(sol.p));
            }
        }
    }
}
