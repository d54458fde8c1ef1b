//! The per-n solver: for N = 8n+3, find the largest odd a <= isqrt(N) such
//! that p = (N - a^2)/2 is prime, or report that none exists.

use crate::montgomery::isqrt;
use crate::oracle::{self, TrialResult};
use crate::sieve::Sieve;

/// N = 8n + 3 for the given n. Callers must ensure n is small enough that
/// this does not overflow (n < 2^61).
#[inline]
pub fn n_to_big_n(n: u64) -> u64 {
    8 * n + 3
}

/// The largest odd a with a^2 <= capital_n.
#[inline]
pub fn a_max_for(capital_n: u64) -> u64 {
    let mut a = isqrt(capital_n);
    if a.is_multiple_of(2) {
        a -= 1;
    }
    a
}

/// Test whether `p` is prime, using the sieve when `p` is in range and
/// falling back to the oracle otherwise. `p < 2` is always composite.
#[inline]
pub fn is_candidate_prime(p: u64, sieve: Option<&Sieve>) -> bool {
    if p < 2 {
        return false;
    }
    match oracle::trial_divide(p) {
        TrialResult::Composite => false,
        TrialResult::SmallPrime => true,
        TrialResult::Undecided => {
            if p <= 127 {
                return true;
            }
            match sieve {
                Some(s) if s.in_range(p) => s.is_prime(p),
                _ => oracle::is_prime_fj64_fast(p),
            }
        }
    }
}

/// A found witness pair for n: a^2 + 2p = N, a odd, p prime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub a: u64,
    pub p: u64,
}

/// Find the largest-a solution for N, given its a_max, walking a downward.
///
/// This is the canonical incremental walk: p_next = p + delta,
/// delta_next = delta - 4, a_next = a - 2. Returns `None` if no odd a in
/// `[1, a_max]` yields a prime candidate: a counterexample.
pub fn find_solution_from_n(capital_n: u64, a_max: u64, sieve: Option<&Sieve>) -> Option<Solution> {
    let mut a = a_max;
    let mut candidate = (capital_n - a * a) / 2;
    let mut delta = 2 * (a.saturating_sub(1));

    loop {
        if candidate >= 2 && is_candidate_prime(candidate, sieve) {
            return Some(Solution { a, p: candidate });
        }
        if a < 3 {
            return None;
        }
        candidate += delta;
        delta = delta.saturating_sub(4);
        a -= 2;
    }
}

/// Find the solution for a given n, deriving N and a_max from scratch. Use
/// [`find_solution_from_n`] directly in hot loops that already track N and
/// a_max incrementally (see [`crate::driver`]).
pub fn find_solution(n: u64, sieve: Option<&Sieve>) -> Option<Solution> {
    let capital_n = n_to_big_n(n);
    let a_max = a_max_for(capital_n);
    find_solution_from_n(capital_n, a_max, sieve)
}
