//! CPU range driver: partitions `[n_start, n_end)` across worker threads,
//! each maintaining its own incremental `N`/`a_max` instead of recomputing
//! them per n, and stopping cooperatively the moment any worker finds a
//! counterexample.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::progress::Progress;
use crate::sieve::Sieve;
use crate::solver::{find_solution_from_n, n_to_big_n, Solution};

/// How often (in n-iterations) a worker checks the wall clock for a
/// progress print.
const PROGRESS_CHECK_INTERVAL: u64 = 1 << 18;

const PROGRESS_SECONDS: f64 = 5.0;

/// Per-worker counters, padded to a cache line so adjacent workers never
/// cause false sharing when updating their own counters.
#[repr(align(64))]
#[derive(Default)]
pub struct ThreadStats {
    pub n_processed: u64,
    pub max_a_seen: u64,
}

/// A single n found to have no solution.
#[derive(Debug, Clone, Copy)]
pub struct Counterexample {
    pub n: u64,
    pub capital_n: u64,
}

pub struct RangeDriverResult {
    pub counterexamples: Vec<Counterexample>,
    pub total_n_processed: u64,
    pub max_a_seen: u64,
    pub elapsed: Duration,
}

/// Shared coordination state between workers: a terminate flag read on the
/// hot path and a progress-print gate that only one thread touches at a
/// time.
struct Shared {
    terminate: AtomicBool,
    last_progress: Mutex<Instant>,
}

/// Run the CPU range driver over `[n_start, n_end)` using `thread_count`
/// workers (1 degrades to a fully sequential path, not a special case).
pub fn run_range(
    n_start: u64,
    n_end: u64,
    thread_count: usize,
    sieve: Option<&Sieve>,
    progress: &Arc<Progress>,
) -> RangeDriverResult {
    let start_time = Instant::now();
    let thread_count = thread_count.max(1);
    let shared = Shared {
        terminate: AtomicBool::new(false),
        last_progress: Mutex::new(start_time),
    };

    let total = n_end.saturating_sub(n_start);
    let chunk = total.div_ceil(thread_count as u64).max(1);

    let (counterexamples, stats): (Vec<Vec<Counterexample>>, Vec<ThreadStats>) = std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(thread_count);
        for worker in 0..thread_count {
            let chunk_start = n_start + worker as u64 * chunk;
            if chunk_start >= n_end {
                continue;
            }
            let chunk_end = (chunk_start + chunk).min(n_end);
            let shared = &shared;
            let progress = Arc::clone(progress);
            handles.push(scope.spawn(move || {
                run_worker_chunk(chunk_start, chunk_end, sieve, &progress, shared, start_time)
            }));
        }
        let results: Vec<(Vec<Counterexample>, ThreadStats)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.into_iter().unzip()
    });

    let total_n_processed = stats.iter().map(|s| s.n_processed).sum();
    let max_a_seen = stats.iter().map(|s| s.max_a_seen).max().unwrap_or(0);
    let counterexamples = counterexamples.into_iter().flatten().collect::<Vec<_>>();

    RangeDriverResult {
        counterexamples,
        total_n_processed,
        max_a_seen,
        elapsed: start_time.elapsed(),
    }
}

fn run_worker_chunk(
    chunk_start: u64,
    chunk_end: u64,
    sieve: Option<&Sieve>,
    progress: &Arc<Progress>,
    shared: &Shared,
    start_time: Instant,
) -> (Vec<Counterexample>, ThreadStats) {
    let mut counterexamples = Vec::new();
    let mut stats = ThreadStats::default();
    if chunk_start >= chunk_end {
        return (counterexamples, stats);
    }

    let mut n = chunk_start;
    let mut capital_n = n_to_big_n(n);
    let mut a_max = crate::solver::a_max_for(capital_n);

    loop {
        if n >= chunk_end {
            break;
        }
        if shared.terminate.load(Ordering::Relaxed) {
            break;
        }

        match find_solution_from_n(capital_n, a_max, sieve) {
            Some(Solution { a, .. }) => {
                progress.found.fetch_add(1, Ordering::Relaxed);
                stats.max_a_seen = stats.max_a_seen.max(a);
            }
            None => {
                shared.terminate.store(true, Ordering::Release);
                counterexamples.push(Counterexample { n, capital_n });
                eprintln!("*** COUNTEREXAMPLE FOUND: n = {}, N = {} ***", n, capital_n);
            }
        }
        progress.tested.fetch_add(1, Ordering::Relaxed);
        stats.n_processed += 1;

        if stats.n_processed.is_multiple_of(PROGRESS_CHECK_INTERVAL) {
            maybe_print_progress(n, progress, shared, start_time);
        }

        // incremental update: N grows by 8 each step; a_max grows by 2
        // exactly when (a_max+2)^2 <= N, which happens rarely.
        capital_n += 8;
        n += 1;
        if (a_max + 2).checked_mul(a_max + 2).map(|sq| sq <= capital_n).unwrap_or(false) {
            a_max += 2;
        }
    }

    (counterexamples, stats)
}

fn maybe_print_progress(n: u64, progress: &Arc<Progress>, shared: &Shared, start_time: Instant) {
    let mut last = match shared.last_progress.try_lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    if last.elapsed().as_secs_f64() < PROGRESS_SECONDS {
        return;
    }
    *last = Instant::now();
    progress.set_current(format!("n ~ {}", crate::fmt::format_thousands(n)));
    progress.print_status();
    let _ = start_time;
}
