//! `search-batched` — the a-major batched verifier binary.
//!
//! Processes `[n_start, n_end)` in fixed-size batches, sieving each batch's
//! arithmetic progression of candidates by a fixed small-prime table before
//! falling back to the oracle, then re-verifies every unsolved index with the
//! per-n solver before treating it as a genuine counterexample.

use anyhow::{bail, Result};
use clap::Parser;
use std::process::ExitCode;

use eightn3_search::batch::{BatchSieveState, BATCH_DEFAULT_SIZE, BATCH_MIN_SIZE};
use eightn3_search::cli::{exit_code, init_logging, print_banner, run_self_test, RangeArgs};
use eightn3_search::solver::{find_solution, n_to_big_n};
use eightn3_search::{fmt, progress::Progress};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Search for counterexamples to N = 8n+3 = a^2 + 2p using the a-major batched verifier.
#[derive(Parser, Debug)]
#[command(name = "search-batched", about = "Batched a-major sieve verifier for the 8n+3 = a^2 + 2p search")]
struct Cli {
    #[command(flatten)]
    range: RangeArgs,

    /// Number of consecutive n values processed per batch (minimum 1024).
    #[arg(long, default_value_t = BATCH_DEFAULT_SIZE)]
    batch_size: usize,
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code::USAGE_ERROR as u8)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let (n_start, n_end) = cli.range.resolve()?;
    let thread_count = cli.range.resolved_thread_count();

    if cli.batch_size < BATCH_MIN_SIZE {
        bail!("--batch-size must be at least {} (got {})", BATCH_MIN_SIZE, cli.batch_size);
    }

    print_banner("search-batched", n_start, n_end, thread_count, cli.range.sieve_threshold);
    println!("batch size: {}", fmt::format_thousands(cli.batch_size as u64));
    run_self_test()?;

    let progress = Progress::new(thread_count, n_end - n_start);
    let start_time = std::time::Instant::now();

    let mut counterexamples = Vec::new();
    let mut total_solved = 0u64;
    let mut total_mr_saved = 0u64;
    let mut total_mr_done = 0u64;
    let mut total_n_processed = 0u64;

    let mut state = BatchSieveState::new(cli.batch_size);
    let mut n = n_start;
    while n < n_end {
        let actual_size = ((n_end - n) as usize).min(cli.batch_size);
        let span = tracing::info_span!("batch", n_start = n, size = actual_size);
        let _enter = span.enter();

        state.process(n, actual_size);
        total_solved += state.total_solved as u64;
        total_mr_saved += state.mr_tests_saved;
        total_mr_done += state.mr_tests_done;

        for idx in state.unsolved_indices(actual_size) {
            let candidate_n = n + idx as u64;
            // the batch sieve can be over-eager only at the p == q edge case,
            // which it already guards; this re-verification is mandatory
            // regardless, per the batched verifier's contract.
            if find_solution(candidate_n, None).is_none() {
                let capital_n = n_to_big_n(candidate_n);
                eprintln!("*** COUNTEREXAMPLE FOUND: n = {}, N = {} ***", candidate_n, capital_n);
                counterexamples.push((candidate_n, capital_n));
            } else {
                total_solved += 1;
            }
        }

        total_n_processed += actual_size as u64;
        progress.tested.fetch_add(actual_size as u64, std::sync::atomic::Ordering::Relaxed);
        progress.set_current(format!("n ~ {}", fmt::format_thousands(n)));
        progress.print_status();

        n += actual_size as u64;
        if !counterexamples.is_empty() {
            break;
        }
    }

    let elapsed = start_time.elapsed();
    println!("--- RESULTS ---");
    println!("n tested: {}", fmt::format_thousands(total_n_processed));
    println!("solved: {}", fmt::format_thousands(total_solved));
    println!("elapsed: {}", fmt::format_duration(elapsed.as_secs_f64()));
    println!("mr tests saved by sieving: {}", fmt::format_thousands(total_mr_saved));
    println!("mr tests run: {}", fmt::format_thousands(total_mr_done));
    println!("counterexamples: {}", counterexamples.len());

    if counterexamples.is_empty() {
        Ok(ExitCode::from(exit_code::OK as u8))
    } else {
        println!("*** COUNTEREXAMPLE FOUND ***");
        for (n, capital_n) in &counterexamples {
            println!("n = {}, N = {}", n, capital_n);
        }
        Ok(ExitCode::from(exit_code::COUNTEREXAMPLE as u8))
    }
}
