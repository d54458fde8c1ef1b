//! `search` — the CPU range driver binary.
//!
//! Walks `[n_start, n_end)` one n at a time per worker, via the per-n solver,
//! terminating cooperatively the moment any worker reports a counterexample.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use eightn3_search::cli::{exit_code, init_logging, print_banner, run_self_test, RangeArgs};
use eightn3_search::{driver, fmt, progress::Progress, sieve::Sieve};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Search for counterexamples to N = 8n+3 = a^2 + 2p over a range of n.
#[derive(Parser, Debug)]
#[command(name = "search", about = "CPU range driver for the 8n+3 = a^2 + 2p search")]
struct Cli {
    #[command(flatten)]
    range: RangeArgs,
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
    let sieve_threshold = cli.range.sieve_threshold;

    print_banner("search", n_start, n_end, thread_count, sieve_threshold);
    run_self_test()?;

    let sieve = match cli.range.sieve_threshold_opt() {
        Some(t) => {
            let span = tracing::info_span!("sieve_build", threshold = t);
            let _enter = span.enter();
            let s = Sieve::build(t);
            tracing::info!(memory_bytes = s.memory_bytes(), primes = s.prime_count(), "sieve built");
            Some(s)
        }
        None => None,
    };

    let progress = Progress::new(thread_count, n_end - n_start);
    let result = driver::run_range(n_start, n_end, thread_count, sieve.as_ref(), &progress);

    println!("--- RESULTS ---");
    println!("n tested: {}", fmt::format_thousands(result.total_n_processed));
    println!("elapsed: {}", fmt::format_duration(result.elapsed.as_secs_f64()));
    let rate = result.total_n_processed as f64 / result.elapsed.as_secs_f64().max(1e-9);
    println!("throughput: {:.2} n/sec", rate);
    println!("largest a seen: {}", fmt::format_thousands(result.max_a_seen));
    println!("counterexamples: {}", result.counterexamples.len());

    if result.counterexamples.is_empty() {
        Ok(ExitCode::from(exit_code::OK as u8))
    } else {
        println!("*** COUNTEREXAMPLE FOUND ***");
        for ce in &result.counterexamples {
            println!("n = {}, N = {}", ce.n, ce.capital_n);
        }
        Ok(ExitCode::from(exit_code::COUNTEREXAMPLE as u8))
    }
}
