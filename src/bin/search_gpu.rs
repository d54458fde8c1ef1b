//! `search-gpu` — the GPU-accelerated batch driver binary.
//!
//! Dispatches uniform n-batches to a `wgpu` compute shader running the same
//! solver semantics as the CPU, then mandatorily re-verifies every
//! device-reported "no solution" on the CPU before trusting it.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use eightn3_search::cli::{exit_code, init_logging, print_banner, run_self_test, RangeArgs};
use eightn3_search::gpu::GpuDriver;
use eightn3_search::verify::verify_device_against_cpu;
use eightn3_search::{fmt, progress::Progress};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Number of n values used by the mandatory GPU-vs-CPU differential test.
const DIFFERENTIAL_TEST_COUNT: u64 = 1000;

/// Search for counterexamples to N = 8n+3 = a^2 + 2p using a GPU compute shader,
/// with mandatory CPU cross-verification of every reported "no solution".
#[derive(Parser, Debug)]
#[command(name = "search-gpu", about = "GPU batch driver for the 8n+3 = a^2 + 2p search")]
struct Cli {
    #[command(flatten)]
    range: RangeArgs,

    /// Number of n values submitted to the device per dispatch.
    #[arg(long, default_value_t = 65_536)]
    batch_size: usize,

    /// Run only the startup self-tests and the GPU-vs-CPU differential test, then exit.
    #[arg(long)]
    verify_only: bool,
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

    if !GpuDriver::is_available() {
        anyhow::bail!("no compatible GPU adapter is available");
    }

    let mut driver = GpuDriver::new();
    driver.init().context("failed to initialize the GPU driver")?;

    run_self_test()?;

    println!("--- GPU differential test ---");
    let diff_report = run_differential_test(&mut driver)?;
    if !diff_report.all_match {
        eprintln!(
            "GPU differential test FAILED: {} of {} mismatched: {:?}",
            diff_report.mismatches.len(),
            diff_report.tested,
            diff_report.mismatches
        );
        anyhow::bail!("GPU vs CPU differential test disagreed");
    }
    println!("GPU differential test PASSED ({} values)", diff_report.tested);

    if cli.verify_only {
        return Ok(ExitCode::from(exit_code::OK as u8));
    }

    let (n_start, n_end) = cli.range.resolve()?;
    let thread_count = cli.range.resolved_thread_count();
    print_banner("search-gpu", n_start, n_end, thread_count, cli.range.sieve_threshold);
    println!("batch size: {}", fmt::format_thousands(cli.batch_size as u64));

    let progress = Progress::new(thread_count, n_end - n_start);
    let start_time = std::time::Instant::now();
    let mut counterexamples = Vec::new();
    let mut n = n_start;

    while n < n_end {
        let batch_end = (n + cli.batch_size as u64).min(n_end);
        let n_values: Vec<u64> = (n..batch_end).collect();

        let mut results = driver.search_batch(&n_values).context("GPU dispatch failed")?;
        let genuine = driver.verify_and_correct(&mut results);
        counterexamples.extend(genuine);

        progress.tested.fetch_add(n_values.len() as u64, std::sync::atomic::Ordering::Relaxed);
        progress.found.fetch_add(
            results.iter().filter(|r| r.found != 0).count() as u64,
            std::sync::atomic::Ordering::Relaxed,
        );
        progress.set_current(format!("n ~ {}", fmt::format_thousands(n)));
        progress.print_status();

        n = batch_end;
        if !counterexamples.is_empty() {
            break;
        }
    }

    let elapsed = start_time.elapsed();
    let stats = driver.stats();
    println!("--- RESULTS ---");
    println!("n tested: {}", fmt::format_thousands(stats.total_n_processed));
    println!("wall time: {}", fmt::format_duration(elapsed.as_secs_f64()));
    println!("GPU kernel time: {}", fmt::format_duration(stats.total_gpu_time.as_secs_f64()));
    println!("batches dispatched: {}", stats.total_batches);
    println!("GPU false negatives corrected: {}", stats.total_gpu_false_negatives);
    println!("counterexamples: {}", counterexamples.len());

    driver.shutdown();

    if counterexamples.is_empty() {
        Ok(ExitCode::from(exit_code::OK as u8))
    } else {
        println!("*** COUNTEREXAMPLE FOUND ***");
        for n in &counterexamples {
            println!("n = {}", n);
        }
        Ok(ExitCode::from(exit_code::COUNTEREXAMPLE as u8))
    }
}

fn run_differential_test(
    driver: &mut GpuDriver,
) -> Result<eightn3_search::verify::DifferentialReport> {
    let n_values: Vec<u64> = (1..=DIFFERENTIAL_TEST_COUNT).collect();
    let results = driver.search_batch(&n_values).context("GPU dispatch failed during differential test")?;
    let found_by_n: std::collections::HashMap<u64, bool> =
        results.iter().map(|r| (r.n, r.found != 0)).collect();
    Ok(verify_device_against_cpu(DIFFERENTIAL_TEST_COUNT, |n| {
        *found_by_n.get(&n).unwrap_or(&false)
    }))
}
