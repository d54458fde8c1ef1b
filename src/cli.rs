//! Shared CLI surface for the three search binaries.
//!
//! Each binary (`search`, `search-batched`, `search-gpu`) derives its own
//! [`clap::Parser`] struct built from [`RangeArgs`] plus its own extra flags,
//! but all three need the same `n_start`/`n_end` positional parsing —
//! including scientific notation (`1e12`, `2.5e9`) — and the same
//! `--sieve-threshold`/`--threads` options, so that parsing lives here once.

use anyhow::{bail, Context, Result};
use clap::Args;

/// Parse a numeric CLI argument that may be plain decimal (`1000000000000`)
/// or scientific notation (`1e12`, `2.5e9`). Scientific notation is parsed as
/// `f64` and must round-trip exactly to a non-negative integer; this rejects
/// fractional results like `1.5e1` silently rounding to 15.
pub fn parse_n(s: &str) -> Result<u64> {
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    let f: f64 = s
        .parse()
        .with_context(|| format!("'{}' is not a valid integer or scientific-notation number", s))?;
    if !f.is_finite() || f < 0.0 {
        bail!("'{}' must be a non-negative finite number", s);
    }
    if f.fract() != 0.0 {
        bail!("'{}' must be a whole number", s);
    }
    if f > u64::MAX as f64 {
        bail!("'{}' overflows a 64-bit range bound", s);
    }
    Ok(f as u64)
}

/// Shared positional range plus the options common to every driver.
/// Flattened into each binary's top-level `Parser` struct via `#[command(flatten)]`.
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Start of the n range (inclusive). Accepts decimal or scientific notation.
    #[arg(value_parser = parse_n, default_value = "1000000000000")]
    pub n_start: u64,

    /// End of the n range (exclusive). Accepts decimal or scientific notation.
    /// Defaults to n_start + 10,000,000.
    #[arg(value_parser = parse_n)]
    pub n_end: Option<u64>,

    /// Number of worker threads (default: all logical cores).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Sieve threshold T: primes up to T are looked up in O(1) instead of
    /// falling through to the Miller-Rabin oracle. 0 disables the sieve.
    #[arg(long, default_value_t = 10_000_000)]
    pub sieve_threshold: u64,
}

impl RangeArgs {
    /// Resolve `n_end`, applying the `n_start + 10^7` default, and validate
    /// `n_start < n_end`.
    pub fn resolve(&self) -> Result<(u64, u64)> {
        let n_start = self.n_start;
        let n_end = self.n_end.unwrap_or_else(|| n_start.saturating_add(10_000_000));
        if n_start >= n_end {
            bail!("n_start ({}) must be less than n_end ({})", n_start, n_end);
        }
        if n_start < 1 {
            bail!("n_start must be >= 1");
        }
        const MAX_N: u64 = 1u64 << 61;
        if n_end > MAX_N {
            bail!(
                "n_end ({}) exceeds the supported range: n must stay below 2^61 so that 8n+3 fits in 64 bits",
                n_end
            );
        }
        Ok((n_start, n_end))
    }

    /// Number of worker threads to use: explicit `--threads`, else all
    /// logical cores, clamped to at least 1.
    pub fn resolved_thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus_fallback).max(1)
    }

    /// `None` when `--sieve-threshold 0` (sieve disabled).
    pub fn sieve_threshold_opt(&self) -> Option<u64> {
        if self.sieve_threshold == 0 {
            None
        } else {
            Some(self.sieve_threshold)
        }
    }
}

/// Logical core count, without adding a dependency solely for this: rayon
/// already computes it for the default thread pool, so defer to that when no
/// `--threads` override is given.
fn num_cpus_fallback() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Initialize `tracing-subscriber` with an env-filter (`RUST_LOG`, default
/// `info`), writing to stderr so that stdout stays reserved for the banner,
/// progress, and results output described in the external-interfaces spec.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Exit codes shared by all three binaries (spec: 0 clean, 1 usage/self-test
/// error, 2 counterexample found).
pub mod exit_code {
    pub const OK: i32 = 0;
    pub const USAGE_ERROR: i32 = 1;
    pub const COUNTEREXAMPLE: i32 = 2;
}

/// Print the startup banner shared by all three binaries.
pub fn print_banner(binary: &str, n_start: u64, n_end: u64, threads: usize, sieve_threshold: u64) {
    println!("=== {} ===", binary);
    println!(
        "range: n in [{}, {})  ({} values)",
        crate::fmt::format_thousands(n_start),
        crate::fmt::format_thousands(n_end),
        crate::fmt::format_thousands(n_end - n_start)
    );
    println!("threads: {}", threads);
    if sieve_threshold == 0 {
        println!("sieve: disabled");
    } else {
        println!("sieve threshold: {}", crate::fmt::format_thousands(sieve_threshold));
    }
}

/// Run the mandatory startup self-test and print its report. Returns `Ok(())`
/// if every known case passed, `Err` (caller exits 1) otherwise.
pub fn run_self_test() -> Result<()> {
    let report = crate::verify::verify_known_solutions();
    println!("--- self-test ---");
    for line in &report.lines {
        println!("{}", line);
    }
    if !report.all_passed {
        bail!("self-test FAILED: one or more known cases did not reproduce");
    }
    Ok(())
}
