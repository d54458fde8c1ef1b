//! Shared, lock-cheap progress counters and a background status reporter.
//!
//! Atomics carry the hot-path counters (lock-free updates from every
//! worker); a `Mutex` guards only the current-status string, which is
//! updated at most once per progress tick rather than once per candidate.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::fmt::format_duration;

/// Shared progress state for one range run.
///
/// `thread_count` and `total` are fixed at construction (the worker count
/// and the size of `[n_start, n_end)`) so that every call to
/// [`Progress::print_status`] can print the spec's literal progress-line
/// shape — `[K threads] n ~ <formatted>, rate = <n/sec>, ETA: <dhms>` —
/// without each call site having to thread that context through.
pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    pub current: Mutex<String>,
    start: Instant,
    shutdown: AtomicBool,
    thread_count: usize,
    total: u64,
}

impl Progress {
    /// `thread_count` is the worker count shown in the `[K threads]` prefix;
    /// `total` is the number of n values the run covers (`n_end - n_start`),
    /// used to compute the ETA from the observed rate.
    pub fn new(thread_count: usize, total: u64) -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            current: Mutex::new(String::new()),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
            thread_count,
            total,
        })
    }

    /// Spawn a background thread that prints status every `interval`.
    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || loop {
            thread::sleep(interval);
            if progress.shutdown.load(Ordering::Relaxed) {
                break;
            }
            progress.print_status();
        })
    }

    /// Print one progress line to stdout, in the spec's literal shape:
    /// `[K threads] n ~ <formatted>, rate = <n/sec>, ETA: <dhms>`.
    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let tested = self.tested.load(Ordering::Relaxed);
        let current = self.current.lock().unwrap().clone();
        let rate = if elapsed.as_secs_f64() > 0.0 {
            tested as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let remaining = self.total.saturating_sub(tested);
        let eta_seconds = if rate > 0.0 { remaining as f64 / rate } else { f64::INFINITY };
        println!(
            "[{} threads] {}, rate = {:.2}/s, ETA: {}",
            self.thread_count,
            current,
            rate,
            format_duration(eta_seconds)
        );
    }

    pub fn set_current(&self, s: impl Into<String>) {
        *self.current.lock().unwrap() = s.into();
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
