//! # eightn3-search — Core Library
//!
//! Search engine for counterexamples to the conjecture that every N = 8n+3
//! can be written as a^2 + 2p with a odd and p prime.
//!
//! ## Module Organization
//!
//! - [`montgomery`] — integer square root, wide modular multiply, Montgomery
//!   reduction and branchless exponentiation for odd moduli below 2^63.
//! - [`witness_table`] — the hashed Miller-Rabin witness table and its
//!   addressing hash.
//! - [`oracle`] — deterministic 64-bit primality testing: trial-division
//!   prefilter plus the two-round hashed-witness Miller-Rabin test.
//! - [`sieve`] — segmented mod-30 wheel sieve for O(1) primality lookup up
//!   to a threshold, plus the packed [`sieve::BitSieve`] bitmap primitive.
//! - [`solver`] — the per-n "largest a first" incremental solver.
//! - [`driver`] — the CPU range driver: threaded, incremental, cooperative
//!   early termination.
//! - [`batch`] — the a-major batched verifier.
//! - [`gpu`] — the GPU batch driver, with mandatory CPU cross-verification.
//! - [`verify`] — the mandatory known-solution self-test and the
//!   device-vs-CPU differential test.
//! - [`fmt`] — human-readable number/duration formatting.
//! - [`progress`] — shared progress counters and the background reporter.
//! - [`cli`] — shared CLI argument parsing used by all three binaries.

pub mod batch;
pub mod cli;
pub mod driver;
pub mod fmt;
pub mod gpu;
pub mod montgomery;
pub mod oracle;
pub mod progress;
pub mod sieve;
pub mod solver;
pub mod verify;
pub mod witness_table;
