//! Build tooling and conformance harness for wasmlibc.
//!
//! This crate provides:
//! - Build artifacts: the forced-include shim header, compile flags and the
//!   redirection table as JSON, bundled with a SHA-256 artifact index
//! - Fixture verify: run JSON fixture cases against `wasmlibc-core`
//! - Structured logs: JSONL records for every verification run
//! - Report generation: markdown + JSON conformance reports

#![forbid(unsafe_code)]

pub mod artifacts;
pub mod bundle;
pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod stats;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureArg, FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
