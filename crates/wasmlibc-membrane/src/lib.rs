//! Runtime state behind the wasmlibc C ABI.
//!
//! - **Heap registry** (`heap`): every block the shim hands out, with
//!   integrity headers, trailing canaries and a bounded free quarantine
//! - **Block fingerprints** (`fingerprint`): header layout and canary derivation
//! - **Configuration** (`config`): environment-driven settings with
//!   programmatic overrides, cached in atomics
//! - **Metrics** (`metrics`): relaxed atomic counters
//!
//! `heap` is the only module allowed to touch raw memory.

#![deny(unsafe_code)]

pub mod config;
pub mod fingerprint;
pub mod heap;
pub mod metrics;

pub use config::QuarantineLimits;
pub use heap::{FreeResult, HeapError, HeapLimits, HeapRegistry, ReallocError, registry};
pub use metrics::{HeapMetrics, MetricsSnapshot};
