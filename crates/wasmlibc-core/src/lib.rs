//! # wasmlibc-core
//!
//! Safe Rust implementations of the libc functions a SQLite amalgamation
//! references when it is compiled for a target without an operating-system C
//! runtime, plus the declarative table that redirects those references.
//!
//! Everything here works on slices and plain values. The raw-pointer side lives
//! in `wasmlibc-abi`, which scans C inputs into slices and calls into this crate.

#![deny(unsafe_code)]

pub mod errno;
pub mod math;
pub mod redirect;
pub mod stdio;
pub mod string;
pub mod time;
