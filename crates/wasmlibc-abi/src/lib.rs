#![feature(c_variadic)]
// Every export takes raw pointers straight from C; the contract is the C
// prototype in the generated header, not a per-function safety section.
#![allow(clippy::missing_safety_doc)]
//! # wasmlibc-abi
//!
//! The `extern "C"` symbols a SQLite amalgamation links against once its libc
//! references are redirected by the generated shim header.
//!
//! ```text
//! C caller -> wasmlibc_* export (this crate) -> slices -> wasmlibc-core
//!                                  \-> wasmlibc-membrane (heap, config)
//! ```
//!
//! Every symbol carries the `wasmlibc_` prefix, so the test binary can link
//! the exports next to the host libc without shadowing it.

#[macro_use]
mod macros;

pub mod entropy_abi;
pub mod errno_abi;
pub mod malloc_abi;
pub mod math_abi;
pub mod process_abi;
pub mod stdio_abi;
pub mod string_abi;
pub mod time_abi;

pub mod util;
