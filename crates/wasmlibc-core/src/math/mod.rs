//! Mathematical functions.
//!
//! Implements the `<math.h>` subset used by SQLite's math SQL functions:
//! `acosh`, `asinh`, `atanh`, `trunc`, `sqrt`. Values come from the host math
//! library; [`fault`] classifies the C error a call must report.

pub mod fault;
pub mod float;
pub mod hyperbolic;

pub use fault::{MathFault, MathFn, check};
pub use float::{sqrt, trunc};
pub use hyperbolic::{acosh, asinh, atanh};
