//! String and memory operations.
//!
//! Implements the `<string.h>` subset the amalgamation calls, as safe Rust
//! operating on slices.

pub mod mem;
pub mod span;
pub mod str;

pub use mem::memchr;
pub use span::{ByteSet, strcspn, strspn};
pub use str::{strcat, strchr, strcmp, strcpy, strlen, strncat, strncmp, strncpy, strrchr};
