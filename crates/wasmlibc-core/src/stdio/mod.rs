//! Formatted output.
//!
//! Only the `sprintf` family is needed; there are no streams on the target.

pub mod float;
pub mod printf;

pub use printf::{
    ArgClass, CountWrite, FormatArg, FormatError, FormatSegment, FormatSpec, LengthMod, Precision,
    Rendered, StrBound, arg_class, arg_plan, format_bytes, parse_format_string, render,
};
