//! ABI layer for the `<math.h>` subset.
//!
//! Values come straight from `wasmlibc-core`; this layer only reports the
//! domain and pole errors C requires through errno.

use wasmlibc_core::math::{self, MathFn};

use crate::errno_abi::set_errno;

#[inline]
fn unary_entry(func: MathFn, x: f64) -> f64 {
    if let Some(fault) = math::check(func, x) {
        set_errno(fault.errno());
    }
    func.eval(x)
}

abi_fn! {
    fn wasmlibc_acosh(x: f64) -> f64 {
        unary_entry(MathFn::Acosh, x)
    }
}

abi_fn! {
    fn wasmlibc_asinh(x: f64) -> f64 {
        unary_entry(MathFn::Asinh, x)
    }
}

abi_fn! {
    fn wasmlibc_atanh(x: f64) -> f64 {
        unary_entry(MathFn::Atanh, x)
    }
}

abi_fn! {
    fn wasmlibc_trunc(x: f64) -> f64 {
        unary_entry(MathFn::Trunc, x)
    }
}

abi_fn! {
    fn wasmlibc_sqrt(x: f64) -> f64 {
        unary_entry(MathFn::Sqrt, x)
    }
}
