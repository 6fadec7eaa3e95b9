//! ABI layer for `abort` and the fatal-error path.

use std::ffi::c_void;
use std::io::Write as _;

/// C `abort`: terminate immediately, no unwinding, no exit handlers.
///
/// On wasm this lowers to the `unreachable` trap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasmlibc_abort() -> ! {
    std::process::abort()
}

/// Report heap corruption on the host error stream, then abort.
///
/// One line, so it survives hosts that only forward whole lines.
#[cold]
pub(crate) fn fatal(symbol: &str, reason: &str, ptr: *const c_void) -> ! {
    let _ = writeln!(
        std::io::stderr().lock(),
        "wasmlibc: {symbol}: {reason} ptr={ptr:p}"
    );
    std::process::abort()
}
