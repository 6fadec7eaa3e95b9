//! ABI layer for `<errno.h>`: thread-local errno storage.
//!
//! The shim header maps `errno` to `(*__errno_location())` and
//! `__errno_location` to [`wasmlibc_errno_location`].

use std::cell::UnsafeCell;
use std::ffi::c_int;

thread_local! {
    static ERRNO: UnsafeCell<c_int> = const { UnsafeCell::new(0) };
}

abi_fn! {
    /// Address of the calling thread's errno. Stable for the thread's lifetime.
    fn wasmlibc_errno_location() -> *mut c_int {
        ERRNO.with(|cell| cell.get())
    }
}

#[inline]
pub fn set_errno(code: c_int) {
    // SAFETY: the slot is thread-local and only ever accessed through this
    // pointer on the owning thread.
    unsafe { *wasmlibc_errno_location() = code };
}

#[inline]
#[must_use]
pub fn get_errno() -> c_int {
    // SAFETY: as in `set_errno`.
    unsafe { *wasmlibc_errno_location() }
}
