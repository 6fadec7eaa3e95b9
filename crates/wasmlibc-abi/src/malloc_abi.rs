//! ABI layer for `malloc`, `free`, `calloc` and `realloc`.
//!
//! All blocks come from the membrane's heap registry. Allocation failures
//! follow C (null plus `ENOMEM`); any sign of heap corruption aborts.

use std::ffi::c_void;
use std::ptr::null_mut;

use wasmlibc_core::errno::ENOMEM;
use wasmlibc_membrane::{FreeResult, ReallocError, registry};

use crate::errno_abi::set_errno;
use crate::process_abi::fatal;

abi_fn! {
    fn wasmlibc_malloc(size: usize) -> *mut c_void {
        match registry().allocate(size) {
            Ok(ptr) => ptr.as_ptr().cast(),
            Err(_) => {
                set_errno(ENOMEM);
                null_mut()
            }
        }
    }
}

abi_fn! {
    fn wasmlibc_free(ptr: *mut c_void) {
        if ptr.is_null() {
            return;
        }
        match registry().free(ptr.cast()) {
            FreeResult::Freed => {}
            bad => fatal("free", bad.describe(), ptr),
        }
    }
}

abi_fn! {
    fn wasmlibc_calloc(num: usize, size: usize) -> *mut c_void {
        match registry().allocate_zeroed(num, size) {
            Ok(ptr) => ptr.as_ptr().cast(),
            Err(_) => {
                set_errno(ENOMEM);
                null_mut()
            }
        }
    }
}

abi_fn! {
    fn wasmlibc_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
        match registry().reallocate(ptr.cast(), size) {
            Ok(new_ptr) => new_ptr.as_ptr().cast(),
            Err(ReallocError::Heap(_)) => {
                set_errno(ENOMEM);
                null_mut()
            }
            Err(ReallocError::BadPointer(bad)) => fatal("realloc", bad.describe(), ptr),
        }
    }
}
