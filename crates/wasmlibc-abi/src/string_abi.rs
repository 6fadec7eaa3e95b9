//! ABI layer for the `<string.h>` subset.
//!
//! Each export measures its C inputs once, builds slices over exactly the
//! bytes C semantics allow it to touch, and delegates to `wasmlibc-core`.

use std::ffi::{c_char, c_int, c_void};
use std::ptr::null_mut;

use wasmlibc_core::string;

use crate::util::{c_str_bytes, scan_c_string};

abi_fn! {
    fn wasmlibc_strcmp(l: *const c_char, r: *const c_char) -> c_int {
        string::strcmp(c_str_bytes(l, None), c_str_bytes(r, None))
    }
}

abi_fn! {
    fn wasmlibc_strncmp(l: *const c_char, r: *const c_char, n: usize) -> c_int {
        if n == 0 {
            return 0;
        }
        string::strncmp(c_str_bytes(l, Some(n)), c_str_bytes(r, Some(n)), n)
    }
}

abi_fn! {
    fn wasmlibc_strcpy(dest: *mut c_char, src: *const c_char) -> *mut c_char {
        let src_bytes = c_str_bytes(src, None);
        let dest_bytes = std::slice::from_raw_parts_mut(dest.cast::<u8>(), src_bytes.len() + 1);
        string::strcpy(dest_bytes, src_bytes);
        dest
    }
}

abi_fn! {
    fn wasmlibc_strncpy(d: *mut c_char, s: *const c_char, n: usize) -> *mut c_char {
        if n == 0 {
            return d;
        }
        let src_bytes = c_str_bytes(s, Some(n));
        let dest_bytes = std::slice::from_raw_parts_mut(d.cast::<u8>(), n);
        string::strncpy(dest_bytes, src_bytes, n);
        d
    }
}

abi_fn! {
    fn wasmlibc_strcat(dest: *mut c_char, src: *const c_char) -> *mut c_char {
        let (dest_len, _) = scan_c_string(dest, None);
        let src_bytes = c_str_bytes(src, None);
        let total = dest_len + src_bytes.len() + 1;
        let dest_bytes = std::slice::from_raw_parts_mut(dest.cast::<u8>(), total);
        string::strcat(dest_bytes, src_bytes);
        dest
    }
}

abi_fn! {
    fn wasmlibc_strncat(d: *mut c_char, s: *const c_char, n: usize) -> *mut c_char {
        let (dest_len, _) = scan_c_string(d, None);
        let src_bytes = c_str_bytes(s, Some(n));
        let total = dest_len + src_bytes.len() + 1;
        let dest_bytes = std::slice::from_raw_parts_mut(d.cast::<u8>(), total);
        string::strncat(dest_bytes, src_bytes, n);
        d
    }
}

abi_fn! {
    fn wasmlibc_strspn(s: *const c_char, c: *const c_char) -> usize {
        string::strspn(c_str_bytes(s, None), c_str_bytes(c, None))
    }
}

abi_fn! {
    fn wasmlibc_strcspn(s: *const c_char, c: *const c_char) -> usize {
        string::strcspn(c_str_bytes(s, None), c_str_bytes(c, None))
    }
}

abi_fn! {
    fn wasmlibc_strchr(s: *const c_char, c: c_int) -> *mut c_char {
        match string::strchr(c_str_bytes(s, None), c as u8) {
            Some(idx) => s.add(idx).cast_mut(),
            None => null_mut(),
        }
    }
}

abi_fn! {
    fn wasmlibc_strrchr(s: *const c_char, c: c_int) -> *mut c_char {
        match string::strrchr(c_str_bytes(s, None), c as u8) {
            Some(idx) => s.add(idx).cast_mut(),
            None => null_mut(),
        }
    }
}

abi_fn! {
    fn wasmlibc_memchr(src: *const c_void, c: c_int, n: usize) -> *mut c_void {
        if n == 0 {
            return null_mut();
        }
        let haystack = std::slice::from_raw_parts(src.cast::<u8>(), n);
        match string::memchr(haystack, c as u8, n) {
            Some(idx) => src.cast::<u8>().add(idx).cast_mut().cast(),
            None => null_mut(),
        }
    }
}
