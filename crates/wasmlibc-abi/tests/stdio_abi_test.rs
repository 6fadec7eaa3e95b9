//! Integration tests for `wasmlibc_sprintf`, called through the C variadic ABI.

use std::ffi::{CStr, c_char, c_int, c_long, c_longlong, c_void};
use std::ptr;

use wasmlibc_abi::errno_abi::{get_errno, set_errno};
use wasmlibc_abi::stdio_abi::wasmlibc_sprintf;
use wasmlibc_core::errno::EINVAL;

fn out(buf: &[u8]) -> &str {
    CStr::from_bytes_until_nul(buf)
        .expect("terminated output")
        .to_str()
        .expect("ascii output")
}

#[test]
fn int_and_string() {
    let mut buf = [0xEEu8; 64];
    // SAFETY: `buf` is large enough; arguments match the format.
    let n = unsafe {
        wasmlibc_sprintf(buf.as_mut_ptr().cast(), c"%d-%s".as_ptr(), 42 as c_int, c"x".as_ptr())
    };
    assert_eq!(n, 4);
    assert_eq!(out(&buf), "42-x");
}

#[test]
fn mixed_widths_are_read_with_their_c_types() {
    let mut buf = [0u8; 128];
    // SAFETY: each argument has the C type its directive names.
    let n = unsafe {
        wasmlibc_sprintf(
            buf.as_mut_ptr().cast(),
            c"%hhd|%ld|%lld|%zu|%5.2f|%c".as_ptr(),
            300 as c_int,
            -7 as c_long,
            1_234_567_890_123 as c_longlong,
            99usize,
            3.14159f64,
            b'Z' as c_int,
        )
    };
    assert_eq!(out(&buf), "44|-7|1234567890123|99| 3.14|Z");
    assert_eq!(n as usize, out(&buf).len());
}

#[test]
fn star_width_and_bounded_string() {
    let mut buf = [0u8; 64];
    let unterminated = [b'a', b'b', b'c'];
    // SAFETY: the precision keeps the read inside `unterminated`.
    unsafe {
        wasmlibc_sprintf(
            buf.as_mut_ptr().cast(),
            c"[%*d][%.3s][%.*s]".as_ptr(),
            6 as c_int,
            -12 as c_int,
            unterminated.as_ptr().cast::<c_char>(),
            2 as c_int,
            unterminated.as_ptr().cast::<c_char>(),
        );
    }
    assert_eq!(out(&buf), "[   -12][abc][ab]");
}

#[test]
fn star_precision_string_uses_its_own_argument() {
    let mut buf = [0u8; 64];
    let unterminated = [b'w', b'x', b'y', b'z'];
    // SAFETY: each precision keeps its read inside `unterminated`, except the
    // negative one, which reads the terminated literal.
    let n = unsafe {
        wasmlibc_sprintf(
            buf.as_mut_ptr().cast(),
            c"%d:%*.*s|%.*s|%.*s".as_ptr(),
            7 as c_int,
            5 as c_int,
            2 as c_int,
            unterminated.as_ptr().cast::<c_char>(),
            -1 as c_int,
            c"whole".as_ptr(),
            0 as c_int,
            unterminated.as_ptr().cast::<c_char>(),
        )
    };
    assert_eq!(out(&buf), "7:   wx|whole|");
    assert_eq!(n as usize, out(&buf).len());
}

#[test]
fn null_string_and_pointer() {
    let mut buf = [0u8; 64];
    // SAFETY: NULL is a valid `%s`/`%p` argument for this implementation.
    unsafe {
        wasmlibc_sprintf(
            buf.as_mut_ptr().cast(),
            c"%s %p".as_ptr(),
            ptr::null::<c_char>(),
            ptr::null::<c_void>(),
        );
    }
    assert_eq!(out(&buf), "(null) (nil)");
}

#[test]
fn percent_n_stores_count() {
    let mut buf = [0u8; 32];
    let mut count: c_int = -1;
    // SAFETY: `count` is a live `int`.
    unsafe {
        wasmlibc_sprintf(
            buf.as_mut_ptr().cast(),
            c"hello%n world".as_ptr(),
            &mut count as *mut c_int,
        );
    }
    assert_eq!(count, 5);
    assert_eq!(out(&buf), "hello world");
}

#[test]
fn float_conversions_match_c() {
    let mut buf = [0u8; 128];
    // SAFETY: doubles for every float directive.
    unsafe {
        wasmlibc_sprintf(
            buf.as_mut_ptr().cast(),
            c"%e %g %.15g %a".as_ptr(),
            12345.678f64,
            0.0001f64,
            0.1f64,
            1.0f64,
        );
    }
    assert_eq!(out(&buf), "1.234568e+04 0.0001 0.1 0x1p+0");
}

#[test]
fn null_buffer_or_format_is_einval() {
    let mut buf = [0u8; 8];
    // SAFETY: the export rejects NULL before touching anything.
    unsafe {
        set_errno(0);
        assert_eq!(wasmlibc_sprintf(ptr::null_mut(), c"x".as_ptr()), -1);
        assert_eq!(get_errno(), EINVAL);
        set_errno(0);
        assert_eq!(wasmlibc_sprintf(buf.as_mut_ptr().cast(), ptr::null()), -1);
        assert_eq!(get_errno(), EINVAL);
    }
}

#[test]
fn unsupported_directive_reads_no_arguments() {
    let mut buf = [0u8; 8];
    // SAFETY: `%Lf` is refused before any argument is read.
    unsafe {
        set_errno(0);
        assert_eq!(wasmlibc_sprintf(buf.as_mut_ptr().cast(), c"%Lf".as_ptr()), -1);
        assert_eq!(get_errno(), EINVAL);
    }
}
