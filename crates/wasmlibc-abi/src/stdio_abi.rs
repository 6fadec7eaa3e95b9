//! ABI layer for `sprintf`.
//!
//! The format is parsed once to learn the C type of every variadic argument,
//! the arguments are read with exactly those types, and rendering happens in
//! `wasmlibc-core`. Reading by declared type (rather than as register-sized
//! words) is what keeps `int` and `long` apart on 32-bit wasm.

use std::ffi::{c_char, c_double, c_int, c_long, c_longlong, c_void};

use wasmlibc_core::errno::{EINVAL, EOVERFLOW};
use wasmlibc_core::stdio::{
    ArgClass, CountWrite, FormatArg, FormatError, LengthMod, StrBound, arg_plan,
    parse_format_string, render,
};

use crate::errno_abi::set_errno;
use crate::util::c_str_bytes;

/// Read one argument per plan entry from `$args`, appending to `$out`.
/// A macro, so the unstable `VaList` type never has to be named.
macro_rules! collect_va_args {
    ($plan:expr, $args:expr, $out:expr) => {{
        for class in $plan {
            let arg = match *class {
                ArgClass::Int => FormatArg::Int(i64::from(unsafe { $args.next_arg::<c_int>() })),
                ArgClass::Long => FormatArg::Int(i64::from(unsafe { $args.next_arg::<c_long>() })),
                ArgClass::LongLong => {
                    FormatArg::Int(i64::from(unsafe { $args.next_arg::<c_longlong>() }))
                }
                ArgClass::Size => FormatArg::Int(unsafe { $args.next_arg::<usize>() } as i64),
                ArgClass::Ptrdiff => FormatArg::Int(unsafe { $args.next_arg::<isize>() } as i64),
                ArgClass::IntMax => FormatArg::Int(unsafe { $args.next_arg::<i64>() }),
                ArgClass::Double => FormatArg::Float(unsafe { $args.next_arg::<c_double>() }),
                ArgClass::Pointer => {
                    FormatArg::Pointer(unsafe { $args.next_arg::<*mut c_void>() } as usize)
                }
                ArgClass::CStr(bound) => {
                    let ptr = unsafe { $args.next_arg::<*const c_char>() };
                    let bound = str_bound(bound, &$out);
                    if ptr.is_null() {
                        FormatArg::Str(None)
                    } else {
                        FormatArg::Str(Some(unsafe { c_str_bytes(ptr, bound) }))
                    }
                }
            };
            $out.push(arg);
        }
    }};
}

/// Byte limit for a `%s` argument. `collected` holds the arguments read so
/// far, which always includes a `*` precision slot.
fn str_bound(bound: StrBound, collected: &[FormatArg<'_>]) -> Option<usize> {
    match bound {
        StrBound::Unbounded => None,
        StrBound::Fixed(n) => Some(n),
        StrBound::Arg(slot) => match collected.get(slot) {
            Some(FormatArg::Int(p)) => usize::try_from(*p).ok(),
            _ => None,
        },
    }
}

/// Store a `%n` count with the integer width its length modifier names.
///
/// # Safety
///
/// `write.addr` must point to a writable object of that type.
unsafe fn store_count(write: &CountWrite) {
    let count = write.count;
    unsafe {
        match write.length {
            LengthMod::Hh => *(write.addr as *mut i8) = count as i8,
            LengthMod::H => *(write.addr as *mut i16) = count as i16,
            LengthMod::L => *(write.addr as *mut c_long) = count as c_long,
            LengthMod::Ll | LengthMod::BigL => *(write.addr as *mut c_longlong) = count as c_longlong,
            LengthMod::J => *(write.addr as *mut i64) = count as i64,
            LengthMod::Z | LengthMod::T => *(write.addr as *mut isize) = count as isize,
            LengthMod::None => *(write.addr as *mut c_int) = count as c_int,
        }
    }
}

fn format_errno(err: FormatError) -> c_int {
    match err {
        FormatError::Overflow => EOVERFLOW,
        _ => EINVAL,
    }
}

/// C `sprintf`.
///
/// The caller sizes `buffer`; the rendered bytes plus a NUL are written
/// unconditionally. Returns the byte count without the NUL, or `-1` with
/// errno set when the format cannot be honored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasmlibc_sprintf(
    buffer: *mut c_char,
    format: *const c_char,
    mut args: ...
) -> c_int {
    if buffer.is_null() || format.is_null() {
        set_errno(EINVAL);
        return -1;
    }

    let fmt = unsafe { c_str_bytes(format, None) };
    let segments = parse_format_string(fmt);
    // An undecodable directive means the argument types are unknown, so
    // nothing may be read from the list.
    let plan = match arg_plan(&segments) {
        Ok(plan) => plan,
        Err(err) => {
            set_errno(format_errno(err));
            return -1;
        }
    };

    let mut values = Vec::with_capacity(plan.len());
    collect_va_args!(&plan, args, values);

    let rendered = match render(&segments, &values) {
        Ok(rendered) => rendered,
        Err(err) => {
            set_errno(format_errno(err));
            return -1;
        }
    };

    let len = rendered.bytes.len();
    unsafe {
        std::ptr::copy_nonoverlapping(rendered.bytes.as_ptr(), buffer.cast::<u8>(), len);
        *buffer.add(len) = 0;
        for write in &rendered.counts {
            store_count(write);
        }
    }
    // `render` refuses output beyond `c_int::MAX`.
    len as c_int
}
