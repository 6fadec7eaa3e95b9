//! Error numbers used by the shim.
//!
//! The foreign source compares `errno` against the constants from the C headers
//! it was compiled with, so the values must follow the target's numbering:
//! emscripten and WASI share one table, Linux hosts (tests, benches) use theirs.

#[cfg(target_family = "wasm")]
mod consts {
    pub const EDOM: i32 = 18;
    pub const EFAULT: i32 = 21;
    pub const EINTR: i32 = 27;
    pub const EINVAL: i32 = 28;
    pub const EIO: i32 = 29;
    pub const ENOMEM: i32 = 48;
    pub const ENOSYS: i32 = 52;
    pub const EOVERFLOW: i32 = 61;
    pub const ERANGE: i32 = 68;
}

#[cfg(not(target_family = "wasm"))]
mod consts {
    pub const EINTR: i32 = 4;
    pub const EIO: i32 = 5;
    pub const ENOMEM: i32 = 12;
    pub const EFAULT: i32 = 14;
    pub const EINVAL: i32 = 22;
    pub const EDOM: i32 = 33;
    pub const ERANGE: i32 = 34;
    pub const ENOSYS: i32 = 38;
    pub const EOVERFLOW: i32 = 75;
}

pub use consts::*;

/// Short symbolic name for an errno value, for diagnostics and fixture output.
#[must_use]
pub fn errno_name(code: i32) -> &'static str {
    match code {
        0 => "0",
        EDOM => "EDOM",
        EFAULT => "EFAULT",
        EINTR => "EINTR",
        EINVAL => "EINVAL",
        EIO => "EIO",
        ENOMEM => "ENOMEM",
        ENOSYS => "ENOSYS",
        EOVERFLOW => "EOVERFLOW",
        ERANGE => "ERANGE",
        _ => "E?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let mut all = [
            EDOM, EFAULT, EINTR, EINVAL, EIO, ENOMEM, ENOSYS, EOVERFLOW, ERANGE,
        ];
        all.sort_unstable();
        assert!(all.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn names_round_trip() {
        assert_eq!(errno_name(EDOM), "EDOM");
        assert_eq!(errno_name(ENOMEM), "ENOMEM");
        assert_eq!(errno_name(0), "0");
        assert_eq!(errno_name(-7), "E?");
    }
}
