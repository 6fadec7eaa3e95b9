//! ABI layer for `getentropy`.
//!
//! Bytes come from the host: `crypto.getRandomValues` on wasm32, the kernel
//! elsewhere. Any length is filled; requests are split at the host's limit.

use std::ffi::{c_int, c_void};

use wasmlibc_core::errno::{EFAULT, EIO, ENOSYS};

use crate::errno_abi::set_errno;

/// Why the host could not supply entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntropyError {
    /// No entropy source exists in this host.
    Unavailable,
    /// The source exists but failed.
    Failed,
}

impl EntropyError {
    const fn errno(self) -> c_int {
        match self {
            Self::Unavailable => ENOSYS,
            Self::Failed => EIO,
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod host {
    use super::EntropyError;
    use wasm_bindgen::JsValue;
    use wasm_bindgen::prelude::wasm_bindgen;

    /// `getRandomValues` rejects views longer than this.
    const CHUNK: usize = 65_536;

    #[wasm_bindgen]
    extern "C" {
        #[cfg(not(target_feature = "atomics"))]
        #[wasm_bindgen(js_namespace = ["globalThis", "crypto"], js_name = getRandomValues, catch)]
        fn get_random_values(buf: &mut [u8]) -> Result<(), JsValue>;

        // A view over shared memory is rejected, so fill a copy instead.
        #[cfg(target_feature = "atomics")]
        #[wasm_bindgen(js_namespace = ["globalThis", "crypto"], js_name = getRandomValues, catch)]
        fn get_random_values(buf: &js_sys::Uint8Array) -> Result<(), JsValue>;
    }

    fn has_crypto() -> bool {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("crypto"))
            .map(|crypto| !crypto.is_undefined() && !crypto.is_null())
            .unwrap_or(false)
    }

    pub(super) fn fill(buf: &mut [u8]) -> Result<(), EntropyError> {
        if !has_crypto() {
            return Err(EntropyError::Unavailable);
        }
        for chunk in buf.chunks_mut(CHUNK) {
            #[cfg(not(target_feature = "atomics"))]
            get_random_values(chunk).map_err(|_| EntropyError::Failed)?;

            #[cfg(target_feature = "atomics")]
            {
                let array = js_sys::Uint8Array::new_with_length(chunk.len() as u32);
                get_random_values(&array).map_err(|_| EntropyError::Failed)?;
                array.copy_to(chunk);
            }
        }
        Ok(())
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod host {
    use super::EntropyError;

    pub(super) fn fill(buf: &mut [u8]) -> Result<(), EntropyError> {
        let mut filled = 0;
        while filled < buf.len() {
            let rest = &mut buf[filled..];
            // SAFETY: `rest` is a valid writable region of `rest.len()` bytes.
            let n = unsafe { libc::getrandom(rest.as_mut_ptr().cast(), rest.len(), 0) };
            if n < 0 {
                match std::io::Error::last_os_error().raw_os_error() {
                    Some(libc::EINTR) => continue,
                    Some(libc::ENOSYS) => return Err(EntropyError::Unavailable),
                    _ => return Err(EntropyError::Failed),
                }
            }
            filled += n as usize;
        }
        Ok(())
    }
}

#[cfg(all(
    unix,
    not(target_arch = "wasm32"),
    not(any(target_os = "linux", target_os = "android"))
))]
mod host {
    use super::EntropyError;

    /// POSIX `getentropy` refuses larger requests.
    const CHUNK: usize = 256;

    pub(super) fn fill(buf: &mut [u8]) -> Result<(), EntropyError> {
        for chunk in buf.chunks_mut(CHUNK) {
            // SAFETY: `chunk` is a valid writable region of at most 256 bytes.
            if unsafe { libc::getentropy(chunk.as_mut_ptr().cast(), chunk.len()) } != 0 {
                return Err(EntropyError::Failed);
            }
        }
        Ok(())
    }
}

#[cfg(not(any(unix, target_arch = "wasm32")))]
mod host {
    use super::EntropyError;

    pub(super) fn fill(_buf: &mut [u8]) -> Result<(), EntropyError> {
        Err(EntropyError::Unavailable)
    }
}

abi_fn! {
    fn wasmlibc_getentropy(buffer: *mut c_void, length: usize) -> c_int {
        if length == 0 {
            return 0;
        }
        if buffer.is_null() {
            set_errno(EFAULT);
            return -1;
        }
        let buf = std::slice::from_raw_parts_mut(buffer.cast::<u8>(), length);
        match host::fill(buf) {
            Ok(()) => 0,
            Err(err) => {
                set_errno(err.errno());
                -1
            }
        }
    }
}
