//! Raw byte scanning: memchr.
//!
//! Unlike the `str*` family, these functions never stop at a NUL byte; the
//! caller's count is the only bound.

/// Scans the first `n` bytes of `haystack` for `needle`.
///
/// Equivalent to C `memchr`. Returns the index of the first occurrence, or
/// `None` if the byte does not appear in the window. A window of zero bytes
/// never matches. The window is clipped to the slice.
pub fn memchr(haystack: &[u8], needle: u8, n: usize) -> Option<usize> {
    let count = n.min(haystack.len());
    haystack[..count].iter().position(|&b| b == needle)
}
