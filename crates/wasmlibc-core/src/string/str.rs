//! NUL-terminated string operations: strlen, strcmp, strncmp, strcpy,
//! strncpy, strcat, strncat, strchr, strrchr.
//!
//! Strings are `&[u8]` slices in which the first `0x00` byte marks the logical
//! end. A slice without a NUL is treated as if it were terminated right after
//! its last byte, which is how the ABI layer hands over bounded scans.

/// Returns the length of a NUL-terminated byte string (not counting the NUL).
///
/// Equivalent to C `strlen`. If no NUL is found, returns the full slice length.
pub fn strlen(s: &[u8]) -> usize {
    s.iter().position(|&b| b == 0).unwrap_or(s.len())
}

fn byte_at(s: &[u8], i: usize) -> u8 {
    s.get(i).copied().unwrap_or(0)
}

/// Compares two NUL-terminated byte strings lexicographically.
///
/// Equivalent to C `strcmp`. Bytes compare as `unsigned char`; the result is
/// the difference of the first pair that differs, so only its sign is portable.
pub fn strcmp(s1: &[u8], s2: &[u8]) -> i32 {
    let mut i = 0;
    loop {
        let a = byte_at(s1, i);
        let b = byte_at(s2, i);
        if a != b {
            return i32::from(a) - i32::from(b);
        }
        if a == 0 {
            return 0;
        }
        i += 1;
    }
}

/// Compares at most `n` bytes of two NUL-terminated byte strings.
///
/// Equivalent to C `strncmp`. Like [`strcmp`], but stops after `n` bytes.
pub fn strncmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    for i in 0..n {
        let a = byte_at(s1, i);
        let b = byte_at(s2, i);
        if a != b {
            return i32::from(a) - i32::from(b);
        }
        if a == 0 {
            return 0;
        }
    }
    0
}

/// Copies a NUL-terminated string from `src` into `dest`.
///
/// Equivalent to C `strcpy`. Returns the number of bytes written, terminator
/// included.
///
/// # Panics
///
/// Panics if `dest` is too small to hold the source string plus NUL.
pub fn strcpy(dest: &mut [u8], src: &[u8]) -> usize {
    let src_len = strlen(src);
    assert!(
        dest.len() > src_len,
        "strcpy: destination buffer too small ({} bytes for {} byte string + NUL)",
        dest.len(),
        src_len
    );
    dest[..src_len].copy_from_slice(&src[..src_len]);
    dest[src_len] = 0;
    src_len + 1
}

/// Copies at most `n` bytes from `src` into `dest`.
///
/// Equivalent to C `strncpy`. A short source is padded with NUL bytes up to
/// `n`; a source of `n` bytes or more leaves `dest` unterminated.
///
/// Returns the number of bytes written to `dest` (always `min(n, dest.len())`).
pub fn strncpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    let count = n.min(dest.len());
    let copy_len = strlen(src).min(count);

    dest[..copy_len].copy_from_slice(&src[..copy_len]);
    dest[copy_len..count].fill(0);

    count
}

/// Appends `src` to the end of the NUL-terminated string in `dest`.
///
/// Equivalent to C `strcat`. Returns the length of the resulting string.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn strcat(dest: &mut [u8], src: &[u8]) -> usize {
    strncat(dest, src, usize::MAX)
}

/// Appends at most `n` bytes from `src` to the NUL-terminated string in `dest`.
///
/// Equivalent to C `strncat`. Always NUL-terminates the result, so up to
/// `n + 1` bytes are written after the existing string.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn strncat(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    let dest_len = strlen(dest);
    let src_len = strlen(src).min(n);
    let total = dest_len + src_len;
    assert!(
        dest.len() > total,
        "strncat: destination buffer too small ({} bytes for {} byte result + NUL)",
        dest.len(),
        total,
    );
    dest[dest_len..total].copy_from_slice(&src[..src_len]);
    dest[total] = 0;
    total
}

/// Locates the first occurrence of `c` in the NUL-terminated string `s`.
///
/// Equivalent to C `strchr`. If `c` is `0`, returns the index of the
/// terminator.
pub fn strchr(s: &[u8], c: u8) -> Option<usize> {
    let len = strlen(s);
    if c == 0 {
        return Some(len);
    }
    s[..len].iter().position(|&b| b == c)
}

/// Locates the last occurrence of `c` in the NUL-terminated string `s`.
///
/// Equivalent to C `strrchr`.
pub fn strrchr(s: &[u8], c: u8) -> Option<usize> {
    let len = strlen(s);
    if c == 0 {
        return Some(len);
    }
    s[..len].iter().rposition(|&b| b == c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strlen_basic() {
        assert_eq!(strlen(b"hello\0"), 5);
        assert_eq!(strlen(b"\0"), 0);
        assert_eq!(strlen(b"abc"), 3);
    }

    #[test]
    fn test_strcmp_equal() {
        assert_eq!(strcmp(b"abc\0", b"abc\0"), 0);
        assert_eq!(strcmp(b"\0", b"\0"), 0);
    }

    #[test]
    fn test_strcmp_less() {
        assert!(strcmp(b"abc\0", b"abd\0") < 0);
    }

    #[test]
    fn test_strcmp_greater() {
        assert!(strcmp(b"abd\0", b"abc\0") > 0);
    }

    #[test]
    fn test_strcmp_prefix() {
        assert!(strcmp(b"ab\0", b"abc\0") < 0);
        assert!(strcmp(b"abc\0", b"ab\0") > 0);
    }

    #[test]
    fn test_strcmp_is_unsigned() {
        // 0xE9 sorts after ASCII as unsigned char.
        assert!(strcmp(b"\xE9\0", b"z\0") > 0);
        assert_eq!(strcmp(b"\x80\0", b"\x7F\0"), 1);
    }

    #[test]
    fn test_strcmp_ignores_bytes_after_nul() {
        assert_eq!(strcmp(b"ab\0x", b"ab\0y"), 0);
    }

    #[test]
    fn test_strncmp_basic() {
        assert_eq!(strncmp(b"abcdef\0", b"abcxyz\0", 3), 0);
        assert!(strncmp(b"abcdef\0", b"abcxyz\0", 4) < 0);
        assert_eq!(strncmp(b"a\0", b"b\0", 0), 0);
    }

    #[test]
    fn test_strncmp_stops_at_nul() {
        assert_eq!(strncmp(b"ab\0cd", b"ab\0ef", 5), 0);
    }

    #[test]
    fn test_strcpy_basic() {
        let mut buf = [0u8; 10];
        let n = strcpy(&mut buf, b"hello\0");
        assert_eq!(n, 6);
        assert_eq!(&buf[..6], b"hello\0");
    }

    #[test]
    fn test_strncpy_pads() {
        let mut buf = [0xFFu8; 10];
        strncpy(&mut buf, b"hi\0", 5);
        assert_eq!(&buf[..5], b"hi\0\0\0");
        assert_eq!(buf[5], 0xFF);
    }

    #[test]
    fn test_strncpy_truncate() {
        let mut buf = [0xFFu8; 3];
        strncpy(&mut buf, b"hello\0", 3);
        assert_eq!(&buf, b"hel");
    }

    #[test]
    fn test_strcat_basic() {
        let mut buf = [0u8; 12];
        strcpy(&mut buf, b"hello\0");
        let total = strcat(&mut buf, b" world\0");
        assert_eq!(total, 11);
        assert_eq!(&buf[..12], b"hello world\0");
    }

    #[test]
    fn test_strncat_basic() {
        let mut buf = [0u8; 10];
        strcpy(&mut buf, b"hi\0");
        let total = strncat(&mut buf, b"there\0", 3);
        assert_eq!(total, 5);
        assert_eq!(&buf[..6], b"hithe\0");
    }

    #[test]
    fn test_strncat_query_fragment() {
        let mut buf = [0u8; 32];
        strcpy(&mut buf, b"SELECT \0");
        let total = strncat(&mut buf, b"name, age FROM users\0", 12);
        assert_eq!(&buf[..=total], b"SELECT name, age FR\0");
    }

    #[test]
    fn test_strncat_short_source() {
        let mut buf = [0u8; 16];
        strcpy(&mut buf, b"ab\0");
        assert_eq!(strncat(&mut buf, b"cd\0", 10), 4);
        assert_eq!(&buf[..5], b"abcd\0");
    }

    #[test]
    fn test_strchr_found() {
        assert_eq!(strchr(b"hello\0", b'l'), Some(2));
    }

    #[test]
    fn test_strchr_not_found() {
        assert_eq!(strchr(b"hello\0", b'z'), None);
    }

    #[test]
    fn test_strchr_nul() {
        assert_eq!(strchr(b"hello\0", 0), Some(5));
        assert_eq!(strrchr(b"hello\0", 0), Some(5));
    }

    #[test]
    fn test_strrchr_found() {
        assert_eq!(strrchr(b"hello\0", b'l'), Some(3));
        assert_eq!(strrchr(b"a/b/c.db\0", b'/'), Some(3));
    }

    #[test]
    fn test_strchr_does_not_search_past_nul() {
        assert_eq!(strchr(b"ab\0c", b'c'), None);
        assert_eq!(strrchr(b"ab\0b", b'b'), Some(1));
    }
}
