//! Character-set scans: strspn, strcspn.

/// A set of byte values, one bit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    /// The empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: [0; 4] }
    }

    /// Builds the set from the bytes of a NUL-terminated string, excluding the NUL.
    #[must_use]
    pub fn from_c_str(accept: &[u8]) -> Self {
        let mut set = Self::new();
        for &b in accept.iter().take_while(|&&b| b != 0) {
            set.insert(b);
        }
        set
    }

    pub fn insert(&mut self, b: u8) {
        self.bits[usize::from(b >> 6)] |= 1u64 << (b & 63);
    }

    #[must_use]
    pub const fn contains(&self, b: u8) -> bool {
        self.bits[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }
}

/// Length of the initial segment of `s` made only of bytes in `accept`.
///
/// Equivalent to C `strspn`. Both arguments are NUL-terminated strings; the
/// terminator of `s` always ends the segment.
pub fn strspn(s: &[u8], accept: &[u8]) -> usize {
    let set = ByteSet::from_c_str(accept);
    s.iter()
        .take_while(|&&b| b != 0 && set.contains(b))
        .count()
}

/// Length of the initial segment of `s` containing no byte from `reject`.
///
/// Equivalent to C `strcspn`. Returns the length of `s` when no byte matches.
pub fn strcspn(s: &[u8], reject: &[u8]) -> usize {
    let set = ByteSet::from_c_str(reject);
    s.iter()
        .take_while(|&&b| b != 0 && !set.contains(b))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_set_membership() {
        let set = ByteSet::from_c_str(b"a\xFF\x01\0zz");
        assert!(set.contains(b'a'));
        assert!(set.contains(0xFF));
        assert!(set.contains(0x01));
        assert!(!set.contains(b'z'));
        assert!(!set.contains(0));
    }

    #[test]
    fn test_strcspn_cases() {
        assert_eq!(strcspn(b"hello world\0", b"aeiou\0"), 1);
        assert_eq!(strcspn(b"hello world\0", b"xyz\0"), 11);
        assert_eq!(strcspn(b"hello world\0", b"h\0"), 0);
        assert_eq!(strcspn(b"\0", b"abc\0"), 0);
        assert_eq!(strcspn(b"abc\0", b"\0"), 3);
    }

    #[test]
    fn test_strspn_cases() {
        assert_eq!(strspn(b"hello world\0", b"helo\0"), 5);
        assert_eq!(strspn(b"hello world\0", b"helo wrd\0"), 11);
        assert_eq!(strspn(b"hello world\0", b"xyz\0"), 0);
        assert_eq!(strspn(b"\0", b"abc\0"), 0);
    }

    #[test]
    fn test_span_stops_at_terminator() {
        assert_eq!(strspn(b"aa\0aa", b"a\0"), 2);
        assert_eq!(strcspn(b"ab\0cd", b"x\0"), 2);
    }

    #[test]
    fn test_span_sql_tokens() {
        let sql = b"SELECT name FROM t\0";
        assert_eq!(strcspn(sql, b" \t\n\0"), 6);
        assert_eq!(strspn(sql, b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\0"), 6);
    }
}
