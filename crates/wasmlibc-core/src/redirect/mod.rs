//! Symbol redirection table.
//!
//! Maps every C library name the amalgamation references to the shim symbol
//! that replaces it. The table drives both the forced-include header
//! ([`render_header`]) and the export check the harness runs against the
//! built artifact, so it is the single source of truth for the link surface.

mod flags;
mod header;

use std::fmt;

pub use flags::{AmalgamationVariant, BuildPlan, DEFAULT_TARGET, render_flags};
pub use header::render_header;

/// Prefix carried by every exported shim symbol.
pub const SHIM_PREFIX: &str = "wasmlibc_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolFamily {
    Allocator,
    String,
    Math,
    Time,
    Process,
    Entropy,
    Errno,
    Stdio,
}

impl SymbolFamily {
    pub const ALL: [Self; 8] = [
        Self::Allocator,
        Self::String,
        Self::Math,
        Self::Time,
        Self::Process,
        Self::Entropy,
        Self::Errno,
        Self::Stdio,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allocator => "allocator",
            Self::String => "string",
            Self::Math => "math",
            Self::Time => "time",
            Self::Process => "process",
            Self::Entropy => "entropy",
            Self::Errno => "errno",
            Self::Stdio => "stdio",
        }
    }
}

impl fmt::Display for SymbolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One redirected symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectEntry {
    /// Name the foreign source calls.
    pub original: &'static str,
    /// Exported shim symbol.
    pub replacement: &'static str,
    pub family: SymbolFamily,
    /// C declaration of the replacement, matching the original's signature.
    pub prototype: &'static str,
}

macro_rules! redirect {
    ($family:ident, $original:literal => $replacement:literal, $prototype:literal) => {
        RedirectEntry {
            original: $original,
            replacement: $replacement,
            family: SymbolFamily::$family,
            prototype: $prototype,
        }
    };
}

static REDIRECTS: [RedirectEntry; 25] = [
    redirect!(Allocator, "malloc" => "wasmlibc_malloc", "void *wasmlibc_malloc(size_t size);"),
    redirect!(Allocator, "realloc" => "wasmlibc_realloc", "void *wasmlibc_realloc(void *ptr, size_t size);"),
    redirect!(Allocator, "free" => "wasmlibc_free", "void wasmlibc_free(void *ptr);"),
    redirect!(Allocator, "calloc" => "wasmlibc_calloc", "void *wasmlibc_calloc(size_t num, size_t size);"),
    redirect!(String, "strcmp" => "wasmlibc_strcmp", "int wasmlibc_strcmp(const char *l, const char *r);"),
    redirect!(String, "strcpy" => "wasmlibc_strcpy", "char *wasmlibc_strcpy(char *dest, const char *src);"),
    redirect!(String, "strncpy" => "wasmlibc_strncpy", "char *wasmlibc_strncpy(char *d, const char *s, size_t n);"),
    redirect!(String, "strcat" => "wasmlibc_strcat", "char *wasmlibc_strcat(char *dest, const char *src);"),
    redirect!(String, "strncat" => "wasmlibc_strncat", "char *wasmlibc_strncat(char *d, const char *s, size_t n);"),
    redirect!(String, "strcspn" => "wasmlibc_strcspn", "size_t wasmlibc_strcspn(const char *s, const char *c);"),
    redirect!(String, "strspn" => "wasmlibc_strspn", "size_t wasmlibc_strspn(const char *s, const char *c);"),
    redirect!(String, "strncmp" => "wasmlibc_strncmp", "int wasmlibc_strncmp(const char *l, const char *r, size_t n);"),
    redirect!(String, "strrchr" => "wasmlibc_strrchr", "char *wasmlibc_strrchr(const char *s, int c);"),
    redirect!(String, "strchr" => "wasmlibc_strchr", "char *wasmlibc_strchr(const char *s, int c);"),
    redirect!(String, "memchr" => "wasmlibc_memchr", "void *wasmlibc_memchr(const void *src, int c, size_t n);"),
    redirect!(Math, "acosh" => "wasmlibc_acosh", "double wasmlibc_acosh(double x);"),
    redirect!(Math, "asinh" => "wasmlibc_asinh", "double wasmlibc_asinh(double x);"),
    redirect!(Math, "atanh" => "wasmlibc_atanh", "double wasmlibc_atanh(double x);"),
    redirect!(Math, "trunc" => "wasmlibc_trunc", "double wasmlibc_trunc(double x);"),
    redirect!(Math, "sqrt" => "wasmlibc_sqrt", "double wasmlibc_sqrt(double x);"),
    redirect!(Time, "localtime" => "wasmlibc_localtime", "struct tm *wasmlibc_localtime(const time_t *t);"),
    redirect!(Process, "abort" => "wasmlibc_abort", "_Noreturn void wasmlibc_abort(void);"),
    redirect!(Entropy, "getentropy" => "wasmlibc_getentropy", "int wasmlibc_getentropy(void *buffer, size_t len);"),
    redirect!(Errno, "__errno_location" => "wasmlibc_errno_location", "int *wasmlibc_errno_location(void);"),
    redirect!(Stdio, "sprintf" => "wasmlibc_sprintf", "int wasmlibc_sprintf(char *buffer, const char *format, ...);"),
];

/// The complete redirection table, in header order.
#[must_use]
pub fn redirects() -> &'static [RedirectEntry] {
    &REDIRECTS
}

/// Entry for a foreign-source name.
#[must_use]
pub fn lookup(original: &str) -> Option<&'static RedirectEntry> {
    REDIRECTS.iter().find(|e| e.original == original)
}

/// Entry for an exported shim symbol.
#[must_use]
pub fn by_replacement(name: &str) -> Option<&'static RedirectEntry> {
    REDIRECTS.iter().find(|e| e.replacement == name)
}

/// Entries of one family, in table order.
pub fn family(family: SymbolFamily) -> impl Iterator<Item = &'static RedirectEntry> {
    REDIRECTS.iter().filter(move |e| e.family == family)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectError {
    DuplicateOriginal(&'static str),
    DuplicateReplacement(&'static str),
    MissingPrefix(&'static str),
    /// A replacement collides with a name the table redirects away.
    ShadowsOriginal(&'static str),
    InvalidIdentifier(&'static str),
    /// The prototype does not declare the replacement symbol.
    PrototypeMismatch(&'static str),
}

impl fmt::Display for RedirectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateOriginal(n) => write!(f, "original symbol '{n}' redirected twice"),
            Self::DuplicateReplacement(n) => write!(f, "replacement '{n}' used twice"),
            Self::MissingPrefix(n) => write!(f, "replacement '{n}' lacks the '{SHIM_PREFIX}' prefix"),
            Self::ShadowsOriginal(n) => write!(f, "replacement '{n}' is itself a redirected name"),
            Self::InvalidIdentifier(n) => write!(f, "'{n}' is not a C identifier"),
            Self::PrototypeMismatch(n) => write!(f, "prototype does not declare '{n}'"),
        }
    }
}

impl std::error::Error for RedirectError {}

/// Check that a table is injective and that every replacement is a distinct,
/// prefixed C identifier declared by its prototype.
pub fn validate(table: &[RedirectEntry]) -> Result<(), RedirectError> {
    for (i, entry) in table.iter().enumerate() {
        if !is_c_identifier(entry.original) {
            return Err(RedirectError::InvalidIdentifier(entry.original));
        }
        if !is_c_identifier(entry.replacement) {
            return Err(RedirectError::InvalidIdentifier(entry.replacement));
        }
        if !entry.replacement.starts_with(SHIM_PREFIX) {
            return Err(RedirectError::MissingPrefix(entry.replacement));
        }
        if !declares(entry.prototype, entry.replacement) {
            return Err(RedirectError::PrototypeMismatch(entry.replacement));
        }
        for other in &table[..i] {
            if other.original == entry.original {
                return Err(RedirectError::DuplicateOriginal(entry.original));
            }
            if other.replacement == entry.replacement {
                return Err(RedirectError::DuplicateReplacement(entry.replacement));
            }
        }
        if table.iter().any(|e| e.original == entry.replacement) {
            return Err(RedirectError::ShadowsOriginal(entry.replacement));
        }
    }
    Ok(())
}

fn is_c_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    matches!(bytes.next(), Some(b) if b == b'_' || b.is_ascii_alphabetic())
        && bytes.all(|b| b == b'_' || b.is_ascii_alphanumeric())
}

/// `prototype` names `symbol` immediately followed by its parameter list.
fn declares(prototype: &str, symbol: &str) -> bool {
    prototype.match_indices(symbol).any(|(at, _)| {
        let before = prototype[..at].bytes().next_back();
        let boundary = !matches!(before, Some(b) if b == b'_' || b.is_ascii_alphanumeric());
        boundary && prototype[at + symbol.len()..].starts_with('(')
    })
}
