//! Compiler flags for building the amalgamation against the shim.

use std::fmt;

/// Target triple used when the embedder does not pick one.
pub const DEFAULT_TARGET: &str = "wasm32-unknown-emscripten";

/// SQLite configuration the shim set is sized for. `SQLITE_OS_OTHER` keeps the
/// amalgamation away from every OS interface the shim does not provide.
const SQLITE_DEFINES: &[&str] = &[
    "SQLITE_OS_OTHER",
    "SQLITE_USE_URI",
    "SQLITE_THREADSAFE=0",
    "SQLITE_TEMP_STORE=2",
    "SQLITE_DEFAULT_CACHE_SIZE=-16384",
    "SQLITE_DEFAULT_PAGE_SIZE=8192",
    "SQLITE_OMIT_DEPRECATED",
    "SQLITE_OMIT_LOAD_EXTENSION",
    "SQLITE_OMIT_SHARED_CACHE",
    "SQLITE_ENABLE_UNLOCK_NOTIFY",
    "SQLITE_ENABLE_API_ARMOR",
    "SQLITE_ENABLE_MATH_FUNCTIONS",
    "SQLITE_ENABLE_BYTECODE_VTAB",
    "SQLITE_ENABLE_DBPAGE_VTAB",
    "SQLITE_ENABLE_DBSTAT_VTAB",
    "SQLITE_ENABLE_FTS5",
    "SQLITE_ENABLE_OFFSET_SQL_FUNC",
    "SQLITE_ENABLE_PREUPDATE_HOOK",
    "SQLITE_ENABLE_RTREE",
    "SQLITE_ENABLE_SESSION",
    "SQLITE_ENABLE_STMTVTAB",
    "SQLITE_ENABLE_UNKNOWN_SQL_FUNCTION",
    "SQLITE_ENABLE_COLUMN_METADATA",
];

const CIPHER_DEFINES: &[&str] = &["__WASM__", "ARGON2_NO_THREADS"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmalgamationVariant {
    #[default]
    Sqlite,
    /// Cipher-enabled amalgamation; needs its own wasm and threading switches.
    MultipleCiphers,
}

impl fmt::Display for AmalgamationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::MultipleCiphers => "multiple-ciphers",
        })
    }
}

/// How the embedding build compiles the amalgamation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub target: String,
    pub variant: AmalgamationVariant,
    /// Path of the forced-include header; `None` when the embedder links its
    /// own libc and no redirection applies.
    pub shim_header: Option<String>,
    /// Target supports atomics and shared memory.
    pub threads: bool,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_owned(),
            variant: AmalgamationVariant::default(),
            shim_header: None,
            threads: false,
        }
    }
}

/// Compiler arguments for `plan`, in the order they must be passed.
#[must_use]
pub fn render_flags(plan: &BuildPlan) -> Vec<String> {
    let mut flags = Vec::with_capacity(SQLITE_DEFINES.len() + 8);
    flags.push(format!("--target={}", plan.target));

    let variant_defines = match plan.variant {
        AmalgamationVariant::Sqlite => &[][..],
        AmalgamationVariant::MultipleCiphers => CIPHER_DEFINES,
    };
    for define in SQLITE_DEFINES.iter().chain(variant_defines) {
        let flag = format!("-D{define}");
        if !flags.contains(&flag) {
            flags.push(flag);
        }
    }

    if let Some(header) = &plan.shim_header {
        flags.push("-include".to_owned());
        flags.push(header.clone());
    }
    if plan.threads {
        flags.push("-pthread".to_owned());
    }
    flags
}
