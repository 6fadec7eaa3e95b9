//! Runtime configuration.
//!
//! Settings come from the environment the first time they are read:
//! - `WASMLIBC_HEAP_LIMIT`: live user bytes before allocations fail with
//!   `ENOMEM` (`0` or unset: unlimited; `k`/`m`/`g` suffixes accepted).
//! - `WASMLIBC_QUARANTINE_ENTRIES` / `WASMLIBC_QUARANTINE_BYTES`: how many
//!   freed blocks are held back before their memory returns to the host.
//! - `WASMLIBC_TZ_OFFSET`: fixed `localtime` offset, seconds east of UTC or
//!   `±HH:MM`. When unset, `localtime` follows the host zone where the host
//!   has one (wasm32 under a JavaScript embedder) and UTC otherwise.
//!
//! wasm hosts usually have no environment at all, so every setting also has a
//! setter that overrides whatever was (or would be) read.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use wasmlibc_core::time::{MAX_OFFSET_SECS, parse_offset};

pub const HEAP_LIMIT_ENV: &str = "WASMLIBC_HEAP_LIMIT";
pub const QUARANTINE_ENTRIES_ENV: &str = "WASMLIBC_QUARANTINE_ENTRIES";
pub const QUARANTINE_BYTES_ENV: &str = "WASMLIBC_QUARANTINE_BYTES";
pub const TZ_OFFSET_ENV: &str = "WASMLIBC_TZ_OFFSET";

pub const DEFAULT_QUARANTINE_ENTRIES: usize = 1024;
pub const DEFAULT_QUARANTINE_BYTES: usize = 4 * 1024 * 1024;

const UNRESOLVED: u8 = 0;
const RESOLVED: u8 = 1;
const RESOLVING: u8 = 255;

/// One environment-backed value.
///
/// Resolution is a non-blocking state machine rather than a `OnceLock`: a
/// reentrant read while the environment is being consulted sees `RESOLVING`
/// and gets the default instead of deadlocking.
struct Setting {
    state: AtomicU8,
    value: AtomicU64,
    env: &'static str,
    default: u64,
    parse: fn(&str) -> Option<u64>,
}

impl Setting {
    const fn new(env: &'static str, default: u64, parse: fn(&str) -> Option<u64>) -> Self {
        Self {
            state: AtomicU8::new(UNRESOLVED),
            value: AtomicU64::new(default),
            env,
            default,
            parse,
        }
    }

    fn get(&self) -> u64 {
        match self.state.load(Ordering::Acquire) {
            RESOLVED => return self.value.load(Ordering::Relaxed),
            RESOLVING => return self.default,
            _ => {}
        }

        if self
            .state
            .compare_exchange(UNRESOLVED, RESOLVING, Ordering::SeqCst, Ordering::Acquire)
            .is_err()
        {
            return if self.state.load(Ordering::Acquire) == RESOLVED {
                self.value.load(Ordering::Relaxed)
            } else {
                self.default
            };
        }

        let value = std::env::var(self.env)
            .ok()
            .and_then(|raw| (self.parse)(&raw))
            .unwrap_or(self.default);
        self.value.store(value, Ordering::Relaxed);
        self.state.store(RESOLVED, Ordering::Release);
        value
    }

    fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
        self.state.store(RESOLVED, Ordering::Release);
    }

    #[cfg(test)]
    fn reset(&self) {
        self.value.store(self.default, Ordering::Relaxed);
        self.state.store(UNRESOLVED, Ordering::Release);
    }
}

/// Held by `TZ_OFFSET` while no offset is configured. Never a valid offset.
const TZ_UNSET: u64 = i64::MIN as u64;

static HEAP_LIMIT: Setting = Setting::new(HEAP_LIMIT_ENV, 0, parse_size);
static QUARANTINE_ENTRIES: Setting = Setting::new(
    QUARANTINE_ENTRIES_ENV,
    DEFAULT_QUARANTINE_ENTRIES as u64,
    parse_size,
);
static QUARANTINE_BYTES: Setting = Setting::new(
    QUARANTINE_BYTES_ENV,
    DEFAULT_QUARANTINE_BYTES as u64,
    parse_size,
);
static TZ_OFFSET: Setting = Setting::new(TZ_OFFSET_ENV, TZ_UNSET, parse_tz);

/// Parse a byte count with an optional binary `k`/`m`/`g` suffix.
#[must_use]
pub fn parse_size(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, shift) = match raw.as_bytes().last()?.to_ascii_lowercase() {
        b'k' => (&raw[..raw.len() - 1], 10),
        b'm' => (&raw[..raw.len() - 1], 20),
        b'g' => (&raw[..raw.len() - 1], 30),
        _ => (raw, 0),
    };
    let base: u64 = digits.trim().parse().ok()?;
    base.checked_mul(1u64 << shift)
}

fn parse_tz(raw: &str) -> Option<u64> {
    parse_offset(raw).map(|secs| i64::from(secs) as u64)
}

/// Live-byte ceiling, or `None` when unlimited.
#[must_use]
pub fn heap_limit() -> Option<usize> {
    match HEAP_LIMIT.get() {
        0 => None,
        limit => Some(usize::try_from(limit).unwrap_or(usize::MAX)),
    }
}

/// Override the heap limit; `None` removes it.
pub fn set_heap_limit(limit: Option<usize>) {
    HEAP_LIMIT.set(limit.map_or(0, |l| l as u64));
}

/// Free-quarantine bounds. A freed block is released once either bound is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarantineLimits {
    pub entries: usize,
    pub bytes: usize,
}

impl Default for QuarantineLimits {
    fn default() -> Self {
        Self {
            entries: DEFAULT_QUARANTINE_ENTRIES,
            bytes: DEFAULT_QUARANTINE_BYTES,
        }
    }
}

#[must_use]
pub fn quarantine_limits() -> QuarantineLimits {
    QuarantineLimits {
        entries: usize::try_from(QUARANTINE_ENTRIES.get()).unwrap_or(usize::MAX),
        bytes: usize::try_from(QUARANTINE_BYTES.get()).unwrap_or(usize::MAX),
    }
}

pub fn set_quarantine(limits: QuarantineLimits) {
    QUARANTINE_ENTRIES.set(limits.entries as u64);
    QUARANTINE_BYTES.set(limits.bytes as u64);
}

/// Configured `localtime` offset in seconds east of UTC, or `None` when
/// neither the environment nor a setter provided one.
#[must_use]
pub fn tz_offset_override() -> Option<i32> {
    match TZ_OFFSET.get() {
        TZ_UNSET => None,
        raw => Some(
            i32::try_from(raw as i64)
                .unwrap_or(0)
                .clamp(-MAX_OFFSET_SECS, MAX_OFFSET_SECS),
        ),
    }
}

/// Fixed `localtime` offset in seconds east of UTC; 0 when unconfigured.
#[must_use]
pub fn tz_offset_secs() -> i32 {
    tz_offset_override().unwrap_or(0)
}

/// Override the `localtime` offset. Values beyond ±18 h are clamped.
pub fn set_tz_offset_secs(offset: i32) {
    let clamped = offset.clamp(-MAX_OFFSET_SECS, MAX_OFFSET_SECS);
    TZ_OFFSET.set(i64::from(clamped) as u64);
}

/// Forget any configured offset, including one read from the environment.
pub fn clear_tz_offset() {
    TZ_OFFSET.set(TZ_UNSET);
}
