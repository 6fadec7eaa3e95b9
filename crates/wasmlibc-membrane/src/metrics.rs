//! Atomic heap counters.
//!
//! All counters use relaxed ordering: they are diagnostic, not
//! synchronization. `live_bytes` is the one exception that carries policy, so
//! its limit check is a single compare-and-swap loop.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by one heap registry.
#[derive(Debug)]
pub struct HeapMetrics {
    /// Successful allocations (malloc, calloc and the new half of realloc).
    pub allocations: AtomicU64,
    /// Blocks freed, directly or by realloc.
    pub frees: AtomicU64,
    pub reallocs: AtomicU64,
    /// Allocations refused (limit, overflow or host exhaustion).
    pub failed_allocations: AtomicU64,
    /// User bytes currently handed out.
    pub live_bytes: AtomicU64,
    pub peak_live_bytes: AtomicU64,
    /// Blocks that entered the free quarantine.
    pub quarantined: AtomicU64,
    /// Blocks whose memory went back to the host.
    pub released: AtomicU64,
    /// Double frees, foreign frees and corrupted blocks.
    pub fatal_frees: AtomicU64,
}

impl HeapMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allocations: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            reallocs: AtomicU64::new(0),
            failed_allocations: AtomicU64::new(0),
            live_bytes: AtomicU64::new(0),
            peak_live_bytes: AtomicU64::new(0),
            quarantined: AtomicU64::new(0),
            released: AtomicU64::new(0),
            fatal_frees: AtomicU64::new(0),
        }
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Account `bytes` as live unless that would exceed `limit`.
    pub fn reserve_live(&self, bytes: usize, limit: Option<usize>) -> bool {
        let bytes = bytes as u64;
        let reserved = self
            .live_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                let next = live.checked_add(bytes)?;
                match limit {
                    Some(limit) if next > limit as u64 => None,
                    _ => Some(next),
                }
            });
        match reserved {
            Ok(previous) => {
                self.peak_live_bytes
                    .fetch_max(previous + bytes, Ordering::Relaxed);
                true
            }
            Err(_) => false,
        }
    }

    pub fn release_live(&self, bytes: usize) {
        self.live_bytes.fetch_sub(bytes as u64, Ordering::AcqRel);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            allocations: Self::get(&self.allocations),
            frees: Self::get(&self.frees),
            reallocs: Self::get(&self.reallocs),
            failed_allocations: Self::get(&self.failed_allocations),
            live_bytes: Self::get(&self.live_bytes),
            peak_live_bytes: Self::get(&self.peak_live_bytes),
            quarantined: Self::get(&self.quarantined),
            released: Self::get(&self.released),
            fatal_frees: Self::get(&self.fatal_frees),
        }
    }
}

impl Default for HeapMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`HeapMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub allocations: u64,
    pub frees: u64,
    pub reallocs: u64,
    pub failed_allocations: u64,
    pub live_bytes: u64,
    pub peak_live_bytes: u64,
    pub quarantined: u64,
    pub released: u64,
    pub fatal_frees: u64,
}

impl MetricsSnapshot {
    /// `(name, value)` pairs in declaration order, for reports.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, u64); 9] {
        [
            ("allocations", self.allocations),
            ("frees", self.frees),
            ("reallocs", self.reallocs),
            ("failed_allocations", self.failed_allocations),
            ("live_bytes", self.live_bytes),
            ("peak_live_bytes", self.peak_live_bytes),
            ("quarantined", self.quarantined),
            ("released", self.released),
            ("fatal_frees", self.fatal_frees),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        assert_eq!(HeapMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn increment_works() {
        let m = HeapMetrics::new();
        HeapMetrics::inc(&m.allocations);
        HeapMetrics::inc(&m.allocations);
        HeapMetrics::inc(&m.frees);
        let snap = m.snapshot();
        assert_eq!(snap.allocations, 2);
        assert_eq!(snap.frees, 1);
    }

    #[test]
    fn live_bytes_respect_limit_and_track_peak() {
        let m = HeapMetrics::new();
        assert!(m.reserve_live(600, Some(1000)));
        assert!(!m.reserve_live(500, Some(1000)));
        assert!(m.reserve_live(400, Some(1000)));
        m.release_live(700);
        let snap = m.snapshot();
        assert_eq!(snap.live_bytes, 300);
        assert_eq!(snap.peak_live_bytes, 1000);
        assert!(m.reserve_live(usize::MAX / 2, None));
    }

    #[test]
    fn snapshot_fields_are_named() {
        let m = HeapMetrics::new();
        HeapMetrics::inc(&m.fatal_frees);
        let fields = m.snapshot().fields();
        assert_eq!(fields[8], ("fatal_frees", 1));
        assert_eq!(fields[0].0, "allocations");
    }
}
