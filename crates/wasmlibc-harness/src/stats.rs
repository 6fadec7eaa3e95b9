//! Heap metrics smoke run for the `stats` command.

use wasmlibc_membrane::{FreeResult, HeapLimits, HeapRegistry, MetricsSnapshot};

/// Drive a private registry through a small malloc/realloc/free workload,
/// including one double free, and return its counters.
#[must_use]
pub fn smoke_snapshot() -> MetricsSnapshot {
    let heap = HeapRegistry::new(HeapLimits::default());
    let mut blocks = Vec::new();
    for size in [0usize, 16, 100, 4096] {
        if let Ok(ptr) = heap.allocate(size) {
            blocks.push(ptr);
        }
    }
    if let Some(first) = blocks.pop()
        && let Ok(grown) = heap.reallocate(first.as_ptr(), 8192)
    {
        blocks.push(grown);
    }
    let mut last = None;
    for ptr in blocks {
        if heap.free(ptr.as_ptr()) == FreeResult::Freed {
            last = Some(ptr);
        }
    }
    if let Some(ptr) = last {
        // Reported, not fatal: this registry is not behind the C ABI.
        let _ = heap.free(ptr.as_ptr());
    }
    heap.snapshot()
}

/// Snapshot as a JSON object keyed by counter name.
#[must_use]
pub fn snapshot_json(snapshot: &MetricsSnapshot) -> serde_json::Value {
    snapshot
        .fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_run_counts_workload() {
        let snap = smoke_snapshot();
        assert_eq!(snap.allocations, 5);
        assert_eq!(snap.reallocs, 1);
        assert_eq!(snap.frees, 5);
        assert_eq!(snap.fatal_frees, 1);
        assert_eq!(snap.live_bytes, 0);
        assert_eq!(snap.peak_live_bytes, 16 + 100 + 4096 + 8192);
    }

    #[test]
    fn json_has_every_counter() {
        let json = snapshot_json(&smoke_snapshot());
        let obj = json.as_object().expect("object");
        assert_eq!(obj.len(), 9);
        assert_eq!(obj["fatal_frees"], 1);
    }
}
