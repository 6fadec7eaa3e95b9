#![no_main]
use libfuzzer_sys::fuzz_target;
use wasmlibc_membrane::{FreeResult, HeapLimits, HeapRegistry, QuarantineLimits};

// Ops are 4 bytes: [op, size lo, size hi, slot].
fuzz_target!(|data: &[u8]| {
    let heap = HeapRegistry::new(HeapLimits {
        max_live_bytes: Some(1 << 20),
        quarantine: QuarantineLimits { entries: 16, bytes: 1 << 16 },
    });
    let mut live: Vec<(*mut u8, usize)> = Vec::new();

    for chunk in data.chunks_exact(4) {
        let size = usize::from(u16::from_le_bytes([chunk[1], chunk[2]]));
        let slot = usize::from(chunk[3]);
        match chunk[0] % 4 {
            0 => {
                if let Ok(ptr) = heap.allocate(size) {
                    // SAFETY: fresh block of `size` bytes.
                    unsafe { std::ptr::write_bytes(ptr.as_ptr(), chunk[3], size) };
                    live.push((ptr.as_ptr(), size));
                }
            }
            1 if !live.is_empty() => {
                let (ptr, _) = live.swap_remove(slot % live.len());
                assert_eq!(heap.free(ptr), FreeResult::Freed);
            }
            2 if !live.is_empty() => {
                let i = slot % live.len();
                let (ptr, old) = live[i];
                if let Ok(new) = heap.reallocate(ptr, size) {
                    live[i] = (new.as_ptr(), size);
                } else {
                    assert!(heap.lookup(ptr as usize).is_some(), "failed realloc lost {old} bytes");
                }
            }
            _ => {
                // Calloc with an arbitrary element count must never wrap.
                if let Ok(ptr) = heap.allocate_zeroed(slot, size) {
                    live.push((ptr.as_ptr(), slot * size));
                }
            }
        }
        let expected: usize = live.iter().map(|&(_, size)| size).sum();
        assert_eq!(heap.snapshot().live_bytes, expected as u64);
    }

    for (ptr, _) in live {
        assert_eq!(heap.free(ptr), FreeResult::Freed);
    }
    assert_eq!(heap.snapshot().fatal_frees, 0);
});
