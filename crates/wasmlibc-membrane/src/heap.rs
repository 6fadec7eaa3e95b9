//! Checked heap registry.
//!
//! Every block handed to foreign code is registered here, keyed by its user
//! address. A block carries a [`BlockHeader`] in front and a canary behind it.
//! Freed blocks stay registered in a bounded FIFO quarantine before their
//! memory goes back to the host, which is what lets a second `free` of the
//! same pointer be told apart from a pointer the registry never issued.
//!
//! Thread-safe via sharded `parking_lot::Mutex`.

#![allow(unsafe_code)]

use parking_lot::Mutex;
use std::alloc::{Layout, alloc, alloc_zeroed, dealloc};
use std::collections::{HashMap, VecDeque};
use std::ptr::NonNull;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::{self, QuarantineLimits};
use crate::fingerprint::{BlockHeader, CANARY_SIZE, HEADER_SIZE, TOTAL_OVERHEAD};
use crate::metrics::{HeapMetrics, MetricsSnapshot};

/// Alignment of every user pointer; covers `max_align_t` on wasm32 and x86_64.
pub const MIN_ALIGN: usize = 16;

/// Number of shards for registry locks (power of 2).
const NUM_SHARDS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    #[error("requested size overflows the address space")]
    SizeOverflow,
    #[error("heap limit of {limit} bytes would be exceeded by {requested} more")]
    LimitExceeded { requested: usize, limit: usize },
    #[error("host allocator could not provide {0} bytes")]
    HostExhausted(usize),
    #[error("alignment {0} is not a power of two")]
    BadAlignment(usize),
}

/// Result of a free operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeResult {
    /// Block verified and moved to quarantine.
    Freed,
    /// Trailing canary was overwritten (write past the end of the block).
    FreedWithCanaryCorruption,
    /// Pointer is still quarantined from an earlier free.
    DoubleFree,
    /// Pointer is not a live or quarantined block of this registry.
    ForeignPointer,
    /// Registered block whose header no longer verifies.
    InvalidPointer,
}

impl FreeResult {
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Freed)
    }

    /// Diagnostic wording used by the ABI before aborting.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Freed => "freed",
            Self::FreedWithCanaryCorruption => "heap buffer overflow detected (canary corrupted)",
            Self::DoubleFree => "double free",
            Self::ForeignPointer => "pointer was not allocated by this heap",
            Self::InvalidPointer => "block header corrupted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReallocError {
    /// No memory for the new block; the old block is untouched.
    #[error(transparent)]
    Heap(#[from] HeapError),
    /// The old pointer failed verification.
    #[error("realloc of bad pointer: {}", .0.describe())]
    BadPointer(FreeResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Live,
    Quarantined,
}

/// Public view of one registered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub user_base: usize,
    pub user_size: usize,
    pub generation: u32,
    pub state: SlotState,
}

/// Limits a registry enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapLimits {
    pub max_live_bytes: Option<usize>,
    pub quarantine: QuarantineLimits,
}

#[derive(Debug, Clone, Copy)]
enum LimitSource {
    /// Re-read the process configuration on every call.
    Config,
    Fixed(HeapLimits),
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    raw_base: usize,
    user_size: usize,
    generation: u32,
    state: SlotState,
}

#[derive(Debug, Clone, Copy)]
struct QuarantineEntry {
    user_base: usize,
    raw_base: usize,
    total_size: usize,
}

#[derive(Default)]
struct Shard {
    slots: HashMap<usize, Slot>,
    quarantine: VecDeque<QuarantineEntry>,
    quarantine_bytes: usize,
}

/// Thread-safe registry of shim-issued heap blocks.
pub struct HeapRegistry {
    shards: Box<[Mutex<Shard>]>,
    next_generation: AtomicU32,
    limits: LimitSource,
    metrics: HeapMetrics,
}

static REGISTRY: LazyLock<HeapRegistry> = LazyLock::new(HeapRegistry::from_config);

/// The process-wide registry behind the exported allocator.
#[must_use]
pub fn registry() -> &'static HeapRegistry {
    &REGISTRY
}

impl HeapRegistry {
    /// Registry with fixed limits, independent of the process configuration.
    #[must_use]
    pub fn new(limits: HeapLimits) -> Self {
        Self::with_source(LimitSource::Fixed(limits))
    }

    /// Registry that follows `config` (heap limit, quarantine bounds), including
    /// overrides applied after construction.
    #[must_use]
    pub fn from_config() -> Self {
        Self::with_source(LimitSource::Config)
    }

    fn with_source(limits: LimitSource) -> Self {
        let shards: Vec<Mutex<Shard>> = (0..NUM_SHARDS)
            .map(|_| Mutex::new(Shard::default()))
            .collect();
        Self {
            shards: shards.into_boxed_slice(),
            next_generation: AtomicU32::new(1),
            limits,
            metrics: HeapMetrics::new(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &HeapMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn limits(&self) -> HeapLimits {
        match self.limits {
            LimitSource::Config => HeapLimits {
                max_live_bytes: config::heap_limit(),
                quarantine: config::quarantine_limits(),
            },
            LimitSource::Fixed(limits) => limits,
        }
    }

    /// Allocate `size` bytes. Zero is a valid size and yields a unique block.
    pub fn allocate(&self, size: usize) -> Result<NonNull<u8>, HeapError> {
        self.allocate_block(size, false)
            .inspect_err(|_| HeapMetrics::inc(&self.metrics.failed_allocations))
    }

    /// Allocate `count * size` zeroed bytes, failing on multiplication overflow.
    pub fn allocate_zeroed(&self, count: usize, size: usize) -> Result<NonNull<u8>, HeapError> {
        count
            .checked_mul(size)
            .ok_or(HeapError::SizeOverflow)
            .and_then(|total| self.allocate_block(total, true))
            .inspect_err(|_| HeapMetrics::inc(&self.metrics.failed_allocations))
    }

    fn allocate_block(&self, user_size: usize, zeroed: bool) -> Result<NonNull<u8>, HeapError> {
        let total_size = user_size
            .checked_add(TOTAL_OVERHEAD)
            .ok_or(HeapError::SizeOverflow)?;
        let layout = block_layout(total_size)?;

        let max_live = self.limits().max_live_bytes;
        if !self.metrics.reserve_live(user_size, max_live) {
            return Err(HeapError::LimitExceeded {
                requested: user_size,
                limit: max_live.unwrap_or(usize::MAX),
            });
        }

        // SAFETY: layout has non-zero size (TOTAL_OVERHEAD > 0) and valid alignment.
        let raw_ptr = unsafe {
            if zeroed {
                alloc_zeroed(layout)
            } else {
                alloc(layout)
            }
        };
        if raw_ptr.is_null() {
            self.metrics.release_live(user_size);
            return Err(HeapError::HostExhausted(total_size));
        }

        let raw_base = raw_ptr as usize;
        let user_base = raw_base + HEADER_SIZE;
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let header = BlockHeader::compute(user_base, user_size, generation);

        // SAFETY: raw_ptr is valid for total_size = HEADER_SIZE + user_size + CANARY_SIZE
        // bytes. The header fills [raw_base, user_base) and the canary
        // [user_base + user_size, raw_base + total_size).
        unsafe {
            std::ptr::copy_nonoverlapping(header.to_bytes().as_ptr(), raw_ptr, HEADER_SIZE);
            let canary_ptr = raw_ptr.add(HEADER_SIZE + user_size);
            std::ptr::copy_nonoverlapping(header.canary(user_base).as_ptr(), canary_ptr, CANARY_SIZE);
        }

        let slot = Slot {
            raw_base,
            user_size,
            generation,
            state: SlotState::Live,
        };
        // The host allocator cannot hand out an address that is still
        // registered: quarantined memory has not been deallocated yet.
        self.shard_for(user_base).lock().slots.insert(user_base, slot);
        HeapMetrics::inc(&self.metrics.allocations);

        // SAFETY: user_base = raw_base + HEADER_SIZE and raw_base is non-null.
        Ok(unsafe { NonNull::new_unchecked(user_base as *mut u8) })
    }

    /// Release a block into the quarantine.
    ///
    /// Anything but [`FreeResult::Freed`] means the caller's heap is corrupt;
    /// the registry leaves such blocks as they are.
    pub fn free(&self, user_ptr: *mut u8) -> FreeResult {
        let user_base = user_ptr as usize;
        let mut shard = self.shard_for(user_base).lock();

        let result = match shard.slots.get(&user_base) {
            None => FreeResult::ForeignPointer,
            Some(slot) if slot.state == SlotState::Quarantined => FreeResult::DoubleFree,
            Some(slot) => verify_block(user_base, slot),
        };
        if result != FreeResult::Freed {
            HeapMetrics::inc(&self.metrics.fatal_frees);
            return result;
        }

        let limits = self.limits().quarantine;
        let Some(slot) = shard.slots.get_mut(&user_base) else {
            return FreeResult::ForeignPointer;
        };
        slot.state = SlotState::Quarantined;
        slot.generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let user_size = slot.user_size;
        let entry = QuarantineEntry {
            user_base,
            raw_base: slot.raw_base,
            total_size: user_size + TOTAL_OVERHEAD,
        };

        shard.quarantine.push_back(entry);
        shard.quarantine_bytes += entry.total_size;
        HeapMetrics::inc(&self.metrics.frees);
        HeapMetrics::inc(&self.metrics.quarantined);
        self.metrics.release_live(user_size);

        self.drain_quarantine(&mut shard, shard_limits(limits));
        FreeResult::Freed
    }

    /// Resize a block by moving it.
    ///
    /// A null pointer allocates. Size zero frees the old block and returns a
    /// fresh zero-size one. On [`ReallocError::Heap`] the old block is intact.
    pub fn reallocate(&self, user_ptr: *mut u8, new_size: usize) -> Result<NonNull<u8>, ReallocError> {
        HeapMetrics::inc(&self.metrics.reallocs);
        if user_ptr.is_null() {
            return Ok(self.allocate(new_size)?);
        }

        let old = self.live_block(user_ptr as usize).map_err(|r| {
            HeapMetrics::inc(&self.metrics.fatal_frees);
            ReallocError::BadPointer(r)
        })?;

        if new_size == 0 {
            match self.free(user_ptr) {
                FreeResult::Freed => return Ok(self.allocate(0)?),
                bad => return Err(ReallocError::BadPointer(bad)),
            }
        }

        let new_ptr = self.allocate(new_size)?;
        // SAFETY: old is a verified live block of old.user_size bytes; new_ptr
        // is a fresh block of new_size bytes; distinct blocks never overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(
                user_ptr.cast_const(),
                new_ptr.as_ptr(),
                old.user_size.min(new_size),
            );
        }
        match self.free(user_ptr) {
            FreeResult::Freed => Ok(new_ptr),
            bad => Err(ReallocError::BadPointer(bad)),
        }
    }

    /// Snapshot of the block registered at exactly `user_ptr`.
    #[must_use]
    pub fn lookup(&self, user_ptr: usize) -> Option<BlockInfo> {
        let shard = self.shard_for(user_ptr).lock();
        shard.slots.get(&user_ptr).map(|slot| BlockInfo {
            user_base: user_ptr,
            user_size: slot.user_size,
            generation: slot.generation,
            state: slot.state,
        })
    }

    /// Usable size of a live block.
    #[must_use]
    pub fn usable_size(&self, user_ptr: usize) -> Option<usize> {
        self.lookup(user_ptr)
            .filter(|info| info.state == SlotState::Live)
            .map(|info| info.user_size)
    }

    /// Release every quarantined block back to the host.
    pub fn flush_quarantine(&self) {
        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            self.drain_quarantine(
                &mut shard,
                QuarantineLimits {
                    entries: 0,
                    bytes: 0,
                },
            );
        }
    }

    fn live_block(&self, user_base: usize) -> Result<BlockInfo, FreeResult> {
        let shard = self.shard_for(user_base).lock();
        match shard.slots.get(&user_base) {
            None => Err(FreeResult::ForeignPointer),
            Some(slot) if slot.state == SlotState::Quarantined => Err(FreeResult::DoubleFree),
            Some(slot) => match verify_block(user_base, slot) {
                FreeResult::Freed => Ok(BlockInfo {
                    user_base,
                    user_size: slot.user_size,
                    generation: slot.generation,
                    state: slot.state,
                }),
                bad => Err(bad),
            },
        }
    }

    fn shard_for(&self, addr: usize) -> &Mutex<Shard> {
        // User pointers are 16-aligned; skip the always-zero bits.
        &self.shards[(addr >> 4) % NUM_SHARDS]
    }

    fn drain_quarantine(&self, shard: &mut Shard, limits: QuarantineLimits) {
        while shard.quarantine.len() > limits.entries || shard.quarantine_bytes > limits.bytes {
            let Some(entry) = shard.quarantine.pop_front() else {
                break;
            };
            shard.slots.remove(&entry.user_base);
            shard.quarantine_bytes -= entry.total_size;
            release(entry.raw_base, entry.total_size);
            HeapMetrics::inc(&self.metrics.released);
        }
    }
}

impl Drop for HeapRegistry {
    /// Returns all remaining memory to the host. Pointers still held by
    /// foreign code dangle afterwards.
    fn drop(&mut self) {
        for shard in self.shards.iter_mut() {
            let shard = shard.get_mut();
            for slot in shard.slots.values() {
                release(slot.raw_base, slot.user_size + TOTAL_OVERHEAD);
            }
            shard.slots.clear();
            shard.quarantine.clear();
            shard.quarantine_bytes = 0;
        }
    }
}

/// Per-shard share of the process-wide quarantine bounds.
fn shard_limits(limits: QuarantineLimits) -> QuarantineLimits {
    QuarantineLimits {
        entries: limits.entries.div_ceil(NUM_SHARDS),
        bytes: limits.bytes.div_ceil(NUM_SHARDS),
    }
}

fn block_layout(total_size: usize) -> Result<Layout, HeapError> {
    if !MIN_ALIGN.is_power_of_two() {
        return Err(HeapError::BadAlignment(MIN_ALIGN));
    }
    Layout::from_size_align(total_size, MIN_ALIGN).map_err(|_| HeapError::SizeOverflow)
}

fn verify_block(user_base: usize, slot: &Slot) -> FreeResult {
    let mut header_bytes = [0u8; HEADER_SIZE];
    let mut canary = [0u8; CANARY_SIZE];
    // SAFETY: the slot is registered, so its memory has not been released and
    // spans [raw_base, raw_base + HEADER_SIZE + user_size + CANARY_SIZE).
    unsafe {
        std::ptr::copy_nonoverlapping(
            slot.raw_base as *const u8,
            header_bytes.as_mut_ptr(),
            HEADER_SIZE,
        );
        std::ptr::copy_nonoverlapping(
            (user_base + slot.user_size) as *const u8,
            canary.as_mut_ptr(),
            CANARY_SIZE,
        );
    }
    let header = BlockHeader::from_bytes(&header_bytes);
    if !header.verify(user_base, slot.user_size) {
        return FreeResult::InvalidPointer;
    }
    if header.canary(user_base) != canary {
        return FreeResult::FreedWithCanaryCorruption;
    }
    FreeResult::Freed
}

fn release(raw_base: usize, total_size: usize) {
    let Ok(layout) = Layout::from_size_align(total_size, MIN_ALIGN) else {
        return;
    };
    // SAFETY: raw_base was returned by alloc/alloc_zeroed with exactly this
    // layout and is released once, when its slot leaves the registry.
    unsafe { dealloc(raw_base as *mut u8, layout) };
}
