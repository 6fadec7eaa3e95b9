//! Block header and trailing canary.
//!
//! Every registry block is laid out as
//! `[header: 16 bytes][user bytes][canary: 8 bytes]`, where the header is
//! `[u64 user size | u32 generation | u32 tag]`. The tag and the canary are
//! both derived from `(user address, size, generation)`, so a block whose
//! metadata was overwritten, or whose end was overrun, no longer verifies.

/// Size of the header in front of the user pointer.
pub const HEADER_SIZE: usize = 16;

/// Size of the canary after the last user byte.
pub const CANARY_SIZE: usize = 8;

/// Header plus canary.
pub const TOTAL_OVERHEAD: usize = HEADER_SIZE + CANARY_SIZE;

const CANARY_SALT: u64 = 0xA076_1D64_78BD_642F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub size: u64,
    pub generation: u32,
    pub tag: u32,
}

impl BlockHeader {
    #[must_use]
    pub fn compute(user_base: usize, size: usize, generation: u32) -> Self {
        Self {
            size: size as u64,
            generation,
            tag: (mix(user_base, size, generation) >> 32) as u32,
        }
    }

    /// Header still describes a block of `size` bytes at `user_base`.
    #[must_use]
    pub fn verify(&self, user_base: usize, size: usize) -> bool {
        self.size == size as u64 && *self == Self::compute(user_base, size, self.generation)
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.size.to_le_bytes());
        buf[8..12].copy_from_slice(&self.generation.to_le_bytes());
        buf[12..16].copy_from_slice(&self.tag.to_le_bytes());
        buf
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let [s0, s1, s2, s3, s4, s5, s6, s7, g0, g1, g2, g3, t0, t1, t2, t3] = *buf;
        Self {
            size: u64::from_le_bytes([s0, s1, s2, s3, s4, s5, s6, s7]),
            generation: u32::from_le_bytes([g0, g1, g2, g3]),
            tag: u32::from_le_bytes([t0, t1, t2, t3]),
        }
    }

    #[must_use]
    pub fn canary(&self, user_base: usize) -> [u8; CANARY_SIZE] {
        let size = self.size as usize;
        (mix(user_base, size, self.generation) ^ CANARY_SALT).to_le_bytes()
    }
}

/// splitmix64 finalizer over the packed block identity.
///
/// Not cryptographic: the canary only has to be unlikely to survive a stray
/// write.
fn mix(user_base: usize, size: usize, generation: u32) -> u64 {
    let mut z = (user_base as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add((size as u64).rotate_left(29))
        ^ u64::from(generation);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
