//! Construction parameters for a simulated [`MemorySpace`](super::MemorySpace).

use super::{
    endianness::Endianness,
    error::{AccessError, AccessResult},
    handle::checked_width,
};

const DEFAULT_ADDRESS_WIDTH: usize = 8;
const DEFAULT_BUCKET_BITS: u8 = 12;
/// Narrower buckets make large regions register one index entry per bucket.
const MIN_BUCKET_BITS: u8 = 8;
const MAX_BUCKET_BITS: u8 = 63;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpaceConfig {
    pub address_width: usize,
    pub endianness: Endianness,
    /// Regions are indexed in buckets of `1 << bucket_bits` addresses.
    pub bucket_bits: u8,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            address_width: DEFAULT_ADDRESS_WIDTH,
            endianness: Endianness::Little,
            bucket_bits: DEFAULT_BUCKET_BITS,
        }
    }
}

impl SpaceConfig {
    pub fn with_address_width(mut self, bytes: usize) -> Self {
        self.address_width = bytes;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_bucket_bits(mut self, bits: u8) -> Self {
        self.bucket_bits = bits;
        self
    }

    pub(crate) fn validate(&self) -> AccessResult<()> {
        checked_width(self.address_width)?;
        if !(MIN_BUCKET_BITS..=MAX_BUCKET_BITS).contains(&self.bucket_bits) {
            return Err(AccessError::UnsupportedBucketBits {
                bits: self.bucket_bits,
            });
        }
        Ok(())
    }
}
