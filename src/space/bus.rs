//! `MemorySpace` assembles a simulated address space from named RAM regions and
//! resolves addresses through a bucketed index, so lookups stay cheap no matter
//! how many regions are mapped. `BusHandle` is the cloneable `MemoryHandle`
//! over a shared space; two handles are the same space exactly when they point
//! at the same `MemorySpace` allocation.
use std::{
    fmt,
    sync::{Arc, RwLock},
};

use ahash::AHashMap;
use bitflags::bitflags;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::{
    config::SpaceConfig,
    endianness::Endianness,
    error::{AccessError, AccessResult},
    handle::{Address, MemoryHandle, RawBytes},
};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u8 {
        const READ = 0b0000_0001;
        const WRITE = 0b0000_0010;
        const RW = Self::READ.bits() | Self::WRITE.bits();
    }
}

struct Region {
    name: String,
    base: Address,
    end: Address,
    flags: RegionFlags,
    bytes: RwLock<Vec<u8>>,
}

impl Region {
    fn contains(&self, address: Address) -> bool {
        self.base <= address && address < self.end
    }

    fn overlaps(&self, base: Address, end: Address) -> bool {
        self.base < end && base < self.end
    }

    /// Byte range inside the region for an access of `len` bytes at `address`.
    fn span(&self, address: Address, len: usize) -> AccessResult<std::ops::Range<usize>> {
        let access_end = address
            .checked_add(len as u64)
            .filter(|end| *end <= self.end)
            .ok_or(AccessError::OutOfRange {
                address,
                len,
                end: self.end,
            })?;
        Ok((address - self.base) as usize..(access_end - self.base) as usize)
    }
}

pub struct MemorySpace {
    config: SpaceConfig,
    bucket_bits: u8,
    regions: RwLock<Vec<Arc<Region>>>,
    names: RwLock<AHashMap<String, usize>>,
    buckets: RwLock<AHashMap<u64, SmallVec<[usize; 2]>>>,
}

impl MemorySpace {
    pub fn new(config: SpaceConfig) -> AccessResult<Self> {
        config.validate()?;
        debug!(
            address_width = config.address_width,
            endianness = ?config.endianness,
            "created memory space"
        );
        Ok(Self {
            config,
            bucket_bits: config.bucket_bits,
            regions: RwLock::new(Vec::new()),
            names: RwLock::new(AHashMap::new()),
            buckets: RwLock::new(AHashMap::new()),
        })
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    fn bucket_index(&self, address: Address) -> u64 {
        address >> self.bucket_bits
    }

    /// Maps `len` zeroed, readable and writable bytes at `base`.
    pub fn map_ram(&self, name: impl Into<String>, base: Address, len: usize) -> AccessResult<()> {
        self.map_region(name, base, vec![0; len], RegionFlags::RW)
    }

    /// Maps `bytes` at `base` with the given access flags.
    pub fn map_region(
        &self,
        name: impl Into<String>,
        base: Address,
        bytes: Vec<u8>,
        flags: RegionFlags,
    ) -> AccessResult<()> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(AccessError::Overlap {
                address: base,
                details: format!("region '{name}' is empty"),
            });
        }
        let end = base
            .checked_add(bytes.len() as u64)
            .ok_or(AccessError::Overlap {
                address: base,
                details: "range exceeds address space".into(),
            })?;

        let mut regions = self.regions.write()?;
        let mut names = self.names.write()?;
        let mut buckets = self.buckets.write()?;
        if names.contains_key(&name) {
            return Err(AccessError::Overlap {
                address: base,
                details: format!("region '{name}' already mapped"),
            });
        }

        let first = self.bucket_index(base);
        let last = self.bucket_index(end - 1);
        for idx in first..=last {
            let conflict = buckets
                .get(&idx)
                .into_iter()
                .flatten()
                .map(|id| &regions[*id])
                .find(|existing| existing.overlaps(base, end));
            if let Some(existing) = conflict {
                return Err(AccessError::Overlap {
                    address: base,
                    details: format!("conflicts with region '{}'", existing.name),
                });
            }
        }

        let id = regions.len();
        debug!(
            region = %name,
            base = format_args!("0x{base:X}"),
            len = bytes.len(),
            ?flags,
            "mapped region"
        );
        regions.push(Arc::new(Region {
            name: name.clone(),
            base,
            end,
            flags,
            bytes: RwLock::new(bytes),
        }));
        names.insert(name, id);
        for idx in first..=last {
            buckets.entry(idx).or_default().push(id);
        }
        Ok(())
    }

    fn resolve(&self, address: Address) -> AccessResult<Arc<Region>> {
        let regions = self.regions.read()?;
        let buckets = self.buckets.read()?;
        buckets
            .get(&self.bucket_index(address))
            .into_iter()
            .flatten()
            .map(|id| &regions[*id])
            .find(|region| region.contains(address))
            .cloned()
            .ok_or(AccessError::NotMapped { address })
    }

    /// Base address of a mapped region, by name.
    pub fn region_base(&self, name: &str) -> Option<Address> {
        let regions = self.regions.read().ok()?;
        let names = self.names.read().ok()?;
        names.get(name).map(|id| regions[*id].base)
    }

    pub fn read(&self, address: Address, out: &mut [u8]) -> AccessResult<()> {
        if out.is_empty() {
            return Ok(());
        }
        let region = self.resolve(address)?;
        if !region.flags.contains(RegionFlags::READ) {
            return Err(AccessError::NotMapped { address });
        }
        let span = region.span(address, out.len())?;
        let bytes = region.bytes.read()?;
        out.copy_from_slice(&bytes[span]);
        Ok(())
    }

    pub fn write(&self, address: Address, data: &[u8]) -> AccessResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let region = self.resolve(address)?;
        if !region.flags.contains(RegionFlags::WRITE) {
            return Err(AccessError::ReadOnly {
                region: region.name.clone(),
                address,
            });
        }
        let span = region.span(address, data.len())?;
        let mut bytes = region.bytes.write()?;
        bytes[span].copy_from_slice(data);
        Ok(())
    }
}

impl fmt::Debug for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let regions = self.regions.read().map(|r| r.len()).unwrap_or_default();
        f.debug_struct("MemorySpace")
            .field("config", &self.config)
            .field("regions", &regions)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct BusHandle {
    space: Arc<MemorySpace>,
}

impl BusHandle {
    pub fn new(space: impl Into<Arc<MemorySpace>>) -> Self {
        Self {
            space: space.into(),
        }
    }

    pub fn space(&self) -> &Arc<MemorySpace> {
        &self.space
    }
}

impl MemoryHandle for BusHandle {
    fn address_width(&self) -> usize {
        self.space.config.address_width
    }

    fn endianness(&self) -> Endianness {
        self.space.config.endianness
    }

    fn read_raw(&self, address: Address, len: usize) -> AccessResult<RawBytes> {
        trace!(address = format_args!("0x{address:X}"), len, "read_raw");
        let mut out = RawBytes::from_elem(0, len);
        self.space.read(address, &mut out)?;
        Ok(out)
    }

    fn write_raw(&self, address: Address, bytes: &[u8]) -> AccessResult<()> {
        trace!(address = format_args!("0x{address:X}"), len = bytes.len(), "write_raw");
        self.space.write(address, bytes)
    }

    fn same_space(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.space, &other.space)
    }
}
