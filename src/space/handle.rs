//! The capability every typed accessor is routed through.
//!
//! A `MemoryHandle` only has to move raw bytes; typed reads, address-sized
//! slots and alignment checks are layered on top as provided methods so that
//! every implementation decodes scalars and pointers the same way.
use smallvec::SmallVec;

use crate::layout::{Remote, Scalar};

use super::{
    endianness::{Endianness, MAX_SCALAR_BYTES},
    error::{AccessError, AccessResult},
};

/// Numeric location inside a handle's space. Only the low `address_width()`
/// bytes are meaningful for a given handle.
pub type Address = u64;

/// Sentinel meaning "no location".
pub const INVALID: Address = 0;

/// Raw bytes moved across the handle boundary; scalars and addresses stay inline.
pub type RawBytes = SmallVec<[u8; MAX_SCALAR_BYTES]>;

/// Mask selecting the meaningful bits of an address `width` bytes wide.
#[inline(always)]
pub const fn address_mask(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width * 8)) - 1
    }
}

pub trait MemoryHandle: Clone {
    /// Bytes used to store an address inside this space.
    fn address_width(&self) -> usize;

    fn endianness(&self) -> Endianness;

    /// Copies exactly `len` bytes starting at `address`.
    fn read_raw(&self, address: Address, len: usize) -> AccessResult<RawBytes>;

    /// Copies all of `bytes` to `address`.
    fn write_raw(&self, address: Address, bytes: &[u8]) -> AccessResult<()>;

    /// True when both handles reach the same underlying memory.
    fn same_space(&self, other: &Self) -> bool;

    fn read<T: Scalar>(&self, address: Address) -> AccessResult<T> {
        let raw = self.read_raw(address, T::SIZE)?;
        T::decode(&raw, self.endianness())
    }

    fn write<T: Scalar>(&self, address: Address, value: T) -> AccessResult<()> {
        let mut raw = RawBytes::from_elem(0, T::SIZE);
        value.encode(self.endianness(), &mut raw);
        self.write_raw(address, &raw)
    }

    /// Reads an address stored in this space's width and byte order.
    fn read_address(&self, address: Address) -> AccessResult<Address> {
        let width = checked_width(self.address_width())?;
        let raw = self.read_raw(address, width)?;
        Ok(self.endianness().decode(&raw) as Address)
    }

    fn write_address(&self, address: Address, value: Address) -> AccessResult<()> {
        let width = checked_width(self.address_width())?;
        let mut raw = RawBytes::from_elem(0, width);
        self.endianness()
            .encode(u128::from(value & address_mask(width)), &mut raw);
        self.write_raw(address, &raw)
    }

    /// Non-sentinel and aligned for `T` under this handle's address width.
    fn valid_offset<T: Remote>(&self, address: Address) -> bool {
        let align = T::layout(self.address_width()).align.max(1);
        address != INVALID && address % align == 0
    }
}

pub(crate) fn checked_width(width: usize) -> AccessResult<usize> {
    if (1..=8).contains(&width) {
        Ok(width)
    } else {
        Err(AccessError::UnsupportedWidth { bytes: width })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    /// Byte vector addressed from zero; clones share storage.
    #[derive(Clone)]
    struct VecHandle {
        bytes: Rc<RefCell<Vec<u8>>>,
        width: usize,
        endian: Endianness,
    }

    impl VecHandle {
        fn new(len: usize, width: usize, endian: Endianness) -> Self {
            Self {
                bytes: Rc::new(RefCell::new(vec![0; len])),
                width,
                endian,
            }
        }
    }

    impl MemoryHandle for VecHandle {
        fn address_width(&self) -> usize {
            self.width
        }

        fn endianness(&self) -> Endianness {
            self.endian
        }

        fn read_raw(&self, address: Address, len: usize) -> AccessResult<RawBytes> {
            let start = address as usize;
            Ok(RawBytes::from_slice(&self.bytes.borrow()[start..start + len]))
        }

        fn write_raw(&self, address: Address, bytes: &[u8]) -> AccessResult<()> {
            let start = address as usize;
            self.bytes.borrow_mut()[start..start + bytes.len()].copy_from_slice(bytes);
            Ok(())
        }

        fn same_space(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.bytes, &other.bytes)
        }
    }

    #[test]
    fn typed_round_trip_respects_endianness() {
        let handle = VecHandle::new(16, 8, Endianness::Big);
        handle.write::<u32>(4, 0x0102_0304).unwrap();
        assert_eq!(
            handle.read_raw(4, 4).unwrap().as_slice(),
            &[1, 2, 3, 4],
            "big endian handles store the most significant byte first"
        );
        assert_eq!(handle.read::<u32>(4).unwrap(), 0x0102_0304, "value should round-trip");
    }

    #[test]
    fn addresses_use_handle_width() {
        let handle = VecHandle::new(16, 4, Endianness::Little);
        handle.write_address(0, 0x1_2345_6789).unwrap();
        assert_eq!(
            handle.read_raw(0, 8).unwrap().as_slice(),
            &[0x89, 0x67, 0x45, 0x23, 0, 0, 0, 0],
            "a four byte space truncates the stored address and leaves later bytes alone"
        );
        assert_eq!(handle.read_address(0).unwrap(), 0x2345_6789, "read back is width-limited");
    }

    #[test]
    fn unsupported_width_is_rejected() {
        let handle = VecHandle::new(16, 12, Endianness::Little);
        assert!(
            matches!(
                handle.read_address(0),
                Err(AccessError::UnsupportedWidth { bytes: 12 })
            ),
            "widths beyond eight bytes cannot be represented"
        );
    }

    #[test]
    fn valid_offset_checks_sentinel_and_alignment() {
        let handle = VecHandle::new(16, 4, Endianness::Little);
        assert!(!handle.valid_offset::<u32>(INVALID), "sentinel is never valid");
        assert!(!handle.valid_offset::<u32>(6), "u32 needs four byte alignment");
        assert!(handle.valid_offset::<u32>(8), "aligned non-zero address is valid");
        assert!(handle.valid_offset::<u8>(7), "bytes are valid anywhere but zero");
        assert!(
            !handle.valid_offset::<*mut u64>(6),
            "pointer slots align to the address width"
        );
    }
}
