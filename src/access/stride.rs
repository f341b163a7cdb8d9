//! Address arithmetic shared by `Ptr` and pointer-slot references. Results wrap
//! within the handle's address width.

use crate::space::{Address, address_mask};

/// Width assumed for pointers that are not bound to any handle.
pub(crate) const HOST_ADDRESS_WIDTH: usize = std::mem::size_of::<usize>();

#[inline(always)]
pub(crate) fn offset(address: Address, count: isize, stride: u64, width: usize) -> Address {
    let delta = (count as i64).wrapping_mul(stride as i64);
    address.wrapping_add_signed(delta) & address_mask(width)
}

#[inline(always)]
pub(crate) fn index(address: Address, index: usize, stride: u64, width: usize) -> Address {
    address.wrapping_add((index as u64).wrapping_mul(stride)) & address_mask(width)
}

#[inline(always)]
pub(crate) fn displace(address: Address, bytes: u64, width: usize) -> Address {
    address.wrapping_add(bytes) & address_mask(width)
}
