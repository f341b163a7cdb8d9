//! Handle over the host's own address space. Addresses are host pointers, so
//! this is mainly useful as a test double and for in-process structures.
use std::{mem, ptr};

use super::{
    endianness::Endianness,
    error::AccessResult,
    handle::{Address, MemoryHandle, RawBytes},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeHandle {
    _private: (),
}

impl NativeHandle {
    /// # Safety
    ///
    /// Every address reaching `read_raw`/`write_raw` through this handle, directly
    /// or through a `Ptr`/`Ref` built on it, is dereferenced as a host pointer.
    /// The caller must only access live, properly sized host memory, and must not
    /// write through it while Rust references to that memory are alive.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryHandle for NativeHandle {
    fn address_width(&self) -> usize {
        mem::size_of::<usize>()
    }

    fn endianness(&self) -> Endianness {
        Endianness::native()
    }

    fn read_raw(&self, address: Address, len: usize) -> AccessResult<RawBytes> {
        // SAFETY: the constructor's contract makes `address..address + len` readable.
        let bytes = unsafe { std::slice::from_raw_parts(address as usize as *const u8, len) };
        Ok(RawBytes::from_slice(bytes))
    }

    fn write_raw(&self, address: Address, bytes: &[u8]) -> AccessResult<()> {
        // SAFETY: the constructor's contract makes the destination writable.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), address as usize as *mut u8, bytes.len());
        }
        Ok(())
    }

    fn same_space(&self, _other: &Self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_host_memory() {
        let mut cells = [0u32; 4];
        let base = cells.as_mut_ptr() as usize as Address;
        // SAFETY: only addresses inside `cells` are touched while it is alive.
        let handle = unsafe { NativeHandle::new() };
        handle.write::<u32>(base + 4, 0xC0FF_EE00).unwrap();
        assert_eq!(
            handle.read::<u32>(base + 4).unwrap(),
            0xC0FF_EE00,
            "typed read should see the typed write"
        );
        assert_eq!(cells[1], 0xC0FF_EE00, "the write lands in host memory");
    }

    #[test]
    fn reports_host_geometry() {
        // SAFETY: no memory is accessed.
        let handle = unsafe { NativeHandle::new() };
        assert_eq!(
            handle.address_width(),
            mem::size_of::<usize>(),
            "native addresses are host pointer sized"
        );
        assert_eq!(handle.endianness(), Endianness::native(), "native byte order");
        assert!(handle.same_space(&handle.clone()), "there is only one host space");
    }
}
