//! Storage and category-independent behaviour shared by every `Ref`.

use std::{any, fmt, marker::PhantomData};

use crate::{
    layout::{Remote, size_under_handle},
    space::{Address, MemoryHandle},
};

use super::{
    mutability::{Const, Mut, Mutability},
    pointer::Ptr,
};

/// A location known to hold a `T`, reached through `handle`.
///
/// Category-specific operations are defined in the sibling modules; this type
/// only stores the handle, the address and the access marker `M`.
pub struct Ref<T, H, M = Mut> {
    handle: H,
    address: Address,
    _marker: PhantomData<fn() -> (T, M)>,
}

impl<T, H, M> Ref<T, H, M> {
    pub fn new(handle: H, address: Address) -> Self {
        Self {
            handle,
            address,
            _marker: PhantomData,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn into_parts(self) -> (H, Address) {
        (self.handle, self.address)
    }
}

impl<T, H: MemoryHandle, M: Mutability> Ref<T, H, M> {
    /// Pointer to this location with the same access.
    pub fn ptr(&self) -> Ptr<T, H, M> {
        Ptr::new(self.handle.clone(), self.address)
    }

    /// Same handle identity and same address.
    pub fn same_location<U, N>(&self, other: &Ref<U, H, N>) -> bool {
        self.handle.same_space(other.handle()) && self.address == other.address()
    }

    pub(crate) fn rebind<U, N>(&self, address: Address) -> Ref<U, H, N> {
        Ref::new(self.handle.clone(), address)
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> Ref<T, H, M> {
    /// Bytes `T` occupies under this reference's handle.
    pub fn size(&self) -> u64 {
        size_under_handle::<T, H>(&self.handle)
    }
}

impl<T, H> Ref<T, H, Mut> {
    /// Read-only view of the same location.
    pub fn freeze(self) -> Ref<T, H, Const> {
        Ref::new(self.handle, self.address)
    }
}

impl<T, H> From<Ref<T, H, Mut>> for Ref<T, H, Const> {
    fn from(value: Ref<T, H, Mut>) -> Self {
        value.freeze()
    }
}

impl<T, H: Clone, M> Clone for Ref<T, H, M> {
    fn clone(&self) -> Self {
        Self::new(self.handle.clone(), self.address)
    }
}

impl<T, H: fmt::Debug, M> fmt::Debug for Ref<T, H, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("type", &any::type_name::<T>())
            .field("handle", &self.handle)
            .field("address", &format_args!("0x{:X}", self.address))
            .finish()
    }
}
