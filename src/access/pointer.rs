//! `Ptr` is a nullable, rebindable location in some handle's space. It owns a
//! clone of its handle, and its own address moves freely with arithmetic
//! regardless of the pointee's access marker. Strides follow the handle's
//! address width, so a pointer to a pointer slot steps by the remote pointer
//! size rather than the host's.
use std::{any, fmt, marker::PhantomData, ops};

use tracing::trace;

use crate::{
    layout::{CastTo, Field, Remote, Struct},
    space::{AccessError, AccessResult, Address, INVALID, MemoryHandle},
};

use super::{
    mutability::{Const, Mut, Mutability},
    reference::Ref,
    stride::{self, HOST_ADDRESS_WIDTH},
};

pub struct Ptr<T, H, M = Mut> {
    handle: Option<H>,
    address: Address,
    _marker: PhantomData<fn() -> (T, M)>,
}

impl<T, H, M> Ptr<T, H, M> {
    /// Unbound pointer at the sentinel address.
    pub const fn null() -> Self {
        Self {
            handle: None,
            address: INVALID,
            _marker: PhantomData,
        }
    }

    /// Bound pointer that has not been given an address yet.
    pub fn unpositioned(handle: H) -> Self {
        Self::new(handle, INVALID)
    }

    pub fn new(handle: H, address: Address) -> Self {
        Self {
            handle: Some(handle),
            address,
            _marker: PhantomData,
        }
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn set_handle(&mut self, handle: Option<H>) {
        self.handle = handle;
    }

    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    /// Drops the handle and resets the address to the sentinel.
    pub fn invalidate(&mut self) {
        trace!(address = format_args!("0x{:X}", self.address), "invalidate pointer");
        self.handle = None;
        self.address = INVALID;
    }

    /// Reinterprets the pointee, allowed only between convertible types.
    pub fn cast<U>(self) -> Ptr<U, H, M>
    where
        T: CastTo<U>,
    {
        Ptr {
            handle: self.handle,
            address: self.address,
            _marker: PhantomData,
        }
    }

    fn bound(&self) -> AccessResult<&H> {
        self.handle.as_ref().ok_or(AccessError::Unbound)
    }
}

impl<T, H> Ptr<T, H, Mut> {
    /// Read-only pointer to the same location.
    pub fn freeze(self) -> Ptr<T, H, Const> {
        Ptr {
            handle: self.handle,
            address: self.address,
            _marker: PhantomData,
        }
    }
}

impl<T, H> From<Ptr<T, H, Mut>> for Ptr<T, H, Const> {
    fn from(value: Ptr<T, H, Mut>) -> Self {
        value.freeze()
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> Ptr<T, H, M> {
    /// Bound to a handle and holding a non-sentinel address aligned for `T`.
    pub fn valid(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| handle.valid_offset::<T>(self.address))
    }

    fn width(&self) -> usize {
        self.handle
            .as_ref()
            .map_or(HOST_ADDRESS_WIDTH, MemoryHandle::address_width)
    }

    /// Bytes between consecutive `T`s under the bound handle.
    pub fn stride(&self) -> u64 {
        T::layout(self.width()).size
    }

    /// The pointer `count` elements away; negative counts move backwards.
    pub fn offset(&self, count: isize) -> Self {
        Self {
            handle: self.handle.clone(),
            address: stride::offset(self.address, count, self.stride(), self.width()),
            _marker: PhantomData,
        }
    }

    pub fn dereference(&self) -> AccessResult<Ref<T, H, M>> {
        Ok(Ref::new(self.bound()?.clone(), self.address))
    }

    /// Like [`dereference`](Self::dereference), but rejects addresses that fail `valid()`.
    pub fn dereference_checked(&self) -> AccessResult<Ref<T, H, M>> {
        let handle = self.bound()?;
        if !handle.valid_offset::<T>(self.address) {
            return Err(AccessError::InvalidAddress {
                address: self.address,
            });
        }
        Ok(Ref::new(handle.clone(), self.address))
    }

    /// Reference to element `index`, without bounds checks.
    pub fn at(&self, index: usize) -> AccessResult<Ref<T, H, M>> {
        let handle = self.bound()?;
        let address = stride::index(self.address, index, self.stride(), self.width());
        Ok(Ref::new(handle.clone(), address))
    }

    /// Prefix increment.
    pub fn increment(&mut self) -> &mut Self {
        *self += 1;
        self
    }

    /// Prefix decrement.
    pub fn decrement(&mut self) -> &mut Self {
        *self -= 1;
        self
    }

    /// Postfix increment; returns the pointer as it was.
    pub fn post_increment(&mut self) -> Self {
        let previous = self.clone();
        *self += 1;
        previous
    }

    /// Postfix decrement; returns the pointer as it was.
    pub fn post_decrement(&mut self) -> Self {
        let previous = self.clone();
        *self -= 1;
        previous
    }
}

impl<S: Struct, H: MemoryHandle, M: Mutability> Ptr<S, H, M> {
    /// Member shortcut: `(*ptr).field`.
    pub fn field<F: Remote>(&self, field: Field<S, F>) -> AccessResult<Ref<F, H, M>> {
        Ok(self.dereference()?.field(field))
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> ops::Add<isize> for Ptr<T, H, M> {
    type Output = Self;

    fn add(self, count: isize) -> Self {
        self.offset(count)
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> ops::Add<isize> for &Ptr<T, H, M> {
    type Output = Ptr<T, H, M>;

    fn add(self, count: isize) -> Ptr<T, H, M> {
        self.offset(count)
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> ops::Sub<isize> for Ptr<T, H, M> {
    type Output = Self;

    fn sub(self, count: isize) -> Self {
        self.offset(count.wrapping_neg())
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> ops::Sub<isize> for &Ptr<T, H, M> {
    type Output = Ptr<T, H, M>;

    fn sub(self, count: isize) -> Ptr<T, H, M> {
        self.offset(count.wrapping_neg())
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> ops::AddAssign<isize> for Ptr<T, H, M> {
    fn add_assign(&mut self, count: isize) {
        self.address = stride::offset(self.address, count, self.stride(), self.width());
    }
}

impl<T: Remote, H: MemoryHandle, M: Mutability> ops::SubAssign<isize> for Ptr<T, H, M> {
    fn sub_assign(&mut self, count: isize) {
        *self += count.wrapping_neg();
    }
}

impl<T, U, H, M, N> PartialEq<Ptr<U, H, N>> for Ptr<T, H, M>
where
    T: CastTo<U>,
    H: MemoryHandle,
{
    fn eq(&self, other: &Ptr<U, H, N>) -> bool {
        let same_handle = match (&self.handle, &other.handle) {
            (Some(a), Some(b)) => a.same_space(b),
            (None, None) => true,
            _ => false,
        };
        same_handle && self.address == other.address
    }
}

impl<T, H, M> Default for Ptr<T, H, M> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T, H: Clone, M> Clone for Ptr<T, H, M> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            address: self.address,
            _marker: PhantomData,
        }
    }
}

impl<T, H: fmt::Debug, M> fmt::Debug for Ptr<T, H, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ptr")
            .field("type", &any::type_name::<T>())
            .field("handle", &self.handle)
            .field("address", &format_args!("0x{:X}", self.address))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::Opaque,
        space::{BusHandle, MemorySpace, SpaceConfig},
    };

    fn make_handle(width: usize) -> BusHandle {
        let space = MemorySpace::new(SpaceConfig::default().with_address_width(width)).unwrap();
        space.map_ram("ram", 0x1000, 0x100).unwrap();
        BusHandle::new(space)
    }

    #[test]
    fn default_pointer_is_unbound_and_invalid() {
        let ptr: Ptr<u32, BusHandle> = Ptr::default();
        assert!(ptr.handle().is_none(), "default pointers have no handle");
        assert_eq!(ptr.address(), INVALID, "default pointers hold the sentinel");
        assert!(!ptr.valid(), "unbound pointers are never valid");
        assert!(
            matches!(ptr.dereference(), Err(AccessError::Unbound)),
            "dereferencing without a handle reports Unbound"
        );
    }

    #[test]
    fn validity_needs_handle_address_and_alignment() {
        let handle = make_handle(8);
        let mut ptr: Ptr<u32, _> = Ptr::unpositioned(handle);
        assert!(!ptr.valid(), "bound but unpositioned is invalid");
        ptr.set_address(0x1002);
        assert!(!ptr.valid(), "misaligned address is invalid");
        assert!(
            matches!(
                ptr.dereference_checked(),
                Err(AccessError::InvalidAddress { address: 0x1002 })
            ),
            "checked dereference rejects misaligned addresses"
        );
        ptr.set_address(0x1004);
        assert!(ptr.valid(), "aligned address with a handle is valid");
        ptr.invalidate();
        assert!(!ptr.valid() && ptr.handle().is_none(), "invalidate clears both halves");
    }

    #[test]
    fn arithmetic_scales_by_pointee_size() {
        let handle = make_handle(8);
        let mut ptr: Ptr<u64, _> = Ptr::new(handle, 0x1000);
        assert_eq!((&ptr + 3).address(), 0x1018, "three u64 steps");
        assert_eq!((&ptr - 1).address(), 0x0FF8, "negative steps move backwards");
        ptr += 2;
        assert_eq!(ptr.address(), 0x1010, "+= rebinds the pointer itself");
        ptr -= 1;
        assert_eq!(ptr.address(), 0x1008, "-= rebinds the pointer itself");
        let previous = ptr.post_increment();
        assert_eq!(previous.address(), 0x1008, "postfix returns the old position");
        assert_eq!(ptr.address(), 0x1010, "postfix still advances");
        assert_eq!(ptr.decrement().address(), 0x1008, "prefix returns the new position");
    }

    #[test]
    fn const_pointers_still_move() {
        let handle = make_handle(8);
        let mut ptr: Ptr<u16, _, Const> = Ptr::new(handle, 0x1000);
        ptr.increment();
        ptr += 4;
        assert_eq!(ptr.address(), 0x100A, "pointee constness does not freeze the pointer");
    }

    #[test]
    fn pointer_to_pointer_steps_by_address_width() {
        let handle = make_handle(4);
        let ptr: Ptr<*mut u64, _> = Ptr::new(handle, 0x1000);
        assert_eq!(ptr.stride(), 4, "pointer slots are 4 bytes in a 4 byte space");
        assert_eq!(ptr.at(3).unwrap().address(), 0x100C, "indexing uses the same stride");
    }

    #[test]
    fn unbound_arithmetic_uses_host_width() {
        let ptr: Ptr<*const u8, BusHandle> = Ptr::null();
        assert_eq!(
            ptr.stride(),
            HOST_ADDRESS_WIDTH as u64,
            "without a handle pointer slots fall back to the host width"
        );
    }

    #[test]
    fn equality_compares_handle_identity_and_address() {
        let handle = make_handle(8);
        let a: Ptr<u32, _> = Ptr::new(handle.clone(), 0x1000);
        let b: Ptr<u32, _, Const> = Ptr::new(handle.clone(), 0x1000);
        let elsewhere: Ptr<u32, _> = Ptr::new(make_handle(8), 0x1000);
        assert!(a == b, "same space and address compare equal across access markers");
        assert!(a != elsewhere, "same address in another space is unequal");
        assert!(a != &a + 1, "different addresses are unequal");
        assert!(a.clone().cast::<Opaque>() == a, "opaque pointers compare with typed ones");
        assert!(a.clone().freeze() == b, "frozen pointers keep their identity");
    }
}
