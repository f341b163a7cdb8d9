//! References to pointer slots: `*mut T` and `*const T` members stored in the
//! space. Reading one yields an address in the handle's width and byte order;
//! rewrapping that address produces a `Ptr` whose pointee access follows the
//! slot kind, while the slot itself stays writable whenever the reference is.

use std::ops;

use tracing::trace;

use crate::{
    layout::{CastTo, Field, PointerSlot, Remote, Struct, size_under_handle},
    space::{AccessResult, Address, INVALID, MemoryHandle},
};

use super::{
    mutability::{Const, Mut, Mutability},
    pointer::Ptr,
    reference::Ref,
    stride,
};

macro_rules! pointer_slot {
    ($kind:tt => $access:ident) => {
        impl<T: 'static, H: MemoryHandle, M: Mutability> Ref<*$kind T, H, M> {
            /// The stored address.
            pub fn read(&self) -> AccessResult<Address> {
                self.handle().read_address(self.address())
            }

            pub fn is_null(&self) -> AccessResult<bool> {
                Ok(self.read()? == INVALID)
            }

            /// Pointer holding the stored address.
            pub fn target(&self) -> AccessResult<Ptr<T, H, $access>> {
                Ok(Ptr::new(self.handle().clone(), self.read()?))
            }

            /// Reinterprets the pointee of the slot.
            pub fn cast<U: 'static>(&self) -> Ref<*$kind U, H, M>
            where
                T: CastTo<U>,
            {
                self.rebind(self.address())
            }

            /// Same space and same stored address as `other`.
            pub fn eq_ptr<U, N>(&self, other: &Ptr<U, H, N>) -> AccessResult<bool>
            where
                T: CastTo<U>,
            {
                let Some(handle) = other.handle() else {
                    return Ok(false);
                };
                Ok(self.handle().same_space(handle) && self.read()? == other.address())
            }

            /// Same space and same stored address as another slot.
            pub fn eq_ref<P, N>(&self, other: &Ref<P, H, N>) -> AccessResult<bool>
            where
                P: PointerSlot,
                T: CastTo<P::Pointee>,
            {
                if !self.handle().same_space(other.handle()) {
                    return Ok(false);
                }
                let theirs = other.handle().read_address(other.address())?;
                Ok(self.read()? == theirs)
            }
        }

        impl<T: Remote, H: MemoryHandle, M: Mutability> Ref<*$kind T, H, M> {
            fn step(&self) -> u64 {
                size_under_handle::<T, H>(self.handle())
            }

            /// Whether the stored address is a usable location for `T`.
            pub fn valid(&self) -> AccessResult<bool> {
                let stored = self.read()?;
                Ok(self.handle().valid_offset::<T>(stored))
            }

            pub fn dereference(&self) -> AccessResult<Ref<T, H, $access>> {
                Ok(self.rebind(self.read()?))
            }

            /// Element `index` of the array the slot points into.
            pub fn at(&self, index: usize) -> AccessResult<Ref<T, H, $access>> {
                let width = self.handle().address_width();
                let address = stride::index(self.read()?, index, self.step(), width);
                Ok(self.rebind(address))
            }

            /// Pointer `count` elements away from the stored address.
            pub fn offset(&self, count: isize) -> AccessResult<Ptr<T, H, $access>> {
                let width = self.handle().address_width();
                let address = stride::offset(self.read()?, count, self.step(), width);
                Ok(Ptr::new(self.handle().clone(), address))
            }
        }

        impl<S: Struct, H: MemoryHandle, M: Mutability> Ref<*$kind S, H, M> {
            /// Member of the aggregate the slot points at.
            pub fn field<F: Remote>(&self, field: Field<S, F>) -> AccessResult<Ref<F, H, $access>> {
                Ok(self.dereference()?.field(field))
            }
        }

        impl<T: 'static, H: MemoryHandle> Ref<*$kind T, H, Mut> {
            pub fn write(&self, address: Address) -> AccessResult<()> {
                self.handle().write_address(self.address(), address)
            }

            /// Stores the address held by `ptr`; its handle is not recorded.
            pub fn write_ptr(&self, ptr: &Ptr<T, H, $access>) -> AccessResult<()> {
                self.write(ptr.address())
            }

            /// Stores the sentinel address.
            pub fn invalidate(&self) -> AccessResult<()> {
                trace!(
                    slot = format_args!("0x{:X}", self.address()),
                    "invalidate stored pointer"
                );
                self.write(INVALID)
            }
        }

        impl<T: Remote, H: MemoryHandle> Ref<*$kind T, H, Mut> {
            fn advance(&self, count: isize) -> AccessResult<(Ptr<T, H, $access>, Ptr<T, H, $access>)> {
                let previous = self.target()?;
                let next = previous.offset(count);
                self.write(next.address())?;
                Ok((previous, next))
            }

            /// Moves the stored address by `count` elements; returns the new pointer.
            pub fn add_assign(&self, count: isize) -> AccessResult<Ptr<T, H, $access>> {
                Ok(self.advance(count)?.1)
            }

            pub fn sub_assign(&self, count: isize) -> AccessResult<Ptr<T, H, $access>> {
                Ok(self.advance(count.wrapping_neg())?.1)
            }

            pub fn increment(&self) -> AccessResult<Ptr<T, H, $access>> {
                self.add_assign(1)
            }

            pub fn decrement(&self) -> AccessResult<Ptr<T, H, $access>> {
                self.sub_assign(1)
            }

            /// Advances the stored address; returns the pointer it held before.
            pub fn post_increment(&self) -> AccessResult<Ptr<T, H, $access>> {
                Ok(self.advance(1)?.0)
            }

            pub fn post_decrement(&self) -> AccessResult<Ptr<T, H, $access>> {
                Ok(self.advance(-1)?.0)
            }
        }

        impl<T: Remote, H: MemoryHandle, M: Mutability> ops::Add<isize> for &Ref<*$kind T, H, M> {
            type Output = AccessResult<Ptr<T, H, $access>>;

            fn add(self, count: isize) -> Self::Output {
                self.offset(count)
            }
        }

        impl<T: Remote, H: MemoryHandle, M: Mutability> ops::Sub<isize> for &Ref<*$kind T, H, M> {
            type Output = AccessResult<Ptr<T, H, $access>>;

            fn sub(self, count: isize) -> Self::Output {
                self.offset(count.wrapping_neg())
            }
        }
    };
}

pointer_slot!(mut => Mut);
pointer_slot!(const => Const);

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use crate::{
        access::{Const, Mut, Ptr, Ref},
        layout::Opaque,
        remote_struct,
        space::{AccessError, BusHandle, Endianness, MemoryHandle, MemorySpace, SpaceConfig},
    };

    remote_struct! {
        struct Cell {
            value: u32,
            next: *mut Cell,
        }
    }

    fn make_handle(width: usize, endianness: Endianness) -> BusHandle {
        let config = SpaceConfig::default()
            .with_address_width(width)
            .with_endianness(endianness);
        let space = MemorySpace::new(config).unwrap();
        space.map_ram("ram", 0x4000, 0x80).unwrap();
        BusHandle::new(space)
    }

    #[test]
    fn stored_addresses_use_the_handle_width_and_order() {
        let handle = make_handle(4, Endianness::Big);
        let slot: Ref<*mut u32, _> = Ref::new(handle.clone(), 0x4000);
        slot.write(0x4010).unwrap();
        assert_eq!(
            handle.read_raw(0x4000, 4).unwrap().as_slice(),
            &hex!("00004010"),
            "four bytes, big endian"
        );
        assert_eq!(slot.read().unwrap(), 0x4010, "read returns the stored address");
    }

    #[test]
    fn dereference_follows_the_stored_address() {
        let handle = make_handle(8, Endianness::Little);
        handle.write::<u32>(0x4020, 77).unwrap();
        let slot: Ref<*mut u32, _> = Ref::new(handle, 0x4000);
        slot.write(0x4020).unwrap();
        assert!(slot.valid().unwrap(), "aligned non-null address is valid");
        let target = slot.dereference().unwrap();
        assert_eq!(target.read().unwrap(), 77, "pointee read through the slot");
        target.write(78).unwrap();
        assert_eq!(slot.target().unwrap().address(), 0x4020, "target wraps the stored address");
        assert_eq!(slot.ptr().address(), 0x4000, "ptr points at the slot itself");
    }

    #[test]
    fn const_slots_hand_out_read_only_pointees() {
        let handle = make_handle(8, Endianness::Little);
        let slot: Ref<*const u16, _, Mut> = Ref::new(handle, 0x4000);
        slot.write(0x4030).unwrap();
        let pointee: Ref<u16, _, Const> = slot.dereference().unwrap();
        assert_eq!(pointee.read().unwrap(), 0, "pointee is readable");
        let target: Ptr<u16, _, Const> = slot.target().unwrap();
        assert_eq!(target.address(), 0x4030, "the slot itself was still writable");
    }

    #[test]
    fn const_slot_references_only_read_the_stored_address() {
        let handle = make_handle(8, Endianness::Little);
        Ref::<*mut u32, _, Mut>::new(handle.clone(), 0x4000).write(0x4010).unwrap();
        let frozen: Ref<*mut u32, _, Const> = Ref::new(handle, 0x4000);
        assert_eq!(frozen.read().unwrap(), 0x4010, "const slots still read");
        assert_eq!((&frozen + 1).unwrap().address(), 0x4014, "non-mutating arithmetic is allowed");
        let pointee: Ref<u32, _, Mut> = frozen.dereference().unwrap();
        pointee.write(5).unwrap();
        assert_eq!(frozen.at(0).unwrap().read().unwrap(), 5, "the *mut pointee stays writable");
        assert_eq!(frozen.read().unwrap(), 0x4010, "the slot itself never moved");
    }

    #[test]
    fn arithmetic_scales_by_pointee_and_writes_back() {
        let handle = make_handle(4, Endianness::Little);
        let slot: Ref<*mut u64, _> = Ref::new(handle, 0x4000);
        slot.write(0x4040).unwrap();
        assert_eq!((&slot + 2).unwrap().address(), 0x4050, "non-mutating add");
        assert_eq!((&slot - 1).unwrap().address(), 0x4038, "non-mutating sub");
        assert_eq!(slot.read().unwrap(), 0x4040, "operators leave the slot alone");
        assert_eq!(slot.at(1).unwrap().address(), 0x4048, "index from the stored address");

        assert_eq!(slot.add_assign(2).unwrap().address(), 0x4050, "add_assign yields the new pointer");
        assert_eq!(slot.post_increment().unwrap().address(), 0x4050, "postfix yields the old pointer");
        assert_eq!(slot.read().unwrap(), 0x4058, "postfix stored the new address");
        assert_eq!(slot.decrement().unwrap().address(), 0x4050, "prefix decrement");
        assert_eq!(slot.post_decrement().unwrap().address(), 0x4050, "postfix decrement");
        assert_eq!(slot.sub_assign(1).unwrap().address(), 0x4040, "sub_assign");
    }

    #[test]
    fn invalidate_stores_the_sentinel() {
        let handle = make_handle(8, Endianness::Little);
        let slot: Ref<*mut u32, _> = Ref::new(handle, 0x4000);
        slot.write(0x4008).unwrap();
        slot.invalidate().unwrap();
        assert!(slot.is_null().unwrap(), "invalidate writes zero");
        assert!(!slot.valid().unwrap(), "null slots are not valid");
    }

    #[test]
    fn field_forwarding_walks_a_linked_layout() {
        let handle = make_handle(8, Endianness::Little);
        let head: Ref<Cell, _> = Ref::new(handle.clone(), 0x4000);
        head.field(Cell::value).write(1).unwrap();
        head.field(Cell::next).write(0x4010).unwrap();
        let next = head.field(Cell::next);
        next.field(Cell::value).unwrap().write(2).unwrap();
        next.field(Cell::next).unwrap().invalidate().unwrap();
        assert_eq!(handle.read::<u32>(0x4010).unwrap(), 2, "second node written through the link");
        assert!(
            next.dereference().unwrap().field(Cell::next).is_null().unwrap(),
            "list terminates"
        );
    }

    #[test]
    fn equality_compares_space_and_stored_address() {
        let handle = make_handle(8, Endianness::Little);
        let a: Ref<*mut u32, _> = Ref::new(handle.clone(), 0x4000);
        let b: Ref<*const u32, _, Const> = Ref::new(handle.clone(), 0x4008);
        a.write(0x4040).unwrap();
        Ref::<*mut u32, _, Mut>::new(handle.clone(), 0x4008).write(0x4040).unwrap();
        assert!(a.eq_ref(&b).unwrap(), "same stored address in the same space");
        assert!(a.eq_ptr(&Ptr::<u32, _, Mut>::new(handle.clone(), 0x4040)).unwrap(), "matches a pointer");
        assert!(
            a.cast::<Opaque>().eq_ptr(&Ptr::<u32, _, Mut>::new(handle, 0x4040)).unwrap(),
            "opaque slots compare with typed pointers"
        );
        let elsewhere = make_handle(8, Endianness::Little);
        assert!(!a.eq_ptr(&Ptr::<u32, _, Mut>::new(elsewhere, 0x4040)).unwrap(), "other spaces differ");
        assert!(!a.eq_ptr(&Ptr::<u32, BusHandle, Mut>::null()).unwrap(), "unbound pointers differ");
    }

    #[test]
    fn faults_reading_the_slot_propagate() {
        let handle = make_handle(8, Endianness::Little);
        let slot: Ref<*mut u32, _> = Ref::new(handle, 0x9000);
        assert!(
            matches!(slot.dereference(), Err(AccessError::NotMapped { address: 0x9000 })),
            "the slot read fails before any pointee access"
        );
    }
}
