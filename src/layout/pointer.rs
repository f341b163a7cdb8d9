//! Pointer slots stored inside a space, and the pointee conversion relation.

use crate::access::{Const, Mut, Mutability};

use super::{Category, Layout, Remote};

/// Untyped pointee, the `void` of a remote layout. It has no layout, so pointers
/// to it can be stored and compared but not dereferenced or stepped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opaque {}

mod sealed {
    pub trait Sealed {}

    impl<T> Sealed for *mut T {}
    impl<T> Sealed for *const T {}
}

/// A slot that stores an address: `*mut T` yields mutable pointees, `*const T`
/// read-only ones.
pub trait PointerSlot: Remote + sealed::Sealed {
    type Pointee: 'static;
    type Access: Mutability;
}

impl<T: 'static> Remote for *mut T {
    const CATEGORY: Category = Category::PointerLike;

    fn layout(address_width: usize) -> Layout {
        Layout::pointer(address_width)
    }
}

impl<T: 'static> Remote for *const T {
    const CATEGORY: Category = Category::PointerLike;

    fn layout(address_width: usize) -> Layout {
        Layout::pointer(address_width)
    }
}

impl<T: 'static> PointerSlot for *mut T {
    type Pointee = T;
    type Access = Mut;
}

impl<T: 'static> PointerSlot for *const T {
    type Pointee = T;
    type Access = Const;
}

/// `Self` pointers may be reinterpreted as `U` pointers: identical pointees,
/// or either side being [`Opaque`].
pub trait CastTo<U> {}

impl<T: Remote> CastTo<T> for T {}
impl<T: Remote> CastTo<Opaque> for T {}
impl<U: Remote> CastTo<U> for Opaque {}
impl CastTo<Opaque> for Opaque {}
