//! Type descriptions for values living behind a memory handle.
//!
//! Every type that can be reached through a `Ptr` or `Ref` implements
//! [`Remote`], which names its [`Category`] and computes its [`Layout`] for a
//! given address width. The four categories are closed: scalars (numbers,
//! `bool`, enums from [`remote_enum!`](crate::remote_enum)), fixed arrays,
//! pointer slots (`*mut T`, `*const T`) and aggregates declared with
//! [`remote_struct!`](crate::remote_struct). A type outside these has no
//! `Remote` impl and is rejected at compile time.

pub mod pointer;
pub mod record;
pub mod scalar;

pub use pointer::{CastTo, Opaque, PointerSlot};
pub use record::{Field, FieldDesc, Struct, StructLayout};
pub use scalar::{Integer, Numeric, Scalar, Signed};

use crate::space::MemoryHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Scalar,
    Struct,
    Array,
    PointerLike,
}

/// Size and alignment of a type inside a handle's space, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

impl Layout {
    pub const fn new(size: u64, align: u64) -> Self {
        Self { size, align }
    }

    /// Host layout of `T`, used for scalars whose width does not depend on the space.
    pub const fn native<T>() -> Self {
        Self {
            size: std::mem::size_of::<T>() as u64,
            align: std::mem::align_of::<T>() as u64,
        }
    }

    /// Layout of an address slot in a space with `address_width`-byte addresses.
    pub const fn pointer(address_width: usize) -> Self {
        Self {
            size: address_width as u64,
            align: address_width as u64,
        }
    }

    pub const fn repeat(self, count: usize) -> Self {
        Self {
            size: self.size * count as u64,
            align: self.align,
        }
    }
}

pub trait Remote: 'static {
    const CATEGORY: Category;

    /// Layout under a space whose addresses are `address_width` bytes wide.
    fn layout(address_width: usize) -> Layout;
}

impl<T: Remote, const N: usize> Remote for [T; N] {
    const CATEGORY: Category = Category::Array;

    fn layout(address_width: usize) -> Layout {
        T::layout(address_width).repeat(N)
    }
}

/// Stride used for arithmetic and indexing over `T` through `handle`.
pub fn size_under_handle<T: Remote, H: MemoryHandle>(handle: &H) -> u64 {
    T::layout(handle.address_width()).size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_the_type_shape() {
        assert_eq!(<u16 as Remote>::CATEGORY, Category::Scalar, "integers are scalars");
        assert_eq!(<[u16; 3] as Remote>::CATEGORY, Category::Array, "arrays dispatch as arrays");
        assert_eq!(
            <*const [u16; 3] as Remote>::CATEGORY,
            Category::PointerLike,
            "pointers win over their pointee's category"
        );
        assert_eq!(
            <[*mut u8; 2] as Remote>::CATEGORY,
            Category::Array,
            "arrays of pointers are still arrays"
        );
    }

    #[test]
    fn pointer_sizes_follow_the_address_width() {
        assert_eq!(<*mut u64 as Remote>::layout(4), Layout::new(4, 4), "4 byte space");
        assert_eq!(<*mut u8 as Remote>::layout(8), Layout::new(8, 8), "8 byte space");
        assert_eq!(
            <[*mut u64; 3] as Remote>::layout(4).size,
            12,
            "array of pointers scales with the address width"
        );
        assert_eq!(
            <[u64; 3] as Remote>::layout(4).size,
            24,
            "value arrays do not depend on the address width"
        );
    }
}
