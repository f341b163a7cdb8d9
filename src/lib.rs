//! Typed pointers and references over an arbitrary byte-addressable memory space.
//!
//! A [`MemoryHandle`] knows how to move raw bytes in and out of some address
//! space: the host process, a simulated heap, a remote target. On top of it,
//! [`Ptr`] and [`Ref`] give native-feeling access to typed data living there.
//! Every read, write and address computation is routed through the handle, and
//! sizes of pointer-like members follow the handle's address width rather than
//! the host's.
//!
//! ```
//! use memlens::{remote_struct, BusHandle, MemorySpace, Ptr, SpaceConfig};
//!
//! remote_struct! {
//!     pub struct Node {
//!         id: u32,
//!         next: *mut Node,
//!     }
//! }
//!
//! # fn main() -> memlens::AccessResult<()> {
//! let space = MemorySpace::new(SpaceConfig::default().with_address_width(4))?;
//! space.map_ram("heap", 0x1000, 0x100)?;
//! let handle = BusHandle::new(space);
//!
//! let node: Ptr<Node, _> = Ptr::new(handle, 0x1000);
//! node.field(Node::id)?.write(7)?;
//! node.field(Node::next)?.write(0x1010)?;
//! assert_eq!(node.field(Node::next)?.dereference()?.address(), 0x1010);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod layout;
pub mod space;

pub use access::{Const, Mut, Mutability, Ptr, Ref};
pub use layout::{
    CastTo, Category, Field, FieldDesc, Layout, Opaque, PointerSlot, Remote, Scalar, Struct,
    size_under_handle,
};
pub use space::{
    AccessError, AccessResult, Address, BusHandle, Endianness, INVALID, MemoryHandle,
    MemorySpace, NativeHandle, RawBytes, RegionFlags, SpaceConfig,
};
