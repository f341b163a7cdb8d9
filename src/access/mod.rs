//! Typed pointers and references bound to a memory handle.
//!
//! [`Ptr`] is a nullable, rebindable `(handle, address)` pair living in the
//! host. Dereferencing it yields a [`Ref`], whose available operations depend
//! on the category of the pointee:
//!
//! | pointee            | operations                                             |
//! |--------------------|--------------------------------------------------------|
//! | scalar             | `read`, `write`, value operators, compound updates     |
//! | `remote_struct!`   | `field` projection                                     |
//! | `[T; N]`           | `at` indexing, `iter`, `decay`                         |
//! | `*mut T`/`*const T`| stored-address read/write, `dereference`, arithmetic   |
//!
//! The third type parameter is the access marker. `Ref<T, H, Const>` can only
//! read; mutating operations simply do not exist on it:
//!
//! ```compile_fail
//! use memlens::{BusHandle, Const, MemorySpace, Ref, SpaceConfig};
//!
//! let handle = BusHandle::new(MemorySpace::new(SpaceConfig::default()).unwrap());
//! let frozen: Ref<u32, BusHandle, Const> = Ref::new(handle, 0x1000);
//! frozen.write(1).unwrap();
//! ```
//!
//! The same holds for pointer slots: a const `*mut T` slot still hands out
//! mutable pointees, but the stored address cannot be replaced or stepped.
//!
//! ```compile_fail
//! use memlens::{BusHandle, Const, MemorySpace, Ref, SpaceConfig};
//!
//! let handle = BusHandle::new(MemorySpace::new(SpaceConfig::default()).unwrap());
//! let slot: Ref<*mut u32, BusHandle, Const> = Ref::new(handle, 0x1000);
//! slot.write(0x1000).unwrap();
//! ```
//!
//! ```compile_fail
//! use memlens::{BusHandle, Const, MemorySpace, Ref, SpaceConfig};
//!
//! let handle = BusHandle::new(MemorySpace::new(SpaceConfig::default()).unwrap());
//! let slot: Ref<*mut u32, BusHandle, Const> = Ref::new(handle, 0x1000);
//! slot.invalidate().unwrap();
//! ```
//!
//! ```compile_fail
//! use memlens::{BusHandle, Const, MemorySpace, Ref, SpaceConfig};
//!
//! let handle = BusHandle::new(MemorySpace::new(SpaceConfig::default()).unwrap());
//! let slot: Ref<*mut u32, BusHandle, Const> = Ref::new(handle, 0x1000);
//! slot.add_assign(1).unwrap();
//! ```
//!
//! A mutable reference freezes into a const one, never the reverse:
//!
//! ```compile_fail
//! use memlens::{BusHandle, Const, MemorySpace, Mut, Ref, SpaceConfig};
//!
//! let handle = BusHandle::new(MemorySpace::new(SpaceConfig::default()).unwrap());
//! let frozen: Ref<u32, BusHandle, Const> = Ref::new(handle, 0x1000);
//! let thawed: Ref<u32, BusHandle, Mut> = frozen.into();
//! ```

pub mod array;
pub mod mutability;
pub mod pointer;
pub mod record;
pub mod reference;
pub mod scalar;
pub mod slot;
pub(crate) mod stride;

pub use mutability::{Const, Mut, Mutability};
pub use pointer::Ptr;
pub use reference::Ref;
