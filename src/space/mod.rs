//! Address spaces and the handle capability every typed accessor is routed through.

pub mod bus;
pub mod config;
pub mod endianness;
pub mod error;
pub mod handle;
pub mod native;

pub use bus::{BusHandle, MemorySpace, RegionFlags};
pub use config::SpaceConfig;
pub use endianness::Endianness;
pub use error::{AccessError, AccessResult};
pub use handle::{Address, INVALID, MemoryHandle, RawBytes, address_mask};
pub use native::NativeHandle;
