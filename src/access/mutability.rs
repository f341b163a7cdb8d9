//! Access markers carried by `Ptr` and `Ref` as a type parameter.

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Mut {}
    impl Sealed for super::Const {}
}

pub trait Mutability: sealed::Sealed + 'static {
    const WRITABLE: bool;
}

/// Reads and writes allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mut {}

/// Read-only view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Const {}

impl Mutability for Mut {
    const WRITABLE: bool = true;
}

impl Mutability for Const {
    const WRITABLE: bool = false;
}
