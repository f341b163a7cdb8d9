//! Element access for fixed-length arrays. Indexing never moves the array
//! reference and is not bounds checked, matching C array semantics.

use crate::{
    layout::{Remote, size_under_handle},
    space::MemoryHandle,
};

use super::{mutability::Mutability, pointer::Ptr, reference::Ref, stride};

impl<T: Remote, H: MemoryHandle, M: Mutability, const N: usize> Ref<[T; N], H, M> {
    /// Element `index`, `index * size(T)` bytes past the start of the array.
    pub fn at(&self, index: usize) -> Ref<T, H, M> {
        let step = size_under_handle::<T, H>(self.handle());
        let width = self.handle().address_width();
        self.rebind(stride::index(self.address(), index, step, width))
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Ref<T, H, M>> + '_ {
        (0..N).map(move |index| self.at(index))
    }

    /// Pointer to the first element.
    pub fn decay(&self) -> Ptr<T, H, M> {
        Ptr::new(self.handle().clone(), self.address())
    }
}
