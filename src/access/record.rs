//! Member projection for aggregates declared with `remote_struct!`.

use crate::{
    layout::{Field, Remote, Struct},
    space::MemoryHandle,
};

use super::{mutability::Mutability, reference::Ref, stride};

impl<S: Struct, H: MemoryHandle, M: Mutability> Ref<S, H, M> {
    /// Reference to one member, at the aggregate address plus the member's
    /// offset under this handle's address width. Access is inherited.
    pub fn field<F: Remote>(&self, field: Field<S, F>) -> Ref<F, H, M> {
        let width = self.handle().address_width();
        let address = stride::displace(self.address(), field.offset(width), width);
        self.rebind(address)
    }
}
