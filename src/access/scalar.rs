//! Value access for scalar pointees.
//!
//! Operators on `&Ref` perform one read and hand back a plain value; they never
//! produce another reference. Compound updates exist only on mutable
//! references and perform one read followed by one write.
//!
//! Values come from memory the host does not control, so integer arithmetic
//! wraps at the type width instead of panicking, the same way address
//! arithmetic wraps at the address width. Division by zero is reported as
//! [`AccessError::DivideByZero`].

use std::{any, cmp::Ordering, ops};

use crate::{
    layout::{Integer, Numeric, Scalar, Signed},
    space::{AccessError, AccessResult, MemoryHandle},
};

use super::{
    mutability::{Mut, Mutability},
    reference::Ref,
};

impl<T: Scalar, H: MemoryHandle, M: Mutability> Ref<T, H, M> {
    pub fn read(&self) -> AccessResult<T> {
        self.handle().read::<T>(self.address())
    }

    pub fn eq_value(&self, rhs: T) -> AccessResult<bool>
    where
        T: PartialEq,
    {
        Ok(self.read()? == rhs)
    }

    pub fn ne_value(&self, rhs: T) -> AccessResult<bool>
    where
        T: PartialEq,
    {
        Ok(self.read()? != rhs)
    }

    pub fn lt_value(&self, rhs: T) -> AccessResult<bool>
    where
        T: PartialOrd,
    {
        Ok(self.read()? < rhs)
    }

    pub fn le_value(&self, rhs: T) -> AccessResult<bool>
    where
        T: PartialOrd,
    {
        Ok(self.read()? <= rhs)
    }

    pub fn gt_value(&self, rhs: T) -> AccessResult<bool>
    where
        T: PartialOrd,
    {
        Ok(self.read()? > rhs)
    }

    pub fn ge_value(&self, rhs: T) -> AccessResult<bool>
    where
        T: PartialOrd,
    {
        Ok(self.read()? >= rhs)
    }

    /// `None` when the values are unordered, e.g. a NaN float.
    pub fn compare_value(&self, rhs: T) -> AccessResult<Option<Ordering>>
    where
        T: PartialOrd,
    {
        Ok(self.read()?.partial_cmp(&rhs))
    }
}

fn apply_add<T: Numeric>(lhs: T, rhs: T) -> AccessResult<T> {
    Ok(lhs.add_wrapping(rhs))
}

fn apply_sub<T: Numeric>(lhs: T, rhs: T) -> AccessResult<T> {
    Ok(lhs.sub_wrapping(rhs))
}

fn apply_mul<T: Numeric>(lhs: T, rhs: T) -> AccessResult<T> {
    Ok(lhs.mul_wrapping(rhs))
}

fn apply_div<T: Numeric>(lhs: T, rhs: T) -> AccessResult<T> {
    lhs.div_checked(rhs).ok_or(AccessError::DivideByZero {
        type_name: any::type_name::<T>(),
    })
}

fn apply_rem<T: Numeric>(lhs: T, rhs: T) -> AccessResult<T> {
    lhs.rem_checked(rhs).ok_or(AccessError::DivideByZero {
        type_name: any::type_name::<T>(),
    })
}

fn apply_bitand<T: Integer>(lhs: T, rhs: T) -> AccessResult<T> {
    Ok(lhs & rhs)
}

fn apply_bitor<T: Integer>(lhs: T, rhs: T) -> AccessResult<T> {
    Ok(lhs | rhs)
}

fn apply_bitxor<T: Integer>(lhs: T, rhs: T) -> AccessResult<T> {
    Ok(lhs ^ rhs)
}

fn apply_shl<T: Integer>(lhs: T, rhs: u32) -> AccessResult<T> {
    Ok(lhs.shl_wrapping(rhs))
}

fn apply_shr<T: Integer>(lhs: T, rhs: u32) -> AccessResult<T> {
    Ok(lhs.shr_wrapping(rhs))
}

macro_rules! value_operator {
    ($($trait:ident :: $method:ident ($rhs:ty) where $bound:ident => $apply:ident),* $(,)?) => {
        $(
            impl<T, H, M> ops::$trait<$rhs> for &Ref<T, H, M>
            where
                T: $bound,
                H: MemoryHandle,
                M: Mutability,
            {
                type Output = AccessResult<T>;

                fn $method(self, rhs: $rhs) -> AccessResult<T> {
                    $apply(self.read()?, rhs)
                }
            }
        )*
    };
}

value_operator!(
    Add::add(T) where Numeric => apply_add,
    Sub::sub(T) where Numeric => apply_sub,
    Mul::mul(T) where Numeric => apply_mul,
    Div::div(T) where Numeric => apply_div,
    Rem::rem(T) where Numeric => apply_rem,
    BitAnd::bitand(T) where Integer => apply_bitand,
    BitOr::bitor(T) where Integer => apply_bitor,
    BitXor::bitxor(T) where Integer => apply_bitxor,
    Shl::shl(u32) where Integer => apply_shl,
    Shr::shr(u32) where Integer => apply_shr,
);

impl<T, H, M> ops::Not for &Ref<T, H, M>
where
    T: Scalar + ops::Not<Output = T>,
    H: MemoryHandle,
    M: Mutability,
{
    type Output = AccessResult<T>;

    fn not(self) -> AccessResult<T> {
        Ok(!self.read()?)
    }
}

impl<T, H, M> ops::Neg for &Ref<T, H, M>
where
    T: Signed,
    H: MemoryHandle,
    M: Mutability,
{
    type Output = AccessResult<T>;

    fn neg(self) -> AccessResult<T> {
        Ok(self.read()?.negate())
    }
}

macro_rules! compound_update {
    ($($name:ident ($rhs:ty) where $bound:ident => $apply:ident),* $(,)?) => {
        $(
            /// Applies the operator to the stored value, writes it back and
            /// returns the new value.
            pub fn $name(&self, rhs: $rhs) -> AccessResult<T>
            where
                T: $bound,
            {
                self.update(|value| $apply(value, rhs))
            }
        )*
    };
}

impl<T: Scalar, H: MemoryHandle> Ref<T, H, Mut> {
    pub fn write(&self, value: T) -> AccessResult<()> {
        self.handle().write(self.address(), value)
    }

    /// Assignment that yields the assigned value.
    pub fn set(&self, value: T) -> AccessResult<T> {
        self.write(value)?;
        Ok(value)
    }

    fn update(&self, apply: impl FnOnce(T) -> AccessResult<T>) -> AccessResult<T> {
        let value = apply(self.read()?)?;
        self.write(value)?;
        Ok(value)
    }

    compound_update!(
        add_assign(T) where Numeric => apply_add,
        sub_assign(T) where Numeric => apply_sub,
        mul_assign(T) where Numeric => apply_mul,
        div_assign(T) where Numeric => apply_div,
        rem_assign(T) where Numeric => apply_rem,
        bitand_assign(T) where Integer => apply_bitand,
        bitor_assign(T) where Integer => apply_bitor,
        bitxor_assign(T) where Integer => apply_bitxor,
        shl_assign(u32) where Integer => apply_shl,
        shr_assign(u32) where Integer => apply_shr,
    );

    /// Prefix increment; returns the new value.
    pub fn increment(&self) -> AccessResult<T>
    where
        T: Numeric,
    {
        self.add_assign(T::ONE)
    }

    /// Prefix decrement; returns the new value.
    pub fn decrement(&self) -> AccessResult<T>
    where
        T: Numeric,
    {
        self.sub_assign(T::ONE)
    }

    /// Postfix increment; returns the value before the update.
    pub fn post_increment(&self) -> AccessResult<T>
    where
        T: Numeric,
    {
        let previous = self.read()?;
        self.write(previous.add_wrapping(T::ONE))?;
        Ok(previous)
    }

    /// Postfix decrement; returns the value before the update.
    pub fn post_decrement(&self) -> AccessResult<T>
    where
        T: Numeric,
    {
        let previous = self.read()?;
        self.write(previous.sub_wrapping(T::ONE))?;
        Ok(previous)
    }
}
