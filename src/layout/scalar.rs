//! Scalar categories: fixed-width numbers, `bool` and declared enumerations.

use std::ops;

use crate::space::{AccessError, AccessResult, Endianness};

use super::{Category, Layout, Remote};

/// A value the handle can move with a single typed read or write.
pub trait Scalar: Remote + Copy {
    /// Bytes occupied in the space, independent of the address width.
    const SIZE: usize;

    fn decode(bytes: &[u8], endian: Endianness) -> AccessResult<Self>;

    /// Writes `Self::SIZE` bytes into `out`.
    fn encode(self, endian: Endianness, out: &mut [u8]);
}

/// Arithmetic on values read out of a space. Integers wrap at their width,
/// like address arithmetic does, and division by zero yields `None`.
pub trait Numeric: Scalar {
    const ONE: Self;

    fn add_wrapping(self, rhs: Self) -> Self;
    fn sub_wrapping(self, rhs: Self) -> Self;
    fn mul_wrapping(self, rhs: Self) -> Self;
    fn div_checked(self, rhs: Self) -> Option<Self>;
    fn rem_checked(self, rhs: Self) -> Option<Self>;
}

/// Bitwise operations. Shift amounts are taken modulo the bit width.
pub trait Integer:
    Numeric + ops::BitAnd<Output = Self> + ops::BitOr<Output = Self> + ops::BitXor<Output = Self>
{
    fn shl_wrapping(self, rhs: u32) -> Self;
    fn shr_wrapping(self, rhs: u32) -> Self;
}

/// Numbers with a negation, wrapping for `MIN` of signed integers.
pub trait Signed: Numeric {
    fn negate(self) -> Self;
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl Remote for $t {
                const CATEGORY: Category = Category::Scalar;

                fn layout(_address_width: usize) -> Layout {
                    Layout::native::<$t>()
                }
            }

            impl Scalar for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline(always)]
                fn decode(bytes: &[u8], endian: Endianness) -> AccessResult<Self> {
                    Ok(endian.decode(bytes) as $t)
                }

                #[inline(always)]
                fn encode(self, endian: Endianness, out: &mut [u8]) {
                    endian.encode(self as u128, out)
                }
            }

            impl Numeric for $t {
                const ONE: Self = 1;

                fn add_wrapping(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn sub_wrapping(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn mul_wrapping(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                fn div_checked(self, rhs: Self) -> Option<Self> {
                    (rhs != 0).then(|| self.wrapping_div(rhs))
                }

                fn rem_checked(self, rhs: Self) -> Option<Self> {
                    (rhs != 0).then(|| self.wrapping_rem(rhs))
                }
            }

            impl Integer for $t {
                fn shl_wrapping(self, rhs: u32) -> Self {
                    self.wrapping_shl(rhs)
                }

                fn shr_wrapping(self, rhs: u32) -> Self {
                    self.wrapping_shr(rhs)
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty => $bits:ty),* $(,)?) => {
        $(
            impl Remote for $t {
                const CATEGORY: Category = Category::Scalar;

                fn layout(_address_width: usize) -> Layout {
                    Layout::native::<$t>()
                }
            }

            impl Scalar for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline(always)]
                fn decode(bytes: &[u8], endian: Endianness) -> AccessResult<Self> {
                    Ok(<$t>::from_bits(endian.decode(bytes) as $bits))
                }

                #[inline(always)]
                fn encode(self, endian: Endianness, out: &mut [u8]) {
                    endian.encode(self.to_bits() as u128, out)
                }
            }

            impl Numeric for $t {
                const ONE: Self = 1.0;

                fn add_wrapping(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn sub_wrapping(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn mul_wrapping(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn div_checked(self, rhs: Self) -> Option<Self> {
                    Some(self / rhs)
                }

                fn rem_checked(self, rhs: Self) -> Option<Self> {
                    Some(self % rhs)
                }
            }

            impl Signed for $t {
                fn negate(self) -> Self {
                    -self
                }
            }
        )*
    };
}

macro_rules! impl_signed {
    ($($t:ty),* $(,)?) => {
        $(
            impl Signed for $t {
                fn negate(self) -> Self {
                    self.wrapping_neg()
                }
            }
        )*
    };
}

impl_integer!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);
impl_signed!(i8, i16, i32, i64, i128);
impl_float!(f32 => u32, f64 => u64);

impl Remote for bool {
    const CATEGORY: Category = Category::Scalar;

    fn layout(_address_width: usize) -> Layout {
        Layout::native::<bool>()
    }
}

impl Scalar for bool {
    const SIZE: usize = 1;

    fn decode(bytes: &[u8], endian: Endianness) -> AccessResult<Self> {
        match endian.decode(bytes) {
            0 => Ok(false),
            1 => Ok(true),
            raw => Err(AccessError::InvalidValue {
                type_name: "bool",
                raw,
            }),
        }
    }

    fn encode(self, endian: Endianness, out: &mut [u8]) {
        endian.encode(u128::from(self), out)
    }
}

/// Declares a fieldless enum stored as its integer representation.
///
/// The enum derives `Clone`, `Copy`, `Debug`, `PartialEq`, `Eq` and `Hash`.
/// Reading a discriminant that matches no variant fails with
/// [`AccessError::InvalidValue`](crate::AccessError::InvalidValue).
///
/// ```
/// memlens::remote_enum! {
///     pub enum Phase: u8 {
///         Idle = 0,
///         Running = 1,
///     }
/// }
/// assert_eq!(<Phase as memlens::Scalar>::SIZE, 1);
/// ```
#[macro_export]
macro_rules! remote_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $crate::layout::Remote for $name {
            const CATEGORY: $crate::layout::Category = $crate::layout::Category::Scalar;

            fn layout(address_width: usize) -> $crate::layout::Layout {
                <$repr as $crate::layout::Remote>::layout(address_width)
            }
        }

        impl $crate::layout::Scalar for $name {
            const SIZE: usize = <$repr as $crate::layout::Scalar>::SIZE;

            fn decode(
                bytes: &[u8],
                endian: $crate::space::Endianness,
            ) -> $crate::space::AccessResult<Self> {
                let raw = <$repr as $crate::layout::Scalar>::decode(bytes, endian)?;
                $(
                    if raw == $name::$variant as $repr {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::space::AccessError::InvalidValue {
                    type_name: stringify!($name),
                    raw: raw as u128,
                })
            }

            fn encode(self, endian: $crate::space::Endianness, out: &mut [u8]) {
                <$repr as $crate::layout::Scalar>::encode(self as $repr, endian, out)
            }
        }
    };
}
