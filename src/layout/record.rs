//! Aggregate layouts. Member offsets come from the declared field order under
//! C layout rules; they never depend on live memory.

use std::{fmt, marker::PhantomData};

use smallvec::SmallVec;

use super::{Layout, Remote};

/// One declared member: its name and how to lay it out for an address width.
#[derive(Clone, Copy)]
pub struct FieldDesc {
    pub name: &'static str,
    pub layout: fn(usize) -> Layout,
}

impl FieldDesc {
    pub const fn new(name: &'static str, layout: fn(usize) -> Layout) -> Self {
        Self { name, layout }
    }
}

impl fmt::Debug for FieldDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldDesc").field(&self.name).finish()
    }
}

/// Aggregates declared with [`remote_struct!`](crate::remote_struct).
pub trait Struct: Remote {
    const FIELDS: &'static [FieldDesc];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
    pub layout: Layout,
    pub offsets: SmallVec<[u64; 8]>,
}

impl StructLayout {
    pub fn compute(fields: &[FieldDesc], address_width: usize) -> Self {
        let mut offsets = SmallVec::with_capacity(fields.len());
        let mut cursor = 0;
        let mut align = 1;
        for field in fields {
            let member = (field.layout)(address_width);
            let member_align = member.align.max(1);
            cursor = align_up(cursor, member_align);
            offsets.push(cursor);
            cursor += member.size;
            align = align.max(member_align);
        }
        Self {
            layout: Layout::new(align_up(cursor, align), align),
            offsets,
        }
    }
}

/// Offset of member `index` of `S` without materialising the whole table, or
/// `None` when `S` declares fewer members.
pub fn offset_of<S: Struct>(index: usize, address_width: usize) -> Option<u64> {
    let mut cursor = 0;
    for (position, field) in S::FIELDS.iter().enumerate() {
        let member = (field.layout)(address_width);
        cursor = align_up(cursor, member.align.max(1));
        if position == index {
            return Some(cursor);
        }
        cursor += member.size;
    }
    None
}

const fn same_name(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[inline(always)]
fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

/// Identifies member `F` of aggregate `S`; generated by `remote_struct!`.
///
/// There is no public constructor, so a field cannot claim a member type or
/// index the declaration does not have:
///
/// ```compile_fail
/// memlens::remote_struct! {
///     struct Pair {
///         a: u32,
///     }
/// }
///
/// let wide: memlens::Field<Pair, u64> = memlens::Field::new(0, "a");
/// ```
///
/// and the declaration hook rejects out-of-range indices at compile time:
///
/// ```compile_fail
/// memlens::remote_struct! {
///     struct Pair {
///         a: u32,
///     }
/// }
///
/// const STRAY: memlens::Field<Pair, u32> = memlens::Field::__declared(5, "zz");
///
/// fn main() {
///     let _ = STRAY;
/// }
/// ```
pub struct Field<S, F> {
    index: usize,
    name: &'static str,
    _marker: PhantomData<fn() -> (S, F)>,
}

impl<S: Struct, F: Remote> Field<S, F> {
    /// Declaration hook for `remote_struct!`, which pairs each index with the
    /// member type it declared. Evaluated in the generated constants, so a
    /// mismatched index or name fails to compile.
    #[doc(hidden)]
    pub const fn __declared(index: usize, name: &'static str) -> Self {
        assert!(index < S::FIELDS.len(), "member index outside the declaration");
        assert!(
            same_name(S::FIELDS[index].name, name),
            "member name differs from the declaration"
        );
        Self {
            index,
            name,
            _marker: PhantomData,
        }
    }
}

impl<S, F> Field<S, F> {

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<S: Struct, F: Remote> Field<S, F> {
    pub fn offset(&self, address_width: usize) -> u64 {
        // `__declared` keeps the index inside `S::FIELDS`.
        offset_of::<S>(self.index, address_width).unwrap_or_default()
    }
}

impl<S, F> Clone for Field<S, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, F> Copy for Field<S, F> {}

impl<S, F> fmt::Debug for Field<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish()
    }
}

/// Declares the layout of an aggregate living behind a handle.
///
/// The declared name becomes an uninhabited marker type implementing
/// [`Struct`]; each member becomes an associated [`Field`] constant used for
/// projection. Member types must themselves be `Remote`.
///
/// ```
/// memlens::remote_struct! {
///     pub struct Header {
///         pub tag: u8,
///         pub len: u32,
///         pub data: *const u8,
///     }
/// }
///
/// assert_eq!(Header::len.offset(8), 4);
/// assert_eq!(Header::data.offset(4), 8);
/// assert_eq!(<Header as memlens::Remote>::layout(8).size, 16);
/// ```
#[macro_export]
macro_rules! remote_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {}

        #[allow(non_upper_case_globals)]
        impl $name {
            $crate::remote_struct!(@fields $name; 0usize; $($(#[$fmeta])* $fvis $field : $ty,)*);
        }

        impl $crate::layout::Remote for $name {
            const CATEGORY: $crate::layout::Category = $crate::layout::Category::Struct;

            fn layout(address_width: usize) -> $crate::layout::Layout {
                $crate::layout::StructLayout::compute(
                    <Self as $crate::layout::Struct>::FIELDS,
                    address_width,
                )
                .layout
            }
        }

        impl $crate::layout::Struct for $name {
            const FIELDS: &'static [$crate::layout::FieldDesc] = &[
                $($crate::layout::FieldDesc::new(
                    stringify!($field),
                    <$ty as $crate::layout::Remote>::layout,
                )),*
            ];
        }
    };
    (@fields $name:ident; $index:expr; ) => {};
    (@fields $name:ident; $index:expr;
        $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty, $($rest:tt)*
    ) => {
        $(#[$fmeta])*
        $fvis const $field: $crate::layout::Field<$name, $ty> =
            $crate::layout::Field::__declared($index, stringify!($field));
        $crate::remote_struct!(@fields $name; $index + 1usize; $($rest)*);
    };
}
