//! The polymorphic record exercised through dynamic dispatch.

use std::hint::black_box;

/// Single-method capability resolved through a vtable at runtime.
pub trait Offset {
    fn offset(&self, input: i32) -> i32;
}

/// Heap-allocated record whose one operation adds 4 to its input.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OffsetRecord {
    /// Unused. Present only to give the object a data member next to its vtable pointer.
    pub y: f32,
}

impl OffsetRecord {
    pub const DELTA: i32 = 4;

    /// Allocate the record behind a trait object.
    ///
    /// The box passes through [`black_box`] so the optimizer cannot see the
    /// concrete type and devirtualize [`dispatch`] calls.
    #[must_use]
    pub fn boxed() -> Box<dyn Offset> {
        black_box(Box::new(Self::default()) as Box<dyn Offset>)
    }
}

impl Offset for OffsetRecord {
    fn offset(&self, input: i32) -> i32 {
        input.wrapping_add(Self::DELTA)
    }
}

/// Call [`Offset::offset`] through the trait object's vtable.
#[inline(never)]
pub fn dispatch(record: &dyn Offset, input: i32) -> i32 {
    black_box(record).offset(input)
}
