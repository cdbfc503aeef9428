//! Small containers shared by the culling data model.

mod bit_array;
mod slot_allocator;

pub use bit_array::BitArray;
pub use slot_allocator::{Slot, SlotAllocator};
