/// Culling result - per-query visibility state and the visibility diff of
/// the most recent evaluation.
///
/// Bits are indexed by group slot. Each slot also records the generation
/// of the object it described, so a slot reused by a new object starts
/// hidden instead of inheriting the old object's history.

use crate::error::Result;
use crate::engine_bail;
use crate::utils::BitArray;
use super::group::{Group, GroupId};
use super::object::ObjectKey;

pub struct CullingResult {
    group_id: GroupId,
    /// Visibility at the last evaluation (the "previous" bits of the next one)
    visible: BitArray,
    /// Object generation per slot at the last evaluation (0 = none)
    generations: Vec<u32>,
    /// Objects whose visibility flipped in the last evaluation, insertion order
    changed: Vec<ObjectKey>,
}

impl CullingResult {
    /// Create an all-hidden result bound to `group`
    pub(crate) fn new(group: &Group) -> Self {
        Self {
            group_id: group.id(),
            visible: BitArray::new(0),
            generations: Vec::new(),
            changed: Vec::new(),
        }
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Fail unless this result was created for `group`
    pub fn check_group(&self, group: &Group) -> Result<()> {
        if self.group_id != group.id() {
            engine_bail!("galaxy3d::culling::Result",
                "Result bound to group {:?} used with group {:?}", self.group_id, group.id());
        }
        Ok(())
    }

    /// Visibility of the object in `slot` with `generation` at the last evaluation
    pub fn is_visible(&self, slot: usize, generation: u32) -> bool {
        self.generations.get(slot) == Some(&generation) && self.visible.get(slot)
    }

    /// Objects whose visibility flipped in the last evaluation
    pub fn changed(&self) -> &[ObjectKey] {
        &self.changed
    }

    /// Visibility bits of the last evaluation, indexed by slot
    pub fn visibility(&self) -> &BitArray {
        &self.visible
    }

    /// Diff freshly computed visibility against the previous evaluation.
    ///
    /// `current` is indexed by slot of `group`. Slots whose occupant changed
    /// since the previous evaluation (removed, replaced, new) compare against
    /// hidden, so removed objects are never reported and re-added ones
    /// start with no history.
    pub(crate) fn update_changed(&mut self, group: &Group, mut current: BitArray) {
        let capacity = group.slot_capacity();
        current.resize(capacity);
        self.visible.resize(capacity);
        self.generations.resize(capacity, 0);

        for slot in 0..capacity {
            let generation = group.slot_generation(slot).unwrap_or(0);
            if self.generations[slot] != generation {
                self.visible.set(slot, false);
                self.generations[slot] = generation;
            }
            if generation == 0 {
                current.set(slot, false);
            }
        }

        let flipped = current.symmetric_difference(&self.visible);
        self.changed.clear();
        if flipped.any() {
            self.changed.extend(group.objects()
                .filter(|(_, _, slot)| flipped.get(slot.index as usize))
                .map(|(key, _, _)| key));
        }

        self.visible = current;
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
