/// Group - the set of culling objects evaluated together, plus the world
/// matrix array they index into.
///
/// Objects are stored in a SlotMap (stable `ObjectKey`s) and additionally
/// occupy a dense slot used to index per-object arrays: visibility bits in
/// results and the cached world-space boxes. Insertion order is kept so
/// changed lists are deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use glam::Mat4;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::error::Result;
use crate::engine_err;
use crate::utils::{BitArray, Slot, SlotAllocator};
use super::bounding_box::{BoundingBox, OrientedBox};
use super::matrix_array::MatrixArray;
use super::object::{Object, ObjectKey, TransformIndex};

/// Process-unique identity of a Group (results are bound to one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

impl GroupId {
    fn next() -> Self {
        GroupId(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Member {
    object: Object,
    slot: Slot,
}

pub struct Group {
    id: GroupId,
    members: SlotMap<ObjectKey, Member>,
    /// Member keys in insertion order; may hold keys of removed objects
    order: Vec<ObjectKey>,
    /// Removed keys still present in `order`
    stale_keys: usize,
    slots: SlotAllocator,
    /// Current world matrices (owned copy of the last upload)
    matrices: Vec<Mat4>,
    /// Transform indices invalidated since the last bounds refresh
    dirty_transforms: FxHashSet<TransformIndex>,
    /// Cached world-space box per slot (None: free slot, empty box or bad transform)
    world_bounds: Vec<Option<OrientedBox>>,
    /// Slots whose cached world box must be recomputed
    bounds_dirty: BitArray,
}

impl Group {
    pub(crate) fn new() -> Self {
        Self {
            id: GroupId::next(),
            members: SlotMap::with_key(),
            order: Vec::new(),
            stale_keys: 0,
            slots: SlotAllocator::new(),
            matrices: Vec::new(),
            dirty_transforms: FxHashSet::default(),
            world_bounds: Vec::new(),
            bounds_dirty: BitArray::new(0),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Number of member objects
    pub fn object_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.members.contains_key(key)
    }

    // ===== MEMBERSHIP =====

    /// Move an object into the group
    pub fn add_object(&mut self, object: Object) -> ObjectKey {
        let slot = self.slots.alloc();
        let index = slot.index as usize;
        let capacity = self.slots.high_water_mark() as usize;
        if self.world_bounds.len() < capacity {
            self.world_bounds.resize(capacity, None);
            self.bounds_dirty.resize(capacity);
        }
        self.world_bounds[index] = None;
        self.bounds_dirty.set(index, true);

        let key = self.members.insert(Member { object, slot });
        self.order.push(key);
        key
    }

    /// Take an object out of the group, freeing its slot
    pub fn remove_object(&mut self, key: ObjectKey) -> Result<Object> {
        let member = self.members.remove(key)
            .ok_or_else(|| engine_err!("galaxy3d::culling::Group",
                "Cannot remove {:?}: not a member of group {:?}", key, self.id))?;

        // Removed keys are skipped by `objects()` and compacted in bulk
        self.stale_keys += 1;
        if self.stale_keys * 2 > self.order.len() {
            let members = &self.members;
            self.order.retain(|k| members.contains_key(*k));
            self.stale_keys = 0;
        }
        let index = member.slot.index as usize;
        self.world_bounds[index] = None;
        self.bounds_dirty.set(index, false);
        self.slots.free(member.slot);
        Ok(member.object)
    }

    pub fn object(&self, key: ObjectKey) -> Result<&Object> {
        self.members.get(key)
            .map(|m| &m.object)
            .ok_or_else(|| engine_err!("galaxy3d::culling::Group",
                "Unknown object {:?} in group {:?}", key, self.id))
    }

    /// Dense slot of a member object
    pub fn slot(&self, key: ObjectKey) -> Result<Slot> {
        self.members.get(key)
            .map(|m| m.slot)
            .ok_or_else(|| engine_err!("galaxy3d::culling::Group",
                "Unknown object {:?} in group {:?}", key, self.id))
    }

    pub fn set_bounding_box(&mut self, key: ObjectKey, bounding_box: BoundingBox) -> Result<()> {
        let member = self.member_mut(key)?;
        member.object.set_bounding_box(bounding_box);
        let index = member.slot.index as usize;
        self.bounds_dirty.set(index, true);
        Ok(())
    }

    pub fn set_transform_index(&mut self, key: ObjectKey, index: TransformIndex) -> Result<()> {
        let member = self.member_mut(key)?;
        member.object.set_transform_index(index);
        let slot_index = member.slot.index as usize;
        self.bounds_dirty.set(slot_index, true);
        Ok(())
    }

    /// Members in insertion order
    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &Object, Slot)> + '_ {
        self.order.iter().filter_map(move |&key| {
            self.members.get(key).map(|m| (key, &m.object, m.slot))
        })
    }

    // ===== SLOTS =====

    /// Size of per-slot arrays (highest slot ever used + 1)
    pub fn slot_capacity(&self) -> usize {
        self.slots.high_water_mark() as usize
    }

    /// Generation of the object living in slot `index`, `None` if free
    pub fn slot_generation(&self, index: usize) -> Option<u32> {
        self.slots.generation(index as u32)
    }

    // ===== MATRICES =====

    /// Replace the world matrices wholesale.
    ///
    /// Transforms whose matrix differs from the previous upload are marked
    /// dirty, so cached world bounds stay correct without any
    /// `matrix_changed` hint.
    pub fn set_matrices(&mut self, matrices: MatrixArray<'_>) {
        let previous_len = self.matrices.len();
        for (index, matrix) in matrices.iter().enumerate() {
            if index >= previous_len || self.matrices[index] != matrix {
                self.dirty_transforms.insert(index);
            }
        }
        // Shrinking invalidates objects pointing past the new end
        for index in matrices.len()..previous_len {
            self.dirty_transforms.insert(index);
        }
        self.matrices.clear();
        self.matrices.extend(matrices.iter());
    }

    /// Invalidation hint: the world matrix at `index` changed
    pub fn matrix_changed(&mut self, index: TransformIndex) {
        self.dirty_transforms.insert(index);
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn matrix(&self, index: TransformIndex) -> Option<&Mat4> {
        self.matrices.get(index)
    }

    /// Check that every member indexes into the current matrix array.
    pub fn validate_transforms(&self) -> Result<()> {
        let count = self.matrices.len();
        match self.objects().find(|(_, object, _)| object.transform_index() >= count) {
            Some((key, object, _)) => Err(engine_err!("galaxy3d::culling::Group",
                "Object {:?} uses transform {} but only {} matrices are set",
                key, object.transform_index(), count)),
            None => Ok(()),
        }
    }

    // ===== WORLD BOUNDS CACHE =====

    /// Recompute cached world boxes of dirty objects and return the cache,
    /// indexed by slot.
    pub fn update_world_bounds(&mut self) -> &[Option<OrientedBox>] {
        if !self.dirty_transforms.is_empty() {
            for member in self.members.values() {
                if self.dirty_transforms.contains(&member.object.transform_index()) {
                    self.bounds_dirty.set(member.slot.index as usize, true);
                }
            }
            self.dirty_transforms.clear();
        }

        if self.bounds_dirty.any() {
            for member in self.members.values() {
                let index = member.slot.index as usize;
                if !self.bounds_dirty.get(index) {
                    continue;
                }
                self.world_bounds[index] = self.matrices
                    .get(member.object.transform_index())
                    .and_then(|world| OrientedBox::from_box(member.object.bounding_box(), world));
            }
            self.bounds_dirty.clear();
        }

        &self.world_bounds
    }

    /// Union of all members' world-space bounds
    pub fn world_bounding_box(&mut self) -> BoundingBox {
        self.update_world_bounds()
            .iter()
            .flatten()
            .fold(BoundingBox::EMPTY, |acc, obb| acc.union(&obb.bounds()))
    }

    fn member_mut(&mut self, key: ObjectKey) -> Result<&mut Member> {
        let id = self.id;
        self.members.get_mut(key)
            .ok_or_else(|| engine_err!("galaxy3d::culling::Group",
                "Unknown object {:?} in group {:?}", key, id))
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
