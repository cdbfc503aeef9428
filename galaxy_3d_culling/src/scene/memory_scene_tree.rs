/// MemorySceneTree - in-memory SceneTree implementation.
///
/// Stores nodes in an index-stable vector (freed indices are reused by
/// later additions) and world matrices in a contiguous array. Structural
/// edits are notified immediately; matrix edits are accumulated in a dirty
/// bitset and notified once per `flush_transforms`.

use glam::Mat4;
use crate::error::Result;
use crate::engine_err;
use crate::culling::{MatrixArray, SceneIndex, TransformIndex};
use crate::utils::BitArray;
use super::scene_tree::{ObjectNode, SceneEvent, SceneTree, TransformEvent};
use super::subject::{Subject, SubjectId, Subscription};

pub struct MemorySceneTree {
    nodes: Vec<Option<ObjectNode>>,
    /// Freed node indices, reused LIFO
    free_indices: Vec<SceneIndex>,
    matrices: Vec<Mat4>,
    /// Matrices modified since the last flush
    dirty_transforms: BitArray,
    object_events: Subject<SceneEvent>,
    transform_events: Subject<TransformEvent>,
}

impl MemorySceneTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_indices: Vec::new(),
            matrices: Vec::new(),
            dirty_transforms: BitArray::new(0),
            object_events: Subject::new("scene object tree"),
            transform_events: Subject::new("scene transform tree"),
        }
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_indices.len()
    }

    // ===== OBJECT TREE =====

    /// Insert a node and notify `Added`
    pub fn add_node(&mut self, node: ObjectNode) -> SceneIndex {
        let index = match self.free_indices.pop() {
            Some(index) => {
                self.nodes[index] = Some(node.clone());
                index
            }
            None => {
                self.nodes.push(Some(node.clone()));
                self.nodes.len() - 1
            }
        };
        self.object_events.notify(SceneEvent::Added { index, node });
        index
    }

    /// Remove a node and notify `Removed`
    pub fn remove_node(&mut self, index: SceneIndex) -> Result<ObjectNode> {
        let node = self.nodes.get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| engine_err!("galaxy3d::scene::MemorySceneTree",
                "Cannot remove node {}: no such node", index))?;
        self.free_indices.push(index);
        self.object_events.notify(SceneEvent::Removed { index });
        Ok(node)
    }

    /// Replace a node's culling data and notify `Changed`
    pub fn update_node(&mut self, index: SceneIndex, node: ObjectNode) -> Result<()> {
        let slot = self.nodes.get_mut(index)
            .and_then(Option::as_mut)
            .ok_or_else(|| engine_err!("galaxy3d::scene::MemorySceneTree",
                "Cannot update node {}: no such node", index))?;
        *slot = node.clone();
        self.object_events.notify(SceneEvent::Changed { index, node });
        Ok(())
    }

    // ===== TRANSFORMS =====

    /// Append a world matrix
    pub fn add_transform(&mut self, matrix: Mat4) -> TransformIndex {
        let index = self.matrices.len();
        self.matrices.push(matrix);
        self.dirty_transforms.set(index, true);
        index
    }

    pub fn set_world_matrix(&mut self, index: TransformIndex, matrix: Mat4) -> Result<()> {
        let count = self.matrices.len();
        let slot = self.matrices.get_mut(index)
            .ok_or_else(|| engine_err!("galaxy3d::scene::MemorySceneTree",
                "Cannot set world matrix {}: only {} transforms", index, count))?;
        *slot = matrix;
        self.dirty_transforms.set(index, true);
        Ok(())
    }

    pub fn world_matrix(&self, index: TransformIndex) -> Option<&Mat4> {
        self.matrices.get(index)
    }

    /// Notify the matrices modified since the last flush (if any) and
    /// start a new dirty set
    pub fn flush_transforms(&mut self) {
        if !self.dirty_transforms.any() {
            return;
        }
        let dirty = std::mem::replace(&mut self.dirty_transforms, BitArray::new(self.matrices.len()));
        self.transform_events.notify(TransformEvent::WorldMatricesChanged { dirty });
    }
}

impl Default for MemorySceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree for MemorySceneTree {
    fn object_tree_size(&self) -> usize {
        self.nodes.len()
    }

    fn object_node(&self, index: SceneIndex) -> Option<&ObjectNode> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    fn world_matrices(&self) -> MatrixArray<'_> {
        MatrixArray::from_matrices(&self.matrices)
    }

    fn subscribe_objects(&mut self) -> Subscription<SceneEvent> {
        self.object_events.subscribe()
    }

    fn subscribe_transforms(&mut self) -> Subscription<TransformEvent> {
        self.transform_events.subscribe()
    }

    fn object_subject_id(&self) -> SubjectId {
        self.object_events.id()
    }

    fn transform_subject_id(&self) -> SubjectId {
        self.transform_events.id()
    }
}

#[cfg(test)]
#[path = "memory_scene_tree_tests.rs"]
mod tests;
