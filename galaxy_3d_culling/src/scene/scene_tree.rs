/// SceneTree - what the culling bridge needs from a scene graph.
///
/// The scene exposes a flat object tree addressed by `SceneIndex`, a
/// contiguous array of world matrices, and two event streams: structural
/// changes of the object tree, and per-frame transform invalidation.

use crate::culling::{BoundingBox, MatrixArray, SceneIndex, TransformIndex};
use crate::utils::BitArray;
use super::subject::{SubjectId, Subscription};

/// Culling-relevant view of one scene node
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// Whether the node produces geometry (only drawable nodes are culled)
    pub drawable: bool,
    /// World matrix used by the node
    pub transform_index: TransformIndex,
    /// Object-space bounds
    pub bounding_box: BoundingBox,
}

impl ObjectNode {
    pub fn drawable(transform_index: TransformIndex, bounding_box: BoundingBox) -> Self {
        Self { drawable: true, transform_index, bounding_box }
    }

    /// A node without geometry (group, light, camera, ...)
    pub fn non_drawable(transform_index: TransformIndex) -> Self {
        Self { drawable: false, transform_index, bounding_box: BoundingBox::EMPTY }
    }
}

/// Structural change of the object tree
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added { index: SceneIndex, node: ObjectNode },
    Removed { index: SceneIndex },
    Changed { index: SceneIndex, node: ObjectNode },
}

/// Transform invalidation, emitted once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum TransformEvent {
    /// Bit `i` set: world matrix `i` changed since the previous notification
    WorldMatricesChanged { dirty: BitArray },
}

pub trait SceneTree {
    /// Size of the object index space (highest index ever used + 1)
    fn object_tree_size(&self) -> usize;

    /// Node at `index`, `None` if the index is free
    fn object_node(&self, index: SceneIndex) -> Option<&ObjectNode>;

    /// Current world matrices, indexed by `TransformIndex`
    fn world_matrices(&self) -> MatrixArray<'_>;

    fn subscribe_objects(&mut self) -> Subscription<SceneEvent>;

    fn subscribe_transforms(&mut self) -> Subscription<TransformEvent>;

    /// Identity of the subject behind `subscribe_objects`
    fn object_subject_id(&self) -> SubjectId;

    /// Identity of the subject behind `subscribe_transforms`
    fn transform_subject_id(&self) -> SubjectId;
}
