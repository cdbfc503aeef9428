/// Culling objects: one per drawable scene node.

use slotmap::new_key_type;
use super::bounding_box::BoundingBox;

/// Stable identity of a node in the observed scene graph.
pub type SceneIndex = usize;

/// Offset into the shared, contiguous world-matrix array.
pub type TransformIndex = usize;

new_key_type! {
    /// Stable key for an Object within a Group.
    ///
    /// A key becomes invalid only when its own object is removed.
    pub struct ObjectKey;
}

/// Immutable back-reference from a culling object to its scene node.
///
/// Lets the backend report results in terms the scene side can map
/// back without any address-based lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload {
    scene_index: SceneIndex,
}

impl Payload {
    pub fn new(scene_index: SceneIndex) -> Self {
        Self { scene_index }
    }

    pub fn scene_index(&self) -> SceneIndex {
        self.scene_index
    }
}

/// Per-drawable culling record.
///
/// Created free-standing by `CullingManager::object_create`, then moved
/// into exactly one Group.
#[derive(Debug, Clone)]
pub struct Object {
    /// Object-space bounds (empty until set)
    bounding_box: BoundingBox,
    /// Index of the world matrix in the group's matrix array
    transform_index: TransformIndex,
    payload: Payload,
}

impl Object {
    pub fn new(payload: Payload) -> Self {
        Self {
            bounding_box: BoundingBox::EMPTY,
            transform_index: 0,
            payload,
        }
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox) {
        self.bounding_box = bounding_box;
    }

    pub fn transform_index(&self) -> TransformIndex {
        self.transform_index
    }

    pub fn set_transform_index(&mut self, index: TransformIndex) {
        self.transform_index = index;
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
