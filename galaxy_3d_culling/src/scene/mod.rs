//! Scene side of the culling engine
//!
//! Provides the contract a scene graph implements to be culled (SceneTree
//! and its event streams), an in-memory scene, and the bridge that keeps
//! a culling group synchronized with a live scene.

mod subject;
mod scene_tree;
mod memory_scene_tree;
mod culling_bridge;

pub use subject::{Subject, SubjectId, Subscription};
pub use scene_tree::{ObjectNode, SceneEvent, SceneTree, TransformEvent};
pub use memory_scene_tree::MemorySceneTree;
pub use culling_bridge::{ObjectSlot, SceneCulling};
