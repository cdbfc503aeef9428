//! Visibility culling: groups of objects evaluated against a view-projection
//! by a pluggable backend, with per-result visibility diffing.

mod bounding_box;
mod config;
mod cpu_manager;
mod frustum;
mod group;
mod manager;
mod matrix_array;
mod object;
mod parallel_manager;
mod result;

pub use bounding_box::{BoundingBox, OrientedBox};
pub use config::{CullingConfig, CullingMode};
pub use cpu_manager::CpuManager;
pub use frustum::{ClipFlags, Frustum, FrustumTest};
pub use group::{Group, GroupId};
pub use manager::{create_manager, CullingManager, Diagnostic};
pub use matrix_array::{MatrixArray, MATRIX_SIZE};
pub use object::{Object, ObjectKey, Payload, SceneIndex, TransformIndex};
pub use parallel_manager::ParallelManager;
pub use result::CullingResult;
