/// CullingManager trait - visibility backend interface
///
/// A manager creates groups, objects and results, and evaluates the
/// visibility of every object of a group under a view-projection.
/// All bookkeeping is shared (default methods); a backend only supplies
/// its evaluation strategy in `cull`.

use glam::Mat4;
use crate::error::Result;
use crate::engine_warn;
use crate::log::LogSeverity;
use super::bounding_box::BoundingBox;
use super::config::{CullingConfig, CullingMode};
use super::cpu_manager::CpuManager;
use super::group::Group;
use super::matrix_array::MatrixArray;
use super::object::{Object, ObjectKey, Payload, TransformIndex};
use super::parallel_manager::ParallelManager;
use super::result::CullingResult;

/// Non-fatal problem reported to the caller (e.g. an unknown backend name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: LogSeverity,
    pub source: String,
    pub message: String,
}

/// Visibility backend.
///
/// Object-facing operations address objects by `ObjectKey` inside the group
/// that owns them; passing a key that is not a member is a contract violation.
pub trait CullingManager: Send + Sync {
    /// Backend implemented by this manager
    fn mode(&self) -> CullingMode;

    /// Evaluate every object of `group` under `view_projection`.
    ///
    /// Updates the result's visibility and replaces its changed list with the
    /// objects whose visibility flipped, in group insertion order.
    ///
    /// # Errors
    ///
    /// `ContractViolation` if `result` belongs to another group or an object
    /// references a transform outside the current matrix array.
    fn cull(&self, group: &mut Group, result: &mut CullingResult, view_projection: &Mat4) -> Result<()>;

    // ===== GROUPS & OBJECTS =====

    fn group_create(&self) -> Group {
        Group::new()
    }

    /// Create a free-standing object (not yet in any group)
    fn object_create(&self, payload: Payload) -> Object {
        Object::new(payload)
    }

    fn group_add_object(&self, group: &mut Group, object: Object) -> ObjectKey {
        group.add_object(object)
    }

    fn group_remove_object(&self, group: &mut Group, key: ObjectKey) -> Result<Object> {
        group.remove_object(key)
    }

    /// Set the object-space bounds of a member
    fn object_set_bounding_box(&self, group: &mut Group, key: ObjectKey, bounding_box: BoundingBox) -> Result<()> {
        group.set_bounding_box(key, bounding_box)
    }

    fn object_set_transform_index(&self, group: &mut Group, key: ObjectKey, index: TransformIndex) -> Result<()> {
        group.set_transform_index(key, index)
    }

    fn object_get_user_data<'g>(&self, group: &'g Group, key: ObjectKey) -> Result<&'g Payload> {
        group.object(key).map(|object| object.payload())
    }

    // ===== MATRICES =====

    /// Replace the group's world matrices; required before every `cull`
    fn group_set_matrices(&self, group: &mut Group, matrices: MatrixArray<'_>) {
        group.set_matrices(matrices);
    }

    /// Hint that the matrix at `index` changed since the last upload
    fn group_matrix_changed(&self, group: &mut Group, index: TransformIndex) {
        group.matrix_changed(index);
    }

    // ===== RESULTS =====

    fn group_create_result(&self, group: &Group) -> CullingResult {
        CullingResult::new(group)
    }

    /// Visibility of `key` at the last `cull` of `result`
    fn result_object_is_visible(&self, group: &Group, result: &CullingResult, key: ObjectKey) -> Result<bool> {
        result.check_group(group)?;
        let slot = group.slot(key)?;
        Ok(result.is_visible(slot.index as usize, slot.generation))
    }

    fn result_get_changed<'r>(&self, result: &'r CullingResult) -> &'r [ObjectKey] {
        result.changed()
    }

    /// World-space union of all member objects under the current matrices
    fn bounding_box(&self, group: &mut Group) -> BoundingBox {
        group.world_bounding_box()
    }
}

/// Create the backend requested by `config`.
///
/// An unknown mode name is not fatal: the software backend is returned
/// along with a warning diagnostic (also sent to the engine logger).
pub fn create_manager(config: &CullingConfig) -> (Box<dyn CullingManager>, Option<Diagnostic>) {
    let (mode, diagnostic) = match CullingMode::parse(&config.mode) {
        Some(mode) => (mode, None),
        None => {
            let message = format!(
                "Unknown culling mode '{}', falling back to '{}'",
                config.mode, CullingMode::Cpu);
            engine_warn!("galaxy3d::culling::Manager", "{}", message);
            let diagnostic = Diagnostic {
                severity: LogSeverity::Warn,
                source: "galaxy3d::culling::Manager".to_string(),
                message,
            };
            (CullingMode::Cpu, Some(diagnostic))
        }
    };

    let manager: Box<dyn CullingManager> = match mode {
        CullingMode::Cpu => Box::new(CpuManager::new()),
        CullingMode::Parallel => Box::new(ParallelManager::new(config.batch_size)),
    };
    (manager, diagnostic)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
