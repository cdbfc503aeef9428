/// Software backend: per-object plane test against the view frustum.

use glam::Mat4;
use crate::error::Result;
use crate::engine_trace;
use crate::utils::BitArray;
use super::bounding_box::OrientedBox;
use super::config::CullingMode;
use super::frustum::Frustum;
use super::group::Group;
use super::manager::CullingManager;
use super::result::CullingResult;

/// Evaluates objects one by one on the calling thread.
///
/// World boxes are computed fresh from the current matrices on every
/// evaluation, so no cached state can go stale.
pub struct CpuManager;

impl CpuManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpuManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CullingManager for CpuManager {
    fn mode(&self) -> CullingMode {
        CullingMode::Cpu
    }

    fn cull(&self, group: &mut Group, result: &mut CullingResult, view_projection: &Mat4) -> Result<()> {
        result.check_group(group)?;
        group.validate_transforms()?;

        let frustum = Frustum::from_view_projection(view_projection);
        let mut current = BitArray::new(group.slot_capacity());
        let mut visible_count = 0usize;

        for (_, object, slot) in group.objects() {
            let visible = group.matrix(object.transform_index())
                .and_then(|world| OrientedBox::from_box(object.bounding_box(), world))
                .map_or(false, |obb| frustum.intersects_box(&obb));
            if visible {
                current.set(slot.index as usize, true);
                visible_count += 1;
            }
        }

        result.update_changed(group, current);
        engine_trace!("galaxy3d::culling::CpuManager",
            "Culled {} objects: {} visible, {} changed",
            group.object_count(), visible_count, result.changed().len());
        Ok(())
    }
}
