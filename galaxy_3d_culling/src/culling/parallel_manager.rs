/// Accelerated backend: data-parallel clip-space evaluation.
///
/// World boxes come from the group's cache (only dirty objects are
/// recomputed). Each work item evaluates one 64-slot word of the result:
/// every box is moved to clip space and tested with out-codes, and the
/// words are assembled into the visibility bitset once all items join.

use glam::Mat4;
use rayon::prelude::*;
use crate::error::Result;
use crate::engine_trace;
use crate::utils::BitArray;
use super::config::CullingMode;
use super::frustum::ClipFlags;
use super::group::Group;
use super::manager::CullingManager;
use super::result::CullingResult;

const WORD_BITS: usize = 64;

pub struct ParallelManager {
    /// Minimum number of objects per work item
    batch_size: usize,
}

impl ParallelManager {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl CullingManager for ParallelManager {
    fn mode(&self) -> CullingMode {
        CullingMode::Parallel
    }

    fn cull(&self, group: &mut Group, result: &mut CullingResult, view_projection: &Mat4) -> Result<()> {
        result.check_group(group)?;
        group.validate_transforms()?;

        let capacity = group.slot_capacity();
        let word_count = capacity.div_ceil(WORD_BITS);
        let words_per_item = self.batch_size.div_ceil(WORD_BITS).max(1);
        let bounds = group.update_world_bounds();

        let words: Vec<u64> = (0..word_count)
            .into_par_iter()
            .with_min_len(words_per_item)
            .map(|word_index| {
                let start = word_index * WORD_BITS;
                let end = (start + WORD_BITS).min(capacity);
                let mut word = 0u64;
                for slot in start..end {
                    let Some(Some(world_box)) = bounds.get(slot) else {
                        continue;
                    };
                    let clip_box = world_box.transformed(view_projection);
                    if ClipFlags::common_to_box(&clip_box).is_empty() {
                        word |= 1u64 << (slot - start);
                    }
                }
                word
            })
            .collect();

        let current = BitArray::from_words(words, capacity);
        let visible_count = current.count_ones();
        result.update_changed(group, current);
        engine_trace!("galaxy3d::culling::ParallelManager",
            "Culled {} objects in {} words: {} visible, {} changed",
            group.object_count(), word_count, visible_count, result.changed().len());
        Ok(())
    }
}
