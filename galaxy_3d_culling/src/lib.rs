/*!
# Galaxy 3D Culling

Visibility culling engine for the Galaxy 3D engine.

Decides, once per frame, which drawable objects of a large dynamic scene
are visible under a view-projection, and reports only the objects whose
visibility changed since the previous evaluation.

## Architecture

- **CullingManager**: backend trait (software `CpuManager`, data-parallel
  `ParallelManager`), selected at runtime from `CullingConfig`
- **Group**: the objects evaluated together and their world matrices
- **CullingResult**: per-query visibility and the changed list
- **SceneTree**: contract a scene graph implements to be culled
- **SceneCulling**: bridge keeping a Group in sync with a live SceneTree

## Example

```no_run
use galaxy_3d_culling::galaxy3d::culling::{BoundingBox, CullingConfig};
use galaxy_3d_culling::galaxy3d::scene::{MemorySceneTree, ObjectNode, SceneCulling};
use galaxy_3d_culling::glam::{Mat4, Vec3};

let mut scene = MemorySceneTree::new();
let transform = scene.add_transform(Mat4::IDENTITY);
let mut culling = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();
let mut result = culling.result_create();

let cube = BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5));
scene.add_node(ObjectNode::drawable(transform, cube));

let view_projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0)
    * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
culling.cull(&scene, &mut result, &view_projection).unwrap();
for index in culling.result_changed_indices(&result).unwrap() {
    println!("node {} visible: {}", index, culling.result_is_visible(&result, index).unwrap());
}
```
*/

// Internal modules
mod error;
mod utils;
pub mod log;
pub mod culling;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger,
            set_logger, reset_logger,
        };
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Culling sub-module: backends, groups, objects, results
    pub mod culling {
        pub use crate::culling::*;
    }

    // Scene sub-module: scene contract and the culling bridge
    pub mod scene {
        pub use crate::scene::*;
    }

    // Containers used in the public API
    pub mod utils {
        pub use crate::utils::{BitArray, Slot, SlotAllocator};
    }
}

// Re-export math library at crate root
pub use glam;
