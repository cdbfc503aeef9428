/// Tests for SceneCulling
///
/// Scene synchronization, per-frame culling through the bridge and the
/// failure modes (contract violations, destroyed scene).

use glam::Vec3;
use crate::culling::MatrixArray;
use crate::scene::memory_scene_tree::MemorySceneTree;
use crate::scene::subject::{Subject, SubjectId};
use super::*;

// ============================================================================
// Helper Functions
// ============================================================================

const MODES: [CullingMode; 2] = [CullingMode::Cpu, CullingMode::Parallel];

fn view_projection() -> Mat4 {
    let projection = Mat4::perspective_rh_gl(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    projection * view
}

fn unit_cube() -> BoundingBox {
    BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5))
}

fn cube_node(transform_index: usize) -> ObjectNode {
    ObjectNode::drawable(transform_index, unit_cube())
}

/// Scene with transform 0 at the origin (in view) and transform 1 far
/// to the right (out of view)
fn scene_with_transforms() -> MemorySceneTree {
    let mut scene = MemorySceneTree::new();
    scene.add_transform(Mat4::IDENTITY);
    scene.add_transform(Mat4::from_translation(Vec3::new(100.0, 0.0, 0.0)));
    scene
}

/// SceneTree driven by hand-written events
struct ScriptedScene {
    size: usize,
    matrices: Vec<Mat4>,
    objects: Subject<SceneEvent>,
    transforms: Subject<TransformEvent>,
}

impl ScriptedScene {
    fn new(size: usize) -> Self {
        Self {
            size,
            matrices: vec![Mat4::IDENTITY],
            objects: Subject::new("scripted objects"),
            transforms: Subject::new("scripted transforms"),
        }
    }
}

impl SceneTree for ScriptedScene {
    fn object_tree_size(&self) -> usize {
        self.size
    }

    fn object_node(&self, _index: SceneIndex) -> Option<&ObjectNode> {
        None
    }

    fn world_matrices(&self) -> MatrixArray<'_> {
        MatrixArray::from_matrices(&self.matrices)
    }

    fn subscribe_objects(&mut self) -> Subscription<SceneEvent> {
        self.objects.subscribe()
    }

    fn subscribe_transforms(&mut self) -> Subscription<TransformEvent> {
        self.transforms.subscribe()
    }

    fn object_subject_id(&self) -> SubjectId {
        self.objects.id()
    }

    fn transform_subject_id(&self) -> SubjectId {
        self.transforms.id()
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_existing_nodes_are_mirrored_at_construction() {
    let mut scene = scene_with_transforms();
    scene.add_node(cube_node(0));
    scene.add_node(ObjectNode::non_drawable(0));
    scene.add_node(cube_node(1));

    let bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();
    assert_eq!(bridge.object_count(), 2);
    assert!(bridge.has_object(0));
    assert_eq!(bridge.object_slot(1), ObjectSlot::NonDrawable);
    assert!(bridge.has_object(2));
    assert_eq!(bridge.object_slot(3), ObjectSlot::Empty);
    assert!(bridge.diagnostics().is_empty());
}

#[test]
fn test_unknown_mode_uses_software_backend() {
    let mut scene = scene_with_transforms();
    let config = CullingConfig { mode: "holographic".to_string(), batch_size: 64 };

    let bridge = SceneCulling::new(&mut scene, &config).unwrap();
    assert_eq!(bridge.mode(), CullingMode::Cpu);
    assert_eq!(bridge.diagnostics().len(), 1);
    assert!(bridge.diagnostics()[0].message.contains("holographic"));
}

#[test]
fn test_requested_mode_is_used() {
    for mode in MODES {
        let mut scene = scene_with_transforms();
        let bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(mode)).unwrap();
        assert_eq!(bridge.mode(), mode);
    }
}

// ============================================================================
// Culling
// ============================================================================

#[test]
fn test_visible_cube_reported_once() {
    for mode in MODES {
        let mut scene = scene_with_transforms();
        let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(mode)).unwrap();
        let mut result = bridge.result_create();

        let index = scene.add_node(cube_node(0));
        assert_eq!(index, 0);

        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(bridge.result_is_visible(&result, 0).unwrap());
        assert_eq!(bridge.result_changed_indices(&result).unwrap(), vec![0]);

        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(bridge.result_is_visible(&result, 0).unwrap());
        assert!(bridge.result_changed_indices(&result).unwrap().is_empty());
    }
}

#[test]
fn test_readded_index_has_no_history() {
    for mode in MODES {
        let mut scene = scene_with_transforms();
        let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(mode)).unwrap();
        let mut result = bridge.result_create();

        scene.add_node(cube_node(0));
        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(bridge.result_is_visible(&result, 0).unwrap());

        scene.remove_node(0).unwrap();
        let index = scene.add_node(cube_node(1));
        assert_eq!(index, 0);

        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(!bridge.result_is_visible(&result, 0).unwrap());
        assert!(bridge.result_changed_indices(&result).unwrap().is_empty());
        assert_eq!(bridge.object_count(), 1);
    }
}

#[test]
fn test_transform_updates_move_objects() {
    for mode in MODES {
        let mut scene = scene_with_transforms();
        let mover = scene.add_transform(Mat4::IDENTITY);
        let index = scene.add_node(cube_node(mover));
        let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(mode)).unwrap();
        let mut result = bridge.result_create();
        scene.flush_transforms();

        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert_eq!(bridge.result_changed_indices(&result).unwrap(), vec![index]);

        scene.set_world_matrix(mover, Mat4::from_translation(Vec3::new(0.0, -60.0, 0.0))).unwrap();
        scene.flush_transforms();
        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(!bridge.result_is_visible(&result, index).unwrap());
        assert_eq!(bridge.result_changed_indices(&result).unwrap(), vec![index]);

        // Moving without a flush is still picked up from the matrix upload
        scene.set_world_matrix(mover, Mat4::IDENTITY).unwrap();
        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(bridge.result_is_visible(&result, index).unwrap());
    }
}

#[test]
fn test_changed_events_update_objects() {
    for mode in MODES {
        let mut scene = scene_with_transforms();
        let index = scene.add_node(cube_node(1));
        let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(mode)).unwrap();
        let mut result = bridge.result_create();

        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(!bridge.result_is_visible(&result, index).unwrap());

        // Retargeted to the in-view transform
        scene.update_node(index, cube_node(0)).unwrap();
        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(bridge.result_is_visible(&result, index).unwrap());

        // Loses its geometry: object goes away, nothing to report
        scene.update_node(index, ObjectNode::non_drawable(0)).unwrap();
        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(!bridge.has_object(index));
        assert!(!bridge.result_is_visible(&result, index).unwrap());
        assert!(bridge.result_changed_indices(&result).unwrap().is_empty());

        // Gains geometry again: fresh object, reported as newly visible
        scene.update_node(index, cube_node(0)).unwrap();
        bridge.cull(&scene, &mut result, &view_projection()).unwrap();
        assert!(bridge.has_object(index));
        assert_eq!(bridge.result_changed_indices(&result).unwrap(), vec![index]);
    }
}

#[test]
fn test_replayed_edits_leave_only_live_drawables() {
    let mut scene = scene_with_transforms();
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();

    let a = scene.add_node(cube_node(0));
    let b = scene.add_node(ObjectNode::non_drawable(0));
    let c = scene.add_node(cube_node(1));
    let d = scene.add_node(cube_node(0));
    scene.remove_node(a).unwrap();
    scene.update_node(b, cube_node(0)).unwrap();
    scene.update_node(d, ObjectNode::non_drawable(0)).unwrap();
    scene.remove_node(c).unwrap();
    let e = scene.add_node(cube_node(1));

    bridge.process_events(&scene).unwrap();
    let live: Vec<SceneIndex> = (0..scene.object_tree_size())
        .filter(|i| bridge.has_object(*i))
        .collect();
    let expected: Vec<SceneIndex> = (0..scene.object_tree_size())
        .filter(|i| scene.object_node(*i).is_some_and(|n| n.drawable))
        .collect();
    assert_eq!(live, expected);
    assert!(live.contains(&b) && live.contains(&e));
    assert_eq!(bridge.object_count(), 2);
}

#[test]
fn test_independent_results() {
    let mut scene = scene_with_transforms();
    scene.add_node(cube_node(0));
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();
    let mut main = bridge.result_create();
    let mut shadow = bridge.result_create();

    bridge.cull(&scene, &mut main, &view_projection()).unwrap();
    assert_eq!(bridge.result_changed_indices(&main).unwrap(), vec![0]);
    assert!(!bridge.result_is_visible(&shadow, 0).unwrap());

    bridge.cull(&scene, &mut shadow, &view_projection()).unwrap();
    assert_eq!(bridge.result_changed_indices(&shadow).unwrap(), vec![0]);
}

#[test]
fn test_scene_bounding_box() {
    let mut scene = scene_with_transforms();
    scene.add_node(cube_node(0));
    scene.add_node(cube_node(1));
    scene.add_node(ObjectNode::non_drawable(1));
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();

    let bounds = bridge.bounding_box(&scene).unwrap();
    assert_eq!(bounds.min, Vec3::splat(-0.5));
    assert_eq!(bounds.max, Vec3::new(100.5, 0.5, 0.5));
}

#[test]
fn test_empty_scene_bounding_box_is_empty() {
    let mut scene = scene_with_transforms();
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();
    assert!(bridge.bounding_box(&scene).unwrap().is_empty());
}

// ============================================================================
// Failure semantics
// ============================================================================

#[test]
fn test_duplicate_add_stops_processing() {
    let mut scene = ScriptedScene::new(0);
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();

    scene.objects.notify(SceneEvent::Added { index: 0, node: cube_node(0) });
    scene.objects.notify(SceneEvent::Added { index: 0, node: cube_node(0) });
    scene.objects.notify(SceneEvent::Added { index: 3, node: cube_node(0) });

    let err = bridge.process_events(&scene).unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)));
    assert!(bridge.has_object(0));
    assert!(!bridge.has_object(3));

    // Remaining events are still queued
    bridge.process_events(&scene).unwrap();
    assert!(bridge.has_object(3));
    assert_eq!(bridge.object_count(), 2);
}

#[test]
fn test_events_for_unknown_nodes_are_rejected() {
    let mut scene = ScriptedScene::new(0);
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();

    scene.objects.notify(SceneEvent::Removed { index: 5 });
    assert!(matches!(bridge.process_events(&scene), Err(Error::ContractViolation(_))));

    scene.objects.notify(SceneEvent::Changed { index: 2, node: cube_node(0) });
    assert!(matches!(bridge.process_events(&scene), Err(Error::ContractViolation(_))));

    // Not a lifetime problem: the bridge stays usable
    assert!(!bridge.is_detached());
    assert!(bridge.process_events(&scene).is_ok());
}

#[test]
fn test_added_grows_to_scene_size() {
    let mut scene = ScriptedScene::new(10);
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();

    scene.objects.notify(SceneEvent::Added { index: 2, node: cube_node(0) });
    bridge.process_events(&scene).unwrap();
    // Index 9 exists in the scene's index space even though nothing was added there
    assert_eq!(bridge.object_slot(9), ObjectSlot::Empty);
    assert!(bridge.has_object(2));
}

#[test]
fn test_transform_events_are_consumed() {
    let mut scene = ScriptedScene::new(0);
    let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(CullingMode::Parallel)).unwrap();
    let mut result = bridge.result_create();
    scene.objects.notify(SceneEvent::Added { index: 0, node: cube_node(0) });

    let mut dirty = crate::utils::BitArray::new(1);
    dirty.set(0, true);
    scene.transforms.notify(TransformEvent::WorldMatricesChanged { dirty });

    bridge.cull(&scene, &mut result, &view_projection()).unwrap();
    assert_eq!(bridge.result_changed_indices(&result).unwrap(), vec![0]);
    assert_eq!(bridge.transform_events.pending(), 0);
}

#[test]
fn test_destroyed_scene_detaches_bridge() {
    for mode in MODES {
        let mut scene = scene_with_transforms();
        scene.add_node(cube_node(0));
        let mut bridge = SceneCulling::new(&mut scene, &CullingConfig::with_mode(mode)).unwrap();
        let mut result = bridge.result_create();

        // The observed scene goes away while the bridge is still subscribed
        scene = scene_with_transforms();

        let err = bridge.cull(&scene, &mut result, &view_projection()).unwrap_err();
        assert!(matches!(err, Error::SubjectDestroyed(_)));
        assert!(bridge.is_detached());
        assert!(matches!(bridge.result_is_visible(&result, 0), Err(Error::SubjectDestroyed(_))));
        assert!(matches!(bridge.result_changed_indices(&result), Err(Error::SubjectDestroyed(_))));
        assert!(matches!(bridge.bounding_box(&scene), Err(Error::SubjectDestroyed(_))));
        assert!(matches!(bridge.process_events(&scene), Err(Error::SubjectDestroyed(_))));
    }
}

#[test]
fn test_result_from_other_bridge_is_rejected() {
    let mut scene = scene_with_transforms();
    scene.add_node(cube_node(0));
    let mut first = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();
    let second = SceneCulling::new(&mut scene, &CullingConfig::default()).unwrap();

    let mut foreign = second.result_create();
    assert!(matches!(
        first.cull(&scene, &mut foreign, &view_projection()),
        Err(Error::ContractViolation(_))));
}

#[test]
fn test_scene_not_observed_is_rejected() {
    for mode in MODES {
        let mut observed = scene_with_transforms();
        observed.add_node(cube_node(0));
        let mut bridge = SceneCulling::new(&mut observed, &CullingConfig::with_mode(mode)).unwrap();
        let mut result = bridge.result_create();

        // Same layout, but its only cube uses the out-of-view transform
        let mut other = scene_with_transforms();
        other.add_node(cube_node(1));

        assert!(matches!(
            bridge.cull(&other, &mut result, &view_projection()),
            Err(Error::ContractViolation(_))));
        assert!(matches!(bridge.bounding_box(&other), Err(Error::ContractViolation(_))));
        assert!(matches!(bridge.process_events(&other), Err(Error::ContractViolation(_))));
        assert!(!bridge.is_detached());

        // The observed scene is still served normally
        bridge.cull(&observed, &mut result, &view_projection()).unwrap();
        assert!(bridge.result_is_visible(&result, 0).unwrap());
        assert_eq!(bridge.result_changed_indices(&result).unwrap(), vec![0]);
    }
}
