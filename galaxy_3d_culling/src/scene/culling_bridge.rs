/// SceneCulling - keeps a culling Group in sync with a SceneTree.
///
/// The bridge subscribes to the scene's structural and transform events
/// and mirrors drawable nodes as culling objects. Pending events are
/// applied at the start of every operation that reads the scene, so a
/// `cull` always evaluates the scene as it is now.
///
/// Objects are tracked in an index-stable vector parallel to the scene's
/// object tree: entry `i` describes scene node `i`. Entries are cleared on
/// removal, never compacted, so scene indices stay valid.

use glam::Mat4;
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_error, engine_info};
use crate::culling::{
    create_manager, BoundingBox, CullingConfig, CullingManager, CullingMode,
    CullingResult, Diagnostic, Group, ObjectKey, Payload, SceneIndex,
};
use super::scene_tree::{ObjectNode, SceneEvent, SceneTree, TransformEvent};
use super::subject::Subscription;

/// Bridge-side state of one scene index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSlot {
    /// No scene node at this index
    Empty,
    /// A node without geometry: tracked, never culled
    NonDrawable,
    /// A drawable node and its culling object
    Object(ObjectKey),
}

pub struct SceneCulling {
    manager: Box<dyn CullingManager>,
    group: Group,
    objects: Vec<ObjectSlot>,
    object_events: Subscription<SceneEvent>,
    transform_events: Subscription<TransformEvent>,
    diagnostics: Vec<Diagnostic>,
    /// Set once an observed subject disappeared; returned by every later call
    detached: Option<Error>,
}

impl SceneCulling {
    /// Create a bridge observing `scene`, with the backend chosen by `config`.
    ///
    /// Every node already present in the scene gets its object immediately.
    /// An unknown backend name selects the software backend and is
    /// reported in `diagnostics()`.
    pub fn new(scene: &mut dyn SceneTree, config: &CullingConfig) -> Result<Self> {
        let (manager, diagnostic) = create_manager(config);
        let group = manager.group_create();
        let object_events = scene.subscribe_objects();
        let transform_events = scene.subscribe_transforms();

        let mut bridge = Self {
            manager,
            group,
            objects: Vec::new(),
            object_events,
            transform_events,
            diagnostics: diagnostic.into_iter().collect(),
            detached: None,
        };

        let size = scene.object_tree_size();
        bridge.objects.resize(size, ObjectSlot::Empty);
        for index in 0..size {
            if let Some(node) = scene.object_node(index) {
                bridge.add_node(index, node)?;
            }
        }

        engine_info!("galaxy3d::culling::SceneCulling",
            "Scene culling created: backend '{}', {} objects",
            bridge.manager.mode(), bridge.group.object_count());
        Ok(bridge)
    }

    /// Backend in use
    pub fn mode(&self) -> CullingMode {
        self.manager.mode()
    }

    /// Non-fatal problems reported while setting up the bridge
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_detached(&self) -> bool {
        self.detached.is_some()
    }

    /// Number of culling objects (drawable nodes)
    pub fn object_count(&self) -> usize {
        self.group.object_count()
    }

    /// Whether scene node `index` currently has a culling object
    pub fn has_object(&self, index: SceneIndex) -> bool {
        matches!(self.objects.get(index), Some(ObjectSlot::Object(_)))
    }

    pub fn object_slot(&self, index: SceneIndex) -> ObjectSlot {
        self.objects.get(index).copied().unwrap_or(ObjectSlot::Empty)
    }

    // ===== RESULTS =====

    /// Create a result for this bridge; every object starts hidden
    pub fn result_create(&self) -> CullingResult {
        self.manager.group_create_result(&self.group)
    }

    /// Evaluate visibility of the scene under `view_projection`.
    ///
    /// Applies pending scene events, uploads the scene's current world
    /// matrices, then updates `result`.
    pub fn cull(&mut self, scene: &dyn SceneTree, result: &mut CullingResult, view_projection: &Mat4) -> Result<()> {
        self.process_events(scene)?;
        self.manager.group_set_matrices(&mut self.group, scene.world_matrices());
        self.manager.cull(&mut self.group, result, view_projection)
    }

    /// Visibility of scene node `index` at the last `cull` of `result`.
    ///
    /// Nodes without a culling object (free or non-drawable) are not visible.
    pub fn result_is_visible(&self, result: &CullingResult, index: SceneIndex) -> Result<bool> {
        self.ensure_attached()?;
        match self.objects.get(index) {
            Some(ObjectSlot::Object(key)) => self.manager.result_object_is_visible(&self.group, result, *key),
            _ => Ok(false),
        }
    }

    /// Scene indices whose visibility flipped in the last `cull` of `result`,
    /// in object creation order.
    pub fn result_changed_indices(&self, result: &CullingResult) -> Result<Vec<SceneIndex>> {
        self.ensure_attached()?;
        result.check_group(&self.group)?;
        let indices = self.manager.result_get_changed(result)
            .iter()
            .filter(|key| self.group.contains(**key))
            .map(|key| self.manager.object_get_user_data(&self.group, *key).map(Payload::scene_index))
            .collect::<Result<Vec<_>>>()?;
        Ok(indices)
    }

    /// World-space bounds of all drawable nodes of the scene
    pub fn bounding_box(&mut self, scene: &dyn SceneTree) -> Result<BoundingBox> {
        self.process_events(scene)?;
        self.manager.group_set_matrices(&mut self.group, scene.world_matrices());
        Ok(self.manager.bounding_box(&mut self.group))
    }

    // ===== EVENTS =====

    /// Apply every pending scene event.
    ///
    /// Stops at the first contract violation; later events stay queued.
    ///
    /// # Errors
    ///
    /// `SubjectDestroyed` if the observed scene no longer exists. The bridge
    /// is detached from then on and every operation fails the same way.
    /// `ContractViolation` if `scene` is not the scene the bridge observes.
    pub fn process_events(&mut self, scene: &dyn SceneTree) -> Result<()> {
        self.ensure_attached()?;
        self.ensure_observed(scene)?;

        loop {
            match self.object_events.try_next() {
                Ok(Some(event)) => self.handle_scene_event(scene, event)?,
                Ok(None) => break,
                Err(err) => return Err(self.detach(err)),
            }
        }

        loop {
            match self.transform_events.try_next() {
                Ok(Some(event)) => self.handle_transform_event(event),
                Ok(None) => break,
                Err(err) => return Err(self.detach(err)),
            }
        }
        Ok(())
    }

    fn handle_scene_event(&mut self, scene: &dyn SceneTree, event: SceneEvent) -> Result<()> {
        match event {
            SceneEvent::Added { index, node } => {
                let size = scene.object_tree_size().max(index + 1);
                if self.objects.len() < size {
                    self.objects.resize(size, ObjectSlot::Empty);
                }
                if self.objects[index] != ObjectSlot::Empty {
                    engine_bail!("galaxy3d::culling::SceneCulling",
                        "Scene node {} added twice", index);
                }
                self.add_node(index, &node)
            }
            SceneEvent::Removed { index } => {
                match self.slot_of_existing(index)? {
                    ObjectSlot::Object(key) => {
                        self.manager.group_remove_object(&mut self.group, key)?;
                    }
                    ObjectSlot::NonDrawable | ObjectSlot::Empty => {}
                }
                self.objects[index] = ObjectSlot::Empty;
                engine_debug!("galaxy3d::culling::SceneCulling", "Scene node {} removed", index);
                Ok(())
            }
            SceneEvent::Changed { index, node } => {
                match (self.slot_of_existing(index)?, node.drawable) {
                    (ObjectSlot::Object(key), true) => {
                        self.manager.object_set_bounding_box(&mut self.group, key, node.bounding_box)?;
                        self.manager.object_set_transform_index(&mut self.group, key, node.transform_index)?;
                    }
                    (ObjectSlot::Object(key), false) => {
                        self.manager.group_remove_object(&mut self.group, key)?;
                        self.objects[index] = ObjectSlot::NonDrawable;
                    }
                    (ObjectSlot::NonDrawable, true) => {
                        self.add_node(index, &node)?;
                    }
                    (ObjectSlot::NonDrawable, false) | (ObjectSlot::Empty, _) => {}
                }
                Ok(())
            }
        }
    }

    fn handle_transform_event(&mut self, event: TransformEvent) {
        match event {
            TransformEvent::WorldMatricesChanged { dirty } => {
                let manager = &self.manager;
                let group = &mut self.group;
                dirty.traverse_bits(|index| manager.group_matrix_changed(group, index));
            }
        }
    }

    /// Create the bridge entry for node `index` (slot must be allocated)
    fn add_node(&mut self, index: SceneIndex, node: &ObjectNode) -> Result<()> {
        if !node.drawable {
            self.objects[index] = ObjectSlot::NonDrawable;
            return Ok(());
        }
        let object = self.manager.object_create(Payload::new(index));
        let key = self.manager.group_add_object(&mut self.group, object);
        self.manager.object_set_transform_index(&mut self.group, key, node.transform_index)?;
        self.manager.object_set_bounding_box(&mut self.group, key, node.bounding_box)?;
        self.objects[index] = ObjectSlot::Object(key);
        Ok(())
    }

    /// Bridge entry of a node the scene reports as existing
    fn slot_of_existing(&self, index: SceneIndex) -> Result<ObjectSlot> {
        match self.objects.get(index) {
            Some(ObjectSlot::Empty) | None => {
                engine_bail!("galaxy3d::culling::SceneCulling",
                    "Event for unknown scene node {}", index);
            }
            Some(slot) => Ok(*slot),
        }
    }

    /// Fail unless `scene` owns the subjects this bridge subscribed to.
    ///
    /// Once the observed scene is gone no caller can pass it again, so a
    /// mismatch with a dead subject detaches instead.
    fn ensure_observed(&mut self, scene: &dyn SceneTree) -> Result<()> {
        if scene.object_subject_id() == self.object_events.subject_id()
            && scene.transform_subject_id() == self.transform_events.subject_id()
        {
            return Ok(());
        }
        if !self.object_events.is_subject_alive() {
            let err = Error::SubjectDestroyed(self.object_events.subject().to_string());
            return Err(self.detach(err));
        }
        if !self.transform_events.is_subject_alive() {
            let err = Error::SubjectDestroyed(self.transform_events.subject().to_string());
            return Err(self.detach(err));
        }
        engine_bail!("galaxy3d::culling::SceneCulling",
            "Scene with subject {:?} is not the scene observed by this bridge ({:?})",
            scene.object_subject_id(), self.object_events.subject_id());
    }

    fn ensure_attached(&self) -> Result<()> {
        match &self.detached {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn detach(&mut self, err: Error) -> Error {
        engine_error!("galaxy3d::culling::SceneCulling",
            "Observed scene destroyed while subscribed ({}); detaching", err);
        self.detached = Some(err.clone());
        err
    }
}

#[cfg(test)]
#[path = "culling_bridge_tests.rs"]
mod tests;
