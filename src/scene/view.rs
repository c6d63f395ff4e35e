use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::EntityId;
use crate::record::command::{EntitySnapshot, PropertyValue};
use crate::scene::model::Scene;

/// Read-only view of the scene being baked, handed to behaviors.
///
/// Values are cloned out so no borrow outlives a call.
#[derive(Clone)]
pub struct SceneView {
    scene: Rc<RefCell<Scene>>,
}

impl SceneView {
    pub(crate) fn new(scene: Rc<RefCell<Scene>>) -> Self {
        Self { scene }
    }

    /// Return `true` if `id` is a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.scene.borrow().get(id).is_some()
    }

    /// Snapshot of a live entity.
    pub fn snapshot(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.scene.borrow().get(id).cloned()
    }

    /// Current value of one property.
    pub fn property(&self, id: EntityId, name: &str) -> Option<PropertyValue> {
        self.scene.borrow().property(id, name).cloned()
    }

    /// Currently active camera.
    pub fn active_camera(&self) -> Option<EntityId> {
        self.scene.borrow().active_camera()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.scene.borrow().len()
    }

    /// Return `true` if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.scene.borrow().is_empty()
    }
}
