//! # Kitchen World
//!
//! The session-scoped context object owning the scene graph and the spatial
//! registry. Everything that mutates kitchen objects goes through a
//! [`World`]; there is no process-wide state, so independent worlds can
//! coexist (one per test, for instance).
//!
//! ## Key Components
//!
//! - [`registry`] - object types, capability records and membership lists
//! - [`attachment`] - the placed-on graph: attach, detach, propagate
//! - [`ObjectSpec`] - declarative description of an object to spawn

pub mod attachment;
pub mod registry;

use cgmath::{Vector3, Zero};

use crate::error::KitchenError;
use crate::gfx::loader::{LoadedModel, ModelDescriptor};
use crate::gfx::scene::{NodeId, Scene};

pub use registry::{
    Attachment, Capability, InteractAction, Interactable, ObjectRecord, Placeable, Registry,
    Selectable,
};

/// Scene plus registry for one running session.
#[derive(Debug, Default)]
pub struct World {
    pub scene: Scene,
    pub registry: Registry,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability on an object that already exists in the scene.
    pub fn register(
        &mut self,
        object: NodeId,
        capability: Capability,
        type_id: Option<&str>,
    ) -> Result<(), KitchenError> {
        if !self.scene.contains(object) {
            return Err(KitchenError::UnknownObject(object));
        }
        self.registry.register(object, capability, type_id)
    }

    /// Instantiates `model` at `position` and registers every capability in `spec`.
    pub fn spawn(&mut self, spec: &ObjectSpec, model: &LoadedModel) -> Result<NodeId, KitchenError> {
        let object = self.scene.spawn_model(model, spec.position);

        for capability in spec.capabilities() {
            if let Err(err) = self.registry.register(object, capability, Some(&spec.type_id)) {
                self.registry.remove(object);
                self.scene.remove_subtree(object);
                return Err(err);
            }
        }

        log::debug!("Spawned {} at {:?}", spec.type_id, spec.position);
        Ok(object)
    }

    /// Removes an object from the session.
    ///
    /// The object is detached from its host, anything placed on it is freed
    /// where it stands, and it leaves every registry list and the scene.
    pub fn destroy(&mut self, object: NodeId) -> Result<(), KitchenError> {
        if !self.scene.contains(object) {
            return Err(KitchenError::UnknownObject(object));
        }

        self.detach(object);
        for child in self.attached_to(object) {
            self.detach(child);
        }

        let description = self.describe(object);
        self.registry.remove(object);
        self.scene.remove_subtree(object);
        log::debug!("Destroyed {}", description);
        Ok(())
    }

    pub fn type_id(&self, object: NodeId) -> Option<&str> {
        self.registry.type_id(object)
    }

    pub fn position(&self, object: NodeId) -> Result<Vector3<f32>, KitchenError> {
        self.scene
            .position(object)
            .ok_or(KitchenError::UnknownObject(object))
    }

    /// Short human readable label for log lines
    pub fn describe(&self, object: NodeId) -> String {
        match self.registry.type_id(object) {
            Some(type_id) => format!("{}{:?}", type_id, object),
            None => format!("{:?}", object),
        }
    }
}

/// Description of a kitchen object to spawn.
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub type_id: String,
    pub model: ModelDescriptor,
    pub position: Vector3<f32>,
    /// Selectable place offset, if the object can be picked up
    pub selectable: Option<Vector3<f32>>,
    /// Placeable place offset, if the object can host others
    pub placeable: Option<Vector3<f32>>,
    pub interactable: Option<Interactable>,
}

impl ObjectSpec {
    pub fn new(type_id: impl Into<String>, model: ModelDescriptor) -> Self {
        Self {
            type_id: type_id.into(),
            model,
            position: Vector3::zero(),
            selectable: None,
            placeable: None,
            interactable: None,
        }
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn selectable(mut self, place_offset: Vector3<f32>) -> Self {
        self.selectable = Some(place_offset);
        self
    }

    pub fn placeable(mut self, place_offset: Vector3<f32>) -> Self {
        self.placeable = Some(place_offset);
        self
    }

    pub fn interactable(mut self, prompt: impl Into<String>, action: InteractAction) -> Self {
        self.interactable = Some(Interactable::new(prompt, action));
        self
    }

    fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = Vec::new();
        if let Some(offset) = self.placeable {
            capabilities.push(Capability::placeable(offset));
        }
        if let Some(offset) = self.selectable {
            capabilities.push(Capability::selectable(offset));
        }
        if let Some(interactable) = &self.interactable {
            capabilities.push(Capability::Interactable(interactable.clone()));
        }
        capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::loader::{ModelDescriptor, ModelLoader, PrimitiveLoader};

    fn spawn(world: &mut World, spec: ObjectSpec) -> NodeId {
        let model = pollster::block_on(PrimitiveLoader.load(&spec.model)).unwrap();
        world.spawn(&spec, &model).unwrap()
    }

    fn cube(name: &str) -> ModelDescriptor {
        ModelDescriptor::cuboid(name, Vector3::new(0.1, 0.1, 0.1))
    }

    #[test]
    fn test_spawn_registers_capabilities() {
        let mut world = World::new();
        let board = spawn(
            &mut world,
            ObjectSpec::new("cutting_board", cube("board"))
                .at(Vector3::new(1.0, 0.9, 0.0))
                .placeable(Vector3::new(0.0, 0.01, 0.0))
                .interactable("Cut", InteractAction::Craft),
        );

        assert_eq!(world.type_id(board), Some("cutting_board"));
        assert_eq!(world.registry.placeables(), &[board]);
        assert_eq!(world.registry.interactables(), &[board]);
        assert!(world.registry.draggable().is_empty());
        assert_eq!(world.position(board).unwrap(), Vector3::new(1.0, 0.9, 0.0));
        // root plus one mesh part
        assert_eq!(world.scene.subtree(board).len(), 2);
    }

    #[test]
    fn test_destroy_frees_children_and_clears_lists() {
        let mut world = World::new();
        let table = spawn(
            &mut world,
            ObjectSpec::new("table", cube("table")).placeable(Vector3::zero()),
        );
        let plate = spawn(
            &mut world,
            ObjectSpec::new("plate", cube("plate"))
                .selectable(Vector3::zero())
                .placeable(Vector3::zero()),
        );
        let fillet = spawn(
            &mut world,
            ObjectSpec::new("chicken_fillet", cube("fillet")).selectable(Vector3::zero()),
        );

        world.attach(table, plate).unwrap();
        world.attach(plate, fillet).unwrap();
        let fillet_position = world.position(fillet).unwrap();

        world.destroy(plate).unwrap();

        assert!(!world.scene.contains(plate));
        assert!(world.attached_to(table).is_empty());
        assert_eq!(world.host_of(fillet), None);
        assert_eq!(world.position(fillet).unwrap(), fillet_position);
        assert_eq!(world.registry.placeables(), &[table]);
        assert_eq!(world.registry.draggable(), &[fillet]);

        assert!(matches!(
            world.destroy(plate),
            Err(KitchenError::UnknownObject(_))
        ));
    }
}
