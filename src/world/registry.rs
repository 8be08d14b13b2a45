//! Spatial registry: per-object metadata and the membership lists that feed
//! raycast targeting.
//!
//! Each kitchen object has one [`ObjectRecord`] keyed by its [`NodeId`]. The
//! record carries the object's immutable type and any subset of the three
//! capabilities. Registering a capability also appends the object to that
//! capability's membership list; entries only leave a list when the object
//! is destroyed.

use cgmath::Vector3;
use slotmap::SecondaryMap;

use crate::audio::SoundRef;
use crate::error::KitchenError;
use crate::gfx::scene::NodeId;

/// A child attached to a [`Placeable`] host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub child: NodeId,
    /// Child position minus host position, recorded at attach time
    pub relative: Vector3<f32>,
}

/// Surface that can host other objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeable {
    /// Constant offset applied to whatever is placed on this surface
    pub place_offset: Vector3<f32>,
    pub(super) attachments: Vec<Attachment>,
}

impl Placeable {
    pub fn new(place_offset: Vector3<f32>) -> Self {
        Self {
            place_offset,
            attachments: Vec::new(),
        }
    }

    /// Attached children in attach order
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.attachments.iter().map(|a| a.child)
    }
}

/// Object that can be picked up and dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct Selectable {
    /// Constant offset applied when this object is placed
    pub place_offset: Vector3<f32>,
    pub(super) placed_on: Option<NodeId>,
}

impl Selectable {
    pub fn new(place_offset: Vector3<f32>) -> Self {
        Self {
            place_offset,
            placed_on: None,
        }
    }

    /// Current host, if attached
    pub fn placed_on(&self) -> Option<NodeId> {
        self.placed_on
    }
}

/// What an interact trigger does to an [`Interactable`].
#[derive(Debug, Clone, PartialEq)]
pub enum InteractAction {
    /// Run the recipe engine against this object's attached ingredients
    Craft,
    /// Play a cue and nothing else
    PlaySound(SoundRef),
}

/// Object that responds to the interact trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    /// Shown to the player while the object is hovered
    pub prompt: String,
    pub action: InteractAction,
}

impl Interactable {
    pub fn new(prompt: impl Into<String>, action: InteractAction) -> Self {
        Self {
            prompt: prompt.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    Placeable(Placeable),
    Selectable(Selectable),
    Interactable(Interactable),
}

impl Capability {
    pub fn placeable(place_offset: Vector3<f32>) -> Self {
        Capability::Placeable(Placeable::new(place_offset))
    }

    pub fn selectable(place_offset: Vector3<f32>) -> Self {
        Capability::Selectable(Selectable::new(place_offset))
    }

    pub fn interactable(prompt: impl Into<String>, action: InteractAction) -> Self {
        Capability::Interactable(Interactable::new(prompt, action))
    }
}

/// Metadata owned by one kitchen object.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    type_id: String,
    pub(super) placeable: Option<Placeable>,
    pub(super) selectable: Option<Selectable>,
    pub interactable: Option<Interactable>,
}

impl ObjectRecord {
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn placeable(&self) -> Option<&Placeable> {
        self.placeable.as_ref()
    }

    pub fn selectable(&self) -> Option<&Selectable> {
        self.selectable.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    records: SecondaryMap<NodeId, ObjectRecord>,
    draggable: Vec<NodeId>,
    placeable: Vec<NodeId>,
    interactable: Vec<NodeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `capability` to `object`.
    ///
    /// The first registration of an object must name its type; later ones may
    /// pass `None` or repeat the same type. Registering a capability the object
    /// already has updates its offsets or prompt and keeps its attachment
    /// bookkeeping.
    pub fn register(
        &mut self,
        object: NodeId,
        capability: Capability,
        type_id: Option<&str>,
    ) -> Result<(), KitchenError> {
        let existing = self.records.get(object).map(|r| r.type_id.clone());
        match (existing, type_id) {
            (None, None) => return Err(KitchenError::MissingType(object)),
            (None, Some(type_id)) => {
                self.records.insert(
                    object,
                    ObjectRecord {
                        type_id: type_id.to_string(),
                        placeable: None,
                        selectable: None,
                        interactable: None,
                    },
                );
            }
            (Some(existing), Some(requested)) if existing != requested => {
                return Err(KitchenError::TypeConflict {
                    object,
                    existing,
                    requested: requested.to_string(),
                });
            }
            (Some(_), _) => {}
        }

        let record = &mut self.records[object];
        match capability {
            Capability::Placeable(placeable) => {
                match &mut record.placeable {
                    Some(existing) => existing.place_offset = placeable.place_offset,
                    None => record.placeable = Some(placeable),
                }
                push_unique(&mut self.placeable, object);
            }
            Capability::Selectable(selectable) => {
                match &mut record.selectable {
                    Some(existing) => existing.place_offset = selectable.place_offset,
                    None => record.selectable = Some(selectable),
                }
                push_unique(&mut self.draggable, object);
            }
            Capability::Interactable(interactable) => {
                record.interactable = Some(interactable);
                push_unique(&mut self.interactable, object);
            }
        }

        Ok(())
    }

    /// Drops the object's record and its membership in every list.
    pub(super) fn remove(&mut self, object: NodeId) -> Option<ObjectRecord> {
        self.draggable.retain(|&id| id != object);
        self.placeable.retain(|&id| id != object);
        self.interactable.retain(|&id| id != object);
        self.records.remove(object)
    }

    pub fn contains(&self, object: NodeId) -> bool {
        self.records.contains_key(object)
    }

    pub fn record(&self, object: NodeId) -> Option<&ObjectRecord> {
        self.records.get(object)
    }

    pub fn type_id(&self, object: NodeId) -> Option<&str> {
        self.records.get(object).map(|r| r.type_id.as_str())
    }

    pub fn placeable(&self, object: NodeId) -> Option<&Placeable> {
        self.records.get(object).and_then(|r| r.placeable.as_ref())
    }

    pub(super) fn placeable_mut(&mut self, object: NodeId) -> Option<&mut Placeable> {
        self.records.get_mut(object).and_then(|r| r.placeable.as_mut())
    }

    pub fn selectable(&self, object: NodeId) -> Option<&Selectable> {
        self.records.get(object).and_then(|r| r.selectable.as_ref())
    }

    pub(super) fn selectable_mut(&mut self, object: NodeId) -> Option<&mut Selectable> {
        self.records.get_mut(object).and_then(|r| r.selectable.as_mut())
    }

    pub fn interactable(&self, object: NodeId) -> Option<&Interactable> {
        self.records.get(object).and_then(|r| r.interactable.as_ref())
    }

    /// Objects with the Selectable capability, in registration order
    pub fn draggable(&self) -> &[NodeId] {
        &self.draggable
    }

    /// Objects with the Placeable capability, in registration order
    pub fn placeables(&self) -> &[NodeId] {
        &self.placeable
    }

    /// Objects with the Interactable capability, in registration order
    pub fn interactables(&self) -> &[NodeId] {
        &self.interactable
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn push_unique(list: &mut Vec<NodeId>, object: NodeId) {
    if !list.contains(&object) {
        list.push(object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_first_registration_requires_type() {
        let ids = ids(1);
        let mut registry = Registry::new();

        let err = registry
            .register(ids[0], Capability::selectable(Vector3::zero()), None)
            .unwrap_err();
        assert!(matches!(err, KitchenError::MissingType(_)));
        assert!(registry.draggable().is_empty());
    }

    #[test]
    fn test_capabilities_share_one_type() {
        let ids = ids(1);
        let board = ids[0];
        let mut registry = Registry::new();

        registry
            .register(board, Capability::placeable(Vector3::new(0.0, 0.01, 0.0)), Some("board"))
            .unwrap();
        registry
            .register(board, Capability::interactable("Cut", InteractAction::Craft), None)
            .unwrap();
        registry
            .register(board, Capability::selectable(Vector3::zero()), Some("board"))
            .unwrap();

        assert_eq!(registry.type_id(board), Some("board"));
        assert_eq!(registry.placeables(), &[board]);
        assert_eq!(registry.interactables(), &[board]);
        assert_eq!(registry.draggable(), &[board]);
        assert_eq!(registry.interactable(board).unwrap().prompt, "Cut");

        let err = registry
            .register(board, Capability::selectable(Vector3::zero()), Some("plate"))
            .unwrap_err();
        assert!(matches!(err, KitchenError::TypeConflict { .. }));
    }

    #[test]
    fn test_reregistration_does_not_duplicate_membership() {
        let ids = ids(1);
        let mut registry = Registry::new();

        registry
            .register(ids[0], Capability::placeable(Vector3::zero()), Some("table"))
            .unwrap();
        registry
            .register(ids[0], Capability::placeable(Vector3::new(0.0, 0.5, 0.0)), None)
            .unwrap();

        assert_eq!(registry.placeables().len(), 1);
        assert_eq!(registry.placeable(ids[0]).unwrap().place_offset.y, 0.5);
    }

    #[test]
    fn test_remove_clears_every_list() {
        let ids = ids(2);
        let mut registry = Registry::new();
        for &id in &ids {
            registry.register(id, Capability::placeable(Vector3::zero()), Some("plate")).unwrap();
            registry.register(id, Capability::selectable(Vector3::zero()), None).unwrap();
        }

        assert!(registry.remove(ids[0]).is_some());
        assert!(!registry.contains(ids[0]));
        assert_eq!(registry.placeables(), &[ids[1]]);
        assert_eq!(registry.draggable(), &[ids[1]]);
    }
}
