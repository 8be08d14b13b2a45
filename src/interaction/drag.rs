//! Drag/place state machine.
//!
//! `Idle -> Dragging -> Idle`. Selection is implicit: it is whatever the
//! interaction controller resolved on the last idle tick. A press snapshots
//! the selected object's pose; a release either commits the placement
//! candidate (the only durable graph change) or restores the snapshot.

use cgmath::{Quaternion, Vector3};

use crate::error::KitchenError;
use crate::gfx::scene::NodeId;
use crate::world::World;

use super::controller::PlacementCandidate;

/// Pose of the dragged object when the drag began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSnapshot {
    pub object: NodeId,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSnapshot),
}

/// What a release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The object now sits on `host`
    Placed { object: NodeId, host: NodeId },
    /// No candidate: the object went back to its pre-drag pose
    Restored { object: NodeId },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Object being dragged, if any
    pub fn dragged(&self) -> Option<NodeId> {
        match self.state {
            DragState::Dragging(snapshot) => Some(snapshot.object),
            DragState::Idle => None,
        }
    }

    /// Handles the drag press.
    ///
    /// Ignored (returns `Ok(false)`) unless look control is engaged and no
    /// drag is running. Starting a drag with nothing selected is an error.
    pub fn press(
        &mut self,
        world: &World,
        engaged: bool,
        selected: Option<NodeId>,
    ) -> Result<bool, KitchenError> {
        if !engaged || self.is_dragging() {
            return Ok(false);
        }

        let object = selected.ok_or(KitchenError::NothingSelected)?;
        if world.registry.selectable(object).is_none() {
            return Err(KitchenError::NotSelectable(object));
        }
        let node = world
            .scene
            .get(object)
            .ok_or(KitchenError::UnknownObject(object))?;

        self.state = DragState::Dragging(DragSnapshot {
            object,
            position: node.position,
            rotation: node.rotation,
        });
        log::debug!("Drag started on {}", world.describe(object));
        Ok(true)
    }

    /// Handles the drag release. Returns `Ok(None)` if no drag was running.
    ///
    /// The caller passes the candidate it took from the interaction
    /// controller, which leaves the controller without a candidate whatever
    /// happens here.
    pub fn release(
        &mut self,
        world: &mut World,
        candidate: Option<PlacementCandidate>,
    ) -> Result<Option<ReleaseOutcome>, KitchenError> {
        let DragState::Dragging(snapshot) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        let object = snapshot.object;

        let Some(candidate) = candidate else {
            restore(world, &snapshot);
            log::debug!("Drag of {} rolled back", world.describe(object));
            return Ok(Some(ReleaseOutcome::Restored { object }));
        };

        // Validate before detaching so a rejected host leaves the old one intact
        if let Err(err) = world.check_placement(candidate.host, object) {
            restore(world, &snapshot);
            log::warn!(
                "Placement of {} on {:?} rejected: {}",
                world.describe(object),
                candidate.host,
                err
            );
            return Err(err);
        }

        let previous = world.host_of(object);
        world.detach(object);
        if let Err(err) = world.attach(candidate.host, object) {
            restore(world, &snapshot);
            if let Some(previous) = previous {
                if let Err(reattach) = world.attach(previous, object) {
                    log::error!("Could not return {} to its host: {}", world.describe(object), reattach);
                }
            }
            return Err(err);
        }

        log::info!(
            "Placed {} on {}",
            world.describe(object),
            world.describe(candidate.host)
        );
        Ok(Some(ReleaseOutcome::Placed {
            object,
            host: candidate.host,
        }))
    }

    /// Drops a drag whose object no longer exists. Returns `true` if it did.
    pub fn abandon_if_missing(&mut self, world: &World) -> bool {
        match self.state {
            DragState::Dragging(snapshot) if !world.scene.contains(snapshot.object) => {
                self.state = DragState::Idle;
                log::warn!("Dragged object {:?} disappeared, drag abandoned", snapshot.object);
                true
            }
            _ => false,
        }
    }
}

fn restore(world: &mut World, snapshot: &DragSnapshot) {
    world.scene.set_position(snapshot.object, snapshot.position);
    world.scene.set_rotation(snapshot.object, snapshot.rotation);
    world.propagate(snapshot.object);
}
