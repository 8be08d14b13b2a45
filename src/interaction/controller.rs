//! Per-tick raycast resolution.
//!
//! Outside a drag the controller works out which object would be grabbed
//! (the *selected* object) and which object would respond to the interact
//! trigger (the *hovered* interactable). During a drag it moves the dragged
//! object in front of the camera and looks for a *placement candidate*
//! under the cursor.

use std::collections::HashSet;

use cgmath::Vector3;

use crate::config::InteractionConfig;
use crate::error::KitchenError;
use crate::gfx::camera::CameraPose;
use crate::gfx::picking::{BoundsRaycaster, Ray, RaycastHit, Raycaster};
use crate::gfx::scene::{NodeId, Scene};
use crate::world::World;

/// Host under the drag cursor that would receive the dragged object on release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementCandidate {
    pub host: NodeId,
    /// World space point where the ray met the host
    pub point: Vector3<f32>,
}

pub struct InteractionController {
    config: InteractionConfig,
    raycaster: Box<dyn Raycaster>,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    candidate: Option<PlacementCandidate>,
}

impl InteractionController {
    /// Controller using the built-in bounds raycaster
    pub fn new(config: InteractionConfig) -> Self {
        Self::with_raycaster(config, Box::new(BoundsRaycaster::new()))
    }

    pub fn with_raycaster(config: InteractionConfig, raycaster: Box<dyn Raycaster>) -> Self {
        Self {
            config,
            raycaster,
            selected: None,
            hovered: None,
            candidate: None,
        }
    }

    /// Runs one tick.
    ///
    /// With `dragging == None` this refreshes the selected and hovered
    /// objects. Otherwise it repositions the dragged object (and everything
    /// attached to it) and refreshes the placement candidate. No attachment
    /// changes happen here.
    pub fn update(
        &mut self,
        world: &mut World,
        camera: &CameraPose,
        dragging: Option<NodeId>,
    ) -> Result<(), KitchenError> {
        match dragging {
            None => {
                self.resolve_targets(world, camera);
                Ok(())
            }
            Some(object) => self.preview_placement(world, camera, object),
        }
    }

    fn resolve_targets(&mut self, world: &World, camera: &CameraPose) {
        let ray = Ray::new(camera.position, camera.forward);
        let max = self.config.max_selection_distance;

        let selected = self.first_within(world, &ray, world.registry.draggable(), max);
        let hovered = self.first_within(world, &ray, world.registry.interactables(), max);

        if selected != self.selected {
            match selected {
                Some(object) => log::debug!("Selected {}", world.describe(object)),
                None => log::debug!("Selection cleared"),
            }
        }

        self.selected = selected;
        self.hovered = hovered;
        self.candidate = None;
    }

    fn first_within(
        &self,
        world: &World,
        ray: &Ray,
        members: &[NodeId],
        max_distance: f32,
    ) -> Option<NodeId> {
        self.raycaster
            .cast(&world.scene, ray, members)
            .iter()
            .filter(|hit| hit.distance <= max_distance)
            .find_map(|hit| resolve_registered(&world.scene, hit.node, members))
    }

    fn preview_placement(
        &mut self,
        world: &mut World,
        camera: &CameraPose,
        object: NodeId,
    ) -> Result<(), KitchenError> {
        let previous = self.candidate.take();
        self.hovered = None;

        let object_offset = world
            .registry
            .selectable(object)
            .ok_or(KitchenError::NotSelectable(object))?
            .place_offset;

        let ray = Ray::new(camera.position, camera.forward);
        let hits = self
            .raycaster
            .cast(&world.scene, &ray, world.registry.placeables());
        let excluded = world.descendant_set(object);
        let candidate = self.first_eligible_host(world, &hits, object, &excluded);

        let position = match candidate {
            Some(candidate) => {
                let host_position = world.position(candidate.host)?;
                let host_offset = world
                    .registry
                    .placeable(candidate.host)
                    .ok_or(KitchenError::NotPlaceable(candidate.host))?
                    .place_offset;
                Vector3::new(candidate.point.x, host_position.y, candidate.point.z)
                    + host_offset
                    + object_offset
            }
            None => camera.point_ahead(self.config.reach_distance) + object_offset,
        };

        if !world.scene.set_position(object, position) {
            return Err(KitchenError::UnknownObject(object));
        }
        world.propagate(object);

        if candidate.map(|c| c.host) != previous.map(|c| c.host) {
            match candidate {
                Some(c) => log::debug!("Placement candidate {}", world.describe(c.host)),
                None => log::debug!("Placement candidate cleared"),
            }
        }

        self.candidate = candidate;
        Ok(())
    }

    /// First hit, nearest first, that is in range and is neither the dragged
    /// object nor anything attached to it.
    fn first_eligible_host(
        &self,
        world: &World,
        hits: &[RaycastHit],
        object: NodeId,
        excluded: &HashSet<NodeId>,
    ) -> Option<PlacementCandidate> {
        let placeables = world.registry.placeables();
        hits.iter()
            .filter(|hit| hit.distance <= self.config.max_placement_distance)
            .find_map(|hit| {
                let host = resolve_registered(&world.scene, hit.node, placeables)?;
                if host == object || excluded.contains(&host) {
                    return None;
                }
                Some(PlacementCandidate {
                    host,
                    point: hit.point,
                })
            })
    }

    /// Object a grab would pick up this tick
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Interactable the interact trigger would reach this tick
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn candidate(&self) -> Option<PlacementCandidate> {
        self.candidate
    }

    /// Clears and returns the placement candidate
    pub fn take_candidate(&mut self) -> Option<PlacementCandidate> {
        self.candidate.take()
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }
}

/// Walks from `node` up its scene ancestors to the nearest member of `members`.
pub fn resolve_registered(scene: &Scene, node: NodeId, members: &[NodeId]) -> Option<NodeId> {
    scene.ancestors(node).find(|ancestor| members.contains(ancestor))
}
