//! Attachment graph: the "placed-on" relation between kitchen objects.
//!
//! A [`Selectable`](super::registry::Selectable) points at its host, the
//! host's [`Placeable`](super::registry::Placeable) lists the child together
//! with the child's position relative to the host. The relation is kept
//! single-parent and acyclic; [`World::propagate`] replays the recorded
//! offsets so a moved host carries its whole subtree along.

use std::collections::HashSet;

use cgmath::Vector3;

use crate::error::KitchenError;
use crate::gfx::scene::NodeId;

use super::registry::Attachment;
use super::World;

impl World {
    /// Places `object` on `host`.
    ///
    /// The object keeps its X/Z and is set to the host's height raised by
    /// the vertical parts of both place offsets. Horizontal placement is the
    /// caller's job. Fails if the object is already attached somewhere or if
    /// [`check_placement`](World::check_placement) rejects the pair.
    pub fn attach(&mut self, host: NodeId, object: NodeId) -> Result<(), KitchenError> {
        let (host_position, object_position) = self.check_placement(host, object)?;
        if let Some(current) = self.host_of(object) {
            return Err(KitchenError::AlreadyAttached {
                object,
                host: current,
            });
        }

        let height = self.placed_height(host, object, host_position);
        let placed = Vector3::new(object_position.x, height, object_position.z);
        self.scene.set_position(object, placed);

        if let Some(placeable) = self.registry.placeable_mut(host) {
            placeable.attachments.push(Attachment {
                child: object,
                relative: placed - host_position,
            });
        }
        if let Some(selectable) = self.registry.selectable_mut(object) {
            selectable.placed_on = Some(host);
        }

        self.propagate(object);

        log::debug!(
            "Attached {} to {}",
            self.describe(object),
            self.describe(host)
        );
        Ok(())
    }

    /// Checks that `object` could be placed on `host`, ignoring where it
    /// currently sits. Returns the host and object positions.
    pub fn check_placement(
        &self,
        host: NodeId,
        object: NodeId,
    ) -> Result<(Vector3<f32>, Vector3<f32>), KitchenError> {
        if self.registry.selectable(object).is_none() {
            return Err(KitchenError::NotSelectable(object));
        }
        if self.registry.placeable(host).is_none() {
            return Err(KitchenError::NotPlaceable(host));
        }
        if host == object || self.descendant_set(object).contains(&host) {
            return Err(KitchenError::WouldCreateCycle { object, host });
        }

        let host_position = self
            .scene
            .position(host)
            .ok_or(KitchenError::UnknownObject(host))?;
        let object_position = self
            .scene
            .position(object)
            .ok_or(KitchenError::UnknownObject(object))?;
        Ok((host_position, object_position))
    }

    fn placed_height(&self, host: NodeId, object: NodeId, host_position: Vector3<f32>) -> f32 {
        let host_offset = self.registry.placeable(host).map_or(0.0, |p| p.place_offset.y);
        let object_offset = self.registry.selectable(object).map_or(0.0, |s| s.place_offset.y);
        host_position.y + host_offset + object_offset
    }

    /// Removes `object` from its host. Does nothing if it is not attached.
    pub fn detach(&mut self, object: NodeId) {
        let Some(selectable) = self.registry.selectable_mut(object) else {
            return;
        };
        let Some(host) = selectable.placed_on.take() else {
            return;
        };

        if let Some(placeable) = self.registry.placeable_mut(host) {
            placeable.attachments.retain(|a| a.child != object);
        }

        log::debug!(
            "Detached {} from {}",
            self.describe(object),
            self.describe(host)
        );
    }

    /// Moves every attached descendant of `host` to its parent's position plus
    /// its recorded relative offset, depth first.
    ///
    /// Call after any direct position change of an object that hosts others.
    pub fn propagate(&mut self, host: NodeId) {
        let mut stack = vec![host];

        while let Some(current) = stack.pop() {
            let Some(position) = self.scene.position(current) else {
                continue;
            };
            let Some(placeable) = self.registry.placeable(current) else {
                continue;
            };

            for attachment in placeable.attachments.iter().rev() {
                self.scene
                    .set_position(attachment.child, position + attachment.relative);
                stack.push(attachment.child);
            }
        }
    }

    /// Every object transitively attached to `object`, not including itself.
    pub fn descendant_set(&self, object: NodeId) -> HashSet<NodeId> {
        let mut descendants = HashSet::new();
        let mut stack = vec![object];

        while let Some(current) = stack.pop() {
            let Some(placeable) = self.registry.placeable(current) else {
                continue;
            };
            for child in placeable.children() {
                if child != object && descendants.insert(child) {
                    stack.push(child);
                }
            }
        }

        descendants
    }

    /// The host `object` is placed on
    pub fn host_of(&self, object: NodeId) -> Option<NodeId> {
        self.registry.selectable(object).and_then(|s| s.placed_on())
    }

    /// Objects attached directly to `host`, in attach order
    pub fn attached_to(&self, host: NodeId) -> Vec<NodeId> {
        self.registry
            .placeable(host)
            .map(|p| p.children().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::SceneNode;
    use crate::world::registry::Capability;
    use cgmath::Zero;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn spawn(world: &mut World, name: &str, position: Vector3<f32>) -> NodeId {
        world
            .scene
            .add_node(SceneNode::new(name).with_position(position))
    }

    fn table(world: &mut World, position: Vector3<f32>) -> NodeId {
        let id = spawn(world, "table", position);
        world
            .register(id, Capability::placeable(Vector3::new(0.0, 0.0225, 0.0)), Some("table"))
            .unwrap();
        id
    }

    fn item(world: &mut World, type_id: &str, offset: f32) -> NodeId {
        let id = spawn(world, type_id, Vector3::new(0.0, 5.0, 0.0));
        world
            .register(id, Capability::selectable(Vector3::new(0.0, offset, 0.0)), Some(type_id))
            .unwrap();
        id
    }

    /// Every placed_on points at a host listing the object exactly once, and
    /// every listed child points back at its host.
    fn assert_consistent(world: &World, objects: &[NodeId]) {
        for &object in objects {
            if let Some(host) = world.host_of(object) {
                let count = world.attached_to(host).iter().filter(|&&c| c == object).count();
                assert_eq!(count, 1);
            }
            for child in world.attached_to(object) {
                assert_eq!(world.host_of(child), Some(object));
            }
            assert!(!world.descendant_set(object).contains(&object));
        }
    }

    #[test]
    fn test_knife_on_table_scenario() {
        let mut world = World::new();
        let table_a = table(&mut world, Vector3::new(0.0, 0.9, 0.0));
        let table_b = table(&mut world, Vector3::new(3.0, 0.75, 1.0));
        let knife = item(&mut world, "knife", 0.085);

        world.attach(table_a, knife).unwrap();
        let y = world.scene.position(knife).unwrap().y;
        assert!(approx(y, 0.9 + 0.0225 + 0.085));

        world.detach(knife);
        assert_eq!(world.host_of(knife), None);
        assert!(world.attached_to(table_a).is_empty());

        world.attach(table_b, knife).unwrap();
        let y = world.scene.position(knife).unwrap().y;
        assert!(approx(y, 0.75 + 0.0225 + 0.085));
        assert_eq!(world.attached_to(table_b), vec![knife]);
    }

    #[test]
    fn test_attach_keeps_horizontal_position() {
        let mut world = World::new();
        let counter = spawn(&mut world, "counter", Vector3::new(1.0, 0.9, 0.0));
        world
            .register(counter, Capability::placeable(Vector3::new(0.2, 0.01, 0.0)), Some("counter"))
            .unwrap();
        let knife = spawn(&mut world, "knife", Vector3::new(1.3, 2.0, -0.4));
        world
            .register(knife, Capability::selectable(Vector3::new(0.05, 0.085, 0.1)), Some("knife"))
            .unwrap();

        world.attach(counter, knife).unwrap();

        let position = world.scene.position(knife).unwrap();
        assert!(approx(position.x, 1.3));
        assert!(approx(position.z, -0.4));
        assert!(approx(position.y, 0.9 + 0.01 + 0.085));
    }

    #[test]
    fn test_double_attach_fails() {
        let mut world = World::new();
        let table_a = table(&mut world, Vector3::zero());
        let table_b = table(&mut world, Vector3::new(2.0, 0.0, 0.0));
        let knife = item(&mut world, "knife", 0.0);

        world.attach(table_a, knife).unwrap();
        let err = world.attach(table_b, knife).unwrap_err();
        assert!(matches!(err, KitchenError::AlreadyAttached { host, .. } if host == table_a));
        assert_eq!(world.attached_to(table_a), vec![knife]);
        assert!(world.attached_to(table_b).is_empty());
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut world = World::new();
        let plate = item(&mut world, "plate", 0.01);
        world
            .register(plate, Capability::placeable(Vector3::new(0.0, 0.01, 0.0)), None)
            .unwrap();
        let bowl = item(&mut world, "bowl", 0.02);
        world
            .register(bowl, Capability::placeable(Vector3::zero()), None)
            .unwrap();

        world.attach(plate, bowl).unwrap();

        let err = world.attach(bowl, plate).unwrap_err();
        assert!(matches!(err, KitchenError::WouldCreateCycle { .. }));
        let err = world.attach(plate, plate).unwrap_err();
        assert!(matches!(err, KitchenError::WouldCreateCycle { .. }));

        assert_eq!(world.host_of(plate), None);
        assert_consistent(&world, &[plate, bowl]);
    }

    #[test]
    fn test_attach_requires_capabilities() {
        let mut world = World::new();
        let table_id = table(&mut world, Vector3::zero());
        let knife = item(&mut world, "knife", 0.0);

        assert!(matches!(
            world.attach(knife, table_id),
            Err(KitchenError::NotSelectable(_))
        ));
        let other_knife = item(&mut world, "knife", 0.0);
        assert!(matches!(
            world.attach(other_knife, knife),
            Err(KitchenError::NotPlaceable(_))
        ));
    }

    #[test]
    fn test_propagate_moves_grandchildren() {
        let mut world = World::new();
        let table_id = table(&mut world, Vector3::zero());
        let plate = item(&mut world, "plate", 0.01);
        world
            .register(plate, Capability::placeable(Vector3::new(0.0, 0.005, 0.0)), None)
            .unwrap();
        let chicken = item(&mut world, "chicken", 0.03);

        world.attach(table_id, plate).unwrap();
        world.attach(plate, chicken).unwrap();

        let plate_relative = world.registry.placeable(table_id).unwrap().attachments()[0].relative;
        let chicken_relative = world.registry.placeable(plate).unwrap().attachments()[0].relative;

        let moved = Vector3::new(1.5, 1.2, -0.5);
        world.scene.set_position(table_id, moved);
        world.propagate(table_id);

        let plate_pos = world.scene.position(plate).unwrap();
        let chicken_pos = world.scene.position(chicken).unwrap();
        assert!(approx(plate_pos.x, moved.x + plate_relative.x));
        assert!(approx(plate_pos.y, moved.y + plate_relative.y));
        assert!(approx(chicken_pos.y, plate_pos.y + chicken_relative.y));
        assert!(approx(chicken_pos.z, plate_pos.z + chicken_relative.z));
    }

    #[test]
    fn test_descendant_set_and_consistency_after_shuffles() {
        let mut world = World::new();
        let table_id = table(&mut world, Vector3::zero());
        let mut stack = Vec::new();
        for name in ["plate", "bowl", "cup"] {
            let id = item(&mut world, name, 0.01);
            world
                .register(id, Capability::placeable(Vector3::zero()), None)
                .unwrap();
            stack.push(id);
        }

        world.attach(table_id, stack[0]).unwrap();
        world.attach(stack[0], stack[1]).unwrap();
        world.attach(stack[1], stack[2]).unwrap();

        let below_table = world.descendant_set(table_id);
        assert_eq!(below_table.len(), 3);
        assert!(world.descendant_set(stack[2]).is_empty());

        world.detach(stack[1]);
        world.attach(table_id, stack[1]).unwrap();
        world.detach(stack[1]);
        world.detach(stack[1]);

        assert_eq!(world.descendant_set(table_id).len(), 1);
        assert_eq!(world.descendant_set(stack[1]).len(), 1);

        let mut all = vec![table_id];
        all.extend(&stack);
        assert_consistent(&world, &all);
    }
}
