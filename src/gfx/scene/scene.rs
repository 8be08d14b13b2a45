use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};
use slotmap::SlotMap;

use crate::gfx::loader::LoadedModel;

use super::{node::SceneNode, NodeId};

/// Scene graph holding every node, keyed by stable [`NodeId`]s.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node at the top level of the scene
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = self.nodes.insert(node);
        self.roots.push(id);
        id
    }

    /// Adds a node under `parent`. Returns `None` if the parent does not exist.
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        node.parent = Some(parent);
        node.children.clear();
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Instantiates a loaded model as a root node with one child per part.
    pub fn spawn_model(&mut self, model: &LoadedModel, position: Vector3<f32>) -> NodeId {
        let root = self.add_node(SceneNode::new(model.name.clone()).with_position(position));
        for part in &model.parts {
            let child = SceneNode::new(part.name.clone())
                .with_position(part.offset)
                .with_bounds(part.bounds);
            // root was inserted just above
            let _ = self.add_child(root, child);
        }
        root
    }

    /// Removes a node and everything below it. Returns the number of nodes removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        let subtree = self.subtree(id);
        if subtree.is_empty() {
            return 0;
        }

        match self.nodes[id].parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        for node in &subtree {
            self.nodes.remove(*node);
        }
        subtree.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|node| node.name.as_str())
    }

    pub fn position(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.nodes.get(id).map(|node| node.position)
    }

    /// Sets a node's local position. Returns `false` if the node does not exist.
    pub fn set_position(&mut self, id: NodeId, position: Vector3<f32>) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn rotation(&self, id: NodeId) -> Option<Quaternion<f32>> {
        self.nodes.get(id).map(|node| node.rotation)
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quaternion<f32>) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// The node itself followed by each ancestor up to its root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.nodes.contains_key(id).then_some(id);
        std::iter::successors(start, move |&current| self.parent(current))
    }

    /// World transform composed from every ancestor's local transform
    pub fn world_transform(&self, id: NodeId) -> Matrix4<f32> {
        let mut transform = Matrix4::identity();
        for node in self.ancestors(id) {
            transform = self.nodes[node].local_transform() * transform;
        }
        transform
    }

    /// The node and all its descendants in pre-order. Empty if the node does not exist.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(id) {
            return out;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = &self.nodes[current].children;
            stack.extend(children.iter().rev().copied());
        }
        out
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3, Transform};

    #[test]
    fn test_subtree_removal() {
        let mut scene = Scene::new();
        let root = scene.add_node(SceneNode::new("table"));
        let leg = scene.add_child(root, SceneNode::new("leg")).unwrap();
        let foot = scene.add_child(leg, SceneNode::new("foot")).unwrap();
        let other = scene.add_node(SceneNode::new("plate"));

        assert_eq!(scene.subtree(root), vec![root, leg, foot]);
        assert_eq!(scene.remove_subtree(root), 3);
        assert!(!scene.contains(foot));
        assert_eq!(scene.roots(), &[other]);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_ancestors_and_world_transform() {
        let mut scene = Scene::new();
        let root = scene.add_node(SceneNode::new("board").with_position(Vector3::new(1.0, 2.0, 3.0)));
        let child = scene
            .add_child(root, SceneNode::new("handle").with_position(Vector3::new(1.0, 0.0, 0.0)))
            .unwrap();

        assert_eq!(scene.ancestors(child).collect::<Vec<_>>(), vec![child, root]);

        scene.set_rotation(root, Quaternion::from_angle_y(Deg(90.0)));
        let world = scene
            .world_transform(child)
            .transform_point(cgmath::Point3::new(0.0, 0.0, 0.0));
        assert!((world.x - 1.0).abs() < 1e-5);
        assert!((world.y - 2.0).abs() < 1e-5);
        assert!((world.z - 2.0).abs() < 1e-5);
    }
}
