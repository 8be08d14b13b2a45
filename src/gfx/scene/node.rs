use cgmath::{Matrix4, One, Quaternion, Vector3, Zero};

use crate::gfx::picking::Aabb;

use super::NodeId;

/// A node in the scene graph.
///
/// Position and rotation are local to the parent node. Registered kitchen
/// objects are always scene roots, so for them local and world space agree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    /// Local-space bounds used for ray picking, `None` for pure grouping nodes
    pub bounds: Option<Aabb>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl SceneNode {
    /// Create a node at the origin with identity rotation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            bounds: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Local transform, translation applied after rotation (T * R)
    pub fn local_transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from(self.rotation)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
