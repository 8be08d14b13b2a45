//! # Ray Picking
//!
//! Ray-casting against scene nodes. The interaction controller asks a
//! [`Raycaster`] for every hit along the camera's forward ray, restricted to
//! the subtrees of a target list, and expects the hits nearest first.
//!
//! ## How it works
//!
//! 1. **Targets to nodes**: every target expands to its whole subtree, so hits
//!    on child meshes are reported with the child's id
//! 2. **Ray-Bounds Intersection**: each bounded node's local AABB is moved to
//!    world space and tested against the ray
//! 3. **Ordering**: hits are sorted by distance, nearest first
//!
//! A host renderer with real mesh intersection can implement [`Raycaster`]
//! and replace [`BoundsRaycaster`].

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4, Zero};

use crate::gfx::scene::{NodeId, Scene};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box centred on the origin with the given half extents
    pub fn from_half_extents(half: Vector3<f32>) -> Self {
        Self::new(-half, half)
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    /// Test ray-AABB intersection (slab method).
    /// Returns the distance to the intersection point, or None if the ray misses
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (min, max) = (self.min[axis], self.max[axis]);

            // Parallel to this slab: inside it or a miss
            if direction == 0.0 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / direction;
            let t0 = (min - origin) * inv_dir;
            let t1 = (max - origin) * inv_dir;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut transformed_corners = Vec::with_capacity(8);
        for corner in &corners {
            let homogeneous = Vector4::new(corner.x, corner.y, corner.z, 1.0);
            let transformed = matrix * homogeneous;
            transformed_corners.push([
                transformed.x / transformed.w,
                transformed.y / transformed.w,
                transformed.z / transformed.w,
            ]);
        }

        Self::from_vertices(&transformed_corners)
    }
}

/// A single ray hit
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The node whose bounds were hit, possibly a child mesh of a target
    pub node: NodeId,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Ray/scene intersection query supplied by the renderer.
pub trait Raycaster {
    /// Every hit on the subtrees of `targets`, nearest first.
    fn cast(&self, scene: &Scene, ray: &Ray, targets: &[NodeId]) -> Vec<RaycastHit>;
}

/// Raycaster testing each bounded node's world-space AABB.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundsRaycaster;

impl BoundsRaycaster {
    pub fn new() -> Self {
        Self
    }
}

impl Raycaster for BoundsRaycaster {
    fn cast(&self, scene: &Scene, ray: &Ray, targets: &[NodeId]) -> Vec<RaycastHit> {
        let mut hits = Vec::new();

        for &target in targets {
            for node_id in scene.subtree(target) {
                let Some(bounds) = scene.get(node_id).and_then(|node| node.bounds) else {
                    continue;
                };

                let world_bounds = bounds.transform(&scene.world_transform(node_id));
                if let Some(distance) = world_bounds.intersect_ray(ray) {
                    hits.push(RaycastHit {
                        node: node_id,
                        distance,
                        point: ray.point_at(distance),
                    });
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
