//! # Scene Graph
//!
//! Minimal scene graph standing in for the host renderer's node tree. It
//! supplies positions, rotations, parent/child transform composition and the
//! node bounds the picking system intersects against.
//!
//! ## Key Components
//!
//! - [`Scene`] - slot-map backed container of nodes with stable [`NodeId`]s
//! - [`SceneNode`] - name, local transform, optional local bounds, hierarchy links
//!
//! Loaded models become a root node with one bounded child per mesh part,
//! so a ray hit on a part has to be walked up to its root before it means
//! anything to the kitchen core.

pub mod node;
pub mod scene;

pub use node::SceneNode;
pub use scene::Scene;

slotmap::new_key_type! {
    /// Stable identity of a scene node. Also the identity of kitchen objects.
    pub struct NodeId;
}
