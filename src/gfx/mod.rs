//! # Scene Collaborators
//!
//! Thin stand-ins for the host engine the kitchen core talks to. None of
//! this is interaction logic; it supplies what the core reads (camera pose,
//! node transforms, ray hits, loaded models) and what it writes (positions).
//!
//! - **Camera** ([`camera`]) - camera pose consumed every tick
//! - **Scene** ([`scene`]) - node tree with stable ids and transforms
//! - **Picking** ([`picking`]) - rays, bounds and the [`Raycaster`] query
//! - **Loading** ([`loader`]) - asynchronous model loading
//!
//! [`Raycaster`]: picking::Raycaster

pub mod camera;
pub mod loader;
pub mod picking;
pub mod scene;

pub use camera::CameraPose;
pub use picking::{BoundsRaycaster, Ray, Raycaster};
pub use scene::{NodeId, Scene};
