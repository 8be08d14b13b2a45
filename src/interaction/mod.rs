//! # Interaction
//!
//! Raycast-driven selection and drag placement.
//!
//! - [`InteractionController`] - resolves selected / hovered objects and the
//!   placement candidate every tick
//! - [`DragController`] - the idle/dragging state machine that commits or
//!   rolls back a drag on release

pub mod controller;
pub mod drag;

pub use controller::{InteractionController, PlacementCandidate};
pub use drag::{DragController, DragSnapshot, DragState, ReleaseOutcome};
