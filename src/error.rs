//! Error types for the kitchen core.
//!
//! Everything here is an invariant violation or a collaborator failure.
//! A recipe that does not match and a ray that hits nothing are ordinary
//! outcomes and never show up as errors.

use thiserror::Error;

use crate::gfx::scene::NodeId;

/// Failure reported by a [`ModelLoader`](crate::gfx::loader::ModelLoader).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load OBJ file `{path}`: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model `{0}` contains no geometry")]
    Empty(String),

    #[error("loader failed for `{descriptor}`: {reason}")]
    Other { descriptor: String, reason: String },
}

/// Errors raised by the registry, attachment graph, drag state machine
/// and recipe engine.
#[derive(Debug, Error)]
pub enum KitchenError {
    #[error("object {object:?} is already attached to {host:?}")]
    AlreadyAttached { object: NodeId, host: NodeId },

    #[error("attaching {object:?} to {host:?} would create a cycle")]
    WouldCreateCycle { object: NodeId, host: NodeId },

    #[error("object {0:?} was registered without a type")]
    MissingType(NodeId),

    #[error("object {object:?} already has type `{existing}`, cannot re-register as `{requested}`")]
    TypeConflict {
        object: NodeId,
        existing: String,
        requested: String,
    },

    #[error("object {0:?} does not exist")]
    UnknownObject(NodeId),

    #[error("object {0:?} is not placeable")]
    NotPlaceable(NodeId),

    #[error("object {0:?} is not selectable")]
    NotSelectable(NodeId),

    #[error("drag started with nothing selected")]
    NothingSelected,

    #[error("a recipe is already in flight on surface {0:?}")]
    CraftInFlight(NodeId),

    #[error("invalid recipe `{name}`: {reason}")]
    InvalidRecipe { name: String, reason: String },

    #[error(transparent)]
    Load(#[from] LoadError),
}
