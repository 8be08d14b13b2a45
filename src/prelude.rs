//! # Mise Prelude
//!
//! Commonly used types for setting up and driving a kitchen session.
//!
//! ```no_run
//! use std::rc::Rc;
//! use mise::prelude::*;
//!
//! let mut book = RecipeBook::new();
//! book.register(
//!     Recipe::new("toast", SoundRef::new("sounds/ding.mp3"))
//!         .ingredient("bread", 1, 1)
//!         .output(OutputProducer::new(
//!             "toast",
//!             ModelDescriptor::cuboid("toast", Vector3::new(0.05, 0.01, 0.05)),
//!         )),
//! )?;
//!
//! let mut app = KitchenApp::new(
//!     KitchenConfig::default(),
//!     book,
//!     Rc::new(AssetLoader::default()),
//!     Box::new(LogSoundPlayer),
//! );
//! app.tick(&CameraPose::from_yaw_pitch(Vector3::new(0.0, 1.6, 1.0), 0.0, -0.5))?;
//! # Ok::<(), KitchenError>(())
//! ```

// Re-export core application types
pub use crate::app::KitchenApp;
pub use crate::config::{InteractionConfig, KitchenConfig, SoundConfig};
pub use crate::error::{KitchenError, LoadError};

// Re-export collaborators
pub use crate::audio::{LogSoundPlayer, SoundPlayer, SoundRef};
pub use crate::gfx::camera::CameraPose;
pub use crate::gfx::loader::{AssetLoader, ModelDescriptor, ModelLoader, PrimitiveLoader};
pub use crate::gfx::scene::NodeId;
pub use crate::input::{InputAction, MoveAxis};

// Re-export world, interaction and recipe types
pub use crate::recipe::{CraftOutcome, OutputProducer, Recipe, RecipeBook};
pub use crate::world::{InteractAction, ObjectSpec, World};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
