//! Mise
//!
//! Interaction, placement and crafting core for a first-person kitchen
//! simulation: raycast selection, a placed-on attachment graph and a
//! recipe engine, driven one tick per frame.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod interaction;
pub mod prelude;
pub mod recipe;
pub mod world;

// Re-export main types for convenience
pub use app::KitchenApp;
pub use config::KitchenConfig;
pub use error::{KitchenError, LoadError};
