//! # Recipes
//!
//! Static ingredient rules ([`book`]) and the engine that applies them to a
//! surface's attached objects ([`engine`]).

pub mod book;
pub mod engine;

pub use book::{ingredient_counts, Ingredient, OutputProducer, Recipe, RecipeBook};
pub use engine::{CraftOutcome, PendingCraft, RecipeEngine};
