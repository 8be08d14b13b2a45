//! Static recipe data.
//!
//! A recipe matches a surface when the surface holds exactly the recipe's
//! ingredient types (no extra types) and at least the minimum count of
//! each. Recipes are tried in registration order and the first match wins.

use std::collections::{HashMap, HashSet};

use cgmath::{Vector3, Zero};

use crate::audio::SoundRef;
use crate::error::KitchenError;
use crate::gfx::loader::ModelDescriptor;
use crate::gfx::scene::NodeId;
use crate::world::{InteractAction, Interactable, ObjectSpec, World};

/// One ingredient requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub type_id: String,
    /// How many must be on the surface for the recipe to match
    pub minimum_count: usize,
    /// How many are consumed when the recipe is applied
    pub use_count: usize,
}

/// Builds one output object of a recipe.
#[derive(Debug, Clone)]
pub struct OutputProducer {
    pub type_id: String,
    pub model: ModelDescriptor,
    /// Selectable place offset of the produced object
    pub place_offset: Vector3<f32>,
    /// Placeable offset, if the produced object can host others
    pub placeable: Option<Vector3<f32>>,
    pub interactable: Option<Interactable>,
}

impl OutputProducer {
    pub fn new(type_id: impl Into<String>, model: ModelDescriptor) -> Self {
        Self {
            type_id: type_id.into(),
            model,
            place_offset: Vector3::zero(),
            placeable: None,
            interactable: None,
        }
    }

    pub fn with_place_offset(mut self, offset: Vector3<f32>) -> Self {
        self.place_offset = offset;
        self
    }

    pub fn placeable(mut self, offset: Vector3<f32>) -> Self {
        self.placeable = Some(offset);
        self
    }

    pub fn interactable(mut self, prompt: impl Into<String>, action: InteractAction) -> Self {
        self.interactable = Some(Interactable::new(prompt, action));
        self
    }

    /// Spawn description for this output at `position`
    pub fn spec_at(&self, position: Vector3<f32>) -> ObjectSpec {
        let mut spec = ObjectSpec::new(self.type_id.clone(), self.model.clone())
            .at(position)
            .selectable(self.place_offset);
        spec.placeable = self.placeable;
        spec.interactable = self.interactable.clone();
        spec
    }
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub outputs: Vec<OutputProducer>,
    pub success_sound: SoundRef,
}

impl Recipe {
    pub fn new(name: impl Into<String>, success_sound: SoundRef) -> Self {
        Self {
            name: name.into(),
            ingredients: Vec::new(),
            outputs: Vec::new(),
            success_sound,
        }
    }

    /// Adds a requirement of at least `minimum_count` objects of `type_id`,
    /// `use_count` of which are consumed.
    pub fn ingredient(mut self, type_id: impl Into<String>, minimum_count: usize, use_count: usize) -> Self {
        self.ingredients.push(Ingredient {
            type_id: type_id.into(),
            minimum_count,
            use_count,
        });
        self
    }

    pub fn output(mut self, producer: OutputProducer) -> Self {
        self.outputs.push(producer);
        self
    }

    /// Exact-set match against a type -> count multiset.
    pub fn matches(&self, counts: &HashMap<&str, usize>) -> bool {
        let required: HashSet<&str> = self.ingredients.iter().map(|i| i.type_id.as_str()).collect();
        if required.len() != counts.len() {
            return false;
        }

        self.ingredients.iter().all(|ingredient| {
            counts
                .get(ingredient.type_id.as_str())
                .is_some_and(|&count| count >= ingredient.minimum_count)
        })
    }

    fn validate(&self) -> Result<(), KitchenError> {
        let invalid = |reason: &str| KitchenError::InvalidRecipe {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.ingredients.is_empty() {
            return Err(invalid("no ingredients"));
        }
        if self.outputs.is_empty() {
            return Err(invalid("no outputs"));
        }

        let mut seen = HashSet::new();
        for ingredient in &self.ingredients {
            if !seen.insert(ingredient.type_id.as_str()) {
                return Err(invalid(&format!("ingredient `{}` listed twice", ingredient.type_id)));
            }
            if ingredient.minimum_count == 0 {
                return Err(invalid(&format!("ingredient `{}` has a zero minimum", ingredient.type_id)));
            }
            if ingredient.use_count > ingredient.minimum_count {
                return Err(invalid(&format!(
                    "ingredient `{}` uses more than its minimum",
                    ingredient.type_id
                )));
            }
        }
        Ok(())
    }
}

/// Ordered recipe table, loaded once at setup.
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, recipe: Recipe) -> Result<(), KitchenError> {
        recipe.validate()?;
        log::debug!("Registered recipe {}", recipe.name);
        self.recipes.push(recipe);
        Ok(())
    }

    /// First recipe, in registration order, matching `counts`
    pub fn find_match(&self, counts: &HashMap<&str, usize>) -> Option<usize> {
        self.recipes.iter().position(|recipe| recipe.matches(counts))
    }

    pub fn get(&self, index: usize) -> Option<&Recipe> {
        self.recipes.get(index)
    }

    /// Every recipe in registration order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Multiset of the types attached to `surface`
pub fn ingredient_counts(world: &World, surface: NodeId) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    if let Some(placeable) = world.registry.placeable(surface) {
        for child in placeable.children() {
            if let Some(type_id) = world.registry.type_id(child) {
                *counts.entry(type_id).or_insert(0) += 1;
            }
        }
    }
    counts
}
