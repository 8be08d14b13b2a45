//! Recipe evaluation as a staged transaction.
//!
//! Applying a recipe happens in two steps so the frame loop never blocks:
//!
//! 1. [`RecipeEngine::begin`] matches the surface, marks it in flight and
//!    starts loading every output model. Nothing in the world changes.
//! 2. [`RecipeEngine::finish`] runs once all loads resolved. It re-matches
//!    the surface, consumes the ingredients, spawns and attaches the outputs
//!    and plays the success cue, all in one synchronous step.
//!
//! A failed load consumes nothing. A surface whose contents changed while
//! its loads were pending no longer matches and the craft is abandoned.

use std::collections::HashSet;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, FutureExt};

use crate::audio::{SoundPlayer, SoundRef};
use crate::config::SoundConfig;
use crate::error::{KitchenError, LoadError};
use crate::gfx::loader::{LoadedModel, ModelLoader};
use crate::gfx::scene::NodeId;
use crate::world::World;

use super::book::{ingredient_counts, RecipeBook};

/// Result of applying a recipe to a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftOutcome {
    /// Nothing matched; the failure cue was played
    NoMatch,
    /// The recipe was applied
    Crafted {
        recipe: String,
        consumed: Vec<NodeId>,
        produced: Vec<NodeId>,
    },
    /// The surface stopped matching while outputs were loading
    Abandoned { recipe: String },
}

/// A matched recipe whose output models are still loading.
pub struct PendingCraft {
    surface: NodeId,
    recipe: usize,
    loads: BoxFuture<'static, Result<Vec<LoadedModel>, LoadError>>,
}

impl PendingCraft {
    pub fn surface(&self) -> NodeId {
        self.surface
    }

    /// Polls the output loads once without blocking.
    ///
    /// Returns `None` while loading. Once this returns `Some` the craft must
    /// be handed to [`RecipeEngine::finish`] and not polled again.
    pub fn poll_loads(&mut self) -> Option<Result<Vec<LoadedModel>, LoadError>> {
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        match self.loads.poll_unpin(&mut cx) {
            Poll::Ready(result) => Some(result),
            Poll::Pending => None,
        }
    }
}

pub struct RecipeEngine {
    book: RecipeBook,
    loader: Rc<dyn ModelLoader>,
    in_flight: HashSet<NodeId>,
    failure_sound: SoundRef,
    volume: f32,
}

impl RecipeEngine {
    pub fn new(book: RecipeBook, loader: Rc<dyn ModelLoader>, sounds: &SoundConfig) -> Self {
        Self {
            book,
            loader,
            in_flight: HashSet::new(),
            failure_sound: sounds.failure.clone(),
            volume: sounds.volume,
        }
    }

    pub fn book(&self) -> &RecipeBook {
        &self.book
    }

    pub fn is_in_flight(&self, surface: NodeId) -> bool {
        self.in_flight.contains(&surface)
    }

    /// Matches `surface` against the recipe book.
    ///
    /// Returns `Ok(None)` and plays the failure cue when nothing matches.
    /// On a match the surface is marked in flight until [`finish`] is called
    /// for the returned craft; a second trigger on it fails with
    /// [`KitchenError::CraftInFlight`].
    ///
    /// [`finish`]: RecipeEngine::finish
    pub fn begin(
        &mut self,
        world: &World,
        sounds: &mut dyn SoundPlayer,
        surface: NodeId,
    ) -> Result<Option<PendingCraft>, KitchenError> {
        if self.in_flight.contains(&surface) {
            return Err(KitchenError::CraftInFlight(surface));
        }
        if world.registry.placeable(surface).is_none() {
            return Err(KitchenError::NotPlaceable(surface));
        }

        let counts = ingredient_counts(world, surface);
        let Some(index) = self.book.find_match(&counts) else {
            log::debug!("No recipe matches {} holding {:?}", world.describe(surface), counts);
            sounds.play_one_shot(&self.failure_sound, self.volume);
            return Ok(None);
        };

        let recipe = &self.book.recipes()[index];
        let loads: Vec<_> = recipe
            .outputs
            .iter()
            .map(|output| self.loader.load(&output.model))
            .collect();

        log::debug!("Recipe {} matched on {}, loading outputs", recipe.name, world.describe(surface));
        self.in_flight.insert(surface);
        Ok(Some(PendingCraft {
            surface,
            recipe: index,
            loads: future::try_join_all(loads).boxed(),
        }))
    }

    /// Commits a craft whose loads have resolved.
    pub fn finish(
        &mut self,
        world: &mut World,
        sounds: &mut dyn SoundPlayer,
        craft: PendingCraft,
        loaded: Result<Vec<LoadedModel>, LoadError>,
    ) -> Result<CraftOutcome, KitchenError> {
        let surface = craft.surface;
        self.in_flight.remove(&surface);

        let recipe = &self.book.recipes()[craft.recipe];
        let models = match loaded {
            Ok(models) => models,
            Err(err) => {
                log::error!("Recipe {} aborted, output failed to load: {}", recipe.name, err);
                return Err(err.into());
            }
        };

        if !world.scene.contains(surface) || !recipe.matches(&ingredient_counts(world, surface)) {
            log::warn!("Recipe {} abandoned, surface contents changed", recipe.name);
            sounds.play_one_shot(&self.failure_sound, self.volume);
            return Ok(CraftOutcome::Abandoned {
                recipe: recipe.name.clone(),
            });
        }

        // Everything that can fail is checked before the first ingredient goes
        if models.len() != recipe.outputs.len() {
            log::error!("Recipe {} aborted, loader returned the wrong number of models", recipe.name);
            return Err(LoadError::Other {
                descriptor: recipe.name.clone(),
                reason: format!("expected {} output models, got {}", recipe.outputs.len(), models.len()),
            }
            .into());
        }
        let surface_position = world.position(surface)?;
        let surface_offset = world
            .registry
            .placeable(surface)
            .ok_or(KitchenError::NotPlaceable(surface))?
            .place_offset;

        let attached = world.attached_to(surface);
        let mut consumed = Vec::new();
        for ingredient in &recipe.ingredients {
            let picked = attached
                .iter()
                .copied()
                .filter(|&child| world.type_id(child) == Some(ingredient.type_id.as_str()))
                .take(ingredient.use_count);
            consumed.extend(picked);
        }
        if let Some(&missing) = consumed.iter().find(|&&object| !world.scene.contains(object)) {
            return Err(KitchenError::UnknownObject(missing));
        }

        for &object in &consumed {
            world.destroy(object)?;
        }

        let mut produced = Vec::with_capacity(models.len());
        for (output, model) in recipe.outputs.iter().zip(&models) {
            let position = surface_position + output.place_offset + surface_offset;
            let object = world.spawn(&output.spec_at(position), model)?;
            world.attach(surface, object)?;
            produced.push(object);
        }

        sounds.play_one_shot(&recipe.success_sound, self.volume);
        log::info!(
            "Crafted {} on {}: consumed {}, produced {}",
            recipe.name,
            world.describe(surface),
            consumed.len(),
            produced.len()
        );

        Ok(CraftOutcome::Crafted {
            recipe: recipe.name.clone(),
            consumed,
            produced,
        })
    }

    /// Matches, loads and commits in one go.
    pub async fn evaluate(
        &mut self,
        world: &mut World,
        sounds: &mut dyn SoundPlayer,
        surface: NodeId,
    ) -> Result<CraftOutcome, KitchenError> {
        let Some(mut craft) = self.begin(world, sounds, surface)? else {
            return Ok(CraftOutcome::NoMatch);
        };
        let loaded = (&mut craft.loads).await;
        self.finish(world, sounds, craft, loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingSoundPlayer;
    use crate::gfx::loader::{ModelDescriptor, PrimitiveLoader};
    use crate::recipe::book::{OutputProducer, Recipe};
    use crate::world::{InteractAction, ObjectSpec};
    use cgmath::{Vector3, Zero};

    struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(&self, descriptor: &ModelDescriptor) -> BoxFuture<'static, Result<LoadedModel, LoadError>> {
            future::ready(Err(LoadError::Other {
                descriptor: descriptor.name.clone(),
                reason: "disk on fire".to_string(),
            }))
            .boxed()
        }
    }

    fn cube(name: &str) -> ModelDescriptor {
        ModelDescriptor::cuboid(name, Vector3::new(0.05, 0.02, 0.05))
    }

    fn spawn(world: &mut World, spec: ObjectSpec) -> NodeId {
        let model = pollster::block_on(PrimitiveLoader.load(&spec.model)).unwrap();
        world.spawn(&spec, &model).unwrap()
    }

    fn book() -> RecipeBook {
        let mut book = RecipeBook::new();
        book.register(
            Recipe::new("sliced chicken", SoundRef::new("sounds/chop.mp3"))
                .ingredient("knife", 1, 0)
                .ingredient("chicken_fillet", 1, 1)
                .output(
                    OutputProducer::new("chicken_slices", cube("slices"))
                        .with_place_offset(Vector3::new(0.0, 0.02, 0.0)),
                ),
        )
        .unwrap();
        book
    }

    fn engine(loader: Rc<dyn ModelLoader>) -> RecipeEngine {
        RecipeEngine::new(book(), loader, &SoundConfig::default())
    }

    /// Board at y 0.9 with a knife and `fillets` chicken fillets on it.
    fn board_with(world: &mut World, fillets: usize) -> NodeId {
        let board = spawn(
            world,
            ObjectSpec::new("cutting_board", cube("board"))
                .at(Vector3::new(0.0, 0.9, 0.0))
                .placeable(Vector3::new(0.0, 0.01, 0.0))
                .interactable("Cut", InteractAction::Craft),
        );
        let knife = spawn(
            world,
            ObjectSpec::new("knife", cube("knife")).selectable(Vector3::new(0.0, 0.085, 0.0)),
        );
        world.attach(board, knife).unwrap();
        for _ in 0..fillets {
            let fillet = spawn(
                world,
                ObjectSpec::new("chicken_fillet", cube("fillet")).selectable(Vector3::new(0.0, 0.02, 0.0)),
            );
            world.attach(board, fillet).unwrap();
        }
        board
    }

    fn types_on(world: &World, surface: NodeId) -> Vec<String> {
        world
            .attached_to(surface)
            .iter()
            .filter_map(|&c| world.type_id(c).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_match_consumes_and_produces() {
        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let mut recipes = engine(Rc::new(PrimitiveLoader));
        let recorder = RecordingSoundPlayer::new();
        let mut sounds = recorder.clone();

        let outcome = pollster::block_on(recipes.evaluate(&mut world, &mut sounds, board)).unwrap();

        let CraftOutcome::Crafted { consumed, produced, recipe } = outcome else {
            panic!("expected a craft");
        };
        assert_eq!(recipe, "sliced chicken");
        assert_eq!(consumed.len(), 1);
        assert!(!world.scene.contains(consumed[0]));
        assert_eq!(produced.len(), 1);
        assert_eq!(world.host_of(produced[0]), Some(board));
        assert_eq!(types_on(&world, board), vec!["knife", "chicken_slices"]);

        let y = world.position(produced[0]).unwrap().y;
        assert!((y - (0.9 + 0.02 + 0.01)).abs() < 1e-5);
        assert_eq!(recorder.played(), vec![SoundRef::new("sounds/chop.mp3")]);
        assert!(!recipes.is_in_flight(board));
    }

    #[test]
    fn test_use_count_leaves_remainder() {
        let mut world = World::new();
        let board = board_with(&mut world, 2);
        let mut recipes = engine(Rc::new(PrimitiveLoader));
        let mut sounds = RecordingSoundPlayer::new();

        pollster::block_on(recipes.evaluate(&mut world, &mut sounds, board)).unwrap();

        let types = types_on(&world, board);
        assert_eq!(types.iter().filter(|t| *t == "chicken_fillet").count(), 1);
        assert_eq!(types.iter().filter(|t| *t == "knife").count(), 1);
    }

    #[test]
    fn test_extra_type_blocks_match() {
        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let lettuce = spawn(
            &mut world,
            ObjectSpec::new("lettuce", cube("lettuce")).selectable(Vector3::zero()),
        );
        world.attach(board, lettuce).unwrap();

        let mut recipes = engine(Rc::new(PrimitiveLoader));
        let recorder = RecordingSoundPlayer::new();
        let mut sounds = recorder.clone();

        let outcome = pollster::block_on(recipes.evaluate(&mut world, &mut sounds, board)).unwrap();
        assert_eq!(outcome, CraftOutcome::NoMatch);
        assert_eq!(world.attached_to(board).len(), 3);
        assert_eq!(recorder.last(), Some(SoundConfig::default().failure));
    }

    #[test]
    fn test_failed_load_consumes_nothing() {
        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let mut recipes = engine(Rc::new(FailingLoader));
        let recorder = RecordingSoundPlayer::new();
        let mut sounds = recorder.clone();

        let result = pollster::block_on(recipes.evaluate(&mut world, &mut sounds, board));

        assert!(matches!(result, Err(KitchenError::Load(_))));
        assert_eq!(types_on(&world, board), vec!["knife", "chicken_fillet"]);
        assert!(!recipes.is_in_flight(board));
        assert!(recorder.played().is_empty());
    }

    #[test]
    fn test_overlapping_trigger_is_rejected() {
        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let mut recipes = engine(Rc::new(PrimitiveLoader));
        let mut sounds = RecordingSoundPlayer::new();

        let mut craft = recipes.begin(&world, &mut sounds, board).unwrap().unwrap();
        assert!(recipes.is_in_flight(board));
        assert!(matches!(
            recipes.begin(&world, &mut sounds, board),
            Err(KitchenError::CraftInFlight(_))
        ));

        let loaded = craft.poll_loads().expect("primitive loads resolve immediately");
        let outcome = recipes.finish(&mut world, &mut sounds, craft, loaded).unwrap();
        assert!(matches!(outcome, CraftOutcome::Crafted { .. }));
        assert!(!recipes.is_in_flight(board));
    }

    #[test]
    fn test_horizontal_output_offset_applied_once() {
        let mut book = RecipeBook::new();
        book.register(
            Recipe::new("sliced chicken", SoundRef::new("sounds/chop.mp3"))
                .ingredient("knife", 1, 0)
                .ingredient("chicken_fillet", 1, 1)
                .output(
                    OutputProducer::new("chicken_slices", cube("slices"))
                        .with_place_offset(Vector3::new(0.1, 0.02, 0.0)),
                ),
        )
        .unwrap();
        let mut recipes = RecipeEngine::new(book, Rc::new(PrimitiveLoader), &SoundConfig::default());

        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let mut sounds = RecordingSoundPlayer::new();

        let outcome = pollster::block_on(recipes.evaluate(&mut world, &mut sounds, board)).unwrap();
        let CraftOutcome::Crafted { produced, .. } = outcome else {
            panic!("expected a craft");
        };

        let position = world.position(produced[0]).unwrap();
        assert!((position.x - 0.1).abs() < 1e-5);
        assert!((position.y - (0.9 + 0.01 + 0.02)).abs() < 1e-5);
        assert!(position.z.abs() < 1e-5);
    }

    #[test]
    fn test_missing_output_models_consume_nothing() {
        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let mut recipes = engine(Rc::new(PrimitiveLoader));
        let mut sounds = RecordingSoundPlayer::new();

        let craft = recipes.begin(&world, &mut sounds, board).unwrap().unwrap();
        let result = recipes.finish(&mut world, &mut sounds, craft, Ok(Vec::new()));

        assert!(matches!(result, Err(KitchenError::Load(_))));
        assert_eq!(types_on(&world, board), vec!["knife", "chicken_fillet"]);
        assert!(!recipes.is_in_flight(board));
    }

    #[test]
    fn test_surface_changed_while_loading_abandons() {
        let mut world = World::new();
        let board = board_with(&mut world, 1);
        let mut recipes = engine(Rc::new(PrimitiveLoader));
        let recorder = RecordingSoundPlayer::new();
        let mut sounds = recorder.clone();

        let mut craft = recipes.begin(&world, &mut sounds, board).unwrap().unwrap();
        let fillet = world.attached_to(board)[1];
        world.detach(fillet);

        let loaded = craft.poll_loads().unwrap();
        let outcome = recipes.finish(&mut world, &mut sounds, craft, loaded).unwrap();

        assert_eq!(
            outcome,
            CraftOutcome::Abandoned {
                recipe: "sliced chicken".to_string()
            }
        );
        assert!(world.scene.contains(fillet));
        assert_eq!(types_on(&world, board), vec!["knife"]);
        assert_eq!(recorder.last(), Some(SoundConfig::default().failure));
    }
}
