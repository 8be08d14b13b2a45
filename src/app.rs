//! # Kitchen Session
//!
//! [`KitchenApp`] owns one running kitchen: the world, the interaction and
//! drag controllers, the recipe engine and the sound collaborator. A host
//! drives it with exactly two kinds of calls:
//!
//! - [`KitchenApp::tick`] once per frame with the current camera pose
//! - the event handlers ([`KitchenApp::handle_key_event`],
//!   [`KitchenApp::handle_device_event`], [`KitchenApp::handle_action`])
//!
//! Crafting never blocks a frame. An interact on a crafting surface starts a
//! pending craft whose output loads are polled on every following tick and
//! committed as soon as they resolve.

use std::rc::Rc;

use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton};

use crate::audio::SoundPlayer;
use crate::config::KitchenConfig;
use crate::error::KitchenError;
use crate::gfx::camera::CameraPose;
use crate::gfx::loader::ModelLoader;
use crate::gfx::scene::NodeId;
use crate::input::{InputAction, InputMapper, MovementAxes};
use crate::interaction::{DragController, InteractionController, PlacementCandidate, ReleaseOutcome};
use crate::recipe::{CraftOutcome, PendingCraft, RecipeBook, RecipeEngine};
use crate::world::{InteractAction, ObjectSpec, World};

pub struct KitchenApp {
    world: World,
    controller: InteractionController,
    drag: DragController,
    recipes: RecipeEngine,
    pending: Vec<PendingCraft>,
    loader: Rc<dyn ModelLoader>,
    sounds: Box<dyn SoundPlayer>,
    config: KitchenConfig,
    input: InputMapper,
    look_engaged: bool,
    movement: MovementAxes,
}

impl KitchenApp {
    pub fn new(
        config: KitchenConfig,
        book: RecipeBook,
        loader: Rc<dyn ModelLoader>,
        sounds: Box<dyn SoundPlayer>,
    ) -> Self {
        log::info!("Kitchen session started with {} recipes", book.len());
        Self {
            world: World::new(),
            controller: InteractionController::new(config.interaction),
            drag: DragController::new(),
            recipes: RecipeEngine::new(book, Rc::clone(&loader), &config.sounds),
            pending: Vec::new(),
            loader,
            sounds,
            config,
            input: InputMapper::new(),
            look_engaged: false,
            movement: MovementAxes::default(),
        }
    }

    /// Loads the object's model and adds it to the world.
    pub async fn spawn_object(&mut self, spec: ObjectSpec) -> Result<NodeId, KitchenError> {
        let model = self.loader.load(&spec.model).await.map_err(|err| {
            log::error!("Failed to load {}: {}", spec.type_id, err);
            err
        })?;
        self.world.spawn(&spec, &model)
    }

    /// Runs the recipe engine on `surface` and waits for its outputs.
    pub async fn evaluate(&mut self, surface: NodeId) -> Result<CraftOutcome, KitchenError> {
        self.recipes
            .evaluate(&mut self.world, self.sounds.as_mut(), surface)
            .await
    }

    /// Advances the session by one frame.
    ///
    /// Commits every pending craft whose loads resolved and returns their
    /// outcomes, then runs the interaction controller against `camera`. If a
    /// craft failed, the other crafts are still committed and the first
    /// error is returned after the controller ran.
    pub fn tick(&mut self, camera: &CameraPose) -> Result<Vec<CraftOutcome>, KitchenError> {
        let mut ready = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut craft in self.pending.drain(..) {
            match craft.poll_loads() {
                Some(loaded) => ready.push((craft, loaded)),
                None => still_pending.push(craft),
            }
        }
        self.pending = still_pending;

        let mut outcomes = Vec::with_capacity(ready.len());
        let mut first_error = None;
        for (craft, loaded) in ready {
            match self
                .recipes
                .finish(&mut self.world, self.sounds.as_mut(), craft, loaded)
            {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        self.drag.abandon_if_missing(&self.world);
        self.controller
            .update(&mut self.world, camera, self.drag.dragged())?;

        match first_error {
            Some(err) => Err(err),
            None => Ok(outcomes),
        }
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> Result<(), KitchenError> {
        match self.input.map_key_event(event) {
            Some(action) => self.handle_action(action),
            None => Ok(()),
        }
    }

    pub fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
    ) -> Result<(), KitchenError> {
        match self.input.map_mouse_button(button, state) {
            Some(action) => self.handle_action(action),
            None => Ok(()),
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) -> Result<(), KitchenError> {
        match self.input.map_device_event(event) {
            Some(action) => self.handle_action(action),
            None => Ok(()),
        }
    }

    pub fn handle_action(&mut self, action: InputAction) -> Result<(), KitchenError> {
        match action {
            InputAction::ToggleLook => {
                self.look_engaged = !self.look_engaged;
                log::debug!("Look engaged: {}", self.look_engaged);
            }
            InputAction::ReleaseLook => {
                self.look_engaged = false;
                log::debug!("Look released");
            }
            InputAction::Move { axis, pressed } => self.movement.apply(axis, pressed),
            InputAction::DragPress => {
                // Pressing over empty space is ordinary input
                if let Some(selected) = self.controller.selected() {
                    self.drag
                        .press(&self.world, self.look_engaged, Some(selected))?;
                }
            }
            InputAction::DragRelease => {
                let candidate = self.controller.take_candidate();
                let outcome = self.drag.release(&mut self.world, candidate)?;
                if let (Some(ReleaseOutcome::Placed { .. }), Some(sound)) =
                    (outcome, &self.config.sounds.place)
                {
                    self.sounds.play_one_shot(sound, self.config.sounds.volume);
                }
            }
            InputAction::Interact => self.interact()?,
        }
        Ok(())
    }

    fn interact(&mut self) -> Result<(), KitchenError> {
        if self.drag.is_dragging() {
            return Ok(());
        }
        let Some(target) = self.controller.hovered() else {
            return Ok(());
        };
        let Some(interactable) = self.world.registry.interactable(target) else {
            return Ok(());
        };

        match interactable.action.clone() {
            InteractAction::PlaySound(sound) => {
                self.sounds.play_one_shot(&sound, self.config.sounds.volume);
            }
            InteractAction::Craft => {
                match self.recipes.begin(&self.world, self.sounds.as_mut(), target) {
                    Ok(Some(craft)) => self.pending.push(craft),
                    Ok(None) => {}
                    Err(err) => {
                        log::warn!("Craft on {} rejected: {}", self.world.describe(target), err);
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn recipes(&self) -> &RecipeBook {
        self.recipes.book()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.controller.selected()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.controller.hovered()
    }

    /// Prompt of the hovered interactable, for UI feedback
    pub fn prompt(&self) -> Option<&str> {
        let hovered = self.controller.hovered()?;
        self.world
            .registry
            .interactable(hovered)
            .map(|interactable| interactable.prompt.as_str())
    }

    pub fn candidate(&self) -> Option<PlacementCandidate> {
        self.controller.candidate()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn dragged(&self) -> Option<NodeId> {
        self.drag.dragged()
    }

    pub fn look_engaged(&self) -> bool {
        self.look_engaged
    }

    pub fn movement(&self) -> MovementAxes {
        self.movement
    }

    pub fn pending_crafts(&self) -> usize {
        self.pending.len()
    }
}
