//! # Kitchen Demo
//!
//! Headless scripted session: a knife and a chicken fillet are carried onto
//! a cutting board, the board is used, and the result is logged. Run with
//! `RUST_LOG=debug` to see every selection and drag transition.

use std::rc::Rc;

use anyhow::{bail, Context, Result};
use mise::prelude::*;

fn cube(name: &str, x: f32, y: f32, z: f32) -> ModelDescriptor {
    ModelDescriptor::cuboid(name, Vector3::new(x, y, z))
}

fn looking_down_at(x: f32, z: f32) -> CameraPose {
    CameraPose::new(Vector3::new(x, 1.6, z), Vector3::new(0.0, -1.0, 0.0))
}

fn recipes() -> Result<RecipeBook> {
    let mut book = RecipeBook::new();
    book.register(
        Recipe::new("sliced chicken", SoundRef::new("sounds/chop.mp3"))
            .ingredient("knife", 1, 0)
            .ingredient("chicken_fillet", 1, 1)
            .output(
                OutputProducer::new("chicken_slices", cube("chicken_slices", 0.06, 0.01, 0.04))
                    .with_place_offset(Vector3::new(0.0, 0.01, 0.0)),
            ),
    )?;
    book.register(
        Recipe::new("salad", SoundRef::new("sounds/chop.mp3"))
            .ingredient("knife", 1, 0)
            .ingredient("lettuce", 1, 1)
            .ingredient("tomato", 1, 1)
            .output(OutputProducer::new("salad", cube("salad", 0.08, 0.03, 0.08))),
    )?;
    Ok(book)
}

async fn set_up(app: &mut KitchenApp) -> Result<()> {
    let counter = app
        .spawn_object(
            ObjectSpec::new("counter", cube("counter", 1.0, 0.45, 0.4))
                .at(Vector3::new(0.5, 0.45, 0.0))
                .placeable(Vector3::new(0.0, 0.45, 0.0)),
        )
        .await
        .context("spawning counter")?;

    let board = app
        .spawn_object(
            ObjectSpec::new("cutting_board", cube("cutting_board", 0.2, 0.01, 0.15))
                .at(Vector3::new(0.0, 0.9, 0.0))
                .selectable(Vector3::new(0.0, 0.01, 0.0))
                .placeable(Vector3::new(0.0, 0.01, 0.0))
                .interactable("Cut", InteractAction::Craft),
        )
        .await
        .context("spawning cutting board")?;
    app.world_mut().attach(counter, board)?;

    for (type_id, model, position) in [
        ("knife", cube("knife", 0.1, 0.01, 0.02), Vector3::new(1.0, 0.9, 0.0)),
        ("chicken_fillet", cube("chicken_fillet", 0.06, 0.01, 0.04), Vector3::new(1.0, 0.9, 0.25)),
    ] {
        let object = app
            .spawn_object(
                ObjectSpec::new(type_id, model)
                    .at(position)
                    .selectable(Vector3::new(0.0, 0.01, 0.0)),
            )
            .await
            .with_context(|| format!("spawning {}", type_id))?;
        app.world_mut().attach(counter, object)?;
    }
    Ok(())
}

/// Picks up whatever is under `from` and drops it at `to`.
fn carry(app: &mut KitchenApp, from: (f32, f32), to: (f32, f32)) -> Result<()> {
    app.tick(&looking_down_at(from.0, from.1))?;
    let Some(selected) = app.selected() else {
        bail!("nothing to pick up at {:?}", from);
    };
    app.handle_action(InputAction::DragPress)?;
    app.tick(&looking_down_at(to.0, to.1))?;
    app.handle_action(InputAction::DragRelease)?;

    let world = app.world();
    log::info!(
        "{} now rests at {:?}",
        world.describe(selected),
        world.position(selected)?
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = KitchenApp::new(
        KitchenConfig::default(),
        recipes()?,
        Rc::new(PrimitiveLoader),
        Box::new(LogSoundPlayer),
    );
    pollster::block_on(set_up(&mut app)).context("kitchen setup failed")?;

    app.handle_action(InputAction::ToggleLook)?;
    carry(&mut app, (1.0, 0.0), (0.0, 0.0))?;
    carry(&mut app, (1.0, 0.25), (0.05, 0.05))?;

    let use_board = looking_down_at(-0.15, 0.0);
    app.tick(&use_board)?;
    if let Some(prompt) = app.prompt() {
        log::info!("Prompt: [E] {}", prompt);
    }
    app.handle_action(InputAction::Interact)?;

    let mut frames = 0;
    while app.pending_crafts() > 0 {
        for outcome in app.tick(&use_board)? {
            log::info!("Craft finished: {:?}", outcome);
        }
        frames += 1;
    }
    log::info!("Pending crafts resolved after {} frame(s)", frames);

    // The board only holds a knife now, which matches nothing
    app.handle_action(InputAction::Interact)?;

    let world = app.world();
    for &host in world.registry.placeables() {
        let held: Vec<String> = world
            .attached_to(host)
            .into_iter()
            .map(|object| world.describe(object))
            .collect();
        log::info!("{} holds {:?}", world.describe(host), held);
    }
    Ok(())
}
