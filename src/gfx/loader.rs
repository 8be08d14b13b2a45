//! # Model Loading
//!
//! The loader collaborator turns a [`ModelDescriptor`] into a [`LoadedModel`]:
//! plain data (part names, local bounds and offsets) that
//! [`Scene::spawn_model`](crate::gfx::scene::Scene::spawn_model) instantiates.
//! Loading never touches the scene, so a recipe can await every output
//! model before it mutates anything.

use std::path::{Path, PathBuf};

use cgmath::{Vector3, Zero};
use futures::future::{self, BoxFuture, FutureExt};

use crate::error::LoadError;
use crate::gfx::picking::Aabb;

/// What to load.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub name: String,
    pub source: ModelSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Wavefront OBJ file, relative to the loader's asset root
    Obj(PathBuf),
    /// Procedural box with the given half extents
    Box { half_extents: Vector3<f32> },
}

impl ModelDescriptor {
    pub fn obj(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: ModelSource::Obj(path.into()),
        }
    }

    pub fn cuboid(name: impl Into<String>, half_extents: Vector3<f32>) -> Self {
        Self {
            name: name.into(),
            source: ModelSource::Box { half_extents },
        }
    }
}

/// One mesh of a loaded model.
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub name: String,
    /// Bounds in the part's local space
    pub bounds: Aabb,
    /// Offset of the part from the model root
    pub offset: Vector3<f32>,
}

/// A positioned mesh hierarchy ready to be spawned into a scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub parts: Vec<ModelPart>,
}

/// Asynchronous model loader.
pub trait ModelLoader {
    fn load(&self, descriptor: &ModelDescriptor) -> BoxFuture<'static, Result<LoadedModel, LoadError>>;
}

/// Loader for OBJ files under an asset root, plus procedural boxes.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new("assets")
    }
}

impl ModelLoader for AssetLoader {
    fn load(&self, descriptor: &ModelDescriptor) -> BoxFuture<'static, Result<LoadedModel, LoadError>> {
        let name = descriptor.name.clone();
        match &descriptor.source {
            ModelSource::Box { half_extents } => {
                future::ready(Ok(box_model(name, *half_extents))).boxed()
            }
            ModelSource::Obj(relative) => {
                let path = self.root.join(relative);
                async move { load_obj(name, &path) }.boxed()
            }
        }
    }
}

/// Loader that only builds procedural boxes. OBJ descriptors are loaded as
/// unit cubes, which keeps scripted sessions independent of asset files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveLoader;

impl ModelLoader for PrimitiveLoader {
    fn load(&self, descriptor: &ModelDescriptor) -> BoxFuture<'static, Result<LoadedModel, LoadError>> {
        let half_extents = match &descriptor.source {
            ModelSource::Box { half_extents } => *half_extents,
            ModelSource::Obj(_) => Vector3::new(0.5, 0.5, 0.5),
        };
        future::ready(Ok(box_model(descriptor.name.clone(), half_extents))).boxed()
    }
}

fn box_model(name: String, half_extents: Vector3<f32>) -> LoadedModel {
    LoadedModel {
        parts: vec![ModelPart {
            name: format!("{}_mesh", name),
            bounds: Aabb::from_half_extents(half_extents),
            offset: Vector3::zero(),
        }],
        name,
    }
}

fn load_obj(name: String, path: &Path) -> Result<LoadedModel, LoadError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| LoadError::Obj {
        path: path.display().to_string(),
        source,
    })?;

    let parts: Vec<ModelPart> = models
        .iter()
        .enumerate()
        .filter(|(_, model)| !model.mesh.positions.is_empty())
        .map(|(i, model)| {
            let vertices: Vec<[f32; 3]> = model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            let part_name = if model.name.is_empty() {
                format!("{}_part_{}", name, i)
            } else {
                model.name.clone()
            };

            ModelPart {
                name: part_name,
                bounds: Aabb::from_vertices(&vertices),
                offset: Vector3::zero(),
            }
        })
        .collect();

    if parts.is_empty() {
        return Err(LoadError::Empty(name));
    }

    log::debug!("Loaded {} ({} parts) from {}", name, parts.len(), path.display());
    Ok(LoadedModel { name, parts })
}
