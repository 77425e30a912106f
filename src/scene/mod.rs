//! Scenes, scene objects, and the scene renderer.

mod environment;
mod model;
mod object;
mod renderer;
#[allow(clippy::module_inception)]
mod scene;

pub use environment::{Environment, EnvironmentLight, Skydome, Wind, NUM_LIGHTS, NUM_SKYDOMES};
pub use model::{BillboardMode, RenderModel, RenderModelMesh};
pub use object::{Behavior, RenderBehavior, RenderLayer, SceneObject};
pub use renderer::SceneRenderer;
pub use scene::{GameScene, SceneLayer, SceneObjectId};
