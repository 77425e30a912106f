//! Walks scenes and dispatches their renderable objects.

use super::scene::{GameScene, SceneLayer};

use crate::error::Result;
use crate::renderer::{Camera, MeshInstance, Param, Renderer, RenderPipelineHandle};

use glam::Mat4;

// Per-object state materialized on first render and cached in the object's
// user-data slot.
struct RenderState {
    // Material parameters per model mesh, copied so per-object overrides
    // can diverge from the shared model.
    mesh_params: Vec<Vec<Param>>,
    // Scale transform from the render behavior.
    transform: Mat4,
}

impl RenderState {
    fn new(model: &super::model::RenderModel, scale: f64) -> Self {
        Self {
            mesh_params: model
                .meshes()
                .iter()
                .map(|mesh| mesh.material_params.clone())
                .collect(),
            transform: Mat4::from_scale(glam::Vec3::splat(scale as f32)),
        }
    }
}

/// Renders scenes through a renderer.
pub struct SceneRenderer<'r> {
    renderer: &'r mut Renderer,
}

impl<'r> SceneRenderer<'r> {
    pub fn new(renderer: &'r mut Renderer) -> Self {
        Self { renderer }
    }

    /// Renders a scene: skydome layers first (in order), then the
    /// background layer, then the foreground layer. The scene's dynamic
    /// lights are applied before any meshes are dispatched.
    pub fn render_scene(
        &mut self,
        scene: &mut GameScene,
        pipeline: RenderPipelineHandle,
        camera: &Camera,
    ) -> Result<()> {
        self.renderer.set_dynamic_lights(scene.dynamic_lights());

        for i in 0..scene.skydome_layers().len() {
            let layer = &mut scene.skydome_layers_mut()[i];
            Self::render_layer(self.renderer, layer, pipeline, camera)?;
        }
        Self::render_layer(self.renderer, scene.background_mut(), pipeline, camera)?;
        Self::render_layer(self.renderer, scene.foreground_mut(), pipeline, camera)
    }

    fn render_layer(
        renderer: &mut Renderer,
        layer: &mut SceneLayer,
        pipeline: RenderPipelineHandle,
        camera: &Camera,
    ) -> Result<()> {
        let mut meshes = Vec::new();

        for object in layer.objects_mut() {
            let (model, scale) = match object.render_behavior() {
                Some(behavior) => (behavior.model().clone(), behavior.scale()),
                None => continue,
            };

            if object.user_data::<RenderState>().is_none() {
                object.set_user_data(RenderState::new(&model, scale));
            }
            let transform = object.transform();
            let state = object
                .user_data::<RenderState>()
                .expect("render state was just installed");

            for (mesh, params) in model.meshes().iter().zip(&state.mesh_params) {
                if mesh.visible {
                    meshes.push(MeshInstance {
                        mesh: mesh.mesh,
                        transform: transform * state.transform,
                        material: mesh.material,
                        material_params: params.clone(),
                    });
                }
            }
        }

        if meshes.is_empty() {
            return Ok(());
        }
        renderer.render_meshes(pipeline, &meshes, camera)
    }
}
