//! Layered scenes.

use super::environment::Environment;
use super::object::{Behavior, RenderBehavior, RenderLayer, SceneObject};

use crate::assets::AssetCache;
use crate::game::GameObjectTypeStore;
use crate::renderer::DirectionalLight;

use glam::{EulerRot, Quat, Vec3};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifies a scene object within a [`GameScene`].
    pub struct SceneObjectId;
}

/// A set of scene objects forming one render layer.
#[derive(Default)]
pub struct SceneLayer {
    objects: SlotMap<SceneObjectId, SceneObject>,
}

impl SceneLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: SceneObject) -> SceneObjectId {
        self.objects.insert(object)
    }

    pub fn remove_object(&mut self, id: SceneObjectId) -> Option<SceneObject> {
        self.objects.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: SceneObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: SceneObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A scene: layered collections of scene objects plus environmental
/// properties.
///
/// The skydome layers are rendered behind everything else and are not
/// impacted by the near/far limits of the main camera. An object's layer is
/// chosen from its render behavior when it is added; changing layer
/// requires remove and re-add.
pub struct GameScene {
    skydome_layers: Vec<SceneLayer>,
    background: SceneLayer,
    foreground: SceneLayer,
    environment: Environment,
    dynamic_lights: Vec<DirectionalLight>,
}

impl GameScene {
    /// Creates a scene for an environment.
    ///
    /// The environment's skydomes are instantiated from the game-object
    /// type store: each skydome whose type is known gets a scene object
    /// with the type's space model, scale and background flag applied, and
    /// the environment's rotation. The environment lights become the
    /// scene's dynamic light set.
    pub fn new(
        asset_cache: &mut AssetCache,
        game_object_types: &GameObjectTypeStore,
        environment: Environment,
    ) -> Self {
        let mut skydome_layers = Vec::new();
        for skydome in &environment.skydomes {
            let mut layer = SceneLayer::new();
            if let Some(object_type) = game_object_types.get(&skydome.name) {
                let mut object = SceneObject::new();
                if let Some(model) = asset_cache.get_render_model(object_type.space_model_name) {
                    let mut behavior = RenderBehavior::new(model);
                    behavior.set_scale(object_type.scale_factor);
                    if object_type.is_in_background {
                        behavior.set_render_layer(RenderLayer::Background);
                    }
                    object.add_behavior(Behavior::Render(behavior));
                }
                object.scale = Vec3::splat(skydome.scale as f32);
                object.rotation = Quat::from_euler(
                    EulerRot::ZYXEx,
                    skydome.z_angle as f32,
                    0.0,
                    skydome.tilt as f32,
                );
                layer.add_object(object);
            }
            skydome_layers.push(layer);
        }

        let dynamic_lights = environment
            .lights
            .iter()
            .map(|light| DirectionalLight {
                direction: -light.from_direction,
                intensity: 1.0,
                diffuse_color: light.color,
                specular_color: light.specular_color,
            })
            .collect();

        Self {
            skydome_layers,
            background: SceneLayer::new(),
            foreground: SceneLayer::new(),
            environment,
            dynamic_lights,
        }
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The dynamic lights derived from the environment.
    #[must_use]
    pub fn dynamic_lights(&self) -> &[DirectionalLight] {
        &self.dynamic_lights
    }

    #[must_use]
    pub fn skydome_layers(&self) -> &[SceneLayer] {
        &self.skydome_layers
    }

    pub fn skydome_layers_mut(&mut self) -> &mut [SceneLayer] {
        &mut self.skydome_layers
    }

    #[must_use]
    pub fn background(&self) -> &SceneLayer {
        &self.background
    }

    #[must_use]
    pub fn foreground(&self) -> &SceneLayer {
        &self.foreground
    }

    pub fn background_mut(&mut self) -> &mut SceneLayer {
        &mut self.background
    }

    pub fn foreground_mut(&mut self) -> &mut SceneLayer {
        &mut self.foreground
    }

    /// Adds an object to the scene; its layer is chosen from its render
    /// behavior.
    pub fn add_object(&mut self, object: SceneObject) -> SceneObjectId {
        let layer = object
            .render_behavior()
            .map_or(RenderLayer::Foreground, RenderBehavior::render_layer);
        match layer {
            RenderLayer::Background => self.background.add_object(object),
            RenderLayer::Foreground => self.foreground.add_object(object),
        }
    }

    /// Removes an object by id, whichever main layer holds it.
    pub fn remove_object(&mut self, id: SceneObjectId) -> Option<SceneObject> {
        self.background
            .remove_object(id)
            .or_else(|| self.foreground.remove_object(id))
    }
}
