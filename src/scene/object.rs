//! Scene objects and their behaviors.

use super::model::RenderModel;

use glam::{Mat4, Quat, Vec3};

use std::any::Any;
use std::rc::Rc;

/// The render layer an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderLayer {
    Background,
    #[default]
    Foreground,
}

/// Makes a scene object renderable with a model.
#[derive(Clone)]
pub struct RenderBehavior {
    model: Rc<RenderModel>,
    scale: f64,
    render_layer: RenderLayer,
}

impl RenderBehavior {
    #[must_use]
    pub fn new(model: Rc<RenderModel>) -> Self {
        Self {
            model,
            scale: 1.0,
            render_layer: RenderLayer::Foreground,
        }
    }

    #[must_use]
    pub fn model(&self) -> &Rc<RenderModel> {
        &self.model
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    #[must_use]
    pub fn render_layer(&self) -> RenderLayer {
        self.render_layer
    }

    pub fn set_render_layer(&mut self, render_layer: RenderLayer) {
        self.render_layer = render_layer;
    }
}

/// A capability attached to a scene object.
#[derive(Clone)]
pub enum Behavior {
    /// The object is rendered with a model.
    Render(RenderBehavior),
    /// The object is a marker: a named position with no visual.
    Marker,
}

/// An object in a scene: a transform, a set of behaviors, and an opaque
/// user-data slot.
#[derive(Default)]
pub struct SceneObject {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    behaviors: Vec<Behavior>,
    user_data: Option<Box<dyn Any>>,
}

impl SceneObject {
    #[must_use]
    pub fn new() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            behaviors: Vec::new(),
            user_data: None,
        }
    }

    /// The object's world transform.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn add_behavior(&mut self, behavior: Behavior) {
        self.behaviors.push(behavior);
    }

    #[must_use]
    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    /// The object's render behavior, if it has one.
    #[must_use]
    pub fn render_behavior(&self) -> Option<&RenderBehavior> {
        self.behaviors.iter().find_map(|b| match b {
            Behavior::Render(render) => Some(render),
            Behavior::Marker => None,
        })
    }

    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.behaviors.iter().any(|b| matches!(b, Behavior::Marker))
    }

    /// Stores a value in the object's user-data slot, replacing any
    /// previous value.
    pub fn set_user_data<T: 'static>(&mut self, value: T) {
        self.user_data = Some(Box::new(value));
    }

    /// The user data, if it holds a value of type `T`.
    #[must_use]
    pub fn user_data<T: 'static>(&self) -> Option<&T> {
        self.user_data.as_ref().and_then(|data| data.downcast_ref())
    }

    /// Mutable access to the user data, if it holds a value of type `T`.
    pub fn user_data_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.user_data.as_mut().and_then(|data| data.downcast_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_is_type_checked() {
        let mut object = SceneObject::new();
        object.set_user_data(42u32);
        assert_eq!(object.user_data::<u32>(), Some(&42));
        assert_eq!(object.user_data::<String>(), None);
    }
}
