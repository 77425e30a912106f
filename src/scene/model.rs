//! Renderable models.

use crate::renderer::{MaterialHandle, MeshHandle, Param};

use glam::Mat4;

/// How objects attached to a bone are reoriented relative to the camera,
/// the main light source, or the wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardMode {
    /// Objects are untouched.
    #[default]
    None,
    /// Rotate around the local origin so the front axis is parallel with
    /// the camera's direction.
    Parallel,
    /// Rotate around the local origin so the front axis points to the
    /// camera.
    Face,
    /// Rotate around the local Z axis so the front axis is parallel with
    /// the camera's direction.
    ZView,
    /// Rotate around the local Z axis so the front axis points in the wind
    /// direction.
    ZWind,
    /// Rotate around the local Z axis so the front axis points to the main
    /// light source.
    ZLight,
    /// Rotate around the parent's origin so +X points to the main light in
    /// view space while staying parallel to the camera plane.
    SunGlow,
    /// Rotate around the parent's origin so +X points to the main light.
    Sun,
}

impl BillboardMode {
    /// Billboard mode from its model-file encoding.
    #[must_use]
    pub fn from_raw(value: u32) -> Self {
        match value {
            1 => BillboardMode::Parallel,
            2 => BillboardMode::Face,
            3 => BillboardMode::ZView,
            4 => BillboardMode::ZWind,
            5 => BillboardMode::ZLight,
            6 => BillboardMode::SunGlow,
            7 => BillboardMode::Sun,
            _ => BillboardMode::None,
        }
    }
}

/// One mesh of a render model, with its material and bone placement.
#[derive(Debug, Clone)]
pub struct RenderModelMesh {
    pub name: String,
    pub mesh: MeshHandle,
    pub billboard_mode: BillboardMode,
    pub material: MaterialHandle,
    /// Per-mesh material parameter overrides from the model file.
    pub material_params: Vec<Param>,
    pub visible: bool,
    /// Absolute bone transform, relative to the model's root.
    pub root_transform: Mat4,
    /// Bone transform relative to the parent bone.
    pub parent_transform: Mat4,
}

/// An ordered list of renderable meshes making up one model.
#[derive(Debug, Clone, Default)]
pub struct RenderModel {
    meshes: Vec<RenderModelMesh>,
}

impl RenderModel {
    #[must_use]
    pub fn new(meshes: Vec<RenderModelMesh>) -> Self {
        Self { meshes }
    }

    #[must_use]
    pub fn meshes(&self) -> &[RenderModelMesh] {
        &self.meshes
    }
}
