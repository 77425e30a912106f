//! Mesh geometry and instance types.

use super::material::{MaterialHandle, Param};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use slotmap::new_key_type;

new_key_type! {
    pub(crate) struct MeshKey;
}

/// Handle to a mesh owned by a [`super::Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle {
    pub(crate) key: MeshKey,
    pub(crate) renderer: u32,
}

/// The fixed interleaved vertex layout used by every mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub binormal: Vec3,
    pub uv: Vec2,
    pub color: Vec4,
}

/// Vertex and 16-bit index data for creating a mesh.
///
/// Indices form triangle lists.
#[derive(Debug, Clone, Default)]
pub struct MeshDesc {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// One mesh to render with a material and per-instance parameter overrides.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub mesh: MeshHandle,
    pub transform: Mat4,
    pub material: MaterialHandle,
    pub material_params: Vec<Param>,
}

/// A camera-space quad for 2D rendering.
///
/// Positions are in normalized device coordinates, UVs in texture space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sprite {
    pub position_top_left: Vec2,
    pub position_bottom_right: Vec2,
    pub uv_top_left: Vec2,
    pub uv_bottom_right: Vec2,
}
