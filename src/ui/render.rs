//! UI rendering primitives.
//!
//! The canvas breaks every widget down into textured quads. Textures are
//! referred to by opaque ids owned by whatever renders the quads; the
//! widget tree itself never touches GPU resources.

use crate::math::Rect;

/// Opaque identifier for a texture registered with the UI renderer.
pub type UiTextureId = usize;

/// A (subregion of a) texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureSource {
    /// The texture; `None` marks the source as unset.
    pub texture: Option<UiTextureId>,
    /// The area of the texture to use, in texels.
    pub tex_rect: Rect,
}

impl TextureSource {
    #[must_use]
    pub const fn new(texture: UiTextureId, tex_rect: Rect) -> Self {
        Self {
            texture: Some(texture),
            tex_rect,
        }
    }
}

/// One textured rectangle of UI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    /// The area covered by the quad, in canvas pixels.
    pub area: Rect,
    /// The texture for this quad.
    pub texture: Option<UiTextureId>,
    /// The area of the texture to use, in texels.
    pub tex_rect: Rect,
    /// Clipping rectangle for this quad, in canvas pixels.
    pub clip_rect: Rect,
}
