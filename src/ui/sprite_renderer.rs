//! Bridges canvas quads to the sprite renderer.
//!
//! Maps quads from canvas pixels to camera space, groups consecutive quads
//! by (texture, clip rect), and submits each group as one sprite batch with
//! the group's texture bound to the sprite material. Clip rectangles only
//! change batch boundaries; the renderer does not scissor individual quads.

use super::render::{Quad, UiTextureId};

use crate::error::Result;
use crate::gfx::TextureId;
use crate::math::Rect;
use crate::renderer::{MaterialHandle, Param, PropertyValue, Renderer, RenderPipelineHandle, Sprite};

use glam::Vec2;

/// Renders UI quads through a render pipeline and sprite material.
pub struct UiSpriteRenderer {
    pipeline: RenderPipelineHandle,
    material: MaterialHandle,
    /// Name of the material's texture property.
    texture_property: String,
    // UiTextureId is an index into this table
    textures: Vec<(TextureId, u32, u32)>,
}

impl UiSpriteRenderer {
    #[must_use]
    pub fn new(
        pipeline: RenderPipelineHandle,
        material: MaterialHandle,
        texture_property: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            material,
            texture_property: texture_property.into(),
            textures: Vec::new(),
        }
    }

    /// Registers a texture for use by widgets and returns its UI id.
    pub fn register_texture(&mut self, texture: TextureId, width: u32, height: u32) -> UiTextureId {
        self.textures.push((texture, width, height));
        self.textures.len() - 1
    }

    /// Renders the quads of one canvas frame.
    pub fn render_quads(
        &self,
        renderer: &mut Renderer,
        quads: &[Quad],
        canvas_size: (u32, u32),
    ) -> Result<()> {
        // Map canvas coordinates ((0,0)-(W,H), Y down) to camera space
        // ((-1,-1)-(1,1), Y up).
        let to_camera_space = |x: i32, y: i32| {
            Vec2::new(
                (2.0 * x as f32) / canvas_size.0 as f32 - 1.0,
                1.0 - (2.0 * y as f32) / canvas_size.1 as f32,
            )
        };

        let mut sprites: Vec<Sprite> = Vec::with_capacity(quads.len());
        let mut group_texture: Option<UiTextureId> = None;
        let mut group_clip = Rect::default();

        let flush = |renderer: &mut Renderer, sprites: &mut Vec<Sprite>, texture: Option<UiTextureId>| -> Result<()> {
            if sprites.is_empty() {
                return Ok(());
            }
            let bound = texture
                .and_then(|id| self.textures.get(id))
                .map(|&(texture, _, _)| texture);
            let params = [Param {
                name: self.texture_property.clone(),
                value: PropertyValue::Texture(bound),
            }];
            renderer.render_sprites(self.pipeline, sprites, self.material, &params)?;
            sprites.clear();
            Ok(())
        };

        for quad in quads {
            if (quad.texture != group_texture || quad.clip_rect != group_clip)
                && !sprites.is_empty()
            {
                // The render settings change here; draw what we have first
                flush(renderer, &mut sprites, group_texture)?;
            }
            group_texture = quad.texture;
            group_clip = quad.clip_rect;

            let mut sprite = Sprite {
                position_top_left: to_camera_space(quad.area.x, quad.area.y),
                position_bottom_right: to_camera_space(quad.area.right(), quad.area.bottom()),
                ..Default::default()
            };
            if let Some(&(_, width, height)) = quad.texture.and_then(|id| self.textures.get(id)) {
                let to_uv = |u: i32, v: i32| {
                    Vec2::new(u as f32 / width as f32, v as f32 / height as f32)
                };
                sprite.uv_top_left = to_uv(quad.tex_rect.x, quad.tex_rect.y);
                sprite.uv_bottom_right = to_uv(quad.tex_rect.right(), quad.tex_rect.bottom());
            }
            sprites.push(sprite);
        }

        flush(renderer, &mut sprites, group_texture)
    }
}
