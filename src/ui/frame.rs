//! Nine-slice frames.
//!
//! A frame divides its rectangle with two horizontal and two vertical lines
//! into nine segments and textures them independently: the corners stretch
//! into the margin rectangles, the side centers tile along their axis, and
//! each side additionally has up to two fixed-size transition slices at its
//! ends. A background slice spans the whole widget and a middle slice the
//! interior. Only slices with a texture assigned produce quads.

use super::render::{Quad, TextureSource};

use crate::math::Rect;

/// The margins of a frame, in pixels. These position the slice lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Margins {
    #[must_use]
    pub const fn uniform(size: u32) -> Self {
        Self {
            left: size,
            top: size,
            right: size,
            bottom: size,
        }
    }
}

/// Identifies a texture slice of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FrameSlice {
    /// Covers the entire frame, stretched to fill.
    Background = 0,
    /// Fills the frame between the margins.
    Middle,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// Left side transition above the middle, at its texture's height.
    LeftAbove,
    /// Left side transition below the middle, at its texture's height.
    LeftBelow,
    /// Left side center, tiled to fill the remaining height.
    Left,
    TopFirst,
    TopLast,
    Top,
    RightAbove,
    RightBelow,
    Right,
    BottomFirst,
    BottomLast,
    Bottom,
}

/// The number of slices in a frame.
pub const NUM_SLICES: usize = 18;

/// The visual style of a frame: margins plus per-slice textures.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStyle {
    pub margins: Margins,
    pub slice_textures: [TextureSource; NUM_SLICES],
}

/// Frame data of a frame widget.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    margins: Margins,
    // Bitmask of active slices; cheaper to test than the texture array.
    active: u32,
    textures: [TextureSource; NUM_SLICES],
}

impl Frame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a complete style.
    pub fn set_style(&mut self, style: &FrameStyle) {
        self.set_margins(style.margins);
        for (index, source) in style.slice_textures.iter().enumerate() {
            self.set_slice_texture_by_index(index, *source);
        }
    }

    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    /// Assigns (or clears) the texture of one slice.
    pub fn set_slice_texture(&mut self, slice: FrameSlice, source: TextureSource) {
        self.set_slice_texture_by_index(slice as usize, source);
    }

    fn set_slice_texture_by_index(&mut self, index: usize, source: TextureSource) {
        if source.texture.is_some() {
            self.active |= 1 << index;
            self.textures[index] = source;
        } else {
            self.active &= !(1 << index);
            self.textures[index] = TextureSource::default();
        }
    }

    #[must_use]
    fn slice_active(&self, slice: FrameSlice) -> bool {
        self.active & (1 << (slice as u32)) != 0
    }

    /// Computes the quads for the frame at its current layout rectangle.
    /// At most one quad per active slice.
    #[must_use]
    pub fn quads(&self, widget_rect: Rect, clip_rect: Rect) -> Vec<Quad> {
        let width = widget_rect.width;
        let height = widget_rect.height;

        let left_margin = self.margins.left.min(width);
        let top_margin = self.margins.top.min(height);
        let right_margin = self.margins.right.min(width);
        let bottom_margin = self.margins.bottom.min(height);

        let make_rect = |x: u32, y: u32, w: u32, h: u32| {
            Rect::new(widget_rect.x + x as i32, widget_rect.y + y as i32, w, h)
        };

        let mut quads = Vec::new();
        let mut push = |slice: FrameSlice, area: Rect| {
            let source = self.textures[slice as usize];
            quads.push(Quad {
                area,
                texture: source.texture,
                tex_rect: source.tex_rect,
                clip_rect,
            });
        };

        if self.slice_active(FrameSlice::Background) {
            push(FrameSlice::Background, widget_rect);
        }

        if self.slice_active(FrameSlice::Middle) {
            push(
                FrameSlice::Middle,
                make_rect(
                    left_margin,
                    top_margin,
                    width.saturating_sub(right_margin).saturating_sub(left_margin),
                    height.saturating_sub(bottom_margin).saturating_sub(top_margin),
                ),
            );
        }

        // Corners
        if self.slice_active(FrameSlice::TopLeft) {
            push(FrameSlice::TopLeft, make_rect(0, 0, left_margin, top_margin));
        }
        if self.slice_active(FrameSlice::TopRight) {
            push(
                FrameSlice::TopRight,
                make_rect(width - right_margin, 0, right_margin, top_margin),
            );
        }
        if self.slice_active(FrameSlice::BottomLeft) {
            push(
                FrameSlice::BottomLeft,
                make_rect(0, height - bottom_margin, left_margin, bottom_margin),
            );
        }
        if self.slice_active(FrameSlice::BottomRight) {
            push(
                FrameSlice::BottomRight,
                make_rect(
                    width - right_margin,
                    height - bottom_margin,
                    right_margin,
                    bottom_margin,
                ),
            );
        }

        // Left border: transitions shrink the tiled center
        let mut left_middle_top = top_margin;
        if self.slice_active(FrameSlice::LeftAbove) {
            let tex_height = self.textures[FrameSlice::LeftAbove as usize].tex_rect.height;
            push(
                FrameSlice::LeftAbove,
                make_rect(0, left_middle_top, left_margin, tex_height),
            );
            left_middle_top += tex_height;
        }
        let mut left_middle_bottom = height - bottom_margin;
        if self.slice_active(FrameSlice::LeftBelow) {
            let tex_height = self.textures[FrameSlice::LeftBelow as usize].tex_rect.height;
            left_middle_bottom = left_middle_bottom.saturating_sub(tex_height);
            push(
                FrameSlice::LeftBelow,
                make_rect(0, left_middle_bottom, left_margin, tex_height),
            );
        }
        if self.slice_active(FrameSlice::Left) {
            let slice_height = left_middle_bottom.saturating_sub(left_middle_top);
            push(
                FrameSlice::Left,
                make_rect(0, left_middle_top, left_margin, slice_height),
            );
        }

        // Top border
        let mut top_middle_left = left_margin;
        if self.slice_active(FrameSlice::TopFirst) {
            let tex_width = self.textures[FrameSlice::TopFirst as usize].tex_rect.width;
            push(
                FrameSlice::TopFirst,
                make_rect(top_middle_left, 0, tex_width, top_margin),
            );
            top_middle_left += tex_width;
        }
        let mut top_middle_right = width - right_margin;
        if self.slice_active(FrameSlice::TopLast) {
            let tex_width = self.textures[FrameSlice::TopLast as usize].tex_rect.width;
            top_middle_right = top_middle_right.saturating_sub(tex_width);
            push(
                FrameSlice::TopLast,
                make_rect(top_middle_right, 0, tex_width, top_margin),
            );
        }
        if self.slice_active(FrameSlice::Top) {
            let slice_width = top_middle_right.saturating_sub(top_middle_left);
            push(
                FrameSlice::Top,
                make_rect(top_middle_left, 0, slice_width, top_margin),
            );
        }

        // Right border
        let mut right_middle_top = top_margin;
        if self.slice_active(FrameSlice::RightAbove) {
            let tex_height = self.textures[FrameSlice::RightAbove as usize].tex_rect.height;
            push(
                FrameSlice::RightAbove,
                make_rect(width - right_margin, right_middle_top, right_margin, tex_height),
            );
            right_middle_top += tex_height;
        }
        let mut right_middle_bottom = height - bottom_margin;
        if self.slice_active(FrameSlice::RightBelow) {
            let tex_height = self.textures[FrameSlice::RightBelow as usize].tex_rect.height;
            right_middle_bottom = right_middle_bottom.saturating_sub(tex_height);
            push(
                FrameSlice::RightBelow,
                make_rect(width - right_margin, right_middle_bottom, right_margin, tex_height),
            );
        }
        if self.slice_active(FrameSlice::Right) {
            let slice_height = right_middle_bottom.saturating_sub(right_middle_top);
            push(
                FrameSlice::Right,
                make_rect(width - right_margin, right_middle_top, right_margin, slice_height),
            );
        }

        // Bottom border
        let mut bottom_middle_left = left_margin;
        if self.slice_active(FrameSlice::BottomFirst) {
            let tex_width = self.textures[FrameSlice::BottomFirst as usize].tex_rect.width;
            push(
                FrameSlice::BottomFirst,
                make_rect(bottom_middle_left, height - bottom_margin, tex_width, bottom_margin),
            );
            bottom_middle_left += tex_width;
        }
        let mut bottom_middle_right = width - right_margin;
        if self.slice_active(FrameSlice::BottomLast) {
            let tex_width = self.textures[FrameSlice::BottomLast as usize].tex_rect.width;
            bottom_middle_right = bottom_middle_right.saturating_sub(tex_width);
            push(
                FrameSlice::BottomLast,
                make_rect(bottom_middle_right, height - bottom_margin, tex_width, bottom_margin),
            );
        }
        if self.slice_active(FrameSlice::Bottom) {
            let slice_width = bottom_middle_right.saturating_sub(bottom_middle_left);
            push(
                FrameSlice::Bottom,
                make_rect(bottom_middle_left, height - bottom_margin, slice_width, bottom_margin),
            );
        }

        quads
    }
}
