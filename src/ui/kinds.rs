//! The built-in widget kinds.

use super::frame::FrameStyle;
use super::render::{Quad, TextureSource};
use super::widget::WidgetId;

use crate::math::Rect;

/// Visual states of a button.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonStyle {
    pub normal: TextureSource,
    pub hover: TextureSource,
    pub pressed: TextureSource,
}

// What a button does when clicked; the scrollbar's track button tracks the
// cursor instead of clicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum ButtonRole {
    #[default]
    Push,
    ScrollTrack,
}

/// A clickable button.
#[derive(Default)]
pub struct Button {
    pub(super) style: ButtonStyle,
    pub(super) hovered: bool,
    pub(super) pressed: bool,
    pub(super) role: ButtonRole,
    pub(super) click_listeners: Vec<Box<dyn FnMut()>>,
}

impl Button {
    #[must_use]
    pub fn new(style: ButtonStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn set_style(&mut self, style: ButtonStyle) {
        self.style = style;
    }

    /// True while the cursor is over the button.
    #[must_use]
    pub fn hovered(&self) -> bool {
        self.hovered
    }

    /// True while the primary button is held on the button.
    #[must_use]
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Adds a listener invoked on every click.
    pub fn add_click_listener(&mut self, listener: impl FnMut() + 'static) {
        self.click_listeners.push(Box::new(listener));
    }

    pub(super) fn quads(&self, rect: Rect, clip_rect: Rect) -> Vec<Quad> {
        let source = if self.pressed {
            self.style.pressed
        } else if self.hovered {
            self.style.hover
        } else {
            self.style.normal
        };
        match source.texture {
            Some(_) => vec![Quad {
                area: rect,
                texture: source.texture,
                tex_rect: source.tex_rect,
                clip_rect,
            }],
            None => Vec::new(),
        }
    }
}

/// A static text widget.
///
/// The label owns its text, font and color; turning them into glyph quads
/// is the job of the embedding application's text renderer.
#[derive(Debug, Clone, Default)]
pub struct Label {
    pub text: String,
    pub font: usize,
    pub color: [f32; 4],
}

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: 0,
            color: [1.0; 4],
        }
    }
}

/// A static image.
#[derive(Debug, Clone, Copy, Default)]
pub struct Image {
    pub source: TextureSource,
}

impl Image {
    #[must_use]
    pub fn new(source: TextureSource) -> Self {
        Self { source }
    }

    pub(super) fn quads(&self, rect: Rect, clip_rect: Rect) -> Vec<Quad> {
        match self.source.texture {
            Some(_) => vec![Quad {
                area: rect,
                texture: self.source.texture,
                tex_rect: self.source.tex_rect,
                clip_rect,
            }],
            None => Vec::new(),
        }
    }
}

/// Visual states of a checkbox.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxStyle {
    pub unchecked: TextureSource,
    pub checked: TextureSource,
}

/// A toggleable checkbox.
#[derive(Default)]
pub struct Checkbox {
    pub(super) style: CheckboxStyle,
    pub(super) checked: bool,
    pub(super) pressed: bool,
    pub(super) change_listeners: Vec<Box<dyn FnMut(bool)>>,
}

impl Checkbox {
    #[must_use]
    pub fn new(style: CheckboxStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Adds a listener invoked whenever the checked state changes.
    pub fn add_change_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.change_listeners.push(Box::new(listener));
    }

    pub(super) fn quads(&self, rect: Rect, clip_rect: Rect) -> Vec<Quad> {
        let source = if self.checked {
            self.style.checked
        } else {
            self.style.unchecked
        };
        match source.texture {
            Some(_) => vec![Quad {
                area: rect,
                texture: source.texture,
                tex_rect: source.tex_rect,
                clip_rect,
            }],
            None => Vec::new(),
        }
    }
}

/// The style of a scrollbar's parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollbarStyle {
    pub frame: FrameStyle,
    pub button_up: ButtonStyle,
    pub button_down: ButtonStyle,
    pub track_enabled: FrameStyle,
    pub track_disabled: FrameStyle,
    pub button_track: ButtonStyle,
}

/// A vertical scrollbar: up/down buttons, a track frame, and a draggable
/// track button.
///
/// The scrollbar widget only stores state and the ids of its parts; the
/// canvas coordinates the parts' behavior.
#[derive(Default)]
pub struct Scrollbar {
    pub(super) frame: WidgetId,
    pub(super) up_button: WidgetId,
    pub(super) down_button: WidgetId,
    pub(super) track_area: WidgetId,
    pub(super) track_button: WidgetId,

    pub(super) min: i32,
    pub(super) max: i32,
    pub(super) position: i32,
    pub(super) step: i32,

    pub(super) track_button_width: u32,
    pub(super) track_button_height: u32,

    pub(super) style: Option<ScrollbarStyle>,
    pub(super) scroll_listeners: Vec<Box<dyn FnMut(i32)>>,
}

impl Scrollbar {
    /// The scroll range, inclusive on both ends.
    #[must_use]
    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// The per-click increment of the up/down buttons.
    #[must_use]
    pub fn step(&self) -> i32 {
        self.step
    }

    /// The track button widget (exposed for tests and custom styling).
    #[must_use]
    pub fn track_button(&self) -> WidgetId {
        self.track_button
    }

    /// The up button widget.
    #[must_use]
    pub fn up_button(&self) -> WidgetId {
        self.up_button
    }

    /// The down button widget.
    #[must_use]
    pub fn down_button(&self) -> WidgetId {
        self.down_button
    }

    /// Adds a listener invoked whenever the scroll position changes.
    pub fn add_scroll_listener(&mut self, listener: impl FnMut(i32) + 'static) {
        self.scroll_listeners.push(Box::new(listener));
    }
}
