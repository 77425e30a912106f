//! Widgets and layout.
//!
//! A widget is the fundamental type in the UI: everything in a canvas is a
//! widget, interactive or static, visible or invisible. All widgets have an
//! anchored rectangular layout and can have child widgets. Widgets live in
//! an arena owned by the canvas and refer to each other by id.

use super::events::{Event, EventActions};
use super::frame::Frame;
use super::kinds::{Button, Checkbox, Image, Label, Scrollbar};

use crate::math::Rect;

use glam::IVec2;
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a widget within a canvas.
    pub struct WidgetId;
}

/// One anchor of a widget edge: a fraction of the parent's axis plus a
/// pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    /// Fraction of the parent's axis to anchor to (0.0 - 1.0).
    pub parent_frac: f32,
    /// Offset relative to the anchor, in canvas pixels.
    pub offset: i32,
}

impl Anchor {
    #[must_use]
    pub const fn new(parent_frac: f32, offset: i32) -> Self {
        Self {
            parent_frac,
            offset,
        }
    }
}

/// Layout information for a widget: an anchor per edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    pub left: Anchor,
    pub top: Anchor,
    pub right: Anchor,
    pub bottom: Anchor,
}

impl Layout {
    /// The widget stretches to fill its parent.
    #[must_use]
    pub fn fill() -> Self {
        Self {
            left: Anchor::new(0.0, 0),
            top: Anchor::new(0.0, 0),
            right: Anchor::new(1.0, 0),
            bottom: Anchor::new(1.0, 0),
        }
    }

    /// Fixed size, relative to the top-left corner of the parent.
    #[must_use]
    pub fn top_left(offset: IVec2, width: u32, height: u32) -> Self {
        Self {
            left: Anchor::new(0.0, offset.x),
            top: Anchor::new(0.0, offset.y),
            right: Anchor::new(0.0, offset.x + width as i32),
            bottom: Anchor::new(0.0, offset.y + height as i32),
        }
    }

    /// Fixed size, relative to the top-right corner of the parent.
    ///
    /// The offset is not inverted: a negative X offset keeps the widget
    /// inside the parent.
    #[must_use]
    pub fn top_right(offset: IVec2, width: u32, height: u32) -> Self {
        Self {
            left: Anchor::new(1.0, offset.x),
            top: Anchor::new(0.0, offset.y),
            right: Anchor::new(1.0, offset.x + width as i32),
            bottom: Anchor::new(0.0, offset.y + height as i32),
        }
    }

    /// Fixed size, centered on the parent.
    #[must_use]
    pub fn center(width: u32, height: u32) -> Self {
        let x = -(width as i32) / 2;
        let y = -(height as i32) / 2;
        Self {
            left: Anchor::new(0.5, x),
            top: Anchor::new(0.5, y),
            right: Anchor::new(0.5, x + width as i32),
            bottom: Anchor::new(0.5, y + height as i32),
        }
    }
}

/// The behavior-specific part of a widget.
#[derive(Default)]
pub enum WidgetKind {
    /// A plain, invisible container.
    #[default]
    Panel,
    Frame(Frame),
    Button(Button),
    Label(Label),
    Image(Image),
    Checkbox(Checkbox),
    Scrollbar(Scrollbar),
}

/// A listener attached to a widget's event phases.
pub type EventListener = Box<dyn FnMut(&Event, &mut EventActions)>;

/// A widget in a canvas.
pub struct Widget {
    pub(super) layout: Layout,
    pub(super) enabled: bool,
    pub(super) visible: bool,
    pub(super) name: String,

    pub(super) parent: Option<WidgetId>,
    pub(super) children: Vec<WidgetId>,

    /// Clipping rectangle for this widget and its descendants, relative to
    /// the widget's top-left corner. `None` lets children overflow.
    pub(super) clip: Option<Rect>,

    // Most recently computed layout rect (this widget only) and bounds
    // (including descendants), in canvas space.
    pub(super) calculated_layout: Rect,
    pub(super) calculated_bounds: Rect,

    pub(super) kind: WidgetKind,

    pub(super) pre_event_listeners: Vec<EventListener>,
    pub(super) on_event_listeners: Vec<EventListener>,
}

impl Widget {
    pub(super) fn new(layout: Layout, kind: WidgetKind) -> Self {
        Self {
            layout,
            enabled: true,
            visible: true,
            name: String::new(),
            parent: None,
            children: Vec::new(),
            clip: None,
            calculated_layout: Rect::default(),
            calculated_bounds: Rect::default(),
            kind,
            pre_event_listeners: Vec::new(),
            on_event_listeners: Vec::new(),
        }
    }

    /// The widget's name; unused by the UI itself, free for the
    /// application.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The calculated rectangle for this widget alone. Use
    /// [`Widget::calculated_bounds`] to include overflowing descendants.
    #[must_use]
    pub fn calculated_layout(&self) -> Rect {
        self.calculated_layout
    }

    /// The calculated bounding box of this widget and all descendants.
    #[must_use]
    pub fn calculated_bounds(&self) -> Rect {
        self.calculated_bounds
    }

    #[must_use]
    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    /// Sets the clip rectangle, relative to the widget's top-left corner.
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    #[must_use]
    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut WidgetKind {
        &mut self.kind
    }

    /// The frame data, if this widget is a frame.
    #[must_use]
    pub fn as_frame(&self) -> Option<&Frame> {
        match &self.kind {
            WidgetKind::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match &mut self.kind {
            WidgetKind::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_button(&self) -> Option<&Button> {
        match &self.kind {
            WidgetKind::Button(button) => Some(button),
            _ => None,
        }
    }

    pub fn as_button_mut(&mut self) -> Option<&mut Button> {
        match &mut self.kind {
            WidgetKind::Button(button) => Some(button),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_label(&self) -> Option<&Label> {
        match &self.kind {
            WidgetKind::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn as_label_mut(&mut self) -> Option<&mut Label> {
        match &mut self.kind {
            WidgetKind::Label(label) => Some(label),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_checkbox(&self) -> Option<&Checkbox> {
        match &self.kind {
            WidgetKind::Checkbox(checkbox) => Some(checkbox),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_scrollbar(&self) -> Option<&Scrollbar> {
        match &self.kind {
            WidgetKind::Scrollbar(scrollbar) => Some(scrollbar),
            _ => None,
        }
    }

    /// Adds a listener for the trickle-down phase.
    pub fn add_pre_event_listener(&mut self, listener: EventListener) {
        self.pre_event_listeners.push(listener);
    }

    /// Adds a listener for the bubble-up phase.
    pub fn add_on_event_listener(&mut self, listener: EventListener) {
        self.on_event_listeners.push(listener);
    }
}
