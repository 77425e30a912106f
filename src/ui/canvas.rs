//! The UI canvas.
//!
//! The canvas owns all widgets of one UI in an arena and handles layout,
//! rendering and input dispatch for them. It has a virtual pixel size; if
//! that size differs from the render target, the UI is effectively scaled.
//!
//! Input events are dispatched in two sweeps along the parent chain of the
//! hit widget: trickle-down from the root (`pre` listeners), then bubble-up
//! back to the root (`on` listeners plus the built-in widget behavior).
//! While a widget holds mouse capture, pointer events bypass hit testing
//! and go directly to it.

use super::events::{Event, EventActions, KeyModifiers, MouseButton};
use super::frame::Frame;
use super::kinds::{Button, ButtonRole, Scrollbar, ScrollbarStyle};
use super::render::Quad;
use super::widget::{Anchor, Layout, Widget, WidgetId, WidgetKind};

use crate::math::Rect;

use glam::IVec2;
use slotmap::SlotMap;

/// Settings for creating a scrollbar.
#[derive(Debug, Clone, Copy)]
pub struct ScrollbarLayout {
    /// Anchors of the scrollbar itself.
    pub layout: Layout,
    /// Height of the up and down buttons, in canvas pixels.
    pub updown_button_height: u32,
    /// Size of the draggable track button, in canvas pixels.
    pub track_button_width: u32,
    pub track_button_height: u32,
}

// Which dispatch sweep a listener list belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Trickle,
    Bubble,
}

/// The container for all widgets of one UI.
pub struct Canvas {
    width: u32,
    height: u32,

    widgets: SlotMap<WidgetId, Widget>,
    roots: Vec<WidgetId>,

    // Dynamic mouse state
    cursor_position: IVec2,
    mouse_over: Option<WidgetId>,
    capture: Option<WidgetId>,
    // Widget currently handling a mouse-press dispatch; only it may take
    // capture.
    mouse_event_widget: Option<WidgetId>,
}

impl Canvas {
    /// Creates a canvas with a virtual size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            widgets: SlotMap::with_key(),
            roots: Vec::new(),
            cursor_position: IVec2::new(-1, -1),
            mouse_over: None,
            capture: None,
            mouse_event_widget: None,
        }
    }

    /// The virtual size of the canvas.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resizes the canvas and lays out every root widget again.
    pub fn set_size(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            for root in self.roots.clone() {
                self.do_layout(root);
            }
        }
    }

    // ========================================================================
    // Widget management
    // ========================================================================

    /// Creates a widget and attaches it to `parent`, or to the canvas root
    /// when `parent` is `None`. The widget is laid out before this returns.
    pub fn create_widget(
        &mut self,
        layout: Layout,
        kind: WidgetKind,
        parent: Option<WidgetId>,
    ) -> WidgetId {
        let mut widget = Widget::new(layout, kind);
        widget.parent = parent;
        let id = self.widgets.insert(widget);

        match parent {
            Some(parent_id) => self.widgets[parent_id].children.push(id),
            None => self.roots.push(id),
        }

        self.do_layout(id);
        // The new widget may now be under the cursor
        self.update_cursor_target();
        id
    }

    /// Removes a widget and its entire subtree.
    pub fn remove_widget(&mut self, id: WidgetId) {
        if !self.widgets.contains_key(id) {
            return;
        }
        let children = self.widgets[id].children.clone();
        for child in children {
            self.remove_widget(child);
        }

        if let Some(parent) = self.widgets[id].parent {
            if let Some(parent_widget) = self.widgets.get_mut(parent) {
                parent_widget.children.retain(|&c| c != id);
            }
        } else {
            self.roots.retain(|&r| r != id);
        }

        // Never keep dangling mouse state on a removed widget
        if self.capture == Some(id) {
            self.capture = None;
        }
        if self.mouse_over == Some(id) {
            self.mouse_over = None;
        }
        self.widgets.remove(id);
        self.update_cursor_target();
    }

    #[must_use]
    pub fn widget(&self, id: WidgetId) -> &Widget {
        &self.widgets[id]
    }

    /// Mutable access to a widget's data. Layout changes must go through
    /// [`Canvas::set_layout`] so the tree is re-laid.
    pub fn widget_mut(&mut self, id: WidgetId) -> &mut Widget {
        &mut self.widgets[id]
    }

    #[must_use]
    pub fn roots(&self) -> &[WidgetId] {
        &self.roots
    }

    /// Changes a widget's layout and re-lays it and all its descendants.
    pub fn set_layout(&mut self, id: WidgetId, layout: Layout) {
        self.widgets[id].layout = layout;
        self.do_layout(id);
    }

    /// Shows or hides a widget.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if self.widgets[id].visible != visible {
            self.widgets[id].visible = visible;
            self.update_cursor_target();
        }
    }

    /// Enables or disables a widget.
    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) {
        if self.widgets[id].enabled != enabled {
            self.widgets[id].enabled = enabled;
            self.update_cursor_target();
        }
    }

    /// Finds a named widget in the subtree of `id` (depth first).
    #[must_use]
    pub fn find_child(&self, id: WidgetId, name: &str) -> Option<WidgetId> {
        for &child in &self.widgets[id].children {
            if self.widgets[child].name == name {
                return Some(child);
            }
            if let Some(found) = self.find_child(child, name) {
                return Some(found);
            }
        }
        None
    }

    // ========================================================================
    // Layout
    // ========================================================================

    // Lays out a widget from its parent rect, then its children, then
    // notifies kind-specific layout hooks.
    fn do_layout(&mut self, id: WidgetId) {
        let parent_rect = match self.widgets[id].parent {
            Some(parent) => self.widgets[parent].calculated_layout,
            None => Rect::new(0, 0, self.width, self.height),
        };

        let apply = |anchor: &Anchor, pos0: i32, pos1: i32| -> i32 {
            pos0 + ((pos1 - pos0) as f32 * anchor.parent_frac) as i32 + anchor.offset
        };

        let layout = self.widgets[id].layout;
        let parent_right = parent_rect.x + parent_rect.width as i32;
        let parent_bottom = parent_rect.y + parent_rect.height as i32;

        let mut left = apply(&layout.left, parent_rect.x, parent_right);
        let mut top = apply(&layout.top, parent_rect.y, parent_bottom);
        let mut right = apply(&layout.right, parent_rect.x, parent_right);
        let mut bottom = apply(&layout.bottom, parent_rect.y, parent_bottom);

        // Sanity collapse: crossed edges meet at their midpoint
        if left >= right {
            let mid = (left + right) / 2;
            left = mid;
            right = mid;
        }
        if top >= bottom {
            let mid = (top + bottom) / 2;
            top = mid;
            bottom = mid;
        }

        let rect = Rect::new(left, top, (right - left) as u32, (bottom - top) as u32);
        self.widgets[id].calculated_layout = rect;
        self.widgets[id].calculated_bounds = rect;

        let children = self.widgets[id].children.clone();
        for child in children {
            self.do_layout(child);
            let child_bounds = self.widgets[child].calculated_bounds;
            let bounds = self.widgets[id].calculated_bounds;
            self.widgets[id].calculated_bounds = Rect::combine(&bounds, &child_bounds);
        }

        self.on_layout(id);
    }

    // Kind-specific layout reactions, invoked after the widget's own rect
    // and all of its children have been re-laid.
    fn on_layout(&mut self, id: WidgetId) {
        if matches!(self.widgets[id].kind, WidgetKind::Scrollbar(_)) {
            self.update_track_button(id);
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Walks the root widgets in order and collects the quads of every
    /// visible widget, clipped by its ancestors.
    #[must_use]
    pub fn render(&self) -> Vec<Quad> {
        let mut quads = Vec::new();
        let canvas_rect = Rect::new(0, 0, self.width, self.height);
        for &root in &self.roots {
            self.append_widget(&mut quads, root, canvas_rect);
        }
        quads
    }

    fn append_widget(&self, quads: &mut Vec<Quad>, id: WidgetId, mut clip_rect: Rect) {
        let widget = &self.widgets[id];
        if !widget.visible {
            return;
        }

        if let Some(widget_clip) = widget.clip {
            let rect = widget.calculated_layout;
            let absolute_clip = widget_clip.offset(IVec2::new(rect.x, rect.y));
            match Rect::intersect(&clip_rect, &absolute_clip) {
                // An empty intersection clips away the widget and all of
                // its descendants.
                None => return,
                Some(intersection) => clip_rect = intersection,
            }
        }

        let rect = widget.calculated_layout;
        match &widget.kind {
            WidgetKind::Panel | WidgetKind::Label(_) | WidgetKind::Scrollbar(_) => {}
            WidgetKind::Frame(frame) => quads.extend(frame.quads(rect, clip_rect)),
            WidgetKind::Button(button) => quads.extend(button.quads(rect, clip_rect)),
            WidgetKind::Image(image) => quads.extend(image.quads(rect, clip_rect)),
            WidgetKind::Checkbox(checkbox) => quads.extend(checkbox.quads(rect, clip_rect)),
        }

        for &child in &widget.children {
            self.append_widget(quads, child, clip_rect);
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Handles a cursor move, synthesizing enter/leave events as the
    /// hovered widget changes.
    pub fn on_cursor_position(&mut self, position: IVec2) {
        if self.cursor_position != position {
            self.cursor_position = position;
            self.update_cursor_target();
        }
    }

    /// Handles a mouse button press or release.
    pub fn on_mouse_button(
        &mut self,
        position: IVec2,
        button: MouseButton,
        pressed: bool,
        modifiers: KeyModifiers,
    ) {
        self.on_cursor_position(position);
        if let Some(target) = self.find_mouse_target(position) {
            let event = if pressed {
                Event::MousePress {
                    position,
                    button,
                    modifiers,
                }
            } else {
                Event::MouseRelease {
                    position,
                    button,
                    modifiers,
                }
            };
            self.send_event(target, &event);
        }
    }

    /// Handles a scroll-wheel event.
    pub fn on_mouse_scroll(&mut self, position: IVec2, scroll: glam::Vec2) {
        self.on_cursor_position(position);
        if let Some(target) = self.find_mouse_target(position) {
            self.send_event(target, &Event::MouseScroll { position, scroll });
        }
    }

    /// The widget currently holding mouse capture, if any.
    #[must_use]
    pub fn capture_widget(&self) -> Option<WidgetId> {
        self.capture
    }

    /// The widget currently under the cursor, if any.
    #[must_use]
    pub fn mouse_over_widget(&self) -> Option<WidgetId> {
        self.mouse_over
    }

    // Re-evaluates which widget is under the cursor and synthesizes
    // enter/leave/move events on changes.
    fn update_cursor_target(&mut self) {
        let position = self.cursor_position;
        let target = self.find_mouse_target(position);
        match (target, self.mouse_over) {
            (Some(new), Some(old)) if new != old => {
                self.send_event(old, &Event::MouseLeave { position });
                self.send_event(new, &Event::MouseEnter { position });
                self.mouse_over = Some(new);
                self.send_event(new, &Event::MouseMove { position });
            }
            (Some(new), Some(_)) => {
                self.send_event(new, &Event::MouseMove { position });
            }
            (Some(new), None) => {
                self.send_event(new, &Event::MouseEnter { position });
                self.mouse_over = Some(new);
                self.send_event(new, &Event::MouseMove { position });
            }
            (None, Some(old)) => {
                self.send_event(old, &Event::MouseLeave { position });
                self.mouse_over = None;
            }
            (None, None) => {}
        }
    }

    // The widget that receives mouse events at `position`: the capture
    // widget if one is set, otherwise the deepest visible widget under the
    // cursor.
    fn find_mouse_target(&self, position: IVec2) -> Option<WidgetId> {
        if let Some(capture) = self.capture {
            if self.widgets.contains_key(capture) {
                return Some(capture);
            }
        }
        self.find_visible_widget(&self.roots, position)
    }

    // Scans in reverse because later widgets visually overlap earlier
    // ones, and descends into children before accepting a widget itself.
    fn find_visible_widget(&self, ids: &[WidgetId], position: IVec2) -> Option<WidgetId> {
        for &id in ids.iter().rev() {
            let widget = &self.widgets[id];
            if !widget.visible {
                continue;
            }
            if let Some(hit) = self.find_visible_widget(&widget.children, position) {
                return Some(hit);
            }
            if widget.calculated_layout.contains(position) {
                return Some(id);
            }
        }
        None
    }

    // ========================================================================
    // Event dispatch
    // ========================================================================

    // Delivers an event to a target widget: trickle down from the root to
    // the target, then bubble up from the target back to the root.
    fn send_event(&mut self, target: WidgetId, event: &Event) {
        let mut chain = vec![target];
        let mut current = target;
        while let Some(parent) = self.widgets[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();

        for &id in &chain {
            self.dispatch(id, Phase::Trickle, event);
        }
        for &id in chain.iter().rev() {
            self.dispatch(id, Phase::Bubble, event);
        }
    }

    fn dispatch(&mut self, id: WidgetId, phase: Phase, event: &Event) {
        if !self.widgets.contains_key(id) {
            // A handler earlier in the sweep removed this widget
            return;
        }
        let saved_event_widget = self.mouse_event_widget;
        self.mouse_event_widget = Some(id);

        if phase == Phase::Bubble {
            self.builtin_behavior(id, event);
        }

        // Run the user listeners with the widget's listener list taken out,
        // so they can freely touch the widget through their captures.
        let mut listeners = match phase {
            Phase::Trickle => std::mem::take(&mut self.widgets[id].pre_event_listeners),
            Phase::Bubble => std::mem::take(&mut self.widgets[id].on_event_listeners),
        };
        let mut actions = EventActions::default();
        for listener in &mut listeners {
            listener(event, &mut actions);
        }
        if let Some(widget) = self.widgets.get_mut(id) {
            match phase {
                Phase::Trickle => {
                    let mut replaced = listeners;
                    replaced.extend(widget.pre_event_listeners.drain(..));
                    widget.pre_event_listeners = replaced;
                }
                Phase::Bubble => {
                    let mut replaced = listeners;
                    replaced.extend(widget.on_event_listeners.drain(..));
                    widget.on_event_listeners = replaced;
                }
            }
        }

        // Re-assert the handler scope: nested dispatches (capture release,
        // cursor-target updates) may have overwritten it.
        self.mouse_event_widget = Some(id);
        self.apply_actions(id, event, &actions);
        self.mouse_event_widget = saved_event_widget;
    }

    fn apply_actions(&mut self, id: WidgetId, event: &Event, actions: &EventActions) {
        if actions.set_capture {
            self.set_capture(id, event);
        }
        if actions.release_capture {
            self.release_capture(id);
        }
    }

    // Capture can only be taken by the widget handling a mouse-press
    // dispatch.
    fn set_capture(&mut self, id: WidgetId, event: &Event) {
        if self.mouse_event_widget == Some(id) && matches!(event, Event::MousePress { .. }) {
            self.capture = Some(id);
        }
    }

    fn release_capture(&mut self, id: WidgetId) {
        if self.capture == Some(id) {
            self.capture = None;
            // The cursor may now be over another widget; notify it
            self.update_cursor_target();
        }
    }

    // ========================================================================
    // Built-in widget behavior (bubble phase)
    // ========================================================================

    fn builtin_behavior(&mut self, id: WidgetId, event: &Event) {
        if !self.widgets[id].enabled {
            return;
        }
        match &self.widgets[id].kind {
            WidgetKind::Button(_) => self.button_behavior(id, event),
            WidgetKind::Checkbox(_) => self.checkbox_behavior(id, event),
            _ => {}
        }
    }

    fn button_behavior(&mut self, id: WidgetId, event: &Event) {
        let role = match &self.widgets[id].kind {
            WidgetKind::Button(button) => button.role,
            _ => return,
        };

        match event {
            Event::MouseEnter { .. } => {
                if let WidgetKind::Button(button) = &mut self.widgets[id].kind {
                    button.hovered = true;
                }
            }
            Event::MouseLeave { .. } => {
                if let WidgetKind::Button(button) = &mut self.widgets[id].kind {
                    button.hovered = false;
                }
            }
            Event::MousePress {
                button: MouseButton::Left,
                ..
            } => {
                if let WidgetKind::Button(button) = &mut self.widgets[id].kind {
                    button.pressed = true;
                }
                self.capture = self.mouse_event_widget;
            }
            Event::MouseRelease {
                position,
                button: MouseButton::Left,
                ..
            } => {
                let was_pressed = match &mut self.widgets[id].kind {
                    WidgetKind::Button(button) => std::mem::replace(&mut button.pressed, false),
                    _ => false,
                };
                self.release_capture(id);
                if role == ButtonRole::Push
                    && was_pressed
                    && self.widgets[id].calculated_layout.contains(*position)
                {
                    self.button_clicked(id);
                }
            }
            Event::MouseMove { position } => {
                if role == ButtonRole::ScrollTrack {
                    let pressed = matches!(
                        &self.widgets[id].kind,
                        WidgetKind::Button(button) if button.pressed
                    );
                    if pressed {
                        if let Some(scrollbar) = self.find_ancestor_scrollbar(id) {
                            self.on_track_button_dragged(scrollbar, *position);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn checkbox_behavior(&mut self, id: WidgetId, event: &Event) {
        match event {
            Event::MousePress {
                button: MouseButton::Left,
                ..
            } => {
                if let WidgetKind::Checkbox(checkbox) = &mut self.widgets[id].kind {
                    checkbox.pressed = true;
                }
                self.capture = self.mouse_event_widget;
            }
            Event::MouseRelease {
                position,
                button: MouseButton::Left,
                ..
            } => {
                let was_pressed = match &mut self.widgets[id].kind {
                    WidgetKind::Checkbox(checkbox) => {
                        std::mem::replace(&mut checkbox.pressed, false)
                    }
                    _ => false,
                };
                self.release_capture(id);
                if was_pressed && self.widgets[id].calculated_layout.contains(*position) {
                    let checked = match &mut self.widgets[id].kind {
                        WidgetKind::Checkbox(checkbox) => {
                            checkbox.checked = !checkbox.checked;
                            checkbox.checked
                        }
                        _ => return,
                    };
                    let mut listeners = match &mut self.widgets[id].kind {
                        WidgetKind::Checkbox(checkbox) => {
                            std::mem::take(&mut checkbox.change_listeners)
                        }
                        _ => return,
                    };
                    for listener in &mut listeners {
                        listener(checked);
                    }
                    if let Some(WidgetKind::Checkbox(checkbox)) =
                        self.widgets.get_mut(id).map(Widget::kind_mut)
                    {
                        let mut replaced = listeners;
                        replaced.extend(checkbox.change_listeners.drain(..));
                        checkbox.change_listeners = replaced;
                    }
                }
            }
            _ => {}
        }
    }

    // A push button was clicked: run its listeners, and scroll if the
    // button is the up/down button of a scrollbar.
    fn button_clicked(&mut self, id: WidgetId) {
        let mut listeners = match &mut self.widgets[id].kind {
            WidgetKind::Button(button) => std::mem::take(&mut button.click_listeners),
            _ => return,
        };
        for listener in &mut listeners {
            listener();
        }
        if let Some(WidgetKind::Button(button)) = self.widgets.get_mut(id).map(Widget::kind_mut) {
            let mut replaced = listeners;
            replaced.extend(button.click_listeners.drain(..));
            button.click_listeners = replaced;
        }

        if let Some(scrollbar_id) = self.find_ancestor_scrollbar(id) {
            let (step, position, is_up, is_down) = {
                let WidgetKind::Scrollbar(scrollbar) = &self.widgets[scrollbar_id].kind else {
                    return;
                };
                (
                    scrollbar.step,
                    scrollbar.position,
                    scrollbar.up_button == id,
                    scrollbar.down_button == id,
                )
            };
            if is_up {
                self.set_scroll_position(scrollbar_id, position - step);
            } else if is_down {
                self.set_scroll_position(scrollbar_id, position + step);
            }
        }
    }

    fn find_ancestor_scrollbar(&self, mut id: WidgetId) -> Option<WidgetId> {
        while let Some(parent) = self.widgets[id].parent {
            if matches!(self.widgets[parent].kind, WidgetKind::Scrollbar(_)) {
                return Some(parent);
            }
            id = parent;
        }
        None
    }

    // ========================================================================
    // Scrollbars
    // ========================================================================

    /// Creates a scrollbar composite: a frame with up/down buttons and a
    /// track area holding the draggable track button.
    pub fn create_scrollbar(
        &mut self,
        layout: &ScrollbarLayout,
        parent: Option<WidgetId>,
    ) -> WidgetId {
        let button_height = layout.updown_button_height as i32;

        let scrollbar_id =
            self.create_widget(layout.layout, WidgetKind::Scrollbar(Scrollbar::default()), parent);

        let frame = self.create_widget(
            Layout::fill(),
            WidgetKind::Frame(Frame::new()),
            Some(scrollbar_id),
        );
        let up_button = self.create_widget(
            Layout {
                left: Anchor::new(0.0, 0),
                top: Anchor::new(0.0, 0),
                right: Anchor::new(1.0, 0),
                bottom: Anchor::new(0.0, button_height),
            },
            WidgetKind::Button(Button::default()),
            Some(frame),
        );
        let down_button = self.create_widget(
            Layout {
                left: Anchor::new(0.0, 0),
                top: Anchor::new(1.0, -button_height),
                right: Anchor::new(1.0, 0),
                bottom: Anchor::new(1.0, 0),
            },
            WidgetKind::Button(Button::default()),
            Some(frame),
        );
        let track_area = self.create_widget(
            Layout {
                left: Anchor::new(0.0, 0),
                top: Anchor::new(0.0, button_height),
                right: Anchor::new(1.0, 0),
                bottom: Anchor::new(1.0, -button_height),
            },
            WidgetKind::Frame(Frame::new()),
            Some(frame),
        );
        let track_button = self.create_widget(
            track_button_layout(0, layout.track_button_width, layout.track_button_height),
            WidgetKind::Button(Button {
                role: ButtonRole::ScrollTrack,
                ..Default::default()
            }),
            Some(track_area),
        );

        {
            let WidgetKind::Scrollbar(scrollbar) = &mut self.widgets[scrollbar_id].kind else {
                unreachable!()
            };
            scrollbar.frame = frame;
            scrollbar.up_button = up_button;
            scrollbar.down_button = down_button;
            scrollbar.track_area = track_area;
            scrollbar.track_button = track_button;
            scrollbar.step = 1;
            scrollbar.track_button_width = layout.track_button_width;
            scrollbar.track_button_height = layout.track_button_height;
        }

        self.update_track_button(scrollbar_id);
        scrollbar_id
    }

    /// Applies a style to all parts of a scrollbar.
    pub fn set_scrollbar_style(&mut self, id: WidgetId, style: ScrollbarStyle) {
        let WidgetKind::Scrollbar(scrollbar) = &mut self.widgets[id].kind else {
            return;
        };
        scrollbar.style = Some(style);
        let (frame, up, down, track_area, track_button) = (
            scrollbar.frame,
            scrollbar.up_button,
            scrollbar.down_button,
            scrollbar.track_area,
            scrollbar.track_button,
        );

        if let Some(widget_frame) = self.widgets[frame].as_frame_mut() {
            widget_frame.set_style(&style.frame);
        }
        if let Some(button) = self.widgets[up].as_button_mut() {
            button.set_style(style.button_up);
        }
        if let Some(button) = self.widgets[down].as_button_mut() {
            button.set_style(style.button_down);
        }
        if let Some(area) = self.widgets[track_area].as_frame_mut() {
            area.set_style(&style.track_enabled);
        }
        if let Some(button) = self.widgets[track_button].as_button_mut() {
            button.set_style(style.button_track);
        }
        self.update_track_button(id);
    }

    /// Sets the scroll range; the position is re-clamped into it.
    pub fn set_scroll_range(&mut self, id: WidgetId, min: i32, max: i32) {
        let position = {
            let WidgetKind::Scrollbar(scrollbar) = &mut self.widgets[id].kind else {
                return;
            };
            scrollbar.min = min;
            scrollbar.max = max;
            scrollbar.position
        };
        self.set_scroll_position(id, position);
        self.update_track_button(id);
    }

    /// Sets the per-click step of the up/down buttons.
    pub fn set_scroll_step(&mut self, id: WidgetId, step: i32) {
        if let WidgetKind::Scrollbar(scrollbar) = &mut self.widgets[id].kind {
            scrollbar.step = step;
        }
    }

    /// Sets the scroll position, clamped to the range; listeners fire when
    /// the position actually changes.
    pub fn set_scroll_position(&mut self, id: WidgetId, position: i32) {
        let changed = {
            let WidgetKind::Scrollbar(scrollbar) = &mut self.widgets[id].kind else {
                return;
            };
            let clamped = position.clamp(scrollbar.min, scrollbar.max);
            if scrollbar.position == clamped {
                false
            } else {
                scrollbar.position = clamped;
                true
            }
        };
        if changed {
            self.update_track_button(id);
            self.notify_scroll_listeners(id);
        }
    }

    fn notify_scroll_listeners(&mut self, id: WidgetId) {
        let (mut listeners, position) = {
            let WidgetKind::Scrollbar(scrollbar) = &mut self.widgets[id].kind else {
                return;
            };
            (
                std::mem::take(&mut scrollbar.scroll_listeners),
                scrollbar.position,
            )
        };
        for listener in &mut listeners {
            listener(position);
        }
        if let Some(WidgetKind::Scrollbar(scrollbar)) =
            self.widgets.get_mut(id).map(Widget::kind_mut)
        {
            let mut replaced = listeners;
            replaced.extend(scrollbar.scroll_listeners.drain(..));
            scrollbar.scroll_listeners = replaced;
        }
    }

    // The vertical pixel range the center of the track button can move in,
    // in canvas space.
    fn calculated_track_range(&self, id: WidgetId) -> (i32, i32) {
        let WidgetKind::Scrollbar(scrollbar) = &self.widgets[id].kind else {
            return (0, 0);
        };
        let area = self.widgets[scrollbar.track_area].calculated_layout;
        let button_height = scrollbar.track_button_height as i32;
        let top_margin = button_height / 2;
        let bottom_margin = button_height - top_margin;
        (
            area.y + top_margin,
            area.y + area.height as i32 - bottom_margin,
        )
    }

    // Repositions the track button from the current position within the
    // range, and enables/disables the interactive parts.
    fn update_track_button(&mut self, id: WidgetId) {
        let (track_button, up_button, down_button, track_area, width, height, frac, enabled, style) = {
            let WidgetKind::Scrollbar(scrollbar) = &self.widgets[id].kind else {
                return;
            };
            let enabled = scrollbar.min != scrollbar.max;
            let frac = if enabled {
                (scrollbar.position - scrollbar.min) as f32
                    / (scrollbar.max - scrollbar.min) as f32
            } else {
                0.0
            };
            (
                scrollbar.track_button,
                scrollbar.up_button,
                scrollbar.down_button,
                scrollbar.track_area,
                scrollbar.track_button_width,
                scrollbar.track_button_height,
                frac,
                enabled,
                scrollbar.style,
            )
        };
        if track_button == WidgetId::default() {
            // Still under construction
            return;
        }

        self.widgets[track_button].enabled = enabled;
        self.widgets[up_button].enabled = enabled;
        self.widgets[down_button].enabled = enabled;
        if let Some(style) = style {
            if let Some(area) = self.widgets[track_area].as_frame_mut() {
                area.set_style(if enabled {
                    &style.track_enabled
                } else {
                    &style.track_disabled
                });
            }
        }

        let (track_min, track_max) = self.calculated_track_range(id);
        let offset_top = ((track_max - track_min) as f32 * frac) as i32;
        self.set_layout(track_button, track_button_layout(offset_top, width, height));
    }

    // The track button was dragged: map the cursor back to a position.
    fn on_track_button_dragged(&mut self, id: WidgetId, cursor_position: IVec2) {
        let (track_min, track_max) = self.calculated_track_range(id);
        if track_max <= track_min {
            return;
        }
        let track_offset = cursor_position.y.clamp(track_min, track_max);
        let track_frac = (track_offset - track_min) as f32 / (track_max - track_min) as f32;

        let (min, max) = {
            let WidgetKind::Scrollbar(scrollbar) = &self.widgets[id].kind else {
                return;
            };
            (scrollbar.min, scrollbar.max)
        };
        let value = crate::math::lerp_i32(min, max, track_frac);
        self.set_scroll_position(id, value);
    }
}

// The track button centers on the track and hangs from the track area's
// top by `offset_top`.
fn track_button_layout(offset_top: i32, width: u32, height: u32) -> Layout {
    let offset_left = -(width as i32 / 2);
    Layout {
        left: Anchor::new(0.5, offset_left),
        top: Anchor::new(0.0, offset_top),
        right: Anchor::new(0.5, offset_left + width as i32),
        bottom: Anchor::new(0.0, offset_top + height as i32),
    }
}
