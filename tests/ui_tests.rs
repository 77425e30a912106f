//! UI Tests
//!
//! Tests for:
//! - Anchor layout, the fill layout, and the sanity collapse
//! - Event routing: trickle-down then bubble-up along the parent chain
//! - Mouse capture scoped to the dispatching widget
//! - Clip rect intersection down the tree
//! - Nine-slice frame quads
//! - Scrollbar position/track mapping

use auriga::math::Rect;
use auriga::ui::{
    Anchor, Button, Canvas, Event, Frame, FrameSlice, KeyModifiers, Layout, Margins, MouseButton,
    ScrollbarLayout, TextureSource, WidgetKind,
};

use glam::IVec2;

use std::cell::RefCell;
use std::rc::Rc;

fn press(canvas: &mut Canvas, x: i32, y: i32) {
    canvas.on_mouse_button(IVec2::new(x, y), MouseButton::Left, true, KeyModifiers::empty());
}

fn release(canvas: &mut Canvas, x: i32, y: i32) {
    canvas.on_mouse_button(IVec2::new(x, y), MouseButton::Left, false, KeyModifiers::empty());
}

fn texture(id: usize) -> TextureSource {
    TextureSource::new(id, Rect::new(0, 0, 8, 8))
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn fill_layout_matches_the_parent_exactly() {
    let mut canvas = Canvas::new(800, 600);
    let parent = canvas.create_widget(
        Layout::top_left(IVec2::new(10, 20), 300, 200),
        WidgetKind::Panel,
        None,
    );
    let child = canvas.create_widget(Layout::fill(), WidgetKind::Panel, Some(parent));

    assert_eq!(
        canvas.widget(parent).calculated_layout(),
        Rect::new(10, 20, 300, 200)
    );
    assert_eq!(
        canvas.widget(child).calculated_layout(),
        canvas.widget(parent).calculated_layout()
    );
}

#[test]
fn right_anchored_zero_width_child_sits_on_the_parent_edge() {
    let mut canvas = Canvas::new(640, 480);
    let parent = canvas.create_widget(Layout::fill(), WidgetKind::Panel, None);
    // Anchors (1,0)..(1,0) horizontally: x = parent width, width = 0
    let child = canvas.create_widget(
        Layout {
            left: Anchor::new(1.0, 0),
            top: Anchor::new(0.0, 0),
            right: Anchor::new(1.0, 0),
            bottom: Anchor::new(0.0, 0),
        },
        WidgetKind::Panel,
        Some(parent),
    );

    let rect = canvas.widget(child).calculated_layout();
    assert_eq!(rect.x, 640);
    assert_eq!(rect.width, 0);
}

#[test]
fn crossed_edges_collapse_to_their_midpoint() {
    let mut canvas = Canvas::new(100, 100);
    let widget = canvas.create_widget(
        Layout {
            left: Anchor::new(0.0, 80),
            top: Anchor::new(0.0, 0),
            right: Anchor::new(0.0, 20),
            bottom: Anchor::new(0.0, 10),
        },
        WidgetKind::Panel,
        None,
    );
    let rect = canvas.widget(widget).calculated_layout();
    assert_eq!(rect.x, 50);
    assert_eq!(rect.width, 0);
}

#[test]
fn layout_changes_relayout_descendants() {
    let mut canvas = Canvas::new(100, 100);
    let parent = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 50, 50),
        WidgetKind::Panel,
        None,
    );
    let child = canvas.create_widget(Layout::fill(), WidgetKind::Panel, Some(parent));

    canvas.set_layout(parent, Layout::top_left(IVec2::new(10, 10), 80, 40));
    assert_eq!(
        canvas.widget(child).calculated_layout(),
        Rect::new(10, 10, 80, 40)
    );
}

#[test]
fn bounds_include_overflowing_children() {
    let mut canvas = Canvas::new(100, 100);
    let parent = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 10, 10),
        WidgetKind::Panel,
        None,
    );
    let _child = canvas.create_widget(
        Layout::top_left(IVec2::new(5, 5), 50, 50),
        WidgetKind::Panel,
        Some(parent),
    );

    assert_eq!(canvas.widget(parent).calculated_layout(), Rect::new(0, 0, 10, 10));
    assert_eq!(canvas.widget(parent).calculated_bounds(), Rect::new(0, 0, 55, 55));
}

// ============================================================================
// Event routing
// ============================================================================

#[test]
fn events_trickle_down_then_bubble_up() {
    let mut canvas = Canvas::new(400, 400);
    let root = canvas.create_widget(Layout::fill(), WidgetKind::Panel, None);
    let a = canvas.create_widget(Layout::fill(), WidgetKind::Panel, Some(root));
    let b = canvas.create_widget(Layout::fill(), WidgetKind::Panel, Some(a));

    let order = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(root, "R"), (a, "A"), (b, "B")] {
        let log = Rc::clone(&order);
        canvas
            .widget_mut(id)
            .add_pre_event_listener(Box::new(move |event, _| {
                if matches!(event, Event::MousePress { .. }) {
                    log.borrow_mut().push(format!("pre:{name}"));
                }
            }));
        let log = Rc::clone(&order);
        canvas
            .widget_mut(id)
            .add_on_event_listener(Box::new(move |event, _| {
                if matches!(event, Event::MousePress { .. }) {
                    log.borrow_mut().push(format!("on:{name}"));
                }
            }));
    }

    press(&mut canvas, 100, 100);
    assert_eq!(
        *order.borrow(),
        vec!["pre:R", "pre:A", "pre:B", "on:B", "on:A", "on:R"]
    );
}

#[test]
fn hit_testing_prefers_later_siblings_and_deeper_widgets() {
    let mut canvas = Canvas::new(400, 400);
    let first = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 200, 200),
        WidgetKind::Panel,
        None,
    );
    let second = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 200, 200),
        WidgetKind::Panel,
        None,
    );
    let second_child = canvas.create_widget(
        Layout::top_left(IVec2::new(50, 50), 100, 100),
        WidgetKind::Panel,
        Some(second),
    );

    let hits = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(first, "first"), (second, "second"), (second_child, "child")] {
        let log = Rc::clone(&hits);
        canvas
            .widget_mut(id)
            .add_on_event_listener(Box::new(move |event, _| {
                if matches!(event, Event::MouseEnter { .. }) {
                    log.borrow_mut().push(name);
                }
            }));
    }

    // Over the overlapping area but not the child: the later sibling wins
    canvas.on_cursor_position(IVec2::new(10, 10));
    assert_eq!(*hits.borrow(), vec!["second"]);

    // Over the child: the deepest widget wins
    hits.borrow_mut().clear();
    canvas.on_cursor_position(IVec2::new(100, 100));
    assert_eq!(*hits.borrow(), vec!["child"]);
}

#[test]
fn enter_and_leave_are_synthesized_on_hover_changes() {
    let mut canvas = Canvas::new(400, 400);
    let a = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Panel,
        None,
    );
    let b = canvas.create_widget(
        Layout::top_left(IVec2::new(200, 0), 100, 100),
        WidgetKind::Panel,
        None,
    );

    let log = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(a, "A"), (b, "B")] {
        let events = Rc::clone(&log);
        canvas
            .widget_mut(id)
            .add_on_event_listener(Box::new(move |event, _| match event {
                Event::MouseEnter { .. } => events.borrow_mut().push(format!("enter:{name}")),
                Event::MouseLeave { .. } => events.borrow_mut().push(format!("leave:{name}")),
                _ => {}
            }));
    }

    canvas.on_cursor_position(IVec2::new(50, 50));
    canvas.on_cursor_position(IVec2::new(250, 50));
    canvas.on_cursor_position(IVec2::new(350, 350));
    assert_eq!(
        *log.borrow(),
        vec!["enter:A", "leave:A", "enter:B", "leave:B"]
    );
}

// ============================================================================
// Mouse capture
// ============================================================================

#[test]
fn captured_widget_receives_the_release_elsewhere() {
    let mut canvas = Canvas::new(400, 400);
    // A at (0,0)-(100,100), B at (200,0)-(300,100)
    let a = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Panel,
        None,
    );
    let b = canvas.create_widget(
        Layout::top_left(IVec2::new(200, 0), 100, 100),
        WidgetKind::Panel,
        None,
    );

    let releases = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(a, "A"), (b, "B")] {
        let log = Rc::clone(&releases);
        canvas
            .widget_mut(id)
            .add_on_event_listener(Box::new(move |event, actions| match event {
                Event::MousePress { .. } => {
                    if name == "A" {
                        actions.set_capture = true;
                    }
                }
                Event::MouseRelease { .. } => {
                    log.borrow_mut().push(name);
                    actions.release_capture = true;
                }
                _ => {}
            }));
    }

    press(&mut canvas, 50, 50);
    assert_eq!(canvas.capture_widget(), Some(a));

    // Move into B and release: the event goes to A, not B
    canvas.on_cursor_position(IVec2::new(250, 50));
    release(&mut canvas, 250, 50);
    assert_eq!(*releases.borrow(), vec!["A"]);
    assert_eq!(canvas.capture_widget(), None);
}

#[test]
fn capture_requests_from_non_press_events_are_ignored() {
    let mut canvas = Canvas::new(400, 400);
    let a = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Panel,
        None,
    );
    canvas
        .widget_mut(a)
        .add_on_event_listener(Box::new(|event, actions| {
            if matches!(event, Event::MouseMove { .. }) {
                actions.set_capture = true;
            }
        }));

    canvas.on_cursor_position(IVec2::new(50, 50));
    assert_eq!(canvas.capture_widget(), None);
}

// ============================================================================
// Clipping
// ============================================================================

#[test]
fn clip_rects_intersect_down_the_tree() {
    let mut canvas = Canvas::new(400, 400);
    let outer = canvas.create_widget(
        Layout::top_left(IVec2::new(10, 10), 200, 200),
        WidgetKind::Panel,
        None,
    );
    canvas.widget_mut(outer).set_clip(Some(Rect::new(0, 0, 100, 100)));
    let inner = canvas.create_widget(
        Layout::top_left(IVec2::new(40, 40), 150, 150),
        WidgetKind::Panel,
        Some(outer),
    );
    canvas.widget_mut(inner).set_clip(Some(Rect::new(0, 0, 80, 80)));
    let image = canvas.create_widget(
        Layout::fill(),
        WidgetKind::Image(auriga::ui::Image::new(texture(1))),
        Some(inner),
    );
    let _ = image;

    let quads = canvas.render();
    assert_eq!(quads.len(), 1);
    // outer clip in canvas space: (10,10)-(110,110); inner: (50,50)-(130,130)
    assert_eq!(quads[0].clip_rect, Rect::new(50, 50, 60, 60));
}

#[test]
fn empty_clip_intersection_hides_the_subtree() {
    let mut canvas = Canvas::new(400, 400);
    let outer = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Panel,
        None,
    );
    canvas.widget_mut(outer).set_clip(Some(Rect::new(0, 0, 50, 50)));
    let inner = canvas.create_widget(
        Layout::top_left(IVec2::new(60, 60), 40, 40),
        WidgetKind::Panel,
        Some(outer),
    );
    // Inner clips to its own area, which lies outside the outer clip
    canvas.widget_mut(inner).set_clip(Some(Rect::new(0, 0, 40, 40)));
    let _image = canvas.create_widget(
        Layout::fill(),
        WidgetKind::Image(auriga::ui::Image::new(texture(1))),
        Some(inner),
    );

    assert!(canvas.render().is_empty());
}

#[test]
fn hidden_widgets_render_nothing() {
    let mut canvas = Canvas::new(400, 400);
    let image = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Image(auriga::ui::Image::new(texture(1))),
        None,
    );
    assert_eq!(canvas.render().len(), 1);
    canvas.set_visible(image, false);
    assert!(canvas.render().is_empty());
}

// ============================================================================
// Nine-slice frames
// ============================================================================

#[test]
fn four_corner_frame_produces_exactly_four_corner_quads() {
    let mut canvas = Canvas::new(400, 400);
    let mut frame = Frame::new();
    frame.set_margins(Margins::uniform(10));
    frame.set_slice_texture(FrameSlice::TopLeft, texture(1));
    frame.set_slice_texture(FrameSlice::TopRight, texture(2));
    frame.set_slice_texture(FrameSlice::BottomLeft, texture(3));
    frame.set_slice_texture(FrameSlice::BottomRight, texture(4));

    let _widget = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Frame(frame),
        None,
    );

    let quads = canvas.render();
    assert_eq!(quads.len(), 4);
    let areas: Vec<Rect> = quads.iter().map(|q| q.area).collect();
    assert_eq!(areas[0], Rect::new(0, 0, 10, 10));
    assert_eq!(areas[1], Rect::new(90, 0, 10, 10));
    assert_eq!(areas[2], Rect::new(0, 90, 10, 10));
    assert_eq!(areas[3], Rect::new(90, 90, 10, 10));
}

#[test]
fn frame_side_transitions_shrink_the_tiled_center() {
    let mut canvas = Canvas::new(400, 400);
    let mut frame = Frame::new();
    frame.set_margins(Margins::uniform(10));
    frame.set_slice_texture(FrameSlice::TopFirst, TextureSource::new(1, Rect::new(0, 0, 15, 10)));
    frame.set_slice_texture(FrameSlice::TopLast, TextureSource::new(2, Rect::new(0, 0, 15, 10)));
    frame.set_slice_texture(FrameSlice::Top, texture(3));

    let _widget = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 50),
        WidgetKind::Frame(frame),
        None,
    );

    let quads = canvas.render();
    assert_eq!(quads.len(), 3);
    // First transition starts at the left margin, at its texture width
    assert_eq!(quads[0].area, Rect::new(10, 0, 15, 10));
    // Last transition ends at the right margin
    assert_eq!(quads[1].area, Rect::new(75, 0, 15, 10));
    // The center fills the remainder
    assert_eq!(quads[2].area, Rect::new(25, 0, 50, 10));
}

#[test]
fn background_and_middle_span_whole_and_interior() {
    let mut canvas = Canvas::new(400, 400);
    let mut frame = Frame::new();
    frame.set_margins(Margins::uniform(10));
    frame.set_slice_texture(FrameSlice::Background, texture(1));
    frame.set_slice_texture(FrameSlice::Middle, texture(2));

    let _widget = canvas.create_widget(
        Layout::top_left(IVec2::new(5, 5), 100, 100),
        WidgetKind::Frame(frame),
        None,
    );

    let quads = canvas.render();
    assert_eq!(quads.len(), 2);
    assert_eq!(quads[0].area, Rect::new(5, 5, 100, 100));
    assert_eq!(quads[1].area, Rect::new(15, 15, 80, 80));
}

// ============================================================================
// Buttons
// ============================================================================

#[test]
fn button_clicks_fire_only_on_release_inside() {
    let mut canvas = Canvas::new(400, 400);
    let clicks = Rc::new(RefCell::new(0));
    let mut button = Button::default();
    {
        let clicks = Rc::clone(&clicks);
        button.add_click_listener(move || *clicks.borrow_mut() += 1);
    }
    let _button_id = canvas.create_widget(
        Layout::top_left(IVec2::ZERO, 100, 100),
        WidgetKind::Button(button),
        None,
    );

    press(&mut canvas, 50, 50);
    release(&mut canvas, 50, 50);
    assert_eq!(*clicks.borrow(), 1);

    // Press inside, drag out, release: no click
    press(&mut canvas, 50, 50);
    release(&mut canvas, 300, 300);
    assert_eq!(*clicks.borrow(), 1);
}

// ============================================================================
// Scrollbar
// ============================================================================

fn make_scrollbar(canvas: &mut Canvas) -> auriga::ui::WidgetId {
    let scrollbar = canvas.create_scrollbar(
        &ScrollbarLayout {
            layout: Layout::top_left(IVec2::ZERO, 20, 140),
            updown_button_height: 20,
            track_button_width: 20,
            track_button_height: 20,
        },
        None,
    );
    canvas.set_scroll_range(scrollbar, 0, 10);
    scrollbar
}

#[test]
fn scrollbar_buttons_step_the_position() {
    let mut canvas = Canvas::new(400, 400);
    let scrollbar = make_scrollbar(&mut canvas);
    canvas.set_scroll_step(scrollbar, 2);

    let positions = Rc::new(RefCell::new(Vec::new()));
    {
        let log = Rc::clone(&positions);
        if let WidgetKind::Scrollbar(bar) = canvas.widget_mut(scrollbar).kind_mut() {
            bar.add_scroll_listener(move |position| log.borrow_mut().push(position));
        }
    }

    // The down button occupies the bottom 20 pixels
    press(&mut canvas, 10, 130);
    release(&mut canvas, 10, 130);
    press(&mut canvas, 10, 130);
    release(&mut canvas, 10, 130);
    assert_eq!(*positions.borrow(), vec![2, 4]);

    // The up button occupies the top 20 pixels
    press(&mut canvas, 10, 10);
    release(&mut canvas, 10, 10);
    assert_eq!(*positions.borrow(), vec![2, 4, 2]);
}

#[test]
fn scrollbar_position_maps_to_track_button_offset() {
    let mut canvas = Canvas::new(400, 400);
    let scrollbar = make_scrollbar(&mut canvas);

    // Track area: y in [20, 120), height 100; button height 20 leaves a
    // travel range of 80 pixels for positions 0..=10.
    let track_button = canvas.widget(scrollbar).as_scrollbar().unwrap().track_button();
    let at_zero = canvas.widget(track_button).calculated_layout();
    assert_eq!(at_zero.y, 20);

    canvas.set_scroll_position(scrollbar, 5);
    let at_half = canvas.widget(track_button).calculated_layout();
    assert_eq!(at_half.y, 20 + 40);

    canvas.set_scroll_position(scrollbar, 10);
    let at_max = canvas.widget(track_button).calculated_layout();
    assert_eq!(at_max.y, 20 + 80);
}

#[test]
fn dragging_the_track_button_scrolls() {
    let mut canvas = Canvas::new(400, 400);
    let scrollbar = make_scrollbar(&mut canvas);
    let track_button = canvas.widget(scrollbar).as_scrollbar().unwrap().track_button();

    // Press on the track button, drag to the bottom of the track
    let rect = canvas.widget(track_button).calculated_layout();
    press(&mut canvas, rect.x + 10, rect.y + 10);
    canvas.on_cursor_position(IVec2::new(10, 110));
    release(&mut canvas, 10, 110);

    assert_eq!(
        canvas.widget(scrollbar).as_scrollbar().unwrap().position(),
        10
    );
}

#[test]
fn scroll_position_clamps_to_the_range() {
    let mut canvas = Canvas::new(400, 400);
    let scrollbar = make_scrollbar(&mut canvas);
    canvas.set_scroll_position(scrollbar, 25);
    assert_eq!(canvas.widget(scrollbar).as_scrollbar().unwrap().position(), 10);
    canvas.set_scroll_position(scrollbar, -5);
    assert_eq!(canvas.widget(scrollbar).as_scrollbar().unwrap().position(), 0);
}
