//! UI input events.

use glam::IVec2;

/// Identifies a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

bitflags::bitflags! {
    /// Modifier keys held while a mouse button or key event fires.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyModifiers: u8 {
        const CTRL = 1;
        const ALT = 2;
        const SHIFT = 4;
    }
}

/// An event delivered to widgets.
///
/// Positions are in canvas space (virtual pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The cursor moved over the widget (or the widget holds capture).
    MouseMove { position: IVec2 },
    /// The cursor entered the widget.
    MouseEnter { position: IVec2 },
    /// The cursor left the widget.
    MouseLeave { position: IVec2 },
    /// A mouse button was pressed over the widget.
    MousePress {
        position: IVec2,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    /// A mouse button was released over the widget.
    MouseRelease {
        position: IVec2,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    /// The scroll wheel turned over the widget.
    MouseScroll { position: IVec2, scroll: glam::Vec2 },
}

impl Event {
    /// The cursor position the event fired at.
    #[must_use]
    pub fn position(&self) -> IVec2 {
        match self {
            Event::MouseMove { position }
            | Event::MouseEnter { position }
            | Event::MouseLeave { position }
            | Event::MousePress { position, .. }
            | Event::MouseRelease { position, .. }
            | Event::MouseScroll { position, .. } => *position,
        }
    }
}

/// Actions a widget's event listener can request; applied by the canvas
/// after the listener returns, and only honored while the widget is the one
/// currently handling the dispatch.
#[derive(Debug, Default)]
pub struct EventActions {
    /// Retarget all mouse events to this widget until the capture is
    /// released.
    pub set_capture: bool,
    /// Release mouse capture held by this widget.
    pub release_capture: bool,
}
