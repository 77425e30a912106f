//! The UI widget tree and canvas.

mod canvas;
mod events;
mod frame;
mod kinds;
mod render;
mod sprite_renderer;
mod widget;

pub use canvas::{Canvas, ScrollbarLayout};
pub use events::{Event, EventActions, KeyModifiers, MouseButton};
pub use frame::{Frame, FrameSlice, FrameStyle, Margins, NUM_SLICES};
pub use kinds::{Button, ButtonStyle, Checkbox, CheckboxStyle, Image, Label, Scrollbar, ScrollbarStyle};
pub use render::{Quad, TextureSource, UiTextureId};
pub use sprite_renderer::UiSpriteRenderer;
pub use widget::{Anchor, EventListener, Layout, Widget, WidgetId, WidgetKind};
