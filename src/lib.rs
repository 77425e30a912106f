#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod assets;
pub mod error;
pub mod game;
pub mod gfx;
pub mod io;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod ui;

pub use assets::{AssetCache, AssetLoader};
pub use error::{Error, Result};
pub use gfx::{ColorSpace, Device, PixelFormat, TextureDesc};
pub use game::RtsCameraController;
pub use math::{CubicInterpolator, Interpolator, Rect, Smoothed};
pub use renderer::{Camera, CameraKind, Renderer};
pub use scene::{GameScene, SceneObject};
pub use ui::Canvas;
