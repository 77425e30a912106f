//! Game-level systems: the RTS camera and the configuration stores.

mod object_types;
mod rts_camera;
mod tactical_cameras;

pub use object_types::{GameObjectType, GameObjectTypeStore};
pub use rts_camera::{
    range_constraint, rectangle_constraint, Constraint, FreeProperty, PitchProperty, Range,
    RtsCameraController, ZoomProperty,
};
pub use tactical_cameras::TacticalCameraStore;
