//! The RTS camera controller.
//!
//! Controls a [`Camera`] the way real-time-strategy games with a top-down
//! view do: the camera looks at a target point on the XY plane from a
//! distance and angle above it. Translate, rotate and zoom operations move
//! the target across the plane, orbit the camera around it, and drive
//! zoom-dependent properties (distance, field of view, and optionally
//! pitch) through interpolators sampled at the zoom level.

use crate::math::{Interpolator, LinearInterpolator, Point, Smoothed};
use crate::renderer::Camera;

use glam::{Vec2, Vec3};

use std::f64::consts::PI;

/// A generic value constraint: takes the old and the new value and returns
/// the new value constrained to its rules.
pub type Constraint<T> = Box<dyn Fn(&T, &T) -> T>;

/// A constraint that clamps a value to a range.
#[must_use]
pub fn range_constraint(min: f64, max: f64) -> Constraint<f64> {
    Box::new(move |_old, new| new.clamp(min, max))
}

/// A constraint that clamps a 2D point to a rectangle.
#[must_use]
pub fn rectangle_constraint(bounds_min: Vec2, bounds_max: Vec2) -> Constraint<Vec2> {
    Box::new(move |_old, new| new.clamp(bounds_min, bounds_max))
}

/// A one-dimensional inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// A camera property driven by the zoom level.
pub struct ZoomProperty {
    /// Queried with the zoom level (0 to 1) to produce the property value.
    pub interpolator: Interpolator,
    /// Seconds for the property to settle on a new value.
    pub smooth_time: f64,
}

/// A camera property controlled directly by input.
#[derive(Debug, Clone, Copy)]
pub struct FreeProperty {
    /// Bounds for the property value.
    pub constraint: Range,
    /// Relative changes are multiplied by this before being applied.
    pub sensitivity: f64,
    /// Seconds for the property to settle on a new value.
    pub smooth_time: f64,
}

/// Pitch is the one property that can be controlled either directly via
/// rotation or via zoom.
pub enum PitchProperty {
    Free(FreeProperty),
    Zoom(ZoomProperty),
}

fn update_free_property(property: &FreeProperty, old_value: f64, diff: f64) -> f64 {
    (old_value + diff * property.sensitivity).clamp(property.constraint.min, property.constraint.max)
}

const DEFAULT_SMOOTH_TIME: f64 = 0.1;

/// Controls a camera with RTS semantics.
///
/// The controller owns the camera for its lifetime and rewrites the
/// camera's pose on every update.
pub struct RtsCameraController {
    target_constraint: Option<Constraint<Vec2>>,
    distance_property: ZoomProperty,
    fov_property: ZoomProperty,
    yaw_property: FreeProperty,
    pitch_property: PitchProperty,

    target: Vec2,
    zoom_sensitivity: f64,
    zoom_level: f64,

    distance: Smoothed,
    fov: Smoothed,
    yaw: Smoothed,
    pitch: Smoothed,
}

impl RtsCameraController {
    /// Creates a controller with default properties, looking at `target`.
    #[must_use]
    pub fn new(camera: &mut Camera, target: Vec2) -> Self {
        let mut controller = Self {
            target_constraint: None,
            distance_property: ZoomProperty {
                interpolator: LinearInterpolator::new(vec![
                    Point::new(0.0, 10.0),
                    Point::new(1.0, 1000.0),
                ])
                .expect("default distance points")
                .into(),
                smooth_time: DEFAULT_SMOOTH_TIME,
            },
            fov_property: ZoomProperty {
                interpolator: LinearInterpolator::new(vec![
                    Point::new(0.0, PI / 4.0),
                    Point::new(1.0, PI / 4.0),
                ])
                .expect("default fov points")
                .into(),
                smooth_time: DEFAULT_SMOOTH_TIME,
            },
            yaw_property: FreeProperty {
                constraint: Range {
                    min: 0.0,
                    max: PI / 2.0,
                },
                sensitivity: 1.0,
                smooth_time: DEFAULT_SMOOTH_TIME,
            },
            pitch_property: PitchProperty::Free(FreeProperty {
                constraint: Range {
                    min: 0.0,
                    max: PI / 2.0,
                },
                sensitivity: 1.0,
                smooth_time: DEFAULT_SMOOTH_TIME,
            }),
            target,
            zoom_sensitivity: 0.1,
            zoom_level: 0.0,
            distance: Smoothed::new(10.0, DEFAULT_SMOOTH_TIME),
            fov: Smoothed::new(PI / 4.0, DEFAULT_SMOOTH_TIME),
            yaw: Smoothed::new(0.0, DEFAULT_SMOOTH_TIME),
            pitch: Smoothed::new(PI / 4.0, DEFAULT_SMOOTH_TIME),
        };
        controller.update_camera(camera);
        controller
    }

    /// The camera's current target on the XY plane.
    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Changes the camera's target, bound by the target constraint.
    pub fn set_target(&mut self, camera: &mut Camera, target: Vec2) {
        self.target = self.apply_target_constraint(target);
        self.update_camera(camera);
    }

    /// Translates the camera along the XY plane.
    ///
    /// The direction of `camera_offset` is in camera space and its
    /// magnitude in world units: (2, 0) moves the camera 2 world units
    /// towards the right of the current view.
    pub fn translate(&mut self, camera: &mut Camera, camera_offset: Vec2) {
        let length = camera_offset.length();
        if f32::abs(length) < 1e-6 {
            return;
        }
        let offset_direction = camera_offset / length;
        let right = self.right();
        let direction = self.direction();
        let world_offset = (Vec2::new(right.x, right.y).normalize() * offset_direction.x
            + Vec2::new(direction.x, direction.y).normalize() * offset_direction.y)
            .normalize()
            * length;
        self.target = self.apply_target_constraint(self.target + world_offset);
        self.update_camera(camera);
    }

    /// Sets the camera's yaw and pitch to absolute values, bound by their
    /// constraints. The pitch is ignored while pitch is zoom-driven.
    pub fn set_rotation(&mut self, camera: &mut Camera, yaw_angle: f64, pitch_angle: f64) {
        self.yaw.set_target(
            yaw_angle.clamp(self.yaw_property.constraint.min, self.yaw_property.constraint.max),
        );
        if let PitchProperty::Free(free) = &self.pitch_property {
            self.pitch
                .set_target(pitch_angle.clamp(free.constraint.min, free.constraint.max));
        }
        self.update_camera(camera);
    }

    /// Rotates the camera around the target position.
    ///
    /// The differences are scaled by the sensitivity of the yaw and pitch
    /// properties. The pitch difference is ignored while pitch is
    /// zoom-driven.
    pub fn rotate(&mut self, camera: &mut Camera, yaw_angle_diff: f64, pitch_angle_diff: f64) {
        self.yaw.set_target(update_free_property(
            &self.yaw_property,
            self.yaw.target(),
            yaw_angle_diff,
        ));
        if let PitchProperty::Free(free) = &self.pitch_property {
            self.pitch
                .set_target(update_free_property(free, self.pitch.target(), pitch_angle_diff));
        }
        self.update_camera(camera);
    }

    /// The current zoom level, clamped between 0 (zoomed in) and 1 (zoomed
    /// out).
    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Sets the zoom level directly.
    pub fn set_zoom_level(&mut self, camera: &mut Camera, level: f64) {
        self.zoom_level = level.clamp(0.0, 1.0);
        self.update_zoom_targets();
        self.update_camera(camera);
    }

    /// Zooms the camera in (positive) or out (negative) by `amount` steps,
    /// scaled by the zoom sensitivity.
    pub fn zoom(&mut self, camera: &mut Camera, amount: f64) {
        self.zoom_level = (self.zoom_level - amount * self.zoom_sensitivity).clamp(0.0, 1.0);
        self.update_zoom_targets();
        self.update_camera(camera);
    }

    #[must_use]
    pub fn zoom_sensitivity(&self) -> f64 {
        self.zoom_sensitivity
    }

    pub fn set_zoom_sensitivity(&mut self, sensitivity: f64) {
        self.zoom_sensitivity = sensitivity;
    }

    /// Sets the property for the camera's distance to its target.
    ///
    /// The interpolator is sampled with the zoom level: its value at 0 is
    /// the fully-zoomed-in distance, at 1 the fully-zoomed-out distance.
    pub fn set_distance_property(&mut self, camera: &mut Camera, property: ZoomProperty) {
        self.distance
            .set_smooth_time(property.smooth_time);
        self.distance
            .set_target(property.interpolator.sample(self.zoom_level));
        self.distance_property = property;
        self.update_camera(camera);
    }

    /// Sets the property for the camera's field of view, sampled with the
    /// zoom level like the distance property.
    pub fn set_fov_property(&mut self, camera: &mut Camera, property: ZoomProperty) {
        self.fov.set_smooth_time(property.smooth_time);
        self.fov
            .set_target(property.interpolator.sample(self.zoom_level));
        self.fov_property = property;
        self.update_camera(camera);
    }

    /// Sets the constraint, sensitivity and smooth time of the camera's yaw.
    pub fn set_yaw_property(&mut self, camera: &mut Camera, property: FreeProperty) {
        self.yaw.set_smooth_time(property.smooth_time);
        self.yaw_property = property;
        self.yaw
            .set_target(update_free_property(&self.yaw_property, self.yaw.target(), 0.0));
        self.update_camera(camera);
    }

    /// Sets the pitch property: free (rotation-controlled) or zoom-driven.
    pub fn set_pitch_property(&mut self, camera: &mut Camera, property: PitchProperty) {
        match &property {
            PitchProperty::Free(free) => {
                self.pitch.set_smooth_time(free.smooth_time);
                self.pitch
                    .set_target(update_free_property(free, self.pitch.value(), 0.0));
            }
            PitchProperty::Zoom(zoom) => {
                self.pitch.set_smooth_time(zoom.smooth_time);
                self.pitch
                    .set_target(zoom.interpolator.sample(self.zoom_level));
            }
        }
        self.pitch_property = property;
        self.update_camera(camera);
    }

    /// Sets the constraint for the target position; the current target is
    /// adjusted immediately.
    pub fn set_target_constraint(&mut self, camera: &mut Camera, constraint: Constraint<Vec2>) {
        self.target_constraint = Some(constraint);
        self.target = self.apply_target_constraint(self.target);
        self.update_camera(camera);
    }

    /// The camera's current distance from its target, in world units.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance.value()
    }

    /// The camera's configured yaw, in radians.
    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.yaw.target()
    }

    /// The camera's configured pitch, in radians.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.pitch.target()
    }

    /// The camera's normalized "look at" vector in world space.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        // Pitch tilts the camera down, so it enters inverted.
        angles_to_vector(-self.pitch.value(), self.yaw.value())
    }

    /// The camera's normalized "up" vector in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        let r = self.pitch.value().sin();
        Vec3::new(
            (r * self.yaw.value().cos()) as f32,
            (r * self.yaw.value().sin()) as f32,
            self.pitch.value().cos() as f32,
        )
    }

    /// The camera's normalized "right" vector in world space.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.direction().cross(self.up())
    }

    /// Advances all smoothed properties by `dt` seconds and updates the
    /// camera pose.
    pub fn update(&mut self, camera: &mut Camera, dt: f64) {
        self.distance.update(dt);
        self.fov.update(dt);
        self.yaw.update(dt);
        self.pitch.update(dt);
        self.update_camera(camera);
    }

    /// Snaps all smoothed properties to their targets immediately.
    pub fn update_immediate(&mut self, camera: &mut Camera) {
        self.distance.update_immediate();
        self.fov.update_immediate();
        self.yaw.update_immediate();
        self.pitch.update_immediate();
        self.update_camera(camera);
    }

    fn update_zoom_targets(&mut self) {
        self.distance
            .set_target(self.distance_property.interpolator.sample(self.zoom_level));
        self.fov
            .set_target(self.fov_property.interpolator.sample(self.zoom_level));
        if let PitchProperty::Zoom(zoom) = &self.pitch_property {
            self.pitch
                .set_target(zoom.interpolator.sample(self.zoom_level));
        }
    }

    fn apply_target_constraint(&self, new_value: Vec2) -> Vec2 {
        match &self.target_constraint {
            Some(constraint) => constraint(&self.target, &new_value),
            None => new_value,
        }
    }

    // Rebuilds the camera pose from target, distance, yaw and pitch.
    fn update_camera(&self, camera: &mut Camera) {
        let direction = self.direction();
        let position =
            Vec3::new(self.target.x, self.target.y, 0.0) - direction * self.distance.value() as f32;
        camera.set_position(position);
        // The camera target can be any position in front of the camera.
        camera.set_target(position + direction);
        camera.set_up(self.up());
        camera.set_fov(self.fov.value() as f32);
    }
}

// Unit vector from a pitch angle above the XY plane and a yaw angle on it.
fn angles_to_vector(pitch: f64, yaw: f64) -> Vec3 {
    let r = pitch.cos();
    Vec3::new(
        (r * yaw.cos()) as f32,
        (r * yaw.sin()) as f32,
        pitch.sin() as f32,
    )
}
