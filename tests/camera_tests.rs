//! Camera Tests
//!
//! Tests for:
//! - RTS camera controller: zoom-driven properties, pose reconstruction,
//!   translation under constraint, rotation clamping
//! - Rendering camera: matrix memoization

use auriga::game::{
    rectangle_constraint, FreeProperty, PitchProperty, Range, RtsCameraController, ZoomProperty,
};
use auriga::math::{CubicInterpolator, LinearInterpolator, Point};
use auriga::renderer::{Camera, CameraKind, CameraProperties};

use glam::{Vec2, Vec3};

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

fn make_camera() -> Camera {
    Camera::new(CameraProperties {
        kind: CameraKind::Perspective,
        position: Vec3::new(100.0, 100.0, 150.0),
        target: Vec3::ZERO,
        up: Vec3::Z,
        fov: std::f32::consts::FRAC_PI_2,
        width: 0.0,
        aspect: 16.0 / 9.0,
        znear: 10.0,
        zfar: 100_000.0,
    })
}

fn zoom_property(points: &[(f64, f64)], smooth_time: f64) -> ZoomProperty {
    let points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    ZoomProperty {
        interpolator: LinearInterpolator::new(points).unwrap().into(),
        smooth_time,
    }
}

// ============================================================================
// Zoom
// ============================================================================

#[test]
fn zoom_is_reversible_away_from_the_limits() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    controller.set_zoom_level(&mut camera, 0.5);

    let amount = 1.25;
    controller.zoom(&mut camera, amount);
    controller.zoom(&mut camera, -amount);
    // 0.1 sensitivity: 0.5 - 0.125 + 0.125 round-trips without loss
    assert_eq!(controller.zoom_level(), 0.5);
}

#[test]
fn zoom_level_clamps_to_unit_range() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);

    controller.zoom(&mut camera, 1000.0);
    assert_eq!(controller.zoom_level(), 0.0);
    controller.zoom(&mut camera, -1000.0);
    assert_eq!(controller.zoom_level(), 1.0);
}

#[test]
fn zoom_drives_distance_through_the_interpolator() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    controller.set_distance_property(&mut camera, zoom_property(&[(0.0, 10.0), (1.0, 1000.0)], 0.0));

    controller.set_zoom_level(&mut camera, 0.0);
    controller.update_immediate(&mut camera);
    assert!((controller.distance() - 10.0).abs() < 1e-9);
    // The camera hangs above the XY plane by sin(pitch) * distance
    let expected_height = (FRAC_PI_4.sin() * 10.0) as f32;
    assert!((camera.position().z - expected_height).abs() < 1e-3);

    controller.set_zoom_level(&mut camera, 1.0);
    controller.update_immediate(&mut camera);
    assert!((controller.distance() - 1000.0).abs() < 1e-9);
    let expected_height = (FRAC_PI_4.sin() * 1000.0) as f32;
    assert!((camera.position().z - expected_height).abs() < 0.5);
}

#[test]
fn zoom_driven_pitch_ignores_rotate() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    let pitch_points = vec![Point::new(0.0, FRAC_PI_2), Point::new(1.0, FRAC_PI_4)];
    controller.set_pitch_property(
        &mut camera,
        PitchProperty::Zoom(ZoomProperty {
            interpolator: CubicInterpolator::new(pitch_points).unwrap().into(),
            smooth_time: 0.0,
        }),
    );

    let pitch_before = controller.pitch();
    controller.rotate(&mut camera, 0.0, 1.0);
    assert_eq!(controller.pitch(), pitch_before);

    // Zoom changes it instead
    controller.set_zoom_level(&mut camera, 1.0);
    assert!((controller.pitch() - FRAC_PI_4).abs() < 1e-9);
}

// ============================================================================
// Rotation
// ============================================================================

#[test]
fn rotate_scales_by_sensitivity_and_clamps() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    controller.set_yaw_property(
        &mut camera,
        FreeProperty {
            constraint: Range {
                min: 0.0,
                max: 1.0,
            },
            sensitivity: 0.5,
            smooth_time: 0.0,
        },
    );

    controller.rotate(&mut camera, 1.0, 0.0);
    assert!((controller.yaw() - 0.5).abs() < 1e-9);
    controller.rotate(&mut camera, 10.0, 0.0);
    assert_eq!(controller.yaw(), 1.0); // clamped
}

// ============================================================================
// Translation
// ============================================================================

#[test]
fn translate_moves_the_target_in_camera_space() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    controller.update_immediate(&mut camera);

    // With default yaw 0 the camera looks along +X; "forward" on screen is
    // +X in the world, "right" is then -Y (direction x up).
    controller.translate(&mut camera, Vec2::new(0.0, 2.0));
    let target = controller.target();
    assert!((target.x - 2.0).abs() < 1e-4, "target {target:?}");
    assert!(target.y.abs() < 1e-4, "target {target:?}");

    // Magnitude is in world units
    assert!((controller.target().length() - 2.0).abs() < 1e-4);
}

#[test]
fn translate_respects_the_target_constraint() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    controller.set_target_constraint(
        &mut camera,
        rectangle_constraint(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)),
    );

    controller.translate(&mut camera, Vec2::new(0.0, 100.0));
    let target = controller.target();
    assert!(target.x <= 1.0 && target.y <= 1.0, "target {target:?}");
}

#[test]
fn pose_reconstruction_looks_at_the_target() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::new(5.0, 7.0));
    controller.update_immediate(&mut camera);

    // The camera's look direction passes through the target plane point
    let direction = (camera.target() - camera.position()).normalize();
    let to_plane = Vec3::new(5.0, 7.0, 0.0) - camera.position();
    assert!(direction.dot(to_plane.normalize()) > 0.999);

    // Up and direction stay orthonormal
    assert!(camera.up().dot(direction).abs() < 1e-3);
}

// ============================================================================
// Smoothing integration
// ============================================================================

#[test]
fn update_converges_distance_to_the_zoom_target() {
    let mut camera = make_camera();
    let mut controller = RtsCameraController::new(&mut camera, Vec2::ZERO);
    controller
        .set_distance_property(&mut camera, zoom_property(&[(0.0, 10.0), (1.0, 1000.0)], 0.4));
    controller.update_immediate(&mut camera);

    controller.set_zoom_level(&mut camera, 1.0);
    // Before updating, the smoothed value still lags
    assert!(controller.distance() < 1000.0);

    for _ in 0..100 {
        controller.update(&mut camera, 0.05);
    }
    assert!((controller.distance() - 1000.0).abs() < 10.0);
}

// ============================================================================
// Rendering camera memoization
// ============================================================================

#[test]
fn camera_matrices_update_after_every_setter() {
    let mut camera = make_camera();
    let initial = camera.matrices();

    // Memoized: identical without changes
    let again = camera.matrices();
    assert_eq!(initial.view_proj, again.view_proj);

    camera.set_fov(1.0);
    assert_ne!(camera.matrices().projection, initial.projection);

    let before_move = camera.matrices();
    camera.set_position(Vec3::new(0.0, 0.0, 500.0));
    assert_ne!(camera.matrices().view, before_move.view);
    assert_eq!(camera.matrices().projection, before_move.projection);
}

#[test]
fn orthographic_projection_uses_width() {
    let mut camera = make_camera();
    camera.set_kind(CameraKind::Orthographic);
    camera.set_width(100.0);
    let narrow = camera.matrices().projection;
    camera.set_width(200.0);
    let wide = camera.matrices().projection;
    assert_ne!(narrow, wide);
}
