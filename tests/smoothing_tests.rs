//! Smoothed Value Tests
//!
//! Tests for the critically-damped tracker: convergence toward a constant
//! target, snap behavior at tiny smooth times, and immediate updates.

use auriga::math::Smoothed;

#[test]
fn converges_to_within_one_percent_after_five_smooth_times() {
    for smooth_time in [0.05, 0.1, 0.5, 1.0] {
        let mut value = Smoothed::new(0.0, smooth_time);
        value.set_target(100.0);

        let dt = smooth_time / 2.0;
        let steps = (5.0 * smooth_time / dt).ceil() as usize;
        for _ in 0..steps {
            value.update(dt);
        }
        assert!(
            (value.value() - 100.0).abs() < 1.0,
            "smooth_time {smooth_time}: value {} after {steps} steps",
            value.value()
        );
    }
}

#[test]
fn convergence_has_no_overshoot_blowup() {
    let mut value = Smoothed::new(0.0, 0.2);
    value.set_target(1.0);
    let mut previous = 0.0;
    for _ in 0..200 {
        value.update(0.016);
        assert!(value.value() <= 1.05, "value overshot: {}", value.value());
        assert!(value.value() >= previous - 0.05);
        previous = value.value();
    }
}

#[test]
fn tiny_smooth_time_snaps_on_assignment() {
    let mut value = Smoothed::new(5.0, 0.0005);
    value.set_target(42.0);
    assert_eq!(value.value(), 42.0);
    assert_eq!(value.target(), 42.0);
}

#[test]
fn reducing_smooth_time_below_minimum_snaps_to_target() {
    let mut value = Smoothed::new(0.0, 1.0);
    value.set_target(10.0);
    value.update(0.1);
    assert!(value.value() < 10.0);

    value.set_smooth_time(0.0);
    assert_eq!(value.value(), 10.0);
}

#[test]
fn update_immediate_snaps_and_clears_velocity() {
    let mut value = Smoothed::new(0.0, 1.0);
    value.set_target(10.0);
    value.update(0.25);
    value.update_immediate();
    assert_eq!(value.value(), 10.0);

    // No residual velocity: further updates stay put
    value.update(1.0);
    assert_eq!(value.value(), 10.0);
}

#[test]
fn set_immediate_overrides_current_and_target() {
    let mut value = Smoothed::new(0.0, 1.0);
    value.set_target(10.0);
    value.set_immediate(3.0);
    assert_eq!(value.value(), 3.0);
    assert_eq!(value.target(), 3.0);
    value.update(1.0);
    assert_eq!(value.value(), 3.0);
}
