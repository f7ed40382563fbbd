use crate::*;

use escalator::{
    CellRef, CellRenderer, Column, Grid, GridOptions, RenderError, ScrollDestination, Viewport,
};
use std::vec::Vec;

struct NullRenderer;

impl CellRenderer<u32> for NullRenderer {
    fn render(&mut self, _cell: CellRef, _row: &u32) -> Result<(), RenderError> {
        Ok(())
    }
}

fn controller(rows: u32) -> Controller<Vec<u32>, NullRenderer> {
    let options = GridOptions::new(Viewport {
        width: 400.0,
        height: 400,
    })
    .with_default_row_height(20);
    Controller::new(Grid::new((0..rows).collect(), NullRenderer, options))
}

fn extent(top: f64, max_top: f64) -> ScrollExtent {
    ScrollExtent {
        top,
        left: 0.0,
        max_top,
        max_left: 0.0,
    }
}

fn expected_offset(velocity: f64, acceleration: f64) -> f64 {
    let ease = 0.5 - 0.5 * (core::f64::consts::PI * velocity.abs().min(4.0) / 4.0).cos();
    1500.0 * velocity * acceleration * ease
}

/// A vertical flick from `top`: two samples at 2 px/ms.
fn flick(touch: &mut TouchInertiaController, start_ms: u64, top: f64, max_top: f64) -> Option<Deceleration> {
    touch.touch_start(1, TouchPoint::new(200.0, 500.0, start_ms), extent(top, max_top));
    touch.touch_move(1, true, TouchPoint::new(200.0, 480.0, start_ms + 10), extent(top, max_top));
    touch.touch_move(1, true, TouchPoint::new(200.0, 460.0, start_ms + 20), extent(top + 20.0, max_top));
    touch.touch_end(start_ms + 20, extent(top + 40.0, max_top))
}

/// Runs a whole gesture through a fresh controller and records the vertical offset per frame.
fn gesture_trajectory() -> Vec<u64> {
    let mut c = controller(10_000);
    c.grid_mut().set_scroll_top(1000);

    assert!(!c.on_touch_start(1, TouchPoint::new(200.0, 500.0, 0)));
    assert!(c.on_touch_move(1, true, TouchPoint::new(200.0, 480.0, 10)));
    assert!(c.on_touch_move(1, true, TouchPoint::new(200.0, 460.0, 20)));
    assert_eq!(c.grid().scroll_top(), 1040);
    assert!(c.on_touch_end(20).is_some());

    let mut trajectory = Vec::new();
    let mut now_ms = 20;
    while c.is_animating() {
        now_ms += 16;
        if let Some(top) = c.tick(now_ms) {
            trajectory.push(top);
        }
        assert!(now_ms < 10_000, "deceleration never finished");
    }
    trajectory
}

#[test]
fn controller_tween_drives_scroll_top() {
    let mut c = controller(10_000);
    let to = c.start_tween_to_offset(5000, 0, 100, Easing::SmoothStep);
    assert_eq!(to, 5000);
    assert!(c.is_animating());

    let mut last = 0u64;
    for now_ms in [0u64, 10, 20, 40, 80, 100, 120] {
        if let Some(off) = c.tick(now_ms) {
            assert!(off >= last);
            last = off;
        }
    }
    assert!(!c.is_animating());
    assert_eq!(c.grid().scroll_top(), 5000);
    assert!(c.grid().escalator().visible_row_range().contains(250));
}

#[test]
fn tween_targets_are_clamped() {
    let mut c = controller(10_000);
    assert_eq!(c.grid().scroll().max_scroll_top(), 199_600);
    assert_eq!(c.start_tween_to_offset(u64::MAX, 0, 100, Easing::Linear), 199_600);
    assert_eq!(
        c.start_tween_to_row(9_999, ScrollDestination::End, 0, 0, 100, Easing::Linear)
            .unwrap(),
        199_600
    );
    assert!(
        c.start_tween_to_row(10_000, ScrollDestination::Start, 0, 0, 100, Easing::Linear)
            .is_err()
    );
}

#[test]
fn native_scroll_cancels_tween() {
    let mut c = controller(10_000);
    c.start_tween_to_offset(5000, 0, 100, Easing::Linear);
    c.tick(50);
    assert_eq!(c.grid().scroll_top(), 2500);

    let outcome = c.on_scroll(300, 0.0, 60);
    assert!(outcome.scrolled);
    assert!(!c.is_animating());
    assert_eq!(c.tick(70), None);
    assert_eq!(c.grid().scroll_top(), 300);
}

#[test]
fn scroll_to_row_applies_immediately() {
    let mut c = controller(10_000);
    assert_eq!(c.scroll_to_row(500, ScrollDestination::Start, 0, 0).unwrap(), 10_000);
    assert!(c.grid().is_scrolling());
    c.tick(1000);
    assert!(!c.grid().is_scrolling());
}

#[test]
fn tween_sample_reaches_target_exactly() {
    let tween = Tween::vertical(10, 1000, 100, 0, Easing::EaseOutCubic).with_left(0.0, 300.0);
    assert_eq!(tween.duration_ms, 1);
    assert_eq!(tween.sample(100), (10, 0.0));
    assert_eq!(tween.sample(101), (1000, 300.0));
    assert_eq!(tween.remaining_ms(100), 1);
    assert_eq!(tween.remaining_ms(500), 0);

    // Offsets far beyond single precision stay exact.
    let long = Tween::vertical(0, 100_000_000, 0, 100, Easing::Linear);
    assert_eq!(long.sample(50).0, 50_000_000);
    assert_eq!(long.sample(25).0, 25_000_000);

    for easing in [
        Easing::Linear,
        Easing::SmoothStep,
        Easing::EaseInOutCubic,
        Easing::EaseOutCubic,
    ] {
        assert_eq!(easing.sample(0.0), 0.0);
        assert_eq!(easing.sample(1.0), 1.0);
    }
}

#[test]
fn cell_tween_moves_both_axes_together() {
    let mut c = controller(10_000);
    for i in 0..10 {
        c.grid_mut()
            .add_column(Column::new(format!("c{i}")).with_width(200.0));
    }
    c.grid_mut().end_of_turn();
    assert_eq!(c.grid().scroll().max_scroll_left(), 1600.0);

    let target = c
        .start_tween_to_cell(500, 9, ScrollDestination::Start, 0, 0, 100, Easing::Linear)
        .unwrap();
    assert_eq!(target, (10_000, 1600.0));
    c.tick(50);
    assert_eq!(c.grid().scroll_top(), 5000);
    assert_eq!(c.grid().scroll_left(), 800.0);
    c.tick(100);
    assert_eq!((c.grid().scroll_top(), c.grid().scroll_left()), target);
    assert!(!c.is_animating());

    assert!(
        c.start_tween_to_cell(0, 10, ScrollDestination::Start, 0, 200, 100, Easing::Linear)
            .is_err()
    );
    assert!(!c.is_animating());
}

#[test]
fn flick_deceleration_is_deterministic() {
    let first = gesture_trajectory();
    let second = gesture_trajectory();
    assert_eq!(first, second);

    assert!(first.windows(2).all(|w| w[0] <= w[1]));
    assert!(first[0] > 1040);
    assert_eq!(first.last().copied(), Some(2540));
}

#[test]
fn release_velocity_maps_to_throw_distance_and_duration() {
    let mut touch = TouchInertiaController::default();
    let run = flick(&mut touch, 0, 1000.0, 100_000.0).unwrap();

    assert_eq!(touch.phase(), TouchPhase::Decelerating);
    assert_eq!(run.start_ms, 20);
    assert_eq!(run.offset_left, 0.0);
    assert!((run.offset_top - expected_offset(2.0, 1.0)).abs() < 1e-9);
    assert!((run.offset_top - 1500.0).abs() < 1e-6);

    let duration = 3.0 * 600.0 * (1.0 - 2f64.powf(-run.offset_top / 1000.0));
    assert!((run.duration_ms - duration).abs() < 1e-9);

    let end = touch.step(20 + run.duration_ms as u64 + 1).unwrap();
    assert!((end.top.unwrap() - (1040.0 + run.offset_top)).abs() < 1e-9);
    assert_eq!(end.left, None);
    assert_eq!(touch.phase(), TouchPhase::Idle);
    assert_eq!(touch.step(5000), None);
}

#[test]
fn only_the_terminal_flick_counts() {
    let mut touch = TouchInertiaController::default();
    let e = extent(1000.0, 100_000.0);
    touch.touch_start(1, TouchPoint::new(0.0, 500.0, 0), e);
    // Slow drag first, then a fast flick.
    touch.touch_move(1, true, TouchPoint::new(0.0, 495.0, 10), e);
    touch.touch_move(1, true, TouchPoint::new(0.0, 490.0, 20), e);
    touch.touch_move(1, true, TouchPoint::new(0.0, 460.0, 30), e);
    touch.touch_move(1, true, TouchPoint::new(0.0, 430.0, 40), e);
    let run = touch.touch_end(40, e).unwrap();
    assert!((run.offset_top - expected_offset(3.0, 1.0)).abs() < 1e-9);
}

#[test]
fn slow_release_does_not_decelerate() {
    let mut touch = TouchInertiaController::default();
    let e = extent(1000.0, 100_000.0);
    touch.touch_start(1, TouchPoint::new(0.0, 500.0, 0), e);
    let moved = touch.touch_move(1, true, TouchPoint::new(0.0, 495.0, 10), e).unwrap();
    assert_eq!(moved.top, Some(1005.0));
    touch.touch_move(1, true, TouchPoint::new(0.0, 490.0, 20), extent(1005.0, 100_000.0));

    assert_eq!(touch.touch_end(20, extent(1010.0, 100_000.0)), None);
    assert_eq!(touch.phase(), TouchPhase::Idle);
    assert_eq!(touch.step(100), None);
}

#[test]
fn dominant_axis_scrolls_alone() {
    let mut touch = TouchInertiaController::default();
    let e = ScrollExtent {
        top: 1000.0,
        left: 100.0,
        max_top: 100_000.0,
        max_left: 1000.0,
    };

    touch.touch_start(1, TouchPoint::new(200.0, 500.0, 0), e);
    let vertical = touch.touch_move(1, true, TouchPoint::new(195.0, 480.0, 10), e).unwrap();
    assert_eq!(vertical.top, Some(1020.0));
    assert_eq!(vertical.left, None);

    touch.touch_start(1, TouchPoint::new(200.0, 500.0, 100), e);
    let horizontal = touch.touch_move(1, true, TouchPoint::new(180.0, 495.0, 110), e).unwrap();
    assert_eq!(horizontal.top, None);
    assert_eq!(horizontal.left, Some(120.0));
}

#[test]
fn deceleration_stops_at_the_edge() {
    let mut touch = TouchInertiaController::default();
    let run = flick(&mut touch, 0, 1000.0, 1500.0).unwrap();

    let half = 20 + (run.duration_ms / 2.0) as u64;
    let frame = touch.step(half).unwrap();
    assert_eq!(frame.top, Some(1500.0));
    assert_eq!(touch.phase(), TouchPhase::Idle);
    assert_eq!(touch.step(half + 16), None);
}

#[test]
fn interrupting_touch_compounds_acceleration() {
    let mut touch = TouchInertiaController::default();
    let first = flick(&mut touch, 0, 1000.0, 100_000.0).unwrap();
    touch.step(100);

    assert!(touch.touch_start(1, TouchPoint::new(0.0, 500.0, 120), extent(1500.0, 100_000.0)));
    assert_eq!(touch.phase(), TouchPhase::Tracking);
    assert_eq!(touch.deceleration(), None);
    assert!((touch.acceleration() - 1.7).abs() < 1e-9);
    touch.touch_end(120, extent(1500.0, 100_000.0));

    // The gesture above completed without a throw, so the next one starts from scratch.
    let second = flick(&mut touch, 200, 1500.0, 100_000.0).unwrap();
    assert_eq!(touch.acceleration(), 1.0);
    assert!((second.offset_top - first.offset_top).abs() < 1e-9);

    let mut touch = TouchInertiaController::default();
    flick(&mut touch, 0, 1000.0, 100_000.0).unwrap();
    let mut start = 100;
    for _ in 0..10 {
        let e = extent(1000.0, 100_000.0);
        assert!(touch.touch_start(1, TouchPoint::new(0.0, 500.0, start), e));
        touch.touch_move(1, true, TouchPoint::new(0.0, 480.0, start + 10), e);
        touch.touch_move(1, true, TouchPoint::new(0.0, 460.0, start + 20), extent(1020.0, 100_000.0));
        touch.touch_end(start + 20, extent(1040.0, 100_000.0)).unwrap();
        start += 100;
    }
    assert_eq!(touch.acceleration(), touch.config().max_acceleration);
    let run = touch.deceleration().unwrap();
    assert!((run.offset_top - first.offset_top * 5.0).abs() < 1e-6);
}

#[test]
fn completed_deceleration_resets_acceleration() {
    let mut touch = TouchInertiaController::default();
    let first = flick(&mut touch, 0, 1000.0, 100_000.0).unwrap();

    // Interrupt and throw again: this run is accelerated.
    let boosted = flick(&mut touch, 100, 1000.0, 100_000.0).unwrap();
    assert!((touch.acceleration() - 1.7).abs() < 1e-9);
    assert!((boosted.offset_top - first.offset_top * 1.7).abs() < 1e-6);

    let end_ms = boosted.start_ms + boosted.duration_ms as u64 + 1;
    assert!(touch.step(end_ms).is_some());
    assert_eq!(touch.phase(), TouchPhase::Idle);
    assert_eq!(touch.acceleration(), 1.0);

    let later = flick(&mut touch, end_ms + 500, 1000.0, 100_000.0).unwrap();
    assert!((later.offset_top - first.offset_top).abs() < 1e-9);

    // Cancelling a run drops its acceleration too.
    flick(&mut touch, end_ms + 600, 1000.0, 100_000.0).unwrap();
    touch.cancel();
    assert_eq!(touch.acceleration(), 1.0);
}

#[test]
fn multi_finger_and_non_cancelable_moves_abort() {
    let mut touch = TouchInertiaController::default();
    let e = extent(1000.0, 100_000.0);

    assert!(!touch.touch_start(2, TouchPoint::new(0.0, 500.0, 0), e));
    assert_eq!(touch.phase(), TouchPhase::Idle);
    assert_eq!(touch.touch_move(1, true, TouchPoint::new(0.0, 480.0, 10), e), None);

    touch.touch_start(1, TouchPoint::new(0.0, 500.0, 20), e);
    assert_eq!(touch.touch_move(2, true, TouchPoint::new(0.0, 480.0, 30), e), None);
    assert_eq!(touch.phase(), TouchPhase::Idle);
    assert_eq!(touch.touch_end(30, e), None);

    touch.touch_start(1, TouchPoint::new(0.0, 500.0, 40), e);
    assert_eq!(touch.touch_move(1, false, TouchPoint::new(0.0, 480.0, 50), e), None);
    assert_eq!(touch.phase(), TouchPhase::Idle);
}

#[test]
fn touch_start_leaves_scroll_at_last_applied_position() {
    let mut c = controller(10_000);
    c.grid_mut().set_scroll_top(1000);
    c.on_touch_start(1, TouchPoint::new(200.0, 500.0, 0));
    c.on_touch_move(1, true, TouchPoint::new(200.0, 480.0, 10));
    c.on_touch_move(1, true, TouchPoint::new(200.0, 460.0, 20));
    c.on_touch_end(20).unwrap();

    let mid = c.tick(200).unwrap();
    assert!(mid > 1040 && mid < 2540);

    assert!(c.on_touch_start(1, TouchPoint::new(200.0, 500.0, 210)));
    assert!(!c.is_animating());
    assert_eq!(c.tick(300), None);
    assert_eq!(c.grid().scroll_top(), mid);
}

#[test]
fn circular_ease_covers_the_unit_interval() {
    assert_eq!(crate::touch::ease_out_circ(0.0), 0.0);
    assert_eq!(crate::touch::ease_out_circ(1.0), 1.0);
    assert!(crate::touch::ease_out_circ(0.5) > 0.5);
}
