use super::*;

use lazyload_core::{DefaultScheduler, Runtime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

const FRAME_NANOS: u64 = 16_666_667; // ~60 FPS

fn runtime() -> Runtime {
    Runtime::new(Arc::new(DefaultScheduler))
}

#[test]
fn easing_curves_hit_endpoints() {
    for easing in [
        Easing::Linear,
        Easing::Ease,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::CubicBezier(0.1, 0.7, 1.0, 0.1),
    ] {
        assert_eq!(easing.transform(0.0), 0.0, "{easing:?} at 0");
        assert_eq!(easing.transform(1.0), 1.0, "{easing:?} at 1");
    }
}

#[test]
fn ease_is_ahead_of_linear_midway() {
    let eased = Easing::Ease.transform(0.5);
    assert!(eased > 0.5 && eased < 1.0, "ease(0.5) = {eased}");
}

#[test]
fn default_spec_is_300ms_ease() {
    let spec = AnimationSpec::default();
    assert_eq!(spec.duration_millis, 300);
    assert_eq!(spec.easing, Easing::Ease);
    assert_eq!(spec.delay_millis, 0);
}

#[test]
fn animate_to_interpolates_over_frames_and_signals_end() {
    let runtime = runtime();
    let handle = runtime.handle();
    let opacity = Animatable::new(1.0f32, handle.clone());
    let samples = Rc::new(RefCell::new(Vec::new()));
    {
        let samples = Rc::clone(&samples);
        opacity.on_value(move |value| samples.borrow_mut().push(*value));
    }

    let mut finished = opacity.animate_to(0.0, AnimationSpec::linear(100));
    assert!(opacity.is_running());

    let mut frame_time = 0u64;
    for _ in 0..32 {
        if !opacity.is_running() {
            break;
        }
        frame_time += FRAME_NANOS;
        handle.drain_frame_callbacks(frame_time);
    }

    let samples = samples.borrow();
    assert_eq!(samples.first().copied(), Some(1.0));
    assert_eq!(samples.last().copied(), Some(0.0));
    assert!(samples.iter().any(|value| *value > 0.0 && *value < 1.0));
    assert!(samples.windows(2).all(|pair| pair[1] <= pair[0]));
    assert_eq!(finished.try_take(), Some(true));
    assert_eq!(opacity.value(), 0.0);
}

#[test]
fn delay_holds_start_value() {
    let runtime = runtime();
    let handle = runtime.handle();
    let value = Animatable::new(0.0f32, handle.clone());
    let _finished = value.animate_to(1.0, AnimationSpec::linear(50).with_delay(100));

    handle.drain_frame_callbacks(FRAME_NANOS);
    handle.drain_frame_callbacks(FRAME_NANOS * 3);
    assert_eq!(value.value(), 0.0);
    assert!(value.is_running());
}

#[test]
fn retargeting_reports_false_and_starts_from_current_value() {
    let runtime = runtime();
    let handle = runtime.handle();
    let value = Animatable::new(0.0f32, handle.clone());
    let mut first = value.animate_to(1.0, AnimationSpec::linear(100));
    handle.drain_frame_callbacks(FRAME_NANOS);
    handle.drain_frame_callbacks(FRAME_NANOS + 50_000_000);
    let midway = value.value();
    assert!((midway - 0.5).abs() < 1e-3, "midway = {midway}");

    let mut second = value.clone().animate_to(0.0, AnimationSpec::linear(100));
    assert_eq!(first.try_take(), Some(false));
    assert_eq!(second.try_take(), None);

    handle.drain_frame_callbacks(FRAME_NANOS * 10);
    assert_eq!(value.value(), midway);
    handle.drain_frame_callbacks(FRAME_NANOS * 10 + 100_000_000);
    assert_eq!(value.value(), 0.0);
    assert_eq!(second.try_take(), Some(true));
    assert!(!value.is_running());
}

#[test]
fn progress_waits_out_the_delay() {
    let spec = AnimationSpec::linear(100).with_delay(50);
    assert_eq!(spec.progress(0), None);
    assert_eq!(spec.progress(49_999_999), None);
    assert_eq!(spec.progress(50_000_000), Some(0.0));
    assert_eq!(spec.progress(100_000_000), Some(0.5));
    assert_eq!(spec.progress(400_000_000), Some(1.0));
    assert_eq!(AnimationSpec::linear(0).progress(0), Some(1.0));
}

#[test]
fn zero_duration_finishes_on_first_frame() {
    let runtime = runtime();
    let handle = runtime.handle();
    let value = Animatable::new(0.0f32, handle.clone());
    let notified = Rc::new(Cell::new(0));
    {
        let notified = Rc::clone(&notified);
        value.on_value(move |_| notified.set(notified.get() + 1));
    }
    let mut finished = value.animate_to(1.0, AnimationSpec::linear(0));
    handle.drain_frame_callbacks(FRAME_NANOS);
    assert_eq!(value.value(), 1.0);
    assert_eq!(notified.get(), 1);
    assert_eq!(finished.try_take(), Some(true));
}
