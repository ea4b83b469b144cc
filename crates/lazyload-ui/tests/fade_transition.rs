use lazyload_testing::prelude::*;
use lazyload_ui::{AnimationSpec, Easing, FadeTransition, Style};

const PLACEHOLDER: &str = "/ph.png";

fn loaded_and_resolved(rule: &LazyTestRule, source: &str) -> ElementId {
    let id = rule.attach_visible(PLACEHOLDER, source);
    rule.pump_until_idle();
    rule.resolve(source);
    id
}

#[test]
fn success_commits_source_after_fade_out() {
    let mut rule = LazyTestRule::new();
    let id = loaded_and_resolved(&rule, "/a.jpg");

    // State is decided before the fade starts.
    assert_eq!(rule.state(id), LoadState::Success);
    assert_eq!(rule.marker(id), Some(LoadState::Success));
    assert!(!rule.is_watched(id));
    assert_eq!(rule.src(id).as_deref(), Some(PLACEHOLDER));
    assert_eq!(
        rule.style(id).and_then(|style| style.transition),
        Some(AnimationSpec::tween(300, Easing::Ease))
    );

    // First frame pins the start time; the fade-out then takes 300 ms.
    rule.advance_frame();
    assert_eq!(rule.style(id).and_then(|style| style.opacity), Some(1.0));
    rule.advance_time(150);
    let mid = rule.style(id).and_then(|style| style.opacity).unwrap_or(1.0);
    assert!(mid > 0.0 && mid < 1.0, "mid-fade opacity {mid}");
    assert_eq!(rule.src(id).as_deref(), Some(PLACEHOLDER));

    rule.advance_time(154);
    assert_eq!(rule.src(id).as_deref(), Some("/a.jpg"));
    assert_eq!(rule.style(id).and_then(|style| style.opacity), Some(0.0));

    rule.run_animations();
    assert_eq!(rule.src(id).as_deref(), Some("/a.jpg"));
    assert_eq!(rule.style(id), Some(Style::default()));
    assert_eq!(rule.state(id), LoadState::Success);
}

#[test]
fn fade_restores_authored_transition() {
    let mut rule = LazyTestRule::new();
    let id = rule.attach_visible(PLACEHOLDER, "/a.jpg");
    let authored = AnimationSpec::linear(1_000).with_delay(50);
    rule.document()
        .update_style(id, |style| style.transition = Some(authored));
    rule.pump_until_idle();
    rule.resolve("/a.jpg");
    assert_ne!(rule.style(id).and_then(|style| style.transition), Some(authored));

    rule.run_animations();
    assert_eq!(
        rule.style(id),
        Some(Style {
            opacity: None,
            transition: Some(authored),
        })
    );
}

#[test]
fn overlapping_fades_share_opacity_and_restore_authored_transition() {
    let mut rule = LazyTestRule::new();
    let id = rule.attach_visible(PLACEHOLDER, "/a.jpg");
    let authored = AnimationSpec::linear(1_000).with_delay(50);
    rule.document()
        .update_style(id, |style| style.transition = Some(authored));
    rule.pump_until_idle();
    rule.resolve("/a.jpg");

    rule.advance_frame();
    rule.advance_time(100);
    let opacity_at_switch = rule.style(id).and_then(|style| style.opacity);
    assert!(opacity_at_switch.is_some_and(|value| value > 0.0 && value < 1.0));

    rule.set_source(id, "/b.jpg");
    rule.pump_until_idle();
    assert_eq!(rule.state(id), LoadState::Loading);
    assert!(rule.resolve("/b.jpg"));
    assert_eq!(rule.state(id), LoadState::Success);

    // The second fade continues from the current opacity instead of
    // starting a competing animation at 1.0.
    rule.advance_frame();
    assert_eq!(rule.style(id).and_then(|style| style.opacity), opacity_at_switch);
    rule.advance_frame();
    let next = rule.style(id).and_then(|style| style.opacity);
    assert!(next < opacity_at_switch, "{next:?} after {opacity_at_switch:?}");
    assert_eq!(rule.src(id).as_deref(), Some(PLACEHOLDER));

    rule.run_animations();
    assert_eq!(rule.src(id).as_deref(), Some("/b.jpg"));
    assert_eq!(
        rule.style(id),
        Some(Style {
            opacity: None,
            transition: Some(authored),
        })
    );
    assert_eq!(rule.transport().requested(), vec!["/a.jpg", "/b.jpg"]);
    assert_eq!(rule.runtime_handle().pending_task_count(), 0);
}

#[test]
fn custom_fade_spec_is_used() {
    let config = LazyImageConfig::default().with_fade(AnimationSpec::linear(100));
    let mut rule = LazyTestRule::with_config(config);
    let id = loaded_and_resolved(&rule, "/a.jpg");

    rule.advance_frame();
    rule.advance_time(100);
    assert_eq!(rule.src(id).as_deref(), Some("/a.jpg"));
}

#[test]
fn detach_during_fade_is_silent() {
    let mut rule = LazyTestRule::new();
    let id = loaded_and_resolved(&rule, "/a.jpg");
    rule.advance_frame();
    rule.advance_time(100);

    rule.detach(id);
    rule.run_animations();

    assert_eq!(rule.src(id), None);
    assert_eq!(rule.state(id), LoadState::Unregistered);
    assert_eq!(rule.runtime_handle().pending_task_count(), 0);
}

#[test]
fn newer_commit_wins_over_finishing_fade() {
    let mut rule = LazyTestRule::new();
    let id = loaded_and_resolved(&rule, "/a.jpg");
    rule.advance_frame();

    // A cached source lands while the fade for A is still running.
    rule.transport().mark_cached("/b.jpg");
    rule.set_source(id, "/b.jpg");
    rule.pump_until_idle();
    assert_eq!(rule.src(id).as_deref(), Some("/b.jpg"));

    rule.run_animations();
    assert_eq!(rule.src(id).as_deref(), Some("/b.jpg"));
    assert_eq!(rule.state(id), LoadState::Success);
}

#[test]
fn fade_is_skipped_for_removed_element() {
    let rule = LazyTestRule::new();
    let fade = FadeTransition::new(rule.runtime_handle(), rule.document().clone());
    let id = rule.document().create_image(PLACEHOLDER);
    rule.document().remove(id);

    let mut done = fade.run(id);
    assert_eq!(done.try_take(), Some(()));
    assert!(!rule.runtime_handle().has_frame_callbacks());
}
