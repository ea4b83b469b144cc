use crate::easing::Easing;

/// Duration, curve and delay of a tween.
///
/// Also the value of an element's `transition` style, which the fade
/// controller saves and restores as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub duration_millis: u64,
    pub easing: Easing,
    pub delay_millis: u64,
}

impl AnimationSpec {
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
            delay_millis: 0,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::Linear)
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = delay_millis;
        self
    }

    /// Linear progress `elapsed_nanos` after the tween was started, or
    /// `None` while the delay is still running. Zero-length tweens jump
    /// straight to `1.0`.
    pub fn progress(&self, elapsed_nanos: u64) -> Option<f32> {
        let running = elapsed_nanos.checked_sub(self.delay_millis * 1_000_000)?;
        if self.duration_millis == 0 {
            return Some(1.0);
        }
        let duration = (self.duration_millis * 1_000_000) as f64;
        Some((running as f64 / duration).min(1.0) as f32)
    }
}

impl Default for AnimationSpec {
    /// `300ms ease`
    fn default() -> Self {
        Self::tween(300, Easing::Ease)
    }
}
