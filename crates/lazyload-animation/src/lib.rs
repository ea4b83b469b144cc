//! Animation system for Lazyload.
//!
//! Time-based tweens driven by the runtime's frame clock. The fade transition
//! uses [`Animatable`] to move opacity and awaits [`Animatable::animate_to`]
//! as its transition-finished signal.

mod animatable;
mod easing;
mod spec;

pub use animatable::{Animatable, Lerp};
pub use easing::Easing;
pub use spec::AnimationSpec;

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
