//! Core runtime for Lazyload.
//!
//! Everything the lazy-loading engine does runs on one UI thread: visibility
//! batches, state transitions, fetch continuations and fade frames. This crate
//! provides the cooperative executor that interleaves them, plus the small
//! shared-state and signalling types the other crates build on.

mod collections;
mod completion;
mod frame_clock;
mod owned;
mod platform;
mod runtime;

pub use collections::map;
pub use completion::{completion, Completer, Completion};
pub use frame_clock::{FrameCallbackRegistration, FrameClock};
pub use owned::Owned;
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle, UiDispatcher};

pub type FrameCallbackId = u64;

/// Identity of an image element, assigned by the host document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
