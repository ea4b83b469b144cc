//! Visibility detection for Lazyload.
//!
//! An intersection observer rooted at the document viewport. The host feeds
//! it the viewport rectangle after every scroll or layout change; it answers
//! with the watched elements whose visibility crossed a threshold and, among
//! those, the ones that should start loading.

mod visibility;

pub use visibility::{
    ActivationBatch, IntersectionEntry, ObserverConfig, VisibilityDetector,
    DEFAULT_ACTIVATION_RATIO, DEFAULT_THRESHOLDS,
};
