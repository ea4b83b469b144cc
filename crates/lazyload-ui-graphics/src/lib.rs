//! Pure geometry for Lazyload.
//!
//! Element bounds, viewport rectangles, observer root margins and the
//! intersection-ratio calculation the visibility detector relies on.

mod geometry;

pub use geometry::{EdgeInsets, Rect};
