//! Lazy image loading for a retained element document.
//!
//! Elements display a placeholder until they scroll into view; their real
//! source is then fetched and cross-faded in, or the placeholder is kept if
//! the fetch fails.

mod config;
mod directive;
mod document;
mod lazy_images;
pub mod registry;
mod transition;

pub use config::LazyImageConfig;
pub use directive::ElementDirective;
pub use document::{Document, ElementNode, Style};
pub use lazy_images::{current_lazy_images, lazy_images_or_init, LazyImages};
pub use registry::{ElementRegistry, LoadState, WatchedElement};
pub use transition::FadeTransition;

pub use lazyload_animation::{AnimationSpec, Easing};
pub use lazyload_assets::{FetchError, FetchRequest, FetchResponder, ImageTransport};
pub use lazyload_core::ElementId;
pub use lazyload_foundation::ObserverConfig;
pub use lazyload_ui_graphics::{EdgeInsets, Rect};

pub mod prelude {
    pub use crate::{
        current_lazy_images, Document, ElementDirective, ElementId, LazyImageConfig, LazyImages,
        LoadState,
    };
}
