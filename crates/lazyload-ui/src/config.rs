use std::num::NonZeroUsize;

use lazyload_animation::AnimationSpec;
use lazyload_foundation::ObserverConfig;
use lazyload_ui_graphics::EdgeInsets;

const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Configuration of a [`LazyImages`](crate::LazyImages) service.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyImageConfig {
    pub observer: ObserverConfig,
    /// Spec of each half of the cross-fade.
    pub fade: AnimationSpec,
    /// Number of loaded sources remembered as cache hits.
    pub cache_capacity: NonZeroUsize,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            observer: ObserverConfig::default(),
            fade: AnimationSpec::default(),
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl LazyImageConfig {
    pub fn with_observer(mut self, observer: ObserverConfig) -> Self {
        self.observer = observer;
        self
    }

    /// Starts loading elements within `margin` of the viewport.
    pub fn with_root_margin(mut self, margin: EdgeInsets) -> Self {
        self.observer = self.observer.with_root_margin(margin);
        self
    }

    pub fn with_fade(mut self, fade: AnimationSpec) -> Self {
        self.fade = fade;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
