//! The lazy image service: wires the detector, registry, fetch coordinator
//! and fade together behind the [`ElementDirective`] hooks.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lazyload_assets::{FetchCoordinator, FetchOutcome, ImageTransport};
use lazyload_core::{Completion, ElementId, RuntimeHandle};
use lazyload_foundation::VisibilityDetector;
use lazyload_ui_graphics::Rect;

use crate::registry::{ElementRegistry, Settlement, SourceUpdate};
use crate::{Document, ElementDirective, FadeTransition, LazyImageConfig, LoadState};

thread_local! {
    /// Service shared by every lazily loaded element on this thread.
    static INSTALLED: RefCell<Option<LazyImages>> = const { RefCell::new(None) };
}

/// Returns the service installed on this thread, if any.
pub fn current_lazy_images() -> Option<LazyImages> {
    INSTALLED.with(|installed| installed.borrow().clone())
}

/// Returns the installed service, installing the one built by `init` first
/// if there is none.
pub fn lazy_images_or_init(init: impl FnOnce() -> LazyImages) -> LazyImages {
    if let Some(existing) = current_lazy_images() {
        return existing;
    }
    let service = init();
    service.install();
    service
}

struct LazyImagesInner {
    config: LazyImageConfig,
    runtime: RuntimeHandle,
    document: Document,
    detector: RefCell<VisibilityDetector>,
    registry: RefCell<ElementRegistry>,
    fetcher: FetchCoordinator,
    fade: FadeTransition,
    observation_scheduled: Cell<bool>,
}

/// Lazy image loading for one document.
///
/// Cheap to clone; clones share state. All methods must be called on the
/// runtime's UI thread.
#[derive(Clone)]
pub struct LazyImages {
    inner: Rc<LazyImagesInner>,
}

impl LazyImages {
    pub fn new(
        config: LazyImageConfig,
        runtime: RuntimeHandle,
        document: Document,
        transport: Rc<dyn ImageTransport>,
    ) -> Self {
        let fetcher = FetchCoordinator::new(runtime.clone(), transport)
            .with_cache_capacity(config.cache_capacity);
        let fade = FadeTransition::new(runtime.clone(), document.clone()).with_spec(config.fade);
        Self {
            inner: Rc::new(LazyImagesInner {
                detector: RefCell::new(VisibilityDetector::new(config.observer.clone())),
                registry: RefCell::new(ElementRegistry::new()),
                config,
                runtime,
                document,
                fetcher,
                fade,
                observation_scheduled: Cell::new(false),
            }),
        }
    }

    /// Makes this service the one returned by [`current_lazy_images`].
    /// Returns the previously installed service.
    pub fn install(&self) -> Option<LazyImages> {
        INSTALLED.with(|installed| installed.borrow_mut().replace(self.clone()))
    }

    pub fn uninstall() -> Option<LazyImages> {
        INSTALLED.with(|installed| installed.borrow_mut().take())
    }

    pub fn config(&self) -> &LazyImageConfig {
        &self.inner.config
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn fetcher(&self) -> &FetchCoordinator {
        &self.inner.fetcher
    }

    pub fn state(&self, id: ElementId) -> LoadState {
        self.inner.registry.borrow().state(id)
    }

    pub fn is_watched(&self, id: ElementId) -> bool {
        self.inner.detector.borrow().is_watched(id)
    }

    pub fn watched_count(&self) -> usize {
        self.inner.detector.borrow().len()
    }

    pub fn tracked_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    /// Runs an observation pass against `viewport` and activates every
    /// element that became sufficiently visible. Returns the number of
    /// activations.
    pub fn process_visibility(&self, viewport: Rect) -> usize {
        self.inner.document.set_viewport(viewport);
        self.observe()
    }

    /// Observation pass against the document's current viewport.
    pub fn observe(&self) -> usize {
        let Some(viewport) = self.inner.document.viewport() else {
            return 0;
        };
        let document = &self.inner.document;
        let batch = self
            .inner
            .detector
            .borrow_mut()
            .observe(viewport, |id| document.bounds(id));

        let count = batch.activations.len();
        for id in batch.activations {
            self.activate(id);
        }
        count
    }

    /// Queues an observation pass so newly watched elements get their
    /// initial report without waiting for the next scroll.
    fn schedule_observation(&self) {
        if self.inner.observation_scheduled.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        self.inner.runtime.enqueue_ui_task(Box::new(move || {
            if let Some(service) = Self::upgrade(&weak) {
                service.inner.observation_scheduled.set(false);
                service.observe();
            }
        }));
    }

    fn upgrade(weak: &Weak<LazyImagesInner>) -> Option<LazyImages> {
        weak.upgrade().map(|inner| LazyImages { inner })
    }

    fn set_state_marker(&self, id: ElementId, state: LoadState) {
        log::debug!("lazy image {id}: {state}");
        self.inner.document.set_state_marker(id, state);
    }

    fn watch(&self, id: ElementId) {
        self.inner.detector.borrow_mut().watch(id);
        self.schedule_observation();
    }

    fn activate(&self, id: ElementId) {
        let source = self.inner.registry.borrow_mut().begin_loading(id);
        let Some(source) = source else {
            if !self.inner.registry.borrow().contains(id) {
                log::warn!("activation for unknown element {id}");
            }
            return;
        };
        self.set_state_marker(id, LoadState::Loading);

        let mut fetch = self.inner.fetcher.activate(&source);
        if let Some(outcome) = fetch.try_take() {
            self.apply_outcome(id, &source, outcome);
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let spawned = self.inner.runtime.spawn_ui(async move {
            let outcome = fetch.await;
            let fade = match Self::upgrade(&weak) {
                Some(service) => service.apply_outcome(id, &source, outcome),
                None => None,
            };
            if let Some(fade) = fade {
                fade.await;
                if let Some(service) = Self::upgrade(&weak) {
                    service.commit_after_fade(id, &source);
                }
            }
        });
        if !spawned {
            log::warn!("lazy image {id}: runtime is gone, fetch outcome dropped");
        }
    }

    /// Applies a fetch outcome. Returns the fade to await before the source
    /// may be displayed.
    fn apply_outcome(
        &self,
        id: ElementId,
        requested: &str,
        outcome: FetchOutcome,
    ) -> Option<Completion<()>> {
        let settlement = self
            .inner
            .registry
            .borrow_mut()
            .settle(id, requested, &outcome);

        match settlement {
            Settlement::Commit { source, animate } => {
                self.inner.detector.borrow_mut().unwatch(id);
                self.set_state_marker(id, LoadState::Success);
                if animate {
                    return Some(self.inner.fade.run(id));
                }
                self.inner.document.set_src(id, &source);
            }
            Settlement::Revert { placeholder } => {
                self.inner.detector.borrow_mut().unwatch(id);
                self.set_state_marker(id, LoadState::Failed);
                if let Some(placeholder) = placeholder {
                    self.inner.document.set_src(id, &placeholder);
                }
            }
            Settlement::Rearm => {
                log::debug!("lazy image {id}: {requested} settled after its source changed");
                self.set_state_marker(id, LoadState::Pending);
                self.inner.detector.borrow_mut().rewatch(id);
                self.schedule_observation();
            }
            Settlement::Ignore if outcome == FetchOutcome::Abandoned => {
                log::debug!("lazy image {id}: fetch for {requested} abandoned");
            }
            Settlement::Ignore => {
                log::trace!("lazy image {id}: dropping outcome for {requested}");
            }
        }
        None
    }

    fn commit_after_fade(&self, id: ElementId, source: &str) {
        if self.inner.registry.borrow().is_current_success(id, source) {
            self.inner.document.set_src(id, source);
        }
    }
}

impl ElementDirective for LazyImages {
    fn on_create(&self, element: ElementId) {
        let Some(placeholder) = self.inner.document.capture_placeholder(element) else {
            return;
        };
        self.inner
            .registry
            .borrow_mut()
            .capture_placeholder(element, &placeholder);
    }

    fn on_attach(&self, element: ElementId, source: &str) {
        self.on_source_changed(element, source);
    }

    fn on_source_changed(&self, element: ElementId, source: &str) {
        self.inner.runtime.assert_ui_thread();
        let placeholder = self
            .inner
            .document
            .capture_placeholder(element)
            .unwrap_or_default();
        let update = self
            .inner
            .registry
            .borrow_mut()
            .request_source(element, source, &placeholder);
        if update == SourceUpdate::Watch {
            self.set_state_marker(element, LoadState::Pending);
            self.watch(element);
        }
    }

    fn on_detach(&self, element: ElementId) {
        self.inner.detector.borrow_mut().unwatch(element);
        if self.inner.registry.borrow_mut().remove(element).is_some() {
            log::debug!("lazy image {element}: detached");
        }
    }
}

#[cfg(test)]
#[path = "tests/lazy_images_tests.rs"]
mod tests;
