use std::rc::Rc;
use std::sync::Arc;

use lazyload_core::{DefaultScheduler, ElementId, Runtime, RuntimeHandle};
use lazyload_ui::{Document, ElementDirective, LazyImageConfig, LazyImages, LoadState, Style};
use lazyload_ui_graphics::Rect;

use crate::FakeTransport;

/// Nanoseconds between two simulated frames.
pub const FRAME_NANOS: u64 = 16_000_000;

/// Default simulated viewport: a phone-sized window at the top.
pub const TEST_VIEWPORT: Rect = Rect::new(0.0, 0.0, 360.0, 640.0);

/// Headless harness for exercising lazy image loading in tests.
///
/// Owns a runtime, a document, a [`FakeTransport`] and the [`LazyImages`]
/// service, and exposes helpers for scrolling and stepping frames without a
/// windowing backend.
pub struct LazyTestRule {
    runtime: Runtime,
    document: Document,
    transport: FakeTransport,
    lazy_images: LazyImages,
    frame_time_nanos: u64,
}

impl LazyTestRule {
    pub fn new() -> Self {
        Self::with_config(LazyImageConfig::default())
    }

    pub fn with_config(config: LazyImageConfig) -> Self {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let document = Document::new();
        document.set_viewport(TEST_VIEWPORT);
        let transport = FakeTransport::new();
        let lazy_images = LazyImages::new(
            config,
            runtime.handle(),
            document.clone(),
            Rc::new(transport.clone()),
        );
        Self {
            runtime,
            document,
            transport,
            lazy_images,
            frame_time_nanos: 0,
        }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn transport(&self) -> &FakeTransport {
        &self.transport
    }

    pub fn lazy_images(&self) -> &LazyImages {
        &self.lazy_images
    }

    /// Creates an image element at `bounds` showing `placeholder` and runs
    /// the create and attach hooks with `source`.
    pub fn attach_image(&self, placeholder: &str, source: &str, bounds: Rect) -> ElementId {
        let id = self.document.create_image(placeholder);
        self.document.set_bounds(id, bounds);
        self.lazy_images.on_create(id);
        self.lazy_images.on_attach(id, source);
        id
    }

    /// Attaches an image that sits fully inside the viewport.
    pub fn attach_visible(&self, placeholder: &str, source: &str) -> ElementId {
        self.attach_image(placeholder, source, Rect::new(0.0, 0.0, 200.0, 200.0))
    }

    /// Attaches an image far below the viewport.
    pub fn attach_offscreen(&self, placeholder: &str, source: &str) -> ElementId {
        self.attach_image(placeholder, source, Rect::new(0.0, 2000.0, 200.0, 200.0))
    }

    pub fn set_source(&self, id: ElementId, source: &str) {
        self.lazy_images.on_source_changed(id, source);
    }

    /// Runs the detach hook and removes the element from the document.
    pub fn detach(&self, id: ElementId) {
        self.lazy_images.on_detach(id);
        self.document.remove(id);
    }

    /// Moves the viewport to `y` and runs an observation pass.
    pub fn scroll_to(&self, y: f32) -> usize {
        self.document.scroll_to(y);
        let activations = self.lazy_images.observe();
        self.pump_until_idle();
        activations
    }

    pub fn resolve(&self, source: &str) -> bool {
        let answered = self.transport.resolve(source);
        self.pump_until_idle();
        answered
    }

    pub fn reject(&self, source: &str, error: lazyload_ui::FetchError) -> bool {
        let answered = self.transport.reject(source, error);
        self.pump_until_idle();
        answered
    }

    /// Drains queued UI work and async tasks until nothing is left.
    pub fn pump_until_idle(&self) {
        let handle = self.runtime.handle();
        let mut i = 0;
        loop {
            i += 1;
            if i > 100 {
                panic!("pump_until_idle looped too many times!");
            }
            handle.drain_ui();
            if !handle.has_pending_ui() {
                break;
            }
        }
    }

    /// Runs one frame `FRAME_NANOS` after the previous one.
    pub fn advance_frame(&mut self) {
        self.frame_time_nanos += FRAME_NANOS;
        self.runtime
            .handle()
            .drain_frame_callbacks(self.frame_time_nanos);
        self.pump_until_idle();
    }

    /// Steps frames until `millis` of simulated time have passed.
    pub fn advance_time(&mut self, millis: u64) {
        let target = self.frame_time_nanos + millis * 1_000_000;
        while self.frame_time_nanos < target {
            self.advance_frame();
        }
    }

    /// Steps frames until no frame callbacks remain.
    pub fn run_animations(&mut self) {
        let mut frames = 0;
        while self.runtime.handle().has_frame_callbacks() {
            frames += 1;
            if frames > 10_000 {
                panic!("animations never settled");
            }
            self.advance_frame();
        }
    }

    pub fn src(&self, id: ElementId) -> Option<String> {
        self.document.src(id)
    }

    pub fn state(&self, id: ElementId) -> LoadState {
        self.lazy_images.state(id)
    }

    pub fn marker(&self, id: ElementId) -> Option<LoadState> {
        self.document.state_marker(id)
    }

    pub fn style(&self, id: ElementId) -> Option<Style> {
        self.document.style(id)
    }

    pub fn is_watched(&self, id: ElementId) -> bool {
        self.lazy_images.is_watched(id)
    }
}

impl Default for LazyTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `LazyTestRule`.
pub fn run_lazy_test<R>(f: impl FnOnce(&mut LazyTestRule) -> R) -> R {
    let mut rule = LazyTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
