use lazyload_core::ElementId;

/// Lifecycle hooks the host calls for every lazily loaded image element.
pub trait ElementDirective {
    /// The element was instantiated and displays its placeholder.
    fn on_create(&self, element: ElementId);

    /// The element was inserted with `source` as its real image.
    fn on_attach(&self, element: ElementId, source: &str);

    /// The bound real source changed.
    fn on_source_changed(&self, element: ElementId, source: &str);

    /// The element was removed from the document.
    fn on_detach(&self, element: ElementId);
}
