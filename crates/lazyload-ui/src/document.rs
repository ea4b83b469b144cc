//! Host-side element model the lazy loader reads from and writes to.

use lazyload_animation::AnimationSpec;
use lazyload_core::map::HashMap;
use lazyload_core::{ElementId, Owned};
use lazyload_ui_graphics::Rect;

use crate::LoadState;

/// Inline style properties the fade transition touches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Style {
    /// `None` is `opacity: auto`.
    pub opacity: Option<f32>,
    /// `None` means no transition is declared.
    pub transition: Option<AnimationSpec>,
}

/// One image element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    src: String,
    placeholder: Option<String>,
    state_marker: Option<LoadState>,
    bounds: Option<Rect>,
    style: Style,
}

impl ElementNode {
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Source captured as the placeholder; kept until the element is removed.
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn state_marker(&self) -> Option<LoadState> {
        self.state_marker
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn style(&self) -> Style {
        self.style
    }
}

#[derive(Default)]
struct DocumentInner {
    nodes: HashMap<ElementId, ElementNode>,
    next_id: u32,
    viewport: Option<Rect>,
}

/// Shared handle to the document. Clones see the same elements.
///
/// Operations on ids that are not in the document are ignored, so late
/// writers (a fade finishing after the element was removed) are harmless.
#[derive(Clone, Default)]
pub struct Document {
    inner: Owned<DocumentInner>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an image element displaying `src`.
    pub fn create_image(&self, src: impl Into<String>) -> ElementId {
        let src = src.into();
        self.inner.update(|inner| {
            let id = ElementId(inner.next_id);
            inner.next_id += 1;
            inner.nodes.insert(
                id,
                ElementNode {
                    src,
                    placeholder: None,
                    state_marker: None,
                    bounds: None,
                    style: Style::default(),
                },
            );
            id
        })
    }

    pub fn remove(&self, id: ElementId) -> Option<ElementNode> {
        self.inner.update(|inner| inner.nodes.remove(&id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.inner.with(|inner| inner.nodes.contains_key(&id))
    }

    pub fn len(&self) -> usize {
        self.inner.with(|inner| inner.nodes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element(&self, id: ElementId) -> Option<ElementNode> {
        self.inner.with(|inner| inner.nodes.get(&id).cloned())
    }

    pub fn src(&self, id: ElementId) -> Option<String> {
        self.inner
            .with(|inner| inner.nodes.get(&id).map(|node| node.src.clone()))
    }

    pub fn set_src(&self, id: ElementId, src: &str) {
        self.with_node(id, |node| {
            if node.src != src {
                node.src = src.to_owned();
            }
        });
    }

    /// Returns the element's placeholder, capturing the displayed source on
    /// first use. Survives detach and re-attach; `None` for missing elements.
    pub fn capture_placeholder(&self, id: ElementId) -> Option<String> {
        self.inner.update(|inner| {
            let node = inner.nodes.get_mut(&id)?;
            let placeholder = node.placeholder.get_or_insert_with(|| node.src.clone());
            Some(placeholder.clone())
        })
    }

    pub fn state_marker(&self, id: ElementId) -> Option<LoadState> {
        self.inner
            .with(|inner| inner.nodes.get(&id).and_then(|node| node.state_marker))
    }

    pub fn set_state_marker(&self, id: ElementId, state: LoadState) {
        self.with_node(id, |node| node.state_marker = Some(state));
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.inner
            .with(|inner| inner.nodes.get(&id).and_then(|node| node.bounds))
    }

    pub fn set_bounds(&self, id: ElementId, bounds: Rect) {
        self.with_node(id, |node| node.bounds = Some(bounds));
    }

    pub fn style(&self, id: ElementId) -> Option<Style> {
        self.inner
            .with(|inner| inner.nodes.get(&id).map(|node| node.style))
    }

    pub fn update_style(&self, id: ElementId, f: impl FnOnce(&mut Style)) {
        self.with_node(id, |node| f(&mut node.style));
    }

    /// The visible region in document coordinates; the observer root.
    pub fn viewport(&self) -> Option<Rect> {
        self.inner.with(|inner| inner.viewport)
    }

    pub fn set_viewport(&self, viewport: Rect) {
        self.inner.update(|inner| inner.viewport = Some(viewport));
    }

    /// Moves the viewport vertically, keeping its size.
    pub fn scroll_to(&self, y: f32) {
        self.inner.update(|inner| {
            if let Some(viewport) = inner.viewport.as_mut() {
                viewport.y = y;
            }
        });
    }

    fn with_node(&self, id: ElementId, f: impl FnOnce(&mut ElementNode)) {
        self.inner.update(|inner| match inner.nodes.get_mut(&id) {
            Some(node) => f(node),
            None => log::trace!("ignoring write to detached element {id}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_missing_elements_are_ignored() {
        let document = Document::new();
        let id = document.create_image("/ph.png");
        document.remove(id);
        document.set_src(id, "/a.jpg");
        document.update_style(id, |style| style.opacity = Some(0.0));
        assert_eq!(document.src(id), None);
        assert_eq!(document.style(id), None);
        assert!(document.is_empty());
    }

    #[test]
    fn placeholder_is_captured_once() {
        let document = Document::new();
        let id = document.create_image("/ph.png");
        assert_eq!(document.capture_placeholder(id).as_deref(), Some("/ph.png"));
        document.set_src(id, "/a.jpg");
        assert_eq!(document.capture_placeholder(id).as_deref(), Some("/ph.png"));
        assert_eq!(
            document.element(id).and_then(|node| node.placeholder().map(str::to_owned)),
            Some("/ph.png".to_owned())
        );
        document.remove(id);
        assert_eq!(document.capture_placeholder(id), None);
    }

    #[test]
    fn scroll_keeps_viewport_size() {
        let document = Document::new();
        document.scroll_to(100.0);
        assert_eq!(document.viewport(), None);
        document.set_viewport(Rect::new(0.0, 0.0, 320.0, 480.0));
        document.scroll_to(250.0);
        assert_eq!(document.viewport(), Some(Rect::new(0.0, 250.0, 320.0, 480.0)));
    }
}
