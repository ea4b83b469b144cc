//! Per-element load state machine.
//!
//! The registry owns every tracked element's sources and [`LoadState`]. It
//! never touches the document or the detector: each operation returns what
//! the caller has to apply.

use std::fmt;

use lazyload_assets::FetchOutcome;
use lazyload_core::map::HashMap;
use lazyload_core::ElementId;

/// Load lifecycle of one element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadState {
    #[default]
    Unregistered,
    Pending,
    Loading,
    Success,
    Failed,
}

impl LoadState {
    /// Value of the document's `lazy` marker; `None` for untracked elements.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            LoadState::Unregistered => None,
            LoadState::Pending => Some("pending"),
            LoadState::Loading => Some("loading"),
            LoadState::Success => Some("success"),
            LoadState::Failed => Some("failed"),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Success | LoadState::Failed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.marker().unwrap_or("unregistered"))
    }
}

/// Tracked record for one element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchedElement {
    placeholder: Option<String>,
    pending_source: Option<String>,
    settled_source: Option<String>,
    state: LoadState,
}

impl WatchedElement {
    /// Source displayed before any real image; captured once.
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Most recently requested source while `Pending` or `Loading`.
    pub fn pending_source(&self) -> Option<&str> {
        self.pending_source.as_deref()
    }

    /// Source of the last terminal outcome.
    pub fn settled_source(&self) -> Option<&str> {
        self.settled_source.as_deref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }
}

/// What the caller must do with the detector after a source request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceUpdate {
    /// The element entered `Pending` and must be watched.
    Watch,
    /// Only the requested source changed, or nothing did.
    Unchanged,
}

/// Decision taken when a fetch settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// Display `source`; through the fade when `animate` is set.
    Commit { source: String, animate: bool },
    /// The fetch failed; display the placeholder.
    Revert { placeholder: Option<String> },
    /// The source changed while loading. The element is `Pending` again and
    /// must be re-watched.
    Rearm,
    /// The element is gone or not loading; nothing to do.
    Ignore,
}

#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: HashMap<ElementId, WatchedElement>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ElementId) -> Option<&WatchedElement> {
        self.elements.get(&id)
    }

    pub fn state(&self, id: ElementId) -> LoadState {
        self.elements
            .get(&id)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Records `displayed` as the placeholder unless one was already taken.
    pub fn capture_placeholder(&mut self, id: ElementId, displayed: &str) {
        let record = self.elements.entry(id).or_default();
        if record.placeholder.is_none() {
            record.placeholder = Some(displayed.to_owned());
        }
    }

    /// Applies a newly bound `source`. `placeholder` is used when none was
    /// captured at creation.
    pub fn request_source(
        &mut self,
        id: ElementId,
        source: &str,
        placeholder: &str,
    ) -> SourceUpdate {
        let record = self.elements.entry(id).or_default();
        if record.placeholder.is_none() {
            record.placeholder = Some(placeholder.to_owned());
        }

        match record.state {
            LoadState::Pending | LoadState::Loading => {
                if record.pending_source.as_deref() != Some(source) {
                    record.pending_source = Some(source.to_owned());
                }
                SourceUpdate::Unchanged
            }
            LoadState::Success | LoadState::Failed
                if record.settled_source.as_deref() == Some(source) =>
            {
                SourceUpdate::Unchanged
            }
            LoadState::Unregistered | LoadState::Success | LoadState::Failed => {
                record.pending_source = Some(source.to_owned());
                record.state = LoadState::Pending;
                SourceUpdate::Watch
            }
        }
    }

    /// Moves a `Pending` element to `Loading` and returns the source to fetch.
    pub fn begin_loading(&mut self, id: ElementId) -> Option<String> {
        let record = self.elements.get_mut(&id)?;
        if record.state != LoadState::Pending {
            return None;
        }
        let source = record.pending_source.clone()?;
        record.state = LoadState::Loading;
        Some(source)
    }

    /// Applies the outcome of the fetch for `requested`.
    ///
    /// The outcome only counts when `requested` is still the pending source;
    /// otherwise the element is re-armed so the newer source gets fetched.
    /// An abandoned fetch for the pending source changes nothing: the element
    /// stays `Loading`.
    pub fn settle(
        &mut self,
        id: ElementId,
        requested: &str,
        outcome: &FetchOutcome,
    ) -> Settlement {
        let Some(record) = self.elements.get_mut(&id) else {
            return Settlement::Ignore;
        };
        if record.state != LoadState::Loading {
            return Settlement::Ignore;
        }
        if record.pending_source.as_deref() != Some(requested) {
            record.state = LoadState::Pending;
            return Settlement::Rearm;
        }

        let settlement = match outcome {
            FetchOutcome::Resolved { cached } => {
                record.state = LoadState::Success;
                Settlement::Commit {
                    source: requested.to_owned(),
                    animate: !cached,
                }
            }
            FetchOutcome::Rejected(_) => {
                record.state = LoadState::Failed;
                Settlement::Revert {
                    placeholder: record.placeholder.clone(),
                }
            }
            FetchOutcome::Abandoned => return Settlement::Ignore,
        };
        record.settled_source = record.pending_source.take();
        settlement
    }

    /// Whether a fade that finished for `source` may still display it.
    ///
    /// False once the element is gone or a later outcome has settled.
    pub fn is_current_success(&self, id: ElementId, source: &str) -> bool {
        self.elements
            .get(&id)
            .is_some_and(|record| record.settled_source.as_deref() == Some(source))
    }

    /// Discards the record of a detached element.
    pub fn remove(&mut self, id: ElementId) -> Option<WatchedElement> {
        self.elements.remove(&id)
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
