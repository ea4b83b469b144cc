//! Intersection observer over the document viewport.
//!
//! Mirrors the reporting rules of a browser intersection observer: a newly
//! watched element always gets one report, after which it is only reported
//! again when its intersection ratio crosses into a different threshold band.

use indexmap::IndexMap;
use lazyload_core::ElementId;
use lazyload_ui_graphics::{EdgeInsets, Rect};
use smallvec::SmallVec;

/// Intersection-ratio thresholds reported by default.
pub const DEFAULT_THRESHOLDS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Ratio an element must exceed before it activates.
pub const DEFAULT_ACTIVATION_RATIO: f32 = 0.25;

/// Fixed observer configuration.
///
/// The root is always the document viewport. `root_margin` grows the root so
/// elements close to the viewport activate before they scroll into view.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverConfig {
    thresholds: SmallVec<[f32; 5]>,
    activation_ratio: f32,
    root_margin: EdgeInsets,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            thresholds: SmallVec::from_buf(DEFAULT_THRESHOLDS),
            activation_ratio: DEFAULT_ACTIVATION_RATIO,
            root_margin: EdgeInsets::ZERO,
        }
    }
}

impl ObserverConfig {
    /// Replaces the thresholds. Values are clamped to `[0, 1]`, sorted and
    /// deduplicated; an empty list falls back to `[0]`.
    pub fn with_thresholds(mut self, thresholds: impl IntoIterator<Item = f32>) -> Self {
        let mut values: SmallVec<[f32; 5]> = thresholds
            .into_iter()
            .filter(|value| !value.is_nan())
            .map(|value| value.clamp(0.0, 1.0))
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        if values.is_empty() {
            values.push(0.0);
        }
        self.thresholds = values;
        self
    }

    pub fn with_activation_ratio(mut self, ratio: f32) -> Self {
        self.activation_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_root_margin(mut self, margin: EdgeInsets) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    pub fn activation_ratio(&self) -> f32 {
        self.activation_ratio
    }

    pub fn root_margin(&self) -> EdgeInsets {
        self.root_margin
    }

    /// Number of thresholds at or below `ratio`; `0` when not intersecting.
    fn threshold_band(&self, ratio: f32, is_intersecting: bool) -> usize {
        if !is_intersecting {
            return 0;
        }
        self.thresholds
            .iter()
            .take_while(|threshold| ratio >= **threshold)
            .count()
    }
}

/// One visibility report for a watched element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub ratio: f32,
    pub is_intersecting: bool,
    pub bounds: Rect,
    pub root_bounds: Rect,
}

/// Reports produced by one observation pass.
#[derive(Clone, Debug, Default)]
pub struct ActivationBatch {
    pub entries: SmallVec<[IntersectionEntry; 8]>,
    pub activations: SmallVec<[ElementId; 8]>,
}

impl ActivationBatch {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Observation {
    /// Threshold band of the last report; `None` until the first report.
    last_band: Option<usize>,
}

/// Watches elements and decides which of them activate.
///
/// Holds element ids only; it never touches element data.
#[derive(Debug, Default)]
pub struct VisibilityDetector {
    config: ObserverConfig,
    watched: IndexMap<ElementId, Observation>,
}

impl VisibilityDetector {
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            watched: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// Starts reporting for `id`. Returns `false` if it was already watched.
    pub fn watch(&mut self, id: ElementId) -> bool {
        if self.watched.contains_key(&id) {
            return false;
        }
        self.watched.insert(id, Observation::default());
        true
    }

    /// Stops reporting for `id`. Returns `false` if it was not watched.
    pub fn unwatch(&mut self, id: ElementId) -> bool {
        self.watched.shift_remove(&id).is_some()
    }

    /// Unwatch followed by watch: the element gets a fresh initial report.
    pub fn rewatch(&mut self, id: ElementId) {
        self.unwatch(id);
        self.watch(id);
    }

    pub fn is_watched(&self, id: ElementId) -> bool {
        self.watched.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    pub fn watched(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.watched.keys().copied()
    }

    /// Runs one observation pass against `viewport`.
    ///
    /// `bounds_of` supplies each watched element's document rectangle;
    /// elements without bounds are skipped and keep their previous state.
    pub fn observe(
        &mut self,
        viewport: Rect,
        mut bounds_of: impl FnMut(ElementId) -> Option<Rect>,
    ) -> ActivationBatch {
        let root = viewport.outset(self.config.root_margin);
        let mut batch = ActivationBatch::default();

        for (id, observation) in self.watched.iter_mut() {
            let Some(bounds) = bounds_of(*id) else {
                continue;
            };
            let overlap = bounds.intersect(&root);
            let is_intersecting = overlap.is_some();
            let ratio = bounds.intersection_ratio(&root);
            let band = self.config.threshold_band(ratio, is_intersecting);
            if observation.last_band == Some(band) {
                continue;
            }
            observation.last_band = Some(band);

            log::trace!("intersection {id}: ratio {ratio:.3} bounds {bounds:?}");
            batch.entries.push(IntersectionEntry {
                target: *id,
                ratio,
                is_intersecting,
                bounds,
                root_bounds: root,
            });
            if ratio > self.config.activation_ratio {
                batch.activations.push(*id);
            }
        }

        batch
    }
}
