use lazyload_animation::{Animatable, AnimationSpec};
use lazyload_core::map::HashMap;
use lazyload_core::{completion, Completion, ElementId, Owned, RuntimeHandle};

use crate::Document;

/// Fade in progress on one element.
struct ActiveFade {
    /// The element's `transition` before the first overlapping fade began.
    authored: Option<AnimationSpec>,
    opacity: Animatable<f32>,
    /// Bumped by every `run`; only the latest run restores the style.
    generation: u64,
}

/// Opacity fade used when a freshly fetched image replaces the placeholder.
///
/// [`FadeTransition::run`] fades the element out, signals so the caller can
/// swap the source while it is invisible, then fades back in. The element's
/// own `transition` style is restored afterwards and opacity returns to
/// automatic.
///
/// A `run` on an element that is still fading takes over the running
/// opacity animation instead of starting a second one, and the style
/// restored at the end is the one from before the first fade.
#[derive(Clone)]
pub struct FadeTransition {
    runtime: RuntimeHandle,
    document: Document,
    spec: AnimationSpec,
    active: Owned<HashMap<ElementId, ActiveFade>>,
}

impl FadeTransition {
    pub fn new(runtime: RuntimeHandle, document: Document) -> Self {
        Self {
            runtime,
            document,
            spec: AnimationSpec::default(),
            active: Owned::new(HashMap::default()),
        }
    }

    pub fn with_spec(mut self, spec: AnimationSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn spec(&self) -> AnimationSpec {
        self.spec
    }

    /// Starts the fade on `id`. The returned completion resolves when the
    /// fade-out has finished or a later `run` on the same element took over.
    ///
    /// Resolves immediately when the element is no longer in the document.
    pub fn run(&self, id: ElementId) -> Completion<()> {
        let Some(style) = self.document.style(id) else {
            return Completion::ready(());
        };
        let (generation, opacity) = self.active.update(|active| {
            let fade = active.entry(id).or_insert_with(|| ActiveFade {
                authored: style.transition,
                opacity: self.opacity_for(id),
                generation: 0,
            });
            fade.generation += 1;
            (fade.generation, fade.opacity.clone())
        });
        if generation > 1 {
            log::debug!("fade on {id} restarted");
        }

        let spec = self.spec;
        self.document
            .update_style(id, |style| style.transition = Some(spec));

        let (faded_out, signal) = completion();
        let fade_out = opacity.animate_to(0.0, spec);
        let this = self.clone();
        let spawned = self.runtime.spawn_ui(async move {
            let reached = fade_out.await;
            faded_out.complete(());
            if !reached || !this.is_current(id, generation) {
                return;
            }
            if opacity.animate_to(1.0, spec).await {
                this.finish(id, generation);
            }
        });

        if !spawned {
            log::debug!("fade on {id} skipped: runtime is gone");
            self.finish(id, generation);
            return Completion::ready(());
        }
        signal
    }

    fn opacity_for(&self, id: ElementId) -> Animatable<f32> {
        let opacity = Animatable::new(1.0_f32, self.runtime.clone());
        let document = self.document.clone();
        opacity.on_value(move |value| {
            document.update_style(id, |style| style.opacity = Some(*value));
        });
        opacity
    }

    fn is_current(&self, id: ElementId, generation: u64) -> bool {
        self.active.with(|active| {
            active
                .get(&id)
                .is_some_and(|fade| fade.generation == generation)
        })
    }

    /// Restores the authored style if `generation` is still the latest fade.
    fn finish(&self, id: ElementId, generation: u64) {
        let authored = self.active.update(|active| {
            if active.get(&id)?.generation != generation {
                return None;
            }
            active.remove(&id).map(|fade| fade.authored)
        });
        let Some(authored) = authored else {
            return;
        };
        self.document.update_style(id, |style| {
            style.opacity = None;
            style.transition = authored;
        });
        log::trace!("fade on {id} finished");
    }
}
