use std::cell::RefCell;
use std::rc::Rc;

use lazyload_core::{completion, Completer, Completion, FrameCallbackRegistration, RuntimeHandle};

use crate::spec::AnimationSpec;

/// Values a tween can move between.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

struct Tween<T> {
    from: T,
    to: T,
    spec: AnimationSpec,
    started_at: Option<u64>,
    done: Completer<bool>,
}

struct Track<T> {
    runtime: RuntimeHandle,
    value: T,
    tween: Option<Tween<T>>,
    frame: Option<FrameCallbackRegistration>,
    listener: Option<Rc<dyn Fn(&T)>>,
}

/// A value moved towards a target one frame at a time.
///
/// Clones share the same track, so a clone can retarget an animation another
/// task is awaiting.
pub struct Animatable<T: Lerp + Clone + 'static> {
    track: Rc<RefCell<Track<T>>>,
}

impl<T: Lerp + Clone + 'static> Clone for Animatable<T> {
    fn clone(&self) -> Self {
        Self {
            track: Rc::clone(&self.track),
        }
    }
}

impl<T: Lerp + Clone + 'static> Animatable<T> {
    pub fn new(initial: T, runtime: RuntimeHandle) -> Self {
        Self {
            track: Rc::new(RefCell::new(Track {
                runtime,
                value: initial,
                tween: None,
                frame: None,
                listener: None,
            })),
        }
    }

    /// Called with every value a frame produces.
    pub fn on_value(&self, listener: impl Fn(&T) + 'static) {
        self.track.borrow_mut().listener = Some(Rc::new(listener));
    }

    pub fn value(&self) -> T {
        self.track.borrow().value.clone()
    }

    pub fn is_running(&self) -> bool {
        self.track.borrow().tween.is_some()
    }

    /// Starts a tween from the current value to `target`.
    ///
    /// The completion resolves to `true` when the target is reached and to
    /// `false` when a later `animate_to` takes over first.
    pub fn animate_to(&self, target: T, spec: AnimationSpec) -> Completion<bool> {
        let (done, finished) = completion();
        let replaced = {
            let mut track = self.track.borrow_mut();
            let tween = Tween {
                from: track.value.clone(),
                to: target,
                spec,
                started_at: None,
                done,
            };
            track.tween.replace(tween)
        };
        if let Some(replaced) = replaced {
            replaced.done.complete(false);
        }
        Self::request_frame(&self.track);
        finished
    }

    fn request_frame(track: &Rc<RefCell<Track<T>>>) {
        let clock = {
            let track = track.borrow();
            if track.frame.is_some() {
                return;
            }
            track.runtime.frame_clock()
        };
        let weak = Rc::downgrade(track);
        let frame = clock.with_frame_nanos(move |now| {
            if let Some(track) = weak.upgrade() {
                Self::advance(&track, now);
            }
        });
        if !frame.is_active() {
            log::debug!("animation started on a dropped runtime");
        }
        track.borrow_mut().frame = Some(frame);
    }

    fn advance(track: &Rc<RefCell<Track<T>>>, now: u64) {
        let (emitted, finished, listener) = {
            let mut guard = track.borrow_mut();
            let state = &mut *guard;
            state.frame = None;
            let Some(tween) = state.tween.as_mut() else {
                return;
            };
            let started_at = *tween.started_at.get_or_insert(now);
            match tween.spec.progress(now.saturating_sub(started_at)) {
                None => (None, None, None),
                Some(progress) if progress >= 1.0 => {
                    let finished = state.tween.take().map(|tween| {
                        state.value = tween.to;
                        tween.done
                    });
                    (Some(state.value.clone()), finished, state.listener.clone())
                }
                Some(progress) => {
                    let eased = tween.spec.easing.transform(progress);
                    state.value = tween.from.lerp(&tween.to, eased);
                    (Some(state.value.clone()), None, state.listener.clone())
                }
            }
        };

        if let (Some(value), Some(listener)) = (emitted, listener) {
            listener(&value);
        }
        match finished {
            Some(done) => done.complete(true),
            None => Self::request_frame(track),
        }
    }
}
