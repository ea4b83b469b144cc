use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use lazyload_core::{completion, Completion, Owned, RuntimeHandle};

use crate::{FetchError, FetchRequest, FetchResponder, ImageCache, ImageTransport};

/// Result of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The image is available. `cached` is `true` when no network round-trip
    /// was needed, in which case no transition animation runs.
    Resolved { cached: bool },
    Rejected(FetchError),
    /// The transport dropped its responder without answering.
    Abandoned,
}

impl FetchOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, FetchOutcome::Resolved { .. })
    }
}

/// Pending fetch for one source.
///
/// Cache hits are complete on construction so callers can take the outcome
/// synchronously with [`FetchFuture::try_take`] instead of awaiting.
pub struct FetchFuture {
    source: String,
    outcome: Completion<FetchOutcome>,
}

impl FetchFuture {
    fn ready(source: String, outcome: FetchOutcome) -> Self {
        Self {
            source,
            outcome: Completion::ready(outcome),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn try_take(&mut self) -> Option<FetchOutcome> {
        self.outcome.try_take()
    }
}

impl Future for FetchFuture {
    type Output = FetchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.outcome
            .poll_settled(cx)
            .map(|outcome| outcome.unwrap_or(FetchOutcome::Abandoned))
    }
}

/// Issues image fetches and classifies their outcome.
#[derive(Clone)]
pub struct FetchCoordinator {
    runtime: RuntimeHandle,
    transport: Rc<dyn ImageTransport>,
    cache: Owned<ImageCache>,
}

impl FetchCoordinator {
    pub fn new(runtime: RuntimeHandle, transport: Rc<dyn ImageTransport>) -> Self {
        Self {
            runtime,
            transport,
            cache: Owned::new(ImageCache::default()),
        }
    }

    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache = Owned::new(ImageCache::new(capacity));
        self
    }

    pub fn cache(&self) -> Owned<ImageCache> {
        self.cache.clone()
    }

    /// Whether `source` would resolve as a cache hit right now.
    pub fn is_locally_available(&self, source: &str) -> bool {
        self.cache.update(|cache| cache.lookup(source)) || self.transport.is_cached(source)
    }

    /// Starts exactly one fetch for `source`.
    pub fn activate(&self, source: &str) -> FetchFuture {
        if self.is_locally_available(source) {
            log::debug!("fetch {source}: cache hit");
            return FetchFuture::ready(source.to_owned(), FetchOutcome::Resolved { cached: true });
        }

        let (completer, outcome) = completion();
        let cache = self.cache.clone();
        let key = source.to_owned();
        let continuation = self
            .runtime
            .register_ui_cont(move |result: Result<(), FetchError>| {
                let outcome = match result {
                    Ok(()) => {
                        log::debug!("fetch {key}: loaded");
                        cache.update(|cache| cache.insert(&key));
                        FetchOutcome::Resolved { cached: false }
                    }
                    Err(error) => {
                        log::debug!("fetch {key}: {error}");
                        FetchOutcome::Rejected(error)
                    }
                };
                completer.complete(outcome);
            });

        let Some(continuation) = continuation else {
            log::warn!("fetch {source}: runtime is gone, rejecting");
            return FetchFuture::ready(
                source.to_owned(),
                FetchOutcome::Rejected(FetchError::Network("runtime unavailable".into())),
            );
        };

        let responder = FetchResponder::new(self.runtime.dispatcher(), continuation);
        self.transport.fetch(FetchRequest::new(source), responder);
        FetchFuture {
            source: source.to_owned(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyload_core::{DefaultScheduler, Runtime};
    use std::cell::RefCell;
    use std::sync::Arc;

    #[derive(Default)]
    struct ParkedTransport {
        cached: Vec<&'static str>,
        parked: RefCell<Vec<(FetchRequest, FetchResponder)>>,
    }

    impl ImageTransport for ParkedTransport {
        fn is_cached(&self, source: &str) -> bool {
            self.cached.contains(&source)
        }

        fn fetch(&self, request: FetchRequest, responder: FetchResponder) {
            self.parked.borrow_mut().push((request, responder));
        }
    }

    fn setup(cached: Vec<&'static str>) -> (Runtime, Rc<ParkedTransport>, FetchCoordinator) {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let transport = Rc::new(ParkedTransport {
            cached,
            ..Default::default()
        });
        let coordinator = FetchCoordinator::new(runtime.handle(), transport.clone());
        (runtime, transport, coordinator)
    }

    #[test]
    fn transport_cache_hit_resolves_without_request() {
        let (_runtime, transport, coordinator) = setup(vec!["/a.jpg"]);
        let mut fetch = coordinator.activate("/a.jpg");
        assert_eq!(fetch.try_take(), Some(FetchOutcome::Resolved { cached: true }));
        assert!(transport.parked.borrow().is_empty());
    }

    #[test]
    fn network_success_resolves_on_drain_and_fills_cache() {
        let (runtime, transport, coordinator) = setup(Vec::new());
        let mut fetch = coordinator.activate("/a.jpg");
        assert_eq!(fetch.source(), "/a.jpg");
        assert_eq!(fetch.try_take(), None);

        let (request, responder) = transport.parked.borrow_mut().remove(0);
        assert_eq!(request.source(), "/a.jpg");
        responder.resolve();
        assert_eq!(fetch.try_take(), None, "delivered only on the UI drain");

        runtime.handle().drain_ui();
        assert_eq!(fetch.try_take(), Some(FetchOutcome::Resolved { cached: false }));

        let mut again = coordinator.activate("/a.jpg");
        assert_eq!(again.try_take(), Some(FetchOutcome::Resolved { cached: true }));
        assert!(transport.parked.borrow().is_empty());
    }

    #[test]
    fn rejection_is_reported_and_not_cached() {
        let (runtime, transport, coordinator) = setup(Vec::new());
        let mut fetch = coordinator.activate("/broken.jpg");
        let (_, responder) = transport.parked.borrow_mut().remove(0);
        responder.reject(FetchError::Status(404));
        runtime.handle().drain_ui();

        assert_eq!(
            fetch.try_take(),
            Some(FetchOutcome::Rejected(FetchError::Status(404)))
        );
        assert!(!coordinator.cache().with(|cache| cache.contains("/broken.jpg")));
    }

    #[test]
    fn dropped_responder_abandons_the_fetch() {
        let (runtime, transport, coordinator) = setup(Vec::new());
        let handle = runtime.handle();
        let outcome = Rc::new(RefCell::new(None));
        {
            let fetch = coordinator.activate("/slow.jpg");
            let outcome = Rc::clone(&outcome);
            handle.spawn_ui(async move {
                *outcome.borrow_mut() = Some(fetch.await);
            });
        }
        handle.drain_ui();
        assert_eq!(handle.pending_task_count(), 1);

        drop(transport.parked.borrow_mut().remove(0));
        assert!(handle.has_pending_ui());
        handle.drain_ui();

        assert_eq!(*outcome.borrow(), Some(FetchOutcome::Abandoned));
        assert_eq!(handle.pending_task_count(), 0);
        assert!(!coordinator.cache().with(|cache| cache.contains("/slow.jpg")));
    }

    #[test]
    fn dropped_runtime_rejects_immediately() {
        let (runtime, transport, coordinator) = setup(Vec::new());
        drop(runtime);
        let mut fetch = coordinator.activate("/a.jpg");
        assert!(matches!(fetch.try_take(), Some(FetchOutcome::Rejected(_))));
        assert!(transport.parked.borrow().is_empty());
    }
}
