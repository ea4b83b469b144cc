use crate::FetchError;
use lazyload_core::UiDispatcher;

/// A single image fetch handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    source: String,
}

impl FetchRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Loads image sources on behalf of the fetch coordinator.
///
/// Implementations may answer synchronously inside [`ImageTransport::fetch`]
/// or hand the responder to another thread. Each request is attempted once;
/// retries are not the transport's job either.
pub trait ImageTransport {
    /// Whether `source` is already available locally at request time.
    fn is_cached(&self, source: &str) -> bool {
        let _ = source;
        false
    }

    fn fetch(&self, request: FetchRequest, responder: FetchResponder);
}

/// Answers one fetch. `Send`, so it can be completed from any thread; the
/// result is delivered on the UI thread during the next drain.
///
/// Dropping a responder without answering abandons the fetch: the awaiting
/// side sees [`FetchOutcome::Abandoned`](crate::FetchOutcome::Abandoned).
pub struct FetchResponder {
    dispatcher: UiDispatcher,
    continuation: Option<u64>,
}

impl FetchResponder {
    pub(crate) fn new(dispatcher: UiDispatcher, continuation: u64) -> Self {
        Self {
            dispatcher,
            continuation: Some(continuation),
        }
    }

    pub fn resolve(self) {
        self.respond(Ok(()));
    }

    pub fn reject(self, error: FetchError) {
        self.respond(Err(error));
    }

    pub fn respond(mut self, result: Result<(), FetchError>) {
        if let Some(id) = self.continuation.take() {
            self.dispatcher.post_invoke(id, result);
        }
    }
}

impl Drop for FetchResponder {
    fn drop(&mut self) {
        if let Some(id) = self.continuation.take() {
            log::debug!("fetch responder dropped unanswered");
            self.dispatcher.post_cancel(id);
        }
    }
}
