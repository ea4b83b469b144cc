use std::cell::RefCell;
use std::rc::Rc;

use lazyload_assets::{FetchError, FetchRequest, FetchResponder, ImageTransport};
use lazyload_core::map::HashSet;

#[derive(Default)]
struct FakeTransportState {
    cached: HashSet<String>,
    parked: Vec<(FetchRequest, FetchResponder)>,
    requested: Vec<String>,
}

/// Scripted [`ImageTransport`]: every fetch is parked until the test
/// resolves or rejects it by source.
///
/// Clones share state, so a test can keep one handle while the service owns
/// another.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<FakeTransportState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `source` as locally available to subsequent requests.
    pub fn mark_cached(&self, source: &str) {
        self.state.borrow_mut().cached.insert(source.to_owned());
    }

    /// Every source fetched so far, in request order. Cache hits never reach
    /// the transport and are not listed.
    pub fn requested(&self) -> Vec<String> {
        self.state.borrow().requested.clone()
    }

    pub fn parked_count(&self) -> usize {
        self.state.borrow().parked.len()
    }

    pub fn is_parked(&self, source: &str) -> bool {
        self.state
            .borrow()
            .parked
            .iter()
            .any(|(request, _)| request.source() == source)
    }

    /// Answers the oldest parked request for `source` successfully. Returns
    /// `false` if none was parked.
    pub fn resolve(&self, source: &str) -> bool {
        match self.take(source) {
            Some(responder) => {
                responder.resolve();
                true
            }
            None => false,
        }
    }

    /// Answers the oldest parked request for `source` with `error`.
    pub fn reject(&self, source: &str, error: FetchError) -> bool {
        match self.take(source) {
            Some(responder) => {
                responder.reject(error);
                true
            }
            None => false,
        }
    }

    /// Drops the oldest parked request for `source` without answering.
    pub fn abandon(&self, source: &str) -> bool {
        self.take(source).is_some()
    }

    fn take(&self, source: &str) -> Option<FetchResponder> {
        let mut state = self.state.borrow_mut();
        let index = state
            .parked
            .iter()
            .position(|(request, _)| request.source() == source)?;
        Some(state.parked.remove(index).1)
    }
}

impl ImageTransport for FakeTransport {
    fn is_cached(&self, source: &str) -> bool {
        self.state.borrow().cached.contains(source)
    }

    fn fetch(&self, request: FetchRequest, responder: FetchResponder) {
        log::trace!("fake transport parked {}", request.source());
        let mut state = self.state.borrow_mut();
        state.requested.push(request.source().to_owned());
        state.parked.push((request, responder));
    }
}
