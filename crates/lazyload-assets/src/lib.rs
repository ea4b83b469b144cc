//! Image fetch coordination for Lazyload.
//!
//! One activation issues exactly one fetch. Sources already held by the
//! [`ImageCache`] (or reported cached by the transport) resolve immediately;
//! everything else goes through an [`ImageTransport`] whose answer is
//! marshalled back onto the UI thread.

mod cache;
mod coordinator;
mod error;
mod transport;

pub use cache::ImageCache;
pub use coordinator::{FetchCoordinator, FetchFuture, FetchOutcome};
pub use error::FetchError;
pub use transport::{FetchRequest, FetchResponder, ImageTransport};
