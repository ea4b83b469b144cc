//! Host integration for the Lazyload runtime.
//!
//! The host decides when frames run; the runtime only asks for one when it
//! has queued work.

/// Receives frame requests from the runtime.
///
/// Called whenever a task, delivery or frame callback is queued. Must be
/// safe to call from any thread because fetch responders wake the runtime
/// from background workers.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
