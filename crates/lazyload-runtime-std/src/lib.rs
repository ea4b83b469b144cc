//! `std`-backed host for the Lazyload runtime.
//!
//! A native event loop owns a [`StdRuntime`], checks
//! [`StdRuntime::take_frame_request`] each tick and calls
//! [`StdRuntime::pump_frame`] when work is waiting. Frame timestamps come
//! from a [`web_time`] monotonic clock started with the runtime.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lazyload_core::{Runtime, RuntimeHandle, RuntimeScheduler};
use web_time::Instant;

/// Scheduler that latches frame requests until the host consumes them.
#[derive(Debug, Default)]
pub struct FrameRequests {
    requested: AtomicBool,
}

impl FrameRequests {
    /// Returns whether a frame was requested since the last call.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

impl RuntimeScheduler for FrameRequests {
    fn schedule_frame(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

pub struct StdRuntime {
    runtime: Runtime,
    requests: Arc<FrameRequests>,
    started: Instant,
}

impl StdRuntime {
    pub fn new() -> Self {
        let requests = Arc::new(FrameRequests::default());
        Self {
            runtime: Runtime::new(requests.clone()),
            requests,
            started: Instant::now(),
        }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn take_frame_request(&self) -> bool {
        self.requests.take()
    }

    /// Time since the runtime started, truncated to whole milliseconds and
    /// expressed in nanoseconds.
    pub fn frame_time_nanos(&self) -> u64 {
        let elapsed = self.started.elapsed();
        elapsed.as_secs() * 1_000_000_000 + u64::from(elapsed.subsec_millis()) * 1_000_000
    }

    /// Drains UI work, runs one frame at the current time, then drains the
    /// work that frame produced.
    pub fn pump_frame(&self) {
        let handle = self.runtime.handle();
        handle.drain_ui();
        let now = self.frame_time_nanos();
        log::trace!("frame at {now}ns");
        handle.drain_frame_callbacks(now);
        handle.drain_ui();
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("requests", &self.requests)
            .field("needs_frame", &self.runtime.needs_frame())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/std_runtime_tests.rs"]
mod tests;
