//! Cooperative executor owned by the UI thread.
//!
//! [`RuntimeHandle::drain_ui`] interleaves deliveries posted from other
//! threads, closures queued on the UI thread and spawned futures. Frame
//! callbacks run separately in [`RuntimeHandle::drain_frame_callbacks`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::task::{Context, Waker};
use std::thread::ThreadId;

use futures_task::ArcWake;

use crate::collections::map::HashMap;
use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;
use crate::FrameCallbackId;

type QueuedTask = Box<dyn FnOnce()>;
type Continuation = Box<dyn FnOnce(Box<dyn Any>)>;
type FrameCallback = Box<dyn FnOnce(u64)>;
type SpawnedTask = Pin<Box<dyn Future<Output = ()>>>;

/// What a worker thread can send back to the UI thread.
enum Delivery {
    /// Run continuation `id` with `value`.
    Value { id: u64, value: Box<dyn Any + Send> },
    /// Drop continuation `id` unrun.
    Cancel { id: u64 },
}

struct Outbox {
    sender: mpsc::Sender<Delivery>,
    in_flight: AtomicUsize,
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl Outbox {
    fn send(&self, delivery: Delivery) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(delivery).is_err() {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            log::debug!("runtime dropped; delivery discarded");
            return;
        }
        self.scheduler.schedule_frame();
    }
}

/// Thread-safe sender for continuation results.
///
/// Workers never touch UI state directly. They post a value for a
/// continuation registered with [`RuntimeHandle::register_ui_cont`] and the
/// UI thread runs it on its next drain.
#[derive(Clone)]
pub struct UiDispatcher {
    outbox: Arc<Outbox>,
}

impl UiDispatcher {
    /// Delivers `value` to continuation `id`.
    pub fn post_invoke<T: Send + 'static>(&self, id: u64, value: T) {
        self.outbox.send(Delivery::Value {
            id,
            value: Box::new(value),
        });
    }

    /// Discards continuation `id` without running it. Whatever the
    /// continuation captured is dropped on the UI thread.
    pub fn post_cancel(&self, id: u64) {
        self.outbox.send(Delivery::Cancel { id });
    }

    pub fn has_pending(&self) -> bool {
        self.outbox.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Waker shared by every spawned task. Waking raises a flag; the next drain
/// polls all parked tasks.
struct WakeFlag {
    woken: AtomicBool,
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl ArcWake for WakeFlag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
        arc_self.scheduler.schedule_frame();
    }
}

struct Executor {
    scheduler: Arc<dyn RuntimeScheduler>,
    ui_thread: ThreadId,
    needs_frame: Cell<bool>,
    next_id: Cell<u64>,
    outbox: Arc<Outbox>,
    inbox: RefCell<mpsc::Receiver<Delivery>>,
    queue: RefCell<VecDeque<QueuedTask>>,
    continuations: RefCell<HashMap<u64, Continuation>>,
    tasks: RefCell<Vec<SpawnedTask>>,
    frame_callbacks: RefCell<Vec<(FrameCallbackId, FrameCallback)>>,
    wake_flag: Arc<WakeFlag>,
    waker: Waker,
}

impl Executor {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let (sender, inbox) = mpsc::channel();
        let wake_flag = Arc::new(WakeFlag {
            woken: AtomicBool::new(false),
            scheduler: Arc::clone(&scheduler),
        });
        let waker = futures_task::waker(Arc::clone(&wake_flag));
        Self {
            outbox: Arc::new(Outbox {
                sender,
                in_flight: AtomicUsize::new(0),
                scheduler: Arc::clone(&scheduler),
            }),
            scheduler,
            ui_thread: std::thread::current().id(),
            needs_frame: Cell::new(false),
            next_id: Cell::new(1),
            inbox: RefCell::new(inbox),
            queue: RefCell::new(VecDeque::new()),
            continuations: RefCell::new(HashMap::default()),
            tasks: RefCell::new(Vec::new()),
            frame_callbacks: RefCell::new(Vec::new()),
            wake_flag,
            waker,
        }
    }

    fn allocate_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn request_frame(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn enqueue(&self, task: QueuedTask) {
        self.queue.borrow_mut().push_back(task);
        self.request_frame();
    }

    fn spawn(&self, task: SpawnedTask) {
        self.tasks.borrow_mut().push(task);
        self.request_frame();
    }

    fn register_continuation(&self, continuation: Continuation) -> u64 {
        let id = self.allocate_id();
        self.continuations.borrow_mut().insert(id, continuation);
        id
    }

    fn take_delivery(&self) -> Option<Delivery> {
        self.inbox.borrow_mut().try_recv().ok()
    }

    fn apply_deliveries(&self) -> bool {
        let mut applied = false;
        while let Some(delivery) = self.take_delivery() {
            applied = true;
            match delivery {
                Delivery::Value { id, value } => {
                    let continuation = self.continuations.borrow_mut().remove(&id);
                    match continuation {
                        Some(continuation) => continuation(value),
                        None => log::trace!("no continuation {id}; value dropped"),
                    }
                }
                Delivery::Cancel { id } => {
                    let continuation = self.continuations.borrow_mut().remove(&id);
                    if continuation.is_some() {
                        log::trace!("continuation {id} cancelled");
                    }
                    drop(continuation);
                }
            }
            self.outbox.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        applied
    }

    fn pop_queued(&self) -> Option<QueuedTask> {
        self.queue.borrow_mut().pop_front()
    }

    fn run_queued(&self) -> bool {
        let mut ran = false;
        while let Some(task) = self.pop_queued() {
            ran = true;
            task();
        }
        ran
    }

    /// Polls every parked task once. Tasks spawned while polling wait for
    /// the next pass.
    fn poll_tasks(&self) -> bool {
        self.wake_flag.woken.store(false, Ordering::SeqCst);
        let batch = std::mem::take(&mut *self.tasks.borrow_mut());
        if batch.is_empty() {
            return false;
        }
        let polled = batch.len();
        let mut cx = Context::from_waker(&self.waker);
        let mut parked: Vec<SpawnedTask> = Vec::with_capacity(polled);
        for mut task in batch {
            if task.as_mut().poll(&mut cx).is_pending() {
                parked.push(task);
            }
        }
        let finished = parked.len() < polled;
        let mut tasks = self.tasks.borrow_mut();
        let spawned = !tasks.is_empty();
        parked.append(&mut tasks);
        *tasks = parked;
        finished || spawned || self.wake_flag.woken.load(Ordering::SeqCst)
    }

    fn drain(&self) {
        loop {
            let applied = self.apply_deliveries();
            let ran = self.run_queued();
            let progressed = self.poll_tasks();
            if !(applied || ran || progressed) {
                break;
            }
        }
        self.refresh_needs_frame();
    }

    fn has_pending(&self) -> bool {
        let queued = self
            .queue
            .try_borrow()
            .map(|queue| !queue.is_empty())
            .unwrap_or(true);
        queued || self.outbox.in_flight.load(Ordering::SeqCst) > 0
    }

    fn register_frame_callback(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = self.allocate_id();
        self.frame_callbacks.borrow_mut().push((id, callback));
        self.request_frame();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        self.frame_callbacks
            .borrow_mut()
            .retain(|(registered, _)| *registered != id);
        self.refresh_needs_frame();
    }

    fn run_frame_callbacks(&self, frame_time_nanos: u64) {
        let due = std::mem::take(&mut *self.frame_callbacks.borrow_mut());
        for (_, callback) in due {
            callback(frame_time_nanos);
        }
        self.refresh_needs_frame();
    }

    fn refresh_needs_frame(&self) {
        let pending = !self.frame_callbacks.borrow().is_empty()
            || !self.queue.borrow().is_empty()
            || self.outbox.in_flight.load(Ordering::SeqCst) > 0;
        self.needs_frame.set(pending);
    }
}

/// Owner of the UI-thread executor. Dropping it turns every
/// [`RuntimeHandle`] into a no-op.
pub struct Runtime {
    executor: Rc<Executor>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            executor: Rc::new(Executor::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            executor: Rc::downgrade(&self.executor),
            dispatcher: UiDispatcher {
                outbox: Arc::clone(&self.executor.outbox),
            },
            ui_thread: self.executor.ui_thread,
        }
    }

    /// Whether queued work or frame callbacks are waiting for the host.
    pub fn needs_frame(&self) -> bool {
        self.executor.needs_frame.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

/// Scheduler for hosts that drive the runtime by polling.
#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Non-owning handle to a [`Runtime`]. Operations on a dropped runtime are
/// no-ops.
#[derive(Clone)]
pub struct RuntimeHandle {
    executor: Weak<Executor>,
    dispatcher: UiDispatcher,
    ui_thread: ThreadId,
}

impl RuntimeHandle {
    /// Queues `task` for the next drain. Runs it immediately when the
    /// runtime is gone.
    pub fn enqueue_ui_task(&self, task: impl FnOnce() + 'static) {
        match self.executor.upgrade() {
            Some(executor) => executor.enqueue(Box::new(task)),
            None => task(),
        }
    }

    /// Spawns a future on the UI thread. Returns `false` when the runtime
    /// is gone and the future was dropped.
    pub fn spawn_ui(&self, future: impl Future<Output = ()> + 'static) -> bool {
        match self.executor.upgrade() {
            Some(executor) => {
                executor.spawn(Box::pin(future));
                true
            }
            None => false,
        }
    }

    pub fn pending_task_count(&self) -> usize {
        self.executor
            .upgrade()
            .map(|executor| executor.tasks.borrow().len())
            .unwrap_or(0)
    }

    /// Registers a one-shot continuation for a value of type `T` posted
    /// through [`UiDispatcher::post_invoke`].
    pub fn register_ui_cont<T: 'static>(
        &self,
        continuation: impl FnOnce(T) + 'static,
    ) -> Option<u64> {
        let executor = self.executor.upgrade()?;
        let id = executor.register_continuation(Box::new(move |value: Box<dyn Any>| {
            match value.downcast::<T>() {
                Ok(value) => continuation(*value),
                Err(_) => log::error!("continuation received a value of the wrong type"),
            }
        }));
        Some(id)
    }

    pub fn drain_ui(&self) {
        if let Some(executor) = self.executor.upgrade() {
            executor.drain();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.executor
            .upgrade()
            .map(|executor| executor.has_pending())
            .unwrap_or(false)
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        let executor = self.executor.upgrade()?;
        Some(executor.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(executor) = self.executor.upgrade() {
            executor.cancel_frame_callback(id);
        }
    }

    /// Runs the callbacks registered before this call with the frame time.
    /// Callbacks registered while running wait for the next frame.
    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(executor) = self.executor.upgrade() {
            executor.run_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.executor
            .upgrade()
            .map(|executor| !executor.frame_callbacks.borrow().is_empty())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }

    pub fn assert_ui_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread,
            "UI state touched off the UI thread"
        );
    }

    pub fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }
}
