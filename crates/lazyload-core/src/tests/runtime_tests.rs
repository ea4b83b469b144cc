use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Default)]
struct CountingScheduler {
    frames: AtomicUsize,
}

impl RuntimeScheduler for CountingScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

fn test_runtime() -> (Runtime, Arc<CountingScheduler>) {
    let scheduler = Arc::new(CountingScheduler::default());
    (Runtime::new(scheduler.clone()), scheduler)
}

#[test]
fn spawned_task_completes_when_signal_fires() {
    let (runtime, _) = test_runtime();
    let handle = runtime.handle();
    let (completer, signal) = completion::<u32>();
    let observed = Rc::new(Cell::new(0));

    {
        let observed = Rc::clone(&observed);
        handle.spawn_ui(async move {
            observed.set(signal.await);
        });
    }

    handle.drain_ui();
    assert_eq!(observed.get(), 0);
    assert_eq!(handle.pending_task_count(), 1);

    completer.complete(7);
    handle.drain_ui();
    assert_eq!(observed.get(), 7);
    assert_eq!(handle.pending_task_count(), 0);
}

#[test]
fn ready_completion_can_be_taken_synchronously() {
    let mut signal = Completion::ready("cached");
    assert_eq!(signal.try_take(), Some("cached"));
    assert_eq!(signal.try_take(), None);
}

#[test]
fn completer_ignores_second_value() {
    let (completer, mut signal) = completion::<u8>();
    completer.complete(1);
    completer.complete(2);
    assert_eq!(signal.try_take(), Some(1));
}

#[test]
fn continuation_posted_from_another_thread_runs_on_drain() {
    let (runtime, scheduler) = test_runtime();
    let handle = runtime.handle();
    let received = Rc::new(RefCell::new(None));
    let id = {
        let received = Rc::clone(&received);
        handle
            .register_ui_cont(move |value: String| {
                *received.borrow_mut() = Some(value);
            })
            .expect("runtime alive")
    };

    let dispatcher = handle.dispatcher();
    std::thread::spawn(move || dispatcher.post_invoke(id, String::from("/a.jpg")))
        .join()
        .expect("worker thread");

    assert!(runtime.needs_frame());
    assert!(scheduler.frames.load(Ordering::SeqCst) > 0);
    handle.drain_ui();
    assert_eq!(received.borrow().as_deref(), Some("/a.jpg"));
}

#[test]
fn cancelled_continuation_is_dropped_unrun() {
    let (runtime, _) = test_runtime();
    let handle = runtime.handle();
    let fired = Rc::new(Cell::new(false));
    let (completer, mut signal) = completion::<()>();
    let id = {
        let fired = Rc::clone(&fired);
        handle
            .register_ui_cont(move |_: ()| {
                fired.set(true);
                completer.complete(());
            })
            .expect("runtime alive")
    };

    let dispatcher = handle.dispatcher();
    dispatcher.post_cancel(id);
    dispatcher.post_invoke(id, ());
    assert!(dispatcher.has_pending());
    handle.drain_ui();

    assert!(!fired.get());
    assert!(!dispatcher.has_pending());
    assert_eq!(signal.try_take(), None);
    let mut cx = Context::from_waker(futures_task::noop_waker_ref());
    assert_eq!(signal.poll_settled(&mut cx), Poll::Ready(None));
}

#[test]
fn dropped_completer_settles_waiter_as_abandoned() {
    let (runtime, _) = test_runtime();
    let handle = runtime.handle();
    let (completer, mut signal) = completion::<u32>();
    let settled = Rc::new(Cell::new(None));
    {
        let settled = Rc::clone(&settled);
        handle.spawn_ui(async move {
            let value = std::future::poll_fn(|cx| signal.poll_settled(cx)).await;
            settled.set(Some(value));
        });
    }
    handle.drain_ui();
    assert_eq!(handle.pending_task_count(), 1);

    drop(completer);
    handle.drain_ui();
    assert_eq!(settled.get(), Some(None));
    assert_eq!(handle.pending_task_count(), 0);
}

#[test]
fn frame_callbacks_fire_once_with_frame_time() {
    let (runtime, _) = test_runtime();
    let clock = runtime.frame_clock();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _registration = {
        let seen = Rc::clone(&seen);
        clock.with_frame_nanos(move |nanos| seen.borrow_mut().push(nanos / 1_000_000))
    };

    let handle = runtime.handle();
    assert!(handle.has_frame_callbacks());
    handle.drain_frame_callbacks(32_000_000);
    handle.drain_frame_callbacks(48_000_000);
    assert_eq!(seen.borrow().as_slice(), &[32]);
    assert!(!runtime.needs_frame());
}

#[test]
fn dropping_registration_cancels_callback() {
    let (runtime, _) = test_runtime();
    let fired = Rc::new(Cell::new(false));
    let registration = {
        let fired = Rc::clone(&fired);
        runtime
            .frame_clock()
            .with_frame_nanos(move |_| fired.set(true))
    };
    drop(registration);
    runtime.handle().drain_frame_callbacks(1);
    assert!(!fired.get());
}

#[test]
fn callbacks_registered_during_a_frame_wait_for_the_next() {
    let (runtime, _) = test_runtime();
    let handle = runtime.handle();
    let clock = runtime.frame_clock();
    let frames = Rc::new(RefCell::new(Vec::new()));
    let chained = Rc::new(RefCell::new(None));
    let first = {
        let frames = Rc::clone(&frames);
        let chained_slot = Rc::clone(&chained);
        clock.clone().with_frame_nanos(move |first| {
            frames.borrow_mut().push(first);
            let frames = Rc::clone(&frames);
            *chained_slot.borrow_mut() =
                Some(clock.with_frame_nanos(move |second| frames.borrow_mut().push(second)));
        })
    };
    assert!(first.is_active());

    handle.drain_frame_callbacks(16_000_000);
    assert_eq!(frames.borrow().as_slice(), &[16_000_000]);
    assert!(runtime.needs_frame());
    handle.drain_frame_callbacks(32_000_000);
    assert_eq!(frames.borrow().as_slice(), &[16_000_000, 32_000_000]);
    assert!(!runtime.needs_frame());
}

#[test]
fn queued_tasks_run_in_order_and_may_queue_more() {
    let (runtime, _) = test_runtime();
    let handle = runtime.handle();
    let order = Rc::new(RefCell::new(Vec::new()));
    {
        let order = Rc::clone(&order);
        let nested = handle.clone();
        handle.enqueue_ui_task(move || {
            order.borrow_mut().push(1);
            let order = Rc::clone(&order);
            nested.enqueue_ui_task(move || order.borrow_mut().push(3));
        });
    }
    {
        let order = Rc::clone(&order);
        handle.enqueue_ui_task(move || order.borrow_mut().push(2));
    }
    assert!(handle.has_pending_ui());
    handle.drain_ui();
    assert_eq!(order.borrow().as_slice(), &[1, 2, 3]);
    assert!(!handle.has_pending_ui());
}

#[test]
fn owned_handles_share_value() {
    let owned = Owned::new(vec![1]);
    let other = owned.clone();
    other.update(|values| values.push(2));
    assert_eq!(owned.with(|values| values.len()), 2);
}
