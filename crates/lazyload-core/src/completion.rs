//! One-shot completion signal joining a producer with a single awaiting task.
//!
//! Fetch results and the end of a fade-out are delivered through this type.
//! A [`Completer`] dropped without a value marks the signal abandoned.
//! [`Completion::poll_settled`] reports that as `None`; awaiting the
//! completion directly stays pending.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

enum Slot<T> {
    Empty,
    Filled(T),
    Taken,
    Abandoned,
}

struct Shared<T> {
    slot: Slot<T>,
    waker: Option<Waker>,
}

/// Producer side of a one-shot signal.
pub struct Completer<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

/// Consumer side of a one-shot signal; a future resolving to the value.
pub struct Completion<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

/// Creates a connected completer/completion pair.
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let shared = Rc::new(RefCell::new(Shared {
        slot: Slot::Empty,
        waker: None,
    }));
    (
        Completer {
            shared: Rc::clone(&shared),
        },
        Completion { shared },
    )
}

impl<T> Completer<T> {
    /// Stores `value` and wakes the awaiting task. Later calls are ignored.
    pub fn complete(&self, value: T) {
        self.settle(Slot::Filled(value));
    }

    fn settle(&self, slot: Slot<T>) {
        let waker = {
            let mut shared = self.shared.borrow_mut();
            if !matches!(shared.slot, Slot::Empty) {
                return;
            }
            shared.slot = slot;
            shared.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        self.settle(Slot::Abandoned);
    }
}

impl<T> Completion<T> {
    /// A completion that is already resolved.
    pub fn ready(value: T) -> Self {
        let (completer, completion) = completion();
        completer.complete(value);
        completion
    }

    /// Takes the value if it has already been produced, without waiting.
    pub fn try_take(&mut self) -> Option<T> {
        let mut shared = self.shared.borrow_mut();
        match std::mem::replace(&mut shared.slot, Slot::Taken) {
            Slot::Filled(value) => Some(value),
            other => {
                shared.slot = other;
                None
            }
        }
    }

    /// Like polling the future, but resolves to `None` when the completer
    /// was dropped unanswered.
    pub fn poll_settled(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let mut shared = self.shared.borrow_mut();
        match std::mem::replace(&mut shared.slot, Slot::Taken) {
            Slot::Filled(value) => Poll::Ready(Some(value)),
            Slot::Abandoned => {
                shared.slot = Slot::Abandoned;
                Poll::Ready(None)
            }
            other => {
                shared.slot = other;
                shared.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().poll_settled(cx) {
            Poll::Ready(Some(value)) => Poll::Ready(value),
            Poll::Ready(None) | Poll::Pending => Poll::Pending,
        }
    }
}
