use std::cell::RefCell;
use std::rc::Rc;

/// Single-threaded shared cell for state that several runtime tasks touch.
///
/// Cloning an `Owned` clones the handle, not the value. Every clone observes
/// the same `T`, so a document or cache can be handed to spawned tasks
/// without lifetimes leaking into their futures. Borrows never escape the
/// closures passed to [`Owned::with`] and [`Owned::update`].
pub struct Owned<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Clone for Owned<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Default> Default for Owned<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Owned<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&*self.cell.borrow())
    }

    pub fn update<R>(&self, write: impl FnOnce(&mut T) -> R) -> R {
        write(&mut *self.cell.borrow_mut())
    }
}
