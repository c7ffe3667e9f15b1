#![forbid(unsafe_code)]

//! Persistent cells for component state.
//!
//! # Design
//!
//! [`MutableBox<T>`] wraps a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). Cloning a box hands out another handle to the **same**
//! value, so a component and the callbacks it gives away all observe one
//! allocation for the component's whole lifetime. Writes never request a
//! commit.
//!
//! [`Memo<T>`] holds a value that is computed on first access and then reused.
//!
//! # Failure Modes
//!
//! - **Re-entrant borrow**: Holding a [`MutableBox::borrow_mut`] guard while
//!   calling code that borrows the same box panics (RefCell rules). Callers
//!   that invoke user callbacks must release the guard first.

use std::cell::{OnceCell, Ref, RefCell, RefMut};
use std::rc::Rc;

/// A mutable value shared across commits.
///
/// # Invariants
///
/// 1. All clones point at the same allocation.
/// 2. Mutation through any clone is visible through every other clone.
pub struct MutableBox<T> {
    inner: Rc<RefCell<T>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for MutableBox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for MutableBox<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(value) => f.debug_tuple("MutableBox").field(&*value).finish(),
            Err(_) => f.debug_tuple("MutableBox").field(&"<borrowed>").finish(),
        }
    }
}

impl<T: Default> Default for MutableBox<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> MutableBox<T> {
    /// Allocate a new box.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Immutable borrow of the value.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Mutable borrow of the value.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Access the value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Modify the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    /// Whether two boxes share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> MutableBox<T> {
    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

/// A value initialized at most once.
#[derive(Debug)]
pub struct Memo<T> {
    cell: OnceCell<T>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Memo<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the memoized value, computing it with `init` on first access.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(init)
    }

    /// The value if it has been computed.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}
