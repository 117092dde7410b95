#![forbid(unsafe_code)]

//! Memoized views derived from a [`Store`].
//!
//! A [`Selector`] maps the store's history to a smaller value (a count, a
//! flag pair, a filtered list) and only reports a change when that derived
//! value actually differs. Readers that render from a selector are not
//! disturbed by unrelated history changes.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use rewind_runtime::{Store, Undoable, reducer_fn};
//!
//! let store = Store::new(
//!     reducer_fn(|n: &i64, a: &Undoable<i64>| match a {
//!         Undoable::Apply(d) => Ok::<_, String>(n + d),
//!         _ => Ok(*n),
//!     }),
//!     0,
//! );
//! let hits = Rc::new(Cell::new(0));
//! let hits_clone = Rc::clone(&hits);
//! let sign = store.select(
//!     |h| h.present().signum(),
//!     move |_| hits_clone.set(hits_clone.get() + 1),
//! );
//!
//! store.dispatch(Undoable::Apply(3)).unwrap(); // 0 -> 1
//! store.dispatch(Undoable::Apply(4)).unwrap(); // still 1
//! assert_eq!(sign.get(), 1);
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::store::{Store, Subscription};
use crate::undo::{History, HistoryAction, Reducer};

/// A cached value derived from a store, refreshed on every history change.
///
/// Dropping the selector unsubscribes it.
pub struct Selector<T> {
    value: Rc<RefCell<T>>,
    _subscription: Subscription,
}

impl<T: fmt::Debug> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("value", &self.value.borrow())
            .finish_non_exhaustive()
    }
}

impl<T: Clone> Selector<T> {
    /// The latest derived value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Access the latest derived value by reference.
    ///
    /// `f` receives a copy, so it may write to the store that feeds this
    /// selector.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        let value = self.get();
        f(&value)
    }
}

impl<R> Store<R>
where
    R: Reducer + 'static,
    R::State: 'static,
    R::Action: HistoryAction,
    R::Error: fmt::Display,
{
    /// Derive `select(history)` now and after every change, calling
    /// `on_change` only when the derived value differs from the cached one.
    pub fn select<T, F, C>(&self, select: F, on_change: C) -> Selector<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&History<R::State>) -> T + 'static,
        C: Fn(&T) + 'static,
    {
        let value = Rc::new(RefCell::new(self.with_history(&select)));
        let cache = Rc::clone(&value);
        let subscription = self.subscribe(move |history| {
            let next = select(history);
            if *cache.borrow() == next {
                return;
            }
            cache.replace(next.clone());
            on_change(&next);
        });
        Selector {
            value,
            _subscription: subscription,
        }
    }

    /// Derived undo/redo availability, for enabling and disabling controls.
    pub fn select_availability(
        &self,
        on_change: impl Fn(&(bool, bool)) + 'static,
    ) -> Selector<(bool, bool)> {
        self.select(|h| (h.has_past(), h.has_future()), on_change)
    }
}
