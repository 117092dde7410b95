#![forbid(unsafe_code)]

//! Shared store wrapping one undoable history.
//!
//! # Design
//!
//! [`Store<R>`] holds an [`UndoableReducer<R>`] and the current
//! [`History`] in shared, reference-counted storage (`Rc<RefCell<..>>`).
//! Cloning a store hands out another handle to the same history, which is
//! how distant parts of an application get read and write access without
//! threading the value through every call.
//!
//! When the history changes, live subscribers are notified in registration
//! order with the new history.
//!
//! # Serialization
//!
//! Dispatches are processed one at a time. A dispatch (or undo/redo) issued
//! from inside a subscriber callback is queued and run after the current
//! notification round has finished, so every subscriber sees each committed
//! history exactly once and in order. Errors from queued dispatches cannot
//! be returned to the callback that issued them; they are logged at `warn`.
//!
//! # Failure Modes
//!
//! - **Rejected action**: the base reducer's error is returned from
//!   [`dispatch`](Store::dispatch), the history is unchanged and nobody is
//!   notified.
//! - **No-op undo/redo**: returns `false`, nobody is notified.
//! - **Subscriber leak**: dead subscribers (dropped [`Subscription`]
//!   guards) are pruned lazily during notification.
//! - **Panicking subscriber**: the panic propagates out of the write that
//!   triggered it. The change stays committed and the store accepts new
//!   writes once the caller recovers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use tracing::{debug, info_span, warn};
use web_time::Instant;

use crate::undo::{History, HistoryAction, HistoryConfig, HistoryOp, Reducer, UndoableReducer};

type CallbackRc<S> = Rc<dyn Fn(&History<S>)>;
type CallbackWeak<S> = Weak<dyn Fn(&History<S>)>;

/// Work submitted while subscribers were being notified.
enum Pending<A> {
    Action(A),
    Step(HistoryOp),
}

struct StoreInner<R: Reducer> {
    reducer: UndoableReducer<R>,
    history: History<R::State>,
    version: u64,
    /// Stored as weak references. Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<R::State>>,
    notifying: bool,
    pending: VecDeque<Pending<R::Action>>,
}

/// Cloneable handle to one undoable history.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 each time the history changes.
/// 2. Rejected actions and no-op undo/redo leave history and version alone.
/// 3. Subscribers are notified in registration order, once per change.
/// 4. Work issued during notification runs after the round completes.
pub struct Store<R: Reducer> {
    inner: Rc<RefCell<StoreInner<R>>>,
}

// Manual Clone: shares the same Rc.
impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: Reducer> fmt::Debug for Store<R>
where
    R::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("history", &inner.history)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<R> Store<R>
where
    R: Reducer + 'static,
    R::State: 'static,
    R::Action: HistoryAction,
    R::Error: fmt::Display,
{
    /// Create a store over `reducer`, starting at `initial` with unbounded
    /// history.
    #[must_use]
    pub fn new(reducer: R, initial: R::State) -> Self {
        Self::with_config(reducer, initial, HistoryConfig::default())
    }

    /// Create a store whose history is capped by `config`.
    #[must_use]
    pub fn with_config(reducer: R, initial: R::State, config: HistoryConfig) -> Self {
        Self::from_reducer(UndoableReducer::with_config(reducer, config), initial)
    }

    /// Create a store from an already wrapped reducer.
    #[must_use]
    pub fn from_reducer(reducer: UndoableReducer<R>, initial: R::State) -> Self {
        let history = reducer.init(initial);
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                reducer,
                history,
                version: 0,
                subscribers: Vec::new(),
                notifying: false,
                pending: VecDeque::new(),
            })),
        }
    }

    // ====================================================================
    // Writes
    // ====================================================================

    /// Run `action` through the undoable reducer and commit the result.
    ///
    /// Reserved undo/redo actions are handled like [`undo`](Self::undo) and
    /// [`redo`](Self::redo). When called from inside a subscriber the action
    /// is queued and `Ok(())` is returned immediately.
    pub fn dispatch(&self, action: R::Action) -> Result<(), R::Error> {
        if self.is_notifying() {
            self.enqueue(Pending::Action(action));
            return Ok(());
        }

        let next = {
            let inner = self.inner.borrow();
            inner.reducer.reduce(&inner.history, &action)
        };
        match next {
            Ok(history) => {
                self.commit(history);
                self.drain_pending();
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "store rejected action");
                Err(err)
            }
        }
    }

    /// Step back one snapshot. Returns whether the history changed.
    pub fn undo(&self) -> bool {
        self.step(HistoryOp::Undo)
    }

    /// Step forward one snapshot. Returns whether the history changed.
    pub fn redo(&self) -> bool {
        self.step(HistoryOp::Redo)
    }

    /// Subscribe to history changes.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes the
    /// callback.
    pub fn subscribe(&self, callback: impl Fn(&History<R::State>) + 'static) -> Subscription {
        let strong: CallbackRc<R::State> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    // ====================================================================
    // Reads
    // ====================================================================

    /// The present snapshot.
    #[must_use]
    pub fn present(&self) -> Arc<R::State> {
        Arc::clone(self.inner.borrow().history.present())
    }

    #[must_use]
    pub fn has_past(&self) -> bool {
        self.inner.borrow().history.has_past()
    }

    #[must_use]
    pub fn has_future(&self) -> bool {
        self.inner.borrow().history.has_future()
    }

    /// A copy of the whole history (cheap: snapshots are shared).
    #[must_use]
    pub fn history(&self) -> History<R::State> {
        self.inner.borrow().history.clone()
    }

    /// Access the history by reference.
    ///
    /// `f` sees a snapshot taken before the call, so it may dispatch, undo
    /// or redo on this store.
    pub fn with_history<T>(&self, f: impl FnOnce(&History<R::State>) -> T) -> T {
        let history = self.history();
        f(&history)
    }

    /// Number of committed changes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn is_notifying(&self) -> bool {
        self.inner.borrow().notifying
    }

    fn enqueue(&self, pending: Pending<R::Action>) {
        let mut inner = self.inner.borrow_mut();
        inner.pending.push_back(pending);
        debug!(queued = inner.pending.len(), "store busy, deferring");
    }

    fn step(&self, op: HistoryOp) -> bool {
        if self.is_notifying() {
            self.enqueue(Pending::Step(op));
            return false;
        }
        let next = {
            let inner = self.inner.borrow();
            match op {
                HistoryOp::Undo => inner.history.undo(),
                HistoryOp::Redo => inner.history.redo(),
            }
        };
        let changed = self.commit(next);
        self.drain_pending();
        changed
    }

    /// Install `next` unless it is the current history. Returns whether a
    /// change was committed.
    fn commit(&self, next: History<R::State>) -> bool {
        let version = {
            let mut inner = self.inner.borrow_mut();
            if next.is_same(&inner.history) {
                return false;
            }
            inner.history = next;
            inner.version += 1;
            inner.version
        };
        self.notify(version);
        true
    }

    fn drain_pending(&self) {
        loop {
            let next = self.inner.borrow_mut().pending.pop_front();
            match next {
                None => break,
                Some(Pending::Action(action)) => {
                    if let Err(err) = self.dispatch(action) {
                        warn!(error = %err, "deferred dispatch failed");
                    }
                }
                Some(Pending::Step(op)) => {
                    self.step(op);
                }
            }
        }
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self, version: u64) {
        // Collect live callbacks first so no borrow is held during calls.
        let (callbacks, history) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<CallbackRc<R::State>> = inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect();
            (callbacks, inner.history.clone())
        };

        if callbacks.is_empty() {
            return;
        }

        let subscribers = callbacks.len() as u64;
        let started = Instant::now();
        let _span = info_span!(
            "store.notify",
            version,
            subscribers,
            duration_us = tracing::field::Empty
        )
        .entered();

        let round = NotifyingGuard::enter(&self.inner);
        for cb in &callbacks {
            cb(&history);
        }
        drop(round);

        let duration_us = started.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
    }
}

/// Holds `notifying` for one round and clears it on drop, including when a
/// subscriber unwinds.
struct NotifyingGuard<'a, R: Reducer> {
    inner: &'a RefCell<StoreInner<R>>,
}

impl<'a, R: Reducer> NotifyingGuard<'a, R> {
    fn enter(inner: &'a RefCell<StoreInner<R>>) -> Self {
        inner.borrow_mut().notifying = true;
        Self { inner }
    }
}

impl<R: Reducer> Drop for NotifyingGuard<'_, R> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.notifying = false;
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong `Rc` behind the callback,
/// so the weak entry in the store's list fails to upgrade from then on.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::Undoable;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    /// Adds the delta; a zero delta is rejected.
    struct Counter;

    impl Reducer for Counter {
        type State = i64;
        type Action = Undoable<i64>;
        type Error = String;

        fn reduce(&self, state: &i64, action: &Undoable<i64>) -> Result<i64, String> {
            match action {
                Undoable::Apply(0) => Err("zero delta".to_string()),
                Undoable::Apply(delta) => Ok(state + delta),
                other => Err(format!("{other:?} is reserved")),
            }
        }
    }

    fn store() -> Store<Counter> {
        Store::new(Counter, 0)
    }

    #[test]
    fn dispatch_updates_present_and_version() {
        let store = store();
        assert_eq!(*store.present(), 0);
        assert_eq!(store.version(), 0);

        store.dispatch(Undoable::Apply(5)).unwrap();
        assert_eq!(*store.present(), 5);
        assert_eq!(store.version(), 1);
        assert!(store.has_past());
        assert!(!store.has_future());
    }

    #[test]
    fn undo_redo_toggle_flags() {
        let store = store();
        store.dispatch(Undoable::Apply(1)).unwrap();

        assert!(store.undo());
        assert_eq!(*store.present(), 0);
        assert!(!store.has_past());
        assert!(store.has_future());

        assert!(store.redo());
        assert_eq!(*store.present(), 1);
        assert!(!store.has_future());
    }

    #[test]
    fn reserved_actions_route_through_dispatch() {
        let store = store();
        store.dispatch(Undoable::Apply(3)).unwrap();
        store.dispatch(Undoable::Undo).unwrap();
        assert_eq!(*store.present(), 0);
        store.dispatch(Undoable::Redo).unwrap();
        assert_eq!(*store.present(), 3);
    }

    #[test]
    fn noop_undo_does_not_notify() {
        let store = store();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = store.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        assert!(!store.undo());
        assert!(!store.redo());
        store.dispatch(Undoable::Undo).unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn rejected_dispatch_leaves_store_alone() {
        let store = store();
        store.dispatch(Undoable::Apply(2)).unwrap();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = store.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        let err = store.dispatch(Undoable::Apply(0)).unwrap_err();
        assert_eq!(err, "zero delta");
        assert_eq!(*store.present(), 2);
        assert_eq!(store.version(), 1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn subscriber_receives_new_history() {
        let store = store();
        let last_seen = Rc::new(Cell::new(0));
        let last_clone = Rc::clone(&last_seen);
        let _sub = store.subscribe(move |h| last_clone.set(**h.present()));

        store.dispatch(Undoable::Apply(42)).unwrap();
        assert_eq!(last_seen.get(), 42);

        store.undo();
        assert_eq!(last_seen.get(), 0);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let store = store();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _s1 = store.subscribe(move |_| l1.borrow_mut().push('a'));
        let l2 = Rc::clone(&log);
        let _s2 = store.subscribe(move |_| l2.borrow_mut().push('b'));
        let l3 = Rc::clone(&log);
        let _s3 = store.subscribe(move |_| l3.borrow_mut().push('c'));

        store.dispatch(Undoable::Apply(1)).unwrap();
        assert_eq!(*log.borrow(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let store = store();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = store.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        store.dispatch(Undoable::Apply(1)).unwrap();
        assert_eq!(count.get(), 1);

        drop(sub);
        store.dispatch(Undoable::Apply(1)).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn clone_shares_history() {
        let a = store();
        let b = a.clone();
        a.dispatch(Undoable::Apply(7)).unwrap();
        assert_eq!(*b.present(), 7);
        b.undo();
        assert_eq!(*a.present(), 0);
        assert_eq!(a.version(), 2);
    }

    #[test]
    fn reentrant_dispatch_is_deferred() {
        let store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let writer = store.clone();
        let _follow_up = store.subscribe(move |h| {
            if **h.present() == 1 {
                // Reads are fine mid-notification.
                assert_eq!(*writer.present(), 1);
                writer.dispatch(Undoable::Apply(10)).unwrap();
            }
        });
        let seen_clone = Rc::clone(&seen);
        let _recorder = store.subscribe(move |h| seen_clone.borrow_mut().push(**h.present()));

        store.dispatch(Undoable::Apply(1)).unwrap();

        assert_eq!(*store.present(), 11);
        assert_eq!(*seen.borrow(), vec![1, 11]);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn reentrant_failure_is_swallowed() {
        let store = store();
        let writer = store.clone();
        let _sub = store.subscribe(move |h| {
            if **h.present() == 1 {
                writer.dispatch(Undoable::Apply(0)).unwrap();
            }
        });

        store.dispatch(Undoable::Apply(1)).unwrap();
        assert_eq!(*store.present(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn reentrant_undo_is_deferred() {
        let store = store();
        let writer = store.clone();
        let _sub = store.subscribe(move |h| {
            if **h.present() == 5 {
                assert!(!writer.undo());
            }
        });

        store.dispatch(Undoable::Apply(5)).unwrap();
        assert_eq!(*store.present(), 0);
        assert!(store.has_future());
    }

    #[test]
    fn config_caps_history() {
        let store = Store::with_config(Counter, 0, HistoryConfig::new(2));
        for _ in 0..5 {
            store.dispatch(Undoable::Apply(1)).unwrap();
        }
        assert_eq!(store.with_history(History::past_depth), 2);
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(*store.present(), 3);
    }

    #[test]
    fn with_history_may_undo() {
        let store = store();
        store.dispatch(Undoable::Apply(4)).unwrap();

        let undone = store.with_history(|h| h.has_past() && store.undo());
        assert!(undone);
        assert_eq!(*store.present(), 0);
        assert!(!store.with_history(|h| h.has_past() && store.undo()));
    }

    #[test]
    fn with_history_may_dispatch() {
        let store = store();
        store
            .with_history(|h| store.dispatch(Undoable::Apply(**h.present() + 3)))
            .unwrap();
        assert_eq!(*store.present(), 3);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_wedge_store() {
        let store = store();
        let sub = store.subscribe(|h| {
            if **h.present() == 1 {
                panic!("subscriber failed");
            }
        });

        let result = catch_unwind(AssertUnwindSafe(|| store.dispatch(Undoable::Apply(1))));
        assert!(result.is_err());
        assert_eq!(*store.present(), 1);

        drop(sub);
        store.dispatch(Undoable::Apply(5)).unwrap();
        assert_eq!(*store.present(), 6);
        assert_eq!(store.version(), 2);
        assert!(store.undo());
        assert_eq!(*store.present(), 1);
    }

    #[test]
    fn debug_format() {
        let store = store();
        let s = format!("{store:?}");
        assert!(s.contains("Store"));
        assert!(s.contains("version"));
    }
}
