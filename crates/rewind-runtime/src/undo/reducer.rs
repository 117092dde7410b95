#![forbid(unsafe_code)]

//! The reducer seam and the undo/redo envelope around it.
//!
//! Applications implement [`Reducer`] as a pure transition over their own
//! snapshot type. [`UndoableReducer`] lifts that reducer onto a
//! [`History`] and handles the two reserved actions itself, so the base
//! reducer never learns that history exists.
//!
//! Reserved actions are identified through [`HistoryAction`]. A closed
//! action enum marks its own `Undo`/`Redo` variants; callers without such
//! variants can wrap their actions in [`Undoable`].

use std::fmt;
use std::marker::PhantomData;

use super::history::{History, HistoryConfig};

/// The two actions the history envelope intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryOp {
    Undo,
    Redo,
}

/// Classifies an action as reserved (undo/redo) or forwardable.
pub trait HistoryAction {
    /// `Some` for the reserved undo/redo actions, `None` for everything the
    /// base reducer should see.
    fn history_op(&self) -> Option<HistoryOp>;
}

/// Generic envelope for action types that have no undo/redo variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undoable<A> {
    Undo,
    Redo,
    Apply(A),
}

impl<A> HistoryAction for Undoable<A> {
    fn history_op(&self) -> Option<HistoryOp> {
        match self {
            Self::Undo => Some(HistoryOp::Undo),
            Self::Redo => Some(HistoryOp::Redo),
            Self::Apply(_) => None,
        }
    }
}

impl<A> From<HistoryOp> for Undoable<A> {
    fn from(op: HistoryOp) -> Self {
        match op {
            HistoryOp::Undo => Self::Undo,
            HistoryOp::Redo => Self::Redo,
        }
    }
}

/// A pure state transition.
///
/// `reduce` must not mutate anything it can observe elsewhere: given the
/// same snapshot and action it returns the same next snapshot or the same
/// error.
pub trait Reducer {
    /// The snapshot type.
    type State;
    /// The action type.
    type Action;
    /// Raised when an action cannot be applied to a snapshot.
    type Error;

    /// Compute the snapshot that follows `state` under `action`.
    fn reduce(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<Self::State, Self::Error>;
}

/// Adapts a closure into a [`Reducer`].
pub struct FnReducer<S, A, E, F> {
    f: F,
    _marker: PhantomData<fn(&S, &A) -> Result<S, E>>,
}

impl<S, A, E, F> fmt::Debug for FnReducer<S, A, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReducer").finish_non_exhaustive()
    }
}

impl<S, A, E, F: Clone> Clone for FnReducer<S, A, E, F> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// Build a [`Reducer`] from `Fn(&state, &action) -> Result<state, error>`.
pub fn reducer_fn<S, A, E, F>(f: F) -> FnReducer<S, A, E, F>
where
    F: Fn(&S, &A) -> Result<S, E>,
{
    FnReducer {
        f,
        _marker: PhantomData,
    }
}

impl<S, A, E, F> Reducer for FnReducer<S, A, E, F>
where
    F: Fn(&S, &A) -> Result<S, E>,
{
    type State = S;
    type Action = A;
    type Error = E;

    fn reduce(&self, state: &S, action: &A) -> Result<S, E> {
        (self.f)(state, action)
    }
}

/// Lifts a [`Reducer`] onto a [`History`] of its snapshots.
///
/// - Reserved actions ([`HistoryAction::history_op`] is `Some`) step the
///   history back or forward and never reach the base reducer.
/// - Every other action is forwarded to the base reducer against the
///   present snapshot. On success the result is pushed and the redo branch
///   is dropped; on failure the error propagates and the history is left
///   as it was.
#[derive(Debug, Clone)]
pub struct UndoableReducer<R> {
    inner: R,
    config: HistoryConfig,
}

impl<R: Reducer> UndoableReducer<R>
where
    R::Action: HistoryAction,
{
    /// Wrap `inner` with an unbounded history.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, HistoryConfig::default())
    }

    /// Wrap `inner`, capping retained history with `config`.
    #[must_use]
    pub fn with_config(inner: R, config: HistoryConfig) -> Self {
        Self { inner, config }
    }

    /// Create the starting history for `initial`.
    #[must_use]
    pub fn init(&self, initial: R::State) -> History<R::State> {
        History::with_config(initial, self.config)
    }

    /// The wrapped base reducer.
    #[must_use]
    pub fn inner(&self) -> &R {
        &self.inner
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

impl<R: Reducer> Reducer for UndoableReducer<R>
where
    R::Action: HistoryAction,
{
    type State = History<R::State>;
    type Action = R::Action;
    type Error = R::Error;

    fn reduce(
        &self,
        history: &History<R::State>,
        action: &R::Action,
    ) -> Result<History<R::State>, R::Error> {
        match action.history_op() {
            Some(HistoryOp::Undo) => Ok(history.undo()),
            Some(HistoryOp::Redo) => Ok(history.redo()),
            None => history.apply(|present| self.inner.reduce(present, action)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum CounterAction {
        Add(i64),
        Fail,
        Undo,
        Redo,
    }

    impl HistoryAction for CounterAction {
        fn history_op(&self) -> Option<HistoryOp> {
            match self {
                Self::Undo => Some(HistoryOp::Undo),
                Self::Redo => Some(HistoryOp::Redo),
                _ => None,
            }
        }
    }

    struct Counter {
        calls: Cell<u32>,
    }

    impl Reducer for Counter {
        type State = i64;
        type Action = CounterAction;
        type Error = String;

        fn reduce(&self, state: &i64, action: &CounterAction) -> Result<i64, String> {
            self.calls.set(self.calls.get() + 1);
            match action {
                CounterAction::Add(n) => Ok(state + n),
                CounterAction::Fail => Err("refused".to_string()),
                other => Err(format!("{other:?} reached the base reducer")),
            }
        }
    }

    fn counter() -> UndoableReducer<Counter> {
        UndoableReducer::new(Counter {
            calls: Cell::new(0),
        })
    }

    #[test]
    fn init_has_empty_past_and_future() {
        let h = counter().init(3);
        assert_eq!(**h.present(), 3);
        assert!(!h.has_past());
        assert!(!h.has_future());
    }

    #[test]
    fn forwards_plain_actions() {
        let r = counter();
        let h = r.init(0);
        let h = r.reduce(&h, &CounterAction::Add(4)).unwrap();
        assert_eq!(**h.present(), 4);
        assert_eq!(r.inner().calls.get(), 1);
    }

    #[test]
    fn undo_and_redo_never_reach_base_reducer() {
        let r = counter();
        let h = r.init(0);
        let h = r.reduce(&h, &CounterAction::Add(1)).unwrap();
        let h = r.reduce(&h, &CounterAction::Undo).unwrap();
        let h = r.reduce(&h, &CounterAction::Redo).unwrap();
        let h = r.reduce(&h, &CounterAction::Redo).unwrap();

        assert_eq!(**h.present(), 1);
        assert_eq!(r.inner().calls.get(), 1);
    }

    #[test]
    fn undo_on_fresh_history_is_noop() {
        let r = counter();
        let h = r.init(9);
        let undone = r.reduce(&h, &CounterAction::Undo).unwrap();
        assert!(undone.is_same(&h));
    }

    #[test]
    fn base_error_propagates_without_commit() {
        let r = counter();
        let h = r.reduce(&r.init(0), &CounterAction::Add(2)).unwrap();
        let err = r.reduce(&h, &CounterAction::Fail).unwrap_err();
        assert_eq!(err, "refused");
        assert_eq!(**h.present(), 2);
        assert_eq!(h.past_depth(), 1);
    }

    #[test]
    fn config_is_passed_to_init() {
        let r = UndoableReducer::with_config(
            Counter {
                calls: Cell::new(0),
            },
            HistoryConfig::new(1),
        );
        let mut h = r.init(0);
        for _ in 0..5 {
            h = r.reduce(&h, &CounterAction::Add(1)).unwrap();
        }
        assert_eq!(h.past_depth(), 1);
        assert_eq!(r.config().max_depth, 1);
    }

    #[test]
    fn fn_reducer_with_undoable_envelope() {
        let r = UndoableReducer::new(reducer_fn(|s: &String, a: &Undoable<char>| match a {
            Undoable::Apply(c) => Ok::<_, Infallible>(format!("{s}{c}")),
            _ => Ok(s.clone()),
        }));

        let h = r.init(String::new());
        let h = r.reduce(&h, &Undoable::Apply('a')).unwrap();
        let h = r.reduce(&h, &Undoable::Apply('b')).unwrap();
        assert_eq!(h.present().as_str(), "ab");

        let h = r.reduce(&h, &Undoable::from(HistoryOp::Undo)).unwrap();
        assert_eq!(h.present().as_str(), "a");
    }

    #[test]
    fn undoable_classifies_reserved_variants() {
        assert_eq!(Undoable::<u8>::Undo.history_op(), Some(HistoryOp::Undo));
        assert_eq!(Undoable::<u8>::Redo.history_op(), Some(HistoryOp::Redo));
        assert_eq!(Undoable::Apply(1u8).history_op(), None);
    }
}
