#![forbid(unsafe_code)]

//! Undo/redo history for pure reducers.
//!
//! This module keeps undo entirely outside of application transitions. The
//! application supplies a pure [`Reducer`]; the [`UndoableReducer`] wrapper
//! lifts it to operate on a [`History`] of snapshots.
//!
//! # Architecture
//!
//! ```text
//!            past (most recent first)     present      future (nearest first)
//! apply(a)   [s1, s0]                     s2           []
//! undo()     [s0]                         s1           [s2]
//! undo()     []                           s0           [s1, s2]
//! redo()     [s0]                         s1           [s2]
//! apply(b)   [s1, s0]                     s3           []      <- branch dropped
//! ```
//!
//! # Quick Start
//!
//! ```
//! use rewind_runtime::undo::{Reducer, Undoable, UndoableReducer, reducer_fn};
//!
//! let counter = reducer_fn(|n: &i64, action: &Undoable<i64>| match action {
//!     Undoable::Apply(delta) => Ok::<_, std::convert::Infallible>(n + delta),
//!     _ => Ok(*n),
//! });
//! let undoable = UndoableReducer::new(counter);
//!
//! let h0 = undoable.init(0);
//! let h1 = undoable.reduce(&h0, &Undoable::Apply(5)).unwrap();
//! let h2 = undoable.reduce(&h1, &Undoable::Undo).unwrap();
//! assert_eq!(**h1.present(), 5);
//! assert_eq!(**h2.present(), 0);
//! assert!(h2.has_future());
//! ```
//!
//! # Module Structure
//!
//! - [`history`]: The immutable [`History`] value and its cap policy
//! - [`reducer`]: The [`Reducer`] seam and the [`UndoableReducer`] wrapper

pub mod history;
pub mod reducer;

pub use history::{History, HistoryConfig};
pub use reducer::{
    FnReducer, HistoryAction, HistoryOp, Reducer, Undoable, UndoableReducer, reducer_fn,
};
