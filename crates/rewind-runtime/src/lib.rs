#![forbid(unsafe_code)]

//! Rewind Runtime
//!
//! Generic state-management building blocks: a pure undo/redo history
//! envelope around any reducer, and a shared reactive store that hands the
//! same history out to many readers.
//!
//! # Key Components
//!
//! - [`History`] - Immutable past/present/future triple of snapshots
//! - [`Reducer`] - Trait for pure `(state, action) -> state` transitions
//! - [`UndoableReducer`] - Wraps a [`Reducer`] and intercepts undo/redo
//! - [`Store`] - Cloneable handle to one history with change notification
//! - [`Selector`] - Memoized derived view over a [`Store`]
//!
//! # How it fits together
//!
//! ```text
//!   action ──► Store::dispatch ──► UndoableReducer ──► Reducer::reduce
//!                   │                    │
//!                   │             Undo / Redo handled here,
//!                   │             never forwarded
//!                   ▼
//!            subscribers / selectors (registration order)
//! ```

pub mod reactive;
pub mod undo;

pub use reactive::{Selector, Store, Subscription};
pub use undo::{
    FnReducer, History, HistoryAction, HistoryConfig, HistoryOp, Reducer, Undoable,
    UndoableReducer, reducer_fn,
};
