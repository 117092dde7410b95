#![forbid(unsafe_code)]

//! Shared, observable state for many readers.
//!
//! One [`Store`] owns the history of an [`UndoableReducer`]. Cloned handles
//! are passed down to whatever needs read or write access; every handle
//! sees the same history and the same subscribers. [`Selector`] derives a
//! memoized value from the store for readers that only care about part of
//! the state.
//!
//! [`UndoableReducer`]: crate::undo::UndoableReducer

pub mod selector;
pub mod store;

pub use selector::Selector;
pub use store::{Store, Subscription};
