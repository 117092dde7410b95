#![forbid(unsafe_code)]

//! Immutable past/present/future snapshot history.
//!
//! [`History`] is the classic zipper model of linear undo. Every operation
//! takes `&self` and returns a new `History`; earlier values remain valid
//! and can be kept around (for example by a UI that diffs old against new).
//!
//! Snapshots are stored as [`Arc<S>`] inside persistent [`im::Vector`]s, so
//! producing a new history shares all untouched entries with the old one.
//! A snapshot is never inspected, only moved between the three slots.
//!
//! # Invariants
//!
//! 1. `present()` is always the authoritative snapshot.
//! 2. A forward step ([`apply`](History::apply) / [`push`](History::push))
//!    always empties `future`.
//! 3. [`undo`](History::undo) with no past and [`redo`](History::redo) with
//!    no future return an identical history.
//! 4. `undo` and `redo` move exactly one snapshot and never run a transition.
//! 5. `past_depth() <= config.max_depth` after any operation.

use std::fmt;
use std::sync::Arc;

use im::Vector;

/// Cap policy for how much undo history is retained.
///
/// The default keeps every snapshot. A finite `max_depth` drops the oldest
/// past entries once a forward step would exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept in `past`.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl HistoryConfig {
    /// Create a configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create an unbounded configuration.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    /// Whether this configuration keeps every snapshot.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max_depth == usize::MAX
    }
}

/// The past/present/future triple tracking snapshot lineage.
pub struct History<S> {
    /// Earlier snapshots, most recent at the front.
    past: Vector<Arc<S>>,
    present: Arc<S>,
    /// Undone snapshots, nearest at the front.
    future: Vector<Arc<S>>,
    config: HistoryConfig,
}

// Manual Clone: snapshots are shared, `S` itself need not be `Clone`.
impl<S> Clone for History<S> {
    fn clone(&self) -> Self {
        Self {
            past: self.past.clone(),
            present: Arc::clone(&self.present),
            future: self.future.clone(),
            config: self.config,
        }
    }
}

impl<S: PartialEq> PartialEq for History<S> {
    /// Compares the three snapshot slots by value. The cap policy is not
    /// part of a history's identity.
    fn eq(&self, other: &Self) -> bool {
        self.present == other.present
            && self.past.len() == other.past.len()
            && self.future.len() == other.future.len()
            && self.past.iter().zip(other.past.iter()).all(|(a, b)| a == b)
            && self
                .future
                .iter()
                .zip(other.future.iter())
                .all(|(a, b)| a == b)
    }
}

impl<S: Eq> Eq for History<S> {}

impl<S: fmt::Debug> fmt::Debug for History<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("present", &self.present)
            .field("past_depth", &self.past.len())
            .field("future_depth", &self.future.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<S> History<S> {
    /// Start a history at `initial` with no past and no future.
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    /// Start a history at `initial` under the given cap policy.
    #[must_use]
    pub fn with_config(initial: S, config: HistoryConfig) -> Self {
        Self::from_arc(Arc::new(initial), config)
    }

    /// Start a history from an already shared snapshot.
    #[must_use]
    pub fn from_arc(initial: Arc<S>, config: HistoryConfig) -> Self {
        Self {
            past: Vector::new(),
            present: initial,
            future: Vector::new(),
            config,
        }
    }

    // ====================================================================
    // Transitions
    // ====================================================================

    /// Run `transition` against the present snapshot and record the result.
    ///
    /// On success the old present becomes the head of `past` and `future` is
    /// discarded. On failure the error is returned unchanged and `self` is
    /// not touched; nothing is partially committed.
    pub fn apply<E>(&self, transition: impl FnOnce(&S) -> Result<S, E>) -> Result<Self, E> {
        let next = transition(&self.present)?;
        Ok(self.push(next))
    }

    /// Record `next` as the new present, abandoning any redo branch.
    #[must_use]
    pub fn push(&self, next: S) -> Self {
        self.push_arc(Arc::new(next))
    }

    /// Record an already shared snapshot as the new present.
    #[must_use]
    pub fn push_arc(&self, next: Arc<S>) -> Self {
        let mut past = self.past.clone();
        past.push_front(Arc::clone(&self.present));
        let mut history = Self {
            past,
            present: next,
            future: Vector::new(),
            config: self.config,
        };
        history.enforce_depth();
        history
    }

    /// Step back one snapshot.
    ///
    /// With an empty past this returns an identical history.
    #[must_use]
    pub fn undo(&self) -> Self {
        let mut past = self.past.clone();
        let Some(previous) = past.pop_front() else {
            return self.clone();
        };
        let mut future = self.future.clone();
        future.push_front(Arc::clone(&self.present));
        Self {
            past,
            present: previous,
            future,
            config: self.config,
        }
    }

    /// Step forward one snapshot.
    ///
    /// With an empty future this returns an identical history.
    #[must_use]
    pub fn redo(&self) -> Self {
        let mut future = self.future.clone();
        let Some(next) = future.pop_front() else {
            return self.clone();
        };
        let mut past = self.past.clone();
        past.push_front(Arc::clone(&self.present));
        let mut history = Self {
            past,
            present: next,
            future,
            config: self.config,
        };
        history.enforce_depth();
        history
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// The current, authoritative snapshot.
    #[must_use]
    pub fn present(&self) -> &Arc<S> {
        &self.present
    }

    /// Whether [`undo`](Self::undo) would change anything.
    #[must_use]
    pub fn has_past(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`redo`](Self::redo) would change anything.
    #[must_use]
    pub fn has_future(&self) -> bool {
        !self.future.is_empty()
    }

    #[must_use]
    pub fn past_depth(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn future_depth(&self) -> usize {
        self.future.len()
    }

    /// Past snapshots, most recent first.
    pub fn past(&self) -> impl Iterator<Item = &Arc<S>> {
        self.past.iter()
    }

    /// Future snapshots, nearest first.
    pub fn future(&self) -> impl Iterator<Item = &Arc<S>> {
        self.future.iter()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Whether `other` holds the very same snapshot allocations in every
    /// slot. Compares pointers only, so it never calls `S::eq`, and it is
    /// true for the result of a no-op `undo`/`redo`.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        fn same_slots<S>(a: &Vector<Arc<S>>, b: &Vector<Arc<S>>) -> bool {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y))
        }

        Arc::ptr_eq(&self.present, &other.present)
            && same_slots(&self.past, &other.past)
            && same_slots(&self.future, &other.future)
    }

    fn enforce_depth(&mut self) {
        if self.past.len() > self.config.max_depth {
            self.past.truncate(self.config.max_depth);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
