#![forbid(unsafe_code)]

//! Grudge list sample domain.
//!
//! A grudge is a named person, the reason for the grudge and whether it has
//! been forgiven. The list is kept newest first. [`GrudgeReducer`] is the
//! pure transition over that list; wrap it in a
//! [`Store`](rewind_runtime::Store) to get undo/redo and shared access.
//!
//! ```
//! use rewind_grudges::{GrudgeAction, GrudgeReducer};
//! use rewind_runtime::Store;
//!
//! let store = Store::new(GrudgeReducer, Vec::new());
//! store.dispatch(GrudgeAction::add("Al", "parked badly")).unwrap();
//! assert_eq!(store.present().len(), 1);
//!
//! store.dispatch(GrudgeAction::Undo).unwrap();
//! assert!(store.present().is_empty());
//! assert!(store.has_future());
//! ```

pub mod action;
pub mod error;
pub mod grudge;
pub mod reducer;
pub mod seed;
pub mod view;

pub use action::GrudgeAction;
pub use error::{GrudgeError, Result};
pub use grudge::{Grudge, GrudgeId, Grudges};
pub use reducer::GrudgeReducer;
pub use seed::{SeedGrudge, parse_seed};
pub use view::{Summary, render_list};
