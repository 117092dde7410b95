#![forbid(unsafe_code)]

//! Grudge records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a grudge within one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrudgeId(pub u64);

impl fmt::Display for GrudgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One grudge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grudge {
    pub id: GrudgeId,
    pub person: String,
    pub reason: String,
    pub forgiven: bool,
}

impl Grudge {
    #[must_use]
    pub fn new(id: GrudgeId, person: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id,
            person: person.into(),
            reason: reason.into(),
            forgiven: false,
        }
    }
}

/// A snapshot of the whole list, newest first.
pub type Grudges = Vec<Grudge>;

/// The id the next added grudge receives: one past the largest id in use.
#[must_use]
pub fn next_id(grudges: &[Grudge]) -> GrudgeId {
    let max = grudges.iter().map(|g| g.id.0).max().unwrap_or(0);
    GrudgeId(max + 1)
}
