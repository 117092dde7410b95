#![forbid(unsafe_code)]

//! Plain-text rendering of a grudge list.

use std::fmt;
use std::fmt::Write as _;

use crate::grudge::Grudge;

/// Render one line per grudge, newest first.
///
/// ```text
/// #2 [ ] Bo: ate my lunch
/// #1 [x] Al: parked badly
/// ```
#[must_use]
pub fn render_list(grudges: &[Grudge]) -> String {
    if grudges.is_empty() {
        return "(no grudges)\n".to_string();
    }
    let mut out = String::new();
    for g in grudges {
        let mark = if g.forgiven { 'x' } else { ' ' };
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{} [{mark}] {}: {}", g.id, g.person, g.reason);
    }
    out
}

/// Counts shown in a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub forgiven: usize,
}

impl Summary {
    #[must_use]
    pub fn of(grudges: &[Grudge]) -> Self {
        Self {
            total: grudges.len(),
            forgiven: grudges.iter().filter(|g| g.forgiven).count(),
        }
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.total - self.forgiven
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} grudges, {} forgiven, {} outstanding",
            self.total,
            self.forgiven,
            self.outstanding()
        )
    }
}
