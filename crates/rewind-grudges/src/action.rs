#![forbid(unsafe_code)]

//! Actions over the grudge list.

use rewind_runtime::{HistoryAction, HistoryOp};

use crate::grudge::GrudgeId;

/// Every change a grudge list can go through.
///
/// `Undo` and `Redo` are reserved: the history wrapper consumes them and
/// they never reach [`GrudgeReducer`](crate::GrudgeReducer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrudgeAction {
    Add { person: String, reason: String },
    ToggleForgiven { id: GrudgeId },
    Undo,
    Redo,
}

impl GrudgeAction {
    #[must_use]
    pub fn add(person: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Add {
            person: person.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn toggle(id: GrudgeId) -> Self {
        Self::ToggleForgiven { id }
    }

    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::ToggleForgiven { .. } => "toggle_forgiven",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

impl HistoryAction for GrudgeAction {
    fn history_op(&self) -> Option<HistoryOp> {
        match self {
            Self::Undo => Some(HistoryOp::Undo),
            Self::Redo => Some(HistoryOp::Redo),
            Self::Add { .. } | Self::ToggleForgiven { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_undo_and_redo_are_reserved() {
        assert_eq!(GrudgeAction::Undo.history_op(), Some(HistoryOp::Undo));
        assert_eq!(GrudgeAction::Redo.history_op(), Some(HistoryOp::Redo));
        assert_eq!(GrudgeAction::add("Al", "x").history_op(), None);
        assert_eq!(GrudgeAction::toggle(GrudgeId(1)).history_op(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(GrudgeAction::add("a", "b").kind(), "add");
        assert_eq!(GrudgeAction::toggle(GrudgeId(1)).kind(), "toggle_forgiven");
    }
}
