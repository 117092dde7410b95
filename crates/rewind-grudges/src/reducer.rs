#![forbid(unsafe_code)]

//! The pure grudge-list transition.

use rewind_runtime::Reducer;
use tracing::trace;

use crate::action::GrudgeAction;
use crate::error::GrudgeError;
use crate::grudge::{Grudge, Grudges, next_id};

/// Adds grudges to the front of the list and toggles their `forgiven` flag.
///
/// Ids are derived from the list itself, so the same snapshot and action
/// always produce the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrudgeReducer;

impl Reducer for GrudgeReducer {
    type State = Grudges;
    type Action = GrudgeAction;
    type Error = GrudgeError;

    fn reduce(&self, state: &Grudges, action: &GrudgeAction) -> Result<Grudges, GrudgeError> {
        trace!(action = action.kind(), len = state.len(), "reduce");
        match action {
            GrudgeAction::Add { person, reason } => {
                let grudge = Grudge::new(next_id(state), person.clone(), reason.clone());
                let mut next = Vec::with_capacity(state.len() + 1);
                next.push(grudge);
                next.extend_from_slice(state);
                Ok(next)
            }
            GrudgeAction::ToggleForgiven { id } => {
                if !state.iter().any(|g| g.id == *id) {
                    return Err(GrudgeError::UnknownGrudge { id: *id });
                }
                Ok(state
                    .iter()
                    .map(|g| {
                        if g.id == *id {
                            Grudge {
                                forgiven: !g.forgiven,
                                ..g.clone()
                            }
                        } else {
                            g.clone()
                        }
                    })
                    .collect())
            }
            GrudgeAction::Undo | GrudgeAction::Redo => Err(GrudgeError::ReservedAction {
                action: action.kind(),
            }),
        }
    }
}
