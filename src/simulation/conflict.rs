//! Two-state conflict mood

use crate::core::types::{ConflictState, Move};

/// Peaceful/Tense transitions. There is no terminal state.
pub struct ConflictStateMachine;

impl ConflictStateMachine {
    /// Next state after a completed turn. Depends only on that turn's moves.
    pub fn next(user: Move, opponent: Move) -> ConflictState {
        if user == Move::Escalate || opponent == Move::Escalate {
            ConflictState::Tense
        } else {
            ConflictState::Peaceful
        }
    }

    /// Length of the run of Peaceful states at the end of `states`
    pub fn trailing_peace(states: &[ConflictState]) -> usize {
        states
            .iter()
            .rev()
            .take_while(|s| **s == ConflictState::Peaceful)
            .count()
    }
}
