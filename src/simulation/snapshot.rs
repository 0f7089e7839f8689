//! Derived, recomputable view of a session

use crate::core::types::{ConflictState, Move};
use crate::simulation::conflict::ConflictStateMachine;
use crate::simulation::context::SessionState;
use serde::{Deserialize, Serialize};

/// Summary of a session at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_state: ConflictState,
    pub running_score: i64,
    pub chaos_counter: usize,
    /// Fraction of turns with chaos injected, in [0, 1]
    pub chaos_ratio: f64,
    pub turns_played: usize,
    /// Consecutive Peaceful turns ending at the latest one
    pub peace_streak: usize,
    pub dominant_move: Option<Move>,
}

impl Snapshot {
    pub fn of(session: &SessionState) -> Self {
        let turns_played = session.turns().len();
        Self {
            current_state: session.current_state(),
            running_score: session.running_score(),
            chaos_counter: session.chaos_counter(),
            chaos_ratio: session.chaos_counter() as f64 / turns_played.max(1) as f64,
            turns_played,
            peace_streak: ConflictStateMachine::trailing_peace(&session.state_history()),
            dominant_move: session.profile().dominant(),
        }
    }

    /// One-paragraph plain-text summary for display and advisory prompts
    pub fn summary(&self) -> String {
        let dominant = self
            .dominant_move
            .map(|m| m.name())
            .unwrap_or("none yet");
        format!(
            "After {} turns the situation is {} with a peace score of {}. \
             Chaos was injected in {} turns ({:.0}%). Peaceful streak: {}. \
             Most frequent user move: {}.",
            self.turns_played,
            self.current_state,
            self.running_score,
            self.chaos_counter,
            self.chaos_ratio * 100.0,
            self.peace_streak,
            dominant,
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::context::SimulationContext;
    use crate::simulation::random::ScriptedSource;

    #[test]
    fn test_empty_session_snapshot() {
        let snapshot = Snapshot::of(&SessionState::new());
        assert_eq!(snapshot.chaos_ratio, 0.0);
        assert_eq!(snapshot.turns_played, 0);
        assert_eq!(snapshot.peace_streak, 0);
        assert_eq!(snapshot.dominant_move, None);
        assert_eq!(snapshot.current_state, ConflictState::Peaceful);
    }

    #[test]
    fn test_snapshot_after_mixed_turns() {
        // Escalate with chaos, then two cooperative Negotiates
        let mut ctx =
            SimulationContext::with_source(ScriptedSource::new([0.0, 0.99, 0.1, 0.99, 0.1]));
        ctx.take_turn(Move::Escalate).unwrap();
        ctx.take_turn(Move::Negotiate).unwrap();
        ctx.take_turn(Move::Negotiate).unwrap();

        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.turns_played, 3);
        assert_eq!(snapshot.chaos_counter, 1);
        assert!((snapshot.chaos_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(snapshot.running_score, 5);
        assert_eq!(snapshot.peace_streak, 2);
        assert_eq!(snapshot.dominant_move, Some(Move::Negotiate));
        assert!(snapshot.summary().contains("peace score of 5"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = Snapshot::of(&SessionState::new()).to_json();
        assert!(json.contains("\"current_state\": \"Peaceful\""));
    }
}
