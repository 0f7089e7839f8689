//! Per-turn scoring of a move pair

use crate::core::config::RewardTable;
use crate::core::types::Move;

/// Scores (user move, opponent move) pairs against a reward table
#[derive(Debug, Clone, Default)]
pub struct RewardEngine {
    table: RewardTable,
}

impl RewardEngine {
    pub fn new(table: RewardTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RewardTable {
        &self.table
    }

    /// First matching rule wins: any answer of Negotiate pays out, then
    /// identical pairs are a deadlock, everything else is a mismatch.
    pub fn score(&self, user: Move, opponent: Move) -> i64 {
        match (user, opponent) {
            (Move::Negotiate, Move::Negotiate) => self.table.mutual_negotiation,
            (Move::Hold, Move::Negotiate) => self.table.hold_then_negotiate,
            (Move::Escalate, Move::Negotiate) => self.table.escalate_then_negotiate,
            (a, b) if a == b => self.table.deadlock,
            _ => self.table.mismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Move::*;

    #[test]
    fn test_all_pairs_default_table() {
        let engine = RewardEngine::default();
        let expected = [
            (Negotiate, Negotiate, 2),
            (Negotiate, Hold, 1),
            (Negotiate, Escalate, 1),
            (Hold, Negotiate, 2),
            (Hold, Hold, -1),
            (Hold, Escalate, 1),
            (Escalate, Negotiate, 2),
            (Escalate, Hold, 1),
            (Escalate, Escalate, -1),
        ];
        for (user, opponent, reward) in expected {
            assert_eq!(
                engine.score(user, opponent),
                reward,
                "({:?}, {:?})",
                user,
                opponent
            );
        }
    }

    #[test]
    fn test_custom_table_is_respected() {
        let engine = RewardEngine::new(RewardTable {
            mutual_negotiation: 5,
            deadlock: -3,
            ..RewardTable::default()
        });
        assert_eq!(engine.score(Negotiate, Negotiate), 5);
        assert_eq!(engine.score(Escalate, Escalate), -3);
        assert_eq!(engine.score(Hold, Negotiate), 2);
    }
}
