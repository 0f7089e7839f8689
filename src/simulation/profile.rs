//! Frequency profile of the user's moves

use crate::core::types::Move;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// How often the user has played each move
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveProfile {
    counts: AHashMap<Move, u32>,
}

impl MoveProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mv: Move) {
        *self.counts.entry(mv).or_insert(0) += 1;
    }

    pub fn count(&self, mv: Move) -> u32 {
        self.counts.get(&mv).copied().unwrap_or(0)
    }

    /// Number of recorded moves. Summed wide so loaded counts cannot overflow.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Share of all recorded moves that were `mv`; 0 when empty
    pub fn frequency(&self, mv: Move) -> f64 {
        self.count(mv) as f64 / self.total().max(1) as f64
    }

    /// Most frequently played move. Ties resolve in `Move::ALL` order.
    pub fn dominant(&self) -> Option<Move> {
        let mut best: Option<(Move, u32)> = None;
        for mv in Move::ALL {
            let count = self.count(mv);
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((mv, count));
            }
        }
        best.map(|(mv, _)| mv)
    }
}
