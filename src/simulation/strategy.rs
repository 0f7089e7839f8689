//! Scripted user policies for headless runs

use crate::core::error::Result;
use crate::core::types::Move;
use crate::simulation::context::Turn;
use crate::simulation::random::RandomSource;
use serde::{Deserialize, Serialize};

/// How a headless player picks its next move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UserStrategy {
    AlwaysNegotiate,
    AlwaysHold,
    AlwaysEscalate,
    /// Negotiate, Hold, Escalate, repeat
    Cycle,
    /// Open with Negotiate, then copy the opponent's last move
    Mirror,
    /// Uniform over the three moves
    Random,
}

impl UserStrategy {
    pub fn next_move<R: RandomSource + ?Sized>(
        &self,
        history: &[Turn],
        rng: &mut R,
    ) -> Result<Move> {
        Ok(match self {
            Self::AlwaysNegotiate => Move::Negotiate,
            Self::AlwaysHold => Move::Hold,
            Self::AlwaysEscalate => Move::Escalate,
            Self::Cycle => Move::ALL[history.len() % Move::ALL.len()],
            Self::Mirror => history
                .last()
                .map(|t| t.opponent_move)
                .unwrap_or(Move::Negotiate),
            Self::Random => {
                let draw = rng.next_unit()?;
                let idx = ((draw * Move::ALL.len() as f64) as usize).min(Move::ALL.len() - 1);
                Move::ALL[idx]
            }
        })
    }
}
