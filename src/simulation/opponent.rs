//! Adaptive opponent with chaos injection
//!
//! The opponent mostly cooperates, but destabilizes with a probability that
//! grows with how predictable the user is (the share of the current move in
//! their history) and with how long the peace has lasted.

use crate::core::config::{ChaosConfig, OpponentConfig};
use crate::core::error::Result;
use crate::core::types::{ConflictState, Move};
use crate::simulation::conflict::ConflictStateMachine;
use crate::simulation::profile::MoveProfile;
use crate::simulation::random::RandomSource;

/// Outcome of one opponent decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub opponent_move: Move,
    pub chaos_injected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OpponentModel {
    chaos: ChaosConfig,
    odds: OpponentConfig,
}

impl OpponentModel {
    pub fn new(chaos: ChaosConfig, odds: OpponentConfig) -> Self {
        Self { chaos, odds }
    }

    /// Chaos probability for `user_move` given a profile that already counts it.
    ///
    /// Not capped: a value of 1.0 or more always triggers chaos.
    pub fn chaos_probability(
        &self,
        user_move: Move,
        profile: &MoveProfile,
        recent_states: &[ConflictState],
    ) -> f64 {
        let frequency = profile.frequency(user_move);
        let mut probability = self.chaos.base_probability + self.chaos.frequency_weight * frequency;

        let streak = ConflictStateMachine::trailing_peace(recent_states);
        if streak > self.chaos.peace_streak_threshold {
            probability += self.chaos.peace_streak_bonus;
        }

        probability
    }

    /// Pick the counter-move for `user_move`.
    ///
    /// The user's move is counted into `profile` before the chaos probability
    /// is computed. If the random source fails, `profile` is left untouched.
    pub fn decide<R: RandomSource + ?Sized>(
        &self,
        user_move: Move,
        profile: &mut MoveProfile,
        recent_states: &[ConflictState],
        rng: &mut R,
    ) -> Result<Decision> {
        let mut updated = profile.clone();
        updated.record(user_move);

        let probability = self.chaos_probability(user_move, &updated, recent_states);
        let chaos_injected = rng.next_unit()? < probability;

        let opponent_move = if chaos_injected {
            self.destabilize(user_move, rng)?
        } else {
            self.cooperate(user_move, rng)?
        };

        *profile = updated;

        tracing::trace!(
            %user_move,
            %opponent_move,
            probability,
            chaos_injected,
            "Opponent decided"
        );

        Ok(Decision {
            opponent_move,
            chaos_injected,
        })
    }

    fn destabilize<R: RandomSource + ?Sized>(&self, user_move: Move, rng: &mut R) -> Result<Move> {
        Ok(match user_move {
            Move::Negotiate => Move::Escalate,
            Move::Hold => {
                if rng.next_unit()? < self.odds.destabilize_hold_escalate_probability {
                    Move::Escalate
                } else {
                    Move::Hold
                }
            }
            Move::Escalate => Move::Hold,
        })
    }

    fn cooperate<R: RandomSource + ?Sized>(&self, user_move: Move, rng: &mut R) -> Result<Move> {
        Ok(match user_move {
            Move::Negotiate => {
                if rng.next_unit()? < self.odds.cooperative_negotiate_probability {
                    Move::Negotiate
                } else {
                    Move::Hold
                }
            }
            Move::Hold | Move::Escalate => Move::Negotiate,
        })
    }
}
