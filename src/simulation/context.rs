//! Per-session simulation state and turn orchestration

use crate::core::config::SimConfig;
use crate::core::error::{NetrError, Result};
use crate::core::types::{ConflictState, Move};
use crate::simulation::conflict::ConflictStateMachine;
use crate::simulation::opponent::OpponentModel;
use crate::simulation::profile::MoveProfile;
use crate::simulation::random::{RandomSource, SeededSource};
use crate::simulation::reward::RewardEngine;
use crate::simulation::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// One completed round. Never modified after it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based position in the session history
    pub index: usize,
    pub state_before: ConflictState,
    pub user_move: Move,
    pub opponent_move: Move,
    pub chaos_injected: bool,
    pub reward: i64,
}

/// Everything a session accumulates; the persistable part of a context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    turns: Vec<Turn>,
    current_state: ConflictState,
    running_score: i64,
    chaos_counter: usize,
    profile: MoveProfile,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn current_state(&self) -> ConflictState {
        self.current_state
    }

    pub fn running_score(&self) -> i64 {
        self.running_score
    }

    pub fn chaos_counter(&self) -> usize {
        self.chaos_counter
    }

    pub fn profile(&self) -> &MoveProfile {
        &self.profile
    }

    /// Conflict state reached after each completed turn, oldest first
    pub fn state_history(&self) -> Vec<ConflictState> {
        if self.turns.is_empty() {
            return Vec::new();
        }
        self.turns
            .iter()
            .skip(1)
            .map(|t| t.state_before)
            .chain(std::iter::once(self.current_state))
            .collect()
    }

    /// Check the bookkeeping invariants between the history and the aggregates.
    ///
    /// Everything except the turns themselves must be reproducible from `turns`.
    pub fn validate(&self) -> Result<()> {
        let mut expected_state = ConflictState::Peaceful;
        let mut profile = MoveProfile::new();
        for (i, turn) in self.turns.iter().enumerate() {
            if turn.index != i + 1 {
                return Err(NetrError::CorruptSession(format!(
                    "turn at position {} has index {}",
                    i, turn.index
                )));
            }
            if turn.state_before != expected_state {
                return Err(NetrError::CorruptSession(format!(
                    "turn {} starts {} but the previous turn left the conflict {}",
                    turn.index, turn.state_before, expected_state
                )));
            }
            expected_state = ConflictStateMachine::next(turn.user_move, turn.opponent_move);
            profile.record(turn.user_move);
        }

        if self.current_state != expected_state {
            return Err(NetrError::CorruptSession(format!(
                "current state {} does not follow from the history ({})",
                self.current_state, expected_state
            )));
        }

        let score = self
            .turns
            .iter()
            .try_fold(0i64, |acc, t| acc.checked_add(t.reward))
            .ok_or_else(|| NetrError::CorruptSession("recorded rewards overflow".into()))?;
        if score != self.running_score {
            return Err(NetrError::CorruptSession(format!(
                "running score {} does not match recorded rewards {}",
                self.running_score, score
            )));
        }

        let chaos = self.turns.iter().filter(|t| t.chaos_injected).count();
        if chaos != self.chaos_counter {
            return Err(NetrError::CorruptSession(format!(
                "chaos counter {} does not match {} chaos turns",
                self.chaos_counter, chaos
            )));
        }

        if self.profile.total() != profile.total() {
            return Err(NetrError::CorruptSession(format!(
                "move profile counts {} moves for {} turns",
                self.profile.total(),
                self.turns.len()
            )));
        }
        for mv in Move::ALL {
            if self.profile.count(mv) != profile.count(mv) {
                return Err(NetrError::CorruptSession(format!(
                    "move profile counts {} {} moves, history has {}",
                    self.profile.count(mv),
                    mv,
                    profile.count(mv)
                )));
            }
        }

        Ok(())
    }

    /// Check every recorded reward against `rewards`
    pub fn check_rewards(&self, rewards: &RewardEngine) -> Result<()> {
        for turn in &self.turns {
            let expected = rewards.score(turn.user_move, turn.opponent_move);
            if turn.reward != expected {
                return Err(NetrError::CorruptSession(format!(
                    "turn {} recorded reward {} but the reward table gives {}",
                    turn.index, turn.reward, expected
                )));
            }
        }
        Ok(())
    }
}

/// A running negotiation session.
///
/// Owns its history, the opponent and reward rules it was configured with,
/// and its random source. Each session is independent; nothing is shared.
pub struct SimulationContext<R: RandomSource = SeededSource> {
    session: SessionState,
    opponent: OpponentModel,
    rewards: RewardEngine,
    rng: R,
}

impl<R: RandomSource> SimulationContext<R> {
    pub fn new(config: &SimConfig, rng: R) -> Self {
        Self {
            session: SessionState::new(),
            opponent: OpponentModel::new(config.chaos.clone(), config.opponent.clone()),
            rewards: RewardEngine::new(config.rewards.clone()),
            rng,
        }
    }

    /// Default rules with the given random source
    pub fn with_source(rng: R) -> Self {
        Self::new(&SimConfig::default(), rng)
    }

    /// Play one turn.
    ///
    /// On error nothing is recorded and the session is unchanged.
    pub fn take_turn(&mut self, user_move: Move) -> Result<Turn> {
        let state_before = self.session.current_state;
        let history = self.session.state_history();

        let decision =
            self.opponent
                .decide(user_move, &mut self.session.profile, &history, &mut self.rng)?;

        let reward = self.rewards.score(user_move, decision.opponent_move);
        self.session.current_state = ConflictStateMachine::next(user_move, decision.opponent_move);

        if decision.chaos_injected {
            self.session.chaos_counter += 1;
        }

        let turn = Turn {
            index: self.session.turns.len() + 1,
            state_before,
            user_move,
            opponent_move: decision.opponent_move,
            chaos_injected: decision.chaos_injected,
            reward,
        };
        self.session.turns.push(turn);
        self.session.running_score += reward;

        tracing::debug!(
            index = turn.index,
            %user_move,
            opponent_move = %turn.opponent_move,
            chaos = turn.chaos_injected,
            reward,
            state = %self.session.current_state,
            "Turn complete"
        );

        Ok(turn)
    }

    /// Parse raw front-end input and play it.
    ///
    /// Unrecognized input fails with [`NetrError::InvalidMove`] before any
    /// state is touched.
    pub fn submit(&mut self, input: &str) -> Result<Turn> {
        let user_move = Move::parse(input)?;
        self.take_turn(user_move)
    }

    /// Discard all history and return to the initial state
    pub fn reset(&mut self) {
        let played = self.session.turns.len();
        self.session = SessionState::new();
        tracing::info!(turns_discarded = played, "Session reset");
    }

    /// Replace the session with a previously saved one, if it is consistent
    /// and was scored with this context's reward table
    pub fn restore(&mut self, session: SessionState) -> Result<()> {
        if let Err(e) = session.validate().and_then(|_| session.check_rewards(&self.rewards)) {
            tracing::warn!("Refusing to restore session: {}", e);
            return Err(e);
        }
        tracing::info!(turns = session.turns.len(), "Session restored");
        self.session = session;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.session)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn turns(&self) -> &[Turn] {
        &self.session.turns
    }

    pub fn current_state(&self) -> ConflictState {
        self.session.current_state
    }

    pub fn running_score(&self) -> i64 {
        self.session.running_score
    }

    pub fn chaos_counter(&self) -> usize {
        self.session.chaos_counter
    }

    pub fn profile(&self) -> &MoveProfile {
        &self.session.profile
    }

    pub fn opponent(&self) -> &OpponentModel {
        &self.opponent
    }

    /// Chaos probability the opponent would use if `user_move` were played next
    pub fn next_chaos_probability(&self, user_move: Move) -> f64 {
        let mut profile = self.session.profile.clone();
        profile.record(user_move);
        self.opponent
            .chaos_probability(user_move, &profile, &self.session.state_history())
    }
}

impl SimulationContext<SeededSource> {
    /// Deterministic session with default rules
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(SeededSource::new(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::random::ScriptedSource;

    fn scripted(draws: &[f64]) -> SimulationContext<ScriptedSource> {
        SimulationContext::with_source(ScriptedSource::new(draws.iter().copied()))
    }

    #[test]
    fn test_fresh_context_is_initial() {
        let ctx = SimulationContext::seeded(1);
        assert!(ctx.turns().is_empty());
        assert_eq!(ctx.current_state(), ConflictState::Peaceful);
        assert_eq!(ctx.running_score(), 0);
        assert_eq!(ctx.chaos_counter(), 0);
        assert_eq!(ctx.profile().total(), 0);
    }

    #[test]
    fn test_cooperative_negotiation_turn() {
        let mut ctx = scripted(&[0.95, 0.5]);
        let turn = ctx.take_turn(Move::Negotiate).unwrap();

        assert_eq!(turn.index, 1);
        assert_eq!(turn.state_before, ConflictState::Peaceful);
        assert!(!turn.chaos_injected);
        assert_eq!(turn.opponent_move, Move::Negotiate);
        assert_eq!(turn.reward, 2);
        assert_eq!(ctx.current_state(), ConflictState::Peaceful);
        assert_eq!(ctx.running_score(), 2);
    }

    #[test]
    fn test_chaos_escalation_turn() {
        let mut ctx = scripted(&[0.0]);
        let turn = ctx.take_turn(Move::Escalate).unwrap();

        assert!(turn.chaos_injected);
        assert_eq!(turn.opponent_move, Move::Hold);
        assert_eq!(turn.reward, 1);
        assert_eq!(ctx.current_state(), ConflictState::Tense);
        assert_eq!(ctx.chaos_counter(), 1);
    }

    #[test]
    fn test_state_before_records_prior_state() {
        // Escalate (chaos) -> Tense, then Hold (no chaos) -> Peaceful
        let mut ctx = scripted(&[0.0, 0.99]);
        ctx.take_turn(Move::Escalate).unwrap();
        let second = ctx.take_turn(Move::Hold).unwrap();

        assert_eq!(second.state_before, ConflictState::Tense);
        assert_eq!(second.opponent_move, Move::Negotiate);
        assert_eq!(ctx.current_state(), ConflictState::Peaceful);
        assert_eq!(
            ctx.session().state_history(),
            vec![ConflictState::Tense, ConflictState::Peaceful]
        );
    }

    #[test]
    fn test_invalid_input_is_rejected_without_mutation() {
        let mut ctx = scripted(&[0.95, 0.5]);
        ctx.take_turn(Move::Negotiate).unwrap();
        let before = ctx.session().clone();

        let err = ctx.submit("surrender").unwrap_err();
        assert!(matches!(err, NetrError::InvalidMove(_)));
        assert_eq!(ctx.turns().len(), 1);
        assert_eq!(ctx.session(), &before);
    }

    #[test]
    fn test_exhausted_source_leaves_session_unchanged() {
        let mut ctx = scripted(&[]);
        let err = ctx.take_turn(Move::Hold).unwrap_err();
        assert!(matches!(err, NetrError::RandomSourceExhausted { drawn: 0 }));
        assert_eq!(ctx.session(), &SessionState::new());
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut ctx = SimulationContext::seeded(9);
        for mv in [Move::Escalate, Move::Hold, Move::Negotiate, Move::Escalate] {
            ctx.take_turn(mv).unwrap();
        }
        ctx.reset();

        assert!(ctx.turns().is_empty());
        assert_eq!(ctx.current_state(), ConflictState::Peaceful);
        assert_eq!(ctx.running_score(), 0);
        assert_eq!(ctx.chaos_counter(), 0);
        assert_eq!(ctx.profile().total(), 0);
        assert_eq!(ctx.snapshot().chaos_ratio, 0.0);
    }

    #[test]
    fn test_long_peace_raises_chaos_probability() {
        // Five cooperative Hold turns keep the state Peaceful.
        let mut ctx = scripted(&[0.99; 5]);
        let base = ctx.next_chaos_probability(Move::Hold);
        for _ in 0..5 {
            ctx.take_turn(Move::Hold).unwrap();
        }
        // Hold is now 6/6 of the profile plus the streak bonus.
        let boosted = ctx.next_chaos_probability(Move::Hold);
        assert!((base - 0.4).abs() < 1e-12);
        assert!((boosted - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_validate_detects_tampering() {
        let mut ctx = SimulationContext::seeded(3);
        for _ in 0..4 {
            ctx.take_turn(Move::Negotiate).unwrap();
        }
        assert!(ctx.session().validate().is_ok());

        let mut tampered = ctx.session().clone();
        tampered.running_score += 10;
        assert!(matches!(
            tampered.validate(),
            Err(NetrError::CorruptSession(_))
        ));

        let mut tampered = ctx.session().clone();
        tampered.turns[2].index = 7;
        assert!(tampered.validate().is_err());

        let mut tampered = ctx.session().clone();
        tampered.profile.record(Move::Hold);
        assert!(tampered.validate().is_err());

        assert!(ctx.restore(tampered).is_err());
        assert_eq!(ctx.turns().len(), 4);
    }

    #[test]
    fn test_validate_rebuilds_profile_and_state_chain() {
        let mut ctx = scripted(&[0.95, 0.5, 0.95, 0.5, 0.95, 0.5]);
        for _ in 0..3 {
            ctx.take_turn(Move::Negotiate).unwrap();
        }
        assert!(ctx.session().validate().is_ok());

        // Same total, wrong moves.
        let mut tampered = ctx.session().clone();
        tampered.profile = MoveProfile::new();
        for _ in 0..3 {
            tampered.profile.record(Move::Escalate);
        }
        assert!(matches!(tampered.validate(), Err(NetrError::CorruptSession(_))));

        let mut tampered = ctx.session().clone();
        tampered.current_state = ConflictState::Tense;
        assert!(matches!(tampered.validate(), Err(NetrError::CorruptSession(_))));

        let mut tampered = ctx.session().clone();
        tampered.turns[1].state_before = ConflictState::Tense;
        assert!(matches!(tampered.validate(), Err(NetrError::CorruptSession(_))));

        let mut tampered = ctx.session().clone();
        tampered.turns[0].state_before = ConflictState::Tense;
        assert!(matches!(tampered.validate(), Err(NetrError::CorruptSession(_))));

        let mut tampered = SessionState::new();
        tampered.current_state = ConflictState::Tense;
        assert!(matches!(tampered.validate(), Err(NetrError::CorruptSession(_))));
    }

    #[test]
    fn test_validate_rejects_overflowing_rewards() {
        let mut ctx = scripted(&[0.95, 0.5, 0.95, 0.5]);
        ctx.take_turn(Move::Negotiate).unwrap();
        ctx.take_turn(Move::Negotiate).unwrap();

        let mut tampered = ctx.session().clone();
        tampered.turns[0].reward = i64::MAX;
        tampered.turns[1].reward = 1;
        assert!(matches!(tampered.validate(), Err(NetrError::CorruptSession(_))));
    }

    #[test]
    fn test_restore_rejects_rewards_from_another_table() {
        let mut ctx = scripted(&[0.95, 0.5, 0.95, 0.5]);
        ctx.take_turn(Move::Negotiate).unwrap();
        ctx.take_turn(Move::Negotiate).unwrap();
        let session = ctx.session().clone();

        let mut config = SimConfig::default();
        config.rewards.mutual_negotiation = 5;
        let mut other = SimulationContext::new(&config, ScriptedSource::new(Vec::new()));
        assert!(matches!(
            other.restore(session.clone()),
            Err(NetrError::CorruptSession(_))
        ));
        assert!(other.turns().is_empty());

        let mut same = SimulationContext::seeded(1);
        same.restore(session).unwrap();
        assert_eq!(same.running_score(), 4);
    }
}
