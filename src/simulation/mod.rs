pub mod conflict;
pub mod context;
pub mod opponent;
pub mod persistence;
pub mod profile;
pub mod random;
pub mod reward;
pub mod snapshot;
pub mod strategy;

pub use conflict::ConflictStateMachine;
pub use context::{SessionState, SimulationContext, Turn};
pub use opponent::{Decision, OpponentModel};
pub use persistence::{load_session, save_session, SavedSession};
pub use profile::MoveProfile;
pub use random::{RandomSource, ScriptedSource, SeededSource};
pub use reward::RewardEngine;
pub use snapshot::Snapshot;
pub use strategy::UserStrategy;
