//! Save and load sessions as JSON files

use crate::core::config::SimConfig;
use crate::core::error::Result;
use crate::simulation::context::SessionState;
use crate::simulation::reward::RewardEngine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// On-disk form of a session: the history, its aggregates, and the rules it was played under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub id: Uuid,
    pub saved_at_turn: usize,
    pub config: SimConfig,
    pub session: SessionState,
}

impl SavedSession {
    pub fn new(id: Uuid, config: SimConfig, session: SessionState) -> Self {
        Self {
            id,
            saved_at_turn: session.turns().len(),
            config,
            session,
        }
    }
}

pub fn save_session(path: &Path, saved: &SavedSession) -> Result<()> {
    let json = serde_json::to_string_pretty(saved)?;
    fs::write(path, json)?;
    tracing::info!(id = %saved.id, turns = saved.saved_at_turn, path = %path.display(), "Session saved");
    Ok(())
}

/// Load a session file, rejecting it if its aggregates disagree with its history
/// or its rewards disagree with its own reward table
pub fn load_session(path: &Path) -> Result<SavedSession> {
    let contents = fs::read_to_string(path)?;
    let saved: SavedSession = serde_json::from_str(&contents)?;
    saved.config.validate()?;
    saved.session.validate()?;
    saved
        .session
        .check_rewards(&RewardEngine::new(saved.config.rewards.clone()))?;
    tracing::info!(id = %saved.id, turns = saved.saved_at_turn, path = %path.display(), "Session loaded");
    Ok(saved)
}
