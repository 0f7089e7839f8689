//! Core value types shared by every simulation component

use crate::core::error::{NetrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An action either party can take in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Negotiate,
    Hold,
    Escalate,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Negotiate, Move::Hold, Move::Escalate];

    pub fn name(&self) -> &'static str {
        match self {
            Move::Negotiate => "Negotiate",
            Move::Hold => "Hold",
            Move::Escalate => "Escalate",
        }
    }

    /// Parse a move from front-end input.
    ///
    /// Accepts the full name or its first letter, case-insensitively.
    /// Anything else is rejected with [`NetrError::InvalidMove`].
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "negotiate" | "n" => Ok(Move::Negotiate),
            "hold" | "h" => Ok(Move::Hold),
            "escalate" | "e" => Ok(Move::Escalate),
            _ => Err(NetrError::InvalidMove(input.to_string())),
        }
    }
}

impl FromStr for Move {
    type Err = NetrError;

    fn from_str(s: &str) -> Result<Self> {
        Move::parse(s)
    }
}

impl TryFrom<u8> for Move {
    type Error = NetrError;

    /// Wire/ordinal form used by numeric front ends: 0, 1, 2.
    fn try_from(value: u8) -> Result<Self> {
        Move::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| NetrError::InvalidMove(value.to_string()))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Environment mood driven by the moves of the last turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConflictState {
    #[default]
    Peaceful,
    Tense,
}

impl fmt::Display for ConflictState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictState::Peaceful => f.write_str("Peaceful"),
            ConflictState::Tense => f.write_str("Tense"),
        }
    }
}
