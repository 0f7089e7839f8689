//! Simulation configuration loaded from TOML
//!
//! Every tunable constant of the opponent model and the reward table lives
//! here. The defaults are the canonical game; alternative tables are just
//! different config files, not different algorithms.

use crate::core::error::{NetrError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Chaos-injection tuning for the opponent model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Chaos probability before any frequency or streak adjustment
    pub base_probability: f64,
    /// Weight applied to the user's frequency of the current move (0.0 to 1.0)
    pub frequency_weight: f64,
    /// Trailing peaceful run must exceed this length to earn the bonus
    pub peace_streak_threshold: usize,
    /// Added to the chaos probability when the streak threshold is exceeded.
    /// The sum is not capped, so values pushing past 1.0 make chaos certain.
    pub peace_streak_bonus: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            base_probability: 0.1,
            frequency_weight: 0.3,
            peace_streak_threshold: 4,
            peace_streak_bonus: 0.2,
        }
    }
}

/// Counter-move selection odds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Chance of answering Negotiate with Negotiate when cooperating
    pub cooperative_negotiate_probability: f64,
    /// Chance of answering Hold with Escalate when destabilizing
    pub destabilize_hold_escalate_probability: f64,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            cooperative_negotiate_probability: 0.7,
            destabilize_hold_escalate_probability: 0.5,
        }
    }
}

/// Points awarded per (user, opponent) move pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    pub mutual_negotiation: i64,
    pub hold_then_negotiate: i64,
    pub escalate_then_negotiate: i64,
    /// Both sides Hold or both sides Escalate
    pub deadlock: i64,
    pub mismatch: i64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            mutual_negotiation: 2,
            hold_then_negotiate: 2,
            escalate_then_negotiate: 2,
            deadlock: -1,
            mismatch: 1,
        }
    }
}

/// Advisory text service endpoint. The API key is never read from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "anthropic/claude-3-haiku".to_string(),
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub chaos: ChaosConfig,
    #[serde(default)]
    pub opponent: OpponentConfig,
    #[serde(default)]
    pub rewards: RewardTable,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

impl SimConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| NetrError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded simulation config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(contents)
            .map_err(|e| NetrError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject probabilities outside [0, 1] and negative weights
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("chaos.base_probability", self.chaos.base_probability),
            (
                "opponent.cooperative_negotiate_probability",
                self.opponent.cooperative_negotiate_probability,
            ),
            (
                "opponent.destabilize_hold_escalate_probability",
                self.opponent.destabilize_hold_escalate_probability,
            ),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(NetrError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let weights = [
            ("chaos.frequency_weight", self.chaos.frequency_weight),
            ("chaos.peace_streak_bonus", self.chaos.peace_streak_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(NetrError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_game() {
        let config = SimConfig::default();
        assert_eq!(config.chaos.base_probability, 0.1);
        assert_eq!(config.chaos.frequency_weight, 0.3);
        assert_eq!(config.chaos.peace_streak_threshold, 4);
        assert_eq!(config.chaos.peace_streak_bonus, 0.2);
        assert_eq!(config.opponent.cooperative_negotiate_probability, 0.7);
        assert_eq!(config.rewards.deadlock, -1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            [chaos]
            peace_streak_threshold = 2

            [rewards]
            mismatch = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.chaos.peace_streak_threshold, 2);
        assert_eq!(config.chaos.base_probability, 0.1);
        assert_eq!(config.rewards.mismatch, 0);
        assert_eq!(config.rewards.mutual_negotiation, 2);
        assert_eq!(config.opponent, OpponentConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(SimConfig::from_toml_str("").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let err = SimConfig::from_toml_str("[opponent]\ncooperative_negotiate_probability = 1.5\n")
            .unwrap_err();
        assert!(matches!(err, NetrError::Config(_)));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = SimConfig::from_toml_str("[chaos]\nfrequency_weight = -0.3\n").unwrap_err();
        assert!(matches!(err, NetrError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(SimConfig::from_toml_str("[chaos\nbase_probability = ").is_err());
    }

    #[test]
    fn test_load_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/netrsim.toml");
        let config = SimConfig::load(&path).expect("Should load shipped config");
        assert_eq!(config, SimConfig::default());
    }
}
