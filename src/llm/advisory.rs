//! Advisory text generation
//!
//! Advice is display-only. Requests may read a session snapshot, but nothing
//! produced here is ever fed back into a simulation context.

use crate::core::error::{NetrError, Result};
use crate::simulation::snapshot::Snapshot;
use std::fmt;
use std::future::Future;

/// External prose generator
pub trait AdvisoryService {
    fn generate(&self, scenario: &str) -> impl Future<Output = Result<String>> + Send;
}

/// What kind of prose to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    /// Suggestions for the user's next moves
    Strategy,
    /// "Day" briefing narrating the situation so far
    DailyBriefing,
    /// Commentary on the legal angles of the described conflict
    LegalCommentary,
}

impl AdvisoryKind {
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "strategy" | "strat" => Ok(Self::Strategy),
            "brief" | "briefing" | "day" => Ok(Self::DailyBriefing),
            "legal" | "law" => Ok(Self::LegalCommentary),
            other => Err(NetrError::Advisory(format!(
                "Unknown advisory kind {:?} (expected strategy, brief or legal)",
                other
            ))),
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            Self::Strategy => STRATEGY_INSTRUCTIONS,
            Self::DailyBriefing => BRIEFING_INSTRUCTIONS,
            Self::LegalCommentary => LEGAL_INSTRUCTIONS,
        }
    }
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strategy => f.write_str("strategy"),
            Self::DailyBriefing => f.write_str("briefing"),
            Self::LegalCommentary => f.write_str("legal commentary"),
        }
    }
}

/// A single request for advice
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    pub kind: AdvisoryKind,
    pub scenario: String,
    pub snapshot: Option<Snapshot>,
}

impl AdvisoryRequest {
    pub fn new(kind: AdvisoryKind, scenario: impl Into<String>) -> Self {
        Self {
            kind,
            scenario: scenario.into(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Full scenario text handed to the service
    pub fn render(&self) -> String {
        let mut text = format!(
            "{}\n\nSCENARIO:\n{}\n",
            self.kind.instructions(),
            self.scenario.trim()
        );
        if let Some(snapshot) = &self.snapshot {
            text.push_str("\nSIMULATION STATUS:\n");
            text.push_str(&snapshot.summary());
            text.push('\n');
        }
        text
    }
}

/// Ask `service` for advice. Empty scenarios are rejected before any call.
pub async fn request_advice<S: AdvisoryService>(
    service: &S,
    request: &AdvisoryRequest,
) -> Result<String> {
    if request.scenario.trim().is_empty() {
        return Err(NetrError::Advisory("Please describe the conflict".into()));
    }
    let text = service.generate(&request.render()).await?;
    let text = text.trim();
    if text.is_empty() {
        tracing::warn!(kind = %request.kind, "Advisory service returned no text");
        return Err(NetrError::Advisory("Empty response".into()));
    }
    Ok(text.to_string())
}

const STRATEGY_INSTRUCTIONS: &str = "Suggest a negotiation strategy for the conflict below. \
The user may Negotiate, Hold or Escalate each turn. Give three short, concrete suggestions \
for the next moves and say which move you would play first.";

const BRIEFING_INSTRUCTIONS: &str = "Write a short 'day' briefing, as a mediator's morning \
report, describing where the conflict below stands today and what to watch for next.";

const LEGAL_INSTRUCTIONS: &str = "Give brief, general commentary on the legal angles of the \
conflict below: what kind of dispute it is and which areas of law are likely to matter. \
This is commentary for a game, not legal advice.";
