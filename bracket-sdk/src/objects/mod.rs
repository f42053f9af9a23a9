pub mod bracket;
pub mod events;

pub use bracket::{BracketResponse, GenerateBracketResponse, MatchResponse, MatchResultRequest};
pub use events::{
    BRACKET_GENERATED_ROUTING_KEY, BracketGeneratedPayload, DEFAULT_EXCHANGE,
    MATCH_COMPLETED_ROUTING_KEY, MatchCompletedPayload,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant as served by the tournament service
/// (`GET /tournaments/{id}/participants`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
}

/// Match status for API responses.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `bracket-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Completed,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown match status: {0}")]
pub struct ParseMatchStatusError(String);

impl std::str::FromStr for MatchStatus {
    type Err = ParseMatchStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(ParseMatchStatusError(other.to_string())),
        }
    }
}
