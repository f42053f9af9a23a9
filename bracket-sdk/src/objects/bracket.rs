//! Bracket and match representations returned to callers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MatchStatus;

/// A single match of a bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub id: Uuid,
    pub tournament_id: Uuid,
    /// 1 is the earliest round, the highest round is the final.
    pub round: u32,
    /// 1-based position within the round.
    pub match_number: u32,
    pub player1_id: Option<Uuid>,
    pub player2_id: Option<Uuid>,
    /// `None` only for the final.
    pub next_match_id: Option<Uuid>,
    pub status: MatchStatus,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub winner_id: Option<Uuid>,
}

/// Response of "get bracket".
///
/// Matches are ordered by round descending, then match number ascending,
/// so the final comes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketResponse {
    pub matches: Vec<MatchResponse>,
}

/// Response of "generate bracket".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateBracketResponse {
    pub tournament_id: Uuid,
    pub rounds: u32,
    pub matches: usize,
}

/// Request payload for submitting a match result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResultRequest {
    pub score_a: u32,
    pub score_b: u32,
    pub winner_id: Uuid,
}
