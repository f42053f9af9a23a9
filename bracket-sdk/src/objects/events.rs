//! Notification payloads published after a bracket or a result is committed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exchange the notifications are addressed to.
pub const DEFAULT_EXCHANGE: &str = "t-hub.events";

pub const BRACKET_GENERATED_ROUTING_KEY: &str = "events.bracket.generated";
pub const MATCH_COMPLETED_ROUTING_KEY: &str = "events.match.completed";

/// Payload for `events.bracket.generated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketGeneratedPayload {
    pub event_type: String,
    pub tournament_id: Uuid,
    pub rounds: u32,
    pub matches: usize,
    pub timestamp: i64,
}

/// Payload for `events.match.completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCompletedPayload {
    pub event_type: String,
    pub match_id: Uuid,
    pub tournament_id: Uuid,
    pub round: u32,
    pub match_number: u32,
    pub score_a: u32,
    pub score_b: u32,
    pub winner_id: Uuid,
    /// The match the winner was advanced into, `None` for the final.
    pub next_match_id: Option<Uuid>,
    pub timestamp: i64,
}
