//! Event type definitions.
//!
//! Events carry everything their payload needs, so the relay never goes
//! back to the store.

use crate::bracket::Transition;
use bracket_sdk::objects::{
    BRACKET_GENERATED_ROUTING_KEY, BracketGeneratedPayload, MATCH_COMPLETED_ROUTING_KEY,
    MatchCompletedPayload,
};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketEvent {
    /// Every match of a tournament was committed.
    BracketGenerated {
        tournament_id: Uuid,
        rounds: u32,
        matches: usize,
    },
    /// A result was committed and its winner advanced.
    MatchCompleted {
        match_id: Uuid,
        tournament_id: Uuid,
        round: u32,
        match_number: u32,
        score_a: u32,
        score_b: u32,
        winner_id: Uuid,
        next_match_id: Option<Uuid>,
    },
}

impl BracketEvent {
    pub fn from_transition(transition: &Transition) -> Self {
        BracketEvent::MatchCompleted {
            match_id: transition.match_id,
            tournament_id: transition.tournament_id,
            round: transition.round,
            match_number: transition.match_number,
            score_a: transition.score_a.unsigned_abs(),
            score_b: transition.score_b.unsigned_abs(),
            winner_id: transition.winner_id,
            next_match_id: transition.advancement.map(|a| a.next_match_id),
        }
    }

    pub fn routing_key(&self) -> &'static str {
        match self {
            BracketEvent::BracketGenerated { .. } => BRACKET_GENERATED_ROUTING_KEY,
            BracketEvent::MatchCompleted { .. } => MATCH_COMPLETED_ROUTING_KEY,
        }
    }

    pub fn tournament_id(&self) -> Uuid {
        match self {
            BracketEvent::BracketGenerated { tournament_id, .. }
            | BracketEvent::MatchCompleted { tournament_id, .. } => *tournament_id,
        }
    }

    /// Serialize the wire payload, stamped with the current time.
    pub fn body(&self) -> Result<String, serde_json::Error> {
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
        match *self {
            BracketEvent::BracketGenerated {
                tournament_id,
                rounds,
                matches,
            } => serde_json::to_string(&BracketGeneratedPayload {
                event_type: "bracket_generated".to_string(),
                tournament_id,
                rounds,
                matches,
                timestamp,
            }),
            BracketEvent::MatchCompleted {
                match_id,
                tournament_id,
                round,
                match_number,
                score_a,
                score_b,
                winner_id,
                next_match_id,
            } => serde_json::to_string(&MatchCompletedPayload {
                event_type: "match_completed".to_string(),
                match_id,
                tournament_id,
                round,
                match_number,
                score_a,
                score_b,
                winner_id,
                next_match_id,
                timestamp,
            }),
        }
    }
}
