//! The result state machine.
//!
//! A match is `scheduled` until a result is recorded, then `completed` for
//! good. Recording a result carries the winner into the player slot of the
//! downstream match picked by the parity of the match number.

use super::plan::{MatchSlot, PlayerSlot};
use crate::entities::MatchStatus;
use thiserror::Error;
use uuid::Uuid;

/// A submitted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub score_a: u32,
    pub score_b: u32,
    pub winner_id: Uuid,
}

impl From<bracket_sdk::objects::MatchResultRequest> for MatchResult {
    fn from(value: bracket_sdk::objects::MatchResultRequest) -> Self {
        Self {
            score_a: value.score_a,
            score_b: value.score_b,
            winner_id: value.winner_id,
        }
    }
}

/// The part of a stored match the state machine needs.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MatchSnapshot {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: i32,
    pub match_number: i32,
    pub player1_id: Option<Uuid>,
    pub player2_id: Option<Uuid>,
    pub next_match_id: Option<Uuid>,
    pub status: MatchStatus,
}

impl MatchSnapshot {
    pub fn slot(&self) -> MatchSlot {
        MatchSlot::new(self.round.unsigned_abs(), self.match_number.unsigned_abs())
    }
}

/// Where the winner goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advancement {
    pub next_match_id: Uuid,
    pub slot: PlayerSlot,
    pub winner_id: Uuid,
}

/// Every write that recording one result implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub match_id: Uuid,
    pub tournament_id: Uuid,
    pub round: u32,
    pub match_number: u32,
    pub score_a: i32,
    pub score_b: i32,
    pub winner_id: Uuid,
    /// `None` when the match is the final.
    pub advancement: Option<Advancement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvanceError {
    #[error("match {0} is already completed")]
    AlreadyCompleted(Uuid),

    #[error("winner {winner_id} is not a player of match {match_id}")]
    WinnerNotInMatch { match_id: Uuid, winner_id: Uuid },

    #[error("score {0} is out of range")]
    ScoreOutOfRange(u32),
}

fn stored_score(score: u32) -> Result<i32, AdvanceError> {
    i32::try_from(score).map_err(|_| AdvanceError::ScoreOutOfRange(score))
}

/// Validate `result` against the current state of a match and compute the
/// resulting transition. Nothing is written here.
pub fn apply_result(current: &MatchSnapshot, result: &MatchResult) -> Result<Transition, AdvanceError> {
    if current.status == MatchStatus::Completed {
        return Err(AdvanceError::AlreadyCompleted(current.id));
    }

    let winner = result.winner_id;
    if current.player1_id != Some(winner) && current.player2_id != Some(winner) {
        return Err(AdvanceError::WinnerNotInMatch {
            match_id: current.id,
            winner_id: winner,
        });
    }

    let score_a = stored_score(result.score_a)?;
    let score_b = stored_score(result.score_b)?;
    let slot = current.slot();

    Ok(Transition {
        match_id: current.id,
        tournament_id: current.tournament_id,
        round: slot.round,
        match_number: slot.match_number,
        score_a,
        score_b,
        winner_id: winner,
        advancement: current.next_match_id.map(|next_match_id| Advancement {
            next_match_id,
            slot: slot.advancement_slot(),
            winner_id: winner,
        }),
    })
}
