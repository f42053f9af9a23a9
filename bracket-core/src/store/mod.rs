//! Commands understood by the bracket stores.
//!
//! Both backends implement `kanau`'s [`Processor`] for each command:
//! [`DatabaseProcessor`](crate::framework::DatabaseProcessor) against
//! Postgres (see [`crate::entities::matches`]) and [`MemoryProcessor`] for
//! tests and dry runs. Every command is atomic: on error nothing it would
//! have written is visible.

pub mod memory;

use crate::bracket::{AdvanceError, BracketPlan, LinkTable, MatchResult, Transition, UnresolvedLink};
use crate::entities::matches::MatchRecord;
use kanau::processor::Processor;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryProcessor;

#[derive(Debug, Clone)]
/// Persist every match of a plan in one transaction.
pub struct CreateBracket {
    pub plan: BracketPlan,
}

#[derive(Debug, Clone)]
pub struct CreatedBracket {
    pub tournament_id: Uuid,
    pub rounds: u32,
    /// Assigned id of every match, by slot.
    pub ids: LinkTable,
}

impl CreatedBracket {
    pub fn match_count(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Clone)]
/// All matches of a tournament, final first.
pub struct ListMatchesByTournament {
    pub tournament_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct GetMatchById {
    pub match_id: Uuid,
}

#[derive(Debug, Clone)]
/// Complete a match and advance its winner, atomically.
pub struct RecordMatchResult {
    pub match_id: Uuid,
    pub result: MatchResult,
}

#[derive(Debug, Clone)]
pub struct RecordedResult {
    pub transition: Transition,
    /// The completed match as stored.
    pub updated: MatchRecord,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("match {0} not found")]
    MatchNotFound(Uuid),

    #[error("a bracket already exists for tournament {0}")]
    AlreadyGenerated(Uuid),

    #[error("result rejected: {0}")]
    Rejected(#[from] AdvanceError),

    #[error(transparent)]
    UnresolvedLink(#[from] UnresolvedLink),

    #[error("match {0} was completed concurrently")]
    Conflict(Uuid),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// A backend able to run every bracket command.
pub trait BracketStore:
    Processor<CreateBracket, Output = CreatedBracket, Error = StoreError>
    + Processor<ListMatchesByTournament, Output = Vec<MatchRecord>, Error = StoreError>
    + Processor<GetMatchById, Output = Option<MatchRecord>, Error = StoreError>
    + Processor<RecordMatchResult, Output = RecordedResult, Error = StoreError>
    + Send
    + Sync
{
}

impl<T> BracketStore for T where
    T: Processor<CreateBracket, Output = CreatedBracket, Error = StoreError>
        + Processor<ListMatchesByTournament, Output = Vec<MatchRecord>, Error = StoreError>
        + Processor<GetMatchById, Output = Option<MatchRecord>, Error = StoreError>
        + Processor<RecordMatchResult, Output = RecordedResult, Error = StoreError>
        + Send
        + Sync
{
}
