//! In-process store used by tests and `--dry-run`.
//!
//! Each command stages its writes against a copy of the affected rows and
//! swaps them in only when every write succeeded, mirroring the
//! transactional behavior of the Postgres backend.

use super::{
    CreateBracket, CreatedBracket, GetMatchById, ListMatchesByTournament, RecordMatchResult,
    RecordedResult, StoreError,
};
use crate::bracket::{LinkTable, apply_result};
use crate::entities::matches::{MatchRecord, listing_order, missing_downstream};
use kanau::processor::Processor;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct MemoryProcessor {
    state: Arc<Mutex<Vec<MatchRecord>>>,
    /// Fail the command whose write count would exceed this.
    fail_after: Option<usize>,
}

impl MemoryProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose commands fail once they have staged `writes` row writes.
    /// A bracket insert counts one write per match; a result counts one for
    /// the completed match and one for the advancement.
    pub fn with_failure_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::default()
        }
    }

    /// A handle on the same rows whose commands fail like
    /// [`with_failure_after`](Self::with_failure_after).
    pub fn failing_after(&self, writes: usize) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fail_after: Some(writes),
        }
    }

    /// Copy of every stored row.
    pub fn snapshot(&self) -> Result<Vec<MatchRecord>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<MatchRecord>>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn count_write(&self, writes: &mut usize) -> Result<(), StoreError> {
        *writes += 1;
        match self.fail_after {
            Some(limit) if *writes > limit => {
                Err(StoreError::Backend("injected write failure".to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}

impl Processor<CreateBracket> for MemoryProcessor {
    type Output = CreatedBracket;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "MEM:CreateBracket")]
    async fn process(&self, cmd: CreateBracket) -> Result<CreatedBracket, StoreError> {
        let plan = cmd.plan;
        let tournament_id = plan.tournament_id;
        let mut state = self.lock()?;

        if state.iter().any(|m| m.tournament_id == tournament_id) {
            return Err(StoreError::AlreadyGenerated(tournament_id));
        }

        let created_at = now();
        let mut links = LinkTable::default();
        let mut staged = Vec::with_capacity(plan.len());
        let mut writes = 0;
        for planned in &plan.matches {
            self.count_write(&mut writes)?;
            let next_match_id = links.resolve(planned.next)?;
            let id = Uuid::new_v4();
            staged.push(MatchRecord::from_planned(
                id,
                tournament_id,
                planned,
                next_match_id,
                created_at,
            )?);
            links.record(planned.slot, id);
        }

        state.extend(staged);

        Ok(CreatedBracket {
            tournament_id,
            rounds: plan.rounds,
            ids: links,
        })
    }
}

impl Processor<ListMatchesByTournament> for MemoryProcessor {
    type Output = Vec<MatchRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "MEM:ListMatchesByTournament")]
    async fn process(&self, query: ListMatchesByTournament) -> Result<Vec<MatchRecord>, StoreError> {
        let mut matches: Vec<MatchRecord> = self
            .lock()?
            .iter()
            .filter(|m| m.tournament_id == query.tournament_id)
            .cloned()
            .collect();
        matches.sort_by(listing_order);
        Ok(matches)
    }
}

impl Processor<GetMatchById> for MemoryProcessor {
    type Output = Option<MatchRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "MEM:GetMatchById")]
    async fn process(&self, query: GetMatchById) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self.lock()?.iter().find(|m| m.id == query.match_id).cloned())
    }
}

impl Processor<RecordMatchResult> for MemoryProcessor {
    type Output = RecordedResult;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "MEM:RecordMatchResult")]
    async fn process(&self, cmd: RecordMatchResult) -> Result<RecordedResult, StoreError> {
        let RecordMatchResult { match_id, result } = cmd;
        let mut state = self.lock()?;
        let mut writes = 0;

        let current_index = state
            .iter()
            .position(|m| m.id == match_id)
            .ok_or(StoreError::MatchNotFound(match_id))?;
        let transition = apply_result(&state[current_index].snapshot(), &result)?;

        self.count_write(&mut writes)?;
        let mut updated = state[current_index].clone();
        updated.complete(&transition);

        let mut advanced = None;
        if let Some(advancement) = transition.advancement {
            self.count_write(&mut writes)?;
            let next_index = state
                .iter()
                .position(|m| m.id == advancement.next_match_id)
                .ok_or_else(|| missing_downstream(advancement.next_match_id))?;
            let mut next = state[next_index].clone();
            next.set_player(advancement.slot, advancement.winner_id);
            advanced = Some((next_index, next));
        }

        state[current_index] = updated.clone();
        if let Some((index, next)) = advanced {
            state[index] = next;
        }

        Ok(RecordedResult {
            transition,
            updated,
        })
    }
}
