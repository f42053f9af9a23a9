//! Bracket operations exposed to callers.

use crate::bracket::{BuilderOptions, MatchResult, plan_bracket};
use crate::error::BracketError;
use crate::events::{BracketEvent, EventSink};
use crate::participants::ParticipantSource;
use crate::store::{
    BracketStore, CreateBracket, GetMatchById, ListMatchesByTournament, RecordMatchResult,
};
use bracket_sdk::objects::{BracketResponse, GenerateBracketResponse, MatchResponse};
use kanau::processor::Processor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

pub struct BracketService<S, P, E> {
    store: S,
    participants: P,
    events: E,
    options: BuilderOptions,
    rng: Mutex<StdRng>,
}

impl<S, P, E> BracketService<S, P, E>
where
    S: BracketStore,
    P: ParticipantSource,
    E: EventSink,
{
    /// A service with default options, shuffling from OS entropy.
    pub fn new(store: S, participants: P, events: E) -> Self {
        Self::with_options(store, participants, events, BuilderOptions::default(), None)
    }

    /// `seed` fixes the shuffle sequence; `None` seeds from the OS.
    pub fn with_options(
        store: S,
        participants: P,
        events: E,
        options: BuilderOptions,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            store,
            participants,
            events,
            options,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the participants, shuffle them into a bracket and persist every
    /// match in one transaction.
    ///
    /// Nothing is written when the participant lookup or validation fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn generate_bracket(
        &self,
        tournament_id: Uuid,
    ) -> Result<GenerateBracketResponse, BracketError> {
        let participants = self.participants.participants(tournament_id).await?;
        let ids: Vec<Uuid> = participants.into_iter().map(|p| p.id).collect();

        let plan = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            plan_bracket(tournament_id, ids, self.options, &mut *rng)?
        };
        let byes = plan.bye_count();

        let created = <S as Processor<CreateBracket>>::process(&self.store, CreateBracket { plan })
            .await?;

        info!(
            tournament_id = %tournament_id,
            rounds = created.rounds,
            matches = created.match_count(),
            byes,
            "Bracket generated"
        );

        self.publish(BracketEvent::BracketGenerated {
            tournament_id,
            rounds: created.rounds,
            matches: created.match_count(),
        })
        .await;

        Ok(GenerateBracketResponse {
            tournament_id,
            rounds: created.rounds,
            matches: created.match_count(),
        })
    }

    /// All matches of a tournament, final first. Unknown tournaments have
    /// an empty bracket.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_bracket(&self, tournament_id: Uuid) -> Result<BracketResponse, BracketError> {
        let records = <S as Processor<ListMatchesByTournament>>::process(
            &self.store,
            ListMatchesByTournament { tournament_id },
        )
        .await?;
        Ok(BracketResponse {
            matches: records.iter().map(MatchResponse::from).collect(),
        })
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn get_match(&self, match_id: Uuid) -> Result<MatchResponse, BracketError> {
        let record =
            <S as Processor<GetMatchById>>::process(&self.store, GetMatchById { match_id })
                .await?
                .ok_or(BracketError::MatchNotFound(match_id))?;
        Ok(MatchResponse::from(&record))
    }

    /// Complete a match and move its winner into the next round.
    #[tracing::instrument(skip(self, result), fields(winner_id = %result.winner_id), err)]
    pub async fn update_match_result(
        &self,
        match_id: Uuid,
        result: MatchResult,
    ) -> Result<MatchResponse, BracketError> {
        let recorded = <S as Processor<RecordMatchResult>>::process(
            &self.store,
            RecordMatchResult { match_id, result },
        )
        .await?;

        let transition = recorded.transition;
        info!(
            match_id = %match_id,
            tournament_id = %transition.tournament_id,
            winner_id = %transition.winner_id,
            next_match_id = ?transition.advancement.map(|a| a.next_match_id),
            "Match result recorded"
        );

        self.publish(BracketEvent::from_transition(&transition)).await;

        Ok(MatchResponse::from(&recorded.updated))
    }

    async fn publish(&self, event: BracketEvent) {
        let routing_key = event.routing_key();
        if let Err(e) = self.events.publish(event).await {
            warn!(routing_key, error = %e, "Failed to publish event");
        }
    }
}
