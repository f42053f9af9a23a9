use crate::bracket::{
    LinkTable, MatchSlot, MatchSnapshot, PlannedMatch, PlayerSlot, Transition, apply_result,
};
use crate::entities::MatchStatus;
use crate::framework::DatabaseProcessor;
use crate::store::{
    CreateBracket, CreatedBracket, GetMatchById, ListMatchesByTournament, RecordMatchResult,
    RecordedResult, StoreError,
};
use bracket_sdk::objects::MatchResponse;
use kanau::processor::Processor;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MatchRecord {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: i32,
    pub match_number: i32,
    pub player1_id: Option<Uuid>,
    pub player2_id: Option<Uuid>,
    pub next_match_id: Option<Uuid>,
    pub status: MatchStatus,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub winner_id: Option<Uuid>,
    pub created_at: time::PrimitiveDateTime,
}

const MATCH_COLUMNS: &str = "id, tournament_id, round, match_number, player1_id, player2_id, \
    next_match_id, status, score_a, score_b, winner_id, created_at";

impl MatchRecord {
    /// Materialize a planned match outside of Postgres.
    pub fn from_planned(
        id: Uuid,
        tournament_id: Uuid,
        planned: &PlannedMatch,
        next_match_id: Option<Uuid>,
        created_at: time::PrimitiveDateTime,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            tournament_id,
            round: db_int(planned.slot.round)?,
            match_number: db_int(planned.slot.match_number)?,
            player1_id: planned.player1_id,
            player2_id: planned.player2_id,
            next_match_id,
            status: planned.status,
            score_a: None,
            score_b: None,
            winner_id: planned.winner_id,
            created_at,
        })
    }

    pub fn slot(&self) -> MatchSlot {
        MatchSlot::new(self.round.unsigned_abs(), self.match_number.unsigned_abs())
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            id: self.id,
            tournament_id: self.tournament_id,
            round: self.round,
            match_number: self.match_number,
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            next_match_id: self.next_match_id,
            status: self.status,
        }
    }

    pub fn set_player(&mut self, slot: PlayerSlot, player: Uuid) {
        match slot {
            PlayerSlot::Player1 => self.player1_id = Some(player),
            PlayerSlot::Player2 => self.player2_id = Some(player),
        }
    }

    /// Apply the completion half of a transition to this record.
    pub fn complete(&mut self, transition: &Transition) {
        self.status = MatchStatus::Completed;
        self.score_a = Some(transition.score_a);
        self.score_b = Some(transition.score_b);
        self.winner_id = Some(transition.winner_id);
    }
}

impl From<&MatchRecord> for MatchResponse {
    fn from(value: &MatchRecord) -> Self {
        MatchResponse {
            id: value.id,
            tournament_id: value.tournament_id,
            round: value.round.unsigned_abs(),
            match_number: value.match_number.unsigned_abs(),
            player1_id: value.player1_id,
            player2_id: value.player2_id,
            next_match_id: value.next_match_id,
            status: value.status.into(),
            score_a: value.score_a.map(i32::unsigned_abs),
            score_b: value.score_b.map(i32::unsigned_abs),
            winner_id: value.winner_id,
        }
    }
}

/// Convert a bracket coordinate to its column type.
pub(crate) fn db_int(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Backend(format!("{value} does not fit a column")))
}

/// A completed match points at a row that is gone.
pub(crate) fn missing_downstream(next_match_id: Uuid) -> StoreError {
    StoreError::Backend(format!("downstream match {next_match_id} is missing"))
}

/// Order every listing the same way: final first, then by position.
pub(crate) fn listing_order(a: &MatchRecord, b: &MatchRecord) -> std::cmp::Ordering {
    b.round.cmp(&a.round).then(a.match_number.cmp(&b.match_number))
}

impl MatchRecord {
    async fn exists_for_tournament_tx(
        conn: &mut PgConnection,
        tournament_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM matches WHERE tournament_id = $1)")
            .bind(tournament_id)
            .fetch_one(conn)
            .await
    }

    /// Insert one round and return `(id, match_number)` for each new row.
    ///
    /// Large rounds are split so no statement exceeds the bind limit.
    async fn insert_round_tx(
        conn: &mut PgConnection,
        tournament_id: Uuid,
        rows: Vec<PendingRow>,
    ) -> Result<Vec<(Uuid, i32)>, sqlx::Error> {
        let mut inserted = Vec::with_capacity(rows.len());
        for batch in into_batches(rows, MAX_ROWS_PER_INSERT) {
            inserted.extend(Self::insert_rows_tx(&mut *conn, tournament_id, batch).await?);
        }
        Ok(inserted)
    }

    async fn insert_rows_tx(
        conn: &mut PgConnection,
        tournament_id: Uuid,
        rows: Vec<PendingRow>,
    ) -> Result<Vec<(Uuid, i32)>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO matches \
            (tournament_id, round, match_number, player1_id, player2_id, next_match_id, status, winner_id) ",
        );

        query_builder.push_values(rows, |mut b, row| {
            b.push_bind(tournament_id)
                .push_bind(row.round)
                .push_bind(row.match_number)
                .push_bind(row.player1_id)
                .push_bind(row.player2_id)
                .push_bind(row.next_match_id)
                .push_bind(row.status)
                .push_bind(row.winner_id);
        });

        query_builder.push(" RETURNING id, match_number");

        query_builder
            .build_query_as::<(Uuid, i32)>()
            .fetch_all(conn)
            .await
    }

    async fn fetch_for_update_tx(
        conn: &mut PgConnection,
        match_id: Uuid,
    ) -> Result<Option<MatchSnapshot>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, tournament_id, round, match_number, player1_id, player2_id, next_match_id, status
            FROM matches
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(match_id)
        .fetch_optional(conn)
        .await
    }

    /// Complete a match that is still scheduled. `None` means another writer
    /// got there first.
    async fn complete_tx(
        conn: &mut PgConnection,
        transition: &Transition,
    ) -> Result<Option<MatchRecord>, sqlx::Error> {
        let sql = format!(
            "UPDATE matches \
            SET score_a = $2, score_b = $3, winner_id = $4, status = 'completed' \
            WHERE id = $1 AND status = 'scheduled' \
            RETURNING {MATCH_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(transition.match_id)
            .bind(transition.score_a)
            .bind(transition.score_b)
            .bind(transition.winner_id)
            .fetch_optional(conn)
            .await
    }

    async fn advance_winner_tx(
        conn: &mut PgConnection,
        next_match_id: Uuid,
        slot: PlayerSlot,
        winner_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let sql = match slot {
            PlayerSlot::Player1 => "UPDATE matches SET player1_id = $2 WHERE id = $1",
            PlayerSlot::Player2 => "UPDATE matches SET player2_id = $2 WHERE id = $1",
        };
        let result = sqlx::query(sql)
            .bind(next_match_id)
            .bind(winner_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Bind parameters per inserted match row.
const BINDS_PER_ROW: usize = 8;
/// Postgres accepts at most 65535 bind parameters per statement.
const MAX_ROWS_PER_INSERT: usize = u16::MAX as usize / BINDS_PER_ROW;

/// Split `rows` into consecutive batches of at most `size`.
fn into_batches<T>(mut rows: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::with_capacity(rows.len().div_ceil(size.max(1)));
    while !rows.is_empty() {
        let rest = rows.split_off(rows.len().min(size.max(1)));
        batches.push(rows);
        rows = rest;
    }
    batches
}

/// A planned match with its downstream link resolved.
struct PendingRow {
    round: i32,
    match_number: i32,
    player1_id: Option<Uuid>,
    player2_id: Option<Uuid>,
    next_match_id: Option<Uuid>,
    status: MatchStatus,
    winner_id: Option<Uuid>,
}

impl PendingRow {
    fn resolve(planned: &PlannedMatch, links: &LinkTable) -> Result<Self, StoreError> {
        Ok(Self {
            round: db_int(planned.slot.round)?,
            match_number: db_int(planned.slot.match_number)?,
            player1_id: planned.player1_id,
            player2_id: planned.player2_id,
            next_match_id: links.resolve(planned.next)?,
            status: planned.status,
            winner_id: planned.winner_id,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl Processor<CreateBracket> for DatabaseProcessor {
    type Output = CreatedBracket;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateBracket")]
    async fn process(&self, cmd: CreateBracket) -> Result<CreatedBracket, StoreError> {
        let plan = cmd.plan;
        let tournament_id = plan.tournament_id;
        let mut tx = self.begin().await?;

        if MatchRecord::exists_for_tournament_tx(tx.conn(), tournament_id).await? {
            return Err(StoreError::AlreadyGenerated(tournament_id));
        }

        let mut links = LinkTable::default();
        for round in (1..=plan.rounds).rev() {
            let rows = plan
                .round(round)
                .map(|planned| PendingRow::resolve(planned, &links))
                .collect::<Result<Vec<_>, _>>()?;

            let inserted = MatchRecord::insert_round_tx(tx.conn(), tournament_id, rows)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        StoreError::AlreadyGenerated(tournament_id)
                    } else {
                        StoreError::Database(e)
                    }
                })?;

            for (id, match_number) in inserted {
                links.record(MatchSlot::new(round, match_number.unsigned_abs()), id);
            }
        }

        tx.commit().await?;

        Ok(CreatedBracket {
            tournament_id,
            rounds: plan.rounds,
            ids: links,
        })
    }
}

impl Processor<ListMatchesByTournament> for DatabaseProcessor {
    type Output = Vec<MatchRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:ListMatchesByTournament")]
    async fn process(&self, query: ListMatchesByTournament) -> Result<Vec<MatchRecord>, StoreError> {
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
            WHERE tournament_id = $1 \
            ORDER BY round DESC, match_number ASC"
        );
        let matches = sqlx::query_as(&sql)
            .bind(query.tournament_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(matches)
    }
}

impl Processor<GetMatchById> for DatabaseProcessor {
    type Output = Option<MatchRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:GetMatchById")]
    async fn process(&self, query: GetMatchById) -> Result<Option<MatchRecord>, StoreError> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1");
        let record = sqlx::query_as(&sql)
            .bind(query.match_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }
}

impl Processor<RecordMatchResult> for DatabaseProcessor {
    type Output = RecordedResult;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:RecordMatchResult")]
    async fn process(&self, cmd: RecordMatchResult) -> Result<RecordedResult, StoreError> {
        let RecordMatchResult { match_id, result } = cmd;
        let mut tx = self.begin().await?;

        let current = MatchRecord::fetch_for_update_tx(tx.conn(), match_id)
            .await?
            .ok_or(StoreError::MatchNotFound(match_id))?;
        let transition = apply_result(&current, &result)?;

        let updated = MatchRecord::complete_tx(tx.conn(), &transition)
            .await?
            .ok_or(StoreError::Conflict(match_id))?;

        if let Some(advancement) = transition.advancement {
            let rows = MatchRecord::advance_winner_tx(
                tx.conn(),
                advancement.next_match_id,
                advancement.slot,
                advancement.winner_id,
            )
            .await?;
            if rows == 0 {
                return Err(missing_downstream(advancement.next_match_id));
            }
        }

        tx.commit().await?;

        Ok(RecordedResult {
            transition,
            updated,
        })
    }
}
