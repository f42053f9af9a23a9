//! Bracket planning.
//!
//! Turns a participant list into the full single-elimination match tree:
//! `R = ceil(log2 N)` rounds, `2^(R-r)` matches in round `r`, and every
//! non-final match linked to position `ceil(match_number / 2)` of the next
//! round. Round 1 is seeded pairwise from the (shuffled) participant list;
//! when the list runs out, the last matches become byes.

use crate::entities::MatchStatus;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Position of a match in the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchSlot {
    pub round: u32,
    pub match_number: u32,
}

impl MatchSlot {
    pub const fn new(round: u32, match_number: u32) -> Self {
        Self {
            round,
            match_number,
        }
    }

    /// The slot the winner of this match moves into, or `None` for the final
    /// of a bracket with `rounds` rounds.
    pub fn next(self, rounds: u32) -> Option<MatchSlot> {
        if self.round >= rounds {
            return None;
        }
        Some(MatchSlot::new(self.round + 1, self.match_number.div_ceil(2)))
    }

    /// Which player slot of the next match this match's winner fills.
    pub fn advancement_slot(self) -> PlayerSlot {
        PlayerSlot::for_match_number(self.match_number)
    }
}

impl std::fmt::Display for MatchSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}M{}", self.round, self.match_number)
    }
}

/// One of the two player slots of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    Player1,
    Player2,
}

impl PlayerSlot {
    /// Odd match numbers feed player 1 of the next match, even ones player 2.
    pub fn for_match_number(match_number: u32) -> Self {
        if match_number % 2 == 1 {
            PlayerSlot::Player1
        } else {
            PlayerSlot::Player2
        }
    }
}

/// How round-1 byes are laid out and whether their participant moves on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ByePolicy {
    /// Seed round-1 match `m` from positions `2m-2` and `2m-1`. A match left
    /// with one participant is completed with no winner and nobody is
    /// advanced; a match left with none stays scheduled.
    #[default]
    Faithful,
    /// Give every round-1 match at least one participant, complete each bye
    /// with its participant as the winner and place them in round 2.
    Advance,
}

/// Knobs for the builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    pub bye_policy: ByePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMatch {
    pub slot: MatchSlot,
    pub player1_id: Option<Uuid>,
    pub player2_id: Option<Uuid>,
    /// Slot of the downstream match; resolved to an id at persistence time.
    pub next: Option<MatchSlot>,
    pub status: MatchStatus,
    pub winner_id: Option<Uuid>,
}

impl PlannedMatch {
    fn empty(slot: MatchSlot, next: Option<MatchSlot>) -> Self {
        Self {
            slot,
            player1_id: None,
            player2_id: None,
            next,
            status: MatchStatus::Scheduled,
            winner_id: None,
        }
    }

    /// A round-1 match with a single participant.
    pub fn is_bye(&self) -> bool {
        self.slot.round == 1 && self.player1_id.is_some() && self.player2_id.is_none()
    }

    fn set_player(&mut self, slot: PlayerSlot, player: Uuid) {
        match slot {
            PlayerSlot::Player1 => self.player1_id = Some(player),
            PlayerSlot::Player2 => self.player2_id = Some(player),
        }
    }
}

/// The complete match tree of one tournament, ready to be persisted as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPlan {
    pub tournament_id: Uuid,
    pub rounds: u32,
    pub participants: usize,
    /// Ordered by round descending, then match number ascending. Every
    /// match therefore comes after the match it links to.
    pub matches: Vec<PlannedMatch>,
}

impl BracketPlan {
    pub fn get(&self, slot: MatchSlot) -> Option<&PlannedMatch> {
        self.matches.iter().find(|m| m.slot == slot)
    }

    fn get_mut(&mut self, slot: MatchSlot) -> Option<&mut PlannedMatch> {
        self.matches.iter_mut().find(|m| m.slot == slot)
    }

    pub fn final_match(&self) -> Option<&PlannedMatch> {
        self.get(MatchSlot::new(self.rounds, 1))
    }

    pub fn round(&self, round: u32) -> impl Iterator<Item = &PlannedMatch> {
        self.matches.iter().filter(move |m| m.slot.round == round)
    }

    /// Number of round-1 player slots left empty, `2^R - N`.
    pub fn bye_count(&self) -> usize {
        self.round(1)
            .map(|m| usize::from(m.player1_id.is_none()) + usize::from(m.player2_id.is_none()))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn advance_byes(&mut self) {
        let advanced: Vec<(MatchSlot, PlayerSlot, Uuid)> = self
            .matches
            .iter_mut()
            .filter(|m| m.is_bye())
            .filter_map(|m| {
                let winner = m.player1_id?;
                m.winner_id = Some(winner);
                Some((m.next?, m.slot.advancement_slot(), winner))
            })
            .collect();

        for (next, slot, winner) in advanced {
            if let Some(target) = self.get_mut(next) {
                target.set_player(slot, winner);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("not enough participants to generate a bracket: need at least 2, got {0}")]
    NotEnoughParticipants(usize),

    #[error("participant {0} appears more than once")]
    DuplicateParticipant(Uuid),
}

/// Number of rounds needed for `participants` entrants: `ceil(log2 N)`.
pub fn round_count(participants: usize) -> u32 {
    participants.max(1).next_power_of_two().trailing_zeros()
}

/// Shuffle the participants with `rng` and plan the bracket.
///
/// The shuffle is a Fisher–Yates pass, so every pairing is equally likely.
/// Pass a seeded RNG to get reproducible brackets.
pub fn plan_bracket<R: Rng + ?Sized>(
    tournament_id: Uuid,
    mut participants: Vec<Uuid>,
    options: BuilderOptions,
    rng: &mut R,
) -> Result<BracketPlan, PlanError> {
    validate(&participants)?;
    participants.shuffle(rng);
    plan_ordered(tournament_id, &participants, options)
}

/// Plan the bracket for participants in the given order, without shuffling.
///
/// Round-1 match `m` gets the participants at positions `2m-2` and `2m-1`.
pub fn plan_ordered(
    tournament_id: Uuid,
    participants: &[Uuid],
    options: BuilderOptions,
) -> Result<BracketPlan, PlanError> {
    validate(participants)?;

    let rounds = round_count(participants.len());
    let mut matches = Vec::with_capacity((1usize << rounds) - 1);

    for round in (1..=rounds).rev() {
        let matches_in_round = 1u32 << (rounds - round);
        for match_number in 1..=matches_in_round {
            let slot = MatchSlot::new(round, match_number);
            let mut planned = PlannedMatch::empty(slot, slot.next(rounds));

            if round == 1 {
                let (first, second) = seats(options.bye_policy, match_number, participants.len());
                planned.player1_id = first.and_then(|i| participants.get(i)).copied();
                planned.player2_id = second.and_then(|i| participants.get(i)).copied();
                if planned.is_bye() {
                    planned.status = MatchStatus::Completed;
                }
            }

            matches.push(planned);
        }
    }

    let mut plan = BracketPlan {
        tournament_id,
        rounds,
        participants: participants.len(),
        matches,
    };
    if options.bye_policy == ByePolicy::Advance {
        plan.advance_byes();
    }
    Ok(plan)
}

/// Participant positions seated in round-1 match `match_number`.
fn seats(policy: ByePolicy, match_number: u32, count: usize) -> (Option<usize>, Option<usize>) {
    let m = match_number as usize;
    match policy {
        ByePolicy::Faithful => (Some(2 * m - 2), Some(2 * m - 1)),
        ByePolicy::Advance => {
            // `count` is above half the slot count, so at least one match is paired.
            let half = count.next_power_of_two() / 2;
            let paired = count - half;
            if m <= paired {
                (Some(2 * m - 2), Some(2 * m - 1))
            } else {
                (Some(paired * 2 + (m - paired - 1)), None)
            }
        }
    }
}

fn validate(participants: &[Uuid]) -> Result<(), PlanError> {
    if participants.len() < 2 {
        return Err(PlanError::NotEnoughParticipants(participants.len()));
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(PlanError::DuplicateParticipant(*id));
        }
    }
    Ok(())
}
