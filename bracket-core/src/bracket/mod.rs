//! Pure bracket logic: planning the match tree and applying results.
//!
//! Nothing in here touches storage. The store backends consume a
//! [`BracketPlan`] and feed [`MatchSnapshot`]s back into [`apply_result`].

pub mod advance;
pub mod links;
pub mod plan;

pub use advance::{AdvanceError, Advancement, MatchResult, MatchSnapshot, Transition, apply_result};
pub use links::{LinkTable, UnresolvedLink};
pub use plan::{
    BracketPlan, BuilderOptions, ByePolicy, MatchSlot, PlanError, PlannedMatch, PlayerSlot, plan_bracket,
    plan_ordered, round_count,
};
