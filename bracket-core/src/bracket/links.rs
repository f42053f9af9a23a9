//! Forward references between matches.
//!
//! Match identifiers are assigned by the store, but a match row needs the id
//! of its downstream match when it is inserted. Persisting the plan final
//! first and recording every assigned id under its `(round, match_number)`
//! lets each later insert look its parent up.

use super::plan::MatchSlot;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    ids: HashMap<MatchSlot, Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no match id recorded for {0} yet")]
pub struct UnresolvedLink(pub MatchSlot);

impl LinkTable {
    pub fn record(&mut self, slot: MatchSlot, id: Uuid) {
        self.ids.insert(slot, id);
    }

    pub fn get(&self, slot: MatchSlot) -> Option<Uuid> {
        self.ids.get(&slot).copied()
    }

    /// Resolve a downstream slot to its id. `None` stays `None` (the final).
    pub fn resolve(&self, next: Option<MatchSlot>) -> Result<Option<Uuid>, UnresolvedLink> {
        match next {
            None => Ok(None),
            Some(slot) => self.get(slot).map(Some).ok_or(UnresolvedLink(slot)),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let mut links = LinkTable::default();
        let final_id = Uuid::new_v4();
        links.record(MatchSlot::new(2, 1), final_id);

        assert_eq!(links.resolve(None), Ok(None));
        assert_eq!(links.resolve(Some(MatchSlot::new(2, 1))), Ok(Some(final_id)));
        assert_eq!(
            links.resolve(Some(MatchSlot::new(3, 1))),
            Err(UnresolvedLink(MatchSlot::new(3, 1)))
        );
    }
}
