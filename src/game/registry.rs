//! Match Registry
//!
//! Pure storage and lookup for match records, keyed by UUID match id.
//! All mutation goes through `update` so callers cannot hold references
//! across other registry operations.

use std::collections::BTreeMap;

use crate::game::state::{MatchId, MatchRecord, UserId};

/// In-memory match store.
///
/// Records are never physically deleted; cancellation marks status only.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    matches: BTreeMap<MatchId, MatchRecord>,
}

impl MatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created record and return its id.
    ///
    /// Panics on id collision: UUIDv4 collision is a programming error,
    /// never silently overwritten.
    pub fn insert(&mut self, record: MatchRecord) -> MatchId {
        let id = record.id;
        let previous = self.matches.insert(id, record);
        assert!(previous.is_none(), "match id collision: {id}");
        id
    }

    /// Look up a record by id.
    pub fn get(&self, id: &MatchId) -> Option<&MatchRecord> {
        self.matches.get(id)
    }

    /// Apply a mutation to a record in place.
    ///
    /// Returns `None` if the match does not exist, otherwise the closure's
    /// result. No concurrency check: callers serialize all mutation.
    pub fn update<R>(&mut self, id: &MatchId, f: impl FnOnce(&mut MatchRecord) -> R) -> Option<R> {
        self.matches.get_mut(id).map(f)
    }

    /// All records, in id order.
    pub fn all(&self) -> Vec<MatchRecord> {
        self.matches.values().cloned().collect()
    }

    /// All records a user participates in.
    pub fn by_player(&self, user: &UserId) -> Vec<MatchRecord> {
        self.matches
            .values()
            .filter(|m| m.has_player(user))
            .cloned()
            .collect()
    }

    /// Number of stored matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True when no match has been created yet.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::Amount;
    use crate::game::state::{MatchStatus, MatchType};

    fn record(creator: &str) -> MatchRecord {
        MatchRecord::new(UserId::from(creator), Amount::from_whole(10), MatchType::Standard)
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = MatchRegistry::new();
        let id = registry.insert(record("alice"));

        assert_eq!(registry.len(), 1);
        let found = registry.get(&id).unwrap();
        assert_eq!(found.creator, UserId::from("alice"));

        let missing = MatchId::generate();
        assert!(registry.get(&missing).is_none());
    }

    #[test]
    #[should_panic(expected = "match id collision")]
    fn test_insert_collision_panics() {
        let mut registry = MatchRegistry::new();
        let first = record("alice");
        let mut duplicate = record("bob");
        duplicate.id = first.id;

        registry.insert(first);
        registry.insert(duplicate);
    }

    #[test]
    fn test_update_mutates_in_place() {
        let mut registry = MatchRegistry::new();
        let id = registry.insert(record("alice"));

        let result = registry.update(&id, |m| {
            m.status = MatchStatus::Ready;
            m.status
        });
        assert_eq!(result, Some(MatchStatus::Ready));
        assert_eq!(registry.get(&id).unwrap().status, MatchStatus::Ready);

        let missing = MatchId::generate();
        assert_eq!(registry.update(&missing, |_| ()), None);
    }

    #[test]
    fn test_by_player_filters() {
        let mut registry = MatchRegistry::new();
        let id_a = registry.insert(record("alice"));
        registry.insert(record("bob"));

        registry.update(&id_a, |m| m.players.push(UserId::from("carol")));

        assert_eq!(registry.by_player(&UserId::from("alice")).len(), 1);
        assert_eq!(registry.by_player(&UserId::from("carol")).len(), 1);
        assert_eq!(registry.by_player(&UserId::from("bob")).len(), 1);
        assert!(registry.by_player(&UserId::from("nobody")).is_empty());
        assert_eq!(registry.all().len(), 2);
    }
}
