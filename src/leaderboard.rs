//! High score leaderboard
//!
//! Persisted as a JSON array of `{name, score}` under a single key, sorted
//! best-first and capped at ten entries.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEADERBOARD_ENTRIES;
use crate::persistence::{self, KeyValueStore, StorageError};

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    /// Seconds survived
    pub score: u32,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Top-N ranking (descending by score, no de-duplication by name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "leaderboard";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary entries, restoring order and cap
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        // Stable: equal scores keep their existing order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Self { entries }
    }

    /// Demo ranking shown before anyone has played
    pub fn demo() -> Self {
        Self::from_entries(
            (1..=5)
                .map(|i| LeaderboardEntry::new(format!("Player{}", i), 110 - i * 10))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Rank a score would get if recorded now (1-indexed, None if it would be cut)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        let pos = self.entries.iter().filter(|e| e.score >= score).count();
        (pos < MAX_LEADERBOARD_ENTRIES).then_some(pos + 1)
    }

    /// Record a result. Ties rank below existing entries with the same score.
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn record(&mut self, name: &str, score: u32) -> Option<usize> {
        let rank = self.potential_rank(score);
        let pos = self.entries.iter().filter(|e| e.score >= score).count();
        self.entries.insert(pos, LeaderboardEntry::new(name, score));

        // Trim to max size
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        rank
    }

    /// Load from the store. Missing or unreadable data yields an empty board;
    /// malformed entries inside a readable array are skipped one by one.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_json::<Vec<serde_json::Value>>(store, Self::STORAGE_KEY) {
            Ok(Some(values)) => {
                let total = values.len();
                let entries: Vec<LeaderboardEntry> = values
                    .into_iter()
                    .filter_map(|value| serde_json::from_value(value).ok())
                    .collect();
                if entries.len() < total {
                    log::warn!(
                        "Skipped {} malformed leaderboard entries",
                        total - entries.len()
                    );
                }
                let board = Self::from_entries(entries);
                log::info!("Loaded {} leaderboard entries", board.len());
                board
            }
            Ok(None) => {
                log::info!("No leaderboard found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding unreadable leaderboard: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Seed the store with the demo ranking if it holds no leaderboard yet
    pub fn seed_if_missing(store: &mut dyn KeyValueStore) -> Result<bool, StorageError> {
        if store.get(Self::STORAGE_KEY)?.is_some() {
            return Ok(false);
        }
        Self::demo().save(store)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn names(board: &Leaderboard) -> Vec<&str> {
        board.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_record_inserts_in_order() {
        let mut board = Leaderboard::from_entries(vec![
            LeaderboardEntry::new("P1", 100),
            LeaderboardEntry::new("P2", 90),
        ]);
        assert_eq!(board.record("P3", 95), Some(2));
        assert_eq!(names(&board), vec!["P1", "P3", "P2"]);
    }

    #[test]
    fn test_record_caps_at_ten() {
        let mut board = Leaderboard::new();
        for i in 0..10 {
            board.record(&format!("P{}", i), 100 + i);
        }
        assert_eq!(board.len(), 10);

        // Too low to make it
        assert_eq!(board.record("late", 50), None);
        assert_eq!(board.len(), 10);
        assert!(board.entries().iter().all(|e| e.name != "late"));

        // Beats everything
        assert_eq!(board.record("best", 500), Some(1));
        assert_eq!(board.len(), 10);
        assert_eq!(board.top_score(), Some(500));
        assert!(board.entries().iter().all(|e| e.score != 100));
    }

    #[test]
    fn test_ties_rank_after_existing() {
        let mut board = Leaderboard::new();
        board.record("first", 10);
        assert_eq!(board.record("second", 10), Some(2));
        assert_eq!(names(&board), vec!["first", "second"]);
    }

    #[test]
    fn test_same_name_can_repeat() {
        let mut board = Leaderboard::new();
        board.record("ana", 30);
        board.record("ana", 20);
        assert_eq!(names(&board), vec!["ana", "ana"]);
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let mut store = MemoryStore::new();
        assert!(Leaderboard::load(&store).is_empty());

        store.set(Leaderboard::STORAGE_KEY, "not json").unwrap();
        assert!(Leaderboard::load(&store).is_empty());

        store.set(Leaderboard::STORAGE_KEY, r#"{"name": "x"}"#).unwrap();
        assert!(Leaderboard::load(&store).is_empty());
    }

    #[test]
    fn test_load_skips_malformed_entries() {
        let mut store = MemoryStore::new();
        store
            .set(
                Leaderboard::STORAGE_KEY,
                r#"[{"name":"a","score":100},{"name":"b","score":95.5},{"name":"c","score":-1},{"score":90},{"name":"d","score":80}]"#,
            )
            .unwrap();

        let board = Leaderboard::load(&store);
        assert_eq!(names(&board), vec!["a", "d"]);
        assert_eq!(board.top_score(), Some(100));

        // Recording rewrites the store with only the valid entries
        let mut board = board;
        board.record("e", 90);
        board.save(&mut store).unwrap();
        assert_eq!(names(&Leaderboard::load(&store)), vec!["a", "e", "d"]);
    }

    #[test]
    fn test_load_restores_invariant() {
        let mut store = MemoryStore::new();
        let unsorted: Vec<LeaderboardEntry> =
            (0..15).map(|i| LeaderboardEntry::new(format!("p{}", i), i)).collect();
        persistence::save_json(&mut store, Leaderboard::STORAGE_KEY, &unsorted).unwrap();

        let board = Leaderboard::load(&store);
        assert_eq!(board.len(), 10);
        assert_eq!(board.top_score(), Some(14));
    }

    #[test]
    fn test_persisted_format_is_plain_array() {
        let mut store = MemoryStore::new();
        let mut board = Leaderboard::new();
        board.record("P1", 100);
        board.save(&mut store).unwrap();

        let json = store.get(Leaderboard::STORAGE_KEY).unwrap().unwrap();
        assert_eq!(json, r#"[{"name":"P1","score":100}]"#);
        assert_eq!(Leaderboard::load(&store), board);
    }

    #[test]
    fn test_seed_if_missing() {
        let mut store = MemoryStore::new();
        assert!(Leaderboard::seed_if_missing(&mut store).unwrap());
        let board = Leaderboard::load(&store);
        assert_eq!(names(&board), vec!["Player1", "Player2", "Player3", "Player4", "Player5"]);
        assert_eq!(board.top_score(), Some(100));

        // Existing data is left alone
        assert!(!Leaderboard::seed_if_missing(&mut store).unwrap());
    }

    proptest! {
        #[test]
        fn prop_sorted_and_capped(scores in proptest::collection::vec(0u32..1000, 0..40)) {
            let mut board = Leaderboard::new();
            for (i, score) in scores.iter().enumerate() {
                board.record(&format!("p{}", i), *score);
                prop_assert!(board.len() <= MAX_LEADERBOARD_ENTRIES);
                prop_assert!(board.entries().windows(2).all(|w| w[0].score >= w[1].score));
            }

            // Holds exactly the ten best scores
            let mut best = scores.clone();
            best.sort_unstable_by(|a, b| b.cmp(a));
            best.truncate(MAX_LEADERBOARD_ENTRIES);
            let kept: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
            prop_assert_eq!(kept, best);
        }
    }
}
