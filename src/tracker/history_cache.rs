use std::sync::Arc;

use crate::models::history::HistoryEntry;
use crate::store::{KeyValueStore, StorageError};

pub const HISTORY_KEY: &str = "moodmirror_history";
pub const MAX_HISTORY_ITEMS: usize = 5;

/// Most-recent-first list of the last [`MAX_HISTORY_ITEMS`] analyses.
///
/// Never fails outward: storage errors and unparsable values are logged and
/// treated as an empty history.
#[derive(Clone)]
pub struct HistoryCache {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Prepend `entry` and keep the first [`MAX_HISTORY_ITEMS`]. If the
    /// stored list cannot be read or the write fails, the save is dropped and
    /// the stored history stays as it was.
    pub fn save(&self, entry: HistoryEntry) {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history, dropping save");
                return;
            }
        };
        entries.insert(0, entry);
        entries.truncate(MAX_HISTORY_ITEMS);

        let encoded = match serde_json::to_string(&entries) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode history");
                return;
            }
        };

        if let Err(e) = self.store.set(HISTORY_KEY, &encoded) {
            tracing::warn!(error = %e, "Failed to save to history");
        }
    }

    pub fn list(&self) -> Vec<HistoryEntry> {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load history");
            Vec::new()
        })
    }

    /// Stored entries. Absent or unparsable values read as empty; only a
    /// failing store is an error.
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(MAX_HISTORY_ITEMS);
                Ok(entries)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored history is corrupt, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            tracing::warn!(error = %e, "Failed to clear history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::OverallTone;
    use crate::store::MemoryStore;
    use crate::test_support::{analysis, entry_at, FlakyStore};

    fn cache() -> (Arc<MemoryStore>, HistoryCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), HistoryCache::new(store))
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_, cache) = cache();
        assert!(cache.list().is_empty());
    }

    #[test]
    fn test_save_then_list_returns_entry_first_and_equal() {
        let (_, cache) = cache();
        cache.save(entry_at("older", OverallTone::Calm, 2024, 1, 1));
        let entry = entry_at("today was good", OverallTone::Joyful, 2024, 1, 2);

        cache.save(entry.clone());

        let listed = cache.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], entry);
    }

    #[test]
    fn test_never_exceeds_bound_and_keeps_most_recent_first() {
        let (_, cache) = cache();
        let mut saved = Vec::new();
        for day in 1..=12 {
            let entry = entry_at(&format!("entry {}", day), OverallTone::Neutral, 2024, 1, day);
            saved.push(entry.clone());
            cache.save(entry);
            assert!(cache.list().len() <= MAX_HISTORY_ITEMS);
        }

        let texts: Vec<String> = cache.list().into_iter().map(|e| e.text).collect();
        assert_eq!(
            texts,
            vec!["entry 12", "entry 11", "entry 10", "entry 9", "entry 8"]
        );
    }

    #[test]
    fn test_insertion_order_wins_over_timestamps() {
        let (_, cache) = cache();
        cache.save(entry_at("newer stamp", OverallTone::Sad, 2024, 5, 1));
        cache.save(entry_at("older stamp", OverallTone::Sad, 2024, 1, 1));

        assert_eq!(cache.list()[0].text, "older stamp");
    }

    #[test]
    fn test_clear_is_idempotent_and_resets() {
        let (_, cache) = cache();
        cache.save(entry_at("one", OverallTone::Calm, 2024, 1, 1));

        cache.clear();
        cache.clear();
        assert!(cache.list().is_empty());

        let fresh = entry_at("fresh", OverallTone::Excited, 2024, 1, 3);
        cache.save(fresh.clone());
        assert_eq!(cache.list(), vec![fresh]);
    }

    #[test]
    fn test_corrupt_value_reads_as_empty_and_is_overwritten() {
        let (store, cache) = cache();
        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(cache.list().is_empty());

        cache.save(entry_at("recovered", OverallTone::Grateful, 2024, 1, 1));
        assert_eq!(cache.list().len(), 1);
    }

    #[test]
    fn test_quota_failure_keeps_prior_state() {
        let store = Arc::new(MemoryStore::with_quota(1200));
        let cache = HistoryCache::new(store);
        let first = entry_at("short", OverallTone::Calm, 2024, 1, 1);
        cache.save(first.clone());
        assert_eq!(cache.list(), vec![first.clone()]);

        let mut big = entry_at("x", OverallTone::Calm, 2024, 1, 2);
        big.text = "x".repeat(4000);
        cache.save(big);

        assert_eq!(cache.list(), vec![first]);
    }

    #[test]
    fn test_oversized_stored_list_is_truncated_on_read() {
        let (store, cache) = cache();
        let entries: Vec<HistoryEntry> = (1..=8)
            .map(|d| HistoryEntry::new(format!("e{}", d), analysis(OverallTone::Mixed), crate::test_support::at(2024, 2, d)))
            .collect();
        store
            .set(HISTORY_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();

        assert_eq!(cache.list().len(), MAX_HISTORY_ITEMS);
    }

    #[test]
    fn test_read_failure_drops_save_and_keeps_prior_entries() {
        let store = Arc::new(FlakyStore::default());
        let cache = HistoryCache::new(store.clone());
        for d in 1..=4 {
            cache.save(entry_at(&format!("kept {}", d), OverallTone::Calm, 2024, 1, d));
        }

        store.fail_reads(true);
        cache.save(entry_at("lost", OverallTone::Sad, 2024, 1, 5));
        assert!(cache.list().is_empty());

        store.fail_reads(false);
        let texts: Vec<String> = cache.list().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["kept 4", "kept 3", "kept 2", "kept 1"]);
    }
}
