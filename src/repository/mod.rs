//! Domain-facing façade over the entry store.
//!
//! The repository adds exactly one cross-cutting rule: every full-record
//! `update` stamps `updated_at = now` before delegating. Narrow single-field
//! mutations (the favorite toggle used by list surfaces) deliberately bypass
//! that stamp by going to the store's dedicated path; marking an entry as a
//! favorite is not an edit for freshness purposes. All other operations pass
//! through unchanged.

use crate::db::entries::{DiaryEntry, EntryStore};
use crate::db::live::LiveQuery;
use crate::errors::AppResult;
use chrono::Utc;

/// Repository for diary entries.
#[derive(Clone)]
pub struct EntryRepository {
    store: EntryStore,
}

impl EntryRepository {
    /// Creates a repository over an entry store.
    pub fn new(store: EntryStore) -> Self {
        EntryRepository { store }
    }

    /// Inserts an entry, returning the assigned id.
    pub fn insert(&self, entry: &DiaryEntry) -> AppResult<i64> {
        self.store.insert(entry)
    }

    /// Replaces the full record, refreshing `updated_at` to now.
    pub fn update(&self, entry: &DiaryEntry) -> AppResult<()> {
        let mut stamped = entry.clone();
        stamped.updated_at = Utc::now().timestamp_millis();
        self.store.update(&stamped)
    }

    /// Removes the entry with the given id.
    pub fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete(id)
    }

    /// Point lookup by id.
    pub fn get_by_id(&self, id: i64) -> AppResult<Option<DiaryEntry>> {
        self.store.get_by_id(id)
    }

    /// First entry within `[start, end)`, if any.
    ///
    /// Range results are ordered date-descending with newest-insert
    /// tie-break, so this is the most recently written entry of the day.
    pub fn get_by_date(&self, start: i64, end: i64) -> AppResult<Option<DiaryEntry>> {
        Ok(self.store.get_by_date_range(start, end)?.into_iter().next())
    }

    /// Entries within `[start, end)`, date-descending.
    pub fn get_by_date_range(&self, start: i64, end: i64) -> AppResult<Vec<DiaryEntry>> {
        self.store.get_by_date_range(start, end)
    }

    /// Distinct entry dates, for marking calendar days.
    pub fn get_all_dates(&self) -> AppResult<Vec<i64>> {
        self.store.get_all_dates()
    }

    /// Flips the favorite flag via the store's narrow path.
    ///
    /// Exempt from the `updated_at` refresh.
    pub fn toggle_favorite(&self, id: i64, current_status: bool) -> AppResult<()> {
        self.store.set_favorite(id, !current_status)
    }

    /// One-shot search by substring.
    pub fn search(&self, query: &str) -> AppResult<Vec<DiaryEntry>> {
        self.store.search(query)
    }

    /// Live stream of all entries, date-descending.
    pub fn live_all(&self) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        self.store.live_all()
    }

    /// Live stream of favorite entries.
    pub fn live_favorites(&self) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        self.store.live_favorites()
    }

    /// Live stream of entries within `[start, end)`.
    pub fn live_date_range(&self, start: i64, end: i64) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        self.store.live_date_range(start, end)
    }

    /// Live stream of entries matching a substring search.
    pub fn live_search(&self, query: String) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        self.store.live_search(query)
    }

    /// Live stream of distinct entry dates.
    pub fn live_dates(&self) -> AppResult<LiveQuery<Vec<i64>>> {
        self.store.live_dates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::moods::Mood;
    use std::time::Duration;

    fn setup_repo() -> EntryRepository {
        let db = Database::open_in_memory().unwrap();
        db.initialize_schema().unwrap();
        EntryRepository::new(EntryStore::new(db))
    }

    #[test]
    fn test_update_strictly_increases_updated_at() {
        let repo = setup_repo();
        let id = repo
            .insert(&DiaryEntry::new("Day", "words", 1_000, Mood::Neutral))
            .unwrap();
        let before = repo.get_by_id(id).unwrap().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        let mut edited = before.clone();
        edited.content = "more words".to_string();
        repo.update(&edited).unwrap();

        let after = repo.get_by_id(id).unwrap().unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn test_toggle_favorite_narrow_path_preserves_updated_at() {
        let repo = setup_repo();
        let id = repo
            .insert(&DiaryEntry::new("Day", "words", 1_000, Mood::Neutral))
            .unwrap();
        let before = repo.get_by_id(id).unwrap().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        repo.toggle_favorite(id, before.is_favorite).unwrap();

        let after = repo.get_by_id(id).unwrap().unwrap();
        assert!(after.is_favorite);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn test_toggle_favorite_twice_returns_to_original() {
        let repo = setup_repo();
        let id = repo
            .insert(&DiaryEntry::new("Day", "words", 1_000, Mood::Neutral))
            .unwrap();

        repo.toggle_favorite(id, false).unwrap();
        let mid = repo.get_by_id(id).unwrap().unwrap();
        repo.toggle_favorite(id, mid.is_favorite).unwrap();

        assert!(!repo.get_by_id(id).unwrap().unwrap().is_favorite);
    }

    #[test]
    fn test_get_by_date_picks_newest_of_day() {
        let repo = setup_repo();
        repo.insert(&DiaryEntry::new("first", "a", 500, Mood::Sad))
            .unwrap();
        let newer = repo
            .insert(&DiaryEntry::new("second", "b", 500, Mood::Happy))
            .unwrap();

        let found = repo.get_by_date(0, 1_000).unwrap().unwrap();
        assert_eq!(found.id, newer);
    }

    #[test]
    fn test_get_by_date_empty_range() {
        let repo = setup_repo();
        assert!(repo.get_by_date(0, 1_000).unwrap().is_none());
    }
}
