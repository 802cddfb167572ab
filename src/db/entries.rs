//! Entry CRUD operations and queries.
//!
//! This module provides the diary entry record type and the store exposing
//! point lookups, date-range and favorite queries, free-text search, and the
//! live forms of every list query.

use crate::db::live::LiveQuery;
use crate::db::Database;
use crate::errors::{AppResult, DatabaseError};
use crate::moods::Mood;
use chrono::Utc;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// One journal entry.
///
/// An `id` of 0 denotes "not yet persisted"; the store assigns the identity
/// on first insert. `date` is the user-assigned entry day (epoch millis),
/// distinct from `created_at`/`updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub date: i64,
    pub mood: Mood,
    pub is_favorite: bool,
    pub is_locked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DiaryEntry {
    /// Creates an unsaved entry with both timestamps set to now.
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: i64, mood: Mood) -> Self {
        let now = Utc::now().timestamp_millis();
        DiaryEntry {
            id: 0,
            title: title.into(),
            content: content.into(),
            date,
            mood,
            is_favorite: false,
            is_locked: false,
            created_at: now,
            updated_at: now,
        }
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<DiaryEntry> {
    let mood_name: String = row.get(4)?;
    let mood = Mood::from_str(&mood_name).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(DiaryEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        date: row.get(3)?,
        mood,
        is_favorite: row.get(5)?,
        is_locked: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const ENTRY_COLUMNS: &str =
    "id, title, content, date, mood, is_favorite, is_locked, created_at, updated_at";

/// Durable store for [`DiaryEntry`] records.
///
/// Cloning is cheap; clones share the underlying pool and change channel.
/// Every mutation bumps the database revision so live queries re-deliver.
#[derive(Clone)]
pub struct EntryStore {
    db: Database,
}

impl EntryStore {
    /// Creates a store over an opened database.
    pub fn new(db: Database) -> Self {
        EntryStore { db }
    }

    /// Inserts an entry, or replaces the record on identity conflict when the
    /// entry already carries an id. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, entry: &DiaryEntry) -> AppResult<i64> {
        debug!("Inserting entry '{}' for date {}", entry.title, entry.date);
        let conn = self.db.get_conn()?;

        let id = if entry.id > 0 {
            conn.execute(
                r#"
                INSERT OR REPLACE INTO diary_entries
                    (id, title, content, date, mood, is_favorite, is_locked, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    entry.id,
                    entry.title,
                    entry.content,
                    entry.date,
                    entry.mood.as_str(),
                    entry.is_favorite,
                    entry.is_locked,
                    entry.created_at,
                    entry.updated_at,
                ],
            )
            .map_err(DatabaseError::Sqlite)?;
            entry.id
        } else {
            conn.execute(
                r#"
                INSERT INTO diary_entries
                    (title, content, date, mood, is_favorite, is_locked, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    entry.title,
                    entry.content,
                    entry.date,
                    entry.mood.as_str(),
                    entry.is_favorite,
                    entry.is_locked,
                    entry.created_at,
                    entry.updated_at,
                ],
            )
            .map_err(DatabaseError::Sqlite)?;
            conn.last_insert_rowid()
        };

        self.db.mark_changed();
        debug!("Entry inserted with id {}", id);
        Ok(id)
    }

    /// Replaces the full record matching `entry.id`.
    ///
    /// A missing id is a silent no-op: the update-by-id flow treats
    /// not-found as recoverable and the caller carries on.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update(&self, entry: &DiaryEntry) -> AppResult<()> {
        let conn = self.db.get_conn()?;
        let rows = conn
            .execute(
                r#"
                UPDATE diary_entries
                SET title = ?2, content = ?3, date = ?4, mood = ?5,
                    is_favorite = ?6, is_locked = ?7, created_at = ?8, updated_at = ?9
                WHERE id = ?1
                "#,
                params![
                    entry.id,
                    entry.title,
                    entry.content,
                    entry.date,
                    entry.mood.as_str(),
                    entry.is_favorite,
                    entry.is_locked,
                    entry.created_at,
                    entry.updated_at,
                ],
            )
            .map_err(DatabaseError::Sqlite)?;

        if rows == 0 {
            debug!("Update skipped: no entry with id {}", entry.id);
        } else {
            self.db.mark_changed();
        }
        Ok(())
    }

    /// Removes the record matching `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> AppResult<()> {
        debug!("Deleting entry {}", id);
        let conn = self.db.get_conn()?;
        let rows = conn
            .execute("DELETE FROM diary_entries WHERE id = ?1", params![id])
            .map_err(DatabaseError::Sqlite)?;

        if rows > 0 {
            self.db.mark_changed();
        }
        Ok(())
    }

    /// Point lookup by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    /// Returns `Ok(None)` if no entry exists with the given id.
    pub fn get_by_id(&self, id: i64) -> AppResult<Option<DiaryEntry>> {
        let conn = self.db.get_conn()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM diary_entries WHERE id = ?1", ENTRY_COLUMNS),
            params![id],
            entry_from_row,
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::Sqlite(e).into()),
        }
    }

    /// All entries, ordered descending by date.
    ///
    /// Ties on `date` break by descending id, so the most recently inserted
    /// entry of a day sorts first.
    pub fn get_all(&self) -> AppResult<Vec<DiaryEntry>> {
        self.query_entries(
            &format!(
                "SELECT {} FROM diary_entries ORDER BY date DESC, id DESC",
                ENTRY_COLUMNS
            ),
            params![],
        )
    }

    /// All favorite entries, ordered descending by date.
    pub fn get_favorites(&self) -> AppResult<Vec<DiaryEntry>> {
        self.query_entries(
            &format!(
                "SELECT {} FROM diary_entries WHERE is_favorite = 1 ORDER BY date DESC, id DESC",
                ENTRY_COLUMNS
            ),
            params![],
        )
    }

    /// Entries with `start <= date < end`, ordered descending by date.
    pub fn get_by_date_range(&self, start: i64, end: i64) -> AppResult<Vec<DiaryEntry>> {
        self.query_entries(
            &format!(
                "SELECT {} FROM diary_entries WHERE date >= ?1 AND date < ?2 ORDER BY date DESC, id DESC",
                ENTRY_COLUMNS
            ),
            params![start, end],
        )
    }

    /// Distinct `date` values across all entries, used to mark which calendar
    /// days have at least one entry.
    pub fn get_all_dates(&self) -> AppResult<Vec<i64>> {
        let conn = self.db.get_conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT date FROM diary_entries")
            .map_err(DatabaseError::Sqlite)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(DatabaseError::Sqlite)?;

        let mut dates = Vec::new();
        for date in rows {
            dates.push(date.map_err(DatabaseError::Sqlite)?);
        }
        Ok(dates)
    }

    /// Case-insensitive substring match against title or content, ordered
    /// descending by date.
    pub fn search(&self, query: &str) -> AppResult<Vec<DiaryEntry>> {
        self.query_entries(
            &format!(
                "SELECT {} FROM diary_entries \
                 WHERE title LIKE '%' || ?1 || '%' OR content LIKE '%' || ?1 || '%' \
                 ORDER BY date DESC, id DESC",
                ENTRY_COLUMNS
            ),
            params![query],
        )
    }

    /// Narrow single-field favorite update.
    ///
    /// Deliberately bypasses the general update path: it does not refresh
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_favorite(&self, id: i64, is_favorite: bool) -> AppResult<()> {
        debug!("Setting favorite={} on entry {}", is_favorite, id);
        let conn = self.db.get_conn()?;
        let rows = conn
            .execute(
                "UPDATE diary_entries SET is_favorite = ?2 WHERE id = ?1",
                params![id, is_favorite],
            )
            .map_err(DatabaseError::Sqlite)?;

        if rows > 0 {
            self.db.mark_changed();
        }
        Ok(())
    }

    // Live forms. Each holds a subscription on the database revision channel
    // and re-delivers a fresh snapshot after every write.

    /// Live form of [`EntryStore::get_all`].
    pub fn live_all(&self) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        let store = self.clone();
        LiveQuery::spawn("all_entries", &self.db, move || store.get_all())
    }

    /// Live form of [`EntryStore::get_favorites`].
    pub fn live_favorites(&self) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        let store = self.clone();
        LiveQuery::spawn("favorite_entries", &self.db, move || store.get_favorites())
    }

    /// Live form of [`EntryStore::get_by_date_range`].
    pub fn live_date_range(&self, start: i64, end: i64) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        let store = self.clone();
        LiveQuery::spawn("date_range", &self.db, move || {
            store.get_by_date_range(start, end)
        })
    }

    /// Live form of [`EntryStore::search`].
    pub fn live_search(&self, query: String) -> AppResult<LiveQuery<Vec<DiaryEntry>>> {
        let store = self.clone();
        LiveQuery::spawn("search", &self.db, move || store.search(&query))
    }

    /// Live form of [`EntryStore::get_all_dates`].
    pub fn live_dates(&self) -> AppResult<LiveQuery<Vec<i64>>> {
        let store = self.clone();
        LiveQuery::spawn("entry_dates", &self.db, move || store.get_all_dates())
    }

    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> AppResult<Vec<DiaryEntry>> {
        let conn = self.db.get_conn()?;
        let mut stmt = conn.prepare(sql).map_err(DatabaseError::Sqlite)?;
        let rows = stmt
            .query_map(params, entry_from_row)
            .map_err(DatabaseError::Sqlite)?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry.map_err(DatabaseError::Sqlite)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn setup_test_store() -> EntryStore {
        let db = Database::open_in_memory().unwrap();
        db.initialize_schema().unwrap();
        EntryStore::new(db)
    }

    fn sample(title: &str, content: &str, date: i64, mood: Mood) -> DiaryEntry {
        DiaryEntry::new(title, content, date, mood)
    }

    #[test]
    fn test_insert_then_get_by_id_round_trips_fields() {
        let store = setup_test_store();
        let entry = sample("A walk", "Went for a long walk", 1_000, Mood::Happy);

        let id = store.insert(&entry).unwrap();
        assert!(id > 0);

        let fetched = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.title, entry.title);
        assert_eq!(fetched.content, entry.content);
        assert_eq!(fetched.date, entry.date);
        assert_eq!(fetched.mood, entry.mood);
        assert!(!fetched.is_favorite);
        assert!(!fetched.is_locked);
        assert_eq!(fetched.created_at, entry.created_at);
        assert_eq!(fetched.updated_at, entry.updated_at);
    }

    #[test]
    fn test_insert_replaces_on_id_conflict() {
        let store = setup_test_store();
        let id = store
            .insert(&sample("First", "first body", 1_000, Mood::Neutral))
            .unwrap();

        let mut replacement = sample("Second", "second body", 2_000, Mood::Excited);
        replacement.id = id;
        let replaced_id = store.insert(&replacement).unwrap();
        assert_eq!(replaced_id, id);

        let fetched = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.title, "Second");
        assert_eq!(fetched.date, 2_000);
    }

    #[test]
    fn test_get_by_id_not_found() {
        let store = setup_test_store();
        assert!(store.get_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_update_replaces_full_record() {
        let store = setup_test_store();
        let id = store
            .insert(&sample("Old", "old body", 1_000, Mood::Sad))
            .unwrap();

        let mut entry = store.get_by_id(id).unwrap().unwrap();
        entry.title = "New".to_string();
        entry.mood = Mood::Grateful;
        entry.is_locked = true;
        store.update(&entry).unwrap();

        let fetched = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.title, "New");
        assert_eq!(fetched.mood, Mood::Grateful);
        assert!(fetched.is_locked);
    }

    #[test]
    fn test_update_missing_id_is_silent_noop() {
        let store = setup_test_store();
        let mut ghost = sample("Ghost", "nobody home", 1_000, Mood::Neutral);
        ghost.id = 424_242;

        store.update(&ghost).unwrap();
        assert!(store.get_by_id(ghost.id).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let store = setup_test_store();
        let id = store
            .insert(&sample("Gone", "soon", 1_000, Mood::Neutral))
            .unwrap();

        store.delete(id).unwrap();
        assert!(store.get_by_id(id).unwrap().is_none());
    }

    #[test]
    fn test_date_range_is_half_open_and_descending() {
        let store = setup_test_store();
        for (title, date) in [("a", 100), ("b", 200), ("c", 300), ("d", 400)] {
            store
                .insert(&sample(title, "body", date, Mood::Neutral))
                .unwrap();
        }

        let entries = store.get_by_date_range(200, 400).unwrap();
        let dates: Vec<i64> = entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![300, 200]);
    }

    #[test]
    fn test_same_day_ties_break_by_most_recent_insert() {
        let store = setup_test_store();
        store
            .insert(&sample("first", "body", 500, Mood::Neutral))
            .unwrap();
        let second_id = store
            .insert(&sample("second", "body", 500, Mood::Happy))
            .unwrap();

        let entries = store.get_by_date_range(0, 1_000).unwrap();
        assert_eq!(entries[0].id, second_id);
    }

    #[test]
    fn test_favorites_query() {
        let store = setup_test_store();
        let id = store
            .insert(&sample("fav", "body", 100, Mood::Happy))
            .unwrap();
        store
            .insert(&sample("plain", "body", 200, Mood::Sad))
            .unwrap();
        store.set_favorite(id, true).unwrap();

        let favorites = store.get_favorites().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, id);
    }

    #[test]
    fn test_set_favorite_does_not_touch_updated_at() {
        let store = setup_test_store();
        let id = store
            .insert(&sample("fav", "body", 100, Mood::Happy))
            .unwrap();
        let before = store.get_by_id(id).unwrap().unwrap().updated_at;

        std::thread::sleep(Duration::from_millis(5));
        store.set_favorite(id, true).unwrap();

        let after = store.get_by_id(id).unwrap().unwrap();
        assert!(after.is_favorite);
        assert_eq!(after.updated_at, before);
    }

    #[test]
    fn test_set_favorite_is_idempotent_and_toggles_back() {
        let store = setup_test_store();
        let id = store
            .insert(&sample("fav", "body", 100, Mood::Happy))
            .unwrap();

        store.set_favorite(id, true).unwrap();
        store.set_favorite(id, true).unwrap();
        assert!(store.get_by_id(id).unwrap().unwrap().is_favorite);

        store.set_favorite(id, false).unwrap();
        assert!(!store.get_by_id(id).unwrap().unwrap().is_favorite);
    }

    #[test]
    fn test_search_matches_title_and_content_case_insensitively() {
        let store = setup_test_store();
        store
            .insert(&sample("Morning Walk", "sunny", 300, Mood::Happy))
            .unwrap();
        store
            .insert(&sample("Dinner", "walked home after", 200, Mood::Neutral))
            .unwrap();
        store
            .insert(&sample("Nothing", "quiet day", 100, Mood::Neutral))
            .unwrap();

        let results = store.search("WALK").unwrap();
        assert_eq!(results.len(), 2);
        // Descending date order
        assert_eq!(results[0].title, "Morning Walk");
        assert_eq!(results[1].title, "Dinner");
    }

    #[test]
    fn test_get_all_dates_distinct() {
        let store = setup_test_store();
        store
            .insert(&sample("a", "body", 100, Mood::Neutral))
            .unwrap();
        store
            .insert(&sample("b", "body", 100, Mood::Neutral))
            .unwrap();
        store
            .insert(&sample("c", "body", 200, Mood::Neutral))
            .unwrap();

        let mut dates = store.get_all_dates().unwrap();
        dates.sort();
        assert_eq!(dates, vec![100, 200]);
    }

    #[tokio::test]
    async fn test_live_all_re_emits_after_insert() {
        let store = setup_test_store();
        let mut live = store.live_all().unwrap();
        assert!(live.snapshot().is_empty());

        store
            .insert(&sample("new", "body", 100, Mood::Happy))
            .unwrap();

        let refreshed = tokio::time::timeout(Duration::from_secs(2), live.changed())
            .await
            .unwrap();
        assert!(refreshed);
        assert_eq!(live.snapshot().len(), 1);
    }
}
