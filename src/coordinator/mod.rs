//! The view state coordinator.
//!
//! Owns all derived, continuously-recomputed UI state and exposes it as live
//! watch-channel values; translates user intents into repository and
//! preference-store calls. Intent handlers follow a soft-fail policy: a
//! failed lookup or write is logged and the surface carries on, it never
//! crashes the caller.
//!
//! Three background loops run for the coordinator's lifetime (sentence
//! rotation, the minute clock, and suggestion reshuffling), each tied to a
//! cancellation token so teardown is deterministic rather than relying on
//! implicit scope cancellation.

pub mod filter;

use crate::constants::{MILLIS_PER_DAY, SENTENCE_ROTATION_SECS, SUGGESTION_SHUFFLE_SECS};
use crate::db::entries::DiaryEntry;
use crate::db::live::LiveQuery;
use crate::errors::AppResult;
use crate::moods::{suggestions_for_mood, Mood, ROTATING_SENTENCES};
use crate::prefs::{PreferenceStore, UserPreferences};
use crate::repository::EntryRepository;
use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use filter::{filter_entries, HistoryTab};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Epoch-millis of local midnight starting the given calendar day, and of
/// the following midnight (half-open day window).
pub fn day_bounds_millis(date: NaiveDate) -> (i64, i64) {
    let midnight = date.and_time(NaiveTime::MIN);
    let start = Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis());
    (start, start + MILLIS_PER_DAY)
}

/// Day window containing the given timestamp.
pub fn day_bounds_for_millis(ms: i64) -> (i64, i64) {
    let date = match Local.timestamp_millis_opt(ms).earliest() {
        Some(dt) => dt.date_naive(),
        None => Local::now().date_naive(),
    };
    day_bounds_millis(date)
}

/// Whether the timestamp falls on the current calendar day.
pub fn is_date_today(ms: i64) -> bool {
    match Local.timestamp_millis_opt(ms).earliest() {
        Some(dt) => dt.date_naive() == Local::now().date_naive(),
        None => false,
    }
}

// All UI-observable state lives here so spawned tasks can share one Arc.
struct ViewState {
    today_entry: watch::Sender<Option<DiaryEntry>>,
    filtered_history: watch::Sender<Vec<DiaryEntry>>,
    search_query: watch::Sender<String>,
    history_tab: watch::Sender<HistoryTab>,
    vibe_filter: watch::Sender<Option<Mood>>,
    current_sentence: watch::Sender<String>,
    current_time: watch::Sender<i64>,
    current_mood: watch::Sender<Mood>,
    mood_suggestions: watch::Sender<Vec<String>>,
    draft_title: watch::Sender<String>,
    draft_content: watch::Sender<String>,
    selected_entry: watch::Sender<Option<DiaryEntry>>,
}

impl ViewState {
    fn new() -> Self {
        let initial_sentence = ROTATING_SENTENCES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default()
            .to_string();

        ViewState {
            today_entry: watch::channel(None).0,
            filtered_history: watch::channel(Vec::new()).0,
            search_query: watch::channel(String::new()).0,
            history_tab: watch::channel(HistoryTab::default()).0,
            vibe_filter: watch::channel(None).0,
            current_sentence: watch::channel(initial_sentence).0,
            current_time: watch::channel(Utc::now().timestamp_millis()).0,
            current_mood: watch::channel(Mood::Neutral).0,
            mood_suggestions: watch::channel(suggestion_texts(Mood::Neutral)).0,
            draft_title: watch::channel(String::new()).0,
            draft_content: watch::channel(String::new()).0,
            selected_entry: watch::channel(None).0,
        }
    }

    fn set_mood(&self, mood: Mood) {
        self.current_mood.send_replace(mood);
        self.mood_suggestions.send_replace(suggestion_texts(mood));
    }

    // Re-derive mood, suggestions, and (once) the draft fields from the
    // freshly-emitted today entry.
    fn apply_today(&self, entries: &[DiaryEntry]) {
        let entry = entries.first().cloned();
        let mood = entry.as_ref().map(|e| e.mood).unwrap_or(Mood::Neutral);

        self.set_mood(mood);

        // Only seed the draft while it is still empty, to avoid clobbering
        // in-progress typing.
        if self.draft_title.borrow().is_empty() && self.draft_content.borrow().is_empty() {
            if let Some(ref e) = entry {
                self.draft_title.send_replace(e.title.clone());
                self.draft_content.send_replace(e.content.clone());
            }
        }

        self.today_entry.send_replace(entry);
    }
}

fn suggestion_texts(mood: Mood) -> Vec<String> {
    suggestions_for_mood(mood)
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Coordinates live entry state, rotating home content, drafts, filters,
/// preferences, and the PIN gate behind one handle.
///
/// Construction spawns its derivation tasks and background loops, so it must
/// happen within a Tokio runtime. [`Coordinator::shutdown`] (or drop) stops
/// every loop.
pub struct Coordinator {
    repo: EntryRepository,
    prefs: PreferenceStore,
    all_entries: LiveQuery<Vec<DiaryEntry>>,
    favorites: LiveQuery<Vec<DiaryEntry>>,
    // Kept alive for the today-derivation task; the window is anchored once
    // at construction and does not re-anchor across midnight.
    _today_range: LiveQuery<Vec<DiaryEntry>>,
    state: Arc<ViewState>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Builds the coordinator over a repository and preference store.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the initial live queries fails.
    pub fn new(repo: EntryRepository, prefs: PreferenceStore) -> AppResult<Self> {
        let state = Arc::new(ViewState::new());
        let cancel = CancellationToken::new();

        let all_entries = repo.live_all()?;
        let favorites = repo.live_favorites()?;

        let (today_start, today_end) = day_bounds_millis(Local::now().date_naive());
        let today_range = repo.live_date_range(today_start, today_end)?;

        // Initial derivations, then keep them fresh from the live queries.
        state.apply_today(&today_range.snapshot());
        Self::spawn_today_task(&state, &today_range, &cancel);
        Self::spawn_filter_task(&state, &all_entries, &cancel);
        Self::spawn_sentence_loop(&state, &cancel);
        Self::spawn_clock_loop(&state, &cancel);
        Self::spawn_shuffle_loop(&state, &cancel);

        Ok(Coordinator {
            repo,
            prefs,
            all_entries,
            favorites,
            _today_range: today_range,
            state,
            cancel,
        })
    }

    fn spawn_today_task(
        state: &Arc<ViewState>,
        today_range: &LiveQuery<Vec<DiaryEntry>>,
        cancel: &CancellationToken,
    ) {
        let state = state.clone();
        let mut rx = today_range.subscribe();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let entries = rx.borrow_and_update().clone();
                        state.apply_today(&entries);
                    }
                }
            }
        });
    }

    fn spawn_filter_task(
        state: &Arc<ViewState>,
        all_entries: &LiveQuery<Vec<DiaryEntry>>,
        cancel: &CancellationToken,
    ) {
        let state = state.clone();
        let mut entries_rx = all_entries.subscribe();
        let mut query_rx = state.search_query.subscribe();
        let mut tab_rx = state.history_tab.subscribe();
        let mut vibe_rx = state.vibe_filter.subscribe();
        let cancel = cancel.clone();

        let recompute = move |state: &ViewState,
                              entries_rx: &watch::Receiver<Vec<DiaryEntry>>,
                              query_rx: &watch::Receiver<String>,
                              tab_rx: &watch::Receiver<HistoryTab>,
                              vibe_rx: &watch::Receiver<Option<Mood>>| {
            let filtered = filter_entries(
                &entries_rx.borrow(),
                &query_rx.borrow(),
                *tab_rx.borrow(),
                *vibe_rx.borrow(),
            );
            state.filtered_history.send_replace(filtered);
        };

        recompute(&state, &entries_rx, &query_rx, &tab_rx, &vibe_rx);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = entries_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = query_rx.changed() => {}
                    _ = tab_rx.changed() => {}
                    _ = vibe_rx.changed() => {}
                }
                recompute(&state, &entries_rx, &query_rx, &tab_rx, &vibe_rx);
            }
        });
    }

    fn spawn_sentence_loop(state: &Arc<ViewState>, cancel: &CancellationToken) {
        let state = state.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(SENTENCE_ROTATION_SECS)) => {}
                }
                if let Some(sentence) = ROTATING_SENTENCES.choose(&mut rand::thread_rng()) {
                    state.current_sentence.send_replace(sentence.to_string());
                }
            }
        });
    }

    fn spawn_clock_loop(state: &Arc<ViewState>, cancel: &CancellationToken) {
        let state = state.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                state.current_time.send_replace(Utc::now().timestamp_millis());
                // Sleep until the next minute boundary, recomputed from the
                // live second-of-minute so drift self-corrects each cycle.
                let seconds = Local::now().second() as u64;
                let wait = Duration::from_secs(60 - seconds.min(59));
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
        });
    }

    fn spawn_shuffle_loop(state: &Arc<ViewState>, cancel: &CancellationToken) {
        let state = state.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(SUGGESTION_SHUFFLE_SECS)) => {}
                }
                // Reorders the current suggestions without changing the set.
                state
                    .mood_suggestions
                    .send_modify(|list| list.shuffle(&mut rand::thread_rng()));
            }
        });
    }

    /// Stops every background loop and derivation task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    // ---- Live state accessors ----

    /// Snapshot of all entries, date-descending.
    pub fn all_entries(&self) -> Vec<DiaryEntry> {
        self.all_entries.snapshot()
    }

    /// Snapshot of favorite entries.
    pub fn favorite_entries(&self) -> Vec<DiaryEntry> {
        self.favorites.snapshot()
    }

    /// Today's entry, if one exists.
    pub fn today_entry(&self) -> Option<DiaryEntry> {
        self.state.today_entry.borrow().clone()
    }

    /// Observes today's entry.
    pub fn subscribe_today(&self) -> watch::Receiver<Option<DiaryEntry>> {
        self.state.today_entry.subscribe()
    }

    /// Snapshot of the filtered history list.
    pub fn filtered_history(&self) -> Vec<DiaryEntry> {
        self.state.filtered_history.borrow().clone()
    }

    /// Observes the filtered history list.
    pub fn subscribe_filtered_history(&self) -> watch::Receiver<Vec<DiaryEntry>> {
        self.state.filtered_history.subscribe()
    }

    /// The rotating prompt sentence.
    pub fn current_sentence(&self) -> String {
        self.state.current_sentence.borrow().clone()
    }

    /// The minute-resolution clock value (epoch millis).
    pub fn current_time(&self) -> i64 {
        *self.state.current_time.borrow()
    }

    /// The mood currently shown on the home surface.
    pub fn current_mood(&self) -> Mood {
        *self.state.current_mood.borrow()
    }

    /// Writing suggestions for the current mood.
    pub fn mood_suggestions(&self) -> Vec<String> {
        self.state.mood_suggestions.borrow().clone()
    }

    /// The in-progress draft title.
    pub fn draft_title(&self) -> String {
        self.state.draft_title.borrow().clone()
    }

    /// The in-progress draft content.
    pub fn draft_content(&self) -> String {
        self.state.draft_content.borrow().clone()
    }

    /// The entry loaded for detail view, if any.
    pub fn selected_entry(&self) -> Option<DiaryEntry> {
        self.state.selected_entry.borrow().clone()
    }

    /// The saved display name.
    pub fn user_name(&self) -> String {
        self.prefs.current().user_name
    }

    /// The saved accent color.
    pub fn accent_color(&self) -> String {
        self.prefs.current().accent_color
    }

    /// Observes preference writes.
    pub fn subscribe_preferences(&self) -> watch::Receiver<UserPreferences> {
        self.prefs.subscribe()
    }

    // ---- Intents ----

    /// Saves an entry.
    ///
    /// With an id > 0, loads the existing record and fully replaces its
    /// title/content/date/mood through the repository's update path (bumping
    /// `updated_at`); a missing id silently no-ops. Otherwise inserts a new
    /// record. When the affected date is calendar-today, the current-mood
    /// display state follows the saved mood.
    ///
    /// Returns the saved entry's id, or `None` when nothing was persisted.
    pub fn save_entry(
        &self,
        title: &str,
        content: &str,
        date: i64,
        mood: Mood,
        entry_id: Option<i64>,
    ) -> Option<i64> {
        let saved = match entry_id {
            Some(id) if id > 0 => match self.repo.get_by_id(id) {
                Ok(Some(existing)) => {
                    let mut entry = existing;
                    entry.title = title.to_string();
                    entry.content = content.to_string();
                    entry.date = date;
                    entry.mood = mood;
                    match self.repo.update(&entry) {
                        Ok(()) => Some(entry.id),
                        Err(e) => {
                            warn!("Failed to update entry {}: {}", id, e);
                            None
                        }
                    }
                }
                Ok(None) => {
                    debug!("Save skipped: no entry with id {}", id);
                    None
                }
                Err(e) => {
                    warn!("Failed to load entry {} for update: {}", id, e);
                    None
                }
            },
            _ => match self.repo.insert(&DiaryEntry::new(title, content, date, mood)) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Failed to insert entry: {}", e);
                    None
                }
            },
        };

        if is_date_today(date) {
            self.update_current_mood(mood);
        }
        saved
    }

    /// Saves the current draft as today's entry.
    ///
    /// Reuses today's entry id if one exists; only proceeds while both draft
    /// fields are non-blank (enforced here, not by the store).
    pub fn save_draft(&self) -> Option<i64> {
        let title = self.draft_title();
        let content = self.draft_content();
        if title.trim().is_empty() || content.trim().is_empty() {
            debug!("Draft save skipped: blank title or content");
            return None;
        }

        let mood = self.current_mood();
        let date = Utc::now().timestamp_millis();
        let existing_id = self.today_entry().map(|e| e.id);
        self.save_entry(&title, &content, date, mood, existing_id)
    }

    /// Patches today's entry mood (full-record update, so `updated_at`
    /// changes) and always updates the in-memory mood display state.
    pub fn update_today_mood(&self, mood: Mood) {
        if let Some(entry) = self.today_entry() {
            let mut patched = entry;
            patched.mood = mood;
            if let Err(e) = self.repo.update(&patched) {
                warn!("Failed to update today's mood: {}", e);
            }
        }
        self.update_current_mood(mood);
    }

    /// Replaces the in-memory mood and its suggestion list.
    pub fn update_current_mood(&self, mood: Mood) {
        self.state.set_mood(mood);
    }

    /// Flips the favorite flag through the repository's full update path.
    ///
    /// Counts as an edit: `updated_at` is refreshed. The store's narrow
    /// single-field path remains available for surfaces that must not touch
    /// freshness.
    pub fn toggle_favorite(&self, entry: &DiaryEntry) {
        let mut flipped = entry.clone();
        flipped.is_favorite = !flipped.is_favorite;
        if let Err(e) = self.repo.update(&flipped) {
            warn!("Failed to toggle favorite on entry {}: {}", entry.id, e);
        }
    }

    /// Flips the lock flag through the repository's full update path.
    pub fn toggle_lock(&self, entry: &DiaryEntry) {
        let mut flipped = entry.clone();
        flipped.is_locked = !flipped.is_locked;
        if let Err(e) = self.repo.update(&flipped) {
            warn!("Failed to toggle lock on entry {}: {}", entry.id, e);
        }
    }

    /// Deletes an entry.
    pub fn delete_entry(&self, id: i64) {
        if let Err(e) = self.repo.delete(id) {
            warn!("Failed to delete entry {}: {}", id, e);
        }
    }

    /// Loads an entry into the selected-entry slot.
    pub fn load_entry_by_id(&self, id: i64) {
        let entry = match self.repo.get_by_id(id) {
            Ok(found) => found,
            Err(e) => {
                warn!("Failed to load entry {}: {}", id, e);
                None
            }
        };
        self.state.selected_entry.send_replace(entry);
    }

    /// Clears the selected-entry slot.
    pub fn clear_selected_entry(&self) {
        self.state.selected_entry.send_replace(None);
    }

    /// Updates the free-text search query feeding the filter pipeline.
    pub fn update_search_query(&self, query: &str) {
        self.state.search_query.send_replace(query.to_string());
    }

    /// Selects the history tab.
    pub fn set_history_tab(&self, tab: HistoryTab) {
        self.state.history_tab.send_replace(tab);
    }

    /// Sets or clears the mood filter.
    pub fn set_vibe_filter(&self, mood: Option<Mood>) {
        self.state.vibe_filter.send_replace(mood);
    }

    /// Updates the draft title.
    pub fn update_draft_title(&self, title: &str) {
        self.state.draft_title.send_replace(title.to_string());
    }

    /// Updates the draft content.
    pub fn update_draft_content(&self, content: &str) {
        self.state.draft_content.send_replace(content.to_string());
    }

    /// Entries for the calendar day containing `date_millis`.
    pub fn entries_for_date(&self, date_millis: i64) -> AppResult<Vec<DiaryEntry>> {
        let (start, end) = day_bounds_for_millis(date_millis);
        self.repo.get_by_date_range(start, end)
    }

    /// One-shot search, date-descending.
    pub fn search_entries(&self, query: &str) -> AppResult<Vec<DiaryEntry>> {
        self.repo.search(query)
    }

    /// Distinct entry dates, for marking which calendar days have entries.
    pub fn entry_dates(&self) -> AppResult<Vec<i64>> {
        self.repo.get_all_dates()
    }

    // ---- Preferences & PIN gate ----

    /// Saves the display name.
    pub fn save_user_name(&self, name: &str) -> AppResult<()> {
        self.prefs.save_user_name(name)
    }

    /// Saves the accent color.
    pub fn save_accent_color(&self, color: &str) -> AppResult<()> {
        self.prefs.save_accent_color(color)
    }

    /// Whether an app PIN is configured.
    pub fn is_pin_set(&self) -> bool {
        self.prefs.is_pin_set()
    }

    /// Overwrites the app PIN.
    pub fn set_pin(&self, pin: &str) -> AppResult<()> {
        self.prefs.set_pin(pin)
    }

    /// Validates a PIN attempt against the stored PIN.
    pub fn validate_pin(&self, pin: &str) -> bool {
        self.prefs.validate_pin(pin)
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
