//! The history view's filter pipeline.
//!
//! A four-way combine of the full entry list, the tab selector, the optional
//! mood ("vibe") filter, and the free-text search query. The pipeline re-runs
//! from scratch whenever any input changes; filters compose by intersection.

use crate::db::entries::DiaryEntry;
use crate::moods::Mood;

/// Tab selector for the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryTab {
    #[default]
    All,
    Favorites,
}

/// Applies tab, mood, and text filters in order over the full list.
///
/// The text filter matches case-insensitively against title or content and
/// is skipped while the query is blank. Input order is preserved, so output
/// stays date-descending like the source list.
pub fn filter_entries(
    entries: &[DiaryEntry],
    query: &str,
    tab: HistoryTab,
    vibe: Option<Mood>,
) -> Vec<DiaryEntry> {
    let query = query.trim().to_lowercase();

    entries
        .iter()
        .filter(|e| tab != HistoryTab::Favorites || e.is_favorite)
        .filter(|e| vibe.map_or(true, |mood| e.mood == mood))
        .filter(|e| {
            query.is_empty()
                || e.title.to_lowercase().contains(&query)
                || e.content.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}
