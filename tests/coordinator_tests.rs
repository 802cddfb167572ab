//! Library-level scenarios driving the coordinator end to end over a
//! tempdir-backed database and preference store.

use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use yaadein::coordinator::Coordinator;
use yaadein::db::entries::EntryStore;
use yaadein::db::Database;
use yaadein::prefs::PreferenceStore;
use yaadein::repository::EntryRepository;
use yaadein::{HistoryTab, Mood};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn setup() -> (Coordinator, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&dir.path().join("test.db")).unwrap();
    db.initialize_schema().unwrap();

    let repo = EntryRepository::new(EntryStore::new(db));
    let prefs = PreferenceStore::open(dir.path().join("preferences.json")).unwrap();
    let coordinator = Coordinator::new(repo, prefs).unwrap();
    (coordinator, dir)
}

/// Waits until the watched value satisfies the predicate, or two seconds pass.
async fn wait_until<T, F>(rx: &mut watch::Receiver<T>, pred: F) -> bool
where
    F: Fn(&T) -> bool,
{
    if pred(&rx.borrow()) {
        return true;
    }
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if rx.changed().await.is_err() {
                return false;
            }
            if pred(&rx.borrow()) {
                return true;
            }
        }
    })
    .await
    .unwrap_or(false)
}

#[tokio::test]
async fn saving_todays_entry_updates_the_live_today_value() {
    let (coordinator, _dir) = setup();
    let mut today_rx = coordinator.subscribe_today();

    let id = coordinator
        .save_entry("A", "B", now_millis(), Mood::Happy, None)
        .unwrap();

    let arrived = wait_until(&mut today_rx, |entry| {
        entry.as_ref().map(|e| e.id) == Some(id)
    })
    .await;
    assert!(arrived, "today entry never arrived");

    let entry = coordinator.today_entry().unwrap();
    assert_eq!(entry.title, "A");
    assert_eq!(entry.content, "B");
    assert_eq!(entry.mood, Mood::Happy);

    // Saving for today also syncs the displayed mood
    assert_eq!(coordinator.current_mood(), Mood::Happy);

    coordinator.shutdown();
}

#[tokio::test]
async fn filtered_history_recomputes_when_any_input_changes() {
    let (coordinator, _dir) = setup();
    let mut filtered_rx = coordinator.subscribe_filtered_history();

    coordinator.save_entry("Morning walk", "sunny", 1_000, Mood::Happy, None);
    coordinator.save_entry("Dinner", "walked home", 2_000, Mood::Sad, None);
    coordinator.save_entry("Quiet", "tea", 3_000, Mood::Peaceful, None);

    let all_arrived = wait_until(&mut filtered_rx, |list| list.len() == 3).await;
    assert!(all_arrived, "entries never reached the pipeline");

    // Text filter
    coordinator.update_search_query("walk");
    let narrowed = wait_until(&mut filtered_rx, |list| {
        list.len() == 2
            && list.iter().all(|e| {
                e.title.to_lowercase().contains("walk") || e.content.to_lowercase().contains("walk")
            })
    })
    .await;
    assert!(narrowed, "search filter never applied");

    // Mood filter composes by intersection
    coordinator.set_vibe_filter(Some(Mood::Sad));
    let composed = wait_until(&mut filtered_rx, |list| {
        list.len() == 1 && list[0].mood == Mood::Sad
    })
    .await;
    assert!(composed, "vibe filter never applied");

    coordinator.shutdown();
}

#[tokio::test]
async fn favorites_tab_shows_only_favorites() {
    let (coordinator, _dir) = setup();
    let mut filtered_rx = coordinator.subscribe_filtered_history();

    let id = coordinator
        .save_entry("Keeper", "body", 1_000, Mood::Happy, None)
        .unwrap();
    coordinator.save_entry("Other", "body", 2_000, Mood::Sad, None);

    wait_until(&mut filtered_rx, |list| list.len() == 2).await;

    coordinator.load_entry_by_id(id);
    let entry = coordinator.selected_entry().unwrap();
    coordinator.toggle_favorite(&entry);
    coordinator.set_history_tab(HistoryTab::Favorites);

    let narrowed = wait_until(&mut filtered_rx, |list| {
        list.len() == 1 && list[0].is_favorite && list[0].id == id
    })
    .await;
    assert!(narrowed, "favorites tab never applied");

    coordinator.shutdown();
}

#[tokio::test]
async fn toggle_favorite_through_coordinator_counts_as_an_edit() {
    let (coordinator, _dir) = setup();

    let id = coordinator
        .save_entry("Keeper", "body", 1_000, Mood::Happy, None)
        .unwrap();
    coordinator.load_entry_by_id(id);
    let before = coordinator.selected_entry().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    coordinator.toggle_favorite(&before);

    coordinator.load_entry_by_id(id);
    let after = coordinator.selected_entry().unwrap();
    assert!(after.is_favorite);
    assert!(after.updated_at > before.updated_at);

    coordinator.shutdown();
}

#[tokio::test]
async fn draft_save_requires_both_fields() {
    let (coordinator, _dir) = setup();

    coordinator.update_draft_title("Only a title");
    assert_eq!(coordinator.save_draft(), None);

    coordinator.update_draft_content("Now a body too");
    let id = coordinator.save_draft();
    assert!(id.is_some());

    // A second draft save reuses today's entry instead of inserting again
    let mut today_rx = coordinator.subscribe_today();
    wait_until(&mut today_rx, |e| e.is_some()).await;
    coordinator.update_draft_content("Edited body");
    assert_eq!(coordinator.save_draft(), id);

    coordinator.shutdown();
}

#[tokio::test]
async fn draft_is_seeded_from_todays_entry_once() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&dir.path().join("test.db")).unwrap();
    db.initialize_schema().unwrap();
    let repo = EntryRepository::new(EntryStore::new(db));

    let first = Coordinator::new(
        repo.clone(),
        PreferenceStore::open(dir.path().join("preferences.json")).unwrap(),
    )
    .unwrap();
    first
        .save_entry("Seeded", "from today", now_millis(), Mood::Grateful, None)
        .unwrap();
    first.shutdown();
    drop(first);

    // A fresh coordinator picks the entry up at construction
    let second = Coordinator::new(
        repo,
        PreferenceStore::open(dir.path().join("preferences.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(second.draft_title(), "Seeded");
    assert_eq!(second.draft_content(), "from today");
    assert_eq!(second.current_mood(), Mood::Grateful);

    // Further typing is never clobbered by upstream changes
    second.update_draft_title("My own words");
    second.save_entry("Seeded", "rewritten", now_millis(), Mood::Happy, None);
    assert_eq!(second.draft_title(), "My own words");

    second.shutdown();
}

#[tokio::test]
async fn update_today_mood_without_an_entry_only_touches_display_state() {
    let (coordinator, _dir) = setup();

    coordinator.update_today_mood(Mood::Anxious);
    assert_eq!(coordinator.current_mood(), Mood::Anxious);
    assert!(coordinator.today_entry().is_none());
    assert!(coordinator.all_entries().is_empty());

    // Suggestions follow the mood
    let suggestions = coordinator.mood_suggestions();
    assert!(!suggestions.is_empty());

    coordinator.shutdown();
}

#[tokio::test]
async fn update_today_mood_patches_the_persisted_entry() {
    let (coordinator, _dir) = setup();
    let mut today_rx = coordinator.subscribe_today();

    coordinator.save_entry("Day", "body", now_millis(), Mood::Neutral, None);
    wait_until(&mut today_rx, |e| e.is_some()).await;

    coordinator.update_today_mood(Mood::Excited);
    let patched = wait_until(&mut today_rx, |e| {
        e.as_ref().map(|e| e.mood) == Some(Mood::Excited)
    })
    .await;
    assert!(patched, "mood patch never landed");

    coordinator.shutdown();
}

#[tokio::test]
async fn pin_gate_validates_without_altering_the_stored_pin() {
    let (coordinator, _dir) = setup();

    assert!(!coordinator.is_pin_set());
    coordinator.set_pin("1234").unwrap();
    assert!(coordinator.is_pin_set());

    assert!(coordinator.validate_pin("1234"));
    assert!(!coordinator.validate_pin("0000"));
    assert!(coordinator.validate_pin("1234"));

    coordinator.shutdown();
}

#[tokio::test]
async fn deleting_todays_entry_clears_the_live_today_value() {
    let (coordinator, _dir) = setup();
    let mut today_rx = coordinator.subscribe_today();

    let id = coordinator
        .save_entry("Gone soon", "body", now_millis(), Mood::Neutral, None)
        .unwrap();
    wait_until(&mut today_rx, |e| e.is_some()).await;

    coordinator.delete_entry(id);
    let cleared = wait_until(&mut today_rx, |e| e.is_none()).await;
    assert!(cleared, "today entry never cleared");

    coordinator.shutdown();
}
