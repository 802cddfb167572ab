/*!
# Yaadein

Yaadein is a personal mood journal: dated diary entries tagged with one of
nine moods, browsed through live-updating views (timeline, favorites,
filtered history), optionally PIN-locked, and exportable as single-page
PDFs.

## Core Features

- Write, edit, favorite, lock, and delete dated entries
- Live queries: every list view re-delivers fresh snapshots after each write
- A filtered history combining tab, mood, and free-text search
- Rotating home-surface content (prompt sentences, mood suggestions, clock)
- A 4-digit PIN gate for locked entries
- One-shot PDF export with greedy word-wrap

## Architecture

The codebase follows a modular architecture with clear separation of concerns:

- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure
- `db`: SQLite entry store, schema, and live query subscriptions
- `prefs`: The JSON-backed preference store (name, accent color, PIN)
- `repository`: Domain façade that stamps `updated_at` on full updates
- `coordinator`: All derived UI state, intents, and background loops
- `moods`: The nine-mood set and the rotating home content
- `export`: Single-page PDF rendering

## Usage Example

```rust,no_run
use yaadein::{Config, Coordinator, Database, EntryRepository, EntryStore, PreferenceStore};

#[tokio::main]
async fn main() -> yaadein::AppResult<()> {
    let config = Config::load()?;
    config.ensure_directories()?;

    let db = Database::open(&config.db_path())?;
    db.initialize_schema()?;

    let repo = EntryRepository::new(EntryStore::new(db));
    let prefs = PreferenceStore::open(config.prefs_path())?;
    let coordinator = Coordinator::new(repo, prefs)?;

    println!("Hello, {}", coordinator.user_name());
    coordinator.shutdown();
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Centralized constants
pub mod constants;
/// View state coordination: live derived state, intents, background loops
pub mod coordinator;
/// SQLite storage: schema, entry store, live queries
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Single-page PDF export
pub mod export;
/// The nine-mood set and rotating home content
pub mod moods;
/// User preference storage
pub mod prefs;
/// Domain-facing repository over the entry store
pub mod repository;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use coordinator::filter::HistoryTab;
pub use coordinator::Coordinator;
pub use db::entries::{DiaryEntry, EntryStore};
pub use db::live::LiveQuery;
pub use db::Database;
pub use errors::{AppError, AppResult};
pub use moods::Mood;
pub use prefs::{PreferenceStore, UserPreferences};
pub use repository::EntryRepository;
