/*!
# Yaadein - A Personal Mood Journal

Command-line front-end for the yaadein journaling core. This file contains
the main application flow, wiring configuration, storage, the repository,
and the view state coordinator together before dispatching the parsed
subcommand.

## Configuration

The application can be configured with the following environment variables:
- `YAADEIN_DIR`: The directory all data lives under (defaults to "~/.yaadein")
- `RUST_LOG`: Log filter for the tracing subscriber (defaults to "warn")
*/

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use yaadein::cli::{self, CliArgs};
use yaadein::config::Config;
use yaadein::coordinator::Coordinator;
use yaadein::db::entries::EntryStore;
use yaadein::db::Database;
use yaadein::errors::AppResult;
use yaadein::prefs::PreferenceStore;
use yaadein::repository::EntryRepository;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Logs go to stderr so command output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting yaadein");

    let args = CliArgs::parse();

    let config = Config::load()?;
    config.validate()?;
    config.ensure_directories()?;
    debug!("Data directory: {:?}", config.data_dir);

    let db = Database::open(&config.db_path())?;
    db.initialize_schema()?;

    let store = EntryStore::new(db);
    let repo = EntryRepository::new(store);
    let prefs = PreferenceStore::open(config.prefs_path())?;

    let coordinator = Coordinator::new(repo, prefs)?;

    let result = cli::run(args, &coordinator, &config);

    coordinator.shutdown();
    result
}
