//! Storage layer for diary entries.
//!
//! This module provides SQLite database operations for the diary entry table.
//! It uses connection pooling via r2d2 for access from the coordinator's
//! background tasks, and carries a revision channel that live queries watch
//! to re-deliver fresh snapshots after every write.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `entries`: The entry store: CRUD, queries, and their live forms
//! - `live`: The `LiveQuery` subscription abstraction

pub mod entries;
pub mod live;
pub mod schema;

use crate::errors::{AppResult, DatabaseError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use tokio::sync::watch;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling and change notification.
///
/// Cloning is cheap: clones share the same pool and revision channel. The
/// revision channel is bumped after every successful mutation; live queries
/// subscribe to it instead of polling.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    revision: watch::Sender<u64>,
}

impl Database {
    /// Opens or creates the SQLite database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database file cannot be opened or the
    /// connection pool cannot be initialized.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        info!("Database opened successfully");
        Ok(Database {
            pool,
            revision: watch::channel(0).0,
        })
    }

    /// Opens an in-memory database, for tests.
    ///
    /// Uses a single pooled connection so every caller sees the same
    /// in-memory instance.
    pub fn open_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        Ok(Database {
            pool,
            revision: watch::channel(0).0,
        })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }

    /// Marks the database as changed, waking every live query.
    pub(crate) fn mark_changed(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Subscribes to change notifications.
    ///
    /// The receiver yields an opaque revision counter; the value itself is
    /// meaningless beyond "something was written since you last looked".
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
