//! Error handling utilities for the yaadein application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur during database operations.
///
/// Mutating calls either fully succeed or fail with one of these variants;
/// callers do not attempt to recover beyond logging.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Underlying SQLite error.
    #[error("Database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Database connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A record that was expected to exist was not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Represents error cases that can occur while reading or writing the
/// preferences file.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// The preferences file exists but could not be read.
    #[error("Failed to read preferences file {path}: {source}")]
    Read {
        /// Path of the preferences file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The preferences file contains invalid JSON.
    #[error("Preferences file {path} is not valid JSON: {source}")]
    Parse {
        /// Path of the preferences file
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Encoding preferences to JSON failed.
    #[error("Failed to encode preferences: {0}")]
    Encode(#[source] serde_json::Error),

    /// Writing the preferences file failed.
    #[error("Failed to write preferences file {path}: {source}")]
    Write {
        /// Path of the preferences file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents error cases that can occur while exporting an entry to PDF.
///
/// This is the only storage-failure path surfaced to the user as a
/// recoverable notice rather than a fatal error.
#[derive(Debug, Error)]
pub enum ExportError {
    /// PDF document construction or serialization failed.
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] printpdf::Error),

    /// Writing the output file failed.
    #[error("Failed to write PDF file {path}: {source}")]
    Io {
        /// Path of the output file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the yaadein application.
///
/// This enum is the central error type used across the application, with
/// variants for different error categories. It uses `thiserror` for deriving
/// the `Error` trait implementation and formatted error messages.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading or validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error outside the storage and export paths.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Database error.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Preferences store error.
    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    /// PDF export error.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A mood label that is not one of the nine known moods.
    #[error("Unknown mood: {0}")]
    UnknownMood(String),
}

/// Convenience alias for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
