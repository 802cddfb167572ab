//! Constants used throughout the application.
//!
//! This module contains all constants used in the yaadein application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "yaadein";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A personal mood journal with live views and PDF export";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the yaadein data directory.
pub const ENV_VAR_YAADEIN_DIR: &str = "YAADEIN_DIR";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory name for application data within the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".yaadein";
/// Database file name within the data directory.
pub const DATABASE_FILE_NAME: &str = "yaadein.db";
/// Preferences file name within the data directory.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";
/// Sub-directory for exported PDF files within the data directory.
pub const EXPORTS_SUBDIR: &str = "exports";

// Preference Defaults
/// Default display name used when no name has been saved.
pub const DEFAULT_USER_NAME: &str = "Friend";
/// Default accent color hex string (deep maroon from the brand identity).
pub const DEFAULT_ACCENT_COLOR: &str = "#5D1424";

// Date/Time Logic
/// Milliseconds in one calendar day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
/// Date format accepted by the CLI (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format used in the exported PDF header.
pub const PDF_DATE_FORMAT: &str = "%A, %d %B %Y";

// Coordinator Cadences
/// Seconds between rotating-sentence re-rolls.
pub const SENTENCE_ROTATION_SECS: u64 = 180;
/// Seconds between suggestion-list reshuffles.
pub const SUGGESTION_SHUFFLE_SECS: u64 = 120;

// PDF Page Geometry (points; A4 is 595x842 pt)
/// Page width in points.
pub const PDF_PAGE_WIDTH_PT: f32 = 595.0;
/// Page height in points.
pub const PDF_PAGE_HEIGHT_PT: f32 = 842.0;
/// Page margin in points.
pub const PDF_MARGIN_PT: f32 = 40.0;
/// Title font size in points.
pub const PDF_TITLE_SIZE_PT: f32 = 24.0;
/// Metadata line font size in points.
pub const PDF_META_SIZE_PT: f32 = 14.0;
/// Body font size in points.
pub const PDF_BODY_SIZE_PT: f32 = 16.0;
/// Vertical advance per body line in points.
pub const PDF_LINE_HEIGHT_PT: f32 = 24.0;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "yaadein";
