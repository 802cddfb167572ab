//! Command-line interface.
//!
//! The terminal stand-in for the app's screens: every subcommand maps onto a
//! coordinator intent or live snapshot. Recoverable conditions (blank
//! fields, wrong PIN, missing ids) print a lightweight inline message and
//! exit cleanly; only configuration and storage failures are fatal.

use crate::config::Config;
use crate::constants::{APP_DESCRIPTION, APP_NAME, DATE_FORMAT_ISO};
use crate::coordinator::filter::HistoryTab;
use crate::coordinator::{day_bounds_millis, filter, Coordinator};
use crate::db::entries::DiaryEntry;
use crate::errors::{AppError, AppResult};
use crate::export;
use crate::moods::Mood;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A personal mood journal with live views and PDF export.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a new entry
    Add {
        /// Entry title
        #[arg(long)]
        title: String,
        /// Entry body
        #[arg(long)]
        content: String,
        /// Entry date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Mood tag
        #[arg(long, value_enum)]
        mood: Option<Mood>,
    },
    /// Show the home surface: greeting, prompt, and today's entry
    Today,
    /// List entries, optionally filtered
    List {
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Only entries with this mood
        #[arg(long, value_enum)]
        mood: Option<Mood>,
        /// Only entries whose title or content contains this text
        #[arg(long)]
        query: Option<String>,
        /// Only entries on this calendar day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Search entries by substring
    Search {
        /// Text to look for in title or content
        query: String,
    },
    /// List the calendar days that have at least one entry
    Dates,
    /// Show one entry in full
    Show {
        /// Entry id
        id: i64,
        /// PIN, required for locked entries when a PIN is configured
        #[arg(long)]
        pin: Option<String>,
    },
    /// Edit an existing entry
    Edit {
        /// Entry id
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New body
        #[arg(long)]
        content: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// New mood
        #[arg(long, value_enum)]
        mood: Option<Mood>,
    },
    /// Delete an entry
    Delete {
        /// Entry id
        id: i64,
    },
    /// Toggle an entry's favorite flag
    Favorite {
        /// Entry id
        id: i64,
    },
    /// Toggle an entry's lock flag
    Lock {
        /// Entry id
        id: i64,
    },
    /// Set today's mood
    Mood {
        /// Mood tag
        #[arg(value_enum)]
        mood: Mood,
    },
    /// Export an entry as a single-page PDF
    Export {
        /// Entry id
        id: i64,
        /// Output directory (defaults to the data directory's exports/)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show or update the profile
    Profile {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Accent color hex string
        #[arg(long)]
        accent: Option<String>,
    },
    /// Manage the app lock PIN
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PinAction {
    /// Set or replace the 4-digit PIN
    Set {
        /// The new PIN
        pin: String,
    },
    /// Check a PIN against the stored one
    Check {
        /// The PIN to verify
        pin: String,
    },
}

fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT_ISO)
        .map_err(|e| AppError::Config(format!("Invalid date '{}': {}", s, e)))
}

fn format_millis_date(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).earliest() {
        Some(dt) => dt.format(DATE_FORMAT_ISO).to_string(),
        None => "?".to_string(),
    }
}

fn print_entry_line(entry: &DiaryEntry) {
    let favorite = if entry.is_favorite { "*" } else { " " };
    let locked = if entry.is_locked { "locked" } else { "" };
    println!(
        "#{:<4} {}  {} {:<9} {}{} {}",
        entry.id,
        format_millis_date(entry.date),
        entry.mood.glyph(),
        entry.mood.label(),
        favorite,
        locked,
        entry.title
    );
}

fn print_entry_full(entry: &DiaryEntry) {
    println!("#{} {}", entry.id, entry.title);
    println!(
        "{}  |  Mood: {} {}",
        format_millis_date(entry.date),
        entry.mood.glyph(),
        entry.mood.label()
    );
    if entry.is_favorite {
        println!("Favorite");
    }
    println!();
    println!("{}", entry.content);
}

fn print_entries(entries: &[DiaryEntry], json: bool) -> AppResult<()> {
    if json {
        let encoded = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        println!("{}", encoded);
    } else if entries.is_empty() {
        println!("No entries.");
    } else {
        for entry in entries {
            print_entry_line(entry);
        }
    }
    Ok(())
}

/// Dispatches a parsed command against the coordinator.
///
/// # Errors
///
/// Returns an error only for fatal conditions (configuration, storage);
/// recoverable ones print a message and return `Ok`.
pub fn run(args: CliArgs, coordinator: &Coordinator, config: &Config) -> AppResult<()> {
    match args.command {
        Command::Add {
            title,
            content,
            date,
            mood,
        } => {
            // Blank title/content blocks the save; enforced here, not by the store.
            if title.trim().is_empty() || content.trim().is_empty() {
                println!("Title and content must not be blank.");
                return Ok(());
            }
            let date_millis = match date {
                Some(s) => day_bounds_millis(parse_date(&s)?).0,
                None => Utc::now().timestamp_millis(),
            };
            let mood = mood.unwrap_or(Mood::Neutral);
            match coordinator.save_entry(&title, &content, date_millis, mood, None) {
                Some(id) => println!("Saved entry #{}.", id),
                None => println!("Nothing saved."),
            }
        }

        Command::Today => {
            println!("Hello, {}.", coordinator.user_name());
            println!("{}", coordinator.current_sentence());
            println!();
            match coordinator.today_entry() {
                Some(entry) => print_entry_full(&entry),
                None => {
                    let mood = coordinator.current_mood();
                    println!("No entry yet today. Feeling {}?", mood.label());
                    for suggestion in coordinator.mood_suggestions() {
                        println!("  - {}", suggestion);
                    }
                }
            }
        }

        Command::List {
            favorites,
            mood,
            query,
            date,
            json,
        } => {
            let entries = match date {
                Some(s) => coordinator.entries_for_date(day_bounds_millis(parse_date(&s)?).0)?,
                None => {
                    let tab = if favorites {
                        HistoryTab::Favorites
                    } else {
                        HistoryTab::All
                    };
                    filter::filter_entries(
                        &coordinator.all_entries(),
                        query.as_deref().unwrap_or(""),
                        tab,
                        mood,
                    )
                }
            };
            print_entries(&entries, json)?;
        }

        Command::Search { query } => {
            let entries = coordinator.search_entries(&query)?;
            print_entries(&entries, false)?;
        }

        Command::Dates => {
            let days: std::collections::BTreeSet<String> = coordinator
                .entry_dates()?
                .into_iter()
                .map(format_millis_date)
                .collect();
            if days.is_empty() {
                println!("No entries.");
            } else {
                for day in days {
                    println!("{}", day);
                }
            }
        }

        Command::Show { id, pin } => {
            coordinator.load_entry_by_id(id);
            match coordinator.selected_entry() {
                None => println!("No entry #{}.", id),
                Some(entry) => {
                    if entry.is_locked && coordinator.is_pin_set() {
                        match pin {
                            Some(p) if coordinator.validate_pin(&p) => print_entry_full(&entry),
                            Some(_) => println!("Incorrect PIN."),
                            None => println!("This entry is locked. Pass --pin to view it."),
                        }
                    } else {
                        print_entry_full(&entry);
                    }
                }
            }
            coordinator.clear_selected_entry();
        }

        Command::Edit {
            id,
            title,
            content,
            date,
            mood,
        } => {
            coordinator.load_entry_by_id(id);
            match coordinator.selected_entry() {
                None => println!("No entry #{}.", id),
                Some(existing) => {
                    let title = title.unwrap_or(existing.title);
                    let content = content.unwrap_or(existing.content);
                    if title.trim().is_empty() || content.trim().is_empty() {
                        println!("Title and content must not be blank.");
                        coordinator.clear_selected_entry();
                        return Ok(());
                    }
                    let date_millis = match date {
                        Some(s) => day_bounds_millis(parse_date(&s)?).0,
                        None => existing.date,
                    };
                    let mood = mood.unwrap_or(existing.mood);
                    match coordinator.save_entry(&title, &content, date_millis, mood, Some(id)) {
                        Some(id) => println!("Updated entry #{}.", id),
                        None => println!("Nothing saved."),
                    }
                }
            }
            coordinator.clear_selected_entry();
        }

        Command::Delete { id } => {
            coordinator.delete_entry(id);
            println!("Deleted entry #{} (if it existed).", id);
        }

        Command::Favorite { id } => {
            coordinator.load_entry_by_id(id);
            match coordinator.selected_entry() {
                None => println!("No entry #{}.", id),
                Some(entry) => {
                    coordinator.toggle_favorite(&entry);
                    let now = if entry.is_favorite { "no longer" } else { "now" };
                    println!("Entry #{} is {} a favorite.", id, now);
                }
            }
            coordinator.clear_selected_entry();
        }

        Command::Lock { id } => {
            coordinator.load_entry_by_id(id);
            match coordinator.selected_entry() {
                None => println!("No entry #{}.", id),
                Some(entry) => {
                    coordinator.toggle_lock(&entry);
                    let now = if entry.is_locked { "unlocked" } else { "locked" };
                    println!("Entry #{} is now {}.", id, now);
                }
            }
            coordinator.clear_selected_entry();
        }

        Command::Mood { mood } => {
            coordinator.update_today_mood(mood);
            println!("Today's mood set to {} {}.", mood.glyph(), mood.label());
        }

        Command::Export { id, out } => {
            coordinator.load_entry_by_id(id);
            match coordinator.selected_entry() {
                None => println!("No entry #{}.", id),
                Some(entry) => {
                    let out_dir = out.unwrap_or_else(|| config.exports_dir());
                    // Export failures are a transient notice, not a crash.
                    match export::export_entry_pdf(&entry, &out_dir) {
                        Ok(path) => println!("Exported to {}", path.display()),
                        Err(e) => println!("Could not export: {}", e),
                    }
                }
            }
            coordinator.clear_selected_entry();
        }

        Command::Profile { name, accent } => {
            if name.is_none() && accent.is_none() {
                println!("Name:   {}", coordinator.user_name());
                println!("Accent: {}", coordinator.accent_color());
            } else {
                if let Some(name) = name {
                    coordinator.save_user_name(&name)?;
                }
                if let Some(accent) = accent {
                    coordinator.save_accent_color(&accent)?;
                }
                println!("Profile updated.");
            }
        }

        Command::Pin { action } => match action {
            PinAction::Set { pin } => {
                if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
                    println!("The PIN must be exactly 4 digits.");
                    return Ok(());
                }
                coordinator.set_pin(&pin)?;
                println!("PIN set.");
            }
            PinAction::Check { pin } => {
                if coordinator.validate_pin(&pin) {
                    println!("PIN correct.");
                } else {
                    println!("Incorrect PIN.");
                }
            }
        },
    }

    Ok(())
}
