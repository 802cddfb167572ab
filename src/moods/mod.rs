//! The closed set of moods an entry can carry, plus the rotating home-surface
//! content keyed off them (prompt sentences and per-mood writing suggestions).

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mood options for diary entries.
///
/// Stored in the database as the upper-case variant name; each mood carries
/// a display glyph and label for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mood {
    Happy,
    Sad,
    Neutral,
    Excited,
    Romantic,
    Grateful,
    Angry,
    Anxious,
    Peaceful,
}

/// All nine moods, in display order.
pub const ALL_MOODS: [Mood; 9] = [
    Mood::Happy,
    Mood::Sad,
    Mood::Neutral,
    Mood::Excited,
    Mood::Romantic,
    Mood::Grateful,
    Mood::Angry,
    Mood::Anxious,
    Mood::Peaceful,
];

impl Mood {
    /// The stable storage name, e.g. `"HAPPY"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "HAPPY",
            Mood::Sad => "SAD",
            Mood::Neutral => "NEUTRAL",
            Mood::Excited => "EXCITED",
            Mood::Romantic => "ROMANTIC",
            Mood::Grateful => "GRATEFUL",
            Mood::Angry => "ANGRY",
            Mood::Anxious => "ANXIOUS",
            Mood::Peaceful => "PEACEFUL",
        }
    }

    /// Human-readable label, e.g. `"Happy"`.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Neutral => "Neutral",
            Mood::Excited => "Excited",
            Mood::Romantic => "Romantic",
            Mood::Grateful => "Grateful",
            Mood::Angry => "Angry",
            Mood::Anxious => "Anxious",
            Mood::Peaceful => "Peaceful",
        }
    }

    /// Display glyph for terminals and list output.
    pub fn glyph(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Neutral => "😐",
            Mood::Excited => "🎉",
            Mood::Romantic => "💕",
            Mood::Grateful => "🙏",
            Mood::Angry => "😠",
            Mood::Anxious => "😰",
            Mood::Peaceful => "😌",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    /// Parses a stored mood name. Matching is case-insensitive so CLI input
    /// and stored labels both resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MOODS
            .iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| AppError::UnknownMood(s.to_string()))
    }
}

/// Prompt sentences rotated on the home surface.
pub const ROTATING_SENTENCES: &[&str] = &[
    "What made today different from yesterday?",
    "One small moment worth keeping.",
    "Write it down before it fades.",
    "What would you tell yourself a year from now?",
    "Today had a color. Which one?",
    "Who crossed your mind today?",
    "The day is a page. Fill it.",
    "Something you noticed that nobody else did.",
    "What are you carrying that you could set down?",
    "Start with the weather, end wherever you like.",
    "Three words for today, then the rest.",
    "What did you almost forget to remember?",
];

/// Writing suggestions for a given mood.
///
/// The returned slice is never empty; the caller may shuffle a copy for
/// display variety without changing its content set.
pub fn suggestions_for_mood(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &[
            "What sparked the joy today?",
            "Who would you like to share this with?",
            "Describe the moment you smiled widest.",
            "What do you want to remember about today?",
        ],
        Mood::Sad => &[
            "What's weighing on you right now?",
            "When did the heaviness start?",
            "What would comfort look like today?",
            "Write a letter you never have to send.",
        ],
        Mood::Neutral => &[
            "Walk through your day from the start.",
            "What's one thing you did on autopilot?",
            "Anything quietly good happen today?",
            "What are you looking forward to?",
        ],
        Mood::Excited => &[
            "What's got your heart racing?",
            "Capture the anticipation before it settles.",
            "What's the best possible outcome?",
            "Who did you tell first?",
        ],
        Mood::Romantic => &[
            "What little gesture meant the most?",
            "Describe them in three details.",
            "What do you want to say but haven't?",
            "Where were you when you felt it?",
        ],
        Mood::Grateful => &[
            "Name three things, however small.",
            "Who deserves a thank-you today?",
            "What almost didn't happen, but did?",
            "What comfort do you usually overlook?",
        ],
        Mood::Angry => &[
            "Say the unsaid thing here, safely.",
            "What boundary got crossed?",
            "What would fairness have looked like?",
            "What do you need to let go of tonight?",
        ],
        Mood::Anxious => &[
            "Name the worry. Give it edges.",
            "What's in your control right now?",
            "What's the kindest next step?",
            "When did you last feel steady? Describe it.",
        ],
        Mood::Peaceful => &[
            "What does calm feel like in your body?",
            "Describe the quiet around you.",
            "What did you make peace with?",
            "What would you like more of tomorrow?",
        ],
    }
}
