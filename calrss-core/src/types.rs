use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Widest window a feed may cover, in days.
pub const MAX_WINDOW_DAYS: i64 = 365;
/// Hard ceiling on feed items per run.
pub const MAX_FEED_EVENTS: usize = 100;
/// Window length used when the request does not name one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
/// Item cap used when the request does not name one.
pub const DEFAULT_MAX_EVENTS: usize = 10;
/// Login of the public calendar.
pub const PUBLIC_LOGIN: &str = "__public__";

/// Access classification of an event.
///
/// Wire letters match the WebCalendar database convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(rename = "P")]
    Public,
    #[serde(rename = "C")]
    Confidential,
    #[serde(rename = "R")]
    Private,
}

/// Recurrence frequency tag attached to an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatKind {
    pub fn is_repeating(self) -> bool {
        self != Self::None
    }
}

/// Approval status of an event record. Only approved events feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EventStatus {
    #[default]
    #[serde(rename = "A")]
    Approved,
    #[serde(rename = "W")]
    Waiting,
    #[serde(rename = "D")]
    Deleted,
}

/// One concrete dated/timed instance of an event.
///
/// Covers both non-repeating events and per-day materializations of
/// recurring events. Repeat occurrences of the same event share `id`
/// across days; `source_day` is the day the record was retrieved for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOccurrence {
    /// Stable identifier of the underlying event definition
    pub id: i64,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Access classification
    pub visibility: Visibility,
    /// Approval status
    pub status: EventStatus,
    /// Absolute instant this occurrence falls at
    pub starts_at: DateTime<Utc>,
    /// Whether the occurrence carries a time-of-day (false = all-day)
    pub is_timed: bool,
    /// Recurrence frequency of the underlying event
    pub repeat: RepeatKind,
    /// Calendar day this record was retrieved for
    pub source_day: NaiveDate,
    /// Category of the underlying event, if any
    pub category_id: Option<i64>,
}

/// Repeat handling requested for a feed run.
///
/// Replaces the repeats=0/1/2 double-duty flag with an explicit
/// three-way policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatPolicy {
    /// Repeat occurrences are never emitted
    #[default]
    Off,
    /// Repeat occurrences are emitted, deduplicated per day
    On,
    /// As `On`, but a daily event shows only its first occurrence
    DailyOnce,
}

impl RepeatPolicy {
    /// Maps the legacy numeric parameter: 0 = off, 2 = daily-once,
    /// any other value = on.
    pub fn from_param(value: i64) -> Self {
        match value {
            0 => Self::Off,
            2 => Self::DailyOnce,
            _ => Self::On,
        }
    }

    pub fn repeats_enabled(self) -> bool {
        self != Self::Off
    }
}

/// Immutable configuration for one feed-generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedOptions {
    /// First day of the window; `None` means today
    pub start_date: Option<NaiveDate>,
    /// Number of days to cover (clamped to [`MAX_WINDOW_DAYS`])
    pub days: i64,
    /// Output item cap (callers clamp to [`MAX_FEED_EVENTS`])
    pub max_events: usize,
    /// Repeat handling
    pub repeats: RepeatPolicy,
    /// Whether item titles carry a date/time prefix
    pub date_in_title: bool,
    /// Category name attached to every item, if a filter is active
    pub category: Option<String>,
    /// Login of the calendar owner, used in item links
    pub login: String,
    /// Base URL for item links
    pub base_url: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            days: DEFAULT_WINDOW_DAYS,
            max_events: DEFAULT_MAX_EVENTS,
            repeats: RepeatPolicy::Off,
            date_in_title: false,
            category: None,
            login: PUBLIC_LOGIN.to_string(),
            base_url: "http://localhost/".to_string(),
        }
    }
}

/// Run-level channel metadata handed to the serializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Feed title
    pub title: String,
    /// Site link
    pub link: String,
    /// Channel description
    pub description: String,
    /// RSS language code
    pub language: String,
}

impl Default for ChannelInfo {
    fn default() -> Self {
        Self {
            title: "Calendar".to_string(),
            link: "http://localhost/".to_string(),
            description: "Upcoming calendar events".to_string(),
            language: "en-us".to_string(),
        }
    }
}
