use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    types::{EventOccurrence, EventStatus, RepeatKind, Visibility},
};

/// Per-day event lookup consumed by the merge engine.
///
/// Both lookups return an empty vec when nothing falls on `day`; an
/// error means the backing store itself failed and aborts the run.
#[async_trait]
pub trait DailyEventSource: Send + Sync {
    /// Single-date event rows whose date equals `day`.
    ///
    /// Includes the defining row of a recurring event on its first
    /// date, so the same id can show up in both lookups for that day.
    /// The engine resolves that duplication.
    async fn events_on(&self, day: NaiveDate) -> Result<Vec<EventOccurrence>>;

    /// Pre-expanded occurrences of recurring events falling on `day`.
    async fn repeat_occurrences_on(&self, day: NaiveDate) -> Result<Vec<EventOccurrence>>;
}

#[async_trait]
impl<S: DailyEventSource + ?Sized> DailyEventSource for &S {
    async fn events_on(&self, day: NaiveDate) -> Result<Vec<EventOccurrence>> {
        (**self).events_on(day).await
    }

    async fn repeat_occurrences_on(&self, day: NaiveDate) -> Result<Vec<EventOccurrence>> {
        (**self).repeat_occurrences_on(day).await
    }
}

/// Feed-related preferences of a calendar owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPrefs {
    /// Whether this calendar may be fed at all
    #[serde(default = "default_rss_enabled")]
    pub rss_enabled: bool,
    /// Remote access level: 0 public, 1 +confidential, 2 +private
    #[serde(default)]
    pub remote_access: u8,
}

fn default_rss_enabled() -> bool {
    true
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            rss_enabled: true,
            remote_access: 0,
        }
    }
}

/// Category table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// One stored event definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Access classification, wire letter P/C/R
    #[serde(default = "default_access")]
    pub access: Visibility,
    #[serde(default)]
    pub status: EventStatus,
    /// Date of the event, or of the first occurrence for repeats
    pub date: NaiveDate,
    /// Time-of-day; `None` marks an all-day event
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub repeat: RepeatKind,
    /// Last day a repeat may fall on, if bounded
    #[serde(default)]
    pub repeat_until: Option<NaiveDate>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

fn default_access() -> Visibility {
    Visibility::Public
}

impl EventRecord {
    /// The absolute instant of the record's own (first) occurrence.
    fn starts_at(&self) -> chrono::DateTime<Utc> {
        let time = self.time.unwrap_or(NaiveTime::MIN);
        Utc.from_utc_datetime(&self.date.and_time(time))
    }

    /// Whether a repeat occurrence of this record falls on `day`.
    fn falls_on(&self, day: NaiveDate) -> bool {
        if day < self.date {
            return false;
        }
        if let Some(until) = self.repeat_until {
            if day > until {
                return false;
            }
        }
        match self.repeat {
            RepeatKind::None => false,
            RepeatKind::Daily => true,
            RepeatKind::Weekly => day.weekday() == self.date.weekday(),
            RepeatKind::Monthly => day.day() == self.date.day(),
            RepeatKind::Yearly => day.day() == self.date.day() && day.month() == self.date.month(),
        }
    }

    fn to_occurrence(&self, day: NaiveDate) -> EventOccurrence {
        EventOccurrence {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            visibility: self.access,
            status: self.status,
            starts_at: self.starts_at(),
            is_timed: self.time.is_some(),
            repeat: self.repeat,
            source_day: day,
            category_id: self.category_id,
        }
    }
}

/// One calendar owner's stored data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub login: String,
    #[serde(default)]
    pub prefs: UserPrefs,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl Calendar {
    /// Loads a calendar from its JSON representation.
    pub fn from_json(json_data: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_data)?)
    }

    /// Loads a calendar from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading calendar from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Resolves a category id to its display name.
    pub fn category_name(&self, id: i64) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}

/// [`DailyEventSource`] over an in-memory [`Calendar`].
///
/// Materializes repeat occurrences day by day and never returns
/// unapproved events. An optional category filter restricts both
/// lookups.
#[derive(Debug, Clone)]
pub struct JsonEventSource {
    calendar: Arc<Calendar>,
    category_filter: Option<i64>,
}

impl JsonEventSource {
    pub fn new(calendar: Arc<Calendar>) -> Self {
        Self {
            calendar,
            category_filter: None,
        }
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_filter = category_id;
        self
    }

    fn feedable(&self, record: &EventRecord) -> bool {
        if record.status != EventStatus::Approved {
            return false;
        }
        match self.category_filter {
            Some(wanted) => record.category_id == Some(wanted),
            None => true,
        }
    }
}

#[async_trait]
impl DailyEventSource for JsonEventSource {
    async fn events_on(&self, day: NaiveDate) -> Result<Vec<EventOccurrence>> {
        Ok(self
            .calendar
            .events
            .iter()
            .filter(|r| self.feedable(r) && r.date == day)
            .map(|r| r.to_occurrence(day))
            .collect())
    }

    async fn repeat_occurrences_on(&self, day: NaiveDate) -> Result<Vec<EventOccurrence>> {
        Ok(self
            .calendar
            .events
            .iter()
            .filter(|r| self.feedable(r) && r.repeat.is_repeating() && r.falls_on(day))
            .map(|r| r.to_occurrence(day))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, day: NaiveDate, repeat: RepeatKind) -> EventRecord {
        EventRecord {
            id,
            name: format!("event {id}"),
            description: String::new(),
            access: Visibility::Public,
            status: EventStatus::Approved,
            date: day,
            time: None,
            repeat,
            repeat_until: None,
            category_id: None,
        }
    }

    fn source(events: Vec<EventRecord>) -> JsonEventSource {
        JsonEventSource::new(Arc::new(Calendar {
            login: "alice".to_string(),
            prefs: UserPrefs::default(),
            categories: vec![Category {
                id: 4,
                name: "Meetings".to_string(),
            }],
            events,
        }))
    }

    #[tokio::test]
    async fn single_date_lookup_matches_exact_day() {
        let src = source(vec![record(1, date(2024, 5, 10), RepeatKind::None)]);
        assert_eq!(src.events_on(date(2024, 5, 10)).await.unwrap().len(), 1);
        assert!(src.events_on(date(2024, 5, 11)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn defining_row_shows_in_both_lookups() {
        let src = source(vec![record(1, date(2024, 5, 10), RepeatKind::Daily)]);
        let day = date(2024, 5, 10);
        assert_eq!(src.events_on(day).await.unwrap().len(), 1);
        assert_eq!(src.repeat_occurrences_on(day).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn daily_falls_on_every_later_day_until_bound() {
        let mut r = record(1, date(2024, 5, 10), RepeatKind::Daily);
        r.repeat_until = Some(date(2024, 5, 12));
        let src = source(vec![r]);
        assert!(src.repeat_occurrences_on(date(2024, 5, 9)).await.unwrap().is_empty());
        assert_eq!(src.repeat_occurrences_on(date(2024, 5, 12)).await.unwrap().len(), 1);
        assert!(src.repeat_occurrences_on(date(2024, 5, 13)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn weekly_matches_same_weekday() {
        // 2024-05-10 is a Friday
        let src = source(vec![record(1, date(2024, 5, 10), RepeatKind::Weekly)]);
        assert_eq!(src.repeat_occurrences_on(date(2024, 5, 17)).await.unwrap().len(), 1);
        assert!(src.repeat_occurrences_on(date(2024, 5, 16)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn monthly_and_yearly_match_same_calendar_slot() {
        let src = source(vec![
            record(1, date(2024, 5, 10), RepeatKind::Monthly),
            record(2, date(2024, 5, 10), RepeatKind::Yearly),
        ]);
        let june = src.repeat_occurrences_on(date(2024, 6, 10)).await.unwrap();
        assert_eq!(june.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1]);
        let next_year = src.repeat_occurrences_on(date(2025, 5, 10)).await.unwrap();
        assert_eq!(next_year.len(), 2);
    }

    #[tokio::test]
    async fn unapproved_events_never_feed() {
        let mut r = record(1, date(2024, 5, 10), RepeatKind::None);
        r.status = EventStatus::Waiting;
        let src = source(vec![r]);
        assert!(src.events_on(date(2024, 5, 10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_filter_restricts_lookups() {
        let mut a = record(1, date(2024, 5, 10), RepeatKind::None);
        a.category_id = Some(4);
        let b = record(2, date(2024, 5, 10), RepeatKind::None);
        let src = source(vec![a, b]).with_category(Some(4));
        let events = src.events_on(date(2024, 5, 10)).await.unwrap();
        assert_eq!(events.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn calendar_parses_from_json() {
        let json = r#"{
            "login": "alice",
            "prefs": { "rss_enabled": true, "remote_access": 1 },
            "categories": [{ "id": 4, "name": "Meetings" }],
            "events": [{
                "id": 7,
                "name": "Standup",
                "access": "P",
                "date": "2024-05-10",
                "time": "09:30:00",
                "repeat": "daily"
            }]
        }"#;
        let calendar = Calendar::from_json(json).unwrap();
        assert_eq!(calendar.login, "alice");
        assert_eq!(calendar.prefs.remote_access, 1);
        assert_eq!(calendar.category_name(4), Some("Meetings"));
        let event = &calendar.events[0];
        assert_eq!(event.repeat, RepeatKind::Daily);
        assert_eq!(event.status, EventStatus::Approved);
        assert!(event.time.is_some());
    }

    #[test]
    fn occurrence_carries_record_instant() {
        let mut r = record(9, date(2024, 5, 10), RepeatKind::Daily);
        r.time = Some(NaiveTime::from_hms_opt(16, 30, 0).unwrap());
        let occ = r.to_occurrence(date(2024, 5, 12));
        assert_eq!(occ.source_day, date(2024, 5, 12));
        assert!(occ.is_timed);
        // Canonical instant keeps the defining date; the engine rebases it.
        assert_eq!(occ.starts_at.date_naive(), date(2024, 5, 10));
    }
}
