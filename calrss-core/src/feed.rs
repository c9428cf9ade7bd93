use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};

use crate::{
    Result,
    access::AccessPolicy,
    source::DailyEventSource,
    types::{EventOccurrence, FeedOptions, RepeatKind, RepeatPolicy},
    window::TimeWindow,
};


/// Separator between the date and time in a title prefix.
const TIME_SEPARATOR: &str = ", ";

/// Presentation-ready record derived from a kept occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Event name, optionally prefixed with its date/time
    pub title: String,
    /// View link for the occurrence
    pub link: String,
    /// Event description
    pub description: String,
    /// Run-wide category name, if a filter is active
    pub category: Option<String>,
    /// Instant of the occurrence, rendered in UTC downstream
    pub pub_date: DateTime<Utc>,
    /// Item identity; equals the link
    pub guid: String,
}

/// Ordered, append-only item list with a fixed capacity.
#[derive(Debug)]
pub struct FeedAssembler {
    items: Vec<FeedItem>,
    capacity: usize,
}

impl FeedAssembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an item; no-op returning false once full.
    pub fn push(&mut self, item: FeedItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<FeedItem> {
        self.items
    }
}

/// Day-by-day merge of single-date events and repeat occurrences into
/// one ordered, deduplicated, access-filtered, capped item sequence.
///
/// One engine serves exactly one feed run; the daily-once suppression
/// set lives on the engine, not in any ambient state.
pub struct MergeEngine<S: DailyEventSource> {
    source: S,
    policy: AccessPolicy,
    options: FeedOptions,
    daily_suppressed: HashSet<i64>,
}

impl<S: DailyEventSource> MergeEngine<S> {
    pub fn new(source: S, policy: AccessPolicy, options: FeedOptions) -> Self {
        Self {
            source,
            policy,
            options,
            daily_suppressed: HashSet::new(),
        }
    }

    /// Walks the window and produces the feed items, in emission order.
    ///
    /// Per day: single-date events first, then repeat occurrences, each
    /// in source order. An id emitted in the first pass is never
    /// re-emitted by the second pass that day, and a daily repeat is
    /// shown at most once across the window under
    /// [`RepeatPolicy::DailyOnce`]. Stops as soon as the item cap is
    /// reached; days past that point are not queried.
    pub async fn run(mut self) -> Result<Vec<FeedItem>> {
        let start = self
            .options
            .start_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let window = TimeWindow::new(start, self.options.days);
        let mut assembler = FeedAssembler::new(self.options.max_events);

        tracing::debug!(
            "Feed run for {}: {} through {}, cap {}",
            self.options.login,
            window.start(),
            window.end(),
            self.options.max_events
        );

        for day in window.days() {
            if assembler.is_full() {
                break;
            }

            let entries = self.source.events_on(day).await?;
            let repeats = if self.options.repeats.repeats_enabled() {
                self.source.repeat_occurrences_on(day).await?
            } else {
                Vec::new()
            };

            if entries.is_empty() && repeats.is_empty() {
                continue;
            }
            tracing::trace!(
                "{}: {} single-date, {} repeat candidates",
                day,
                entries.len(),
                repeats.len()
            );

            let mut shown_today: HashSet<i64> = HashSet::new();

            for occurrence in &entries {
                if assembler.is_full() {
                    break;
                }
                if !self.policy.is_visible(occurrence) {
                    continue;
                }
                shown_today.insert(occurrence.id);
                assembler.push(self.project(occurrence, occurrence.starts_at, day));
            }

            for occurrence in &repeats {
                if assembler.is_full() {
                    break;
                }
                // The first occurrence of a recurring event arrives
                // through both lookups on its defining day. Mark a daily
                // as shown before dropping the duplicate, so later days
                // suppress it too.
                if shown_today.contains(&occurrence.id) {
                    if occurrence.repeat == RepeatKind::Daily {
                        self.daily_suppressed.insert(occurrence.id);
                    }
                    continue;
                }
                if self.options.repeats == RepeatPolicy::DailyOnce
                    && self.daily_suppressed.contains(&occurrence.id)
                {
                    continue;
                }
                if !self.policy.is_visible(occurrence) {
                    continue;
                }
                if occurrence.repeat == RepeatKind::Daily {
                    self.daily_suppressed.insert(occurrence.id);
                }
                // Repeat records carry the instant of their defining
                // occurrence; only the time-of-day is canonical here.
                let starts_at = rebase_to_day(occurrence.starts_at, day);
                assembler.push(self.project(occurrence, starts_at, day));
            }
        }

        tracing::debug!("Feed run emitted {} items", assembler.len());
        Ok(assembler.into_items())
    }

    /// Maps a kept occurrence into a [`FeedItem`].
    fn project(
        &self,
        occurrence: &EventOccurrence,
        starts_at: DateTime<Utc>,
        day: NaiveDate,
    ) -> FeedItem {
        let title = if self.options.date_in_title {
            let mut prefix = format_date_prefix(starts_at.date_naive());
            if occurrence.is_timed {
                prefix.push_str(TIME_SEPARATOR);
                prefix.push_str(&format_time_of_day(&starts_at));
            }
            format!("{prefix} {}", occurrence.name)
        } else {
            occurrence.name.clone()
        };

        let link = view_link(&self.options.base_url, occurrence.id, &self.options.login, day);

        FeedItem {
            title,
            guid: link.clone(),
            link,
            description: occurrence.description.clone(),
            category: self.options.category.clone(),
            pub_date: starts_at,
        }
    }
}

/// Combines the current walk day with an occurrence's time-of-day.
fn rebase_to_day(instant: DateTime<Utc>, day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(instant.time()))
}

/// View URL for an occurrence; doubles as the item guid.
fn view_link(base_url: &str, id: i64, login: &str, day: NaiveDate) -> String {
    format!(
        "{base_url}view_entry.php?id={id}&friendly=1&rssuser={login}&date={}",
        day.format("%Y%m%d")
    )
}

/// Renders a date as "Aug 10th".
fn format_date_prefix(date: NaiveDate) -> String {
    format!("{} {}{}", date.format("%b"), date.day(), ordinal_suffix(date.day()))
}

/// Renders a time-of-day as "4:30pm".
fn format_time_of_day(instant: &DateTime<Utc>) -> String {
    let (is_pm, hour) = instant.hour12();
    format!(
        "{}:{:02}{}",
        hour,
        instant.minute(),
        if is_pm { "pm" } else { "am" }
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}
