use chrono::{Duration, NaiveDate};

use crate::types::MAX_WINDOW_DAYS;

/// Inclusive day range a feed run walks.
///
/// Built from a start date and a day count. Counts above
/// [`MAX_WINDOW_DAYS`] are forced down to it; zero and negative counts
/// pass through and simply yield an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, days: i64) -> Self {
        let days = days.min(MAX_WINDOW_DAYS);
        // Any non-positive count yields an empty range; keeping the end
        // one day before the start avoids date-range overflow on absurd
        // negative inputs.
        let end = if days <= 0 {
            start - Duration::days(1)
        } else {
            start + Duration::days(days - 1)
        };
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered (0 for an empty window).
    pub fn len(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Ascending iterator over every day in the window, inclusive.
    pub fn days(&self) -> Days {
        Days {
            next: if self.is_empty() {
                None
            } else {
                Some(self.start)
            },
            end: self.end,
        }
    }
}

/// Iterator returned by [`TimeWindow::days`].
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current < self.end {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_arithmetic() {
        let w = TimeWindow::new(date(2024, 3, 1), 30);
        assert_eq!(w.start(), date(2024, 3, 1));
        assert_eq!(w.end(), date(2024, 3, 30));
        assert_eq!(w.len(), 30);
    }

    #[test]
    fn clamps_above_a_year() {
        let w = TimeWindow::new(date(2024, 1, 1), 10_000);
        assert_eq!(w.len(), 365);
        assert_eq!(w.end(), date(2024, 12, 30));
    }

    #[test]
    fn single_day() {
        let w = TimeWindow::new(date(2024, 3, 1), 1);
        let days: Vec<_> = w.days().collect();
        assert_eq!(days, vec![date(2024, 3, 1)]);
    }

    #[test]
    fn zero_and_negative_counts_are_empty() {
        for days in [0, -5] {
            let w = TimeWindow::new(date(2024, 3, 1), days);
            assert!(w.is_empty());
            assert_eq!(w.len(), 0);
            assert_eq!(w.days().count(), 0);
        }
    }

    #[test]
    fn iteration_crosses_month_boundary() {
        let w = TimeWindow::new(date(2024, 2, 28), 3);
        let days: Vec<_> = w.days().collect();
        assert_eq!(
            days,
            vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
    }
}
