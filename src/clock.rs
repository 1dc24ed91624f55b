//! # Clock
//! All "today"-relative window boundaries go through an injected clock so
//! aggregation windows are deterministic in tests.

use chrono::{Duration, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Current calendar day (UTC).
    fn today(&self) -> NaiveDate;
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Test clock pinned to a fixed day.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Inclusive calendar-day range used as the implicit aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// `today - days ..= today`. Used by the prediction aggregates, where
    /// today's rows participate when present.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self {
            from: today - Duration::days(days),
            to: today,
        }
    }

    /// `today - days ..= yesterday`. Used by the chart series endpoints.
    pub fn ending_yesterday(today: NaiveDate, days: i64) -> Self {
        Self {
            from: today - Duration::days(days),
            to: today - Duration::days(1),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn trailing_window_includes_today() {
        let r = DateRange::trailing(day("2025-03-31"), 30);
        assert_eq!(r.from, day("2025-03-01"));
        assert_eq!(r.to, day("2025-03-31"));
        assert!(r.contains(day("2025-03-31")));
    }

    #[test]
    fn series_window_ends_yesterday() {
        let r = DateRange::ending_yesterday(day("2025-03-31"), 7);
        assert_eq!(r.from, day("2025-03-24"));
        assert_eq!(r.to, day("2025-03-30"));
        assert!(!r.contains(day("2025-03-31")));
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock(day("2024-01-02"));
        assert_eq!(clock.today(), clock.today());
    }
}
