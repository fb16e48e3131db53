//! Calendar-week period calculation.
//!
//! Weeks are Monday-start and tile continuously Monday to Monday. Week 01
//! of a year starts on the first Monday of that year; the January days
//! before it belong to the last week of the previous year. The period key
//! (`YYYY-Www`) is stable and sortable, and names the year of the week's
//! Monday.

use super::error::ChartError;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::Serialize;

/// One chart period: a half-open week `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Period {
    pub key: String,
    /// Inclusive. Always a Monday.
    pub start: NaiveDate,
    /// Exclusive. `start + 7 days`.
    pub end: NaiveDate,
}

fn first_monday(year: i32) -> NaiveDate {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1st is a valid date");
    let offset = (7 - jan1.weekday().num_days_from_monday()) % 7;
    jan1 + Days::new(u64::from(offset))
}

fn week_of(monday: NaiveDate) -> (i32, u32) {
    let year = monday.year();
    let week = (monday - first_monday(year)).num_days() / 7 + 1;
    (year, week as u32)
}

impl Period {
    /// The period containing the given date. A date exactly on a week
    /// boundary belongs to the week that starts on it.
    pub fn containing(date: NaiveDate) -> Period {
        let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
        let (year, week) = week_of(monday);
        Period {
            key: format!("{}-W{:02}", year, week),
            start: monday,
            end: monday + Days::new(7),
        }
    }

    /// Parse a `YYYY-Www` key back into its period. Rejects keys that do
    /// not name a real week of that year (including `W00`, whose days are
    /// keyed under the previous year's last week).
    pub fn from_key(key: &str) -> Result<Period, ChartError> {
        let invalid = || ChartError::InvalidPeriodKey(key.to_string());
        let (year_part, week_part) = key.split_once("-W").ok_or_else(invalid)?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let week: u32 = week_part.parse().map_err(|_| invalid())?;
        if week == 0 || week > 53 {
            return Err(invalid());
        }
        let start = first_monday(year) + Days::new(u64::from(week - 1) * 7);
        let period = Period::containing(start);
        if period.key != key {
            // e.g. 2024-W53 when 2024 only has 52 weeks
            return Err(invalid());
        }
        Ok(period)
    }

    /// The week right after this one.
    pub fn next(&self) -> Period {
        Period::containing(self.end)
    }

    /// A week can only be charted once it has fully ended.
    pub fn is_complete(&self, today: NaiveDate) -> bool {
        today >= self.end
    }

    /// Half-open membership test for a play-event timestamp.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        date >= self.start && date < self.end
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}
