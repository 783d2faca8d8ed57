use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use log::debug;

use crate::types::{ConfigError, DomainError};

/// Accepted date-string formats, tried in order; first match wins.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y",
];

/// An epidemiological year/week bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpiWeek {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for EpiWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Start-of-year convention for the surveillance calendar.
///
/// The three policies are mutually exclusive and chosen once per deployment:
/// calendar years, weekday-aligned years, or an explicit per-year table.
/// A policy holds no mutable state and may be shared across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarPolicy {
    /// Week 1 starts on January 1.
    International,
    /// Week 1 starts on the first occurrence of this weekday on or after
    /// January 1.
    Weekday(Weekday),
    /// Explicit year-to-start-date table, used verbatim. The start governing
    /// a date is the configured start with the greatest value strictly
    /// before it.
    Mapping(BTreeMap<i32, NaiveDate>),
}

impl CalendarPolicy {
    /// Parse the textual policy spec: `"international"` or `"day:<w>"` with
    /// `0 = Monday`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown spec or an out-of-range
    /// weekday.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let policy = if spec == "international" {
            CalendarPolicy::International
        } else if let Some(token) = spec.strip_prefix("day:") {
            let day = match token.trim() {
                "0" => Weekday::Mon,
                "1" => Weekday::Tue,
                "2" => Weekday::Wed,
                "3" => Weekday::Thu,
                "4" => Weekday::Fri,
                "5" => Weekday::Sat,
                "6" => Weekday::Sun,
                other => {
                    return Err(ConfigError::InvalidWeekday {
                        token: other.to_owned(),
                    });
                }
            };
            CalendarPolicy::Weekday(day)
        } else {
            return Err(ConfigError::UnknownPolicy {
                spec: spec.to_owned(),
            });
        };
        debug!("calendar policy: {policy:?}");
        Ok(policy)
    }

    /// Build an explicit mapping policy from `(year, start-date)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMapping`] if no pairs are given.
    pub fn mapping(
        starts: impl IntoIterator<Item = (i32, NaiveDate)>,
    ) -> Result<Self, ConfigError> {
        let table: BTreeMap<i32, NaiveDate> = starts.into_iter().collect();
        if table.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        Ok(CalendarPolicy::Mapping(table))
    }

    /// First day of the surveillance year containing `date`.
    ///
    /// # Errors
    ///
    /// For a mapping policy, returns [`DomainError`] when no configured
    /// start lies strictly before `date`.
    pub fn year_start(&self, date: NaiveDate) -> Result<NaiveDate, DomainError> {
        match self {
            CalendarPolicy::International => jan1(date.year()),
            CalendarPolicy::Weekday(day) => first_weekday(date.year(), *day),
            CalendarPolicy::Mapping(table) => table
                .values()
                .rev()
                .copied()
                .find(|start| *start < date)
                .ok_or(DomainError::DateBeforeMapping { date }),
        }
    }

    /// First day of the surveillance year labelled `year`.
    ///
    /// # Errors
    ///
    /// For a mapping policy, returns [`DomainError::UnmappedYear`] when the
    /// year has no configured start.
    pub fn year_start_by_year(&self, year: i32) -> Result<NaiveDate, DomainError> {
        match self {
            CalendarPolicy::International => jan1(year),
            CalendarPolicy::Weekday(day) => first_weekday(year, *day),
            CalendarPolicy::Mapping(table) => table
                .get(&year)
                .copied()
                .ok_or(DomainError::UnmappedYear { year }),
        }
    }

    /// Surveillance-year label for `date`.
    ///
    /// Under a weekday policy, dates before the year's aligned start belong
    /// to the previous surveillance year.
    ///
    /// # Errors
    ///
    /// Same domain conditions as [`year_start`](Self::year_start).
    pub fn year_for(&self, date: NaiveDate) -> Result<i32, DomainError> {
        match self {
            CalendarPolicy::International => Ok(date.year()),
            CalendarPolicy::Weekday(day) => {
                let start = first_weekday(date.year(), *day)?;
                if date < start {
                    Ok(date.year() - 1)
                } else {
                    Ok(date.year())
                }
            }
            CalendarPolicy::Mapping(table) => table
                .iter()
                .rev()
                .find(|(_, start)| **start < date)
                .map(|(year, _)| *year)
                .ok_or(DomainError::DateBeforeMapping { date }),
        }
    }

    /// Year and week bucket containing `date`.
    ///
    /// Dates before the computed year start clamp to week 1; the week number
    /// is never zero or negative.
    ///
    /// # Errors
    ///
    /// Same domain conditions as [`year_start`](Self::year_start).
    pub fn epi_week(&self, date: NaiveDate) -> Result<EpiWeek, DomainError> {
        let start = self.year_start(date)?;
        let year = self.year_for(date)?;
        if date < start {
            return Ok(EpiWeek { year, week: 1 });
        }
        let week = (date - start).num_days() / 7 + 1;
        Ok(EpiWeek {
            year,
            week: u32::try_from(week).unwrap_or(u32::MAX),
        })
    }

    /// First day of the given week.
    ///
    /// # Errors
    ///
    /// Same domain conditions as [`year_start_by_year`](Self::year_start_by_year).
    pub fn week_start(&self, year: i32, week: u32) -> Result<NaiveDate, DomainError> {
        let start = self.year_start_by_year(year)?;
        Ok(start + Duration::weeks(i64::from(week) - 1))
    }

    /// Days from the Unix epoch to the week epoch used when coercing date
    /// strings to seconds. The epoch was a Thursday, so a `day:<w>` policy
    /// puts the first week start `(4 + w) % 7` days after it; the other
    /// policies use the epoch itself.
    #[must_use]
    pub fn week_epoch_offset(&self) -> i64 {
        match self {
            CalendarPolicy::Weekday(day) => (4 + i64::from(day.num_days_from_monday())) % 7,
            _ => 0,
        }
    }
}

fn jan1(year: i32) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or(DomainError::YearOutOfRange { year })
}

fn first_weekday(year: i32, day: Weekday) -> Result<NaiveDate, DomainError> {
    let first = jan1(year)?;
    let adjustment =
        (7 + day.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    Ok(first + Duration::days(i64::from(adjustment)))
}

/// Parse a date string against the accepted formats, first match wins.
/// Date-only formats resolve to midnight.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDateTime> {
    for format in DATE_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Normalize a date string to ISO-8601, if it matches an accepted format.
pub(crate) fn normalize_iso(text: &str) -> Option<String> {
    parse_date(text).map(|datetime| datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Seconds from the week epoch (Unix epoch shifted by `offset_days`) to the
/// given moment.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn seconds_since_week_epoch(datetime: NaiveDateTime, offset_days: i64) -> f64 {
    (datetime.and_utc().timestamp() - offset_days * 86_400) as f64
}
