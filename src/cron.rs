//! Five-field cron expression engine.
//!
//! Parses `minute hour day-of-month month day-of-week` expressions and
//! evaluates them against UTC timestamps. Each field accepts `*`, a single
//! integer, an inclusive range `a-b`, a step `*/n` or `a-b/n`, and
//! comma-separated lists of those forms.
//!
//! Field ranges: minute 0–59, hour 0–23, day-of-month 1–31, month 1–12,
//! day-of-week 0–6 where **0 is Sunday and 6 is Saturday** (classic cron
//! numbering; 7 is rejected).
//!
//! Day-of-month and day-of-week combine with logical OR unless one of them
//! is the bare wildcard `*`, in which case only the other constrains the
//! match. All evaluation is in UTC; local time is never consulted.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc};

use crate::{AppError, Result};

/// How far `next_after` scans before concluding the schedule never fires.
const SCAN_HORIZON_DAYS: i64 = 366 * 5;

/// Set of admitted values for one cron field, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSet {
    mask: u64,
    /// Whether the field was the bare wildcard `*`.
    unrestricted: bool,
}

impl FieldSet {
    fn contains(self, value: u32) -> bool {
        (self.mask >> value) & 1 == 1
    }
}

/// A parsed, validated cron schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
}

impl Schedule {
    /// Parse a 5-field cron expression.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidCronSyntax` for malformed expressions and
    /// `AppError::InvalidCronField` for values outside a field's range.
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(AppError::InvalidCronSyntax(format!(
                "expected 5 fields (minute hour day month weekday), got {}",
                fields.len()
            )));
        }

        Ok(Self {
            minutes: parse_field(fields[0], "minute", 0, 59)?,
            hours: parse_field(fields[1], "hour", 0, 23)?,
            days_of_month: parse_field(fields[2], "day-of-month", 1, 31)?,
            months: parse_field(fields[3], "month", 1, 12)?,
            days_of_week: parse_field(fields[4], "day-of-week", 0, 6)?,
        })
    }

    /// Whether the schedule fires at the minute containing `t`.
    ///
    /// Seconds and finer are ignored; two timestamps within the same UTC
    /// minute are equivalent.
    #[must_use]
    pub fn matches(&self, t: DateTime<Utc>) -> bool {
        self.minutes.contains(t.minute())
            && self.hours.contains(t.hour())
            && self.months.contains(t.month())
            && self.day_matches(t)
    }

    /// The first matching minute strictly after `t`.
    ///
    /// Returns `None` when no minute within the scan horizon matches, which
    /// only happens for date combinations that never occur (e.g. day 30 of
    /// month 2).
    #[must_use]
    pub fn next_after(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = truncate_to_minute(t + Duration::minutes(1));
        let horizon = t + Duration::days(SCAN_HORIZON_DAYS);

        while candidate <= horizon {
            if !self.months.contains(candidate.month()) || !self.day_matches(candidate) {
                let next_day = candidate.date_naive().succ_opt()?;
                candidate = Utc.from_utc_datetime(&next_day.and_time(NaiveTime::MIN));
                continue;
            }
            if !self.hours.contains(candidate.hour()) {
                candidate = truncate_to_hour(candidate + Duration::hours(1));
                continue;
            }
            if !self.minutes.contains(candidate.minute()) {
                candidate += Duration::minutes(1);
                continue;
            }
            return Some(candidate);
        }

        None
    }

    /// Standard cron day semantics: OR of the two day fields, unless one is
    /// the bare wildcard, which then defers entirely to the other.
    fn day_matches(&self, t: DateTime<Utc>) -> bool {
        let by_month_day = self.days_of_month.contains(t.day());
        let by_weekday = self
            .days_of_week
            .contains(t.weekday().num_days_from_sunday());

        match (
            self.days_of_month.unrestricted,
            self.days_of_week.unrestricted,
        ) {
            (true, true) => true,
            (true, false) => by_weekday,
            (false, true) => by_month_day,
            (false, false) => by_month_day || by_weekday,
        }
    }
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

fn truncate_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_minute(t).with_minute(0).unwrap_or(t)
}

/// Parse one cron field into its admitted-value set.
fn parse_field(text: &str, name: &str, min: u32, max: u32) -> Result<FieldSet> {
    let unrestricted = text == "*";
    let mut mask = 0u64;

    for part in text.split(',') {
        if part.is_empty() {
            return Err(AppError::InvalidCronSyntax(format!(
                "empty element in {name} field"
            )));
        }

        let (range_text, step) = match part.split_once('/') {
            Some((range_text, step_text)) => {
                if !(range_text == "*" || range_text.contains('-')) {
                    return Err(AppError::InvalidCronSyntax(format!(
                        "step requires `*` or a range in {name} field, got `{part}`"
                    )));
                }
                let step: usize = step_text.parse().map_err(|_| {
                    AppError::InvalidCronSyntax(format!(
                        "malformed step `{step_text}` in {name} field"
                    ))
                })?;
                if step == 0 {
                    return Err(AppError::InvalidCronSyntax(format!(
                        "step must be at least 1 in {name} field"
                    )));
                }
                (range_text, step)
            }
            None => (part, 1),
        };

        let (lo, hi) = if range_text == "*" {
            (min, max)
        } else if let Some((lo_text, hi_text)) = range_text.split_once('-') {
            (
                parse_value(lo_text, name)?,
                parse_value(hi_text, name)?,
            )
        } else {
            let value = parse_value(range_text, name)?;
            (value, value)
        };

        if lo < min || hi > max {
            return Err(AppError::InvalidCronField(format!(
                "{name} values must be within {min}-{max}, got `{part}`"
            )));
        }
        if lo > hi {
            return Err(AppError::InvalidCronSyntax(format!(
                "reversed range `{part}` in {name} field"
            )));
        }

        for value in (lo..=hi).step_by(step) {
            mask |= 1 << value;
        }
    }

    Ok(FieldSet { mask, unrestricted })
}

fn parse_value(text: &str, name: &str) -> Result<u32> {
    text.parse().map_err(|_| {
        AppError::InvalidCronSyntax(format!("malformed value `{text}` in {name} field"))
    })
}
