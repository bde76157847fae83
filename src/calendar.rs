//! Week arithmetic and event bucketing.
//!
//! Only [`current_week_in_year`] reads the clock. Week windows start on Monday; ISO week
//! numbers are only used to locate a week, not to decide where it begins.

use std::collections::BTreeMap;

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::warn;

use crate::model::event::Event;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";
const WEEK_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Events of one day, keyed by `YYYY-MM-DD`. Keys sort chronologically.
pub type EventsByDay<'a> = BTreeMap<String, Vec<&'a Event>>;

/// Days of one week, keyed by the Monday's `YYYY-MM-DDT00:00:00.000Z`.
pub type EventsByWeek<'a> = BTreeMap<String, EventsByDay<'a>>;

/// Inclusive bounds of a Monday-start week, as wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    /// Resolve both boundaries in `tz`. Boundaries falling in a DST gap fall back to
    /// reading the wall-clock time as UTC.
    pub fn to_utc(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (local_to_utc(self.start, tz), local_to_utc(self.end, tz))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartDateError {
    #[error("invalid start date '{0}'")]
    InvalidTimestamp(String),
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),
}

pub fn is_valid_year(year: i32) -> bool {
    if !(1000..=9999).contains(&year) {
        return false;
    }
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|d| d.year() == year)
        .unwrap_or(false)
}

/// True when `week` exists in `year`'s ISO week-date calendar (week 53 only in long years).
pub fn is_valid_year_and_week(year: i32, week: u32) -> bool {
    if !is_valid_year(year) || !(1..=53).contains(&week) {
        return false;
    }
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).is_some()
}

/// Monday 00:00:00.000 through Sunday 23:59:59.999 of ISO week `week` of `year`.
pub fn start_and_end_of_week(year: i32, week: u32) -> Option<WeekWindow> {
    if !is_valid_year_and_week(year, week) {
        return None;
    }
    // Any day of the ISO week locates it; the window itself is Monday-start.
    let anchor = NaiveDate::from_isoywd_opt(year, week, Weekday::Thu)?;
    let monday = start_of_week(anchor);
    let sunday = monday + Duration::days(6);
    Some(WeekWindow {
        start: monday.and_time(NaiveTime::MIN),
        end: sunday.and_hms_milli_opt(23, 59, 59, 999)?,
    })
}

/// ISO week number of today. `year` has no effect on the result: the week is always
/// counted from today's own ISO year, so `/events/2020` lands on this week's number.
pub fn current_week_in_year(year: i32) -> u32 {
    current_week_in_year_at(year, Local::now().date_naive())
}

/// Same as [`current_week_in_year`] with an explicit `today`.
pub fn current_week_in_year_at(_year: i32, today: NaiveDate) -> u32 {
    today.iso_week().week()
}

/// Local wall-clock start of an event.
///
/// With a time zone the timestamp is read as an instant and shifted into that zone.
/// Without one, its UTC calendar fields are used unchanged.
pub fn convert_event_start_date(event: &Event) -> Result<Option<NaiveDateTime>, StartDateError> {
    let Some(start) = event.start_date.as_deref() else {
        return Ok(None);
    };
    let instant = parse_instant(start)?;
    match event.time_zone_iana_name.as_deref() {
        Some(name) => {
            let tz: Tz = name
                .parse()
                .map_err(|_| StartDateError::UnknownTimeZone(name.to_string()))?;
            Ok(Some(instant.with_timezone(&tz).naive_local()))
        }
        None => Ok(Some(instant.naive_utc())),
    }
}

/// Bucket events by Monday-start week, then by day, keeping input order within a day.
///
/// Every week present carries all seven day keys. Unscheduled events are skipped, as are
/// events whose start date cannot be read (logged).
pub fn group_events_by_week(events: &[Event]) -> EventsByWeek<'_> {
    let mut by_week: EventsByWeek<'_> = BTreeMap::new();

    for event in events {
        let local = match convert_event_start_date(event) {
            Ok(Some(local)) => local,
            Ok(None) => continue,
            Err(e) => {
                warn!(event_id = event.id, error = %e, "Skipping event with unreadable start date");
                continue;
            }
        };

        let monday = start_of_week(local.date());
        let days = by_week.entry(week_key(monday)).or_insert_with(|| {
            (0..7)
                .map(|offset| (day_key(monday + Duration::days(offset)), Vec::new()))
                .collect()
        });

        days.entry(day_key(local.date())).or_default().push(event);
    }

    by_week
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn week_key(monday: NaiveDate) -> String {
    monday.and_time(NaiveTime::MIN).format(WEEK_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).ok()
}

pub fn parse_week_key(key: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(key, WEEK_KEY_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Midnight of `now`'s calendar day in `tz`, as a UTC instant.
pub fn today_start_utc(tz: Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    local_to_utc(today.and_time(NaiveTime::MIN), tz)
}

fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, StartDateError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .map_err(|_| StartDateError::InvalidTimestamp(s.to_string()))
}
