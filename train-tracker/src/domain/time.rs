//! Local-time handling for the transit feed.
//!
//! The feed provides clock times as text (`"4:51 AM"`, `"17:01:23"`,
//! `"05:01:23 PM PDT"`) next to a separate date. This module turns those
//! into `NaiveDateTime` instants and applies the provider's service-day
//! rule: times shortly after midnight belong to the *following* calendar
//! day of the service day they were published in.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Seconds a train is assumed to sit at a station before departing.
pub const DWELL_SECS: i64 = 30;

/// Seconds a live departure may run ahead of the timetable before it is
/// considered to belong to a different trip.
pub const MATCH_TOLERANCE_SECS: i64 = 60;

/// Clock times strictly before this cutoff (02:27) belong to the next
/// calendar day of the service day that published them.
const SERVICE_DAY_CUTOFF: (u32, u32) = (2, 27);

/// Error returned when parsing an invalid time or date string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// The fixed dwell time as a `Duration`.
pub fn dwell_time() -> Duration {
    Duration::seconds(DWELL_SECS)
}

/// The live-match tolerance as a `Duration`.
pub fn match_tolerance() -> Duration {
    Duration::seconds(MATCH_TOLERANCE_SECS)
}

/// Returns the service-day cutoff as a time of day.
pub fn service_day_cutoff() -> NaiveTime {
    let (hour, minute) = SERVICE_DAY_CUTOFF;
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse a clock time in any of the formats the feed uses.
///
/// Accepts 12-hour (`"4:51 AM"`, `"05:01:23 PM"`) and 24-hour (`"01:00"`,
/// `"17:01:23"`) forms. A trailing time-zone token (`"PDT"`) is ignored.
///
/// # Examples
///
/// ```
/// use train_tracker::domain::parse_clock;
/// use chrono::NaiveTime;
///
/// assert_eq!(
///     parse_clock("4:51 AM").unwrap(),
///     NaiveTime::from_hms_opt(4, 51, 0).unwrap()
/// );
/// assert_eq!(
///     parse_clock("05:01:23 PM PDT").unwrap(),
///     NaiveTime::from_hms_opt(17, 1, 23).unwrap()
/// );
/// assert_eq!(
///     parse_clock("01:00").unwrap(),
///     NaiveTime::from_hms_opt(1, 0, 0).unwrap()
/// );
/// assert!(parse_clock("25:00").is_err());
/// ```
pub fn parse_clock(s: &str) -> Result<NaiveTime, TimeError> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();

    if tokens.len() > 1 {
        let last = tokens[tokens.len() - 1];
        if last.chars().all(|c| c.is_ascii_alphabetic()) && meridiem(last).is_none() {
            tokens.pop();
        }
    }

    let (clock, pm) = match tokens.as_slice() {
        [clock] => (*clock, None),
        [clock, marker] => (
            *clock,
            Some(meridiem(marker).ok_or_else(|| TimeError::new("expected AM or PM"))?),
        ),
        _ => return Err(TimeError::new("expected a clock time")),
    };

    let mut parts = clock.split(':');
    let hour = parts
        .next()
        .and_then(parse_digits)
        .ok_or_else(|| TimeError::new("invalid hour digits"))?;
    let minute = parts
        .next()
        .filter(|m| m.len() == 2)
        .and_then(parse_digits)
        .ok_or_else(|| TimeError::new("invalid minute digits"))?;
    let second = match parts.next() {
        Some(sec) if sec.len() == 2 => {
            parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?
        }
        Some(_) => return Err(TimeError::new("invalid second digits")),
        None => 0,
    };
    if parts.next().is_some() {
        return Err(TimeError::new("too many clock components"));
    }

    let hour = match pm {
        None if hour > 23 => return Err(TimeError::new("hour must be 0-23")),
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => {
            return Err(TimeError::new("hour must be 1-12 with AM/PM"));
        }
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse a feed date in `MM/DD/YYYY` form.
pub fn parse_feed_date(s: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y")
        .map_err(|_| TimeError::new("expected MM/DD/YYYY"))
}

/// Place a clock time on the calendar relative to a context instant.
///
/// The time is placed on the context's date, except that a time before
/// the 02:27 cutoff moves to the following day when the context itself is
/// at or after the cutoff. A context that is already past midnight (before
/// the cutoff) keeps such times as-is.
///
/// # Examples
///
/// ```
/// use train_tracker::domain::resolve_service_time;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let one_am = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
///
/// // Published during the day: 01:00 is tomorrow morning
/// let afternoon = date.and_hms_opt(14, 0, 0).unwrap();
/// let resolved = resolve_service_time(one_am, afternoon).unwrap();
/// assert_eq!(resolved.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
///
/// // Published after midnight: 01:00 is today
/// let small_hours = date.and_hms_opt(0, 30, 0).unwrap();
/// let resolved = resolve_service_time(one_am, small_hours).unwrap();
/// assert_eq!(resolved.date(), date);
/// ```
pub fn resolve_service_time(
    time: NaiveTime,
    context: NaiveDateTime,
) -> Result<NaiveDateTime, TimeError> {
    let cutoff = service_day_cutoff();
    let date = if time < cutoff && context.time() >= cutoff {
        context
            .date()
            .succ_opt()
            .ok_or_else(|| TimeError::new("date overflow"))?
    } else {
        context.date()
    };
    Ok(date.and_time(time))
}

/// Parse a clock string and place it relative to a context instant.
pub fn parse_service_time(s: &str, context: NaiveDateTime) -> Result<NaiveDateTime, TimeError> {
    resolve_service_time(parse_clock(s)?, context)
}

/// The context instant used for timetable times published for `date`.
///
/// Timetables describe a whole service day, so they are resolved as if
/// published at midday: every time before the cutoff is the next morning.
pub fn schedule_context(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
}

fn meridiem(token: &str) -> Option<bool> {
    match token.to_ascii_uppercase().as_str() {
        "AM" => Some(false),
        "PM" => Some(true),
        _ => None,
    }
}

/// Parse one or two ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
