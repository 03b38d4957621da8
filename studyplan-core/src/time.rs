//! Time utilities: local wall-clock input and display over UTC timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const CLOCK_FORMAT: &str = "%H:%M";

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| ScheduleError::invalid("timezone", format!("unknown IANA timezone '{tz}'")))
}

/// Parse a local time like "2026-03-02 18:00" in `tz`, returning UTC.
pub fn parse_local_to_utc(local: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let ndt = NaiveDateTime::parse_from_str(local.trim(), LOCAL_DATETIME_FORMAT)
        .map_err(|e| ScheduleError::invalid("datetime", format!("'{local}': {e}")))?;
    resolve_local(ndt, tz)
}

/// Parse a wall clock like "09:00".
pub fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), CLOCK_FORMAT)
        .map_err(|e| ScheduleError::invalid("clock time", format!("'{s}': {e}")))
}

/// `clock` on the local date of `now`, as UTC. This is the greedy cursor's anchor.
pub fn day_anchor(now: DateTime<Utc>, tz: Tz, clock: NaiveTime) -> Result<DateTime<Utc>> {
    let day = local_date(now, tz);
    resolve_local(day.and_time(clock), tz)
}

pub fn local_date(dt: DateTime<Utc>, tz: Tz) -> NaiveDate {
    dt.with_timezone(&tz).date_naive()
}

/// 12-hour clock, e.g. "09:00 AM".
pub fn format_clock(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%I:%M %p").to_string()
}

pub fn format_local(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%a %Y-%m-%d %I:%M %p").to_string()
}

fn resolve_local(ndt: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    let local = tz.from_local_datetime(&ndt).single().ok_or_else(|| {
        ScheduleError::invalid("datetime", format!("ambiguous or invalid local time (DST?): {ndt} {tz}"))
    })?;
    Ok(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evening_deadline_round_trips_to_the_same_clock() {
        // New York is still on EST until the 8th.
        let tz = parse_timezone("America/New_York").unwrap();
        let deadline = parse_local_to_utc("2026-03-02 18:00", tz).unwrap();
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap());
        assert_eq!(format_clock(deadline, tz), "06:00 PM");

        let late = parse_local_to_utc("2026-03-02 21:30", tz).unwrap();
        assert_eq!(late, Utc.with_ymd_and_hms(2026, 3, 3, 2, 30, 0).unwrap());
        assert_eq!(local_date(late, tz), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn bad_inputs_are_invalid() {
        assert!(parse_timezone("Mars/Olympus").is_err());
        assert!(parse_local_to_utc("tomorrow", Tz::UTC).is_err());
        assert!(parse_clock("25:00").is_err());
    }

    #[test]
    fn spring_forward_gap_is_rejected() {
        let tz = parse_timezone("America/Chicago").unwrap();
        assert!(parse_local_to_utc("2026-03-08 02:30", tz).is_err());
    }

    #[test]
    fn anchor_uses_local_date() {
        let tz = parse_timezone("America/Chicago").unwrap();
        // 03:00 UTC on the 3rd is still the evening of the 2nd in Chicago.
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 3, 0, 0).unwrap();
        let anchor = day_anchor(now, tz, parse_clock("09:00").unwrap()).unwrap();
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 2, 2, 15, 0, 0).unwrap());
        assert_eq!(format_clock(anchor, tz), "09:00 AM");
    }
}
