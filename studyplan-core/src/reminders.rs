//! Near-term study reminders.
//!
//! Evaluated on every refresh against the current schedule. There is no
//! timer and no sent-state: if the host refreshes twice inside the lead
//! window it gets the same event twice. `dedupe_key` lets a host suppress
//! repeats if it wants to.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::scheduler::Schedule;
use crate::time::{format_clock, local_date};

pub const MIN_LEAD_MINUTES: i64 = 1;
pub const MAX_LEAD_MINUTES: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    pub lead_minutes: i64,
}

impl ReminderPolicy {
    pub fn new(lead_minutes: i64) -> Result<Self> {
        if !(MIN_LEAD_MINUTES..=MAX_LEAD_MINUTES).contains(&lead_minutes) {
            return Err(ScheduleError::invalid(
                "reminder lead",
                format!("{lead_minutes} min is outside {MIN_LEAD_MINUTES}..={MAX_LEAD_MINUTES}"),
            ));
        }
        Ok(Self { lead_minutes })
    }
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self { lead_minutes: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub task_id: String,
    pub name: String,
    pub scheduled_start: DateTime<Utc>,
    /// Local 12-hour start time, e.g. "09:00 AM".
    pub start_label: String,
    pub minutes_to_start: i64,
}

impl ReminderEvent {
    pub fn dedupe_key(&self) -> String {
        format!("{}:{}", self.task_id, self.scheduled_start.timestamp())
    }

    pub fn message(&self) -> String {
        format!("Upcoming: {} at {}", self.name, self.start_label)
    }
}

/// Scheduled entries starting today (local) within `lead_minutes` from now.
pub fn due_reminders(schedule: &Schedule, now: DateTime<Utc>, tz: Tz, policy: ReminderPolicy) -> Vec<ReminderEvent> {
    let today = local_date(now, tz);

    let out: Vec<ReminderEvent> = schedule
        .entries
        .iter()
        .filter(|e| local_date(e.scheduled_start, tz) == today)
        .filter_map(|e| {
            let until = e.scheduled_start - now;
            if until < Duration::zero() || until > Duration::minutes(policy.lead_minutes) {
                return None;
            }
            let minutes_to_start = until.num_minutes();
            Some(ReminderEvent {
                task_id: e.task_id.clone(),
                name: e.name.clone(),
                scheduled_start: e.scheduled_start,
                start_label: format_clock(e.scheduled_start, tz),
                minutes_to_start,
            })
        })
        .collect();

    if !out.is_empty() {
        debug!(count = out.len(), lead = policy.lead_minutes, "reminders due");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{build_schedule, ScheduleOptions};
    use crate::task::{Hardness, Task};
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn schedule_at_nine() -> Schedule {
        let t = Task::new("t1", "Physics", Hardness::Hard, at(2, 9, 0), at(2, 12, 0), at(3, 9, 0));
        build_schedule(&[t], at(2, 8, 0), &ScheduleOptions::new(at(2, 9, 0)))
    }

    #[test]
    fn lead_is_validated() {
        assert!(ReminderPolicy::new(0).is_err());
        assert!(ReminderPolicy::new(121).is_err());
        assert_eq!(ReminderPolicy::new(120).unwrap().lead_minutes, 120);
        assert_eq!(ReminderPolicy::default().lead_minutes, 15);
    }

    #[test]
    fn fires_inside_lead_window() {
        let s = schedule_at_nine();
        let out = due_reminders(&s, at(2, 8, 50), Tz::UTC, ReminderPolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].minutes_to_start, 10);
        assert_eq!(out[0].start_label, "09:00 AM");
        assert_eq!(out[0].message(), "Upcoming: Physics at 09:00 AM");
    }

    #[test]
    fn fires_at_start_and_at_lead_edge() {
        let s = schedule_at_nine();
        assert_eq!(due_reminders(&s, at(2, 9, 0), Tz::UTC, ReminderPolicy::default()).len(), 1);
        assert_eq!(due_reminders(&s, at(2, 8, 45), Tz::UTC, ReminderPolicy::default()).len(), 1);
    }

    #[test]
    fn silent_outside_window() {
        let s = schedule_at_nine();
        assert!(due_reminders(&s, at(2, 8, 0), Tz::UTC, ReminderPolicy::default()).is_empty());
        assert!(due_reminders(&s, at(2, 9, 5), Tz::UTC, ReminderPolicy::default()).is_empty());
    }

    #[test]
    fn seconds_count_at_both_window_edges() {
        let s = schedule_at_nine();
        let just_started = at(2, 9, 0) + Duration::seconds(30);
        assert!(due_reminders(&s, just_started, Tz::UTC, ReminderPolicy::default()).is_empty());

        let just_outside_lead = at(2, 8, 45) - Duration::seconds(1);
        assert!(due_reminders(&s, just_outside_lead, Tz::UTC, ReminderPolicy::default()).is_empty());

        let just_inside_lead = at(2, 8, 45) + Duration::seconds(1);
        let out = due_reminders(&s, just_inside_lead, Tz::UTC, ReminderPolicy::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].minutes_to_start, 14);
    }

    #[test]
    fn start_after_local_midnight_is_not_today() {
        let tz: Tz = "Asia/Kolkata".parse().unwrap();
        // 18:25Z is 23:55 local; an 18:35Z start is 00:05 tomorrow local.
        let t = Task::new("t2", "Late", Hardness::Easy, at(2, 18, 35), at(2, 22, 0), at(4, 0, 0));
        let s = build_schedule(&[t], at(2, 18, 0), &ScheduleOptions::new(at(2, 18, 35)));
        assert!(due_reminders(&s, at(2, 18, 25), tz, ReminderPolicy::default()).is_empty());
        assert_eq!(due_reminders(&s, at(2, 18, 25), Tz::UTC, ReminderPolicy::default()).len(), 1);
    }

    #[test]
    fn repeats_on_every_refresh_with_same_key() {
        let s = schedule_at_nine();
        let a = due_reminders(&s, at(2, 8, 50), Tz::UTC, ReminderPolicy::default());
        let b = due_reminders(&s, at(2, 8, 55), Tz::UTC, ReminderPolicy::default());
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].dedupe_key(), b[0].dedupe_key());
    }
}
