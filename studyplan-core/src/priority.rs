//! Priority scoring and deadline labels.
//!
//! score = hardness weight * 2 + urgency tier * 3
//!
//! Urgency tiers by hours left until the deadline:
//! - more than 24h: 1
//! - more than 6h, up to 24h: 3
//! - 6h or less (including already expired): 5

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::task::{Hardness, Task};

pub const HARDNESS_FACTOR: i32 = 2;
pub const URGENCY_FACTOR: i32 = 3;

pub const EXPIRED_LABEL: &str = "Expired";

/// Hours until `deadline`, clamped at zero.
pub fn hours_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (deadline - now).num_milliseconds() as f64;
    (millis / 3_600_000.0).max(0.0)
}

pub fn urgency_tier(hours_left: f64) -> i32 {
    if hours_left > 24.0 {
        1
    } else if hours_left > 6.0 {
        3
    } else {
        5
    }
}

/// Higher is more urgent/important. Always finite and non-negative.
pub fn priority_score(task: &Task, now: DateTime<Utc>) -> i32 {
    let tier = urgency_tier(hours_left(task.deadline, now));
    task.hardness.weight() * HARDNESS_FACTOR + tier * URGENCY_FACTOR
}

/// Duration lookup for a raw hardness label coming from an untrusted caller.
pub fn study_duration(hardness: &str) -> Result<Duration> {
    let h: Hardness = hardness.parse()?;
    Ok(h.study_duration())
}

/// Human-readable time until the deadline.
///
/// "Expired" once the deadline has passed, whole hours under a day,
/// whole days otherwise (both floored).
pub fn remaining_label(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if deadline <= now {
        return EXPIRED_LABEL.to_string();
    }
    let hours = (deadline - now).num_hours();
    if hours < 24 {
        format!("{hours} hrs")
    } else {
        format!("{} days", hours / 24)
    }
}
