//! Slot placement primitives.
//!
//! Two policies exist and they do not compose:
//! - [`GreedyCursor`]: one shared cursor across the whole plan, so only one
//!   task is ever in progress at a time.
//! - [`place_within_window`]: independent per-task random offset inside the
//!   task's own free window.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Single-track placement cursor.
///
/// Once a commit pushes the cursor past the representable range it is
/// exhausted and every later `peek` fails.
#[derive(Debug, Clone)]
pub struct GreedyCursor {
    next: Option<DateTime<Utc>>,
    break_duration: Duration,
}

impl GreedyCursor {
    pub fn new(day_start: DateTime<Utc>, break_duration: Duration) -> Self {
        Self {
            next: Some(day_start),
            break_duration,
        }
    }

    /// Earliest start for the next task; `None` once exhausted.
    pub fn current(&self) -> Option<DateTime<Utc>> {
        self.next
    }

    /// Slot the next task would get, without moving the cursor.
    pub fn peek(&self, free_start: DateTime<Utc>, duration: Duration) -> Result<Slot> {
        let current = self
            .next
            .ok_or_else(|| ScheduleError::invalid("break", "cursor ran past the last representable time"))?;
        let start = current.max(free_start);
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| ScheduleError::invalid("slot", format!("block starting {start} ends out of range")))?;
        Ok(Slot { start, end })
    }

    /// Commit a slot: the cursor moves to its end plus the break.
    pub fn commit(&mut self, slot: Slot) {
        self.next = slot.end.checked_add_signed(self.break_duration);
    }

    pub fn place(&mut self, free_start: DateTime<Utc>, duration: Duration) -> Result<Slot> {
        let slot = self.peek(free_start, duration)?;
        self.commit(slot);
        Ok(slot)
    }
}

/// Place a block of `duration` at a uniformly random whole-minute offset
/// inside `[free_start, free_end]`.
///
/// A block that does not fit takes the whole window. An empty or inverted
/// window is rejected.
pub fn place_within_window<R: Rng>(
    free_start: DateTime<Utc>,
    free_end: DateTime<Utc>,
    duration: Duration,
    rng: &mut R,
) -> Result<Slot> {
    let window = free_end - free_start;
    if window <= Duration::zero() {
        return Err(ScheduleError::invalid(
            "free window",
            format!("end {free_end} is not after start {free_start}"),
        ));
    }
    if duration >= window {
        return Ok(Slot {
            start: free_start,
            end: free_end,
        });
    }

    let slack = window.num_minutes() - duration.num_minutes();
    let offset = if slack > 0 {
        rng.random_range(0..=slack)
    } else {
        0
    };
    let start = free_start + Duration::minutes(offset);
    Ok(Slot {
        start,
        end: start + duration,
    })
}
