//! Schedule builder: rank pending tasks, then place each one in a slot.
//!
//! Ranking (stable, so equal keys keep insertion order):
//! - `PriorityScore`: score DESC, deadline ASC
//! - `HardnessThenDeadline`: Hard > Medium > Easy, deadline ASC; urgency ignored
//!
//! Placement is either the single-track greedy cursor or an independent
//! random offset inside each task's own window. A task that cannot be
//! placed is reported in [`Schedule::skipped`] and the rest still get slots.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScheduleError};
use crate::placement::{place_within_window, GreedyCursor, Slot};
use crate::priority::{priority_score, remaining_label};
use crate::task::{Hardness, Task};
use crate::time::{day_anchor, local_date};

pub const DEFAULT_BREAK_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingPolicy {
    #[default]
    PriorityScore,
    HardnessThenDeadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementMode {
    #[default]
    Greedy,
    RandomWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOptions {
    /// Greedy cursor starts here.
    pub day_start: DateTime<Utc>,
    pub break_duration: Duration,
    pub ranking: RankingPolicy,
    pub placement: PlacementMode,
    /// Greedy only: skip tasks whose slot would run past `free_end`
    /// instead of letting them overrun.
    pub clip_to_window: bool,
}

impl ScheduleOptions {
    pub fn new(day_start: DateTime<Utc>) -> Self {
        Self {
            day_start,
            break_duration: Duration::minutes(DEFAULT_BREAK_MINUTES),
            ranking: RankingPolicy::default(),
            placement: PlacementMode::default(),
            clip_to_window: false,
        }
    }

    /// Defaults anchored at 09:00 local on the date of `now`.
    pub fn for_day(now: DateTime<Utc>, tz: Tz) -> Result<Self> {
        let nine = NaiveTime::from_hms_opt(9, 0, 0)
            .ok_or_else(|| ScheduleError::invalid("clock time", "09:00"))?;
        Ok(Self::new(day_anchor(now, tz, nine)?))
    }

    pub fn with_break(mut self, break_duration: Duration) -> Self {
        self.break_duration = break_duration;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingPolicy) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_clip_to_window(mut self, clip: bool) -> Self {
        self.clip_to_window = clip;
        self
    }
}

/// One row of the computed plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub task_id: String,
    pub name: String,
    pub hardness: Hardness,
    pub deadline: DateTime<Utc>,
    pub free_start: DateTime<Utc>,
    pub free_end: DateTime<Utc>,
    pub priority_score: i32,
    pub study_minutes: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub remaining_label: String,
    /// Slot ends after the declared free window.
    pub overruns_window: bool,
}

impl ScheduledTask {
    pub fn slot(&self) -> Slot {
        Slot {
            start: self.scheduled_start,
            end: self.scheduled_end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTask {
    pub task_id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Rank order.
    pub entries: Vec<ScheduledTask>,
    pub skipped: Vec<SkippedTask>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split into entries starting on the local date of `now` and entries
    /// starting on a later date. Entries that start before today are in neither.
    pub fn partition(&self, now: DateTime<Utc>, tz: Tz) -> (Vec<&ScheduledTask>, Vec<&ScheduledTask>) {
        let today = local_date(now, tz);
        let mut today_rows = Vec::new();
        let mut upcoming = Vec::new();
        for e in &self.entries {
            let day: NaiveDate = local_date(e.scheduled_start, tz);
            if day == today {
                today_rows.push(e);
            } else if day > today {
                upcoming.push(e);
            }
        }
        (today_rows, upcoming)
    }
}

/// Pending tasks in rank order, paired with their priority score.
pub fn rank_tasks<'a>(tasks: &'a [Task], now: DateTime<Utc>, policy: RankingPolicy) -> Vec<(&'a Task, i32)> {
    let mut ranked: Vec<(&Task, i32)> = tasks
        .iter()
        .filter(|t| !t.is_completed())
        .map(|t| (t, priority_score(t, now)))
        .collect();

    match policy {
        RankingPolicy::PriorityScore => ranked.sort_by(|(a, sa), (b, sb)| {
            sb.cmp(sa).then_with(|| a.deadline.cmp(&b.deadline))
        }),
        RankingPolicy::HardnessThenDeadline => ranked.sort_by(|(a, _), (b, _)| {
            a.hardness
                .rank()
                .cmp(&b.hardness.rank())
                .then_with(|| a.deadline.cmp(&b.deadline))
        }),
    }

    debug!(
        policy = ?policy,
        order = ?ranked.iter().map(|(t, s)| format!("{}={}", t.id, s)).collect::<Vec<_>>(),
        "ranked tasks"
    );
    ranked
}

/// Build a schedule using the thread-local RNG for random placement.
pub fn build_schedule(tasks: &[Task], now: DateTime<Utc>, opts: &ScheduleOptions) -> Schedule {
    build_schedule_with_rng(tasks, now, opts, &mut rand::rng())
}

pub fn build_schedule_with_rng<R: Rng>(
    tasks: &[Task],
    now: DateTime<Utc>,
    opts: &ScheduleOptions,
    rng: &mut R,
) -> Schedule {
    let ranked = rank_tasks(tasks, now, opts.ranking);
    let mut schedule = Schedule::default();
    let mut cursor = GreedyCursor::new(opts.day_start, opts.break_duration);

    for (task, score) in ranked {
        let duration = task.hardness.study_duration();

        let placed = match opts.placement {
            PlacementMode::Greedy => {
                cursor.peek(task.free_start, duration).and_then(|slot| {
                    if opts.clip_to_window && slot.end > task.free_end {
                        Err(ScheduleError::invalid(
                            "free window",
                            format!("{} min block starting {} does not fit before {}", duration.num_minutes(), slot.start, task.free_end),
                        ))
                    } else {
                        cursor.commit(slot);
                        Ok(slot)
                    }
                })
            }
            PlacementMode::RandomWindow => place_within_window(task.free_start, task.free_end, duration, rng),
        };

        let slot = match placed {
            Ok(slot) => slot,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "skipping task");
                schedule.skipped.push(SkippedTask {
                    task_id: task.id.clone(),
                    name: task.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let overruns_window = slot.end > task.free_end;
        if overruns_window {
            warn!(task_id = %task.id, end = %slot.end, free_end = %task.free_end, "slot runs past free window");
        }

        schedule.entries.push(ScheduledTask {
            task_id: task.id.clone(),
            name: task.name.clone(),
            hardness: task.hardness,
            deadline: task.deadline,
            free_start: task.free_start,
            free_end: task.free_end,
            priority_score: score,
            study_minutes: duration.num_minutes(),
            scheduled_start: slot.start,
            scheduled_end: slot.end,
            remaining_label: remaining_label(task.deadline, now),
            overruns_window,
        });
    }

    info!(
        scheduled = schedule.entries.len(),
        skipped = schedule.skipped.len(),
        placement = ?opts.placement,
        "schedule built"
    );
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn task(id: &str, hardness: Hardness, deadline_hours: i64) -> Task {
        Task::new(id, id, hardness, at(9, 0), at(18, 0), now() + Duration::hours(deadline_hours))
    }

    fn opts() -> ScheduleOptions {
        ScheduleOptions::new(at(9, 0))
    }

    fn ids(s: &Schedule) -> Vec<&str> {
        s.entries.iter().map(|e| e.task_id.as_str()).collect()
    }

    #[test]
    fn urgent_hard_task_ranks_first() {
        let tasks = vec![task("b", Hardness::Easy, 48), task("a", Hardness::Hard, 3)];
        let s = build_schedule(&tasks, now(), &opts());
        assert_eq!(ids(&s), vec!["a", "b"]);
        assert_eq!(s.entries[0].priority_score, 21);
        assert_eq!(s.entries[1].priority_score, 5);
    }

    #[test]
    fn greedy_places_back_to_back_with_break() {
        let tasks = vec![task("a", Hardness::Hard, 3), task("b", Hardness::Easy, 48)];
        let s = build_schedule(&tasks, now(), &opts());
        assert_eq!(s.entries[0].scheduled_start, at(9, 0));
        assert_eq!(s.entries[0].scheduled_end, at(11, 0));
        assert_eq!(s.entries[1].scheduled_start, at(11, 15));
        assert_eq!(s.entries[1].scheduled_end, at(12, 0));
    }

    #[test]
    fn score_ties_break_by_deadline_then_input_order() {
        let tasks = vec![
            task("late", Hardness::Medium, 60),
            task("early", Hardness::Medium, 30),
            task("same-as-early", Hardness::Medium, 30),
        ];
        let s = build_schedule(&tasks, now(), &opts());
        assert_eq!(ids(&s), vec!["early", "same-as-early", "late"]);
    }

    #[test]
    fn hardness_policy_ignores_urgency() {
        let tasks = vec![
            task("easy-urgent", Hardness::Easy, 1),
            task("hard-later", Hardness::Hard, 100),
            task("hard-sooner", Hardness::Hard, 50),
        ];
        let s = build_schedule(&tasks, now(), &opts().with_ranking(RankingPolicy::HardnessThenDeadline));
        assert_eq!(ids(&s), vec!["hard-sooner", "hard-later", "easy-urgent"]);
    }

    #[test]
    fn completed_tasks_are_excluded() {
        let tasks = vec![
            task("a", Hardness::Hard, 3).with_status(TaskStatus::Completed),
            task("b", Hardness::Easy, 48),
        ];
        let s = build_schedule(&tasks, now(), &opts());
        assert_eq!(ids(&s), vec!["b"]);
        assert!(s.skipped.is_empty());
    }

    #[test]
    fn greedy_lets_slots_overrun_window_by_default() {
        let mut tight = task("tight", Hardness::Easy, 48);
        tight.free_start = at(9, 0);
        tight.free_end = at(10, 0);
        let tasks = vec![task("first", Hardness::Hard, 3), tight];
        let s = build_schedule(&tasks, now(), &opts());
        assert_eq!(s.len(), 2);
        let t = &s.entries[1];
        assert_eq!(t.scheduled_start, at(11, 15));
        assert!(t.overruns_window);
        assert!(!s.entries[0].overruns_window);
    }

    #[test]
    fn clipping_skips_tasks_that_do_not_fit() {
        let mut tight = task("tight", Hardness::Easy, 48);
        tight.free_end = at(10, 0);
        let tasks = vec![task("first", Hardness::Hard, 3), tight, task("after", Hardness::Easy, 72)];
        let s = build_schedule(&tasks, now(), &opts().with_clip_to_window(true));
        assert_eq!(ids(&s), vec!["first", "after"]);
        assert_eq!(s.skipped.len(), 1);
        assert_eq!(s.skipped[0].task_id, "tight");
        // cursor was not advanced by the skipped task
        assert_eq!(s.entries[1].scheduled_start, at(11, 15));
    }

    #[test]
    fn oversized_break_skips_later_tasks_without_panicking() {
        let tasks = vec![task("first", Hardness::Hard, 3), task("second", Hardness::Easy, 48)];
        let s = build_schedule(&tasks, now(), &opts().with_break(Duration::minutes(1_000_000_000_000)));
        assert_eq!(ids(&s), vec!["first"]);
        assert_eq!(s.skipped.len(), 1);
        assert_eq!(s.skipped[0].task_id, "second");
        assert!(s.skipped[0].reason.starts_with("invalid break"));
    }

    #[test]
    fn random_mode_skips_bad_window_and_keeps_the_rest() {
        let mut broken = task("broken", Hardness::Hard, 3);
        broken.free_end = broken.free_start;
        let tasks = vec![broken, task("ok", Hardness::Easy, 48)];
        let mut rng = SmallRng::seed_from_u64(3);
        let s = build_schedule_with_rng(&tasks, now(), &opts().with_placement(PlacementMode::RandomWindow), &mut rng);
        assert_eq!(ids(&s), vec!["ok"]);
        assert_eq!(s.skipped.len(), 1);
        assert!(s.skipped[0].reason.contains("free window"));
        let e = &s.entries[0];
        assert!(e.scheduled_start >= e.free_start && e.scheduled_end <= e.free_end);
    }

    #[test]
    fn expired_deadline_gets_expired_label() {
        let tasks = vec![task("gone", Hardness::Easy, -2)];
        let s = build_schedule(&tasks, now(), &opts());
        assert_eq!(s.entries[0].remaining_label, "Expired");
    }

    #[test]
    fn partition_by_local_date() {
        let mut tomorrow = task("tomorrow", Hardness::Easy, 48);
        tomorrow.free_start = at(9, 0) + Duration::days(1);
        tomorrow.free_end = tomorrow.free_start + Duration::hours(3);
        let tasks = vec![task("today", Hardness::Hard, 3), tomorrow];
        let s = build_schedule(&tasks, now(), &opts());
        let (today, upcoming) = s.partition(now(), Tz::UTC);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].task_id, "today");
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].task_id, "tomorrow");
    }

    #[test]
    fn for_day_anchors_at_nine_local() {
        let o = ScheduleOptions::for_day(now(), Tz::UTC).unwrap();
        assert_eq!(o.day_start, at(9, 0));
        assert_eq!(o.break_duration, Duration::minutes(15));
    }
}
