//! studyplan-core: task model, priority heuristic and slot allocation for the
//! study planner.

pub mod error;
pub mod placement;
pub mod priority;
pub mod reminders;
pub mod scheduler;
pub mod task;
pub mod task_book;
pub mod time;

pub use error::ScheduleError;
pub use placement::{place_within_window, GreedyCursor, Slot};
pub use priority::{priority_score, remaining_label, study_duration, urgency_tier};
pub use reminders::{due_reminders, ReminderEvent, ReminderPolicy};
pub use scheduler::{
    build_schedule, build_schedule_with_rng, rank_tasks, PlacementMode, RankingPolicy, Schedule,
    ScheduleOptions, ScheduledTask, SkippedTask,
};
pub use task::{Hardness, Task, TaskStatus};
pub use task_book::TaskBook;
