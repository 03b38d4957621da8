//! TaskBook — the in-memory task collection of one session.
//!
//! - Insertion order is kept; it is the last tie-break when ranking.
//! - Ids are sequential (`task-0001`, `task-0002`, ...) and never reused
//!   within a session, even after deletes.
//! - Nothing is persisted. Every mutation is visible to the next
//!   `get_schedule` call.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::reminders::{due_reminders, ReminderEvent, ReminderPolicy};
use crate::scheduler::{build_schedule, build_schedule_with_rng, Schedule, ScheduleOptions};
use crate::task::{Hardness, Task, TaskStatus};

#[derive(Debug, Default, Clone)]
pub struct TaskBook {
    tasks: Vec<Task>,
    next_seq: u32,
}

impl TaskBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a pending task. No validation beyond types: empty names and
    /// inverted windows are accepted.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        hardness: Hardness,
        free_start: DateTime<Utc>,
        free_end: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> String {
        let id = self.fresh_id();
        let task = Task::new(id.clone(), name, hardness, free_start, free_end, deadline);
        debug!(task_id = %id, hardness = %hardness, "task added");
        self.tasks.push(task);
        id
    }

    pub fn mark_completed(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.status = TaskStatus::Completed;
        debug!(task_id = %id, "task completed");
        Ok(())
    }

    pub fn mark_pending(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.status = TaskStatus::Pending;
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ScheduleError::unknown_task(id))?;
        debug!(task_id = %id, "task deleted");
        Ok(self.tasks.remove(pos))
    }

    pub fn rename_task(&mut self, id: &str, new_name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.name = new_name.into();
        Ok(())
    }

    pub fn get_schedule(&self, now: DateTime<Utc>, opts: &ScheduleOptions) -> Schedule {
        build_schedule(&self.tasks, now, opts)
    }

    pub fn get_schedule_with_rng<R: Rng>(&self, now: DateTime<Utc>, opts: &ScheduleOptions, rng: &mut R) -> Schedule {
        build_schedule_with_rng(&self.tasks, now, opts, rng)
    }

    /// Reminders for `schedule`, skipping anything completed since it was built.
    pub fn get_reminders(
        &self,
        schedule: &Schedule,
        now: DateTime<Utc>,
        tz: Tz,
        policy: ReminderPolicy,
    ) -> Vec<ReminderEvent> {
        due_reminders(schedule, now, tz, policy)
            .into_iter()
            .filter(|r| self.get(&r.task_id).is_some_and(|t| !t.is_completed()))
            .collect()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ScheduleError::unknown_task(id))
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_seq += 1;
            let id = format!("task-{:04}", self.next_seq);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
