//! Study task model.
//!
//! A task is what the user typed into the session: a label, how hard the
//! material is, the free window they can study in, and a deadline.
//! Everything else (score, duration, slot, remaining label) is derived on
//! each schedule recomputation and never stored here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Hardness {
    Easy,
    Medium,
    Hard,
}

impl Hardness {
    pub const ALL: [Hardness; 3] = [Hardness::Easy, Hardness::Medium, Hardness::Hard];

    /// Weight fed into the priority score.
    pub fn weight(self) -> i32 {
        match self {
            Hardness::Easy => 1,
            Hardness::Medium => 2,
            Hardness::Hard => 3,
        }
    }

    /// Static rank for hardness-first ordering. Lower sorts first (Hard first).
    pub fn rank(self) -> u8 {
        match self {
            Hardness::Hard => 0,
            Hardness::Medium => 1,
            Hardness::Easy => 2,
        }
    }

    /// Block of study time allotted for one sitting.
    pub fn study_duration(self) -> Duration {
        match self {
            Hardness::Easy => Duration::minutes(45),
            Hardness::Medium => Duration::minutes(90),
            Hardness::Hard => Duration::hours(2),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hardness::Easy => "Easy",
            Hardness::Medium => "Medium",
            Hardness::Hard => "Hard",
        }
    }
}

impl fmt::Display for Hardness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hardness {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Hardness::Easy),
            "medium" => Ok(Hardness::Medium),
            "hard" => Ok(Hardness::Hard),
            other => Err(ScheduleError::invalid(
                "hardness",
                format!("'{other}' is not one of Easy, Medium, Hard"),
            )),
        }
    }
}

impl TryFrom<String> for Hardness {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Hardness> for String {
    fn from(h: Hardness) -> Self {
        h.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

/// Core task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub hardness: Hardness,

    /// Window the task may be studied in. Expected `free_start < free_end`,
    /// but inverted windows are accepted here and dealt with at placement.
    pub free_start: DateTime<Utc>,
    pub free_end: DateTime<Utc>,

    /// May legally precede the free window; the scheduler does not reject it.
    pub deadline: DateTime<Utc>,

    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        hardness: Hardness,
        free_start: DateTime<Utc>,
        free_end: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hardness,
            free_start,
            free_end,
            deadline,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Length of the free window. Zero or negative for degenerate input.
    pub fn free_window(&self) -> Duration {
        self.free_end - self.free_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hardness_parses_case_insensitively() {
        assert_eq!("hard".parse::<Hardness>().unwrap(), Hardness::Hard);
        assert_eq!(" Medium ".parse::<Hardness>().unwrap(), Hardness::Medium);
        assert_eq!("EASY".parse::<Hardness>().unwrap(), Hardness::Easy);
    }

    #[test]
    fn unknown_hardness_is_invalid_input() {
        let err = "brutal".parse::<Hardness>().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput { ref field, .. } if field == "hardness"));
    }

    #[test]
    fn hard_ranks_before_easy() {
        let mut all = Hardness::ALL.to_vec();
        all.sort_by_key(|h| h.rank());
        assert_eq!(all, vec![Hardness::Hard, Hardness::Medium, Hardness::Easy]);
    }

    #[test]
    fn task_round_trips_through_json() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let task = Task::new("task-0001", "Linear algebra", Hardness::Medium, t0, t0 + Duration::hours(3), t0 + Duration::days(1));
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"hardness\":\"Medium\""));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn status_defaults_to_pending_when_missing() {
        let json = r#"{
            "id": "t1",
            "name": "Essay",
            "hardness": "easy",
            "free_start": "2026-03-02T09:00:00Z",
            "free_end": "2026-03-02T12:00:00Z",
            "deadline": "2026-03-03T18:00:00Z"
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.hardness, Hardness::Easy);
        assert_eq!(t.free_window(), Duration::hours(3));
    }
}
