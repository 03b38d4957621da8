//! Error type shared by the scheduling core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Caller handed us something the scheduler cannot work with
    /// (unknown hardness, empty free window, malformed time, unknown task id).
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl ScheduleError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_task(id: &str) -> Self {
        Self::invalid("task id", format!("no task with id '{id}'"))
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
