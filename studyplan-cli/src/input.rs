//! Batch task files for `studyplan plan --tasks <file.json>`.
//!
//! Times are local wall-clock strings ("YYYY-MM-DD HH:MM") in the configured
//! timezone. A row with bad data is reported and skipped; the rest load.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use studyplan_core::time::parse_local_to_utc;
use studyplan_core::{Hardness, ScheduleError, SkippedTask, TaskBook};

#[derive(Debug, Clone, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub name: String,
    pub hardness: String,
    pub free_start: String,
    pub free_end: String,
    pub deadline: String,
    #[serde(default)]
    pub completed: bool,
}

pub fn read_task_file(path: &Path) -> Result<Vec<TaskInput>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let rows: Vec<TaskInput> =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(rows)
}

/// Load rows into a fresh book. Rows that fail to parse come back as
/// diagnostics, keyed by their 1-based row number.
pub fn load_rows(rows: &[TaskInput], tz: Tz) -> (TaskBook, Vec<SkippedTask>) {
    let mut book = TaskBook::new();
    let mut rejected = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        match add_row(&mut book, row, tz) {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(row = i + 1, error = %e, "rejecting task row");
                rejected.push(SkippedTask {
                    task_id: format!("row-{}", i + 1),
                    name: row.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (book, rejected)
}

fn add_row(book: &mut TaskBook, row: &TaskInput, tz: Tz) -> std::result::Result<String, ScheduleError> {
    let hardness: Hardness = row.hardness.parse()?;
    let free_start = parse_local_to_utc(&row.free_start, tz)?;
    let free_end = parse_local_to_utc(&row.free_end, tz)?;
    let deadline = parse_local_to_utc(&row.deadline, tz)?;

    let id = book.add_task(row.name.clone(), hardness, free_start, free_end, deadline);
    if row.completed {
        book.mark_completed(&id)?;
    }
    Ok(id)
}
