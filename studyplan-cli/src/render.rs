//! Plain-text views of a schedule: today's agenda, the upcoming table,
//! reminders and diagnostics.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::io::Write;
use studyplan_core::time::{format_clock, format_local};
use studyplan_core::{ReminderEvent, Schedule, ScheduledTask, SkippedTask, Task, TaskStatus};

pub fn render_schedule(out: &mut impl Write, schedule: &Schedule, now: DateTime<Utc>, tz: Tz) -> Result<()> {
    let (today, upcoming) = schedule.partition(now, tz);

    writeln!(out, "## Today's schedule\n")?;
    if today.is_empty() {
        writeln!(out, "No tasks scheduled today\n")?;
    } else {
        for e in &today {
            writeln!(
                out,
                "- {} - {} | {} [{}]",
                format_clock(e.scheduled_start, tz),
                format_clock(e.scheduled_end, tz),
                e.name,
                e.task_id
            )?;
            writeln!(out, "    Difficulty: {} | Remaining: {}{}", e.hardness, e.remaining_label, overrun_note(e))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Upcoming tasks\n")?;
    if upcoming.is_empty() {
        writeln!(out, "No upcoming tasks scheduled\n")?;
    } else {
        writeln!(out, "{:<10} {:<28} {:<7} {:<10} {:<26} {}", "ID", "Task", "Level", "Remaining", "Start", "End")?;
        for e in &upcoming {
            writeln!(
                out,
                "{:<10} {:<28} {:<7} {:<10} {:<26} {}{}",
                e.task_id,
                truncate(&e.name, 28),
                e.hardness,
                e.remaining_label,
                format_local(e.scheduled_start, tz),
                format_clock(e.scheduled_end, tz),
                overrun_note(e)
            )?;
        }
        writeln!(out)?;
    }

    render_skipped(out, &schedule.skipped)?;
    Ok(())
}

pub fn render_skipped(out: &mut impl Write, skipped: &[SkippedTask]) -> Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }
    writeln!(out, "## Not scheduled\n")?;
    for s in skipped {
        let name = if s.name.is_empty() { "(unnamed)" } else { s.name.as_str() };
        writeln!(out, "- [{}] {}: {}", s.task_id, name, s.reason)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn render_reminders(out: &mut impl Write, reminders: &[ReminderEvent]) -> Result<()> {
    for r in reminders {
        writeln!(out, "(!) {} (in {} min)", r.message(), r.minutes_to_start)?;
    }
    if !reminders.is_empty() {
        writeln!(out)?;
    }
    Ok(())
}

pub fn render_tasks(out: &mut impl Write, tasks: &[Task], tz: Tz) -> Result<()> {
    if tasks.is_empty() {
        writeln!(out, "No tasks yet. Try: add")?;
        return Ok(());
    }
    for t in tasks {
        let mark = match t.status {
            TaskStatus::Completed => "x",
            TaskStatus::Pending => " ",
        };
        writeln!(
            out,
            "[{mark}] {} {} ({}) free {} - {} | due {}",
            t.id,
            t.name,
            t.hardness,
            format_local(t.free_start, tz),
            format_clock(t.free_end, tz),
            format_local(t.deadline, tz)
        )?;
    }
    Ok(())
}

fn overrun_note(e: &ScheduledTask) -> &'static str {
    if e.overruns_window { " (past free window)" } else { "" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('~');
    t
}
