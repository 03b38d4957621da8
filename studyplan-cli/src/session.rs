//! Interactive planning session.
//!
//! Tasks live only in memory for the lifetime of the session. Every change
//! (add, done, undo, rm, rename) triggers a refresh: the schedule is rebuilt
//! from scratch and any reminders due right now are shown again.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::{BufRead, Write};
use studyplan_core::time::{local_date, parse_clock, parse_local_to_utc, LOCAL_DATETIME_FORMAT};
use studyplan_core::{Hardness, TaskBook};
use tracing::debug;

use crate::config::Config;
use crate::render::{render_reminders, render_schedule, render_tasks};

const HELP: &str = "\
Commands:
  add                                       prompt for a new task
  add <name> | <easy|medium|hard> | <free start> | <free end> | <deadline>
                                            times are local 'YYYY-MM-DD HH:MM'
  done <id>        mark a task completed
  undo <id>        mark a task pending again
  rm <id>          delete a task
  rename <id> <new name>
  list             show all tasks
  plan             show the schedule
  help             this text
  quit             end the session (tasks are not kept)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddPrompted,
    Add {
        name: String,
        hardness: Hardness,
        free_start: String,
        free_end: String,
        deadline: String,
    },
    Done(String),
    Undo(String),
    Remove(String),
    Rename { id: String, name: String },
    List,
    Plan,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };

    let id_arg = |what: &str| -> Result<String> {
        if rest.is_empty() {
            bail!("usage: {what} <id>");
        }
        Ok(rest.to_string())
    };

    match verb.to_ascii_lowercase().as_str() {
        "add" if rest.is_empty() => Ok(Command::AddPrompted),
        "add" => {
            let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
            let [name, hardness, free_start, free_end, deadline] = parts.as_slice() else {
                bail!("usage: add <name> | <hardness> | <free start> | <free end> | <deadline>");
            };
            Ok(Command::Add {
                name: name.to_string(),
                hardness: hardness.parse()?,
                free_start: free_start.to_string(),
                free_end: free_end.to_string(),
                deadline: deadline.to_string(),
            })
        }
        "done" | "complete" => Ok(Command::Done(id_arg("done")?)),
        "undo" => Ok(Command::Undo(id_arg("undo")?)),
        "rm" | "delete" => Ok(Command::Remove(id_arg("rm")?)),
        "rename" => {
            let (id, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: rename <id> <new name>"))?;
            Ok(Command::Rename {
                id: id.to_string(),
                name: name.trim().to_string(),
            })
        }
        "list" | "ls" => Ok(Command::List),
        "plan" | "schedule" => Ok(Command::Plan),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "" => Ok(Command::Help),
        other => bail!("unknown command '{other}' (try: help)"),
    }
}

pub struct Session {
    book: TaskBook,
    cfg: Config,
    tz: Tz,
    fixed_now: Option<DateTime<Utc>>,
    rng: SmallRng,
}

impl Session {
    pub fn new(cfg: Config, fixed_now: Option<DateTime<Utc>>, seed: Option<u64>) -> Result<Self> {
        cfg.validate()?;
        let tz = cfg.timezone()?;
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            book: TaskBook::new(),
            cfg,
            tz,
            fixed_now,
            rng,
        })
    }

    pub fn book(&self) -> &TaskBook {
        &self.book
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    pub fn run(&mut self, mut input: impl BufRead, out: &mut impl Write) -> Result<()> {
        writeln!(out, "Study planner session. Type 'help' for commands.")?;
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = read_line(&mut input)? else { break };
            let cmd = match parse_command(&line) {
                Ok(c) => c,
                Err(e) => {
                    writeln!(out, "error: {e:#}")?;
                    continue;
                }
            };
            if cmd == Command::Quit {
                break;
            }
            if let Err(e) = self.apply(cmd, &mut input, out) {
                writeln!(out, "error: {e:#}")?;
            }
        }
        writeln!(out, "Session ended; {} task(s) discarded.", self.book.len())?;
        Ok(())
    }

    pub fn apply(&mut self, cmd: Command, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
        debug!(?cmd, "session command");
        match cmd {
            Command::AddPrompted => {
                let id = self.add_prompted(input, out)?;
                writeln!(out, "Task added: {id}")?;
                self.refresh(out)
            }
            Command::Add {
                name,
                hardness,
                free_start,
                free_end,
                deadline,
            } => {
                let free_start = parse_local_to_utc(&free_start, self.tz).context("free start")?;
                let free_end = parse_local_to_utc(&free_end, self.tz).context("free end")?;
                let deadline = parse_local_to_utc(&deadline, self.tz).context("deadline")?;
                let id = self.book.add_task(name, hardness, free_start, free_end, deadline);
                writeln!(out, "Task added: {id}")?;
                self.refresh(out)
            }
            Command::Done(id) => {
                self.book.mark_completed(&id)?;
                self.refresh(out)
            }
            Command::Undo(id) => {
                self.book.mark_pending(&id)?;
                self.refresh(out)
            }
            Command::Remove(id) => {
                let t = self.book.delete_task(&id)?;
                writeln!(out, "Deleted {} ({})", t.id, t.name)?;
                self.refresh(out)
            }
            Command::Rename { id, name } => {
                self.book.rename_task(&id, name)?;
                self.refresh(out)
            }
            Command::List => render_tasks(out, self.book.tasks(), self.tz),
            Command::Plan => self.refresh(out),
            Command::Help => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    /// Rebuild the schedule and show it along with any reminders due now.
    pub fn refresh(&mut self, out: &mut impl Write) -> Result<()> {
        let now = self.now();
        if self.book.is_empty() {
            writeln!(out, "Add tasks to generate a schedule")?;
            return Ok(());
        }
        let opts = self.cfg.schedule_options(now)?;
        let schedule = self.book.get_schedule_with_rng(now, &opts, &mut self.rng);

        writeln!(out)?;
        if self.cfg.reminders.enabled {
            let reminders = self
                .book
                .get_reminders(&schedule, now, self.tz, self.cfg.reminder_policy()?);
            render_reminders(out, &reminders)?;
        }
        render_schedule(out, &schedule, now, self.tz)
    }

    fn add_prompted(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> Result<String> {
        let today = local_date(self.now(), self.tz);

        let name = prompt(input, out, "Task name", "")?;
        let hardness: Hardness = prompt(input, out, "Difficulty (easy/medium/hard)", "easy")?.parse()?;
        let free_date = prompt_date(input, out, "Free time date", today)?;
        let start = prompt_clock(input, out, "Free start", "09:00")?;
        let end = prompt_clock(input, out, "Free end", "12:00")?;
        let due_date = prompt_date(input, out, "Deadline date", today)?;
        let due_time = prompt_clock(input, out, "Deadline time", "18:00")?;

        let local = |d: NaiveDate, t: NaiveTime| {
            let s = d.and_time(t).format(LOCAL_DATETIME_FORMAT).to_string();
            parse_local_to_utc(&s, self.tz)
        };
        let free_start = local(free_date, start).context("free start")?;
        let free_end = local(free_date, end).context("free end")?;
        let deadline = local(due_date, due_time).context("deadline")?;

        Ok(self.book.add_task(name, hardness, free_start, free_end, deadline))
    }
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut s = String::new();
    let n = input.read_line(&mut s).context("read stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(s.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        write!(out, "{label}: ")?;
    } else {
        write!(out, "{label} [{default}]: ")?;
    }
    out.flush()?;
    let line = read_line(input)?.ok_or_else(|| anyhow!("input closed"))?;
    let line = line.trim();
    Ok(if line.is_empty() { default.to_string() } else { line.to_string() })
}

fn prompt_date(input: &mut impl BufRead, out: &mut impl Write, label: &str, default: NaiveDate) -> Result<NaiveDate> {
    let s = prompt(input, out, label, &default.format("%Y-%m-%d").to_string())?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| format!("{label}: '{s}' is not YYYY-MM-DD"))
}

fn prompt_clock(input: &mut impl BufRead, out: &mut impl Write, label: &str, default: &str) -> Result<NaiveTime> {
    let s = prompt(input, out, label, default)?;
    Ok(parse_clock(&s).with_context(|| label.to_string())?)
}
