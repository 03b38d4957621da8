use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use studyplan_core::time::parse_local_to_utc;
use studyplan_core::{PlacementMode, RankingPolicy};
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;
mod session;
mod state;

use config::{Config, load_config};

#[derive(Parser, Debug)]
#[command(name = "studyplan", version, about = "Study task planner: rank tasks and time-block your day")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session: add tasks, mark them done, watch the schedule update
    Session {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Schedule a batch of tasks from a JSON file and print the plan
    Plan {
        /// JSON array of {name, hardness, free_start, free_end, deadline[, completed]}
        #[arg(long)]
        tasks: PathBuf,

        /// Print the schedule as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write default ~/.studyplan/config.toml if missing
    Init,
    /// Print the effective config
    Show,
}

/// Per-invocation overrides of config.toml.
#[derive(Args, Debug)]
struct Overrides {
    /// Pretend the current time is this local time ("YYYY-MM-DD HH:MM")
    #[arg(long)]
    now: Option<String>,

    /// IANA timezone, e.g. America/Chicago
    #[arg(long)]
    tz: Option<String>,

    /// Local "HH:MM" the day's schedule starts at
    #[arg(long)]
    day_start: Option<String>,

    /// Break between tasks, in minutes
    #[arg(long)]
    break_minutes: Option<i64>,

    #[arg(long, value_enum)]
    ranking: Option<RankingArg>,

    #[arg(long, value_enum)]
    placement: Option<PlacementArg>,

    /// Skip tasks whose greedy slot would run past their free window
    #[arg(long, default_value_t = false)]
    clip: bool,

    /// Reminder lead time in minutes (1-120)
    #[arg(long)]
    lead_minutes: Option<i64>,

    #[arg(long, default_value_t = false)]
    no_reminders: bool,

    /// Seed for random-window placement
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RankingArg {
    PriorityScore,
    HardnessThenDeadline,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlacementArg {
    Greedy,
    RandomWindow,
}

impl From<RankingArg> for RankingPolicy {
    fn from(r: RankingArg) -> Self {
        match r {
            RankingArg::PriorityScore => RankingPolicy::PriorityScore,
            RankingArg::HardnessThenDeadline => RankingPolicy::HardnessThenDeadline,
        }
    }
}

impl From<PlacementArg> for PlacementMode {
    fn from(p: PlacementArg) -> Self {
        match p {
            PlacementArg::Greedy => PlacementMode::Greedy,
            PlacementArg::RandomWindow => PlacementMode::RandomWindow,
        }
    }
}

impl Overrides {
    fn apply(&self, mut cfg: Config) -> Result<Config> {
        if let Some(tz) = &self.tz {
            cfg.schedule.timezone = tz.clone();
        }
        if let Some(d) = &self.day_start {
            cfg.schedule.day_start = d.clone();
        }
        if let Some(b) = self.break_minutes {
            cfg.schedule.break_minutes = b;
        }
        if let Some(r) = self.ranking {
            cfg.schedule.ranking = r.into();
        }
        if let Some(p) = self.placement {
            cfg.schedule.placement = p.into();
        }
        if self.clip {
            cfg.schedule.clip_to_window = true;
        }
        if let Some(l) = self.lead_minutes {
            cfg.reminders.lead_minutes = l;
        }
        if self.no_reminders {
            cfg.reminders.enabled = false;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn fixed_now(&self, cfg: &Config) -> Result<Option<DateTime<Utc>>> {
        let Some(s) = &self.now else { return Ok(None) };
        let utc = parse_local_to_utc(s, cfg.timezone()?).context("--now")?;
        Ok(Some(utc))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STUDYPLAN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Session { overrides } => {
            let cfg = overrides.apply(load_config()?)?;
            let now = overrides.fixed_now(&cfg)?;
            let mut s = session::Session::new(cfg, now, overrides.seed)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            s.run(stdin.lock(), &mut stdout)?;
        }

        Command::Plan {
            tasks,
            json,
            overrides,
        } => {
            let cfg = overrides.apply(load_config()?)?;
            let now = overrides.fixed_now(&cfg)?.unwrap_or_else(Utc::now);
            plan(&cfg, &tasks, now, json, overrides.seed)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn plan(cfg: &Config, path: &Path, now: DateTime<Utc>, json: bool, seed: Option<u64>) -> Result<()> {
    let tz = cfg.timezone()?;
    let rows = input::read_task_file(path)?;
    let (book, rejected) = input::load_rows(&rows, tz);

    let opts = cfg.schedule_options(now)?;
    let mut rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let mut schedule = book.get_schedule_with_rng(now, &opts, &mut rng);
    // rows that never made it into the book come first
    schedule.skipped = rejected.into_iter().chain(std::mem::take(&mut schedule.skipped)).collect();

    let reminders = if cfg.reminders.enabled {
        book.get_reminders(&schedule, now, tz, cfg.reminder_policy()?)
    } else {
        Vec::new()
    };

    let mut out = io::stdout().lock();
    if json {
        let doc = serde_json::json!({
            "generated_at": now,
            "timezone": tz.name(),
            "schedule": schedule,
            "reminders": reminders,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        return Ok(());
    }

    writeln!(out, "# Study plan\n")?;
    writeln!(out, "Tasks file: {} ({} rows)\n", path.display(), rows.len())?;
    render::render_reminders(&mut out, &reminders)?;
    render::render_schedule(&mut out, &schedule, now, tz)?;
    Ok(())
}
