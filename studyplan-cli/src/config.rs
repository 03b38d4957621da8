use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use studyplan_core::time::{day_anchor, parse_clock, parse_timezone};
use studyplan_core::{PlacementMode, RankingPolicy, ReminderPolicy, ScheduleOptions};

use crate::state::{ensure_studyplan_home, studyplan_home};

/// One day. Longer breaks would push every later task off the plan.
pub const MAX_BREAK_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schedule: ScheduleSection,
    pub reminders: ReminderSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    /// IANA timezone used for "today", the day anchor and display.
    pub timezone: String,
    /// "HH:MM" local; the greedy cursor starts here.
    pub day_start: String,
    pub break_minutes: i64,
    pub ranking: RankingPolicy,
    pub placement: PlacementMode,
    pub clip_to_window: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSection {
    pub enabled: bool,
    pub lead_minutes: i64,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            day_start: "09:00".to_string(),
            break_minutes: 15,
            ranking: RankingPolicy::PriorityScore,
            placement: PlacementMode::Greedy,
            clip_to_window: false,
        }
    }
}

impl Default for ReminderSection {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_minutes: 15,
        }
    }
}

impl Config {
    /// Reject settings the scheduler would choke on, before any task is touched.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        parse_clock(&self.schedule.day_start).context("[schedule].day_start")?;
        if !(0..=MAX_BREAK_MINUTES).contains(&self.schedule.break_minutes) {
            bail!(
                "[schedule].break_minutes must be between 0 and {MAX_BREAK_MINUTES} (got {})",
                self.schedule.break_minutes
            );
        }
        self.reminder_policy()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.schedule.timezone).context("[schedule].timezone")
    }

    pub fn reminder_policy(&self) -> Result<ReminderPolicy> {
        ReminderPolicy::new(self.reminders.lead_minutes).context("[reminders].lead_minutes")
    }

    pub fn schedule_options(&self, now: DateTime<Utc>) -> Result<ScheduleOptions> {
        let tz = self.timezone()?;
        let clock = parse_clock(&self.schedule.day_start).context("[schedule].day_start")?;
        let day_start = day_anchor(now, tz, clock).context("resolving day start")?;
        let break_duration = Duration::try_minutes(self.schedule.break_minutes)
            .with_context(|| format!("[schedule].break_minutes out of range: {}", self.schedule.break_minutes))?;
        Ok(ScheduleOptions::new(day_start)
            .with_break(break_duration)
            .with_ranking(self.schedule.ranking)
            .with_placement(self.schedule.placement)
            .with_clip_to_window(self.schedule.clip_to_window))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(studyplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_studyplan_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    let p = config_path()?;
    let source = if p.exists() { p.display().to_string() } else { "(defaults)".to_string() };
    println!("# {source}");
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    if let Err(e) = cfg.validate() {
        println!("\n# warning: {e:#}");
    }
    Ok(())
}
