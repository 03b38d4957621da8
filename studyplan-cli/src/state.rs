use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$STUDYPLAN_HOME`, or `~/.studyplan`.
pub fn studyplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STUDYPLAN_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".studyplan"))
}

pub fn ensure_studyplan_home() -> Result<PathBuf> {
    let dir = studyplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
