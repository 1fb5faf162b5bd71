//! Scheduler settings, persisted as JSON in the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::schedule::MilestoneProgress;

/// Tunables for the scheduling facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Whether milestones are averaged into project progress.
    pub milestone_progress: MilestoneProgress,
    /// Write per-task slack back into child tasks after each change.
    pub compute_slack: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            milestone_progress: MilestoneProgress::Exclude,
            compute_slack: true,
        }
    }
}

impl SchedulerConfig {
    /// Location of `settings.json`, falling back to the working directory
    /// when the platform has no config directory.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "GanttScheduler")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from `path` if given, else from [`SchedulerConfig::default_path`].
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(&Self::default_path()),
        }
    }
}
