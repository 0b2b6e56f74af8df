//! # Configuration
//!
//! Tabdesk configuration is loaded with [`confique`], layered from environment
//! variables, a TOML file and compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `TABDESK_DATA_DIR`, `TABDESK_UTC_OFFSET_MINUTES`, etc.
//! 2. **Config file**: `tabdesk.toml` in the OS config directory (via `directories`),
//!    or the file named by `TABDESK_CONFIG`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Root of collections, key/value files and media |
//! | `utc_offset_minutes` | local offset | Offset used to decide calendar days |
//! | `initial_revisions` | `4` | Revisions scheduled when a chapter is marked complete |
//! | `reseed_policy` | `wipe` | `wipe` or `merge` when the syllabus changes |
//! | `revert_policy` | `keep-count` | `keep-count` or `reset-count` on revert/reset |
//! | `proxy_url` | CORS worker | Fallback fetch URL, `{url}` is replaced |
//! | `fetch_timeout_secs` | `30` | HTTP request timeout |
//! | `debounce_ms` | `300` | Idle time before layout writes |

use crate::error::{DeskError, Result};
use chrono::{FixedOffset, Local, Offset};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROXY_URL: &str = "https://slave.ffdarkrayon.workers.dev/cors?url={url}";
pub const CONFIG_FILE_NAME: &str = "tabdesk.toml";

/// What to do when persisted seed chapters name a subject the syllabus no longer has.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReseedPolicy {
    /// Clear the collection and repopulate from the syllabus. Progress is lost.
    #[default]
    Wipe,
    /// Keep progress, drop orphaned seed chapters, add missing ones.
    Merge,
}

/// What happens to `totalRevisions` when a chapter goes back to unstarted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RevertPolicy {
    #[default]
    KeepCount,
    ResetCount,
}

impl fmt::Display for ReseedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReseedPolicy::Wipe => write!(f, "wipe"),
            ReseedPolicy::Merge => write!(f, "merge"),
        }
    }
}

impl fmt::Display for RevertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertPolicy::KeepCount => write!(f, "keep-count"),
            RevertPolicy::ResetCount => write!(f, "reset-count"),
        }
    }
}

/// Configuration for tabdesk, stored in `tabdesk.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeskConfig {
    /// Where tabdesk keeps its data. Defaults to the OS data directory.
    #[config(env = "TABDESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Minutes east of UTC used for calendar days. Defaults to the local offset.
    #[config(env = "TABDESK_UTC_OFFSET_MINUTES")]
    pub utc_offset_minutes: Option<i32>,

    #[config(default = 4, env = "TABDESK_INITIAL_REVISIONS")]
    pub initial_revisions: u32,

    #[config(default = "wipe", env = "TABDESK_RESEED_POLICY")]
    pub reseed_policy: ReseedPolicy,

    #[config(default = "keep-count", env = "TABDESK_REVERT_POLICY")]
    pub revert_policy: RevertPolicy,

    #[config(
        default = "https://slave.ffdarkrayon.workers.dev/cors?url={url}",
        env = "TABDESK_PROXY_URL"
    )]
    pub proxy_url: String,

    #[config(default = 30, env = "TABDESK_FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: u64,

    #[config(default = 300, env = "TABDESK_DEBOUNCE_MS")]
    pub debounce_ms: u64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            utc_offset_minutes: None,
            initial_revisions: 4,
            reseed_policy: ReseedPolicy::Wipe,
            revert_policy: RevertPolicy::KeepCount,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            fetch_timeout_secs: 30,
            debounce_ms: 300,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tabdesk")
}

/// `tabdesk.toml` in the OS config directory, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl DeskConfig {
    /// Load from the environment and `file` (a missing file is skipped).
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = DeskConfig::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        let config = builder.load()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that load fine but leave the desk in a broken state.
    pub fn validate(&self) -> Result<()> {
        if self.initial_revisions == 0 {
            return Err(DeskError::InvalidInput(
                "initial_revisions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".tabdesk"))
        })
    }

    /// Offset used to turn timestamps into calendar days.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
                DeskError::InvalidInput(format!("utc_offset_minutes out of range: {}", minutes))
            }),
            None => Ok(Local::now().offset().fix()),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeskConfig::default();
        assert_eq!(config.initial_revisions, 4);
        assert_eq!(config.reseed_policy, ReseedPolicy::Wipe);
        assert_eq!(config.revert_policy, RevertPolicy::KeepCount);
        assert!(config.proxy_url.contains("{url}"));
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_explicit_offset() {
        let config = DeskConfig {
            utc_offset_minutes: Some(330),
            ..Default::default()
        };
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn test_offset_out_of_range() {
        let config = DeskConfig {
            utc_offset_minutes: Some(24 * 60),
            ..Default::default()
        };
        assert!(config.utc_offset().is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = DeskConfig {
            data_dir: Some(PathBuf::from("/tmp/desk")),
            ..Default::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/desk"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "initial_revisions = 3\nreseed_policy = \"merge\"\nrevert_policy = \"reset-count\"\n",
        )
        .unwrap();

        let config = DeskConfig::load(Some(&path)).unwrap();
        assert_eq!(config.initial_revisions, 3);
        assert_eq!(config.reseed_policy, ReseedPolicy::Merge);
        assert_eq!(config.revert_policy, RevertPolicy::ResetCount);
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_zero_initial_revisions_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "initial_revisions = 0\n").unwrap();

        assert!(matches!(
            DeskConfig::load(Some(&path)),
            Err(DeskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_policies_display_like_config_values() {
        assert_eq!(ReseedPolicy::Merge.to_string(), "merge");
        assert_eq!(RevertPolicy::ResetCount.to_string(), "reset-count");
    }
}
