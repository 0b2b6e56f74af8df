//! # Command Layer
//!
//! This module contains the **policy** of tabdesk: each command calls into the
//! repository or one of the stores and turns the outcome into a [`CmdResult`].
//!
//! ## Role and Responsibilities
//!
//! Commands:
//! - Call the domain layer (`repository`, `settings`, `layout`, `todos`, `media`)
//! - Return the refreshed state the UI should show
//! - Translate recoverable failures into leveled messages
//! - Are completely UI-agnostic
//!
//! ## Error Policy
//!
//! | Error | Handling |
//! |-------|----------|
//! | `StorageUnavailable` | Warning; the in-memory overlay is still returned |
//! | `RecordNotFound` | Warning naming the stale id |
//! | `RevisionNotScheduled` | Warning, nothing written |
//! | anything else | Propagated as `Err` |
//!
//! So a command only fails outright for input it cannot make sense of, or for
//! storage that cannot even be read.
//!
//! ## Testing Strategy
//!
//! Command tests use [`crate::store::MemBackend`] to avoid filesystem dependencies
//! and check both the returned state and the messages.
//!
//! ## Command Modules
//!
//! - [`chapters`]: Listing, search, progress and seeding
//! - [`study`]: Chapter lifecycle (complete, revise, revert, reset, add, delete, rename)
//! - [`agenda`]: Today / upcoming / overdue revisions
//! - [`settings`]: General settings
//! - [`wallpaper`]: Wallpaper storage and download
//! - [`widget`]: Widget placement and style
//! - [`todo`]: The to-do list
//! - [`countdown`]: Exam countdowns
//! - [`config`]: Effective configuration

use crate::config::DeskConfig;
use crate::countdown::Remaining;
use crate::error::{DeskError, Result};
use crate::model::{Chapter, ChapterId, MediaKind, Position, Size, Todo};
use crate::repository::{Progress, SeedOutcome};
use crate::schedule::RevisionAgenda;
use crate::settings::Settings;
use serde::Serialize;
use serde_json::Value;

pub mod agenda;
pub mod chapters;
pub mod config;
pub mod countdown;
pub mod settings;
pub mod study;
pub mod todo;
pub mod wallpaper;
pub mod widget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Progress of one subject within one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub class_label: String,
    pub subject_name: String,
    #[serde(flatten)]
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WallpaperInfo {
    pub kind: MediaKind,
    pub bytes: usize,
    pub mime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub widget: String,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub style: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownView {
    pub title: String,
    pub key: String,
    pub target: String,
    pub remaining: Option<Remaining>,
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    /// The chapters to show (the full refreshed collection, or a filtered view of it).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<Chapter>,
    /// Chapters changed by this command, as stored after the change.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<Chapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<RevisionAgenda>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<ProgressReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallpaper: Option<WallpaperInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<Todo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub countdowns: Vec<CountdownView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<DeskConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_chapters(mut self, chapters: Vec<Chapter>) -> Self {
        self.chapters = chapters;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = todos;
        self
    }

    pub fn with_config(mut self, config: DeskConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Fill `affected` from `chapters` by id.
    pub(crate) fn collect_affected(&mut self, ids: &[ChapterId]) {
        self.affected = self
            .chapters
            .iter()
            .filter(|c| c.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect();
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}

/// Turn a recoverable error into a warning on `result`; anything else is returned.
pub(crate) fn recover(result: &mut CmdResult, err: DeskError, noun: &str) -> Result<()> {
    match err {
        DeskError::StorageUnavailable(reason) => {
            result.add_message(CmdMessage::warning(format!(
                "Could not save, changes are kept for this session only ({})",
                reason
            )));
            Ok(())
        }
        DeskError::RecordNotFound(id) => {
            result.add_message(CmdMessage::warning(format!("{} #{} not found", noun, id)));
            Ok(())
        }
        DeskError::RevisionNotScheduled { id, day } => {
            result.add_message(CmdMessage::warning(format!(
                "{} #{} has no revision scheduled on {}",
                noun, id, day
            )));
            Ok(())
        }
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn storage_failures_become_warnings() {
        let mut result = CmdResult::default();
        recover(
            &mut result,
            DeskError::StorageUnavailable("disk full".into()),
            "Chapter",
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.messages[0].content.contains("disk full"));
    }

    #[test]
    fn stale_ids_become_warnings() {
        let mut result = CmdResult::default();
        recover(&mut result, DeskError::RecordNotFound(7), "Chapter").unwrap();
        recover(
            &mut result,
            DeskError::RevisionNotScheduled {
                id: 7,
                day: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            },
            "Chapter",
        )
        .unwrap();
        assert_eq!(result.messages[0].content, "Chapter #7 not found");
        assert!(result.messages[1].content.contains("2026-03-01"));
        assert!(result.has_warnings());
    }

    #[test]
    fn other_errors_propagate() {
        let mut result = CmdResult::default();
        let err = recover(
            &mut result,
            DeskError::InvalidInput("bad".into()),
            "Chapter",
        )
        .unwrap_err();
        assert!(matches!(err, DeskError::InvalidInput(_)));
        assert!(result.messages.is_empty());
    }
}
