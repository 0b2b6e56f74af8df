//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It serves as the single
//! entry point for all tabdesk operations, regardless of the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** every store, opened on one shared [`StorageBackend`]
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (e.g., expanding `"1-3"` into chapter ids)
//! - **Supplies the clock**, so commands never read the system time themselves
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs` and the domain modules
//! - **I/O to the terminal**: No stdout or stderr
//! - **Presentation concerns**: Returns data structures, not strings
//!
//! ## Chapter Selectors
//!
//! Lifecycle commands accept several chapter ids at once:
//!
//! - **Single id**: `N` or `#N` (e.g., `4`, `#12`)
//! - **Ranges**: `Start-End` (e.g., `3-7`), start must be ≤ end
//!
//! Ids are deduplicated while preserving order.
//!
//! ## Opening
//!
//! [`DeskApi::open`] opens every store and seeds the chapter collection, so a
//! fresh data directory is immediately usable. What seeding did is kept in
//! [`DeskApi::startup`] for the UI to report.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `DeskApi<FsBackend>`
//! - Testing: `DeskApi<MemBackend>`

use crate::commands::{self, CmdResult};
use crate::config::DeskConfig;
use crate::countdown::{self, Countdown};
use crate::error::{DeskError, Result};
use crate::fetch::{HttpTransport, MediaFetcher, Transport};
use crate::layout::WidgetLayout;
use crate::media::MediaVault;
use crate::model::{ChapterId, MediaKind, Position, Size};
use crate::repository::{ChapterRepository, RepositoryOptions};
use crate::schedule::ScheduleEngine;
use crate::settings::{Settings, SettingsService, SubscriptionId};
use crate::store::StorageBackend;
use crate::syllabus;
use crate::todos::TodoList;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::warn;

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// The main API facade for tabdesk operations.
pub struct DeskApi<B: StorageBackend> {
    config: DeskConfig,
    location: String,
    chapters: ChapterRepository<B>,
    settings: SettingsService<B>,
    layout: WidgetLayout<B>,
    todos: TodoList<B>,
    vault: MediaVault<B>,
    fetcher: MediaFetcher<Box<dyn Transport>>,
    countdowns: Vec<Countdown>,
    clock: Clock,
    startup: CmdResult,
}

impl<B: StorageBackend> DeskApi<B> {
    /// Open every store on `backend` and seed the built-in syllabus.
    pub fn open(backend: B, config: DeskConfig) -> Result<Self> {
        let engine = ScheduleEngine::new(config.utc_offset()?);
        let options = RepositoryOptions {
            initial_revisions: config.initial_revisions,
            reseed_policy: config.reseed_policy,
            revert_policy: config.revert_policy,
        };
        let syllabus = syllabus::builtin();
        let mut chapters =
            ChapterRepository::open(backend.clone(), engine, options, syllabus.clone())?;
        let startup = commands::chapters::seed(&mut chapters, syllabus)?;

        let transport: Box<dyn Transport> = Box::new(HttpTransport::new(config.fetch_timeout())?);
        Ok(Self {
            location: backend.location(),
            settings: SettingsService::load(backend.clone())?,
            layout: WidgetLayout::new(backend.clone(), config.debounce()),
            todos: TodoList::new(backend.clone()),
            vault: MediaVault::new(backend),
            fetcher: MediaFetcher::new(transport, config.proxy_url.clone()),
            countdowns: countdown::builtin(),
            clock: Box::new(Utc::now),
            chapters,
            config,
            startup,
        })
    }

    /// Replace the system clock.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the HTTP transport used for wallpaper downloads.
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.fetcher = MediaFetcher::new(Box::new(transport), self.config.proxy_url.clone());
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// What opening did: seeding messages and any storage warnings.
    pub fn startup(&self) -> &CmdResult {
        &self.startup
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// True when any store is running on its in-memory overlay.
    pub fn is_degraded(&self) -> bool {
        self.chapters.is_degraded()
            || self.settings.is_degraded()
            || self.layout.is_degraded()
            || self.todos.is_degraded()
    }

    // --- Chapters ---

    pub fn list_chapters(&self, query: &commands::chapters::ChapterQuery) -> Result<CmdResult> {
        commands::chapters::list(&self.chapters, query)
    }

    pub fn search_chapters(&self, term: &str) -> Result<CmdResult> {
        commands::chapters::search(&self.chapters, term)
    }

    pub fn progress(
        &self,
        class_label: Option<&str>,
        subject_name: Option<&str>,
    ) -> Result<CmdResult> {
        commands::chapters::progress(&self.chapters, class_label, subject_name)
    }

    pub fn seed(&mut self) -> Result<CmdResult> {
        commands::chapters::seed(&mut self.chapters, syllabus::builtin())
    }

    pub fn agenda(&self) -> Result<CmdResult> {
        commands::agenda::run(&self.chapters, self.now())
    }

    pub fn complete_chapters<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let ids = parse_ids(selectors)?;
        let now = self.now();
        commands::study::mark_complete(&mut self.chapters, &ids, now)
    }

    /// Complete the revision due on `day` (`None` means today).
    pub fn revise_chapters<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        day: Option<chrono::NaiveDate>,
    ) -> Result<CmdResult> {
        let ids = parse_ids(selectors)?;
        let now = self.now();
        let day = day.unwrap_or_else(|| self.chapters.engine().calendar_day(now));
        commands::study::complete_revision(
            &mut self.chapters,
            &ids,
            commands::study::RevisionTarget::Day(day),
            now,
        )
    }

    pub fn revert_chapters<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let ids = parse_ids(selectors)?;
        commands::study::revert(&mut self.chapters, &ids)
    }

    pub fn reset_all(&mut self) -> Result<CmdResult> {
        commands::study::reset_all(&mut self.chapters)
    }

    pub fn add_chapters<S: AsRef<str>>(
        &mut self,
        class_label: &str,
        subject_name: &str,
        names: &[S],
    ) -> Result<CmdResult> {
        commands::study::add(&mut self.chapters, class_label, subject_name, names)
    }

    pub fn delete_chapters<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let ids = parse_ids(selectors)?;
        commands::study::delete(&mut self.chapters, &ids)
    }

    pub fn rename_chapter(&mut self, selector: &str, name: &str) -> Result<CmdResult> {
        let ids = parse_ids(&[selector])?;
        match ids.as_slice() {
            [id] => commands::study::rename(&mut self.chapters, *id, name),
            _ => Err(DeskError::InvalidInput(
                "rename takes exactly one chapter".to_string(),
            )),
        }
    }

    // --- Settings ---

    pub fn settings(&self) -> Result<CmdResult> {
        commands::settings::show(&self.settings)
    }

    pub fn set_setting(&mut self, key: &str, raw: &str) -> Result<CmdResult> {
        commands::settings::set(&mut self.settings, key, raw)
    }

    pub fn toggle_setting(&mut self, key: &str) -> Result<CmdResult> {
        commands::settings::toggle(&mut self.settings, key)
    }

    pub fn reset_settings(&mut self) -> Result<CmdResult> {
        commands::settings::reset(&mut self.settings)
    }

    /// Re-read settings written by another process.
    pub fn sync_settings(&mut self) -> Result<bool> {
        self.settings.sync()
    }

    pub fn subscribe_settings<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Settings) + 'static,
    {
        self.settings.subscribe(listener)
    }

    pub fn unsubscribe_settings(&mut self, id: SubscriptionId) -> bool {
        self.settings.unsubscribe(id)
    }

    // --- Wallpaper ---

    pub fn wallpaper(&self) -> Result<CmdResult> {
        commands::wallpaper::show(&self.vault)
    }

    pub fn set_wallpaper_file(&self, path: &Path, kind: Option<MediaKind>) -> Result<CmdResult> {
        commands::wallpaper::set_file(&self.vault, path, kind)
    }

    pub fn fetch_wallpaper(&self, url: &str, kind: MediaKind) -> Result<CmdResult> {
        commands::wallpaper::fetch(&self.vault, &self.fetcher, url, kind)
    }

    pub fn clear_wallpaper(&self) -> Result<CmdResult> {
        commands::wallpaper::clear(&self.vault)
    }

    pub fn export_wallpaper(&self, path: &Path) -> Result<CmdResult> {
        commands::wallpaper::export(&self.vault, path)
    }

    // --- Widgets ---

    pub fn widget(&self, widget: &str) -> Result<CmdResult> {
        commands::widget::show(&self.layout, widget)
    }

    pub fn move_widget(&mut self, widget: &str, position: Position) -> Result<CmdResult> {
        commands::widget::move_to(&mut self.layout, widget, position)
    }

    pub fn resize_widget(&mut self, widget: &str, size: Size) -> Result<CmdResult> {
        commands::widget::resize(&mut self.layout, widget, size)
    }

    pub fn style_widget(&mut self, widget: &str, raw: &str) -> Result<CmdResult> {
        commands::widget::style(&mut self.layout, widget, raw)
    }

    pub fn reset_widget(&mut self, widget: &str, everything: bool) -> Result<CmdResult> {
        commands::widget::reset(&mut self.layout, widget, everything)
    }

    /// Record a drag step. Only the last one per widget is written, once idle.
    pub fn drag_widget(&mut self, widget: &str, position: Position, at: Instant) -> Result<usize> {
        self.layout.schedule_position(widget, position, at);
        self.layout.write_due(at)
    }

    /// Write every pending layout change now.
    pub fn flush_layout(&mut self) -> Result<usize> {
        self.layout.flush()
    }

    // --- Todos ---

    pub fn todos(&self) -> Result<CmdResult> {
        commands::todo::list(&self.todos)
    }

    pub fn add_todo(&mut self, text: &str) -> Result<CmdResult> {
        let now = self.now();
        commands::todo::add(&mut self.todos, text, now)
    }

    pub fn toggle_todos(&mut self, ids: &[i64]) -> Result<CmdResult> {
        commands::todo::toggle(&mut self.todos, ids)
    }

    pub fn remove_todos(&mut self, ids: &[i64]) -> Result<CmdResult> {
        commands::todo::remove(&mut self.todos, ids)
    }

    pub fn clear_done_todos(&mut self) -> Result<CmdResult> {
        commands::todo::clear_done(&mut self.todos)
    }

    // --- Misc ---

    pub fn countdowns(&self) -> Result<CmdResult> {
        commands::countdown::run(&self.countdowns, self.now(), self.chapters.engine().offset())
    }

    pub fn config_action(&self, action: commands::config::ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.config, action)
    }
}

impl<B: StorageBackend> Drop for DeskApi<B> {
    fn drop(&mut self) {
        if let Err(e) = self.layout.flush() {
            warn!(error = %e, "pending layout changes were not saved");
        }
    }
}

/// Expand chapter selectors (`4`, `#4`, `3-7`) into unique ids, in order.
pub fn parse_ids<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<ChapterId>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for input in inputs {
        for id in parse_selector(input.as_ref())? {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }
    if ids.is_empty() {
        return Err(DeskError::InvalidInput("no chapter ids given".to_string()));
    }
    Ok(ids)
}

fn parse_selector(s: &str) -> Result<Vec<ChapterId>> {
    let invalid = || DeskError::InvalidInput(format!("invalid chapter id: {}", s));
    let s = s.trim();
    match s.split_once('-') {
        Some((start, end)) if !start.is_empty() => {
            let start: ChapterId = start.parse().map_err(|_| invalid())?;
            let end: ChapterId = end.parse().map_err(|_| invalid())?;
            if start > end {
                return Err(DeskError::InvalidInput(format!(
                    "Invalid range: {} is after {}",
                    start, end
                )));
            }
            Ok((start.0..=end.0).map(ChapterId).collect())
        }
        _ => Ok(vec![s.parse().map_err(|_| invalid())?]),
    }
}
