//! # Tabdesk Architecture
//!
//! Tabdesk is the **persistence and scheduling core of a study dashboard**: the
//! chapters a student works through, their spaced revisions, and the dashboard's
//! own state (settings, widget layout, wallpaper, to-dos). It is a library that
//! happens to have a CLI client, not the other way round.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (tabdesk crate)                                  │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns the stores and the clock │
//! │  - Normalizes inputs ("3-5" → chapter ids)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Turns domain outcomes into CmdResult + messages          │
//! │  - Absorbs recoverable storage failures as warnings         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain Layer                                               │
//! │  - repository + schedule: chapter lifecycle, revisions      │
//! │  - settings, layout, todos, media, fetch, countdown         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - RecordStore (id'd collections), KvStore (namespaces)     │
//! │  - StorageBackend: FsBackend (production), MemBackend       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Spaced Revisions
//!
//! Completing a chapter schedules a batch of revisions. After `n` revisions the
//! next one is `(n + 1)²` days out, pushed forward a day at a time until it lands
//! on a calendar day no other revision uses. See [`schedule`].
//!
//! ## Key Principle: Storage Is the Source of Truth
//!
//! Every mutation writes and then re-reads. What a caller gets back is what
//! storage holds, or, when a write failed, what the in-memory overlay holds for
//! the rest of the session. Nothing from `api.rs` inward writes to the terminal.
//!
//! ## Testing Strategy
//!
//! 1. **Domain and stores**: unit tests on [`store::MemBackend`], which can
//!    simulate write failures.
//! 2. **Commands**: result shape and message levels.
//! 3. **API**: dispatch, selectors and the injected clock.
//! 4. **Integration** (`tests/`): the same flows on a real [`store::FsBackend`].
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Per-area command functions
//! - [`repository`]: Chapter lifecycle, seeding and queries
//! - [`schedule`]: Revision spacing and the agenda
//! - [`settings`]: General settings with change notification
//! - [`layout`]: Widget placement with debounced writes
//! - [`todos`]: The to-do list
//! - [`media`]: Wallpaper slots
//! - [`fetch`]: Remote wallpaper download with proxy fallback
//! - [`countdown`]: Exam countdowns
//! - [`syllabus`]: The built-in chapter list
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod countdown;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod media;
pub mod model;
pub mod repository;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod syllabus;
pub mod todos;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
