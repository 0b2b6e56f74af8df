//! # CLI Behavior
//!
//! This is **one possible client** for tabdesk, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the `tabdeskapp` crate documentation.
//!
//! ## Naked Execution (`tabdesk`)
//!
//! Running `tabdesk` with no arguments shows today's agenda: what is overdue,
//! what is due today, and what comes next. Checking what to revise is most of
//! the usage, so it is the path of least resistance.
//!
//! ## Chapter Selectors
//!
//! Commands that act on chapters take ids as shown by `tabdesk chapters`:
//! `4`, `#4`, or a range such as `3-7`. Several selectors may be mixed.
//!
//! ## Output
//!
//! Text output is colored when stdout is a terminal. `--json` prints the full
//! command result instead, for scripts. Warnings about storage (for example a
//! read-only data directory) appear as yellow messages; the command still
//! succeeds and the change lives until the process exits.
//!
//! ## Module Structure
//!
//! - `commands`: Context wiring and per-command handlers that call the API
//! - `render`: Output formatting (chapter rows, agenda, progress bars, messages)
//! - `setup`: Argument parsing via clap
//! - `styles`: Named terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
