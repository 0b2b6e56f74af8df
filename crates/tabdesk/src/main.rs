//! # Tabdesk CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/tabdeskapp/`: Core library with UI-agnostic persistence and scheduling
//! - `crates/tabdesk/`: This CLI tool, depends on the `tabdeskapp` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/tabdesk/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal rendering with colored (render.rs, styles.rs)   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/tabdeskapp/src/api.rs)                   │
//! │  - Normalizes chapter selectors ("3-5") into ids            │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors that reach `main` are printed to stderr and exit with status 1.
//! Recoverable problems (a chapter id that does not exist, a failed save) are
//! messages on the result and do not change the exit status.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
