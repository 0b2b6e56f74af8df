//! Named styles for terminal output.
//!
//! Renderers ask for a style by what the text *is* (an id, a subject heading,
//! an overdue date) and this module decides how it looks. Changing the palette
//! means touching this file only.

use colored::{ColoredString, Colorize};
use tabdeskapp::commands::MessageLevel;
use tabdeskapp::repository::ProgressBand;

pub fn id(text: &str) -> ColoredString {
    text.yellow()
}

pub fn heading(text: &str) -> ColoredString {
    text.bold()
}

pub fn done(text: &str) -> ColoredString {
    text.green()
}

pub fn muted(text: &str) -> ColoredString {
    text.dimmed()
}

pub fn overdue(text: &str) -> ColoredString {
    text.red()
}

pub fn today(text: &str) -> ColoredString {
    text.cyan().bold()
}

pub fn band(band: ProgressBand, text: &str) -> ColoredString {
    match band {
        ProgressBand::Low => text.red(),
        ProgressBand::Medium => text.yellow(),
        ProgressBand::High => text.green(),
    }
}

pub fn message(level: MessageLevel, text: &str) -> ColoredString {
    match level {
        MessageLevel::Info => text.dimmed(),
        MessageLevel::Success => text.green(),
        MessageLevel::Warning => text.yellow(),
        MessageLevel::Error => text.red(),
    }
}
