//! # Rendering
//!
//! Turns a [`CmdResult`] into terminal text. Handlers pick a [`View`] that says
//! which part of the result matters for the command that ran, and [`render`]
//! formats that part followed by the result's messages.
//!
//! Everything here builds strings; printing happens in `commands.rs`. That keeps
//! the layout testable with colors switched off.
//!
//! ## Chapter Rows
//!
//! ```text
//!   12. ✓ Units and Measurements              3 left, next 2026-03-05
//! ```
//!
//! - index (right-aligned, `COL_INDEX` wide)
//! - status mark
//! - name, truncated to fit `LINE_WIDTH`
//! - revision status, right-aligned (`COL_STATUS` wide)

use super::styles;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use tabdeskapp::commands::{
    CmdMessage, CmdResult, CountdownView, ProgressReport, WallpaperInfo, WidgetView,
};
use tabdeskapp::model::{Chapter, Todo};
use tabdeskapp::schedule::{RevisionAgenda, RevisionEntry};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const COL_INDEX: usize = 6;
pub const COL_STATUS: usize = 28;
const BAR_WIDTH: usize = 20;

const MARK_DONE: &str = "✓";
const MARK_OPEN: &str = "·";

/// Which part of a result a command wants shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// `result.chapters`, grouped by subject.
    Chapters,
    /// `result.affected`, the chapters a mutation touched.
    Affected,
    Agenda,
    Progress,
    Settings,
    Wallpaper,
    Widget,
    Todos,
    Countdowns,
    Config,
    /// Only the messages.
    Messages,
}

pub fn render(result: &CmdResult, view: View, offset: FixedOffset) -> String {
    let mut out = match view {
        View::Chapters => render_chapters(&result.chapters, offset),
        View::Affected => render_chapters(&result.affected, offset),
        View::Agenda => result
            .agenda
            .as_ref()
            .map(|agenda| render_agenda(agenda, offset))
            .unwrap_or_default(),
        View::Progress => render_progress(&result.progress),
        View::Settings => result
            .settings
            .as_ref()
            .and_then(|s| serde_json::to_value(s).ok())
            .map(|v| render_pairs(&v))
            .unwrap_or_default(),
        View::Wallpaper => result
            .wallpaper
            .as_ref()
            .map(render_wallpaper)
            .unwrap_or_default(),
        View::Widget => result.widget.as_ref().map(render_widget).unwrap_or_default(),
        View::Todos => render_todos(&result.todos),
        View::Countdowns => render_countdowns(&result.countdowns),
        View::Config => result
            .config
            .as_ref()
            .and_then(|c| serde_json::to_value(c).ok())
            .map(|v| render_pairs(&v))
            .unwrap_or_default(),
        View::Messages => String::new(),
    };
    out.push_str(&render_messages(&result.messages));
    out
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}\n", styles::message(m.level, &m.content)))
        .collect()
}

pub fn render_chapters(chapters: &[Chapter], offset: FixedOffset) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for chapter in chapters {
        if current != Some(chapter.subject.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{}\n", styles::heading(&chapter.subject)));
            current = Some(&chapter.subject);
        }
        out.push_str(&chapter_row(chapter, offset));
        out.push('\n');
    }
    out
}

fn chapter_row(chapter: &Chapter, offset: FixedOffset) -> String {
    let index = format!("{}.", chapter.id_or_default());
    let index = format!("{:>width$} ", index, width = COL_INDEX - 1);
    let mark = if chapter.done {
        styles::done(MARK_DONE)
    } else {
        styles::muted(MARK_OPEN)
    };

    let status = revision_status(chapter, offset);
    let available = LINE_WIDTH.saturating_sub(COL_INDEX + 2 + COL_STATUS);
    let name = truncate_to_width(&chapter.name, available);
    let padding = available.saturating_sub(name.width());

    format!(
        "{}{} {}{}{}",
        styles::id(&index),
        mark,
        name,
        " ".repeat(padding),
        styles::muted(&format!("{:>width$}", status, width = COL_STATUS))
    )
}

fn revision_status(chapter: &Chapter, offset: FixedOffset) -> String {
    if !chapter.done {
        return String::new();
    }
    match chapter.revisions.iter().min() {
        Some(next) => format!(
            "{} left, next {}",
            chapter.revisions.len(),
            local_day(*next, offset)
        ),
        None => "all revised".to_string(),
    }
}

fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%Y-%m-%d").to_string()
}

pub fn render_agenda(agenda: &RevisionAgenda, offset: FixedOffset) -> String {
    let mut out = String::new();
    let sections: [(&str, &[RevisionEntry], fn(&str) -> colored::ColoredString); 3] = [
        ("Overdue", agenda.overdue.as_slice(), styles::overdue),
        ("Today", agenda.today.as_slice(), styles::today),
        ("Upcoming", agenda.upcoming.as_slice(), styles::muted),
    ];
    for (title, entries, paint) in sections {
        if entries.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}\n", styles::heading(title)));
        for entry in entries {
            let index = format!("{:>width$} ", format!("{}.", entry.chapter_id), width = COL_INDEX - 1);
            out.push_str(&format!(
                "{}{}  {} {}\n",
                styles::id(&index),
                paint(&local_day(entry.due, offset)),
                entry.name,
                styles::muted(&format!("({})", entry.subject))
            ));
        }
    }
    out
}

pub fn render_progress(reports: &[ProgressReport]) -> String {
    let label_width = reports
        .iter()
        .map(|r| r.subject_name.width())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for report in reports {
        if current != Some(report.class_label.as_str()) {
            out.push_str(&format!("{}\n", styles::heading(&report.class_label)));
            current = Some(&report.class_label);
        }
        let p = &report.progress;
        let filled = (p.percent as usize * BAR_WIDTH) / 100;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
        let padding = label_width.saturating_sub(report.subject_name.width());
        out.push_str(&format!(
            "  {}{}  {} {:>3}%  {}\n",
            report.subject_name,
            " ".repeat(padding),
            styles::band(p.band, &bar),
            p.percent,
            styles::muted(&format!("{}/{}", p.completed, p.total))
        ));
    }
    out
}

/// `key = value` lines for a flat JSON object.
fn render_pairs(value: &Value) -> String {
    let Some(map) = value.as_object() else {
        return format!("{}\n", value);
    };
    let width = map.keys().map(|k| k.width()).max().unwrap_or(0);
    map.iter()
        .map(|(key, value)| {
            let shown = match value {
                Value::Null => styles::muted("(unset)").to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{:<width$} = {}\n", key, shown, width = width)
        })
        .collect()
}

fn render_wallpaper(info: &WallpaperInfo) -> String {
    format!(
        "{} {}{}\n",
        styles::heading(&info.kind.to_string()),
        format_bytes(info.bytes),
        info.mime
            .as_ref()
            .map(|m| format!(" {}", styles::muted(&format!("({})", m))))
            .unwrap_or_default()
    )
}

fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn render_widget(view: &WidgetView) -> String {
    let mut out = format!("{}\n", styles::heading(&view.widget));
    let position = view
        .position
        .map(|p| format!("{}, {}", p.x, p.y))
        .unwrap_or_else(|| styles::muted("default").to_string());
    let size = view
        .size
        .map(|s| format!("{} x {}", s.width, s.height))
        .unwrap_or_else(|| styles::muted("default").to_string());
    let style = view
        .style
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| styles::muted("default").to_string());
    out.push_str(&format!("  position = {}\n", position));
    out.push_str(&format!("  size     = {}\n", size));
    out.push_str(&format!("  style    = {}\n", style));
    out
}

pub fn render_todos(todos: &[Todo]) -> String {
    todos
        .iter()
        .map(|todo| {
            let index = format!("{:>width$} ", format!("{}.", todo.id), width = COL_INDEX - 1);
            let text = if todo.done {
                format!("{} {}", styles::done(MARK_DONE), styles::muted(&todo.text))
            } else {
                format!("{} {}", styles::muted(MARK_OPEN), todo.text)
            };
            format!("{}{}\n", styles::id(&index), text)
        })
        .collect()
}

pub fn render_countdowns(countdowns: &[CountdownView]) -> String {
    let width = countdowns
        .iter()
        .map(|c| c.title.width())
        .max()
        .unwrap_or(0);
    countdowns
        .iter()
        .map(|c| {
            let padding = width.saturating_sub(c.title.width());
            let left = match &c.remaining {
                Some(r) => format!(
                    "{}d {:02}h {:02}m {:02}s",
                    r.days, r.hours, r.minutes, r.seconds
                ),
                None => styles::muted("passed").to_string(),
            };
            format!(
                "{}{}  {}  {}\n",
                styles::heading(&c.title),
                " ".repeat(padding),
                left,
                styles::muted(&c.target)
            )
        })
        .collect()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
