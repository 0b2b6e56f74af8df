//! Widget positions, sizes and styles, kept in the `layout` namespace.
//!
//! Each aspect of a widget is its own key, `<widget>_position`, `<widget>_size` or
//! `<widget>_style`. A few widgets predate that scheme and keep their camelCase
//! keys (see [`layout_key`]).
//!
//! Dragging produces a stream of positions. [`Debouncer`] collapses them so only
//! the last value is written once the widget has been idle for the delay.

use crate::error::Result;
use crate::model::{Position, Size, WidgetPlacement};
use crate::store::{KvStore, StorageBackend};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

pub const LAYOUT_NAMESPACE: &str = "layout";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Aspect {
    Position,
    Size,
    Style,
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aspect::Position => write!(f, "position"),
            Aspect::Size => write!(f, "size"),
            Aspect::Style => write!(f, "style"),
        }
    }
}

const LEGACY_KEYS: &[(&str, Aspect, &str)] = &[
    ("studyTracker", Aspect::Position, "studyTrackerPosition"),
    ("studyTracker", Aspect::Size, "studyTrackerSize"),
    ("timeDate", Aspect::Position, "timeDatePosition"),
    ("timeDate", Aspect::Style, "timeDateStyle"),
    ("focus", Aspect::Position, "focusPosition"),
    ("focus", Aspect::Style, "focusStyle"),
    ("appbar", Aspect::Position, "appbarPosition"),
    ("todoList", Aspect::Position, "todoListPosition"),
    ("todoList", Aspect::Size, "todoListSize"),
];

/// Storage key for one aspect of a widget.
pub fn layout_key(widget: &str, aspect: Aspect) -> String {
    LEGACY_KEYS
        .iter()
        .find(|(w, a, _)| *w == widget && *a == aspect)
        .map(|(_, _, key)| key.to_string())
        .unwrap_or_else(|| format!("{}_{}", widget, aspect))
}

pub struct WidgetLayout<B: StorageBackend> {
    kv: KvStore<B>,
    pending: Debouncer<Value>,
}

impl<B: StorageBackend> WidgetLayout<B> {
    pub fn new(backend: B, debounce: Duration) -> Self {
        Self {
            kv: KvStore::new(backend, LAYOUT_NAMESPACE),
            pending: Debouncer::new(debounce),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.kv.is_degraded()
    }

    pub fn position(&self, widget: &str) -> Result<Option<Position>> {
        self.kv.get(&layout_key(widget, Aspect::Position))
    }

    pub fn size(&self, widget: &str) -> Result<Option<Size>> {
        self.kv.get(&layout_key(widget, Aspect::Size))
    }

    pub fn style(&self, widget: &str) -> Result<Option<Value>> {
        self.kv.get_raw(&layout_key(widget, Aspect::Style))
    }

    /// Position and size together, if the widget has ever been placed.
    pub fn placement(&self, widget: &str) -> Result<Option<WidgetPlacement>> {
        let Some(position) = self.position(widget)? else {
            return Ok(None);
        };
        Ok(Some(WidgetPlacement {
            position,
            size: self.size(widget)?,
        }))
    }

    pub fn set_position(&mut self, widget: &str, position: Position) -> Result<()> {
        self.kv.set(&layout_key(widget, Aspect::Position), &position)
    }

    pub fn set_size(&mut self, widget: &str, size: Size) -> Result<()> {
        self.kv.set(&layout_key(widget, Aspect::Size), &size)
    }

    pub fn set_style(&mut self, widget: &str, style: &Value) -> Result<()> {
        self.kv.set(&layout_key(widget, Aspect::Style), style)
    }

    pub fn reset_style(&mut self, widget: &str) -> Result<()> {
        self.kv.remove(&layout_key(widget, Aspect::Style))
    }

    /// Forget everything about a widget so it falls back to its default placement.
    pub fn reset(&mut self, widget: &str) -> Result<()> {
        for aspect in [Aspect::Position, Aspect::Size, Aspect::Style] {
            self.kv.remove(&layout_key(widget, aspect))?;
        }
        Ok(())
    }

    /// Queue a position write; only the last one per widget is kept.
    pub fn schedule_position(&mut self, widget: &str, position: Position, now: Instant) {
        let value = serde_json::json!({ "x": position.x, "y": position.y });
        self.pending
            .schedule(layout_key(widget, Aspect::Position), value, now);
    }

    pub fn schedule_size(&mut self, widget: &str, size: Size, now: Instant) {
        let value = serde_json::json!({ "width": size.width, "height": size.height });
        self.pending.schedule(layout_key(widget, Aspect::Size), value, now);
    }

    /// Write every queued value whose idle period has passed. Returns how many were written.
    pub fn write_due(&mut self, now: Instant) -> Result<usize> {
        let due = self.pending.take_due(now);
        self.write_all(due)
    }

    /// Write everything queued, ready or not.
    pub fn flush(&mut self) -> Result<usize> {
        let all = self.pending.flush_all();
        self.write_all(all)
    }

    fn write_all(&mut self, entries: Vec<(String, Value)>) -> Result<usize> {
        let count = entries.len();
        for (key, value) in entries {
            debug!(key = %key, "writing debounced layout value");
            self.kv.set(&key, &value)?;
        }
        Ok(count)
    }
}

/// Cancel-and-reschedule queue of pending writes, keyed by storage key.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: BTreeMap<String, (Instant, T)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value for `key` and restart its timer.
    pub fn schedule(&mut self, key: impl Into<String>, value: T, now: Instant) {
        self.pending.insert(key.into(), (now + self.delay, value));
    }

    /// Remove and return the entries whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<(String, T)> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        due.into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|(_, value)| (key, value)))
            .collect()
    }

    pub fn flush_all(&mut self) -> Vec<(String, T)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(key, (_, value))| (key, value))
            .collect()
    }

    /// Time until the earliest pending deadline, if anything is pending.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.pending
            .values()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
            .min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
