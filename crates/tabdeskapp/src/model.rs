//! # Data Model
//!
//! Plain data types shared by every layer. Nothing in here touches storage.
//!
//! ## Chapter
//!
//! A [`Chapter`] is one syllabus topic tracked for spaced study. The JSON shape is
//! kept in camelCase so a collection written by the browser dashboard stays
//! readable:
//!
//! ```json
//! {
//!   "id": 7,
//!   "subject": "Physics Class 11",
//!   "name": "Units and Measurement",
//!   "done": true,
//!   "revisions": ["2026-03-01T09:00:00Z", "2026-03-04T09:00:00Z"],
//!   "totalRevisions": 4,
//!   "userCreated": false
//! }
//! ```
//!
//! `subject` is always `"<SubjectName> <ClassLabel>"`. It is a grouping key, not a
//! reference to a separate entity: the class label is everything after the
//! subject name, which is why [`Chapter::compose_subject`] and
//! [`Syllabus::subjects`] agree on the exact spacing.
//!
//! ## Chapter States
//!
//! | State     | `done` | `revisions` |
//! |-----------|--------|-------------|
//! | Unstarted | false  | empty       |
//! | Active    | true   | non-empty   |
//!
//! Transitions live in [`crate::repository`]; date arithmetic in [`crate::schedule`].

use crate::store::records::Record;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a chapter record. Assigned by the record store, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub u64);

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChapterId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(ChapterId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChapterId>,
    pub subject: String,
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub revisions: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub total_revisions: u32,
    #[serde(default)]
    pub user_created: bool,
}

impl Chapter {
    /// A fresh, unstarted chapter from the built-in syllabus.
    pub fn seeded(subject_name: &str, class_label: &str, name: &str) -> Self {
        Self {
            id: None,
            subject: Self::compose_subject(subject_name, class_label),
            name: name.to_string(),
            done: false,
            revisions: Vec::new(),
            total_revisions: 0,
            user_created: false,
        }
    }

    /// A fresh, unstarted chapter added by the user.
    pub fn custom(subject_name: &str, class_label: &str, name: &str) -> Self {
        Self {
            user_created: true,
            ..Self::seeded(subject_name, class_label, name)
        }
    }

    pub fn compose_subject(subject_name: &str, class_label: &str) -> String {
        format!("{} {}", subject_name.trim(), class_label.trim())
    }

    /// Whether this chapter belongs to `"<subject_name> <class_label>"`.
    pub fn belongs_to(&self, subject_name: &str, class_label: &str) -> bool {
        self.subject == Self::compose_subject(subject_name, class_label)
    }

    pub fn is_active(&self) -> bool {
        self.done && !self.revisions.is_empty()
    }

    /// Revision count used as the spacing exponent.
    ///
    /// Records written before the counter existed only carry their revision list,
    /// so a zero counter falls back to its length.
    pub fn revision_count(&self) -> u32 {
        if self.total_revisions > 0 {
            self.total_revisions
        } else {
            self.revisions.len() as u32
        }
    }

    pub fn id_or_default(&self) -> ChapterId {
        self.id.unwrap_or(ChapterId(0))
    }
}

impl Record for Chapter {
    fn record_id(&self) -> Option<u64> {
        self.id.map(|id| id.0)
    }

    fn assign_id(&mut self, id: u64) {
        self.id = Some(ChapterId(id));
    }
}

/// Class label → subject name → ordered chapter names.
///
/// Insertion order is kept so seeding assigns ids in syllabus order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Syllabus(pub IndexMap<String, IndexMap<String, Vec<String>>>);

impl Syllabus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject<I, S>(mut self, class_label: &str, subject_name: &str, chapters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(class_label.to_string())
            .or_default()
            .entry(subject_name.to_string())
            .or_default()
            .extend(chapters.into_iter().map(Into::into));
        self
    }

    /// Every composed subject string implied by this syllabus.
    pub fn subjects(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(class_label, subjects)| {
                subjects
                    .keys()
                    .map(move |subject| Chapter::compose_subject(subject, class_label))
            })
            .collect()
    }

    /// Flattens the syllabus into unstarted seed chapters, in order.
    pub fn chapters(&self) -> Vec<Chapter> {
        self.0
            .iter()
            .flat_map(|(class_label, subjects)| {
                subjects.iter().flat_map(move |(subject, names)| {
                    names
                        .iter()
                        .map(move |name| Chapter::seeded(subject, class_label, name))
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|subjects| subjects.values().all(Vec::is_empty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "image" => Ok(MediaKind::Image),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

/// The active wallpaper. Video payloads are raw bytes; images are a base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallpaperMedia {
    Video(Vec<u8>),
    Image(String),
}

impl WallpaperMedia {
    pub fn kind(&self) -> MediaKind {
        match self {
            WallpaperMedia::Video(_) => MediaKind::Video,
            WallpaperMedia::Image(_) => MediaKind::Image,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WallpaperMedia::Video(bytes) => bytes.len(),
            WallpaperMedia::Image(data_url) => data_url.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Where a widget sits on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WidgetPlacement {
    pub position: Position,
    pub size: Option<Size>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}
