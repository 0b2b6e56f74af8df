//! # Spaced Repetition
//!
//! Pure date arithmetic: nothing here reads or writes storage.
//!
//! The n-th revision of a chapter lands `n²` days after the moment it is scheduled
//! (1, 4, 9, 16, ...), where `n = count + 1` and `count` is the chapter's
//! [`Chapter::revision_count`]. If another chapter (or this one) already has a
//! revision on that calendar day, the candidate moves forward one day at a time
//! until it finds a free day. The time of day is kept.
//!
//! Calendar days are taken in a fixed UTC offset so "today" means the same thing
//! for every process sharing a data directory.

use crate::error::{DeskError, Result};
use crate::model::{Chapter, ChapterId};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEngine {
    offset: FixedOffset,
}

impl Default for ScheduleEngine {
    fn default() -> Self {
        Self::utc()
    }
}

/// Day gap for a chapter that has already had `count` revisions.
/// `None` when the square does not fit in an `i64`.
pub fn gap_days(count: u32) -> Option<i64> {
    let n = i64::from(count) + 1;
    n.checked_mul(n)
}

impl ScheduleEngine {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Calendar days already taken by any scheduled revision.
    pub fn used_days(&self, chapters: &[Chapter]) -> BTreeSet<NaiveDate> {
        chapters
            .iter()
            .flat_map(|c| c.revisions.iter())
            .map(|r| self.calendar_day(*r))
            .collect()
    }

    /// Next revision for `chapter`, avoiding every day used in `all_chapters`.
    pub fn next_revision(
        &self,
        chapter: &Chapter,
        all_chapters: &[Chapter],
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let used = self.used_days(all_chapters);
        self.first_free(chapter.revision_count(), &used, now)
    }

    /// The revisions scheduled when a chapter is first marked complete.
    ///
    /// Counts `0..count` are simulated in turn and each result is reserved before
    /// the next is computed, so the batch is strictly increasing.
    pub fn initial_revisions(
        &self,
        all_chapters: &[Chapter],
        now: DateTime<Utc>,
        count: u32,
    ) -> Result<Vec<DateTime<Utc>>> {
        let mut used = self.used_days(all_chapters);
        (0..count)
            .map(|simulated| {
                let due = self.first_free(simulated, &used, now)?;
                used.insert(self.calendar_day(due));
                Ok(due)
            })
            .collect()
    }

    fn first_free(
        &self,
        count: u32,
        used: &BTreeSet<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let mut candidate = gap_days(count)
            .and_then(Duration::try_days)
            .and_then(|gap| now.checked_add_signed(gap))
            .ok_or_else(|| out_of_range(count))?;
        while used.contains(&self.calendar_day(candidate)) {
            candidate = candidate
                .checked_add_signed(Duration::days(1))
                .ok_or_else(|| out_of_range(count))?;
        }
        Ok(candidate)
    }

    /// Every scheduled revision, bucketed relative to `now`.
    pub fn agenda(&self, chapters: &[Chapter], now: DateTime<Utc>) -> RevisionAgenda {
        let today = self.calendar_day(now);
        let mut agenda = RevisionAgenda::default();

        for chapter in chapters {
            for due in &chapter.revisions {
                let entry = RevisionEntry {
                    chapter_id: chapter.id_or_default(),
                    subject: chapter.subject.clone(),
                    name: chapter.name.clone(),
                    due: *due,
                };
                let day = self.calendar_day(*due);
                if day == today {
                    agenda.today.push(entry);
                } else if day < today {
                    agenda.overdue.push(entry);
                } else {
                    agenda.upcoming.push(entry);
                }
            }
        }

        agenda.today.sort_by_key(|e| e.due);
        agenda.upcoming.sort_by_key(|e| e.due);
        agenda.overdue.sort_by_key(|e| e.due);
        agenda
    }
}

fn out_of_range(count: u32) -> DeskError {
    DeskError::InvalidInput(format!(
        "revision count {} puts the next revision past the supported date range",
        count
    ))
}

/// One scheduled revision of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionEntry {
    pub chapter_id: ChapterId,
    pub subject: String,
    pub name: String,
    pub due: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevisionAgenda {
    pub today: Vec<RevisionEntry>,
    pub upcoming: Vec<RevisionEntry>,
    /// Revisions whose day has passed without being completed.
    pub overdue: Vec<RevisionEntry>,
}

impl RevisionAgenda {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.upcoming.is_empty() && self.overdue.is_empty()
    }
}
