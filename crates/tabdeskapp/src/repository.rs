//! # Chapter Repository
//!
//! Chapter lifecycle on top of the record store and the schedule engine.
//!
//! Every mutation follows the same shape: read the whole collection, change one or
//! more records, write, then read the whole collection again and hand that back.
//! The second read is the result callers render, so what they see is always what
//! storage (or the in-memory overlay after a failed write) actually holds.
//!
//! ## Seeding
//!
//! An empty collection is filled from the [`Syllabus`]. A collection holding seed
//! chapters whose subject the syllabus no longer lists is "mismatched" and is
//! handled according to [`ReseedPolicy`]. User-created chapters never count
//! towards a mismatch.

use crate::config::{ReseedPolicy, RevertPolicy};
use crate::error::{DeskError, Result};
use crate::model::{Chapter, ChapterId, Syllabus};
use crate::schedule::{RevisionAgenda, RevisionEntry, ScheduleEngine};
use crate::store::{Collection, RecordStore, StorageBackend};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::info;

pub const CHAPTERS_COLLECTION: &str = "chapters";
pub const CHAPTERS_SCHEMA_VERSION: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub initial_revisions: u32,
    pub reseed_policy: ReseedPolicy,
    pub revert_policy: RevertPolicy,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            initial_revisions: 4,
            reseed_policy: ReseedPolicy::Wipe,
            revert_policy: RevertPolicy::KeepCount,
        }
    }
}

/// What seeding did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SeedOutcome {
    /// Collection already matched the syllabus.
    Untouched,
    /// Collection was empty and has been filled.
    Seeded { added: usize },
    /// Mismatch under the `wipe` policy: everything was replaced.
    Reseeded { removed: usize, added: usize },
    /// Mismatch under the `merge` policy.
    Merged { removed: usize, added: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl StatusFilter {
    pub(crate) fn accepts(&self, chapter: &Chapter) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => chapter.done,
            StatusFilter::Incomplete => !chapter.done,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "incomplete" | "todo" => Ok(StatusFilter::Incomplete),
            other => Err(DeskError::InvalidInput(format!("unknown status filter: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl fmt::Display for ProgressBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressBand::Low => write!(f, "low"),
            ProgressBand::Medium => write!(f, "medium"),
            ProgressBand::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub percent: u32,
    pub band: ProgressBand,
}

impl Progress {
    pub fn of(total: usize, completed: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        let band = match percent {
            p if p < 40 => ProgressBand::Low,
            p if p < 80 => ProgressBand::Medium,
            _ => ProgressBand::High,
        };
        Self {
            total,
            completed,
            percent,
            band,
        }
    }
}

pub struct ChapterRepository<B: StorageBackend> {
    store: RecordStore<B>,
    collection: Collection,
    engine: ScheduleEngine,
    options: RepositoryOptions,
    syllabus: Syllabus,
}

impl<B: StorageBackend> ChapterRepository<B> {
    /// Open the `chapters` collection on `backend`.
    pub fn open(
        backend: B,
        engine: ScheduleEngine,
        options: RepositoryOptions,
        syllabus: Syllabus,
    ) -> Result<Self> {
        if options.initial_revisions == 0 {
            return Err(DeskError::InvalidInput(
                "initial_revisions must be at least 1".to_string(),
            ));
        }
        let mut store = RecordStore::new(backend);
        let collection =
            store.open_collection::<Chapter>(CHAPTERS_COLLECTION, CHAPTERS_SCHEMA_VERSION)?;
        Ok(Self {
            store,
            collection,
            engine,
            options,
            syllabus,
        })
    }

    pub fn engine(&self) -> &ScheduleEngine {
        &self.engine
    }

    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    pub fn get_all_chapters(&self) -> Result<Vec<Chapter>> {
        self.store.get_all(&self.collection)
    }

    pub fn get_chapter(&self, id: ChapterId) -> Result<Chapter> {
        self.store.get(&self.collection, id.0)
    }

    /// Seed an empty collection, or reseed one whose seed subjects left `syllabus`.
    pub fn seed_if_empty_or_mismatched(&mut self, syllabus: &Syllabus) -> Result<SeedOutcome> {
        self.syllabus = syllabus.clone();
        let existing = self.get_all_chapters()?;

        if existing.is_empty() {
            let mut fresh = syllabus.chapters();
            let added = fresh.len();
            self.store.put_many(&self.collection, &mut fresh)?;
            info!(added, "seeded chapters");
            return Ok(SeedOutcome::Seeded { added });
        }

        let subjects: HashSet<String> = syllabus.subjects().into_iter().collect();
        let orphaned = |c: &Chapter| !c.user_created && !subjects.contains(&c.subject);
        if !existing.iter().any(orphaned) {
            return Ok(SeedOutcome::Untouched);
        }

        match self.options.reseed_policy {
            ReseedPolicy::Wipe => {
                let removed = existing.len();
                let mut fresh = syllabus.chapters();
                let added = fresh.len();
                self.store.replace_all(&self.collection, &mut fresh)?;
                info!(removed, added, "syllabus changed, reseeded chapters");
                Ok(SeedOutcome::Reseeded { removed, added })
            }
            ReseedPolicy::Merge => {
                let (mut kept, dropped): (Vec<Chapter>, Vec<Chapter>) =
                    existing.into_iter().partition(|c| !orphaned(c));
                let present: HashSet<(String, String)> = kept
                    .iter()
                    .map(|c| (c.subject.clone(), c.name.clone()))
                    .collect();
                let missing: Vec<Chapter> = syllabus
                    .chapters()
                    .into_iter()
                    .filter(|c| !present.contains(&(c.subject.clone(), c.name.clone())))
                    .collect();
                let added = missing.len();
                kept.extend(missing);
                self.store.replace_all(&self.collection, &mut kept)?;
                info!(removed = dropped.len(), added, "syllabus changed, merged chapters");
                Ok(SeedOutcome::Merged {
                    removed: dropped.len(),
                    added,
                })
            }
        }
    }

    /// Unstarted → active with a fresh batch of revisions. Already-done chapters are left alone.
    pub fn mark_complete(&mut self, id: ChapterId, now: DateTime<Utc>) -> Result<Vec<Chapter>> {
        let all = self.get_all_chapters()?;
        let mut chapter = find(&all, id)?;
        if chapter.done {
            return Ok(all);
        }

        let count = self.options.initial_revisions;
        chapter.revisions = self.engine.initial_revisions(&all, now, count)?;
        chapter.done = true;
        chapter.total_revisions = count;
        self.store.put(&self.collection, &mut chapter)?;
        info!(id = %id, revisions = count, "chapter marked complete");
        self.get_all_chapters()
    }

    /// Replace the revision due at `due` with the next one in the sequence.
    pub fn complete_revision(
        &mut self,
        id: ChapterId,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Chapter>> {
        let all = self.get_all_chapters()?;
        let mut chapter = find(&all, id)?;
        if !chapter.revisions.contains(&due) {
            return Err(DeskError::RevisionNotScheduled {
                id: id.0,
                day: self.engine.calendar_day(due),
            });
        }

        let next = self.engine.next_revision(&chapter, &all, now)?;
        chapter.total_revisions = chapter.revision_count() + 1;
        chapter.revisions.retain(|r| *r != due);
        chapter.revisions.push(next);
        chapter.revisions.sort();
        self.store.put(&self.collection, &mut chapter)?;
        info!(id = %id, next = %next, "revision completed");
        self.get_all_chapters()
    }

    /// Like [`Self::complete_revision`], picking the revision scheduled on `day`.
    pub fn complete_revision_on(
        &mut self,
        id: ChapterId,
        day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Chapter>> {
        let chapter = self.get_chapter(id)?;
        let due = chapter
            .revisions
            .iter()
            .copied()
            .find(|r| self.engine.calendar_day(*r) == day)
            .ok_or(DeskError::RevisionNotScheduled { id: id.0, day })?;
        self.complete_revision(id, due, now)
    }

    /// Active → unstarted.
    pub fn revert_complete(&mut self, id: ChapterId) -> Result<Vec<Chapter>> {
        let all = self.get_all_chapters()?;
        let mut chapter = find(&all, id)?;
        self.revert(&mut chapter);
        self.store.put(&self.collection, &mut chapter)?;
        info!(id = %id, "chapter reverted");
        self.get_all_chapters()
    }

    /// Every chapter back to unstarted, in one write.
    pub fn reset_all(&mut self) -> Result<Vec<Chapter>> {
        let mut all = self.get_all_chapters()?;
        for chapter in all.iter_mut() {
            self.revert(chapter);
        }
        self.store.put_many(&self.collection, &mut all)?;
        info!(chapters = all.len(), "all progress reset");
        self.get_all_chapters()
    }

    fn revert(&self, chapter: &mut Chapter) {
        chapter.done = false;
        chapter.revisions.clear();
        if self.options.revert_policy == RevertPolicy::ResetCount {
            chapter.total_revisions = 0;
        }
    }

    /// Add user chapters under `"<subject> <class>"`. Names are trimmed; blanks are skipped.
    pub fn add_custom_chapters<S: AsRef<str>>(
        &mut self,
        class_label: &str,
        subject_name: &str,
        names: &[S],
    ) -> Result<Vec<Chapter>> {
        if class_label.trim().is_empty() || subject_name.trim().is_empty() {
            return Err(DeskError::InvalidInput(
                "class and subject are required".to_string(),
            ));
        }
        let mut fresh: Vec<Chapter> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .map(|n| Chapter::custom(subject_name, class_label, n))
            .collect();
        if fresh.is_empty() {
            return Err(DeskError::InvalidInput(
                "at least one chapter name is required".to_string(),
            ));
        }

        self.store.put_many(&self.collection, &mut fresh)?;
        info!(added = fresh.len(), class = class_label, subject = subject_name, "custom chapters added");
        self.get_all_chapters()
    }

    /// Remove a chapter. Removing a missing chapter is not an error.
    pub fn delete_chapter(&mut self, id: ChapterId) -> Result<Vec<Chapter>> {
        self.store.delete(&self.collection, id.0)?;
        self.get_all_chapters()
    }

    pub fn edit_chapter_name(&mut self, id: ChapterId, name: &str) -> Result<Vec<Chapter>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::InvalidInput("chapter name cannot be empty".to_string()));
        }
        let mut chapter = self.get_chapter(id)?;
        chapter.name = name.to_string();
        self.store.put(&self.collection, &mut chapter)?;
        self.get_all_chapters()
    }

    pub fn agenda(&self, chapters: &[Chapter], now: DateTime<Utc>) -> RevisionAgenda {
        self.engine.agenda(chapters, now)
    }

    pub fn list_today(&self, chapters: &[Chapter], now: DateTime<Utc>) -> Vec<RevisionEntry> {
        self.engine.agenda(chapters, now).today
    }

    pub fn list_upcoming(&self, chapters: &[Chapter], now: DateTime<Utc>) -> Vec<RevisionEntry> {
        self.engine.agenda(chapters, now).upcoming
    }

    /// Split a composed subject into `(subject name, class label)`.
    ///
    /// Known class labels win so multi-word labels ("Class 11") split correctly;
    /// anything else splits on the last space.
    pub fn split_subject<'a>(&self, subject: &'a str) -> (&'a str, &'a str) {
        for class_label in self.syllabus.0.keys() {
            if let Some(name) = subject.strip_suffix(class_label.as_str()) {
                if let Some(name) = name.strip_suffix(' ') {
                    return (name, &subject[name.len() + 1..]);
                }
            }
        }
        subject.rsplit_once(' ').unwrap_or((subject, ""))
    }

    /// Class labels in first-seen order.
    pub fn classes(&self) -> Result<Vec<String>> {
        let mut seen = Vec::new();
        for chapter in self.get_all_chapters()? {
            let (_, class_label) = self.split_subject(&chapter.subject);
            if !seen.iter().any(|c| c == class_label) {
                seen.push(class_label.to_string());
            }
        }
        Ok(seen)
    }

    pub fn subjects_for(&self, class_label: &str) -> Result<Vec<String>> {
        let mut seen: Vec<String> = Vec::new();
        for chapter in self.get_all_chapters()? {
            let (subject_name, label) = self.split_subject(&chapter.subject);
            if label == class_label && !seen.iter().any(|s| s == subject_name) {
                seen.push(subject_name.to_string());
            }
        }
        Ok(seen)
    }

    pub fn filter(
        &self,
        subject_name: &str,
        class_label: &str,
        status: StatusFilter,
    ) -> Result<Vec<Chapter>> {
        Ok(self
            .get_all_chapters()?
            .into_iter()
            .filter(|c| c.belongs_to(subject_name, class_label) && status.accepts(c))
            .collect())
    }

    /// Case-insensitive match on chapter name or subject.
    pub fn search(&self, term: &str) -> Result<Vec<Chapter>> {
        let term = term.trim().to_lowercase();
        Ok(self
            .get_all_chapters()?
            .into_iter()
            .filter(|c| {
                term.is_empty()
                    || c.name.to_lowercase().contains(&term)
                    || c.subject.to_lowercase().contains(&term)
            })
            .collect())
    }

    pub fn progress(&self, subject_name: &str, class_label: &str) -> Result<Progress> {
        let chapters = self.filter(subject_name, class_label, StatusFilter::All)?;
        let completed = chapters.iter().filter(|c| c.done).count();
        Ok(Progress::of(chapters.len(), completed))
    }
}

fn find(all: &[Chapter], id: ChapterId) -> Result<Chapter> {
    all.iter()
        .find(|c| c.id == Some(id))
        .cloned()
        .ok_or(DeskError::RecordNotFound(id.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemBackend;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn small_syllabus() -> Syllabus {
        Syllabus::new()
            .with_subject("Class 11", "Physics", ["Units", "Waves"])
            .with_subject("Class 12", "Physics", ["Atoms"])
    }

    fn repo_with(options: RepositoryOptions) -> ChapterRepository<MemBackend> {
        let mut repo = ChapterRepository::open(
            MemBackend::new(),
            ScheduleEngine::utc(),
            options,
            Syllabus::new(),
        )
        .unwrap();
        repo.seed_if_empty_or_mismatched(&small_syllabus()).unwrap();
        repo
    }

    fn repo() -> ChapterRepository<MemBackend> {
        repo_with(RepositoryOptions::default())
    }

    fn id_of(repo: &ChapterRepository<MemBackend>, name: &str) -> ChapterId {
        repo.get_all_chapters()
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .and_then(|c| c.id)
            .unwrap()
    }

    #[test]
    fn seeding_empty_collection_creates_seed_chapters() {
        let mut repo = ChapterRepository::open(
            MemBackend::new(),
            ScheduleEngine::utc(),
            RepositoryOptions::default(),
            Syllabus::new(),
        )
        .unwrap();
        let syllabus = Syllabus::new().with_subject("Class 11", "Physics", ["Units"]);

        let outcome = repo.seed_if_empty_or_mismatched(&syllabus).unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded { added: 1 });

        let all = repo.get_all_chapters().unwrap();
        assert_eq!(all.len(), 1);
        let ch = &all[0];
        assert_eq!(ch.subject, "Physics Class 11");
        assert_eq!(ch.name, "Units");
        assert!(!ch.done);
        assert!(ch.revisions.is_empty());
        assert!(!ch.user_created);
    }

    #[test]
    fn seeding_twice_equals_seeding_once() {
        let mut repo = repo();
        let once = repo.get_all_chapters().unwrap();
        let outcome = repo.seed_if_empty_or_mismatched(&small_syllabus()).unwrap();
        assert_eq!(outcome, SeedOutcome::Untouched);
        assert_eq!(repo.get_all_chapters().unwrap(), once);
    }

    #[test]
    fn mismatch_with_wipe_replaces_everything() {
        let mut repo = repo();
        let units = id_of(&repo, "Units");
        repo.mark_complete(units, at("2026-03-01T09:00:00Z")).unwrap();

        let changed = Syllabus::new().with_subject("Class 11", "Chemistry", ["Hydrogen"]);
        let outcome = repo.seed_if_empty_or_mismatched(&changed).unwrap();
        assert_eq!(outcome, SeedOutcome::Reseeded { removed: 3, added: 1 });

        let all = repo.get_all_chapters().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Hydrogen");
        assert_eq!(all[0].id, Some(ChapterId(4)));
    }

    #[test]
    fn mismatch_with_merge_keeps_progress() {
        let mut repo = repo_with(RepositoryOptions {
            reseed_policy: ReseedPolicy::Merge,
            ..Default::default()
        });
        let units = id_of(&repo, "Units");
        repo.mark_complete(units, at("2026-03-01T09:00:00Z")).unwrap();

        let changed = Syllabus::new()
            .with_subject("Class 11", "Physics", ["Units", "Waves", "Gravitation"]);
        let outcome = repo.seed_if_empty_or_mismatched(&changed).unwrap();
        assert_eq!(outcome, SeedOutcome::Merged { removed: 1, added: 1 });

        let all = repo.get_all_chapters().unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Units", "Waves", "Gravitation"]);
        assert!(all[0].done);
        assert_eq!(all[0].revisions.len(), 4);
    }

    #[test]
    fn user_chapters_never_trigger_reseed() {
        let mut repo = repo();
        repo.add_custom_chapters("NEET", "Biology", &["Cell"]).unwrap();
        let outcome = repo.seed_if_empty_or_mismatched(&small_syllabus()).unwrap();
        assert_eq!(outcome, SeedOutcome::Untouched);
        assert_eq!(repo.get_all_chapters().unwrap().len(), 4);
    }

    #[test]
    fn zero_initial_revisions_is_rejected() {
        let options = RepositoryOptions {
            initial_revisions: 0,
            ..Default::default()
        };
        let opened = ChapterRepository::open(
            MemBackend::new(),
            ScheduleEngine::utc(),
            options,
            Syllabus::new(),
        );
        assert!(matches!(opened, Err(DeskError::InvalidInput(_))));
    }

    #[test]
    fn unschedulable_revision_leaves_chapter_untouched() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let due = at("2026-03-01T09:00:00Z");
        let mut chapter = repo.get_chapter(id).unwrap();
        chapter.done = true;
        chapter.revisions = vec![due];
        chapter.total_revisions = 20_000;
        repo.store.put(&repo.collection, &mut chapter).unwrap();

        let result = repo.complete_revision(id, due, at("2026-03-01T10:00:00Z"));
        assert!(matches!(result, Err(DeskError::InvalidInput(_))));
        assert_eq!(repo.get_chapter(id).unwrap(), chapter);
    }

    #[test]
    fn mark_complete_schedules_four_revisions() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let now = at("2026-02-10T10:00:00Z");

        let all = repo.mark_complete(id, now).unwrap();
        let ch = all.iter().find(|c| c.id == Some(id)).unwrap();

        assert!(ch.done);
        assert_eq!(ch.total_revisions, 4);
        assert_eq!(ch.revisions.len(), 4);
        assert!(ch.revisions.windows(2).all(|w| w[0] < w[1]));
        assert!(ch.revisions[0] >= now + Duration::days(1));
    }

    #[test]
    fn mark_complete_twice_is_noop() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let first = repo.mark_complete(id, at("2026-02-10T10:00:00Z")).unwrap();
        let second = repo.mark_complete(id, at("2026-02-20T10:00:00Z")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn two_chapters_completed_same_moment_do_not_share_days() {
        let mut repo = repo();
        let now = at("2026-02-10T10:00:00Z");
        repo.mark_complete(id_of(&repo, "Units"), now).unwrap();
        let all = repo.mark_complete(id_of(&repo, "Waves"), now).unwrap();

        let engine = ScheduleEngine::utc();
        let days: HashSet<_> = all
            .iter()
            .flat_map(|c| c.revisions.iter())
            .map(|r| engine.calendar_day(*r))
            .collect();
        assert_eq!(days.len(), 8);
    }

    #[test]
    fn complete_revision_replaces_date_and_keeps_length() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let mut ch = repo.get_chapter(id).unwrap();
        ch.done = true;
        ch.revisions = vec![at("2026-03-01T09:00:00Z"), at("2026-04-05T09:00:00Z")];
        ch.total_revisions = 2;
        repo.store.put(&repo.collection, &mut ch).unwrap();

        let now = at("2026-03-01T10:00:00Z");
        let all = repo
            .complete_revision(id, at("2026-03-01T09:00:00Z"), now)
            .unwrap();
        let ch = all.iter().find(|c| c.id == Some(id)).unwrap();

        assert_eq!(ch.revisions.len(), 2);
        assert!(ch.revisions.contains(&at("2026-04-05T09:00:00Z")));
        assert!(!ch.revisions.contains(&at("2026-03-01T09:00:00Z")));
        assert_eq!(ch.revisions[0], now + Duration::days(9));
        assert!(ch.revisions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ch.total_revisions, 3);
    }

    #[test]
    fn complete_revision_for_unscheduled_date_writes_nothing() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let before = repo.mark_complete(id, at("2026-02-10T10:00:00Z")).unwrap();

        let err = repo
            .complete_revision(id, at("2030-01-01T00:00:00Z"), at("2026-02-11T10:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, DeskError::RevisionNotScheduled { .. }));
        assert_eq!(repo.get_all_chapters().unwrap(), before);
    }

    #[test]
    fn complete_revision_on_day_resolves_the_timestamp() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let now = at("2026-02-10T10:00:00Z");
        repo.mark_complete(id, now).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 2, 11).unwrap();
        let all = repo
            .complete_revision_on(id, day, at("2026-02-11T08:00:00Z"))
            .unwrap();
        let ch = all.iter().find(|c| c.id == Some(id)).unwrap();
        assert_eq!(ch.revisions.len(), 4);
        assert!(!ch.revisions.contains(&(now + Duration::days(1))));
        assert_eq!(ch.total_revisions, 5);
    }

    #[test]
    fn revert_keeps_count_by_default() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        repo.mark_complete(id, at("2026-02-10T10:00:00Z")).unwrap();
        let all = repo.revert_complete(id).unwrap();
        let ch = all.iter().find(|c| c.id == Some(id)).unwrap();
        assert!(!ch.done);
        assert!(ch.revisions.is_empty());
        assert_eq!(ch.total_revisions, 4);
    }

    #[test]
    fn revert_can_reset_count() {
        let mut repo = repo_with(RepositoryOptions {
            revert_policy: RevertPolicy::ResetCount,
            ..Default::default()
        });
        let id = id_of(&repo, "Units");
        repo.mark_complete(id, at("2026-02-10T10:00:00Z")).unwrap();
        let all = repo.revert_complete(id).unwrap();
        assert_eq!(all.iter().find(|c| c.id == Some(id)).unwrap().total_revisions, 0);
    }

    #[test]
    fn reset_all_unstarts_every_chapter() {
        let mut repo = repo();
        let now = at("2026-02-10T10:00:00Z");
        repo.mark_complete(id_of(&repo, "Units"), now).unwrap();
        repo.mark_complete(id_of(&repo, "Atoms"), now).unwrap();

        let all = repo.reset_all().unwrap();
        assert!(all.iter().all(|c| !c.done && c.revisions.is_empty()));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn add_custom_trims_and_skips_blanks() {
        let mut repo = repo();
        let all = repo
            .add_custom_chapters("NEET", "Biology", &[" Cell ", "", "  ", "Genetics"])
            .unwrap();
        let custom: Vec<_> = all.iter().filter(|c| c.user_created).collect();
        assert_eq!(custom.len(), 2);
        assert_eq!(custom[0].name, "Cell");
        assert_eq!(custom[0].subject, "Biology NEET");
    }

    #[test]
    fn add_custom_requires_a_name() {
        let mut repo = repo();
        assert!(matches!(
            repo.add_custom_chapters("NEET", "Biology", &["", " "]),
            Err(DeskError::InvalidInput(_))
        ));
    }

    #[test]
    fn delete_twice_is_fine() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        repo.delete_chapter(id).unwrap();
        let all = repo.delete_chapter(id).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn rename_updates_name_only() {
        let mut repo = repo();
        let id = id_of(&repo, "Units");
        let all = repo.edit_chapter_name(id, "  Units & Dimensions ").unwrap();
        let ch = all.iter().find(|c| c.id == Some(id)).unwrap();
        assert_eq!(ch.name, "Units & Dimensions");
        assert_eq!(ch.subject, "Physics Class 11");
    }

    #[test]
    fn rename_missing_is_not_found() {
        let mut repo = repo();
        assert!(matches!(
            repo.edit_chapter_name(ChapterId(99), "x"),
            Err(DeskError::RecordNotFound(99))
        ));
    }

    #[test]
    fn classes_and_subjects_follow_syllabus_labels() {
        let mut repo = repo();
        repo.add_custom_chapters("NEET", "Organic Chemistry", &["Amines"])
            .unwrap();

        assert_eq!(repo.classes().unwrap(), vec!["Class 11", "Class 12", "NEET"]);
        assert_eq!(repo.subjects_for("Class 11").unwrap(), vec!["Physics"]);
        assert_eq!(repo.subjects_for("NEET").unwrap(), vec!["Organic Chemistry"]);
    }

    #[test]
    fn filter_and_progress() {
        let mut repo = repo();
        repo.mark_complete(id_of(&repo, "Units"), at("2026-02-10T10:00:00Z"))
            .unwrap();

        let done = repo
            .filter("Physics", "Class 11", StatusFilter::Completed)
            .unwrap();
        assert_eq!(done.len(), 1);
        let todo = repo
            .filter("Physics", "Class 11", StatusFilter::Incomplete)
            .unwrap();
        assert_eq!(todo[0].name, "Waves");

        let progress = repo.progress("Physics", "Class 11").unwrap();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.band, ProgressBand::Medium);
    }

    #[test]
    fn progress_bands() {
        assert_eq!(Progress::of(0, 0).band, ProgressBand::Low);
        assert_eq!(Progress::of(3, 1).percent, 33);
        assert_eq!(Progress::of(5, 2).band, ProgressBand::Medium);
        assert_eq!(Progress::of(5, 4).band, ProgressBand::High);
    }

    #[test]
    fn search_matches_name_or_subject() {
        let repo = repo();
        assert_eq!(repo.search("wav").unwrap().len(), 1);
        assert_eq!(repo.search("class 12").unwrap().len(), 1);
        assert_eq!(repo.search("").unwrap().len(), 3);
    }

    #[test]
    fn failed_write_is_visible_in_memory() {
        let backend = MemBackend::new();
        let mut repo = ChapterRepository::open(
            backend.clone(),
            ScheduleEngine::utc(),
            RepositoryOptions::default(),
            Syllabus::new(),
        )
        .unwrap();
        repo.seed_if_empty_or_mismatched(&small_syllabus()).unwrap();
        let id = id_of(&repo, "Units");

        backend.set_simulate_write_error(true);
        let err = repo.mark_complete(id, at("2026-02-10T10:00:00Z")).unwrap_err();
        assert!(err.is_storage_unavailable());
        assert!(repo.is_degraded());
        assert!(repo.get_chapter(id).unwrap().done);
    }
}
