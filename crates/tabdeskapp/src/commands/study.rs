//! Chapter lifecycle commands.
//!
//! Each command accepts several ids and reports on each one separately, so one
//! stale id does not stop the rest. The returned `chapters` is always re-read
//! after the last change.

use crate::commands::{recover, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::ChapterId;
use crate::repository::ChapterRepository;
use crate::store::StorageBackend;
use chrono::{DateTime, NaiveDate, Utc};

/// Which revision `revise` completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionTarget {
    /// The revision scheduled on this calendar day.
    Day(NaiveDate),
    /// The revision at exactly this instant.
    At(DateTime<Utc>),
}

/// Run `op` for every id, collecting successes and absorbing recoverable failures.
fn each<B, F>(repo: &mut ChapterRepository<B>, ids: &[ChapterId], mut op: F) -> Result<CmdResult>
where
    B: StorageBackend,
    F: FnMut(&mut ChapterRepository<B>, ChapterId) -> Result<Option<CmdMessage>>,
{
    let mut result = CmdResult::default();
    let mut touched = Vec::new();
    for &id in ids {
        match op(repo, id) {
            Ok(message) => {
                touched.push(id);
                if let Some(message) = message {
                    result.add_message(message);
                }
            }
            Err(e) => {
                let degraded = e.is_storage_unavailable();
                recover(&mut result, e, "Chapter")?;
                if degraded {
                    touched.push(id);
                }
            }
        }
    }
    result.chapters = repo.get_all_chapters()?;
    result.collect_affected(&touched);
    Ok(result)
}

pub fn mark_complete<B: StorageBackend>(
    repo: &mut ChapterRepository<B>,
    ids: &[ChapterId],
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    each(repo, ids, |repo, id| {
        if repo.get_chapter(id)?.done {
            return Ok(Some(CmdMessage::info(format!(
                "Chapter #{} is already complete.",
                id
            ))));
        }
        let all = repo.mark_complete(id, now)?;
        let chapter = all.iter().find(|c| c.id == Some(id));
        let first = chapter
            .and_then(|c| c.revisions.first())
            .map(|due| repo.engine().calendar_day(*due));
        Ok(Some(CmdMessage::success(match (chapter, first) {
            (Some(c), Some(day)) => format!("Completed {}. First revision on {}.", c.name, day),
            _ => format!("Completed chapter #{}.", id),
        })))
    })
}

pub fn complete_revision<B: StorageBackend>(
    repo: &mut ChapterRepository<B>,
    ids: &[ChapterId],
    target: RevisionTarget,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    each(repo, ids, |repo, id| {
        let all = match target {
            RevisionTarget::Day(day) => repo.complete_revision_on(id, day, now)?,
            RevisionTarget::At(due) => repo.complete_revision(id, due, now)?,
        };
        let chapter = all.iter().find(|c| c.id == Some(id));
        let last = chapter
            .and_then(|c| c.revisions.last())
            .map(|due| repo.engine().calendar_day(*due));
        Ok(Some(CmdMessage::success(match (chapter, last) {
            (Some(c), Some(day)) => format!(
                "Revised {} ({} so far). Next revision added on {}.",
                c.name, c.total_revisions, day
            ),
            _ => format!("Revised chapter #{}.", id),
        })))
    })
}

pub fn revert<B: StorageBackend>(
    repo: &mut ChapterRepository<B>,
    ids: &[ChapterId],
) -> Result<CmdResult> {
    each(repo, ids, |repo, id| {
        let all = repo.revert_complete(id)?;
        let name = all
            .iter()
            .find(|c| c.id == Some(id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{}", id));
        Ok(Some(CmdMessage::success(format!(
            "Reverted {}. Its revisions were cleared.",
            name
        ))))
    })
}

pub fn reset_all<B: StorageBackend>(repo: &mut ChapterRepository<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match repo.reset_all() {
        Ok(all) => result.add_message(CmdMessage::success(format!(
            "Reset progress on {} chapters.",
            all.len()
        ))),
        Err(e) => recover(&mut result, e, "Chapter")?,
    }
    result.chapters = repo.get_all_chapters()?;
    Ok(result)
}

pub fn add<B: StorageBackend, S: AsRef<str>>(
    repo: &mut ChapterRepository<B>,
    class_label: &str,
    subject_name: &str,
    names: &[S],
) -> Result<CmdResult> {
    let before: Vec<ChapterId> = repo
        .get_all_chapters()?
        .into_iter()
        .filter_map(|c| c.id)
        .collect();
    let mut result = CmdResult::default();
    if let Err(e) = repo.add_custom_chapters(class_label, subject_name, names) {
        recover(&mut result, e, "Chapter")?;
    }
    result.chapters = repo.get_all_chapters()?;
    let added: Vec<ChapterId> = result
        .chapters
        .iter()
        .filter_map(|c| c.id)
        .filter(|id| !before.contains(id))
        .collect();
    result.collect_affected(&added);
    result.add_message(CmdMessage::success(format!(
        "Added {} chapter(s) to {} {}.",
        added.len(),
        subject_name.trim(),
        class_label.trim()
    )));
    Ok(result)
}

pub fn delete<B: StorageBackend>(
    repo: &mut ChapterRepository<B>,
    ids: &[ChapterId],
) -> Result<CmdResult> {
    each(repo, ids, |repo, id| {
        let existing = repo.get_all_chapters()?.into_iter().find(|c| c.id == Some(id));
        repo.delete_chapter(id)?;
        Ok(Some(match existing {
            Some(c) => CmdMessage::success(format!("Deleted {}.", c.name)),
            None => CmdMessage::info(format!("Chapter #{} was already gone.", id)),
        }))
    })
}

pub fn rename<B: StorageBackend>(
    repo: &mut ChapterRepository<B>,
    id: ChapterId,
    name: &str,
) -> Result<CmdResult> {
    each(repo, &[id], |repo, id| {
        let old = repo.get_chapter(id)?.name;
        repo.edit_chapter_name(id, name)?;
        Ok(Some(CmdMessage::success(format!(
            "Renamed {} to {}.",
            old,
            name.trim()
        ))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::model::Syllabus;
    use crate::repository::RepositoryOptions;
    use crate::schedule::ScheduleEngine;
    use crate::store::MemBackend;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn setup() -> (MemBackend, ChapterRepository<MemBackend>) {
        let backend = MemBackend::new();
        let syllabus = Syllabus::new().with_subject("Class 11", "Physics", ["Units", "Waves"]);
        let mut repo = ChapterRepository::open(
            backend.clone(),
            ScheduleEngine::utc(),
            RepositoryOptions::default(),
            syllabus.clone(),
        )
        .unwrap();
        repo.seed_if_empty_or_mismatched(&syllabus).unwrap();
        (backend, repo)
    }

    #[test]
    fn complete_reports_first_revision() {
        let (_, mut repo) = setup();
        let result = mark_complete(&mut repo, &[ChapterId(1)], at("2026-03-01T09:00:00Z")).unwrap();
        assert_eq!(result.affected.len(), 1);
        assert_eq!(result.affected[0].revisions.len(), 4);
        assert_eq!(
            result.messages[0].content,
            "Completed Units. First revision on 2026-03-02."
        );
    }

    #[test]
    fn completing_twice_is_info() {
        let (_, mut repo) = setup();
        let now = at("2026-03-01T09:00:00Z");
        mark_complete(&mut repo, &[ChapterId(1)], now).unwrap();
        let again = mark_complete(&mut repo, &[ChapterId(1)], now).unwrap();
        assert_eq!(again.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn stale_ids_warn_without_stopping_others() {
        let (_, mut repo) = setup();
        let result = mark_complete(
            &mut repo,
            &[ChapterId(99), ChapterId(2)],
            at("2026-03-01T09:00:00Z"),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert_eq!(result.messages[1].level, MessageLevel::Success);
        assert_eq!(result.affected.len(), 1);
        assert!(result.affected[0].done);
    }

    #[test]
    fn revise_on_day_replaces_that_revision() {
        let (_, mut repo) = setup();
        mark_complete(&mut repo, &[ChapterId(1)], at("2026-03-01T09:00:00Z")).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let result = complete_revision(
            &mut repo,
            &[ChapterId(1)],
            RevisionTarget::Day(day),
            at("2026-03-02T10:00:00Z"),
        )
        .unwrap();
        let chapter = &result.affected[0];
        assert_eq!(chapter.revisions.len(), 4);
        assert_eq!(chapter.total_revisions, 5);
        assert!(chapter
            .revisions
            .iter()
            .all(|r| r.date_naive() != day));
    }

    #[test]
    fn revise_without_scheduled_revision_warns() {
        let (_, mut repo) = setup();
        let result = complete_revision(
            &mut repo,
            &[ChapterId(1)],
            RevisionTarget::Day(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            at("2026-03-02T10:00:00Z"),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.affected.is_empty());
    }

    #[test]
    fn revert_and_reset_clear_revisions() {
        let (_, mut repo) = setup();
        let now = at("2026-03-01T09:00:00Z");
        mark_complete(&mut repo, &[ChapterId(1), ChapterId(2)], now).unwrap();

        let reverted = revert(&mut repo, &[ChapterId(1)]).unwrap();
        assert!(!reverted.affected[0].done);
        assert!(reverted.affected[0].revisions.is_empty());

        let reset = reset_all(&mut repo).unwrap();
        assert!(reset.chapters.iter().all(|c| !c.done && c.revisions.is_empty()));
    }

    #[test]
    fn add_reports_new_chapters() {
        let (_, mut repo) = setup();
        let result = add(&mut repo, "Class 12", "Biology", &["Cells", " ", "Genes"]).unwrap();
        assert_eq!(result.affected.len(), 2);
        assert!(result.affected.iter().all(|c| c.user_created));
        assert_eq!(result.messages[0].content, "Added 2 chapter(s) to Biology Class 12.");
    }

    #[test]
    fn add_without_names_is_an_error() {
        let (_, mut repo) = setup();
        let empty: [&str; 0] = [];
        assert!(add(&mut repo, "Class 12", "Biology", &empty).is_err());
    }

    #[test]
    fn delete_and_rename() {
        let (_, mut repo) = setup();
        let renamed = rename(&mut repo, ChapterId(2), " Oscillations ").unwrap();
        assert_eq!(renamed.affected[0].name, "Oscillations");

        let deleted = delete(&mut repo, &[ChapterId(1)]).unwrap();
        assert_eq!(deleted.chapters.len(), 1);
        let again = delete(&mut repo, &[ChapterId(1)]).unwrap();
        assert_eq!(again.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn failed_write_is_kept_for_the_session() {
        let (backend, mut repo) = setup();
        backend.set_simulate_write_error(true);
        let result = mark_complete(&mut repo, &[ChapterId(1)], at("2026-03-01T09:00:00Z")).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.affected[0].done);
        assert!(repo.is_degraded());
    }
}
