use crate::commands::{recover, CmdMessage, CmdResult, ProgressReport};
use crate::error::Result;
use crate::model::Syllabus;
use crate::repository::{ChapterRepository, SeedOutcome, StatusFilter};
use crate::store::StorageBackend;

/// Which chapters to list. A subject without a class matches it in every class.
#[derive(Debug, Clone, Default)]
pub struct ChapterQuery {
    pub class_label: Option<String>,
    pub subject_name: Option<String>,
    pub status: StatusFilter,
}

pub fn list<B: StorageBackend>(
    repo: &ChapterRepository<B>,
    query: &ChapterQuery,
) -> Result<CmdResult> {
    let chapters = repo
        .get_all_chapters()?
        .into_iter()
        .filter(|c| {
            let (subject_name, class_label) = repo.split_subject(&c.subject);
            query
                .class_label
                .as_deref()
                .map_or(true, |wanted| wanted.eq_ignore_ascii_case(class_label))
                && query
                    .subject_name
                    .as_deref()
                    .map_or(true, |wanted| wanted.eq_ignore_ascii_case(subject_name))
                && query.status.accepts(c)
        })
        .collect::<Vec<_>>();

    let mut result = CmdResult::default().with_chapters(chapters);
    if result.chapters.is_empty() {
        result.add_message(CmdMessage::info("No chapters match."));
    }
    Ok(result)
}

pub fn search<B: StorageBackend>(repo: &ChapterRepository<B>, term: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default().with_chapters(repo.search(term)?);
    if result.chapters.is_empty() {
        result.add_message(CmdMessage::info(format!("No chapters match \"{}\".", term.trim())));
    }
    Ok(result)
}

/// Progress for one class/subject pair, or for every pair when either is omitted.
pub fn progress<B: StorageBackend>(
    repo: &ChapterRepository<B>,
    class_label: Option<&str>,
    subject_name: Option<&str>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for class in repo.classes()? {
        if class_label.is_some_and(|wanted| !wanted.eq_ignore_ascii_case(&class)) {
            continue;
        }
        for subject in repo.subjects_for(&class)? {
            if subject_name.is_some_and(|wanted| !wanted.eq_ignore_ascii_case(&subject)) {
                continue;
            }
            result.progress.push(ProgressReport {
                progress: repo.progress(&subject, &class)?,
                class_label: class.clone(),
                subject_name: subject,
            });
        }
    }
    if result.progress.is_empty() {
        result.add_message(CmdMessage::info("Nothing to report."));
    }
    Ok(result)
}

pub fn seed<B: StorageBackend>(
    repo: &mut ChapterRepository<B>,
    syllabus: &Syllabus,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match repo.seed_if_empty_or_mismatched(syllabus) {
        Ok(outcome) => {
            let message = match outcome {
                SeedOutcome::Untouched => CmdMessage::info("Chapters already match the syllabus."),
                SeedOutcome::Seeded { added } => {
                    CmdMessage::success(format!("Seeded {} chapters.", added))
                }
                SeedOutcome::Reseeded { removed, added } => CmdMessage::warning(format!(
                    "Syllabus changed: replaced {} chapters with {}. Progress was reset.",
                    removed, added
                )),
                SeedOutcome::Merged { removed, added } => CmdMessage::success(format!(
                    "Syllabus changed: removed {} stale chapters, added {}.",
                    removed, added
                )),
            };
            result.seed = Some(outcome);
            result.add_message(message);
        }
        Err(e) => recover(&mut result, e, "Chapter")?,
    }
    result.chapters = repo.get_all_chapters()?;
    Ok(result)
}
