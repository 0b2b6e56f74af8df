use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repository::ChapterRepository;
use crate::store::StorageBackend;
use chrono::{DateTime, Utc};

pub fn run<B: StorageBackend>(repo: &ChapterRepository<B>, now: DateTime<Utc>) -> Result<CmdResult> {
    let chapters = repo.get_all_chapters()?;
    let agenda = repo.agenda(&chapters, now);

    let mut result = CmdResult::default();
    if agenda.is_empty() {
        result.add_message(CmdMessage::info(
            "No revisions scheduled. Complete a chapter to start its revisions.",
        ));
    } else if !agenda.overdue.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "{} revision(s) overdue.",
            agenda.overdue.len()
        )));
    }
    result.agenda = Some(agenda);
    Ok(result)
}
