use crate::commands::{recover, CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::StorageBackend;
use crate::todos::TodoList;
use chrono::{DateTime, Utc};

fn finish<B: StorageBackend>(todos: &TodoList<B>, result: CmdResult) -> Result<CmdResult> {
    Ok(result.with_todos(todos.list()?))
}

pub fn list<B: StorageBackend>(todos: &TodoList<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let items = todos.list()?;
    if items.is_empty() {
        result.add_message(CmdMessage::info("Nothing to do."));
    }
    Ok(result.with_todos(items))
}

pub fn add<B: StorageBackend>(
    todos: &mut TodoList<B>,
    text: &str,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match todos.add(text, now) {
        Ok(todo) => result.add_message(CmdMessage::success(format!("Added \"{}\".", todo.text))),
        Err(e) => recover(&mut result, e, "Todo")?,
    }
    finish(todos, result)
}

pub fn toggle<B: StorageBackend>(todos: &mut TodoList<B>, ids: &[i64]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for &id in ids {
        match todos.toggle(id) {
            Ok(todo) => result.add_message(CmdMessage::success(format!(
                "{} \"{}\".",
                if todo.done { "Done:" } else { "Reopened" },
                todo.text
            ))),
            Err(e) => recover(&mut result, e, "Todo")?,
        }
    }
    finish(todos, result)
}

pub fn remove<B: StorageBackend>(todos: &mut TodoList<B>, ids: &[i64]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for &id in ids {
        match todos.remove(id) {
            Ok(true) => result.add_message(CmdMessage::success(format!("Removed todo #{}.", id))),
            Ok(false) => result.add_message(CmdMessage::info(format!("Todo #{} was already gone.", id))),
            Err(e) => recover(&mut result, e, "Todo")?,
        }
    }
    finish(todos, result)
}

pub fn clear_done<B: StorageBackend>(todos: &mut TodoList<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match todos.clear_done() {
        Ok(0) => result.add_message(CmdMessage::info("No finished todos.")),
        Ok(n) => result.add_message(CmdMessage::success(format!("Cleared {} finished todo(s).", n))),
        Err(e) => recover(&mut result, e, "Todo")?,
    }
    finish(todos, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::MemBackend;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn add_toggle_clear() {
        let mut todos = TodoList::new(MemBackend::new());
        let now = at("2026-03-01T09:00:00Z");
        add(&mut todos, "Revise optics", now).unwrap();
        let result = add(&mut todos, "Mock test", now).unwrap();
        assert_eq!(result.todos.len(), 2);

        let first = result.todos[0].id;
        let toggled = toggle(&mut todos, &[first]).unwrap();
        assert!(toggled.todos[0].done);
        assert_eq!(toggled.messages[0].content, "Done: \"Revise optics\".");

        let cleared = clear_done(&mut todos).unwrap();
        assert_eq!(cleared.todos.len(), 1);
        assert_eq!(cleared.todos[0].text, "Mock test");
    }

    #[test]
    fn missing_ids_warn() {
        let mut todos = TodoList::new(MemBackend::new());
        let result = toggle(&mut todos, &[42]).unwrap();
        assert_eq!(result.messages[0].content, "Todo #42 not found");

        let removed = remove(&mut todos, &[42]).unwrap();
        assert_eq!(removed.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn blank_text_is_an_error() {
        let mut todos = TodoList::new(MemBackend::new());
        assert!(add(&mut todos, "   ", at("2026-03-01T09:00:00Z")).is_err());
        assert_eq!(list(&todos).unwrap().messages[0].content, "Nothing to do.");
    }
}
