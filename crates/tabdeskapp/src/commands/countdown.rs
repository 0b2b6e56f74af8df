use crate::commands::{CmdMessage, CmdResult, CountdownView};
use crate::countdown::Countdown;
use crate::error::Result;
use chrono::{DateTime, FixedOffset, Utc};

pub fn run(countdowns: &[Countdown], now: DateTime<Utc>, offset: FixedOffset) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for countdown in countdowns {
        let remaining = countdown.remaining(now, offset);
        if remaining.is_none() {
            result.add_message(CmdMessage::info(format!("{} has passed.", countdown.title)));
        }
        result.countdowns.push(CountdownView {
            title: countdown.title.clone(),
            key: countdown.key.clone(),
            target: countdown.target.format("%Y-%m-%d %H:%M").to_string(),
            remaining,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::builtin;

    #[test]
    fn passed_exams_are_noted() {
        let now: DateTime<Utc> = "2026-04-10T00:00:00Z".parse().unwrap();
        let result = run(&builtin(), now, FixedOffset::east_opt(0).unwrap()).unwrap();

        assert_eq!(result.countdowns.len(), 4);
        assert!(result.countdowns[0].remaining.is_none());
        assert!(result.countdowns[2].remaining.is_some());
        assert_eq!(result.countdowns[3].target, "2026-05-05 09:00");
        assert_eq!(result.messages.len(), 2);
    }
}
