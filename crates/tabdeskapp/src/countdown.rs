//! Exam countdowns.
//!
//! Targets are local wall-clock times, read in the same offset the scheduler
//! uses for calendar days.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub title: String,
    /// Widget key, also the layout key prefix.
    pub key: String,
    pub target: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    pub fn new(title: &str, key: &str, target: NaiveDateTime) -> Self {
        Self {
            title: title.to_string(),
            key: key.to_string(),
            target,
        }
    }

    pub fn target_in(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        offset
            .from_local_datetime(&self.target)
            .single()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Time left until the target, or `None` once it has passed.
    pub fn remaining(&self, now: DateTime<Utc>, offset: FixedOffset) -> Option<Remaining> {
        let left = (self.target_in(offset)? - now).num_seconds();
        if left <= 0 {
            return None;
        }
        Some(Remaining {
            days: left / 86_400,
            hours: (left / 3_600) % 24,
            minutes: (left / 60) % 60,
            seconds: left % 60,
        })
    }
}

fn at_nine(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

/// The exam countdowns shipped with the dashboard.
pub fn builtin() -> Vec<Countdown> {
    vec![
        Countdown::new("JEE Main - January Attempt", "jeeMainJan", at_nine(2026, 1, 21)),
        Countdown::new("JEE Main - April Attempt", "jeeMainApril", at_nine(2026, 4, 1)),
        Countdown::new("JEE Advanced", "jeeAdvanced", at_nine(2026, 5, 18)),
        Countdown::new("NEET", "neet", at_nine(2026, 5, 5)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn remaining_breaks_down_units() {
        let neet = Countdown::new("NEET", "neet", at_nine(2026, 5, 5));
        let now: DateTime<Utc> = "2026-05-03T07:58:30Z".parse().unwrap();
        assert_eq!(
            neet.remaining(now, utc()),
            Some(Remaining {
                days: 2,
                hours: 1,
                minutes: 1,
                seconds: 30
            })
        );
    }

    #[test]
    fn passed_target_has_no_remaining() {
        let neet = Countdown::new("NEET", "neet", at_nine(2026, 5, 5));
        let now: DateTime<Utc> = "2026-05-05T09:00:00Z".parse().unwrap();
        assert_eq!(neet.remaining(now, utc()), None);
    }

    #[test]
    fn target_is_local_wall_clock() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let neet = Countdown::new("NEET", "neet", at_nine(2026, 5, 5));
        assert_eq!(
            neet.target_in(ist).unwrap().to_rfc3339(),
            "2026-05-05T03:30:00+00:00"
        );
    }

    #[test]
    fn builtin_keys() {
        let keys: Vec<_> = builtin().into_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["jeeMainJan", "jeeMainApril", "jeeAdvanced", "neet"]);
    }
}
