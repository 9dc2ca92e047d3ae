//! Habit model: task-like attributes plus a recurrence rule and streak state.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::task::{Difficulty, Duration, HistoryEntry, HistoryEvent, Importance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub kind: RecurrenceType,
    /// Days between occurrences for daily rules; `None` means every day.
    pub interval: Option<u32>,
    #[serde(default)]
    pub week_days: Vec<Weekday>,
    /// 1-31.
    pub day_of_month: Option<u32>,
    /// 1-12.
    pub month_of_year: Option<u32>,
    #[serde(default)]
    pub is_last_day: bool,
}

impl RecurrenceRule {
    fn of(kind: RecurrenceType) -> Self {
        Self {
            kind,
            interval: None,
            week_days: Vec::new(),
            day_of_month: None,
            month_of_year: None,
            is_last_day: false,
        }
    }

    pub fn daily() -> Self {
        Self::of(RecurrenceType::Daily)
    }

    pub fn every_n_days(interval: u32) -> Self {
        Self {
            interval: Some(interval),
            ..Self::daily()
        }
    }

    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            week_days: days.into_iter().collect(),
            ..Self::of(RecurrenceType::Weekly)
        }
    }

    pub fn monthly_on(day_of_month: u32) -> Self {
        Self {
            day_of_month: Some(day_of_month),
            ..Self::of(RecurrenceType::Monthly)
        }
    }

    pub fn monthly_last_day() -> Self {
        Self {
            is_last_day: true,
            ..Self::of(RecurrenceType::Monthly)
        }
    }

    pub fn yearly_on(month_of_year: u32, day_of_month: u32) -> Self {
        Self {
            month_of_year: Some(month_of_year),
            day_of_month: Some(day_of_month),
            ..Self::of(RecurrenceType::Yearly)
        }
    }

    pub fn custom() -> Self {
        Self::of(RecurrenceType::Custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitStreak {
    pub current: u32,
    pub best: u32,
    /// Per-date completion flag; an entry set to `false` records an undo.
    pub completed: BTreeMap<NaiveDate, bool>,
    pub total_completions: u32,
    pub total_occurrences: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,

    pub start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Local calendar day of creation; day zero of interval rules.
    pub created_on: NaiveDate,

    pub importance: Importance,
    pub difficulty: Difficulty,
    pub duration: Duration,

    pub tags: Vec<String>,
    pub project_id: Option<String>,

    pub recurrence: RecurrenceRule,
    pub streak: HabitStreak,
    /// At most one record per calendar date.
    pub completions: Vec<HabitCompletion>,

    pub score: f64,
    pub history: Vec<HistoryEntry>,
}

impl Habit {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        recurrence: RecurrenceRule,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            icon: None,
            start_date: None,
            created_at: now,
            created_on: now.date_naive(),
            importance: Importance::Medium,
            difficulty: Difficulty::Medium,
            duration: Duration::Medium,
            tags: Vec::new(),
            project_id: None,
            recurrence,
            streak: HabitStreak::default(),
            completions: Vec::new(),
            score: 0.0,
            history: vec![HistoryEntry {
                at: now,
                event: HistoryEvent::Created,
            }],
        }
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Pin the creation day to a local calendar date. `new` uses the UTC date.
    pub fn with_created_on(mut self, date: NaiveDate) -> Self {
        self.created_on = date;
        self
    }

    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_tags<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn record(&mut self, at: DateTime<Utc>, event: HistoryEvent) {
        self.history.push(HistoryEntry { at, event });
    }

    pub fn completion_on(&self, date: NaiveDate) -> Option<&HabitCompletion> {
        self.completions.iter().find(|c| c.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn constructors_fill_only_their_fields() {
        let r = RecurrenceRule::yearly_on(3, 14);
        assert_eq!(r.kind, RecurrenceType::Yearly);
        assert_eq!(r.month_of_year, Some(3));
        assert_eq!(r.day_of_month, Some(14));
        assert!(!r.is_last_day);

        let r = RecurrenceRule::weekly([Weekday::Mon, Weekday::Thu]);
        assert_eq!(r.week_days, vec![Weekday::Mon, Weekday::Thu]);
        assert_eq!(r.interval, None);
    }

    #[test]
    fn habit_round_trips_through_json() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let mut h = Habit::new("h1", "stretch", RecurrenceRule::every_n_days(2), now);
        h.streak
            .completed
            .insert(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), true);

        assert_eq!(h.created_on, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());

        let json = serde_json::to_string(&h).unwrap();
        let back: Habit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
