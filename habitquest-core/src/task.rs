//! Task model: attributes that feed the scoring engine plus the completion
//! bookkeeping (subtasks, history) the XP ledger reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
    DefconOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    Low,
    Medium,
    High,
    Herculean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    Trivial,
    Short,
    Medium,
    Long,
    Odysseyan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Subtask {
    pub fn new(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum HistoryEvent {
    Created,
    Updated,
    Completed,
    Uncompleted,
    SubtaskCompleted(String),
    SubtaskUncompleted(String),
    Rescored { score: f64 },
}

/// One line of an entity's append-only history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub event: HistoryEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,

    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    pub importance: Importance,
    pub difficulty: Difficulty,
    pub duration: Duration,

    /// Ids of tasks that must be completed before this one.
    pub dependencies: Vec<String>,
    pub subtasks: Vec<Subtask>,
    pub tags: Vec<String>,
    pub project_id: Option<String>,

    pub is_next: bool,
    pub in_progress: bool,

    /// Cached output of the scoring engine; written only by the store.
    pub score: f64,

    pub history: Vec<HistoryEntry>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            icon: None,
            start_date: None,
            due_date: None,
            created_at: now,
            completed_at: None,
            importance: Importance::Medium,
            difficulty: Difficulty::Medium,
            duration: Duration::Medium,
            dependencies: Vec::new(),
            subtasks: Vec::new(),
            tags: Vec::new(),
            project_id: None,
            is_next: false,
            in_progress: false,
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

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = ids.into_iter().map(Into::into).collect();
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

    pub fn with_next(mut self, is_next: bool) -> Self {
        self.is_next = is_next;
        self
    }

    pub fn with_in_progress(mut self, in_progress: bool) -> Self {
        self.in_progress = in_progress;
        self
    }

    pub fn with_subtask(mut self, subtask: Subtask) -> Self {
        self.subtasks.push(subtask);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn subtask(&self, id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == id)
    }

    pub fn record(&mut self, at: DateTime<Utc>, event: HistoryEvent) {
        self.history.push(HistoryEntry { at, event });
    }

    /// XP granted per completion event: the score split over every subtask
    /// plus the final completion.
    pub fn xp_share(&self) -> i64 {
        let parts = self.subtasks.len() as f64 + 1.0;
        (self.score / parts).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_task_has_medium_defaults_and_created_entry() {
        let t = Task::new("t1", "write report", now());
        assert_eq!(t.importance, Importance::Medium);
        assert_eq!(t.difficulty, Difficulty::Medium);
        assert_eq!(t.duration, Duration::Medium);
        assert_eq!(t.score, 0.0);
        assert!(!t.is_completed());
        assert_eq!(t.history.len(), 1);
        assert_eq!(t.history[0].event, HistoryEvent::Created);
    }

    #[test]
    fn xp_share_splits_over_subtasks_plus_one() {
        let mut t = Task::new("t1", "ship", now())
            .with_subtask(Subtask::new("s1", "a", now()))
            .with_subtask(Subtask::new("s2", "b", now()));
        t.score = 10.0;
        // 10 / 3 = 3.33 -> 3
        assert_eq!(t.xp_share(), 3);

        t.subtasks.clear();
        t.score = 3.5;
        assert_eq!(t.xp_share(), 4);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&Importance::DefconOne).unwrap();
        assert_eq!(json, "\"defcon_one\"");
        let back: Duration = serde_json::from_str("\"odysseyan\"").unwrap();
        assert_eq!(back, Duration::Odysseyan);
    }
}
