//! habitquest-core: scoring, streaks and XP for the HabitQuest task tracker

pub mod catalog;
pub mod config;
pub mod error;
pub mod habit;
pub mod logging;
pub mod recurrence;
pub mod scoring;
pub mod store;
pub mod task;
pub mod time;
pub mod user;
pub mod views;
pub mod weights;

pub use catalog::{Project, Tag};
pub use config::{load_preferences, load_preferences_from, save_preferences, save_preferences_to};
pub use error::{StoreError, StoreResult};
pub use habit::{Habit, HabitCompletion, HabitStreak, RecurrenceRule, RecurrenceType};
pub use logging::init_logging;
pub use recurrence::{
    apply_completion, completion_rate, count_occurrences, is_completed_on, is_habit_due_on,
    matches_rule,
};
pub use scoring::{ScoreBreakdown, score_breakdown, score_habit, score_task};
pub use store::AppState;
pub use task::{Difficulty, Duration, HistoryEntry, HistoryEvent, Importance, Subtask, Task};
pub use time::{Clock, parse_local_datetime_to_utc};
pub use user::{Badge, Preferences, User, XpSource, XpTransaction, level_for_xp};
pub use weights::ScoringWeights;
