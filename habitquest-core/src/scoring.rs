//! Scoring engine: priority / XP value of tasks and habits.
//!
//! Task score (before rounding):
//!
//! ```text
//! ((base + due + start + age + flags) * base_task_weight)
//!     * project_multiplier * tag_multipliers
//!     + sum(dependent.score * dependency_multiplier)
//! ```
//!
//! Dependents are the other tasks listing this task in their dependencies.
//! Their *cached* `score` is read as-is, so the result depends on the order in
//! which a batch is rescored; cycles never recurse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::Habit;
use crate::task::Task;
use crate::time::whole_days_between;
use crate::weights::ScoringWeights;

/// Days before the due date at which the soon-due ramp starts.
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;
/// Task age at which the age term saturates.
pub const AGE_SATURATION_DAYS: f64 = 30.0;

/// Individual terms of a task score, for display and debugging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub due: f64,
    pub start: f64,
    pub age: f64,
    pub flags: f64,
    /// project multiplier * tag multipliers
    pub multiplier: f64,
    pub dependency_boost: f64,
    /// Final rounded score.
    pub total: f64,
}

/// Round to one decimal place.
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// Due-date term: overdue grows linearly with days late, soon-due shrinks
/// linearly to zero across the window.
pub fn due_date_term(due: Option<DateTime<Utc>>, weight: f64, now: DateTime<Utc>) -> f64 {
    let Some(due) = due else { return 0.0 };

    if due < now {
        let days_overdue = whole_days_between(due, now);
        return weight * (days_overdue as f64 + 1.0);
    }

    let days_until = whole_days_between(now, due);
    if days_until <= DUE_SOON_WINDOW_DAYS {
        weight * (1.0 - days_until as f64 / DUE_SOON_WINDOW_DAYS as f64)
    } else {
        0.0
    }
}

fn age_term(created_at: DateTime<Utc>, weight: f64, now: DateTime<Utc>) -> f64 {
    let days = whole_days_between(created_at, now).max(0) as f64;
    weight * (days / AGE_SATURATION_DAYS).min(1.0)
}

/// Sum of `dependent.score * dependency_multiplier` over every other task
/// that depends on `task`.
pub fn dependency_boost(task: &Task, weights: &ScoringWeights, all_tasks: &[Task]) -> f64 {
    all_tasks
        .iter()
        .filter(|other| other.id != task.id)
        .filter(|other| other.dependencies.iter().any(|d| *d == task.id))
        .map(|other| other.score * weights.dependency_multiplier)
        .sum()
}

pub fn score_breakdown(
    task: &Task,
    weights: &ScoringWeights,
    all_tasks: &[Task],
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    if weights.vacation_mode {
        return ScoreBreakdown::default();
    }

    let base = weights.base_weight(task.importance, task.difficulty, task.duration);
    let due = due_date_term(task.due_date, weights.due_date, now);
    let start = match task.start_date {
        Some(start) if start < now => weights.start_date,
        _ => 0.0,
    };
    let age = age_term(task.created_at, weights.task_age, now);

    let mut flags = 0.0;
    if task.is_next {
        flags += weights.is_next;
    }
    if task.in_progress {
        flags += weights.in_progress;
    }

    let multiplier = weights.project_multiplier(task.project_id.as_deref())
        * weights.tag_multiplier(&task.tags);
    let dependency_boost = dependency_boost(task, weights, all_tasks);

    let raw = (base + due + start + age + flags) * weights.base_task_weight * multiplier
        + dependency_boost;

    ScoreBreakdown {
        base,
        due,
        start,
        age,
        flags,
        multiplier,
        dependency_boost,
        total: round_score(raw),
    }
}

pub fn score_task(
    task: &Task,
    weights: &ScoringWeights,
    all_tasks: &[Task],
    now: DateTime<Utc>,
) -> f64 {
    score_breakdown(task, weights, all_tasks, now).total
}

/// Habit score: attribute weights plus a streak bonus, scaled by project and
/// tag multipliers. Dates, flags and dependencies do not apply.
pub fn score_habit(habit: &Habit, weights: &ScoringWeights) -> f64 {
    if weights.vacation_mode {
        return 0.0;
    }

    let base = weights.base_weight(habit.importance, habit.difficulty, habit.duration);
    let streak = habit.streak.current as f64 * weights.habit_streak_multiplier;
    let multiplier = weights.project_multiplier(habit.project_id.as_deref())
        * weights.tag_multiplier(&habit.tags);

    round_score((base + streak) * multiplier)
}
