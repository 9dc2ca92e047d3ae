//! Filtered views over tasks and habits, recomputed on every call.

use crate::habit::Habit;
use crate::recurrence::{is_completed_on, is_habit_due_on};
use crate::task::Task;
use crate::time::Clock;

fn started(start: Option<chrono::DateTime<chrono::Utc>>, clock: &Clock) -> bool {
    start.is_none_or(|s| s <= clock.now)
}

/// Every dependency that still resolves to a task is completed.
/// Dangling ids count as satisfied.
pub fn dependencies_met(task: &Task, all_tasks: &[Task]) -> bool {
    task.dependencies.iter().all(|dep| {
        all_tasks
            .iter()
            .find(|t| t.id == *dep)
            .is_none_or(Task::is_completed)
    })
}

/// Open, started, and unblocked.
pub fn active_tasks<'a>(tasks: &'a [Task], clock: &Clock) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !t.is_completed())
        .filter(|t| started(t.start_date, clock))
        .filter(|t| dependencies_met(t, tasks))
        .collect()
}

pub fn future_tasks<'a>(tasks: &'a [Task], clock: &Clock) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !t.is_completed())
        .filter(|t| t.start_date.is_some_and(|s| s > clock.now))
        .collect()
}

pub fn completed_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_completed()).collect()
}

/// Open tasks whose due date falls on today's local calendar day.
pub fn tasks_due_today<'a>(tasks: &'a [Task], clock: &Clock) -> Vec<&'a Task> {
    let today = clock.today();
    tasks
        .iter()
        .filter(|t| !t.is_completed())
        .filter(|t| t.due_date.is_some_and(|d| clock.local_date(d) == today))
        .collect()
}

pub fn overdue_tasks<'a>(tasks: &'a [Task], clock: &Clock) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !t.is_completed())
        .filter(|t| t.due_date.is_some_and(|d| d < clock.now))
        .collect()
}

/// Highest score first; ties keep their stored order.
pub fn tasks_by_score(tasks: &[Task]) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().collect();
    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    out
}

pub fn active_habits<'a>(habits: &'a [Habit], clock: &Clock) -> Vec<&'a Habit> {
    let today = clock.today();
    habits
        .iter()
        .filter(|h| started(h.start_date, clock))
        .filter(|h| !is_completed_on(h, today))
        .collect()
}

pub fn habits_due_today<'a>(habits: &'a [Habit], clock: &Clock) -> Vec<&'a Habit> {
    let today = clock.today();
    habits
        .iter()
        .filter(|h| is_habit_due_on(h, today))
        .collect()
}

pub fn completed_habits_today<'a>(habits: &'a [Habit], clock: &Clock) -> Vec<&'a Habit> {
    let today = clock.today();
    habits
        .iter()
        .filter(|h| is_completed_on(h, today))
        .collect()
}

pub fn future_habits<'a>(habits: &'a [Habit], clock: &Clock) -> Vec<&'a Habit> {
    habits
        .iter()
        .filter(|h| h.start_date.is_some_and(|s| s > clock.now))
        .collect()
}
