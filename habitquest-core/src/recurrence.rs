//! Habit recurrence and streak evaluation.
//!
//! Due checks are stateless: a function of the rule, the habit's local
//! creation day and the calendar date being asked about. Streak updates are pure and return
//! a new `Habit`.

use chrono::{Datelike, NaiveDate};

use crate::habit::{Habit, HabitCompletion, RecurrenceType};
use crate::time::is_last_day_of_month;

/// Does `date` match the habit's recurrence rule, ignoring completion state?
pub fn matches_rule(habit: &Habit, date: NaiveDate) -> bool {
    let rule = &habit.recurrence;
    match rule.kind {
        RecurrenceType::Daily => match rule.interval {
            None | Some(0) | Some(1) => true,
            Some(interval) => {
                let days = (date - habit.created_on).num_days();
                days >= 0 && days % i64::from(interval) == 0
            }
        },
        RecurrenceType::Weekly => rule.week_days.contains(&date.weekday()),
        RecurrenceType::Monthly => {
            if rule.is_last_day {
                is_last_day_of_month(date)
            } else {
                rule.day_of_month == Some(date.day())
            }
        }
        RecurrenceType::Yearly => {
            rule.month_of_year == Some(date.month()) && rule.day_of_month == Some(date.day())
        }
        // No evaluation rule exists for custom recurrences yet.
        RecurrenceType::Custom => false,
    }
}

pub fn is_completed_on(habit: &Habit, date: NaiveDate) -> bool {
    habit.streak.completed.get(&date).copied().unwrap_or(false)
}

/// Due when the rule matches and the date has not been completed already.
pub fn is_habit_due_on(habit: &Habit, date: NaiveDate) -> bool {
    matches_rule(habit, date) && !is_completed_on(habit, date)
}

/// Record a completion (or its undo) for `date`.
///
/// Completing always advances the current streak by one; it does not check
/// that `date` follows the previously completed date. Undoing resets the
/// current streak to zero.
pub fn apply_completion(habit: &Habit, date: NaiveDate, completed: bool) -> Habit {
    let mut next = habit.clone();
    let was_completed = is_completed_on(habit, date);
    let streak = &mut next.streak;

    if completed {
        streak.completed.insert(date, true);
        streak.total_completions += 1;
        streak.current += 1;
        if streak.current > streak.best {
            streak.best = streak.current;
        }
    } else {
        if was_completed {
            streak.total_completions = streak.total_completions.saturating_sub(1);
        }
        streak.completed.insert(date, false);
        streak.current = 0;
    }

    next.completions.retain(|c| c.date != date);
    next.completions.push(HabitCompletion { date, completed });
    next.completions.sort_by_key(|c| c.date);

    next
}

/// Number of dates in `[from, to]` that match the rule.
pub fn count_occurrences(habit: &Habit, from: NaiveDate, to: NaiveDate) -> u32 {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| matches_rule(habit, *d))
        .count() as u32
}

/// Completions over occurrences, `0.0` when nothing has been due yet.
pub fn completion_rate(habit: &Habit) -> f64 {
    if habit.streak.total_occurrences == 0 {
        return 0.0;
    }
    habit.streak.total_completions as f64 / habit.streak.total_occurrences as f64
}
