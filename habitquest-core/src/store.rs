//! Application state: the owned collection of tasks, habits, catalog entries
//! and the user, with the mutations that keep scores, streaks and XP in step.
//!
//! Every mutation re-scores the entity it touched. Scores of *other* tasks
//! that read the touched task through the dependency boost are left as they
//! are until the next full `recalculate_all_scores` pass.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{Project, Tag};
use crate::error::{StoreError, StoreResult};
use crate::habit::{Habit, RecurrenceRule};
use crate::recurrence::{apply_completion, count_occurrences};
use crate::scoring::{score_habit, score_task};
use crate::task::{HistoryEvent, Subtask, Task};
use crate::time::{Clock, parse_tz};
use crate::user::{User, XpSource};
use crate::views;
use crate::weights::ScoringWeights;

pub const BADGE_FIRST_TASK: &str = "first-task";

/// (streak length, badge id, badge name)
pub const STREAK_BADGES: [(u32, &str, &str); 2] = [
    (7, "streak-7", "Week Warrior"),
    (30, "streak-30", "Monthly Master"),
];

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
    pub tags: Vec<Tag>,
    pub projects: Vec<Project>,
    pub user: User,
}

impl AppState {
    pub fn new(user: User) -> Self {
        Self {
            tasks: Vec::new(),
            habits: Vec::new(),
            tags: Vec::new(),
            projects: Vec::new(),
            user,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.user.preferences.weights
    }

    /// Clock in the user's preferred zone; an unknown zone falls back to UTC.
    pub fn clock(&self, now: DateTime<Utc>) -> Clock {
        match parse_tz(&self.user.preferences.timezone) {
            Ok(tz) => Clock::new(now, tz),
            Err(err) => {
                warn!(timezone = %self.user.preferences.timezone, %err, "falling back to UTC");
                Clock::utc(now)
            }
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    fn task_index(&self, id: &str) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    fn habit_index(&self, id: &str) -> StoreResult<usize> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| StoreError::HabitNotFound(id.to_string()))
    }

    fn rescore_task(&mut self, idx: usize, now: DateTime<Utc>) -> f64 {
        let score = score_task(&self.tasks[idx], self.weights(), &self.tasks, now);
        let task = &mut self.tasks[idx];
        if task.score != score {
            task.score = score;
            task.record(now, HistoryEvent::Rescored { score });
        }
        score
    }

    fn rescore_habit(&mut self, idx: usize, now: DateTime<Utc>) -> f64 {
        let score = score_habit(&self.habits[idx], self.weights());
        let habit = &mut self.habits[idx];
        if habit.score != score {
            habit.score = score;
            habit.record(now, HistoryEvent::Rescored { score });
        }
        score
    }

    // ---- tasks ----

    pub fn create_task(&mut self, title: impl Into<String>, now: DateTime<Utc>) -> String {
        let task = Task::new(new_id(), title, now);
        let id = task.id.clone();
        self.tasks.push(task);
        let idx = self.tasks.len() - 1;
        self.rescore_task(idx, now);
        info!(task_id = %id, "task created");
        id
    }

    /// Insert a prepared task (e.g. built with the `Task::with_*` builders).
    pub fn add_task(&mut self, task: Task, now: DateTime<Utc>) -> StoreResult<String> {
        if task.dependencies.contains(&task.id) {
            return Err(StoreError::SelfDependency(task.id));
        }
        let id = task.id.clone();
        self.tasks.push(task);
        let idx = self.tasks.len() - 1;
        let score = self.rescore_task(idx, now);
        info!(task_id = %id, score, "task added");
        Ok(id)
    }

    /// Apply `edit` to a copy of the task, validate, commit and re-score.
    pub fn update_task<F>(&mut self, id: &str, now: DateTime<Utc>, edit: F) -> StoreResult<f64>
    where
        F: FnOnce(&mut Task),
    {
        let idx = self.task_index(id)?;
        let mut draft = self.tasks[idx].clone();
        edit(&mut draft);
        draft.id = id.to_string();
        if draft.dependencies.iter().any(|d| d == id) {
            return Err(StoreError::SelfDependency(id.to_string()));
        }
        draft.record(now, HistoryEvent::Updated);
        self.tasks[idx] = draft;
        let score = self.rescore_task(idx, now);
        debug!(task_id = %id, score, "task updated");
        Ok(score)
    }

    pub fn set_dependencies(
        &mut self,
        id: &str,
        dependencies: Vec<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<f64> {
        self.update_task(id, now, |t| t.dependencies = dependencies)
    }

    pub fn toggle_next(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<f64> {
        self.update_task(id, now, |t| t.is_next = !t.is_next)
    }

    pub fn toggle_in_progress(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<f64> {
        self.update_task(id, now, |t| t.in_progress = !t.in_progress)
    }

    pub fn add_subtask(
        &mut self,
        task_id: &str,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<String> {
        let idx = self.task_index(task_id)?;
        let subtask = Subtask::new(new_id(), title, now);
        let id = subtask.id.clone();
        let task = &mut self.tasks[idx];
        task.subtasks.push(subtask);
        task.record(now, HistoryEvent::Updated);
        Ok(id)
    }

    fn subtask_position(&self, idx: usize, subtask_id: &str) -> StoreResult<usize> {
        let task = &self.tasks[idx];
        task.subtasks
            .iter()
            .position(|s| s.id == subtask_id)
            .ok_or_else(|| StoreError::SubtaskNotFound {
                task_id: task.id.clone(),
                subtask_id: subtask_id.to_string(),
            })
    }

    /// Mark a subtask done and grant its share of the freshly re-scored
    /// task's XP. Returns the XP granted (zero if it was already done).
    pub fn complete_subtask(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let idx = self.task_index(task_id)?;
        let pos = self.subtask_position(idx, subtask_id)?;

        if self.tasks[idx].subtasks[pos].completed {
            return Ok(0);
        }
        let task = &mut self.tasks[idx];
        task.subtasks[pos].completed = true;
        task.subtasks[pos].completed_at = Some(now);
        task.record(now, HistoryEvent::SubtaskCompleted(subtask_id.to_string()));

        self.rescore_task(idx, now);
        let task = &self.tasks[idx];
        let xp = task.xp_share();
        let description = format!("{}: {}", task.title, task.subtasks[pos].title);
        self.user.add_xp(
            xp,
            XpSource::Subtask,
            description,
            Some(task_id.to_string()),
            now,
        );
        info!(task_id, subtask_id, xp, "subtask completed");
        Ok(xp)
    }

    /// Reopen a subtask. XP already granted stays granted.
    pub fn uncomplete_subtask(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let idx = self.task_index(task_id)?;
        let pos = self.subtask_position(idx, subtask_id)?;

        let task = &mut self.tasks[idx];
        if !task.subtasks[pos].completed {
            return Ok(());
        }
        task.subtasks[pos].completed = false;
        task.subtasks[pos].completed_at = None;
        task.record(now, HistoryEvent::SubtaskUncompleted(subtask_id.to_string()));
        debug!(task_id, subtask_id, "subtask reopened");
        Ok(())
    }

    /// Re-score, complete the task and grant XP: `round(score / (subtasks + 1))`.
    /// Returns the XP granted (zero if it was already complete).
    pub fn complete_task(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<i64> {
        let idx = self.task_index(id)?;
        if self.tasks[idx].is_completed() {
            return Ok(0);
        }

        self.rescore_task(idx, now);
        let task = &mut self.tasks[idx];
        task.completed_at = Some(now);
        task.record(now, HistoryEvent::Completed);
        let xp = task.xp_share();
        let description = task.title.clone();

        self.user
            .add_xp(xp, XpSource::Task, description, Some(id.to_string()), now);
        if self
            .user
            .award_badge(BADGE_FIRST_TASK, "First Quest", "Completed a first task", now)
        {
            info!(badge = BADGE_FIRST_TASK, "badge earned");
        }
        info!(task_id = %id, xp, total_xp = self.user.xp, "task completed");
        Ok(xp)
    }

    /// Reopen a task. XP already granted stays granted.
    pub fn uncomplete_task(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<f64> {
        let idx = self.task_index(id)?;
        let task = &mut self.tasks[idx];
        if task.completed_at.take().is_some() {
            task.record(now, HistoryEvent::Uncompleted);
            debug!(task_id = %id, "task reopened");
        }
        Ok(self.rescore_task(idx, now))
    }

    /// Remove a task and every dependency edge pointing at it.
    pub fn delete_task(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<Task> {
        let idx = self.task_index(id)?;
        let removed = self.tasks.remove(idx);

        let mut touched = Vec::new();
        for (i, task) in self.tasks.iter_mut().enumerate() {
            let before = task.dependencies.len();
            task.dependencies.retain(|d| d != id);
            if task.dependencies.len() != before || removed.dependencies.contains(&task.id) {
                touched.push(i);
            }
        }
        for i in touched {
            self.rescore_task(i, now);
        }

        info!(task_id = %id, "task deleted");
        Ok(removed)
    }

    // ---- habits ----

    pub fn create_habit(
        &mut self,
        title: impl Into<String>,
        recurrence: RecurrenceRule,
        now: DateTime<Utc>,
    ) -> String {
        self.add_habit(Habit::new(new_id(), title, recurrence, now), now)
    }

    /// Insert a habit; its creation day is taken in the user's zone.
    pub fn add_habit(&mut self, mut habit: Habit, now: DateTime<Utc>) -> String {
        habit.created_on = self.clock(now).local_date(habit.created_at);
        let id = habit.id.clone();
        self.habits.push(habit);
        let idx = self.habits.len() - 1;
        let score = self.rescore_habit(idx, now);
        info!(habit_id = %id, score, "habit added");
        id
    }

    pub fn update_habit<F>(&mut self, id: &str, now: DateTime<Utc>, edit: F) -> StoreResult<f64>
    where
        F: FnOnce(&mut Habit),
    {
        let idx = self.habit_index(id)?;
        let habit = &mut self.habits[idx];
        edit(habit);
        habit.id = id.to_string();
        habit.record(now, HistoryEvent::Updated);
        let score = self.rescore_habit(idx, now);
        debug!(habit_id = %id, score, "habit updated");
        Ok(score)
    }

    /// Record (or undo) the habit for `date`, update its streak and re-score.
    /// Completing grants the re-scored value as XP; undoing grants nothing and
    /// takes nothing back. Returns the XP granted.
    pub fn set_habit_completion(
        &mut self,
        id: &str,
        date: NaiveDate,
        completed: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let idx = self.habit_index(id)?;
        let mut updated = apply_completion(&self.habits[idx], date, completed);
        updated.record(
            now,
            if completed {
                HistoryEvent::Completed
            } else {
                HistoryEvent::Uncompleted
            },
        );
        self.habits[idx] = updated;
        let score = self.rescore_habit(idx, now);

        let habit = &self.habits[idx];
        let current = habit.streak.current;
        debug!(habit_id = %id, %date, completed, current, best = habit.streak.best, "habit streak updated");
        if !completed {
            return Ok(0);
        }

        let xp = score.round() as i64;
        let description = habit.title.clone();
        self.user
            .add_xp(xp, XpSource::Habit, description, Some(id.to_string()), now);

        for (length, badge_id, name) in STREAK_BADGES {
            if current >= length
                && self.user.award_badge(
                    badge_id,
                    name,
                    format!("Kept a habit going {length} times in a row"),
                    now,
                )
            {
                info!(badge = badge_id, habit_id = %id, "badge earned");
            }
        }

        info!(habit_id = %id, %date, xp, total_xp = self.user.xp, "habit completed");
        Ok(xp)
    }

    pub fn delete_habit(&mut self, id: &str) -> StoreResult<Habit> {
        let idx = self.habit_index(id)?;
        info!(habit_id = %id, "habit deleted");
        Ok(self.habits.remove(idx))
    }

    /// Recount `total_occurrences` for every habit from its start (or
    /// creation) date through today.
    pub fn refresh_habit_occurrences(&mut self, now: DateTime<Utc>) {
        let clock = self.clock(now);
        let today = clock.today();
        for habit in &mut self.habits {
            let from = habit
                .start_date
                .map_or(habit.created_on, |start| clock.local_date(start));
            let occurrences = count_occurrences(habit, from, today);
            habit.streak.total_occurrences = occurrences;
        }
    }

    // ---- catalog ----

    pub fn create_tag(&mut self, name: impl Into<String>) -> String {
        let tag = Tag::new(new_id(), name);
        let id = tag.id.clone();
        self.tags.push(tag);
        id
    }

    /// Remove a tag, its multiplier, and every reference to it.
    pub fn delete_tag(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<Tag> {
        let idx = self
            .tags
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::TagNotFound(id.to_string()))?;
        let removed = self.tags.remove(idx);

        for task in &mut self.tasks {
            task.tags.retain(|t| t != id);
        }
        for habit in &mut self.habits {
            habit.tags.retain(|t| t != id);
        }
        self.user.preferences.weights.tag_multipliers.remove(id);
        self.recalculate_all_scores(now);

        info!(tag_id = %id, "tag deleted");
        Ok(removed)
    }

    pub fn create_project(&mut self, name: impl Into<String>) -> String {
        let project = Project::new(new_id(), name);
        let id = project.id.clone();
        self.projects.push(project);
        id
    }

    /// Remove a project, its multiplier, and every reference to it.
    pub fn delete_project(&mut self, id: &str, now: DateTime<Utc>) -> StoreResult<Project> {
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))?;
        let removed = self.projects.remove(idx);

        for task in &mut self.tasks {
            if task.project_id.as_deref() == Some(id) {
                task.project_id = None;
            }
        }
        for habit in &mut self.habits {
            if habit.project_id.as_deref() == Some(id) {
                habit.project_id = None;
            }
        }
        self.user.preferences.weights.project_multipliers.remove(id);
        self.recalculate_all_scores(now);

        info!(project_id = %id, "project deleted");
        Ok(removed)
    }

    // ---- scoring ----

    pub fn set_weights(&mut self, weights: ScoringWeights, now: DateTime<Utc>) {
        self.user.preferences.weights = weights;
        self.recalculate_all_scores(now);
    }

    pub fn set_vacation_mode(&mut self, on: bool, now: DateTime<Utc>) {
        self.user.preferences.weights.vacation_mode = on;
        self.recalculate_all_scores(now);
        info!(vacation_mode = on, "vacation mode changed");
    }

    /// Re-score every task and habit. Each task reads its dependents' scores
    /// as they were before the pass started.
    pub fn recalculate_all_scores(&mut self, now: DateTime<Utc>) {
        let weights = &self.user.preferences.weights;
        let snapshot = &self.tasks;
        let task_scores: Vec<f64> = snapshot
            .iter()
            .map(|t| score_task(t, weights, snapshot, now))
            .collect();
        let habit_scores: Vec<f64> = self.habits.iter().map(|h| score_habit(h, weights)).collect();

        for (task, score) in self.tasks.iter_mut().zip(task_scores) {
            if task.score != score {
                task.score = score;
                task.record(now, HistoryEvent::Rescored { score });
            }
        }
        for (habit, score) in self.habits.iter_mut().zip(habit_scores) {
            if habit.score != score {
                habit.score = score;
                habit.record(now, HistoryEvent::Rescored { score });
            }
        }

        debug!(
            tasks = self.tasks.len(),
            habits = self.habits.len(),
            "recalculated all scores"
        );
    }

    // ---- XP ----

    /// Grant XP by hand. Returns the new total.
    pub fn add_xp(
        &mut self,
        amount: i64,
        source: XpSource,
        description: impl Into<String>,
        associated_id: Option<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<i64> {
        if amount <= 0 {
            return Err(StoreError::InvalidXpAmount(amount));
        }
        self.user
            .add_xp(amount, source, description, associated_id, now);
        info!(amount, total_xp = self.user.xp, "xp granted");
        Ok(self.user.xp)
    }

    /// Spend XP (e.g. on a reward). Returns the new total.
    pub fn withdraw_xp(
        &mut self,
        amount: i64,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<i64> {
        if amount <= 0 {
            return Err(StoreError::InvalidXpAmount(amount));
        }
        self.user.withdraw_xp(amount, description, now);
        info!(amount, total_xp = self.user.xp, "xp withdrawn");
        Ok(self.user.xp)
    }

    // ---- views ----

    pub fn active_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        views::active_tasks(&self.tasks, &self.clock(now))
    }

    pub fn future_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        views::future_tasks(&self.tasks, &self.clock(now))
    }

    pub fn completed_tasks(&self) -> Vec<&Task> {
        views::completed_tasks(&self.tasks)
    }

    pub fn tasks_due_today(&self, now: DateTime<Utc>) -> Vec<&Task> {
        views::tasks_due_today(&self.tasks, &self.clock(now))
    }

    pub fn overdue_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        views::overdue_tasks(&self.tasks, &self.clock(now))
    }

    pub fn tasks_by_score(&self) -> Vec<&Task> {
        views::tasks_by_score(&self.tasks)
    }

    pub fn active_habits(&self, now: DateTime<Utc>) -> Vec<&Habit> {
        views::active_habits(&self.habits, &self.clock(now))
    }

    pub fn habits_due_today(&self, now: DateTime<Utc>) -> Vec<&Habit> {
        views::habits_due_today(&self.habits, &self.clock(now))
    }

    pub fn completed_habits_today(&self, now: DateTime<Utc>) -> Vec<&Habit> {
        views::completed_habits_today(&self.habits, &self.clock(now))
    }

    pub fn future_habits(&self, now: DateTime<Utc>) -> Vec<&Habit> {
        views::future_habits(&self.habits, &self.clock(now))
    }
}
