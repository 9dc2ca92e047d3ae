//! Typed errors for id-addressed state mutations.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of id-addressed store operations. Scoring, recurrence and views
/// are total and never produce these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("habit not found: {0}")]
    HabitNotFound(String),

    #[error("subtask {subtask_id} not found on task {task_id}")]
    SubtaskNotFound { task_id: String, subtask_id: String },

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("task {0} cannot depend on itself")]
    SelfDependency(String),

    #[error("XP amount must be positive, got {0}")]
    InvalidXpAmount(i64),
}
