//! Scoring weight configuration.
//!
//! Lookups never fail: a missing table entry contributes `0.0` and a missing
//! project or tag multiplier is the identity `1.0`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::task::{Difficulty, Duration, Importance};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub importance: BTreeMap<Importance, f64>,
    pub difficulty: BTreeMap<Difficulty, f64>,
    pub duration: BTreeMap<Duration, f64>,

    pub due_date: f64,
    pub start_date: f64,
    pub task_age: f64,
    pub is_next: f64,
    pub in_progress: f64,
    pub dependency_multiplier: f64,
    pub habit_streak_multiplier: f64,
    pub base_task_weight: f64,

    /// project id -> multiplier
    pub project_multipliers: HashMap<String, f64>,
    /// tag id -> multiplier
    pub tag_multipliers: HashMap<String, f64>,

    /// Forces every score to zero without touching stored data.
    pub vacation_mode: bool,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            importance: BTreeMap::from([
                (Importance::Low, 0.5),
                (Importance::Medium, 1.0),
                (Importance::High, 2.0),
                (Importance::DefconOne, 4.0),
            ]),
            difficulty: BTreeMap::from([
                (Difficulty::Trivial, 0.25),
                (Difficulty::Low, 0.5),
                (Difficulty::Medium, 1.0),
                (Difficulty::High, 2.0),
                (Difficulty::Herculean, 4.0),
            ]),
            duration: BTreeMap::from([
                (Duration::Trivial, 0.25),
                (Duration::Short, 0.5),
                (Duration::Medium, 1.0),
                (Duration::Long, 2.0),
                (Duration::Odysseyan, 4.0),
            ]),
            due_date: 2.0,
            start_date: 0.5,
            task_age: 1.0,
            is_next: 2.0,
            in_progress: 1.5,
            dependency_multiplier: 0.1,
            habit_streak_multiplier: 0.1,
            base_task_weight: 1.0,
            project_multipliers: HashMap::new(),
            tag_multipliers: HashMap::new(),
            vacation_mode: false,
        }
    }
}

impl ScoringWeights {
    pub fn importance_weight(&self, importance: Importance) -> f64 {
        self.importance.get(&importance).copied().unwrap_or(0.0)
    }

    pub fn difficulty_weight(&self, difficulty: Difficulty) -> f64 {
        self.difficulty.get(&difficulty).copied().unwrap_or(0.0)
    }

    pub fn duration_weight(&self, duration: Duration) -> f64 {
        self.duration.get(&duration).copied().unwrap_or(0.0)
    }

    /// Sum of the three attribute tables.
    pub fn base_weight(
        &self,
        importance: Importance,
        difficulty: Difficulty,
        duration: Duration,
    ) -> f64 {
        self.importance_weight(importance)
            + self.difficulty_weight(difficulty)
            + self.duration_weight(duration)
    }

    pub fn project_multiplier(&self, project_id: Option<&str>) -> f64 {
        project_id
            .and_then(|id| self.project_multipliers.get(id))
            .copied()
            .unwrap_or(1.0)
    }

    /// Product of every matching tag multiplier.
    pub fn tag_multiplier<S: AsRef<str>>(&self, tags: &[S]) -> f64 {
        tags.iter()
            .filter_map(|t| self.tag_multipliers.get(t.as_ref()))
            .product()
    }
}
