//! The single user record: XP ledger, badges and preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weights::ScoringWeights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Task,
    Subtask,
    Habit,
    Badge,
    Reward,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpTransaction {
    pub id: String,
    /// Signed: withdrawals are negative.
    pub amount: i64,
    pub source: XpSource,
    pub description: String,
    pub associated_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub weights: ScoringWeights,
    /// IANA zone used to decide which calendar day "today" is.
    pub timezone: String,
    pub show_xp_notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            timezone: "UTC".to_string(),
            show_xp_notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub xp: i64,
    pub transactions: Vec<XpTransaction>,
    pub badges: Vec<Badge>,
    pub preferences: Preferences,
}

impl User {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at: now,
            xp: 0,
            transactions: Vec::new(),
            badges: Vec::new(),
            preferences: Preferences::default(),
        }
    }

    /// Append a grant to the ledger and raise the running total.
    pub fn add_xp(
        &mut self,
        amount: i64,
        source: XpSource,
        description: impl Into<String>,
        associated_id: Option<String>,
        now: DateTime<Utc>,
    ) -> &XpTransaction {
        self.push_transaction(amount, source, description.into(), associated_id, now)
    }

    /// Append a negative transaction and lower the running total.
    pub fn withdraw_xp(
        &mut self,
        amount: i64,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &XpTransaction {
        self.push_transaction(-amount, XpSource::Reward, description.into(), None, now)
    }

    fn push_transaction(
        &mut self,
        amount: i64,
        source: XpSource,
        description: String,
        associated_id: Option<String>,
        now: DateTime<Utc>,
    ) -> &XpTransaction {
        self.xp += amount;
        self.transactions.push(XpTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            source,
            description,
            associated_id,
            created_at: now,
        });
        &self.transactions[self.transactions.len() - 1]
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    /// Returns `false` when the badge was already earned.
    pub fn award_badge(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let id = id.into();
        if self.has_badge(&id) {
            return false;
        }
        self.badges.push(Badge {
            id,
            name: name.into(),
            description: description.into(),
            earned_at: now,
        });
        true
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }
}

/// XP needed to reach `level`: 100, 300, 600, 1000, ...
pub fn xp_for_level(level: u32) -> i64 {
    i64::try_from(level_threshold(level)).unwrap_or(i64::MAX)
}

fn level_threshold(level: u32) -> i128 {
    let n = i128::from(level);
    50 * n * (n + 1)
}

/// Highest level whose threshold `xp` has reached.
pub fn level_for_xp(xp: i64) -> u32 {
    if xp < 100 {
        return 0;
    }
    let xp = i128::from(xp);
    // largest n with n(n + 1) <= xp / 50; float rounding can land one off
    let k = (xp / 50) as f64;
    let mut level = ((-1.0 + (1.0 + 4.0 * k).sqrt()) / 2.0) as u32;
    while level > 0 && level_threshold(level) > xp {
        level -= 1;
    }
    while level_threshold(level + 1) <= xp {
        level += 1;
    }
    level
}
