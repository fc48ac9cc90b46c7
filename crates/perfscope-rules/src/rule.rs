use crate::condition::Condition;
use serde::{Deserialize, Serialize};

/// Priority given to suggestions of rules that do not set one.
pub const DEFAULT_PRIORITY: i64 = 3;

/// A declarative threshold rule.
///
/// `suggestion` is a template rendered for every transaction the condition
/// matches; see [`crate::template`] for its placeholders. Lower `priority`
/// values are more urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub condition: Condition,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl Rule {
    /// The configured priority, or [`DEFAULT_PRIORITY`].
    pub fn effective_priority(&self) -> i64 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }
}
